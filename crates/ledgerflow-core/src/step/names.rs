//! Normalización de nombres declarados en `creates` / `requires`.
//!
//! Un nombre con el prefijo `_` es un flag: una dependencia booleana sin
//! payload. Se acepta un nombre suelto, una lista, o un `Name` explícito.

use crate::constants::FLAG_PREFIX;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Name {
    Value(String),
    Flag(String),
}

impl Name {
    /// Construye un flag, añadiendo el prefijo si no lo trae.
    pub fn flag(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.starts_with(FLAG_PREFIX) {
            Name::Flag(name)
        } else {
            Name::Flag(format!("{FLAG_PREFIX}{name}"))
        }
    }

    pub fn value(name: impl Into<String>) -> Self {
        Name::Value(name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Name::Value(n) | Name::Flag(n) => n,
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, Name::Flag(_))
    }
}

impl From<&str> for Name {
    fn from(raw: &str) -> Self {
        if raw.starts_with(FLAG_PREFIX) {
            Name::Flag(raw.to_string())
        } else {
            Name::Value(raw.to_string())
        }
    }
}

impl From<String> for Name {
    fn from(raw: String) -> Self {
        Name::from(raw.as_str())
    }
}

/// Lista de nombres tal como se declara en un step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Names(pub Vec<Name>);

impl From<Name> for Names {
    fn from(name: Name) -> Self {
        Names(vec![name])
    }
}

impl From<&str> for Names {
    fn from(raw: &str) -> Self {
        Names(vec![Name::from(raw)])
    }
}

impl From<String> for Names {
    fn from(raw: String) -> Self {
        Names(vec![Name::from(raw)])
    }
}

impl<T: Into<Name>> From<Vec<T>> for Names {
    fn from(items: Vec<T>) -> Self {
        Names(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Name>, const N: usize> From<[T; N]> for Names {
    fn from(items: [T; N]) -> Self {
        Names(items.into_iter().map(Into::into).collect())
    }
}

impl From<&[&str]> for Names {
    fn from(items: &[&str]) -> Self {
        Names(items.iter().map(|s| Name::from(*s)).collect())
    }
}

/// Declaración normalizada: valores y flags por separado, en orden y sin
/// duplicados.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declared {
    pub values: Vec<String>,
    pub flags: Vec<String>,
}

impl Declared {
    pub fn extend(&mut self, names: Names) {
        for name in names.0 {
            let target = if name.is_flag() { &mut self.flags } else { &mut self.values };
            let raw = name.as_str();
            if !target.iter().any(|n| n == raw) {
                target.push(raw.to_string());
            }
        }
    }

    /// Valores seguidos de flags.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.values.iter().chain(self.flags.iter()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.all().any(|n| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.flags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_marks_flags() {
        assert_eq!(Name::from("_ready"), Name::Flag("_ready".into()));
        assert_eq!(Name::from("x"), Name::Value("x".into()));
        assert_eq!(Name::flag("ready"), Name::Flag("_ready".into()));
        assert_eq!(Name::flag("_ready"), Name::Flag("_ready".into()));
    }

    #[test]
    fn declared_splits_and_dedups_in_order() {
        let mut d = Declared::default();
        d.extend(Names::from(vec!["b", "_f", "a", "b"]));
        d.extend(Names::from(Name::flag("g")));
        assert_eq!(d.values, vec!["b", "a"]);
        assert_eq!(d.flags, vec!["_f", "_g"]);
        assert_eq!(d.all().collect::<Vec<_>>(), vec!["b", "a", "_f", "_g"]);
    }
}
