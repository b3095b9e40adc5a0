use crate::config::{ArchiveConfig, DEFAULT_GZIP_LEVEL};

/// Opciones de guardado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    pub overwrite: bool,
    pub compress: bool,
    pub gzip_level: u32,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { overwrite: false,
               compress: false,
               gzip_level: DEFAULT_GZIP_LEVEL }
    }
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Valores por defecto tomados de `ArchiveConfig::from_env()`.
    pub fn from_env() -> Self {
        Self::from(ArchiveConfig::from_env())
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn gzip_level(mut self, level: u32) -> Self {
        self.gzip_level = level.min(9);
        self
    }
}

impl From<ArchiveConfig> for SaveOptions {
    fn from(config: ArchiveConfig) -> Self {
        Self { overwrite: config.overwrite,
               compress: config.compress,
               gzip_level: config.gzip_level }
    }
}

/// Opciones de carga selectiva.
///
/// `select` y `exclude` son excluyentes entre sí.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub metadata_only: bool,
    pub select: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sólo metadata: ningún resultado se decodifica.
    pub fn metadata_only(mut self) -> Self {
        self.metadata_only = true;
        self
    }

    pub fn select<I, S>(mut self, names: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.select = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.exclude = Some(names.into_iter().map(Into::into).collect());
        self
    }
}
