//! Configuración por defecto del guardado de archivos desde variables de entorno.
//!
//! - `LEDGERFLOW_ARCHIVE_COMPRESS`: comprimir con gzip (`true`/`1`/`yes`).
//! - `LEDGERFLOW_ARCHIVE_GZIP_LEVEL`: nivel 0-9 (por defecto 6).
//! - `LEDGERFLOW_ARCHIVE_OVERWRITE`: permitir sobrescribir un archivo existente.

use std::env;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv();
});

pub const DEFAULT_GZIP_LEVEL: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveConfig {
    pub compress: bool,
    pub gzip_level: u32,
    pub overwrite: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self { compress: false,
               gzip_level: DEFAULT_GZIP_LEVEL,
               overwrite: false }
    }
}

impl ArchiveConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let compress = env::var("LEDGERFLOW_ARCHIVE_COMPRESS").ok().map(|v| parse_flag(&v)).unwrap_or(false);
        let overwrite = env::var("LEDGERFLOW_ARCHIVE_OVERWRITE").ok().map(|v| parse_flag(&v)).unwrap_or(false);
        let gzip_level = env::var("LEDGERFLOW_ARCHIVE_GZIP_LEVEL").ok()
                                                                  .and_then(|v| v.trim().parse::<u32>().ok())
                                                                  .map(|l| l.min(9))
                                                                  .unwrap_or(DEFAULT_GZIP_LEVEL);
        Self { compress,
               gzip_level,
               overwrite }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
