//! Constantes del core.
//!
//! `ENGINE_VERSION` entra en el hash de definición del registry, de modo que
//! un cambio incompatible del motor invalida los hashes persistidos aunque
//! los steps no cambien.

/// Versión lógica del motor.
pub const ENGINE_VERSION: &str = "L1.0";

/// Prefijo que marca un nombre como flag (dependencia booleana sin payload).
pub const FLAG_PREFIX: char = '_';

/// Parámetros de control consumidos por el wrapper; nunca llegan al cuerpo.
pub const FORCE_PARAM: &str = "force";
pub const PANIC_ON_EXISTING_PARAM: &str = "panic_on_existing";
