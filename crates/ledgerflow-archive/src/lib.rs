//! ledgerflow-archive: persistencia de corridas en un contenedor tar
//! autodescriptivo (`.yax` / `.yax.gz`) con codecs por valor y carga
//! selectiva.
pub mod codec;
pub mod config;
pub mod error;
pub mod ext;
pub mod format;
pub mod loaders;
pub mod options;
pub mod portable;
pub mod reader;
pub mod writer;

pub use codec::{Codec, CodecError, CodecMetadata, CodecRegistry};
pub use config::{init_dotenv, ArchiveConfig};
pub use error::ArchiveError;
pub use ext::ArchiveExt;
pub use loaders::{is_archive, load, load_portable, Loaded};
pub use options::{LoadOptions, SaveOptions};
pub use portable::Portable;
pub use reader::{read_archive, ArchiveContents};
pub use writer::save;
