pub mod error;
pub mod config;
pub mod geometry;
pub mod fat;
pub mod boot;
pub mod dirent;

pub use error::FloppyError;
pub use config::{FloppyConfig, NameMode, VolumeMetadata};
pub use geometry::Geometry;
pub use boot::BootSector;
pub use dirent::{DirEntry, FatTimestamp};
