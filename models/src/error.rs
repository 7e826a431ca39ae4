use std::path::PathBuf;
use thiserror::Error;

/// 플로피 이미지 파이프라인의 모든 크레이트가 공유하는 에러 타입
#[derive(Error, Debug)]
pub enum FloppyError {
    #[error("invalid geometry: {reason}")]
    Config { reason: String },

    #[error("boot code is {len} bytes but at most {max} fit in the boot sector")]
    BootCodeTooLarge { len: usize, max: usize },

    #[error("FAT needs {needed} bytes but each copy only holds {capacity}")]
    FatOverflow { needed: usize, capacity: usize },

    #[error("cannot allocate {requested} clusters, only {available} left in the data region")]
    OutOfSpace { requested: u32, available: u32 },

    #[error("root directory is full ({capacity} entries)")]
    RootDirectoryFull { capacity: u16 },

    #[error("'{name}' does not fit an 8.3 short name")]
    NameTooLong { name: String },

    #[error("'{name}' is not a usable short name: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("'{name}' is {len} bytes, larger than a FAT file size can record")]
    FileTooLarge { name: String, len: usize },

    #[error("timestamp {0} is outside the FAT date range (1980-2107)")]
    TimestampOutOfRange(String),

    #[error("payload '{}' could not be read: {source}", path.display())]
    MissingInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("boot code '{}' could not be read: {source}", path.display())]
    MissingBootCode {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing failed for '{structure}': {details}")]
    ParseError { structure: String, details: String },
}

impl FloppyError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config { reason: reason.into() }
    }

    pub fn parse(structure: impl Into<String>, details: impl Into<String>) -> Self {
        Self::ParseError {
            structure: structure.into(),
            details: details.into(),
        }
    }
}
