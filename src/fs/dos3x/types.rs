use num_derive::FromPrimitive;
use std::str::FromStr;

pub const VTOC_TRACK: usize = 17;
pub const MAX_DIRECTORY_REPS: usize = 100;
pub const MAX_TSLIST_REPS: usize = 1000;
/// 15 catalog sectors of 7 entries
pub const MAX_CATALOG_ENTRIES: usize = 105;

/// Enumerates DOS errors.  The `Display` trait will print the equivalent
/// DOS message such as `FILE NOT FOUND`.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("RANGE ERROR")]
    Range,
    #[error("END OF DATA")]
    EndOfData,
    #[error("FILE NOT FOUND")]
    FileNotFound,
    #[error("I/O ERROR")]
    IOError,
    #[error("DISK FULL")]
    DiskFull,
    #[error("FILE LOCKED")]
    FileLocked,
    #[error("FILE TYPE MISMATCH")]
    FileTypeMismatch,
    #[error("WRITE PROTECTED")]
    WriteProtected,
    #[error("SYNTAX ERROR")]
    SyntaxError
}

/// One-hot DOS file types, low 7 bits of the catalog type byte.
/// The high bit is the lock flag and is not part of the type.
#[derive(FromPrimitive,PartialEq,Eq,Clone,Copy,Debug)]
pub enum FileType {
    Text = 0x00,
    Integer = 0x01,
    Applesoft = 0x02,
    Binary = 0x04,
    TypeS = 0x08,
    Relocatable = 0x10,
    TypeA = 0x20,
    TypeB = 0x40
}

impl FileType {
    pub fn ext(&self) -> &'static str {
        match self {
            Self::Text => "TXT",
            Self::Integer => "INT",
            Self::Applesoft => "BAS",
            Self::Binary => "BIN",
            Self::TypeS => "S",
            Self::Relocatable => "REL",
            Self::TypeA => "A",
            Self::TypeB => "B"
        }
    }
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Text => "ASCII Text",
            Self::Integer => "Integer Basic Program",
            Self::Applesoft => "Applesoft Basic Program",
            Self::Binary => "Binary File",
            Self::TypeS => "S File Type",
            Self::Relocatable => "Relocatable Object Code",
            Self::TypeA => "A File Type",
            Self::TypeB => "B File Type"
        }
    }
}

impl FromStr for FileType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self,Self::Err> {
        match s.to_uppercase().as_str() {
            "TXT" => Ok(Self::Text),
            "INT" => Ok(Self::Integer),
            "BAS" => Ok(Self::Applesoft),
            "BIN" => Ok(Self::Binary),
            "S" => Ok(Self::TypeS),
            "REL" => Ok(Self::Relocatable),
            "A" => Ok(Self::TypeA),
            "B" => Ok(Self::TypeB),
            _ => Err(Error::FileTypeMismatch)
        }
    }
}
