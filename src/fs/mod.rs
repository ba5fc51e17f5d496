//! # File System Module
//!
//! This is a container for file system modules.  File system modules
//! handle interactions with catalogs and files on top of the sector
//! engine.  Every codec takes ownership of a `img::DiskImage` and exposes
//! the same operation set through the `DiskFS` trait; the orchestrator
//! dispatches on the identified format to pick the codec.
//!
//! Changes made through a codec are applied to the in-memory image only.
//! They become permanent when the image is written back to the host file
//! system.

pub mod dos3x;
pub mod prodos;
pub mod pascal;
pub mod rdos;

use chrono::NaiveDateTime;
use crate::img;
use crate::{DYNERR,STDRESULT};

/// Errors shared by all file system codecs.  Codecs may also surface
/// their own error sets, e.g. DOS message strings.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("file system could not be matched")]
    FileSystemMismatch,
    #[error("file not found")]
    FileNotFound,
    #[error("directory structure is corrupt")]
    CorruptStructure,
    #[error("permission denied")]
    PermissionDenied,
    #[error("no free space")]
    NoFreeSpace,
    #[error("operation not implemented for this file system")]
    NotImplemented,
    #[error("file type mismatch")]
    FileTypeMismatch,
    #[error("name already exists")]
    DuplicateName,
    #[error("name is not valid for this file system")]
    BadName,
    #[error("write protected")]
    WriteProtected
}

/// High byte of a descriptor type code selects the file system family,
/// low byte carries the native type value.
pub const TYPE_MASK_APPLEDOS: u32 = 0x0000;
pub const TYPE_MASK_PRODOS: u32 = 0x0100;
pub const TYPE_MASK_PASCAL: u32 = 0x0200;
pub const TYPE_MASK_RDOS: u32 = 0x0300;

/// Payload kinds a caller can hand to `write_file`.  Each codec maps
/// these onto its native type byte.
#[derive(PartialEq,Eq,Clone,Copy,Debug)]
pub enum FileKind {
    Text,
    Binary,
    ApplesoftTokens,
    IntegerTokens
}

/// One catalog line, as reported by any codec.
#[derive(Clone,Debug)]
pub struct CatalogEntry {
    /// unadorned lower case name; subdirectory members carry their path
    pub name: String,
    /// human readable native type
    pub kind: String,
    /// conventional extension for the native type
    pub ext: String,
    /// family mask | native type byte
    pub type_code: u32,
    pub locked: bool,
    /// size in the units the catalog reports, sectors or blocks
    pub size_units: usize,
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>
}

impl CatalogEntry {
    pub fn is_directory(&self) -> bool {
        self.type_code == TYPE_MASK_PRODOS | 0x0f
    }
}

/// The uniform operation set over any supported file system.
/// Paths are only hierarchical for ProDOS; the other codecs treat the
/// path as a bare file name.
pub trait DiskFS {
    /// List catalog entries under `path` matching the wildcard `pattern`
    /// (`*` and `?`); empty pattern matches everything.
    fn catalog(&mut self,path: &str,pattern: &str) -> Result<Vec<CatalogEntry>,DYNERR>;
    /// Read a file's payload with its native type header stripped.
    /// Returns (load address, payload).
    fn read_file(&mut self,path: &str) -> Result<(u16,Vec<u8>),DYNERR>;
    /// Write a payload under the native type for `kind`.  An existing
    /// file of the same name is replaced.  Returns sectors or blocks used.
    fn write_file(&mut self,path: &str,kind: FileKind,dat: &[u8],load_addr: u16) -> Result<usize,DYNERR>;
    fn delete(&mut self,path: &str) -> STDRESULT;
    fn rename(&mut self,path: &str,new_name: &str) -> STDRESULT;
    fn lock(&mut self,path: &str) -> STDRESULT;
    fn unlock(&mut self,path: &str) -> STDRESULT;
    /// Create a subdirectory; only meaningful on ProDOS.
    fn create_dir(&mut self,path: &str) -> STDRESULT;
    /// Change the volume name (ProDOS) or volume number (DOS).
    fn set_volume_name(&mut self,name: &str) -> STDRESULT;
    /// One flag per sector slot (track major) or block, true if the file
    /// system counts it as used.
    fn used_bitmap(&mut self) -> Result<Vec<bool>,DYNERR>;
    fn get_img(&mut self) -> &mut img::DiskImage;
}

/// Compile a catalog wildcard into an anchored case-insensitive regex.
pub fn wildcard_regex(pattern: &str) -> Result<regex::Regex,DYNERR> {
    let tmp = pattern.replace(".","[.]").replace("*",".*").replace("?",".");
    Ok(regex::Regex::new(&format!("(?i)^{}$",tmp))?)
}
