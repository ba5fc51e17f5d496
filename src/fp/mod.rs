//! # Fingerprint Module
//!
//! The `Disk` struct here is the persisted record of one disk image: its
//! whole-disk and active-sector hashes, the per-sector hash lists, and
//! the file catalog with per-file hashes.  `builder` constructs the
//! record by walking a file system; `store` persists it.
//!
//! Records are encoded with MessagePack, which is self describing, so
//! future fields must extend at the end of each struct.

pub mod builder;
pub mod store;

use serde::{Serialize,Deserialize};
use md5::{Md5,Digest};
use chrono::NaiveDateTime;
use crate::DYNERR;

pub const ARTIFACT_EXT: &str = "fgp";

/// Strip colons (Windows drive letters) and normalize separators so a
/// source path can live inside the datastore tree.
pub fn normalize_path(p: &str) -> String {
    p.replace(":","").replace("\\","/")
}

/// One sector's identity within a fingerprint.
#[derive(Serialize,Deserialize,Clone,Default)]
pub struct DiskSector {
    pub track: usize,
    pub sector: usize,
    pub sha256: String,
    /// raw bytes, captured only under the sector-data ingest mode
    pub data: Option<Vec<u8>>
}

/// One file's identity within a fingerprint.
#[derive(Serialize,Deserialize,Clone,Default)]
pub struct DiskFile {
    pub name: String,
    pub kind: String,
    pub ext: String,
    /// family mask | native type byte
    pub type_code: u32,
    pub sha256: String,
    pub size: usize,
    pub load_address: u16,
    pub locked: bool,
    /// rendered text, captured only under the text ingest mode
    pub text: Option<Vec<u8>>,
    /// raw payload, captured only under the text ingest mode
    pub data: Option<Vec<u8>>,
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>
}

impl DiskFile {
    /// name as used for extraction, e.g. `chess#0x0801.BIN`
    pub fn adorned_name(&self) -> String {
        format!("{}#0x{:04x}.{}",self.name,self.load_address,self.ext)
    }
}

/// The fingerprint of one disk image.
#[derive(Serialize,Deserialize,Clone,Default)]
pub struct Disk {
    pub full_path: String,
    pub file_name: String,
    /// SHA-256 of the whole image
    pub sha256: String,
    /// SHA-256 of the used sectors concatenated in track-major order
    pub sha256_active: String,
    pub format: String,
    pub format_id: u32,
    /// used flag per sector slot (track major) or block
    pub bitmap: Vec<bool>,
    pub tracks: usize,
    pub sectors: usize,
    pub blocks: usize,
    pub files: Vec<DiskFile>,
    pub active_sectors: Vec<DiskSector>,
    pub inactive_sectors: Vec<DiskSector>,
    pub ingest_mode: u8
}

impl Disk {
    /// The artifact file name encodes format, both hashes, and the MD5
    /// of the source base name, so that any of them can be queried by
    /// name alone.
    pub fn artifact_name(&self) -> String {
        let digest = Md5::digest(self.file_name.as_bytes());
        format!("{}_{}_{}_{}.{}",self.format_id,self.sha256,self.sha256_active,hex::encode(digest),ARTIFACT_EXT)
    }
    /// Directory of the artifact relative to the store root: the source
    /// disk's directory, normalized and trimmed.
    pub fn mirror_dir(&self) -> String {
        let cleaned = normalize_path(&self.full_path);
        match cleaned.rsplit_once('/') {
            Some((dir,_base)) => dir.trim_matches('/').to_string(),
            None => String::new()
        }
    }
    pub fn to_bytes(&self) -> Result<Vec<u8>,DYNERR> {
        Ok(rmp_serde::to_vec(self)?)
    }
    pub fn from_bytes(dat: &[u8]) -> Result<Self,DYNERR> {
        Ok(rmp_serde::from_slice(dat)?)
    }
    /// map from file hash to file, the identity used by file comparisons
    pub fn file_map(&self) -> std::collections::HashMap<String,&DiskFile> {
        let mut ans = std::collections::HashMap::new();
        for f in &self.files {
            ans.insert(f.sha256.clone(),f);
        }
        ans
    }
    pub fn find_file(&self,name: &str) -> Option<&DiskFile> {
        let target = name.to_lowercase();
        self.files.iter().find(|f| f.name.to_lowercase() == target)
    }
}
