//! # Pascal file system module
//! Reads disk images containing one UCSD Pascal volume.  Each file is a
//! contiguous block extent `[begin, end)`; the last block is partially
//! filled.  The catalog starts at block 2.
//!
//! Pascal volumes are cataloged and read; this module does not write
//! them.  Files report as locked.

pub mod types;
mod directory;

use log::warn;
use a2kit_macro::DiskStruct;

use types::*;
use directory::*;
use super::{CatalogEntry,FileKind,TYPE_MASK_PASCAL};
use crate::img;
use crate::{DYNERR,STDRESULT};

/// The primary interface for Pascal disk operations.
pub struct Disk {
    img: img::DiskImage
}

impl Disk {
    /// Create a file system using the given image as storage.
    /// The codec takes ownership of the image.
    pub fn from_img(img: img::DiskImage) -> Self {
        Self { img }
    }
    /// Read the whole catalog: header plus packed entries, which may
    /// cross block boundaries.
    fn get_directory(&mut self) -> Result<(VolDirHeader,Vec<DirectoryEntry>),DYNERR> {
        let key = self.img.read_block(VOL_KEY_BLOCK)?;
        let header = VolDirHeader::from_bytes(&key[0..ENTRY_SIZE])?;
        let end = u16::from_le_bytes(header.end_block) as usize;
        if end <= VOL_KEY_BLOCK || end - VOL_KEY_BLOCK > OVERSIZE_DIR {
            warn!("directory spans {} blocks, calling it corrupt",end as i64 - VOL_KEY_BLOCK as i64);
            return Err(Box::new(super::Error::CorruptStructure));
        }
        let mut catdata = key;
        for block in VOL_KEY_BLOCK+1..end {
            catdata.append(&mut self.img.read_block(block)?);
        }
        let num_files = u16::from_le_bytes(header.num_files) as usize;
        let mut entries = Vec::new();
        let mut ptr = ENTRY_SIZE;
        for _i in 0..num_files {
            if ptr + ENTRY_SIZE > catdata.len() {
                break;
            }
            entries.push(DirectoryEntry::from_bytes(&catdata[ptr..ptr+ENTRY_SIZE])?);
            ptr += ENTRY_SIZE;
        }
        Ok((header,entries))
    }
    fn named_entry(&mut self,name: &str) -> Result<DirectoryEntry,DYNERR> {
        let target = name.to_lowercase();
        let (_header,entries) = self.get_directory()?;
        for entry in entries {
            if entry.name() == target {
                return Ok(entry);
            }
        }
        Err(Box::new(super::Error::FileNotFound))
    }
    pub fn volume_name(&mut self) -> Result<String,DYNERR> {
        let (header,_entries) = self.get_directory()?;
        let len = (header.name_len & 0x07) as usize;
        Ok(crate::escaped_ascii_from_bytes(&header.name[0..len],true,false))
    }
}

impl super::DiskFS for Disk {
    fn catalog(&mut self,_path: &str,pattern: &str) -> Result<Vec<CatalogEntry>,DYNERR> {
        let re = super::wildcard_regex(match pattern.len() { 0 => "*", _ => pattern })?;
        let (_header,entries) = self.get_directory()?;
        let mut ans = Vec::new();
        for entry in entries {
            let name = entry.name();
            if !re.is_match(&name) {
                continue;
            }
            let ftype = u16::from_le_bytes(entry.file_type);
            let (ext,kind) = file_type_info(ftype);
            ans.push(CatalogEntry {
                name,
                kind: kind.to_string(),
                ext: ext.to_string(),
                type_code: TYPE_MASK_PASCAL | (ftype & 0xff) as u32,
                locked: true,
                size_units: match entry.end() > entry.begin() { true => entry.end() - entry.begin(), false => 0 },
                created: None,
                modified: None
            });
        }
        Ok(ans)
    }
    fn read_file(&mut self,path: &str) -> Result<(u16,Vec<u8>),DYNERR> {
        let entry = self.named_entry(path)?;
        let total = self.img.fmt().blocks();
        let size = entry.file_size();
        if entry.end() > total || entry.end() < entry.begin() {
            // extent runs off the volume, treat the file as empty
            return Ok((0,Vec::new()));
        }
        let mut dat = Vec::new();
        for block in entry.begin()..entry.end() {
            if dat.len() >= size {
                break;
            }
            let mut chunk = self.img.read_block(block)?;
            chunk.truncate(usize::min(512,size - dat.len()));
            dat.append(&mut chunk);
        }
        Ok((0,dat))
    }
    fn write_file(&mut self,_path: &str,_kind: FileKind,_dat: &[u8],_load_addr: u16) -> Result<usize,DYNERR> {
        Err(Box::new(super::Error::NotImplemented))
    }
    fn delete(&mut self,_path: &str) -> STDRESULT {
        Err(Box::new(super::Error::NotImplemented))
    }
    fn rename(&mut self,_path: &str,_new_name: &str) -> STDRESULT {
        Err(Box::new(super::Error::NotImplemented))
    }
    fn lock(&mut self,_path: &str) -> STDRESULT {
        Err(Box::new(super::Error::NotImplemented))
    }
    fn unlock(&mut self,_path: &str) -> STDRESULT {
        Err(Box::new(super::Error::NotImplemented))
    }
    fn create_dir(&mut self,_path: &str) -> STDRESULT {
        Err(Box::new(super::Error::NotImplemented))
    }
    fn set_volume_name(&mut self,_name: &str) -> STDRESULT {
        Err(Box::new(super::Error::NotImplemented))
    }
    fn used_bitmap(&mut self) -> Result<Vec<bool>,DYNERR> {
        let total = self.img.fmt().blocks();
        let mut map = vec![false;total];
        let (_header,entries) = self.get_directory()?;
        for entry in entries {
            if entry.end() > total || entry.end() < entry.begin() {
                continue; // extent is bad
            }
            for block in entry.begin()..entry.end() {
                map[block] = true;
            }
        }
        Ok(map)
    }
    fn get_img(&mut self) -> &mut img::DiskImage {
        &mut self.img
    }
}
