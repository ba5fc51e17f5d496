//! # RDOS file system module
//! Reads disk images written by SSI's RDOS, which keeps a flat catalog of
//! 32 byte entries on track 1.  Files are contiguous runs of linearly
//! numbered sectors.  Three variants exist, differing in the physical
//! sector count and interleave; the format identifier distinguishes them
//! by signature and stride.
//!
//! RDOS disks are cataloged and read; this module does not write them.

pub mod types;

use a2kit_macro::DiskStruct;
use a2kit_macro::DiskStructError;
use a2kit_macro_derive::DiskStruct;

use types::*;
use super::{CatalogEntry,FileKind,TYPE_MASK_RDOS};
use crate::img;
use crate::{DYNERR,STDRESULT};

#[derive(DiskStruct,Clone,Copy)]
pub struct FileEntry {
    pub name: [u8;24],
    pub type_char: u8,
    pub num_sectors: u8,
    pub load_addr: [u8;2],
    pub length: [u8;2],
    pub start_sector: [u8;2]
}

impl FileEntry {
    pub fn is_unused(&self) -> bool {
        self.type_char == 0x00
    }
    pub fn is_deleted(&self) -> bool {
        self.type_char == 0xa0 || self.name[0] == 0x80
    }
    pub fn name(&self) -> String {
        let mut s = String::new();
        for b in self.name {
            let ch = b & 0x7f;
            if ch == 0 {
                break;
            }
            s.push(ch as char);
        }
        s.trim_end().to_lowercase()
    }
    pub fn start(&self) -> usize {
        u16::from_le_bytes(self.start_sector) as usize
    }
    pub fn count(&self) -> usize {
        self.num_sectors as usize
    }
    pub fn byte_length(&self) -> usize {
        u16::from_le_bytes(self.length) as usize
    }
}

/// The primary interface for RDOS disk operations.
pub struct Disk {
    img: img::DiskImage
}

impl Disk {
    /// Create a file system using the given image as storage.
    /// The codec takes ownership of the image.
    pub fn from_img(img: img::DiskImage) -> Self {
        Self { img }
    }
    fn get_catalog(&mut self) -> Result<Vec<FileEntry>,DYNERR> {
        let mut catdata = Vec::new();
        for s in 0..CATALOG_SECTORS {
            self.img.seek(CATALOG_TRACK,s)?;
            catdata.append(&mut self.img.read()?);
        }
        let mut ans = Vec::new();
        let mut ptr = 0;
        while ptr + ENTRY_SIZE <= catdata.len() {
            let entry = FileEntry::from_bytes(&catdata[ptr..ptr+ENTRY_SIZE])?;
            ptr += ENTRY_SIZE;
            if entry.is_unused() {
                break;
            }
            if !entry.is_deleted() {
                ans.push(entry);
            }
        }
        Ok(ans)
    }
    fn named_entry(&mut self,name: &str) -> Result<FileEntry,DYNERR> {
        let target = name.to_lowercase();
        for entry in self.get_catalog()? {
            if entry.name() == target {
                return Ok(entry);
            }
        }
        Err(Box::new(super::Error::FileNotFound))
    }
}

impl super::DiskFS for Disk {
    fn catalog(&mut self,_path: &str,pattern: &str) -> Result<Vec<CatalogEntry>,DYNERR> {
        let re = super::wildcard_regex(match pattern.len() { 0 => "*", _ => pattern })?;
        let mut ans = Vec::new();
        for entry in self.get_catalog()? {
            let name = entry.name();
            if !re.is_match(&name) {
                continue;
            }
            let code = type_code_from_char(entry.type_char);
            let (ext,kind) = file_type_info(code);
            ans.push(CatalogEntry {
                name,
                kind: kind.to_string(),
                ext: ext.to_string(),
                type_code: TYPE_MASK_RDOS | code as u32,
                locked: true,
                size_units: entry.count(),
                created: None,
                modified: None
            });
        }
        Ok(ans)
    }
    fn read_file(&mut self,path: &str) -> Result<(u16,Vec<u8>),DYNERR> {
        let entry = self.named_entry(path)?;
        let spt = self.img.fmt().usable_sectors();
        let total = self.img.fmt().tracks() * spt;
        let size = entry.byte_length();
        if entry.start() + entry.count() > total {
            // run goes off the disk, treat the file as empty
            return Ok((0,Vec::new()));
        }
        let mut dat = Vec::new();
        for sec in entry.start()..entry.start() + entry.count() {
            if dat.len() >= size {
                break;
            }
            self.img.seek(sec/spt,sec%spt)?;
            let mut chunk = self.img.read()?;
            chunk.truncate(usize::min(256,size - dat.len()));
            dat.append(&mut chunk);
        }
        Ok((u16::from_le_bytes(entry.load_addr),dat))
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
        let spt = self.img.fmt().usable_sectors();
        let total = self.img.fmt().tracks() * spt;
        let mut map = vec![false;total];
        for entry in self.get_catalog()? {
            if entry.start() + entry.count() > total {
                continue; // run is bad
            }
            for sec in entry.start()..entry.start() + entry.count() {
                map[sec] = true;
            }
        }
        Ok(map)
    }
    fn get_img(&mut self) -> &mut img::DiskImage {
        &mut self.img
    }
}
