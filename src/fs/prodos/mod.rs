//! # ProDOS file system module
//! This manipulates disk images containing one ProDOS volume of 140K,
//! 400K, or 800K.  The catalog is a linked chain of directory blocks;
//! files are seedlings, saplings, or subdirectories.  Tree storage is
//! recognized but not read or written.
//!
//! Paths are hierarchical, `/` separated, and matched without regard
//! to case.  All block allocation goes through the volume bitmap.

pub mod types;
mod directory;

use std::collections::HashSet;
use log::{debug,warn};
use a2kit_macro::DiskStruct;

use types::*;
use directory::*;
use super::{CatalogEntry,DiskFS,FileKind,TYPE_MASK_PRODOS};
use crate::img;
use crate::{DYNERR,STDRESULT};

fn split_path(path: &str) -> (String,String) {
    let trimmed = path.trim_matches('/');
    match trimmed.rsplit_once('/') {
        Some((dir,name)) => (dir.to_string(),name.to_string()),
        None => (String::new(),trimmed.to_string())
    }
}

/// Location of a 39 byte entry within a directory chain.
struct FileSlot {
    block: usize,
    offset: usize,
    /// ordinal within the directory, the header being 0
    entry_num: usize,
    entry: FileEntry
}

/// The primary interface for ProDOS disk operations.
pub struct Disk {
    img: img::DiskImage
}

impl Disk {
    /// Create a file system using the given image as storage.
    /// The codec takes ownership of the image.
    pub fn from_img(img: img::DiskImage) -> Self {
        Self { img }
    }
    fn get_block(&mut self,block: usize) -> Result<Vec<u8>,DYNERR> {
        Ok(self.img.read_block(block)?)
    }
    fn put_block(&mut self,block: usize,dat: &[u8]) -> STDRESULT {
        Ok(self.img.write_block(block,dat)?)
    }
    fn vol_header(&mut self) -> Result<VolDirHeader,DYNERR> {
        let buf = self.get_block(VOL_KEY_BLOCK)?;
        Ok(VolDirHeader::from_bytes(&buf[4..4+ENTRY_SIZE])?)
    }
    fn total_blocks(&mut self) -> Result<usize,DYNERR> {
        let vdh = self.vol_header()?;
        Ok(u16::from_le_bytes(vdh.total_blocks) as usize)
    }
    /// Follow a directory chain, returning (block number, block bytes)
    /// pairs.  A cycle or over-long chain is a corrupt structure.
    fn get_dir_blocks(&mut self,start: usize) -> Result<Vec<(usize,Vec<u8>)>,DYNERR> {
        let mut ans = Vec::new();
        let mut visited: HashSet<usize> = HashSet::new();
        let mut block = start;
        while block != 0 {
            if !visited.insert(block) || ans.len() >= MAX_DIRECTORY_BLOCKS {
                warn!("directory chain does not terminate");
                return Err(Box::new(super::Error::CorruptStructure));
            }
            let buf = self.get_block(block)?;
            let next = u16::from_le_bytes([buf[2],buf[3]]) as usize;
            ans.push((block,buf));
            block = next;
        }
        Ok(ans)
    }
    /// All file slots of the directory starting at `start`, active or not.
    /// The header entry is not included.
    fn dir_slots(&mut self,start: usize) -> Result<Vec<FileSlot>,DYNERR> {
        let mut ans = Vec::new();
        let mut entry_num = 0;
        for (idx,(block,buf)) in self.get_dir_blocks(start)?.iter().enumerate() {
            let first = match idx { 0 => 1, _ => 0 };
            if idx == 0 {
                entry_num = 1;
            }
            for e in first..ENTRIES_PER_BLOCK {
                let offset = 4 + e*ENTRY_SIZE;
                ans.push(FileSlot {
                    block: *block,
                    offset,
                    entry_num,
                    entry: FileEntry::from_bytes(&buf[offset..offset+ENTRY_SIZE])?
                });
                entry_num += 1;
            }
        }
        Ok(ans)
    }
    fn write_slot(&mut self,slot: &FileSlot) -> STDRESULT {
        let mut buf = self.get_block(slot.block)?;
        buf[slot.offset..slot.offset+ENTRY_SIZE].copy_from_slice(&slot.entry.to_bytes());
        self.put_block(slot.block,&buf)
    }
    /// Resolve a `/` separated path to the key block of its directory.
    fn find_dir_start(&mut self,path: &str) -> Result<usize,DYNERR> {
        let mut start = VOL_KEY_BLOCK;
        for seg in path.trim_matches('/').split('/') {
            if seg.len() == 0 {
                continue;
            }
            let target = seg.to_lowercase();
            let mut found = false;
            for slot in self.dir_slots(start)? {
                if slot.entry.is_active() && slot.entry.file_type == FT_DIR && slot.entry.name() == target {
                    start = slot.entry.key_block();
                    found = true;
                    break;
                }
            }
            if !found {
                debug!("path segment {} not found",seg);
                return Err(Box::new(super::Error::FileNotFound));
            }
        }
        Ok(start)
    }
    fn named_entry(&mut self,dir_start: usize,name: &str) -> Result<FileSlot,DYNERR> {
        let target = name.to_lowercase();
        for slot in self.dir_slots(dir_start)? {
            if slot.entry.is_active() && slot.entry.name() == target {
                return Ok(slot);
            }
        }
        Err(Box::new(super::Error::FileNotFound))
    }
    /// First inactive slot of the directory, growing the chain by one
    /// block when every slot is taken.
    fn first_free_slot(&mut self,dir_start: usize) -> Result<FileSlot,DYNERR> {
        for slot in self.dir_slots(dir_start)? {
            if !slot.entry.is_active() {
                return Ok(slot);
            }
        }
        let chain = self.get_dir_blocks(dir_start)?;
        let last_block = chain[chain.len()-1].0;
        let entry_num = 1 + (chain.len()*ENTRIES_PER_BLOCK - 1);
        let new_block = self.alloc_blocks(1)?[0];
        let mut buf = vec![0;img::BLOCK_BYTES];
        buf[0..2].copy_from_slice(&u16::to_le_bytes(last_block as u16));
        self.put_block(new_block,&buf)?;
        let mut last_buf = self.get_block(last_block)?;
        last_buf[2..4].copy_from_slice(&u16::to_le_bytes(new_block as u16));
        self.put_block(last_block,&last_buf)?;
        self.set_blocks_free(&[new_block],false)?;
        Ok(FileSlot { block: new_block, offset: 4, entry_num, entry: FileEntry::new() })
    }
    fn bitmap_block(&mut self) -> Result<usize,DYNERR> {
        let vdh = self.vol_header()?;
        Ok(u16::from_le_bytes(vdh.bitmap_pointer) as usize)
    }
    fn is_free(bits: &[u8],block: usize) -> bool {
        bits[block/8] & (0x80 >> (block % 8)) != 0
    }
    fn set_blocks_free(&mut self,list: &[usize],free: bool) -> STDRESULT {
        let bm = self.bitmap_block()?;
        let mut bits = self.get_block(bm)?;
        for b in list {
            let mask = 0x80u8 >> (b % 8);
            if free {
                bits[b/8] |= mask;
            } else {
                bits[b/8] &= mask ^ 0xff;
            }
        }
        self.put_block(bm,&bits)
    }
    /// Find `count` free blocks, lowest numbered first.  The blocks are
    /// not marked used here.
    fn alloc_blocks(&mut self,count: usize) -> Result<Vec<usize>,DYNERR> {
        let total = self.total_blocks()?;
        let bm = self.bitmap_block()?;
        let bits = self.get_block(bm)?;
        let mut ans = Vec::new();
        for b in 0..total {
            if ans.len() >= count {
                break;
            }
            if Self::is_free(&bits,b) {
                ans.push(b);
            }
        }
        if ans.len() < count {
            return Err(Box::new(super::Error::NoFreeSpace));
        }
        Ok(ans)
    }
    fn file_count_delta(&mut self,dir_start: usize,delta: i32) -> STDRESULT {
        let mut buf = self.get_block(dir_start)?;
        let count = u16::from_le_bytes([buf[4+33],buf[4+34]]) as i32 + delta;
        let bytes = u16::to_le_bytes(i32::max(count,0) as u16);
        buf[4+33] = bytes[0];
        buf[4+34] = bytes[1];
        self.put_block(dir_start,&buf)
    }
    /// Gather the payload bytes of a non-directory entry.
    fn read_entry_data(&mut self,entry: &FileEntry) -> Result<Vec<u8>,DYNERR> {
        let eof = entry.eof();
        match entry.storage_type() {
            StorageType::Seedling => {
                let dat = self.get_block(entry.key_block())?;
                Ok(dat[0..usize::min(eof,dat.len())].to_vec())
            },
            StorageType::Sapling => {
                let index = self.get_block(entry.key_block())?;
                let mut dat = Vec::new();
                let mut bptr = 0;
                while dat.len() < eof && bptr < 256 {
                    let block = index[bptr] as usize + 256*index[bptr+256] as usize;
                    let mut chunk = match block {
                        0 => vec![0;img::BLOCK_BYTES], // sparse hole
                        _ => self.get_block(block)?
                    };
                    let count = usize::min(img::BLOCK_BYTES,eof - dat.len());
                    chunk.truncate(count);
                    dat.append(&mut chunk);
                    bptr += 1;
                }
                Ok(dat)
            },
            StorageType::Tree => Err(Box::new(super::Error::NotImplemented)),
            _ => Err(Box::new(super::Error::FileTypeMismatch))
        }
    }
    /// Create a blank volume on the owned image: key block at 2, three
    /// more directory blocks, bitmap at 6.
    pub fn init(&mut self,name: &str,total_blocks: usize) -> STDRESULT {
        if !is_name_valid(name) {
            return Err(Box::new(super::Error::BadName));
        }
        if total_blocks*img::BLOCK_BYTES != self.img.byte_capacity() {
            return Err(Box::new(img::Error::ImageSizeMismatch));
        }
        let mut vdh = VolDirHeader::new();
        let (nibs,vname) = string_to_file_name(StorageType::VolumeHeader,name);
        vdh.stype_and_len = nibs;
        vdh.name = vname;
        vdh.create_time = pack_time(None);
        vdh.access = ACCESS_DEFAULT;
        vdh.entry_length = ENTRY_SIZE as u8;
        vdh.entries_per_block = ENTRIES_PER_BLOCK as u8;
        vdh.file_count = [0,0];
        vdh.bitmap_pointer = u16::to_le_bytes(6);
        vdh.total_blocks = u16::to_le_bytes(total_blocks as u16);
        // four directory blocks, 2 through 5, chained both ways
        for block in 2..6 {
            let mut buf = vec![0;img::BLOCK_BYTES];
            if block > 2 {
                buf[0..2].copy_from_slice(&u16::to_le_bytes(block as u16 - 1));
            }
            if block < 5 {
                buf[2..4].copy_from_slice(&u16::to_le_bytes(block as u16 + 1));
            }
            if block == 2 {
                buf[4..4+ENTRY_SIZE].copy_from_slice(&vdh.to_bytes());
            }
            self.put_block(block,&buf)?;
        }
        let mut bits = vec![0;img::BLOCK_BYTES];
        for b in 7..total_blocks {
            bits[b/8] |= 0x80 >> (b % 8);
        }
        self.put_block(6,&bits)
    }
}

impl super::DiskFS for Disk {
    fn catalog(&mut self,path: &str,pattern: &str) -> Result<Vec<CatalogEntry>,DYNERR> {
        let re = super::wildcard_regex(match pattern.len() { 0 => "*", _ => pattern })?;
        let dir_start = self.find_dir_start(path)?;
        let mut ans = Vec::new();
        for slot in self.dir_slots(dir_start)? {
            if !slot.entry.is_active() {
                continue;
            }
            let name = slot.entry.name();
            if !re.is_match(&name) {
                continue;
            }
            let (ext,kind) = file_type_info(slot.entry.file_type);
            ans.push(CatalogEntry {
                name,
                kind: kind.to_string(),
                ext: ext.to_string(),
                type_code: TYPE_MASK_PRODOS | slot.entry.file_type as u32,
                locked: slot.entry.is_locked(),
                size_units: u16::from_le_bytes(slot.entry.blocks_used) as usize,
                created: unpack_time(slot.entry.create_time),
                modified: unpack_time(slot.entry.mod_time)
            });
        }
        Ok(ans)
    }
    fn read_file(&mut self,path: &str) -> Result<(u16,Vec<u8>),DYNERR> {
        let (dir_path,name) = split_path(path);
        let dir_start = self.find_dir_start(&dir_path)?;
        let slot = self.named_entry(dir_start,&name)?;
        let dat = self.read_entry_data(&slot.entry)?;
        Ok((slot.entry.aux(),dat))
    }
    fn write_file(&mut self,path: &str,kind: FileKind,dat: &[u8],load_addr: u16) -> Result<usize,DYNERR> {
        let (dir_path,name) = split_path(path);
        if !is_name_valid(&name) {
            return Err(Box::new(super::Error::BadName));
        }
        let dir_start = self.find_dir_start(&dir_path)?;
        let ftype = match kind {
            FileKind::Text => FT_TXT,
            FileKind::Binary => FT_BIN,
            FileKind::ApplesoftTokens => FT_APP,
            FileKind::IntegerTokens => FT_INT
        };
        let blocks_needed = usize::max(1,(dat.len() + img::BLOCK_BYTES - 1)/img::BLOCK_BYTES);
        if blocks_needed > 256 {
            debug!("{} blocks would need tree storage",blocks_needed);
            return Err(Box::new(super::Error::NotImplemented));
        }
        let storage = match blocks_needed {
            1 => StorageType::Seedling,
            _ => StorageType::Sapling
        };
        let total = blocks_needed + match storage { StorageType::Sapling => 1, _ => 0 };
        // replacing a file keeps its create time and access bits
        let mut orig_time: Option<[u8;4]> = None;
        let mut orig_access: Option<u8> = None;
        if let Ok(prior) = self.named_entry(dir_start,&name) {
            orig_time = Some(prior.entry.create_time);
            orig_access = Some(prior.entry.access);
            self.delete(path)?;
        }
        let mut slot = self.first_free_slot(dir_start)?;
        let free = self.alloc_blocks(total)?;
        match storage {
            StorageType::Seedling => {
                self.put_block(free[0],dat)?;
            },
            _ => {
                let mut index = vec![0;img::BLOCK_BYTES];
                for i in 0..blocks_needed {
                    let block = free[i+1];
                    index[i] = (block & 0xff) as u8;
                    index[i+256] = (block >> 8) as u8;
                    let chunk = &dat[i*img::BLOCK_BYTES..usize::min((i+1)*img::BLOCK_BYTES,dat.len())];
                    self.put_block(block,chunk)?;
                }
                self.put_block(free[0],&index)?;
            }
        }
        slot.entry = FileEntry::new();
        slot.entry.set_name(storage,&name);
        slot.entry.file_type = ftype;
        slot.entry.key_pointer = u16::to_le_bytes(free[0] as u16);
        slot.entry.blocks_used = u16::to_le_bytes(total as u16);
        slot.entry.set_eof(dat.len());
        slot.entry.create_time = match orig_time {
            Some(t) => t,
            None => pack_time(None)
        };
        slot.entry.mod_time = pack_time(None);
        slot.entry.access = match orig_access {
            Some(a) if a != 0 => a,
            _ => ACCESS_DEFAULT
        };
        slot.entry.aux_type = u16::to_le_bytes(load_addr);
        slot.entry.header_pointer = u16::to_le_bytes(dir_start as u16);
        self.write_slot(&slot)?;
        self.file_count_delta(dir_start,1)?;
        self.set_blocks_free(&free,false)?;
        Ok(total)
    }
    fn delete(&mut self,path: &str) -> STDRESULT {
        let (dir_path,name) = split_path(path);
        let dir_start = self.find_dir_start(&dir_path)?;
        let mut slot = self.named_entry(dir_start,&name)?;
        if slot.entry.access & ACCESS_DESTROY == 0 {
            return Err(Box::new(super::Error::PermissionDenied));
        }
        if slot.entry.access & ACCESS_WRITE == 0 {
            return Err(Box::new(super::Error::WriteProtected));
        }
        match slot.entry.storage_type() {
            StorageType::Seedling => {
                self.set_blocks_free(&[slot.entry.key_block()],true)?;
            },
            StorageType::Sapling => {
                let index = self.get_block(slot.entry.key_block())?;
                let mut remove = vec![slot.entry.key_block()];
                for i in 0..256 {
                    let block = index[i] as usize + 256*index[i+256] as usize;
                    if block != 0 {
                        remove.push(block);
                    }
                }
                self.set_blocks_free(&remove,true)?;
            },
            StorageType::SubDirEntry => {
                // empty the subdirectory first, then free its chain
                let children: Vec<(String,StorageType)> = self.dir_slots(slot.entry.key_block())?
                    .iter().filter(|s| s.entry.is_active())
                    .map(|s| (s.entry.name(),s.entry.storage_type()))
                    .collect();
                for (child,storage) in children {
                    if storage == StorageType::Tree {
                        return Err(Box::new(super::Error::NotImplemented));
                    }
                    self.delete(&format!("{}/{}",path.trim_matches('/'),child))?;
                }
                let chain: Vec<usize> = self.get_dir_blocks(slot.entry.key_block())?
                    .iter().map(|(b,_)| *b).collect();
                self.set_blocks_free(&chain,true)?;
            },
            StorageType::Tree => {
                return Err(Box::new(super::Error::NotImplemented));
            },
            _ => {
                return Err(Box::new(super::Error::FileNotFound));
            }
        }
        slot.entry.set_storage_type(StorageType::Inactive);
        self.write_slot(&slot)?;
        self.file_count_delta(dir_start,-1)
    }
    fn rename(&mut self,path: &str,new_name: &str) -> STDRESULT {
        let (dir_path,name) = split_path(path);
        if !is_name_valid(new_name) {
            return Err(Box::new(super::Error::BadName));
        }
        let dir_start = self.find_dir_start(&dir_path)?;
        let mut slot = self.named_entry(dir_start,&name)?;
        if slot.entry.access & ACCESS_RENAME == 0 {
            return Err(Box::new(super::Error::PermissionDenied));
        }
        if self.named_entry(dir_start,new_name).is_ok() {
            return Err(Box::new(super::Error::DuplicateName));
        }
        let storage = slot.entry.storage_type();
        slot.entry.set_name(storage,new_name);
        self.write_slot(&slot)
    }
    fn lock(&mut self,path: &str) -> STDRESULT {
        let (dir_path,name) = split_path(path);
        let dir_start = self.find_dir_start(&dir_path)?;
        let mut slot = self.named_entry(dir_start,&name)?;
        slot.entry.set_locked(true);
        self.write_slot(&slot)
    }
    fn unlock(&mut self,path: &str) -> STDRESULT {
        let (dir_path,name) = split_path(path);
        let dir_start = self.find_dir_start(&dir_path)?;
        let mut slot = self.named_entry(dir_start,&name)?;
        slot.entry.set_locked(false);
        self.write_slot(&slot)
    }
    fn create_dir(&mut self,path: &str) -> STDRESULT {
        let (dir_path,name) = split_path(path);
        if !is_name_valid(&name) {
            return Err(Box::new(super::Error::BadName));
        }
        let dir_start = self.find_dir_start(&dir_path)?;
        if self.named_entry(dir_start,&name).is_ok() {
            return Err(Box::new(super::Error::DuplicateName));
        }
        let mut slot = self.first_free_slot(dir_start)?;
        let free = self.alloc_blocks(1)?;
        // the subdirectory's own header block
        let mut header = SubDirHeader::new();
        let (nibs,hname) = string_to_file_name(StorageType::SubDirHeader,&name);
        header.stype_and_len = nibs;
        header.name = hname;
        header.pad[0] = 0x75;
        header.create_time = pack_time(None);
        header.access = ACCESS_DEFAULT;
        header.entry_length = ENTRY_SIZE as u8;
        header.entries_per_block = ENTRIES_PER_BLOCK as u8;
        header.parent_pointer = u16::to_le_bytes(dir_start as u16);
        header.parent_entry = slot.entry_num as u8;
        header.parent_entry_length = ENTRY_SIZE as u8;
        header.version = 0x23;
        let mut buf = vec![0;img::BLOCK_BYTES];
        buf[4..4+ENTRY_SIZE].copy_from_slice(&header.to_bytes());
        self.put_block(free[0],&buf)?;
        // the entry that owns it
        slot.entry = FileEntry::new();
        slot.entry.set_name(StorageType::SubDirEntry,&name);
        slot.entry.file_type = FT_DIR;
        slot.entry.key_pointer = u16::to_le_bytes(free[0] as u16);
        slot.entry.blocks_used = u16::to_le_bytes(1);
        slot.entry.set_eof(img::BLOCK_BYTES);
        slot.entry.create_time = pack_time(None);
        slot.entry.mod_time = pack_time(None);
        slot.entry.access = ACCESS_DEFAULT | ACCESS_CHANGED;
        slot.entry.header_pointer = u16::to_le_bytes(dir_start as u16);
        slot.entry.version = 0x23;
        self.write_slot(&slot)?;
        self.file_count_delta(dir_start,1)?;
        self.set_blocks_free(&free,false)
    }
    fn set_volume_name(&mut self,name: &str) -> STDRESULT {
        if !is_name_valid(name) {
            return Err(Box::new(super::Error::BadName));
        }
        let mut buf = self.get_block(VOL_KEY_BLOCK)?;
        let (nibs,vname) = string_to_file_name(StorageType::VolumeHeader,name);
        buf[4] = nibs;
        buf[5..20].copy_from_slice(&vname);
        self.put_block(VOL_KEY_BLOCK,&buf)
    }
    fn used_bitmap(&mut self) -> Result<Vec<bool>,DYNERR> {
        let total = self.total_blocks()?;
        let bm = self.bitmap_block()?;
        let bits = self.get_block(bm)?;
        let mut map = vec![false;total];
        for b in 0..total {
            map[b] = !Self::is_free(&bits,b);
        }
        Ok(map)
    }
    fn get_img(&mut self) -> &mut img::DiskImage {
        &mut self.img
    }
}
