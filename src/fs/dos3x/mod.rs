//! # DOS 3.x file system module
//! This manipulates disk images containing one standard DOS 3.2 or 3.3
//! volume.  Operations go through the `DiskFS` trait; the catalog lives
//! on the VTOC track and files are chains of track/sector pairs.
//!
//! The module keeps no copy of the VTOC; every operation reads it from
//! the image and publishes it back, so the image is always the truth.

pub mod types;
mod directory;

use std::collections::HashSet;
use num_traits::FromPrimitive;
use a2kit_macro::DiskStruct;
use log::{debug,warn};

use types::*;
use directory::*;
use super::{CatalogEntry,DiskFS,FileKind,TYPE_MASK_APPLEDOS};
use crate::img;
use crate::{DYNERR,STDRESULT};

fn file_name_to_string(fname: [u8;30]) -> String {
    // fname is negative ASCII padded to the end with spaces
    String::from(crate::escaped_ascii_from_bytes(&fname,true,true).trim_end()).to_lowercase()
}

fn string_to_file_name(s: &str) -> [u8;30] {
    let mut ans: [u8;30] = [0xa0;30]; // fill with negative spaces
    let encoded = crate::parse_escaped_ascii(s,true,true);
    for i in 0..30 {
        if i < encoded.len() {
            ans[i] = encoded[i];
        }
    }
    return ans;
}

/// Location of a 35 byte entry within the catalog chain.
#[derive(Clone,Copy)]
struct EntrySlot {
    ts: [usize;2],
    slot: usize
}

/// The primary interface for DOS 3.x disk operations.
pub struct Disk {
    img: img::DiskImage
}

impl Disk {
    /// Create a file system using the given image as storage.
    /// The codec takes ownership of the image.
    pub fn from_img(img: img::DiskImage) -> Self {
        Self { img }
    }
    fn get_vtoc(&mut self) -> Result<VTOC,DYNERR> {
        self.img.seek(VTOC_TRACK,0)?;
        Ok(VTOC::from_bytes(&self.img.read()?)?)
    }
    fn save_vtoc(&mut self,vtoc: &VTOC) -> STDRESULT {
        self.img.seek(VTOC_TRACK,0)?;
        self.img.write(&vtoc.to_bytes())?;
        Ok(())
    }
    fn read_sector(&mut self,ts: [usize;2]) -> Result<Vec<u8>,DYNERR> {
        self.img.seek(ts[0],ts[1])?;
        Ok(self.img.read()?)
    }
    fn write_sector(&mut self,ts: [usize;2],dat: &[u8]) -> STDRESULT {
        self.img.seek(ts[0],ts[1])?;
        self.img.write(dat)?;
        Ok(())
    }
    /// Collect every catalog slot in chain order.  Damaged chains stop
    /// the walk rather than aborting the whole disk.
    fn catalog_slots(&mut self) -> Result<Vec<(EntrySlot,DirectoryEntry)>,DYNERR> {
        let vtoc = self.get_vtoc()?;
        let mut ans = Vec::new();
        let mut visited: HashSet<[usize;2]> = HashSet::new();
        let mut ts = [vtoc.track1 as usize,vtoc.sector1 as usize];
        for _rep in 0..MAX_DIRECTORY_REPS {
            if ans.len() >= MAX_CATALOG_ENTRIES || !visited.insert(ts) {
                break;
            }
            let buf = match self.read_sector(ts) {
                Ok(b) => b,
                Err(_) => {
                    warn!("catalog chain ran off the disk at T{} S{}",ts[0],ts[1]);
                    break;
                }
            };
            let dir = DirectorySector::from_bytes(&buf)?;
            for slot in 0..7 {
                ans.push((EntrySlot { ts, slot },dir.entries[slot]));
            }
            ts = [dir.next_track as usize,dir.next_sector as usize];
            if ts[0] == 0 {
                break;
            }
        }
        Ok(ans)
    }
    fn write_entry(&mut self,slot: &EntrySlot,entry: &DirectoryEntry) -> STDRESULT {
        let mut buf = self.read_sector(slot.ts)?;
        let offset = 0x0b + 35*slot.slot;
        buf[offset..offset+35].copy_from_slice(&entry.to_bytes());
        self.write_sector(slot.ts,&buf)
    }
    /// Locate an active, validly typed entry by name.
    fn named_entry(&mut self,name: &str) -> Result<(EntrySlot,DirectoryEntry),DYNERR> {
        let fname = string_to_file_name(name);
        for (slot,entry) in self.catalog_slots()? {
            if !entry.is_inactive() && entry.name == fname {
                return Ok((slot,entry));
            }
        }
        Err(Box::new(Error::FileNotFound))
    }
    fn next_free_slot(&mut self) -> Result<EntrySlot,DYNERR> {
        for (slot,entry) in self.catalog_slots()? {
            if entry.is_inactive() {
                return Ok(slot);
            }
        }
        Err(Box::new(Error::DiskFull))
    }
    /// Follow the T/S list chain of an entry.  Returns the list sectors
    /// and the data sectors in file order.  A circular chain or an out of
    /// range pointer ends the walk with the prefix collected so far.
    fn ts_lists(&mut self,entry: &DirectoryEntry) -> Result<(Vec<[usize;2]>,Vec<[usize;2]>),DYNERR> {
        let tpd = self.img.fmt().tracks();
        let spt = self.img.fmt().usable_sectors();
        let mut list_sectors = Vec::new();
        let mut data_sectors = Vec::new();
        let mut visited: HashSet<[usize;2]> = HashSet::new();
        let mut ts = [entry.tsl_track as usize,entry.tsl_sector as usize];
        for _rep in 0..MAX_TSLIST_REPS {
            if ts == [0,0] || ts[0] >= tpd || ts[1] >= spt || !visited.insert(ts) {
                break;
            }
            let tslist = TrackSectorList::from_bytes(&self.read_sector(ts)?)?;
            list_sectors.push(ts);
            for p in 0..122 {
                let pair = [tslist.pairs[p*2] as usize,tslist.pairs[p*2+1] as usize];
                if pair == [0,0] || pair[0] >= tpd || pair[1] >= spt {
                    break;
                }
                data_sectors.push(pair);
            }
            ts = [tslist.next_track as usize,tslist.next_sector as usize];
        }
        Ok((list_sectors,data_sectors))
    }
    /// Create any DOS 3.x volume on the owned image: VTOC plus an empty
    /// catalog chain descending from (17,sectors-1).
    pub fn init(&mut self,vol: u8,tracks: usize,sectors: usize) -> STDRESULT {
        if vol < 1 || vol == 255 || (sectors != 13 && sectors != 16) || tracks <= VTOC_TRACK {
            return Err(Box::new(Error::Range));
        }
        if tracks*sectors*256 != self.img.byte_capacity() {
            return Err(Box::new(Error::Range));
        }
        let mut vtoc = VTOC::new();
        vtoc.pad1 = match sectors { 13 => 2, _ => 4 };
        vtoc.version = match sectors { 13 => 2, _ => 3 };
        vtoc.vol = vol;
        vtoc.track1 = VTOC_TRACK as u8;
        vtoc.sector1 = (sectors-1) as u8;
        vtoc.max_pairs = 0x7a;
        vtoc.last_track = (VTOC_TRACK+1) as u8;
        vtoc.last_direction = 1;
        vtoc.tracks = tracks as u8;
        vtoc.sectors = sectors as u8;
        vtoc.bytes = [0,1];
        // mark all free except track 0 and the catalog track
        for t in 1..tracks {
            for s in 0..sectors {
                vtoc.set_free(t,s,t != VTOC_TRACK);
            }
        }
        self.save_vtoc(&vtoc)?;
        // chain the catalog sectors downward
        let mut dir = DirectorySector::new();
        self.write_sector([VTOC_TRACK,1],&dir.to_bytes())?;
        for sec in 2..sectors {
            dir.next_track = VTOC_TRACK as u8;
            dir.next_sector = (sec-1) as u8;
            self.write_sector([VTOC_TRACK,sec],&dir.to_bytes())?;
        }
        Ok(())
    }
    fn modify(&mut self,name: &str,maybe_lock: Option<bool>,maybe_new_name: Option<&str>) -> STDRESULT {
        let (slot,mut entry) = self.named_entry(name)?;
        if let Some(new_name) = maybe_new_name {
            if entry.is_locked() {
                return Err(Box::new(Error::WriteProtected));
            }
            if self.named_entry(new_name).is_ok() {
                return Err(Box::new(super::Error::DuplicateName));
            }
            entry.name = string_to_file_name(new_name);
        }
        if let Some(lock) = maybe_lock {
            entry.file_type = match lock {
                true => entry.file_type | 0x80,
                false => entry.file_type & 0x7f
            };
        }
        self.write_entry(&slot,&entry)
    }
}

impl super::DiskFS for Disk {
    fn catalog(&mut self,_path: &str,pattern: &str) -> Result<Vec<CatalogEntry>,DYNERR> {
        let re = super::wildcard_regex(match pattern.len() { 0 => "*", _ => pattern })?;
        let mut ans = Vec::new();
        for (_slot,entry) in self.catalog_slots()? {
            if entry.is_inactive() || !entry.name_ok() {
                continue;
            }
            let typ = match FileType::from_u8(entry.file_type & 0x7f) {
                Some(t) => t,
                None => continue
            };
            let name = file_name_to_string(entry.name);
            if !re.is_match(&name) {
                continue;
            }
            ans.push(CatalogEntry {
                name,
                kind: typ.describe().to_string(),
                ext: typ.ext().to_string(),
                type_code: TYPE_MASK_APPLEDOS | (entry.file_type & 0x7f) as u32,
                locked: entry.is_locked(),
                size_units: u16::from_le_bytes(entry.sectors) as usize,
                created: None,
                modified: None
            });
        }
        Ok(ans)
    }
    fn read_file(&mut self,path: &str) -> Result<(u16,Vec<u8>),DYNERR> {
        let (_slot,entry) = self.named_entry(path)?;
        let (_lists,data_sectors) = self.ts_lists(&entry)?;
        let mut dat = Vec::new();
        for ts in data_sectors {
            dat.append(&mut self.read_sector(ts)?);
        }
        if dat.len() == 0 {
            return Ok((0,dat));
        }
        match FileType::from_u8(entry.file_type & 0x7f) {
            Some(FileType::Text) => Ok((0,dat)),
            Some(FileType::Binary) => {
                if dat.len() < 4 {
                    return Err(Box::new(super::Error::CorruptStructure));
                }
                let addr = u16::from_le_bytes([dat[0],dat[1]]);
                let mut len = u16::from_le_bytes([dat[2],dat[3]]) as usize;
                if len + 4 > dat.len() {
                    len = dat.len() - 4;
                }
                Ok((addr,dat[4..4+len].to_vec()))
            },
            _ => {
                // INT and APP carry a 16 bit length; all the leftover types
                // follow the same shape with a zero load address
                if dat.len() < 2 {
                    return Err(Box::new(super::Error::CorruptStructure));
                }
                let mut len = u16::from_le_bytes([dat[0],dat[1]]) as usize;
                if len + 2 > dat.len() {
                    len = dat.len() - 2;
                }
                let addr = match FileType::from_u8(entry.file_type & 0x7f) {
                    Some(FileType::Integer) | Some(FileType::Applesoft) => 0x801,
                    _ => 0
                };
                Ok((addr,dat[2..2+len].to_vec()))
            }
        }
    }
    fn write_file(&mut self,path: &str,kind: FileKind,dat: &[u8],load_addr: u16) -> Result<usize,DYNERR> {
        let ftype = match kind {
            FileKind::Text => FileType::Text,
            FileKind::Binary => FileType::Binary,
            FileKind::ApplesoftTokens => FileType::Applesoft,
            FileKind::IntegerTokens => FileType::Integer
        };
        // native header, then the payload
        let mut full: Vec<u8> = match ftype {
            FileType::Text => Vec::new(),
            FileType::Binary => {
                let mut v = u16::to_le_bytes(load_addr).to_vec();
                v.append(&mut u16::to_le_bytes(dat.len() as u16).to_vec());
                v
            },
            _ => u16::to_le_bytes(dat.len() as u16).to_vec()
        };
        full.append(&mut dat.to_vec());
        // at most one active entry per name: replace in place
        if let Ok((_slot,entry)) = self.named_entry(path) {
            if entry.file_type & 0x7f != ftype as u8 {
                return Err(Box::new(Error::FileTypeMismatch));
            }
            self.delete(path)?;
        }
        let mut vtoc = self.get_vtoc()?;
        let tpd = self.img.fmt().tracks();
        let spt = self.img.fmt().usable_sectors();
        let max_pairs = vtoc.max_pairs as usize;
        let data_secs = usize::max(1,(full.len() + 255)/256);
        let ts_secs = usize::max(1,(data_secs + max_pairs - 1)/max_pairs);
        let total = data_secs + ts_secs;
        // free sectors from the highest track downward, never the catalog track
        let mut needed: Vec<[usize;2]> = Vec::new();
        for t in (0..tpd).rev() {
            if t == vtoc.track1 as usize {
                continue;
            }
            for s in (0..spt).rev() {
                if needed.len() >= total {
                    break;
                }
                if vtoc.is_free(t,s) {
                    needed.push([t,s]);
                }
            }
        }
        if needed.len() < total {
            return Err(Box::new(Error::DiskFull));
        }
        let (list_blocks,data_blocks) = needed.split_at(ts_secs);
        // data sectors, zero padded
        for i in 0..data_secs {
            let mut chunk = full[usize::min(i*256,full.len())..usize::min((i+1)*256,full.len())].to_vec();
            chunk.resize(256,0);
            self.write_sector(data_blocks[i],&chunk)?;
        }
        // track/sector lists
        for bi in 0..ts_secs {
            let mut tslist = TrackSectorList::new();
            if bi+1 < ts_secs {
                tslist.next_track = list_blocks[bi+1][0] as u8;
                tslist.next_sector = list_blocks[bi+1][1] as u8;
            }
            tslist.sector_base = u16::to_le_bytes((bi*max_pairs) as u16);
            let count = usize::min(max_pairs,data_secs - bi*max_pairs);
            for i in 0..count {
                tslist.pairs[i*2] = data_blocks[bi*max_pairs+i][0] as u8;
                tslist.pairs[i*2+1] = data_blocks[bi*max_pairs+i][1] as u8;
            }
            self.write_sector(list_blocks[bi],&tslist.to_bytes())?;
        }
        for ts in &needed[0..total] {
            vtoc.set_free(ts[0],ts[1],false);
        }
        self.save_vtoc(&vtoc)?;
        // publish the catalog entry
        let slot = self.next_free_slot()?;
        let mut entry = DirectoryEntry::new();
        entry.tsl_track = list_blocks[0][0] as u8;
        entry.tsl_sector = list_blocks[0][1] as u8;
        entry.file_type = ftype as u8;
        entry.name = string_to_file_name(path);
        entry.sectors = u16::to_le_bytes(total as u16);
        self.write_entry(&slot,&entry)?;
        Ok(total)
    }
    fn delete(&mut self,path: &str) -> STDRESULT {
        let (slot,mut entry) = self.named_entry(path)?;
        if entry.is_locked() {
            return Err(Box::new(Error::FileLocked));
        }
        let (list_sectors,data_sectors) = self.ts_lists(&entry)?;
        let mut vtoc = self.get_vtoc()?;
        for ts in data_sectors {
            vtoc.set_free(ts[0],ts[1],true);
        }
        for ts in list_sectors {
            vtoc.set_free(ts[0],ts[1],true);
        }
        self.save_vtoc(&vtoc)?;
        entry.tsl_track = 0xff;
        entry.name = [0xa0;30];
        self.write_entry(&slot,&entry)
    }
    fn rename(&mut self,path: &str,new_name: &str) -> STDRESULT {
        self.modify(path,None,Some(new_name))
    }
    fn lock(&mut self,path: &str) -> STDRESULT {
        self.modify(path,Some(true),None)
    }
    fn unlock(&mut self,path: &str) -> STDRESULT {
        self.modify(path,Some(false),None)
    }
    fn create_dir(&mut self,_path: &str) -> STDRESULT {
        debug!("DOS 3.x does not support directories");
        Err(Box::new(super::Error::NotImplemented))
    }
    fn set_volume_name(&mut self,name: &str) -> STDRESULT {
        let vol = match name.parse::<u8>() {
            Ok(v) if v >= 1 && v <= 254 => v,
            _ => return Err(Box::new(Error::SyntaxError))
        };
        let mut vtoc = self.get_vtoc()?;
        vtoc.vol = vol;
        self.save_vtoc(&vtoc)
    }
    fn used_bitmap(&mut self) -> Result<Vec<bool>,DYNERR> {
        let vtoc = self.get_vtoc()?;
        let tpd = self.img.fmt().tracks();
        let spt = self.img.fmt().usable_sectors();
        let mut map = vec![false;tpd*spt];
        if vtoc.is_free(VTOC_TRACK,0) {
            // the bitmap claims its own sector is free, so it cannot be
            // trusted; rebuild occupancy from the catalog chains
            debug!("VTOC bitmap inconsistent, rebuilding from catalog");
            let entries: Vec<DirectoryEntry> = self.catalog_slots()?
                .iter().map(|(_s,e)| *e)
                .filter(|e| !e.is_inactive() && FileType::from_u8(e.file_type & 0x7f).is_some())
                .collect();
            for entry in entries {
                let (list_sectors,data_sectors) = self.ts_lists(&entry)?;
                for ts in list_sectors.iter().chain(data_sectors.iter()) {
                    map[ts[0]*spt + ts[1]] = true;
                }
            }
            // the system areas are used no matter what the catalog says
            for s in 0..spt {
                map[VTOC_TRACK*spt + s] = true;
            }
        } else {
            for t in 0..tpd {
                for s in 0..spt {
                    map[t*spt + s] = !vtoc.is_free(t,s);
                }
            }
        }
        Ok(map)
    }
    fn get_img(&mut self) -> &mut img::DiskImage {
        &mut self.img
    }
}
