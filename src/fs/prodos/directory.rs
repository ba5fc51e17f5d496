//! ### ProDOS directory structures
//!
//! These are fixed length structures, with the DiskStruct trait.
//! The volume header, subdirectory header, and file entry all share the
//! 39 byte shape; the tail fields are what distinguish them.

use chrono::{Datelike,Timelike};

// a2kit_macro automatically derives `new`, `to_bytes`, `from_bytes`, and `len`
// from a DiskStruct.  This spares us having to manually write code to copy
// bytes in and out for every new structure.
use a2kit_macro::DiskStruct;
use a2kit_macro::DiskStructError;
use a2kit_macro_derive::DiskStruct;

use super::types::*;

/// Pack a date and time into the two 16 bit words ProDOS stores:
/// `(year<<9) | (month<<5) | day` and `(hour<<8) | minute`, year offset
/// from 1900.
pub fn pack_time(time: Option<chrono::NaiveDateTime>) -> [u8;4] {
    let now = match time {
        Some(t) => t,
        _ => chrono::Local::now().naive_local()
    };
    let mut year = now.year() - 1900;
    if year > 99 {
        year -= 100;
    }
    let packed_date = ((year as u16) << 9) | ((now.month() as u16) << 5) | now.day() as u16;
    let packed_time = ((now.hour() as u16) << 8) | now.minute() as u16;
    let bytes_date = u16::to_le_bytes(packed_date);
    let bytes_time = u16::to_le_bytes(packed_time);
    [bytes_date[0],bytes_date[1],bytes_time[0],bytes_time[1]]
}

/// Unpack a ProDOS date and time.  Years below 70 are taken as 20xx.
pub fn unpack_time(prodos_date_time: [u8;4]) -> Option<chrono::NaiveDateTime> {
    let date = u16::from_le_bytes([prodos_date_time[0],prodos_date_time[1]]);
    let time = u16::from_le_bytes([prodos_date_time[2],prodos_date_time[3]]);
    let yearmod100 = date >> 9;
    let year = match yearmod100 < 70 {
        true => 2000 + yearmod100,
        false => 1900 + yearmod100
    };
    let month = (date >> 5) & 15;
    let day = date & 31;
    let hour = (time >> 8) & 255;
    let minute = time & 255;
    match chrono::NaiveDate::from_ymd_opt(year as i32,month as u32,day as u32) {
        Some(d) => d.and_hms_opt(hour as u32,minute as u32,0),
        None => None
    }
}

/// Convert entry name bytes to a lower case string.
pub fn file_name_to_string(stype_and_len: u8,name: [u8;15]) -> String {
    let name_len = (stype_and_len & 0x0f) as usize;
    crate::escaped_ascii_from_bytes(&name[0..name_len],true,false).trim().to_lowercase()
}

/// Fill name bytes from a string, truncated to 15 characters and upper
/// cased.  Returns the combined storage/length byte for `stype`.
pub fn string_to_file_name(stype: StorageType,s: &str) -> (u8,[u8;15]) {
    let cleaned = s.to_uppercase();
    let bytes = cleaned.as_bytes();
    let count = usize::min(bytes.len(),15);
    let mut name: [u8;15] = [0;15];
    name[0..count].copy_from_slice(&bytes[0..count]);
    (((stype as u8) << 4) | count as u8,name)
}

/// Test a string for validity as a ProDOS name.
pub fn is_name_valid(s: &str) -> bool {
    let patt = regex::Regex::new(r"^[A-Z][A-Z0-9.]{0,14}$").expect("unreachable");
    patt.is_match(&s.to_uppercase())
}

#[derive(DiskStruct)]
pub struct VolDirHeader {
    pub stype_and_len: u8,
    pub name: [u8;15],
    pub pad: [u8;8],
    pub create_time: [u8;4],
    pub version: u8,
    pub min_version: u8,
    pub access: u8,
    pub entry_length: u8,
    pub entries_per_block: u8,
    pub file_count: [u8;2],
    pub bitmap_pointer: [u8;2],
    pub total_blocks: [u8;2]
}

/// Same shape as the volume header, but the tail addresses the parent.
#[derive(DiskStruct)]
pub struct SubDirHeader {
    pub stype_and_len: u8,
    pub name: [u8;15],
    pub pad: [u8;8],
    pub create_time: [u8;4],
    pub version: u8,
    pub min_version: u8,
    pub access: u8,
    pub entry_length: u8,
    pub entries_per_block: u8,
    pub file_count: [u8;2],
    pub parent_pointer: [u8;2],
    pub parent_entry: u8,
    pub parent_entry_length: u8
}

#[derive(DiskStruct,Clone,Copy)]
pub struct FileEntry {
    pub stype_and_len: u8,
    pub name: [u8;15],
    pub file_type: u8,
    pub key_pointer: [u8;2],
    pub blocks_used: [u8;2],
    pub eof: [u8;3],
    pub create_time: [u8;4],
    pub version: u8,
    pub min_version: u8,
    pub access: u8,
    pub aux_type: [u8;2],
    pub mod_time: [u8;4],
    pub header_pointer: [u8;2]
}

impl FileEntry {
    pub fn storage_type(&self) -> StorageType {
        match num_traits::FromPrimitive::from_u8(self.stype_and_len >> 4) {
            Some(s) => s,
            None => StorageType::Inactive
        }
    }
    pub fn is_active(&self) -> bool {
        self.stype_and_len >> 4 != 0
    }
    pub fn name(&self) -> String {
        file_name_to_string(self.stype_and_len,self.name)
    }
    pub fn set_name(&mut self,stype: StorageType,s: &str) {
        let (nibs,name) = string_to_file_name(stype,s);
        self.stype_and_len = nibs;
        self.name = name;
    }
    pub fn set_storage_type(&mut self,stype: StorageType) {
        self.stype_and_len = ((stype as u8) << 4) | (self.stype_and_len & 0x0f);
    }
    pub fn key_block(&self) -> usize {
        u16::from_le_bytes(self.key_pointer) as usize
    }
    pub fn eof(&self) -> usize {
        self.eof[0] as usize + 256*self.eof[1] as usize + 65536*self.eof[2] as usize
    }
    pub fn set_eof(&mut self,val: usize) {
        self.eof = [(val & 0xff) as u8,((val >> 8) & 0xff) as u8,((val >> 16) & 0xff) as u8];
    }
    pub fn aux(&self) -> u16 {
        u16::from_le_bytes(self.aux_type)
    }
    pub fn is_locked(&self) -> bool {
        self.access & (ACCESS_DESTROY | ACCESS_RENAME | ACCESS_WRITE) == 0
    }
    pub fn set_locked(&mut self,lock: bool) {
        if lock {
            self.access &= ACCESS_CHANGED | ACCESS_READ;
        } else {
            self.access |= ACCESS_DESTROY | ACCESS_RENAME | ACCESS_WRITE;
        }
    }
}
