//! ### Pascal directory structures
//!
//! These are fixed length structures, with the DiskStruct trait.
//! The directory is the volume header followed immediately by packed
//! entries; entries are allowed to cross block boundaries.

// a2kit_macro automatically derives `new`, `to_bytes`, `from_bytes`, and `len`
// from a DiskStruct.  This spares us having to manually write code to copy
// bytes in and out for every new structure.
use a2kit_macro::DiskStruct;
use a2kit_macro::DiskStructError;
use a2kit_macro_derive::DiskStruct;

#[derive(DiskStruct)]
pub struct VolDirHeader {
    pub begin_block: [u8;2],
    pub end_block: [u8;2],
    pub file_type: [u8;2], // 0
    pub name_len: u8, // & 0x07
    pub name: [u8;7],
    pub total_blocks: [u8;2],
    pub num_files: [u8;2],
    pub last_access_date: [u8;2],
    pub last_set_date: [u8;2],
    pub pad: [u8;4]
}

#[derive(DiskStruct,Clone,Copy)]
pub struct DirectoryEntry {
    pub begin_block: [u8;2],
    pub end_block: [u8;2],
    pub file_type: [u8;2],
    pub name_len: u8, // & 0x0f
    pub name: [u8;15],
    pub bytes_remaining: [u8;2],
    pub mod_date: [u8;2]
}

impl DirectoryEntry {
    pub fn begin(&self) -> usize {
        u16::from_le_bytes(self.begin_block) as usize
    }
    pub fn end(&self) -> usize {
        u16::from_le_bytes(self.end_block) as usize
    }
    pub fn name(&self) -> String {
        let len = (self.name_len & 0x0f) as usize;
        crate::escaped_ascii_from_bytes(&self.name[0..len],true,false).trim().to_lowercase()
    }
    /// a contiguous extent: every block but the last is full
    pub fn file_size(&self) -> usize {
        let blocks = match self.end() > self.begin() {
            true => self.end() - self.begin() - 1,
            false => 0
        };
        blocks*512 + u16::from_le_bytes(self.bytes_remaining) as usize
    }
}
