//! ## Support for 2MG disk images
//!
//! This format consists of a 64 byte header followed by data in DSK or NIB
//! format.  At the end of the data there can be a comment and creator
//! information, which we pass over.  The header declares the payload
//! ordering; the identifier recurses on the payload with that declaration.

use log::{info,warn,error};
use a2kit_macro::DiskStruct;
use a2kit_macro::DiskStructError;
use a2kit_macro_derive::DiskStruct;
use crate::img;

// all header entries are LE numbers
#[derive(DiskStruct)]
pub struct Header {
    pub magic: [u8;4], // always '2IMG'
    pub creator_id: [u8;4],
    pub header_len: [u8;2],
    pub version: [u8;2],
    pub img_fmt: [u8;4], // 0=DO, 1=PO, 2=nib
    pub flags: [u8;4],
    pub blocks: [u8;4],
    pub data_offset: [u8;4], // from start of file
    pub data_len: [u8;4],
    pub comment_offset: [u8;4],
    pub comment_len: [u8;4],
    pub creator_offset: [u8;4],
    pub creator_len: [u8;4],
    pub pad: [u8;16]
}

/// Result of unwrapping a 2MG container: the declared payload ordering
/// code, the declared ProDOS block count, and the payload bytes.
pub struct Unwrapped {
    pub img_fmt: u32,
    pub blocks: u32,
    pub payload: Vec<u8>
}

/// Test a bytestream for the 2MG magic and slice off the payload.
/// A declared data length that runs past the file tail, or falls short of
/// it, is replaced by the actual tail length.
pub fn unwrap(data: &[u8]) -> Option<Unwrapped> {
    if data.len() < 64 {
        return None;
    }
    let header = match Header::from_bytes(&data[0..64]) {
        Ok(h) => h,
        Err(_) => return None
    };
    match header.magic {
        [0x32,0x49,0x4d,0x47] => info!("identified 2MG header"),
        _ => return None
    }
    if u16::from_le_bytes(header.header_len) != 64 {
        warn!("unexpected 2MG header length {}",u16::from_le_bytes(header.header_len));
    }
    let fmt = u32::from_le_bytes(header.img_fmt);
    if fmt > 2 {
        error!("illegal 2MG format {}",fmt);
        return None;
    }
    let offset = u32::from_le_bytes(header.data_offset) as usize;
    if offset < 64 || offset >= data.len() {
        error!("bad 2MG data offset {}",offset);
        return None;
    }
    let mut size = u32::from_le_bytes(header.data_len) as usize;
    if size != data.len() - offset {
        size = data.len() - offset;
    }
    if size != img::DOS16_BYTES && size != img::PRODOS_400K_BYTES && size != img::PRODOS_800K_BYTES {
        error!("bad 2MG payload size {} at offset {}",size,offset);
        return None;
    }
    Some(Unwrapped {
        img_fmt: fmt,
        blocks: u32::from_le_bytes(header.blocks),
        payload: data[offset..offset+size].to_vec()
    })
}
