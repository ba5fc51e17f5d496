//! ## 6-and-2 Nibblization
//!
//! Writes the track stream a Disk II interface would see, for a standard
//! 16 sector 140K image.  The 256 data bytes of each sector are
//! pre-nibblized to 342 six-bit groups and passed through the firmware
//! translation table, with self-sync bytes framing the address and data
//! fields.  Each sector costs 416 stream bytes, each track 6656, the
//! whole disk exactly 232960.

use crate::bios::skew;
use super::{DiskImage,SectorOrder};

/// self-sync gap before the address field
const GAP_ADDRESS: usize = 15;
/// self-sync gap between address and data fields
const GAP_DATA: usize = 6;
/// self-sync gap after the data field
const GAP_TAIL: usize = 38 - GAP_DATA;

fn write_junk(out: &mut Vec<u8>,count: usize) {
    for _i in 0..count {
        out.push(0xff);
    }
}

/// 4-and-4 encoding used within the address field
fn odd_even(out: &mut Vec<u8>,val: u8) {
    out.push(0xaa | (val >> 1));
    out.push(0xaa | val);
}

fn write_address_field(out: &mut Vec<u8>,vol: u8,track: u8,sector: u8) {
    out.push(0xd5); out.push(0xaa); out.push(0x96);
    odd_even(out,vol);
    odd_even(out,track);
    odd_even(out,sector);
    odd_even(out,vol ^ track ^ sector);
    out.push(0xde); out.push(0xaa); out.push(0xeb);
}

fn write_data_field(out: &mut Vec<u8>,sector_bytes: &[u8]) {
    // 256 bytes become 342 six-bit groups: the top six bits of each byte,
    // then 86 groups gathering the residual low bit pairs in reverse order
    let mut groups = [0u8;342];
    for i in 0..256 {
        groups[i] = sector_bytes[i] >> 2;
    }
    let mut hi: usize = 0x001;
    let mut med: usize = 0x0ab;
    let mut low: usize = 0x055;
    for i in 0..0x56 {
        let value = ((sector_bytes[hi] & 1) << 5)
            | ((sector_bytes[hi] & 2) << 3)
            | ((sector_bytes[med] & 1) << 3)
            | ((sector_bytes[med] & 2) << 1)
            | ((sector_bytes[low] & 1) << 1)
            | ((sector_bytes[low] & 2) >> 1);
        groups[i+256] = value;
        hi = (hi + 0xff) & 0xff;
        med = (med + 0xff) & 0xff;
        low = (low + 0xff) & 0xff;
    }
    out.push(0xd5); out.push(0xaa); out.push(0xad);
    let mut last: u8 = 0;
    for i in (256..342).rev() {
        out.push(skew::NIBBLE_62[(groups[i] ^ last) as usize]);
        last = groups[i];
    }
    for i in 0..256 {
        out.push(skew::NIBBLE_62[(groups[i] ^ last) as usize]);
        last = groups[i];
    }
    // last data byte doubles as the checksum
    out.push(skew::NIBBLE_62[last as usize]);
    out.push(0xde); out.push(0xaa); out.push(0xeb);
}

/// Produce the 232960 byte nibble stream for a 140K image.  Any other
/// image size yields a zeroed stream of the same length.
pub fn nibblize(img: &DiskImage) -> Vec<u8> {
    if img.byte_capacity() != super::DOS16_BYTES {
        return vec![0;super::NIB_BYTES];
    }
    let stored_order: &[usize;16] = match img.order() {
        SectorOrder::ProDos | SectorOrder::ProDosLinear => &skew::PRODOS_STORED_ORDER,
        _ => &skew::DOS33_STORED_ORDER
    };
    let data = img.data();
    let mut out: Vec<u8> = Vec::with_capacity(super::NIB_BYTES);
    for track in 0..35 {
        for sector in 0..16 {
            write_junk(&mut out,GAP_ADDRESS);
            write_address_field(&mut out,254,track as u8,sector as u8);
            write_junk(&mut out,GAP_DATA);
            let offset = (track*16 + stored_order[sector]) * 256;
            write_data_field(&mut out,&data[offset..offset+256]);
            write_junk(&mut out,GAP_TAIL);
        }
    }
    return out;
}
