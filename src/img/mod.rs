//! # Disk Image Module
//!
//! The `DiskImage` struct is the sector engine: it owns the raw image bytes
//! and exposes `(track, sector)` and block addressing over them.  A codec
//! binding, made of a `DiskFormat` and a `SectorOrder`, determines the
//! geometry and the interleave translation.  The binding is a property of
//! how the image is being read, not of the bytes themselves; the format
//! identifier in `identify` establishes it.
//!
//! Disk addresses are transformed as they propagate downward.  A file
//! system asks for a logical sector (or a block, which becomes two logical
//! sectors); the logical sector is taken through a skew table in
//! `bios::skew` to a physical sector-within-track offset.  Reading or
//! writing always happens at the resulting physical byte pointer.

pub mod dot2mg;
pub mod nib;
pub mod identify;

use std::fmt;
use sha2::{Digest,Sha256};
use crate::bios::skew;

/// Enumerates disk image errors.  The `Display` trait will print the
/// equivalent long message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("track or sector out of range")]
    OutOfRange,
    #[error("image size did not match any known format")]
    ImageSizeMismatch,
    #[error("image type not compatible with request")]
    ImageTypeMismatch,
    #[error("unable to access sector")]
    SectorAccess
}

pub const SECTOR_BYTES: usize = 256;
pub const BLOCK_BYTES: usize = 512;
pub const DOS13_BYTES: usize = 35*13*256;
pub const DOS16_BYTES: usize = 35*16*256;
pub const PRODOS_400K_BYTES: usize = 800*512;
pub const PRODOS_800K_BYTES: usize = 1600*512;
pub const NIB_BYTES: usize = 232960;
pub const HEADER_2MG_BYTES: usize = 64;

/// Physical order of sectors within a track.  The ordering cannot always
/// be determined from the bytes alone, so the identifier may try several.
#[derive(PartialEq,Eq,Clone,Copy,Debug)]
pub enum SectorOrder {
    Dos33,
    Dos32,
    Dos33Alt,
    ProDos,
    ProDosLinear
}

impl fmt::Display for SectorOrder {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dos33 | Self::Dos32 => write!(f,"DOS"),
            Self::Dos33Alt => write!(f,"DOS Alternate"),
            Self::ProDos => write!(f,"ProDOS"),
            Self::ProDosLinear => write!(f,"Linear")
        }
    }
}

/// Identified on-disk format.  The numeric `id` is stable and is encoded
/// into fingerprint artifact filenames, so it must never be renumbered.
#[derive(PartialEq,Eq,Clone,Copy,Hash,Debug)]
pub enum DiskFormat {
    Unknown,
    Dos13,
    Dos16,
    ProDos,
    ProDos800,
    Pascal,
    Rdos3,
    Rdos32,
    Rdos33,
    ProDos400
}

impl DiskFormat {
    pub fn id(&self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::Dos13 => 1,
            Self::Dos16 => 2,
            Self::ProDos => 3,
            Self::ProDos800 => 4,
            Self::Pascal => 5,
            Self::Rdos3 => 6,
            Self::Rdos32 => 7,
            Self::Rdos33 => 8,
            Self::ProDos400 => 9
        }
    }
    pub fn from_id(id: u32) -> Self {
        match id {
            1 => Self::Dos13,
            2 => Self::Dos16,
            3 => Self::ProDos,
            4 => Self::ProDos800,
            5 => Self::Pascal,
            6 => Self::Rdos3,
            7 => Self::Rdos32,
            8 => Self::Rdos33,
            9 => Self::ProDos400,
            _ => Self::Unknown
        }
    }
    /// tracks per disk
    pub fn tracks(&self) -> usize {
        match self {
            Self::ProDos800 | Self::ProDos400 => 80,
            _ => 35
        }
    }
    /// physical sectors per track, the stride used to locate track starts
    pub fn sector_stride(&self) -> usize {
        match self {
            Self::Dos13 | Self::Rdos32 => 13,
            Self::ProDos800 => 40,
            Self::ProDos400 => 20,
            _ => 16
        }
    }
    /// sectors per track the file system may address; differs from the
    /// stride only for the hybrid RDOS 3 layout
    pub fn usable_sectors(&self) -> usize {
        match self {
            Self::Dos13 | Self::Rdos32 | Self::Rdos3 => 13,
            Self::ProDos800 => 40,
            Self::ProDos400 => 20,
            _ => 16
        }
    }
    /// addressable 512-byte blocks
    pub fn blocks(&self) -> usize {
        match self {
            Self::Dos13 | Self::Rdos3 | Self::Rdos32 => 222,
            Self::ProDos800 => 1600,
            Self::ProDos400 => 800,
            _ => 280
        }
    }
    pub fn is_block_device(&self) -> bool {
        match self {
            Self::ProDos | Self::ProDos400 | Self::ProDos800 | Self::Pascal => true,
            _ => false
        }
    }
}

impl fmt::Display for DiskFormat {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f,"Unrecognized"),
            Self::Dos13 => write!(f,"Apple DOS 13 Sector"),
            Self::Dos16 => write!(f,"Apple DOS 16 Sector"),
            Self::ProDos => write!(f,"ProDOS"),
            Self::ProDos800 => write!(f,"ProDOS 800Kb"),
            Self::Pascal => write!(f,"Pascal"),
            Self::Rdos3 => write!(f,"SSI RDOS 3 (16/13/Physical)"),
            Self::Rdos32 => write!(f,"SSI RDOS 32 (13/13/Physical)"),
            Self::Rdos33 => write!(f,"SSI RDOS 33 (16/16/PD)"),
            Self::ProDos400 => write!(f,"ProDOS 400Kb")
        }
    }
}

/// Return the lowercase hex SHA-256 of any byte slice.
pub fn checksum(buf: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(buf);
    hex::encode(hasher.finalize())
}

/// The sector engine.  Owns the raw image and a current sector pointer.
/// Reading can mutate the object because the pointer follows the last seek.
pub struct DiskImage {
    data: Vec<u8>,
    fmt: DiskFormat,
    order: SectorOrder,
    track: usize,
    sector: usize,
    ptr: usize
}

impl DiskImage {
    /// Wrap a bytestream, verify its length against the known container
    /// sizes, and identify format and ordering.  `maybe_path` is only used
    /// for the extension hint.
    pub fn from_bytes(data: Vec<u8>,maybe_path: Option<&str>) -> Result<Self,Error> {
        const LENGTHS: [usize;10] = [
            NIB_BYTES,
            DOS13_BYTES,
            DOS16_BYTES, DOS16_BYTES + HEADER_2MG_BYTES,
            PRODOS_400K_BYTES/2, PRODOS_400K_BYTES/2 + HEADER_2MG_BYTES,
            PRODOS_400K_BYTES, PRODOS_400K_BYTES + HEADER_2MG_BYTES,
            PRODOS_800K_BYTES, PRODOS_800K_BYTES + HEADER_2MG_BYTES
        ];
        if !LENGTHS.contains(&data.len()) {
            return Err(Error::ImageSizeMismatch);
        }
        let mut img = Self {
            data,
            fmt: DiskFormat::Unknown,
            order: SectorOrder::Dos33,
            track: 0,
            sector: 0,
            ptr: 0
        };
        identify::identify(&mut img,maybe_path);
        Ok(img)
    }
    /// Wrap a bytestream with an explicit binding, skipping identification.
    /// Used by the identifier itself and by tests.
    pub fn with_binding(data: Vec<u8>,fmt: DiskFormat,order: SectorOrder) -> Self {
        Self { data, fmt, order, track: 0, sector: 0, ptr: 0 }
    }
    pub fn fmt(&self) -> DiskFormat {
        self.fmt
    }
    pub fn order(&self) -> SectorOrder {
        self.order
    }
    pub fn set_fmt(&mut self,fmt: DiskFormat) {
        self.fmt = fmt;
    }
    pub fn set_order(&mut self,order: SectorOrder) {
        self.order = order;
        self.set_ptr();
    }
    pub fn byte_capacity(&self) -> usize {
        self.data.len()
    }
    pub fn data(&self) -> &[u8] {
        &self.data
    }
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.clone()
    }
    /// Replace the raw bytes, e.g. after stripping a container header.
    pub fn replace_data(&mut self,data: Vec<u8>) {
        self.data = data;
        self.track = 0;
        self.sector = 0;
        self.ptr = 0;
    }
    /// Recompute the physical byte pointer from the current track and
    /// logical sector through the bound interleave.
    fn set_ptr(&mut self) {
        let psec = match self.order {
            SectorOrder::Dos33Alt => skew::DOS33_ALT_LSEC_TO_PSEC[self.sector & 0xf],
            SectorOrder::ProDos => skew::PRODOS_LSEC_TO_PSEC[self.sector & 0xf],
            _ => self.sector
        };
        self.ptr = self.track * self.fmt.sector_stride() * SECTOR_BYTES + psec * SECTOR_BYTES;
    }
    pub fn set_track(&mut self,t: usize) -> Result<(),Error> {
        if t >= self.fmt.tracks() {
            return Err(Error::OutOfRange);
        }
        self.track = t;
        self.set_ptr();
        Ok(())
    }
    pub fn set_sector(&mut self,s: usize) -> Result<(),Error> {
        if s >= self.fmt.usable_sectors() {
            return Err(Error::OutOfRange);
        }
        self.sector = s;
        self.set_ptr();
        Ok(())
    }
    /// Go straight to a particular track and sector.
    pub fn seek(&mut self,t: usize,s: usize) -> Result<(),Error> {
        self.set_track(t)?;
        self.set_sector(s)
    }
    /// Return the 256 bytes under the current pointer.
    pub fn read(&self) -> Result<Vec<u8>,Error> {
        if self.ptr + SECTOR_BYTES > self.data.len() {
            return Err(Error::SectorAccess);
        }
        Ok(self.data[self.ptr..self.ptr+SECTOR_BYTES].to_vec())
    }
    /// Write at the current pointer.  Input longer than a sector is
    /// truncated; shorter input leaves trailing bytes unaffected.
    pub fn write(&mut self,dat: &[u8]) -> Result<(),Error> {
        if self.ptr + SECTOR_BYTES > self.data.len() {
            return Err(Error::SectorAccess);
        }
        let count = usize::min(dat.len(),SECTOR_BYTES);
        self.data[self.ptr..self.ptr+count].copy_from_slice(&dat[0..count]);
        Ok(())
    }
    /// Map a ProDOS block to its track and two logical sectors.
    pub fn block_sectors(&self,block: usize) -> (usize,usize,usize) {
        let stride = self.fmt.sector_stride();
        if stride >= 20 {
            // 3.5 inch media are always sector linear
            let dbl = block * 2;
            return (dbl/stride, dbl%stride, (dbl+1)%stride);
        }
        if self.order == SectorOrder::ProDosLinear {
            let bo = block % 8;
            return (block/8, bo*2, bo*2 + 1);
        }
        let pair = skew::PRODOS_BLOCK_SECTOR_PAIRS[block % 8];
        (block/8, pair[0], pair[1])
    }
    /// Read the 512 bytes of a block, combining its two sectors.
    pub fn read_block(&mut self,block: usize) -> Result<Vec<u8>,Error> {
        let (t,s1,s2) = self.block_sectors(block);
        self.seek(t,s1)?;
        let mut ans = self.read()?;
        self.seek(t,s2)?;
        ans.append(&mut self.read()?);
        Ok(ans)
    }
    /// Write a block; input is padded with zeroes to 512 bytes.
    pub fn write_block(&mut self,block: usize,dat: &[u8]) -> Result<(),Error> {
        let mut padded = dat.to_vec();
        padded.resize(BLOCK_BYTES,0);
        let (t,s1,s2) = self.block_sectors(block);
        self.seek(t,s1)?;
        self.write(&padded[0..SECTOR_BYTES])?;
        self.seek(t,s2)?;
        self.write(&padded[SECTOR_BYTES..BLOCK_BYTES])
    }
    /// SHA-256 of the 256 physical bytes addressed by (t,s), as lowercase hex.
    pub fn checksum_sector(&mut self,t: usize,s: usize) -> Result<String,Error> {
        self.seek(t,s)?;
        Ok(checksum(&self.read()?))
    }
    /// SHA-256 of the entire image, as lowercase hex.
    pub fn checksum_disk(&self) -> String {
        checksum(&self.data)
    }
}
