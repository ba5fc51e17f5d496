//! ## Fingerprint Builder
//!
//! Walks an identified disk image and fills out a `fp::Disk`.  Each
//! format family has its own walk: sector devices record one entry per
//! (track, sector), block devices record the two sectors of each block.
//! A disk whose file system cannot actually be walked falls back to the
//! generic path, which presumes every sector used and records the whole
//! disk hash only.

use log::{info,warn};
use sha2::{Digest,Sha256};

use super::{Disk,DiskFile,DiskSector};
use crate::img::{self,DiskFormat};
use crate::fs::{self,DiskFS};
use crate::lang;
use crate::DYNERR;

/// ingest mode bit: capture text renderings of BASIC and text files
pub const INGEST_TEXT: u8 = 1;
/// ingest mode bit: capture raw sector bytes
pub const INGEST_SECTOR_DATA: u8 = 2;

/// Analyze one disk image file.  The path is made absolute so the
/// fingerprint mirrors the source tree.
pub fn analyze_file(path: &str,mode: u8) -> Result<Disk,DYNERR> {
    let data = std::fs::read(path)?;
    let full_path = match std::fs::canonicalize(path) {
        Ok(p) => p.to_string_lossy().to_string(),
        Err(_) => path.to_string()
    };
    analyze_bytes(&full_path,data,mode)
}

/// Analyze a disk image given as bytes.  `full_path` is recorded in the
/// descriptor and drives the artifact location.
pub fn analyze_bytes(full_path: &str,data: Vec<u8>,mode: u8) -> Result<Disk,DYNERR> {
    let mut img = img::DiskImage::from_bytes(data,Some(full_path))?;
    // a DOS identification that does not hold up under a real catalog
    // walk reverts to unrecognized, nibble streams included
    if img.fmt() == DiskFormat::Dos13 || img.fmt() == DiskFormat::Dos16 {
        let geom = img.fmt().tracks() * img.fmt().sector_stride() * img::SECTOR_BYTES;
        if img.byte_capacity() != geom {
            img.set_fmt(DiskFormat::Unknown);
        }
    }
    let mut disk = Disk::default();
    disk.full_path = full_path.to_string();
    disk.file_name = match super::normalize_path(full_path).rsplit_once('/') {
        Some((_dir,base)) => base.to_string(),
        None => full_path.to_string()
    };
    disk.sha256 = img.checksum_disk();
    disk.format = img.fmt().to_string();
    disk.format_id = img.fmt().id();
    disk.ingest_mode = mode;
    info!("{} identified as {}",disk.file_name,disk.format);

    if img.fmt() == DiskFormat::Unknown {
        generic_walk(&mut img,&mut disk,mode)?;
        return Ok(disk);
    }
    let mut fs = crate::create_fs_from_img(img)?;
    if let Err(e) = fs_walk(fs.as_mut(),&mut disk,mode) {
        warn!("walk of {} failed ({}), treating as generic",disk.file_name,e);
        disk.format_id = DiskFormat::Unknown.id();
        disk.format = DiskFormat::Unknown.to_string();
        disk.files = Vec::new();
        disk.active_sectors = Vec::new();
        disk.inactive_sectors = Vec::new();
        disk.blocks = 0;
        generic_walk(fs.get_img(),&mut disk,mode)?;
    }
    Ok(disk)
}

/// hex SHA-256 of a byte slice
fn digest(buf: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(buf);
    hex::encode(hasher.finalize())
}

/// Record sectors and hashes of a sector addressed device.
fn sector_walk(img: &mut img::DiskImage,disk: &mut Disk,mode: u8) -> Result<(),DYNERR> {
    let mut active_data: Vec<u8> = Vec::new();
    for t in 0..disk.tracks {
        for s in 0..disk.sectors {
            let sha256 = img.checksum_sector(t,s)?;
            let dat = img.read()?;
            let mut sector = DiskSector { track: t, sector: s, sha256, data: None };
            if mode & INGEST_SECTOR_DATA != 0 {
                sector.data = Some(dat.clone());
            }
            if disk.bitmap[t*disk.sectors + s] {
                active_data.extend_from_slice(&dat);
                disk.active_sectors.push(sector);
            } else {
                disk.inactive_sectors.push(sector);
            }
        }
    }
    disk.sha256_active = digest(&active_data);
    Ok(())
}

/// Record sectors and hashes of a block addressed device.  Each block
/// contributes two sector records carrying the mapped track/sector ids.
fn block_walk(img: &mut img::DiskImage,disk: &mut Disk,mode: u8) -> Result<(),DYNERR> {
    let mut active_data: Vec<u8> = Vec::new();
    for b in 0..disk.blocks {
        let dat = img.read_block(b)?;
        let (t,s1,s2) = img.block_sectors(b);
        let mut sec1 = DiskSector { track: t, sector: s1, sha256: img.checksum_sector(t,s1)?, data: None };
        let mut sec2 = DiskSector { track: t, sector: s2, sha256: img.checksum_sector(t,s2)?, data: None };
        if mode & INGEST_SECTOR_DATA != 0 {
            sec1.data = Some(dat[0..img::SECTOR_BYTES].to_vec());
            sec2.data = Some(dat[img::SECTOR_BYTES..].to_vec());
        }
        if disk.bitmap[b] {
            active_data.extend_from_slice(&dat);
            disk.active_sectors.push(sec1);
            disk.active_sectors.push(sec2);
        } else {
            disk.inactive_sectors.push(sec1);
            disk.inactive_sectors.push(sec2);
        }
    }
    disk.sha256_active = digest(&active_data);
    Ok(())
}

/// Catalog one directory level, recursing into ProDOS subdirectories.
fn catalog_walk(fs: &mut dyn DiskFS,path: &str,disk: &mut Disk,mode: u8) -> Result<(),DYNERR> {
    let entries = fs.catalog(path,"*")?;
    for entry in entries {
        let full_name = match path.len() {
            0 => entry.name.clone(),
            _ => format!("{}/{}",path,entry.name)
        };
        let mut file = DiskFile {
            name: full_name.clone(),
            kind: entry.kind.clone(),
            ext: entry.ext.clone(),
            type_code: entry.type_code,
            locked: entry.locked,
            created: entry.created,
            modified: entry.modified,
            ..Default::default()
        };
        if entry.is_directory() {
            disk.files.push(file);
            catalog_walk(fs,&full_name,disk,mode)?;
            continue;
        }
        match fs.read_file(&full_name) {
            Ok((addr,dat)) => {
                file.sha256 = digest(&dat);
                file.size = dat.len();
                file.load_address = addr;
                if mode & INGEST_TEXT != 0 {
                    file.text = render_text(entry.type_code,&dat);
                    file.data = Some(dat);
                }
            },
            Err(e) => {
                // a damaged file does not take down the disk
                warn!("skipping content of {} ({})",full_name,e);
            }
        }
        disk.files.push(file);
    }
    Ok(())
}

/// Detokenize or strip a payload when its type carries text.
fn render_text(type_code: u32,dat: &[u8]) -> Option<Vec<u8>> {
    let family = type_code & 0xff00;
    let native = (type_code & 0xff) as u8;
    let is_applesoft = match (family,native) {
        (fs::TYPE_MASK_APPLEDOS,0x02) => true,
        (fs::TYPE_MASK_PRODOS,0xfc) => true,
        (fs::TYPE_MASK_RDOS,0x01) => true,
        _ => false
    };
    let is_integer = match (family,native) {
        (fs::TYPE_MASK_APPLEDOS,0x01) => true,
        (fs::TYPE_MASK_PRODOS,0xfa) => true,
        _ => false
    };
    let is_text = match (family,native) {
        (fs::TYPE_MASK_APPLEDOS,0x00) => true,
        (fs::TYPE_MASK_PRODOS,0x04) => true,
        (fs::TYPE_MASK_PASCAL,0x03) => true,
        (fs::TYPE_MASK_RDOS,0x03) => true,
        _ => false
    };
    if is_applesoft {
        let tokenizer = lang::applesoft::tokenizer::Tokenizer::new();
        return Some(tokenizer.detokenize(dat).into_bytes());
    }
    if is_integer {
        let tokenizer = lang::integer::tokenizer::Tokenizer::new();
        return Some(tokenizer.detokenize(dat).into_bytes());
    }
    if is_text {
        return Some(crate::strip_text(dat));
    }
    None
}

/// Walk any recognized file system into the descriptor.
fn fs_walk(fs: &mut dyn DiskFS,disk: &mut Disk,mode: u8) -> Result<(),DYNERR> {
    let fmt = fs.get_img().fmt();
    disk.bitmap = fs.used_bitmap()?;
    if fmt.is_block_device() {
        disk.blocks = fmt.blocks();
        if disk.bitmap.len() != disk.blocks {
            return Err(Box::new(fs::Error::CorruptStructure));
        }
        block_walk(fs.get_img(),disk,mode)?;
    } else {
        disk.tracks = fmt.tracks();
        disk.sectors = fmt.usable_sectors();
        if disk.bitmap.len() != disk.tracks*disk.sectors {
            return Err(Box::new(fs::Error::CorruptStructure));
        }
        sector_walk(fs.get_img(),disk,mode)?;
    }
    catalog_walk(fs,"",disk,mode)?;
    // a sector format whose catalog is empty is not that format at all
    if disk.files.len() == 0 && (fmt == DiskFormat::Dos13 || fmt == DiskFormat::Dos16) {
        return Err(Box::new(fs::Error::FileSystemMismatch));
    }
    Ok(())
}

/// Fallback for unrecognized disks: every sector presumed used.
/// Sizes without a known geometry fingerprint the whole image only.
fn generic_walk(img: &mut img::DiskImage,disk: &mut Disk,mode: u8) -> Result<(),DYNERR> {
    let (tracks,sectors) = match img.byte_capacity() {
        img::DOS16_BYTES => (35,16),
        img::DOS13_BYTES => (35,13),
        img::PRODOS_400K_BYTES => (80,20),
        img::PRODOS_800K_BYTES => (80,40),
        _ => (0,0)
    };
    disk.tracks = tracks;
    disk.sectors = sectors;
    disk.bitmap = vec![true;tracks*sectors];
    sector_walk(img,disk,mode)
}
