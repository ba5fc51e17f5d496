//! # `a2census` main library
//!
//! This library catalogs Apple II disk images and answers similarity queries
//! over the resulting catalog.  Operations are built around three layers:
//! * `img::DiskImage` addresses raw sector data through an interleave binding,
//!   it does not try to interpret a file system
//! * `fs::DiskFS` imposes a file system on the decoded sector data
//! * `fp::Disk` is the durable fingerprint of one disk: content hashes at
//!   sector, file, and whole-disk granularity
//!
//! A `DiskFS` object takes ownership of a `DiskImage`.  Changes are not
//! permanent until the image is written back to the host file system; the
//! mutation entry points in `commands::modify` do that, taking a dated backup
//! copy first.
//!
//! ## File Systems
//!
//! The file systems recognized as of this writing:
//! * DOS 3.2 / 3.3 (13 and 16 sector)
//! * ProDOS (140K, 400K, 800K volumes)
//! * Pascal
//! * SSI RDOS (three interleave variants)
//!
//! ## Disk Images
//!
//! Raw sector dumps (DO/PO/D13 style), 2MG wrapped images, and raw nibble
//! streams are understood.  Sector ordering is a property of the codec
//! binding, see `img` for details.
//!
//! ## Fingerprints
//!
//! The `fp` module walks each file system and persists one artifact per disk
//! into a datastore tree that mirrors the source directories.  The `analysis`
//! module compares artifacts pairwise at three granularities using a fixed
//! worker pool.

pub mod bios;
pub mod img;
pub mod fs;
pub mod lang;
pub mod fp;
pub mod analysis;
pub mod commands;

use std::fmt::Write;
use log::{info,warn};

pub type DYNERR = Box<dyn std::error::Error>;
pub type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Given a bytestream return a DiskFS, or Err if the bytestream cannot be
/// interpreted as any known file system.  The file system takes ownership
/// of the underlying disk image.  `maybe_path` supplies the ordering hint
/// taken from the file extension (`.po` or `.do`).
pub fn create_fs_from_bytestream(disk_img_data: Vec<u8>,maybe_path: Option<&str>) -> Result<Box<dyn fs::DiskFS>,DYNERR> {
    let img = img::DiskImage::from_bytes(disk_img_data,maybe_path)?;
    create_fs_from_img(img)
}

/// Wrap an already identified disk image in the matching file system module.
pub fn create_fs_from_img(img: img::DiskImage) -> Result<Box<dyn fs::DiskFS>,DYNERR> {
    match img.fmt() {
        img::DiskFormat::Dos13 | img::DiskFormat::Dos16 => {
            info!("identified DOS 3.x file system");
            Ok(Box::new(fs::dos3x::Disk::from_img(img)))
        },
        img::DiskFormat::ProDos | img::DiskFormat::ProDos400 | img::DiskFormat::ProDos800 => {
            info!("identified ProDOS file system");
            Ok(Box::new(fs::prodos::Disk::from_img(img)))
        },
        img::DiskFormat::Pascal => {
            info!("identified Pascal file system");
            Ok(Box::new(fs::pascal::Disk::from_img(img)))
        },
        img::DiskFormat::Rdos3 | img::DiskFormat::Rdos32 | img::DiskFormat::Rdos33 => {
            info!("identified RDOS file system");
            Ok(Box::new(fs::rdos::Disk::from_img(img)))
        },
        _ => {
            warn!("cannot match any file system");
            Err(Box::new(fs::Error::FileSystemMismatch))
        }
    }
}

/// Calls `create_fs_from_bytestream` getting the bytes from a file.
/// The file extension is passed along as the ordering hint.
pub fn create_fs_from_file(img_path: &str) -> Result<Box<dyn fs::DiskFS>,DYNERR> {
    match std::fs::read(img_path) {
        Ok(disk_img_data) => create_fs_from_bytestream(disk_img_data,Some(img_path)),
        Err(e) => Err(Box::new(e))
    }
}

/// Calls `img::DiskImage::from_bytes` getting the bytes from a file.
pub fn create_img_from_file(img_path: &str) -> Result<img::DiskImage,DYNERR> {
    match std::fs::read(img_path) {
        Ok(disk_img_data) => Ok(img::DiskImage::from_bytes(disk_img_data,Some(img_path))?),
        Err(e) => Err(Box::new(e))
    }
}

/// This takes any bytes and makes an ascii friendly string
/// by using hex escapes, e.g., `\xFF`.
/// if `escape_cc` is true, ascii control characters are also escaped.
/// if `inverted` is true, assume we have negative ascii bytes.
pub fn escaped_ascii_from_bytes(bytes: &[u8],escape_cc: bool,inverted: bool) -> String {
    let mut result = String::new();
    let (lb,ub) = match (escape_cc,inverted) {
        (true,false) => (0x20,0x7e),
        (false,false) => (0x00,0x7f),
        (true,true) => (0xa0,0xfe),
        (false,true) => (0x80,0xff)
    };
    for i in 0..bytes.len() {
        if bytes[i]>=lb && bytes[i]<=ub {
            if inverted {
                result += std::str::from_utf8(&[bytes[i]-0x80]).expect("unreachable");
            } else {
                result += std::str::from_utf8(&[bytes[i]]).expect("unreachable");
            }
        } else {
            let mut temp = String::new();
            write!(&mut temp,"\\x{:02X}",bytes[i]).expect("unreachable");
            result += &temp;
        }
    }
    return result;
}

/// Interpret a UTF8 string as pure ascii and put into bytes.
/// Non-ascii characters are omitted from the result.
/// if `inverted` is true the sign of the bytes is flipped.
/// if `caps` is true the ascii is put in upper case.
pub fn parse_escaped_ascii(s: &str,inverted: bool,caps: bool) -> Vec<u8> {
    let mut ans: Vec<u8> = Vec::new();
    for c in s.chars() {
        if c.is_ascii() {
            let mut buf: [u8;1] = [0;1];
            if caps {
                c.to_uppercase().next().unwrap().encode_utf8(&mut buf);
            } else {
                c.encode_utf8(&mut buf);
            }
            ans.push(buf[0] + match inverted { true => 128, false => 0 });
        }
    }
    return ans;
}

/// Strip the high bit from every byte, the usual reduction of
/// Apple II text to plain ascii.
pub fn strip_text(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().map(|b| b & 0x7f).collect()
}
