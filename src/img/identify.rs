//! ## Format Identification
//!
//! Classifies a raw image into one of the supported formats and binds the
//! sector ordering.  The decision list runs in order, first positive wins:
//! 2MG container, ProDOS volume header, RDOS signature, AppleDOS VTOC plus
//! catalog, Pascal volume directory, then length based fallbacks.  The
//! identification is pure with respect to the image bytes plus the file
//! name suffix hint; the hint only biases ambiguous fallbacks.
//!
//! The probes here are deliberately shallow.  They read just enough of
//! each candidate structure to accept or reject it; the full walks live
//! in the `fs` codecs.

use log::{debug,info};
use super::{dot2mg,DiskImage,DiskFormat,SectorOrder};

/// File types a DOS 3.x catalog may carry, low 7 bits of the type byte.
const DOS_TYPES: [u8;8] = [0x00,0x01,0x02,0x04,0x08,0x10,0x20,0x40];

const RDOS_SIG_2: [u8;6] = [0xd2,0xc4,0xcf,0xd3,0xa0,0xb2]; // "RDOS 2"
const RDOS_SIG_3: [u8;6] = [0xd2,0xc4,0xcf,0xd3,0xa0,0xb3]; // "RDOS 3"

#[derive(PartialEq,Clone,Copy)]
enum Hint {
    None,
    ProDos,
    Dos
}

fn hint_from_path(maybe_path: Option<&str>) -> Hint {
    match maybe_path {
        Some(p) => {
            let lower = p.to_lowercase();
            if lower.ends_with(".po") {
                Hint::ProDos
            } else if lower.ends_with(".do") {
                Hint::Dos
            } else {
                Hint::None
            }
        },
        None => Hint::None
    }
}

/// Establish format and ordering on the image.  A contained 2MG payload
/// replaces the image bytes before the rest of the list runs.
pub fn identify(img: &mut DiskImage,maybe_path: Option<&str>) {
    let hint = hint_from_path(maybe_path);
    img.set_fmt(DiskFormat::Unknown);

    if let Some(wrapped) = dot2mg::unwrap(img.data()) {
        img.replace_data(wrapped.payload);
        if wrapped.img_fmt == 1 {
            // ProDOS ordered payload: the block count selects the volume size
            let (fmt,order) = match wrapped.blocks {
                1600 => (DiskFormat::ProDos800,SectorOrder::ProDosLinear),
                800 => (DiskFormat::ProDos400,SectorOrder::ProDosLinear),
                _ => (DiskFormat::ProDos,SectorOrder::ProDosLinear)
            };
            img.set_fmt(fmt);
            img.set_order(order);
            info!("2MG payload declared {}",fmt);
            return;
        }
        // DOS ordered payload: fall through and identify the payload itself
        info!("2MG payload declared DOS ordered");
    }

    if try_prodos(img) {
        return;
    }
    if try_rdos(img) {
        return;
    }
    if try_appledos(img) {
        return;
    }
    if try_pascal(img) {
        return;
    }

    // Length based fallbacks.  The hint only matters here.
    match img.byte_capacity() {
        super::NIB_BYTES => {
            info!("raw nibble stream, marking DOS 16");
            img.set_fmt(DiskFormat::Dos16);
            img.set_order(SectorOrder::Dos33);
        },
        super::DOS16_BYTES => {
            if hint == Hint::ProDos {
                img.set_fmt(DiskFormat::ProDos);
                img.set_order(SectorOrder::ProDos);
            } else {
                img.set_fmt(DiskFormat::Dos16);
                img.set_order(SectorOrder::Dos33);
            }
            debug!("file system unrecognized on standard 140K image");
        },
        super::DOS13_BYTES => {
            img.set_fmt(DiskFormat::Dos13);
            img.set_order(SectorOrder::Dos32);
            debug!("file system unrecognized on 13 sector image");
        },
        super::PRODOS_800K_BYTES => {
            img.set_fmt(DiskFormat::ProDos800);
            img.set_order(SectorOrder::ProDosLinear);
            debug!("file system unrecognized on 800K image");
        },
        _ => {
            debug!("image unrecognized, {} bytes",img.byte_capacity());
        }
    }
}

/// Peek at the volume directory header under the current binding.
/// Returns (storage_type, total_blocks).
fn peek_vdh(img: &mut DiskImage) -> Option<(u8,usize)> {
    match img.read_block(2) {
        Ok(buf) => Some((buf[4] >> 4, u16::from_le_bytes([buf[41],buf[42]]) as usize)),
        Err(_) => None
    }
}

fn try_prodos(img: &mut DiskImage) -> bool {
    let (fmt,expected,orders): (DiskFormat,usize,&[SectorOrder]) = match img.byte_capacity() {
        super::DOS16_BYTES => (DiskFormat::ProDos,280,
            &[SectorOrder::Dos33,SectorOrder::Dos33Alt,SectorOrder::ProDos,SectorOrder::ProDosLinear]),
        super::PRODOS_400K_BYTES => (DiskFormat::ProDos400,800,&[SectorOrder::ProDosLinear]),
        super::PRODOS_800K_BYTES => (DiskFormat::ProDos800,1600,&[SectorOrder::ProDosLinear]),
        _ => return false
    };
    for order in orders {
        img.set_fmt(fmt);
        img.set_order(*order);
        if let Some((storage,total)) = peek_vdh(img) {
            if storage == 0xf && total == expected {
                info!("ProDOS volume of {} blocks, {} order",total,order);
                return true;
            }
        }
    }
    img.set_fmt(DiskFormat::Unknown);
    return false;
}

fn try_rdos(img: &mut DiskImage) -> bool {
    let len = img.byte_capacity();
    if len != super::DOS16_BYTES && len != super::DOS13_BYTES {
        return false;
    }
    let stride = (len / 35) / 256;
    let sig = &img.data()[stride*256..stride*256+6];
    // some images carry the leading 'R' without its high bit
    let matches = |expect: &[u8;6]| -> bool {
        sig[0] & 0x7f == expect[0] & 0x7f && sig[1..6] == expect[1..6]
    };
    let (fmt,order) = match stride {
        13 if matches(&RDOS_SIG_2) => (DiskFormat::Rdos32,SectorOrder::Dos33Alt),
        16 if matches(&RDOS_SIG_2) => (DiskFormat::Rdos3,SectorOrder::Dos33Alt),
        16 if matches(&RDOS_SIG_3) => (DiskFormat::Rdos33,SectorOrder::ProDos),
        _ => return false
    };
    info!("RDOS signature at stride {}",stride);
    img.set_fmt(fmt);
    img.set_order(order);
    return true;
}

/// Shallow VTOC plus catalog probe: the VTOC geometry must match the
/// image, and the catalog chain must yield at least one valid file
/// descriptor before we commit to the binding.
fn appledos_probe(img: &mut DiskImage,sectors: usize) -> bool {
    let vtoc = match img.seek(17,0).and(img.read()) {
        Ok(buf) => buf,
        Err(_) => return false
    };
    if vtoc[0x34] != 35 || vtoc[0x35] as usize != sectors {
        return false;
    }
    let (mut ct,mut cs) = (vtoc[1] as usize,vtoc[2] as usize);
    let mut count = 0;
    while count < 105 {
        let buf = match img.seek(ct,cs).and(img.read()) {
            Ok(b) => b,
            Err(_) => return false
        };
        for e in 0..7 {
            let entry = &buf[0x0b + 35*e..0x0b + 35*(e+1)];
            if entry[0] == 0xff || entry[0] == 0x00 {
                continue;
            }
            if DOS_TYPES.contains(&(entry[2] & 0x7f)) && entry[3..33].iter().all(|b| *b >= 32) {
                return true;
            }
        }
        count += 7;
        ct = buf[1] as usize;
        cs = buf[2] as usize;
        if ct == 0 {
            return false;
        }
    }
    return false;
}

fn try_appledos(img: &mut DiskImage) -> bool {
    let (fmt,sectors) = match img.byte_capacity() {
        super::DOS16_BYTES => (DiskFormat::Dos16,16),
        super::DOS13_BYTES => (DiskFormat::Dos13,13),
        _ => return false
    };
    let orders = [SectorOrder::Dos33,SectorOrder::Dos33Alt,SectorOrder::ProDos,SectorOrder::ProDosLinear];
    for order in orders {
        img.set_fmt(fmt);
        img.set_order(order);
        if appledos_probe(img,sectors) {
            info!("AppleDOS {} sector catalog, {} order",sectors,order);
            return true;
        }
    }
    img.set_fmt(DiskFormat::Unknown);
    return false;
}

fn try_pascal(img: &mut DiskImage) -> bool {
    if img.byte_capacity() != super::DOS16_BYTES {
        return false;
    }
    img.set_fmt(DiskFormat::ProDos);
    img.set_order(SectorOrder::Dos33);
    let buf = match img.read_block(2) {
        Ok(b) => b,
        Err(_) => {
            img.set_fmt(DiskFormat::Unknown);
            return false;
        }
    };
    let ok = buf[0] == 0 && buf[1] == 0 && buf[4] == 0 && buf[5] == 0
        && buf[6] >= 1 && buf[6] <= 7
        && buf[7..7+buf[6] as usize].iter().all(|c| {
            *c >= 0x20 && *c < 0x7f && !"$=?,[#:".contains(*c as char)
        });
    if ok {
        info!("Pascal volume directory at block 2");
        img.set_fmt(DiskFormat::Pascal);
        return true;
    }
    img.set_fmt(DiskFormat::Unknown);
    return false;
}
