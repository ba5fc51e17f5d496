//! ## Mutations
//!
//! Every mutation follows the same discipline: read the whole image
//! into memory, apply the codec operation against the in-memory copy,
//! back up the original under a dated name, then write the modified
//! bytes back.  A failure after the read leaves the on-disk image
//! untouched.  Backups are never garbage collected here.
//!
//! The fingerprint store is not told about mutations; an existing
//! artifact for the disk goes stale until the disk is re-ingested.

use log::warn;

use crate::fs::{DiskFS,FileKind};
use crate::fp;
use crate::{DYNERR,STDRESULT};

/// Copy the original file to `<binpath>/backup/<path>.<YYYYMMDDhhmmss>`
/// with colons stripped from the path.  Returns the backup path.
pub fn backup_file(binpath: &str,path: &str) -> Result<String,DYNERR> {
    let data = std::fs::read(path)?;
    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
    let bpath = format!("{}/backup/{}.{}",binpath,
        fp::normalize_path(path).trim_start_matches('/'),stamp);
    if let Some(parent) = std::path::Path::new(&bpath).parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&bpath,data)?;
    eprintln!("Backed up disk to: {}",bpath);
    Ok(bpath)
}

/// Commit the in-memory image: backup first, then overwrite.
pub fn save_disk(fs: &mut Box<dyn DiskFS>,path: &str,binpath: &str) -> STDRESULT {
    backup_file(binpath,path)?;
    std::fs::write(path,fs.get_img().to_bytes())?;
    warn!("any existing fingerprint for {} is now stale, re-ingest to refresh",path);
    eprintln!("Updated disk {}",path);
    Ok(())
}

/// Infer the payload kind and on-disk name from a local file name.
/// `HELLO.APP` puts applesoft tokens named HELLO, `DATA.TXT` puts text
/// named DATA, anything unrecognized puts binary.
pub fn kind_from_name(local_name: &str) -> (String,FileKind,u16) {
    let (stem,ext) = match local_name.rsplit_once('.') {
        Some((s,e)) => (s.to_string(),e.to_uppercase()),
        None => (local_name.to_string(),String::new())
    };
    match ext.as_str() {
        "APP" | "BAS" | "A" => (stem,FileKind::ApplesoftTokens,0x801),
        "INT" | "I" => (stem,FileKind::IntegerTokens,0x801),
        "TXT" | "T" => (stem,FileKind::Text,0),
        _ => (stem,FileKind::Binary,0x2000)
    }
}

/// Put a local file onto the disk image.
pub fn put(disk_path: &str,local_path: &str,binpath: &str) -> STDRESULT {
    let dat = std::fs::read(local_path)?;
    let local_name = match fp::normalize_path(local_path).rsplit_once('/') {
        Some((_d,b)) => b.to_string(),
        None => local_path.to_string()
    };
    let (name,kind,addr) = kind_from_name(&local_name);
    let mut fs = crate::create_fs_from_file(disk_path)?;
    fs.write_file(&name,kind,&dat,addr)?;
    save_disk(&mut fs,disk_path,binpath)
}

/// Delete a file from the disk image.
pub fn delete(disk_path: &str,name: &str,binpath: &str) -> STDRESULT {
    let mut fs = crate::create_fs_from_file(disk_path)?;
    fs.delete(name)?;
    save_disk(&mut fs,disk_path,binpath)
}

/// Rename a file on the disk image.
pub fn rename(disk_path: &str,name: &str,new_name: &str,binpath: &str) -> STDRESULT {
    let mut fs = crate::create_fs_from_file(disk_path)?;
    fs.rename(name,new_name)?;
    save_disk(&mut fs,disk_path,binpath)
}

/// Lock or unlock a file on the disk image.
pub fn set_locked(disk_path: &str,name: &str,lock: bool,binpath: &str) -> STDRESULT {
    let mut fs = crate::create_fs_from_file(disk_path)?;
    match lock {
        true => fs.lock(name)?,
        false => fs.unlock(name)?
    };
    save_disk(&mut fs,disk_path,binpath)
}

/// Create a directory on the disk image (ProDOS).
pub fn make_directory(disk_path: &str,name: &str,binpath: &str) -> STDRESULT {
    let mut fs = crate::create_fs_from_file(disk_path)?;
    fs.create_dir(name)?;
    save_disk(&mut fs,disk_path,binpath)
}

/// Change the volume name or number of the disk image.
pub fn set_volume(disk_path: &str,name: &str,binpath: &str) -> STDRESULT {
    let mut fs = crate::create_fs_from_file(disk_path)?;
    fs.set_volume_name(name)?;
    save_disk(&mut fs,disk_path,binpath)
}

/// Extract one file from the disk image to the local directory.
pub fn extract(disk_path: &str,name: &str) -> STDRESULT {
    let mut fs = crate::create_fs_from_file(disk_path)?;
    let (_addr,dat) = fs.read_file(name)?;
    let local = name.replace("/","_");
    std::fs::write(&local,dat)?;
    eprintln!("extracted {}",local);
    Ok(())
}

/// Render the disk's catalog as text lines.
pub fn catalog(disk_path: &str) -> Result<String,DYNERR> {
    let mut fs = crate::create_fs_from_file(disk_path)?;
    let mut out = String::new();
    let mut stack: Vec<String> = vec![String::new()];
    while let Some(path) = stack.pop() {
        for entry in fs.catalog(&path,"*")? {
            let full = match path.len() {
                0 => entry.name.clone(),
                _ => format!("{}/{}",path,entry.name)
            };
            let lock_flag = match entry.locked { true => "*", false => " " };
            out += &format!("{}{:<24} {:<4} {:>5}  {}\n",lock_flag,full,entry.ext,entry.size_units,entry.kind);
            if entry.is_directory() {
                stack.push(full);
            }
        }
    }
    Ok(out)
}
