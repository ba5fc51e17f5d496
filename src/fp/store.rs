//! ## Fingerprint Store
//!
//! A directory tree rooted at the datastore path, mirroring the source
//! disks' directories.  Each artifact is one MessagePack encoded
//! `fp::Disk`, named `<fmt>_<whole>_<active>_<md5(basename)>.fgp`, so
//! format and hash queries can run on file names alone.
//!
//! The store is append only: an artifact is written once and never
//! modified, unless the caller forces a re-ingest.  A mutex guarded map
//! caches decoded artifacts by path.

use std::collections::HashMap;
use std::path::{Path,PathBuf};
use std::sync::{Arc,Mutex};
use log::{debug,info};
use md5::{Md5,Digest};
use regex::Regex;

use super::Disk;
use crate::DYNERR;

pub struct Store {
    root: PathBuf,
    cache: Mutex<HashMap<String,Arc<Disk>>>
}

/// Compile an artifact name glob (`*` and `?` over `_` separated hash
/// fields) into an anchored case-insensitive regex.
fn name_pattern(pattern: &str) -> Result<Regex,DYNERR> {
    let tmp = pattern.replace(".","[.]").replace("?",".").replace("*",".+");
    Ok(Regex::new(&format!("(?i){}$",tmp))?)
}

impl Store {
    pub fn new(root: &str) -> Self {
        Self {
            root: PathBuf::from(root),
            cache: Mutex::new(HashMap::new())
        }
    }
    pub fn root(&self) -> &Path {
        &self.root
    }
    /// Where the artifact for this descriptor belongs.
    pub fn artifact_path(&self,disk: &Disk) -> PathBuf {
        self.root.join(disk.mirror_dir()).join(disk.artifact_name())
    }
    pub fn contains(&self,disk: &Disk) -> bool {
        self.artifact_path(disk).is_file()
    }
    /// Persist a descriptor, creating mirror directories as needed.
    /// Returns the artifact path.
    pub fn put(&self,disk: &Disk) -> Result<String,DYNERR> {
        let path = self.artifact_path(disk);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path,disk.to_bytes()?)?;
        info!("created {}",path.display());
        Ok(path.to_string_lossy().to_string())
    }
    /// Decode an artifact, through the cache.
    pub fn get(&self,path: &str) -> Result<Arc<Disk>,DYNERR> {
        {
            let cache = self.cache.lock().expect("poisoned cache lock");
            if let Some(disk) = cache.get(path) {
                return Ok(disk.clone());
            }
        }
        let dat = std::fs::read(path)?;
        let disk = Arc::new(Disk::from_bytes(&dat)?);
        let mut cache = self.cache.lock().expect("poisoned cache lock");
        cache.insert(path.to_string(),disk.clone());
        Ok(disk)
    }
    fn walk(dir: &Path,out: &mut Vec<PathBuf>) {
        if let Ok(listing) = std::fs::read_dir(dir) {
            for item in listing.flatten() {
                let path = item.path();
                if path.is_dir() {
                    Self::walk(&path,out);
                } else {
                    out.push(path);
                }
            }
        }
    }
    /// All artifact paths whose file name matches `pattern` and whose
    /// full path passes the caller's path filters.
    pub fn glob(&self,pattern: &str,filters: &[String]) -> Result<Vec<String>,DYNERR> {
        let re = name_pattern(pattern)?;
        let mut all: Vec<PathBuf> = Vec::new();
        Self::walk(&self.root,&mut all);
        let mut out: Vec<String> = Vec::new();
        for path in all {
            let base = match path.file_name() {
                Some(n) => n.to_string_lossy().to_string(),
                None => continue
            };
            if re.is_match(&base) {
                out.push(path.to_string_lossy().to_string());
            }
        }
        let filter_re = self.resolve_path_filters(filters,pattern)?;
        if filter_re.len() > 0 {
            out.retain(|p| {
                let cleaned = super::normalize_path(p);
                filter_re.iter().any(|re| re.is_match(&cleaned))
            });
        }
        out.sort();
        Ok(out)
    }
    /// Path filters are caller supplied paths into the source tree.  A
    /// directory narrows matches to its mirror; a file narrows matches
    /// to artifacts carrying that file's basename hash.
    fn resolve_path_filters(&self,filters: &[String],pattern: &str) -> Result<Vec<Regex>,DYNERR> {
        let tmp = pattern.replace(".","[.]").replace("?",".").replace("*",".+");
        let base = super::normalize_path(&self.root.to_string_lossy());
        let mut out = Vec::new();
        for f in filters {
            let abs = match std::fs::canonicalize(f) {
                Ok(p) => p,
                Err(_) => {
                    debug!("path filter {} does not resolve, ignoring",f);
                    continue;
                }
            };
            let cleaned = super::normalize_path(&abs.to_string_lossy());
            let expr = match abs.is_dir() {
                true => format!("{}/{}/{}$",base,cleaned.trim_matches('/'),tmp),
                false => {
                    let bname = abs.file_name().expect("file filter with no name").to_string_lossy().to_string();
                    let dir = match cleaned.rsplit_once('/') {
                        Some((d,_)) => d.trim_matches('/').to_string(),
                        None => String::new()
                    };
                    let sum = Md5::digest(bname.as_bytes());
                    format!("{}/{}/.+_.+_.+_{}[.]fgp$",base,dir,hex::encode(sum))
                }
            };
            out.push(Regex::new(&expr)?);
        }
        Ok(out)
    }
}
