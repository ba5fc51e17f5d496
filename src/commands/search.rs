//! ## Searches
//!
//! Queries over the store by file name, content hash, or embedded text,
//! with optional extraction of the matched files or their whole disks.

use std::io::Write;
use log::warn;

use crate::fp::{self,store::Store};
use crate::{DYNERR,STDRESULT};
use super::report::load_all;

/// What to pull out of the store alongside a search hit.
#[derive(Clone,Copy,PartialEq)]
pub enum ExtractMode {
    None,
    /// `@`: write the matched file's payload under the extract tree
    Files,
    /// `#`: copy the matched disk image under the extract tree
    Disk
}

impl ExtractMode {
    pub fn from_flag(flag: &str) -> Self {
        match flag {
            "@" => Self::Files,
            "#" => Self::Disk,
            _ => Self::None
        }
    }
}

fn extract_file(binpath: &str,disk: &fp::Disk,f: &fp::DiskFile,adorned: bool) -> STDRESULT {
    let dat = match &f.data {
        Some(d) => d.clone(),
        None => {
            warn!("{} was ingested without data, re-ingest to extract",f.name);
            return Ok(());
        }
    };
    let name = match adorned {
        true => f.adorned_name(),
        false => f.name.clone()
    };
    let dest = format!("{}/extract/{}/{}",binpath,
        fp::normalize_path(&disk.full_path).trim_start_matches('/'),
        name.replace("/","_"));
    if let Some(parent) = std::path::Path::new(&dest).parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&dest,dat)?;
    eprintln!("extracted {}",dest);
    Ok(())
}

fn extract_disk(binpath: &str,disk: &fp::Disk) -> STDRESULT {
    let dest = format!("{}/extract/{}",binpath,
        fp::normalize_path(&disk.full_path).trim_start_matches('/'));
    if let Some(parent) = std::path::Path::new(&dest).parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(&disk.full_path,&dest)?;
    eprintln!("extracted {}",dest);
    Ok(())
}

fn report_hit(out: &mut dyn Write,disk: &fp::Disk,f: &fp::DiskFile) -> STDRESULT {
    writeln!(out,"{:>32}:\n  {} ({}, {} bytes, sha: {})\n",disk.full_path,f.name,f.kind,f.size,f.sha256)?;
    Ok(())
}

/// Search for files whose name contains `needle` (case-insensitive).
pub fn search_filename(store: &Store,filters: &[String],needle: &str,extract: ExtractMode,
                       adorned: bool,binpath: &str,out: &mut dyn Write) -> Result<usize,DYNERR> {
    let target = needle.to_lowercase();
    let mut hits = 0;
    writeln!(out,"SEARCH RESULTS FOR '{}'\n",needle)?;
    for (_path,disk) in load_all(store,filters)? {
        for f in &disk.files {
            if f.name.to_lowercase().contains(&target) {
                hits += 1;
                report_hit(out,&disk,f)?;
                match extract {
                    ExtractMode::Files => extract_file(binpath,&disk,f,adorned)?,
                    ExtractMode::Disk => extract_disk(binpath,&disk)?,
                    ExtractMode::None => {}
                }
            }
        }
    }
    Ok(hits)
}

/// Search for files with an exact content hash.
pub fn search_sha(store: &Store,filters: &[String],sha: &str,extract: ExtractMode,
                  adorned: bool,binpath: &str,out: &mut dyn Write) -> Result<usize,DYNERR> {
    let target = sha.to_lowercase();
    let mut hits = 0;
    writeln!(out,"SEARCH RESULTS FOR SHA256 '{}'\n",sha)?;
    for (_path,disk) in load_all(store,filters)? {
        for f in &disk.files {
            if f.sha256 == target {
                hits += 1;
                report_hit(out,&disk,f)?;
                match extract {
                    ExtractMode::Files => extract_file(binpath,&disk,f,adorned)?,
                    ExtractMode::Disk => extract_disk(binpath,&disk)?,
                    ExtractMode::None => {}
                }
            }
        }
    }
    Ok(hits)
}

/// Search the captured text renderings for a substring.  Only files
/// ingested under the text mode can hit.
pub fn search_text(store: &Store,filters: &[String],text: &str,extract: ExtractMode,
                   adorned: bool,binpath: &str,out: &mut dyn Write) -> Result<usize,DYNERR> {
    let target = text.to_lowercase();
    let mut hits = 0;
    writeln!(out,"SEARCH RESULTS FOR TEXT '{}'\n",text)?;
    for (_path,disk) in load_all(store,filters)? {
        for f in &disk.files {
            let rendered = match &f.text {
                Some(t) => String::from_utf8_lossy(t).to_lowercase(),
                None => continue
            };
            if rendered.contains(&target) {
                hits += 1;
                report_hit(out,&disk,f)?;
                match extract {
                    ExtractMode::Files => extract_file(binpath,&disk,f,adorned)?,
                    ExtractMode::Disk => extract_disk(binpath,&disk)?,
                    ExtractMode::None => {}
                }
            }
        }
    }
    Ok(hits)
}
