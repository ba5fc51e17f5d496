//! ## Bulk Ingest
//!
//! A single directory walker feeds image paths into a bounded channel;
//! a fixed pool of workers analyzes one disk each, end to end, and
//! writes the artifact.  The workers share two counters and two small
//! per-format maps behind a mutex; nothing else on this path is shared
//! mutable state.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path,PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use crossbeam_channel::bounded;
use log::error;
use regex::Regex;

use crate::fp::{builder,store::Store};
use crate::DYNERR;

pub const INGEST_WORKERS: usize = 8;
pub const INGEST_QUEUE_DEPTH: usize = 16;

#[derive(Default)]
pub struct IngestSummary {
    pub processed: usize,
    pub errored: usize,
    /// disks analyzed, by format name
    pub in_counts: HashMap<String,usize>,
    /// artifacts written, by format name
    pub out_counts: HashMap<String,usize>
}

fn gather(dir: &Path,patt: &Regex,out: &mut Vec<PathBuf>) {
    if let Ok(listing) = std::fs::read_dir(dir) {
        for item in listing.flatten() {
            let path = item.path();
            if path.is_dir() {
                gather(&path,patt,out);
            } else if patt.is_match(&path.to_string_lossy()) {
                out.push(path);
            }
        }
    }
}

/// Ingest a whole directory tree of disk images into the store.
pub fn walk(dir: &str,store: &Store,mode: u8,force: bool) -> Result<IngestSummary,DYNERR> {
    let start = Instant::now();
    let patt = Regex::new(r"(?i)[.](po|do|dsk|d13|nib|2mg|2img)$")?;
    let mut paths: Vec<PathBuf> = Vec::new();
    gather(Path::new(dir),&patt,&mut paths);

    let summary = Mutex::new(IngestSummary::default());
    let (tx,rx) = bounded::<PathBuf>(INGEST_QUEUE_DEPTH);
    std::thread::scope(|scope| {
        for _i in 0..INGEST_WORKERS {
            let rx = rx.clone();
            let summary = &summary;
            scope.spawn(move || {
                while let Ok(path) = rx.recv() {
                    match ingest_one(&path.to_string_lossy(),store,mode,force) {
                        Ok((fmt,wrote)) => {
                            let mut lock = summary.lock().expect("poisoned ingest lock");
                            lock.processed += 1;
                            *lock.in_counts.entry(fmt.clone()).or_insert(0) += 1;
                            if wrote {
                                *lock.out_counts.entry(fmt).or_insert(0) += 1;
                            }
                        },
                        Err(e) => {
                            error!("error processing volume {}: {}",path.display(),e);
                            let mut lock = summary.lock().expect("poisoned ingest lock");
                            lock.errored += 1;
                        }
                    }
                }
            });
        }
        for path in paths {
            if tx.send(path).is_err() {
                break;
            }
            let processed = summary.lock().expect("poisoned ingest lock").processed;
            let mut err = std::io::stderr();
            let _ = write!(err,"\rIngested: {} volumes ...",processed);
            let _ = err.flush();
        }
        drop(tx);
    });

    let ans = summary.into_inner().expect("poisoned ingest lock");
    let mut err = std::io::stderr();
    let _ = writeln!(err,"\rIngested: {} volumes ({} errors) in {:?}",ans.processed,ans.errored,start.elapsed());
    Ok(ans)
}

/// Analyze one image and write its artifact unless it already exists.
/// Returns the format name and whether an artifact was written.
pub fn ingest_one(path: &str,store: &Store,mode: u8,force: bool) -> Result<(String,bool),DYNERR> {
    let disk = builder::analyze_file(path,mode)?;
    let fmt = disk.format.clone();
    if force || !store.contains(&disk) {
        store.put(&disk)?;
        return Ok((fmt,true));
    }
    Ok((fmt,false))
}

/// Render the end-of-run per-format table the walker prints.
pub fn summary_table(summary: &IngestSummary) -> String {
    let mut out = String::new();
    out += "=============================================================\n";
    out += &format!(" ingest report ({} workers)\n",INGEST_WORKERS);
    out += "=============================================================\n";
    let (mut tin,mut tout) = (0,0);
    let mut formats: Vec<&String> = summary.in_counts.keys().collect();
    formats.sort();
    for fmt in formats {
        let count = summary.in_counts[fmt];
        let outcount = *summary.out_counts.get(fmt).unwrap_or(&0);
        out += &format!("{:<30} {:>6} in {:>6} out\n",fmt,count,outcount);
        tin += count;
        tout += outcount;
    }
    out += &format!("\n{:<30} {:>6} in {:>6} out\n","Total",tin,tout);
    out
}
