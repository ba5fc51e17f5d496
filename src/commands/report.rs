//! ## Reports
//!
//! Duplicate and fuzzy-match reports over the fingerprint store, in
//! text or CSV.  Exact duplicates are grouped by hash without any
//! pairwise work; fuzzy reports run the worker pool sweep.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use log::warn;

use crate::analysis::{self,pool::{self,CancelToken},KeepPredicate,PairOverlap};
use crate::fp::{self,store::Store};
use crate::{DYNERR,STDRESULT};

#[derive(Clone,Copy,PartialEq)]
pub enum Granularity {
    AllSectors,
    ActiveSectors,
    Files
}

#[derive(Clone,Copy,PartialEq)]
pub enum OutputFormat {
    Text,
    Csv
}

/// Extra cuts applied to fuzzy file reports after the predicate.
#[derive(Clone,Copy,Default)]
pub struct PairFilters {
    pub min_same: usize,
    pub max_diff: usize
}

impl PairFilters {
    fn keep(&self,ov: &PairOverlap) -> bool {
        if self.min_same > 0 && ov.same < self.min_same {
            return false;
        }
        if self.max_diff > 0 && ov.missing + ov.extra > self.max_diff {
            return false;
        }
        true
    }
}

/// Decode every artifact the filters allow.
pub fn load_all(store: &Store,filters: &[String]) -> Result<Vec<(String,Arc<fp::Disk>)>,DYNERR> {
    let mut ans = Vec::new();
    for path in store.glob("*_*_*_*.fgp",filters)? {
        match store.get(&path) {
            Ok(disk) => ans.push((path,disk)),
            Err(e) => warn!("skipping artifact {} ({})",path,e)
        }
    }
    Ok(ans)
}

fn render_clusters(title: &str,clusters: &Vec<Vec<String>>,fmt: OutputFormat,out: &mut dyn Write) -> STDRESULT {
    match fmt {
        OutputFormat::Text => {
            writeln!(out,"{}",title)?;
            writeln!(out,"{}","=".repeat(title.len()))?;
            for cluster in clusters {
                writeln!(out)?;
                for member in cluster {
                    writeln!(out,"  {}",member)?;
                }
            }
            writeln!(out,"\n{} duplicate groups",clusters.len())?;
        },
        OutputFormat::Csv => {
            writeln!(out,"group,member")?;
            for (i,cluster) in clusters.iter().enumerate() {
                for member in cluster {
                    writeln!(out,"{},\"{}\"",i,member)?;
                }
            }
        }
    }
    Ok(())
}

/// Disks sharing a whole-image hash.
pub fn whole_dupes(store: &Store,filters: &[String]) -> Result<Vec<Vec<String>>,DYNERR> {
    let mut groups: HashMap<String,Vec<String>> = HashMap::new();
    for (_path,disk) in load_all(store,filters)? {
        groups.entry(disk.sha256.clone()).or_insert(Vec::new()).push(disk.full_path.clone());
    }
    let mut ans: Vec<Vec<String>> = groups.into_values().filter(|v| v.len() > 1).collect();
    for v in ans.iter_mut() {
        v.sort();
    }
    ans.sort();
    Ok(ans)
}

/// Disks sharing an active-sector hash but not a whole-image hash.
pub fn active_dupes(store: &Store,filters: &[String]) -> Result<Vec<Vec<String>>,DYNERR> {
    let mut groups: HashMap<String,Vec<(String,String)>> = HashMap::new();
    for (_path,disk) in load_all(store,filters)? {
        groups.entry(disk.sha256_active.clone()).or_insert(Vec::new())
            .push((disk.full_path.clone(),disk.sha256.clone()));
    }
    let mut ans: Vec<Vec<String>> = Vec::new();
    for members in groups.into_values() {
        if members.len() < 2 {
            continue;
        }
        // all sharing the whole hash is already a whole-disk dupe group
        let first = &members[0].1;
        if members.iter().all(|(_p,sha)| sha == first) {
            continue;
        }
        let mut cluster: Vec<String> = members.into_iter().map(|(p,_s)| p).collect();
        cluster.sort();
        ans.push(cluster);
    }
    ans.sort();
    Ok(ans)
}

/// Files sharing a content hash across disks.
pub fn file_dupes(store: &Store,filters: &[String]) -> Result<Vec<Vec<String>>,DYNERR> {
    let mut groups: HashMap<String,Vec<String>> = HashMap::new();
    for (_path,disk) in load_all(store,filters)? {
        for f in analysis::comparable_files(&disk) {
            groups.entry(f.sha256.clone()).or_insert(Vec::new())
                .push(format!("{} :: {} ({} bytes)",disk.full_path,f.name,f.size));
        }
    }
    let mut ans: Vec<Vec<String>> = groups.into_values().filter(|v| v.len() > 1).collect();
    for v in ans.iter_mut() {
        v.sort();
    }
    ans.sort();
    Ok(ans)
}

pub fn dupe_report(store: &Store,filters: &[String],gran: Granularity,fmt: OutputFormat,out: &mut dyn Write) -> STDRESULT {
    let (title,clusters) = match gran {
        Granularity::AllSectors => ("WHOLE DISK DUPLICATES",whole_dupes(store,filters)?),
        Granularity::ActiveSectors => ("ACTIVE SECTOR DUPLICATES",active_dupes(store,filters)?),
        Granularity::Files => ("DUPLICATE FILES",file_dupes(store,filters)?)
    };
    render_clusters(title,&clusters,fmt,out)
}

/// Items per artifact at the requested granularity, keyed by the source
/// disk path.
fn sector_records(store: &Store,filters: &[String],active_only: bool) -> Result<HashMap<String,Vec<fp::DiskSector>>,DYNERR> {
    let mut ans = HashMap::new();
    for (_path,disk) in load_all(store,filters)? {
        let items = match active_only {
            true => disk.active_sectors.clone(),
            false => analysis::comparable_sectors(&disk)
        };
        ans.insert(disk.full_path.clone(),items);
    }
    Ok(ans)
}

fn file_records(store: &Store,filters: &[String]) -> Result<HashMap<String,Vec<fp::DiskFile>>,DYNERR> {
    let mut ans = HashMap::new();
    for (_path,disk) in load_all(store,filters)? {
        let items = analysis::comparable_files(&disk);
        if items.len() > 0 {
            ans.insert(disk.full_path.clone(),items);
        }
    }
    Ok(ans)
}

fn render_overlaps(title: &str,results: &HashMap<String,HashMap<String,PairOverlap>>,
                   filters: PairFilters,fmt: OutputFormat,out: &mut dyn Write) -> STDRESULT {
    let mut lefts: Vec<&String> = results.keys().collect();
    lefts.sort();
    match fmt {
        OutputFormat::Text => {
            writeln!(out,"{}",title)?;
            writeln!(out,"{}","=".repeat(title.len()))?;
            for left in lefts {
                let mut shown = false;
                let mut rights: Vec<&String> = results[left].keys().collect();
                rights.sort();
                for right in rights {
                    let ov = &results[left][right];
                    if !filters.keep(ov) {
                        continue;
                    }
                    if !shown {
                        writeln!(out,"\n{}",left)?;
                        shown = true;
                    }
                    writeln!(out,"  {:6.2}% same={} missing={} extra={}  {}",
                        100.0*ov.ratio(),ov.same,ov.missing,ov.extra,right)?;
                }
            }
        },
        OutputFormat::Csv => {
            writeln!(out,"left,right,ratio,same,missing,extra")?;
            for left in lefts {
                let mut rights: Vec<&String> = results[left].keys().collect();
                rights.sort();
                for right in rights {
                    let ov = &results[left][right];
                    if !filters.keep(ov) {
                        continue;
                    }
                    writeln!(out,"\"{}\",\"{}\",{:.4},{},{},{}",
                        left,right,ov.ratio(),ov.same,ov.missing,ov.extra)?;
                }
            }
        }
    }
    Ok(())
}

/// All-pairs fuzzy report at any granularity.
pub fn overlap_report(store: &Store,filters: &[String],gran: Granularity,predicate: KeepPredicate,
                      pair_filters: PairFilters,cancel: &CancelToken,
                      fmt: OutputFormat,out: &mut dyn Write) -> STDRESULT {
    let title = match (gran,&predicate) {
        (Granularity::Files,KeepPredicate::Subset) => "FILE SUBSETS",
        (Granularity::Files,KeepPredicate::Superset) => "FILE SUPERSETS",
        (Granularity::Files,_) => "PARTIAL FILE MATCHES",
        (Granularity::ActiveSectors,KeepPredicate::Subset) => "ACTIVE SECTOR SUBSETS",
        (Granularity::ActiveSectors,KeepPredicate::Superset) => "ACTIVE SECTOR SUPERSETS",
        (Granularity::ActiveSectors,_) => "PARTIAL ACTIVE SECTOR MATCHES",
        (Granularity::AllSectors,KeepPredicate::Subset) => "SECTOR SUBSETS",
        (Granularity::AllSectors,KeepPredicate::Superset) => "SECTOR SUPERSETS",
        (Granularity::AllSectors,_) => "PARTIAL SECTOR MATCHES"
    };
    let results = match gran {
        Granularity::Files => {
            let records = file_records(store,filters)?;
            pool::collect_overlaps(&records,predicate,pool::SIMILARITY_WORKERS,cancel)
        },
        Granularity::ActiveSectors => {
            let records = sector_records(store,filters,true)?;
            pool::collect_overlaps(&records,predicate,pool::SIMILARITY_WORKERS,cancel)
        },
        Granularity::AllSectors => {
            let records = sector_records(store,filters,false)?;
            pool::collect_overlaps(&records,predicate,pool::SIMILARITY_WORKERS,cancel)
        }
    };
    render_overlaps(title,&results,pair_filters,fmt,out)
}

/// Fuzzy matches of one disk against the whole store.
pub fn disk_overlap_report(store: &Store,filters: &[String],disk: &fp::Disk,gran: Granularity,
                           predicate: KeepPredicate,fmt: OutputFormat,out: &mut dyn Write) -> STDRESULT {
    let mut results: HashMap<String,HashMap<String,PairOverlap>> = HashMap::new();
    let mut kept: HashMap<String,PairOverlap> = HashMap::new();
    for (_path,other) in load_all(store,filters)? {
        if other.full_path == disk.full_path {
            continue;
        }
        let ov = match gran {
            Granularity::Files => analysis::compare_items(
                &analysis::comparable_files(disk),&analysis::comparable_files(&other)),
            Granularity::ActiveSectors => analysis::compare_items(
                &disk.active_sectors,&other.active_sectors),
            Granularity::AllSectors => analysis::compare_items(
                &analysis::comparable_sectors(disk),&analysis::comparable_sectors(&other))
        };
        if predicate.keep(&ov) {
            kept.insert(other.full_path.clone(),ov);
        }
    }
    if kept.len() > 0 {
        results.insert(disk.full_path.clone(),kept);
    }
    render_overlaps("MATCHES FOR ONE DISK",&results,PairFilters::default(),fmt,out)
}

/// Disks holding a file content-identical to the named file on `disk`.
pub fn file_match_report(store: &Store,filters: &[String],disk: &fp::Disk,filename: &str,
                         out: &mut dyn Write) -> STDRESULT {
    let target = match disk.find_file(filename) {
        Some(f) => f.sha256.clone(),
        None => {
            writeln!(out,"File does not exist on this volume: {}",filename)?;
            return Ok(());
        }
    };
    writeln!(out,"DISKS CARRYING {}",filename)?;
    for (_path,other) in load_all(store,filters)? {
        if other.full_path == disk.full_path {
            continue;
        }
        for f in &other.files {
            if f.sha256 == target {
                writeln!(out,"  {} :: {}",other.full_path,f.name)?;
            }
        }
    }
    Ok(())
}

/// Move all but the first member of each duplicate cluster into the
/// quarantine tree.  The artifacts are left in place.
pub fn quarantine(store: &Store,filters: &[String],gran: Granularity,binpath: &str) -> Result<usize,DYNERR> {
    let clusters = match gran {
        Granularity::ActiveSectors => active_dupes(store,filters)?,
        _ => whole_dupes(store,filters)?
    };
    let mut moved = 0;
    for cluster in clusters {
        for victim in cluster.iter().skip(1) {
            let dest = format!("{}/quarantine/{}",binpath,fp::normalize_path(victim).trim_start_matches('/'));
            if let Some(parent) = std::path::Path::new(&dest).parent() {
                std::fs::create_dir_all(parent)?;
            }
            match std::fs::copy(victim,&dest) {
                Ok(_) => {
                    std::fs::remove_file(victim)?;
                    moved += 1;
                },
                Err(e) => warn!("could not quarantine {} ({})",victim,e)
            }
        }
    }
    Ok(moved)
}
