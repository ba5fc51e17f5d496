//! # Similarity Analysis Module
//!
//! Pairwise overlap between disks at three granularities: all sectors,
//! active sectors, and files.  Sector identity is position plus hash,
//! file identity is hash alone.  The overlap ratio for a pair is
//! `same / (same + missing + extra)`; threshold, subset, and superset
//! predicates select which pairs a report keeps.
//!
//! The pairwise sweep is run by a fixed worker pool in `pool`.

pub mod pool;

use std::collections::HashMap;
use crate::fp;

/// hex SHA-256 of a 256 byte run of zeroes; such sectors are left out
/// of sector comparisons entirely
pub const EMPTY_SECTOR_SHA: &str = "5341e6b2646979a70e57653007a1f310169421ec9bdd9f1a5648f75ade005af1";

/// Anything that can take part in an overlap comparison: it occupies a
/// slot and carries a digest.
pub trait OverlapItem {
    fn slot(&self) -> String;
    fn digest(&self) -> &str;
}

impl OverlapItem for fp::DiskSector {
    /// sector identity is positional
    fn slot(&self) -> String {
        format!("T{}S{}",self.track,self.sector)
    }
    fn digest(&self) -> &str {
        &self.sha256
    }
}

impl OverlapItem for fp::DiskFile {
    /// file identity is the content hash, wherever the file lives
    fn slot(&self) -> String {
        self.sha256.clone()
    }
    fn digest(&self) -> &str {
        &self.sha256
    }
}

/// Overlap tally for one ordered pair of disks.
#[derive(Clone,Copy,Default,Debug)]
pub struct PairOverlap {
    pub same: usize,
    pub missing: usize,
    pub extra: usize
}

impl PairOverlap {
    pub fn ratio(&self) -> f64 {
        let total = self.same + self.missing + self.extra;
        match total {
            0 => 0.0,
            _ => self.same as f64 / total as f64
        }
    }
    /// the left side holds nothing the right side lacks
    pub fn is_subset(&self) -> bool {
        self.missing == 0 && self.extra > 0
    }
    /// the left side holds everything plus more
    pub fn is_superset(&self) -> bool {
        self.missing > 0 && self.extra == 0
    }
}

/// Compare two item sets.  `missing` counts left items the right side
/// lacks (or holds with a different digest), `extra` counts right items
/// absent on the left.
pub fn compare_items<T: OverlapItem>(left: &[T],right: &[T]) -> PairOverlap {
    let mut ans = PairOverlap::default();
    let mut lmap: HashMap<String,&str> = HashMap::new();
    let mut rmap: HashMap<String,&str> = HashMap::new();
    for item in left {
        lmap.insert(item.slot(),item.digest());
    }
    for item in right {
        rmap.insert(item.slot(),item.digest());
    }
    for (slot,dig) in &lmap {
        match rmap.get(slot) {
            Some(rdig) if rdig == dig => ans.same += 1,
            _ => ans.missing += 1
        }
    }
    for slot in rmap.keys() {
        if !lmap.contains_key(slot) {
            ans.extra += 1;
        }
    }
    ans
}

/// Which pairs an overlap sweep keeps.
#[derive(Clone,Copy)]
pub enum KeepPredicate {
    Threshold(f64),
    Subset,
    Superset
}

impl KeepPredicate {
    pub fn keep(&self,ov: &PairOverlap) -> bool {
        match self {
            Self::Threshold(t) => ov.ratio() >= *t,
            Self::Subset => ov.is_subset(),
            Self::Superset => ov.is_superset()
        }
    }
}

/// Sectors eligible for whole-disk sector comparison: everything that
/// is not an empty sector.
pub fn comparable_sectors(disk: &fp::Disk) -> Vec<fp::DiskSector> {
    disk.active_sectors.iter().chain(disk.inactive_sectors.iter())
        .filter(|s| s.sha256 != EMPTY_SECTOR_SHA)
        .cloned()
        .collect()
}

/// Files eligible for file comparison: zero byte files and boot
/// greeting programs named `hello` are left out.
pub fn comparable_files(disk: &fp::Disk) -> Vec<fp::DiskFile> {
    disk.files.iter()
        .filter(|f| f.size > 0 && f.name != "hello")
        .cloned()
        .collect()
}
