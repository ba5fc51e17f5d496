//! # Commands Module
//!
//! Entry points the CLI drives: bulk ingest, duplicate and fuzzy
//! reports, searches with extraction, and image mutations with a
//! backup-before-write discipline.  Everything here stays usable as a
//! library; the binary only parses flags and calls in.

pub mod ingest;
pub mod report;
pub mod search;
pub mod modify;

/// Root for everything the program persists: fingerprints, backups,
/// quarantined disks, extractions.
pub fn binpath() -> String {
    let home = match std::env::var("HOME") {
        Ok(h) => h,
        Err(_) => match std::env::var("USERPROFILE") {
            Ok(h) => h,
            Err(_) => ".".to_string()
        }
    };
    format!("{}/a2census",home)
}

/// Default datastore location under the binpath.
pub fn default_datastore() -> String {
    format!("{}/fingerprints",binpath())
}
