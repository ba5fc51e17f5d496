//! ## Worker Pool
//!
//! The pairwise sweep hands each worker one "left" disk at a time; the
//! worker compares it against every other disk in the shared map and
//! keeps the pairs the predicate accepts.  Work items flow through a
//! bounded channel, results gather behind a mutex, and a cancellation
//! token lets an interrupt drain the queue and return partial results.

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool,Ordering};
use std::sync::{Arc,Mutex};
use crossbeam_channel::bounded;

use super::{compare_items,KeepPredicate,OverlapItem,PairOverlap};

pub const SIMILARITY_WORKERS: usize = 6;
pub const WORK_QUEUE_DEPTH: usize = 100;

/// Cooperative cancellation flag shared between a dispatcher and
/// whoever handles the interrupt.
#[derive(Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }
    pub fn cancel(&self) {
        self.0.store(true,Ordering::SeqCst);
    }
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

fn progress(label: &str,done: usize,total: usize,last_pc: &mut i64) {
    if total == 0 {
        return;
    }
    let pc = (100*done/total) as i64;
    if pc != *last_pc {
        let mut err = std::io::stderr();
        let _ = write!(err,"\r{}... {}%   ",label,pc);
        let _ = err.flush();
        *last_pc = pc;
    }
}

/// Sweep every left disk against all others.  Returns, per left disk,
/// the map of kept pairs.  Left disks whose every pair was rejected do
/// not appear in the result.
pub fn collect_overlaps<T: OverlapItem + Sync>(
    records: &HashMap<String,Vec<T>>,
    predicate: KeepPredicate,
    workers: usize,
    cancel: &CancelToken
) -> HashMap<String,HashMap<String,PairOverlap>> {
    let results: Mutex<HashMap<String,HashMap<String,PairOverlap>>> = Mutex::new(HashMap::new());
    let (tx,rx) = bounded::<String>(WORK_QUEUE_DEPTH);
    std::thread::scope(|scope| {
        for _i in 0..usize::max(1,workers) {
            let rx = rx.clone();
            let results = &results;
            let records = &records;
            scope.spawn(move || {
                while let Ok(key) = rx.recv() {
                    let left = &records[&key];
                    let mut kept: HashMap<String,PairOverlap> = HashMap::new();
                    for (other,right) in records.iter() {
                        if *other == key {
                            continue; // never compare a disk with itself
                        }
                        let ov = compare_items(left,right);
                        if predicate.keep(&ov) {
                            kept.insert(other.clone(),ov);
                        }
                    }
                    if kept.len() > 0 {
                        let mut lock = results.lock().expect("poisoned result lock");
                        lock.insert(key,kept);
                    }
                }
            });
        }
        let mut last_pc: i64 = -1;
        let total = records.len();
        for (i,key) in records.keys().enumerate() {
            if cancel.is_cancelled() {
                let mut err = std::io::stderr();
                let _ = write!(err,"\r\nInterrupted. Waiting for workers to stop.\r\n");
                break;
            }
            if tx.send(key.clone()).is_err() {
                break;
            }
            progress("Processing overlap data",i,total,&mut last_pc);
        }
        drop(tx);
    });
    let _ = write!(std::io::stderr(),"\r");
    results.into_inner().expect("poisoned result lock")
}
