//! # BIOS Module
//!
//! Low level tables shared by the image and file system layers.
//! At present this is only the sector skewing module.

pub mod skew;
