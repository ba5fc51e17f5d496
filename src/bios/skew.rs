//! ## Sector Skewing Module
//!
//! This contains all the sector skew tables.  This includes any non-trivial
//! transformations between blocks and sectors.
//!
//! The sector skews are kept separate from file systems and disk images
//! because submodules of either can use the same tables.
//!
//! Two families of tables appear.  The *stored order* tables give the
//! sequence in which logical sectors appear when a track is streamed out,
//! they drive nibblization.  The *logical to physical* maps take the
//! caller's logical sector number to the physical sector-within-track
//! offset of the bound image ordering.

/// Sequence of logical DOS 3.3 sectors as stored on a physical track.
pub const DOS33_STORED_ORDER: [usize;16] = [0x0,0x7,0xe,0x6,0xd,0x5,0xc,0x4,0xb,0x3,0xa,0x2,0x9,0x1,0x8,0xf];
/// Sequence of logical DOS 3.2 sectors as stored on a physical track (identity).
pub const DOS32_STORED_ORDER: [usize;13] = [0,1,2,3,4,5,6,7,8,9,10,11,12];
/// Sequence of logical ProDOS sectors as stored on a physical track.
pub const PRODOS_STORED_ORDER: [usize;16] = [0x0,0x8,0x1,0x9,0x2,0xa,0x3,0xb,0x4,0xc,0x5,0xd,0x6,0xe,0x7,0xf];

/// Logical to physical sector map for the scrambled DOS 3.3 ordering.
/// Images bound to the plain DOS 3.3 ordering use the identity map.
pub const DOS33_ALT_LSEC_TO_PSEC: [usize;16] = [0,7,14,6,13,5,12,4,11,3,10,2,9,1,8,15];
/// Logical to physical sector map for ProDOS interleaved images.
pub const PRODOS_LSEC_TO_PSEC: [usize;16] = [0,2,4,6,8,10,12,14,1,3,5,7,9,11,13,15];

/// ProDOS block to sector pairs on an interleaved 5.25 inch image,
/// indexed by `block % 8`.
pub const PRODOS_BLOCK_SECTOR_PAIRS: [[usize;2];8] = [
    [0x0,0xe],
    [0xd,0xc],
    [0xb,0xa],
    [0x9,0x8],
    [0x7,0x6],
    [0x5,0x4],
    [0x3,0x2],
    [0x1,0xf]
];

/// The 6-and-2 write translation table used by Disk II firmware.
pub const NIBBLE_62: [u8;64] = [
    0x96,0x97,0x9a,0x9b,0x9d,0x9e,0x9f,0xa6,
    0xa7,0xab,0xac,0xad,0xae,0xaf,0xb2,0xb3,
    0xb4,0xb5,0xb6,0xb7,0xb9,0xba,0xbb,0xbc,
    0xbd,0xbe,0xbf,0xcb,0xcd,0xce,0xcf,0xd3,
    0xd6,0xd7,0xd9,0xda,0xdb,0xdc,0xdd,0xde,
    0xdf,0xe5,0xe6,0xe7,0xe9,0xea,0xeb,0xec,
    0xed,0xee,0xef,0xf2,0xf3,0xf4,0xf5,0xf6,
    0xf7,0xf9,0xfa,0xfb,0xfc,0xfd,0xfe,0xff
];
