use num_derive::FromPrimitive;

pub const ENTRY_SIZE: usize = 39;
pub const ENTRIES_PER_BLOCK: usize = 13;
pub const VOL_KEY_BLOCK: usize = 2;
/// largest chain we will follow before declaring the directory corrupt
pub const MAX_DIRECTORY_BLOCKS: usize = 128;

pub const ACCESS_DESTROY: u8 = 0x80;
pub const ACCESS_RENAME: u8 = 0x40;
pub const ACCESS_CHANGED: u8 = 0x20;
pub const ACCESS_WRITE: u8 = 0x02;
pub const ACCESS_READ: u8 = 0x01;
pub const ACCESS_DEFAULT: u8 = ACCESS_DESTROY | ACCESS_RENAME | ACCESS_WRITE | ACCESS_READ;

/// High nibble of the first byte of any directory entry.
#[derive(FromPrimitive,PartialEq,Eq,Clone,Copy,Debug)]
pub enum StorageType {
    Inactive = 0x00,
    Seedling = 0x01,
    Sapling = 0x02,
    Tree = 0x03,
    SubDirEntry = 0x0d,
    SubDirHeader = 0x0e,
    VolumeHeader = 0x0f
}

pub const FT_TXT: u8 = 0x04;
pub const FT_BIN: u8 = 0x06;
pub const FT_DIR: u8 = 0x0f;
pub const FT_INT: u8 = 0xfa;
pub const FT_APP: u8 = 0xfc;
pub const FT_SYS: u8 = 0xff;

/// (extension, description) for the native type byte.  The table covers
/// the types that show up on period disks; everything else renders as
/// unknown but is still cataloged.
pub fn file_type_info(t: u8) -> (&'static str,&'static str) {
    match t {
        0x00 => ("UNK","Unknown"),
        0x01 => ("BAD","Bad Block"),
        0x02 => ("PCD","Pascal Code"),
        0x03 => ("PTX","Pascal Text"),
        0x04 => ("TXT","ASCII Text"),
        0x05 => ("PDA","Pascal Data"),
        0x06 => ("BIN","Binary File"),
        0x07 => ("FNT","Apple III Font"),
        0x08 => ("FOT","HiRes/Double HiRes Graphics"),
        0x0b => ("WPF","Generic Word Processing"),
        0x0c => ("SOS","SOS System File"),
        0x0f => ("DIR","ProDOS Directory"),
        0x19 => ("ADB","AppleWorks Database"),
        0x1a => ("AWP","AppleWorks Word Processing"),
        0x1b => ("ASP","AppleWorks Spreadsheet"),
        0x20 => ("TDM","Desktop Manager File"),
        0x2a => ("8SC","Source Code"),
        0x2b => ("8OB","Object Code"),
        0x42 => ("FTD","File Type Definitions"),
        0x50 => ("GWP","Apple IIgs Word Processing"),
        0x5a => ("CFG","Configuration"),
        0x60 => ("PRE","PC Pre-Boot"),
        0xb0 => ("SRC","Apple IIgs Source Code"),
        0xb3 => ("S16","Apple IIgs Application Program"),
        0xc0 => ("PNT","Apple IIgs Packed Super HiRes"),
        0xc1 => ("PIC","Apple IIgs Super HiRes"),
        0xe0 => ("LBR","Archive"),
        0xef => ("PAR","Pascal Area"),
        0xf0 => ("CMD","ProDOS Command File"),
        0xf9 => ("P16","ProDOS-16 System File"),
        0xfa => ("INT","Integer BASIC Program"),
        0xfb => ("IVR","Integer BASIC Variables"),
        0xfc => ("BAS","Applesoft BASIC Program"),
        0xfd => ("VAR","Applesoft BASIC Variables"),
        0xfe => ("REL","EDASM Relocatable Code"),
        0xff => ("SYS","ProDOS-8 System File"),
        _ => ("UNK","Unknown")
    }
}
