// test of the DOS 3.x codec against freshly formatted in-memory volumes
use a2census::fs::{dos3x,DiskFS,FileKind};
use a2census::img::{self,DiskFormat,DiskImage,SectorOrder};

fn blank33() -> dos3x::Disk {
    let img = DiskImage::with_binding(vec![0;img::DOS16_BYTES],DiskFormat::Dos16,SectorOrder::Dos33);
    let mut disk = dos3x::Disk::from_img(img);
    disk.init(254,35,16).expect("failed to init");
    disk
}

#[test]
fn write_then_read() {
    let mut disk = blank33();
    let dat: Vec<u8> = (0..1000).map(|i| (i % 250) as u8).collect();
    disk.write_file("thechip",FileKind::Binary,&dat,768).expect("write failed");
    let (addr,back) = disk.read_file("thechip").expect("read failed");
    assert_eq!(addr,768);
    assert_eq!(back,dat);
}

#[test]
fn exactly_one_entry_per_name() {
    let mut disk = blank33();
    disk.write_file("prog",FileKind::ApplesoftTokens,&[0x99,0x00,0x00],0x801).expect("write failed");
    disk.write_file("prog",FileKind::ApplesoftTokens,&[0x98,0x97,0x00,0x00],0x801).expect("rewrite failed");
    let cat = disk.catalog("","*").expect("catalog failed");
    assert_eq!(cat.iter().filter(|e| e.name == "prog").count(),1);
    let (_addr,back) = disk.read_file("prog").expect("read failed");
    assert_eq!(back,vec![0x98,0x97,0x00,0x00]);
}

#[test]
fn rewrite_frees_old_sectors() {
    let mut disk = blank33();
    let before: usize = disk.used_bitmap().expect("bitmap failed").iter().filter(|b| **b).count();
    let dat = vec![0x41u8;5000];
    disk.write_file("big",FileKind::Binary,&dat,0x2000).expect("write failed");
    disk.write_file("big",FileKind::Binary,&dat,0x2000).expect("rewrite failed");
    let after: usize = disk.used_bitmap().expect("bitmap failed").iter().filter(|b| **b).count();
    // 5004 bytes = 20 data sectors + 1 list sector
    assert_eq!(after,before + 21);
}

#[test]
fn delete_restores_free_space() {
    let mut disk = blank33();
    let before: usize = disk.used_bitmap().expect("bitmap failed").iter().filter(|b| **b).count();
    disk.write_file("gone",FileKind::Text,&vec![0xc1u8;600],0).expect("write failed");
    disk.delete("gone").expect("delete failed");
    let after: usize = disk.used_bitmap().expect("bitmap failed").iter().filter(|b| **b).count();
    assert_eq!(before,after);
    assert!(disk.read_file("gone").is_err());
}

#[test]
fn locked_files_resist() {
    let mut disk = blank33();
    disk.write_file("keep",FileKind::Binary,&[1,2,3],0x300).expect("write failed");
    disk.lock("keep").expect("lock failed");
    assert!(disk.delete("keep").is_err());
    assert!(disk.rename("keep","nope").is_err());
    disk.unlock("keep").expect("unlock failed");
    disk.rename("keep","kept").expect("rename failed");
    assert!(disk.read_file("kept").is_ok());
}

#[test]
fn rename_collision_rejected() {
    let mut disk = blank33();
    disk.write_file("one",FileKind::Binary,&[1],0).expect("write failed");
    disk.write_file("two",FileKind::Binary,&[2],0).expect("write failed");
    assert!(disk.rename("one","two").is_err());
}

#[test]
fn out_of_space() {
    let mut disk = blank33();
    let big = vec![0u8;0x7f00];
    disk.write_file("f1",FileKind::Binary,&big,0x800).expect("error");
    disk.write_file("f2",FileKind::Binary,&big,0x800).expect("error");
    disk.write_file("f3",FileKind::Binary,&big,0x800).expect("error");
    disk.write_file("f4",FileKind::Binary,&big,0x800).expect("error");
    match disk.write_file("f5",FileKind::Binary,&big,0x800) {
        Ok(l) => panic!("wrote {} sectors but should be disk full",l),
        Err(e) => assert_eq!(e.to_string(),"DISK FULL")
    }
}

#[test]
fn bitmap_tracks_vtoc() {
    // descriptor used bit equals the inverse of the VTOC free bit
    let mut disk = blank33();
    disk.write_file("map",FileKind::Binary,&vec![7u8;3000],0x2000).expect("write failed");
    let map = disk.used_bitmap().expect("bitmap failed");
    assert_eq!(map.len(),35*16);
    // catalog track is used, track 1 is free on a fresh disk
    for s in 0..16 {
        assert!(map[17*16+s]);
        assert!(!map[1*16+s]);
    }
    // highest track gets the first allocation
    assert!(map[34*16+15]);
}

#[test]
fn circular_ts_list_stops() {
    let mut disk = blank33();
    disk.write_file("loop",FileKind::Text,&vec![0xc1u8;600],0).expect("write failed");
    // find the entry and point its T/S list at itself
    {
        let img = disk.get_img();
        img.seek(17,15).expect("seek failed");
        let cat = img.read().expect("read failed");
        let (tsl_t,tsl_s) = (cat[0x0b],cat[0x0c]);
        img.seek(tsl_t as usize,tsl_s as usize).expect("seek failed");
        let mut tsl = img.read().expect("read failed");
        tsl[1] = tsl_t;
        tsl[2] = tsl_s;
        img.write(&tsl).expect("write failed");
    }
    // the read must terminate; text files come back in whole sectors
    let (_addr,dat) = disk.read_file("loop").expect("read failed");
    assert_eq!(dat.len(),768);
}

#[test]
fn set_volume_number() {
    let mut disk = blank33();
    disk.set_volume_name("42").expect("set volume failed");
    assert!(disk.set_volume_name("0").is_err());
    assert!(disk.set_volume_name("guff").is_err());
}

#[test]
fn thirteen_sector_volume() {
    let img = DiskImage::with_binding(vec![0;img::DOS13_BYTES],DiskFormat::Dos13,SectorOrder::Dos32);
    let mut disk = dos3x::Disk::from_img(img);
    disk.init(100,35,13).expect("failed to init");
    disk.write_file("smalldos",FileKind::Binary,&[9,9,9],0x300).expect("write failed");
    let (addr,dat) = disk.read_file("smalldos").expect("read failed");
    assert_eq!((addr,dat),(0x300,vec![9,9,9]));
    let map = disk.used_bitmap().expect("bitmap failed");
    assert_eq!(map.len(),35*13);
}
