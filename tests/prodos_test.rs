// test of the ProDOS codec against freshly formatted in-memory volumes
use a2census::fs::{prodos,DiskFS,FileKind};
use a2census::img::{self,DiskFormat,DiskImage,SectorOrder};

fn blank140() -> prodos::Disk {
    let img = DiskImage::with_binding(vec![0;img::DOS16_BYTES],DiskFormat::ProDos,SectorOrder::ProDosLinear);
    let mut disk = prodos::Disk::from_img(img);
    disk.init("NEW.DISK",280).expect("failed to init");
    disk
}

fn blank800() -> prodos::Disk {
    let img = DiskImage::with_binding(vec![0;img::PRODOS_800K_BYTES],DiskFormat::ProDos800,SectorOrder::ProDosLinear);
    let mut disk = prodos::Disk::from_img(img);
    disk.init("BIG.DISK",1600).expect("failed to init");
    disk
}

#[test]
fn seedling_round_trip() {
    let mut disk = blank140();
    disk.write_file("SEED",FileKind::Binary,&[1,2,3,4],0x2000).expect("write failed");
    let (addr,dat) = disk.read_file("seed").expect("read failed");
    assert_eq!(addr,0x2000);
    assert_eq!(dat,vec![1,2,3,4]);
}

#[test]
fn sapling_round_trip() {
    let mut disk = blank140();
    let dat: Vec<u8> = (0..5000).map(|i| (i % 251) as u8).collect();
    disk.write_file("SAP",FileKind::Binary,&dat,0x4000).expect("write failed");
    let (_addr,back) = disk.read_file("SAP").expect("read failed");
    assert_eq!(back,dat);
}

#[test]
fn overwrite_preserves_create_time_and_access() {
    let mut disk = blank140();
    disk.write_file("KEEPER",FileKind::Binary,&[1],0).expect("write failed");
    let first = disk.catalog("","KEEPER").expect("catalog failed")[0].clone();
    disk.lock("KEEPER").expect("lock failed");
    // a locked file refuses replacement
    assert!(disk.write_file("KEEPER",FileKind::Binary,&[2],0).is_err());
    disk.unlock("KEEPER").expect("unlock failed");
    disk.write_file("KEEPER",FileKind::Binary,&[2,2],0).expect("rewrite failed");
    let second = disk.catalog("","KEEPER").expect("catalog failed")[0].clone();
    assert_eq!(first.created,second.created);
    assert_eq!(second.locked,false);
}

#[test]
fn subdirectory_walk() {
    let mut disk = blank800();
    disk.create_dir("GAMES").expect("mkdir failed");
    disk.write_file("GAMES/CHESS",FileKind::Binary,&[1,1,2,3,5],0x800).expect("write failed");
    disk.write_file("GAMES/GO",FileKind::Binary,&[8,13,21],0x800).expect("write failed");
    let entries = disk.catalog("GAMES","*").expect("catalog failed");
    let mut names: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
    names.sort();
    assert_eq!(names,vec!["chess".to_string(),"go".to_string()]);
    let (_a,dat) = disk.read_file("GAMES/CHESS").expect("read failed");
    assert_eq!(dat,vec![1,1,2,3,5]);
}

#[test]
fn nested_directories() {
    let mut disk = blank140();
    disk.create_dir("A").expect("mkdir failed");
    disk.create_dir("A/B").expect("mkdir failed");
    disk.write_file("A/B/DEEP",FileKind::Text,"SO DEEP".as_bytes(),0).expect("write failed");
    let (_a,dat) = disk.read_file("a/b/deep").expect("read failed");
    assert_eq!(dat,"SO DEEP".as_bytes().to_vec());
}

#[test]
fn delete_directory_recursive() {
    let mut disk = blank140();
    let before: usize = disk.used_bitmap().expect("bitmap failed").iter().filter(|b| **b).count();
    disk.create_dir("TMP").expect("mkdir failed");
    disk.write_file("TMP/ONE",FileKind::Binary,&[1],0).expect("write failed");
    disk.write_file("TMP/TWO",FileKind::Binary,&[2],0).expect("write failed");
    disk.delete("TMP").expect("delete failed");
    let after: usize = disk.used_bitmap().expect("bitmap failed").iter().filter(|b| **b).count();
    assert_eq!(before,after);
    assert!(disk.catalog("TMP","*").is_err());
}

#[test]
fn used_bitmap_inverts_volume_bitmap() {
    let mut disk = blank140();
    disk.write_file("X",FileKind::Binary,&vec![0xa5u8;2000],0).expect("write failed");
    let map = disk.used_bitmap().expect("bitmap failed");
    assert_eq!(map.len(),280);
    // boot, directory and bitmap blocks are always used
    for b in 0..7 {
        assert!(map[b]);
    }
    // a fresh volume plus one 5 block file
    let used: usize = map.iter().filter(|b| **b).count();
    assert_eq!(used,7 + 5);
}

#[test]
fn directory_grows_past_one_chain() {
    let mut disk = blank140();
    // 4 directory blocks hold 51 file entries; the 52nd forces growth
    for i in 0..52 {
        let name = format!("F{}",i);
        disk.write_file(&name,FileKind::Binary,&[i as u8],0).expect("write failed");
    }
    let entries = disk.catalog("","*").expect("catalog failed");
    assert_eq!(entries.len(),52);
}

#[test]
fn bad_names_rejected() {
    let mut disk = blank140();
    assert!(disk.write_file("BAD NAME",FileKind::Binary,&[1],0).is_err());
    assert!(disk.write_file("7UP",FileKind::Binary,&[1],0).is_err());
    assert!(disk.create_dir("SUCH/LONGDIRNAMEWONTFIT").is_err());
}

#[test]
fn set_volume_name() {
    let mut disk = blank140();
    disk.set_volume_name("RENAMED").expect("rename failed");
    assert!(disk.set_volume_name("NO WAY").is_err());
}

#[test]
fn rename_in_subdir() {
    let mut disk = blank140();
    disk.create_dir("DIR").expect("mkdir failed");
    disk.write_file("DIR/OLD",FileKind::Binary,&[3],0).expect("write failed");
    disk.rename("DIR/OLD","NEW").expect("rename failed");
    let (_a,dat) = disk.read_file("DIR/NEW").expect("read failed");
    assert_eq!(dat,vec![3]);
}
