// test of the mutation orchestrator: backup before write, then the
// codec-level change lands on the image file
use a2census::commands::modify;
use a2census::fs::{prodos,DiskFS,TYPE_MASK_PRODOS};
use a2census::img::{self,DiskFormat,DiskImage,SectorOrder};
use std::path::Path;

fn scratch_dir(tag: &str) -> String {
    let dir = std::env::temp_dir().join(format!("a2census_modify_{}_{}",tag,std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("could not make scratch dir");
    dir.to_string_lossy().to_string()
}

fn write_prodos_image(path: &str) -> Vec<u8> {
    let blank = DiskImage::with_binding(vec![0;img::DOS16_BYTES],DiskFormat::ProDos,SectorOrder::ProDosLinear);
    let mut disk = prodos::Disk::from_img(blank);
    disk.init("SCRATCH",280).expect("init failed");
    let bytes = disk.get_img().to_bytes();
    std::fs::write(path,&bytes).expect("could not write image");
    bytes
}

fn find_backups(binpath: &str) -> Vec<std::path::PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![std::path::PathBuf::from(format!("{}/backup",binpath))];
    while let Some(dir) = stack.pop() {
        if let Ok(listing) = std::fs::read_dir(&dir) {
            for item in listing.flatten() {
                let p = item.path();
                if p.is_dir() {
                    stack.push(p);
                } else {
                    out.push(p);
                }
            }
        }
    }
    out
}

#[test]
fn put_backs_up_then_writes() {
    let work = scratch_dir("put");
    let disk_path = format!("{}/scratch.po",work);
    let prior = write_prodos_image(&disk_path);
    let local = format!("{}/HELLO.APP",work);
    std::fs::write(&local,&[0x0b,0x08,0x0a,0x00,0x99,0x00,0x00,0x00]).expect("local write failed");

    modify::put(&disk_path,&local,&work).expect("put failed");

    // the image changed and the backup holds the prior bytes
    let after = std::fs::read(&disk_path).expect("image unreadable");
    assert_ne!(after,prior);
    let backups = find_backups(&work);
    assert_eq!(backups.len(),1);
    assert_eq!(std::fs::read(&backups[0]).expect("backup unreadable"),prior);

    // the catalog lists HELLO as an Applesoft program
    let mut fs = a2census::create_fs_from_file(&disk_path).expect("no file system");
    let entries = fs.catalog("","*").expect("catalog failed");
    assert_eq!(entries.len(),1);
    assert_eq!(entries[0].name,"hello");
    assert_eq!(entries[0].type_code,TYPE_MASK_PRODOS | 0xfc);

    let _ = std::fs::remove_dir_all(&work);
}

#[test]
fn failed_mutation_leaves_image_alone() {
    let work = scratch_dir("fail");
    let disk_path = format!("{}/scratch.po",work);
    let prior = write_prodos_image(&disk_path);

    // deleting a file that is not there fails before any write
    assert!(modify::delete(&disk_path,"GHOST",&work).is_err());
    assert_eq!(std::fs::read(&disk_path).expect("image unreadable"),prior);
    assert_eq!(find_backups(&work).len(),0);

    let _ = std::fs::remove_dir_all(&work);
}

#[test]
fn delete_and_mkdir_round_trip() {
    let work = scratch_dir("ops");
    let disk_path = format!("{}/scratch.po",work);
    write_prodos_image(&disk_path);
    let local = format!("{}/DATA.TXT",work);
    std::fs::write(&local,"SOME TEXT").expect("local write failed");

    modify::put(&disk_path,&local,&work).expect("put failed");
    modify::make_directory(&disk_path,"STUFF",&work).expect("mkdir failed");
    modify::delete(&disk_path,"DATA",&work).expect("delete failed");

    let listing = modify::catalog(&disk_path).expect("catalog failed");
    assert!(listing.contains("stuff"));
    assert!(!listing.contains("data"));
    // three mutations, three backups
    assert_eq!(find_backups(&work).len(),3);

    let _ = std::fs::remove_dir_all(&work);
}

#[test]
fn kind_inference() {
    use a2census::fs::FileKind;
    assert_eq!(modify::kind_from_name("HELLO.APP").1,FileKind::ApplesoftTokens);
    assert_eq!(modify::kind_from_name("HELLO.APP").0,"HELLO");
    assert_eq!(modify::kind_from_name("notes.txt").1,FileKind::Text);
    assert_eq!(modify::kind_from_name("core.bin").1,FileKind::Binary);
    assert_eq!(modify::kind_from_name("prog.int").1,FileKind::IntegerTokens);
}

#[test]
fn backup_name_carries_timestamp() {
    let work = scratch_dir("stamp");
    let disk_path = format!("{}/scratch.po",work);
    write_prodos_image(&disk_path);
    let bpath = modify::backup_file(&work,&disk_path).expect("backup failed");
    let name = Path::new(&bpath).file_name().unwrap().to_string_lossy().to_string();
    // scratch.po.YYYYMMDDhhmmss
    let stamp = name.rsplit('.').next().unwrap();
    assert_eq!(stamp.len(),14);
    assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    let _ = std::fs::remove_dir_all(&work);
}
