// test of the read-only codecs over hand built images
use a2census::create_fs_from_bytestream;
use a2census::img::{self,DiskFormat,DiskImage,SectorOrder};

/// A minimal Pascal volume: one directory block, one text file in
/// blocks 6..8 truncated to 524 bytes.
fn pascal_bytes() -> Vec<u8> {
    let mut img = DiskImage::with_binding(vec![0;img::DOS16_BYTES],DiskFormat::Pascal,SectorOrder::Dos33);
    let mut dir = vec![0u8;512];
    // volume header: directory spans [2,3), 280 blocks, one file
    dir[2..4].copy_from_slice(&u16::to_le_bytes(3));
    dir[6] = 5;
    dir[7..12].copy_from_slice(b"MYVOL");
    dir[14..16].copy_from_slice(&u16::to_le_bytes(280));
    dir[16..18].copy_from_slice(&u16::to_le_bytes(1));
    // file entry: blocks [6,8), type PTX, 12 bytes in the last block
    dir[26..28].copy_from_slice(&u16::to_le_bytes(6));
    dir[28..30].copy_from_slice(&u16::to_le_bytes(8));
    dir[30..32].copy_from_slice(&u16::to_le_bytes(3));
    dir[32] = 4;
    dir[33..37].copy_from_slice(b"DOCS");
    dir[48..50].copy_from_slice(&u16::to_le_bytes(12));
    img.write_block(2,&dir).expect("dir write failed");
    let mut body = vec![0u8;512];
    for i in 0..512 {
        body[i] = 0xc1 + (i % 26) as u8;
    }
    img.write_block(6,&body).expect("data write failed");
    img.write_block(7,&body).expect("data write failed");
    img.to_bytes()
}

#[test]
fn pascal_catalog_and_read() {
    let mut fs = create_fs_from_bytestream(pascal_bytes(),None).expect("no file system");
    assert_eq!(fs.get_img().fmt(),DiskFormat::Pascal);
    let entries = fs.catalog("","*").expect("catalog failed");
    assert_eq!(entries.len(),1);
    assert_eq!(entries[0].name,"docs");
    assert_eq!(entries[0].ext,"PTX");
    assert!(entries[0].locked);
    let (_addr,dat) = fs.read_file("DOCS").expect("read failed");
    // (8-6-1)*512 + 12 bytes
    assert_eq!(dat.len(),524);
}

#[test]
fn pascal_used_bitmap() {
    let mut fs = create_fs_from_bytestream(pascal_bytes(),None).expect("no file system");
    let map = fs.used_bitmap().expect("bitmap failed");
    assert_eq!(map.len(),280);
    assert!(map[6]);
    assert!(map[7]);
    assert!(!map[8]);
    assert!(!map[2]); // the directory itself is not a file extent
}

#[test]
fn pascal_is_read_only() {
    let mut fs = create_fs_from_bytestream(pascal_bytes(),None).expect("no file system");
    assert!(fs.delete("DOCS").is_err());
    assert!(fs.rename("DOCS","MORE").is_err());
}

/// A minimal RDOS 13 sector volume: the system entry carrying the
/// signature, then one binary file at linear sectors 26..28.
fn rdos_bytes() -> Vec<u8> {
    let mut img = DiskImage::with_binding(vec![0;img::DOS13_BYTES],DiskFormat::Rdos32,SectorOrder::Dos33Alt);
    let mut cat = vec![0u8;256];
    // entry 0 is the system area, its name is the format signature
    let sys_name = b"RDOS 2.1";
    for i in 0..24 {
        cat[i] = match i < sys_name.len() {
            true => sys_name[i] | 0x80,
            false => 0xa0
        };
    }
    cat[24] = b'B' | 0x80;
    cat[25] = 26;
    cat[30..32].copy_from_slice(&u16::to_le_bytes(0));
    // entry 1 is a game binary, 600 bytes over two sectors
    let name = b"GAME";
    for i in 0..24 {
        cat[32+i] = match i < name.len() {
            true => name[i] | 0x80,
            false => 0xa0
        };
    }
    cat[32+24] = b'B' | 0x80;
    cat[32+25] = 2;
    cat[32+26..32+28].copy_from_slice(&u16::to_le_bytes(0x4000));
    cat[32+28..32+30].copy_from_slice(&u16::to_le_bytes(600));
    cat[32+30..32+32].copy_from_slice(&u16::to_le_bytes(26));
    img.seek(1,0).expect("seek failed");
    img.write(&cat).expect("catalog write failed");
    let mut body = vec![0u8;256];
    for i in 0..256 {
        body[i] = (i % 256) as u8;
    }
    img.seek(2,0).expect("seek failed");
    img.write(&body).expect("data write failed");
    img.seek(2,1).expect("seek failed");
    img.write(&body).expect("data write failed");
    img.to_bytes()
}

#[test]
fn rdos_identify_and_catalog() {
    let mut fs = create_fs_from_bytestream(rdos_bytes(),None).expect("no file system");
    assert_eq!(fs.get_img().fmt(),DiskFormat::Rdos32);
    let entries = fs.catalog("","*").expect("catalog failed");
    assert_eq!(entries.len(),2);
    assert_eq!(entries[1].name,"game");
    assert_eq!(entries[1].ext,"BIN");
}

#[test]
fn rdos_read_file() {
    let mut fs = create_fs_from_bytestream(rdos_bytes(),None).expect("no file system");
    let (addr,dat) = fs.read_file("GAME").expect("read failed");
    assert_eq!(addr,0x4000);
    assert_eq!(dat.len(),600);
    assert_eq!(dat[0],0);
    assert_eq!(dat[255],255);
}

#[test]
fn rdos_used_bitmap() {
    // free sectors are everything outside each entry's run
    let mut fs = create_fs_from_bytestream(rdos_bytes(),None).expect("no file system");
    let map = fs.used_bitmap().expect("bitmap failed");
    assert_eq!(map.len(),35*13);
    for sec in 0..26 {
        assert!(map[sec],"system sector {} should be used",sec);
    }
    assert!(map[26]);
    assert!(map[27]);
    assert!(!map[28]);
}
