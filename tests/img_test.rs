// test of the sector engine: addressing, interleave, blocks, checksums,
// and the nibble stream
use a2census::img::{self,DiskFormat,DiskImage,SectorOrder};

fn counting_image(len: usize) -> Vec<u8> {
    let mut dat = vec![0;len];
    for i in 0..len {
        dat[i] = (i % 251) as u8;
    }
    dat
}

#[test]
fn seek_bounds() {
    let mut img = DiskImage::with_binding(vec![0;img::DOS16_BYTES],DiskFormat::Dos16,SectorOrder::Dos33);
    assert!(img.seek(0,0).is_ok());
    assert!(img.seek(34,15).is_ok());
    assert!(img.seek(35,0).is_err());
    assert!(img.seek(0,16).is_err());
}

#[test]
fn write_truncates_to_sector() {
    let mut img = DiskImage::with_binding(vec![0;img::DOS16_BYTES],DiskFormat::Dos16,SectorOrder::Dos33);
    img.seek(1,1).expect("seek failed");
    img.write(&vec![0xeeu8;400]).expect("write failed");
    let buf = img.read().expect("read failed");
    assert_eq!(buf,vec![0xee;256]);
    // byte 257 of the write must not have spilled over
    img.seek(1,2).expect("seek failed");
    assert_eq!(img.read().expect("read failed")[0],0);
}

#[test]
fn dos33_order_is_identity() {
    let dat = counting_image(img::DOS16_BYTES);
    let mut img = DiskImage::with_binding(dat.clone(),DiskFormat::Dos16,SectorOrder::Dos33);
    img.seek(3,5).expect("seek failed");
    let offset = (3*16 + 5)*256;
    assert_eq!(img.read().expect("read failed"),dat[offset..offset+256].to_vec());
}

#[test]
fn prodos_order_interleaves() {
    let dat = counting_image(img::DOS16_BYTES);
    let mut img = DiskImage::with_binding(dat.clone(),DiskFormat::Dos16,SectorOrder::ProDos);
    // logical sector 1 sits at physical sector 2 under ProDOS interleave
    img.seek(0,1).expect("seek failed");
    assert_eq!(img.read().expect("read failed"),dat[2*256..3*256].to_vec());
}

#[test]
fn linear_blocks() {
    let dat = counting_image(img::DOS16_BYTES);
    let mut img = DiskImage::with_binding(dat.clone(),DiskFormat::ProDos,SectorOrder::ProDosLinear);
    let buf = img.read_block(3).expect("block read failed");
    assert_eq!(buf,dat[3*512..4*512].to_vec());
}

#[test]
fn interleaved_block_pairs() {
    // block 0 on an interleaved image combines logical sectors 0 and 14,
    // which sit at physical 0 and 13
    let dat = counting_image(img::DOS16_BYTES);
    let mut img = DiskImage::with_binding(dat.clone(),DiskFormat::ProDos,SectorOrder::ProDos);
    let buf = img.read_block(0).expect("block read failed");
    assert_eq!(buf[0..256],dat[0..256]);
    assert_eq!(buf[256..512],dat[13*256..14*256]);
}

#[test]
fn big_volume_blocks_are_linear() {
    let dat = counting_image(img::PRODOS_800K_BYTES);
    let mut img = DiskImage::with_binding(dat.clone(),DiskFormat::ProDos800,SectorOrder::ProDosLinear);
    let buf = img.read_block(25).expect("block read failed");
    assert_eq!(buf,dat[25*512..26*512].to_vec());
}

#[test]
fn block_write_round_trip() {
    let mut img = DiskImage::with_binding(vec![0;img::DOS16_BYTES],DiskFormat::ProDos,SectorOrder::ProDos);
    let mut dat = vec![0u8;512];
    for i in 0..512 {
        dat[i] = (i % 199) as u8;
    }
    img.write_block(7,&dat).expect("block write failed");
    assert_eq!(img.read_block(7).expect("block read failed"),dat);
}

#[test]
fn sector_checksum_is_pure() {
    let dat = counting_image(img::DOS16_BYTES);
    let mut img = DiskImage::with_binding(dat.clone(),DiskFormat::Dos16,SectorOrder::Dos33);
    let offset = (17*16 + 0)*256;
    let expected = img::checksum(&dat[offset..offset+256]);
    assert_eq!(img.checksum_sector(17,0).expect("checksum failed"),expected);
    // a second call sees the same bytes
    assert_eq!(img.checksum_sector(17,0).expect("checksum failed"),expected);
}

#[test]
fn whole_disk_checksum() {
    let dat = counting_image(img::DOS16_BYTES);
    let img = DiskImage::with_binding(dat.clone(),DiskFormat::Dos16,SectorOrder::Dos33);
    assert_eq!(img.checksum_disk(),img::checksum(&dat));
}

#[test]
fn nibble_stream_shape() {
    let dat = counting_image(img::DOS16_BYTES);
    let img = DiskImage::with_binding(dat,DiskFormat::Dos16,SectorOrder::Dos33);
    let stream = img::nib::nibblize(&img);
    assert_eq!(stream.len(),img::NIB_BYTES);
    // first sector: sync gap, then the address prologue
    assert_eq!(&stream[15..18],&[0xd5,0xaa,0x96]);
    // address epilogue after volume, track, sector, checksum pairs
    assert_eq!(&stream[26..29],&[0xde,0xaa,0xeb]);
    // data prologue after the second gap
    assert_eq!(&stream[35..38],&[0xd5,0xaa,0xad]);
    // sector frames are 416 bytes, so the next address field starts at 431
    assert_eq!(&stream[416+15..416+18],&[0xd5,0xaa,0x96]);
}

#[test]
fn nibble_track_zero_volume_address() {
    let img = DiskImage::with_binding(vec![0;img::DOS16_BYTES],DiskFormat::Dos16,SectorOrder::Dos33);
    let stream = img::nib::nibblize(&img);
    // volume 254 odd-even encoded: 0xAA|(254>>1)=0xFF, 0xAA|254=0xFE
    assert_eq!(stream[18],0xff);
    assert_eq!(stream[19],0xfe);
}
