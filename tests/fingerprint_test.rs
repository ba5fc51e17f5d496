// test of fingerprint construction, the artifact store, and overlap math
use a2census::analysis::{self,pool,KeepPredicate};
use a2census::fp::{self,builder,store::Store};
use a2census::fs::{dos3x,DiskFS,FileKind};
use a2census::img::{self,checksum,DiskFormat,DiskImage,SectorOrder};
use std::collections::HashMap;

fn sample_dos_bytes() -> Vec<u8> {
    let blank = DiskImage::with_binding(vec![0;img::DOS16_BYTES],DiskFormat::Dos16,SectorOrder::Dos33);
    let mut disk = dos3x::Disk::from_img(blank);
    disk.init(254,35,16).expect("init failed");
    disk.write_file("hello",FileKind::ApplesoftTokens,&[0x0b,0x08,0x0a,0x00,0x99,0x00,0x00,0x00],0x801).expect("write failed");
    disk.write_file("readme",FileKind::Text,"CATALOG ME".as_bytes(),0).expect("write failed");
    disk.get_img().to_bytes()
}

fn scratch_dir(tag: &str) -> String {
    let dir = std::env::temp_dir().join(format!("a2census_test_{}_{}",tag,std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("could not make scratch dir");
    dir.to_string_lossy().to_string()
}

#[test]
fn whole_disk_hash() {
    let bytes = sample_dos_bytes();
    let disk = builder::analyze_bytes("/corpus/sample.dsk",bytes.clone(),1).expect("analyze failed");
    assert_eq!(disk.sha256,checksum(&bytes));
    assert_eq!(disk.format_id,2);
    assert_eq!((disk.tracks,disk.sectors),(35,16));
}

#[test]
fn active_hash_matches_concatenation() {
    let bytes = sample_dos_bytes();
    let disk = builder::analyze_bytes("/corpus/sample.dsk",bytes.clone(),1).expect("analyze failed");
    // rebuild the concatenation of used sectors in track-major order
    let mut active = Vec::new();
    for t in 0..35 {
        for s in 0..16 {
            if disk.bitmap[t*16+s] {
                let offset = (t*16+s)*256;
                active.extend_from_slice(&bytes[offset..offset+256]);
            }
        }
    }
    assert_eq!(disk.sha256_active,checksum(&active));
    // and every recorded active sector hash agrees with the raw bytes
    for sec in &disk.active_sectors {
        let offset = (sec.track*16+sec.sector)*256;
        assert_eq!(sec.sha256,checksum(&bytes[offset..offset+256]));
    }
}

#[test]
fn bitmap_agrees_with_vtoc() {
    let bytes = sample_dos_bytes();
    let disk = builder::analyze_bytes("/corpus/sample.dsk",bytes.clone(),1).expect("analyze failed");
    let vtoc = &bytes[17*16*256..17*16*256+256];
    for t in 0..35 {
        for s in 0..16usize {
            let mut offset = 0x38 + t*4;
            if s < 8 {
                offset += 1;
            }
            let free = vtoc[offset] & (1 << (s & 7)) != 0;
            assert_eq!(disk.bitmap[t*16+s],!free,"mismatch at T{} S{}",t,s);
        }
    }
}

#[test]
fn descriptor_files_and_text() {
    let disk = builder::analyze_bytes("/corpus/sample.dsk",sample_dos_bytes(),1).expect("analyze failed");
    let hello = disk.find_file("hello").expect("hello missing");
    assert_eq!(hello.type_code,0x0002);
    assert!(hello.text.is_some());
    let rendered = String::from_utf8_lossy(hello.text.as_ref().unwrap()).to_string();
    assert!(rendered.contains("10"));
    // text files come back in whole sectors, zero padded
    let readme = disk.find_file("readme").expect("readme missing");
    let payload = readme.data.clone().unwrap();
    assert_eq!(payload.len(),256);
    assert!(payload.starts_with("CATALOG ME".as_bytes()));
}

#[test]
fn ingest_mode_zero_omits_payloads() {
    let disk = builder::analyze_bytes("/corpus/sample.dsk",sample_dos_bytes(),0).expect("analyze failed");
    for f in &disk.files {
        assert!(f.text.is_none());
        assert!(f.data.is_none());
    }
    for s in disk.active_sectors.iter().chain(disk.inactive_sectors.iter()) {
        assert!(s.data.is_none());
    }
}

#[test]
fn artifact_name_encodes_fields() {
    let disk = builder::analyze_bytes("/corpus/games/sample.dsk",sample_dos_bytes(),1).expect("analyze failed");
    let name = disk.artifact_name();
    let fields: Vec<&str> = name.trim_end_matches(".fgp").split('_').collect();
    assert_eq!(fields.len(),4);
    assert_eq!(fields[0],"2");
    assert_eq!(fields[1],disk.sha256);
    assert_eq!(fields[2],disk.sha256_active);
    assert_eq!(fields[3].len(),32); // md5 of the base name
    assert_eq!(disk.mirror_dir(),"corpus/games");
}

#[test]
fn descriptor_serialization_round_trip() {
    let disk = builder::analyze_bytes("/corpus/sample.dsk",sample_dos_bytes(),3).expect("analyze failed");
    let bytes = disk.to_bytes().expect("encode failed");
    let back = fp::Disk::from_bytes(&bytes).expect("decode failed");
    assert_eq!(back.sha256,disk.sha256);
    assert_eq!(back.sha256_active,disk.sha256_active);
    assert_eq!(back.files.len(),disk.files.len());
    assert_eq!(back.active_sectors.len(),disk.active_sectors.len());
    assert_eq!(back.bitmap,disk.bitmap);
}

#[test]
fn store_put_glob_get() {
    let root = scratch_dir("store");
    let store = Store::new(&root);
    let disk = builder::analyze_bytes("/corpus/sample.dsk",sample_dos_bytes(),1).expect("analyze failed");
    assert!(!store.contains(&disk));
    store.put(&disk).expect("put failed");
    assert!(store.contains(&disk));
    // whole-sha glob finds it, a wrong-sha glob does not
    let hits = store.glob(&format!("2_{}_*_*.fgp",disk.sha256),&[]).expect("glob failed");
    assert_eq!(hits.len(),1);
    let misses = store.glob("2_deadbeef_*_*.fgp",&[]).expect("glob failed");
    assert_eq!(misses.len(),0);
    // active-sha glob
    let hits = store.glob(&format!("2_*_{}_*.fgp",disk.sha256_active),&[]).expect("glob failed");
    assert_eq!(hits.len(),1);
    let cached = store.get(&hits[0]).expect("get failed");
    assert_eq!(cached.sha256,disk.sha256);
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn overlap_scenario_subset_superset() {
    // X has files a,b; Y has a,b,c: overlap 2/3, X subset of Y
    let mk = |shas: &[&str]| -> Vec<fp::DiskFile> {
        shas.iter().map(|s| fp::DiskFile {
            name: format!("f{}",s),
            sha256: s.to_string(),
            size: 100,
            ..Default::default()
        }).collect()
    };
    let x = mk(&["h1","h2"]);
    let y = mk(&["h1","h2","h3"]);
    let ov = analysis::compare_items(&x,&y);
    assert_eq!((ov.same,ov.missing,ov.extra),(2,0,1));
    assert!((ov.ratio() - 2.0/3.0).abs() < 1e-9);
    assert!(ov.is_subset());
    let vo = analysis::compare_items(&y,&x);
    assert_eq!((vo.same,vo.missing,vo.extra),(2,1,0));
    assert!(vo.is_superset());
}

#[test]
fn sector_overlap_is_positional() {
    let mk = |track: usize,sha: &str| fp::DiskSector {
        track,
        sector: 0,
        sha256: sha.to_string(),
        data: None
    };
    let left = vec![mk(0,"aaa"),mk(1,"bbb")];
    let right = vec![mk(0,"aaa"),mk(1,"ccc")];
    let ov = analysis::compare_items(&left,&right);
    // same position different hash counts as missing, not extra
    assert_eq!((ov.same,ov.missing,ov.extra),(1,1,0));
}

#[test]
fn comparable_files_drop_noise() {
    let mut disk = fp::Disk::default();
    disk.files.push(fp::DiskFile { name: "hello".to_string(), sha256: "x".to_string(), size: 10, ..Default::default() });
    disk.files.push(fp::DiskFile { name: "empty".to_string(), sha256: "y".to_string(), size: 0, ..Default::default() });
    disk.files.push(fp::DiskFile { name: "real".to_string(), sha256: "z".to_string(), size: 5, ..Default::default() });
    let kept = analysis::comparable_files(&disk);
    assert_eq!(kept.len(),1);
    assert_eq!(kept[0].name,"real");
}

#[test]
fn pool_sweep_and_cancellation() {
    let mk = |sha: &str| vec![fp::DiskFile { name: "f".to_string(), sha256: sha.to_string(), size: 1, ..Default::default() }];
    let mut records: HashMap<String,Vec<fp::DiskFile>> = HashMap::new();
    records.insert("/a".to_string(),mk("h1"));
    records.insert("/b".to_string(),mk("h1"));
    records.insert("/c".to_string(),mk("h2"));
    let cancel = pool::CancelToken::new();
    let results = pool::collect_overlaps(&records,KeepPredicate::Threshold(1.0),2,&cancel);
    assert!(results["/a"].contains_key("/b"));
    assert!(!results["/a"].contains_key("/c"));
    assert!(results["/b"].contains_key("/a"));
    assert!(!results.contains_key("/c"));
    // a pre-cancelled sweep returns nothing but still terminates
    let cancelled = pool::CancelToken::new();
    cancelled.cancel();
    let partial = pool::collect_overlaps(&records,KeepPredicate::Threshold(0.0),2,&cancelled);
    assert_eq!(partial.len(),0);
}

#[test]
fn generic_fallback_for_unrecognized() {
    // an empty 140K image has no file system but still fingerprints
    let disk = builder::analyze_bytes("/corpus/blank.dsk",vec![0;img::DOS16_BYTES],1).expect("analyze failed");
    assert_eq!(disk.format_id,0);
    assert_eq!(disk.files.len(),0);
    assert_eq!(disk.bitmap.len(),35*16);
    assert!(disk.bitmap.iter().all(|b| *b));
    assert_eq!(disk.active_sectors.len(),35*16);
    assert_eq!(disk.sha256,checksum(&vec![0;img::DOS16_BYTES]));
}

#[test]
fn empty_sector_sha_constant() {
    // the canonical hash of a zeroed sector, used to exclude empties
    assert_eq!(checksum(&vec![0u8;256]),analysis::EMPTY_SECTOR_SHA);
}
