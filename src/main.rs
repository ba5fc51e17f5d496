//! # Command Line Interface
//!
//! Flag driven front end over the `commands` module.  One invocation
//! runs one of: bulk ingest, a report, a search, or a mutation against
//! a single disk image.  Set the RUST_LOG environment variable to
//! control logging level (trace,debug,info,warn,error).

use clap::{Arg,ArgAction,Command};
use std::io::Write;
use std::process::exit;

use a2census::analysis::pool::CancelToken;
use a2census::analysis::KeepPredicate;
use a2census::commands::{self,ingest,modify,report,search};
use a2census::commands::report::{Granularity,OutputFormat,PairFilters};
use a2census::fp::{builder,store::Store};

fn build_cli() -> Command {
    Command::new("a2census")
        .about("Catalogs Apple II disk images and hunts duplicates and near-duplicates.")
        .arg(Arg::new("ingest").long("ingest").value_name("PATH")
            .help("disk file or directory to ingest"))
        .arg(Arg::new("datastore").long("datastore").value_name("PATH")
            .help("database of disk fingerprints"))
        .arg(Arg::new("force").long("force").action(ArgAction::SetTrue)
            .help("re-ingest disks that already exist"))
        .arg(Arg::new("ingest-mode").long("ingest-mode").value_name("MODE").default_value("1")
            .help("0=fingerprints only, 1=+text, 2=+sector data, 3=all"))
        .arg(Arg::new("whole-dupes").long("whole-dupes").action(ArgAction::SetTrue)
            .help("run whole disk dupe report"))
        .arg(Arg::new("as-dupes").long("as-dupes").action(ArgAction::SetTrue)
            .help("run active sectors only dupe report"))
        .arg(Arg::new("file-dupes").long("file-dupes").action(ArgAction::SetTrue)
            .help("run file dupe report"))
        .arg(Arg::new("cat-dupes").long("cat-dupes").action(ArgAction::SetTrue)
            .help("run duplicate catalog report"))
        .arg(Arg::new("quarantine").long("quarantine").action(ArgAction::SetTrue)
            .help("run -whole-dupes or -as-dupes in quarantine mode"))
        .arg(Arg::new("similarity").long("similarity").value_name("RATIO").default_value("0.90")
            .help("match threshold for partial reports"))
        .arg(Arg::new("min-same").long("min-same").value_name("N").default_value("0")
            .help("minimum same files for -all-file-partial"))
        .arg(Arg::new("max-diff").long("max-diff").value_name("N").default_value("0")
            .help("maximum differing files for -all-file-partial"))
        .arg(Arg::new("all-file-partial").long("all-file-partial").action(ArgAction::SetTrue)
            .help("partial file match over all disks"))
        .arg(Arg::new("all-sector-partial").long("all-sector-partial").action(ArgAction::SetTrue)
            .help("partial sector match (all sectors) over all disks"))
        .arg(Arg::new("active-sector-partial").long("active-sector-partial").action(ArgAction::SetTrue)
            .help("partial sector match (active only) over all disks"))
        .arg(Arg::new("all-file-subset").long("all-file-subset").action(ArgAction::SetTrue)
            .help("subset file match over all disks"))
        .arg(Arg::new("all-sector-subset").long("all-sector-subset").action(ArgAction::SetTrue)
            .help("subset sector match (non-zero) over all disks"))
        .arg(Arg::new("active-sector-subset").long("active-sector-subset").action(ArgAction::SetTrue)
            .help("subset sector match (active) over all disks"))
        .arg(Arg::new("as-partial").long("as-partial").action(ArgAction::SetTrue)
            .help("partial active sector match of one disk (-ingest <file> required)"))
        .arg(Arg::new("file-partial").long("file-partial").action(ArgAction::SetTrue)
            .help("partial file match of one disk (-ingest <file> required)"))
        .arg(Arg::new("file").long("file").value_name("NAME")
            .help("search for other disks containing a file of this disk"))
        .arg(Arg::new("search-filename").long("search-filename").value_name("NAME")
            .help("search database for files by name"))
        .arg(Arg::new("search-sha").long("search-sha").value_name("SHA")
            .help("search database for files by checksum"))
        .arg(Arg::new("search-text").long("search-text").value_name("TEXT")
            .help("search database for files containing text"))
        .arg(Arg::new("extract").long("extract").value_name("MODE").default_value("")
            .help("extract search matches: '@'=files, '#'=disks"))
        .arg(Arg::new("adorned").long("adorned").action(ArgAction::SetFalse)
            .help("extract files with plain instead of adorned names"))
        .arg(Arg::new("csv").long("csv").action(ArgAction::SetTrue)
            .help("output reports as CSV"))
        .arg(Arg::new("out").long("out").value_name("FILE")
            .help("report output file (stdout when absent)"))
        .arg(Arg::new("with-disk").long("with-disk").value_name("IMAGE")
            .help("perform a disk operation on this image"))
        .arg(Arg::new("file-put").long("file-put").value_name("LOCAL")
            .help("local file to put on the disk (-with-disk)"))
        .arg(Arg::new("file-delete").long("file-delete").value_name("NAME")
            .help("file to delete from the disk (-with-disk)"))
        .arg(Arg::new("file-extract").long("file-extract").value_name("NAME")
            .help("file to extract from the disk (-with-disk)"))
        .arg(Arg::new("dir-create").long("dir-create").value_name("NAME")
            .help("directory to create on the disk (-with-disk)"))
        .arg(Arg::new("catalog").long("catalog").action(ArgAction::SetTrue)
            .help("list disk contents (-with-disk)"))
        .arg(Arg::new("select").long("select").action(ArgAction::SetTrue)
            .help("restrict analysis to the trailing path arguments"))
        .arg(Arg::new("paths").num_args(0..).trailing_var_arg(true)
            .help("path filters when -select is given"))
}

fn open_sink(maybe_file: Option<&String>) -> Box<dyn Write> {
    match maybe_file {
        Some(f) => match std::fs::File::create(f) {
            Ok(handle) => Box::new(handle),
            Err(e) => {
                eprintln!("cannot open report file: {}",e);
                exit(2);
            }
        },
        None => Box::new(std::io::stdout())
    }
}

fn main() {
    env_logger::init();
    let matches = build_cli().get_matches();

    let datastore = match matches.get_one::<String>("datastore") {
        Some(d) => d.clone(),
        None => commands::default_datastore()
    };
    let store = Store::new(&datastore);
    let binpath = commands::binpath();
    let mode: u8 = matches.get_one::<String>("ingest-mode")
        .and_then(|s| s.parse().ok()).unwrap_or(1);
    let force = matches.get_flag("force");
    let threshold: f64 = matches.get_one::<String>("similarity")
        .and_then(|s| s.parse().ok()).unwrap_or(0.90);
    let min_same: usize = matches.get_one::<String>("min-same")
        .and_then(|s| s.parse().ok()).unwrap_or(0);
    let max_diff: usize = matches.get_one::<String>("max-diff")
        .and_then(|s| s.parse().ok()).unwrap_or(0);
    let fmt = match matches.get_flag("csv") {
        true => OutputFormat::Csv,
        false => OutputFormat::Text
    };
    let filters: Vec<String> = match (matches.get_flag("select"),matches.get_many::<String>("paths")) {
        (true,Some(paths)) => paths.cloned().collect(),
        _ => Vec::new()
    };
    let extract_mode = search::ExtractMode::from_flag(
        matches.get_one::<String>("extract").map(|s| s.as_str()).unwrap_or(""));
    let adorned = matches.get_flag("adorned");
    let cancel = CancelToken::new();
    let mut out = open_sink(matches.get_one::<String>("out"));

    // mutations against a single image come first and exit
    if let Some(disk_path) = matches.get_one::<String>("with-disk") {
        let result = if let Some(local) = matches.get_one::<String>("file-put") {
            modify::put(disk_path,local,&binpath)
        } else if let Some(name) = matches.get_one::<String>("file-delete") {
            modify::delete(disk_path,name,&binpath)
        } else if let Some(name) = matches.get_one::<String>("file-extract") {
            modify::extract(disk_path,name)
        } else if let Some(name) = matches.get_one::<String>("dir-create") {
            modify::make_directory(disk_path,name,&binpath)
        } else if matches.get_flag("catalog") {
            match modify::catalog(disk_path) {
                Ok(listing) => {
                    print!("{}",listing);
                    Ok(())
                },
                Err(e) => Err(e)
            }
        } else {
            eprintln!("Additional flag required");
            exit(3);
        };
        match result {
            Ok(()) => exit(0),
            Err(e) => {
                eprintln!("{}",e);
                exit(1);
            }
        }
    }

    // searches over the store
    if let Some(needle) = matches.get_one::<String>("search-filename") {
        search::search_filename(&store,&filters,needle,extract_mode,adorned,&binpath,out.as_mut())
            .unwrap_or_else(|e| { eprintln!("{}",e); exit(1); });
        return;
    }
    if let Some(sha) = matches.get_one::<String>("search-sha") {
        search::search_sha(&store,&filters,sha,extract_mode,adorned,&binpath,out.as_mut())
            .unwrap_or_else(|e| { eprintln!("{}",e); exit(1); });
        return;
    }
    if let Some(text) = matches.get_one::<String>("search-text") {
        search::search_text(&store,&filters,text,extract_mode,adorned,&binpath,out.as_mut())
            .unwrap_or_else(|e| { eprintln!("{}",e); exit(1); });
        return;
    }

    // reports over the store
    let pair_filters = PairFilters { min_same, max_diff };
    let mut ran_report = false;
    let mut report_result: Result<(),Box<dyn std::error::Error>> = Ok(());
    if matches.get_flag("whole-dupes") || matches.get_flag("as-dupes") {
        let gran = match matches.get_flag("as-dupes") {
            true => Granularity::ActiveSectors,
            false => Granularity::AllSectors
        };
        report_result = match matches.get_flag("quarantine") {
            true => report::quarantine(&store,&filters,gran,&binpath).map(|moved| {
                eprintln!("{} disks quarantined",moved);
            }),
            false => report::dupe_report(&store,&filters,gran,fmt,out.as_mut())
        };
        ran_report = true;
    } else if matches.get_flag("file-dupes") {
        report_result = report::dupe_report(&store,&filters,Granularity::Files,fmt,out.as_mut());
        ran_report = true;
    } else if matches.get_flag("cat-dupes") {
        report_result = report::overlap_report(&store,&filters,Granularity::Files,
            KeepPredicate::Threshold(1.0),pair_filters,&cancel,fmt,out.as_mut());
        ran_report = true;
    } else if matches.get_flag("all-file-partial") {
        report_result = report::overlap_report(&store,&filters,Granularity::Files,
            KeepPredicate::Threshold(match min_same > 0 || max_diff > 0 { true => 0.0, false => threshold }),
            pair_filters,&cancel,fmt,out.as_mut());
        ran_report = true;
    } else if matches.get_flag("all-sector-partial") {
        report_result = report::overlap_report(&store,&filters,Granularity::AllSectors,
            KeepPredicate::Threshold(threshold),pair_filters,&cancel,fmt,out.as_mut());
        ran_report = true;
    } else if matches.get_flag("active-sector-partial") {
        report_result = report::overlap_report(&store,&filters,Granularity::ActiveSectors,
            KeepPredicate::Threshold(threshold),pair_filters,&cancel,fmt,out.as_mut());
        ran_report = true;
    } else if matches.get_flag("all-file-subset") {
        report_result = report::overlap_report(&store,&filters,Granularity::Files,
            KeepPredicate::Subset,pair_filters,&cancel,fmt,out.as_mut());
        ran_report = true;
    } else if matches.get_flag("all-sector-subset") {
        report_result = report::overlap_report(&store,&filters,Granularity::AllSectors,
            KeepPredicate::Subset,pair_filters,&cancel,fmt,out.as_mut());
        ran_report = true;
    } else if matches.get_flag("active-sector-subset") {
        report_result = report::overlap_report(&store,&filters,Granularity::ActiveSectors,
            KeepPredicate::Subset,pair_filters,&cancel,fmt,out.as_mut());
        ran_report = true;
    }
    if ran_report {
        if let Err(e) = report_result {
            eprintln!("{}",e);
            exit(1);
        }
        return;
    }

    // ingest: a directory walks the pool, a single file may chain into
    // the single-disk reports
    if let Some(target) = matches.get_one::<String>("ingest") {
        let info = match std::fs::metadata(target) {
            Ok(i) => i,
            Err(e) => {
                eprintln!("Error stating file: {}",e);
                exit(2);
            }
        };
        if info.is_dir() {
            match ingest::walk(target,&store,mode,force) {
                Ok(summary) => print!("{}",ingest::summary_table(&summary)),
                Err(e) => {
                    eprintln!("{}",e);
                    exit(1);
                }
            }
            return;
        }
        let disk = match builder::analyze_file(target,mode) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Error processing volume: {}",e);
                exit(1);
            }
        };
        if force || !store.contains(&disk) {
            if let Err(e) = store.put(&disk) {
                eprintln!("{}",e);
                exit(1);
            }
        }
        let single_result = if matches.get_flag("as-partial") {
            report::disk_overlap_report(&store,&filters,&disk,Granularity::ActiveSectors,
                KeepPredicate::Threshold(threshold),fmt,out.as_mut())
        } else if matches.get_flag("file-partial") {
            report::disk_overlap_report(&store,&filters,&disk,Granularity::Files,
                KeepPredicate::Threshold(threshold),fmt,out.as_mut())
        } else if let Some(fname) = matches.get_one::<String>("file") {
            report::file_match_report(&store,&filters,&disk,fname,out.as_mut())
        } else {
            Ok(())
        };
        if let Err(e) = single_result {
            eprintln!("{}",e);
            exit(1);
        }
        return;
    }

    // nothing asked for
    let _ = build_cli().print_help();
}
