use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use iosweep::bench::{ReadBenchmark, WriteBenchmark};
use iosweep::config::SweepConfig;
use iosweep::io::OpenFlags;
use iosweep::models::Operation;
use iosweep::report::{RunReport, SweepReport};
use iosweep::{cycles, Result, APP_NAME, SCRATCH_FILE};

const COMMENT: &str = "direct + sync I/O";

fn print_usage() {
    println!(
        "Measures the latency and bandwidth of positioned reads and writes \
         in various chunk sizes.\n\n\
         Usage: {} [--json] [FILE]\n\n\
         Options:\n\
         \x20 --json      emit one JSON document instead of the tables\n\
         \x20 -h, --help  print this help",
        APP_NAME
    );
}

fn main() -> ExitCode {
    let mut json = false;
    let mut path: Option<PathBuf> = None;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            _ if arg.starts_with('-') => {
                print_usage();
                return ExitCode::from(2);
            }
            _ => {
                if path.is_some() {
                    print_usage();
                    return ExitCode::from(2);
                }
                path = Some(PathBuf::from(arg));
            }
        }
    }

    let path = path.unwrap_or_else(|| env::temp_dir().join(SCRATCH_FILE));

    match run(&path, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", APP_NAME, e);
            ExitCode::FAILURE
        }
    }
}

fn run(path: &Path, json: bool) -> Result<()> {
    let config = SweepConfig::load()?;

    // Calibrate now so it never lands inside a measurement window.
    cycles::per_second();

    let flags = OpenFlags::new().with_direct().with_sync();
    let write_bench = WriteBenchmark::new(config.clone())?;
    let read_bench = ReadBenchmark::new(config.clone())?;

    if json {
        let mut sink = io::sink();
        let write_samples = write_bench.run(path, flags, Some(COMMENT), &mut sink)?;
        let read_samples = read_bench.run(path, flags, Some(COMMENT), &mut sink)?;

        let mut report = RunReport::new(path, config);
        report.push(SweepReport::new(
            Operation::Write,
            Some(COMMENT),
            &write_samples,
        ));
        report.push(SweepReport::new(
            Operation::Read,
            Some(COMMENT),
            &read_samples,
        ));
        println!("{}", report.to_json()?);
    } else {
        let mut out = io::stdout().lock();
        write_bench.run(path, flags, Some(COMMENT), &mut out)?;
        read_bench.run(path, flags, Some(COMMENT), &mut out)?;
    }

    Ok(())
}
