use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use cachesim::{CacheConfig, Simulator, TraceReader, verbose_line};

#[derive(Parser, Debug)]
#[command(name = "cachesim", about = "Set-associative LRU cache simulator", long_about = None)]
struct Args {
    /// Number of set index bits.
    #[arg(short = 's', value_name = "num")]
    set_bits: u32,

    /// Number of lines per set.
    #[arg(short = 'E', value_name = "num")]
    lines_per_set: usize,

    /// Number of block offset bits.
    #[arg(short = 'b', value_name = "num")]
    block_bits: u32,

    /// Trace file to replay.
    #[arg(short = 't', value_name = "file")]
    trace: PathBuf,

    /// Echo each access and its outcome.
    #[arg(short = 'v')]
    verbose: bool,
}

fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // Help and unknown options exit cleanly; a missing or malformed
            // required option does not.
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::UnknownArgument => 0,
                _ => 1,
            };
            let _ = err.print();
            process::exit(code);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args();

    let config = match CacheConfig::new(args.set_bits, args.lines_per_set, args.block_bits) {
        Ok(config) => config,
        Err(err) => {
            let mut cmd = Args::command();
            eprintln!("cachesim: {err}");
            eprintln!("{}", cmd.render_help());
            process::exit(1);
        }
    };

    let trace = TraceReader::open(&args.trace)
        .map_err(|err| anyhow!("{}: {err}", args.trace.display()))?;

    let mut sim = Simulator::new(config);
    for entry in trace {
        let outcome = sim.process(entry);
        if args.verbose {
            if let Some(line) = verbose_line(entry, outcome) {
                println!("{line}");
            }
        }
    }
    println!("{}", sim.stats());
    Ok(())
}
