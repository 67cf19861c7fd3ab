use crate::cli::args::{BIN_NAME, Cli};
use crate::core::aggregate::{self, TimeParse};
use crate::core::io::InputBuffer;
use crate::core::table::Table;
use crate::report;
use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use std::env;
use std::process;
use std::time::{Duration, Instant};

pub fn entry() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            println!("usage: {} infile outfile", BIN_NAME);
            process::exit(1);
        }
        Err(e) => e.exit(),
    };
    run(cli)
}

fn run(args: Cli) -> Result<()> {
    let stats = stats_enabled();
    let t0 = Instant::now();

    let t_load = Instant::now();
    let input = InputBuffer::open(&args.infile)?;
    let mut table = Table::parse(input.bytes())
        .with_context(|| format!("invalid input {}", args.infile.display()))?;
    if args.drop_trailing_blank {
        table.drop_trailing_blank();
    }
    stage_done(stats, "load", t_load);

    let t_agg = Instant::now();
    let parse = if args.strict_time {
        TimeParse::Strict
    } else {
        TimeParse::Lenient
    };
    let agg = aggregate::aggregate(&table, parse)
        .with_context(|| format!("invalid time value in {}", args.infile.display()))?;
    let avgs = agg.finalize();
    stage_done(stats, "aggregate", t_agg);
    if stats {
        eprintln!(
            "MHAVG_STATS input={} bytes={} rows={} mh_rows={} groups={}",
            args.infile.display(),
            input.len(),
            table.len(),
            agg.mh_rows(),
            avgs.len()
        );
    }

    let t_write = Instant::now();
    report::augmented_csv::write(&args.outfile, &table, &avgs, &args.missing)?;
    stage_done(stats, "write", t_write);

    if stats {
        eprintln!("MHAVG_STATS output={}", args.outfile.display());
        eprintln!("MHAVG_STATS total={}", fmt_dur(t0.elapsed()));
    }

    Ok(())
}

fn stats_enabled() -> bool {
    matches!(env::var("MHAVG_STATS").as_deref(), Ok("1"))
}

fn stage_done(stats: bool, name: &str, t: Instant) {
    if stats {
        eprintln!("MHAVG_STATS stage={} time={}", name, fmt_dur(t.elapsed()));
    }
}

fn fmt_dur(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}
