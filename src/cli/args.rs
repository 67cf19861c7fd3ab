use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

pub const BIN_NAME: &str = "mh-avg-time";

#[derive(Parser, Debug)]
#[command(
    name = "mh-avg-time",
    version,
    about = "Append the per-numSamps average MH time to every row of a results CSV"
)]
pub struct Cli {
    pub infile: PathBuf,

    pub outfile: PathBuf,

    /// Positionals after `outfile` are accepted and ignored.
    #[arg(hide = true)]
    pub rest: Vec<OsString>,

    /// Text written in MHavgTime when no "mh" row shares the row's numSamps.
    #[arg(long, default_value = "undefined")]
    pub missing: String,

    /// Fail on "mh" rows whose time field is not a complete number.
    #[arg(long, default_value_t = false)]
    pub strict_time: bool,

    /// Drop the empty row left behind by a trailing newline.
    #[arg(long, default_value_t = false)]
    pub drop_trailing_blank: bool,
}
