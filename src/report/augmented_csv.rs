use crate::core::aggregate::{GroupAverages, group_key};
use crate::core::table::Table;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const OUTPUT_HEADER: &str = "method,numSamps,time,avgScore,maxScore,MHavgTime";

pub fn write(path: &Path, table: &Table<'_>, avgs: &GroupAverages<'_>, missing: &str) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    write_rows(&mut w, table, avgs, missing)
        .with_context(|| format!("failed to write {}", path.display()))?;
    w.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

pub fn write_rows(
    w: &mut dyn Write,
    table: &Table<'_>,
    avgs: &GroupAverages<'_>,
    missing: &str,
) -> Result<()> {
    writeln!(w, "{}", OUTPUT_HEADER)?;
    for row in &table.rows {
        w.write_all(row.raw())?;
        w.write_all(b",")?;
        w.write_all(avgs.render(group_key(row), missing).as_bytes())?;
        w.write_all(b"\n")?;
    }
    Ok(())
}
