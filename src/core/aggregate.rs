use crate::core::number::{format_number, parse_float_prefix, parse_float_strict};
use crate::core::table::{RowView, Table};
use anyhow::{Result, bail};
use std::collections::HashMap;

pub const MH_METHOD: &[u8] = b"mh";

/// Group key of rows that stop before the numSamps field.
pub const ABSENT_KEY: &[u8] = b"undefined";

/// numSamps of `row`, or [`ABSENT_KEY`] when the row has no such field.
/// A bare `mh` row therefore shares its group with rows whose numSamps is
/// literally `undefined` and with the blank trailing row.
pub fn group_key<'a>(row: &RowView<'a>) -> &'a [u8] {
    row.num_samps().unwrap_or(ABSENT_KEY)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimeParse {
    /// Leading numeric prefix; unparsable text becomes NaN and still counts.
    Lenient,
    /// Whole field must be a number, otherwise the run fails.
    Strict,
}

#[derive(Clone, Copy, Debug, Default)]
struct GroupSum {
    sum: f64,
    count: u64,
}

/// Running per-numSamps time totals over "mh" rows.
#[derive(Debug)]
pub struct GroupAgg<'a> {
    parse: TimeParse,
    groups: HashMap<&'a [u8], GroupSum>,
    mh_rows: u64,
}

impl<'a> GroupAgg<'a> {
    pub fn new(parse: TimeParse) -> Self {
        Self {
            parse,
            groups: HashMap::new(),
            mh_rows: 0,
        }
    }

    /// `line_no` is the 1-based line in the input file, used in errors.
    pub fn update_row(&mut self, line_no: usize, row: &RowView<'a>) -> Result<()> {
        if row.method() != Some(MH_METHOD) {
            return Ok(());
        }
        let key = group_key(row);
        let time_text = row.time().unwrap_or_default();
        let time = match self.parse {
            TimeParse::Lenient => parse_float_prefix(time_text),
            TimeParse::Strict => match parse_float_strict(time_text) {
                Some(v) => v,
                None => bail!(
                    "line {}: time field {:?} is not a number",
                    line_no,
                    String::from_utf8_lossy(time_text)
                ),
            },
        };
        let group = self.groups.entry(key).or_default();
        group.sum += time;
        group.count += 1;
        self.mh_rows += 1;
        Ok(())
    }

    pub fn mh_rows(&self) -> u64 {
        self.mh_rows
    }

    pub fn finalize(&self) -> GroupAverages<'a> {
        let means = self
            .groups
            .iter()
            .map(|(&key, g)| (key, g.sum / g.count as f64))
            .collect();
        GroupAverages { means }
    }
}

/// Finalized mean time per numSamps key. Read-only once built.
#[derive(Clone, Debug)]
pub struct GroupAverages<'a> {
    means: HashMap<&'a [u8], f64>,
}

impl<'a> GroupAverages<'a> {
    pub fn get(&self, key: &[u8]) -> Option<f64> {
        self.means.get(key).copied()
    }

    /// Text for the MHavgTime column of a row with this key.
    pub fn render(&self, key: &[u8], missing: &str) -> String {
        match self.get(key) {
            Some(v) => format_number(v),
            None => missing.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }
}

/// Header line is line 1, so row `i` sits on line `i + 2`.
pub fn aggregate<'a>(table: &Table<'a>, parse: TimeParse) -> Result<GroupAgg<'a>> {
    let mut agg = GroupAgg::new(parse);
    for (i, row) in table.rows.iter().enumerate() {
        agg.update_row(i + 2, row)?;
    }
    Ok(agg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(data: &'static [u8]) -> Table<'static> {
        Table::parse(data).unwrap()
    }

    #[test]
    fn averages_mh_rows_per_group() {
        let t = table(
            b"method,numSamps,time,avgScore,maxScore\n\
              mh,10,1.0,0.5,0.9\n\
              mh,10,3.0,0.6,0.9\n\
              is,10,50.0,0.7,0.9\n\
              mh,20,4.5,0.1,0.2\n",
        );
        let agg = aggregate(&t, TimeParse::Lenient).unwrap();
        assert_eq!(agg.mh_rows(), 3);
        let avgs = agg.finalize();
        assert_eq!(avgs.len(), 2);
        assert_eq!(avgs.get(b"10"), Some(2.0));
        assert_eq!(avgs.get(b"20"), Some(4.5));
    }

    #[test]
    fn keys_are_compared_as_raw_bytes() {
        let t = table(
            b"method,numSamps,time,avgScore,maxScore\n\
              mh,100,1,0,0\n\
              mh,100.0,3,0,0\n\
              mh, 100,5,0,0",
        );
        let avgs = aggregate(&t, TimeParse::Lenient).unwrap().finalize();
        assert_eq!(avgs.len(), 3);
        assert_eq!(avgs.get(b"100"), Some(1.0));
        assert_eq!(avgs.get(b"100.0"), Some(3.0));
        assert_eq!(avgs.get(b" 100"), Some(5.0));
    }

    #[test]
    fn method_match_is_exact() {
        let t = table(
            b"method,numSamps,time,avgScore,maxScore\n\
              MH,10,1,0,0\n\
              mh ,10,1,0,0\n\
              mhx,10,1,0,0",
        );
        let avgs = aggregate(&t, TimeParse::Lenient).unwrap().finalize();
        assert_eq!(avgs.len(), 0);
    }

    #[test]
    fn lenient_bad_time_poisons_group_with_nan() {
        let t = table(
            b"method,numSamps,time,avgScore,maxScore\n\
              mh,10,1.0,0,0\n\
              mh,10,oops,0,0\n\
              mh,20,2.0s,0,0\n\
              mh,30",
        );
        let agg = aggregate(&t, TimeParse::Lenient).unwrap();
        let avgs = agg.finalize();
        assert!(avgs.get(b"10").unwrap().is_nan());
        assert_eq!(avgs.get(b"20"), Some(2.0));
        assert!(avgs.get(b"30").unwrap().is_nan());
        assert_eq!(agg.mh_rows(), 4);
    }

    #[test]
    fn strict_bad_time_reports_line() {
        let t = table(
            b"method,numSamps,time,avgScore,maxScore\n\
              mh,10,1.0,0,0\n\
              mh,10,2.0s,0,0\n",
        );
        let err = aggregate(&t, TimeParse::Strict).err().unwrap();
        let msg = err.to_string();
        assert!(msg.contains("line 3"), "{msg}");
        assert!(msg.contains("2.0s"), "{msg}");
    }

    #[test]
    fn strict_accepts_clean_numbers_and_skips_other_methods() {
        let t = table(
            b"method,numSamps,time,avgScore,maxScore\n\
              mh,10,1.5,0,0\n\
              is,10,n/a,0,0\n",
        );
        let avgs = aggregate(&t, TimeParse::Strict).unwrap().finalize();
        assert_eq!(avgs.get(b"10"), Some(1.5));
    }

    #[test]
    fn render_uses_missing_text_for_absent_groups() {
        let t = table(b"method,numSamps,time,avgScore,maxScore\nmh,10,2.5,0,0");
        let avgs = aggregate(&t, TimeParse::Lenient).unwrap().finalize();
        assert_eq!(avgs.render(b"10", "undefined"), "2.5");
        assert_eq!(avgs.render(b"20", "undefined"), "undefined");
        assert_eq!(avgs.render(ABSENT_KEY, ""), "");
    }

    #[test]
    fn bare_mh_row_feeds_the_absent_key_group() {
        let t = table(
            b"method,numSamps,time,avgScore,maxScore\n\
              mh\n\
              is,undefined,1,0,0\n",
        );
        let agg = aggregate(&t, TimeParse::Lenient).unwrap();
        assert_eq!(agg.mh_rows(), 1);
        let avgs = agg.finalize();
        assert_eq!(avgs.len(), 1);
        assert!(avgs.get(ABSENT_KEY).unwrap().is_nan());
        assert_eq!(group_key(&t.rows[0]), ABSENT_KEY);
        assert_eq!(group_key(&t.rows[2]), ABSENT_KEY);
        assert_eq!(avgs.render(group_key(&t.rows[2]), "undefined"), "NaN");
    }

    #[test]
    fn absent_key_and_literal_undefined_share_a_group() {
        let t = table(
            b"method,numSamps,time,avgScore,maxScore\n\
              mh,undefined,4,0,0\n\
              mh",
        );
        let avgs = aggregate(&t, TimeParse::Lenient).unwrap().finalize();
        assert!(avgs.get(b"undefined").unwrap().is_nan());
    }
}
