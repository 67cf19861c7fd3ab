use anyhow::{Result, bail};
use memchr::{memchr, memchr_iter};

pub const INPUT_HEADER: &str = "method,numSamps,time,avgScore,maxScore";

pub const FIELD_METHOD: usize = 0;
pub const FIELD_NUM_SAMPS: usize = 1;
pub const FIELD_TIME: usize = 2;

/// One data line, borrowed from the input buffer without its newline.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RowView<'a> {
    raw: &'a [u8],
}

impl<'a> RowView<'a> {
    pub fn new(raw: &'a [u8]) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Comma-separated field `idx`, untrimmed. `None` past the last field.
    pub fn field(&self, idx: usize) -> Option<&'a [u8]> {
        let mut rest = self.raw;
        for _ in 0..idx {
            let comma = memchr(b',', rest)?;
            rest = &rest[comma + 1..];
        }
        match memchr(b',', rest) {
            Some(end) => Some(&rest[..end]),
            None => Some(rest),
        }
    }

    pub fn method(&self) -> Option<&'a [u8]> {
        self.field(FIELD_METHOD)
    }

    pub fn num_samps(&self) -> Option<&'a [u8]> {
        self.field(FIELD_NUM_SAMPS)
    }

    pub fn time(&self) -> Option<&'a [u8]> {
        self.field(FIELD_TIME)
    }
}

pub struct Table<'a> {
    pub rows: Vec<RowView<'a>>,
}

impl<'a> Table<'a> {
    /// Splits `bytes` on newlines and checks the header line. Every line after
    /// the header is a row, including the empty one after a final newline.
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let mut lines = split_lines(bytes).into_iter();
        let header = lines.next().unwrap_or_default();
        if header != INPUT_HEADER.as_bytes() {
            bail!(
                "unexpected header line: expected {:?}, found {:?}",
                INPUT_HEADER,
                String::from_utf8_lossy(header)
            );
        }
        Ok(Self {
            rows: lines.map(RowView::new).collect(),
        })
    }

    pub fn drop_trailing_blank(&mut self) {
        if self.rows.last().is_some_and(|r| r.is_empty()) {
            self.rows.pop();
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

fn split_lines(bytes: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0usize;
    for nl in memchr_iter(b'\n', bytes) {
        lines.push(&bytes[start..nl]);
        start = nl + 1;
    }
    lines.push(&bytes[start..]);
    lines
}
