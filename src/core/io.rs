use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const GZIP_READ_BUF: usize = 1024 * 1024;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Plain,
    Gzip,
}

pub struct MmapSource {
    mmap: Mmap,
}

impl MmapSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        // SAFETY: read-only file mapping.
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("mmap failed for {}", path.display()))?;
        Ok(Self { mmap })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }
}

/// Whole input file held in memory, either mapped or decompressed.
pub enum InputBuffer {
    Mapped(MmapSource),
    Owned(Vec<u8>),
}

impl InputBuffer {
    pub fn open(path: &Path) -> Result<Self> {
        match detect_input_kind(path)? {
            InputKind::Plain => {
                let len = std::fs::metadata(path)
                    .with_context(|| format!("failed to stat {}", path.display()))?
                    .len();
                // Zero-length files cannot be mapped on every platform.
                if len == 0 {
                    return Ok(InputBuffer::Owned(Vec::new()));
                }
                Ok(InputBuffer::Mapped(MmapSource::open(path)?))
            }
            InputKind::Gzip => Ok(InputBuffer::Owned(read_gzip(path)?)),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            InputBuffer::Mapped(source) => source.bytes(),
            InputBuffer::Owned(buf) => buf,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }
}

/// Sniffs the gzip magic bytes; the file name plays no part.
pub fn detect_input_kind(path: &Path) -> Result<InputKind> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut magic = [0u8; 2];
    let n = file
        .read(&mut magic)
        .with_context(|| format!("failed to read magic bytes of {}", path.display()))?;
    if n == 2 && magic == [0x1f, 0x8b] {
        Ok(InputKind::Gzip)
    } else {
        Ok(InputKind::Plain)
    }
}

fn read_gzip(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut decoder = MultiGzDecoder::new(BufReader::with_capacity(GZIP_READ_BUF, file));
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .with_context(|| format!("gzip decompression error in {}", path.display()))?;
    Ok(out)
}
