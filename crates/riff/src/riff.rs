use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("not a RIFF stream (found {found})")]
    NotRiff { found: FourCC },
    #[error("unexpected end of stream at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        offset: u64,
        needed: u64,
        remaining: u64,
    },
    #[error("chunk {id} not found before end of stream")]
    ChunkNotFound { id: FourCC },
    #[error("chunk {id} at offset {offset} declares {size} bytes but only {remaining} remain")]
    ChunkOverrun {
        id: FourCC,
        offset: u64,
        size: u32,
        remaining: u64,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Four-character code identifying a chunk or a form type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub const RIFF: FourCC = FourCC(*b"RIFF");
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC({:?})", self.to_string())
    }
}

/// The 12-byte header opening a RIFF stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiffHeader {
    pub id: FourCC,
    pub size: u32,
    pub form_type: FourCC,
}

/// Id and size fields of a chunk, plus where the chunk starts in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: FourCC,
    pub size: u32,
    pub offset: u64,
}

impl ChunkHeader {
    pub fn data_offset(&self) -> u64 {
        self.offset + 8 // 8 for id and size fields
    }
}

/// Sequential reader over the chunks of a RIFF stream.
///
/// The stream length is measured once on construction and bounds every
/// read and skip afterwards, so a scan over a truncated or malformed
/// stream ends with an error instead of running past the end.
pub struct ChunkReader<R> {
    inner: R,
    pos: u64,
    len: u64,
}

impl<R: Read + Seek> ChunkReader<R> {
    pub fn new(mut inner: R) -> Result<ChunkReader<R>> {
        let pos = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(pos))?;

        Ok(ChunkReader { inner, pos, len })
    }

    pub fn read_riff_header(&mut self) -> Result<RiffHeader> {
        let id = self.read_fourcc()?;
        if id != FourCC::RIFF {
            return Err(Error::NotRiff { found: id });
        }
        let size = self.read_u32_le()?;
        let form_type = self.read_fourcc()?;

        let actual = self.len.saturating_sub(8);
        if size as u64 != actual {
            warn!(declared = size, actual, "RIFF size does not match stream length");
        }

        Ok(RiffHeader {
            id,
            size,
            form_type,
        })
    }

    pub fn next_header(&mut self) -> Result<ChunkHeader> {
        let offset = self.pos;
        self.ensure(8)?;
        let id = self.read_fourcc()?;
        let size = self.read_u32_le()?;

        Ok(ChunkHeader { id, size, offset })
    }

    /// Advance past the payload of `header`, which must be the chunk whose
    /// header was just read.
    pub fn skip_chunk(&mut self, header: &ChunkHeader) -> Result<()> {
        let remaining = self.remaining();
        if header.size as u64 > remaining {
            return Err(Error::ChunkOverrun {
                id: header.id,
                offset: header.offset,
                size: header.size,
                remaining,
            });
        }
        self.skip(header.size as u64)
    }

    pub fn skip(&mut self, n: u64) -> Result<()> {
        self.ensure(n)?;
        self.inner.seek(SeekFrom::Current(n as i64))?;
        self.pos += n;
        Ok(())
    }

    /// Skip chunks until one with `id` is found. Returns its header, leaving
    /// the stream at the start of its payload, along with the headers of
    /// every chunk skipped on the way.
    pub fn seek_chunk(&mut self, id: FourCC) -> Result<(ChunkHeader, Vec<ChunkHeader>)> {
        let mut skipped = Vec::new();

        // every iteration consumes at least 8 bytes of a finite stream
        while self.remaining() >= 8 {
            let header = self.next_header()?;
            if header.id == id {
                return Ok((header, skipped));
            }

            debug!(id = %header.id, size = header.size, offset = header.offset, "skipping chunk");
            self.skip_chunk(&header)?;
            skipped.push(header);
        }

        Err(Error::ChunkNotFound { id })
    }

    pub fn read_fourcc(&mut self) -> Result<FourCC> {
        let mut buf4 = [0u8; 4];
        self.fill(&mut buf4)?;
        Ok(FourCC(buf4))
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        let mut buf2 = [0u8; 2];
        self.fill(&mut buf2)?;
        Ok(u16::from_le_bytes(buf2))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        let mut buf4 = [0u8; 4];
        self.fill(&mut buf4)?;
        Ok(u32::from_le_bytes(buf4))
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure(buf.len() as u64)?;
        self.inner.read_exact(buf)?;
        self.pos += buf.len() as u64;
        Ok(())
    }

    fn ensure(&self, needed: u64) -> Result<()> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(Error::UnexpectedEof {
                offset: self.pos,
                needed,
                remaining,
            });
        }
        Ok(())
    }
}

impl<R> ChunkReader<R> {
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.pos)
    }
}

impl<R: Read> Read for ChunkReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}
