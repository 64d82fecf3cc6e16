use std::io::{Read, Seek};

use riff::riff::{ChunkHeader, ChunkReader, FourCC, RiffHeader};
use tracing::debug;

use crate::error::{Result, WavError};

pub const WAVE: FourCC = FourCC(*b"WAVE");
pub const FMT: FourCC = FourCC(*b"fmt ");
pub const DATA: FourCC = FourCC(*b"data");

pub const WAVE_FORMAT_PCM: u16 = 1;

/// https://learn.microsoft.com/en-us/windows/win32/api/mmreg/ns-mmreg-waveformat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmtChunk {
    pub audio_format: u16,
    pub channel_count: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl FmtChunk {
    pub const SIZE: u32 = 16;

    fn read<R: Read + Seek>(reader: &mut ChunkReader<R>, header: &ChunkHeader) -> Result<FmtChunk> {
        if header.size < Self::SIZE {
            return Err(WavError::FmtTooShort { size: header.size });
        }

        let fmt = FmtChunk {
            audio_format: reader.read_u16_le()?,
            channel_count: reader.read_u16_le()?,
            sample_rate: reader.read_u32_le()?,
            byte_rate: reader.read_u32_le()?,
            block_align: reader.read_u16_le()?,
            bits_per_sample: reader.read_u16_le()?,
        };

        // extended formats carry cbSize and extra fields after the basic 16 bytes
        reader.skip((header.size - Self::SIZE) as u64)?;

        Ok(fmt)
    }
}

/// Everything learned about a WAVE stream before its samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveHeader {
    pub riff: RiffHeader,
    pub skipped_before_fmt: Vec<ChunkHeader>,
    pub fmt_header: ChunkHeader,
    pub fmt: FmtChunk,
    pub skipped_before_data: Vec<ChunkHeader>,
    pub data: ChunkHeader,
}

impl WaveHeader {
    pub fn is_pcm(&self) -> bool {
        self.fmt.audio_format == WAVE_FORMAT_PCM
    }

    pub fn data_len(&self) -> u64 {
        self.data.size as u64
    }

    /// Number of frames in the data chunk, as declared by its byte length.
    /// Zero when the channel count or bit depth is zero.
    pub fn sample_count(&self) -> u64 {
        (self.data_len() * 8)
            .checked_div(self.fmt.channel_count as u64)
            .and_then(|bits| bits.checked_div(self.fmt.bits_per_sample as u64))
            .unwrap_or(0)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.fmt.sample_rate == 0 {
            return 0.0;
        }
        self.sample_count() as f64 / self.fmt.sample_rate as f64
    }
}

/// Read the RIFF header, then the `fmt ` chunk and the header of the `data`
/// chunk, skipping any other chunk in between.
///
/// On success the stream is positioned at the first byte of the samples.
pub fn scan<R: Read + Seek>(reader: &mut ChunkReader<R>) -> Result<WaveHeader> {
    let riff = reader.read_riff_header()?;
    if riff.form_type != WAVE {
        return Err(WavError::NotWave {
            found: riff.form_type,
        });
    }

    let (fmt_header, skipped_before_fmt) = reader.seek_chunk(FMT)?;
    let fmt = FmtChunk::read(reader, &fmt_header)?;
    debug!(?fmt, "read fmt chunk");

    let (data, skipped_before_data) = reader.seek_chunk(DATA)?;
    debug!(size = data.size, offset = data.offset, "found data chunk");

    Ok(WaveHeader {
        riff,
        skipped_before_fmt,
        fmt_header,
        fmt,
        skipped_before_data,
        data,
    })
}
