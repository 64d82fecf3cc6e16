use std::io;

use riff::riff::FourCC;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WavError {
    #[error(transparent)]
    Riff(#[from] riff::riff::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("form type is {found}, expected WAVE")]
    NotWave { found: FourCC },
    #[error("fmt chunk is {size} bytes, expected at least 16")]
    FmtTooShort { size: u32 },
    #[error("audio format {code} is not linear PCM")]
    UnsupportedFormat { code: u16 },
    #[error("{channels} channels not supported, expected mono or stereo")]
    UnsupportedChannels { channels: u16 },
    #[error("{bits} bits per sample not supported, expected 8, 16, 24 or 32")]
    UnsupportedBitDepth { bits: u16 },
    #[error("data chunk holds no complete sample")]
    EmptyData,
    #[error("data chunk of {data_len} bytes does not hold {sample_count} whole frames (derived sample size {derived_sample_size_bits} bits)")]
    InconsistentDataLength {
        data_len: u64,
        sample_count: u64,
        derived_sample_size_bits: u64,
    },
    #[error("audio data truncated: expected {expected} bytes, stream ended after {decoded}")]
    TruncatedAudioData { expected: u64, decoded: u64 },
}

pub type Result<T> = std::result::Result<T, WavError>;

/// Coarse classification of a [`WavError`], one per way the tool can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// The underlying stream could not be read.
    Read,
    /// Not a PCM WAVE stream, or its chunk structure is malformed.
    IncompatibleFormat,
    /// The data chunk ends before all declared samples were read.
    TruncatedAudioData,
}

impl WavError {
    pub fn category(&self) -> Category {
        match self {
            WavError::Io(_) | WavError::Riff(riff::riff::Error::Io(_)) => Category::Read,
            WavError::TruncatedAudioData { .. } => Category::TruncatedAudioData,
            _ => Category::IncompatibleFormat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category() {
        let io_error = || io::Error::new(io::ErrorKind::PermissionDenied, "denied");

        assert_eq!(WavError::Io(io_error()).category(), Category::Read);
        assert_eq!(
            WavError::Riff(riff::riff::Error::Io(io_error())).category(),
            Category::Read
        );
        assert_eq!(
            WavError::Riff(riff::riff::Error::ChunkNotFound {
                id: FourCC(*b"data")
            })
            .category(),
            Category::IncompatibleFormat
        );
        assert_eq!(
            WavError::UnsupportedFormat { code: 3 }.category(),
            Category::IncompatibleFormat
        );
        assert_eq!(
            WavError::TruncatedAudioData {
                expected: 8,
                decoded: 4
            }
            .category(),
            Category::TruncatedAudioData
        );
    }

    #[test]
    fn test_riff_errors_display_transparently() {
        let err = WavError::from(riff::riff::Error::ChunkNotFound {
            id: FourCC(*b"fmt "),
        });
        assert_eq!(err.to_string(), "chunk fmt  not found before end of stream");
    }
}
