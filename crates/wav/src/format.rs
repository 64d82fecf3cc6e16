use tracing::warn;

use crate::error::{Result, WavError};
use crate::scan::WaveHeader;

/// Layout of the PCM samples in a data chunk, validated for decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveFormat {
    pub sample_format_code: u16,
    pub channel_count: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Frames in the data chunk.
    pub computed_sample_count: u64,
    /// Bits per frame, derived from the data length and frame count.
    pub derived_sample_size_bits: u64,
}

impl WaveFormat {
    /// Width in bytes of one channel's sample.
    pub fn bytes_per_sample(&self) -> usize {
        (self.derived_sample_size_bits / (8 * self.channel_count as u64)) as usize
    }

    /// Interleaved sample values in the data chunk, across all channels.
    pub fn iteration_count(&self) -> u64 {
        self.computed_sample_count * self.channel_count as u64
    }

    pub fn data_len(&self) -> u64 {
        self.iteration_count() * self.bytes_per_sample() as u64
    }
}

impl TryFrom<&WaveHeader> for WaveFormat {
    type Error = WavError;

    fn try_from(header: &WaveHeader) -> Result<WaveFormat> {
        let fmt = &header.fmt;
        if !header.is_pcm() {
            return Err(WavError::UnsupportedFormat {
                code: fmt.audio_format,
            });
        }
        if !matches!(fmt.channel_count, 1 | 2) {
            return Err(WavError::UnsupportedChannels {
                channels: fmt.channel_count,
            });
        }
        if !matches!(fmt.bits_per_sample, 8 | 16 | 24 | 32) {
            return Err(WavError::UnsupportedBitDepth {
                bits: fmt.bits_per_sample,
            });
        }

        let sample_count = header.sample_count();
        if sample_count == 0 {
            return Err(WavError::EmptyData);
        }

        let data_len = header.data_len();
        let derived_sample_size_bits = data_len / sample_count * 8;
        let frame_bytes = (fmt.bits_per_sample / 8 * fmt.channel_count) as u64;
        if derived_sample_size_bits != frame_bytes * 8 || sample_count * frame_bytes != data_len {
            return Err(WavError::InconsistentDataLength {
                data_len,
                sample_count,
                derived_sample_size_bits,
            });
        }

        if fmt.block_align as u64 != frame_bytes {
            warn!(
                block_align = fmt.block_align,
                frame_bytes, "block align does not match channels and bit depth"
            );
        }

        Ok(WaveFormat {
            sample_format_code: fmt.audio_format,
            channel_count: fmt.channel_count,
            sample_rate: fmt.sample_rate,
            bits_per_sample: fmt.bits_per_sample,
            computed_sample_count: sample_count,
            derived_sample_size_bits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::tests::{chunk, fmt_payload, wave};
    use crate::scan::scan;
    use riff::riff::ChunkReader;
    use std::io::Cursor;

    fn header(audio_format: u16, channels: u16, bits: u16, data_len: usize) -> WaveHeader {
        let bytes = wave(&[
            chunk(b"fmt ", &fmt_payload(audio_format, channels, 44100, bits)),
            chunk(b"data", &vec![0; data_len]),
        ]);
        let mut reader = ChunkReader::new(Cursor::new(bytes)).unwrap();
        scan(&mut reader).unwrap()
    }

    #[test]
    fn test_stereo_16() -> Result<()> {
        let format = WaveFormat::try_from(&header(1, 2, 16, 400))?;

        assert_eq!(format.computed_sample_count, 100);
        assert_eq!(format.derived_sample_size_bits, 32);
        assert_eq!(format.bytes_per_sample(), 2);
        assert_eq!(format.iteration_count(), 200);
        assert_eq!(format.data_len(), 400);
        Ok(())
    }

    #[test]
    fn test_supported_depths() -> Result<()> {
        for (bits, width) in [(8, 1), (16, 2), (24, 3), (32, 4)] {
            let format = WaveFormat::try_from(&header(1, 1, bits, width * 6))?;
            assert_eq!(format.bytes_per_sample(), width);
            assert_eq!(format.computed_sample_count, 6);
        }
        Ok(())
    }

    #[test]
    fn test_rejects_float() {
        assert!(matches!(
            WaveFormat::try_from(&header(3, 1, 32, 16)),
            Err(WavError::UnsupportedFormat { code: 3 })
        ));
    }

    #[test]
    fn test_rejects_extensible() {
        assert!(matches!(
            WaveFormat::try_from(&header(0xfffe, 2, 16, 16)),
            Err(WavError::UnsupportedFormat { code: 0xfffe })
        ));
    }

    #[test]
    fn test_rejects_channel_counts() {
        for channels in [0, 3, 6] {
            assert!(matches!(
                WaveFormat::try_from(&header(1, channels, 16, 48)),
                Err(WavError::UnsupportedChannels { .. })
            ));
        }
    }

    #[test]
    fn test_rejects_bit_depths() {
        for bits in [0, 4, 12, 20, 64] {
            match WaveFormat::try_from(&header(1, 1, bits, 48)) {
                Err(WavError::UnsupportedBitDepth { bits: found }) => assert_eq!(found, bits),
                other => panic!("expected UnsupportedBitDepth, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_rejects_empty_data() {
        assert!(matches!(
            WaveFormat::try_from(&header(1, 1, 16, 0)),
            Err(WavError::EmptyData)
        ));
        // a single byte cannot hold a 16-bit sample
        assert!(matches!(
            WaveFormat::try_from(&header(1, 1, 16, 1)),
            Err(WavError::EmptyData)
        ));
    }

    #[test]
    fn test_rejects_partial_frames() {
        match WaveFormat::try_from(&header(1, 1, 16, 5)) {
            Err(WavError::InconsistentDataLength {
                data_len,
                sample_count,
                derived_sample_size_bits,
            }) => {
                assert_eq!(data_len, 5);
                assert_eq!(sample_count, 2);
                assert_eq!(derived_sample_size_bits, 16);
            }
            other => panic!("expected InconsistentDataLength, got {:?}", other),
        }

        // 6 bytes of 16-bit stereo: one frame plus half of another
        assert!(matches!(
            WaveFormat::try_from(&header(1, 2, 16, 6)),
            Err(WavError::InconsistentDataLength { .. })
        ));
    }
}
