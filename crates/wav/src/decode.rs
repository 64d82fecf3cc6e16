use std::io::{ErrorKind, Read};

use tracing::trace;

use crate::error::{Result, WavError};
use crate::format::WaveFormat;

/// Largest absolute sample value seen on each lane of an interleaved scan.
///
/// Even-indexed samples land in `left_or_mono_max`, odd-indexed ones in
/// `right_max`. For stereo that is the left and right channel; for mono the
/// two lanes split the samples between them and [`ChannelPeaks::mono`]
/// recombines them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelPeaks {
    pub left_or_mono_max: u32,
    pub right_max: u32,
}

impl ChannelPeaks {
    pub fn mono(&self) -> u32 {
        self.left_or_mono_max.max(self.right_max)
    }

    fn observe(&mut self, index: u64, magnitude: u32) {
        let lane = if index % 2 == 0 {
            &mut self.left_or_mono_max
        } else {
            &mut self.right_max
        };
        *lane = (*lane).max(magnitude);
    }
}

/// Read every sample of the data chunk from `reader`, which must be
/// positioned at the start of the samples, and track the peak magnitude of
/// each lane.
pub fn decode<R: Read>(reader: &mut R, format: &WaveFormat) -> Result<ChannelPeaks> {
    let width = format.bytes_per_sample();
    if !(1..=4).contains(&width) {
        return Err(WavError::UnsupportedBitDepth {
            bits: format.bits_per_sample,
        });
    }

    let iterations = format.iteration_count();
    let mut peaks = ChannelPeaks::default();
    let mut buf4 = [0u8; 4];
    let sample = &mut buf4[..width];

    for i in 0..iterations {
        if let Err(e) = reader.read_exact(sample) {
            return Err(match e.kind() {
                ErrorKind::UnexpectedEof => WavError::TruncatedAudioData {
                    expected: format.data_len(),
                    decoded: i * width as u64,
                },
                _ => e.into(),
            });
        }
        peaks.observe(i, magnitude(sample));
    }

    trace!(iterations, width, ?peaks, "decoded data chunk");
    Ok(peaks)
}

/// Absolute value of one little-endian PCM sample.
///
/// 8-bit samples are unsigned around a midpoint of 128; wider samples are
/// two's complement. `i32::MIN` maps to 2^31 without overflow.
pub fn magnitude(sample: &[u8]) -> u32 {
    match *sample {
        [b0] => (b0 as i32 - 128).unsigned_abs(),
        [b0, b1] => i16::from_le_bytes([b0, b1]).unsigned_abs() as u32,
        // shift the 24 bits to the top, then back down to sign-extend
        [b0, b1, b2] => (i32::from_le_bytes([0, b0, b1, b2]) >> 8).unsigned_abs(),
        [b0, b1, b2, b3] => i32::from_le_bytes([b0, b1, b2, b3]).unsigned_abs(),
        _ => unreachable!("sample width is checked by decode"),
    }
}
