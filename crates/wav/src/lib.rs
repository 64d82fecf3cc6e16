//! PCM WAVE inspection: locate the `fmt ` and `data` chunks of a RIFF/WAVE
//! stream, then scan the samples for their peak magnitude per channel.

pub mod decode;
pub mod error;
pub mod format;
pub mod report;
pub mod scan;

pub use decode::{decode, ChannelPeaks};
pub use error::{Category, Result, WavError};
pub use format::WaveFormat;
pub use scan::{scan, FmtChunk, WaveHeader};
