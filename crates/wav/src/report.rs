use std::io::{Result, Write};

use riff::riff::ChunkHeader;

use crate::decode::ChannelPeaks;
use crate::format::WaveFormat;
use crate::scan::WaveHeader;

/// Write the chunk-by-chunk trace of a scanned header.
pub fn write_header<W: Write>(out: &mut W, header: &WaveHeader) -> Result<()> {
    writeln!(out, "chunk: {}", header.riff.id)?;
    writeln!(out, "  data: {} ", header.riff.form_type)?;

    write_skipped(out, &header.skipped_before_fmt)?;

    let fmt = &header.fmt;
    writeln!(out, "chunk: {}", header.fmt_header.id)?;
    writeln!(out, " audio Format: {} ", fmt.audio_format)?;
    writeln!(out, " num channels: {} ", fmt.channel_count)?;
    writeln!(out, " sample rate: {} ", fmt.sample_rate)?;
    writeln!(out, " bits per sample: {} ", fmt.bits_per_sample)?;

    write_skipped(out, &header.skipped_before_data)?;

    writeln!(out, "chunk: {}", header.data.id)?;
    writeln!(out, " num samples: {} ", header.sample_count())?;
    writeln!(out, " duration: {:.6} (sec)", header.duration_secs())?;

    Ok(())
}

fn write_skipped<W: Write>(out: &mut W, skipped: &[ChunkHeader]) -> Result<()> {
    for chunk in skipped {
        writeln!(out, "chunk: {}", chunk.id)?;
        writeln!(out, " skipped: {} bytes", chunk.size)?;
    }
    Ok(())
}

pub fn write_peaks<W: Write>(out: &mut W, format: &WaveFormat, peaks: &ChannelPeaks) -> Result<()> {
    if format.channel_count == 1 {
        writeln!(out, " max abs mono sample: {}", peaks.mono())?;
    } else {
        writeln!(out, " max abs left sample:  {}", peaks.left_or_mono_max)?;
        writeln!(out, " max abs right sample: {}", peaks.right_max)?;
    }
    Ok(())
}
