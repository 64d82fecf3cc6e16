use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use riff::riff::ChunkReader;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wav::{decode, report, scan, Category, WavError, WaveFormat};

#[derive(Parser, Debug)]
#[command(name = "wavpeak", version, about)]
/// Print the format and peak sample magnitudes of a PCM WAVE file
struct Args {
    /// Input WAV file path
    #[arg(value_name = "WAV_FILE")]
    path: PathBuf,

    /// Log diagnostics to stderr (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Error)]
enum Failure {
    #[error("could not open wav file {} ", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("could not read wav file {} ", .path.display())]
    Read { path: PathBuf, source: WavError },
    #[error("wav file {} has incompatible format ", .path.display())]
    Incompatible { path: PathBuf, source: WavError },
    #[error("wav file {} has truncated audio data ", .path.display())]
    Truncated { path: PathBuf, source: WavError },
    #[error("could not write report: {0}")]
    Output(#[from] io::Error),
}

impl Failure {
    fn from_wav(path: &Path, source: WavError) -> Failure {
        let path = path.to_path_buf();
        match source.category() {
            Category::Read => Failure::Read { path, source },
            Category::IncompatibleFormat => Failure::Incompatible { path, source },
            Category::TruncatedAudioData => Failure::Truncated { path, source },
        }
    }

    fn exit_code(&self) -> u8 {
        match self {
            Failure::Open { .. } | Failure::Read { .. } | Failure::Output(_) => 2,
            Failure::Incompatible { .. } => 3,
            Failure::Truncated { .. } => 4,
        }
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{}", e.render());
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            print!("{}", e.render());
            return ExitCode::from(1);
        }
    };

    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            if let Some(source) = std::error::Error::source(&failure) {
                debug!(error = %source, "analysis failed");
            }
            println!("{}", failure);
            ExitCode::from(failure.exit_code())
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run(args: &Args) -> Result<(), Failure> {
    let path = &args.path;
    let file = File::open(path).map_err(|source| Failure::Open {
        path: path.clone(),
        source,
    })?;
    let fail = |source: WavError| Failure::from_wav(path, source);

    let mut reader = ChunkReader::new(BufReader::new(file)).map_err(|e| fail(e.into()))?;
    let header = scan(&mut reader).map_err(fail)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_header(&mut out, &header)?;

    let format = WaveFormat::try_from(&header).map_err(fail)?;
    debug!(?format, "decoding samples");
    let peaks = decode(&mut reader, &format).map_err(fail)?;

    report::write_peaks(&mut out, &format, &peaks)?;
    out.flush()?;

    Ok(())
}
