//! Retag the first data array of a GIFTI file as NIFTI_INTENT_SHAPE, so that viewers treat it as a
//! scalar overlay.

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use volsurf::logging::init_tracing;
use volsurf::normalize_gifti_file;
use volsurf::Encoding;

const USAGE: &str = "Usage: fix-gifti-intent <in.func.gii> <out.shape.gii>";

#[derive(Parser, Debug)]
#[command(name = "fix-gifti-intent")]
#[command(about = "Set the intent of a single-array GIFTI overlay to NIFTI_INTENT_SHAPE.")]
struct Cli {
    /// Input GIFTI file
    in_file: PathBuf,

    /// Output GIFTI file, may equal the input
    out_file: PathBuf,

    /// Write data uncompressed (Base64Binary) instead of GZipBase64Binary
    #[arg(long)]
    no_compress: bool,
}

fn main() {
    if std::env::args_os().len() == 1 {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }
    init_tracing("warn,volsurf=info,fix_gifti_intent=info");

    let cli = Cli::parse();
    let encoding =
        if cli.no_compress { Encoding::Base64Binary } else { Encoding::GZipBase64Binary };

    match normalize_gifti_file(&cli.in_file, &cli.out_file, encoding) {
        Ok(img) => {
            let count = img.arrays.first().map(|a| a.data.len()).unwrap_or(0);
            info!("Wrote {} ({} values)", cli.out_file.display(), count);
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
