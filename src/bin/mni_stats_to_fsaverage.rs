//! Project a volumetric map in MNI152NLin6Asym space onto the fsaverage surfaces by registration
//! fusion.

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use volsurf::logging::init_tracing;
use volsurf::{
    AtlasData, AtlasResampler, ChainInputs, Interpolation, OutputFormat, Pipeline, PipelineConfig,
};

const USAGE: &str =
    "Usage: mni-stats-to-fsaverage <input.nii.gz> <output_dir> [--interp linear|nearest]";

#[derive(Parser, Debug)]
#[command(name = "mni-stats-to-fsaverage")]
#[command(
    about = "Project a volumetric NIfTI in MNI152NLin6Asym space to fsaverage LH/RH surfaces \
             using registration fusion."
)]
struct Cli {
    /// Input NIfTI file (e.g. pmap.nii.gz) in MNI152NLin6Asym space
    input_nii: PathBuf,

    /// Directory to write fsaverage surface files
    output_dir: PathBuf,

    /// Interpolation method: linear or nearest
    #[arg(long, default_value = "linear")]
    interp: Interpolation,

    /// Atlas space the input is in
    #[arg(long, default_value = "MNI152NLin6Asym")]
    space: String,

    /// Output format: gii or curv
    #[arg(long, default_value = "gii")]
    format: OutputFormat,

    /// Directory holding the registration fusion mappings
    #[arg(long, env = "VOLSURF_DATA_DIR", default_value = volsurf::atlas::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
}

fn main() {
    if std::env::args_os().len() == 1 {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }
    init_tracing("warn,volsurf=info,mni_stats_to_fsaverage=info");

    let cli = Cli::parse();

    info!("Running registration fusion projection for: {}", cli.input_nii.display());
    let resampler = AtlasResampler::new(AtlasData::new(&cli.data_dir));
    let config = PipelineConfig::new(&cli.output_dir).with_format(cli.format);
    let inputs = ChainInputs::direct(cli.input_nii, &cli.space, cli.interp);

    match Pipeline::new(&resampler, config).run(&inputs) {
        Ok(out) => {
            info!("Wrote surfaces:\n  {}\n  {}", out.lh.display(), out.rh.display());
            info!("Load these in Freeview with:\n  {}", out.freeview_command());
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
