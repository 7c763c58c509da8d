//! Sample a volumetric map in MNI152NLin6Asym space onto fsLR 164k meshes, then resample it to
//! fsaverage 164k.

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use volsurf::logging::init_tracing;
use volsurf::ribbon::DEFAULT_RIBBON_SAMPLES;
use volsurf::{AtlasData, AtlasResampler, ChainInputs, OutputFormat, Pipeline, PipelineConfig};

const USAGE: &str = "Usage: mni-to-fsaverage <volume.nii.gz> <mask.nii.gz> \
                     [--lh-pial F] [--lh-white F] [--rh-pial F] [--rh-white F] [-o OUT_DIR]";

#[derive(Parser, Debug)]
#[command(name = "mni-to-fsaverage")]
#[command(about = "Sample MNI152NLin6Asym volumetric data to fsaverage surface via fsLR 164k.")]
struct Cli {
    /// Input volumetric map in MNI152NLin6Asym space (.nii.gz)
    volume: PathBuf,

    /// Mask image in the same space (.nii.gz)
    mask: PathBuf,

    /// Left hemisphere pial surface (fsLR 164k)
    #[arg(long, default_value = "fsaverage.L.pial_orig.164k_fs_LR.surf.gii")]
    lh_pial: PathBuf,

    /// Left hemisphere white surface (fsLR 164k)
    #[arg(long, default_value = "fsaverage.L.white_orig.164k_fs_LR.surf.gii")]
    lh_white: PathBuf,

    /// Right hemisphere pial surface (fsLR 164k)
    #[arg(long, default_value = "fsaverage.R.pial_orig.164k_fs_LR.surf.gii")]
    rh_pial: PathBuf,

    /// Right hemisphere white surface (fsLR 164k)
    #[arg(long, default_value = "fsaverage.R.white_orig.164k_fs_LR.surf.gii")]
    rh_white: PathBuf,

    /// Directory to save outputs
    #[arg(short, long, default_value = "fsaverage_output")]
    out_dir: PathBuf,

    /// Atlas space the volume and mask are in
    #[arg(long, default_value = "MNI152NLin6Asym")]
    space: String,

    /// Sample points per vertex between the white and pial surfaces
    #[arg(long, default_value_t = DEFAULT_RIBBON_SAMPLES)]
    samples: usize,

    /// Output format: gii or curv
    #[arg(long, default_value = "gii")]
    format: OutputFormat,

    /// Directory holding the fsLR and fsaverage registration spheres
    #[arg(long, env = "VOLSURF_DATA_DIR", default_value = volsurf::atlas::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
}

fn main() {
    if std::env::args_os().len() == 1 {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }
    init_tracing("warn,volsurf=info,mni_to_fsaverage=info");

    let cli = Cli::parse();

    let resampler =
        AtlasResampler::new(AtlasData::new(&cli.data_dir)).with_ribbon_samples(cli.samples);
    let config = PipelineConfig::new(&cli.out_dir).with_format(cli.format);
    let meshes = [cli.lh_pial, cli.lh_white, cli.rh_pial, cli.rh_white];
    let mut inputs = ChainInputs::two_stage(cli.volume, cli.mask, meshes);
    inputs.space = Some(cli.space);

    match Pipeline::new(&resampler, config).run(&inputs) {
        Ok(out) => {
            info!("Done. Load these in Freeview with:\n  {}", out.freeview_command());
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
