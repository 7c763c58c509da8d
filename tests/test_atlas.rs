mod common;

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use approx::assert_abs_diff_eq;
use volsurf::{
    read_gifti, read_nifti, write_gifti, AtlasData, AtlasResampler, AtlasSpace, BrainMesh,
    ChainInputs, Encoding, GiftiImage, Hemisphere, Intent, Interpolation, MeshSpace, Pipeline,
    PipelineConfig, Resampler, SurfaceField,
};

use common::{
    write_masked_volume, write_native_meshes, write_stat_volume, FSAVERAGE_164K, OUTSIDE_VERTICES,
};

/// Vertex `i` of the left hemisphere maps to voxel `(i % 8, i / 8 % 8, i / 64 % 8)` of the 8^3
/// stat volume, the right hemisphere mirrors x.
fn voxel_of(hemi: Hemisphere, i: usize) -> [usize; 3] {
    let x = i % 8;
    let x = match hemi {
        Hemisphere::Left => x,
        Hemisphere::Right => 7 - x,
    };
    [x, i / 8 % 8, i / 64 % 8]
}

fn stat_value(v: [usize; 3]) -> f32 {
    v[0] as f32 + 10.0 * v[1] as f32 + 100.0 * v[2] as f32 - 0.5
}

/// Points spread evenly over a sphere of radius 100, with a single triangle so the file is a valid
/// surface.
fn fibonacci_sphere(n: usize) -> BrainMesh {
    let golden = std::f64::consts::PI * (3.0 - 5f64.sqrt());
    let mut vertices = Vec::with_capacity(n * 3);
    for i in 0..n {
        let z = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
        let r = (1.0 - z * z).sqrt();
        let theta = golden * i as f64;
        let (x, y) = (r * theta.cos(), r * theta.sin());
        let scaled = [(100.0 * x) as f32, (100.0 * y) as f32, (100.0 * z) as f32];
        vertices.extend_from_slice(&scaled);
    }
    BrainMesh::new(vertices, vec![0, 1, 2]).unwrap()
}

/// Fill `dir` with fusion tables for both hemispheres and identical fsLR and fsaverage spheres.
fn write_atlas_data(dir: &Path) -> AtlasData {
    fs::create_dir_all(dir).unwrap();
    let data = AtlasData::new(dir);
    let sphere = GiftiImage::from_mesh(&fibonacci_sphere(FSAVERAGE_164K));
    for hemi in Hemisphere::BOTH.iter() {
        let mut table = String::from("# x y z\n");
        for i in 0..FSAVERAGE_164K {
            let v = voxel_of(*hemi, i);
            writeln!(table, "{} {} {}", v[0], v[1], v[2]).unwrap();
        }
        fs::write(data.fusion_mapping(*hemi, "MNI152_orig"), table).unwrap();

        write_gifti(data.fslr_sphere(*hemi), &sphere, Encoding::GZipBase64Binary).unwrap();
        write_gifti(data.fsaverage_sphere(*hemi), &sphere, Encoding::GZipBase64Binary).unwrap();
    }
    data
}

#[test]
fn fusion_samples_the_volume_at_the_mapped_coordinates() {
    let dir = tempfile::tempdir().unwrap();
    let resampler = AtlasResampler::new(write_atlas_data(dir.path()));
    let volume = read_nifti(write_stat_volume(dir.path()), AtlasSpace::Mni152NLin6Asym).unwrap();

    for hemi in Hemisphere::BOTH.iter() {
        let field =
            resampler.fuse_volume_to_canonical(&volume, *hemi, Interpolation::Linear).unwrap();
        assert_eq!(MeshSpace::canonical(*hemi), field.space);
        assert_eq!(Intent::TimeSeries, field.intent);
        assert_eq!(FSAVERAGE_164K, field.len());
        for i in [0, 9, 100, 511, FSAVERAGE_164K - 1].iter() {
            let expected = stat_value(voxel_of(*hemi, *i));
            assert_abs_diff_eq!(expected, field.values[*i], epsilon = 1e-4);
        }
    }
}

#[test]
fn identical_spheres_carry_values_over_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let resampler = AtlasResampler::new(write_atlas_data(dir.path()));

    let values: Vec<f32> = (0..FSAVERAGE_164K).map(|i| (i % 1000) as f32 * 0.25).collect();
    let native_space = MeshSpace::native(Hemisphere::Right);
    let native = SurfaceField::new(values.clone(), native_space, Intent::None).unwrap();
    let field =
        resampler.resample_mesh_to_mesh(&native, MeshSpace::canonical(Hemisphere::Right)).unwrap();

    assert_eq!(MeshSpace::canonical(Hemisphere::Right), field.space);
    assert_eq!(Intent::None, field.intent);
    for (expected, found) in values.iter().zip(field.values.iter()) {
        assert_abs_diff_eq!(*expected, *found, epsilon = 1e-3);
    }
}

#[test]
fn direct_fusion_runs_end_to_end_on_atlas_data() {
    let dir = tempfile::tempdir().unwrap();
    let resampler = AtlasResampler::new(write_atlas_data(&dir.path().join("atlas")));
    let stat = write_stat_volume(dir.path());
    let out_dir = dir.path().join("out");

    let inputs = ChainInputs::direct(&stat, "MNI152NLin6Asym", Interpolation::Nearest);
    let out = Pipeline::new(&resampler, PipelineConfig::new(&out_dir)).run(&inputs).unwrap();

    for hemi in Hemisphere::BOTH.iter() {
        let img = read_gifti(out.path(*hemi)).unwrap();
        assert_eq!(Intent::Shape, img.arrays[0].intent);
        let values = img.arrays[0].data.to_f32();
        assert_eq!(FSAVERAGE_164K, values.len());
        assert_eq!(stat_value(voxel_of(*hemi, 9)), values[9]);
    }
    assert_eq!(10.5, read_gifti(&out.lh).unwrap().arrays[0].data.to_f32()[9]);
}

#[test]
fn two_stage_runs_end_to_end_on_atlas_data() {
    let dir = tempfile::tempdir().unwrap();
    let resampler = AtlasResampler::new(write_atlas_data(&dir.path().join("atlas")));
    let (volume, mask) = write_masked_volume(dir.path());
    let meshes = write_native_meshes(dir.path());
    let out_dir = dir.path().join("out");

    let out = Pipeline::new(&resampler, PipelineConfig::new(&out_dir))
        .run(&ChainInputs::two_stage(volume, mask, meshes))
        .unwrap();

    assert_eq!(2, out.intermediates.len());
    for hemi in Hemisphere::BOTH.iter() {
        let img = read_gifti(out.path(*hemi)).unwrap();
        assert_eq!(Intent::Shape, img.arrays[0].intent);
        let values = img.arrays[0].data.to_f32();
        assert_eq!(FSAVERAGE_164K, values.len());
        for v in values[..FSAVERAGE_164K - OUTSIDE_VERTICES].iter() {
            assert_abs_diff_eq!(1.0, *v, epsilon = 1e-5);
        }
        assert!(values[FSAVERAGE_164K - OUTSIDE_VERTICES..].iter().all(|v| v.is_nan()));
    }
}
