use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array3;

use volsurf::affine::Affine;
use volsurf::ribbon::sample_ribbon;
use volsurf::{
    AtlasSpace, BrainMesh, Encoding, GiftiImage, Hemisphere, Intent, MeshSpace, RibbonMeshes,
    ScalarVolume, VolumeMask,
};

const NUM_VERTICES: usize = 163842;

fn volume() -> (ScalarVolume, VolumeMask) {
    let data = Array3::from_shape_fn((91, 109, 91), |(i, j, k)| ((i + 2 * j + 3 * k) % 17) as f32);
    // 2mm MNI152 grid
    let affine = Affine::from_rows(
        [-2.0, 0.0, 0.0, 90.0],
        [0.0, 2.0, 0.0, -126.0],
        [0.0, 0.0, 2.0, -72.0],
    );
    let vol = ScalarVolume::new(data, affine, AtlasSpace::default());
    let mask = VolumeMask::from_volume(&vol);
    (vol, mask)
}

fn ribbon_meshes() -> RibbonMeshes {
    let mut white = Vec::with_capacity(NUM_VERTICES * 3);
    let mut pial = Vec::with_capacity(NUM_VERTICES * 3);
    for i in 0..NUM_VERTICES {
        let t = i as f32 / NUM_VERTICES as f32 * std::f32::consts::PI * 2.0;
        let u = (i % 97) as f32 / 97.0 * std::f32::consts::PI - std::f32::consts::FRAC_PI_2;
        let (x, y, z) = (t.cos() * u.cos(), t.sin() * u.cos(), u.sin());
        white.extend_from_slice(&[-30.0 + 50.0 * x, -18.0 + 60.0 * y, 18.0 + 50.0 * z]);
        pial.extend_from_slice(&[-30.0 + 53.0 * x, -18.0 + 63.0 * y, 18.0 + 53.0 * z]);
    }
    let faces = vec![0, 1, 2];
    RibbonMeshes {
        white: BrainMesh::new(white, faces.clone()).unwrap(),
        pial: BrainMesh::new(pial, faces).unwrap(),
        space: MeshSpace::native(Hemisphere::Left),
    }
}

fn bench_ribbon(c: &mut Criterion) {
    let (vol, mask) = volume();
    let meshes = ribbon_meshes();
    c.bench_function("ribbon_sampling_164k", |b| {
        b.iter(|| sample_ribbon(black_box(&vol), black_box(&mask), black_box(&meshes), 10).unwrap())
    });
}

fn bench_gifti(c: &mut Criterion) {
    let values: Vec<f32> = (0..NUM_VERTICES).map(|i| (i as f32 * 0.01).sin()).collect();
    let img = GiftiImage::from_values(values, Intent::Shape);
    c.bench_function("gifti_encode_gzip_base64", |b| {
        b.iter(|| black_box(&img).to_bytes(Encoding::GZipBase64Binary).unwrap())
    });
    let xml = String::from_utf8(img.to_bytes(Encoding::GZipBase64Binary).unwrap()).unwrap();
    c.bench_function("gifti_decode_gzip_base64", |b| {
        b.iter(|| GiftiImage::from_xml(black_box(&xml)).unwrap())
    });
}

criterion_group!(benches, bench_ribbon, bench_gifti);
criterion_main!(benches);
