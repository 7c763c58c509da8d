use nalgebra::Point3;
use ndarray::Array3;

use volsurf::affine::Affine;
use volsurf::{
    read_curv, read_gifti, read_mesh, read_nifti, write_curv, write_gifti, write_nifti, write_surf,
    AtlasSpace, BrainMesh, Encoding, GiftiImage, Intent, NiftiHeader, ScalarVolume,
};

fn square() -> BrainMesh {
    BrainMesh::new(
        vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
        vec![0, 1, 2, 0, 2, 3],
    )
    .unwrap()
}

#[test]
fn meshes_are_read_from_gifti_and_freesurfer_files() {
    let dir = tempfile::tempdir().unwrap();
    let gii = dir.path().join("lh.pial.surf.gii");
    let surf = dir.path().join("lh.pial");
    write_gifti(&gii, &GiftiImage::from_mesh(&square()), Encoding::Base64Binary).unwrap();
    write_surf(&surf, &square()).unwrap();

    let from_gii = read_mesh(&gii).unwrap();
    let from_surf = read_mesh(&surf).unwrap();
    assert_eq!(square(), from_gii);
    assert_eq!(from_gii, from_surf);
    assert_eq!(2, from_surf.num_faces());
    assert_eq!([0, 2, 3], from_surf.face(1));
}

#[test]
fn every_gifti_encoding_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let values = vec![0.25, -1.5, 1e-3, 42.0];
    for encoding in [Encoding::Ascii, Encoding::Base64Binary, Encoding::GZipBase64Binary].iter() {
        let path = dir.path().join(format!("{}.shape.gii", encoding.name()));
        let img = GiftiImage::from_values(values.clone(), Intent::Shape);
        write_gifti(&path, &img, *encoding).unwrap();
        let img = read_gifti(&path).unwrap();
        assert_eq!(Intent::Shape, img.arrays[0].intent);
        assert_eq!(values, img.arrays[0].data.to_f32());
    }
}

#[test]
fn curv_files_hold_one_value_per_vertex() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rh.fsaverage.shape.curv");
    write_curv(&path, &[1.0, 2.0, -3.5]).unwrap();

    let curv = read_curv(&path).unwrap();
    assert_eq!(3, curv.header.num_vertices);
    assert_eq!(1, curv.header.num_values_per_vertex);
    assert_eq!(vec![1.0, 2.0, -3.5], curv.data);
}

#[test]
fn compressed_nifti_volumes_keep_data_and_affine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pmap.nii.gz");
    let data = Array3::from_shape_fn((5, 4, 3), |(i, j, k)| (i * 12 + j * 3 + k) as f32 * 0.5);
    let affine = Affine::from_rows(
        [-2.0, 0.0, 0.0, 90.0],
        [0.0, 2.0, 0.0, -126.0],
        [0.0, 0.0, 2.0, -72.0],
    );
    write_nifti(&path, &ScalarVolume::new(data.clone(), affine, AtlasSpace::default())).unwrap();

    let hdr = NiftiHeader::from_file(&path).unwrap();
    assert_eq!((5, 4, 3), hdr.volume_dims().unwrap());

    let vol = read_nifti(&path, AtlasSpace::Mni152NLin6Asym).unwrap();
    assert_eq!(data, vol.data);
    assert_eq!(affine, vol.affine);
    assert_eq!(AtlasSpace::Mni152NLin6Asym, vol.space);
    let origin = vol.world_to_voxel(&Point3::new(90.0, -126.0, -72.0)).unwrap();
    assert!(origin.coords.norm() < 1e-9);
}
