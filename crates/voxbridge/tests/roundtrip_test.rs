//! # Import/Export Round-Trip Tests
//!
//! Drives the host-facing pipelines the way an editor plugin would.

use voxbridge::{
    export_file, export_mesh, import_file, import_vox, prepare_export, ConvertConfig, ExportSource, Grid,
    MeshInput, MetadataHost, Palette, PropertyStore, Rgba, RoundTripMetadata, Vec3, Voxel,
};

fn checker_model() -> (Grid, Palette) {
    let mut grid = Grid::new(8, 4, 6);
    let mut palette = Palette::default();
    palette.set(1, Rgba::opaque(250, 10, 10));
    palette.set(2, Rgba::opaque(10, 250, 10));
    palette.set(255, Rgba::new(1, 2, 3, 128));
    for x in 0..8u8 {
        for y in 0..4u8 {
            for z in 0..6u8 {
                if (x + y + z) % 2 == 0 {
                    let index = if x < 4 { 1 } else { 2 };
                    grid.insert(Voxel::new(x, y, z, if z == 5 { 255 } else { index }));
                }
            }
        }
    }
    (grid, palette)
}

/// Host that keeps the typed record instead of a string property.
#[derive(Default)]
struct TypedHost {
    metadata: Option<RoundTripMetadata>,
}

impl MetadataHost for TypedHost {
    fn attach_metadata(&mut self, metadata: &RoundTripMetadata) -> voxbridge_geometry::GeometryResult<()> {
        self.metadata = Some(metadata.clone());
        Ok(())
    }

    fn read_metadata(&self) -> Option<RoundTripMetadata> {
        self.metadata.clone()
    }
}

/// Test: import then export with untouched metadata is byte-exact.
#[test]
fn test_import_export_byte_exact() {
    let (grid, palette) = checker_model();
    let bytes = voxbridge::encode(&grid, &palette).unwrap();
    let config = ConvertConfig::default();

    for host in [&mut PropertyStore::new() as &mut dyn MetadataHost, &mut TypedHost::default()] {
        let mesh = import_vox(&bytes, &mut *host, &config.import).unwrap();
        assert_eq!(mesh.cube_count(), grid.len());
        assert_eq!(mesh.faces.len(), grid.len() * 6);

        let out = export_mesh(&MeshInput::new(), &*host, &config.export).unwrap();
        assert_eq!(out, bytes);
    }
}

/// Test: metadata with duplicates and a bad index exports a valid file.
#[test]
fn test_edited_metadata_is_sanitized() {
    let (grid, palette) = checker_model();
    let bytes = voxbridge::encode(&grid, &palette).unwrap();
    let mut host = TypedHost::default();
    import_vox(&bytes, &mut host, &ConvertConfig::default().import).unwrap();

    let mut metadata = host.read_metadata().unwrap();
    let first = metadata.cubes[0];
    metadata.cubes.push(first);
    metadata.cubes[1].color_index = 0;
    host.attach_metadata(&metadata).unwrap();

    let prepared = prepare_export(&MeshInput::new(), &host, &ConvertConfig::default().export).unwrap();
    assert_eq!(prepared.source, ExportSource::RoundTrip);
    assert_eq!(prepared.grid.len(), grid.len());
    let moved = metadata.cubes[1].coord;
    assert_eq!(prepared.grid.get(moved).map(|v| v.color_index), Some(1));

    let out = voxbridge::encode(&prepared.grid, &prepared.palette).unwrap();
    assert!(voxbridge::decode(&out).is_ok());
}

/// Test: a fresh mesh is voxelized with quantized colors.
#[test]
fn test_fresh_mesh_export() {
    let mut mesh = MeshInput::new();
    mesh.push_box(Vec3::ZERO, Vec3::new(0.3, 0.3, 0.3), Some(Rgba::opaque(0, 128, 255)));
    let host = PropertyStore::new();
    let config = ConvertConfig::default();

    let bytes = export_mesh(&mesh, &host, &config.export).unwrap();
    let (grid, palette) = voxbridge::decode(&bytes).unwrap();
    assert_eq!(grid.size(), [3, 3, 3]);
    assert_eq!(grid.len(), 27);
    assert!(grid.voxels().iter().all(|v| palette.get(v.color_index) == Rgba::opaque(0, 128, 255)));
}

/// Test: file helpers and TOML config together.
#[test]
fn test_file_pipeline_with_config() {
    let dir = std::env::temp_dir();
    let pid = std::process::id();
    let config_path = dir.join(format!("voxbridge_cfg_{pid}.toml"));
    let in_path = dir.join(format!("voxbridge_in_{pid}.vox"));
    let out_path = dir.join(format!("voxbridge_out_{pid}.vox"));

    std::fs::write(&config_path, "[import]\nscale = 0.25\napply_colors = false\n").unwrap();
    let config = ConvertConfig::load(&config_path).unwrap();
    assert_eq!(config.import.scale, 0.25);

    let (grid, palette) = checker_model();
    voxbridge_format::encode_to_file(&in_path, &grid, &palette).unwrap();

    let mut host = PropertyStore::new();
    let mesh = import_file(&in_path, &mut host, &config.import).unwrap();
    assert!(mesh.vertices.iter().all(|v| v.color == Rgba::NEUTRAL_GRAY.as_float()));
    export_file(&out_path, &MeshInput::new(), &host, &config.export).unwrap();

    let original = std::fs::read(&in_path).unwrap();
    let exported = std::fs::read(&out_path).unwrap();
    for path in [&config_path, &in_path, &out_path] {
        let _ = std::fs::remove_file(path);
    }
    assert_eq!(exported, original);

    assert!(matches!(
        ConvertConfig::load(dir.join("voxbridge_missing.toml")),
        Err(voxbridge::BridgeError::Io(_))
    ));
}
