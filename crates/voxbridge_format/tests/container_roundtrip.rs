//! # Container Round-Trip Tests
//!
//! Verifies that encoded containers decode to the same model, that every
//! declared length matches the bytes actually present, and that foreign
//! chunks are tolerated.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use voxbridge_format::chunk::{read_chunk, write_chunk, CHUNK_HEADER_LEN, MAIN_ID, SIZE_ID, XYZI_ID};
use voxbridge_format::{decode, encode, Grid, Palette, Rgba, Voxel, VoxError};

fn random_grid(rng: &mut ChaCha8Rng) -> Grid {
    let size = [
        rng.gen_range(1..=32u32),
        rng.gen_range(1..=32u32),
        rng.gen_range(1..=32u32),
    ];
    let mut grid = Grid::new(size[0], size[1], size[2]);
    let attempts = rng.gen_range(0..400);
    for _ in 0..attempts {
        #[allow(clippy::cast_possible_truncation)]
        let voxel = Voxel::new(
            rng.gen_range(0..size[0]) as u8,
            rng.gen_range(0..size[1]) as u8,
            rng.gen_range(0..size[2]) as u8,
            rng.gen_range(1..=255u8),
        );
        grid.insert(voxel);
    }
    grid
}

fn random_palette(rng: &mut ChaCha8Rng) -> Palette {
    let mut palette = Palette::default();
    for _ in 0..rng.gen_range(0..8) {
        let index = rng.gen_range(0..=255u8);
        palette.set(index, Rgba::new(rng.gen(), rng.gen(), rng.gen(), rng.gen()));
    }
    palette
}

/// Test: Random models survive encode then decode.
#[test]
fn test_random_models_round_trip() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED);

    for _ in 0..64 {
        let grid = random_grid(&mut rng);
        let palette = random_palette(&mut rng);

        let bytes = encode(&grid, &palette).expect("valid grid");
        let file = decode(&bytes).expect("encoder output decodes");

        assert_eq!(file.grid, grid);
        assert_eq!(file.palette, palette);
        assert_eq!(file.version, 150);
    }
}

/// Test: Decoding then re-encoding reproduces the original bytes.
#[test]
fn test_decode_encode_is_byte_exact() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for _ in 0..16 {
        let bytes = encode(&random_grid(&mut rng), &random_palette(&mut rng)).unwrap();
        let (grid, palette) = decode(&bytes).unwrap().into_parts();
        assert_eq!(encode(&grid, &palette).unwrap(), bytes);
    }
}

/// Test: Every chunk's declared lengths account for exactly its bytes.
#[test]
fn test_chunk_lengths_are_consistent() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut palette = Palette::default();
    palette.set(42, Rgba::opaque(1, 2, 3));
    let bytes = encode(&random_grid(&mut rng), &palette).unwrap();

    let main = read_chunk(&bytes, 8).unwrap();
    assert_eq!(main.id, MAIN_ID);
    assert_eq!(main.next_offset, bytes.len());
    assert!(main.content.is_empty());

    let mut offset = 0;
    let mut ids = Vec::new();
    while offset < main.children.len() {
        let child = read_chunk(main.children, offset).unwrap();
        assert_eq!(
            child.total_len(),
            CHUNK_HEADER_LEN + child.content.len() + child.children.len()
        );
        ids.push(child.id);
        offset = child.next_offset;
    }
    assert_eq!(offset, main.children.len());
    assert_eq!(ids, vec![*b"SIZE", *b"XYZI", *b"RGBA"]);
}

/// Test: A file that does not start with the magic is rejected.
#[test]
fn test_rejects_foreign_file() {
    let bytes = b"PK\x03\x04 definitely not a voxel model";
    assert!(matches!(decode(bytes), Err(VoxError::InvalidFormat(_))));
}

/// Test: An unknown chunk between SIZE and XYZI is skipped.
#[test]
fn test_unknown_chunk_between_size_and_voxels() {
    let mut size = Vec::new();
    for v in [4u32, 4, 4] {
        size.extend_from_slice(&v.to_le_bytes());
    }
    let mut xyzi = 2u32.to_le_bytes().to_vec();
    xyzi.extend_from_slice(&[0, 0, 0, 5, 3, 3, 3, 6]);

    let foreign = write_chunk(*b"nTRN", &[0xAB; 40], &write_chunk(*b"nSHP", &[1; 8], &[]).unwrap()).unwrap();

    let mut children = write_chunk(SIZE_ID, &size, &[]).unwrap();
    children.extend(foreign);
    children.extend(write_chunk(XYZI_ID, &xyzi, &[]).unwrap());

    let mut bytes = b"VOX ".to_vec();
    bytes.extend_from_slice(&150u32.to_le_bytes());
    bytes.extend(write_chunk(MAIN_ID, &[], &children).unwrap());

    let file = decode(&bytes).unwrap();
    assert_eq!(file.grid.size(), [4, 4, 4]);
    assert_eq!(file.grid.len(), 2);
    assert_eq!(file.grid.get([3, 3, 3]).map(|v| v.color_index), Some(6));
}

/// Test: Writing and reading a file on disk.
#[test]
fn test_file_helpers() {
    let mut grid = Grid::new(2, 2, 2);
    grid.insert(Voxel::new(1, 1, 1, 3));

    let path = std::env::temp_dir().join(format!("voxbridge_format_{}.vox", std::process::id()));
    voxbridge_format::encode_to_file(&path, &grid, &Palette::default()).unwrap();
    let file = voxbridge_format::decode_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(file.grid, grid);

    let missing = voxbridge_format::decode_file(path.with_extension("missing"));
    assert!(matches!(missing, Err(voxbridge_format::VoxFileError::Io(_))));
}
