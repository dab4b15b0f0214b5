//! # VOX Inspector
//!
//! Command-line tool to summarize a `.vox` file and check that it re-encodes
//! byte for byte.

use std::collections::BTreeMap;
use std::process::ExitCode;

use voxbridge::{decode, encode};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        println!("Usage: vox_inspect <model.vox> [options]");
        println!();
        println!("Options:");
        println!("  --verify     Re-encode and compare with the original bytes");
        println!("  --colors     List every palette index in use");
        return ExitCode::SUCCESS;
    }

    let path = &args[1];
    let verify = args.iter().any(|a| a == "--verify");
    let list_colors = args.iter().any(|a| a == "--colors");

    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            println!("Error: Could not open file: {e}");
            return ExitCode::FAILURE;
        }
    };

    let (grid, palette) = match decode(&bytes) {
        Ok(model) => model,
        Err(e) => {
            println!("Error: Could not decode: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut usage: BTreeMap<u8, usize> = BTreeMap::new();
    for voxel in grid.voxels() {
        *usage.entry(voxel.color_index).or_default() += 1;
    }

    let [x, y, z] = grid.size();
    println!("┌─ MODEL ─────────────────────────────────────────┐");
    println!("│ File:            {path}");
    println!("│ Size:            {x} x {y} x {z}");
    println!("│ Voxels:          {}", grid.len());
    println!("│ Colors used:     {}", usage.len());
    println!("│ Custom palette:  {}", if palette.is_default() { "no" } else { "yes" });
    println!("│ File size:       {} bytes", bytes.len());
    println!("└─────────────────────────────────────────────────┘");

    if list_colors {
        println!();
        println!("INDEX  COUNT     RGBA");
        for (index, count) in &usage {
            let c = palette.get(*index);
            println!("{index:>5}  {count:>8}  #{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a);
        }
    }

    if verify {
        println!();
        match encode(&grid, &palette) {
            Ok(out) if out == bytes => println!("Round-trip: OK (byte-exact)"),
            Ok(out) => {
                let first = out.iter().zip(&bytes).position(|(a, b)| a != b);
                println!(
                    "Round-trip: DIFFERS ({} bytes vs {} original, first difference at {})",
                    out.len(),
                    bytes.len(),
                    first.map_or_else(|| "end".to_string(), |i| i.to_string())
                );
                return ExitCode::FAILURE;
            }
            Err(e) => {
                println!("Round-trip: FAILED ({e})");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
