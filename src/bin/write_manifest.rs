//! Manifest writer for Polydiagnose model directories.
//!
//! Records the SHA-256 digest of every JSON artifact in a directory into
//! `manifest.json`, which the loader checks at startup.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin write_manifest -- <model_dir> [--check]
//! ```
//!
//! With `--check`, the existing manifest is compared against the directory
//! and nothing is written.

use std::env;
use std::fs;
use std::path::PathBuf;

use polydiagnose::adapters::json::{Manifest, MANIFEST_FILE};

fn usage() -> String {
    "Usage: write_manifest <model_dir> [--check]".to_string()
}

fn parse_args() -> Result<(PathBuf, bool), String> {
    let mut model_dir: Option<PathBuf> = None;
    let mut check = false;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--check" => check = true,
            "-h" | "--help" => return Err(usage()),
            _ => {
                if model_dir.is_none() {
                    model_dir = Some(PathBuf::from(arg));
                } else {
                    return Err(usage());
                }
            }
        }
    }

    let model_dir = model_dir.ok_or_else(usage)?;
    Ok((model_dir, check))
}

fn main() -> Result<(), String> {
    let (model_dir, check) = parse_args()?;

    if !model_dir.is_dir() {
        return Err(format!("{model_dir:?} is not a directory"));
    }

    let manifest = Manifest::generate(&model_dir).map_err(|e| e.to_string())?;
    if manifest.files.is_empty() {
        return Err(format!("No JSON artifacts found in {model_dir:?}"));
    }

    let manifest_path = model_dir.join(MANIFEST_FILE);

    if check {
        let existing = Manifest::load(&manifest_path).map_err(|e| e.to_string())?;
        if existing != manifest {
            return Err(format!("{manifest_path:?} is out of date"));
        }
        println!("Manifest up to date: {manifest_path:?}");
        return Ok(());
    }

    let bytes = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| format!("Failed to serialize {MANIFEST_FILE}: {e}"))?;
    fs::write(&manifest_path, &bytes)
        .map_err(|e| format!("Failed to write {manifest_path:?}: {e}"))?;

    for (name, digest) in &manifest.files {
        println!("{digest}  {name}");
    }
    println!("Wrote manifest: {manifest_path:?}");

    Ok(())
}
