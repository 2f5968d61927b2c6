//! Inflate command implementation.

use crate::utils::load_input;
use oxibin_deflate::inflate_raw;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

pub fn cmd_inflate(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let data = load_input(input)?;

    let started = Instant::now();
    let inflated = inflate_raw(&data)?;
    tracing::info!(
        compressed = data.len(),
        inflated = inflated.len(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "inflated stream"
    );

    match output {
        Some(path) => {
            std::fs::write(path, &inflated)?;
            eprintln!(
                "{} -> {} ({} bytes)",
                input.display(),
                path.display(),
                inflated.len()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&inflated)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
