//! Main entry point for the npzip CLI application.
//!
//! Packs the files named on the command line into a ZIP or `.npz` archive.
//! Files are read one at a time and written to the archive immediately.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Component, Path};

use npzip::{ArchiveWriter, Cli, CompressionMethod, EntryOptions};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut archive = ArchiveWriter::open(&cli.archive)?;
    let mut options = EntryOptions::default().compression_level(cli.level);
    if cli.deflate {
        options = options.compression_method(CompressionMethod::Deflate);
    }
    if let Some(seconds) = cli.timestamp {
        options = options.timestamp(seconds);
    }

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;

    for file in &cli.files {
        let path = Path::new(file);
        let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let name = entry_name(path, cli.junk_paths);

        let written = archive.add_file(&name, &data, options)?;
        total_uncompressed += data.len() as u64;
        total_compressed += written;

        if !cli.is_quiet() {
            if cli.deflate {
                println!("  adding: {} (deflated {}%)", name, saved_percent(data.len() as u64, written));
            } else {
                println!("  adding: {} (stored 0%)", name);
            }
        }
    }

    archive.close()?;

    if !cli.is_very_quiet() {
        let location = archive
            .full_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| cli.archive.clone());
        eprintln!(
            "\n{}: {} entries, {} -> {}",
            location,
            archive.entry_count(),
            format_size(total_uncompressed),
            format_size(total_compressed)
        );
    }

    Ok(())
}

/// Name of an entry inside the archive.
///
/// ZIP names use `/` separators and are relative, so root, prefix and `.`
/// components are dropped. With `junk_paths` only the file name is kept.
fn entry_name(path: &Path, junk_paths: bool) -> String {
    if junk_paths {
        if let Some(name) = path.file_name() {
            return name.to_string_lossy().into_owned();
        }
    }

    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            Component::ParentDir => Some("..".into()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Percentage of bytes saved by compression
fn saved_percent(uncompressed: u64, compressed: u64) -> u64 {
    if uncompressed == 0 || compressed >= uncompressed {
        0
    } else {
        100 - compressed * 100 / uncompressed
    }
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_names_are_relative() {
        assert_eq!(entry_name(Path::new("./data/x.npy"), false), "data/x.npy");
        assert_eq!(entry_name(Path::new("/tmp/run/log.txt"), false), "tmp/run/log.txt");
        assert_eq!(entry_name(Path::new("/tmp/run/log.txt"), true), "log.txt");
    }

    #[test]
    fn sizes_and_ratios() {
        assert_eq!(format_size(500), "500 bytes");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(saved_percent(1000, 250), 75);
        assert_eq!(saved_percent(10, 15), 0);
        assert_eq!(saved_percent(0, 2), 0);
    }
}
