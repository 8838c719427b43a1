//! Zip bundling of consumed artifacts.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::error::ArchiveError;

/// Writes `sources` into a deflated zip at `archive_path`.
///
/// Entries are stored by file name only. Files sharing a name with an
/// earlier entry are skipped. Returns the number of entries written.
pub async fn write_bundle(archive_path: PathBuf, sources: Vec<PathBuf>) -> Result<usize, ArchiveError> {
    let path = archive_path.clone();
    tokio::task::spawn_blocking(move || write_bundle_blocking(&archive_path, &sources))
        .await
        .map_err(|e| ArchiveError::Compress {
            path,
            message: format!("compression task failed: {}", e),
        })?
}

fn write_bundle_blocking(archive_path: &Path, sources: &[PathBuf]) -> Result<usize, ArchiveError> {
    let compress_err = |e: zip::result::ZipError| ArchiveError::Compress {
        path: archive_path.to_path_buf(),
        message: e.to_string(),
    };

    let file = File::create(archive_path).map_err(|e| ArchiveError::AddEntry {
        path: archive_path.to_path_buf(),
        source: e,
    })?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut names = HashSet::new();
    for source in sources {
        let Some(name) = source.file_name().and_then(|n| n.to_str()) else {
            warn!(path = %source.display(), "Skipping artifact without a usable file name");
            continue;
        };
        if !names.insert(name.to_string()) {
            warn!(path = %source.display(), "Skipping duplicate archive entry");
            continue;
        }

        let add_err = |e: std::io::Error| ArchiveError::AddEntry {
            path: source.clone(),
            source: e,
        };
        let mut input = File::open(source).map_err(add_err)?;
        zip.start_file(name, options).map_err(compress_err)?;
        std::io::copy(&mut input, &mut zip).map_err(add_err)?;
        debug!(entry = name, "Added to archive");
    }

    let mut writer = zip.finish().map_err(compress_err)?;
    writer.flush().map_err(|e| ArchiveError::Compress {
        path: archive_path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(names.len())
}
