//! Archive Builder
//!
//! Produces the zip layout the Lambda runtime expects: an entry named
//! `bootstrap` that is executable after extraction, either directly or
//! through a symbolic-link entry pointing at the real executable.

use anyhow::{Context, Result};
use std::fs;
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

/// Entry name the execution platform loads as the custom runtime.
pub const BOOTSTRAP: &str = "bootstrap";

fn deflated() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Build the archive in memory.
///
/// `handler` is read eagerly and written under its base name; each path in
/// `paths` is read eagerly and written under the path it was given. Any read
/// or entry-write failure aborts the whole build.
pub fn build_archive(handler: &Path, paths: &[PathBuf]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_archive(Cursor::new(&mut buffer), handler, paths)?;
    Ok(buffer)
}

/// Build the archive straight into a file at `output`.
pub fn write_archive_file(output: &Path, handler: &Path, paths: &[PathBuf]) -> Result<()> {
    let file = fs::File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    write_archive(file, handler, paths)
}

fn write_archive<W: Write + Seek>(writer: W, handler: &Path, paths: &[PathBuf]) -> Result<()> {
    let mut zip = ZipWriter::new(writer);

    let entry_name = handler
        .file_name()
        .context("handler path has no file name")?
        .to_string_lossy()
        .into_owned();
    let data = fs::read(handler)
        .with_context(|| format!("Failed to read {}", handler.display()))?;
    write_executable(&mut zip, &entry_name, &data)?;

    // Static files keep default metadata; only the handler needs the
    // execute bits.
    for path in paths {
        let name = path.to_string_lossy();
        let data = fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        zip.start_file(name.as_ref(), deflated())?;
        zip.write_all(&data)?;
    }

    zip.finish()?;
    Ok(())
}

fn write_executable<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    entry_name: &str,
    data: &[u8],
) -> Result<()> {
    // The runtime only resolves `bootstrap`. A zip cannot hold two entries
    // with the same name, so the link is skipped when the executable
    // already carries that name.
    if entry_name != BOOTSTRAP {
        zip.add_symlink(BOOTSTRAP, entry_name, deflated().unix_permissions(0o755))?;
    }

    zip.start_file(entry_name, deflated().unix_permissions(0o777))?;
    zip.write_all(data)?;
    Ok(())
}
