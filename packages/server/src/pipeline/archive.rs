use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Entries never copied into an artifact.
const EXCLUDED_NAMES: &[&str] = &[".git"];

const COPY_CHUNK: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive IO error: {0}")]
    Io(#[from] io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("archiving aborted")]
    Aborted,
}

/// Zip the contents of `source` into a new file at `dest`, placing every
/// entry under `root/`. Uses deflate at maximum compression.
///
/// Blocking; run it on the blocking pool. `abort` is polled between entries
/// and between chunks of large files. Returns the number of files written.
pub fn zip_directory(
    source: &Path,
    dest: &Path,
    root: &str,
    abort: &AtomicBool,
) -> Result<u64, ArchiveError> {
    let file = File::create(dest)?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    writer.add_directory(format!("{root}/").as_str(), options)?;

    let mut files_written = 0u64;
    let mut pending = vec![(source.to_path_buf(), root.to_string())];

    while let Some((dir, prefix)) = pending.pop() {
        let mut entries = fs::read_dir(&dir)?.collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            if abort.load(Ordering::Relaxed) {
                return Err(ArchiveError::Aborted);
            }

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                warn!(path = ?entry.path(), "Skipping entry with a non-UTF-8 name");
                continue;
            };
            if EXCLUDED_NAMES.contains(&name) {
                continue;
            }

            let entry_name = format!("{prefix}/{name}");
            // Symlinks are skipped: following them could pull in files from
            // outside the clone.
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                writer.add_directory(format!("{entry_name}/").as_str(), options)?;
                pending.push((entry.path(), entry_name));
            } else if file_type.is_file() {
                writer.start_file(entry_name.as_str(), options)?;
                copy_with_abort(&mut File::open(entry.path())?, &mut writer, abort)?;
                files_written += 1;
            }
        }
    }

    let mut out = writer.finish()?;
    out.flush()?;
    Ok(files_written)
}

fn copy_with_abort<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    abort: &AtomicBool,
) -> Result<(), ArchiveError> {
    let mut buf = vec![0u8; COPY_CHUNK];
    loop {
        if abort.load(Ordering::Relaxed) {
            return Err(ArchiveError::Aborted);
        }
        let n = reader.read(&mut buf)?;
        if n == 0 {
            return Ok(());
        }
        writer.write_all(&buf[..n])?;
    }
}
