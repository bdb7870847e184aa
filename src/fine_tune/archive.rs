use crate::fine_tune::error::FineTuneError;
use log::info;
use std::fs::File;
use std::io;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Packs every file under `dir` into `zip_path`, with entry names relative to `dir`.
///
/// Returns the number of files written.
pub fn zip_directory(dir: &Path, zip_path: &Path) -> Result<usize, FineTuneError> {
    let io_error = |e: io::Error| FineTuneError::ArchiveIo(zip_path.to_path_buf(), e);
    let file = File::create(zip_path).map_err(io_error)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let count = add_directory(&mut writer, dir, "", options, zip_path)?;

    writer.finish().map_err(|e| FineTuneError::Archive {
        path: zip_path.to_path_buf(),
        source: e,
    })?;
    info!(
        "Archived {} files from {} into {}",
        count,
        dir.display(),
        zip_path.display()
    );
    Ok(count)
}

fn add_directory(
    writer: &mut ZipWriter<File>,
    dir: &Path,
    prefix: &str,
    options: SimpleFileOptions,
    zip_path: &Path,
) -> Result<usize, FineTuneError> {
    let io_error = |e: io::Error| FineTuneError::ArchiveIo(dir.to_path_buf(), e);
    let mut entries = std::fs::read_dir(dir)
        .map_err(io_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)?;
    entries.sort_by_key(|e| e.file_name());

    let mut count = 0;
    for entry in entries {
        let path = entry.path();
        let name = format!("{}{}", prefix, entry.file_name().to_string_lossy());
        if path.is_dir() {
            count += add_directory(writer, &path, &format!("{name}/"), options, zip_path)?;
            continue;
        }
        writer
            .start_file(name, options)
            .map_err(|e| FineTuneError::Archive {
                path: zip_path.to_path_buf(),
                source: e,
            })?;
        let copy_error = |e: io::Error| FineTuneError::ArchiveIo(path.clone(), e);
        let mut source = File::open(&path).map_err(copy_error)?;
        io::copy(&mut source, writer).map_err(copy_error)?;
        count += 1;
    }
    Ok(count)
}
