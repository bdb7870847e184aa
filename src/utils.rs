use log::info;
use std::io;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Creates `path` (and parents) unless it already exists as a directory.
pub fn ensure_dir_exists(path: &Path) -> io::Result<()> {
    match std::fs::metadata(path) {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("Path exists but is not a directory: {}", path.display()),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating directory: {}", path.display());
            std::fs::create_dir_all(path)
        }
        Err(e) => Err(e),
    }
}

/// Writes `bytes` to a temp file in `path`'s directory without moving it into place.
///
/// The temp file is deleted on drop unless it is persisted.
pub fn stage_file(path: &Path, bytes: &[u8]) -> io::Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(dir)?;
    temp_file.write_all(bytes)?;
    temp_file.flush()?;
    Ok(temp_file)
}

/// Writes `bytes` to a temp file next to `path`, then renames it into place.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let temp_file = stage_file(path, bytes)?;
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir_exists_creates_nested() -> io::Result<()> {
        let root = tempdir()?;
        let nested = root.path().join("a").join("b");
        ensure_dir_exists(&nested)?;
        assert!(nested.is_dir());
        // Second call is a no-op
        ensure_dir_exists(&nested)?;
        Ok(())
    }

    #[test]
    fn test_ensure_dir_exists_rejects_file() -> io::Result<()> {
        let root = tempdir()?;
        let file = root.path().join("file.txt");
        std::fs::write(&file, "x")?;
        assert!(ensure_dir_exists(&file).is_err());
        Ok(())
    }

    #[test]
    fn test_write_atomic_replaces_content() -> io::Result<()> {
        let root = tempdir()?;
        let path = root.path().join("out.json");
        write_atomic(&path, b"first")?;
        write_atomic(&path, b"second")?;
        assert_eq!(std::fs::read_to_string(&path)?, "second");
        assert_eq!(std::fs::read_dir(root.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_dropped_stage_leaves_nothing() -> io::Result<()> {
        let root = tempdir()?;
        let path = root.path().join("out.json");
        let staged = stage_file(&path, b"pending")?;
        assert!(!path.exists());
        drop(staged);
        assert_eq!(std::fs::read_dir(root.path())?.count(), 0);
        Ok(())
    }
}
