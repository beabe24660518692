//! Filesystem primitives used by the generator
//!
//! Both mutating operations are idempotent and apply their mode explicitly,
//! so the result does not depend on the process umask. Each has a read-only
//! `inspect_*` counterpart that reports what it would change.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{CoreError, Result};

/// Mode for every directory created under the repo root
pub const DIR_MODE: u32 = 0o775;

/// Mode for every rendered repo file
pub const FILE_MODE: u32 = 0o644;

/// What an operation did (or would do) to one path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    Created,
    Updated,
    Unchanged,
}

impl Change {
    pub fn is_change(&self) -> bool {
        !matches!(self, Change::Unchanged)
    }
}

/// Create `path` and any missing parents, then apply `mode` to it.
///
/// An existing directory is fine; an existing file or other non-directory
/// is a conflict.
pub fn ensure_directory(path: &Path, mode: u32) -> Result<Change> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => {
            let fixed = apply_mode(path, mode)?;
            Ok(if fixed { Change::Updated } else { Change::Unchanged })
        }
        Ok(_) => Err(not_a_directory(path)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            create_dir_all(path, mode)?;
            apply_mode(path, mode)?;
            Ok(Change::Created)
        }
        Err(e) => Err(CoreError::from_io(path, e)),
    }
}

/// Report what `ensure_directory` would do without touching anything
pub fn inspect_directory(path: &Path, mode: u32) -> Result<Change> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(if mode_matches(&meta, mode) {
            Change::Unchanged
        } else {
            Change::Updated
        }),
        Ok(_) => Err(not_a_directory(path)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Change::Created),
        Err(e) => Err(CoreError::from_io(path, e)),
    }
}

/// Write `contents` to `path` through a temporary file and a rename.
///
/// Identical existing contents are left in place and only the mode is
/// enforced. On failure the destination is either untouched or absent,
/// never partially written.
pub fn write_atomic(path: &Path, contents: &[u8], mode: u32) -> Result<Change> {
    let existing = read_existing(path)?;

    if existing.as_deref() == Some(contents) {
        let fixed = apply_mode(path, mode)?;
        return Ok(if fixed { Change::Updated } else { Change::Unchanged });
    }

    let parent = path.parent().ok_or_else(|| CoreError::Conflict {
        path: path.to_path_buf(),
        message: "destination has no parent directory".to_string(),
    })?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| CoreError::from_io(parent, e))?;
    tmp.write_all(contents)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| CoreError::from_io(tmp.path(), e))?;
    apply_mode(tmp.path(), mode)?;
    tmp.persist(path)
        .map_err(|e| CoreError::from_io(path, e.error))?;

    Ok(if existing.is_some() {
        Change::Updated
    } else {
        Change::Created
    })
}

/// Report what `write_atomic` would do without touching anything
pub fn inspect_file(path: &Path, contents: &[u8], mode: u32) -> Result<Change> {
    match read_existing(path)? {
        None => Ok(Change::Created),
        Some(current) if current != contents => Ok(Change::Updated),
        Some(_) => {
            let meta = fs::metadata(path).map_err(|e| CoreError::from_io(path, e))?;
            Ok(if mode_matches(&meta, mode) {
                Change::Unchanged
            } else {
                Change::Updated
            })
        }
    }
}

fn read_existing(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Err(CoreError::Conflict {
            path: path.to_path_buf(),
            message: "a directory exists where a file is expected".to_string(),
        }),
        Ok(_) => fs::read(path)
            .map(Some)
            .map_err(|e| CoreError::from_io(path, e)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CoreError::from_io(path, e)),
    }
}

fn not_a_directory(path: &Path) -> CoreError {
    CoreError::Conflict {
        path: path.to_path_buf(),
        message: "exists and is not a directory".to_string(),
    }
}

#[cfg(unix)]
fn create_dir_all(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new()
        .recursive(true)
        .mode(mode)
        .create(path)
        .map_err(|e| CoreError::from_io(path, e))
}

#[cfg(not(unix))]
fn create_dir_all(path: &Path, _mode: u32) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| CoreError::from_io(path, e))
}

/// Set the permission bits; returns whether they had to change
#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let meta = fs::metadata(path).map_err(|e| CoreError::from_io(path, e))?;
    if mode_matches(&meta, mode) {
        return Ok(false);
    }
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| CoreError::from_io(path, e))?;
    Ok(true)
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: u32) -> Result<bool> {
    Ok(false)
}

#[cfg(unix)]
fn mode_matches(meta: &fs::Metadata, mode: u32) -> bool {
    use std::os::unix::fs::PermissionsExt;

    meta.permissions().mode() & 0o7777 == mode
}

#[cfg(not(unix))]
fn mode_matches(_meta: &fs::Metadata, _mode: u32) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn mode_of(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).unwrap().permissions().mode() & 0o7777
    }

    #[test]
    fn test_ensure_directory_creates_and_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a/b/c");

        assert_eq!(ensure_directory(&dir, DIR_MODE).unwrap(), Change::Created);
        assert!(dir.is_dir());
        assert_eq!(ensure_directory(&dir, DIR_MODE).unwrap(), Change::Unchanged);

        #[cfg(unix)]
        assert_eq!(mode_of(&dir), DIR_MODE);
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_directory_fixes_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("repo");
        fs::create_dir(&dir).unwrap();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o700)).unwrap();

        assert_eq!(inspect_directory(&dir, DIR_MODE).unwrap(), Change::Updated);
        assert_eq!(ensure_directory(&dir, DIR_MODE).unwrap(), Change::Updated);
        assert_eq!(mode_of(&dir), DIR_MODE);
    }

    #[test]
    fn test_ensure_directory_conflict_with_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("yum.repos.d");
        fs::write(&path, "not a dir").unwrap();

        let err = ensure_directory(&path, DIR_MODE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(matches!(err, CoreError::Conflict { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "not a dir");
    }

    #[test]
    fn test_write_atomic_create_update_unchanged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dib-mirror-base.repo");

        assert_eq!(write_atomic(&path, b"one\n", FILE_MODE).unwrap(), Change::Created);
        assert_eq!(write_atomic(&path, b"one\n", FILE_MODE).unwrap(), Change::Unchanged);
        assert_eq!(write_atomic(&path, b"two\n", FILE_MODE).unwrap(), Change::Updated);
        assert_eq!(fs::read_to_string(&path).unwrap(), "two\n");

        #[cfg(unix)]
        assert_eq!(mode_of(&path), FILE_MODE);
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dib-mirror-base.repo");
        write_atomic(&path, b"[base]\n", FILE_MODE).unwrap();

        let entries: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_atomic_conflict_with_directory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dib-mirror-base.repo");
        fs::create_dir(&path).unwrap();

        let err = write_atomic(&path, b"x", FILE_MODE).unwrap_err();
        assert!(matches!(err, CoreError::Conflict { .. }));
        assert!(path.is_dir());
    }

    #[test]
    fn test_write_atomic_missing_parent_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing/dib-mirror-base.repo");

        let err = write_atomic(&path, b"x", FILE_MODE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(!path.exists());
    }

    #[test]
    fn test_inspect_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f.repo");

        assert_eq!(inspect_file(&path, b"a", FILE_MODE).unwrap(), Change::Created);
        write_atomic(&path, b"a", FILE_MODE).unwrap();
        assert_eq!(inspect_file(&path, b"a", FILE_MODE).unwrap(), Change::Unchanged);
        assert_eq!(inspect_file(&path, b"b", FILE_MODE).unwrap(), Change::Updated);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a");
    }

    #[test]
    fn test_inspect_directory_missing() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nope");
        assert_eq!(inspect_directory(&dir, DIR_MODE).unwrap(), Change::Created);
        assert!(!dir.exists());
    }
}
