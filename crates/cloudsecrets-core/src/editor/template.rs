//! Materializing secret templates on disk

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write `data` to `dir/name` without clobbering anything
///
/// When `dir/name` is taken the data goes to a fresh `dir/<random>_name`
/// instead. Returns the path that was written.
pub fn save_template(dir: &Path, name: &str, data: &[u8]) -> std::io::Result<PathBuf> {
    let target = dir.join(name);

    match fs::OpenOptions::new().write(true).create_new(true).open(&target) {
        Ok(mut file) => {
            file.write_all(data)?;
            return Ok(target);
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
        Err(e) => return Err(e),
    }

    let parent = target.parent().unwrap_or(dir);
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());

    let mut file = tempfile::Builder::new()
        .prefix("")
        .suffix(&format!("_{}", file_name))
        .tempfile_in(parent)?;
    file.write_all(data)?;
    let (_, path) = file.keep().map_err(|e| e.error)?;

    crate::debug_log!("{} exists, template written to {}", target.display(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_free_name_is_used_as_is() {
        let dir = tempdir().unwrap();
        let path = save_template(dir.path(), "secret.yaml", b"name: x\n").unwrap();
        assert_eq!(path, dir.path().join("secret.yaml"));
        assert_eq!(fs::read(&path).unwrap(), b"name: x\n");
    }

    #[test]
    fn test_taken_name_gets_unique_suffix() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("secret.yaml");
        fs::write(&original, "keep me").unwrap();

        let first = save_template(dir.path(), "secret.yaml", b"one").unwrap();
        let second = save_template(dir.path(), "secret.yaml", b"two").unwrap();

        assert_ne!(first, original);
        assert_ne!(first, second);
        assert!(first.to_string_lossy().ends_with("_secret.yaml"));
        assert_eq!(first.parent(), Some(dir.path()));
        assert_eq!(fs::read_to_string(&original).unwrap(), "keep me");
        assert_eq!(fs::read(&first).unwrap(), b"one");
        assert_eq!(fs::read(&second).unwrap(), b"two");
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempdir().unwrap();
        assert!(save_template(&dir.path().join("missing"), "s.yaml", b"x").is_err());
    }
}
