//! Path utilities for buildpatch

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path
///
/// Removes `.` components and folds `..` into the preceding normal component.
/// Leading `..` components of a relative path are kept, and `..` directly
/// under a root is dropped. The filesystem is never consulted, so symlinks are
/// not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Resolve `path` against `base` unless it is already absolute, then normalize
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

/// The output directory a child project gets under a root output directory
pub fn child_output_dir(root_output: &Path, child_name: &str) -> PathBuf {
    root_output.join(child_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("android/build/../../build")),
            PathBuf::from("build")
        );
        assert_eq!(
            normalize_path(Path::new("/work/app/android/build/../../build")),
            PathBuf::from("/work/app/build")
        );
        assert_eq!(normalize_path(Path::new("./a/./b")), PathBuf::from("a/b"));
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
        assert_eq!(normalize_path(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize_path(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            resolve_path(Path::new("/repo/android/build"), Path::new("../../build")),
            PathBuf::from("/repo/build")
        );
        assert_eq!(
            resolve_path(Path::new("/repo"), Path::new("/tmp/out/./x")),
            PathBuf::from("/tmp/out/x")
        );
    }

    #[test]
    fn test_child_output_dir() {
        assert_eq!(
            child_output_dir(Path::new("/repo/build"), "isar_flutter_libs"),
            PathBuf::from("/repo/build/isar_flutter_libs")
        );
    }
}
