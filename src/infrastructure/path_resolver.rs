/// Path normalization for user-supplied paths.
///
/// Produces absolute, lexically normal paths with the platform's preferred
/// separators. The filesystem is never consulted, so symlinks are kept.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Resolve `path` against the current working directory.
pub fn resolve(path: impl AsRef<Path>) -> io::Result<PathBuf> {
    let path = path.as_ref();
    if path.is_absolute() {
        return Ok(normalize(path));
    }
    let cwd = std::env::current_dir()?;
    Ok(resolve_against(&cwd, path))
}

/// Resolve `path` against an explicit base directory.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Lexical normalization: drops `.`, folds `..` into its parent, and
/// rebuilds the path with preferred separators. `..` never climbs above the
/// root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                out.push(component.as_os_str());
                depth = 0;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    out.pop();
                    depth -= 1;
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
        }
    }

    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_relative_paths_become_absolute() {
        let base = Path::new("/work/project");
        assert_eq!(
            resolve_against(base, Path::new("build/../src/./engine")),
            PathBuf::from("/work/project/src/engine")
        );
    }

    #[test]
    fn test_absolute_paths_are_normalized() {
        assert_eq!(
            resolve_against(Path::new("/ignored"), Path::new("/a/b/../c/")),
            PathBuf::from("/a/c")
        );
    }

    #[test]
    fn test_parent_never_climbs_above_root() {
        assert_eq!(normalize(Path::new("/../../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_resolve_uses_current_dir() {
        let resolved = resolve("some/dir").unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("some/dir"));
    }

    proptest! {
        #[test]
        fn prop_resolve_is_idempotent(parts in prop::collection::vec("[a-z]{1,4}|\\.|\\.\\.", 0..8), absolute in any::<bool>()) {
            let joined = parts.join("/");
            let input = if absolute { format!("/{}", joined) } else { joined };
            let base = Path::new("/base/dir");
            let once = resolve_against(base, Path::new(&input));
            let twice = resolve_against(base, &once);
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.is_absolute());
        }
    }
}
