//! Filename rules for the managed audio directory.

use crate::error::{AppError, AppResult};
use std::path::{Component, Path, PathBuf};

/// Map a client-supplied name onto the restricted character set.
///
/// Every character outside `[A-Za-z0-9.-]` becomes `_`, runs of `_` collapse
/// to one, and leading/trailing `_` are trimmed. Already-sanitized names
/// pass through unchanged.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        let mapped = if ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' {
            ch
        } else {
            '_'
        };
        if mapped == '_' && out.ends_with('_') {
            continue;
        }
        out.push(mapped);
    }
    out.trim_matches('_').to_string()
}

/// Sanitize `requested` and join it onto `dir`, refusing anything that would
/// not name a direct child of `dir`.
///
/// Returns the sanitized name with the joined path.
pub fn resolve_within(dir: &Path, requested: &str) -> AppResult<(String, PathBuf)> {
    let name = sanitize(requested);

    let mut components = Path::new(&name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        _ => return Err(AppError::InvalidFileName),
    }

    let path = dir.join(&name);
    if path.parent() != Some(dir) {
        return Err(AppError::InvalidFileName);
    }
    Ok((name, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_examples() {
        assert_eq!(sanitize("My Clip (1).mp3"), "My_Clip_1_.mp3");
        assert_eq!(sanitize("  spaced  out .wav"), "spaced_out_.wav");
        assert_eq!(sanitize("__hidden__.ogg"), "hidden_.ogg");
        assert_eq!(sanitize("été.flac"), "t_.flac");
        assert_eq!(sanitize("already-clean.m4a"), "already-clean.m4a");
        assert_eq!(sanitize("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize("///"), "");
    }

    #[test]
    fn test_resolve_plain_name() {
        let dir = Path::new("/srv/audio");
        let (name, path) = resolve_within(dir, "clip one.mp3").unwrap();
        assert_eq!(name, "clip_one.mp3");
        assert_eq!(path, PathBuf::from("/srv/audio/clip_one.mp3"));
    }

    #[test]
    fn test_resolve_traversal_stays_inside() {
        let dir = Path::new("/srv/audio");
        let (name, path) = resolve_within(dir, "../../etc/passwd").unwrap();
        assert_eq!(name, ".._.._etc_passwd");
        assert_eq!(path.parent(), Some(dir));

        let (_, path) = resolve_within(dir, "..\\..\\boot.ini").unwrap();
        assert_eq!(path.parent(), Some(dir));
    }

    #[test]
    fn test_resolve_rejects_dot_names() {
        let dir = Path::new("/srv/audio");
        assert!(matches!(resolve_within(dir, ".."), Err(AppError::InvalidFileName)));
        assert!(matches!(resolve_within(dir, "."), Err(AppError::InvalidFileName)));
        assert!(matches!(resolve_within(dir, ""), Err(AppError::InvalidFileName)));
        assert!(matches!(resolve_within(dir, "/"), Err(AppError::InvalidFileName)));
        assert!(matches!(resolve_within(dir, "_.._"), Err(AppError::InvalidFileName)));
    }

    proptest! {
        #[test]
        fn sanitized_names_use_restricted_charset(name in "\\PC{0,64}") {
            let clean = sanitize(&name);
            prop_assert!(clean
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_'));
            prop_assert!(!clean.contains("__"));
            prop_assert!(!clean.starts_with('_'));
            prop_assert!(!clean.ends_with('_'));
        }

        #[test]
        fn sanitize_is_idempotent(name in "\\PC{0,64}") {
            let once = sanitize(&name);
            prop_assert_eq!(sanitize(&once), once);
        }

        #[test]
        fn resolved_paths_never_escape(name in "[./a-z_\\\\-]{0,24}") {
            let dir = Path::new("/srv/audio");
            if let Ok((_, path)) = resolve_within(dir, &name) {
                prop_assert_eq!(path.parent(), Some(dir));
            }
        }
    }
}
