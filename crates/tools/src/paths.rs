//! Path validation shared by the filesystem tools.

/// Validate a path against allowed roots and forbidden prefixes.
///
/// Rules:
/// - Paths containing `..` components are always rejected.
/// - If `allowed_roots` is non-empty, the path must start with one of them.
/// - The path must not start with any forbidden prefix.
pub fn validate_path(
    path: &str,
    allowed_roots: &[String],
    forbidden_paths: &[String],
) -> Result<(), String> {
    if std::path::Path::new(path)
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(format!("Path traversal not allowed: {path}"));
    }

    for forbidden in forbidden_paths {
        if path.starts_with(forbidden.as_str()) {
            return Err(format!("Path is forbidden: {path}"));
        }
    }

    if !allowed_roots.is_empty() && !allowed_roots.iter().any(|root| path.starts_with(root.as_str()))
    {
        return Err(format!("Path outside allowed roots: {path}"));
    }

    Ok(())
}
