//! Filename normalization into File Search resource identifiers.

use uuid::Uuid;

/// Derive a resource identifier from a filename.
///
/// Lowercases the name, strips the final extension, collapses every run of
/// characters outside `[a-z0-9]` into a single hyphen, and trims hyphens from
/// both ends. The result matches `[a-z0-9-]+` and satisfies the `files/*`
/// resource-name grammar. Filenames with no usable characters fall back to a
/// random `upload-` token, so the function is total: any input yields a valid
/// identifier.
pub fn derive_identifier(filename: &str) -> String {
    let lowered = filename.to_lowercase();
    let stem = match lowered.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => lowered.as_str(),
    };

    let mut identifier = String::with_capacity(stem.len());
    let mut pending_hyphen = false;
    for ch in stem.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !identifier.is_empty() {
                identifier.push('-');
            }
            pending_hyphen = false;
            identifier.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    if identifier.is_empty() {
        let token = Uuid::new_v4().simple().to_string();
        return format!("upload-{}", &token[..8]);
    }

    identifier
}
