//! Request path canonicalization.

/// Percent-decodes `raw` and collapses it to a canonical absolute path.
///
/// Empty and `.` segments are dropped, so `//campus/./grades` becomes
/// `/campus/grades`. The result is the path a file server resolves, and
/// route decisions must be made on it rather than on the raw URI.
///
/// Returns `None` if the path is not valid UTF-8 after decoding or has a
/// `..` segment.
pub fn normalize_path(raw: &str) -> Option<String> {
    let decoded = urlencoding::decode(raw).ok()?;

    let mut segments = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s if s.contains('\\') || s.contains('\0') => return None,
            s => segments.push(s),
        }
    }

    Some(format!("/{}", segments.join("/")))
}
