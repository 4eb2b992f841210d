//! `Content-Disposition` filename extraction.

const FILENAME_MARKER: &str = "filename=\"";

/// Extract the quoted filename from a `Content-Disposition` header value.
///
/// Takes everything between `filename="` and the last double quote in the
/// header, so a name that itself contains quotes is kept whole. Returns
/// `None` when there is no quoted filename or it is empty.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let start = header.find(FILENAME_MARKER)? + FILENAME_MARKER.len();
    let rest = &header[start..];
    let end = rest.rfind('"')?;
    if end == 0 {
        return None;
    }
    Some(rest[..end].to_string())
}
