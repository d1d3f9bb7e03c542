//! Link path helpers: canonical form, segmentation and percent-encoding
//!
//! These run on the path part of a link once the parser has removed the
//! prefix, query and fragment.

use std::borrow::Cow;

use crate::RouteError;

/// Whether a link path is already in canonical form
///
/// Input is the path part of a link after its scheme, host and configured
/// prefix were stripped, without query or fragment. It is canonical when it
/// is rooted, has no empty segments and uses only `/` as a separator. The
/// bare root `/` is canonical; it is what an app link like `example://`
/// leaves behind.
///
/// # Examples
///
/// ```
/// use waylink_router::path::is_valid_path;
///
/// assert!(is_valid_path("/"));
/// assert!(is_valid_path("/r/42/details"));
///
/// // What `https://host` and `example://r/42/` leave after stripping
/// assert!(!is_valid_path(""));
/// assert!(!is_valid_path("r/42/"));
/// assert!(!is_valid_path("/r//42"));
/// assert!(!is_valid_path("/r\\42"));
/// ```
pub fn is_valid_path(path: &str) -> bool {
    match path.strip_prefix('/') {
        None => false,
        Some("") => true,
        Some(rest) => !rest.contains('\\') && rest.split('/').all(|segment| !segment.is_empty()),
    }
}

/// Canonical form of a link path
///
/// Hand-typed and forwarded links pick up stray separators (`/r//42/`,
/// `r\42`); they collapse to the rooted form patterns match against. An
/// empty path is the root. Borrows the input when it is already canonical.
///
/// # Examples
///
/// ```
/// use waylink_router::path::normalize_path;
/// use std::borrow::Cow;
///
/// assert!(matches!(normalize_path("/r/42"), Cow::Borrowed("/r/42")));
/// assert_eq!(normalize_path("r/42/"), "/r/42");
/// assert_eq!(normalize_path("/r//42/details/"), "/r/42/details");
/// assert_eq!(normalize_path("\\r\\42"), "/r/42");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_valid_path(path) {
        return Cow::Borrowed(path);
    }

    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.split(['/', '\\']).filter(|segment| !segment.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    Cow::Owned(normalized)
}

/// Splits a path into percent-decoded segments
///
/// Segments are split before decoding, so an encoded `%2F` stays inside its
/// segment.
///
/// # Errors
///
/// [`RouteError::MalformedPath`] when a `%` escape is truncated or not hex, or
/// when the decoded bytes are not UTF-8.
///
/// # Examples
///
/// ```
/// use waylink_router::path::split_segments;
///
/// assert_eq!(split_segments("/r/a%2Fb").unwrap(), vec!["r", "a/b"]);
/// assert!(split_segments("/r/%zz").is_err());
/// ```
pub fn split_segments(path: &str) -> Result<Vec<String>, RouteError> {
    normalize_path(path)
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| decode_component(segment).map_err(|reason| RouteError::malformed(path, reason)))
        .collect()
}

/// Decodes one percent-encoded component
pub fn decode_component(component: &str) -> Result<String, String> {
    let bytes = component.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .map(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                .unwrap_or(false);
            if !valid {
                return Err(format!("invalid percent escape at byte {}", i));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    urlencoding::decode(component)
        .map(Cow::into_owned)
        .map_err(|_| "percent-decoded bytes are not UTF-8".to_string())
}

/// Encodes one component canonically
///
/// Unreserved characters (`A-Z a-z 0-9 - _ . ~`) are kept; every other byte
/// of the UTF-8 encoding becomes an uppercase `%XX` escape.
///
/// # Examples
///
/// ```
/// use waylink_router::path::encode_component;
///
/// assert_eq!(encode_component("a b/ü"), "a%20b%2F%C3%BC");
/// ```
pub fn encode_component(component: &str) -> String {
    urlencoding::encode(component).into_owned()
}
