//! Shared name generation for stored objects.
//!
//! Filename format: `{slug(stem)}-{8 hex chars}{.ext}` with the extension
//! lowercased. Object path: `{folder}/{filename}` or `{filename}`.

use std::path::Path;

use khmedia_core::constants::PUBLIC_OBJECT_MARKER;
use uuid::Uuid;

const FALLBACK_STEM: &str = "image";

/// Lowercase ASCII slug: alphanumerics and `_` are kept, runs of spaces and
/// hyphens become a single `-`, everything else is dropped.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Unique stored filename derived from the name the client sent.
pub fn generate_unique_filename(original_name: &str) -> String {
    let path = Path::new(original_name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_STEM.to_string());
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();
    let suffix = Uuid::new_v4().simple().to_string();

    format!("{}-{}{}", stem, &suffix[..8], extension)
}

/// Join an optional folder and a filename.
pub fn object_path(folder: Option<&str>, filename: &str) -> String {
    match folder.map(|f| f.trim_matches('/')).filter(|f| !f.is_empty()) {
        Some(folder) => format!("{}/{}", folder, filename),
        None => filename.to_string(),
    }
}

/// Parse `(bucket, path)` out of a public object URL.
///
/// The segment after the `public` marker is the bucket and everything after it
/// is the object path. Returns `None` when the marker is missing or nothing
/// follows it.
pub fn extract_object_location(url: &str) -> Option<(String, String)> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let segments: Vec<&str> = without_query.split('/').collect();
    let marker = segments.iter().position(|s| *s == PUBLIC_OBJECT_MARKER)?;

    let bucket = segments.get(marker + 1).filter(|b| !b.is_empty())?;
    let rest = &segments[marker + 2..];
    if rest.is_empty() || rest.iter().all(|s| s.is_empty()) {
        return None;
    }

    let path = rest.join("/");
    let path = urlencoding::decode(&path)
        .map(|p| p.into_owned())
        .unwrap_or(path);

    Some((bucket.to_string(), path))
}

/// Last non-empty path segment of a URL.
pub fn trailing_filename(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .rsplit('/')
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Percent-encode each segment of an object path for use in a request URL.
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
