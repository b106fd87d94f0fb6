//! Locator path normalization
//!
//! Turns a raw, possibly archive-nested, possibly percent-encoded locator
//! path into a plain filesystem path. The steps run in a fixed order:
//!
//! 1. percent-decode (UTF-8)
//! 2. `\` becomes `/`
//! 3. runs of `/` collapse to one
//! 4. scheme prefixes are dropped; a single-letter segment before the last
//!    `:` is kept as a lower-cased drive letter
//! 5. truncate at the last `!`
//! 6. strip trailing `/`
//!
//! ```
//! use archvfs::normalize;
//!
//! assert_eq!(normalize("file:/a/b.jar!/x").unwrap(), "/a/b.jar");
//! assert_eq!(normalize("C:\\a\\\\b\\").unwrap(), "c:/a/b");
//! ```

use crate::error::{VfsError, VfsResult};
use archvfs_config::DecodePolicy;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;

/// Normalize with the strict decode policy.
pub fn normalize(raw: &str) -> VfsResult<String> {
    normalize_with(raw, DecodePolicy::Strict)
}

/// Normalize with an explicit decode policy.
pub fn normalize_with(raw: &str, policy: DecodePolicy) -> VfsResult<String> {
    let decoded = match (decode(raw), policy) {
        (Ok(decoded), _) => decoded,
        (Err(err), DecodePolicy::Strict) => return Err(err),
        (Err(err), DecodePolicy::Lenient) => {
            tracing::debug!(path = raw, error = %err, "keeping undecoded path");
            Cow::Borrowed(raw)
        }
    };

    let path = decoded.replace('\\', "/");
    let path = collapse_slashes(&path);
    let path = strip_scheme(&path);
    let path = match path.rfind('!') {
        Some(bang) => &path[..bang],
        None => path.as_str(),
    };
    Ok(path.trim_end_matches('/').to_string())
}

fn decode(raw: &str) -> VfsResult<Cow<'_, str>> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                return Err(VfsError::Normalization {
                    path: raw.to_string(),
                    reason: format!("incomplete escape sequence at byte {i}"),
                });
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_decode_str(raw)
        .decode_utf8()
        .map_err(|e| VfsError::Normalization {
            path: raw.to_string(),
            reason: format!("decoded bytes are not UTF-8: {e}"),
        })
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' && prev_slash {
            continue;
        }
        prev_slash = c == '/';
        out.push(c);
    }
    out
}

fn strip_scheme(path: &str) -> String {
    let mut segments: Vec<&str> = path.split(':').collect();
    // trailing empty segments do not count, so a bare `c:` is one segment
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    if segments.len() <= 1 {
        return path.to_string();
    }

    let last = segments[segments.len() - 1];
    let drive: String = segments[segments.len() - 2]
        .chars()
        .filter(|c| *c != '/' && *c != '\\')
        .collect();
    let mut chars = drive.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => format!("{}:{}", lower_drive(letter), last),
        _ => last.to_string(),
    }
}

/// Lower-case a drive letter, keeping it as is when its lower case is
/// not a single char (`İ`)
fn lower_drive(letter: char) -> char {
    let mut lower = letter.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => letter,
    }
}
