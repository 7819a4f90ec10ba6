//! Byte-level decoders for request targets.
//!
//! Percent-decoding and query-string lookup operate directly on the raw
//! request text; no URL library is involved.

use std::ffi::OsString;
use std::path::PathBuf;

/// Percent-decodes `raw`, turning `+` into a space.
///
/// A `%` not followed by two hex digits is kept as a literal byte. The
/// decoded bytes are converted to a `String` lossily.
///
/// # Example
///
/// ```
/// # use webman::http::decode::url_decode;
/// assert_eq!(url_decode("%2Fdata%2Fmy+file.txt"), "/data/my file.txt");
/// assert_eq!(url_decode("100%"), "100%");
/// ```
pub fn url_decode(raw: &str) -> String {
    String::from_utf8_lossy(&url_decode_bytes(raw.as_bytes())).into_owned()
}

/// Percent-decodes `raw` into a filesystem path.
///
/// The decoded bytes are used as-is on unix, so names that are not valid
/// UTF-8 stay reachable.
pub fn url_decode_path(raw: &str) -> PathBuf {
    PathBuf::from(os_string_from_bytes(url_decode_bytes(raw.as_bytes())))
}

/// Raw bytes as a platform string.
#[cfg(unix)]
pub fn os_string_from_bytes(bytes: Vec<u8>) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(bytes)
}

#[cfg(not(unix))]
pub fn os_string_from_bytes(bytes: Vec<u8>) -> OsString {
    OsString::from(String::from_utf8_lossy(&bytes).into_owned())
}

/// Byte-oriented form of [`url_decode`]. Decoding never grows the input.
pub fn url_decode_bytes(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        match raw[i] {
            b'%' => {
                let hi = raw.get(i + 1).copied().and_then(hex_value);
                let lo = raw.get(i + 2).copied().and_then(hex_value);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    out
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Looks up the raw value of `name` in a query string.
///
/// The key must match exactly and start the query or follow a `&`, so
/// `path` never matches `subpath=...`. The value runs up to the next `&`,
/// space, or the end of the query. A leading `?` is tolerated. The first
/// occurrence wins.
pub fn query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let query = query.split(' ').next().unwrap_or("");

    query.split('&').find_map(|pair| {
        pair.strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('='))
    })
}
