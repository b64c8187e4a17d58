//! File name resolution for downloads whose caller did not supply one.

use percent_encoding::percent_decode_str;
use reqwest::Url;
use reqwest::header::{CONTENT_DISPOSITION, HeaderMap};

/// Derives a download's file name from the response headers or, failing
/// that, from the URL's last path segment.
///
/// Only the base name of whatever is found is returned; a derived name can
/// never introduce path separators. The final fallback is the literal
/// `download`, so the result is never empty.
pub(crate) fn derive_file_name(headers: &HeaderMap, url: &str) -> String {
    disposition_file_name(headers)
        .or_else(|| url_file_name(url))
        .unwrap_or_else(|| "download".to_string())
}

/// Parses `Content-Disposition: attachment; filename="model.bin"`.
///
/// Accepts a quoted or bare token after `filename=`; the RFC 5987
/// `filename*=` form is ignored.
fn disposition_file_name(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;
    let lower = value.to_ascii_lowercase();
    let start = lower.find("filename=")? + "filename=".len();
    let rest = value[start..].trim_start();

    let raw = if let Some(quoted) = rest.strip_prefix('"') {
        quoted.split('"').next()?
    } else {
        rest.split(';').next()?.trim()
    };

    base_name(raw)
}

/// Last non-empty path segment of the URL, percent-decoded. Query and
/// fragment never leak into the name.
fn url_file_name(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).next_back()?;
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    base_name(&decoded)
}

/// Strips any directory part, Unix or Windows style.
fn base_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next()?.trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}
