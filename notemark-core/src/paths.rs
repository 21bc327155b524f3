//! Reference token path resolution.
//!
//! References arrive percent-encoded because the source-stage encoder has to
//! make them survive CommonMark link-destination parsing. This module is the
//! single place that encoding/decoding and root joining happen.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Characters that make a CommonMark link destination unparseable and
/// therefore need percent-encoding at the source stage.
///
/// `%` is deliberately absent: re-encoding an already-encoded reference must
/// be a no-op, so existing escape sequences pass through untouched.
const REFERENCE_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'[')
    .add(b']');

/// A reference joined onto its configured root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Concrete file location (`root` + decoded reference).
    pub path: PathBuf,
    /// Decoded reference, kept for `data-*` attributes.
    pub reference: String,
    /// Final path segment of the decoded reference, for display.
    pub basename: String,
}

/// Percent-decode a captured reference.
pub fn decode(reference: &str) -> String {
    percent_decode_str(reference).decode_utf8_lossy().into_owned()
}

/// Percent-encode a raw reference so the generic Markdown engine accepts it
/// as a link destination. Idempotent: already-encoded input is unchanged.
pub fn encode_reference(raw: &str) -> Cow<'_, str> {
    utf8_percent_encode(raw, REFERENCE_ENCODE_SET).into()
}

/// Decode `encoded` and join it onto `root`.
///
/// No traversal protection is attempted; callers trust their input.
pub fn resolve(root: &Path, encoded: &str) -> Resolved {
    let reference = decode(encoded);
    let basename = reference
        .rsplit('/')
        .next()
        .unwrap_or(reference.as_str())
        .to_string();
    Resolved {
        path: root.join(&reference),
        reference,
        basename,
    }
}
