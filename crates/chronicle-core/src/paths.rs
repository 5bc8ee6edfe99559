//! Storage locations for version chains.
//!
//! Layout, stable across releases:
//!
//! ```text
//! users/{user}/{kind-segment}/{artifact-segment}/versions/{version_id}.json
//! users/{user}/{kind-segment}/{artifact-segment}/current.json
//! ```
//!
//! User and version ids are percent-encoded for any byte outside
//! `[A-Za-z0-9._@+=-]`, so ids containing `/` or `%` cannot collide with
//! another chain's keys. Ordinary ids are left untouched.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::artifact::ArtifactKindId;

const USERS_ROOT: &str = "users";
const VERSIONS_DIR: &str = "versions";
const CURRENT_FILE: &str = "current.json";
const DOCUMENT_EXTENSION: &str = ".json";

fn is_plain(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'@' | b'+' | b'=' | b'-')
}

/// Percent-encodes a single path segment.
#[must_use]
pub fn encode_segment(segment: &str) -> Cow<'_, str> {
    if segment.bytes().all(is_plain) {
        return Cow::Borrowed(segment);
    }
    let mut encoded = String::with_capacity(segment.len() * 3);
    for byte in segment.bytes() {
        if is_plain(byte) {
            encoded.push(char::from(byte));
        } else {
            // Writing to a String cannot fail.
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    Cow::Owned(encoded)
}

/// Directory holding everything for one `(user, kind)` chain, with a
/// trailing slash.
#[must_use]
pub fn chain_prefix(user_id: &str, kind: ArtifactKindId) -> String {
    format!(
        "{USERS_ROOT}/{}/{}/{}/",
        encode_segment(user_id),
        kind.kind_segment(),
        kind.artifact_segment()
    )
}

/// Prefix under which every version object of a chain lives.
#[must_use]
pub fn versions_prefix(user_id: &str, kind: ArtifactKindId) -> String {
    format!("{}{VERSIONS_DIR}/", chain_prefix(user_id, kind))
}

/// Location of one version object.
#[must_use]
pub fn version_path(user_id: &str, kind: ArtifactKindId, version_id: &str) -> String {
    format!(
        "{}{}{DOCUMENT_EXTENSION}",
        versions_prefix(user_id, kind),
        encode_segment(version_id)
    )
}

/// Location of the current-version pointer.
#[must_use]
pub fn current_path(user_id: &str, kind: ArtifactKindId) -> String {
    format!("{}{CURRENT_FILE}", chain_prefix(user_id, kind))
}

/// True when `path` is a version object directly below `prefix`.
#[must_use]
pub fn is_version_object(prefix: &str, path: &str) -> bool {
    path.strip_prefix(prefix)
        .and_then(|name| name.strip_suffix(DOCUMENT_EXTENSION))
        .is_some_and(|stem| !stem.is_empty() && !stem.contains('/'))
}
