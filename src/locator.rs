//! Unmanaged blob addresses and the disk names derived from them.
//!
//! VHD sources are addressed by their canonical blob URI,
//! `https://{account}.blob.core.windows.net/{container}/{blob}`. Blob names
//! that contain `/` are kept verbatim; Azure rejects such names when they end
//! up in a derived disk name, so callers should pass `--target-disk-name` for
//! nested blobs.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

const BLOB_HOST_SUFFIX: &str = ".blob.core.windows.net";
const HTTPS_SCHEME: &str = "https://";

/// Errors raised while parsing a blob address.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum LocatorError {
    /// Raised when the URI does not match the canonical blob shape.
    #[error("invalid blob locator '{uri}': {reason}")]
    InvalidLocator {
        /// URI supplied by the caller.
        uri: String,
        /// Which part of the shape did not match.
        reason: &'static str,
    },
}

/// Structured identity of an unmanaged blob.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BlobLocator {
    /// Storage account that owns the blob.
    pub storage_account: String,
    /// Container holding the blob.
    pub container: String,
    /// Blob name within the container; may contain `/`.
    pub blob_name: String,
}

impl BlobLocator {
    /// Builds a locator from its parts.
    #[must_use]
    pub fn new(
        storage_account: impl Into<String>,
        container: impl Into<String>,
        blob_name: impl Into<String>,
    ) -> Self {
        Self {
            storage_account: storage_account.into(),
            container: container.into(),
            blob_name: blob_name.into(),
        }
    }

    /// Parses a canonical blob URI.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::InvalidLocator`] when the scheme is not
    /// `https`, the host is not a blob-storage host, the path is not
    /// `{container}/{blob}`, or the URI carries a query or fragment.
    pub fn parse(uri: &str) -> Result<Self, LocatorError> {
        let invalid = |reason| LocatorError::InvalidLocator {
            uri: uri.to_owned(),
            reason,
        };

        let rest = uri
            .trim()
            .strip_prefix(HTTPS_SCHEME)
            .ok_or_else(|| invalid("expected an https:// URI"))?;
        if rest.contains(['?', '#']) {
            return Err(invalid("query strings and fragments are not supported"));
        }

        let (host, path) = rest
            .split_once('/')
            .ok_or_else(|| invalid("missing container and blob path"))?;
        let account = host
            .to_ascii_lowercase()
            .strip_suffix(BLOB_HOST_SUFFIX)
            .map(str::to_owned)
            .ok_or_else(|| invalid("host is not a blob storage endpoint"))?;
        if account.is_empty() || !account.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(invalid("storage account name must be alphanumeric"));
        }

        let (container, blob_name) = path
            .split_once('/')
            .ok_or_else(|| invalid("path must be {container}/{blob}"))?;
        if container.is_empty() || blob_name.is_empty() {
            return Err(invalid("path must be {container}/{blob}"));
        }

        Ok(Self::new(account, container, blob_name))
    }

    /// Returns the blob's canonical URI.
    #[must_use]
    pub fn uri(&self) -> String {
        format!(
            "{HTTPS_SCHEME}{}{BLOB_HOST_SUFFIX}/{}/{}",
            self.storage_account, self.container, self.blob_name
        )
    }
}

impl fmt::Display for BlobLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri())
    }
}

/// Derives a disk name by stripping the last dot-delimited extension.
///
/// A name without an extension is returned unchanged.
///
/// ```
/// # use diskcopy::locator::derive_disk_name;
/// assert_eq!(derive_disk_name("os-disk.vhd"), "os-disk");
/// assert_eq!(derive_disk_name("os-disk"), "os-disk");
/// ```
#[must_use]
pub fn derive_disk_name(blob_name: &str) -> String {
    blob_name
        .rsplit_once('.')
        .map_or(blob_name, |(stem, _)| stem)
        .to_owned()
}
