//! Resource shapes exchanged with the gateway.

use std::fmt;

use serde::Serialize;

use crate::locator::BlobLocator;
use crate::sku::DiskSku;

/// A resource group and the region it lives in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResourceGroup {
    /// Resource group name.
    pub name: String,
    /// Azure region, for example `westeurope`.
    pub location: String,
}

/// A storage account and the attributes routing depends on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StorageAccount {
    /// Resource ID of the account.
    pub id: String,
    /// Account name, globally unique.
    pub name: String,
    /// Resource group that owns the account.
    pub resource_group: String,
    /// Azure region of the account.
    pub location: String,
    /// Performance tier (`Standard` or `Premium`), when reported.
    pub tier: Option<String>,
}

/// A managed disk.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Disk {
    /// Resource ID of the disk.
    pub id: String,
    /// Disk name.
    pub name: String,
    /// Resource group that owns the disk.
    pub resource_group: String,
    /// Azure region of the disk.
    pub location: String,
    /// SKU name as reported by Azure, for example `Premium_LRS`.
    pub sku: Option<String>,
    /// SKU tier as reported by Azure, for example `Premium`.
    pub tier: Option<String>,
}

/// A managed snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Snapshot {
    /// Resource ID of the snapshot.
    pub id: String,
    /// Snapshot name.
    pub name: String,
}

/// Where and how a new managed disk is created.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiskSpec {
    /// Resource group that will own the disk.
    pub resource_group: String,
    /// Disk name.
    pub name: String,
    /// SKU of the new disk.
    pub sku: DiskSku,
}

/// Source of a server-side blob copy.
#[derive(Clone, Eq, PartialEq)]
pub enum BlobCopySource {
    /// A blob snapshot read with the source account's key.
    Snapshot {
        /// Blob the snapshot was taken of.
        blob: BlobLocator,
        /// Source storage account key.
        account_key: String,
        /// Snapshot token returned when the snapshot was taken.
        snapshot: String,
    },
    /// Any blob reachable through a SAS URL.
    SasUrl(String),
}

impl fmt::Debug for BlobCopySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot { blob, snapshot, .. } => f
                .debug_struct("Snapshot")
                .field("blob", blob)
                .field("snapshot", snapshot)
                .finish_non_exhaustive(),
            Self::SasUrl(_) => f.write_str("SasUrl(<redacted>)"),
        }
    }
}

/// Destination of a server-side blob copy.
#[derive(Clone, Eq, PartialEq)]
pub struct BlobDestination {
    /// Destination blob.
    pub blob: BlobLocator,
    /// Destination storage account key.
    pub account_key: String,
}

impl fmt::Debug for BlobDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobDestination")
            .field("blob", &self.blob)
            .finish_non_exhaustive()
    }
}

/// Copy status reported for a destination blob.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobCopyStatus {
    /// The copy is still running.
    Pending,
    /// The copy completed.
    Success,
    /// The copy failed.
    Failed,
    /// The copy was aborted.
    Aborted,
}

impl BlobCopyStatus {
    /// Parses the status string Azure reports.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            "aborted" => Some(Self::Aborted),
            _ => None,
        }
    }

    /// Returns the lowercase status name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for BlobCopyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Polled copy state of a destination blob.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlobCopyState {
    /// Current status.
    pub status: BlobCopyStatus,
    /// Progress as `copied/total` bytes, when reported.
    pub progress: Option<String>,
    /// Provider description of a failure, when reported.
    pub description: Option<String>,
}
