//! Transient resources created during one copy and their release.
//!
//! Every helper resource the strategies create is recorded here as soon as
//! the gateway returns it. The orchestrator drains the tracker exactly once
//! on every exit path. Release is best-effort: each resource is released
//! independently and failures are logged and reported, never raised.

use tracing::{info, warn};

use crate::gateway::CloudGateway;
use crate::locator::BlobLocator;

/// Kinds of transient resource, in release order.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum TransientKind {
    /// Read access granted on a snapshot.
    SasGrant,
    /// Managed or blob snapshot.
    Snapshot,
    /// Relay copy of the source written into a caller-supplied account.
    RelayBlob,
    /// Relay storage account.
    StorageAccount,
}

/// A helper resource owned by one copy operation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransientResource {
    /// Managed snapshot, deleted by resource ID.
    Snapshot {
        /// Snapshot resource ID.
        id: String,
    },
    /// Point-in-time snapshot of a source blob.
    BlobSnapshot {
        /// Blob the snapshot belongs to.
        blob: BlobLocator,
        /// Resource group of the blob's storage account, for key lookup.
        resource_group: String,
        /// Snapshot token.
        snapshot: String,
    },
    /// Relay blob in a caller-supplied storage account. Blobs in an
    /// auto-created account go away with the account and are not tracked.
    RelayBlob {
        /// The relay blob.
        blob: BlobLocator,
        /// Resource group of the relay account, for key lookup.
        resource_group: String,
    },
    /// SAS read access granted on a managed snapshot.
    SasGrant {
        /// Resource ID of the snapshot the grant is on.
        snapshot_id: String,
    },
    /// Relay storage account.
    StorageAccount {
        /// Account resource ID.
        id: String,
        /// Account name.
        name: String,
        /// Whether this copy created the account. Caller-supplied accounts
        /// are never deleted.
        auto_created: bool,
    },
}

impl TransientResource {
    /// Returns the kind used to order releases.
    #[must_use]
    pub const fn kind(&self) -> TransientKind {
        match self {
            Self::Snapshot { .. } | Self::BlobSnapshot { .. } => TransientKind::Snapshot,
            Self::SasGrant { .. } => TransientKind::SasGrant,
            Self::RelayBlob { .. } => TransientKind::RelayBlob,
            Self::StorageAccount { .. } => TransientKind::StorageAccount,
        }
    }

    /// Returns `false` for resources the copy must leave in place.
    #[must_use]
    pub const fn auto_created(&self) -> bool {
        match self {
            Self::StorageAccount { auto_created, .. } => *auto_created,
            Self::Snapshot { .. }
            | Self::BlobSnapshot { .. }
            | Self::RelayBlob { .. }
            | Self::SasGrant { .. } => true,
        }
    }

    /// Returns an identifier suitable for reports and logs.
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Self::Snapshot { id } | Self::StorageAccount { id, .. } => id.clone(),
            Self::BlobSnapshot { blob, snapshot, .. } => {
                format!("{}?snapshot={snapshot}", blob.uri())
            }
            Self::RelayBlob { blob, .. } => blob.uri(),
            Self::SasGrant { snapshot_id } => format!("{snapshot_id} (SAS grant)"),
        }
    }

    async fn release<G: CloudGateway>(&self, gateway: &G) -> Result<(), G::Error> {
        match self {
            Self::Snapshot { id } | Self::StorageAccount { id, .. } => {
                gateway.delete_resource(id).await
            }
            Self::BlobSnapshot {
                blob,
                resource_group,
                snapshot,
            } => {
                let key = gateway
                    .storage_account_key(resource_group, &blob.storage_account)
                    .await?;
                gateway.delete_blob_snapshot(blob, &key, snapshot).await
            }
            Self::RelayBlob {
                blob,
                resource_group,
            } => {
                let key = gateway
                    .storage_account_key(resource_group, &blob.storage_account)
                    .await?;
                gateway.delete_blob(blob, &key).await
            }
            Self::SasGrant { snapshot_id } => gateway.revoke_snapshot_access(snapshot_id).await,
        }
    }
}

/// Outcome of releasing every tracked resource.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReleaseReport {
    /// Identifiers of resources that were released.
    pub released: Vec<String>,
    /// Identifiers of resources whose release failed.
    pub leaked: Vec<String>,
}

/// Accumulates transient resources for one copy.
#[derive(Debug, Default)]
pub struct TransientTracker {
    resources: Vec<TransientResource>,
}

impl TransientTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            resources: Vec::new(),
        }
    }

    /// Records a resource for release.
    pub fn track(&mut self, resource: TransientResource) {
        self.resources.push(resource);
    }

    /// Returns `true` when nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Releases every tracked resource and empties the tracker.
    ///
    /// Grants are revoked first, then snapshots and relay blobs are deleted,
    /// and the relay account goes last. Caller-supplied storage accounts are
    /// skipped.
    pub async fn release_all<G: CloudGateway>(&mut self, gateway: &G) -> ReleaseReport {
        let mut pending = std::mem::take(&mut self.resources);
        pending.sort_by_key(TransientResource::kind);

        let mut report = ReleaseReport::default();
        for resource in pending {
            let id = resource.id();
            if !resource.auto_created() {
                info!(resource = %id, "keeping caller-supplied resource");
                continue;
            }
            match resource.release(gateway).await {
                Ok(()) => {
                    info!(resource = %id, kind = ?resource.kind(), "released transient resource");
                    report.released.push(id);
                }
                Err(err) => {
                    warn!(
                        resource = %id,
                        kind = ?resource.kind(),
                        error = %err,
                        "failed to release transient resource; delete it manually"
                    );
                    report.leaked.push(id);
                }
            }
        }
        report
    }
}
