//! Snapshot-then-create copy within one region.

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{
    CopyError, CopyPlan, ResolvedSource, TransientResource, TransientTracker, checkpoint,
    snapshot_name,
};
use crate::gateway::{CloudGateway, Disk};

/// Snapshots the source into the target resource group and creates the
/// target disk from it. The snapshot is tracked as soon as it exists.
pub(super) async fn copy<G: CloudGateway>(
    gateway: &G,
    plan: &CopyPlan,
    tracker: &mut TransientTracker,
    token: &CancellationToken,
) -> Result<Disk, CopyError<G::Error>> {
    let target = &plan.target;
    let name = snapshot_name(&target.name);
    let snapshot = match &plan.source {
        ResolvedSource::Vhd { blob, account } => gateway
            .create_snapshot_from_blob(&name, &target.resource_group, blob, &account.id)
            .await
            .map_err(CopyError::gateway("create snapshot from blob"))?,
        ResolvedSource::ManagedDisk { disk } => gateway
            .create_snapshot_from_disk(&name, &target.resource_group, &disk.id)
            .await
            .map_err(CopyError::gateway("create snapshot from disk"))?,
    };
    info!(snapshot = %snapshot.id, "created transient snapshot");
    tracker.track(TransientResource::Snapshot {
        id: snapshot.id.clone(),
    });
    checkpoint(token, "creating the target disk")?;

    gateway
        .create_disk_from_snapshot(&snapshot.id, target)
        .await
        .map_err(CopyError::gateway("create disk from snapshot"))
}
