//! Cross-region copy through a relay storage account.
//!
//! Managed snapshots cannot be created from data in another region, so the
//! source is snapshotted where it lives, copied server-side into a blob in
//! the target region, and the target disk is created from that blob.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{
    CopyError, CopyPlan, CopySettings, ResolvedSource, TransientResource, TransientTracker,
    checkpoint, relay_account_name, snapshot_name,
};
use crate::gateway::{
    BlobCopySource, BlobCopyStatus, BlobDestination, CloudGateway, Disk, StorageAccount,
};
use crate::locator::BlobLocator;

/// Runs the relay copy. Every helper resource is tracked as soon as the
/// gateway returns it, and cancellation is honoured between steps.
pub(super) async fn copy<G: CloudGateway>(
    gateway: &G,
    settings: &CopySettings,
    plan: &CopyPlan,
    tracker: &mut TransientTracker,
    token: &CancellationToken,
) -> Result<Disk, CopyError<G::Error>> {
    let (source, blob_name) = open_source(gateway, settings, &plan.source, tracker).await?;
    checkpoint(token, "preparing the relay account")?;
    let relay = relay_account(gateway, settings, plan, tracker).await?;
    let relay_key = gateway
        .storage_account_key(&relay.resource_group, &relay.name)
        .await
        .map_err(CopyError::gateway("read relay account key"))?;
    gateway
        .create_blob_container(&relay.name, &relay_key, &settings.relay_container)
        .await
        .map_err(CopyError::gateway("create relay container"))?;
    checkpoint(token, "starting the relay copy")?;

    let destination = BlobDestination {
        blob: BlobLocator::new(
            relay.name.as_str(),
            settings.relay_container.as_str(),
            blob_name,
        ),
        account_key: relay_key,
    };
    gateway
        .start_blob_copy(&source, &destination)
        .await
        .map_err(CopyError::gateway("start relay copy"))?;
    info!(relay_blob = %destination.blob, "relay copy started");
    // Blobs in an auto-created account go when the account is deleted.
    if plan.relay_account.is_some() {
        tracker.track(TransientResource::RelayBlob {
            blob: destination.blob.clone(),
            resource_group: relay.resource_group.clone(),
        });
    }

    wait_for_copy(gateway, settings.poll_interval, &destination, token).await?;
    checkpoint(token, "creating the target disk")?;

    gateway
        .create_disk_from_blob(&destination.blob, &relay.id, &plan.target)
        .await
        .map_err(CopyError::gateway("create disk from relay blob"))
}

/// Takes a point-in-time copy of the source and returns how the relay reads
/// it, plus the relay blob name.
async fn open_source<G: CloudGateway>(
    gateway: &G,
    settings: &CopySettings,
    source: &ResolvedSource,
    tracker: &mut TransientTracker,
) -> Result<(BlobCopySource, String), CopyError<G::Error>> {
    match source {
        ResolvedSource::Vhd { blob, account } => {
            let account_key = gateway
                .storage_account_key(&account.resource_group, &account.name)
                .await
                .map_err(CopyError::gateway("read source account key"))?;
            let snapshot = gateway
                .create_blob_snapshot(blob, &account_key)
                .await
                .map_err(CopyError::gateway("snapshot source blob"))?;
            info!(blob = %blob, %snapshot, "created transient blob snapshot");
            tracker.track(TransientResource::BlobSnapshot {
                blob: blob.clone(),
                resource_group: account.resource_group.clone(),
                snapshot: snapshot.clone(),
            });
            Ok((
                BlobCopySource::Snapshot {
                    blob: blob.clone(),
                    account_key,
                    snapshot,
                },
                blob.blob_name.clone(),
            ))
        }
        ResolvedSource::ManagedDisk { disk } => {
            let snapshot = gateway
                .create_snapshot_from_disk(
                    &snapshot_name(&disk.name),
                    &disk.resource_group,
                    &disk.id,
                )
                .await
                .map_err(CopyError::gateway("create snapshot from disk"))?;
            info!(snapshot = %snapshot.id, "created transient snapshot");
            tracker.track(TransientResource::Snapshot {
                id: snapshot.id.clone(),
            });
            let sas_url = gateway
                .grant_snapshot_access(&snapshot.id, settings.sas_duration_secs)
                .await
                .map_err(CopyError::gateway("grant snapshot access"))?;
            tracker.track(TransientResource::SasGrant {
                snapshot_id: snapshot.id,
            });
            Ok((BlobCopySource::SasUrl(sas_url), format!("{}.vhd", disk.name)))
        }
    }
}

/// Uses the caller's relay account, which must exist, or creates one in the
/// target resource group.
async fn relay_account<G: CloudGateway>(
    gateway: &G,
    settings: &CopySettings,
    plan: &CopyPlan,
    tracker: &mut TransientTracker,
) -> Result<StorageAccount, CopyError<G::Error>> {
    if let Some(name) = plan.relay_account.as_deref() {
        let account = gateway
            .storage_account(name)
            .await
            .map_err(CopyError::gateway("look up relay account"))?
            .ok_or_else(|| CopyError::NotFound {
                resource: "storage account",
                name: name.to_owned(),
            })?;
        tracker.track(TransientResource::StorageAccount {
            id: account.id.clone(),
            name: account.name.clone(),
            auto_created: false,
        });
        return Ok(account);
    }

    let name = relay_account_name(&settings.relay_account_prefix);
    let account = gateway
        .create_storage_account(&name, &plan.target.resource_group)
        .await
        .map_err(CopyError::gateway("create relay account"))?;
    info!(account = %account.name, "created relay storage account");
    tracker.track(TransientResource::StorageAccount {
        id: account.id.clone(),
        name: account.name.clone(),
        auto_created: true,
    });
    Ok(account)
}

/// Polls the relay blob until the copy leaves `pending`. The status is read
/// before each wait, so a copy that is already done costs one call.
async fn wait_for_copy<G: CloudGateway>(
    gateway: &G,
    interval: Duration,
    destination: &BlobDestination,
    token: &CancellationToken,
) -> Result<(), CopyError<G::Error>> {
    loop {
        let state = gateway
            .blob_copy_state(destination)
            .await
            .map_err(CopyError::gateway("read relay copy status"))?;
        match state.status {
            BlobCopyStatus::Success => {
                info!(relay_blob = %destination.blob, "relay copy finished");
                return Ok(());
            }
            BlobCopyStatus::Failed | BlobCopyStatus::Aborted => {
                return Err(CopyError::CopyFailed {
                    blob: destination.blob.uri(),
                    status: state.status,
                    description: state.description,
                });
            }
            BlobCopyStatus::Pending => {
                info!(
                    progress = state.progress.as_deref().unwrap_or("unknown"),
                    "relay copy pending"
                );
            }
        }

        tokio::select! {
            biased;
            () = token.cancelled() => {
                return Err(CopyError::Cancelled {
                    stage: "waiting for the relay copy",
                });
            }
            () = sleep(interval) => {}
        }
    }
}
