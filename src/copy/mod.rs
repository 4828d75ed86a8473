//! Orchestrates disk copies across kinds and regions.
//!
//! A copy validates the requested kind pairing, resolves where the source
//! and target live, derives the target SKU, and dispatches to the
//! same-region or cross-region strategy. Every transient resource a
//! strategy creates is recorded in a [`TransientTracker`], which is drained
//! on every exit path before the outcome is returned. Cleanup failures never
//! replace the primary error.

use std::fmt;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::DiskCopyConfig;
use crate::gateway::{CloudGateway, Disk, DiskSpec, StorageAccount};
use crate::locator::{BlobLocator, derive_disk_name};
use crate::sku::{DiskSku, resolve_sku, tier_of_sku_name};

mod cross_region;
mod error;
mod request;
mod same_region;
mod tracker;

pub use error::CopyError;
pub use request::{
    CopyRequest, CopyResult, CopyRoute, RegionStrategy, RequestArgs, RequestError, SourceKind,
    SourceLocator, TargetKind, TargetLocator,
};
pub use tracker::{ReleaseReport, TransientKind, TransientResource, TransientTracker};

/// Longest storage account name Azure accepts.
pub const MAX_STORAGE_ACCOUNT_NAME_LEN: usize = 24;

/// Progress markers logged as a copy advances.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CopyStage {
    /// Checking the kind pairing.
    Validating,
    /// Looking up source and target resources.
    ResolvingLocations,
    /// Choosing the target SKU.
    ResolvingSku,
    /// A strategy has been chosen.
    Dispatched,
    /// Running the same-region strategy.
    SameRegion,
    /// Running the cross-region strategy.
    CrossRegion,
    /// The target disk exists.
    Completed,
    /// The copy failed; transient resources have been released.
    Failed,
}

impl fmt::Display for CopyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validating => "validating",
            Self::ResolvingLocations => "resolving-locations",
            Self::ResolvingSku => "resolving-sku",
            Self::Dispatched => "dispatched",
            Self::SameRegion => "same-region",
            Self::CrossRegion => "cross-region",
            Self::Completed => "completed",
            Self::Failed => "failed",
        })
    }
}

fn enter(stage: CopyStage) {
    debug!(stage = %stage, "copy stage");
}

/// Source resolved to live resources.
#[derive(Clone, Debug)]
pub(crate) enum ResolvedSource {
    Vhd {
        blob: BlobLocator,
        account: StorageAccount,
    },
    ManagedDisk {
        disk: Disk,
    },
}

impl ResolvedSource {
    fn region(&self) -> &str {
        match self {
            Self::Vhd { account, .. } => &account.location,
            Self::ManagedDisk { disk } => &disk.location,
        }
    }

    fn tier(&self) -> Option<&str> {
        match self {
            Self::Vhd { account, .. } => account.tier.as_deref(),
            Self::ManagedDisk { disk } => disk
                .tier
                .as_deref()
                .or_else(|| disk.sku.as_deref().map(tier_of_sku_name)),
        }
    }
}

/// Everything a strategy needs once lookups are done.
#[derive(Clone, Debug)]
pub(crate) struct CopyPlan {
    pub(crate) source: ResolvedSource,
    pub(crate) target: DiskSpec,
    pub(crate) relay_account: Option<String>,
}

/// Tunables shared by the strategies.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CopySettings {
    pub(crate) poll_interval: Duration,
    pub(crate) sas_duration_secs: u64,
    pub(crate) relay_container: String,
    pub(crate) relay_account_prefix: String,
}

/// Name for a transient snapshot of `base`, unique per call.
pub(crate) fn snapshot_name(base: &str) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    format!("{base}-diskcopy-{suffix}")
}

/// Synthesises a relay storage account name: the prefix followed by random
/// hex, capped at the storage account name limit.
pub(crate) fn relay_account_name(prefix: &str) -> String {
    format!("{prefix}{}", Uuid::new_v4().simple())
        .chars()
        .take(MAX_STORAGE_ACCOUNT_NAME_LEN)
        .collect()
}

/// Fails with [`CopyError::Cancelled`] once `token` has fired. `stage`
/// names the step that would have run next.
pub(crate) fn checkpoint<E>(
    token: &CancellationToken,
    stage: &'static str,
) -> Result<(), CopyError<E>>
where
    E: std::error::Error + 'static,
{
    if token.is_cancelled() {
        return Err(CopyError::Cancelled { stage });
    }
    Ok(())
}

/// Copies disks through a [`CloudGateway`].
#[derive(Debug)]
pub struct CopyOrchestrator<G> {
    gateway: G,
    settings: CopySettings,
}

impl<G: CloudGateway> CopyOrchestrator<G> {
    /// Creates an orchestrator using the relay settings from `config`.
    #[must_use]
    pub fn new(gateway: G, config: &DiskCopyConfig) -> Self {
        Self {
            gateway,
            settings: CopySettings {
                poll_interval: config.poll_interval(),
                sas_duration_secs: config.sas_duration_secs,
                relay_container: config.relay_container.clone(),
                relay_account_prefix: config.relay_account_prefix.clone(),
            },
        }
    }

    /// Overrides the relay poll interval.
    ///
    /// This is primarily used by tests to keep relay scenarios fast.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.settings.poll_interval = interval;
        self
    }

    /// Copies a disk with no way to cancel.
    ///
    /// # Errors
    ///
    /// See [`Self::copy_with_cancellation`].
    pub async fn copy(&self, request: &CopyRequest) -> Result<CopyResult, CopyError<G::Error>> {
        self.copy_with_cancellation(request, &CancellationToken::new())
            .await
    }

    /// Copies a disk, stopping before the next gateway step or relay poll
    /// once `token` is cancelled.
    ///
    /// Transient resources are released before this returns, whatever the
    /// outcome.
    ///
    /// # Errors
    ///
    /// Returns [`CopyError::UnsupportedCombination`] for VHD targets,
    /// [`CopyError::NotFound`] or [`CopyError::AlreadyExists`] when lookups
    /// rule the copy out, [`CopyError::CopyFailed`] when the relay copy
    /// fails, [`CopyError::Cancelled`] when `token` fires, and
    /// [`CopyError::Gateway`] for any gateway failure.
    pub async fn copy_with_cancellation(
        &self,
        request: &CopyRequest,
        token: &CancellationToken,
    ) -> Result<CopyResult, CopyError<G::Error>> {
        let route = CopyRoute::of(&request.source, &request.target);
        let span = info_span!("copy", route = ?route);
        self.run(request, route, token).instrument(span).await
    }

    async fn run(
        &self,
        request: &CopyRequest,
        route: CopyRoute,
        token: &CancellationToken,
    ) -> Result<CopyResult, CopyError<G::Error>> {
        enter(CopyStage::Validating);
        let unsupported = || CopyError::UnsupportedCombination {
            from: request.source.kind(),
            to: request.target.kind(),
        };
        match route {
            CopyRoute::VhdToManagedDisk | CopyRoute::ManagedDiskToManagedDisk => {}
            CopyRoute::VhdToVhd | CopyRoute::ManagedDiskToVhd => return Err(unsupported()),
        }
        let TargetLocator::ManagedDisk {
            resource_group,
            disk_name,
        } = &request.target
        else {
            return Err(unsupported());
        };
        let target_group = resource_group.as_str();
        let target_name = disk_name.as_deref();

        enter(CopyStage::ResolvingLocations);
        let source = self.resolve_source(&request.source).await?;
        let target_region = self.resource_group_region(target_group).await?;
        let name = target_name.map_or_else(|| default_disk_name(&source), str::to_owned);
        self.ensure_target_free(target_group, &name).await?;

        enter(CopyStage::ResolvingSku);
        let sku = request.sku.unwrap_or_else(|| resolve_sku(source.tier()));
        let strategy = if source.region().eq_ignore_ascii_case(&target_region) {
            RegionStrategy::SameRegion
        } else {
            RegionStrategy::CrossRegion
        };
        info!(
            source_region = source.region(),
            target_region = %target_region,
            %sku,
            %strategy,
            "copy planned"
        );

        let plan = CopyPlan {
            source,
            target: DiskSpec {
                resource_group: target_group.to_owned(),
                name,
                sku,
            },
            relay_account: request.relay_account.clone(),
        };
        checkpoint(token, "planning the copy")?;
        enter(CopyStage::Dispatched);
        let mut tracker = TransientTracker::new();
        let outcome = self.dispatch(strategy, &plan, &mut tracker, token).await;
        let report = tracker.release_all(&self.gateway).await;
        Self::finish(outcome, report, sku, route, strategy)
    }

    async fn dispatch(
        &self,
        strategy: RegionStrategy,
        plan: &CopyPlan,
        tracker: &mut TransientTracker,
        token: &CancellationToken,
    ) -> Result<Disk, CopyError<G::Error>> {
        match strategy {
            RegionStrategy::SameRegion => {
                enter(CopyStage::SameRegion);
                same_region::copy(&self.gateway, plan, tracker, token).await
            }
            RegionStrategy::CrossRegion => {
                enter(CopyStage::CrossRegion);
                cross_region::copy(&self.gateway, &self.settings, plan, tracker, token).await
            }
        }
    }

    fn finish(
        outcome: Result<Disk, CopyError<G::Error>>,
        report: ReleaseReport,
        sku: DiskSku,
        route: CopyRoute,
        strategy: RegionStrategy,
    ) -> Result<CopyResult, CopyError<G::Error>> {
        match outcome {
            Ok(disk) => {
                enter(CopyStage::Completed);
                info!(disk = %disk.id, "disk created");
                if !report.leaked.is_empty() {
                    warn!(
                        leaked = ?report.leaked,
                        "copy succeeded but left transient resources behind"
                    );
                }
                Ok(CopyResult {
                    disk,
                    sku,
                    route,
                    strategy,
                    released: report.released,
                    leaked: report.leaked,
                })
            }
            Err(err) => {
                enter(CopyStage::Failed);
                if !report.leaked.is_empty() {
                    warn!(
                        leaked = ?report.leaked,
                        "copy failed and left transient resources behind"
                    );
                }
                Err(err)
            }
        }
    }

    async fn resolve_source(
        &self,
        source: &SourceLocator,
    ) -> Result<ResolvedSource, CopyError<G::Error>> {
        match source {
            SourceLocator::Vhd { blob } => {
                let account = self
                    .gateway
                    .storage_account(&blob.storage_account)
                    .await
                    .map_err(CopyError::gateway("look up storage account"))?
                    .ok_or_else(|| CopyError::NotFound {
                        resource: "storage account",
                        name: blob.storage_account.clone(),
                    })?;
                Ok(ResolvedSource::Vhd {
                    blob: blob.clone(),
                    account,
                })
            }
            SourceLocator::ManagedDisk {
                resource_group,
                disk_name,
            } => {
                self.resource_group_region(resource_group).await?;
                let disk = self
                    .gateway
                    .disk(resource_group, disk_name)
                    .await
                    .map_err(CopyError::gateway("look up disk"))?
                    .ok_or_else(|| CopyError::NotFound {
                        resource: "disk",
                        name: disk_name.clone(),
                    })?;
                Ok(ResolvedSource::ManagedDisk { disk })
            }
        }
    }

    async fn resource_group_region(
        &self,
        resource_group: &str,
    ) -> Result<String, CopyError<G::Error>> {
        self.gateway
            .resource_group(resource_group)
            .await
            .map_err(CopyError::gateway("look up resource group"))?
            .map(|group| group.location)
            .ok_or_else(|| CopyError::NotFound {
                resource: "resource group",
                name: resource_group.to_owned(),
            })
    }

    async fn ensure_target_free(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<(), CopyError<G::Error>> {
        let existing = self
            .gateway
            .disk(resource_group, name)
            .await
            .map_err(CopyError::gateway("look up target disk"))?;
        if existing.is_some() {
            return Err(CopyError::AlreadyExists {
                resource_group: resource_group.to_owned(),
                name: name.to_owned(),
            });
        }
        Ok(())
    }
}

fn default_disk_name(source: &ResolvedSource) -> String {
    match source {
        ResolvedSource::Vhd { blob, .. } => derive_disk_name(&blob.blob_name),
        ResolvedSource::ManagedDisk { disk } => disk.name.clone(),
    }
}

#[cfg(test)]
mod tests;
