//! BDD step definitions for the copy workflow.

use std::time::Duration;

use diskcopy::copy::{
    CopyError, CopyOrchestrator, CopyRequest, RegionStrategy, SourceLocator, TargetLocator,
};
use diskcopy::gateway::BlobCopyStatus;
use diskcopy::test_support::{StubGateway, StubGatewayError};
use diskcopy::{BlobLocator, DiskCopyConfig, DiskSku};
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::Runtime;

use super::test_helpers::{
    CopyContext, CopyFailure, CopyFailureKind, CopyOutcome, CopyTestError, RELAY_PREFIX,
    SOURCE_GROUP, TARGET_GROUP,
};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Setup(#[from] CopyTestError),
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a source managed disk \"{name}\" in \"{region}\"")]
fn source_managed_disk(mut copy_context: CopyContext, name: String, region: String) -> CopyContext {
    copy_context.gateway = copy_context
        .gateway
        .with_resource_group(SOURCE_GROUP, &region)
        .with_disk(SOURCE_GROUP, &name, DiskSku::PremiumLrs);
    copy_context.source = Some(SourceLocator::ManagedDisk {
        resource_group: String::from(SOURCE_GROUP),
        disk_name: name,
    });
    copy_context
}

#[given("a source VHD \"{uri}\" in \"{region}\"")]
fn source_vhd(
    mut copy_context: CopyContext,
    uri: String,
    region: String,
) -> Result<CopyContext, StepError> {
    let blob = BlobLocator::parse(&uri)
        .map_err(|err| CopyTestError::Fixture(format!("source uri: {err}")))?;
    copy_context.gateway = copy_context
        .gateway
        .with_resource_group(SOURCE_GROUP, &region)
        .with_storage_account(&blob.storage_account, SOURCE_GROUP, "Standard");
    copy_context.source = Some(SourceLocator::Vhd { blob });
    Ok(copy_context)
}

#[given("a target resource group in \"{region}\"")]
fn target_group(mut copy_context: CopyContext, region: String) -> CopyContext {
    copy_context.gateway = copy_context.gateway.with_resource_group(TARGET_GROUP, &region);
    copy_context.target = Some(TargetLocator::ManagedDisk {
        resource_group: String::from(TARGET_GROUP),
        disk_name: None,
    });
    copy_context
}

#[given("a VHD target")]
fn vhd_target(mut copy_context: CopyContext) -> CopyContext {
    copy_context.target = Some(TargetLocator::Vhd {
        storage_account: String::from("dstacct"),
        container: String::from("vhds"),
        blob_name: String::from("copy.vhd"),
    });
    copy_context
}

#[given("an existing relay storage account \"{name}\" in the target resource group")]
fn existing_relay(mut copy_context: CopyContext, name: String) -> CopyContext {
    copy_context.gateway = copy_context
        .gateway
        .with_storage_account(&name, TARGET_GROUP, "Standard");
    copy_context.relay_account = Some(name);
    copy_context
}

#[given("the relay copy stays pending for \"{polls}\" polls")]
fn relay_pending(copy_context: CopyContext, polls: usize) -> CopyContext {
    copy_context
        .gateway
        .script_copy_statuses(std::iter::repeat_n(BlobCopyStatus::Pending, polls));
    copy_context
}

#[given("the relay copy fails")]
fn relay_fails(copy_context: CopyContext) -> CopyContext {
    copy_context
        .gateway
        .script_copy_statuses([BlobCopyStatus::Pending, BlobCopyStatus::Failed]);
    copy_context
}

#[when("I copy the disk")]
fn copy_disk(copy_context: CopyContext) -> Result<CopyContext, StepError> {
    run_copy(copy_context)
}

#[when("I copy the disk again")]
fn copy_disk_again(copy_context: CopyContext) -> Result<CopyContext, StepError> {
    run_copy(copy_context)
}

fn run_copy(copy_context: CopyContext) -> Result<CopyContext, StepError> {
    let runtime = Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))?;
    let CopyContext {
        gateway,
        source,
        target,
        relay_account,
        ..
    } = copy_context;

    let (Some(source_locator), Some(target_locator)) = (source.clone(), target.clone()) else {
        return Err(StepError::Assertion(String::from(
            "scenario must set a source and a target",
        )));
    };
    let mut request = CopyRequest::new(source_locator, target_locator);
    if let Some(account) = relay_account.as_deref() {
        request = request.with_relay_account(account);
    }

    let orchestrator = CopyOrchestrator::new(gateway.clone(), &DiskCopyConfig::default())
        .with_poll_interval(Duration::from_millis(1));
    let result = runtime.block_on(async move { orchestrator.copy(&request).await });
    let outcome = match result {
        Ok(copied) => CopyOutcome::Success(Box::new(copied)),
        Err(err) => CopyOutcome::Failure(CopyFailure {
            kind: map_failure_kind(&err),
            message: err.to_string(),
        }),
    };

    Ok(CopyContext {
        gateway,
        source,
        target,
        relay_account,
        outcome: Some(outcome),
    })
}

#[then("the copy succeeds using the \"{strategy}\" strategy")]
fn copy_succeeds(copy_context: &CopyContext, strategy: String) -> Result<(), StepError> {
    let expected = match strategy.as_str() {
        "same-region" => RegionStrategy::SameRegion,
        "cross-region" => RegionStrategy::CrossRegion,
        other => {
            return Err(StepError::Assertion(format!("unknown strategy: {other}")));
        }
    };
    match &copy_context.outcome {
        Some(CopyOutcome::Success(result)) if result.strategy == expected => Ok(()),
        Some(CopyOutcome::Success(result)) => Err(StepError::Assertion(format!(
            "expected {expected} strategy, got {}",
            result.strategy
        ))),
        Some(CopyOutcome::Failure(failure)) => Err(StepError::Assertion(format!(
            "expected success, got failure: {}",
            failure.message
        ))),
        None => Err(StepError::Assertion(String::from("missing outcome"))),
    }
}

#[then("the copy error kind is \"{kind}\"")]
fn copy_error_kind(copy_context: &CopyContext, kind: String) -> Result<(), StepError> {
    let expected = parse_failure_kind(&kind)?;
    let Some(CopyOutcome::Failure(failure)) = &copy_context.outcome else {
        return Err(StepError::Assertion(String::from(
            "expected failure outcome",
        )));
    };
    if failure.kind == expected {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected failure kind {expected:?}, got {:?} ({})",
            failure.kind, failure.message
        )))
    }
}

#[then("a disk named \"{name}\" exists in the target resource group")]
fn disk_exists(copy_context: &CopyContext, name: String) -> Result<(), StepError> {
    let found = copy_context
        .gateway
        .disks()
        .iter()
        .any(|disk| disk.resource_group == TARGET_GROUP && disk.name == name);
    if found {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "disk {name} missing from {TARGET_GROUP}"
        )))
    }
}

#[then("the relay copy was polled \"{polls}\" times")]
fn relay_polled(copy_context: &CopyContext, polls: usize) -> Result<(), StepError> {
    let actual = copy_context.gateway.poll_count();
    if actual == polls {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {polls} polls, got {actual}"
        )))
    }
}

#[then("no transient resources remain")]
fn no_transient_resources(copy_context: &CopyContext) -> Result<(), StepError> {
    let gateway = &copy_context.gateway;
    let remaining =
        gateway.snapshot_count() + gateway.blob_snapshot_count() + gateway.sas_grant_count();
    if remaining == 0 {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "transient resources remain: {:?}",
            gateway.resource_ids()
        )))
    }
}

#[then("no relay storage account remains")]
fn no_relay_account(copy_context: &CopyContext) -> Result<(), StepError> {
    let leftover: Vec<String> = relay_accounts(&copy_context.gateway);
    if leftover.is_empty() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "relay accounts remain: {leftover:?}"
        )))
    }
}

#[then("the storage account \"{name}\" still exists")]
fn account_exists(copy_context: &CopyContext, name: String) -> Result<(), StepError> {
    if copy_context
        .gateway
        .storage_accounts()
        .iter()
        .any(|account| account.name == name)
    {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "storage account {name} was deleted"
        )))
    }
}

#[then("no relay blob remains in \"{name}\"")]
fn no_relay_blob(copy_context: &CopyContext, name: String) -> Result<(), StepError> {
    let prefix = format!("https://{name}.blob.");
    let leftover: Vec<String> = copy_context
        .gateway
        .blobs()
        .into_iter()
        .filter(|uri| uri.starts_with(&prefix))
        .collect();
    if leftover.is_empty() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "relay blobs remain: {leftover:?}"
        )))
    }
}

#[then("no gateway calls were made")]
fn no_gateway_calls(copy_context: &CopyContext) -> Result<(), StepError> {
    let calls = copy_context.gateway.calls();
    if calls.is_empty() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "unexpected gateway calls: {calls:?}"
        )))
    }
}

fn relay_accounts(gateway: &StubGateway) -> Vec<String> {
    gateway
        .storage_accounts()
        .into_iter()
        .filter(|account| account.name.starts_with(RELAY_PREFIX))
        .map(|account| account.name)
        .collect()
}

const fn map_failure_kind(err: &CopyError<StubGatewayError>) -> CopyFailureKind {
    match err {
        CopyError::UnsupportedCombination { .. } => CopyFailureKind::Unsupported,
        CopyError::NotFound { .. } => CopyFailureKind::NotFound,
        CopyError::AlreadyExists { .. } => CopyFailureKind::AlreadyExists,
        CopyError::CopyFailed { .. } => CopyFailureKind::CopyFailed,
        CopyError::Cancelled { .. } => CopyFailureKind::Cancelled,
        CopyError::Gateway { .. } => CopyFailureKind::Gateway,
    }
}

fn parse_failure_kind(kind: &str) -> Result<CopyFailureKind, StepError> {
    match kind {
        "unsupported" => Ok(CopyFailureKind::Unsupported),
        "not-found" => Ok(CopyFailureKind::NotFound),
        "already-exists" => Ok(CopyFailureKind::AlreadyExists),
        "copy-failed" => Ok(CopyFailureKind::CopyFailed),
        "cancelled" => Ok(CopyFailureKind::Cancelled),
        "gateway" => Ok(CopyFailureKind::Gateway),
        _ => Err(StepError::Assertion(format!(
            "unknown failure kind: {kind}"
        ))),
    }
}
