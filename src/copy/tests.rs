//! Unit tests for the copy orchestrator.

use std::time::Duration;

use rstest::{fixture, rstest};
use tokio_util::sync::CancellationToken;

use super::*;
use crate::gateway::BlobCopyStatus;
use crate::test_support::{StubGateway, StubGatewayError};

const SOURCE_VHD: &str = "https://srcacct.blob.core.windows.net/vhds/os-disk.vhd";

#[fixture]
fn stub() -> StubGateway {
    StubGateway::new()
        .with_resource_group("src-rg", "westeurope")
        .with_resource_group("near-rg", "WestEurope")
        .with_resource_group("far-rg", "eastus")
        .with_storage_account("srcacct", "src-rg", "Premium")
        .with_disk("src-rg", "data", DiskSku::PremiumLrs)
}

fn orchestrator(stub: &StubGateway) -> CopyOrchestrator<StubGateway> {
    CopyOrchestrator::new(stub.clone(), &DiskCopyConfig::default())
        .with_poll_interval(Duration::from_millis(1))
}

fn disk_source() -> SourceLocator {
    SourceLocator::ManagedDisk {
        resource_group: String::from("src-rg"),
        disk_name: String::from("data"),
    }
}

fn vhd_source() -> SourceLocator {
    SourceLocator::Vhd {
        blob: BlobLocator::parse(SOURCE_VHD).expect("fixture uri should parse"),
    }
}

fn disk_target(resource_group: &str) -> TargetLocator {
    TargetLocator::ManagedDisk {
        resource_group: resource_group.to_owned(),
        disk_name: None,
    }
}

fn transient_count(stub: &StubGateway) -> usize {
    stub.snapshot_count() + stub.blob_snapshot_count() + stub.sas_grant_count()
}

#[rstest]
#[case(vhd_source(), SourceKind::Vhd)]
#[case(disk_source(), SourceKind::ManagedDisk)]
#[tokio::test]
async fn vhd_target_is_rejected_before_any_call(
    stub: StubGateway,
    #[case] source: SourceLocator,
    #[case] kind: SourceKind,
) {
    let request = CopyRequest::new(
        source,
        TargetLocator::Vhd {
            storage_account: String::from("dstacct"),
            container: String::from("vhds"),
            blob_name: String::from("copy.vhd"),
        },
    );

    let err = orchestrator(&stub)
        .copy(&request)
        .await
        .expect_err("vhd target should be rejected");
    assert!(
        matches!(
            err,
            CopyError::UnsupportedCombination { from, to: TargetKind::Vhd } if from == kind
        ),
        "unexpected error: {err}"
    );
    assert!(err.to_string().contains("not implemented"));
    assert!(stub.calls().is_empty(), "calls: {:?}", stub.calls());
}

#[rstest]
#[tokio::test]
async fn same_region_disk_copy_leaves_one_disk_and_no_snapshots(stub: StubGateway) {
    let request = CopyRequest::new(disk_source(), disk_target("near-rg"));

    let result = orchestrator(&stub).copy(&request).await.expect("copy");

    assert_eq!(result.strategy, RegionStrategy::SameRegion);
    assert_eq!(result.route, CopyRoute::ManagedDiskToManagedDisk);
    assert_eq!(result.disk.name, "data");
    assert_eq!(result.disk.resource_group, "near-rg");
    assert_eq!(result.sku, DiskSku::PremiumLrs);
    assert_eq!(result.released.len(), 1);
    assert!(result.leaked.is_empty());
    assert_eq!(stub.disks().len(), 2);
    assert_eq!(transient_count(&stub), 0);
    assert_eq!(stub.poll_count(), 0);
}

#[rstest]
#[tokio::test]
async fn same_region_vhd_copy_derives_name_and_sku(stub: StubGateway) {
    let request = CopyRequest::new(vhd_source(), disk_target("src-rg"));

    let result = orchestrator(&stub).copy(&request).await.expect("copy");

    assert_eq!(result.disk.name, "os-disk");
    assert_eq!(result.sku, DiskSku::PremiumLrs);
    assert!(stub.calls().iter().any(|call| call == "create_snapshot_from_blob"));
    assert_eq!(transient_count(&stub), 0);
}

#[rstest]
#[tokio::test]
async fn cross_region_disk_copy_polls_until_success_and_cleans_up(stub: StubGateway) {
    stub.script_copy_statuses([BlobCopyStatus::Pending, BlobCopyStatus::Pending]);
    let request = CopyRequest::new(disk_source(), disk_target("far-rg"));

    let result = orchestrator(&stub).copy(&request).await.expect("copy");

    assert_eq!(result.strategy, RegionStrategy::CrossRegion);
    assert_eq!(result.disk.location, "eastus");
    assert_eq!(stub.poll_count(), 3);
    assert_eq!(result.released.len(), 3);
    assert_eq!(transient_count(&stub), 0);
    assert_eq!(stub.storage_accounts().len(), 1, "only the source account remains");
    assert!(stub.blobs().is_empty(), "relay blob left: {:?}", stub.blobs());
    assert_eq!(stub.disks().len(), 2);
}

#[rstest]
#[tokio::test]
async fn cross_region_vhd_copy_uses_blob_snapshot(stub: StubGateway) {
    let request = CopyRequest::new(vhd_source(), disk_target("far-rg"));

    let result = orchestrator(&stub).copy(&request).await.expect("copy");

    assert_eq!(result.disk.name, "os-disk");
    let calls = stub.calls();
    assert!(calls.iter().any(|call| call == "create_blob_snapshot"));
    assert!(!calls.iter().any(|call| call == "grant_snapshot_access"));
    assert!(calls.iter().any(|call| call == "delete_blob_snapshot"));
    assert_eq!(transient_count(&stub), 0);
}

#[rstest]
#[tokio::test]
async fn caller_supplied_relay_account_is_kept(#[from(stub)] base: StubGateway) {
    let stub = base.with_storage_account("relay01", "far-rg", "Standard");
    let request =
        CopyRequest::new(disk_source(), disk_target("far-rg")).with_relay_account("relay01");

    let result = orchestrator(&stub).copy(&request).await.expect("copy");

    assert!(!stub.calls().iter().any(|call| call == "create_storage_account"));
    assert!(stub.storage_accounts().iter().any(|account| account.name == "relay01"));
    assert!(!result.released.iter().any(|id| id.ends_with("/relay01")));
    assert!(stub.blobs().is_empty(), "relay blob left: {:?}", stub.blobs());
    assert!(
        result
            .released
            .iter()
            .any(|id| id.starts_with("https://relay01.blob.core.windows.net/")),
        "released: {:?}",
        result.released
    );
    let calls = stub.calls();
    let blob_delete = calls.iter().position(|call| call == "delete_blob");
    let disk_create = calls.iter().position(|call| call == "create_disk_from_blob");
    assert!(disk_create < blob_delete, "calls: {calls:?}");
}

#[rstest]
#[tokio::test]
async fn relay_blob_delete_failure_is_reported(#[from(stub)] base: StubGateway) {
    let stub = base.with_storage_account("relay01", "far-rg", "Standard");
    stub.fail_on("delete_blob");
    let request =
        CopyRequest::new(disk_source(), disk_target("far-rg")).with_relay_account("relay01");

    let result = orchestrator(&stub).copy(&request).await.expect("copy");

    let [leaked] = result.leaked.as_slice() else {
        panic!("expected one leaked resource: {:?}", result.leaked);
    };
    assert!(leaked.starts_with("https://relay01.blob.core.windows.net/"));
    assert_eq!(stub.blobs().len(), 1);
    assert_eq!(transient_count(&stub), 0);
}

#[rstest]
#[tokio::test]
async fn missing_relay_account_fails_and_releases_snapshot(stub: StubGateway) {
    let request =
        CopyRequest::new(disk_source(), disk_target("far-rg")).with_relay_account("nosuch");

    let err = orchestrator(&stub)
        .copy(&request)
        .await
        .expect_err("missing relay account should fail");

    assert!(
        matches!(err, CopyError::NotFound { resource: "storage account", ref name } if name == "nosuch"),
        "unexpected error: {err}"
    );
    assert_eq!(transient_count(&stub), 0);
}

#[rstest]
#[tokio::test]
async fn existing_target_is_never_overwritten(stub: StubGateway) {
    let request = CopyRequest::new(disk_source(), disk_target("src-rg"));

    let err = orchestrator(&stub)
        .copy(&request)
        .await
        .expect_err("copy onto the source name should fail");

    assert!(matches!(err, CopyError::AlreadyExists { .. }), "unexpected error: {err}");
    assert!(!stub.calls().iter().any(|call| call.starts_with("create_")));
}

#[rstest]
#[case::source_group(
    SourceLocator::ManagedDisk { resource_group: String::from("nosuch-rg"), disk_name: String::from("data") },
    "resource group"
)]
#[case::source_disk(
    SourceLocator::ManagedDisk { resource_group: String::from("src-rg"), disk_name: String::from("nosuch") },
    "disk"
)]
#[case::source_account(
    SourceLocator::Vhd { blob: BlobLocator::new("nosuch", "vhds", "os.vhd") },
    "storage account"
)]
#[tokio::test]
async fn missing_source_is_not_found(
    stub: StubGateway,
    #[case] source: SourceLocator,
    #[case] expected: &str,
) {
    let request = CopyRequest::new(source, disk_target("near-rg"));

    let err = orchestrator(&stub)
        .copy(&request)
        .await
        .expect_err("missing source should fail");

    assert!(
        matches!(err, CopyError::NotFound { resource, .. } if resource == expected),
        "unexpected error: {err}"
    );
}

#[rstest]
#[tokio::test]
async fn missing_target_group_is_not_found(stub: StubGateway) {
    let request = CopyRequest::new(disk_source(), disk_target("nosuch-rg"));

    let err = orchestrator(&stub)
        .copy(&request)
        .await
        .expect_err("missing target group should fail");

    assert!(
        matches!(err, CopyError::NotFound { resource: "resource group", .. }),
        "unexpected error: {err}"
    );
}

#[rstest]
#[case(BlobCopyStatus::Failed)]
#[case(BlobCopyStatus::Aborted)]
#[tokio::test]
async fn failed_relay_copy_releases_everything(stub: StubGateway, #[case] status: BlobCopyStatus) {
    stub.script_copy_statuses([BlobCopyStatus::Pending, status]);
    let request = CopyRequest::new(disk_source(), disk_target("far-rg"));

    let err = orchestrator(&stub)
        .copy(&request)
        .await
        .expect_err("relay copy should fail");

    assert!(
        matches!(err, CopyError::CopyFailed { status: reported, .. } if reported == status),
        "unexpected error: {err}"
    );
    assert_eq!(stub.poll_count(), 2);
    assert_eq!(transient_count(&stub), 0);
    assert_eq!(stub.storage_accounts().len(), 1);
    assert_eq!(stub.disks().len(), 1);
}

#[rstest]
#[tokio::test]
async fn disk_creation_failure_still_deletes_snapshot(stub: StubGateway) {
    stub.fail_on("create_disk_from_snapshot");
    let request = CopyRequest::new(disk_source(), disk_target("near-rg"));

    let err = orchestrator(&stub)
        .copy(&request)
        .await
        .expect_err("disk creation should fail");

    assert!(
        matches!(
            err,
            CopyError::Gateway { operation: "create disk from snapshot", source: StubGatewayError::Injected(_) }
        ),
        "unexpected error: {err}"
    );
    assert_eq!(stub.snapshot_count(), 0);
}

#[rstest]
#[tokio::test]
async fn cleanup_failure_does_not_mask_primary_error(stub: StubGateway) {
    stub.fail_on("create_disk_from_snapshot");
    stub.fail_on("delete_resource");
    let request = CopyRequest::new(disk_source(), disk_target("near-rg"));

    let err = orchestrator(&stub)
        .copy(&request)
        .await
        .expect_err("disk creation should fail");

    assert!(
        matches!(err, CopyError::Gateway { operation: "create disk from snapshot", .. }),
        "unexpected error: {err}"
    );
    assert_eq!(stub.snapshot_count(), 1, "the snapshot leaked");
}

#[rstest]
#[tokio::test]
async fn cleanup_failure_after_success_is_reported(stub: StubGateway) {
    stub.fail_on("revoke_snapshot_access");
    let request = CopyRequest::new(disk_source(), disk_target("far-rg"));

    let result = orchestrator(&stub).copy(&request).await.expect("copy");

    assert_eq!(result.leaked.len(), 1);
    assert_eq!(result.released.len(), 2);
    assert_eq!(stub.sas_grant_count(), 1);
}

fn assert_cancelled_at(err: &CopyError<StubGatewayError>, expected: &str) {
    assert!(
        matches!(err, CopyError::Cancelled { stage } if *stage == expected),
        "unexpected error: {err}"
    );
}

#[rstest]
#[tokio::test]
async fn cancellation_stops_polling_and_releases(stub: StubGateway) {
    stub.script_copy_statuses([BlobCopyStatus::Pending; 10]);
    let token = CancellationToken::new();
    stub.cancel_on("blob_copy_state", &token);
    let request = CopyRequest::new(disk_source(), disk_target("far-rg"));

    let err = orchestrator(&stub)
        .copy_with_cancellation(&request, &token)
        .await
        .expect_err("copy should be cancelled");

    assert_cancelled_at(&err, "waiting for the relay copy");
    assert_eq!(stub.poll_count(), 1);
    assert_eq!(transient_count(&stub), 0);
    assert_eq!(stub.storage_accounts().len(), 1);
    assert!(stub.blobs().is_empty());
    assert_eq!(stub.disks().len(), 1);
}

#[rstest]
#[case::same_region("near-rg")]
#[case::cross_region("far-rg")]
#[tokio::test]
async fn cancelled_token_stops_before_any_resource_is_created(
    stub: StubGateway,
    #[case] target_group: &str,
) {
    let token = CancellationToken::new();
    token.cancel();
    let request = CopyRequest::new(disk_source(), disk_target(target_group));

    let err = orchestrator(&stub)
        .copy_with_cancellation(&request, &token)
        .await
        .expect_err("copy should be cancelled");

    assert_cancelled_at(&err, "planning the copy");
    let calls = stub.calls();
    assert!(!calls.iter().any(|call| call.starts_with("create_")), "calls: {calls:?}");
    assert_eq!(stub.disks().len(), 1);
}

#[rstest]
#[case::disk_source(disk_source(), "create_snapshot_from_disk")]
#[case::vhd_source(vhd_source(), "create_snapshot_from_blob")]
#[tokio::test]
async fn same_region_cancellation_after_snapshot_skips_disk_creation(
    stub: StubGateway,
    #[case] source: SourceLocator,
    #[case] trigger: &str,
) {
    let token = CancellationToken::new();
    stub.cancel_on(trigger, &token);
    let request = CopyRequest::new(source, disk_target("near-rg"));

    let err = orchestrator(&stub)
        .copy_with_cancellation(&request, &token)
        .await
        .expect_err("copy should be cancelled");

    assert_cancelled_at(&err, "creating the target disk");
    assert!(!stub.calls().iter().any(|call| call == "create_disk_from_snapshot"));
    assert_eq!(stub.snapshot_count(), 0);
    assert_eq!(stub.disks().len(), 1);
}

#[rstest]
#[case::after_source_snapshot(
    "grant_snapshot_access",
    "preparing the relay account",
    "create_storage_account"
)]
#[case::after_relay_account("create_blob_container", "starting the relay copy", "start_blob_copy")]
#[case::after_relay_copy("start_blob_copy", "creating the target disk", "create_disk_from_blob")]
#[tokio::test]
async fn cross_region_cancellation_between_steps_releases_everything(
    stub: StubGateway,
    #[case] trigger: &str,
    #[case] stage: &str,
    #[case] skipped: &str,
) {
    let token = CancellationToken::new();
    stub.cancel_on(trigger, &token);
    let request = CopyRequest::new(disk_source(), disk_target("far-rg"));

    let err = orchestrator(&stub)
        .copy_with_cancellation(&request, &token)
        .await
        .expect_err("copy should be cancelled");

    assert_cancelled_at(&err, stage);
    let calls = stub.calls();
    assert!(!calls.iter().any(|call| call == skipped), "calls: {calls:?}");
    assert_eq!(transient_count(&stub), 0);
    assert_eq!(stub.storage_accounts().len(), 1, "only the source account remains");
    assert!(stub.blobs().is_empty());
    assert_eq!(stub.disks().len(), 1);
}

#[rstest]
#[tokio::test]
async fn cancelled_copy_removes_relay_blob_from_caller_account(#[from(stub)] base: StubGateway) {
    let stub = base.with_storage_account("relay01", "far-rg", "Standard");
    let token = CancellationToken::new();
    stub.cancel_on("blob_copy_state", &token);
    let request =
        CopyRequest::new(disk_source(), disk_target("far-rg")).with_relay_account("relay01");

    let err = orchestrator(&stub)
        .copy_with_cancellation(&request, &token)
        .await
        .expect_err("copy should be cancelled");

    assert_cancelled_at(&err, "creating the target disk");
    assert!(stub.blobs().is_empty(), "relay blob left: {:?}", stub.blobs());
    assert!(stub.storage_accounts().iter().any(|account| account.name == "relay01"));
    assert_eq!(transient_count(&stub), 0);
}

#[rstest]
#[tokio::test]
async fn sku_override_wins(stub: StubGateway) {
    let request = CopyRequest::new(disk_source(), disk_target("near-rg"))
        .with_sku(DiskSku::StandardSsdLrs);

    let result = orchestrator(&stub).copy(&request).await.expect("copy");

    assert_eq!(result.sku, DiskSku::StandardSsdLrs);
    assert_eq!(result.disk.sku.as_deref(), Some("StandardSSD_LRS"));
}

#[rstest]
#[tokio::test]
async fn explicit_target_name_is_used(stub: StubGateway) {
    let request = CopyRequest::new(
        disk_source(),
        TargetLocator::ManagedDisk {
            resource_group: String::from("src-rg"),
            disk_name: Some(String::from("data-copy")),
        },
    );

    let result = orchestrator(&stub).copy(&request).await.expect("copy");

    assert_eq!(result.disk.name, "data-copy");
}

#[test]
fn disk_tier_falls_back_to_sku_name() {
    let source = ResolvedSource::ManagedDisk {
        disk: Disk {
            id: String::from("/disk"),
            name: String::from("data"),
            resource_group: String::from("rg"),
            location: String::from("westeurope"),
            sku: Some(String::from("Premium_LRS")),
            tier: None,
        },
    };
    assert_eq!(source.tier(), Some("Premium"));
}

#[test]
fn relay_account_names_fit_storage_limits() {
    let name = relay_account_name("diskcopy");
    assert!(name.starts_with("diskcopy"));
    assert_eq!(name.len(), MAX_STORAGE_ACCOUNT_NAME_LEN);
    assert!(name.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit()));
    assert_ne!(name, relay_account_name("diskcopy"));
}

#[test]
fn snapshot_names_are_unique() {
    let first = snapshot_name("data");
    assert!(first.starts_with("data-diskcopy-"));
    assert_ne!(first, snapshot_name("data"));
}
