//! BDD scenarios for the copy workflow.

use rstest_bdd_macros::scenario;

use super::test_helpers::{CopyContextResult, copy_context_result};

#[scenario(
    path = "tests/features/disk_copy.feature",
    name = "Copy a managed disk within one region"
)]
fn scenario_same_region(copy_context_result: CopyContextResult) {
    drop(copy_context_result);
}

#[scenario(
    path = "tests/features/disk_copy.feature",
    name = "Copy a managed disk across regions through a relay account"
)]
fn scenario_cross_region(copy_context_result: CopyContextResult) {
    drop(copy_context_result);
}

#[scenario(
    path = "tests/features/disk_copy.feature",
    name = "Copy a VHD blob across regions"
)]
fn scenario_cross_region_vhd(copy_context_result: CopyContextResult) {
    drop(copy_context_result);
}

#[scenario(
    path = "tests/features/disk_copy.feature",
    name = "Keep a caller-supplied relay account"
)]
fn scenario_caller_relay(copy_context_result: CopyContextResult) {
    drop(copy_context_result);
}

#[scenario(
    path = "tests/features/disk_copy.feature",
    name = "Refuse to overwrite a disk created by an earlier copy"
)]
fn scenario_already_exists(copy_context_result: CopyContextResult) {
    drop(copy_context_result);
}

#[scenario(
    path = "tests/features/disk_copy.feature",
    name = "Release every transient resource when the relay copy fails"
)]
fn scenario_copy_failed(copy_context_result: CopyContextResult) {
    drop(copy_context_result);
}

#[scenario(
    path = "tests/features/disk_copy.feature",
    name = "Reject a VHD target before touching any resource"
)]
fn scenario_vhd_target(copy_context_result: CopyContextResult) {
    drop(copy_context_result);
}
