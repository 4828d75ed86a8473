//! Command-line interface definitions for the `diskcopy` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `diskcopy` binary.
#[derive(Debug, Parser)]
#[command(
    name = "diskcopy",
    about = "Copy Azure VHD blobs and managed disks into new managed disks",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Copy a VHD blob or managed disk into a new managed disk.
    #[command(
        name = "copy",
        about = "Copy a VHD blob or managed disk into a new managed disk"
    )]
    Copy(CopyCommand),
}

/// Arguments for the `diskcopy copy` subcommand.
///
/// Exactly one source (a VHD URI, or a resource group plus disk name) and
/// one target (a resource group, or all three VHD flags) must be given.
#[derive(Debug, Default, Parser)]
pub(crate) struct CopyCommand {
    /// URI of the source VHD, `https://{account}.blob.core.windows.net/{container}/{blob}`.
    #[arg(long, value_name = "URI")]
    pub(crate) source_vhd_uri: Option<String>,
    /// Resource group of the source managed disk.
    #[arg(long, value_name = "GROUP")]
    pub(crate) source_resource_group: Option<String>,
    /// Name of the source managed disk.
    #[arg(long, value_name = "NAME")]
    pub(crate) source_disk_name: Option<String>,
    /// Storage account of the target VHD.
    #[arg(long, value_name = "ACCOUNT")]
    pub(crate) target_storage_account_name: Option<String>,
    /// Container of the target VHD.
    #[arg(long, value_name = "CONTAINER")]
    pub(crate) target_storage_container_name: Option<String>,
    /// Blob name of the target VHD.
    #[arg(long, value_name = "NAME")]
    pub(crate) target_vhd_name: Option<String>,
    /// Resource group that will own the new managed disk.
    #[arg(long, value_name = "GROUP")]
    pub(crate) target_resource_group: Option<String>,
    /// Name of the new managed disk.
    ///
    /// Defaults to the VHD blob name without its extension, or to the source
    /// disk name.
    #[arg(long, value_name = "NAME")]
    pub(crate) target_disk_name: Option<String>,
    /// SKU of the new disk, for example `Premium_LRS`.
    ///
    /// Defaults to `Premium_LRS` for premium sources and `Standard_LRS`
    /// otherwise.
    #[arg(long, value_name = "SKU")]
    pub(crate) sku: Option<String>,
    /// Existing storage account to relay cross-region copies through.
    ///
    /// The account is never deleted. Without it a temporary account is
    /// created in the target resource group and deleted afterwards.
    #[arg(long, value_name = "ACCOUNT")]
    pub(crate) temp_storage_account_name: Option<String>,
    /// Cancel the copy and clean up after this many seconds.
    #[arg(long, value_name = "SECONDS")]
    pub(crate) timeout_secs: Option<u64>,
}
