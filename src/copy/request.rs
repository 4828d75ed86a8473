//! Copy requests, their validation, and the result of a completed copy.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::gateway::Disk;
use crate::locator::{BlobLocator, LocatorError};
use crate::sku::{DiskSku, SkuError};

/// Where the data is copied from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SourceLocator {
    /// An unmanaged VHD page blob.
    Vhd {
        /// Parsed blob address.
        blob: BlobLocator,
    },
    /// A managed disk.
    ManagedDisk {
        /// Resource group that owns the disk.
        resource_group: String,
        /// Disk name.
        disk_name: String,
    },
}

impl SourceLocator {
    /// Returns the kind of this source.
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        match self {
            Self::Vhd { .. } => SourceKind::Vhd,
            Self::ManagedDisk { .. } => SourceKind::ManagedDisk,
        }
    }
}

/// Where the data is copied to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TargetLocator {
    /// A new managed disk.
    ManagedDisk {
        /// Resource group that will own the disk.
        resource_group: String,
        /// Disk name; derived from the source when absent.
        disk_name: Option<String>,
    },
    /// An unmanaged VHD blob. Accepted by the parser, rejected by the copy.
    Vhd {
        /// Destination storage account.
        storage_account: String,
        /// Destination container.
        container: String,
        /// Destination blob name.
        blob_name: String,
    },
}

impl TargetLocator {
    /// Returns the kind of this target.
    #[must_use]
    pub const fn kind(&self) -> TargetKind {
        match self {
            Self::ManagedDisk { .. } => TargetKind::ManagedDisk,
            Self::Vhd { .. } => TargetKind::Vhd,
        }
    }
}

/// Source kinds.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Unmanaged VHD blob.
    Vhd,
    /// Managed disk.
    ManagedDisk,
}

/// Target kinds.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// Unmanaged VHD blob.
    Vhd,
    /// Managed disk.
    ManagedDisk,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vhd => "VHD",
            Self::ManagedDisk => "Managed Disk",
        })
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vhd => "VHD",
            Self::ManagedDisk => "Managed Disk",
        })
    }
}

/// Source and target kind pairing. Every pairing is listed so dispatch stays
/// exhaustive; only the managed-disk targets are implemented.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CopyRoute {
    /// VHD blob to managed disk.
    VhdToManagedDisk,
    /// Managed disk to managed disk.
    ManagedDiskToManagedDisk,
    /// VHD blob to VHD blob.
    VhdToVhd,
    /// Managed disk to VHD blob.
    ManagedDiskToVhd,
}

impl CopyRoute {
    /// Pairs the kinds of a source and a target.
    #[must_use]
    pub const fn of(source: &SourceLocator, target: &TargetLocator) -> Self {
        match (source.kind(), target.kind()) {
            (SourceKind::Vhd, TargetKind::ManagedDisk) => Self::VhdToManagedDisk,
            (SourceKind::ManagedDisk, TargetKind::ManagedDisk) => Self::ManagedDiskToManagedDisk,
            (SourceKind::Vhd, TargetKind::Vhd) => Self::VhdToVhd,
            (SourceKind::ManagedDisk, TargetKind::Vhd) => Self::ManagedDiskToVhd,
        }
    }
}

/// Strategy chosen once source and target regions are known.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionStrategy {
    /// Snapshot then create, within one region.
    SameRegion,
    /// Snapshot, relay blob copy, then create in the target region.
    CrossRegion,
}

impl fmt::Display for RegionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SameRegion => "same-region",
            Self::CrossRegion => "cross-region",
        })
    }
}

/// A validated copy request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CopyRequest {
    /// Copy source.
    pub source: SourceLocator,
    /// Copy target.
    pub target: TargetLocator,
    /// SKU of the new disk; derived from the source tier when absent.
    pub sku: Option<DiskSku>,
    /// Existing storage account to relay cross-region copies through.
    pub relay_account: Option<String>,
}

impl CopyRequest {
    /// Creates a request without overrides.
    #[must_use]
    pub const fn new(source: SourceLocator, target: TargetLocator) -> Self {
        Self {
            source,
            target,
            sku: None,
            relay_account: None,
        }
    }

    /// Forces the SKU of the new disk.
    #[must_use]
    pub const fn with_sku(mut self, sku: DiskSku) -> Self {
        self.sku = Some(sku);
        self
    }

    /// Relays cross-region copies through an existing storage account.
    #[must_use]
    pub fn with_relay_account(mut self, account: impl Into<String>) -> Self {
        self.relay_account = Some(account.into());
        self
    }

    /// Builds a request from loose, optional arguments as a caller would
    /// supply them on the command line.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when the locators are missing, ambiguous, or
    /// incomplete, when the VHD URI does not parse, or when the SKU is
    /// unknown.
    pub fn from_args(args: RequestArgs) -> Result<Self, RequestError> {
        let source = source_from_args(&args)?;
        let target = target_from_args(&args)?;
        let mut request = Self::new(source, target);
        if let Some(sku) = args.sku.as_deref() {
            request.sku = Some(sku.parse()?);
        }
        request.relay_account =
            present(args.temp_storage_account_name.as_ref()).map(str::to_owned);
        Ok(request)
    }
}

/// Loose request arguments, mirroring the command-line flags.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RequestArgs {
    /// `--source-vhd-uri`.
    pub source_vhd_uri: Option<String>,
    /// `--source-resource-group`.
    pub source_resource_group: Option<String>,
    /// `--source-disk-name`.
    pub source_disk_name: Option<String>,
    /// `--target-storage-account-name`.
    pub target_storage_account_name: Option<String>,
    /// `--target-storage-container-name`.
    pub target_storage_container_name: Option<String>,
    /// `--target-vhd-name`.
    pub target_vhd_name: Option<String>,
    /// `--target-resource-group`.
    pub target_resource_group: Option<String>,
    /// `--target-disk-name`.
    pub target_disk_name: Option<String>,
    /// `--sku`.
    pub sku: Option<String>,
    /// `--temp-storage-account-name`.
    pub temp_storage_account_name: Option<String>,
}

/// Errors raised while turning arguments into a [`CopyRequest`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RequestError {
    /// Raised when the locator flags do not describe exactly one source and
    /// one target.
    #[error("{0}")]
    Invalid(&'static str),
    /// Raised when the VHD URI cannot be parsed.
    #[error(transparent)]
    Locator(#[from] LocatorError),
    /// Raised when the SKU override is unknown.
    #[error(transparent)]
    Sku(#[from] SkuError),
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|trimmed| !trimmed.is_empty())
}

fn source_from_args(args: &RequestArgs) -> Result<SourceLocator, RequestError> {
    let vhd = present(args.source_vhd_uri.as_ref());
    let group = present(args.source_resource_group.as_ref());
    let disk = present(args.source_disk_name.as_ref());

    if vhd.is_some() && (group.is_some() || disk.is_some()) {
        return Err(RequestError::Invalid(
            "Only one source can be specified (VHD blob or Managed Disk)",
        ));
    }
    if let Some(uri) = vhd {
        return Ok(SourceLocator::Vhd {
            blob: BlobLocator::parse(uri)?,
        });
    }
    match (group, disk) {
        (Some(resource_group), Some(disk_name)) => Ok(SourceLocator::ManagedDisk {
            resource_group: resource_group.to_owned(),
            disk_name: disk_name.to_owned(),
        }),
        (None, None) => Err(RequestError::Invalid(
            "You must specify a source (VHD or Managed Disk) to copy",
        )),
        _ => Err(RequestError::Invalid(
            "You must specify both --source-resource-group and --source-disk-name when using a Managed Disk source",
        )),
    }
}

fn target_from_args(args: &RequestArgs) -> Result<TargetLocator, RequestError> {
    let account = present(args.target_storage_account_name.as_ref());
    let container_name = present(args.target_storage_container_name.as_ref());
    let vhd = present(args.target_vhd_name.as_ref());
    let group = present(args.target_resource_group.as_ref());
    let disk = present(args.target_disk_name.as_ref());

    let wants_vhd = account.is_some() || container_name.is_some() || vhd.is_some();
    let wants_disk = group.is_some() || disk.is_some();
    if wants_vhd && wants_disk {
        return Err(RequestError::Invalid(
            "Only one target can be specified (VHD blob or Managed Disk)",
        ));
    }
    if wants_vhd {
        let (Some(storage_account), Some(container), Some(blob_name)) = (account, container_name, vhd)
        else {
            return Err(RequestError::Invalid(
                "You must specify --target-storage-account-name, --target-storage-container-name, and --target-vhd-name when using a VHD target",
            ));
        };
        return Ok(TargetLocator::Vhd {
            storage_account: storage_account.to_owned(),
            container: container.to_owned(),
            blob_name: blob_name.to_owned(),
        });
    }
    match group {
        Some(resource_group) => Ok(TargetLocator::ManagedDisk {
            resource_group: resource_group.to_owned(),
            disk_name: disk.map(str::to_owned),
        }),
        None => Err(RequestError::Invalid(
            "You must specify a target (VHD or Managed Disk)",
        )),
    }
}

/// Outcome of a completed copy.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CopyResult {
    /// The disk that was created.
    pub disk: Disk,
    /// SKU the disk was created with.
    pub sku: DiskSku,
    /// Kind pairing that was copied.
    pub route: CopyRoute,
    /// Strategy used to move the data.
    pub strategy: RegionStrategy,
    /// Transient resources released after the copy.
    pub released: Vec<String>,
    /// Transient resources that could not be released and need manual
    /// cleanup.
    pub leaked: Vec<String>,
}
