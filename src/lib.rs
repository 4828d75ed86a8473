//! Core library for the `diskcopy` Azure disk copy tool.
//!
//! The crate copies a VHD blob or a managed disk into a new managed disk,
//! within a region via a snapshot or across regions via a relay storage
//! account. The copy core talks to Azure only through the [`CloudGateway`]
//! trait; [`AzCliGateway`] implements it on top of the `az` CLI.

pub mod azure;
pub mod command;
pub mod config;
pub mod copy;
pub mod gateway;
pub mod locator;
pub mod logging;
pub mod sku;
pub mod test_support;

pub use azure::{AzCliError, AzCliGateway};
pub use command::{CommandError, CommandOutput, CommandRunner, ProcessCommandRunner};
pub use config::{ConfigError, DiskCopyConfig};
pub use copy::{
    CopyError, CopyOrchestrator, CopyRequest, CopyResult, CopyRoute, RegionStrategy,
    RequestArgs, RequestError, SourceLocator, TargetLocator,
};
pub use gateway::CloudGateway;
pub use locator::{BlobLocator, LocatorError};
pub use sku::{DiskSku, SkuError};
