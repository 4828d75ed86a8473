//! Cloud resource gateway consumed by the copy core.
//!
//! The gateway exposes the handful of Azure control-plane and data-plane
//! calls the copy strategies need. Lookups return `Option` so absence is a
//! value rather than a provider-specific error; every other failure is the
//! implementation's own error type and is surfaced unchanged by the core.

use std::future::Future;
use std::pin::Pin;

mod types;

pub use types::{
    BlobCopySource, BlobCopyState, BlobCopyStatus, BlobDestination, Disk, DiskSpec,
    ResourceGroup, Snapshot, StorageAccount,
};

use crate::locator::BlobLocator;

/// Future returned by gateway operations.
pub type GatewayFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Interface implemented by cloud gateways.
pub trait CloudGateway: Send + Sync {
    /// Provider specific error type returned by the gateway.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Looks up a resource group by name.
    fn resource_group<'a>(
        &'a self,
        name: &'a str,
    ) -> GatewayFuture<'a, Option<ResourceGroup>, Self::Error>;

    /// Looks up a storage account by name across the subscription.
    fn storage_account<'a>(
        &'a self,
        name: &'a str,
    ) -> GatewayFuture<'a, Option<StorageAccount>, Self::Error>;

    /// Looks up a managed disk.
    fn disk<'a>(
        &'a self,
        resource_group: &'a str,
        name: &'a str,
    ) -> GatewayFuture<'a, Option<Disk>, Self::Error>;

    /// Creates a managed snapshot of an unmanaged blob.
    fn create_snapshot_from_blob<'a>(
        &'a self,
        name: &'a str,
        resource_group: &'a str,
        blob: &'a BlobLocator,
        storage_account_id: &'a str,
    ) -> GatewayFuture<'a, Snapshot, Self::Error>;

    /// Creates a managed snapshot of a managed disk.
    fn create_snapshot_from_disk<'a>(
        &'a self,
        name: &'a str,
        resource_group: &'a str,
        disk_id: &'a str,
    ) -> GatewayFuture<'a, Snapshot, Self::Error>;

    /// Creates a managed disk from a managed snapshot.
    fn create_disk_from_snapshot<'a>(
        &'a self,
        snapshot_id: &'a str,
        spec: &'a DiskSpec,
    ) -> GatewayFuture<'a, Disk, Self::Error>;

    /// Creates a managed disk from an unmanaged blob.
    fn create_disk_from_blob<'a>(
        &'a self,
        blob: &'a BlobLocator,
        storage_account_id: &'a str,
        spec: &'a DiskSpec,
    ) -> GatewayFuture<'a, Disk, Self::Error>;

    /// Creates a standard, HTTPS-only, blob-encrypted storage account, or
    /// returns the existing one with the same name.
    fn create_storage_account<'a>(
        &'a self,
        name: &'a str,
        resource_group: &'a str,
    ) -> GatewayFuture<'a, StorageAccount, Self::Error>;

    /// Returns the primary access key of a storage account.
    fn storage_account_key<'a>(
        &'a self,
        resource_group: &'a str,
        account: &'a str,
    ) -> GatewayFuture<'a, String, Self::Error>;

    /// Creates a blob container if it does not exist yet.
    fn create_blob_container<'a>(
        &'a self,
        account: &'a str,
        account_key: &'a str,
        container: &'a str,
    ) -> GatewayFuture<'a, (), Self::Error>;

    /// Takes a point-in-time blob snapshot and returns its snapshot token.
    fn create_blob_snapshot<'a>(
        &'a self,
        blob: &'a BlobLocator,
        account_key: &'a str,
    ) -> GatewayFuture<'a, String, Self::Error>;

    /// Deletes a blob snapshot, leaving the base blob intact.
    fn delete_blob_snapshot<'a>(
        &'a self,
        blob: &'a BlobLocator,
        account_key: &'a str,
        snapshot: &'a str,
    ) -> GatewayFuture<'a, (), Self::Error>;

    /// Deletes a blob.
    fn delete_blob<'a>(
        &'a self,
        blob: &'a BlobLocator,
        account_key: &'a str,
    ) -> GatewayFuture<'a, (), Self::Error>;

    /// Starts an asynchronous server-side blob copy.
    fn start_blob_copy<'a>(
        &'a self,
        source: &'a BlobCopySource,
        destination: &'a BlobDestination,
    ) -> GatewayFuture<'a, (), Self::Error>;

    /// Reads the copy status of a destination blob.
    fn blob_copy_state<'a>(
        &'a self,
        destination: &'a BlobDestination,
    ) -> GatewayFuture<'a, BlobCopyState, Self::Error>;

    /// Grants time-boxed read access to a snapshot and returns the SAS URL.
    fn grant_snapshot_access<'a>(
        &'a self,
        snapshot_id: &'a str,
        duration_secs: u64,
    ) -> GatewayFuture<'a, String, Self::Error>;

    /// Revokes every SAS grant on a snapshot.
    fn revoke_snapshot_access<'a>(
        &'a self,
        snapshot_id: &'a str,
    ) -> GatewayFuture<'a, (), Self::Error>;

    /// Deletes a resource by its resource ID.
    fn delete_resource<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, (), Self::Error>;
}
