//! Azure gateway implemented by shelling out to the `az` CLI.
//!
//! Every call runs `az <group> <command> ... --output json` through a
//! [`CommandRunner`], so tests drive the gateway with scripted output instead
//! of a live subscription. Lookups list resources and filter locally, which
//! turns absence into `None` without parsing provider error text.

use std::ffi::OsString;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::command::{CommandOutput, CommandRunner, ProcessCommandRunner};
use crate::config::DiskCopyConfig;
use crate::gateway::{
    BlobCopySource, BlobCopyState, BlobCopyStatus, BlobDestination, CloudGateway, Disk, DiskSpec,
    GatewayFuture, ResourceGroup, Snapshot, StorageAccount,
};
use crate::locator::BlobLocator;

mod error;
mod types;

pub use error::AzCliError;
use types::{
    AzAccessGrant, AzAccountKey, AzBlob, AzBlobSnapshot, AzDisk, AzResourceGroup, AzSnapshot,
    AzStorageAccount,
};

/// SKU used for relay storage accounts.
pub const RELAY_ACCOUNT_SKU: &str = "Standard_LRS";

/// Gateway that drives Azure through the `az` CLI.
#[derive(Clone, Debug)]
pub struct AzCliGateway<R: CommandRunner> {
    config: DiskCopyConfig,
    runner: R,
}

impl AzCliGateway<ProcessCommandRunner> {
    /// Creates a gateway wired to the real process runner.
    ///
    /// # Errors
    ///
    /// Returns [`AzCliError::Config`] when configuration validation fails.
    pub fn with_process_runner(config: DiskCopyConfig) -> Result<Self, AzCliError> {
        Self::new(config, ProcessCommandRunner)
    }
}

impl<R: CommandRunner> AzCliGateway<R> {
    /// Creates a gateway using the provided configuration and runner.
    ///
    /// # Errors
    ///
    /// Returns [`AzCliError::Config`] when configuration validation fails.
    pub fn new(config: DiskCopyConfig, runner: R) -> Result<Self, AzCliError> {
        config.validate()?;
        Ok(Self { config, runner })
    }

    /// Builds the argument vector for one `az` invocation, appending JSON
    /// output and the configured subscription.
    fn build_args(&self, parts: &[&str]) -> Vec<OsString> {
        let mut args: Vec<OsString> = parts.iter().map(OsString::from).collect();
        if let Some(subscription) = self.config.subscription.as_deref() {
            args.push(OsString::from("--subscription"));
            args.push(OsString::from(subscription));
        }
        args.push(OsString::from("--output"));
        args.push(OsString::from("json"));
        args
    }

    /// Like [`Self::build_args`] but tags the created resource.
    fn build_create_args(&self, parts: &[&str]) -> Vec<OsString> {
        let mut tagged: Vec<&str> = parts.to_vec();
        tagged.push("--tags");
        tagged.push(&self.config.created_by_tag);
        self.build_args(&tagged)
    }

    /// Checks command output and converts failure to `AzCliError`.
    fn check_az_output(
        &self,
        output: CommandOutput,
        resource: &str,
    ) -> Result<CommandOutput, AzCliError> {
        if output.is_success() {
            return Ok(output);
        }

        Err(AzCliError::CommandFailure {
            program: self.config.az_bin.clone(),
            status: output.code,
            status_text: output.status_text(),
            stderr: format!("{resource}: {}", output.stderr.trim()),
        })
    }

    fn run_az(&self, args: &[OsString], resource: &str) -> Result<CommandOutput, AzCliError> {
        debug!(resource, "running az");
        let output = self.runner.run(&self.config.az_bin, args)?;
        self.check_az_output(output, resource)
    }

    fn run_az_json<T>(&self, args: &[OsString], resource: &str) -> Result<T, AzCliError>
    where
        T: DeserializeOwned,
    {
        let output = self.run_az(args, resource)?;
        serde_json::from_str::<T>(&output.stdout).map_err(|err| AzCliError::Parse {
            resource: resource.to_owned(),
            message: err.to_string(),
        })
    }

    fn find_resource_group(&self, name: &str) -> Result<Option<ResourceGroup>, AzCliError> {
        let args = self.build_args(&["group", "list"]);
        let groups: Vec<AzResourceGroup> = self.run_az_json(&args, "resource groups")?;
        Ok(groups
            .into_iter()
            .find(|group| group.name.eq_ignore_ascii_case(name))
            .map(ResourceGroup::from))
    }

    fn find_storage_account(&self, name: &str) -> Result<Option<StorageAccount>, AzCliError> {
        let args = self.build_args(&["storage", "account", "list"]);
        let accounts: Vec<AzStorageAccount> = self.run_az_json(&args, "storage accounts")?;
        Ok(accounts
            .into_iter()
            .find(|account| account.name.eq_ignore_ascii_case(name))
            .map(StorageAccount::from))
    }

    fn find_disk(&self, resource_group: &str, name: &str) -> Result<Option<Disk>, AzCliError> {
        let args = self.build_args(&["disk", "list", "--resource-group", resource_group]);
        let disks: Vec<AzDisk> = self.run_az_json(&args, "disks")?;
        Ok(disks
            .into_iter()
            .find(|disk| disk.name.eq_ignore_ascii_case(name))
            .map(Disk::from))
    }

    fn snapshot_create(&self, parts: &[&str]) -> Result<Snapshot, AzCliError> {
        let args = self.build_create_args(parts);
        let snapshot: AzSnapshot = self.run_az_json(&args, "snapshot create")?;
        Ok(snapshot.into())
    }

    fn disk_create(&self, spec: &DiskSpec, source: &[&str]) -> Result<Disk, AzCliError> {
        let mut parts = vec![
            "disk",
            "create",
            "--resource-group",
            spec.resource_group.as_str(),
            "--name",
            spec.name.as_str(),
            "--sku",
            spec.sku.as_str(),
        ];
        parts.extend_from_slice(source);
        let args = self.build_create_args(&parts);
        let disk: AzDisk = self.run_az_json(&args, "disk create")?;
        Ok(disk.into())
    }

    fn account_key(&self, resource_group: &str, account: &str) -> Result<String, AzCliError> {
        let args = self.build_args(&[
            "storage",
            "account",
            "keys",
            "list",
            "--resource-group",
            resource_group,
            "--account-name",
            account,
        ]);
        let keys: Vec<AzAccountKey> = self.run_az_json(&args, "storage account keys")?;
        keys.into_iter()
            .next()
            .map(|key| key.value)
            .ok_or_else(|| AzCliError::MissingValue {
                resource: String::from("storage account keys"),
                field: String::from("value"),
            })
    }

    fn blob_args<'p>(
        command: &[&'p str],
        blob: &'p BlobLocator,
        account_key: &'p str,
    ) -> Vec<&'p str> {
        let mut parts = command.to_vec();
        parts.extend_from_slice(&[
            "--account-name",
            blob.storage_account.as_str(),
            "--account-key",
            account_key,
            "--container-name",
            blob.container.as_str(),
            "--name",
            blob.blob_name.as_str(),
        ]);
        parts
    }

    fn blob_copy_start(
        &self,
        source: &BlobCopySource,
        destination: &BlobDestination,
    ) -> Result<(), AzCliError> {
        let mut parts = vec![
            "storage",
            "blob",
            "copy",
            "start",
            "--account-name",
            destination.blob.storage_account.as_str(),
            "--account-key",
            destination.account_key.as_str(),
            "--destination-container",
            destination.blob.container.as_str(),
            "--destination-blob",
            destination.blob.blob_name.as_str(),
        ];
        match source {
            BlobCopySource::Snapshot {
                blob,
                account_key,
                snapshot,
            } => parts.extend_from_slice(&[
                "--source-account-name",
                blob.storage_account.as_str(),
                "--source-account-key",
                account_key.as_str(),
                "--source-container",
                blob.container.as_str(),
                "--source-blob",
                blob.blob_name.as_str(),
                "--source-snapshot",
                snapshot.as_str(),
            ]),
            BlobCopySource::SasUrl(url) => {
                parts.extend_from_slice(&["--source-uri", url.as_str()]);
            }
        }
        let args = self.build_args(&parts);
        self.run_az(&args, "blob copy start").map(|_| ())
    }

    fn blob_state(&self, destination: &BlobDestination) -> Result<BlobCopyState, AzCliError> {
        let parts = Self::blob_args(
            &["storage", "blob", "show"],
            &destination.blob,
            &destination.account_key,
        );
        let args = self.build_args(&parts);
        let blob: AzBlob = self.run_az_json(&args, "blob show")?;
        let copy = blob
            .properties
            .copy
            .ok_or_else(|| AzCliError::MissingValue {
                resource: String::from("blob show"),
                field: String::from("properties.copy"),
            })?;
        let raw_status = copy.status.unwrap_or_default();
        let status = BlobCopyStatus::parse(&raw_status).ok_or_else(|| AzCliError::Parse {
            resource: String::from("blob show"),
            message: format!("unknown copy status '{raw_status}'"),
        })?;
        Ok(BlobCopyState {
            status,
            progress: copy.progress,
            description: copy.status_description,
        })
    }
}

impl<R: CommandRunner> CloudGateway for AzCliGateway<R> {
    type Error = AzCliError;

    fn resource_group<'a>(
        &'a self,
        name: &'a str,
    ) -> GatewayFuture<'a, Option<ResourceGroup>, Self::Error> {
        Box::pin(async move { self.find_resource_group(name) })
    }

    fn storage_account<'a>(
        &'a self,
        name: &'a str,
    ) -> GatewayFuture<'a, Option<StorageAccount>, Self::Error> {
        Box::pin(async move { self.find_storage_account(name) })
    }

    fn disk<'a>(
        &'a self,
        resource_group: &'a str,
        name: &'a str,
    ) -> GatewayFuture<'a, Option<Disk>, Self::Error> {
        Box::pin(async move { self.find_disk(resource_group, name) })
    }

    fn create_snapshot_from_blob<'a>(
        &'a self,
        name: &'a str,
        resource_group: &'a str,
        blob: &'a BlobLocator,
        storage_account_id: &'a str,
    ) -> GatewayFuture<'a, Snapshot, Self::Error> {
        Box::pin(async move {
            let uri = blob.uri();
            self.snapshot_create(&[
                "snapshot",
                "create",
                "--resource-group",
                resource_group,
                "--name",
                name,
                "--source",
                uri.as_str(),
                "--source-storage-account-id",
                storage_account_id,
            ])
        })
    }

    fn create_snapshot_from_disk<'a>(
        &'a self,
        name: &'a str,
        resource_group: &'a str,
        disk_id: &'a str,
    ) -> GatewayFuture<'a, Snapshot, Self::Error> {
        Box::pin(async move {
            self.snapshot_create(&[
                "snapshot",
                "create",
                "--resource-group",
                resource_group,
                "--name",
                name,
                "--source",
                disk_id,
            ])
        })
    }

    fn create_disk_from_snapshot<'a>(
        &'a self,
        snapshot_id: &'a str,
        spec: &'a DiskSpec,
    ) -> GatewayFuture<'a, Disk, Self::Error> {
        Box::pin(async move { self.disk_create(spec, &["--source", snapshot_id]) })
    }

    fn create_disk_from_blob<'a>(
        &'a self,
        blob: &'a BlobLocator,
        storage_account_id: &'a str,
        spec: &'a DiskSpec,
    ) -> GatewayFuture<'a, Disk, Self::Error> {
        Box::pin(async move {
            let uri = blob.uri();
            self.disk_create(
                spec,
                &[
                    "--source",
                    uri.as_str(),
                    "--source-storage-account-id",
                    storage_account_id,
                ],
            )
        })
    }

    fn create_storage_account<'a>(
        &'a self,
        name: &'a str,
        resource_group: &'a str,
    ) -> GatewayFuture<'a, StorageAccount, Self::Error> {
        Box::pin(async move {
            let args = self.build_create_args(&[
                "storage",
                "account",
                "create",
                "--name",
                name,
                "--resource-group",
                resource_group,
                "--sku",
                RELAY_ACCOUNT_SKU,
                "--https-only",
                "true",
                "--encryption-services",
                "blob",
            ]);
            let account: AzStorageAccount = self.run_az_json(&args, "storage account create")?;
            Ok(account.into())
        })
    }

    fn storage_account_key<'a>(
        &'a self,
        resource_group: &'a str,
        account: &'a str,
    ) -> GatewayFuture<'a, String, Self::Error> {
        Box::pin(async move { self.account_key(resource_group, account) })
    }

    fn create_blob_container<'a>(
        &'a self,
        account: &'a str,
        account_key: &'a str,
        container: &'a str,
    ) -> GatewayFuture<'a, (), Self::Error> {
        Box::pin(async move {
            // containers do not take tags
            let args = self.build_args(&[
                "storage",
                "container",
                "create",
                "--account-name",
                account,
                "--account-key",
                account_key,
                "--name",
                container,
            ]);
            self.run_az(&args, "container create").map(|_| ())
        })
    }

    fn create_blob_snapshot<'a>(
        &'a self,
        blob: &'a BlobLocator,
        account_key: &'a str,
    ) -> GatewayFuture<'a, String, Self::Error> {
        Box::pin(async move {
            let parts = Self::blob_args(&["storage", "blob", "snapshot"], blob, account_key);
            let args = self.build_args(&parts);
            let snapshot: AzBlobSnapshot = self.run_az_json(&args, "blob snapshot")?;
            snapshot.snapshot.ok_or_else(|| AzCliError::MissingValue {
                resource: String::from("blob snapshot"),
                field: String::from("snapshot"),
            })
        })
    }

    fn delete_blob_snapshot<'a>(
        &'a self,
        blob: &'a BlobLocator,
        account_key: &'a str,
        snapshot: &'a str,
    ) -> GatewayFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let mut parts = Self::blob_args(&["storage", "blob", "delete"], blob, account_key);
            parts.extend_from_slice(&["--snapshot", snapshot]);
            let args = self.build_args(&parts);
            self.run_az(&args, "blob snapshot delete").map(|_| ())
        })
    }

    fn delete_blob<'a>(
        &'a self,
        blob: &'a BlobLocator,
        account_key: &'a str,
    ) -> GatewayFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let parts = Self::blob_args(&["storage", "blob", "delete"], blob, account_key);
            let args = self.build_args(&parts);
            self.run_az(&args, "blob delete").map(|_| ())
        })
    }

    fn start_blob_copy<'a>(
        &'a self,
        source: &'a BlobCopySource,
        destination: &'a BlobDestination,
    ) -> GatewayFuture<'a, (), Self::Error> {
        Box::pin(async move { self.blob_copy_start(source, destination) })
    }

    fn blob_copy_state<'a>(
        &'a self,
        destination: &'a BlobDestination,
    ) -> GatewayFuture<'a, BlobCopyState, Self::Error> {
        Box::pin(async move { self.blob_state(destination) })
    }

    fn grant_snapshot_access<'a>(
        &'a self,
        snapshot_id: &'a str,
        duration_secs: u64,
    ) -> GatewayFuture<'a, String, Self::Error> {
        Box::pin(async move {
            let duration = duration_secs.to_string();
            let args = self.build_args(&[
                "snapshot",
                "grant-access",
                "--ids",
                snapshot_id,
                "--duration-in-seconds",
                duration.as_str(),
            ]);
            let grant: AzAccessGrant = self.run_az_json(&args, "snapshot grant-access")?;
            Ok(grant.access_sas)
        })
    }

    fn revoke_snapshot_access<'a>(
        &'a self,
        snapshot_id: &'a str,
    ) -> GatewayFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let args = self.build_args(&["snapshot", "revoke-access", "--ids", snapshot_id]);
            self.run_az(&args, "snapshot revoke-access").map(|_| ())
        })
    }

    fn delete_resource<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let args = self.build_args(&["resource", "delete", "--ids", id]);
            self.run_az(&args, "resource delete").map(|_| ())
        })
    }
}
