//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeSet, VecDeque};
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex, MutexGuard as StdMutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use crate::command::{CommandError, CommandOutput, CommandRunner};
use crate::gateway::{
    BlobCopySource, BlobCopyState, BlobCopyStatus, BlobDestination, CloudGateway, Disk, DiskSpec,
    GatewayFuture, ResourceGroup, Snapshot, StorageAccount,
};
use crate::locator::BlobLocator;
use crate::sku::{DiskSku, tier_of_sku_name};

fn lock<T>(mutex: &Mutex<T>) -> StdMutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scripted command runner that returns pre-seeded outputs in FIFO order.
///
/// Used to drive deterministic command outcomes without spawning processes.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRunner {
    responses: Arc<Mutex<VecDeque<CommandOutput>>>,
    invocations: Arc<Mutex<Vec<CommandInvocation>>>,
}

/// Records a single invocation made through [`ScriptedRunner`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandInvocation {
    /// Program name as passed to the runner.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<OsString>,
}

impl CommandInvocation {
    /// Returns a shell-like command string for assertions.
    #[must_use]
    pub fn command_string(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(
            self.args
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned()),
        );
        parts.join(" ")
    }

    /// Returns the value following `flag`, if present.
    #[must_use]
    pub fn flag_value(&self, flag: &str) -> Option<String> {
        self.args
            .iter()
            .position(|arg| arg.to_string_lossy() == flag)
            .and_then(|index| self.args.get(index + 1))
            .map(|value| value.to_string_lossy().into_owned())
    }
}

impl ScriptedRunner {
    /// Creates a new runner with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all invocations recorded so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<CommandInvocation> {
        lock(&self.invocations).clone()
    }

    /// Pushes a successful exit status with empty output.
    pub fn push_success(&self) {
        self.push_output(Some(0), "", "");
    }

    /// Pushes a successful exit status with the given JSON on stdout.
    pub fn push_json(&self, stdout: impl Into<String>) {
        self.push_output(Some(0), stdout, "");
    }

    /// Pushes a failing exit code with stderr text.
    pub fn push_failure(&self, code: i32, stderr: impl Into<String>) {
        self.push_output(Some(code), "", stderr);
    }

    /// Pushes an explicit command output response.
    pub fn push_output(
        &self,
        code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) {
        lock(&self.responses).push_back(CommandOutput {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        });
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, CommandError> {
        lock(&self.invocations).push(CommandInvocation {
            program: program.to_owned(),
            args: args.to_vec(),
        });
        lock(&self.responses)
            .pop_front()
            .ok_or_else(|| CommandError::Spawn {
                program: program.to_owned(),
                message: String::from("no scripted response available"),
            })
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: AsyncMutex<()> = AsyncMutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets multiple environment variables while holding a global mutex.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

/// Errors raised by [`StubGateway`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum StubGatewayError {
    /// Raised when a test asked the named operation to fail.
    #[error("injected failure in {0}")]
    Injected(String),
    /// Raised when an operation references a resource the stub does not hold.
    #[error("{0} not found")]
    Missing(String),
    /// Raised when creating a resource whose name is already taken.
    #[error("{0} already exists")]
    Conflict(String),
}

#[derive(Debug, Default)]
struct StubState {
    resource_groups: Vec<ResourceGroup>,
    storage_accounts: Vec<StorageAccount>,
    disks: Vec<Disk>,
    snapshots: Vec<Snapshot>,
    blob_snapshots: Vec<(String, String)>,
    sas_grants: Vec<String>,
    containers: Vec<(String, String)>,
    blobs: Vec<String>,
    copy_script: VecDeque<BlobCopyStatus>,
    poll_count: usize,
    calls: Vec<String>,
    failing: Vec<String>,
    cancel_on: Vec<(String, CancellationToken)>,
    next_token: u64,
}

impl StubState {
    fn enter(&mut self, operation: &str) -> Result<(), StubGatewayError> {
        self.calls.push(operation.to_owned());
        for (trigger, token) in &self.cancel_on {
            if trigger == operation {
                token.cancel();
            }
        }
        if self.failing.iter().any(|failing| failing == operation) {
            return Err(StubGatewayError::Injected(operation.to_owned()));
        }
        Ok(())
    }

    fn group(&self, name: &str) -> Result<ResourceGroup, StubGatewayError> {
        self.resource_groups
            .iter()
            .find(|group| group.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| StubGatewayError::Missing(format!("resource group {name}")))
    }

    fn account(&self, name: &str) -> Option<&StorageAccount> {
        self.storage_accounts
            .iter()
            .find(|account| account.name.eq_ignore_ascii_case(name))
    }

    fn token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    fn insert_snapshot(
        &mut self,
        name: &str,
        resource_group: &str,
    ) -> Result<Snapshot, StubGatewayError> {
        let group = self.group(resource_group)?;
        let snapshot = Snapshot {
            id: resource_id(&group.name, "snapshots", name),
            name: name.to_owned(),
        };
        self.snapshots.push(snapshot.clone());
        Ok(snapshot)
    }

    fn insert_disk(&mut self, spec: &DiskSpec) -> Result<Disk, StubGatewayError> {
        let group = self.group(&spec.resource_group)?;
        if self.disks.iter().any(|disk| {
            disk.resource_group.eq_ignore_ascii_case(&group.name)
                && disk.name.eq_ignore_ascii_case(&spec.name)
        }) {
            return Err(StubGatewayError::Conflict(format!("disk {}", spec.name)));
        }
        let sku = spec.sku.as_str();
        let disk = Disk {
            id: resource_id(&group.name, "disks", &spec.name),
            name: spec.name.clone(),
            resource_group: group.name.clone(),
            location: group.location,
            sku: Some(sku.to_owned()),
            tier: Some(tier_of_sku_name(sku).to_owned()),
        };
        self.disks.push(disk.clone());
        Ok(disk)
    }
}

fn resource_id(resource_group: &str, kind: &str, name: &str) -> String {
    let provider = if kind == "storageAccounts" {
        "Microsoft.Storage"
    } else {
        "Microsoft.Compute"
    };
    format!("/subscriptions/stub/resourceGroups/{resource_group}/providers/{provider}/{kind}/{name}")
}

/// In-memory gateway that keeps a resource list and a scripted blob-copy
/// status sequence.
///
/// Blob copies report `success` once the script is exhausted.
#[derive(Clone, Debug, Default)]
pub struct StubGateway {
    state: Arc<Mutex<StubState>>,
}

impl StubGateway {
    /// Creates an empty stub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> StdMutexGuard<'_, StubState> {
        lock(&self.state)
    }

    /// Seeds a resource group.
    #[must_use]
    pub fn with_resource_group(self, name: &str, location: &str) -> Self {
        self.state().resource_groups.push(ResourceGroup {
            name: name.to_owned(),
            location: location.to_owned(),
        });
        self
    }

    /// Seeds a storage account in an already seeded resource group.
    ///
    /// # Panics
    ///
    /// Panics when the resource group has not been seeded.
    #[must_use]
    pub fn with_storage_account(self, name: &str, resource_group: &str, tier: &str) -> Self {
        {
            let mut state = self.state();
            let group = state
                .group(resource_group)
                .unwrap_or_else(|err| panic!("seed storage account {name}: {err}"));
            state.storage_accounts.push(StorageAccount {
                id: resource_id(&group.name, "storageAccounts", name),
                name: name.to_owned(),
                resource_group: group.name,
                location: group.location,
                tier: Some(tier.to_owned()),
            });
        }
        self
    }

    /// Seeds a managed disk in an already seeded resource group.
    ///
    /// # Panics
    ///
    /// Panics when the resource group has not been seeded.
    #[must_use]
    pub fn with_disk(self, resource_group: &str, name: &str, sku: DiskSku) -> Self {
        {
            let mut state = self.state();
            let spec = DiskSpec {
                resource_group: resource_group.to_owned(),
                name: name.to_owned(),
                sku,
            };
            state
                .insert_disk(&spec)
                .unwrap_or_else(|err| panic!("seed disk {name}: {err}"));
        }
        self
    }

    /// Queues blob-copy statuses returned by successive polls.
    pub fn script_copy_statuses(&self, statuses: impl IntoIterator<Item = BlobCopyStatus>) {
        self.state().copy_script.extend(statuses);
    }

    /// Makes every future call of `operation` fail.
    pub fn fail_on(&self, operation: &str) {
        self.state().failing.push(operation.to_owned());
    }

    /// Cancels `token` whenever `operation` is called. The call itself
    /// still completes.
    pub fn cancel_on(&self, operation: &str, token: &CancellationToken) {
        self.state()
            .cancel_on
            .push((operation.to_owned(), token.clone()));
    }

    /// Names of the gateway operations called so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Number of times the copy status was polled.
    #[must_use]
    pub fn poll_count(&self) -> usize {
        self.state().poll_count
    }

    /// IDs of every resource the stub currently holds, including blob
    /// snapshots and SAS grants.
    #[must_use]
    pub fn resource_ids(&self) -> Vec<String> {
        let state = self.state();
        state
            .storage_accounts
            .iter()
            .map(|account| account.id.clone())
            .chain(state.disks.iter().map(|disk| disk.id.clone()))
            .chain(state.snapshots.iter().map(|snapshot| snapshot.id.clone()))
            .chain(
                state
                    .blob_snapshots
                    .iter()
                    .map(|(uri, token)| format!("{uri}?snapshot={token}")),
            )
            .chain(state.sas_grants.iter().map(|id| format!("{id}/sas")))
            .collect()
    }

    /// Number of managed snapshots that still exist.
    #[must_use]
    pub fn snapshot_count(&self) -> usize {
        self.state().snapshots.len()
    }

    /// Number of blob snapshots that still exist.
    #[must_use]
    pub fn blob_snapshot_count(&self) -> usize {
        self.state().blob_snapshots.len()
    }

    /// Number of SAS grants that are still active.
    #[must_use]
    pub fn sas_grant_count(&self) -> usize {
        self.state().sas_grants.len()
    }

    /// URIs of the blobs that still exist.
    #[must_use]
    pub fn blobs(&self) -> Vec<String> {
        self.state().blobs.clone()
    }

    /// Storage accounts the stub currently holds.
    #[must_use]
    pub fn storage_accounts(&self) -> Vec<StorageAccount> {
        self.state().storage_accounts.clone()
    }

    /// Disks the stub currently holds.
    #[must_use]
    pub fn disks(&self) -> Vec<Disk> {
        self.state().disks.clone()
    }

    fn lookup_disk(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Option<Disk>, StubGatewayError> {
        let mut state = self.state();
        state.enter("disk")?;
        Ok(state
            .disks
            .iter()
            .find(|disk| {
                disk.resource_group.eq_ignore_ascii_case(resource_group)
                    && disk.name.eq_ignore_ascii_case(name)
            })
            .cloned())
    }

    fn snapshot_blob(
        &self,
        name: &str,
        resource_group: &str,
        storage_account_id: &str,
    ) -> Result<Snapshot, StubGatewayError> {
        let mut state = self.state();
        state.enter("create_snapshot_from_blob")?;
        if !state
            .storage_accounts
            .iter()
            .any(|account| account.id == storage_account_id)
        {
            return Err(StubGatewayError::Missing(storage_account_id.to_owned()));
        }
        state.insert_snapshot(name, resource_group)
    }

    fn snapshot_disk(
        &self,
        name: &str,
        resource_group: &str,
        disk_id: &str,
    ) -> Result<Snapshot, StubGatewayError> {
        let mut state = self.state();
        state.enter("create_snapshot_from_disk")?;
        if !state.disks.iter().any(|disk| disk.id == disk_id) {
            return Err(StubGatewayError::Missing(disk_id.to_owned()));
        }
        state.insert_snapshot(name, resource_group)
    }

    fn disk_from_snapshot(
        &self,
        snapshot_id: &str,
        spec: &DiskSpec,
    ) -> Result<Disk, StubGatewayError> {
        let mut state = self.state();
        state.enter("create_disk_from_snapshot")?;
        if !state.snapshots.iter().any(|snapshot| snapshot.id == snapshot_id) {
            return Err(StubGatewayError::Missing(snapshot_id.to_owned()));
        }
        state.insert_disk(spec)
    }

    fn disk_from_blob(
        &self,
        blob: &BlobLocator,
        spec: &DiskSpec,
    ) -> Result<Disk, StubGatewayError> {
        let mut state = self.state();
        state.enter("create_disk_from_blob")?;
        let uri = blob.uri();
        if !state.blobs.contains(&uri) {
            return Err(StubGatewayError::Missing(uri));
        }
        state.insert_disk(spec)
    }

    fn account_create(
        &self,
        name: &str,
        resource_group: &str,
    ) -> Result<StorageAccount, StubGatewayError> {
        let mut state = self.state();
        state.enter("create_storage_account")?;
        if let Some(existing) = state.account(name) {
            return Ok(existing.clone());
        }
        let group = state.group(resource_group)?;
        let account = StorageAccount {
            id: resource_id(&group.name, "storageAccounts", name),
            name: name.to_owned(),
            resource_group: group.name,
            location: group.location,
            tier: Some(String::from("Standard")),
        };
        state.storage_accounts.push(account.clone());
        Ok(account)
    }

    fn account_key(&self, account: &str) -> Result<String, StubGatewayError> {
        let mut state = self.state();
        state.enter("storage_account_key")?;
        state
            .account(account)
            .map(|found| format!("key-{}", found.name))
            .ok_or_else(|| StubGatewayError::Missing(format!("storage account {account}")))
    }

    fn container_create(&self, account: &str, container: &str) -> Result<(), StubGatewayError> {
        let mut state = self.state();
        state.enter("create_blob_container")?;
        if state.account(account).is_none() {
            return Err(StubGatewayError::Missing(format!("storage account {account}")));
        }
        let entry = (account.to_owned(), container.to_owned());
        if !state.containers.contains(&entry) {
            state.containers.push(entry);
        }
        Ok(())
    }

    fn blob_snapshot(&self, blob: &BlobLocator) -> Result<String, StubGatewayError> {
        let mut state = self.state();
        state.enter("create_blob_snapshot")?;
        let token = format!("2024-01-01T00:00:{:02}.0000000Z", state.token());
        state.blob_snapshots.push((blob.uri(), token.clone()));
        Ok(token)
    }

    fn blob_snapshot_delete(
        &self,
        blob: &BlobLocator,
        snapshot: &str,
    ) -> Result<(), StubGatewayError> {
        let mut state = self.state();
        state.enter("delete_blob_snapshot")?;
        let entry = (blob.uri(), snapshot.to_owned());
        let before = state.blob_snapshots.len();
        state.blob_snapshots.retain(|existing| *existing != entry);
        if state.blob_snapshots.len() == before {
            return Err(StubGatewayError::Missing(format!(
                "{}?snapshot={snapshot}",
                entry.0
            )));
        }
        Ok(())
    }

    fn blob_delete(&self, blob: &BlobLocator) -> Result<(), StubGatewayError> {
        let mut state = self.state();
        state.enter("delete_blob")?;
        let uri = blob.uri();
        let before = state.blobs.len();
        state.blobs.retain(|existing| *existing != uri);
        if state.blobs.len() == before {
            return Err(StubGatewayError::Missing(uri));
        }
        Ok(())
    }

    fn copy_start(&self, destination: &BlobDestination) -> Result<(), StubGatewayError> {
        let mut state = self.state();
        state.enter("start_blob_copy")?;
        let blob = &destination.blob;
        let entry = (blob.storage_account.clone(), blob.container.clone());
        if !state.containers.contains(&entry) {
            return Err(StubGatewayError::Missing(format!(
                "container {}/{}",
                blob.storage_account, blob.container
            )));
        }
        state.blobs.push(blob.uri());
        Ok(())
    }

    fn copy_state(&self) -> Result<BlobCopyState, StubGatewayError> {
        let mut state = self.state();
        state.enter("blob_copy_state")?;
        state.poll_count += 1;
        let status = state
            .copy_script
            .pop_front()
            .unwrap_or(BlobCopyStatus::Success);
        Ok(BlobCopyState {
            status,
            progress: Some(String::from("512/1024")),
            description: None,
        })
    }

    fn grant(&self, snapshot_id: &str) -> Result<String, StubGatewayError> {
        let mut state = self.state();
        state.enter("grant_snapshot_access")?;
        let Some(snapshot) = state.snapshots.iter().find(|snapshot| snapshot.id == snapshot_id)
        else {
            return Err(StubGatewayError::Missing(snapshot_id.to_owned()));
        };
        let url = format!(
            "https://md-stub.blob.core.windows.net/{}/abcd?sv=2018&sig=stub",
            snapshot.name
        );
        state.sas_grants.push(snapshot_id.to_owned());
        Ok(url)
    }

    fn revoke(&self, snapshot_id: &str) -> Result<(), StubGatewayError> {
        let mut state = self.state();
        state.enter("revoke_snapshot_access")?;
        state.sas_grants.retain(|granted| granted != snapshot_id);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StubGatewayError> {
        let mut state = self.state();
        state.enter("delete_resource")?;
        let before = state.disks.len() + state.snapshots.len() + state.storage_accounts.len();
        state.disks.retain(|disk| disk.id != id);
        state.snapshots.retain(|snapshot| snapshot.id != id);
        state.storage_accounts.retain(|account| account.id != id);
        let after = state.disks.len() + state.snapshots.len() + state.storage_accounts.len();
        if before == after {
            return Err(StubGatewayError::Missing(id.to_owned()));
        }
        let StubState {
            storage_accounts,
            containers,
            blobs,
            ..
        } = &mut *state;
        containers.retain(|(account, _)| storage_accounts.iter().any(|kept| kept.name == *account));
        blobs.retain(|uri| {
            storage_accounts
                .iter()
                .any(|kept| uri.starts_with(&format!("https://{}.blob.", kept.name)))
        });
        Ok(())
    }
}

impl CloudGateway for StubGateway {
    type Error = StubGatewayError;

    fn resource_group<'a>(
        &'a self,
        name: &'a str,
    ) -> GatewayFuture<'a, Option<ResourceGroup>, Self::Error> {
        Box::pin(async move {
            let mut state = self.state();
            state.enter("resource_group")?;
            Ok(state.group(name).ok())
        })
    }

    fn storage_account<'a>(
        &'a self,
        name: &'a str,
    ) -> GatewayFuture<'a, Option<StorageAccount>, Self::Error> {
        Box::pin(async move {
            let mut state = self.state();
            state.enter("storage_account")?;
            Ok(state.account(name).cloned())
        })
    }

    fn disk<'a>(
        &'a self,
        resource_group: &'a str,
        name: &'a str,
    ) -> GatewayFuture<'a, Option<Disk>, Self::Error> {
        Box::pin(async move { self.lookup_disk(resource_group, name) })
    }

    fn create_snapshot_from_blob<'a>(
        &'a self,
        name: &'a str,
        resource_group: &'a str,
        _blob: &'a BlobLocator,
        storage_account_id: &'a str,
    ) -> GatewayFuture<'a, Snapshot, Self::Error> {
        Box::pin(async move { self.snapshot_blob(name, resource_group, storage_account_id) })
    }

    fn create_snapshot_from_disk<'a>(
        &'a self,
        name: &'a str,
        resource_group: &'a str,
        disk_id: &'a str,
    ) -> GatewayFuture<'a, Snapshot, Self::Error> {
        Box::pin(async move { self.snapshot_disk(name, resource_group, disk_id) })
    }

    fn create_disk_from_snapshot<'a>(
        &'a self,
        snapshot_id: &'a str,
        spec: &'a DiskSpec,
    ) -> GatewayFuture<'a, Disk, Self::Error> {
        Box::pin(async move { self.disk_from_snapshot(snapshot_id, spec) })
    }

    fn create_disk_from_blob<'a>(
        &'a self,
        blob: &'a BlobLocator,
        _storage_account_id: &'a str,
        spec: &'a DiskSpec,
    ) -> GatewayFuture<'a, Disk, Self::Error> {
        Box::pin(async move { self.disk_from_blob(blob, spec) })
    }

    fn create_storage_account<'a>(
        &'a self,
        name: &'a str,
        resource_group: &'a str,
    ) -> GatewayFuture<'a, StorageAccount, Self::Error> {
        Box::pin(async move { self.account_create(name, resource_group) })
    }

    fn storage_account_key<'a>(
        &'a self,
        _resource_group: &'a str,
        account: &'a str,
    ) -> GatewayFuture<'a, String, Self::Error> {
        Box::pin(async move { self.account_key(account) })
    }

    fn create_blob_container<'a>(
        &'a self,
        account: &'a str,
        _account_key: &'a str,
        container: &'a str,
    ) -> GatewayFuture<'a, (), Self::Error> {
        Box::pin(async move { self.container_create(account, container) })
    }

    fn create_blob_snapshot<'a>(
        &'a self,
        blob: &'a BlobLocator,
        _account_key: &'a str,
    ) -> GatewayFuture<'a, String, Self::Error> {
        Box::pin(async move { self.blob_snapshot(blob) })
    }

    fn delete_blob_snapshot<'a>(
        &'a self,
        blob: &'a BlobLocator,
        _account_key: &'a str,
        snapshot: &'a str,
    ) -> GatewayFuture<'a, (), Self::Error> {
        Box::pin(async move { self.blob_snapshot_delete(blob, snapshot) })
    }

    fn delete_blob<'a>(
        &'a self,
        blob: &'a BlobLocator,
        _account_key: &'a str,
    ) -> GatewayFuture<'a, (), Self::Error> {
        Box::pin(async move { self.blob_delete(blob) })
    }

    fn start_blob_copy<'a>(
        &'a self,
        _source: &'a BlobCopySource,
        destination: &'a BlobDestination,
    ) -> GatewayFuture<'a, (), Self::Error> {
        Box::pin(async move { self.copy_start(destination) })
    }

    fn blob_copy_state<'a>(
        &'a self,
        _destination: &'a BlobDestination,
    ) -> GatewayFuture<'a, BlobCopyState, Self::Error> {
        Box::pin(async move { self.copy_state() })
    }

    fn grant_snapshot_access<'a>(
        &'a self,
        snapshot_id: &'a str,
        _duration_secs: u64,
    ) -> GatewayFuture<'a, String, Self::Error> {
        Box::pin(async move { self.grant(snapshot_id) })
    }

    fn revoke_snapshot_access<'a>(
        &'a self,
        snapshot_id: &'a str,
    ) -> GatewayFuture<'a, (), Self::Error> {
        Box::pin(async move { self.revoke(snapshot_id) })
    }

    fn delete_resource<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, (), Self::Error> {
        Box::pin(async move { self.delete(id) })
    }
}
