//! JSON shapes emitted by `az ... --output json`.

use serde::Deserialize;

use crate::gateway::{Disk, ResourceGroup, Snapshot, StorageAccount};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(super) struct AzResourceGroup {
    pub(super) name: String,
    pub(super) location: String,
}

impl From<AzResourceGroup> for ResourceGroup {
    fn from(value: AzResourceGroup) -> Self {
        Self {
            name: value.name,
            location: value.location,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub(super) struct AzSku {
    #[serde(default)]
    pub(super) name: Option<String>,
    #[serde(default)]
    pub(super) tier: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(super) struct AzStorageAccount {
    pub(super) id: String,
    pub(super) name: String,
    pub(super) location: String,
    pub(super) resource_group: String,
    #[serde(default)]
    pub(super) sku: Option<AzSku>,
}

impl From<AzStorageAccount> for StorageAccount {
    fn from(value: AzStorageAccount) -> Self {
        Self {
            id: value.id,
            name: value.name,
            resource_group: value.resource_group,
            location: value.location,
            tier: value.sku.and_then(|sku| sku.tier),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(super) struct AzDisk {
    pub(super) id: String,
    pub(super) name: String,
    pub(super) location: String,
    pub(super) resource_group: String,
    #[serde(default)]
    pub(super) sku: Option<AzSku>,
}

impl From<AzDisk> for Disk {
    fn from(value: AzDisk) -> Self {
        let sku = value.sku.unwrap_or_default();
        Self {
            id: value.id,
            name: value.name,
            resource_group: value.resource_group,
            location: value.location,
            sku: sku.name,
            tier: sku.tier,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(super) struct AzSnapshot {
    pub(super) id: String,
    pub(super) name: String,
}

impl From<AzSnapshot> for Snapshot {
    fn from(value: AzSnapshot) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(super) struct AzAccountKey {
    pub(super) value: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(super) struct AzBlobSnapshot {
    #[serde(default)]
    pub(super) snapshot: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(super) struct AzBlob {
    pub(super) properties: AzBlobProperties,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(super) struct AzBlobProperties {
    #[serde(default)]
    pub(super) copy: Option<AzCopyProperties>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(super) struct AzCopyProperties {
    #[serde(default)]
    pub(super) status: Option<String>,
    #[serde(default)]
    pub(super) progress: Option<String>,
    #[serde(default)]
    pub(super) status_description: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(super) struct AzAccessGrant {
    #[serde(rename = "accessSas", alias = "accessSAS")]
    pub(super) access_sas: String,
}
