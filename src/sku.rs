//! Managed disk SKUs and the default derived from a source's tier.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

const PREMIUM_TIER: &str = "Premium";

/// Raised when a SKU override is not a managed disk SKU.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unknown disk SKU '{0}' (expected one of Standard_LRS, Premium_LRS, StandardSSD_LRS, UltraSSD_LRS, Premium_ZRS, StandardSSD_ZRS)")]
pub struct SkuError(pub String);

/// Managed disk SKU names accepted by Azure.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum DiskSku {
    /// Standard HDD, locally redundant.
    #[serde(rename = "Standard_LRS")]
    StandardLrs,
    /// Premium SSD, locally redundant.
    #[serde(rename = "Premium_LRS")]
    PremiumLrs,
    /// Standard SSD, locally redundant.
    #[serde(rename = "StandardSSD_LRS")]
    StandardSsdLrs,
    /// Ultra SSD, locally redundant.
    #[serde(rename = "UltraSSD_LRS")]
    UltraSsdLrs,
    /// Premium SSD, zone redundant.
    #[serde(rename = "Premium_ZRS")]
    PremiumZrs,
    /// Standard SSD, zone redundant.
    #[serde(rename = "StandardSSD_ZRS")]
    StandardSsdZrs,
}

impl DiskSku {
    /// Returns the SKU name as Azure spells it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StandardLrs => "Standard_LRS",
            Self::PremiumLrs => "Premium_LRS",
            Self::StandardSsdLrs => "StandardSSD_LRS",
            Self::UltraSsdLrs => "UltraSSD_LRS",
            Self::PremiumZrs => "Premium_ZRS",
            Self::StandardSsdZrs => "StandardSSD_ZRS",
        }
    }
}

impl fmt::Display for DiskSku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiskSku {
    type Err = SkuError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        [
            Self::StandardLrs,
            Self::PremiumLrs,
            Self::StandardSsdLrs,
            Self::UltraSsdLrs,
            Self::PremiumZrs,
            Self::StandardSsdZrs,
        ]
        .into_iter()
        .find(|sku| sku.as_str().eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| SkuError(trimmed.to_owned()))
    }
}

/// Maps a source performance tier to the target disk SKU.
///
/// `Premium` maps to `Premium_LRS`; every other tier, including an absent
/// one, maps to `Standard_LRS`.
#[must_use]
pub fn resolve_sku(tier: Option<&str>) -> DiskSku {
    match tier {
        Some(value) if value.trim().eq_ignore_ascii_case(PREMIUM_TIER) => DiskSku::PremiumLrs,
        _ => DiskSku::StandardLrs,
    }
}

/// Extracts the tier prefix from a SKU name (`Premium_LRS` → `Premium`).
#[must_use]
pub fn tier_of_sku_name(sku_name: &str) -> &str {
    sku_name
        .split_once('_')
        .map_or(sku_name, |(tier, _)| tier)
}
