use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// A configuration for a single simulated cache
///
/// Sizes follow the exercise conventions: main memory in MiB, block size in bytes, and the
/// cache capacity as a block count. All three are assumed to be powers of two; this is not
/// validated (see [`crate::geometry::CacheGeometry::resolve`])
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub main_memory_mb: u64,
    pub block_size: u64,
    pub blocks: u64,
    pub kind: CacheKind,
}

/// The cache organization - direct, full, 2way, or 4way
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub enum CacheKind {
    #[serde(alias = "direct")]
    Direct,
    #[serde(alias = "full")]
    Full,
    #[serde(alias = "2way")]
    TwoWay,
    #[serde(alias = "4way")]
    FourWay,
}

#[derive(Debug, Clone, Error)]
#[error("unknown cache kind `{0}`, expected direct, full, 2way, or 4way")]
pub struct ParseKindError(String);

impl FromStr for CacheKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" | "Direct" => Ok(CacheKind::Direct),
            "full" | "Full" => Ok(CacheKind::Full),
            "2way" | "TwoWay" => Ok(CacheKind::TwoWay),
            "4way" | "FourWay" => Ok(CacheKind::FourWay),
            other => Err(ParseKindError(other.to_string())),
        }
    }
}
