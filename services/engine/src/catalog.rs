//! Catalog store seam.

use anyhow::Result;
use async_trait::async_trait;
use blindtest_core::pack::Pack;
use uuid::Uuid;

/// The persistent catalog of packs, consulted only at session start.
///
/// Search, tagging, and editing live with the catalog service itself; the
/// engine needs exactly a lookup and a play counter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn get_pack(&self, name: &str) -> Result<Option<Pack>>;

    async fn increment_play_count(&self, pack: Uuid) -> Result<()>;
}
