pub mod direct;
pub mod fifo;
pub mod lfu;
pub mod lru;

use serde::Deserialize;

use crate::memory::Cache;

/// Line replacement strategy, chosen once at machine construction and
/// applied identically at every cache level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    Direct,
    Lru,
    Lfu,
    Fifo,
}

impl Policy {
    /// Maps a block address to the slot that should service it: the slot
    /// already holding the block for the strategies that scan, otherwise
    /// the victim the strategy selects.
    pub fn map(self, block: usize, cache: &Cache) -> usize {
        match self {
            Policy::Direct => direct::map(block, cache),
            Policy::Lru => lru::map(block, cache),
            Policy::Lfu => lfu::map(block, cache),
            Policy::Fifo => fifo::map(block, cache),
        }
    }
}
