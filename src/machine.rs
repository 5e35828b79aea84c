use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::{
    memory::{Cache, Level, Line, Ram},
    replace::Policy,
    stats::Stats,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{what} size must be positive")]
    ZeroSize { what: &'static str },
    #[error("access costs must all be positive")]
    ZeroCost,
}

/// Cost charged for each level touched on the way to a hit.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CostModel {
    pub l1: u64,
    pub l2: u64,
    pub l3: u64,
    pub ram: u64,
}

impl Default for CostModel {
    fn default() -> Self {
        CostModel {
            l1: 1,
            l2: 2,
            l3: 3,
            ram: 4,
        }
    }
}

/// Index-based ticket to the line that serviced an access. Valid until the
/// next search on the same machine, which may relocate line content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineHandle {
    pub level: Level,
    pub slot: usize,
}

#[derive(Debug)]
pub struct Machine {
    pub ram: Ram,
    pub l1: Cache,
    pub l2: Cache,
    pub l3: Cache,
    pub policy: Policy,
    pub costs: CostModel,
    pub stats: Stats,
}

impl Machine {
    pub fn new(
        ram: usize,
        l1: usize,
        l2: usize,
        l3: usize,
        policy: Policy,
        costs: CostModel,
    ) -> Result<Self, ConfigError> {
        for (what, size) in [("ram", ram), ("l1", l1), ("l2", l2), ("l3", l3)] {
            if size == 0 {
                return Err(ConfigError::ZeroSize { what });
            }
        }
        if [costs.l1, costs.l2, costs.l3, costs.ram].contains(&0) {
            return Err(ConfigError::ZeroCost);
        }

        Ok(Machine {
            ram: Ram::new(ram),
            l1: Cache::new(l1),
            l2: Cache::new(l2),
            l3: Cache::new(l3),
            policy,
            costs,
            stats: Stats::default(),
        })
    }

    pub fn cache(&self, level: Level) -> &Cache {
        match level {
            Level::L1 => &self.l1,
            Level::L2 => &self.l2,
            Level::L3 => &self.l3,
        }
    }

    pub fn line(&self, handle: LineHandle) -> &Line {
        &self.cache(handle.level).lines[handle.slot]
    }

    pub fn line_mut(&mut self, handle: LineHandle) -> &mut Line {
        let cache = match handle.level {
            Level::L1 => &mut self.l1,
            Level::L2 => &mut self.l2,
            Level::L3 => &mut self.l3,
        };
        &mut cache.lines[handle.slot]
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ram:")?;
        for (add, block) in self.ram.blocks.iter().enumerate() {
            writeln!(f, "{add:>4} | {block}")?;
        }
        for (name, cache) in [("l1", &self.l1), ("l2", &self.l2), ("l3", &self.l3)] {
            writeln!(f, "{name}:")?;
            for (slot, line) in cache.lines.iter().enumerate() {
                writeln!(f, "{slot:>4} | {line}")?;
            }
        }
        Ok(())
    }
}
