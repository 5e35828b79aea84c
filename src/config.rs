use serde::Deserialize;

use crate::{
    machine::{ConfigError, CostModel, Machine},
    replace::Policy,
};

/// Machine shape for one run: block counts for ram and the three cache
/// levels, the replacement policy, and optional per-level access costs.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub ram: usize,
    pub l1: usize,
    pub l2: usize,
    pub l3: usize,
    pub policy: Policy,
    #[serde(default)]
    pub costs: CostModel,
}

impl Config {
    pub fn to_machine(&self) -> Result<Machine, ConfigError> {
        Machine::new(self.ram, self.l1, self.l2, self.l3, self.policy, self.costs)
    }
}
