use log::debug;
use thiserror::Error;

use crate::{
    machine::{LineHandle, Machine},
    memory::{Address, HitLevel, Level, WORDS_PER_BLOCK},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("block {block} is outside ram ({ram} blocks)")]
    BlockOutOfRange { block: usize, ram: usize },
    #[error("word offset {offset} is outside the block ({words} words)", words = WORDS_PER_BLOCK)]
    OffsetOutOfRange { offset: usize },
}

/// Looks an address up through l1, l2 and l3, falling back to ram, and
/// returns a handle to the line now holding the block together with the
/// level that serviced it.
///
/// Write-back: a full miss relocates conflicting dirty lines one level
/// down before loading; ram is only written when a dirty line falls off
/// l3. Hits at l2 or l3 are serviced in place, never promoted.
pub fn search(machine: &mut Machine, add: Address) -> Result<(LineHandle, HitLevel), AccessError> {
    if add.block >= machine.ram.len() {
        return Err(AccessError::BlockOutOfRange {
            block: add.block,
            ram: machine.ram.len(),
        });
    }
    if add.offset >= WORDS_PER_BLOCK {
        return Err(AccessError::OffsetOutOfRange { offset: add.offset });
    }

    let l1_slot = machine.policy.map(add.block, &machine.l1);
    let l2_slot = machine.policy.map(add.block, &machine.l2);
    let l3_slot = machine.policy.map(add.block, &machine.l3);

    machine.l1.tick();
    machine.l2.tick();
    machine.l3.tick();

    let costs = machine.costs;

    if machine.l1.lines[l1_slot].tag == Some(add.block) {
        machine.l1.lines[l1_slot].last_hit = Some(HitLevel::L1);
        let handle = LineHandle {
            level: Level::L1,
            slot: l1_slot,
        };
        finalize(machine, handle, HitLevel::L1, costs.l1);
        return Ok((handle, HitLevel::L1));
    }

    if machine.l2.lines[l2_slot].tag == Some(add.block) {
        // Serviced in place; the block stays at l2.
        let line = &mut machine.l2.lines[l2_slot];
        line.dirty = false;
        line.last_hit = Some(HitLevel::L2);
        let handle = LineHandle {
            level: Level::L2,
            slot: l2_slot,
        };
        finalize(machine, handle, HitLevel::L2, costs.l1 + costs.l2);
        return Ok((handle, HitLevel::L2));
    }

    if machine.l3.lines[l3_slot].tag == Some(add.block) {
        let line = &mut machine.l3.lines[l3_slot];
        line.dirty = false;
        line.last_hit = Some(HitLevel::L3);
        let handle = LineHandle {
            level: Level::L3,
            slot: l3_slot,
        };
        finalize(machine, handle, HitLevel::L3, costs.l1 + costs.l2 + costs.l3);
        return Ok((handle, HitLevel::L3));
    }

    // Miss everywhere: free the l1 slot, then pull the block out of ram.
    evict(machine, l1_slot, l2_slot, l3_slot);
    assert!(
        machine.l1.lines[l1_slot].replaceable(),
        "eviction left a dirty line in the target l1 slot"
    );

    let block = machine.ram.blocks[add.block];
    let line = &mut machine.l1.lines[l1_slot];
    line.block = block;
    line.tag = Some(add.block);
    line.dirty = false;
    line.time_in_cache = 0;
    line.last_hit = Some(HitLevel::Ram);

    let handle = LineHandle {
        level: Level::L1,
        slot: l1_slot,
    };
    let cost = costs.l1 + costs.l2 + costs.l3 + costs.ram;
    finalize(machine, handle, HitLevel::Ram, cost);
    Ok((handle, HitLevel::Ram))
}

/// Each conflicting line moves exactly one level down, never skipping a
/// level; the chain stops at the first slot that can be overwritten
/// outright. Counters travel with the content.
fn evict(machine: &mut Machine, l1_slot: usize, l2_slot: usize, l3_slot: usize) {
    if machine.l1.lines[l1_slot].replaceable() {
        return;
    }
    if !machine.l2.lines[l2_slot].replaceable() {
        if !machine.l3.lines[l3_slot].replaceable() {
            flush(machine, l3_slot);
        }
        machine.l3.lines[l3_slot] = machine.l2.lines[l2_slot].clone();
        machine.l3.lines[l3_slot].time_in_cache = 0;
        debug!("relocated l2[{l2_slot}] to l3[{l3_slot}]");
    }
    machine.l2.lines[l2_slot] = machine.l1.lines[l1_slot].clone();
    machine.l2.lines[l2_slot].time_in_cache = 0;
    debug!("relocated l1[{l1_slot}] to l2[{l2_slot}]");
}

/// The one place data goes back to ram: the victim's block lands at its
/// own tag's address.
fn flush(machine: &mut Machine, l3_slot: usize) {
    let line = &machine.l3.lines[l3_slot];
    let tag = line.tag.expect("a non-replaceable line always has a tag");
    machine.ram.blocks[tag] = line.block;
    debug!("flushed l3[{l3_slot}] (block {tag}) to ram");
}

fn finalize(machine: &mut Machine, handle: LineHandle, level: HitLevel, cost: u64) {
    let line = machine.line_mut(handle);
    line.time_in_cache = 0;
    line.times_used += 1;
    machine.stats.record(level, cost);
}
