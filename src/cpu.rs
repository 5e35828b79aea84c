use log::debug;

use crate::{
    machine::Machine,
    mmu::{self, AccessError},
    trace::{Instr, Operation},
};

/// Runs one instruction: look the address up through the hierarchy, then
/// read or write the addressed word through the returned line. The handle
/// is only held for the duration of this one instruction.
pub fn execute(machine: &mut Machine, instr: &Instr) -> Result<(), AccessError> {
    let (handle, level) = mmu::search(machine, instr.address)?;
    let line = machine.line_mut(handle);
    match instr.op {
        Operation::Read => {
            let word = line.block.words[instr.address.offset];
            debug!(
                "read  block {:>4} word {} -> {word:>11} ({level})",
                instr.address.block, instr.address.offset
            );
        }
        Operation::Write(word) => {
            line.block.words[instr.address.offset] = word;
            line.dirty = true;
            debug!(
                "write block {:>4} word {} <- {word:>11} ({level})",
                instr.address.block, instr.address.offset
            );
        }
    }
    Ok(())
}

pub fn run(machine: &mut Machine, instrs: &[Instr]) -> Result<(), AccessError> {
    for instr in instrs {
        execute(machine, instr)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::CostModel;
    use crate::memory::Address;
    use crate::replace::Policy;
    use crate::trace;

    fn machine(policy: Policy) -> Machine {
        Machine::new(10, 2, 4, 6, policy, CostModel::default()).unwrap()
    }

    #[test]
    fn a_write_dirties_the_line_and_sticks() {
        let mut machine = machine(Policy::Lru);
        let instr = Instr {
            address: Address { block: 3, offset: 2 },
            op: Operation::Write(99),
        };
        execute(&mut machine, &instr).unwrap();

        let line = &machine.l1.lines[0];
        assert_eq!(line.tag, Some(3));
        assert!(line.dirty);
        assert_eq!(line.block.words[2], 99);

        // Reading it back services the same line without another ram load.
        let read = Instr {
            address: Address { block: 3, offset: 2 },
            op: Operation::Read,
        };
        execute(&mut machine, &read).unwrap();
        assert_eq!(machine.stats.hit_l1, 1);
        assert_eq!(machine.stats.hit_ram, 1);
    }

    #[test]
    fn a_read_leaves_the_line_clean() {
        let mut machine = machine(Policy::Lru);
        let instr = Instr {
            address: Address { block: 5, offset: 0 },
            op: Operation::Read,
        };
        execute(&mut machine, &instr).unwrap();
        assert!(!machine.l1.lines[0].dirty);
    }

    #[test]
    fn out_of_range_instruction_propagates_the_rejection() {
        let mut machine = machine(Policy::Lru);
        let instr = Instr {
            address: Address {
                block: 99,
                offset: 0,
            },
            op: Operation::Read,
        };
        assert!(execute(&mut machine, &instr).is_err());
    }

    // N executed instructions land exactly N hits somewhere.
    #[test]
    fn hits_across_levels_sum_to_the_instruction_count() {
        for policy in [Policy::Direct, Policy::Lru, Policy::Lfu, Policy::Fifo] {
            let mut machine = machine(policy);
            let mut rng = fastrand::Rng::with_seed(1507);
            let instrs: Vec<Instr> = (0..200).map(|_| trace::random_instr(&mut rng, 10)).collect();
            run(&mut machine, &instrs).unwrap();

            let stats = &machine.stats;
            assert_eq!(stats.accesses(), 200);
            assert_eq!(stats.miss_l1, stats.hit_l2 + stats.hit_l3 + stats.hit_ram);
            assert_eq!(stats.miss_l2, stats.hit_l3 + stats.hit_ram);
            assert_eq!(stats.miss_l3, stats.hit_ram);
        }
    }
}
