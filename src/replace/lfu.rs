use crate::memory::Cache;

/// Fewest services loses. Ties go to the lowest slot.
pub fn map(block: usize, cache: &Cache) -> usize {
    let mut victim = 0;
    for (slot, line) in cache.lines.iter().enumerate() {
        if line.tag == Some(block) {
            return slot;
        }
        if line.times_used < cache.lines[victim].times_used {
            victim = slot;
        }
    }
    victim
}
