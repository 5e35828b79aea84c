use crate::memory::Cache;

/// First empty or matching slot in scan order wins; with none, the slot
/// with the smallest `time_in_cache` loses. That counter tracks recency,
/// not insertion order, so the victim is the most recently serviced line.
/// Deliberate: kept for parity with the other counter-driven policies.
pub fn map(block: usize, cache: &Cache) -> usize {
    let mut victim = 0;
    for (slot, line) in cache.lines.iter().enumerate() {
        if line.tag.is_none() || line.tag == Some(block) {
            return slot;
        }
        if line.time_in_cache < cache.lines[victim].time_in_cache {
            victim = slot;
        }
    }
    victim
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Cache;

    #[test]
    fn empty_slot_short_circuits() {
        let mut cache = Cache::new(3);
        cache.lines[0].tag = Some(1);
        cache.lines[2].tag = Some(2);
        assert_eq!(map(9, &cache), 1);
    }

    #[test]
    fn resident_block_short_circuits() {
        let mut cache = Cache::new(3);
        cache.lines[0].tag = Some(1);
        cache.lines[1].tag = Some(2);
        cache.lines[2].tag = Some(3);
        assert_eq!(map(3, &cache), 2);
    }

    #[test]
    fn earlier_empty_slot_wins_over_later_match() {
        let mut cache = Cache::new(3);
        cache.lines[0].tag = Some(1);
        cache.lines[2].tag = Some(9);
        assert_eq!(map(9, &cache), 1);
    }

    // The recency counter stands in for insertion order, so the full-cache
    // victim is the most recently serviced slot, not the oldest one.
    #[test]
    fn full_cache_victim_is_most_recently_serviced() {
        let mut cache = Cache::new(3);
        cache.lines[0].tag = Some(1);
        cache.lines[1].tag = Some(2);
        cache.lines[2].tag = Some(3);
        cache.lines[0].time_in_cache = 4;
        cache.lines[1].time_in_cache = 2;
        cache.lines[2].time_in_cache = 6;
        assert_eq!(map(9, &cache), 1);
    }
}
