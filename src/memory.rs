use std::fmt;

/// Words per block, the unit of transfer between ram and the caches.
pub const WORDS_PER_BLOCK: usize = 4;

pub type Word = i32;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub words: [Word; WORDS_PER_BLOCK],
}

/// Which part of the hierarchy serviced an access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitLevel {
    L1,
    L2,
    L3,
    Ram,
}

impl fmt::Display for HitLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HitLevel::L1 => "CL1",
            HitLevel::L2 => "CL2",
            HitLevel::L3 => "CL3",
            HitLevel::Ram => "RAM",
        })
    }
}

/// A cache level a line can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    L1,
    L2,
    L3,
}

#[derive(Debug, Clone)]
pub struct Line {
    /// Block address this line holds, `None` while the line is empty.
    pub tag: Option<usize>,
    pub block: Block,
    /// The line's copy differs from ram's and must be written back before
    /// the slot is reused.
    pub dirty: bool,
    pub times_used: u64,
    pub time_in_cache: u64,
    pub last_hit: Option<HitLevel>,
}

impl Line {
    fn empty() -> Self {
        Line {
            tag: None,
            block: Block::default(),
            dirty: false,
            times_used: 0,
            time_in_cache: 0,
            last_hit: None,
        }
    }

    /// An empty or clean line may be overwritten outright; a valid dirty
    /// line holds the only up-to-date copy of its block.
    pub fn replaceable(&self) -> bool {
        self.tag.is_none() || !self.dirty
    }
}

#[derive(Debug)]
pub struct Cache {
    pub lines: Vec<Line>,
}

impl Cache {
    pub fn new(size: usize) -> Self {
        Cache {
            lines: vec![Line::empty(); size],
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// One clock tick: every line ages, resident or not.
    pub fn tick(&mut self) {
        for line in &mut self.lines {
            line.time_in_cache += 1;
        }
    }
}

#[derive(Debug)]
pub struct Ram {
    pub blocks: Vec<Block>,
}

impl Ram {
    pub fn new(size: usize) -> Self {
        Ram {
            blocks: vec![Block::default(); size],
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub block: usize,
    pub offset: usize,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{word}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Some(tag) => write!(f, "tag={tag:>4}")?,
            None => f.write_str("tag=   -")?,
        }
        write!(
            f,
            " {} used={:>3} age={:>3} via={} | {}",
            if self.dirty { "dirty" } else { "clean" },
            self.times_used,
            self.time_in_cache,
            match self.last_hit {
                Some(level) => level.to_string(),
                None => "---".to_string(),
            },
            self.block,
        )
    }
}
