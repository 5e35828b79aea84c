use std::{
    fmt, fs,
    io::{self, BufRead, BufReader},
    path::PathBuf,
    str::FromStr,
    thread::{self, JoinHandle},
};

use crossbeam::channel::{Receiver, Sender};
use thiserror::Error;

use crate::memory::{Address, Word, WORDS_PER_BLOCK};

/// What an instruction does to the addressed word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write(Word),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instr {
    pub address: Address,
    pub op: Operation,
}

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("io error reading trace: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

impl FromStr for Instr {
    type Err = String;

    // `R <block> <offset>` reads, `W <block> <offset> <value>` writes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let kind = parts.next().ok_or("empty instruction")?;
        let block = parts
            .next()
            .ok_or("missing block address")?
            .parse::<usize>()
            .map_err(|err| format!("bad block address: {err}"))?;
        let offset = parts
            .next()
            .ok_or("missing word offset")?
            .parse::<usize>()
            .map_err(|err| format!("bad word offset: {err}"))?;
        let op = match kind {
            "R" | "r" => Operation::Read,
            "W" | "w" => {
                let value = parts
                    .next()
                    .ok_or("missing value to write")?
                    .parse::<Word>()
                    .map_err(|err| format!("bad value: {err}"))?;
                Operation::Write(value)
            }
            other => return Err(format!("unknown operation {other:?}")),
        };
        if parts.next().is_some() {
            return Err("trailing fields".into());
        }
        Ok(Instr {
            address: Address { block, offset },
            op,
        })
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Operation::Read => write!(f, "R {} {}", self.address.block, self.address.offset),
            Operation::Write(value) => write!(
                f,
                "W {} {} {}",
                self.address.block, self.address.offset, value
            ),
        }
    }
}

/// An instruction stream fed from a background thread in batches, so the
/// producer runs ahead of the machine.
pub struct Trace {
    pub rec: Receiver<Result<Vec<Instr>, TraceError>>,
    _thread: JoinHandle<()>,
}

impl Trace {
    /// Streams a text trace, one instruction per line; blank lines and
    /// `#` comments are skipped. The stream ends at the first bad line.
    pub fn read(path: PathBuf, instr_per_block: usize, blocks_per_queue: usize) -> io::Result<Trace> {
        let stream = fs::File::open(path)?;
        let (sender, receiver) = crossbeam::channel::bounded(blocks_per_queue);

        let t = thread::spawn(move || Trace::run_thread(stream, instr_per_block, sender));

        Ok(Trace {
            rec: receiver,
            _thread: t,
        })
    }

    fn run_thread(
        stream: fs::File,
        instr_per_block: usize,
        queue: Sender<Result<Vec<Instr>, TraceError>>,
    ) {
        let reader = BufReader::new(stream);
        let mut buffer = Vec::with_capacity(instr_per_block);
        for (idx, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    let _ = queue.send(Err(err.into()));
                    return;
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match trimmed.parse::<Instr>() {
                Ok(instr) => buffer.push(instr),
                Err(reason) => {
                    let _ = queue.send(Err(TraceError::Parse {
                        line: idx + 1,
                        reason,
                    }));
                    return;
                }
            }
            if buffer.len() == instr_per_block {
                let full = std::mem::replace(&mut buffer, Vec::with_capacity(instr_per_block));
                if queue.send(Ok(full)).is_err() {
                    return;
                }
            }
        }
        if !buffer.is_empty() {
            let _ = queue.send(Ok(buffer));
        }
    }

    /// Generates `count` uniformly random instructions over the ram. The
    /// rng is built by the caller, so runs are reproducible by seed.
    pub fn random(
        count: usize,
        ram_blocks: usize,
        mut rng: fastrand::Rng,
        instr_per_block: usize,
        blocks_per_queue: usize,
    ) -> Trace {
        let (sender, receiver) = crossbeam::channel::bounded(blocks_per_queue);

        let t = thread::spawn(move || {
            let mut left = count;
            while left > 0 {
                let batch_len = instr_per_block.min(left);
                let batch = (0..batch_len)
                    .map(|_| random_instr(&mut rng, ram_blocks))
                    .collect();
                if sender.send(Ok(batch)).is_err() {
                    return;
                }
                left -= batch_len;
            }
        });

        Trace {
            rec: receiver,
            _thread: t,
        }
    }
}

pub fn random_instr(rng: &mut fastrand::Rng, ram_blocks: usize) -> Instr {
    let address = Address {
        block: rng.usize(0..ram_blocks),
        offset: rng.usize(0..WORDS_PER_BLOCK),
    };
    let op = if rng.bool() {
        Operation::Write(rng.i32(..))
    } else {
        Operation::Read
    };
    Instr { address, op }
}
