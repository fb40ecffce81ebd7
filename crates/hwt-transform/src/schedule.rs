//! Splitting a Haar transform into bounded-capacity dispatches
//!
//! Every level after the first needs the previous level's results from all
//! threads that produced them, and only threads inside one work group can
//! synchronize. A group of `G` threads owns `2G` samples, so one dispatch can
//! run at most `capacity = log2(G_max) + 1` levels. Signals needing more levels
//! are transformed in several dispatches, each picking up the low-pass band the
//! previous one left behind.

use hwt_core::{require_levels, HwtError, HwtResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Inverse,
}

/// One dispatch of a scheduled transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
    /// Consecutive levels run inside each group
    pub levels: u32,
    /// Threads per group, `2^(levels - 1)`
    pub group_size: usize,
    /// Threads launched for each signal
    pub threads_per_signal: usize,
    /// Low-pass band length per signal when the pass starts
    pub low_len: usize,
}

impl Pass {
    /// Groups launched for each signal
    pub fn groups_per_signal(&self) -> usize {
        self.threads_per_signal / self.group_size
    }

    /// Total threads for a batch of `num_signals` signals
    pub fn global_size(&self, num_signals: usize) -> usize {
        self.threads_per_signal * num_signals
    }
}

/// Iterator over the dispatches needed for one transform
#[derive(Debug, Clone)]
pub struct LevelSchedule {
    direction: Direction,
    capacity: u32,
    levels_remaining: u32,
    /// Forward: threads still needed per signal. Inverse: current low-pass length.
    cursor: usize,
}

impl LevelSchedule {
    /// Forward passes for signals of `signal_len` samples
    pub fn forward(signal_len: usize, capacity: u32) -> HwtResult<Self> {
        let levels = Self::validate(signal_len, capacity)?;
        Ok(Self {
            direction: Direction::Forward,
            capacity,
            levels_remaining: levels,
            cursor: signal_len >> 1,
        })
    }

    /// Inverse passes for signals of `signal_len` samples
    pub fn inverse(signal_len: usize, capacity: u32) -> HwtResult<Self> {
        let levels = Self::validate(signal_len, capacity)?;
        Ok(Self {
            direction: Direction::Inverse,
            capacity,
            levels_remaining: levels,
            cursor: 1,
        })
    }

    fn validate(signal_len: usize, capacity: u32) -> HwtResult<u32> {
        let levels = require_levels(signal_len)?;
        if capacity == 0 {
            return Err(HwtError::InvalidParameter(
                "dispatch capacity must allow at least one level".to_string(),
            ));
        }
        Ok(levels)
    }

    /// Number of passes still to come
    pub fn pass_count(&self) -> usize {
        self.levels_remaining.div_ceil(self.capacity) as usize
    }
}

impl Iterator for LevelSchedule {
    type Item = Pass;

    fn next(&mut self) -> Option<Pass> {
        if self.levels_remaining == 0 {
            return None;
        }

        let levels = self.levels_remaining.min(self.capacity);
        let group_size = 1usize << (levels - 1);
        let pass = match self.direction {
            Direction::Forward => {
                let pass = Pass {
                    levels,
                    group_size,
                    threads_per_signal: self.cursor,
                    low_len: self.cursor << 1,
                };
                self.cursor >>= levels;
                pass
            }
            Direction::Inverse => {
                let pass = Pass {
                    levels,
                    group_size,
                    threads_per_signal: group_size * self.cursor,
                    low_len: self.cursor,
                };
                self.cursor <<= levels;
                pass
            }
        };
        self.levels_remaining -= levels;
        Some(pass)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.pass_count();
        (n, Some(n))
    }
}

impl ExactSizeIterator for LevelSchedule {}
