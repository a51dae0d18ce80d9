//! Test utilities and fixtures for Ember development.
//!
//! Provides model artifacts with known weights ([`fixtures`]) and
//! scripted stand-ins for the driver's injected dependencies:
//! [`ScriptedRandom`] replays fixed draws and [`CountingPacer`] records
//! pauses instead of sleeping.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::VecDeque;
use std::time::Duration;

use ember_engine::{Pacer, RandomSource};

/// Replays a fixed sequence of draws, then returns 0 forever.
///
/// Draws are clamped below the requested bound so a script can never
/// produce an out-of-range value.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom {
    draws: VecDeque<u32>,
}

impl ScriptedRandom {
    pub fn new(draws: impl IntoIterator<Item = u32>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    /// Script one input per `(coarse, fine)` pair.
    pub fn inputs(pairs: &[(u32, u32)]) -> Self {
        Self::new(pairs.iter().flat_map(|&(c, f)| [c, f]))
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn below(&mut self, bound: u32) -> u32 {
        let v = self.draws.pop_front().unwrap_or(0);
        v.min(bound.saturating_sub(1))
    }
}

/// Records every pause instead of sleeping.
#[derive(Clone, Debug, Default)]
pub struct CountingPacer {
    pub pauses: Vec<Duration>,
}

impl CountingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.pauses.len()
    }
}

impl Pacer for CountingPacer {
    fn pause(&mut self, interval: Duration) {
        self.pauses.push(interval);
    }
}
