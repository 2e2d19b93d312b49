//! Dice state and the randomness seam.
//!
//! Die faces come from a [`Randomizer`], so games can run off the thread
//! RNG in production and off a seeded or scripted source in tests and
//! replays.

use crate::board::ConfigError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single die face; 1-6 once rolled
pub type DieValue = u8;

/// Sentinel for a die that has not been rolled yet.
///
/// Distinct from every real face, so "fresh dice" and "rolled a 1" are
/// never confused.
pub const UNROLLED: DieValue = 0;

/// Source of uniformly distributed die faces
pub trait Randomizer {
    /// Produce the next face, in 1..=6
    fn next_face(&mut self) -> DieValue;
}

/// Randomizer backed by the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandomizer;

impl Randomizer for ThreadRandomizer {
    fn next_face(&mut self) -> DieValue {
        rand::thread_rng().gen_range(1..=6)
    }
}

/// Deterministic randomizer for reproducible games and replays
#[derive(Debug, Clone)]
pub struct SeededRandomizer {
    rng: StdRng,
}

impl SeededRandomizer {
    /// Create a randomizer that replays the face sequence for `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Randomizer for SeededRandomizer {
    fn next_face(&mut self) -> DieValue {
        self.rng.gen_range(1..=6)
    }
}

/// A die index outside the configured die count
#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize)]
#[error("die index {index} out of range for {count} dice")]
pub struct OutOfRange {
    /// The offending index
    pub index: usize,
    /// How many dice the session has
    pub count: usize,
}

/// The session's dice: a fixed-length list of face values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dice {
    values: Vec<DieValue>,
}

impl Dice {
    /// Create `count` dice, all showing [`UNROLLED`]
    pub fn new(count: usize) -> Result<Self, ConfigError> {
        if count == 0 {
            return Err(ConfigError::DiceCount(count));
        }
        Ok(Self {
            values: vec![UNROLLED; count],
        })
    }

    /// Number of dice
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Face shown by die `index`, if it exists
    pub fn value(&self, index: usize) -> Option<DieValue> {
        self.values.get(index).copied()
    }

    /// All faces, in die order
    pub fn values(&self) -> &[DieValue] {
        &self.values
    }

    /// Sum of all faces; unrolled dice contribute 0
    pub fn total(&self) -> u32 {
        self.values.iter().map(|&v| u32::from(v)).sum()
    }

    /// Roll every die, overwriting all prior faces
    pub fn roll_all<R: Randomizer + ?Sized>(&mut self, randomizer: &mut R) -> &[DieValue] {
        for value in &mut self.values {
            *value = randomizer.next_face();
        }
        &self.values
    }

    /// Roll a single die, leaving the others untouched
    pub fn roll_one<R: Randomizer + ?Sized>(
        &mut self,
        index: usize,
        randomizer: &mut R,
    ) -> Result<DieValue, OutOfRange> {
        let count = self.values.len();
        let value = self.values.get_mut(index).ok_or(OutOfRange { index, count })?;
        *value = randomizer.next_face();
        Ok(*value)
    }
}
