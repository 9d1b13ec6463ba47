use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// How generated instances are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerateMode {
    /// Zero-like values and empty arrays.
    Empty,
    /// Random values and one-element arrays.
    Sample,
}

impl GenerateMode {
    /// `"empty"` (any case) selects [`GenerateMode::Empty`]; anything else is sampled.
    #[must_use]
    pub fn parse(mode: &str) -> Self {
        if mode.eq_ignore_ascii_case("empty") { Self::Empty } else { Self::Sample }
    }

    #[must_use]
    pub fn value_generator(self) -> Box<dyn ValueGenerator> {
        match self {
            Self::Empty => Box::new(EmptyValueGenerator),
            Self::Sample => Box::new(SampleValueGenerator::new()),
        }
    }
}

impl FromStr for GenerateMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Source of primitive values for [`super::InstanceGenerator`].
pub trait ValueGenerator: fmt::Debug {
    fn date_time(&mut self) -> DateTime<Utc>;
    fn integer(&mut self) -> i64;
    fn long(&mut self) -> i64;
    fn double(&mut self) -> f64;
    fn boolean(&mut self) -> bool;
    fn string(&mut self) -> String;
    /// Picks one of `members`; `None` only when there are none.
    fn enum_value<'m>(&mut self, members: &'m [String]) -> Option<&'m str>;
    fn array_length(&self) -> usize;
    /// Numeric suffix of generated identifiers, below 10 000.
    fn identifier_index(&mut self) -> u32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyValueGenerator;

impl ValueGenerator for EmptyValueGenerator {
    fn date_time(&mut self) -> DateTime<Utc> {
        Utc::now()
    }

    fn integer(&mut self) -> i64 {
        0
    }

    fn long(&mut self) -> i64 {
        0
    }

    fn double(&mut self) -> f64 {
        0.0
    }

    fn boolean(&mut self) -> bool {
        false
    }

    fn string(&mut self) -> String {
        String::new()
    }

    fn enum_value<'m>(&mut self, members: &'m [String]) -> Option<&'m str> {
        members.first().map(String::as_str)
    }

    fn array_length(&self) -> usize {
        0
    }

    fn identifier_index(&mut self) -> u32 {
        0
    }
}

const LOREM: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat",
];

/// Pseudo-random values and a lorem sentence for strings.
#[derive(Debug)]
pub struct SampleValueGenerator {
    rng: StdRng,
}

impl Default for SampleValueGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleValueGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self { rng: StdRng::from_os_rng() }
    }

    /// Reproducible output for a given seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl ValueGenerator for SampleValueGenerator {
    fn date_time(&mut self) -> DateTime<Utc> {
        Utc::now() - Duration::seconds(self.rng.random_range(0..=31_536_000))
    }

    fn integer(&mut self) -> i64 {
        self.rng.random_range(-32_768..=32_767)
    }

    fn long(&mut self) -> i64 {
        self.rng.random_range(-(1_i64 << 31)..(1_i64 << 31))
    }

    fn double(&mut self) -> f64 {
        (self.rng.random_range(-1_000_000.0..1_000_000.0_f64) * 1000.0).round() / 1000.0
    }

    fn boolean(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }

    fn string(&mut self) -> String {
        let count = self.rng.random_range(3..=8);
        let words: Vec<&str> =
            (0..count).filter_map(|_| LOREM.choose(&mut self.rng).copied()).collect();
        let mut sentence = words.join(" ");
        if let Some(first) = sentence.get_mut(..1) {
            first.make_ascii_uppercase();
        }
        sentence.push('.');
        sentence
    }

    fn enum_value<'m>(&mut self, members: &'m [String]) -> Option<&'m str> {
        members.choose(&mut self.rng).map(String::as_str)
    }

    fn array_length(&self) -> usize {
        1
    }

    fn identifier_index(&mut self) -> u32 {
        self.rng.random_range(0..10_000)
    }
}
