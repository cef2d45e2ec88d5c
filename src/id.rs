// Identifier policies for newly created records

use crate::record::RecordId;
use serde::{Deserialize, Serialize};

/// Rule by which new records receive their identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdPolicy {
    /// 1, 2, 3, ... never reused, even after deletion
    Sequential,
    /// Random fixed-width identifier (default)
    #[default]
    Random,
}

impl IdPolicy {
    pub const VALUES: &[IdPolicy] = &[IdPolicy::Sequential, IdPolicy::Random];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdPolicy::Sequential => "sequential",
            IdPolicy::Random => "random",
        }
    }

    /// Build a fresh generator for this policy
    pub fn generator<I: RecordId>(self) -> Box<dyn IdGenerator<I>> {
        match self {
            IdPolicy::Sequential => Box::new(SequentialIds::default()),
            IdPolicy::Random => Box::new(RandomIds),
        }
    }
}

impl std::fmt::Display for IdPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IdPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" => Ok(IdPolicy::Sequential),
            "random" => Ok(IdPolicy::Random),
            _ => Err(format!("Invalid id policy: {} (expected sequential or random)", s)),
        }
    }
}

/// Source of candidate identifiers
///
/// The store calls `next_id` under its write lock and retries when the
/// candidate is already held, so a generator need not guarantee uniqueness.
pub trait IdGenerator<I>: Send + Sync {
    fn next_id(&mut self) -> I;
}

/// Monotonic counter; the n-th call yields `I::from_sequence(n)`
#[derive(Debug, Default)]
pub struct SequentialIds {
    last: u64,
}

impl<I: RecordId> IdGenerator<I> for SequentialIds {
    fn next_id(&mut self) -> I {
        self.last += 1;
        I::from_sequence(self.last)
    }
}

#[derive(Debug, Default)]
pub struct RandomIds;

impl<I: RecordId> IdGenerator<I> for RandomIds {
    fn next_id(&mut self) -> I {
        I::random()
    }
}
