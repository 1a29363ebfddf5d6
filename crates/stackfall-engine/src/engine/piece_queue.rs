use std::{collections::VecDeque, fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Upcoming-piece queue driven by the 7-bag randomizer.
///
/// # 7-Bag System
///
/// 1. Put all 7 piece kinds in a "bag"
/// 2. Shuffle the bag
/// 3. Deal pieces from the bag in order
/// 4. Append a freshly shuffled bag whenever 7 or fewer pieces remain
///
/// Bags are only ever appended whole, so every run of 7 draws starting at a
/// bag boundary contains each kind exactly once.
///
/// # Example
///
/// ```
/// use stackfall_engine::PieceQueue;
///
/// let mut queue = PieceQueue::new();
///
/// let preview: Vec<_> = queue.peek(5).collect();
/// assert_eq!(queue.next(), preview[0]);
/// ```
#[derive(Debug, Clone)]
pub struct PieceQueue {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed written as 32 hex digits. Two queues built from the same
/// seed deal the same pieces, which makes games reproducible.
///
/// ```
/// use stackfall_engine::{PieceQueue, PieceSeed};
///
/// let seed: PieceSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
/// let mut a = PieceQueue::with_seed(seed);
/// let mut b = PieceQueue::with_seed(seed);
/// assert_eq!(a.next(), b.next());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

/// Error returned when a [`PieceSeed`] string is not 32 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed {input:?}: expected 32 hex digits")]
pub struct ParseSeedError {
    input: String,
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for PieceSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| err())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceQueue {
    /// Creates a queue seeded from the thread-local random generator.
    ///
    /// For a reproducible sequence, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but deals a deterministic sequence.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let rng = Pcg32::from_seed(seed.0);
        let bag = VecDeque::with_capacity(PieceKind::LEN * 2);
        let mut this = Self { rng, bag };
        this.fill_bag();
        this
    }

    /// Appends shuffled bags until more than 7 pieces are pending.
    ///
    /// After a draw at least 7 pieces remain, so the queue is never empty and
    /// a 7-piece preview never has to draw.
    fn fill_bag(&mut self) {
        while self.bag.len() <= PieceKind::LEN {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            self.bag.extend(new_bag);
        }
    }

    /// Removes and returns the next piece.
    ///
    /// # Panics
    ///
    /// Panics if the bag is empty (should never happen with proper refill logic).
    pub fn next(&mut self) -> PieceKind {
        let kind = self
            .bag
            .pop_front()
            .expect("piece bag should never be empty");
        self.fill_bag();
        kind
    }

    /// Iterates over every pending piece, in dealing order.
    pub fn upcoming(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().copied()
    }

    /// Returns the next `n` pieces without consuming them.
    ///
    /// At least 7 pieces are always available; longer requests are cut short.
    pub fn peek(&self, n: usize) -> impl Iterator<Item = PieceKind> + '_ {
        self.upcoming().take(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_from_bytes(bytes: [u8; 16]) -> PieceSeed {
        PieceSeed(bytes)
    }

    #[test]
    fn test_every_bag_contains_each_kind_once() {
        let mut queue = PieceQueue::with_seed(seed_from_bytes([7; 16]));
        for _ in 0..20 {
            let mut bag: Vec<_> = (0..PieceKind::LEN).map(|_| queue.next()).collect();
            bag.sort_by_key(|kind| *kind as u8);
            assert_eq!(bag, PieceKind::ALL);
        }
    }

    #[test]
    fn test_queue_never_runs_short() {
        let mut queue = PieceQueue::new();
        for _ in 0..50 {
            assert!(queue.upcoming().count() > PieceKind::LEN);
            queue.next();
            assert!(queue.peek(PieceKind::LEN).count() == PieceKind::LEN);
        }
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut queue = PieceQueue::new();
        let preview: Vec<_> = queue.peek(5).collect();
        assert_eq!(preview.len(), 5);
        assert_eq!(queue.peek(5).collect::<Vec<_>>(), preview);

        let drawn: Vec<_> = (0..5).map(|_| queue.next()).collect();
        assert_eq!(drawn, preview);
    }

    #[test]
    fn test_deterministic_piece_generation() {
        let seed = seed_from_bytes([
            0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66,
            0x77, 0x88,
        ]);

        let mut queue1 = PieceQueue::with_seed(seed);
        let mut queue2 = PieceQueue::with_seed(seed);

        for _ in 0..30 {
            assert_eq!(queue1.next(), queue2.next());
        }
    }

    mod piece_seed {
        use super::*;

        #[test]
        fn test_known_value_sequential_bytes() {
            let seed = seed_from_bytes([
                0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
                0x32, 0x10,
            ]);
            let serialized = serde_json::to_string(&seed).unwrap();

            // Big-endian: bytes appear in order as hex pairs
            assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");

            let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
            assert_eq!(deserialized, seed);
        }

        #[test]
        fn test_parse_accepts_uppercase() {
            let seed: PieceSeed = "0123456789ABCDEFFEDCBA9876543210".parse().unwrap();
            assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
        }

        #[test]
        fn test_parse_rejects_bad_input() {
            for input in [
                "",
                "0123456789abcdef0123456789abcde",
                "0123456789abcdef0123456789abcdef0",
                "ghijklmnopqrstuvwxyzghijklmnopqr",
                "+123456789abcdef0123456789abcdef",
            ] {
                let err = input.parse::<PieceSeed>().unwrap_err();
                assert!(err.to_string().contains("invalid hex seed"), "{input}");
            }
        }

        #[test]
        fn test_deserialize_error_is_reported() {
            let result: Result<PieceSeed, _> = serde_json::from_str("\"xyz\"");
            assert!(result.unwrap_err().to_string().contains("invalid hex seed"));
        }

        #[test]
        fn test_random_seed_roundtrip_keeps_sequence() {
            let seed: PieceSeed = rand::rng().random();
            let parsed: PieceSeed = seed.to_string().parse().unwrap();

            let mut queue1 = PieceQueue::with_seed(seed);
            let mut queue2 = PieceQueue::with_seed(parsed);
            for _ in 0..20 {
                assert_eq!(queue1.next(), queue2.next());
            }
        }
    }
}
