use std::fmt::Write as _;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{Board, Piece, PieceColor, PieceId, Position, Topology};

/// Seed for deterministic board generation.
///
/// A 128-bit seed for the generator that fills the starting board, refills
/// cleared cells and shuffles. Two sessions started from the same level and
/// seed, fed the same swaps, evolve identically. Serialized as a 32-digit hex
/// string.
///
/// # Example
///
/// ```
/// use rand::Rng as _;
/// use sweet_galaxy_engine::{BoardSeed, GameSession};
///
/// let seed: BoardSeed = rand::rng().random();
/// let a = GameSession::start_level(1, seed);
/// let b = GameSession::start_level(1, seed);
/// assert_eq!(a.board(), b.board());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSeed([u8; 16]);

impl BoardSeed {
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }

    #[must_use]
    pub const fn as_u128(self) -> u128 {
        u128::from_be_bytes(self.0)
    }
}

impl Serialize for BoardSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{:032x}", self.as_u128()).unwrap();
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for BoardSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid board seed {input:?}: expected 1 to 32 hex digits")]
pub struct ParseBoardSeedError {
    input: String,
}

impl std::str::FromStr for BoardSeed {
    type Err = ParseBoardSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > 32 {
            return Err(ParseBoardSeedError {
                input: s.to_owned(),
            });
        }
        u128::from_str_radix(s, 16)
            .map(Self::from_u128)
            .map_err(|_| ParseBoardSeedError {
                input: s.to_owned(),
            })
    }
}

impl std::fmt::Display for BoardSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:032x}", self.as_u128())
    }
}

/// Allows generating random `BoardSeed` values with `rng.random()`.
impl Distribution<BoardSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> BoardSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        BoardSeed(seed)
    }
}

/// Source of new pieces.
///
/// Owns the seeded PCG generator and the piece id counter, so every piece
/// that ever enters a session comes from here.
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    rng: Pcg32,
    next_id: u32,
}

impl Default for PieceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceGenerator {
    /// Creates a generator with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed.
    #[must_use]
    pub fn with_seed(seed: BoardSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            next_id: 0,
        }
    }

    /// Creates a generator whose ids start after every piece on `board`.
    ///
    /// Used when a session is built around a prepared board.
    #[must_use]
    pub fn continuing(seed: BoardSeed, board: &Board) -> Self {
        let mut this = Self::with_seed(seed);
        this.next_id = board
            .pieces()
            .map(|piece| piece.id().get() + 1)
            .max()
            .unwrap_or(0);
        this
    }

    fn next_id(&mut self) -> PieceId {
        let id = PieceId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Draws a plain piece of a random color.
    pub fn next_piece(&mut self, pos: Position) -> Piece {
        let color = self.rng.random();
        let id = self.next_id();
        Piece::new(id, color, pos)
    }

    /// Fills every piece-holding cell of `topology` with a plain piece.
    ///
    /// A color is re-rolled whenever it would complete a run of three with
    /// the two cells before it in the same row or column, so the result
    /// never contains a match.
    pub fn generate(&mut self, topology: &Topology) -> Board {
        let mut board = Board::EMPTY;
        for pos in Position::all() {
            if !topology.get(pos).holds_piece() {
                continue;
            }
            let color = loop {
                let color = self.rng.random();
                if !completes_run(&board, pos, color) {
                    break color;
                }
            };
            let id = self.next_id();
            board.place(pos, Piece::new(id, color, pos));
        }
        board
    }
}

fn completes_run(board: &Board, pos: Position, color: PieceColor) -> bool {
    let same = |p: Option<Position>| p.and_then(|p| board.color_at(p)) == Some(color);
    let left = pos.left();
    let up = pos.up();
    (same(left) && same(left.and_then(Position::left)))
        || (same(up) && same(up.and_then(Position::up)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::CellKind, engine::match_detector};

    const SEED: BoardSeed = BoardSeed::from_u128(0x5eed_0001);

    #[test]
    fn test_generated_board_has_no_matches() {
        for seed in 0..50 {
            let mut generator = PieceGenerator::with_seed(BoardSeed::from_u128(seed));
            for level in [1, 4, 9, 12, 30] {
                let topology = Topology::for_level(level);
                let board = generator.generate(&topology);
                assert!(!match_detector::detect(&board).has_matches);
            }
        }
    }

    #[test]
    fn test_generated_board_respects_topology() {
        let topology = Topology::for_level(20);
        let board = PieceGenerator::with_seed(SEED).generate(&topology);
        assert!(board.is_consistent_with(&topology));
        for pos in Position::all() {
            let kind = topology.get(pos);
            assert_eq!(board.get(pos).is_some(), kind.holds_piece(), "{pos} {kind:?}");
        }
        assert!(topology.count(CellKind::Void) > 0);
    }

    #[test]
    fn test_same_seed_same_board() {
        let topology = Topology::for_level(7);
        let a = PieceGenerator::with_seed(SEED).generate(&topology);
        let b = PieceGenerator::with_seed(SEED).generate(&topology);
        assert_eq!(a, b);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut generator = PieceGenerator::with_seed(SEED);
        let board = generator.generate(&Topology::PLAYABLE);
        let mut ids: Vec<_> = board.pieces().map(Piece::id).collect();
        let extra = generator.next_piece(Position::new(0, 0).unwrap());
        ids.push(extra.id());
        let count = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn test_continuing_skips_existing_ids() {
        let board = PieceGenerator::with_seed(SEED).generate(&Topology::PLAYABLE);
        let mut generator = PieceGenerator::continuing(SEED, &board);
        let piece = generator.next_piece(Position::new(0, 0).unwrap());
        assert!(board.pieces().all(|p| p.id() < piece.id()));
    }

    #[test]
    fn test_seed_serde_roundtrip() {
        let json = serde_json::to_string(&SEED).unwrap();
        assert_eq!(json, "\"0000000000000000000000005eed0001\"");
        let back: BoardSeed = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SEED);
        assert!(serde_json::from_str::<BoardSeed>("\"xyz\"").is_err());
    }

    #[test]
    fn test_seed_from_str() {
        assert_eq!("5eed0001".parse::<BoardSeed>().unwrap(), SEED);
        assert!("".parse::<BoardSeed>().is_err());
        assert!("g".parse::<BoardSeed>().is_err());
        assert!("1".repeat(33).parse::<BoardSeed>().is_err());
    }
}
