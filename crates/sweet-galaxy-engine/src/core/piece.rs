use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::position::Position;

/// Color of a piece, drawn from a fixed palette.
///
/// The declaration order is the palette order used for tie-breaks.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum PieceColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl Distribution<PieceColor> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceColor {
        PieceColor::ALL[rng.random_range(0..PieceColor::LEN)]
    }
}

impl PieceColor {
    /// Number of colors in the palette (6).
    pub const LEN: usize = 6;

    /// All colors in palette order.
    pub const ALL: [Self; Self::LEN] = [
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Purple,
        Self::Orange,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the single-character representation of this color.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceColor::Red => 'R',
            PieceColor::Blue => 'B',
            PieceColor::Green => 'G',
            PieceColor::Yellow => 'Y',
            PieceColor::Purple => 'P',
            PieceColor::Orange => 'O',
        }
    }

    /// Parses a color from a single character (see [`Self::as_char`]).
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'R' => Some(PieceColor::Red),
            'B' => Some(PieceColor::Blue),
            'G' => Some(PieceColor::Green),
            'Y' => Some(PieceColor::Yellow),
            'P' => Some(PieceColor::Purple),
            'O' => Some(PieceColor::Orange),
            _ => None,
        }
    }
}

/// What a piece does when it is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    /// Ordinary piece, removes only itself.
    #[default]
    Plain,
    /// Clears its whole row.
    RowClear,
    /// Clears its whole column.
    ColumnClear,
    /// Clears the 3×3 block around it.
    AreaClear,
    /// Clears every piece of one color.
    ///
    /// When `target` is `None` the most frequent color on the board is used.
    /// Swap-time combinations always set a target, so an untargeted one only
    /// comes from a board handed to [`GameSession::from_parts`] or loaded
    /// from JSON.
    ///
    /// [`GameSession::from_parts`]: crate::GameSession::from_parts
    ColorClear { target: Option<PieceColor> },
}

impl PieceKind {
    #[must_use]
    pub const fn is_special(self) -> bool {
        !matches!(self, PieceKind::Plain)
    }

    #[must_use]
    pub const fn is_color_clear(self) -> bool {
        matches!(self, PieceKind::ColorClear { .. })
    }
}

/// Unique identity of a piece within a session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("#{_0}")]
pub struct PieceId(u32);

impl PieceId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// A single piece on the board.
///
/// Pieces are owned by the [`Board`](super::board::Board); the stored
/// position is kept in sync by the board whenever the piece is placed.
/// The `marked` flag is transient: it is set by the match detector and the
/// explosion resolver and only means something inside one cascade iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    id: PieceId,
    color: PieceColor,
    kind: PieceKind,
    position: Position,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    marked: bool,
}

impl Piece {
    /// Creates an unmarked plain piece.
    #[must_use]
    pub const fn new(id: PieceId, color: PieceColor, position: Position) -> Self {
        Self {
            id,
            color,
            kind: PieceKind::Plain,
            position,
            marked: false,
        }
    }

    #[must_use]
    pub const fn with_kind(self, kind: PieceKind) -> Self {
        Self { kind, ..self }
    }

    #[must_use]
    pub const fn id(&self) -> PieceId {
        self.id
    }

    #[must_use]
    pub const fn color(&self) -> PieceColor {
        self.color
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub const fn is_marked(&self) -> bool {
        self.marked
    }

    #[must_use]
    pub const fn is_special(&self) -> bool {
        self.kind.is_special()
    }

    pub(crate) fn set_marked(&mut self, marked: bool) {
        self.marked = marked;
    }

    pub(crate) fn set_kind(&mut self, kind: PieceKind) {
        self.kind = kind;
    }

    #[cfg(test)]
    pub(crate) fn set_color(&mut self, color: PieceColor) {
        self.color = color;
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_char_roundtrip() {
        for color in PieceColor::ALL {
            assert_eq!(PieceColor::from_char(color.as_char()), Some(color));
        }
        assert_eq!(PieceColor::from_char('x'), None);
    }

    #[test]
    fn test_palette_order_matches_index() {
        for (i, color) in PieceColor::ALL.into_iter().enumerate() {
            assert_eq!(color.index(), i);
        }
    }

    #[test]
    fn test_kind_classification() {
        assert!(!PieceKind::Plain.is_special());
        assert!(PieceKind::RowClear.is_special());
        assert!(PieceKind::AreaClear.is_special());
        assert!(PieceKind::ColorClear { target: None }.is_color_clear());
        assert!(!PieceKind::ColumnClear.is_color_clear());
    }

    #[test]
    fn test_piece_serialization_omits_clear_mark() {
        let pos = Position::new(1, 2).unwrap();
        let piece = Piece::new(PieceId::new(7), PieceColor::Green, pos);
        let json = serde_json::to_string(&piece).unwrap();
        assert!(!json.contains("marked"));
        let back: Piece = serde_json::from_str(&json).unwrap();
        assert_eq!(back, piece);
    }
}
