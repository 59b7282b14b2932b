use serde::{Deserialize, Serialize};

use super::position::{GRID_SIZE, Position};

// Level at which each non-playable cell kind first appears.
const VOID_FROM_LEVEL: u32 = 4;
const OBSTRUCTION_FROM_LEVEL: u32 = 6;
const GEL_FROM_LEVEL: u32 = 9;
const LOCK_FROM_LEVEL: u32 = 12;

// Upper bound on how many cells of each kind a level places.
const MAX_VOIDS: u32 = 6;
const MAX_OBSTRUCTIONS: u32 = 5;
const MAX_GELS: u32 = 8;
const MAX_LOCKS: u32 = 6;

/// Classification of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    /// Ordinary cell that holds a piece.
    #[default]
    Playable,
    /// Hole in the board; never holds a piece.
    Void,
    /// Blocker without a piece, removed by an adjacent resolution.
    Obstruction,
    /// Coating over a playable cell; the piece underneath behaves normally.
    Gel,
    /// Holds a piece that cannot be swapped until unlocked.
    Locked,
}

impl CellKind {
    /// Returns `true` if a piece lives in a cell of this kind.
    #[must_use]
    pub const fn holds_piece(self) -> bool {
        matches!(self, CellKind::Playable | CellKind::Gel | CellKind::Locked)
    }

    /// Returns `true` if the piece in a cell of this kind may be swapped.
    #[must_use]
    pub const fn is_swappable(self) -> bool {
        matches!(self, CellKind::Playable | CellKind::Gel)
    }

    /// Returns `true` if an adjacent resolution turns this cell playable.
    #[must_use]
    pub const fn is_clearable(self) -> bool {
        matches!(
            self,
            CellKind::Obstruction | CellKind::Gel | CellKind::Locked
        )
    }
}

/// Per-level layout of cell kinds.
///
/// A topology is derived once per level by [`Topology::for_level`] and then
/// evolves during the session as obstructions, gel and locks are cleared.
///
/// # Example
///
/// ```
/// use sweet_galaxy_engine::{CellKind, Topology};
///
/// assert_eq!(Topology::for_level(1), Topology::PLAYABLE);
/// assert!(Topology::for_level(12).count(CellKind::Locked) > 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    cells: [[CellKind; GRID_SIZE]; GRID_SIZE],
}

impl Default for Topology {
    fn default() -> Self {
        Self::PLAYABLE
    }
}

impl Topology {
    /// A layout where every cell is playable.
    pub const PLAYABLE: Self = Self {
        cells: [[CellKind::Playable; GRID_SIZE]; GRID_SIZE],
    };

    /// Derives the layout for a level.
    ///
    /// The result is a pure function of `level`. Voids are introduced first,
    /// then obstructions, gel and locks; the number of each grows with the
    /// level up to a cap. A placement that lands on a cell already taken
    /// moves forward in row-major order to the next playable cell, so every
    /// requested cell is placed and later kinds never overwrite earlier ones.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn for_level(level: u32) -> Self {
        let mut topology = Self::PLAYABLE;
        let size = GRID_SIZE as u32;
        let cell = |row: u32, col: u32| Position::new((row % size) as usize, (col % size) as usize);

        if level >= VOID_FROM_LEVEL {
            let count = u32::min(2 + level / 3, MAX_VOIDS);
            for i in 0..count {
                topology.place(cell(level + i * 3, level * 2 + i * 5), CellKind::Void);
            }
        }

        if level >= OBSTRUCTION_FROM_LEVEL {
            let count = u32::min(1 + (level - OBSTRUCTION_FROM_LEVEL) / 2, MAX_OBSTRUCTIONS);
            let center = size / 2;
            for i in 0..count {
                topology.place(
                    cell(center + i % 2 - 1, center + i / 2 - 1),
                    CellKind::Obstruction,
                );
            }
        }

        if level >= GEL_FROM_LEVEL {
            let count = u32::min(2 + (level - GEL_FROM_LEVEL), MAX_GELS);
            for i in 0..count {
                topology.place(cell(level * 7 + i * 11, level * 3 + i * 7), CellKind::Gel);
            }
        }

        if level >= LOCK_FROM_LEVEL {
            let count = u32::min(2 + (level - LOCK_FROM_LEVEL) / 3, MAX_LOCKS);
            for i in 0..count {
                topology.place(cell(level * 5 + i * 13, level * 4 + i * 9), CellKind::Locked);
            }
        }

        topology
    }

    fn place(&mut self, pos: Option<Position>, kind: CellKind) {
        let Some(pos) = pos else {
            return;
        };
        let start = pos.row() * GRID_SIZE + pos.col();
        let target = (0..GRID_SIZE * GRID_SIZE)
            .map(|offset| (start + offset) % (GRID_SIZE * GRID_SIZE))
            .filter_map(|index| Position::new(index / GRID_SIZE, index % GRID_SIZE))
            .find(|pos| self.get(*pos) == CellKind::Playable);
        if let Some(target) = target {
            self.set(target, kind);
        }
    }

    #[must_use]
    pub fn get(&self, pos: Position) -> CellKind {
        self.cells[pos.row()][pos.col()]
    }

    pub fn set(&mut self, pos: Position, kind: CellKind) {
        self.cells[pos.row()][pos.col()] = kind;
    }

    /// Returns an iterator over the rows of the layout, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[CellKind; GRID_SIZE]> {
        self.cells.iter()
    }

    /// Number of cells of the given kind.
    #[must_use]
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().flatten().filter(|k| **k == kind).count()
    }

    /// Cells of column `col` that hold pieces, from top to bottom.
    pub fn piece_cells_in_column(&self, col: usize) -> impl DoubleEndedIterator<Item = Position> {
        (0..GRID_SIZE)
            .filter_map(move |row| Position::new(row, col))
            .filter(move |pos| self.get(*pos).holds_piece())
    }

    /// Turns every clearable cell at or around the given positions into a
    /// playable cell.
    ///
    /// Returns the number of cells that changed.
    pub fn clear_around<I>(&mut self, positions: I) -> usize
    where
        I: IntoIterator<Item = Position>,
    {
        let mut cleared = 0;
        for center in positions {
            for pos in center.area() {
                if self.get(pos).is_clearable() {
                    self.set(pos, CellKind::Playable);
                    cleared += 1;
                }
            }
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [CellKind; 4] = [
        CellKind::Void,
        CellKind::Obstruction,
        CellKind::Gel,
        CellKind::Locked,
    ];

    #[test]
    fn test_for_level_is_deterministic() {
        for level in 1..=60 {
            assert_eq!(Topology::for_level(level), Topology::for_level(level));
        }
    }

    #[test]
    fn test_early_levels_are_fully_playable() {
        for level in 1..VOID_FROM_LEVEL {
            assert_eq!(Topology::for_level(level), Topology::PLAYABLE);
        }
    }

    #[test]
    fn test_introduction_order() {
        let first_level_with = |kind| (1..100).find(|&level| Topology::for_level(level).count(kind) > 0);
        assert_eq!(first_level_with(CellKind::Void), Some(VOID_FROM_LEVEL));
        assert_eq!(
            first_level_with(CellKind::Obstruction),
            Some(OBSTRUCTION_FROM_LEVEL)
        );
        assert_eq!(first_level_with(CellKind::Gel), Some(GEL_FROM_LEVEL));
        assert_eq!(first_level_with(CellKind::Locked), Some(LOCK_FROM_LEVEL));
    }

    #[test]
    fn test_counts_are_capped() {
        for level in 1..=500 {
            let topology = Topology::for_level(level);
            assert!(topology.count(CellKind::Void) <= MAX_VOIDS as usize);
            assert!(topology.count(CellKind::Obstruction) <= MAX_OBSTRUCTIONS as usize);
            assert!(topology.count(CellKind::Gel) <= MAX_GELS as usize);
            assert!(topology.count(CellKind::Locked) <= MAX_LOCKS as usize);
            let special: usize = ALL_KINDS.iter().map(|k| topology.count(*k)).sum();
            assert_eq!(
                topology.count(CellKind::Playable) + special,
                GRID_SIZE * GRID_SIZE
            );
        }
    }

    #[test]
    fn test_counts_are_monotonic() {
        let mut previous = Topology::for_level(1);
        for level in 2..=500 {
            let topology = Topology::for_level(level);
            for kind in ALL_KINDS {
                assert!(
                    topology.count(kind) >= previous.count(kind),
                    "level {level}: {kind:?} {} < {}",
                    topology.count(kind),
                    previous.count(kind)
                );
            }
            previous = topology;
        }
    }

    #[test]
    fn test_counts_reach_caps() {
        let topology = Topology::for_level(500);
        assert_eq!(topology.count(CellKind::Void), MAX_VOIDS as usize);
        assert_eq!(topology.count(CellKind::Obstruction), MAX_OBSTRUCTIONS as usize);
        assert_eq!(topology.count(CellKind::Gel), MAX_GELS as usize);
        assert_eq!(topology.count(CellKind::Locked), MAX_LOCKS as usize);
        assert_eq!(Topology::for_level(16).count(CellKind::Locked), 3);
    }

    #[test]
    fn test_clear_around_converts_neighbourhood() {
        let mut topology = Topology::PLAYABLE;
        let center = Position::new(3, 3).unwrap();
        let gel = Position::new(2, 2).unwrap();
        let lock = Position::new(4, 4).unwrap();
        let stone = Position::new(3, 4).unwrap();
        let hole = Position::new(2, 3).unwrap();
        let far = Position::new(6, 6).unwrap();
        topology.set(gel, CellKind::Gel);
        topology.set(lock, CellKind::Locked);
        topology.set(stone, CellKind::Obstruction);
        topology.set(hole, CellKind::Void);
        topology.set(far, CellKind::Gel);

        let cleared = topology.clear_around([center]);

        assert_eq!(cleared, 3);
        assert_eq!(topology.get(gel), CellKind::Playable);
        assert_eq!(topology.get(lock), CellKind::Playable);
        assert_eq!(topology.get(stone), CellKind::Playable);
        assert_eq!(topology.get(hole), CellKind::Void);
        assert_eq!(topology.get(far), CellKind::Gel);
    }

    #[test]
    fn test_piece_cells_skip_voids_and_obstructions() {
        let mut topology = Topology::PLAYABLE;
        topology.set(Position::new(1, 0).unwrap(), CellKind::Void);
        topology.set(Position::new(5, 0).unwrap(), CellKind::Obstruction);
        topology.set(Position::new(6, 0).unwrap(), CellKind::Locked);
        let rows: Vec<_> = topology.piece_cells_in_column(0).map(Position::row).collect();
        assert_eq!(rows, vec![0, 2, 3, 4, 6, 7]);
    }
}
