use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::Cell;

/// Square playing field. Valid cells are `[0, size)` on both axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Board {
    size: i32,
}

impl Board {
    pub fn new(size: i32) -> Self {
        Board { size }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn center(&self) -> Cell {
        (self.size / 2, self.size / 2)
    }

    pub fn contains(&self, (x, y): Cell) -> bool {
        x >= 0 && x < self.size && y >= 0 && y < self.size
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let size = self.size;
        (0..size).flat_map(move |y| (0..size).map(move |x| (x, y)))
    }

    pub fn free_cells<'a, I>(&self, occupied: I) -> Vec<Cell>
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        let taken: HashSet<Cell> = occupied.into_iter().copied().collect();
        self.cells().filter(|cell| !taken.contains(cell)).collect()
    }

    /// Picks uniformly among the cells not in `occupied`. `None` once the board is full.
    pub fn random_free_cell<'a, I, R>(&self, occupied: I, rng: &mut R) -> Option<Cell>
    where
        I: IntoIterator<Item = &'a Cell>,
        R: Rng + ?Sized,
    {
        self.free_cells(occupied).choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn bounds_are_half_open() {
        let board = Board::new(10);
        assert!(board.contains((0, 0)));
        assert!(board.contains((9, 9)));
        assert!(!board.contains((10, 5)));
        assert!(!board.contains((5, -1)));
    }

    #[test]
    fn free_cells_skip_occupied() {
        let board = Board::new(2);
        let free = board.free_cells(&[(0, 0), (1, 1)]);
        assert_eq!(free, vec![(1, 0), (0, 1)]);
    }

    #[test]
    fn random_free_cell_finds_the_only_gap() {
        let board = Board::new(3);
        let occupied: Vec<Cell> = board.cells().filter(|c| *c != (2, 1)).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..20 {
            assert_eq!(board.random_free_cell(&occupied, &mut rng), Some((2, 1)));
        }
    }

    #[test]
    fn full_board_has_no_free_cell() {
        let board = Board::new(2);
        let occupied: Vec<Cell> = board.cells().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        assert_eq!(board.random_free_cell(&occupied, &mut rng), None);
    }
}
