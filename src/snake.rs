use std::collections::VecDeque;

use crate::Cell;
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical
}

impl Direction {
    /// Cell offset of one step. `y` grows downwards, as on screen.
    pub fn delta(self) -> Cell {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Up | Down => Axis::Vertical,
            Left | Right => Axis::Horizontal,
        }
    }

    pub fn moves_along(self, axis: Axis) -> bool {
        self.axis() == axis
    }
}

/// What a single body shift changed, so callers can redraw only the touched cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Move {
    pub new_head: Cell,
    pub old_head: Cell,
    pub old_tail: Option<Cell>,
}

#[derive(Clone, Debug)]
pub struct Snake {
    // Head first
    body: VecDeque<Cell>,
}

impl Snake {
    /// Lays out `size` cells starting at `head` and trailing away from `direction`.
    pub fn new(head: Cell, size: usize, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();

        let body = (0..size as i32)
            .map(|i| (head.0 - dx * i, head.1 - dy * i))
            .collect();
        Snake { body }
    }

    pub fn from_cells(cells: &[Cell]) -> Self {
        Snake { body: cells.iter().copied().collect() }
    }

    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Option<Cell> {
        self.body.front().copied()
    }

    pub fn next_head(&self, direction: Direction) -> Option<Cell> {
        let (dx, dy) = direction.delta();
        self.head().map(|(x, y)| (x + dx, y + dy))
    }

    /// Prepends `new_head` and drops the last cell, unless `grow` is set, in which
    /// case the old tail stays and the snake ends up one cell longer.
    pub fn advance(&mut self, new_head: Cell, grow: bool) -> Option<Move> {
        let old_head = self.head()?;
        self.body.push_front(new_head);

        let old_tail = if grow { None } else { self.body.pop_back() };
        Some(Move { new_head, old_head, old_tail })
    }

    pub fn bites_itself(&self) -> bool {
        match self.head() {
            Some(head) => self.body.iter().skip(1).any(|cell| *cell == head),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_snake_trails_behind_its_head() {
        let snake = Snake::new((5, 5), 3, Right);
        assert_eq!(snake.body().iter().copied().collect::<Vec<_>>(), vec![(5, 5), (4, 5), (3, 5)]);

        let snake = Snake::new((2, 2), 2, Up);
        assert_eq!(snake.body().iter().copied().collect::<Vec<_>>(), vec![(2, 2), (2, 3)]);
    }

    #[test]
    fn advance_shifts_without_growth() {
        let mut snake = Snake::new((5, 5), 3, Right);
        let mov = snake.advance((6, 5), false).unwrap();

        assert_eq!(mov, Move { new_head: (6, 5), old_head: (5, 5), old_tail: Some((3, 5)) });
        assert_eq!(snake.body().iter().copied().collect::<Vec<_>>(), vec![(6, 5), (5, 5), (4, 5)]);
    }

    #[test]
    fn advance_keeps_tail_when_growing() {
        let mut snake = Snake::new((5, 5), 3, Right);
        let mov = snake.advance((6, 5), true).unwrap();

        assert_eq!(mov.old_tail, None);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.body().back(), Some(&(3, 5)));
    }

    #[test]
    fn detects_head_on_body() {
        let snake = Snake::from_cells(&[(4, 5), (5, 5), (5, 6), (4, 6), (4, 5)]);
        assert!(snake.bites_itself());

        let snake = Snake::from_cells(&[(4, 5), (5, 5), (5, 6)]);
        assert!(!snake.bites_itself());
    }

    #[test]
    fn axes() {
        assert!(Up.moves_along(Axis::Vertical));
        assert!(!Left.moves_along(Axis::Vertical));
    }
}
