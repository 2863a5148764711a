use std::collections::VecDeque;
use std::time::{Duration, Instant};

use color_eyre::eyre::{bail, Result};
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::board::Board;
use crate::config::{tick_interval, GameConfig};
use crate::snake::{Direction, Move, Snake};
use crate::Cell;

pub const INITIAL_LENGTH: usize = 3;

/// Smallest board that fits the initial snake centred on it plus one food cell.
pub const MIN_BOARD_SIZE: i32 = 4;

/// Largest board accepted. Food placement scans every cell, and the terminal layout
/// has to fit in `u16` columns.
pub const MAX_BOARD_SIZE: i32 = 1000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EndReason {
    HitWall,
    HitSelf,
    /// No free cell left for food. The player filled the board.
    BoardFull,
}

/// One game of snake: the body, the food, the heading and the clock.
///
/// Nothing here runs on its own. A driver calls [`GameState::step`] once per tick and
/// stops as soon as [`GameState::is_finished`] turns true; further steps are ignored.
pub struct GameState<R = ChaCha8Rng> {
    board: Board,
    speed: u32,
    snake: Snake,
    // Direction of the last step taken, and the one the next step will take
    heading: Direction,
    pending: Direction,
    food: Option<Cell>,
    rng: R,
    started: Instant,
    ended: Option<Instant>,
    end_reason: Option<EndReason>,
}

impl GameState<ChaCha8Rng> {
    pub fn new(config: &GameConfig) -> Result<Self> {
        Self::initialize(config.board_size, config.speed, config.food_seed)
    }

    /// Food placement is driven by a generator seeded from `food_seed`, so equal seeds
    /// and equal inputs replay the same game.
    pub fn initialize(board_size: i32, speed: u32, food_seed: i64) -> Result<Self> {
        Self::with_rng(board_size, speed, ChaCha8Rng::seed_from_u64(food_seed as u64))
    }
}

impl<R: Rng> GameState<R> {
    pub fn with_rng(board_size: i32, speed: u32, rng: R) -> Result<Self> {
        if board_size < MIN_BOARD_SIZE {
            bail!(
                "board size {} is too small, need at least {} to fit the initial snake and food",
                board_size,
                MIN_BOARD_SIZE
            );
        }
        if board_size > MAX_BOARD_SIZE {
            bail!("board size {} is too large, at most {} is supported", board_size, MAX_BOARD_SIZE);
        }
        if speed == 0 {
            bail!("speed must be at least 1 tick per second");
        }

        let board = Board::new(board_size);
        let snake = Snake::new(board.center(), INITIAL_LENGTH, Direction::Right);

        let mut state = GameState {
            board,
            speed,
            snake,
            heading: Direction::Right,
            pending: Direction::Right,
            food: None,
            rng,
            started: Instant::now(),
            ended: None,
            end_reason: None,
        };
        state.respawn_food();

        info!("new game on a {0}x{0} board at {1} ticks/s", board_size, speed);
        Ok(state)
    }

    pub fn move_up(&mut self) -> bool {
        self.request_direction(Direction::Up)
    }

    pub fn move_down(&mut self) -> bool {
        self.request_direction(Direction::Down)
    }

    pub fn move_left(&mut self) -> bool {
        self.request_direction(Direction::Left)
    }

    pub fn move_right(&mut self) -> bool {
        self.request_direction(Direction::Right)
    }

    /// Queues `direction` for the next step. Only turns are accepted: a request along
    /// the axis the snake is already travelling on is ignored and returns `false`.
    pub fn request_direction(&mut self, direction: Direction) -> bool {
        if self.heading.moves_along(direction.axis()) {
            debug!("ignoring {:?} while heading {:?}", direction, self.heading);
            return false;
        }

        self.pending = direction;
        true
    }

    /// Advances the game by one tick and reports which cells changed.
    /// Returns `None` when the game had already finished.
    pub fn step(&mut self) -> Option<Move> {
        if self.is_finished() {
            return None;
        }

        self.heading = self.pending;
        let new_head = self.snake.next_head(self.heading)?;
        let ate = self.food == Some(new_head);
        let mov = self.snake.advance(new_head, ate)?;

        if !self.board.contains(new_head) {
            self.finish(EndReason::HitWall);
        } else if self.snake.bites_itself() {
            self.finish(EndReason::HitSelf);
        } else if ate {
            debug!("ate food at {:?}, length is now {}", new_head, self.snake.len());
            self.respawn_food();
        }

        Some(mov)
    }

    /// Drops the current food and places a new one on a uniformly chosen free cell.
    /// Finishes the game when no free cell is left.
    pub fn respawn_food(&mut self) -> Option<Cell> {
        self.food = self.board.random_free_cell(self.snake.body(), &mut self.rng);

        match self.food {
            Some(cell) => debug!("food placed at {:?}", cell),
            None => self.finish(EndReason::BoardFull),
        }
        self.food
    }

    fn finish(&mut self, reason: EndReason) {
        if self.end_reason.is_some() {
            return;
        }

        self.end_reason = Some(reason);
        self.ended = Some(Instant::now());
        info!("game over ({:?}) with score {} after {:.2}s", reason, self.score(), self.duration().as_secs_f64());
    }

    /// Body cells, head first.
    pub fn snake(&self) -> &VecDeque<Cell> {
        self.snake.body()
    }

    pub fn head(&self) -> Option<Cell> {
        self.snake.head()
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    pub fn score(&self) -> usize {
        self.snake.len().saturating_sub(INITIAL_LENGTH)
    }

    /// Time since the game was created, frozen once it finishes.
    pub fn duration(&self) -> Duration {
        self.ended.unwrap_or_else(Instant::now).duration_since(self.started)
    }

    pub fn is_finished(&self) -> bool {
        self.end_reason.is_some()
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn pending_direction(&self) -> Direction {
        self.pending
    }

    pub fn board_size(&self) -> i32 {
        self.board.size()
    }

    pub fn tick_interval(&self) -> Duration {
        tick_interval(self.speed)
    }

    /// Replaces the body and heading. Bodies shorter than two cells are rejected.
    pub fn debug_set_snake(&mut self, head_first: &[Cell], heading: Direction) -> Result<()> {
        if head_first.len() < 2 {
            bail!("a snake needs at least 2 cells, got {}", head_first.len());
        }

        self.snake = Snake::from_cells(head_first);
        self.heading = heading;
        self.pending = heading;
        self.end_reason = None;
        self.ended = None;
        Ok(())
    }

    pub fn debug_set_food(&mut self, cell: Cell) {
        self.food = Some(cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn cells(state: &GameState<impl Rng>) -> Vec<Cell> {
        state.snake().iter().copied().collect()
    }

    #[test]
    fn starts_centred_and_heading_right() {
        let state = GameState::initialize(10, 5, 1).unwrap();

        assert_eq!(cells(&state), vec![(5, 5), (4, 5), (3, 5)]);
        assert_eq!(state.heading(), Direction::Right);
        assert_eq!(state.score(), 0);
        assert!(!state.is_finished());

        let food = state.food().unwrap();
        assert!(!state.snake().contains(&food));
    }

    #[test]
    fn rejects_degenerate_configuration() {
        assert!(GameState::initialize(3, 5, 1).is_err());
        assert!(GameState::initialize(0, 5, 1).is_err());
        assert!(GameState::initialize(10, 0, 1).is_err());
        assert!(GameState::initialize(MAX_BOARD_SIZE + 1, 5, 1).is_err());
        assert!(GameState::initialize(i32::MAX, 5, 1).is_err());
        assert!(GameState::initialize(MIN_BOARD_SIZE, 1, 1).is_ok());
    }

    #[test]
    fn turns_only_across_the_current_axis() {
        let mut state = GameState::initialize(10, 5, 1).unwrap();

        assert!(!state.move_left());
        assert!(!state.move_right());
        assert_eq!(state.pending_direction(), Direction::Right);

        assert!(state.move_up());
        assert_eq!(state.pending_direction(), Direction::Up);

        // Still travelling right until the next step
        assert!(!state.move_left());
        assert_eq!(state.pending_direction(), Direction::Up);

        state.debug_set_food((0, 0));
        state.step();
        assert_eq!(state.head(), Some((5, 4)));
        assert!(!state.move_down());
        assert!(state.move_left());
    }

    #[test]
    fn mock_rng_still_lands_food_on_a_free_cell() {
        let mut state = GameState::with_rng(4, 1, StepRng::new(0, 0)).unwrap();

        for _ in 0..5 {
            let food = state.respawn_food().unwrap();
            assert!(!state.snake().contains(&food));
        }
    }

    #[test]
    fn stepping_a_finished_game_does_nothing() {
        let mut state = GameState::initialize(10, 5, 1).unwrap();
        state.debug_set_food((0, 0));
        state.debug_set_snake(&[(9, 5), (8, 5), (7, 5)], Direction::Right).unwrap();

        assert!(state.step().is_some());
        assert_eq!(state.end_reason(), Some(EndReason::HitWall));

        let before = cells(&state);
        assert!(state.step().is_none());
        assert_eq!(cells(&state), before);
    }

    #[test]
    fn short_bodies_are_rejected() {
        let mut state = GameState::initialize(10, 5, 1).unwrap();

        assert!(state.debug_set_snake(&[], Direction::Right).is_err());
        assert!(state.debug_set_snake(&[(2, 2)], Direction::Right).is_err());
        assert_eq!(cells(&state), vec![(5, 5), (4, 5), (3, 5)]);

        assert!(state.debug_set_snake(&[(2, 2), (1, 2)], Direction::Right).is_ok());
        assert!(state.step().is_some());
    }

    #[test]
    fn clock_freezes_when_finished() {
        let mut state = GameState::initialize(10, 5, 1).unwrap();
        state.debug_set_food((0, 0));
        state.debug_set_snake(&[(9, 5), (8, 5), (7, 5)], Direction::Right).unwrap();
        state.step();

        let first = state.duration();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(state.duration(), first);
    }

    #[test]
    fn tick_interval_follows_speed() {
        let state = GameState::initialize(10, 4, 1).unwrap();
        assert_eq!(state.tick_interval(), Duration::from_millis(250));
    }
}
