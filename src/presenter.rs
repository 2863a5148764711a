use std::convert::TryFrom;
use std::time::Instant;

use color_eyre::eyre::{bail, eyre, Result};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Color;
use log::{info, warn};

use crate::config::Config;
use crate::snake::{Direction, Move};
use crate::state::{EndReason, GameState};
use crate::term::{Coords, TermInt, TermManager};
use crate::Cell;

const SNAKE_BODY_CHAR: char = '█';
const APPLE_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';

const SNAKE_COLOR: Color = Color::Red;
const APPLE_COLOR: Color = Color::Green;

// Board cells are two columns wide so they come out roughly square
const CELL_WIDTH: TermInt = 2;
const BOARD_ORIGIN: Coords = (0, 1);
const PANEL_WIDTH: TermInt = 20;

const QUIT_HINT: &str = "q, Esc or CTRL+C to quit";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Drives games in the terminal: owns the tick schedule, forwards keys as direction
/// intents and repaints after every step.
pub struct Presenter {
    config: Config,
    term: TermManager,
}

impl Presenter {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Presenter { config, term: TermManager::new()? })
    }

    pub fn run(&mut self) -> Result<()> {
        self.term.setup(&self.config.ui.title, Some(self.config.ui.size))?;

        let res = self.run_games();

        // Give the terminal back even if a game failed
        self.term.restore()?;
        res
    }

    fn run_games(&mut self) -> Result<()> {
        if self.show_intro()? == Flow::Quit {
            return Ok(());
        }

        while self.play()? == Flow::Continue {}
        Ok(())
    }

    fn show_intro(&mut self) -> Result<Flow> {
        let lines = &[
            "Arrow keys or WASD to move",
            QUIT_HINT,
            "",
            "Press any key to begin"
        ];

        self.term.clear()?;
        self.term.show_message(lines)?;

        if is_quit(&self.term.read_key_blocking()?) {
            return Ok(Flow::Quit);
        }

        self.term.hide_message()?;
        Ok(Flow::Continue)
    }

    fn play(&mut self) -> Result<Flow> {
        let mut state = GameState::new(&self.config.game)?;
        self.check_fits(state.board_size())?;
        self.draw_all(&state)?;

        let interval = state.tick_interval();
        let mut next_tick = Instant::now() + interval;

        while !state.is_finished() {
            let timeout = next_tick.saturating_duration_since(Instant::now());

            for event in self.term.read_events(timeout)? {
                match event {
                    Event::Key(key) if is_quit(&key) => return Ok(Flow::Quit),
                    Event::Key(KeyEvent { code, .. }) => match code {
                        KeyCode::Char('w') | KeyCode::Up => { state.move_up(); }
                        KeyCode::Char('a') | KeyCode::Left => { state.move_left(); }
                        KeyCode::Char('s') | KeyCode::Down => { state.move_down(); }
                        KeyCode::Char('d') | KeyCode::Right => { state.move_right(); }
                        _ => {}
                    },
                    Event::Resize(..) if self.config.ui.resizable => {
                        self.term.refresh_size()?;
                        self.check_fits(state.board_size())?;
                        self.draw_all(&state)?;
                    }
                    _ => {}
                }
            }

            if Instant::now() < next_tick {
                continue;
            }
            next_tick = Instant::now() + interval;

            let old_food = state.food();
            if let Some(mov) = state.step() {
                self.draw_move(&state, &mov, old_food)?;
            }
            self.draw_readouts(&state)?;
        }

        self.game_over(&state)?;

        // Quit if the user hits a quit key after the game
        if is_quit(&self.term.read_key_blocking()?) {
            Ok(Flow::Quit)
        } else {
            Ok(Flow::Continue)
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn check_fits(&self, board_size: i32) -> Result<()> {
        let needed = required_size(board_size)?;
        let (w, h) = self.term.get_terminal_size();

        if w < needed.0 || h < needed.1 {
            warn!("terminal is {}x{}, board needs {}x{}", w, h, needed.0, needed.1);
            bail!("terminal too small: need at least {}x{}, have {}x{}", needed.0, needed.1, w, h);
        }
        Ok(())
    }

    fn draw_all(&mut self, state: &GameState) -> Result<()> {
        let frame = frame_size(state.board_size())?;

        self.term.clear()?;
        self.term.print_str_at((0, 0), &self.config.ui.title, None)?;
        self.term.draw_borders(BOARD_ORIGIN, frame)?;

        if let Some(food) = state.food() {
            self.print_cell(food, state.board_size(), APPLE_CHAR, Some(APPLE_COLOR))?;
        }
        self.print_snake(state)?;
        self.draw_readouts(state)
    }

    fn print_snake(&mut self, state: &GameState) -> Result<()> {
        let head_char = head_char(state.heading());

        for (i, cell) in state.snake().iter().enumerate() {
            let ch = if i == 0 {head_char} else {SNAKE_BODY_CHAR};
            self.print_cell(*cell, state.board_size(), ch, Some(SNAKE_COLOR))?;
        }

        self.term.flush()?;
        Ok(())
    }

    fn draw_move(&mut self, state: &GameState, mov: &Move, old_food: Option<Cell>) -> Result<()> {
        let size = state.board_size();

        if let Some(old_tail) = mov.old_tail {
            self.print_cell(old_tail, size, ' ', None)?;
        }
        self.print_cell(mov.old_head, size, SNAKE_BODY_CHAR, Some(SNAKE_COLOR))?;
        self.print_cell(mov.new_head, size, head_char(state.heading()), Some(SNAKE_COLOR))?;

        if state.food() != old_food {
            if let Some(food) = state.food() {
                self.print_cell(food, state.board_size(), APPLE_CHAR, Some(APPLE_COLOR))?;
            }
        }

        self.term.flush()?;
        Ok(())
    }

    fn draw_readouts(&mut self, state: &GameState) -> Result<()> {
        let x = BOARD_ORIGIN.0 + frame_size(state.board_size())?.0 + 2;
        let y = BOARD_ORIGIN.1 + 1;
        let duration = format!("{:<w$}", format!("{:.2} seconds", state.duration().as_secs_f64()), w = PANEL_WIDTH as usize);
        let score = format!("{:<w$}", state.score(), w = PANEL_WIDTH as usize);

        self.term.print_str_at((x, y), "Duration:", None)?;
        self.term.print_str_at((x, y + 1), &duration, None)?;
        self.term.print_str_at((x, y + 3), "Score:", None)?;
        self.term.print_str_at((x, y + 4), &score, None)?;
        self.term.print_str_at((x, y + 6), "Quit: q", None)?;
        self.term.flush()?;
        Ok(())
    }

    fn game_over(&mut self, state: &GameState) -> Result<()> {
        let win = state.end_reason() == Some(EndReason::BoardFull);
        let s = if win {"You won!"} else {"Game Over"};

        if !win {
            for cell in state.snake() {
                self.print_cell(*cell, state.board_size(), DEAD_SNAKE_CHAR, Some(SNAKE_COLOR))?;
            }
        }

        info!("{} score {} in {:.2}s", s, state.score(), state.duration().as_secs_f64());

        self.term.show_message(&[
            s,
            &*format!("Score: {}", state.score()),
            &*format!("Time: {:.2} seconds", state.duration().as_secs_f64()),
            "",
            "Press any key to play again,",
            QUIT_HINT,
        ])?;
        Ok(())
    }

    fn print_cell(&mut self, cell: Cell, board_size: i32, ch: char, color: Option<Color>) -> Result<()> {
        if let Some(pos) = cell_to_screen(cell, board_size) {
            for dx in 0..CELL_WIDTH {
                self.term.print_at((pos.0 + dx, pos.1), ch, color)?;
            }
        }
        Ok(())
    }
}

/// Terminal position of the left column of `cell`, or `None` for cells off the board.
fn cell_to_screen((x, y): Cell, board_size: i32) -> Option<Coords> {
    if x < 0 || y < 0 || x >= board_size || y >= board_size {
        return None;
    }
    let col = TermInt::try_from(x).ok()?.checked_mul(CELL_WIDTH)?.checked_add(BOARD_ORIGIN.0 + 1)?;
    let row = TermInt::try_from(y).ok()?.checked_add(BOARD_ORIGIN.1 + 1)?;
    Some((col, row))
}

/// Columns and rows of the frame drawn around a board of `board_size` cells.
fn frame_size(board_size: i32) -> Result<Coords> {
    let size = TermInt::try_from(board_size)
        .map_err(|_| eyre!("board size {} cannot be laid out in a terminal", board_size))?;

    size.checked_mul(CELL_WIDTH)
        .and_then(|w| w.checked_add(2))
        .zip(size.checked_add(2))
        .ok_or_else(|| eyre!("board size {} is too large for a terminal", board_size))
}

/// Columns and rows needed for the title, the framed board and the side panel.
fn required_size(board_size: i32) -> Result<Coords> {
    let (frame_w, frame_h) = frame_size(board_size)?;

    BOARD_ORIGIN.0.checked_add(frame_w)
        .and_then(|w| w.checked_add(2 + PANEL_WIDTH))
        .zip(BOARD_ORIGIN.1.checked_add(frame_h))
        .ok_or_else(|| eyre!("board size {} is too large for a terminal", board_size))
}

fn head_char(direction: Direction) -> char {
    match direction {
        Direction::Up => '^',
        Direction::Down => 'v',
        Direction::Left => '<',
        Direction::Right => '>',
    }
}

fn is_quit(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
        || matches!(ev.code, KeyCode::Char('q') | KeyCode::Esc)
}
