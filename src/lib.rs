pub mod board;
pub mod config;
pub mod presenter;
pub mod snake;
pub mod state;
pub mod term;

/// A board cell as `(x, y)`. Signed so a head that left the board can still be represented.
pub type Cell = (i32, i32);

pub use config::{Config, GameConfig, UiConfig};
pub use snake::{Direction, Snake};
pub use state::{EndReason, GameState};
