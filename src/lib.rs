pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod position;

pub use board::{Board, Cell, CellContent, Visibility};
pub use config::{Difficulty, GameConfig};
pub use error::GameError;
pub use game::{CellChange, FlagResult, Game, GameState, RevealResult};
pub use position::Position;
