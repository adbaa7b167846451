use crate::Position;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid configuration: {mines} mines on a {width}x{height} board")]
    InvalidConfiguration {
        width: usize,
        height: usize,
        mines: usize,
    },
    #[error("Mine position {0} is out of bounds")]
    MineOutOfBounds(Position),
}
