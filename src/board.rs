use crate::{GameConfig, GameError, Position};
use itertools::iproduct;
use ndarray::Array2;
use rand::Rng;
use std::ops::Index;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Covered,
    Flagged,
    Revealed,
}

/// What a cell shows once it is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellContent {
    Mine,
    Count(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    has_mine: bool,
    adjacent_mines: u8,
    pub(crate) visibility: Visibility,
}

impl Cell {
    pub const fn has_mine(&self) -> bool {
        self.has_mine
    }

    /// Number of mined neighbours. Always zero for a mined cell.
    pub const fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }

    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub const fn content(&self) -> CellContent {
        if self.has_mine {
            CellContent::Mine
        } else {
            CellContent::Count(self.adjacent_mines)
        }
    }
}

/// Rectangular grid of cells, indexed `[row, col]`. The mine layout and the
/// adjacency counts are fixed at construction; only visibility changes later.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    cells: Array2<Cell>,
    mine_count: usize,
}

impl Board {
    /// Random layout from the thread RNG.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Self::generate(config, &mut rand::thread_rng())
    }

    /// Rejection sampling: draw uniform cells until enough distinct ones are
    /// mined. No cell is ever kept free of mines.
    pub fn generate<R: Rng>(config: GameConfig, rng: &mut R) -> Result<Self, GameError> {
        let config = config.validate()?;
        let mut mines: Array2<bool> = Array2::default((config.height, config.width));
        let mut mines_placed = 0;

        while mines_placed < config.mines {
            let row = rng.gen_range(0..config.height);
            let col = rng.gen_range(0..config.width);
            let tile = &mut mines[[row, col]];

            if !*tile {
                *tile = true;
                mines_placed += 1;
            }
        }

        debug!(
            width = config.width,
            height = config.height,
            mines = config.mines,
            "generated random board"
        );
        Ok(Self::from_mine_mask(&mines))
    }

    /// Fixed layout. Duplicate positions count once.
    pub fn with_mines(width: usize, height: usize, mines: &[Position]) -> Result<Self, GameError> {
        if width == 0 || height == 0 {
            return Err(GameConfig::new(width, height, mines.len()).invalid());
        }

        let mut mask: Array2<bool> = Array2::default((height, width));
        for &pos in mines {
            *mask
                .get_mut([pos.row, pos.col])
                .ok_or(GameError::MineOutOfBounds(pos))? = true;
        }

        let mine_count = mask.iter().filter(|&&is_mine| is_mine).count();
        GameConfig::new(width, height, mine_count).validate()?;

        debug!(width, height, mines = mine_count, "built board from fixed layout");
        Ok(Self::from_mine_mask(&mask))
    }

    fn from_mine_mask(mask: &Array2<bool>) -> Self {
        let cells = Array2::from_shape_fn(mask.dim(), |(row, col)| {
            let has_mine = mask[[row, col]];
            let adjacent_mines = if has_mine {
                0
            } else {
                Position::new(row, col)
                    .neighbors()
                    .filter(|p| mask.get([p.row, p.col]).copied().unwrap_or(false))
                    .count() as u8
            };

            Cell {
                has_mine,
                adjacent_mines,
                visibility: Visibility::Covered,
            }
        });

        Self {
            cells,
            mine_count: mask.iter().filter(|&&is_mine| is_mine).count(),
        }
    }

    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn safe_cell_count(&self) -> usize {
        self.total_cells() - self.mine_count
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.height() && pos.col < self.width()
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.cells.get([pos.row, pos.col])
    }

    /// Panics off the board, like indexing.
    pub(crate) fn cell_mut(&mut self, pos: Position) -> &mut Cell {
        &mut self.cells[[pos.row, pos.col]]
    }

    /// In-bounds Moore neighbours of `pos`.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> {
        let (height, width) = self.cells.dim();
        pos.neighbors().filter(move |p| p.row < height && p.col < width)
    }

    pub fn count_neighbors(&self, pos: Position, visibility: Visibility) -> u8 {
        self.neighbors(pos)
            .filter(|&p| self[p].visibility == visibility)
            .count() as u8
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        iproduct!(0..self.height(), 0..self.width()).map(Position::from)
    }

    pub fn mine_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(|&pos| self[pos].has_mine)
    }
}

impl Index<Position> for Board {
    type Output = Cell;

    fn index(&self, pos: Position) -> &Self::Output {
        &self.cells[[pos.row, pos.col]]
    }
}
