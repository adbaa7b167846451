use crate::{Board, Cell, CellContent, GameConfig, GameError, Position, Visibility};
use rand::Rng;
use tracing::{info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    #[default]
    Playing,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// One cell whose visibility changed during a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellChange {
    pub position: Position,
    pub visibility: Visibility,
    pub content: CellContent,
}

/// Outcome of `reveal` and `chord`: the state after the whole cascade and
/// every cell it touched, in the order they changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealResult {
    pub state: GameState,
    pub changes: Vec<CellChange>,
}

impl RevealResult {
    pub fn has_update(&self) -> bool {
        !self.changes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagResult {
    pub state: GameState,
    pub change: Option<CellChange>,
    pub flag_count: usize,
}

impl FlagResult {
    pub fn has_update(&self) -> bool {
        self.change.is_some()
    }
}

/// The board engine. Owns the board and the game state; all mutation goes
/// through [`Game::reveal`], [`Game::toggle_flag`] and [`Game::chord`].
///
/// Commands are total: positions off the board, settled cells and finished
/// games all produce an empty result rather than an error.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    state: GameState,
    flag_count: usize,
    revealed_count: usize,
    triggered_mine: Option<Position>,
}

impl Game {
    pub fn new(width: usize, height: usize, mines: usize) -> Result<Self, GameError> {
        Self::with_config(GameConfig::new(width, height, mines))
    }

    pub fn with_config(config: GameConfig) -> Result<Self, GameError> {
        Ok(Self::from_board(Board::new(config)?))
    }

    pub fn with_rng<R: Rng>(config: GameConfig, rng: &mut R) -> Result<Self, GameError> {
        Ok(Self::from_board(Board::generate(config, rng)?))
    }

    /// Takes over a board, picking up whatever visibility it already carries.
    pub fn from_board(board: Board) -> Self {
        let mut game = Self {
            board,
            state: GameState::Playing,
            flag_count: 0,
            revealed_count: 0,
            triggered_mine: None,
        };

        for pos in game.board.positions() {
            let cell = game.board[pos];
            match (cell.visibility(), cell.has_mine()) {
                (Visibility::Flagged, _) => game.flag_count += 1,
                (Visibility::Revealed, false) => game.revealed_count += 1,
                (Visibility::Revealed, true) => {
                    game.triggered_mine.get_or_insert(pos);
                    game.state = GameState::Lost;
                }
                (Visibility::Covered, _) => {}
            }
        }

        if game.state == GameState::Playing
            && game.revealed_count == game.board.safe_cell_count()
        {
            game.state = GameState::Won;
        }

        game
    }

    pub fn reveal(&mut self, pos: Position) -> RevealResult {
        let mut changes = Vec::new();
        self.reveal_into(pos, &mut changes);
        self.reveal_result(changes)
    }

    pub fn toggle_flag(&mut self, pos: Position) -> FlagResult {
        let next = match self.board.cell(pos).map(|cell| cell.visibility()) {
            _ if self.state.is_finished() => None,
            Some(Visibility::Covered) => {
                self.flag_count += 1;
                Some(Visibility::Flagged)
            }
            Some(Visibility::Flagged) => {
                self.flag_count -= 1;
                Some(Visibility::Covered)
            }
            Some(Visibility::Revealed) | None => None,
        };

        let change = next.map(|visibility| self.set_visibility(pos, visibility));

        FlagResult {
            state: self.state,
            change,
            flag_count: self.flag_count,
        }
    }

    /// Reveals every covered neighbour of a revealed number once exactly that
    /// many neighbours are flagged. Wrong flags are not second-guessed.
    pub fn chord(&mut self, pos: Position) -> RevealResult {
        let mut changes = Vec::new();

        if self.state.is_finished() {
            return self.reveal_result(changes);
        }

        let Some(&cell) = self.board.cell(pos) else {
            return self.reveal_result(changes);
        };

        let count = cell.adjacent_mines();
        if cell.visibility() != Visibility::Revealed || cell.has_mine() || count == 0 {
            return self.reveal_result(changes);
        }

        let flagged = self.board.count_neighbors(pos, Visibility::Flagged);
        if flagged != count {
            trace!(%pos, count, flagged, "chord skipped, flag count mismatch");
            return self.reveal_result(changes);
        }

        let covered: Vec<Position> = self
            .board
            .neighbors(pos)
            .filter(|&p| self.board[p].visibility() == Visibility::Covered)
            .collect();

        for neighbor in covered {
            self.reveal_into(neighbor, &mut changes);
        }

        self.reveal_result(changes)
    }

    fn reveal_into(&mut self, pos: Position, changes: &mut Vec<CellChange>) {
        if self.state.is_finished() {
            return;
        }

        let Some(&cell) = self.board.cell(pos) else {
            return;
        };

        if cell.visibility() != Visibility::Covered {
            return;
        }

        if cell.has_mine() {
            self.triggered_mine = Some(pos);
            changes.push(self.set_visibility(pos, Visibility::Revealed));
            self.expose_mines(changes);
            self.finish(GameState::Lost);
            return;
        }

        self.flood_reveal(pos, changes);

        if self.revealed_count == self.board.safe_cell_count() {
            self.finish(GameState::Won);
        }
    }

    /// Worklist flood fill. A cell leaves `Covered` the moment it is popped,
    /// so each one is revealed at most once.
    fn flood_reveal(&mut self, start: Position, changes: &mut Vec<CellChange>) {
        let before = changes.len();
        let mut to_visit = vec![start];

        while let Some(pos) = to_visit.pop() {
            let cell = self.board[pos];
            if cell.visibility() != Visibility::Covered || cell.has_mine() {
                continue;
            }

            changes.push(self.set_visibility(pos, Visibility::Revealed));
            self.revealed_count += 1;

            if cell.adjacent_mines() == 0 {
                to_visit.extend(
                    self.board
                        .neighbors(pos)
                        .filter(|&p| self.board[p].visibility() == Visibility::Covered),
                );
            }
        }

        trace!(%start, revealed = changes.len() - before, "flood fill");
    }

    /// Uncovers every mine for display after a loss. Flags on mines are
    /// lifted so the flag count keeps matching the flagged cells.
    fn expose_mines(&mut self, changes: &mut Vec<CellChange>) {
        let hidden: Vec<Position> = self
            .board
            .mine_positions()
            .filter(|&p| self.board[p].visibility() != Visibility::Revealed)
            .collect();

        for pos in hidden {
            if self.board[pos].visibility() == Visibility::Flagged {
                self.flag_count -= 1;
            }
            changes.push(self.set_visibility(pos, Visibility::Revealed));
        }
    }

    fn set_visibility(&mut self, pos: Position, visibility: Visibility) -> CellChange {
        let cell = self.board.cell_mut(pos);
        cell.visibility = visibility;

        CellChange {
            position: pos,
            visibility,
            content: cell.content(),
        }
    }

    fn finish(&mut self, state: GameState) {
        self.state = state;
        match state {
            GameState::Won => info!(revealed = self.revealed_count, "game won"),
            GameState::Lost => info!(mine = ?self.triggered_mine, "game lost"),
            GameState::Playing => {}
        }
    }

    fn reveal_result(&self, changes: Vec<CellChange>) -> RevealResult {
        RevealResult {
            state: self.state,
            changes,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn flag_count(&self) -> usize {
        self.flag_count
    }

    /// Mines minus flags. Goes negative when the player over-flags.
    pub fn mines_left(&self) -> isize {
        self.board.mine_count() as isize - self.flag_count as isize
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed_count
    }

    /// The mine whose reveal lost the game.
    pub fn triggered_mine(&self) -> Option<Position> {
        self.triggered_mine
    }

    pub fn width(&self) -> usize {
        self.board.width()
    }

    pub fn height(&self) -> usize {
        self.board.height()
    }

    pub fn mine_count(&self) -> usize {
        self.board.mine_count()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.board.contains(pos)
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.board.cell(pos)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
}
