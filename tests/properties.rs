use mineboard::{Board, Game, GameConfig, GameState, Position, Visibility};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashSet, VecDeque};

fn config_strategy() -> impl Strategy<Value = GameConfig> {
    (1usize..=12, 1usize..=12)
        .prop_filter("needs at least two cells", |(w, h)| w * h >= 2)
        .prop_flat_map(|(width, height)| {
            (1..width * height).prop_map(move |mines| GameConfig::new(width, height, mines))
        })
}

/// Cells a flood fill from `start` must reveal: the zero region reachable
/// from it plus that region's border.
fn expected_region(board: &Board, start: Position) -> HashSet<Position> {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(pos) = queue.pop_front() {
        if board[pos].adjacent_mines() != 0 {
            continue;
        }
        for next in board.neighbors(pos) {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    seen
}

proptest! {
    #[test]
    fn generated_boards_match_config(config in config_strategy(), seed in any::<u64>()) {
        let board = Board::generate(config, &mut StdRng::seed_from_u64(seed)).unwrap();

        prop_assert_eq!(board.mine_positions().count(), config.mines);
        prop_assert_eq!(board.mine_count(), config.mines);

        for pos in board.positions() {
            let cell = board[pos];
            prop_assert_eq!(cell.visibility(), Visibility::Covered);
            if !cell.has_mine() {
                let mined = board.neighbors(pos).filter(|&p| board[p].has_mine()).count();
                prop_assert_eq!(usize::from(cell.adjacent_mines()), mined);
            }
        }
    }

    #[test]
    fn flood_fill_reveals_exactly_the_region(config in config_strategy(), seed in any::<u64>()) {
        let board = Board::generate(config, &mut StdRng::seed_from_u64(seed)).unwrap();
        let start = board.positions().find(|&p| !board[p].has_mine()).unwrap();
        let expected = expected_region(&board, start);
        let mut game = Game::from_board(board);

        let result = game.reveal(start);
        let revealed: HashSet<Position> = result.changes.iter().map(|c| c.position).collect();

        prop_assert_eq!(revealed.len(), result.changes.len());
        prop_assert_eq!(&revealed, &expected);
        prop_assert!(result.state != GameState::Lost);
        prop_assert!(revealed.iter().all(|&p| !game.cell(p).unwrap().has_mine()));
    }

    #[test]
    fn finished_games_never_change(
        config in config_strategy(),
        seed in any::<u64>(),
        moves in prop::collection::vec((0usize..3, 0usize..12, 0usize..12), 1..60),
    ) {
        let mut game = Game::with_rng(config, &mut StdRng::seed_from_u64(seed)).unwrap();
        let mut finished: Option<(GameState, Board)> = None;

        for (kind, row, col) in moves {
            let pos = Position::new(row, col);
            let state = match kind {
                0 => game.reveal(pos).state,
                1 => game.toggle_flag(pos).state,
                _ => game.chord(pos).state,
            };

            match &finished {
                Some((end, board)) => {
                    prop_assert_eq!(state, *end);
                    prop_assert_eq!(game.board(), board);
                }
                None if state.is_finished() => {
                    finished = Some((state, game.board().clone()));
                }
                None => {}
            }

            let flagged = game
                .board()
                .positions()
                .filter(|&p| game.cell(p).unwrap().visibility() == Visibility::Flagged)
                .count();
            prop_assert_eq!(game.flag_count(), flagged);
        }
    }
}
