use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use mineboard::{
    CellContent, Difficulty, Game, GameConfig, GameError, GameState, Position, Visibility,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Play minesweeper in the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Board preset, ignored when a custom size is given
    #[arg(short, long, value_enum, default_value_t = Difficulty::Beginner)]
    difficulty: Difficulty,

    #[arg(long, requires_all = ["height", "mines"])]
    width: Option<usize>,

    #[arg(long, requires_all = ["width", "mines"])]
    height: Option<usize>,

    #[arg(long, requires_all = ["width", "height"])]
    mines: Option<usize>,

    /// Seed for a reproducible mine layout
    #[arg(long)]
    seed: Option<u64>,

    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

impl Args {
    fn config(&self) -> GameConfig {
        match (self.width, self.height, self.mines) {
            (Some(width), Some(height), Some(mines)) => GameConfig::new(width, height, mines),
            _ => self.difficulty.into(),
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[derive(Error, Debug)]
enum AppError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Reveal(Position),
    Flag(Position),
    Chord(Position),
    NewGame,
    Quit,
}

impl Command {
    fn position(self) -> Option<Position> {
        match self {
            Command::Reveal(pos) | Command::Flag(pos) | Command::Chord(pos) => Some(pos),
            Command::NewGame | Command::Quit => None,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
enum ParseCommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown action {0:?}, use r, f, c, n or q")]
    UnknownAction(String),
    #[error("Expected ROW COL after the action")]
    MissingCoordinates,
    #[error("Invalid coordinate {0:?}")]
    InvalidCoordinate(String),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parts = input.split_whitespace();
        let action = parts.next().ok_or(ParseCommandError::Empty)?;

        let build: fn(Position) -> Command = match action {
            "q" => return Ok(Command::Quit),
            "n" => return Ok(Command::NewGame),
            "r" => Command::Reveal,
            "f" => Command::Flag,
            "c" => Command::Chord,
            other => return Err(ParseCommandError::UnknownAction(other.to_string())),
        };

        let mut coordinate = || -> Result<usize, ParseCommandError> {
            let part = parts.next().ok_or(ParseCommandError::MissingCoordinates)?;
            part.parse()
                .map_err(|_| ParseCommandError::InvalidCoordinate(part.to_string()))
        };
        let row = coordinate()?;
        let col = coordinate()?;

        Ok(build(Position::new(row, col)))
    }
}

/// Input state for one player, owned by the loop that drives it.
struct Session {
    config: GameConfig,
    rng: StdRng,
    game: Game,
    moves: usize,
}

impl Session {
    fn new(config: GameConfig, mut rng: StdRng) -> Result<Self, GameError> {
        let game = Game::with_rng(config, &mut rng)?;
        Ok(Self::with_game(config, rng, game))
    }

    fn with_game(config: GameConfig, rng: StdRng, game: Game) -> Self {
        Self {
            config,
            rng,
            game,
            moves: 0,
        }
    }

    /// Fresh layout with the same configuration.
    fn restart(&mut self) -> Result<(), GameError> {
        self.game = Game::with_rng(self.config, &mut self.rng)?;
        self.moves = 0;
        debug!(config = ?self.config, "started new game");
        Ok(())
    }

    fn apply(&mut self, command: Command) {
        let changed = match command {
            Command::Reveal(pos) => self.game.reveal(pos).changes.len(),
            Command::Flag(pos) => usize::from(self.game.toggle_flag(pos).has_update()),
            Command::Chord(pos) => self.game.chord(pos).changes.len(),
            Command::NewGame | Command::Quit => 0,
        };

        if changed > 0 {
            self.moves += 1;
        }
        debug!(?command, changed, moves = self.moves, "applied command");
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .with_writer(io::stderr)
        .init();

    let result = Session::new(args.config(), args.rng())
        .map_err(AppError::from)
        .and_then(|mut session| play(&mut session, io::stdin().lock(), io::stdout()));

    match result {
        Ok(_) => {
            println!("Thanks for playing!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Game error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn play<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    mut output: W,
) -> Result<(), AppError> {
    let mut lines = input.lines();

    loop {
        write!(output, "{}", render(&session.game))?;
        match session.game.state() {
            GameState::Playing => write!(output, "Enter command (r/f/c ROW COL, n, q): ")?,
            GameState::Won => {
                writeln!(output, "You won in {} moves!", session.moves)?;
                write!(output, "Enter n for a new game or q to quit: ")?;
            }
            GameState::Lost => {
                writeln!(output, "Game over!")?;
                write!(output, "Enter n for a new game or q to quit: ")?;
            }
        }
        output.flush()?;

        let Some(line) = lines.next().transpose()? else {
            break;
        };

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::NewGame) => session.restart()?,
            Ok(command) => match command.position() {
                Some(pos) if !session.game.contains(pos) => {
                    writeln!(output, "Position {} is out of bounds", pos)?
                }
                _ => session.apply(command),
            },
            Err(e) => writeln!(output, "Error: {}", e)?,
        }
    }

    Ok(())
}

fn render(game: &Game) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Mines left: {}", game.mines_left());

    out.push_str("   ");
    for col in 0..game.width() {
        let _ = write!(out, "{:>3}", col);
    }
    out.push('\n');

    for row in 0..game.height() {
        let _ = write!(out, "{:>3}", row);
        for col in 0..game.width() {
            let symbol = match game.cell(Position::new(row, col)) {
                Some(cell) => match (cell.visibility(), cell.content()) {
                    (Visibility::Covered, _) => '#',
                    (Visibility::Flagged, _) => 'F',
                    (Visibility::Revealed, CellContent::Mine) => '*',
                    (Visibility::Revealed, CellContent::Count(0)) => '.',
                    (Visibility::Revealed, CellContent::Count(n)) => char::from(b'0' + n),
                },
                None => ' ',
            };
            let _ = write!(out, "{:>3}", symbol);
        }
        out.push('\n');
    }

    out
}
