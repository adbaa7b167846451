use crate::GameError;

/// Board dimensions and mine count. This is the only thing a game is
/// configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub mines: usize,
}

impl GameConfig {
    pub const fn new(width: usize, height: usize, mines: usize) -> Self {
        Self {
            width,
            height,
            mines,
        }
    }

    pub const fn total_cells(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// At least one cell must be mined and at least one must be safe.
    pub fn validate(self) -> Result<Self, GameError> {
        if self.width == 0 || self.height == 0 || self.mines == 0 {
            return Err(self.invalid());
        }
        if self.mines >= self.total_cells() {
            return Err(self.invalid());
        }
        Ok(self)
    }

    pub(crate) fn invalid(self) -> GameError {
        GameError::InvalidConfiguration {
            width: self.width,
            height: self.height,
            mines: self.mines,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Difficulty::default().config()
    }
}

impl From<Difficulty> for GameConfig {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.config()
    }
}

/// The customary board presets. Callers are free to use any other valid
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Beginner, Self::Intermediate, Self::Expert];

    pub const fn config(self) -> GameConfig {
        match self {
            Self::Beginner => GameConfig::new(9, 9, 10),
            Self::Intermediate => GameConfig::new(16, 16, 40),
            Self::Expert => GameConfig::new(30, 16, 99),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for difficulty in Difficulty::ALL {
            assert!(difficulty.config().validate().is_ok(), "{difficulty:?}");
        }
        assert_eq!(Difficulty::Expert.config(), GameConfig::new(30, 16, 99));
        assert_eq!(GameConfig::default(), GameConfig::new(9, 9, 10));
    }

    #[test]
    fn rejects_empty_dimensions() {
        assert_eq!(
            GameConfig::new(0, 5, 1).validate(),
            Err(GameError::InvalidConfiguration {
                width: 0,
                height: 5,
                mines: 1
            })
        );
        assert!(GameConfig::new(5, 0, 1).validate().is_err());
    }

    #[test]
    fn rejects_mine_counts_outside_range() {
        assert!(GameConfig::new(1, 1, 0).validate().is_err());
        assert!(GameConfig::new(3, 3, 0).validate().is_err());
        assert!(GameConfig::new(3, 3, 9).validate().is_err());
        assert!(GameConfig::new(3, 3, 10).validate().is_err());
        assert!(GameConfig::new(3, 3, 8).validate().is_ok());
        assert!(GameConfig::new(2, 1, 1).validate().is_ok());
    }
}
