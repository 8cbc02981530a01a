mod es5;
mod spawned;


pub use es5::{Es5Parser, Violation};
pub use spawned::{AcornRunner, DEFAULT_VALIDATOR_BIN, SpawnedValidator, ValidatorRunner};

use anyhow::Result;

use crate::config::Config;

/// Which of the two interchangeable validation implementations a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    InProcess,
    Spawned,
}

/// The validator chosen for a run. Selected once from the config and
/// passed into the orchestrator; stateless across assets.
pub enum Validator {
    InProcess(Es5Parser),
    Spawned(SpawnedValidator),
}

impl Validator {
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.strategy() {
            StrategyKind::InProcess => Ok(Self::InProcess(Es5Parser::new())),
            StrategyKind::Spawned => Ok(Self::Spawned(SpawnedValidator::from_config(config)?)),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::InProcess(_) => StrategyKind::InProcess,
            Self::Spawned(_) => StrategyKind::Spawned,
        }
    }

    /// Decides syntactic validity under ES5. A `false` is an expected
    /// outcome (bad syntax is data, not an error); `Err` means the check
    /// itself could not be performed (scratch-file I/O, process spawn).
    pub async fn is_valid(&self, content: &str) -> Result<bool> {
        match self {
            Self::InProcess(parser) => Ok(parser.is_valid(content)),
            Self::Spawned(spawned) => spawned.is_valid(content).await,
        }
    }
}
