use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("can't open the input file {}", .path.display())]
    OpenInput { path: PathBuf, source: io::Error },
    #[error("could not write to file {}", .path.display())]
    WriteOutput { path: PathBuf, source: io::Error },
    #[error("could not read config file {}", .path.display())]
    ReadConfig { path: PathBuf, source: io::Error },
    #[error("invalid config file {}", .path.display())]
    ParseConfig { path: PathBuf, source: serde_json::Error },
    #[error("could not process {}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("team {0} has no games")]
    TeamWithoutGames(String),
}

/// Why a single input line was skipped. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line is shorter than the date field")]
    MissingDate,
    #[error("missing team name")]
    MissingTeam,
    #[error("no score after team name")]
    MissingScore,
    #[error("invalid score {0:?}")]
    BadScore(String),
    #[error("malformed row: {0}")]
    BadRow(String),
}
