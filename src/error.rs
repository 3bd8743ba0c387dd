//! Error types for map loading, codec construction and replay.

use std::fmt;

/// A malformed grid. Raised while loading, before any codec is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The map has no rows or no columns.
    Empty,
    /// More rows or columns than a `Point` coordinate can address.
    TooLarge { rows: usize, cols: usize, max: usize },
    /// A row is not as wide as the first one.
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A symbol the chosen format does not know.
    UnknownSymbol { row: usize, col: usize, symbol: char },
    MissingAgent,
    /// More than one agent start cell.
    MultipleAgents { first: (usize, usize), second: (usize, usize) },
    /// Boxes and goals must pair up one to one.
    BoxGoalMismatch { boxes: usize, goals: usize },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "map is empty"),
            Self::TooLarge { rows, cols, max } => write!(
                f,
                "map is {rows}x{cols}, at most {max} rows and columns are supported"
            ),
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {row} has {found} columns, expected {expected}"
            ),
            Self::UnknownSymbol { row, col, symbol } => {
                write!(f, "unknown symbol {symbol:?} at row {row}, column {col}")
            }
            Self::MissingAgent => write!(f, "map has no agent start"),
            Self::MultipleAgents { first, second } => write!(
                f,
                "map has more than one agent start: {first:?} and {second:?}"
            ),
            Self::BoxGoalMismatch { boxes, goals } => {
                write!(f, "map has {boxes} boxes but {goals} goals")
            }
        }
    }
}

impl std::error::Error for MapError {}

/// The grid is well formed but cannot be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    NoBoxes,
    /// More non-wall cells than the agent field of a composite state holds.
    TooManySpaces { num_spaces: usize, max: usize },
    /// The rank table would exceed the configured limit (or `u32`).
    TooManyCombinations { num_spaces: usize, num_boxes: usize, limit: u64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoBoxes => write!(f, "map has no boxes"),
            Self::TooManySpaces { num_spaces, max } => write!(
                f,
                "map has {num_spaces} open cells, at most {max} can be encoded"
            ),
            Self::TooManyCombinations {
                num_spaces,
                num_boxes,
                limit,
            } => write!(
                f,
                "C({num_spaces}, {num_boxes}) box placements exceed the limit of {limit}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Crate-level error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    Map(MapError),
    Config(ConfigError),
    /// A lookup outside the range a codec was built for. Always a bug in the
    /// caller or the codec, never clamped.
    OutOfRange {
        what: &'static str,
        value: u64,
        max: u64,
    },
    /// A replayed move string contains a step the board does not allow.
    IllegalMove { step: usize, symbol: char },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map(e) => write!(f, "invalid map: {e}"),
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::OutOfRange { what, value, max } => {
                write!(f, "{what} {value} out of range 1..={max}")
            }
            Self::IllegalMove { step, symbol } => {
                write!(f, "move {symbol:?} at step {step} is not legal")
            }
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Map(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MapError> for SolverError {
    fn from(e: MapError) -> Self {
        Self::Map(e)
    }
}

impl From<ConfigError> for SolverError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

pub type Result<T, E = SolverError> = std::result::Result<T, E>;
