use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Flat index outside `0..81`.
    IndexOutOfRange { index: usize },
    /// A cell sequence that does not hold exactly 81 values.
    MalformedGrid { len: usize },
    /// Text that names no index, region or cell.
    UnknownPosition(String),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index } => {
                write!(f, "cell index {index} out of range (expected 0..=80)")
            }
            Self::MalformedGrid { len } => {
                write!(f, "malformed grid: expected 81 cells, found {len}")
            }
            Self::UnknownPosition(text) => write!(f, "unknown position: '{text}'"),
        }
    }
}

impl std::error::Error for GridError {}
