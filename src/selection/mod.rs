//! Maps a pair of picked transcript lines to the time range to clip.
//!
//! Each selectable line is identified by `"{start}_{end}"`, the whole seconds
//! its fragment covers. A selection is exactly two identifiers: the first
//! contributes its start, the second its end.

use std::fmt;

use crate::store::TranscriptFragment;

/// Seconds of padding appended to every clip duration
pub const CLIP_PADDING_SECS: f64 = 0.5;

const EXPECTED_SELECTIONS: usize = 2;

/// Half-open `[start_second, end_second)` interval to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRange {
    pub start_second: i64,
    pub end_second: i64,
}

impl ClipRange {
    pub fn new(start_second: i64, end_second: i64) -> Self {
        Self {
            start_second,
            end_second,
        }
    }

    /// Length requested from the clipper, padding included.
    ///
    /// Inverted ranges are not corrected and yield a non-positive duration.
    /// Ranges from [`resolve`] always have a representable span.
    pub fn padded_duration(&self) -> f64 {
        self.end_second.saturating_sub(self.start_second) as f64 + CLIP_PADDING_SECS
    }

    pub fn is_inverted(&self) -> bool {
        self.end_second <= self.start_second
    }
}

impl fmt::Display for ClipRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.start_second, self.end_second)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    First,
    Second,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::First => write!(f, "first"),
            Position::Second => write!(f, "second"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Exactly {expected} lines should be selected (beginning and end): got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("Could not get the {which} timestamp from selected line {identifier:?}")]
    Unparsable { which: Position, identifier: String },

    #[error("Selected range {start}s to {end}s is out of bounds")]
    OutOfRange { start: i64, end: i64 },
}

/// Identifier for one fragment, as offered to the user
pub fn selection_label(fragment: &TranscriptFragment) -> String {
    format!("{}_{}", fragment.start_second(), fragment.end_second())
}

/// Turn two selection identifiers into a clip range.
///
/// The identifiers need not be adjacent or ordered; an inverted or empty
/// range is returned as-is.
pub fn resolve<S: AsRef<str>>(selected: &[S]) -> Result<ClipRange, SelectionError> {
    let [first, second] = selected else {
        return Err(SelectionError::WrongCount {
            expected: EXPECTED_SELECTIONS,
            actual: selected.len(),
        });
    };

    let start = component(first.as_ref(), 0, Position::First)?;
    let end = component(second.as_ref(), 1, Position::Second)?;

    if end.checked_sub(start).is_none() {
        return Err(SelectionError::OutOfRange { start, end });
    }

    Ok(ClipRange::new(start, end))
}

fn component(identifier: &str, index: usize, which: Position) -> Result<i64, SelectionError> {
    identifier
        .split('_')
        .nth(index)
        .and_then(|part| part.parse::<i64>().ok())
        .ok_or_else(|| SelectionError::Unparsable {
            which,
            identifier: identifier.to_string(),
        })
}
