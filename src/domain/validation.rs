use serde::{Deserialize, Serialize};
use std::fmt;

/// A problem found in one input row before anything is sent to the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Row number as the user sees it (1-based).
    pub row: usize,
    pub message: String,
}

impl ValidationError {
    pub fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }

    /// Build one error for a row from all the messages collected for it.
    pub fn from_messages(row: usize, messages: &[String]) -> Self {
        Self::new(row, messages.join(", "))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dòng {}: {}", self.row, self.message)
    }
}
