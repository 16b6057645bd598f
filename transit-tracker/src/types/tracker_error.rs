use std::fmt;

/// Represents errors that can occur in the transit tracker application.
#[derive(Debug)]
pub enum TrackerError {
    InvalidInput,
    BoardNotOpen(String),
    BoardLock(String),
    TimerLock(String),
    TimerStart(String),
    InvalidDuration(String),
    Other(String),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::InvalidInput => {
                write!(f, "Invalid input. Please check your input and try again.")
            }
            TrackerError::BoardNotOpen(ref route_id) => {
                write!(f, "No open board for route: {}", route_id)
            }
            TrackerError::BoardLock(msg) => write!(f, "Board lock error: {}", msg),
            TrackerError::TimerLock(msg) => write!(f, "Timer lock error: {}", msg),
            TrackerError::TimerStart(msg) => write!(f, "Timer start error: {}", msg),
            TrackerError::InvalidDuration(msg) => write!(f, "Invalid duration: {}", msg),
            TrackerError::Other(ref message) => write!(f, "Error: {}", message),
        }
    }
}

impl std::error::Error for TrackerError {}
