// Error types
//
// Two classes of failure exist:
// - DisplayError: resource creation, backend and blit failures. These are
//   reported (logged and shown to the user) and execution continues.
// - LockViolation: frame lock protocol violations. The lock bookkeeping can no
//   longer be trusted, so the host must stop.

use crate::surface::Rect;
use std::fmt;

/// Opaque id of a lock call site, used only for mismatched-pair detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallerId(pub u8);

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Failure reported by a presentation backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BackendError {}

/// Errors that can occur while creating, drawing into or presenting surfaces
#[derive(Debug)]
pub enum DisplayError {
    /// Pixel memory could not be reserved
    Allocation { what: &'static str, bytes: usize },

    /// A surface was requested with a zero or overflowing size
    InvalidDimensions { width: usize, height: usize },

    /// Backend call failed
    Backend(BackendError),

    /// Resource is not allocated (creation failed or already released)
    MissingResource(&'static str),

    /// Rectangle with a negative extent
    InvalidRect(Rect),

    /// Rectangle does not fit inside the named surface
    OutOfBounds { surface: &'static str, rect: Rect },

    /// Back buffer accessed without holding the frame lock
    NotLocked,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::Allocation { what, bytes } => {
                write!(f, "Failed to allocate {} bytes for {}", bytes, what)
            }
            DisplayError::InvalidDimensions { width, height } => {
                write!(f, "Invalid surface dimensions {}x{}", width, height)
            }
            DisplayError::Backend(e) => write!(f, "Backend error: {}", e),
            DisplayError::MissingResource(what) => write!(f, "No {} available", what),
            DisplayError::InvalidRect(rect) => write!(f, "Invalid rectangle {}", rect),
            DisplayError::OutOfBounds { surface, rect } => {
                write!(f, "Rectangle {} is outside the {}", rect, surface)
            }
            DisplayError::NotLocked => write!(f, "Back buffer accessed without the frame lock"),
        }
    }
}

impl std::error::Error for DisplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DisplayError::Backend(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BackendError> for DisplayError {
    fn from(e: BackendError) -> Self {
        DisplayError::Backend(e)
    }
}

/// Frame lock protocol violation
///
/// Not convertible into [`DisplayError`]. A violation means the lock depth and
/// buffer bookkeeping are corrupt; the caller must terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a lock violation must terminate the host"]
pub enum LockViolation {
    /// Caller released more locks than it acquired (debug builds only)
    CallerUnderflow(CallerId),

    /// Unlock with no outstanding lock
    DepthUnderflow,

    /// Unlock while another thread holds the frame lock
    ForeignThread,

    /// Locks are outstanding but no back buffer was captured
    Inconsistent,
}

impl fmt::Display for LockViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockViolation::CallerUnderflow(caller) => {
                write!(f, "Draw lock underflow: {}", caller)
            }
            LockViolation::DepthUnderflow => write!(f, "Draw main unlock error"),
            LockViolation::ForeignThread => {
                write!(f, "Draw unlock from a thread that does not hold the lock")
            }
            LockViolation::Inconsistent => write!(f, "Draw consistency error"),
        }
    }
}

impl std::error::Error for LockViolation {}
