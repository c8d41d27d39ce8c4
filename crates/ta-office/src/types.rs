//! Common data types for the office simulation.

use serde::Serialize;
use std::fmt;

/// Identity of a student, assigned sequentially from 1 at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StudentId(pub u32);

impl StudentId {
    /// The numeric identity.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who produced a journal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Actor {
    Student(StudentId),
    Helper,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Student(id) => write!(f, "student-{id}"),
            Actor::Helper => f.write_str("helper"),
        }
    }
}
