//! Plain, serializable editor coordinates.
//!
//! Snapshots never hold host objects; everything the host reports is copied
//! into these value types first so fixtures stay deterministic.

use serde::{Deserialize, Serialize};

/// Zero-based line/character position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionPlainObject {
    pub line: u32,
    pub character: u32,
}

impl PositionPlainObject {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Unoriented range between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangePlainObject {
    pub start: PositionPlainObject,
    pub end: PositionPlainObject,
}

impl RangePlainObject {
    pub fn new(start: PositionPlainObject, end: PositionPlainObject) -> Self {
        Self { start, end }
    }

    /// Single-line range, the common shape of a hat token
    pub fn on_line(line: u32, start: u32, end: u32) -> Self {
        Self::new(
            PositionPlainObject::new(line, start),
            PositionPlainObject::new(line, end),
        )
    }
}

/// Oriented selection; `active` is where the cursor sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPlainObject {
    pub anchor: PositionPlainObject,
    pub active: PositionPlainObject,
}

impl SelectionPlainObject {
    pub fn new(anchor: PositionPlainObject, active: PositionPlainObject) -> Self {
        Self { anchor, active }
    }

    /// Empty selection (a bare cursor)
    pub fn cursor(line: u32, character: u32) -> Self {
        let at = PositionPlainObject::new(line, character);
        Self::new(at, at)
    }
}
