//! Change log entries recorded by a [`Document`](super::Document).
//!
//! Mutations append to the log instead of firing callbacks. The document
//! itself is the one subscriber: it refreshes `head.date_modified` when
//! a change is recorded.

use super::document::OutlineId;
use super::field::Field;

/// The object a change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeTarget {
    Document,
    Head,
    Body,
    Outline(OutlineId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A scalar field changed value.
    Field(Field),
    /// Children were added, removed or reordered.
    Structure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub target: ChangeTarget,
    pub kind: ChangeKind,
}

impl Change {
    pub fn field(target: ChangeTarget, field: Field) -> Self {
        Self {
            target,
            kind: ChangeKind::Field(field),
        }
    }

    pub fn structure(target: ChangeTarget) -> Self {
        Self {
            target,
            kind: ChangeKind::Structure,
        }
    }
}
