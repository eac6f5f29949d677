//! The OPML object model.
//!
//! A [`Document`] owns a [`Head`], a [`Body`] and the outline tree. Scalar
//! records ([`Head`], [`Outline`]) expose their fields through [`Record`] so
//! the document can diff edits and the mapper can bind XML names to them.

pub mod change;
pub mod document;
pub mod field;
pub mod head;
pub mod outline;

pub use change::{Change, ChangeKind, ChangeTarget};
pub use document::{
    Body, Document, DocumentId, NodeRef, OutlineId, Outlines, TreeError, BODY_SCHEMA,
    DOCUMENT_SCHEMA,
};
pub use field::{DocumentField, Field, HeadField, OutlineField, Record};
pub use head::{Head, HEAD_SCHEMA};
pub use outline::{Outline, OutlineTree, OUTLINE_SCHEMA};
