//! Schema-driven mapping between XML and an object graph.
//!
//! The mapper never knows about OPML. It walks any [`Graph`]: a set of
//! node handles, each with a static [`Schema`] that says which XML names
//! bind to which scalar fields and which name nested or repeated child
//! objects.
//!
//! - [`reader`] - recursive descent from a `quick-xml` event stream into a graph
//! - [`writer`] - schema-ordered projection of a graph back to XML
//! - [`schema`] - property tables and case-insensitive lookup
//! - [`value`] - scalar types and their text coercions

pub mod reader;
pub mod schema;
pub mod value;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;

use thiserror::Error;

pub use reader::{parse, parse_with_depth, DEFAULT_MAX_DEPTH};
pub use schema::{Kind, Property, Schema, SchemaField};
pub use value::{CoerceError, LanguageTag, Value, ValueType};
pub use writer::{serialize, WriteOptions};

/// Fatal mapping errors. Field-level coercion failures are not errors.
#[derive(Debug, Error)]
pub enum MapperError {
    /// Malformed XML (unbalanced tags, bad syntax).
    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("Invalid UTF-8 in XML name: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Input ended while an element was still open.
    #[error("Unexpected end of input inside <{0}>")]
    UnexpectedEof(String),

    #[error("Input contains no root element")]
    MissingRoot,

    #[error("Expected root element <{expected}>, found <{found}>")]
    UnexpectedRoot { expected: &'static str, found: String },

    /// SEC-003: Nesting depth exceeds safety limit.
    #[error("Nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    #[error("Failed to write XML: {0}")]
    Io(#[from] std::io::Error),
}

/// An object graph the mapper can populate and project.
///
/// Nodes are lightweight handles. Singular children are looked up,
/// list children are created on demand (the graph decides how a new
/// entry is linked in), and scalars travel as [`Value`]s.
pub trait Graph {
    type Field: SchemaField;
    type Node: Copy + std::fmt::Debug;

    /// The node whose element is the document root.
    fn root(&self) -> Self::Node;

    fn schema(&self, node: Self::Node) -> &'static Schema<Self::Field>;

    /// Current value of a scalar field, `None` when unset.
    fn read(&self, node: Self::Node, field: Self::Field) -> Option<Value>;

    fn write(&mut self, node: Self::Node, field: Self::Field, value: Value);

    /// The existing object behind a [`Kind::Nested`] property.
    fn nested(&self, node: Self::Node, property: &Property<Self::Field>) -> Option<Self::Node>;

    /// Creates a new entry for a [`Kind::Repeated`] property, appends it
    /// to the list, and returns it.
    fn create(&mut self, node: Self::Node, property: &Property<Self::Field>)
        -> Option<Self::Node>;

    /// Entries of a [`Kind::Repeated`] property, in list order.
    fn items(&self, node: Self::Node, property: &Property<Self::Field>) -> Vec<Self::Node>;

    /// Whether a nested object has anything worth writing out.
    fn is_specified(&self, node: Self::Node) -> bool {
        let schema = self.schema(node);
        schema.properties.iter().any(|p| match p.kind {
            Kind::Attribute(f) | Kind::Element(f) | Kind::Text(f) => {
                self.read(node, f).is_some_and(|v| v.is_specified())
            }
            Kind::Nested => self
                .nested(node, p)
                .is_some_and(|child| self.is_specified(child)),
            Kind::Repeated => !self.items(node, p).is_empty(),
        })
    }
}
