//! Declarative schemas: which XML names bind to which fields, and how.
//!
//! A schema is an ordered table. Lookup is case-insensitive; the order is
//! the emission order on output.

use super::value::ValueType;

/// A field identifier understood by a [`Graph`](super::Graph) implementation.
pub trait SchemaField: Copy + std::fmt::Debug + 'static {
    fn value_type(self) -> ValueType;
}

/// Structural kind of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind<F> {
    /// Scalar carried in an attribute of the object's own element.
    Attribute(F),
    /// Scalar carried as the text of a child element.
    Element(F),
    /// Scalar carried as the text content of the object's own element.
    Text(F),
    /// A single nested object.
    Nested,
    /// A repeated nested object, one element per list entry.
    Repeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property<F: 'static> {
    pub name: &'static str,
    pub kind: Kind<F>,
}

impl<F: SchemaField> Property<F> {
    pub const fn attribute(name: &'static str, field: F) -> Self {
        Self {
            name,
            kind: Kind::Attribute(field),
        }
    }

    pub const fn element(name: &'static str, field: F) -> Self {
        Self {
            name,
            kind: Kind::Element(field),
        }
    }

    pub const fn text(field: F) -> Self {
        Self {
            name: "",
            kind: Kind::Text(field),
        }
    }

    pub const fn nested(name: &'static str) -> Self {
        Self {
            name,
            kind: Kind::Nested,
        }
    }

    pub const fn repeated(name: &'static str) -> Self {
        Self {
            name,
            kind: Kind::Repeated,
        }
    }

    /// The scalar field this property binds, if it is a scalar.
    pub fn field(&self) -> Option<F> {
        match self.kind {
            Kind::Attribute(f) | Kind::Element(f) | Kind::Text(f) => Some(f),
            Kind::Nested | Kind::Repeated => None,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self.kind, Kind::Nested | Kind::Repeated)
    }
}

/// The schema of one model type.
#[derive(Debug)]
pub struct Schema<F: 'static> {
    /// Element name used when this type is the document root.
    pub element: &'static str,
    pub properties: &'static [Property<F>],
}

impl<F: SchemaField> Schema<F> {
    /// Finds a property by XML name, ignoring ASCII case.
    ///
    /// An empty name resolves to the text-content property, if declared.
    pub fn lookup(&self, name: &str) -> Option<&'static Property<F>> {
        let properties: &'static [Property<F>] = self.properties;
        if name.is_empty() {
            return properties
                .iter()
                .find(|p| matches!(p.kind, Kind::Text(_)));
        }
        properties
            .iter()
            .find(|p| !p.name.is_empty() && p.name.eq_ignore_ascii_case(name))
    }

    /// Finds a scalar property by XML name; complex properties are skipped.
    pub fn lookup_scalar(&self, name: &str) -> Option<(&'static Property<F>, F)> {
        let property = self.lookup(name)?;
        property.field().map(|f| (property, f))
    }

    /// All scalar fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = F> + 'static {
        let properties: &'static [Property<F>] = self.properties;
        properties.iter().filter_map(|p| p.field())
    }

    pub fn text_field(&self) -> Option<F> {
        self.properties.iter().find_map(|p| match p.kind {
            Kind::Text(f) => Some(f),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Note {
        Id,
        Flag,
        Body,
    }

    impl SchemaField for Note {
        fn value_type(self) -> ValueType {
            match self {
                Note::Id => ValueType::Int,
                Note::Flag => ValueType::Bool,
                Note::Body => ValueType::Text,
            }
        }
    }

    static NOTE: Schema<Note> = Schema {
        element: "note",
        properties: &[
            Property::attribute("id", Note::Id),
            Property::element("isFlagged", Note::Flag),
            Property::repeated("child"),
            Property::text(Note::Body),
        ],
    };

    #[test]
    fn test_lookup_ignores_case() {
        let p = NOTE.lookup("ISFLAGGED").unwrap();
        assert_eq!(p.kind, Kind::Element(Note::Flag));
        assert_eq!(NOTE.lookup("Child").unwrap().kind, Kind::Repeated);
    }

    #[test]
    fn test_empty_name_binds_text_content() {
        assert_eq!(NOTE.lookup("").unwrap().kind, Kind::Text(Note::Body));
        assert_eq!(NOTE.text_field(), Some(Note::Body));
    }

    #[test]
    fn test_unknown_name_is_none() {
        assert!(NOTE.lookup("nope").is_none());
        assert!(NOTE.lookup_scalar("child").is_none());
    }

    #[test]
    fn test_fields_in_declaration_order() {
        let fields: Vec<_> = NOTE.fields().collect();
        assert_eq!(fields, vec![Note::Id, Note::Flag, Note::Body]);
    }
}
