//! Field identifiers for every modeled OPML scalar.

use crate::mapper::{SchemaField, Value, ValueType};

/// Scalar fields of the `<opml>` root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentField {
    Version,
}

/// Scalar fields of `<head>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadField {
    Title,
    DateCreated,
    DateModified,
    OwnerName,
    OwnerEmail,
    OwnerId,
    ExpansionState,
    VertScrollState,
    WindowTop,
    WindowLeft,
    WindowBottom,
    WindowRight,
}

impl HeadField {
    pub const ALL: [HeadField; 12] = [
        HeadField::Title,
        HeadField::DateCreated,
        HeadField::DateModified,
        HeadField::OwnerName,
        HeadField::OwnerEmail,
        HeadField::OwnerId,
        HeadField::ExpansionState,
        HeadField::VertScrollState,
        HeadField::WindowTop,
        HeadField::WindowLeft,
        HeadField::WindowBottom,
        HeadField::WindowRight,
    ];

    pub fn value_type(self) -> ValueType {
        match self {
            HeadField::DateCreated | HeadField::DateModified => ValueType::Date,
            HeadField::VertScrollState
            | HeadField::WindowTop
            | HeadField::WindowLeft
            | HeadField::WindowBottom
            | HeadField::WindowRight => ValueType::Int,
            _ => ValueType::Text,
        }
    }
}

/// Scalar fields of `<outline>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutlineField {
    Text,
    Type,
    Title,
    Description,
    Url,
    XmlUrl,
    HtmlUrl,
    IsComment,
    IsBreakpoint,
    Created,
    Category,
    Language,
    Version,
}

impl OutlineField {
    pub const ALL: [OutlineField; 13] = [
        OutlineField::Text,
        OutlineField::Type,
        OutlineField::Title,
        OutlineField::Description,
        OutlineField::Url,
        OutlineField::XmlUrl,
        OutlineField::HtmlUrl,
        OutlineField::IsComment,
        OutlineField::IsBreakpoint,
        OutlineField::Created,
        OutlineField::Category,
        OutlineField::Language,
        OutlineField::Version,
    ];

    pub fn value_type(self) -> ValueType {
        match self {
            OutlineField::IsComment | OutlineField::IsBreakpoint => ValueType::Bool,
            OutlineField::Created => ValueType::Date,
            OutlineField::Language => ValueType::Language,
            _ => ValueType::Text,
        }
    }
}

/// Any OPML scalar, qualified by the object that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Document(DocumentField),
    Head(HeadField),
    Outline(OutlineField),
}

impl SchemaField for Field {
    fn value_type(self) -> ValueType {
        match self {
            Field::Document(DocumentField::Version) => ValueType::Text,
            Field::Head(f) => f.value_type(),
            Field::Outline(f) => f.value_type(),
        }
    }
}

/// Field-addressed access to a flat record of scalars.
///
/// `get` returns the raw value (`None` when unset); whether it is worth
/// writing out is decided by [`Value::is_specified`]. `set` ignores values
/// of the wrong type.
pub trait Record {
    type Field: Copy;

    fn get(&self, field: Self::Field) -> Option<Value>;

    fn set(&mut self, field: Self::Field, value: Value);
}
