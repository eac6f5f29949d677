use chrono::{DateTime, Utc};

use super::field::{Field, HeadField, Record};
use crate::mapper::{Property, Schema, Value};

/// `<head>` in declaration (and output) order.
pub static HEAD_SCHEMA: Schema<Field> = Schema {
    element: "head",
    properties: &[
        Property::element("title", Field::Head(HeadField::Title)),
        Property::element("dateCreated", Field::Head(HeadField::DateCreated)),
        Property::element("dateModified", Field::Head(HeadField::DateModified)),
        Property::element("ownerName", Field::Head(HeadField::OwnerName)),
        Property::element("ownerEmail", Field::Head(HeadField::OwnerEmail)),
        Property::element("ownerId", Field::Head(HeadField::OwnerId)),
        Property::element("expansionState", Field::Head(HeadField::ExpansionState)),
        Property::element("vertScrollState", Field::Head(HeadField::VertScrollState)),
        Property::element("windowTop", Field::Head(HeadField::WindowTop)),
        Property::element("windowLeft", Field::Head(HeadField::WindowLeft)),
        Property::element("windowBottom", Field::Head(HeadField::WindowBottom)),
        Property::element("windowRight", Field::Head(HeadField::WindowRight)),
    ],
};

/// Document metadata. Every field is optional.
///
/// The scroll and window integers are UI state from outliners; values of
/// zero or below are treated as unset and never written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Head {
    pub title: Option<String>,
    pub date_created: Option<DateTime<Utc>>,
    /// Refreshed by the owning document whenever it records a change.
    pub date_modified: Option<DateTime<Utc>>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    /// Address of a page where readers can contact the owner.
    pub owner_id: Option<String>,
    /// Comma-separated line numbers of expanded headlines.
    pub expansion_state: Option<String>,
    pub vert_scroll_state: i32,
    pub window_top: i32,
    pub window_left: i32,
    pub window_bottom: i32,
    pub window_right: i32,
}

impl Head {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any field would be written out.
    pub fn is_specified(&self) -> bool {
        HeadField::ALL
            .iter()
            .any(|f| self.get(*f).is_some_and(|v| v.is_specified()))
    }

    /// Line numbers listed in `expansionState`, in order.
    ///
    /// Entries that are not non-negative integers are skipped.
    pub fn expanded_lines(&self) -> Vec<u32> {
        self.expansion_state
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect()
    }
}

impl Record for Head {
    type Field = HeadField;

    fn get(&self, field: HeadField) -> Option<Value> {
        match field {
            HeadField::Title => self.title.clone().map(Value::Text),
            HeadField::DateCreated => self.date_created.map(Value::Date),
            HeadField::DateModified => self.date_modified.map(Value::Date),
            HeadField::OwnerName => self.owner_name.clone().map(Value::Text),
            HeadField::OwnerEmail => self.owner_email.clone().map(Value::Text),
            HeadField::OwnerId => self.owner_id.clone().map(Value::Text),
            HeadField::ExpansionState => self.expansion_state.clone().map(Value::Text),
            HeadField::VertScrollState => Some(Value::Int(self.vert_scroll_state)),
            HeadField::WindowTop => Some(Value::Int(self.window_top)),
            HeadField::WindowLeft => Some(Value::Int(self.window_left)),
            HeadField::WindowBottom => Some(Value::Int(self.window_bottom)),
            HeadField::WindowRight => Some(Value::Int(self.window_right)),
        }
    }

    fn set(&mut self, field: HeadField, value: Value) {
        match (field, value) {
            (HeadField::Title, Value::Text(s)) => self.title = Some(s),
            (HeadField::DateCreated, Value::Date(d)) => self.date_created = Some(d),
            (HeadField::DateModified, Value::Date(d)) => self.date_modified = Some(d),
            (HeadField::OwnerName, Value::Text(s)) => self.owner_name = Some(s),
            (HeadField::OwnerEmail, Value::Text(s)) => self.owner_email = Some(s),
            (HeadField::OwnerId, Value::Text(s)) => self.owner_id = Some(s),
            (HeadField::ExpansionState, Value::Text(s)) => self.expansion_state = Some(s),
            (HeadField::VertScrollState, Value::Int(n)) => self.vert_scroll_state = n,
            (HeadField::WindowTop, Value::Int(n)) => self.window_top = n,
            (HeadField::WindowLeft, Value::Int(n)) => self.window_left = n,
            (HeadField::WindowBottom, Value::Int(n)) => self.window_bottom = n,
            (HeadField::WindowRight, Value::Int(n)) => self.window_right = n,
            (field, value) => {
                tracing::debug!(?field, ?value, "Ignoring head value of mismatched type");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_head_is_not_specified() {
        assert!(!Head::new().is_specified());
    }

    #[test]
    fn test_non_positive_integers_do_not_specify() {
        let head = Head {
            vert_scroll_state: 0,
            window_top: -5,
            ..Head::default()
        };
        assert!(!head.is_specified());

        let head = Head {
            vert_scroll_state: 5,
            ..Head::default()
        };
        assert!(head.is_specified());
    }

    #[test]
    fn test_any_text_field_specifies() {
        let head = Head {
            owner_email: Some("me@example.com".to_string()),
            ..Head::default()
        };
        assert!(head.is_specified());
    }

    #[test]
    fn test_set_ignores_mismatched_type() {
        let mut head = Head::new();
        head.set(HeadField::WindowTop, Value::Text("12".to_string()));
        assert_eq!(head.window_top, 0);
        head.set(HeadField::WindowTop, Value::Int(12));
        assert_eq!(head.window_top, 12);
    }

    #[test]
    fn test_expanded_lines() {
        let head = Head {
            expansion_state: Some("1, 6,13,x,-2,16".to_string()),
            ..Head::default()
        };
        assert_eq!(head.expanded_lines(), vec![1, 6, 13, 16]);
        assert!(Head::new().expanded_lines().is_empty());
    }

    #[test]
    fn test_schema_binds_every_field_once() {
        let fields: Vec<_> = HEAD_SCHEMA.fields().collect();
        let expected: Vec<_> = HeadField::ALL.iter().map(|f| Field::Head(*f)).collect();
        assert_eq!(fields, expected);
    }
}
