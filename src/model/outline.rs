use chrono::{DateTime, Utc};

use super::field::{Field, OutlineField, Record};
use crate::mapper::{LanguageTag, Property, Schema, Value};

/// `<outline>`: attributes in output order, then child outlines.
pub static OUTLINE_SCHEMA: Schema<Field> = Schema {
    element: "outline",
    properties: &[
        Property::attribute("text", Field::Outline(OutlineField::Text)),
        Property::attribute("type", Field::Outline(OutlineField::Type)),
        Property::attribute("title", Field::Outline(OutlineField::Title)),
        Property::attribute("description", Field::Outline(OutlineField::Description)),
        Property::attribute("url", Field::Outline(OutlineField::Url)),
        Property::attribute("xmlUrl", Field::Outline(OutlineField::XmlUrl)),
        Property::attribute("htmlUrl", Field::Outline(OutlineField::HtmlUrl)),
        Property::attribute("isComment", Field::Outline(OutlineField::IsComment)),
        Property::attribute("isBreakpoint", Field::Outline(OutlineField::IsBreakpoint)),
        Property::attribute("created", Field::Outline(OutlineField::Created)),
        Property::attribute("category", Field::Outline(OutlineField::Category)),
        Property::attribute("language", Field::Outline(OutlineField::Language)),
        Property::attribute("version", Field::Outline(OutlineField::Version)),
        Property::repeated("outline"),
    ],
};

/// The scalar attributes of one outline entry.
///
/// Children are not stored here; they live in the owning
/// [`Document`](super::Document) or in a detached [`OutlineTree`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    /// What is displayed when the outline is browsed or edited.
    pub text: Option<String>,
    /// How the other attributes are interpreted (`rss`, `link`, `include`, ...).
    pub outline_type: Option<String>,
    /// Top-level title of the feed, usually the same as `text`.
    pub title: Option<String>,
    pub description: Option<String>,
    /// Target address when the type is `link` or `include`.
    pub url: Option<String>,
    /// Feed address for subscription lists.
    pub xml_url: Option<String>,
    pub html_url: Option<String>,
    /// A commented outline comments out its whole subtree by convention.
    pub is_comment: bool,
    pub is_breakpoint: bool,
    pub created: Option<DateTime<Utc>>,
    /// Comma-separated, slash-delimited category strings.
    pub category: Option<String>,
    pub language: Option<LanguageTag>,
    /// Feed format version (`RSS`, `RSS1`, `scriptingNews`).
    pub version: Option<String>,
}

impl Outline {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// A feed subscription entry (`type="rss"`).
    pub fn feed(text: impl Into<String>, xml_url: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            outline_type: Some("rss".to_string()),
            xml_url: Some(xml_url.into()),
            ..Self::default()
        }
    }

    pub fn is_feed(&self) -> bool {
        self.xml_url.is_some()
    }

    /// Display label: `text`, then `title`, then the feed URL.
    pub fn label(&self) -> &str {
        self.text
            .as_deref()
            .or(self.title.as_deref())
            .or(self.xml_url.as_deref())
            .unwrap_or_default()
    }

    /// The category attribute split into slash-delimited paths.
    ///
    /// `"/Boston/Weather,news"` yields `[["Boston", "Weather"], ["news"]]`;
    /// a single-segment path is a plain tag.
    pub fn categories(&self) -> Vec<Vec<&str>> {
        self.category
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|entry| {
                entry
                    .split('/')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|path| !path.is_empty())
            .collect()
    }
}

impl Record for Outline {
    type Field = OutlineField;

    fn get(&self, field: OutlineField) -> Option<Value> {
        match field {
            OutlineField::Text => self.text.clone().map(Value::Text),
            OutlineField::Type => self.outline_type.clone().map(Value::Text),
            OutlineField::Title => self.title.clone().map(Value::Text),
            OutlineField::Description => self.description.clone().map(Value::Text),
            OutlineField::Url => self.url.clone().map(Value::Text),
            OutlineField::XmlUrl => self.xml_url.clone().map(Value::Text),
            OutlineField::HtmlUrl => self.html_url.clone().map(Value::Text),
            OutlineField::IsComment => Some(Value::Bool(self.is_comment)),
            OutlineField::IsBreakpoint => Some(Value::Bool(self.is_breakpoint)),
            OutlineField::Created => self.created.map(Value::Date),
            OutlineField::Category => self.category.clone().map(Value::Text),
            OutlineField::Language => self.language.clone().map(Value::Language),
            OutlineField::Version => self.version.clone().map(Value::Text),
        }
    }

    fn set(&mut self, field: OutlineField, value: Value) {
        match (field, value) {
            (OutlineField::Text, Value::Text(s)) => self.text = Some(s),
            (OutlineField::Type, Value::Text(s)) => self.outline_type = Some(s),
            (OutlineField::Title, Value::Text(s)) => self.title = Some(s),
            (OutlineField::Description, Value::Text(s)) => self.description = Some(s),
            (OutlineField::Url, Value::Text(s)) => self.url = Some(s),
            (OutlineField::XmlUrl, Value::Text(s)) => self.xml_url = Some(s),
            (OutlineField::HtmlUrl, Value::Text(s)) => self.html_url = Some(s),
            (OutlineField::IsComment, Value::Bool(b)) => self.is_comment = b,
            (OutlineField::IsBreakpoint, Value::Bool(b)) => self.is_breakpoint = b,
            (OutlineField::Created, Value::Date(d)) => self.created = Some(d),
            (OutlineField::Category, Value::Text(s)) => self.category = Some(s),
            (OutlineField::Language, Value::Language(tag)) => self.language = Some(tag),
            (OutlineField::Version, Value::Text(s)) => self.version = Some(s),
            (field, value) => {
                tracing::debug!(?field, ?value, "Ignoring outline value of mismatched type");
            }
        }
    }
}

/// An outline with its children, owned and detached from any document.
///
/// Produced by removing a subtree from a document and accepted when
/// grafting one in. Carries no parent or document references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineTree {
    pub outline: Outline,
    pub children: Vec<OutlineTree>,
}

#[allow(clippy::len_without_is_empty)]
impl OutlineTree {
    pub fn new(outline: Outline) -> Self {
        Self {
            outline,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: OutlineTree) -> Self {
        self.children.push(child);
        self
    }

    /// Number of outlines in the tree, this one included.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(OutlineTree::len).sum::<usize>()
    }

    /// Levels in the tree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(OutlineTree::depth)
            .max()
            .unwrap_or(0)
    }
}

impl From<Outline> for OutlineTree {
    fn from(outline: Outline) -> Self {
        Self::new(outline)
    }
}
