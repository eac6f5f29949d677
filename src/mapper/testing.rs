//! A small RSS-shaped graph for exercising the mapper without OPML.

use super::schema::{Property, Schema, SchemaField};
use super::value::{Value, ValueType};
use super::Graph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RssField {
    Version,
    Title,
    Ttl,
    ItemTitle,
    Read,
    SourceUrl,
    SourceName,
}

impl SchemaField for RssField {
    fn value_type(self) -> ValueType {
        match self {
            RssField::Ttl => ValueType::Int,
            RssField::Read => ValueType::Bool,
            _ => ValueType::Text,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum RssNode {
    Rss,
    Channel,
    Item(usize),
    Source(usize),
}

static RSS: Schema<RssField> = Schema {
    element: "rss",
    properties: &[
        Property::attribute("version", RssField::Version),
        Property::nested("channel"),
    ],
};

static CHANNEL: Schema<RssField> = Schema {
    element: "channel",
    properties: &[
        Property::element("title", RssField::Title),
        Property::element("ttl", RssField::Ttl),
        Property::repeated("item"),
    ],
};

static ITEM: Schema<RssField> = Schema {
    element: "item",
    properties: &[
        Property::attribute("read", RssField::Read),
        Property::element("title", RssField::ItemTitle),
        Property::nested("source"),
    ],
};

static SOURCE: Schema<RssField> = Schema {
    element: "source",
    properties: &[
        Property::attribute("url", RssField::SourceUrl),
        Property::text(RssField::SourceName),
    ],
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Item {
    pub title: Option<String>,
    pub read: bool,
    pub source_url: Option<String>,
    pub source_name: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Channel {
    pub title: Option<String>,
    pub ttl: Option<i32>,
    pub items: Vec<Item>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RssGraph {
    pub version: Option<String>,
    pub channel: Channel,
}

fn text(value: Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s),
        _ => None,
    }
}

impl Graph for RssGraph {
    type Field = RssField;
    type Node = RssNode;

    fn root(&self) -> RssNode {
        RssNode::Rss
    }

    fn schema(&self, node: RssNode) -> &'static Schema<RssField> {
        match node {
            RssNode::Rss => &RSS,
            RssNode::Channel => &CHANNEL,
            RssNode::Item(_) => &ITEM,
            RssNode::Source(_) => &SOURCE,
        }
    }

    fn read(&self, node: RssNode, field: RssField) -> Option<Value> {
        let item = |i: usize| self.channel.items.get(i);
        match (node, field) {
            (RssNode::Rss, RssField::Version) => self.version.clone().map(Value::Text),
            (RssNode::Channel, RssField::Title) => self.channel.title.clone().map(Value::Text),
            (RssNode::Channel, RssField::Ttl) => self.channel.ttl.map(Value::Int),
            (RssNode::Item(i), RssField::ItemTitle) => {
                item(i)?.title.clone().map(Value::Text)
            }
            (RssNode::Item(i), RssField::Read) => Some(Value::Bool(item(i)?.read)),
            (RssNode::Source(i), RssField::SourceUrl) => {
                item(i)?.source_url.clone().map(Value::Text)
            }
            (RssNode::Source(i), RssField::SourceName) => {
                item(i)?.source_name.clone().map(Value::Text)
            }
            _ => None,
        }
    }

    fn write(&mut self, node: RssNode, field: RssField, value: Value) {
        match (node, field, value) {
            (RssNode::Rss, RssField::Version, v) => self.version = text(v),
            (RssNode::Channel, RssField::Title, v) => self.channel.title = text(v),
            (RssNode::Channel, RssField::Ttl, Value::Int(n)) => self.channel.ttl = Some(n),
            (RssNode::Item(i), RssField::ItemTitle, v) => {
                if let Some(item) = self.channel.items.get_mut(i) {
                    item.title = text(v);
                }
            }
            (RssNode::Item(i), RssField::Read, Value::Bool(b)) => {
                if let Some(item) = self.channel.items.get_mut(i) {
                    item.read = b;
                }
            }
            (RssNode::Source(i), RssField::SourceUrl, v) => {
                if let Some(item) = self.channel.items.get_mut(i) {
                    item.source_url = text(v);
                }
            }
            (RssNode::Source(i), RssField::SourceName, v) => {
                if let Some(item) = self.channel.items.get_mut(i) {
                    item.source_name = text(v);
                }
            }
            _ => {}
        }
    }

    fn nested(&self, node: RssNode, property: &Property<RssField>) -> Option<RssNode> {
        match (node, property.name) {
            (RssNode::Rss, "channel") => Some(RssNode::Channel),
            (RssNode::Item(i), "source") => Some(RssNode::Source(i)),
            _ => None,
        }
    }

    fn create(&mut self, node: RssNode, property: &Property<RssField>) -> Option<RssNode> {
        match (node, property.name) {
            (RssNode::Channel, "item") => {
                self.channel.items.push(Item::default());
                Some(RssNode::Item(self.channel.items.len() - 1))
            }
            _ => None,
        }
    }

    fn items(&self, node: RssNode, property: &Property<RssField>) -> Vec<RssNode> {
        match (node, property.name) {
            (RssNode::Channel, "item") => {
                (0..self.channel.items.len()).map(RssNode::Item).collect()
            }
            _ => Vec::new(),
        }
    }
}
