//! Write direction: project a [`Graph`] back to XML.
//!
//! Properties are emitted in schema declaration order so output is
//! deterministic and diff-stable. A scalar is written only when its value
//! is specified; a nested object only when the graph reports it specified;
//! list entries always, one element each, in list order.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

use super::schema::Kind;
use super::value::{render, Value};
use super::{Graph, MapperError};

/// Output formatting.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Spaces per nesting level; 0 writes everything on one line.
    pub indent: usize,
    /// Comment placed right after the XML declaration.
    pub comment: Option<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            comment: None,
        }
    }
}

/// Serializes `graph` into a UTF-8 XML document.
pub fn serialize<G: Graph>(graph: &G, options: &WriteOptions) -> Result<Vec<u8>, MapperError> {
    serialize_into(graph, Vec::new(), options)
}

/// Serializes `graph` into `out`, returning it once the document is complete.
pub fn serialize_into<G: Graph, W: Write>(
    graph: &G,
    out: W,
    options: &WriteOptions,
) -> Result<W, MapperError> {
    let mut writer = if options.indent > 0 {
        Writer::new_with_indent(out, b' ', options.indent)
    } else {
        Writer::new(out)
    };

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    if let Some(comment) = &options.comment {
        // "--" is not allowed inside XML comments
        let comment = comment.replace("--", "- -");
        writer.write_event(Event::Comment(BytesText::from_escaped(format!(" {} ", comment))))?;
    }

    let root = graph.root();
    write_object(graph, &mut writer, root, graph.schema(root).element)?;

    Ok(writer.into_inner())
}

fn emitted<G: Graph>(graph: &G, node: G::Node, field: G::Field) -> Option<Value> {
    graph.read(node, field).filter(Value::is_specified)
}

fn write_object<G: Graph, W: Write>(
    graph: &G,
    writer: &mut Writer<W>,
    node: G::Node,
    tag: &str,
) -> Result<(), MapperError> {
    let schema = graph.schema(node);
    let mut start = BytesStart::new(tag);
    let mut has_content = false;

    for property in schema.properties {
        match property.kind {
            Kind::Attribute(field) => {
                if let Some(value) = emitted(graph, node, field) {
                    start.push_attribute((property.name, render(&value).as_str()));
                }
            }
            Kind::Element(field) | Kind::Text(field) => {
                has_content |= emitted(graph, node, field).is_some();
            }
            Kind::Nested => {
                has_content |= graph
                    .nested(node, property)
                    .is_some_and(|child| graph.is_specified(child));
            }
            Kind::Repeated => {
                has_content |= !graph.items(node, property).is_empty();
            }
        }
    }

    if !has_content {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;

    for property in schema.properties {
        match property.kind {
            Kind::Attribute(_) => {}
            Kind::Element(field) => {
                if let Some(value) = emitted(graph, node, field) {
                    write_text_element(writer, property.name, &render(&value))?;
                }
            }
            Kind::Text(field) => {
                if let Some(value) = emitted(graph, node, field) {
                    writer.write_event(Event::Text(BytesText::new(&render(&value))))?;
                }
            }
            Kind::Nested => {
                if let Some(child) = graph.nested(node, property) {
                    if graph.is_specified(child) {
                        write_object(graph, writer, child, property.name)?;
                    }
                }
            }
            Kind::Repeated => {
                for item in graph.items(node, property) {
                    write_object(graph, writer, item, property.name)?;
                }
            }
        }
    }

    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> Result<(), MapperError> {
    // Self-closing, so indentation never ends up inside an empty value
    if text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(tag)))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::parse;
    use crate::mapper::testing::{Channel, Item, RssGraph};

    fn to_string(graph: &RssGraph, options: &WriteOptions) -> String {
        String::from_utf8(serialize(graph, options).unwrap()).unwrap()
    }

    fn sample() -> RssGraph {
        RssGraph {
            version: Some("2.0".to_string()),
            channel: Channel {
                title: Some("Tom & Jerry".to_string()),
                ttl: Some(30),
                items: vec![
                    Item {
                        title: Some("one".to_string()),
                        read: true,
                        source_url: Some("https://src.example/feed?a=1&b=2".to_string()),
                        source_name: Some("Source".to_string()),
                    },
                    Item {
                        title: Some("two".to_string()),
                        ..Item::default()
                    },
                ],
            },
        }
    }

    #[test]
    fn test_round_trip_through_text() {
        let original = sample();
        let xml = serialize(&original, &WriteOptions::default()).unwrap();

        let mut parsed = RssGraph::default();
        parse(&mut parsed, &xml).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_emission_follows_schema_order() {
        let xml = to_string(
            &sample(),
            &WriteOptions {
                indent: 0,
                comment: None,
            },
        );
        let title = xml.find("<title>Tom").unwrap();
        let ttl = xml.find("<ttl>").unwrap();
        let item = xml.find("<item").unwrap();
        assert!(title < ttl && ttl < item);
        assert!(xml.find("<title>one").unwrap() < xml.find("<title>two").unwrap());
    }

    #[test]
    fn test_unspecified_scalars_suppressed() {
        let mut graph = sample();
        graph.channel.ttl = Some(0);
        graph.channel.items[1].read = false;
        let xml = to_string(&graph, &WriteOptions::default());
        assert!(!xml.contains("<ttl>"));
        assert_eq!(xml.matches("read=").count(), 1);
    }

    #[test]
    fn test_unspecified_nested_object_suppressed() {
        let xml = to_string(&sample(), &WriteOptions::default());
        // second item has no source at all
        assert_eq!(xml.matches("<source").count(), 1);
    }

    #[test]
    fn test_empty_objects_are_self_closing() {
        let graph = RssGraph {
            version: Some("2.0".to_string()),
            channel: Channel {
                items: vec![Item::default()],
                ..Channel::default()
            },
        };
        let xml = to_string(
            &graph,
            &WriteOptions {
                indent: 0,
                comment: None,
            },
        );
        assert!(xml.ends_with(r#"<rss version="2.0"><channel><item/></channel></rss>"#));
    }

    #[test]
    fn test_text_content_and_escaping() {
        let xml = to_string(&sample(), &WriteOptions::default());
        assert!(xml.contains("Tom &amp; Jerry"));
        assert!(xml.contains(r#"url="https://src.example/feed?a=1&amp;b=2">Source</source>"#));
    }

    #[test]
    fn test_padded_and_empty_text_survive_indentation() {
        let mut graph = sample();
        graph.channel.title = Some("  padded ".to_string());
        graph.channel.items[1].title = Some(String::new());

        let xml = serialize(&graph, &WriteOptions::default()).unwrap();
        assert!(String::from_utf8_lossy(&xml).contains("<title/>"));

        let mut parsed = RssGraph::default();
        parse(&mut parsed, &xml).unwrap();
        assert_eq!(parsed, graph);
    }

    #[test]
    fn test_declaration_and_comment() {
        let xml = to_string(
            &sample(),
            &WriteOptions {
                indent: 2,
                comment: Some("Generated by rsskit -- test".to_string()),
            },
        );
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<!-- Generated by rsskit - - test -->"));
    }
}
