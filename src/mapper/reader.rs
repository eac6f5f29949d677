//! Parse direction: XML event stream into a [`Graph`].
//!
//! Recursive descent, one call per complex element. Children only ever
//! bind to the object whose element encloses them, so a repeated element
//! at the same level as its siblings can never be mistaken for a child.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::schema::{Kind, Property, Schema};
use super::value::coerce;
use super::{Graph, MapperError, SchemaField};

/// SEC-003: Default maximum nesting depth of complex elements below the root.
/// Prevents stack overflow from maliciously crafted deeply nested input.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Populates `graph` from XML using the default depth limit.
pub fn parse<G: Graph>(graph: &mut G, input: &[u8]) -> Result<(), MapperError> {
    parse_with_depth(graph, input, DEFAULT_MAX_DEPTH)
}

/// Populates `graph` from XML.
///
/// The root element must match the root node's schema element. Unknown
/// elements are skipped with their subtree, unknown attributes are ignored,
/// and scalars that fail coercion keep their previous value.
///
/// # Errors
///
/// Fails only on structural problems: malformed XML, a truncated stream,
/// a mismatched root element, or nesting beyond `max_depth`.
///
/// # Security
///
/// `quick-xml` (0.37) never parses `<!ENTITY>` declarations; custom entity
/// references fail to unescape and the affected field is skipped.
pub fn parse_with_depth<G: Graph>(
    graph: &mut G,
    input: &[u8],
    max_depth: usize,
) -> Result<(), MapperError> {
    // Element text is kept verbatim; indentation between elements is
    // dropped where it is read.
    let reader = Reader::from_reader(input);

    GraphReader {
        graph,
        reader,
        max_depth,
    }
    .run()
}

struct GraphReader<'g, 'i, G: Graph> {
    graph: &'g mut G,
    reader: Reader<&'i [u8]>,
    max_depth: usize,
}

fn xml_error(e: impl std::fmt::Display) -> MapperError {
    MapperError::XmlParse(e.to_string())
}

fn local_name(element: &BytesStart<'_>) -> Result<String, MapperError> {
    Ok(std::str::from_utf8(element.local_name().as_ref())?.to_string())
}

impl<G: Graph> GraphReader<'_, '_, G> {
    fn run(mut self) -> Result<(), MapperError> {
        let root = self.graph.root();
        let schema = self.graph.schema(root);
        let mut buf = Vec::new();

        loop {
            match self.reader.read_event_into(&mut buf).map_err(xml_error)? {
                Event::Start(e) => {
                    let element = e.into_owned();
                    let name = check_root(schema, &element)?;
                    self.apply_attributes(root, &element);
                    self.map_children(root, &name)?;
                    return self.finish();
                }
                Event::Empty(e) => {
                    let element = e.into_owned();
                    check_root(schema, &element)?;
                    self.apply_attributes(root, &element);
                    return self.finish();
                }
                Event::Eof => return Err(MapperError::MissingRoot),
                // Declaration, comments, doctype, processing instructions
                _ => {}
            }
            buf.clear();
        }
    }

    /// Checks that nothing but comments, processing instructions and
    /// whitespace follows the root element.
    fn finish(&mut self) -> Result<(), MapperError> {
        let mut buf = Vec::new();

        loop {
            match self.reader.read_event_into(&mut buf).map_err(xml_error)? {
                Event::Eof => return Ok(()),
                Event::Comment(_) | Event::PI(_) => {}
                Event::Text(t) if t.iter().all(u8::is_ascii_whitespace) => {}
                other => {
                    return Err(MapperError::XmlParse(format!(
                        "unexpected content after root element: {:?}",
                        other
                    )));
                }
            }
            buf.clear();
        }
    }

    /// Reads the content of the element `name` into `node` until its end tag.
    fn map_children(&mut self, node: G::Node, name: &str) -> Result<(), MapperError> {
        self.map_children_at(node, name, 0)
    }

    fn map_children_at(
        &mut self,
        node: G::Node,
        name: &str,
        depth: usize,
    ) -> Result<(), MapperError> {
        let schema = self.graph.schema(node);
        let mut buf = Vec::new();

        loop {
            match self.reader.read_event_into(&mut buf).map_err(xml_error)? {
                Event::Start(e) => {
                    let child = e.into_owned();
                    self.map_child(node, schema, &child, false, depth)?;
                }
                Event::Empty(e) => {
                    let child = e.into_owned();
                    self.map_child(node, schema, &child, true, depth)?;
                }
                Event::Text(t) => {
                    if let Some(field) = schema.text_field() {
                        match t.unescape() {
                            Ok(text) => {
                                let text = text.into_owned();
                                self.assign(node, field, &text, name);
                            }
                            Err(e) => {
                                tracing::warn!(element = %name, error = %e, "Skipping undecodable text content");
                            }
                        }
                    }
                }
                Event::CData(c) => {
                    if let Some(field) = schema.text_field() {
                        let text = std::str::from_utf8(&c)?.to_string();
                        self.assign(node, field, &text, name);
                    }
                }
                Event::End(_) => return Ok(()),
                Event::Eof => return Err(MapperError::UnexpectedEof(name.to_string())),
                _ => {}
            }
            buf.clear();
        }
    }

    fn map_child(
        &mut self,
        node: G::Node,
        schema: &'static Schema<G::Field>,
        child: &BytesStart<'static>,
        empty: bool,
        depth: usize,
    ) -> Result<(), MapperError> {
        let name = local_name(child)?;
        // Prefixed names belong to extension namespaces, never to the schema
        let property = match child.name().prefix() {
            Some(_) => None,
            None => schema.lookup(&name),
        };
        let Some(property) = property else {
            tracing::debug!(element = %name, "Skipping unknown element");
            if !empty {
                self.skip(&name)?;
            }
            return Ok(());
        };

        match property.kind {
            Kind::Nested => {
                let target = self.graph.nested(node, property);
                self.enter(target, property, child, empty, depth + 1)
            }
            Kind::Repeated => {
                let target = self.graph.create(node, property);
                self.enter(target, property, child, empty, depth + 1)
            }
            Kind::Attribute(field) | Kind::Element(field) | Kind::Text(field) => {
                // Leaf: attributes belong to the current object, text to the field
                self.apply_attributes(node, child);
                let text = if empty {
                    Some(String::new())
                } else {
                    self.read_text(&name)?
                };
                if let Some(text) = text {
                    self.assign(node, field, &text, &name);
                }
                Ok(())
            }
        }
    }

    fn enter(
        &mut self,
        target: Option<G::Node>,
        property: &Property<G::Field>,
        element: &BytesStart<'static>,
        empty: bool,
        depth: usize,
    ) -> Result<(), MapperError> {
        if depth > self.max_depth {
            return Err(MapperError::MaxDepthExceeded(self.max_depth));
        }

        let Some(target) = target else {
            tracing::warn!(element = %property.name, "Graph has no object for element, skipping");
            if !empty {
                self.skip(property.name)?;
            }
            return Ok(());
        };

        self.apply_attributes(target, element);
        if empty {
            return Ok(());
        }
        self.map_children_at(target, property.name, depth)
    }

    /// Maps every attribute of `element` onto scalar fields of `node`.
    fn apply_attributes(&mut self, node: G::Node, element: &BytesStart<'_>) {
        let schema = self.graph.schema(node);
        let decoder = self.reader.decoder();

        for attr_result in element.attributes() {
            let attr = match attr_result {
                Ok(attr) => attr,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed attribute");
                    continue;
                }
            };
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            if attr.key.prefix().is_some() {
                tracing::debug!(attribute = ?attr.key, "Ignoring namespaced attribute");
                continue;
            }
            let Ok(key) = std::str::from_utf8(attr.key.into_inner()) else {
                tracing::warn!("Skipping attribute with non UTF-8 name");
                continue;
            };
            let Some((_, field)) = schema.lookup_scalar(key) else {
                tracing::debug!(attribute = %key, "Ignoring unknown attribute");
                continue;
            };
            match attr.decode_and_unescape_value(decoder) {
                Ok(value) => {
                    let value = value.into_owned();
                    self.assign(node, field, &value, key);
                }
                Err(e) => {
                    tracing::warn!(attribute = %key, error = %e, "Skipping undecodable attribute value");
                }
            }
        }
    }

    /// Collects the text of a leaf element up to its end tag.
    ///
    /// Nested markup inside a leaf is skipped. Returns `None` when the
    /// text could not be decoded.
    fn read_text(&mut self, name: &str) -> Result<Option<String>, MapperError> {
        let mut text = String::new();
        let mut valid = true;
        let mut buf = Vec::new();

        loop {
            match self.reader.read_event_into(&mut buf).map_err(xml_error)? {
                Event::Text(t) => match t.unescape() {
                    Ok(s) => text.push_str(&s),
                    Err(e) => {
                        tracing::warn!(element = %name, error = %e, "Skipping undecodable element text");
                        valid = false;
                    }
                },
                Event::CData(c) => text.push_str(std::str::from_utf8(&c)?),
                Event::Start(e) => {
                    let inner = local_name(&e)?;
                    self.skip(&inner)?;
                }
                Event::End(_) => break,
                Event::Eof => return Err(MapperError::UnexpectedEof(name.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(valid.then_some(text))
    }

    /// Consumes events through the end tag of an already opened element.
    fn skip(&mut self, name: &str) -> Result<(), MapperError> {
        let mut open = 1usize;
        let mut buf = Vec::new();

        while open > 0 {
            match self.reader.read_event_into(&mut buf).map_err(xml_error)? {
                Event::Start(_) => open += 1,
                Event::End(_) => open -= 1,
                Event::Eof => return Err(MapperError::UnexpectedEof(name.to_string())),
                _ => {}
            }
            buf.clear();
        }
        Ok(())
    }

    fn assign(&mut self, node: G::Node, field: G::Field, raw: &str, name: &str) {
        match coerce(field.value_type(), raw) {
            Ok(value) => self.graph.write(node, field, value),
            Err(e) => {
                tracing::debug!(name = %name, error = %e, "Skipping field that failed coercion");
            }
        }
    }
}

fn check_root<F: SchemaField>(
    schema: &'static Schema<F>,
    element: &BytesStart<'_>,
) -> Result<String, MapperError> {
    let name = local_name(element)?;
    if !name.eq_ignore_ascii_case(schema.element) {
        return Err(MapperError::UnexpectedRoot {
            expected: schema.element,
            found: name,
        });
    }
    Ok(name)
}
