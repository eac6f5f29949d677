//! The OPML document aggregate.
//!
//! A [`Document`] owns its [`Head`], its [`Body`] and every outline node.
//! Nodes live in a generational arena; parent and child links are
//! [`OutlineId`] handles, so ownership stays a tree while ancestry lookup
//! is O(depth).
//!
//! Handles carry the id of the document that issued them. A handle used on
//! another document, or one whose node has been removed, resolves to
//! nothing; a node can therefore never disagree with its document.
//!
//! `Document` has no internal synchronization and is not safe for
//! unsynchronized mutation from several threads.

use chrono::{SubsecRound, Utc};
use generational_arena::{Arena, Index};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use super::change::{Change, ChangeKind, ChangeTarget};
use super::field::{DocumentField, Field, HeadField, OutlineField, Record};
use super::head::{Head, HEAD_SCHEMA};
use super::outline::{Outline, OutlineTree, OUTLINE_SCHEMA};
use crate::mapper::{Graph, Property, Schema, Value};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// `<opml version="...">` with its head and body.
pub static DOCUMENT_SCHEMA: Schema<Field> = Schema {
    element: "opml",
    properties: &[
        Property::attribute("version", Field::Document(DocumentField::Version)),
        Property::nested("head"),
        Property::nested("body"),
    ],
};

pub static BODY_SCHEMA: Schema<Field> = Schema {
    element: "body",
    properties: &[Property::repeated("outline")],
};

/// Errors from structural operations on a document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Outline belongs to a different document")]
    ForeignOutline,

    #[error("Outline does not exist in this document")]
    UnknownOutline,

    #[error("Cannot move an outline beneath itself or one of its descendants")]
    Cycle,
}

/// Process-unique identity of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

/// Handle to an outline node inside a specific document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutlineId {
    document: DocumentId,
    index: Index,
}

impl OutlineId {
    /// The document that issued this handle.
    pub fn document(&self) -> DocumentId {
        self.document
    }
}

#[derive(Debug)]
struct OutlineNode {
    outline: Outline,
    /// None for body-level outlines
    parent: Option<OutlineId>,
    children: Vec<OutlineId>,
}

/// The root list of outlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    document: DocumentId,
    items: Vec<OutlineId>,
}

impl Body {
    pub fn document(&self) -> DocumentId {
        self.document
    }

    /// Body-level outlines in display order.
    pub fn items(&self) -> &[OutlineId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// A body is written out only when it has outlines.
    pub fn is_specified(&self) -> bool {
        !self.items.is_empty()
    }
}

/// Mapper handle for the objects of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    Document,
    Head,
    Body,
    Outline(OutlineId),
}

#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    version: String,
    head: Head,
    body: Body,
    nodes: Arena<OutlineNode>,
    changes: Vec<Change>,
    touch_modified: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub const DEFAULT_VERSION: &'static str = "2.0";

    /// An empty document: unset head, no outlines.
    pub fn new() -> Self {
        let id = DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            id,
            version: Self::DEFAULT_VERSION.to_string(),
            head: Head::default(),
            body: Body {
                document: id,
                items: Vec::new(),
            },
            nodes: Arena::new(),
            changes: Vec::new(),
            touch_modified: true,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        let version = version.into();
        if version != self.version {
            self.version = version;
            self.record(Change::field(
                ChangeTarget::Document,
                Field::Document(DocumentField::Version),
            ));
        }
    }

    pub fn head(&self) -> &Head {
        &self.head
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Whether recorded changes refresh `head.date_modified`. On by default.
    pub fn touches_modified(&self) -> bool {
        self.touch_modified
    }

    pub fn set_touch_modified(&mut self, enabled: bool) {
        self.touch_modified = enabled;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Total number of outlines at every level.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: OutlineId) -> bool {
        self.node(id).is_ok()
    }

    pub fn outline(&self, id: OutlineId) -> Option<&Outline> {
        self.node(id).ok().map(|n| &n.outline)
    }

    /// The parent outline, `None` for body-level outlines and unknown handles.
    pub fn parent(&self, id: OutlineId) -> Option<OutlineId> {
        self.node(id).ok().and_then(|n| n.parent)
    }

    /// Children of an outline, or the body items when `parent` is `None`.
    pub fn children(&self, parent: Option<OutlineId>) -> &[OutlineId] {
        match parent {
            None => &self.body.items,
            Some(id) => self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[]),
        }
    }

    /// Resolves the owning document by walking parent links up to the body.
    pub fn document_of(&self, id: OutlineId) -> Option<DocumentId> {
        let root = self.ancestors(id).last().unwrap_or(id);
        self.body.items.contains(&root).then_some(self.id)
    }

    /// 1 for body-level outlines.
    pub fn depth(&self, id: OutlineId) -> Option<usize> {
        self.node(id).ok()?;
        Some(1 + self.ancestors(id).count())
    }

    /// Parent, grandparent, ... up to the body-level outline.
    pub fn ancestors(&self, id: OutlineId) -> impl Iterator<Item = OutlineId> + '_ {
        std::iter::successors(self.parent(id), move |p| self.parent(*p))
    }

    /// Pre-order traversal in document order.
    pub fn iter(&self) -> Outlines<'_> {
        Outlines {
            document: self,
            stack: self.body.items.iter().rev().copied().collect(),
        }
    }

    pub fn find(&self, mut predicate: impl FnMut(&Outline) -> bool) -> Option<OutlineId> {
        self.iter().find(|(_, o)| predicate(o)).map(|(id, _)| id)
    }

    /// A detached copy of the subtree rooted at `id`.
    pub fn subtree(&self, id: OutlineId) -> Option<OutlineTree> {
        let node = self.node(id).ok()?;
        Some(OutlineTree {
            outline: node.outline.clone(),
            children: node
                .children
                .iter()
                .filter_map(|c| self.subtree(*c))
                .collect(),
        })
    }

    /// Detached copies of every body-level subtree.
    pub fn outlines(&self) -> Vec<OutlineTree> {
        self.body
            .items
            .iter()
            .filter_map(|id| self.subtree(*id))
            .collect()
    }

    // ========================================================================
    // Structural mutation
    // ========================================================================

    /// Creates an empty outline at the end of `parent` (the body when `None`).
    pub fn create_outline(&mut self, parent: Option<OutlineId>) -> Result<OutlineId, TreeError> {
        self.insert(parent, usize::MAX, Outline::default())
    }

    /// Appends a detached subtree at the end of `parent`.
    pub fn append(
        &mut self,
        parent: Option<OutlineId>,
        tree: impl Into<OutlineTree>,
    ) -> Result<OutlineId, TreeError> {
        self.insert(parent, usize::MAX, tree)
    }

    /// Inserts a detached subtree at `position` among the children of
    /// `parent`. Positions past the end append.
    pub fn insert(
        &mut self,
        parent: Option<OutlineId>,
        position: usize,
        tree: impl Into<OutlineTree>,
    ) -> Result<OutlineId, TreeError> {
        self.check_container(parent)?;
        let id = self.graft(parent, position, tree.into());
        self.record(Change::structure(container_target(parent)));
        Ok(id)
    }

    /// Detaches the subtree rooted at `id` and returns it.
    ///
    /// Every handle into the subtree becomes invalid.
    pub fn remove(&mut self, id: OutlineId) -> Result<OutlineTree, TreeError> {
        let parent = self.node(id)?.parent;
        self.unlink(parent, id);
        let tree = self.extract(id).ok_or(TreeError::UnknownOutline)?;
        self.record(Change::structure(container_target(parent)));
        Ok(tree)
    }

    /// Moves `id` with its subtree under `new_parent` at `position`.
    pub fn move_outline(
        &mut self,
        id: OutlineId,
        new_parent: Option<OutlineId>,
        position: usize,
    ) -> Result<(), TreeError> {
        let old_parent = self.node(id)?.parent;
        self.check_container(new_parent)?;
        if let Some(target) = new_parent {
            if target == id || self.ancestors(target).any(|a| a == id) {
                return Err(TreeError::Cycle);
            }
        }

        self.unlink(old_parent, id);
        self.node_mut(id)?.parent = new_parent;
        if let Some(list) = self.container_mut(new_parent) {
            let at = position.min(list.len());
            list.insert(at, id);
        }

        self.record(Change::structure(container_target(old_parent)));
        if old_parent != new_parent {
            self.record(Change::structure(container_target(new_parent)));
        }
        Ok(())
    }

    // ========================================================================
    // Field mutation
    // ========================================================================

    /// Edits the head, recording one change per field that changed.
    pub fn edit_head<R>(&mut self, f: impl FnOnce(&mut Head) -> R) -> R {
        let before = self.head.clone();
        let result = f(&mut self.head);
        let changed: Vec<HeadField> = HeadField::ALL
            .into_iter()
            .filter(|field| before.get(*field) != self.head.get(*field))
            .collect();
        for field in changed {
            self.record(Change::field(ChangeTarget::Head, Field::Head(field)));
        }
        result
    }

    /// Edits one outline, recording one change per field that changed.
    pub fn edit_outline<R>(
        &mut self,
        id: OutlineId,
        f: impl FnOnce(&mut Outline) -> R,
    ) -> Result<R, TreeError> {
        let node = self.node_mut(id)?;
        let before = node.outline.clone();
        let result = f(&mut node.outline);
        let changed: Vec<OutlineField> = OutlineField::ALL
            .into_iter()
            .filter(|field| before.get(*field) != node.outline.get(*field))
            .collect();
        for field in changed {
            self.record(Change::field(ChangeTarget::Outline(id), Field::Outline(field)));
        }
        Ok(result)
    }

    // ========================================================================
    // Change log
    // ========================================================================

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn take_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }

    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }

    fn record(&mut self, change: Change) {
        let touches = change.kind != ChangeKind::Field(Field::Head(HeadField::DateModified));
        self.changes.push(change);
        if self.touch_modified && touches {
            // RFC 822 carries whole seconds
            self.head.date_modified = Some(Utc::now().trunc_subsecs(0));
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn node(&self, id: OutlineId) -> Result<&OutlineNode, TreeError> {
        if id.document != self.id {
            return Err(TreeError::ForeignOutline);
        }
        self.nodes.get(id.index).ok_or(TreeError::UnknownOutline)
    }

    fn node_mut(&mut self, id: OutlineId) -> Result<&mut OutlineNode, TreeError> {
        if id.document != self.id {
            return Err(TreeError::ForeignOutline);
        }
        self.nodes.get_mut(id.index).ok_or(TreeError::UnknownOutline)
    }

    fn check_container(&self, parent: Option<OutlineId>) -> Result<(), TreeError> {
        match parent {
            Some(id) => self.node(id).map(|_| ()),
            None => Ok(()),
        }
    }

    fn container_mut(&mut self, parent: Option<OutlineId>) -> Option<&mut Vec<OutlineId>> {
        match parent {
            None => Some(&mut self.body.items),
            Some(id) => self.node_mut(id).ok().map(|n| &mut n.children),
        }
    }

    fn unlink(&mut self, parent: Option<OutlineId>, id: OutlineId) {
        if let Some(list) = self.container_mut(parent) {
            list.retain(|c| *c != id);
        }
    }

    /// Links a new node; the container must already be validated.
    fn attach(&mut self, parent: Option<OutlineId>, position: usize, outline: Outline) -> OutlineId {
        let index = self.nodes.insert(OutlineNode {
            outline,
            parent,
            children: Vec::new(),
        });
        let id = OutlineId {
            document: self.id,
            index,
        };
        if let Some(list) = self.container_mut(parent) {
            let at = position.min(list.len());
            list.insert(at, id);
        }
        id
    }

    fn graft(&mut self, parent: Option<OutlineId>, position: usize, tree: OutlineTree) -> OutlineId {
        let OutlineTree { outline, children } = tree;
        let id = self.attach(parent, position, outline);
        for child in children {
            self.graft(Some(id), usize::MAX, child);
        }
        id
    }

    fn extract(&mut self, id: OutlineId) -> Option<OutlineTree> {
        let node = self.nodes.remove(id.index)?;
        let children = node
            .children
            .into_iter()
            .filter_map(|c| self.extract(c))
            .collect();
        Some(OutlineTree {
            outline: node.outline,
            children,
        })
    }
}

fn container_target(parent: Option<OutlineId>) -> ChangeTarget {
    parent.map_or(ChangeTarget::Body, ChangeTarget::Outline)
}

/// Pre-order iterator over `(handle, outline)` pairs.
pub struct Outlines<'a> {
    document: &'a Document,
    stack: Vec<OutlineId>,
}

impl<'a> Iterator for Outlines<'a> {
    type Item = (OutlineId, &'a Outline);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.document.nodes.get(id.index)?;
        self.stack.extend(node.children.iter().rev().copied());
        Some((id, &node.outline))
    }
}

// ============================================================================
// Mapper binding
// ============================================================================

/// Reads and writes through the mapper bypass the change log: loading a
/// document does not make it dirty.
impl Graph for Document {
    type Field = Field;
    type Node = NodeRef;

    fn root(&self) -> NodeRef {
        NodeRef::Document
    }

    fn schema(&self, node: NodeRef) -> &'static Schema<Field> {
        match node {
            NodeRef::Document => &DOCUMENT_SCHEMA,
            NodeRef::Head => &HEAD_SCHEMA,
            NodeRef::Body => &BODY_SCHEMA,
            NodeRef::Outline(_) => &OUTLINE_SCHEMA,
        }
    }

    fn read(&self, node: NodeRef, field: Field) -> Option<Value> {
        match (node, field) {
            (NodeRef::Document, Field::Document(DocumentField::Version)) => {
                Some(Value::Text(self.version.clone()))
            }
            (NodeRef::Head, Field::Head(f)) => self.head.get(f),
            (NodeRef::Outline(id), Field::Outline(f)) => self.node(id).ok()?.outline.get(f),
            _ => None,
        }
    }

    fn write(&mut self, node: NodeRef, field: Field, value: Value) {
        match (node, field, value) {
            (NodeRef::Document, Field::Document(DocumentField::Version), Value::Text(v)) => {
                self.version = v;
            }
            (NodeRef::Head, Field::Head(f), value) => self.head.set(f, value),
            (NodeRef::Outline(id), Field::Outline(f), value) => {
                if let Ok(node) = self.node_mut(id) {
                    node.outline.set(f, value);
                }
            }
            (node, field, _) => {
                tracing::debug!(?node, ?field, "Field does not belong to node, ignoring");
            }
        }
    }

    fn nested(&self, node: NodeRef, property: &Property<Field>) -> Option<NodeRef> {
        match (node, property.name) {
            (NodeRef::Document, "head") => Some(NodeRef::Head),
            (NodeRef::Document, "body") => Some(NodeRef::Body),
            _ => None,
        }
    }

    fn create(&mut self, node: NodeRef, property: &Property<Field>) -> Option<NodeRef> {
        if property.name != "outline" {
            return None;
        }
        let parent = match node {
            NodeRef::Body => None,
            NodeRef::Outline(id) => {
                self.node(id).ok()?;
                Some(id)
            }
            NodeRef::Document | NodeRef::Head => return None,
        };
        let id = self.attach(parent, usize::MAX, Outline::default());
        Some(NodeRef::Outline(id))
    }

    fn items(&self, node: NodeRef, property: &Property<Field>) -> Vec<NodeRef> {
        if property.name != "outline" {
            return Vec::new();
        }
        let list = match node {
            NodeRef::Body => self.children(None),
            NodeRef::Outline(id) => self.children(Some(id)),
            NodeRef::Document | NodeRef::Head => &[],
        };
        list.iter().copied().map(NodeRef::Outline).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_feeds() -> (Document, [OutlineId; 3]) {
        let mut doc = Document::new();
        let a = doc.append(None, Outline::new("A")).unwrap();
        let b = doc.append(None, Outline::new("B")).unwrap();
        let c = doc.append(None, Outline::new("C")).unwrap();
        doc.take_changes();
        (doc, [a, b, c])
    }

    fn texts(doc: &Document, parent: Option<OutlineId>) -> Vec<String> {
        doc.children(parent)
            .iter()
            .map(|id| doc.outline(*id).unwrap().label().to_string())
            .collect()
    }

    #[test]
    fn test_new_document_is_empty() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert!(!doc.body().is_specified());
        assert!(!doc.head().is_specified());
        assert_eq!(doc.version(), "2.0");
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_document_ids_are_unique() {
        assert_ne!(Document::new().id(), Document::new().id());
    }

    #[test]
    fn test_create_outline_links_child() {
        let mut doc = Document::new();
        let root = doc.create_outline(None).unwrap();
        let child = doc.create_outline(Some(root)).unwrap();

        assert_eq!(doc.parent(child), Some(root));
        assert_eq!(doc.parent(root), None);
        assert_eq!(doc.children(Some(root)), &[child]);
        assert_eq!(doc.body().items(), &[root]);
        assert_eq!(doc.document_of(child), Some(doc.id()));
        assert_eq!(child.document(), doc.id());
        assert_eq!(doc.depth(child), Some(2));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let (mut doc, [a, ..]) = three_feeds();
        doc.insert(None, 1, Outline::new("A2")).unwrap();
        doc.insert(Some(a), 99, Outline::new("child")).unwrap();
        assert_eq!(texts(&doc, None), vec!["A", "A2", "B", "C"]);
        assert_eq!(texts(&doc, Some(a)), vec!["child"]);
    }

    #[test]
    fn test_append_subtree_links_transitively() {
        let mut doc = Document::new();
        let tree = OutlineTree::new(Outline::new("folder")).with_child(
            OutlineTree::new(Outline::new("sub")).with_child(Outline::new("leaf").into()),
        );
        let folder = doc.append(None, tree).unwrap();

        let leaf = doc.find(|o| o.label() == "leaf").unwrap();
        let ancestors: Vec<_> = doc.ancestors(leaf).collect();
        assert_eq!(ancestors.len(), 2);
        assert_eq!(ancestors[1], folder);
        assert_eq!(doc.document_of(leaf), Some(doc.id()));
        assert_eq!(doc.depth(leaf), Some(3));
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let mut doc = Document::new();
        let folder = doc.append(None, Outline::new("folder")).unwrap();
        let child = doc.append(Some(folder), Outline::new("child")).unwrap();

        let tree = doc.remove(folder).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.children[0].outline.label(), "child");
        assert!(!doc.contains(folder));
        assert!(!doc.contains(child));
        assert_eq!(doc.parent(child), None);
        assert_eq!(doc.document_of(child), None);
        assert!(doc.body().is_empty());
        assert_eq!(doc.remove(folder), Err(TreeError::UnknownOutline));
    }

    #[test]
    fn test_removed_subtree_moves_to_other_document() {
        let mut source = Document::new();
        let folder = source.append(None, Outline::new("folder")).unwrap();
        source.append(Some(folder), Outline::new("child")).unwrap();

        let mut target = Document::new();
        let tree = source.remove(folder).unwrap();
        let moved = target.append(None, tree).unwrap();

        assert_eq!(moved.document(), target.id());
        let child = target.children(Some(moved))[0];
        assert_eq!(target.document_of(child), Some(target.id()));
        assert!(source.is_empty());
    }

    #[test]
    fn test_foreign_handles_rejected() {
        let (doc, [a, ..]) = three_feeds();
        let mut other = Document::new();
        assert_eq!(other.create_outline(Some(a)), Err(TreeError::ForeignOutline));
        assert_eq!(other.remove(a), Err(TreeError::ForeignOutline));
        assert!(other.outline(a).is_none());
        assert!(doc.outline(a).is_some());
    }

    #[test]
    fn test_move_reorders_and_reparents() {
        let (mut doc, [a, b, c]) = three_feeds();
        doc.move_outline(c, None, 0).unwrap();
        assert_eq!(texts(&doc, None), vec!["C", "A", "B"]);

        doc.move_outline(b, Some(a), 0).unwrap();
        assert_eq!(texts(&doc, None), vec!["C", "A"]);
        assert_eq!(doc.parent(b), Some(a));
        assert_eq!(doc.depth(b), Some(2));
    }

    #[test]
    fn test_move_into_descendant_rejected() {
        let mut doc = Document::new();
        let a = doc.append(None, Outline::new("a")).unwrap();
        let b = doc.append(Some(a), Outline::new("b")).unwrap();

        assert_eq!(doc.move_outline(a, Some(b), 0), Err(TreeError::Cycle));
        assert_eq!(doc.move_outline(a, Some(a), 0), Err(TreeError::Cycle));
        assert_eq!(doc.parent(b), Some(a));
        assert_eq!(doc.body().items(), &[a]);
    }

    #[test]
    fn test_iter_is_preorder() {
        let mut doc = Document::new();
        let a = doc.append(None, Outline::new("a")).unwrap();
        doc.append(Some(a), Outline::new("a1")).unwrap();
        doc.append(Some(a), Outline::new("a2")).unwrap();
        doc.append(None, Outline::new("b")).unwrap();

        let order: Vec<_> = doc.iter().map(|(_, o)| o.label().to_string()).collect();
        assert_eq!(order, vec!["a", "a1", "a2", "b"]);
    }

    #[test]
    fn test_edit_outline_records_changed_fields_only() {
        let (mut doc, [a, ..]) = three_feeds();
        doc.set_touch_modified(false);
        let stamped = doc.head().date_modified;

        doc.edit_outline(a, |o| {
            o.text = Some("A".to_string());
            o.is_comment = true;
            o.xml_url = Some("https://a.example/rss".to_string());
        })
        .unwrap();

        assert_eq!(
            doc.changes(),
            &[
                Change::field(ChangeTarget::Outline(a), Field::Outline(OutlineField::XmlUrl)),
                Change::field(ChangeTarget::Outline(a), Field::Outline(OutlineField::IsComment)),
            ]
        );
        assert_eq!(doc.head().date_modified, stamped);
    }

    #[test]
    fn test_structural_changes_target_container() {
        let (mut doc, [a, ..]) = three_feeds();
        let child = doc.create_outline(Some(a)).unwrap();
        doc.remove(child).unwrap();
        doc.remove(a).unwrap();

        let targets: Vec<_> = doc.take_changes().into_iter().map(|c| c.target).collect();
        assert_eq!(
            targets,
            vec![
                ChangeTarget::Outline(a),
                ChangeTarget::Outline(a),
                ChangeTarget::Body
            ]
        );
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_changes_touch_date_modified() {
        let (mut doc, [a, ..]) = three_feeds();
        let before = Utc::now();
        doc.edit_outline(a, |o| o.description = Some("d".to_string()))
            .unwrap();
        let modified = doc.head().date_modified.expect("date_modified set");
        assert!(modified >= before);
    }

    #[test]
    fn test_touched_date_has_whole_seconds() {
        use chrono::Timelike;
        let mut doc = Document::new();
        doc.append(None, Outline::new("A")).unwrap();
        let modified = doc.head().date_modified.expect("date_modified set");
        assert_eq!(modified.nanosecond(), 0);
    }

    #[test]
    fn test_explicit_date_modified_not_overwritten() {
        use chrono::TimeZone;
        let mut doc = Document::new();
        let fixed = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        doc.edit_head(|h| h.date_modified = Some(fixed));
        assert_eq!(doc.head().date_modified, Some(fixed));
        assert_eq!(doc.changes().len(), 1);
    }

    #[test]
    fn test_edit_head_without_change_records_nothing() {
        let mut doc = Document::new();
        doc.edit_head(|h| h.window_top = 0);
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_graph_create_does_not_dirty() {
        let mut doc = Document::new();
        let property = BODY_SCHEMA.lookup("outline").unwrap();
        let node = doc.create(NodeRef::Body, property).unwrap();
        doc.write(
            node,
            Field::Outline(OutlineField::Text),
            Value::Text("x".to_string()),
        );
        assert_eq!(doc.len(), 1);
        assert!(!doc.is_dirty());
        assert!(doc.head().date_modified.is_none());
    }
}
