//! In-memory document, storage, clipboard and toolkit implementations
//!
//! These back the test suites and the demo driver. The node tree lives in
//! a shared state table; element handles are cheap ids into it, so a
//! handle stays usable after its node is detached (mirroring how browser
//! element references outlive removal).

use crate::error::DomError;
use crate::events::{EventContext, EventHandler, EventKind, EventOutcome, HandlerRegistry, Subscription};
use crate::{Document, Element, ElementHandle, IconRenderer, Query, ScrollBehavior, ScrollBlock, Storage, Toolkit};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

// ==================== Node state ====================

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    attributes: HashMap<String, String>,
    classes: Vec<String>,
    text: String,
    html: String,
    styles: HashMap<String, String>,
    disabled: bool,
    parent: Option<u64>,
    children: Vec<u64>,
}

#[derive(Debug)]
struct DomState {
    nodes: HashMap<u64, NodeData>,
    next_id: u64,
    root: u64,
    body: u64,
    focused: Option<u64>,
    scrolls: Vec<ScrollRecord>,
}

/// Record of a `scroll_into_view` call, for assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRecord {
    pub node_id: u64,
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

impl DomState {
    fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            1,
            NodeData {
                tag: "html".to_string(),
                children: vec![2],
                ..NodeData::default()
            },
        );
        nodes.insert(
            2,
            NodeData {
                tag: "body".to_string(),
                parent: Some(1),
                ..NodeData::default()
            },
        );
        Self {
            nodes,
            next_id: 3,
            root: 1,
            body: 2,
            focused: None,
            scrolls: Vec::new(),
        }
    }

    fn is_attached(&self, id: u64) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes.get(&current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Attached node ids in document order
    fn ordered_ids(&self) -> Vec<u64> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(&id) {
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Subtree ids of `id` in document order, including `id` itself
    fn subtree_ids(&self, id: u64) -> Vec<u64> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(node) = self.nodes.get(&current) {
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        out
    }

    fn detach(&mut self, id: u64) {
        let parent = match self.nodes.get(&id).and_then(|n| n.parent) {
            Some(p) => p,
            None => return,
        };
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|&c| c != id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
    }

    /// A field fails built-in validation when it is marked `required` and
    /// carries no (or an empty) `value` attribute.
    fn is_invalid_field(&self, id: u64) -> bool {
        self.nodes
            .get(&id)
            .map(|node| {
                node.attributes.contains_key("required")
                    && node
                        .attributes
                        .get("value")
                        .map(|v| v.is_empty())
                        .unwrap_or(true)
            })
            .unwrap_or(false)
    }

    fn matches(&self, id: u64, query: &Query) -> bool {
        let node = match self.nodes.get(&id) {
            Some(n) => n,
            None => return false,
        };
        match query {
            Query::Tag(tag) => node.tag == *tag,
            Query::Id(wanted) => node.attributes.get("id").map(|v| v == wanted).unwrap_or(false),
            Query::Class(class) => node.classes.iter().any(|c| c == class),
            Query::ClassWithout { with, without } => {
                node.classes.iter().any(|c| c == with)
                    && !node.classes.iter().any(|c| c == without)
            }
            Query::Attr(name) => node.attributes.contains_key(name),
            Query::AttrPrefix { tag, name, prefix } => {
                tag.as_ref().map(|t| node.tag == *t).unwrap_or(true)
                    && node
                        .attributes
                        .get(name)
                        .map(|v| v.starts_with(prefix.as_str()))
                        .unwrap_or(false)
            }
        }
    }
}

// ==================== MemoryElement ====================

/// Element handle into a [`MemoryDocument`]
pub struct MemoryElement {
    id: u64,
    state: Arc<RwLock<DomState>>,
}

impl MemoryElement {
    fn handle(id: u64, state: Arc<RwLock<DomState>>) -> ElementHandle {
        Arc::new(MemoryElement { id, state })
    }
}

impl Element for MemoryElement {
    fn node_id(&self) -> u64 {
        self.id
    }

    fn tag(&self) -> String {
        self.state
            .read()
            .unwrap()
            .nodes
            .get(&self.id)
            .map(|n| n.tag.clone())
            .unwrap_or_default()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.state
            .read()
            .unwrap()
            .nodes
            .get(&self.id)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let mut state = self.state.write().unwrap();
        if let Some(node) = state.nodes.get_mut(&self.id) {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&self, name: &str) {
        let mut state = self.state.write().unwrap();
        if let Some(node) = state.nodes.get_mut(&self.id) {
            node.attributes.remove(name);
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .nodes
            .get(&self.id)
            .map(|n| n.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    fn add_class(&self, class: &str) {
        let mut state = self.state.write().unwrap();
        if let Some(node) = state.nodes.get_mut(&self.id) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&self, class: &str) {
        let mut state = self.state.write().unwrap();
        if let Some(node) = state.nodes.get_mut(&self.id) {
            node.classes.retain(|c| c != class);
        }
    }

    fn text(&self) -> String {
        self.state
            .read()
            .unwrap()
            .nodes
            .get(&self.id)
            .map(|n| n.text.clone())
            .unwrap_or_default()
    }

    fn set_text(&self, text: &str) {
        let mut state = self.state.write().unwrap();
        if let Some(node) = state.nodes.get_mut(&self.id) {
            node.text = text.to_string();
        }
    }

    fn html(&self) -> String {
        self.state
            .read()
            .unwrap()
            .nodes
            .get(&self.id)
            .map(|n| n.html.clone())
            .unwrap_or_default()
    }

    fn set_html(&self, html: &str) {
        let mut state = self.state.write().unwrap();
        if let Some(node) = state.nodes.get_mut(&self.id) {
            node.html = html.to_string();
        }
    }

    fn style(&self, property: &str) -> Option<String> {
        self.state
            .read()
            .unwrap()
            .nodes
            .get(&self.id)
            .and_then(|n| n.styles.get(property).cloned())
    }

    fn set_style(&self, property: &str, value: &str) {
        let mut state = self.state.write().unwrap();
        if let Some(node) = state.nodes.get_mut(&self.id) {
            node.styles.insert(property.to_string(), value.to_string());
        }
    }

    fn is_disabled(&self) -> bool {
        self.state
            .read()
            .unwrap()
            .nodes
            .get(&self.id)
            .map(|n| n.disabled)
            .unwrap_or(false)
    }

    fn set_disabled(&self, disabled: bool) {
        let mut state = self.state.write().unwrap();
        if let Some(node) = state.nodes.get_mut(&self.id) {
            node.disabled = disabled;
        }
    }

    fn focus(&self) {
        let mut state = self.state.write().unwrap();
        state.focused = Some(self.id);
    }

    fn is_focused(&self) -> bool {
        self.state.read().unwrap().focused == Some(self.id)
    }

    fn scroll_into_view(&self, behavior: ScrollBehavior, block: ScrollBlock) {
        let mut state = self.state.write().unwrap();
        let record = ScrollRecord {
            node_id: self.id,
            behavior,
            block,
        };
        state.scrolls.push(record);
    }

    fn insert_first(&self, child: ElementHandle) {
        let child_id = child.node_id();
        if child_id == self.id {
            return;
        }
        let mut state = self.state.write().unwrap();
        if !state.nodes.contains_key(&child_id) {
            return;
        }
        state.detach(child_id);
        if let Some(node) = state.nodes.get_mut(&child_id) {
            node.parent = Some(self.id);
        }
        if let Some(node) = state.nodes.get_mut(&self.id) {
            node.children.insert(0, child_id);
        }
    }

    fn append(&self, child: ElementHandle) {
        let child_id = child.node_id();
        if child_id == self.id {
            return;
        }
        let mut state = self.state.write().unwrap();
        if !state.nodes.contains_key(&child_id) {
            return;
        }
        state.detach(child_id);
        if let Some(node) = state.nodes.get_mut(&child_id) {
            node.parent = Some(self.id);
        }
        if let Some(node) = state.nodes.get_mut(&self.id) {
            node.children.push(child_id);
        }
    }

    fn remove(&self) {
        let mut state = self.state.write().unwrap();
        state.detach(self.id);
    }

    fn is_attached(&self) -> bool {
        self.state.read().unwrap().is_attached(self.id)
    }

    fn check_validity(&self) -> bool {
        let state = self.state.read().unwrap();
        state
            .subtree_ids(self.id)
            .into_iter()
            .all(|id| !state.is_invalid_field(id))
    }

    fn first_invalid_field(&self) -> Option<ElementHandle> {
        let state = self.state.read().unwrap();
        let id = state
            .subtree_ids(self.id)
            .into_iter()
            .find(|&id| state.is_invalid_field(id))?;
        drop(state);
        Some(MemoryElement::handle(id, self.state.clone()))
    }
}

// ==================== MemoryDocument ====================

/// In-memory page document
pub struct MemoryDocument {
    state: Arc<RwLock<DomState>>,
    handlers: HandlerRegistry,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Create a document with an empty body under the root
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(DomState::new())),
            handlers: HandlerRegistry::new(),
        }
    }

    /// Deliver an event to the handlers registered on `target`
    ///
    /// Delivery stops early when a handler stops propagation.
    pub fn dispatch(&self, target: &ElementHandle, kind: EventKind) -> EventOutcome {
        let handlers = self.handlers.handlers_for(target.node_id(), kind);
        let ctx = EventContext::new(target.clone());
        let mut handlers_run = 0;
        for handler in handlers {
            handler(&ctx);
            handlers_run += 1;
            if ctx.propagation_stopped() {
                break;
            }
        }
        EventOutcome {
            default_prevented: ctx.default_prevented(),
            propagation_stopped: ctx.propagation_stopped(),
            handlers_run,
        }
    }

    /// All recorded `scroll_into_view` calls
    pub fn scrolls(&self) -> Vec<ScrollRecord> {
        self.state.read().unwrap().scrolls.clone()
    }

    /// The currently focused element, if any
    pub fn focused(&self) -> Option<ElementHandle> {
        let id = self.state.read().unwrap().focused?;
        Some(MemoryElement::handle(id, self.state.clone()))
    }
}

impl Document for MemoryDocument {
    fn root(&self) -> ElementHandle {
        let id = self.state.read().unwrap().root;
        MemoryElement::handle(id, self.state.clone())
    }

    fn body(&self) -> ElementHandle {
        let id = self.state.read().unwrap().body;
        MemoryElement::handle(id, self.state.clone())
    }

    fn create_element(&self, tag: &str) -> ElementHandle {
        let mut state = self.state.write().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.nodes.insert(
            id,
            NodeData {
                tag: tag.to_string(),
                ..NodeData::default()
            },
        );
        drop(state);
        MemoryElement::handle(id, self.state.clone())
    }

    fn query(&self, query: &Query) -> Vec<ElementHandle> {
        let state = self.state.read().unwrap();
        let ids: Vec<u64> = state
            .ordered_ids()
            .into_iter()
            .filter(|&id| state.matches(id, query))
            .collect();
        drop(state);
        ids.into_iter()
            .map(|id| MemoryElement::handle(id, self.state.clone()))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<ElementHandle> {
        self.query(&Query::Id(id.to_string())).into_iter().next()
    }

    fn subscribe(
        &self,
        target: &ElementHandle,
        kind: EventKind,
        handler: EventHandler,
    ) -> Subscription {
        self.handlers.subscribe(target.node_id(), kind, handler)
    }
}

// ==================== MemoryStorage ====================

/// In-memory key-value storage
#[derive(Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

// ==================== MemoryClipboard ====================

/// In-memory clipboard with a fail-injection switch
#[derive(Default)]
pub struct MemoryClipboard {
    writes: RwLock<Vec<String>>,
    failing: AtomicBool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// The most recent successful write
    pub fn last(&self) -> Option<String> {
        self.writes.read().unwrap().last().cloned()
    }

    /// All successful writes in order
    pub fn writes(&self) -> Vec<String> {
        self.writes.read().unwrap().clone()
    }
}

#[async_trait]
impl crate::Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), DomError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomError::Clipboard {
                message: "clipboard unavailable".to_string(),
            });
        }
        self.writes.write().unwrap().push(text.to_string());
        Ok(())
    }
}

// ==================== HeadlessToolkit ====================

/// Toolkit operations observed on elements, for assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolkitEvent {
    TooltipAttached(u64),
    AlertClosed(u64),
    ToastShown(u64),
}

/// Headless toolkit implementation
///
/// Tooltips are marked with an attribute, alert dismissal detaches the
/// element immediately, and toasts count as hidden the moment they are
/// shown.
#[derive(Default)]
pub struct HeadlessToolkit {
    events: RwLock<Vec<ToolkitEvent>>,
}

impl HeadlessToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded toolkit operations in order
    pub fn events(&self) -> Vec<ToolkitEvent> {
        self.events.read().unwrap().clone()
    }
}

#[async_trait]
impl Toolkit for HeadlessToolkit {
    fn attach_tooltip(&self, element: &ElementHandle) {
        element.set_attribute("data-tooltip-bound", "true");
        self.events
            .write()
            .unwrap()
            .push(ToolkitEvent::TooltipAttached(element.node_id()));
    }

    fn close_alert(&self, element: &ElementHandle) {
        // Closing an element a user already dismissed is a no-op.
        if element.is_attached() {
            element.remove();
        }
        self.events
            .write()
            .unwrap()
            .push(ToolkitEvent::AlertClosed(element.node_id()));
    }

    async fn show_toast(&self, element: &ElementHandle) {
        element.set_attribute("data-toast-shown", "true");
        self.events
            .write()
            .unwrap()
            .push(ToolkitEvent::ToastShown(element.node_id()));
    }
}

// ==================== GlyphIcons ====================

/// Icon renderer substituting `data-icon` placeholders with glyph text
#[derive(Default)]
pub struct GlyphIcons;

impl GlyphIcons {
    pub fn new() -> Self {
        Self
    }
}

impl IconRenderer for GlyphIcons {
    fn replace(&self, document: &dyn Document) {
        for element in document.query(&Query::Attr("data-icon".to_string())) {
            if element.attribute("data-icon-rendered").is_some() {
                continue;
            }
            if let Some(name) = element.attribute("data-icon") {
                element.set_text(&format!("[{}]", name));
                element.set_attribute("data-icon-rendered", "true");
            }
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Clipboard;

    fn attached_element(doc: &MemoryDocument, tag: &str) -> ElementHandle {
        let el = doc.create_element(tag);
        doc.body().append(el.clone());
        el
    }

    #[test]
    fn test_created_element_is_detached_until_appended() {
        let doc = MemoryDocument::new();
        let el = doc.create_element("div");
        assert!(!el.is_attached());

        doc.body().append(el.clone());
        assert!(el.is_attached());

        el.remove();
        assert!(!el.is_attached());
        // A second removal is a no-op.
        el.remove();
        assert!(!el.is_attached());
    }

    #[test]
    fn test_query_class_without() {
        let doc = MemoryDocument::new();
        let plain = attached_element(&doc, "div");
        plain.add_class("alert");
        let permanent = attached_element(&doc, "div");
        permanent.add_class("alert");
        permanent.add_class("alert-permanent");

        let found = doc.query(&Query::ClassWithout {
            with: "alert".to_string(),
            without: "alert-permanent".to_string(),
        });
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].node_id(), plain.node_id());
    }

    #[test]
    fn test_query_attr_prefix_with_tag() {
        let doc = MemoryDocument::new();
        let anchor = attached_element(&doc, "a");
        anchor.set_attribute("href", "#section");
        let external = attached_element(&doc, "a");
        external.set_attribute("href", "https://example.com");
        let div = attached_element(&doc, "div");
        div.set_attribute("href", "#nope");

        let found = doc.query(&Query::AttrPrefix {
            tag: Some("a".to_string()),
            name: "href".to_string(),
            prefix: "#".to_string(),
        });
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].node_id(), anchor.node_id());
    }

    #[test]
    fn test_query_skips_detached_elements() {
        let doc = MemoryDocument::new();
        let el = attached_element(&doc, "div");
        el.add_class("banner");
        assert_eq!(doc.query(&Query::Class("banner".to_string())).len(), 1);

        el.remove();
        assert!(doc.query(&Query::Class("banner".to_string())).is_empty());
    }

    #[test]
    fn test_insert_first_orders_children() {
        let doc = MemoryDocument::new();
        let container = attached_element(&doc, "div");
        container.add_class("container");
        let first = doc.create_element("p");
        first.set_text("one");
        let second = doc.create_element("p");
        second.set_text("two");
        container.insert_first(first.clone());
        container.insert_first(second.clone());

        let found = doc.query(&Query::Tag("p".to_string()));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].text(), "two");
        assert_eq!(found[1].text(), "one");
    }

    #[test]
    fn test_form_validity() {
        let doc = MemoryDocument::new();
        let form = attached_element(&doc, "form");
        let name = doc.create_element("input");
        name.set_attribute("required", "");
        form.append(name.clone());
        let email = doc.create_element("input");
        email.set_attribute("required", "");
        form.append(email.clone());

        assert!(!form.check_validity());
        let invalid = form.first_invalid_field().unwrap();
        assert_eq!(invalid.node_id(), name.node_id());

        name.set_attribute("value", "Ada");
        email.set_attribute("value", "ada@example.com");
        assert!(form.check_validity());
        assert!(form.first_invalid_field().is_none());
    }

    #[test]
    fn test_focus_tracking() {
        let doc = MemoryDocument::new();
        let el = attached_element(&doc, "input");
        assert!(!el.is_focused());

        el.focus();
        assert!(el.is_focused());
        assert_eq!(doc.focused().unwrap().node_id(), el.node_id());
    }

    #[test]
    fn test_dispatch_runs_handlers_and_collects_flags() {
        let doc = MemoryDocument::new();
        let el = attached_element(&doc, "a");
        let _sub = doc.subscribe(
            &el,
            EventKind::Click,
            Arc::new(|ctx| ctx.prevent_default()),
        );

        let outcome = doc.dispatch(&el, EventKind::Click);
        assert!(outcome.default_prevented);
        assert_eq!(outcome.handlers_run, 1);
    }

    #[test]
    fn test_disposed_subscription_stops_delivery() {
        let doc = MemoryDocument::new();
        let el = attached_element(&doc, "a");
        let sub = doc.subscribe(
            &el,
            EventKind::Click,
            Arc::new(|ctx| ctx.prevent_default()),
        );
        sub.dispose();

        let outcome = doc.dispatch(&el, EventKind::Click);
        assert!(!outcome.default_prevented);
        assert_eq!(outcome.handlers_run, 0);
    }

    #[test]
    fn test_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("preferred-theme"), None);
        storage.set("preferred-theme", "dark");
        assert_eq!(storage.get("preferred-theme"), Some("dark".to_string()));
    }

    #[tokio::test]
    async fn test_clipboard_write_and_fail_injection() {
        let clipboard = MemoryClipboard::new();
        clipboard.write_text("hello").await.unwrap();
        assert_eq!(clipboard.last(), Some("hello".to_string()));

        clipboard.set_failing(true);
        let err = clipboard.write_text("lost").await.unwrap_err();
        assert!(matches!(err, DomError::Clipboard { .. }));
        assert_eq!(clipboard.writes().len(), 1);
    }

    #[test]
    fn test_headless_toolkit_close_alert_detaches() {
        let doc = MemoryDocument::new();
        let alert = attached_element(&doc, "div");
        let toolkit = HeadlessToolkit::new();

        let handle: ElementHandle = alert.clone();
        toolkit.close_alert(&handle);
        assert!(!alert.is_attached());

        // Closing again tolerates the detached element.
        toolkit.close_alert(&handle);
        assert_eq!(
            toolkit.events(),
            vec![
                ToolkitEvent::AlertClosed(alert.node_id()),
                ToolkitEvent::AlertClosed(alert.node_id()),
            ]
        );
    }

    #[test]
    fn test_glyph_icons_replace_once() {
        let doc = MemoryDocument::new();
        let icon = attached_element(&doc, "i");
        icon.set_attribute("data-icon", "check");

        let icons = GlyphIcons::new();
        icons.replace(&doc);
        assert_eq!(icon.text(), "[check]");

        icon.set_text("edited");
        icons.replace(&doc);
        assert_eq!(icon.text(), "edited");
    }
}
