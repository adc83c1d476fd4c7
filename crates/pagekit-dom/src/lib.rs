//! Page document boundary for pagekit
//!
//! The page helpers never talk to a real browser. This crate defines the
//! collaborator seams they need — document, element, key-value storage,
//! clipboard, UI toolkit, icon renderer — and ships complete in-memory
//! implementations used by tests and the demo driver.

pub mod error;
pub mod events;
pub mod memory;

use async_trait::async_trait;
use std::sync::Arc;

pub use error::DomError;
pub use events::{EventContext, EventHandler, EventKind, EventOutcome, HandlerRegistry, Subscription};
pub use memory::{
    GlyphIcons, HeadlessToolkit, MemoryClipboard, MemoryDocument, MemoryStorage, ScrollRecord,
    ToolkitEvent,
};

/// Shared element handle
pub type ElementHandle = Arc<dyn Element>;

/// Shared document handle
pub type DocumentHandle = Arc<dyn Document>;

// ==================== Queries ====================

/// Typed element query
///
/// The browser original used CSS selector strings; the page helpers only
/// ever need these shapes, so the port models them as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Elements with the given tag
    Tag(String),
    /// The element with the given `id` attribute
    Id(String),
    /// Elements carrying the given class
    Class(String),
    /// Elements carrying `with` but not `without`
    ClassWithout { with: String, without: String },
    /// Elements carrying the given attribute, any value
    Attr(String),
    /// Elements whose attribute value starts with a prefix, optionally
    /// restricted to a tag
    AttrPrefix {
        tag: Option<String>,
        name: String,
        prefix: String,
    },
}

// ==================== Scrolling ====================

/// Scroll animation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Vertical alignment of the scroll target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Start,
    Center,
}

// ==================== Document and Element ====================

/// A page element handle
///
/// Handles stay valid after detachment; mutations on a detached element
/// are applied to the detached node and attachment can be checked with
/// [`Element::is_attached`].
pub trait Element: Send + Sync {
    /// Stable node identity within the owning document
    fn node_id(&self) -> u64;

    /// Tag name
    fn tag(&self) -> String;

    /// Read an attribute
    fn attribute(&self, name: &str) -> Option<String>;

    /// Write an attribute
    fn set_attribute(&self, name: &str, value: &str);

    /// Remove an attribute
    fn remove_attribute(&self, name: &str);

    /// Whether the element carries a class
    fn has_class(&self, class: &str) -> bool;

    /// Add a class (no-op when already present)
    fn add_class(&self, class: &str);

    /// Remove a class
    fn remove_class(&self, class: &str);

    /// Text content
    fn text(&self) -> String;

    /// Replace text content
    fn set_text(&self, text: &str);

    /// Inner markup
    fn html(&self) -> String;

    /// Replace inner markup
    fn set_html(&self, html: &str);

    /// Read an inline style property
    fn style(&self, property: &str) -> Option<String>;

    /// Write an inline style property
    fn set_style(&self, property: &str, value: &str);

    /// Whether the element is disabled
    fn is_disabled(&self) -> bool;

    /// Enable or disable the element
    fn set_disabled(&self, disabled: bool);

    /// Move input focus to this element
    fn focus(&self);

    /// Whether this element holds input focus
    fn is_focused(&self) -> bool;

    /// Scroll the element into view
    fn scroll_into_view(&self, behavior: ScrollBehavior, block: ScrollBlock);

    /// Insert a child as the first child
    fn insert_first(&self, child: ElementHandle);

    /// Append a child as the last child
    fn append(&self, child: ElementHandle);

    /// Detach from the parent; no-op when already detached
    fn remove(&self);

    /// Whether the element is reachable from the document root
    fn is_attached(&self) -> bool;

    /// Built-in constraint validation over the element's subtree
    fn check_validity(&self) -> bool;

    /// First field in the subtree failing constraint validation
    fn first_invalid_field(&self) -> Option<ElementHandle>;
}

/// A page document handle
pub trait Document: Send + Sync {
    /// Page root element (theme attribute carrier)
    fn root(&self) -> ElementHandle;

    /// Document body
    fn body(&self) -> ElementHandle;

    /// Create a detached element
    fn create_element(&self, tag: &str) -> ElementHandle;

    /// All attached elements matching the query, in document order
    fn query(&self, query: &Query) -> Vec<ElementHandle>;

    /// The attached element with the given `id` attribute
    fn element_by_id(&self, id: &str) -> Option<ElementHandle>;

    /// Register an event handler; the returned subscription detaches it
    /// when dropped or disposed
    fn subscribe(
        &self,
        target: &ElementHandle,
        kind: EventKind,
        handler: EventHandler,
    ) -> Subscription;
}

// ==================== Storage, Clipboard, Toolkit, Icons ====================

/// Client-scoped key-value storage (theme persistence)
pub trait Storage: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value
    fn set(&self, key: &str, value: &str);
}

/// System clipboard write primitive
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Write text to the clipboard
    async fn write_text(&self, text: &str) -> Result<(), DomError>;
}

/// UI toolkit component behaviors (tooltips, alerts, toasts)
#[async_trait]
pub trait Toolkit: Send + Sync {
    /// Attach hover/focus tooltip behavior to an element
    fn attach_tooltip(&self, element: &ElementHandle);

    /// Dismiss an alert element; tolerates an already-detached element
    fn close_alert(&self, element: &ElementHandle);

    /// Show a toast element; resolves once the toast has hidden
    async fn show_toast(&self, element: &ElementHandle);
}

/// Icon-glyph substitution, re-run after dynamic markup insertion
pub trait IconRenderer: Send + Sync {
    /// Substitute all unrendered icon placeholders in the document
    fn replace(&self, document: &dyn Document);
}
