//! Page initialization routine and stateful UI helpers
//!
//! A [`Page`] owns the document handle and its collaborators (toolkit,
//! storage, clipboard, icon renderer) and exposes the helpers the page
//! needs: one-time initialization wiring, clipboard copy with toast
//! feedback, theme toggling with persistence, loading-state and progress
//! updates, and success/error banner injection.

pub mod error;

use pagekit_config::{PageConfig, ThemeName};
use pagekit_dom::{
    Clipboard, Document, DocumentHandle, Element, ElementHandle, EventContext, EventKind,
    IconRenderer, Query, ScrollBehavior, ScrollBlock, Storage, Subscription, Toolkit,
};
use std::sync::Arc;
use std::time::Duration;

pub use error::PageError;
pub use pagekit_config::ThemeName as Theme;

/// Toolkit reference type
pub type ToolkitRef = Arc<dyn Toolkit>;
/// Storage reference type
pub type StorageRef = Arc<dyn Storage>;
/// Clipboard reference type
pub type ClipboardRef = Arc<dyn Clipboard>;
/// Icon renderer reference type
pub type IconsRef = Arc<dyn IconRenderer>;

// ==================== Init Handles ====================

/// Disposer handles returned by [`Page::init`]
///
/// Dropping the value (or calling [`InitHandles::dispose`]) detaches every
/// event handler the initialization routine registered.
pub struct InitHandles {
    subscriptions: Vec<Subscription>,
}

impl InitHandles {
    /// Number of live event subscriptions
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether no event handlers were registered
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Detach all registered event handlers now
    pub fn dispose(self) {
        for subscription in self.subscriptions {
            subscription.dispose();
        }
    }
}

// ==================== Page ====================

/// Page helper engine
pub struct Page {
    document: DocumentHandle,
    toolkit: ToolkitRef,
    storage: StorageRef,
    clipboard: ClipboardRef,
    icons: IconsRef,
    config: PageConfig,
}

impl Page {
    /// Create a page over a document and its collaborators
    pub fn new(
        document: DocumentHandle,
        toolkit: ToolkitRef,
        storage: StorageRef,
        clipboard: ClipboardRef,
        icons: IconsRef,
        config: PageConfig,
    ) -> Self {
        Self {
            document,
            toolkit,
            storage,
            clipboard,
            icons,
            config,
        }
    }

    /// The configuration this page runs with
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    // ==================== Initialization Routine ====================

    /// Run the one-time page initialization wiring
    ///
    /// Attaches tooltips, schedules auto-dismissal of alerts present at
    /// load, intercepts submission of forms flagged for validation,
    /// smooth-scrolls same-page anchor clicks, and restores a persisted
    /// theme. Each step is independent. Alert timers run on the ambient
    /// Tokio runtime, so this must be called within one.
    pub fn init(&self) -> InitHandles {
        let mut subscriptions = Vec::new();

        self.init_tooltips();
        self.init_alert_dismissal();
        self.init_form_validation(&mut subscriptions);
        self.init_anchor_scrolling(&mut subscriptions);
        self.restore_theme();

        log::debug!(
            target: "pagekit::page",
            "Page initialized with {} event subscriptions",
            subscriptions.len()
        );

        InitHandles { subscriptions }
    }

    fn init_tooltips(&self) {
        for element in self.document.query(&Query::Attr("data-tooltip".to_string())) {
            self.toolkit.attach_tooltip(&element);
        }
    }

    fn init_alert_dismissal(&self) {
        let delay = Duration::from_millis(self.config.timing.alert_dismiss_ms);
        let alerts = self.document.query(&Query::ClassWithout {
            with: "alert".to_string(),
            without: "alert-permanent".to_string(),
        });
        for alert in alerts {
            let toolkit = self.toolkit.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                toolkit.close_alert(&alert);
            });
        }
    }

    fn init_form_validation(&self, subscriptions: &mut Vec<Subscription>) {
        for form in self
            .document
            .query(&Query::Class("needs-validation".to_string()))
        {
            let handler_form = form.clone();
            let subscription = self.document.subscribe(
                &form,
                EventKind::Submit,
                Arc::new(move |ctx: &EventContext| {
                    if !handler_form.check_validity() {
                        ctx.prevent_default();
                        ctx.stop_propagation();
                        if let Some(field) = handler_form.first_invalid_field() {
                            field.focus();
                        }
                    }
                    handler_form.add_class("was-validated");
                }),
            );
            subscriptions.push(subscription);
        }
    }

    fn init_anchor_scrolling(&self, subscriptions: &mut Vec<Subscription>) {
        let anchors = self.document.query(&Query::AttrPrefix {
            tag: Some("a".to_string()),
            name: "href".to_string(),
            prefix: "#".to_string(),
        });
        for anchor in anchors {
            let document = self.document.clone();
            let handler_anchor = anchor.clone();
            let subscription = self.document.subscribe(
                &anchor,
                EventKind::Click,
                Arc::new(move |ctx: &EventContext| {
                    ctx.prevent_default();
                    let href = match handler_anchor.attribute("href") {
                        Some(href) => href,
                        None => return,
                    };
                    let target_id = match href.strip_prefix('#') {
                        Some(id) if !id.is_empty() => id.to_string(),
                        _ => return,
                    };
                    if let Some(target) = document.element_by_id(&target_id) {
                        target.scroll_into_view(ScrollBehavior::Smooth, ScrollBlock::Start);
                    }
                }),
            );
            subscriptions.push(subscription);
        }
    }

    fn restore_theme(&self) {
        let stored = match self.storage.get(&self.config.theme.storage_key) {
            Some(value) => value,
            None => return,
        };
        match stored.parse::<ThemeName>() {
            Ok(theme) => {
                self.document
                    .root()
                    .set_attribute(&self.config.theme.attribute, &theme.to_string());
            }
            Err(_) => {
                log::warn!(
                    target: "pagekit::page",
                    "Ignoring unrecognized persisted theme: {}",
                    stored
                );
            }
        }
    }

    // ==================== Clipboard ====================

    /// Copy text to the clipboard and show a success toast
    ///
    /// On success the toast is appended to the body, icons are re-rendered,
    /// and once the toolkit reports the toast hidden the element is removed
    /// when `timing.toast_auto_hide` is set; otherwise it stays attached
    /// for manual dismissal. On failure the error is logged and returned.
    pub async fn copy_to_clipboard(&self, text: &str) -> Result<(), PageError> {
        if let Err(error) = self.clipboard.write_text(text).await {
            log::error!(target: "pagekit::page", "Clipboard copy failed: {}", error);
            return Err(PageError::Clipboard {
                message: error.to_string(),
            });
        }

        let toast = self.document.create_element("div");
        toast.add_class("toast");
        toast.add_class("bg-success");
        toast.set_attribute("role", "alert");
        toast.set_text("Copied to clipboard!");

        let icon = self.document.create_element("i");
        icon.set_attribute("data-icon", "check");
        toast.append(icon);

        let close = self.document.create_element("button");
        close.add_class("btn-close");
        toast.append(close);

        self.document.body().append(toast.clone());
        self.icons.replace(self.document.as_ref());

        self.toolkit.show_toast(&toast).await;
        if self.config.timing.toast_auto_hide {
            toast.remove();
        }

        Ok(())
    }

    // ==================== Theme ====================

    /// Flip the page theme and persist the new preference
    ///
    /// An absent attribute counts as the configured default, so the first
    /// toggle on an untouched page yields the opposite of the default.
    pub fn toggle_theme(&self) -> Theme {
        let root = self.document.root();
        let current = root
            .attribute(&self.config.theme.attribute)
            .and_then(|value| value.parse::<ThemeName>().ok())
            .unwrap_or(self.config.theme.default_theme);

        let next = match current {
            ThemeName::Dark => ThemeName::Light,
            ThemeName::Light => ThemeName::Dark,
        };

        root.set_attribute(&self.config.theme.attribute, &next.to_string());
        self.storage
            .set(&self.config.theme.storage_key, &next.to_string());
        next
    }

    // ==================== Loading State ====================

    /// Replace element content with a spinner and disable it
    ///
    /// Callers must capture the original content first; restoration is
    /// their responsibility. No-op on a detached element.
    pub fn show_loading(&self, element: &ElementHandle, text: Option<&str>) {
        if !element.is_attached() {
            return;
        }
        let text = text.unwrap_or(&self.config.ui.loading_text);
        element.set_html(&format!(
            r#"<span class="spinner" role="status" aria-hidden="true"></span> {}"#,
            text
        ));
        element.set_disabled(true);
    }

    /// Restore element content and re-enable it
    pub fn hide_loading(&self, element: &ElementHandle, original_html: &str) {
        if !element.is_attached() {
            return;
        }
        element.set_html(original_html);
        element.set_disabled(false);
    }

    // ==================== Progress Bar ====================

    /// Update a progress bar's width, accessibility value and label
    ///
    /// Percentages are passed through without clamping; values outside
    /// [0, 100] are the caller's responsibility. No-op on a detached
    /// element.
    pub fn update_progress(&self, element: &ElementHandle, percentage: f64, label: Option<&str>) {
        if !element.is_attached() {
            return;
        }
        let rendered = format_percent(percentage);
        element.set_style("width", &format!("{}%", rendered));
        element.set_attribute("aria-valuenow", &rendered);
        if let Some(label) = label {
            element.set_text(label);
        }
    }

    // ==================== Banners ====================

    /// Inject a persistent error banner
    ///
    /// The banner is inserted as the first child of `container`, or of the
    /// default container when none is given, and scrolled into view. It
    /// stays until manually dismissed.
    pub fn show_error(&self, message: &str, container: Option<&ElementHandle>) -> ElementHandle {
        self.inject_banner("alert-danger", "alert-circle", message, container)
    }

    /// Inject a success banner that dismisses itself
    ///
    /// Same placement as [`Page::show_error`], but the banner closes on its
    /// own after the configured delay. Dismissal tolerates a banner the
    /// user already removed.
    pub fn show_success(&self, message: &str, container: Option<&ElementHandle>) -> ElementHandle {
        let banner = self.inject_banner("alert-success", "check-circle", message, container);

        let toolkit = self.toolkit.clone();
        let delay = Duration::from_millis(self.config.timing.success_dismiss_ms);
        let timed = banner.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            toolkit.close_alert(&timed);
        });

        banner
    }

    fn inject_banner(
        &self,
        style_class: &str,
        icon_name: &str,
        message: &str,
        container: Option<&ElementHandle>,
    ) -> ElementHandle {
        let banner = self.document.create_element("div");
        banner.add_class("alert");
        banner.add_class(style_class);
        banner.add_class("alert-dismissible");
        banner.set_text(message);

        let icon = self.document.create_element("i");
        icon.set_attribute("data-icon", icon_name);
        banner.append(icon);

        let close = self.document.create_element("button");
        close.add_class("btn-close");
        banner.append(close);

        let target = match container {
            Some(element) => element.clone(),
            None => self.default_container(),
        };
        target.insert_first(banner.clone());

        self.icons.replace(self.document.as_ref());
        banner.scroll_into_view(ScrollBehavior::Smooth, ScrollBlock::Center);

        banner
    }

    /// First element carrying the configured container class, or the body
    /// when the page has none
    fn default_container(&self) -> ElementHandle {
        self.document
            .query(&Query::Class(self.config.ui.container_class.clone()))
            .into_iter()
            .next()
            .unwrap_or_else(|| self.document.body())
    }
}

/// Render a percentage without a trailing `.0`
fn format_percent(percentage: f64) -> String {
    if percentage.fract() == 0.0 {
        format!("{}", percentage as i64)
    } else {
        format!("{}", percentage)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use pagekit_dom::{
        GlyphIcons, HeadlessToolkit, MemoryClipboard, MemoryDocument, MemoryStorage, ToolkitEvent,
    };

    struct Harness {
        document: Arc<MemoryDocument>,
        toolkit: Arc<HeadlessToolkit>,
        storage: Arc<MemoryStorage>,
        clipboard: Arc<MemoryClipboard>,
        page: Page,
    }

    fn harness() -> Harness {
        harness_with(PageConfig::default())
    }

    fn harness_with(config: PageConfig) -> Harness {
        let document = Arc::new(MemoryDocument::new());
        let toolkit = Arc::new(HeadlessToolkit::new());
        let storage = Arc::new(MemoryStorage::new());
        let clipboard = Arc::new(MemoryClipboard::new());
        let page = Page::new(
            document.clone(),
            toolkit.clone(),
            storage.clone(),
            clipboard.clone(),
            Arc::new(GlyphIcons::new()),
            config,
        );
        Harness {
            document,
            toolkit,
            storage,
            clipboard,
            page,
        }
    }

    fn attached(document: &MemoryDocument, tag: &str) -> ElementHandle {
        let element = document.create_element(tag);
        document.body().append(element.clone());
        element
    }

    fn fast_config() -> PageConfig {
        let mut config = PageConfig::default();
        config.timing.alert_dismiss_ms = 20;
        config.timing.success_dismiss_ms = 20;
        config
    }

    #[tokio::test]
    async fn test_init_attaches_tooltips() {
        let h = harness();
        let hinted = attached(&h.document, "span");
        hinted.set_attribute("data-tooltip", "More info");
        attached(&h.document, "span");

        let _handles = h.page.init();

        assert_eq!(
            h.toolkit.events(),
            vec![ToolkitEvent::TooltipAttached(hinted.node_id())]
        );
        assert_eq!(hinted.attribute("data-tooltip-bound").as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_init_auto_dismisses_alerts_but_not_permanent_ones() {
        let h = harness_with(fast_config());
        let alert = attached(&h.document, "div");
        alert.add_class("alert");
        let permanent = attached(&h.document, "div");
        permanent.add_class("alert");
        permanent.add_class("alert-permanent");

        let _handles = h.page.init();
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(!alert.is_attached());
        assert!(permanent.is_attached());
    }

    #[tokio::test]
    async fn test_init_alert_dismissal_tolerates_early_removal() {
        let h = harness_with(fast_config());
        let alert = attached(&h.document, "div");
        alert.add_class("alert");

        let _handles = h.page.init();
        alert.remove();
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(!alert.is_attached());
        assert_eq!(
            h.toolkit.events(),
            vec![ToolkitEvent::AlertClosed(alert.node_id())]
        );
    }

    #[tokio::test]
    async fn test_invalid_form_submit_is_cancelled_and_focused() {
        let h = harness();
        let form = attached(&h.document, "form");
        form.add_class("needs-validation");
        let field = h.document.create_element("input");
        field.set_attribute("required", "");
        form.append(field.clone());

        let _handles = h.page.init();
        let outcome = h.document.dispatch(&form, EventKind::Submit);

        assert!(outcome.default_prevented);
        assert!(outcome.propagation_stopped);
        assert!(field.is_focused());
        assert!(form.has_class("was-validated"));
    }

    #[tokio::test]
    async fn test_valid_form_submit_proceeds_but_is_marked_validated() {
        let h = harness();
        let form = attached(&h.document, "form");
        form.add_class("needs-validation");
        let field = h.document.create_element("input");
        field.set_attribute("required", "");
        field.set_attribute("value", "filled");
        form.append(field);

        let _handles = h.page.init();
        let outcome = h.document.dispatch(&form, EventKind::Submit);

        assert!(!outcome.default_prevented);
        assert!(form.has_class("was-validated"));
    }

    #[tokio::test]
    async fn test_anchor_click_scrolls_to_existing_target() {
        let h = harness();
        let anchor = attached(&h.document, "a");
        anchor.set_attribute("href", "#summary");
        let target = attached(&h.document, "section");
        target.set_attribute("id", "summary");

        let _handles = h.page.init();
        let outcome = h.document.dispatch(&anchor, EventKind::Click);

        assert!(outcome.default_prevented);
        let scrolls = h.document.scrolls();
        assert_eq!(scrolls.len(), 1);
        assert_eq!(scrolls[0].node_id, target.node_id());
        assert_eq!(scrolls[0].behavior, ScrollBehavior::Smooth);
        assert_eq!(scrolls[0].block, ScrollBlock::Start);
    }

    #[tokio::test]
    async fn test_anchor_click_without_target_prevents_but_does_not_scroll() {
        let h = harness();
        let anchor = attached(&h.document, "a");
        anchor.set_attribute("href", "#missing");

        let _handles = h.page.init();
        let outcome = h.document.dispatch(&anchor, EventKind::Click);

        assert!(outcome.default_prevented);
        assert!(h.document.scrolls().is_empty());
    }

    #[tokio::test]
    async fn test_init_restores_persisted_theme() {
        let h = harness();
        h.storage.set("preferred-theme", "dark");

        let _handles = h.page.init();

        assert_eq!(
            h.document.root().attribute("data-theme").as_deref(),
            Some("dark")
        );
    }

    #[tokio::test]
    async fn test_init_ignores_unrecognized_persisted_theme() {
        let h = harness();
        h.storage.set("preferred-theme", "sepia");

        let _handles = h.page.init();

        assert_eq!(h.document.root().attribute("data-theme"), None);
    }

    #[tokio::test]
    async fn test_disposed_handles_stop_event_delivery() {
        let h = harness();
        let anchor = attached(&h.document, "a");
        anchor.set_attribute("href", "#x");

        let handles = h.page.init();
        assert_eq!(handles.len(), 1);
        handles.dispose();

        let outcome = h.document.dispatch(&anchor, EventKind::Click);
        assert!(!outcome.default_prevented);
        assert_eq!(outcome.handlers_run, 0);
    }

    #[test]
    fn test_toggle_theme_flips_and_persists() {
        let h = harness();

        assert_eq!(h.page.toggle_theme(), Theme::Dark);
        assert_eq!(
            h.document.root().attribute("data-theme").as_deref(),
            Some("dark")
        );
        assert_eq!(h.storage.get("preferred-theme").as_deref(), Some("dark"));

        assert_eq!(h.page.toggle_theme(), Theme::Light);
        assert_eq!(h.storage.get("preferred-theme").as_deref(), Some("light"));
    }

    #[tokio::test]
    async fn test_copy_to_clipboard_writes_and_toasts() {
        let h = harness();

        h.page.copy_to_clipboard("agenda item 4").await.unwrap();

        assert_eq!(h.clipboard.last().as_deref(), Some("agenda item 4"));
        assert!(h
            .toolkit
            .events()
            .iter()
            .any(|e| matches!(e, ToolkitEvent::ToastShown(_))));
        // The toast removed itself after hiding.
        assert!(h
            .document
            .query(&Query::Class("toast".to_string()))
            .is_empty());
    }

    #[tokio::test]
    async fn test_copy_to_clipboard_keeps_toast_without_auto_hide() {
        let mut config = PageConfig::default();
        config.timing.toast_auto_hide = false;
        let h = harness_with(config);

        h.page.copy_to_clipboard("agenda item 4").await.unwrap();

        let toasts = h.document.query(&Query::Class("toast".to_string()));
        assert_eq!(toasts.len(), 1);
        assert!(h
            .toolkit
            .events()
            .iter()
            .any(|e| matches!(e, ToolkitEvent::ToastShown(_))));
    }

    #[tokio::test]
    async fn test_copy_to_clipboard_surfaces_failure_without_toast() {
        let h = harness();
        h.clipboard.set_failing(true);

        let error = h.page.copy_to_clipboard("lost").await.unwrap_err();

        assert!(matches!(error, PageError::Clipboard { .. }));
        assert!(h.toolkit.events().is_empty());
        assert!(h.clipboard.writes().is_empty());
    }

    #[test]
    fn test_show_and_hide_loading() {
        let h = harness();
        let button = attached(&h.document, "button");
        button.set_html("Run scrape");

        h.page.show_loading(&button, None);
        assert!(button.is_disabled());
        assert!(button.html().contains("spinner"));
        assert!(button.html().contains("Loading..."));

        h.page.hide_loading(&button, "Run scrape");
        assert!(!button.is_disabled());
        assert_eq!(button.html(), "Run scrape");
    }

    #[test]
    fn test_show_loading_custom_text_and_detached_noop() {
        let h = harness();
        let button = attached(&h.document, "button");
        h.page.show_loading(&button, Some("Scraping..."));
        assert!(button.html().contains("Scraping..."));

        let detached = h.document.create_element("button");
        h.page.show_loading(&detached, None);
        assert!(detached.html().is_empty());
        assert!(!detached.is_disabled());
    }

    #[test]
    fn test_update_progress_sets_width_and_aria() {
        let h = harness();
        let bar = attached(&h.document, "div");

        h.page.update_progress(&bar, 50.0, Some("50 of 100"));
        assert_eq!(bar.style("width").as_deref(), Some("50%"));
        assert_eq!(bar.attribute("aria-valuenow").as_deref(), Some("50"));
        assert_eq!(bar.text(), "50 of 100");

        h.page.update_progress(&bar, 62.5, None);
        assert_eq!(bar.style("width").as_deref(), Some("62.5%"));
        // Label untouched when none is given.
        assert_eq!(bar.text(), "50 of 100");
    }

    #[test]
    fn test_update_progress_passes_out_of_range_through() {
        let h = harness();
        let bar = attached(&h.document, "div");

        h.page.update_progress(&bar, 150.0, None);
        assert_eq!(bar.style("width").as_deref(), Some("150%"));

        h.page.update_progress(&bar, -10.0, None);
        assert_eq!(bar.attribute("aria-valuenow").as_deref(), Some("-10"));
    }

    #[tokio::test]
    async fn test_show_error_inserts_first_and_scrolls() {
        let h = harness();
        let container = attached(&h.document, "div");
        container.add_class("container");
        let existing = h.document.create_element("p");
        container.append(existing);

        let banner = h.page.show_error("Scrape failed", None);

        assert!(banner.has_class("alert-danger"));
        assert_eq!(banner.text(), "Scrape failed");
        // Inserted before the existing content.
        let alerts = h.document.query(&Query::Class("alert".to_string()));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].node_id(), banner.node_id());

        let scrolls = h.document.scrolls();
        assert_eq!(scrolls.len(), 1);
        assert_eq!(scrolls[0].node_id, banner.node_id());
        assert_eq!(scrolls[0].block, ScrollBlock::Center);

        // Error banners persist.
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(banner.is_attached());
    }

    #[tokio::test]
    async fn test_show_success_dismisses_itself() {
        let h = harness_with(fast_config());
        let container = attached(&h.document, "div");
        container.add_class("container");

        let banner = h.page.show_success("Saved", None);
        assert!(banner.has_class("alert-success"));
        assert!(banner.is_attached());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(!banner.is_attached());
    }

    #[tokio::test]
    async fn test_banner_falls_back_to_body_without_container() {
        let h = harness();

        let banner = h.page.show_error("No container here", None);
        assert!(banner.is_attached());
    }

    #[tokio::test]
    async fn test_banner_uses_given_container() {
        let h = harness();
        let sidebar = attached(&h.document, "aside");

        let banner = h.page.show_error("Local problem", Some(&sidebar));
        assert!(banner.is_attached());
        // Icon placeholders were rendered.
        let icons = h.document.query(&Query::Attr("data-icon".to_string()));
        assert_eq!(icons.len(), 1);
        assert_eq!(icons[0].attribute("data-icon-rendered").as_deref(), Some("true"));
    }
}
