//! Pagekit demo driver
//!
//! Builds an in-memory page, runs the initialization routine and
//! exercises the helpers, so the workspace has a manual smoke path.

use clap::Parser;
use pagekit_config::PageConfig;
use pagekit_core::Page;
use pagekit_dom::{
    GlyphIcons, HeadlessToolkit, MemoryClipboard, MemoryDocument, MemoryStorage,
};
use pagekit_utils::{file_icon, format_date, format_file_size, is_valid_date, is_valid_url};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "pagekit")]
#[command(version = "0.1.0")]
#[command(about = "A headless page UI helper library", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let rt = Runtime::new()?;

    let config = match PageConfig::load(args.config.clone()) {
        Ok(config) => {
            eprintln!("[INFO] Config loaded: {}", args.config.display());
            config
        }
        Err(e) => {
            eprintln!(
                "[WARN] Could not load {}: {} - using defaults",
                args.config.display(),
                e.to_details()
            );
            PageConfig::default()
        }
    };

    rt.block_on(async {
        let document = Arc::new(MemoryDocument::new());
        seed_page(&document);

        let clipboard = Arc::new(MemoryClipboard::new());
        let page = Page::new(
            document.clone(),
            Arc::new(HeadlessToolkit::new()),
            Arc::new(MemoryStorage::new()),
            clipboard.clone(),
            Arc::new(GlyphIcons::new()),
            config,
        );

        let handles = page.init();
        eprintln!(
            "[INFO] Page initialized: {} event subscriptions",
            handles.len()
        );

        let theme = page.toggle_theme();
        eprintln!("[INFO] Theme toggled to: {}", theme);

        match page.copy_to_clipboard("https://example.com/agenda.pdf").await {
            Ok(()) => eprintln!("[INFO] Copied link to clipboard"),
            Err(e) => eprintln!("[ERROR] Clipboard copy failed: {}", e),
        }

        page.show_success("Demo page ready", None);

        eprintln!("[INFO] format_file_size(1536) = {}", format_file_size(1536));
        eprintln!(
            "[INFO] format_date(\"2026-08-25\") = {:?}",
            format_date("2026-08-25", &page.config().format.date_format)
        );
        eprintln!("[INFO] file_icon(\"report.PDF\") = {}", file_icon("report.PDF"));
        eprintln!(
            "[INFO] is_valid_url(\"https://example.com\") = {}",
            is_valid_url("https://example.com")
        );
        eprintln!(
            "[INFO] is_valid_date(\"02/29/2024\") = {}",
            is_valid_date("02/29/2024")
        );

        handles.dispose();
    });

    Ok(())
}

/// Seed the demo document with the element shapes the init routine wires
fn seed_page(document: &MemoryDocument) {
    use pagekit_dom::{Document, Element};

    let body = document.body();

    let container = document.create_element("div");
    container.add_class("container");
    body.append(container);

    let hinted = document.create_element("span");
    hinted.set_attribute("data-tooltip", "Scrape status");
    body.append(hinted);

    let alert = document.create_element("div");
    alert.add_class("alert");
    body.append(alert);

    let form = document.create_element("form");
    form.add_class("needs-validation");
    let field = document.create_element("input");
    field.set_attribute("required", "");
    form.append(field);
    body.append(form);

    let anchor = document.create_element("a");
    anchor.set_attribute("href", "#results");
    body.append(anchor);

    let section = document.create_element("section");
    section.set_attribute("id", "results");
    body.append(section);
}
