//! # Bubble Markup
//!
//! Message rendering for an embeddable, themeable chat widget.
//!
//! ## Features
//! - Product-block extraction: `**Product Name**: … **Image URL**: ![..](..)`
//!   blocks become [`ProductRecord`]s, in source order, with the prose around them
//! - A small chat markdown dialect rendered to escaped, well-nested HTML
//! - Product cards and chat bubbles decorated from a [`ThemeConfig`]
//! - Theme settings with injectable persistence ([`ThemeStore`])
//! - Widget session state: navigation, input, attachments, call button
//!
//! ## Example
//! ```ignore
//! use bubble_markup::{extract_products, format_message};
//!
//! let reply = "Picks:\n**Product Name**: Kit\n**Image URL**: ![Kit](https://cdn.example/kit.png)";
//! let result = extract_products(reply);
//! assert_eq!(result.products[0].title, "Kit");
//! assert_eq!(result.text_before, "Picks:");
//!
//! let html = format_message("**Hello** <there>");
//! assert_eq!(html, "<strong>Hello</strong> &lt;there&gt;");
//! ```

pub mod attachment;
pub mod error;
pub mod escape;
pub mod markdown;
pub mod message;
pub mod product;
pub mod render;
pub mod store;
pub mod theme;
pub mod widget;

// --- Core types ---
pub use error::{MarkupError, MarkupResult};
pub use message::{MessageContent, RawMessage, Sender};
pub use product::{ExtractionResult, ProductRecord};
pub use theme::{ThemeConfig, ThemePatch};

// --- Collaborators ---
pub use store::{FileThemeStore, MemoryThemeStore, ThemeSettings, ThemeStore};
pub use widget::{CallAction, ChatSession, ChatView, NavItem, NAV_ITEMS};

pub use escape::escape_html;

/// Split message text into product records and the prose around them.
pub fn extract_products(text: &str) -> ExtractionResult {
    product::extract_products(text)
}

/// Format a text segment as display-safe HTML.
pub fn format_message(text: &str) -> String {
    markdown::format_message(text)
}

/// Render message text as HTML: cards for product blocks, prose otherwise.
pub fn render_content(text: &str, theme: &ThemeConfig) -> String {
    render::render_content(text, theme)
}

/// Render a whole chat bubble.
pub fn render_message(message: &RawMessage, theme: &ThemeConfig) -> String {
    render::render_message(message, theme)
}
