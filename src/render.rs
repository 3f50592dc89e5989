//! HTML for chat bubbles and product cards.
//!
//! Class names are the widget's Tailwind utilities; every interpolated value
//! goes through [`escape_html`] and URLs are restricted to safe schemes.

use tracing::debug;

use crate::escape::escape_html;
use crate::markdown::format_message;
use crate::message::{MessageContent, RawMessage};
use crate::product::{extract_products, looks_like_product_message, ExtractionResult, ProductRecord};
use crate::theme::ThemeConfig;

const CARD_CLASS: &str = "bg-[#1f2937] border border-[#374151] rounded-xl p-3 w-[260px] text-white shadow-lg";
const CARD_LINK_CLASS: &str = "mt-3 block w-full text-center bg-green-600 hover:bg-green-700 transition text-white rounded-md py-1";

const USER_BUBBLE: &str = "bg-green-600/20 backdrop-blur-md border border-green-400/20 text-white ml-auto";
const BOT_BUBBLE: &str = "bg-white/10 backdrop-blur-md border border-white/20 text-white";
const USER_TAIL: &str = "bg-green-600/20 border-l border-t border-green-400/20";
const BOT_TAIL: &str = "bg-white/10 border-l border-t border-white/20";

/// Render message text: product cards when the text carries complete product
/// blocks, formatted prose otherwise.
pub fn render_content(text: &str, theme: &ThemeConfig) -> String {
    if looks_like_product_message(text) {
        let extraction = extract_products(text);
        if extraction.has_products() {
            return render_extraction(&extraction, theme);
        }
        debug!("product markers without a complete block, rendering as prose");
    }
    format!(
        "<p class=\"text-sm leading-relaxed\">{}</p>",
        format_message(text)
    )
}

/// Prose before, one card per product in order, prose after.
pub fn render_extraction(extraction: &ExtractionResult, theme: &ThemeConfig) -> String {
    let mut html = String::from("<div class=\"space-y-4\">");

    if !extraction.text_before.is_empty() {
        html.push_str(&prose(&extraction.text_before));
    }

    html.push_str("<div class=\"grid gap-4\">");
    for product in &extraction.products {
        html.push_str(&render_product_card(product, theme));
    }
    html.push_str("</div>");

    if !extraction.text_after.is_empty() {
        html.push_str(&prose(&extraction.text_after));
    }

    html.push_str("</div>");
    html
}

fn prose(text: &str) -> String {
    format!("<p class=\"text-sm text-white\">{}</p>", format_message(text))
}

/// One product card. A missing or unsafe image falls back to the theme logo.
pub fn render_product_card(product: &ProductRecord, theme: &ThemeConfig) -> String {
    let title = escape_html(&product.title);
    let mut html = format!("<div class=\"{}\">", CARD_CLASS);

    let image = safe_image_src(&product.image_url).or_else(|| safe_image_src(&theme.logo_url));
    if let Some(src) = image {
        html.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\" class=\"rounded-lg w-full h-40 object-cover mb-3\" />",
            escape_html(src),
            title
        ));
    }

    html.push_str(&format!(
        "<h3 class=\"text-white font-semibold text-base mb-1\">{}</h3>\
         <p class=\"text-sm text-gray-300\">{}</p>\
         <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"{}\">View Product</a>\
         </div>",
        title,
        escape_html(&product.description),
        escape_html(safe_href(&product.url)),
        CARD_LINK_CLASS
    ));
    html
}

/// Full bubble: avatar, content, timestamp and tail, aligned by sender.
pub fn render_message(message: &RawMessage, theme: &ThemeConfig) -> String {
    let is_user = message.is_user();

    let avatar = if is_user {
        "<div class=\"w-8 h-8 rounded-full bg-white/20 flex items-center justify-center\">\
         <span class=\"icon-user w-4 h-4 text-white\" aria-hidden=\"true\"></span></div>"
            .to_string()
    } else {
        match safe_image_src(&theme.logo_url) {
            Some(src) => format!(
                "<div class=\"w-8 h-8 rounded-full overflow-hidden shadow-md\">\
                 <img src=\"{}\" alt=\"{}\" class=\"w-full h-full object-cover\" /></div>",
                escape_html(src),
                escape_html(&theme.brand_name)
            ),
            None => format!(
                "<div class=\"w-8 h-8 rounded-full bg-gradient-to-br {} shadow-md\"></div>",
                escape_html(&theme.primary_gradient)
            ),
        }
    };

    let body = match &message.content {
        MessageContent::Text { text } => render_content(text, theme),
        MessageContent::Image { data_uri } => match safe_image_src(data_uri) {
            Some(src) => format!(
                "<img src=\"{}\" alt=\"uploaded\" class=\"max-w-[100px] max-h-[100px] rounded-lg\" />",
                escape_html(src)
            ),
            None => "<p class=\"text-sm leading-relaxed\">[unsupported image]</p>".to_string(),
        },
    };

    format!(
        "<div class=\"flex {justify} mb-4\">\
         <div class=\"flex max-w-[220px] sm:max-w-[260px] lg:max-w-[300px] {direction}\">\
         <div class=\"flex-shrink-0 {gap}\">{avatar}</div>\
         <div class=\"relative p-3 rounded-2xl {bubble} shadow-xl\">\
         {body}\
         <p class=\"text-xs mt-1 {time}\">{stamp}</p>\
         <div class=\"absolute top-4 {tail_pos}\"><div class=\"w-3 h-3 rotate-45 {tail}\"></div></div>\
         </div></div></div>",
        justify = if is_user { "justify-end" } else { "justify-start" },
        direction = if is_user { "flex-row-reverse" } else { "flex-row" },
        gap = if is_user { "ml-3" } else { "mr-3" },
        avatar = avatar,
        bubble = if is_user { USER_BUBBLE } else { BOT_BUBBLE },
        body = body,
        time = if is_user { "text-white/70" } else { "text-gray-400" },
        stamp = message.display_time(),
        tail_pos = if is_user { "right-0 translate-x-1" } else { "left-0 -translate-x-1" },
        tail = if is_user { USER_TAIL } else { BOT_TAIL },
    )
}

fn has_web_scheme(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Link targets: http(s) only, anything else becomes an inert `#`.
fn safe_href(url: &str) -> &str {
    if has_web_scheme(url) {
        url.trim()
    } else {
        "#"
    }
}

fn safe_image_src(src: &str) -> Option<&str> {
    let src = src.trim();
    if has_web_scheme(src) || src.to_ascii_lowercase().starts_with("data:image/") {
        Some(src)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Sender;
    use chrono::{Local, TimeZone};
    use pretty_assertions::assert_eq;

    const PRODUCT: &str = "Try these:\n**Product Name**: Kit\n**Description**: Daily <care>\n**Product URL**: [Buy](https://shop.example/kit)\n**Image URL**: ![Kit](https://cdn.example/kit.png)\nEnjoy!";

    #[test]
    fn test_plain_text_is_one_paragraph() {
        let html = render_content("**hi**", &ThemeConfig::default());
        assert_eq!(html, "<p class=\"text-sm leading-relaxed\"><strong>hi</strong></p>");
    }

    #[test]
    fn test_product_message_renders_cards_between_prose() {
        let html = render_content(PRODUCT, &ThemeConfig::default());
        let before = html.find("Try these:").unwrap();
        let card = html.find("<h3").unwrap();
        let after = html.find("Enjoy!").unwrap();
        assert!(before < card && card < after);
        assert!(html.contains("src=\"https://cdn.example/kit.png\""));
        assert!(html.contains("href=\"https://shop.example/kit\""));
        assert!(html.contains("Daily &lt;care&gt;"));
    }

    #[test]
    fn test_markers_without_complete_block_fall_back_to_prose() {
        let text = "**Product Name**: Kit\n**Image URL**: coming soon";
        let html = render_content(text, &ThemeConfig::default());
        assert!(html.starts_with("<p class=\"text-sm leading-relaxed\">"));
        assert!(html.contains("<strong>Product Name</strong>: Kit<br/>"));
    }

    #[test]
    fn test_missing_image_uses_theme_logo() {
        let theme = ThemeConfig {
            logo_url: "https://brand.example/logo.png".to_string(),
            ..Default::default()
        };
        let html = render_product_card(&ProductRecord::default(), &theme);
        assert!(html.contains("src=\"https://brand.example/logo.png\""));
        assert!(html.contains("href=\"#\""));
    }

    #[test]
    fn test_script_urls_are_neutralized() {
        let product = ProductRecord {
            title: "x".to_string(),
            url: "javascript:alert(1)".to_string(),
            image_url: "javascript:alert(2)".to_string(),
            ..Default::default()
        };
        let theme = ThemeConfig {
            logo_url: String::new(),
            ..Default::default()
        };
        let html = render_product_card(&product, &theme);
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_message_alignment_by_sender() {
        let ts = Local.with_ymd_and_hms(2025, 1, 1, 14, 30, 0).unwrap();
        let theme = ThemeConfig::default();

        let user = RawMessage::user_text("hello").unwrap().with_timestamp(ts);
        let html = render_message(&user, &theme);
        assert!(html.starts_with("<div class=\"flex justify-end mb-4\">"));
        assert!(html.contains("icon-user"));
        assert!(html.contains(">14:30</p>"));

        let bot = RawMessage::bot_text("hi").unwrap().with_timestamp(ts);
        let html = render_message(&bot, &theme);
        assert!(html.starts_with("<div class=\"flex justify-start mb-4\">"));
        assert!(html.contains("alt=\"AI Assistant\""));
    }

    #[test]
    fn test_image_message_is_not_formatted() {
        let msg = RawMessage::image(Sender::User, "data:image/png;base64,AAAA");
        let html = render_message(&msg, &ThemeConfig::default());
        assert!(html.contains("<img src=\"data:image/png;base64,AAAA\" alt=\"uploaded\""));
    }
}
