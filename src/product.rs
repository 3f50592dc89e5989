//! Product-block extraction.
//!
//! Bot replies may embed product recommendations as labelled fields:
//!
//! ```text
//! **Product Name**: Ubtan Face Wash
//! **Description**: Gentle daily cleanser
//! **Product URL**: [View](https://shop.example/ubtan)
//! **Image URL**: ![Ubtan](https://cdn.example/ubtan.png)
//! ```
//!
//! A block starts at `**Product Name**:` and ends right after the first
//! complete `**Image URL**: ![label](url)` that follows it. Inside a block the
//! four fields are looked up independently; a missing field is an empty string.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

pub const NAME_MARKER: &str = "**Product Name**:";
pub const DESCRIPTION_MARKER: &str = "**Description**:";
pub const URL_MARKER: &str = "**Product URL**:";
pub const IMAGE_MARKER: &str = "**Image URL**:";

/// One product extracted from a block, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: String,
}

/// Products found in a message plus the prose around them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub products: Vec<ProductRecord>,
    /// Trimmed text preceding the first block. Empty when no block matched.
    pub text_before: String,
    /// Trimmed text following the last block. Empty when no block matched.
    pub text_after: String,
    /// Byte range from the first block start to the last block end.
    /// `None` when no block matched; callers then use the whole message.
    #[serde(skip)]
    pub span: Option<Range<usize>>,
}

impl ExtractionResult {
    pub fn has_products(&self) -> bool {
        self.span.is_some()
    }
}

/// Quick pre-check: does the text carry both the start and the end marker?
pub fn looks_like_product_message(text: &str) -> bool {
    text.contains(NAME_MARKER) && text.contains(IMAGE_MARKER)
}

/// Scan `text` left to right for non-overlapping product blocks.
pub fn extract_products(text: &str) -> ExtractionResult {
    let mut products = Vec::new();
    let mut span: Option<Range<usize>> = None;
    let mut cursor = 0;

    while let Some(rel) = text[cursor..].find(NAME_MARKER) {
        let start = cursor + rel;
        let body_start = start + NAME_MARKER.len();

        // Every later start marker sees a suffix of this search space, so a
        // miss here ends the scan.
        let Some(image) = find_link_field(&text[body_start..], IMAGE_MARKER, true) else {
            break;
        };
        let end = body_start + image.end;

        products.push(parse_block(&text[start..end]));

        span = Some(match span {
            None => start..end,
            Some(s) => s.start..end,
        });
        cursor = end;
    }

    debug!(blocks = products.len(), "product extraction finished");

    match span {
        Some(range) => ExtractionResult {
            products,
            text_before: text[..range.start].trim().to_string(),
            text_after: text[range.end..].trim().to_string(),
            span: Some(range),
        },
        None => ExtractionResult::default(),
    }
}

fn parse_block(block: &str) -> ProductRecord {
    ProductRecord {
        title: find_line_field(block, NAME_MARKER).unwrap_or_default(),
        description: find_line_field(block, DESCRIPTION_MARKER).unwrap_or_default(),
        url: find_link_field(block, URL_MARKER, false)
            .map(|m| m.url)
            .unwrap_or_default(),
        image_url: find_link_field(block, IMAGE_MARKER, true)
            .map(|m| m.url)
            .unwrap_or_default(),
    }
}

/// `<marker> value` where the value runs to the end of the line.
fn find_line_field(block: &str, marker: &str) -> Option<String> {
    let mut cursor = 0;
    while let Some(rel) = block[cursor..].find(marker) {
        let after = cursor + rel + marker.len();
        if let Some(rest) = block[after..].strip_prefix(' ') {
            let value = rest.split('\n').next().unwrap_or_default();
            return Some(value.strip_suffix('\r').unwrap_or(value).to_string());
        }
        cursor = after;
    }
    None
}

struct LinkMatch {
    url: String,
    /// Byte offset just past the closing `)`, relative to the searched text.
    end: usize,
}

/// `<marker> [label](url)`, or `<marker> ![label](url)` when `image` is set.
/// The first occurrence whose link completes wins.
fn find_link_field(text: &str, marker: &str, image: bool) -> Option<LinkMatch> {
    let lead = if image { " !" } else { " " };
    let mut cursor = 0;

    while let Some(rel) = text[cursor..].find(marker) {
        let after = cursor + rel + marker.len();

        if let Some(link) = text[after..].strip_prefix(lead) {
            match match_link(link) {
                LinkScan::Found { url, consumed } => {
                    return Some(LinkMatch {
                        url: url.to_string(),
                        end: after + lead.len() + consumed,
                    });
                }
                // Later markers on this line would search a suffix of it.
                LinkScan::LineExhausted => match text[after..].find('\n') {
                    Some(nl) => {
                        cursor = after + nl + 1;
                        continue;
                    }
                    None => return None,
                },
                LinkScan::NotLink => {}
            }
        }
        cursor = after;
    }
    None
}

enum LinkScan<'a> {
    Found { url: &'a str, consumed: usize },
    /// No `[` at the start
    NotLink,
    /// `](` or the closing `)` is missing before the end of the line
    LineExhausted,
}

/// Matches `[label](url)` at the start of `s`. Label and url stay on one
/// line; the url ends at the first `)`.
fn match_link(s: &str) -> LinkScan<'_> {
    let Some(inner) = s.strip_prefix('[') else {
        return LinkScan::NotLink;
    };
    let bytes = inner.as_bytes();

    let mut k = 0;
    let label_end = loop {
        match bytes.get(k) {
            None | Some(b'\n') => return LinkScan::LineExhausted,
            Some(b']') if bytes.get(k + 1) == Some(&b'(') => break k,
            _ => k += 1,
        }
    };

    let target = &inner[label_end + 2..];
    match target.bytes().position(|b| b == b')' || b == b'\n') {
        Some(url_end) if target.as_bytes()[url_end] == b')' => LinkScan::Found {
            url: &target[..url_end],
            consumed: 1 + label_end + 2 + url_end + 1,
        },
        _ => LinkScan::LineExhausted,
    }
}
