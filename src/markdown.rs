//! Chat markdown → HTML.
//!
//! The dialect is deliberately small: `### ` headings, `[label](http(s)://url)`
//! links, `**bold**`, `*italic*` (rendered bold, like the widget always did),
//! `* ` bullet lines and hard line breaks. Every character of the input is
//! escaped on the way out, so the only tags in the result are the ones the
//! rules below emit.
//!
//! Rules apply per line in a fixed order: heading, link, bold, italic,
//! bullet. Each stage works on the token stream produced by the previous one,
//! so emitted markup is never re-matched. Links are atomic tokens and every
//! emphasis pair opens before it closes; since emphasis only ever emits
//! `<strong>`, the output is always well-nested.

use crate::escape::push_escaped;

pub const LINK_CLASS: &str = "underline text-blue-400";
pub const BULLET: &str = "• ";
pub const LINE_BREAK: &str = "<br/>";

#[derive(Debug, Clone, PartialEq)]
enum Inline {
    Char(char),
    Anchor { href: String, label: Vec<Inline> },
    Open,
    Close,
}

/// Format one message (or message segment) as display-safe HTML.
pub fn format_message(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 2);
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            out.push_str(LINE_BREAK);
        }
        format_line(line.strip_suffix('\r').unwrap_or(line), &mut out);
    }
    out
}

fn format_line(line: &str, out: &mut String) {
    if let Some(title) = heading_text(line) {
        out.push_str("<strong>");
        render(&parse_inline(title), out);
        out.push_str("</strong>");
        return;
    }

    let nodes = parse_inline(line);
    match bullet_body(&nodes) {
        Some(body) => {
            out.push_str(BULLET);
            render(body, out);
        }
        None => render(&nodes, out),
    }
}

/// `###` followed by at least one whitespace character.
fn heading_text(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("###")?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// A line whose leading `*` survived emphasis pairing and is followed by
/// whitespace. Returns the nodes after the marker and the whitespace.
fn bullet_body(nodes: &[Inline]) -> Option<&[Inline]> {
    let (first, rest) = nodes.split_first()?;
    if *first != Inline::Char('*') {
        return None;
    }
    let ws = rest
        .iter()
        .take_while(|n| matches!(n, Inline::Char(c) if c.is_whitespace()))
        .count();
    if ws == 0 {
        return None;
    }
    Some(&rest[ws..])
}

fn parse_inline(text: &str) -> Vec<Inline> {
    pair_italic(pair_bold(tokenize_links(text)))
}

// ─── Links ──────────────────────────────────────────────────────────────────

fn tokenize_links(line: &str) -> Vec<Inline> {
    let mut units = Vec::with_capacity(line.len());
    // First `]` at or after the cursor; `None` once the line has no more.
    let mut close: Option<usize> = None;
    let mut closes_left = true;
    let mut i = 0;

    while let Some(ch) = line[i..].chars().next() {
        if ch == '[' && closes_left {
            if close.map_or(true, |c| c < i) {
                close = line[i..].find(']').map(|r| i + r);
                closes_left = close.is_some();
            }
            if let Some(c) = close {
                if c > i + 1 {
                    if let Some((href, consumed)) = match_target(&line[c..]) {
                        units.push(Inline::Anchor {
                            href: href.to_string(),
                            label: parse_inline(&line[i + 1..c]),
                        });
                        i = c + consumed;
                        continue;
                    }
                }
            }
        }
        units.push(Inline::Char(ch));
        i += ch.len_utf8();
    }

    units
}

/// `](http(s)://…)` where the url has no whitespace and ends at `)`.
/// Returns the url and the bytes consumed.
fn match_target(s: &str) -> Option<(&str, usize)> {
    let target = s.strip_prefix("](")?;
    let scheme_len = if target.starts_with("https://") {
        8
    } else if target.starts_with("http://") {
        7
    } else {
        return None;
    };
    let url_len = target
        .find(|c: char| c.is_whitespace() || c == ')')
        .unwrap_or(target.len());
    if url_len <= scheme_len || !target[url_len..].starts_with(')') {
        return None;
    }
    Some((&target[..url_len], 2 + url_len + 1))
}

// ─── Emphasis ───────────────────────────────────────────────────────────────

/// `**…**`
fn pair_bold(units: Vec<Inline>) -> Vec<Inline> {
    pair(units, 2)
}

/// `*…*`, rendered as `<strong>` just like bold. Runs over the output of
/// [`pair_bold`], so a star inside a bold span can pair with one after it:
/// `***x***` nests two strong spans.
fn pair_italic(units: Vec<Inline>) -> Vec<Inline> {
    pair(units, 1)
}

/// Leftmost opener, nearest closer, skipping over tags already emitted.
/// Openers without a closer stay literal.
fn pair(units: Vec<Inline>, width: usize) -> Vec<Inline> {
    let mut out = Vec::with_capacity(units.len());
    let mut i = 0;

    while i < units.len() {
        if is_stars(&units, i, width) {
            let close = (i + width..units.len()).find(|&j| is_stars(&units, j, width));
            if let Some(close) = close {
                out.push(Inline::Open);
                out.extend_from_slice(&units[i + width..close]);
                out.push(Inline::Close);
                i = close + width;
                continue;
            }
        }
        out.push(units[i].clone());
        i += 1;
    }

    out
}

fn is_stars(units: &[Inline], at: usize, width: usize) -> bool {
    units.len() >= at + width && units[at..at + width].iter().all(|u| *u == Inline::Char('*'))
}

// ─── Output ─────────────────────────────────────────────────────────────────

fn render(nodes: &[Inline], out: &mut String) {
    for node in nodes {
        match node {
            Inline::Char(c) => push_escaped(out, *c),
            Inline::Open => out.push_str("<strong>"),
            Inline::Close => out.push_str("</strong>"),
            Inline::Anchor { href, label } => {
                out.push_str("<a href=\"");
                for c in href.chars() {
                    push_escaped(out, c);
                }
                out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"");
                out.push_str(LINK_CLASS);
                out.push_str("\">");
                render(label, out);
                out.push_str("</a>");
            }
        }
    }
}
