//! HTML → Markdown conversion for article bodies.
//!
//! Article bodies are HTML fragments produced by the help-center editor.
//! The fragment is parsed with `scraper` (html5ever) and walked once,
//! emitting CommonMark with ATX headings. Block elements become blank-line
//! separated blocks; inline elements are rendered into the surrounding
//! paragraph.

use scraper::{ElementRef, Html, Node};
use thiserror::Error;

/// Deepest element nesting the converter will walk
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("HTML nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "head", "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "script", "section",
    "style", "summary", "table", "template", "ul",
];

const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "template"];

/// Convert an HTML fragment to Markdown.
///
/// Returns an empty string for an empty (or whitespace-only) body.
pub fn html_to_markdown(html: &str) -> Result<String, ConvertError> {
    if html.trim().is_empty() {
        return Ok(String::new());
    }

    let fragment = Html::parse_fragment(html);
    let blocks = blocks_of(fragment.root_element(), 0)?;
    Ok(blocks.join("\n\n"))
}

fn check_depth(depth: usize) -> Result<(), ConvertError> {
    if depth > MAX_DEPTH {
        return Err(ConvertError::TooDeep { limit: MAX_DEPTH });
    }
    Ok(())
}

fn is_block(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name)
}

/// A rendered block and whether it came from a nested list
struct Block {
    text: String,
    list: bool,
}

/// Render the children of a container as a list of blocks
fn blocks_of(element: ElementRef<'_>, depth: usize) -> Result<Vec<String>, ConvertError> {
    Ok(child_blocks(element, depth)?
        .into_iter()
        .map(|block| block.text)
        .collect())
}

fn child_blocks(element: ElementRef<'_>, depth: usize) -> Result<Vec<Block>, ConvertError> {
    check_depth(depth)?;

    let mut blocks = Vec::new();
    let mut inline = String::new();

    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_text(&mut inline, &text.text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child.value().name();
                if is_block(name) {
                    flush_paragraph(&mut inline, &mut blocks);
                    let list = matches!(name, "ul" | "ol");
                    for text in render_block(child, depth + 1)? {
                        blocks.push(Block { text, list });
                    }
                } else {
                    push_inline(&mut inline, child, depth + 1)?;
                }
            }
            _ => {}
        }
    }

    flush_paragraph(&mut inline, &mut blocks);
    Ok(blocks)
}

fn flush_paragraph(inline: &mut String, blocks: &mut Vec<Block>) {
    let text = inline.trim();
    if !text.is_empty() {
        blocks.push(Block {
            text: text.to_string(),
            list: false,
        });
    }
    inline.clear();
}

fn render_block(element: ElementRef<'_>, depth: usize) -> Result<Vec<String>, ConvertError> {
    check_depth(depth)?;

    let name = element.value().name();
    let blocks = match name {
        _ if SKIPPED_ELEMENTS.contains(&name) => Vec::new(),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            let text = inline_children(element, depth)?;
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                Vec::new()
            } else {
                vec![format!("{} {}", "#".repeat(level), text)]
            }
        }
        "p" => {
            let text = inline_children(element, depth)?;
            let text = text.trim();
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text.to_string()]
            }
        }
        "pre" => vec![render_pre(element)],
        "ul" => render_list(element, false, depth)?,
        "ol" => render_list(element, true, depth)?,
        "blockquote" => {
            let inner = blocks_of(element, depth)?.join("\n\n");
            if inner.is_empty() {
                Vec::new()
            } else {
                let quoted = inner
                    .lines()
                    .map(|line| {
                        if line.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {}", line)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                vec![quoted]
            }
        }
        "hr" => vec!["---".to_string()],
        "table" => render_table(element, depth)?,
        _ => blocks_of(element, depth)?,
    };

    Ok(blocks)
}

/// Render the children of an element as inline Markdown
fn inline_children(element: ElementRef<'_>, depth: usize) -> Result<String, ConvertError> {
    check_depth(depth)?;

    let mut out = String::new();
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_text(&mut out, &text.text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_block(child.value().name()) {
                    let inner = render_block(child, depth + 1)?.join("\n\n");
                    if !inner.is_empty() {
                        push_block_break(&mut out);
                        out.push_str(&inner);
                        push_block_break(&mut out);
                    }
                } else {
                    push_inline(&mut out, child, depth + 1)?;
                }
            }
            _ => {}
        }
    }
    Ok(out)
}

fn push_inline(out: &mut String, element: ElementRef<'_>, depth: usize) -> Result<(), ConvertError> {
    check_depth(depth)?;

    let name = element.value().name();
    match name {
        "br" => {
            let kept = out.trim_end_matches(' ').len();
            out.truncate(kept);
            out.push_str("  \n");
        }
        _ if SKIPPED_ELEMENTS.contains(&name) => {}
        "em" | "i" | "cite" => {
            let inner = inline_children(element, depth)?;
            append(out, &wrap_emphasis(&inner, "*"));
        }
        "strong" | "b" => {
            let inner = inline_children(element, depth)?;
            append(out, &wrap_emphasis(&inner, "**"));
        }
        "code" | "kbd" | "samp" | "tt" => {
            let raw: String = element.text().collect();
            append(out, &inline_code(&collapse_whitespace(&raw)));
        }
        "a" => {
            let inner = inline_children(element, depth)?;
            let text = inner.trim();
            match element.value().attr("href").map(str::trim) {
                Some(href) if !href.is_empty() && !text.is_empty() => {
                    append(out, &format!("[{}]({})", text, href.replace(' ', "%20")));
                }
                _ => append(out, &inner),
            }
        }
        "img" => {
            if let Some(src) = element.value().attr("src").filter(|s| !s.is_empty()) {
                let alt = element.value().attr("alt").unwrap_or_default();
                append(out, &format!("![{}]({})", escape_text(alt), src.replace(' ', "%20")));
            }
        }
        _ => {
            let inner = inline_children(element, depth)?;
            append(out, &inner);
        }
    }

    Ok(())
}

/// Append a text node, escaped, with a leading block marker neutralized at line start
fn push_text(out: &mut String, raw: &str) {
    let text = escape_text(&collapse_whitespace(raw));
    if at_line_start(out) {
        let body = text.trim_start_matches(' ');
        let lead = &text[..text.len() - body.len()];
        append(out, &format!("{}{}", lead, escape_line_start(body)));
    } else {
        append(out, &text);
    }
}

fn at_line_start(out: &str) -> bool {
    let trimmed = out.trim_end_matches(' ');
    trimmed.is_empty() || trimmed.ends_with('\n')
}

/// End the current inline run with a blank line
fn push_block_break(out: &mut String) {
    let kept = out.trim_end_matches(' ').len();
    out.truncate(kept);
    if out.is_empty() || out.ends_with("\n\n") {
        return;
    }
    out.push_str(if out.ends_with('\n') { "\n" } else { "\n\n" });
}

/// Append inline text without doubling the space at the seam
fn append(out: &mut String, piece: &str) {
    if out.is_empty() || out.ends_with(' ') || out.ends_with('\n') {
        out.push_str(piece.trim_start_matches(' '));
    } else {
        out.push_str(piece);
    }
}

fn wrap_emphasis(inner: &str, marker: &str) -> String {
    let core = inner.trim();
    if core.is_empty() {
        return inner.to_string();
    }

    let leading = &inner[..inner.len() - inner.trim_start().len()];
    let trailing = &inner[inner.trim_end().len()..];
    format!("{}{}{}{}{}", leading, marker, core, marker, trailing)
}

fn inline_code(code: &str) -> String {
    if code.is_empty() {
        return String::new();
    }

    let ticks = "`".repeat(inline_code_ticks(code));
    if code.starts_with('`') || code.ends_with('`') {
        format!("{} {} {}", ticks, code, ticks)
    } else {
        format!("{}{}{}", ticks, code, ticks)
    }
}

fn render_pre(pre: ElementRef<'_>) -> String {
    let raw: String = pre.text().collect();
    let code = raw.trim_end_matches('\n');

    let language = std::iter::once(pre)
        .chain(
            pre.children()
                .filter_map(ElementRef::wrap)
                .filter(|child| child.value().name() == "code"),
        )
        .filter_map(|e| e.value().attr("class"))
        .flat_map(str::split_whitespace)
        .find_map(|class| {
            class
                .strip_prefix("language-")
                .or_else(|| class.strip_prefix("lang-"))
        })
        .unwrap_or_default();

    let fence = "`".repeat(fence_length(code, '`'));
    format!("{}{}\n{}\n{}", fence, language, code, fence)
}

fn render_list(
    list: ElementRef<'_>,
    ordered: bool,
    depth: usize,
) -> Result<Vec<String>, ConvertError> {
    let mut index = list
        .value()
        .attr("start")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(1);

    let mut items: Vec<String> = Vec::new();
    for child in list.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "li" => {
                let marker = if ordered {
                    format!("{}.", index)
                } else {
                    "-".to_string()
                };
                index += 1;

                let body = item_body(child_blocks(child, depth + 1)?);
                items.push(list_item(&marker, &body));
            }
            // A list nested directly in a list belongs to the previous item
            "ul" | "ol" => {
                let nested = render_block(child, depth + 1)?.join("\n");
                if nested.is_empty() {
                    continue;
                }
                if let Some(last) = items.last_mut() {
                    let pad = if ordered { "   " } else { "  " };
                    for line in nested.lines() {
                        last.push('\n');
                        if !line.is_empty() {
                            last.push_str(pad);
                            last.push_str(line);
                        }
                    }
                } else {
                    items.push(nested);
                }
            }
            _ => {}
        }
    }

    if items.is_empty() {
        Ok(Vec::new())
    } else {
        Ok(vec![items.join("\n")])
    }
}

/// Paragraphs of an item stay separate; a nested list hugs the text above it
fn item_body(blocks: Vec<Block>) -> String {
    let mut body = String::new();
    for block in blocks {
        if !body.is_empty() {
            body.push_str(if block.list { "\n" } else { "\n\n" });
        }
        body.push_str(&block.text);
    }
    body
}

fn list_item(marker: &str, body: &str) -> String {
    let pad = " ".repeat(marker.len() + 1);
    let mut out = String::from(marker);

    for (i, line) in body.lines().enumerate() {
        if i == 0 {
            out.push(' ');
            out.push_str(line);
        } else {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&pad);
                out.push_str(line);
            }
        }
    }

    out
}

fn render_table(table: ElementRef<'_>, depth: usize) -> Result<Vec<String>, ConvertError> {
    let mut rows: Vec<Vec<String>> = Vec::new();

    for node in table.descendants() {
        let Some(row) = ElementRef::wrap(node) else {
            continue;
        };
        if row.value().name() != "tr" {
            continue;
        }

        let mut cells = Vec::new();
        for cell in row.children().filter_map(ElementRef::wrap) {
            let name = cell.value().name();
            if name == "td" || name == "th" {
                let text = inline_children(cell, depth + 1)?;
                let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                cells.push(text.replace('|', "\\|"));
            }
        }
        rows.push(cells);
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return Ok(Vec::new());
    }

    let format_row = |cells: &[String]| {
        let mut padded: Vec<&str> = cells.iter().map(String::as_str).collect();
        padded.resize(width, "");
        format!("| {} |", padded.join(" | "))
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_row(&rows[0]));
    lines.push(format!("|{}", " --- |".repeat(width)));
    for row in &rows[1..] {
        lines.push(format_row(row));
    }

    Ok(vec![lines.join("\n")])
}

/// Collapse every whitespace run into a single space
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }

    out
}

/// Escape characters that would otherwise start Markdown syntax
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 10);

    for c in text.chars() {
        match c {
            '\\' | '*' | '_' | '`' | '[' | ']' | '<' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

/// Backslash-escape a heading, list or quote marker at the start of a line
fn escape_line_start(text: &str) -> String {
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        let rest = &text[digits..];
        if rest.starts_with('.') || rest.starts_with(')') {
            return format!("{}\\{}", &text[..digits], rest);
        }
        return text.to_string();
    }

    match text.chars().next() {
        Some('#' | '-' | '+' | '>') => format!("\\{}", text),
        _ => text.to_string(),
    }
}

/// Length of the longest run of `c` in `content`
fn longest_run(content: &str, c: char) -> usize {
    content
        .split(|ch| ch != c)
        .map(|run| run.chars().count())
        .max()
        .unwrap_or(0)
}

/// Smallest fence (at least 3) longer than any run of `fence_char` in `content`
fn fence_length(content: &str, fence_char: char) -> usize {
    longest_run(content, fence_char).max(2) + 1
}

/// Backticks needed to delimit `content` as inline code
fn inline_code_ticks(content: &str) -> usize {
    longest_run(content, '`') + 1
}
