//! Notes are stored as sanitised HTML and edited as markdown.

use std::collections::{HashMap, HashSet};

const PREVIEW_CHARS: usize = 80;

#[must_use]
pub fn markdown_to_html(input: &str) -> String {
    let mut options = pulldown_cmark::Options::empty();
    options.insert(pulldown_cmark::Options::ENABLE_STRIKETHROUGH);
    options.insert(pulldown_cmark::Options::ENABLE_TABLES);
    options.insert(pulldown_cmark::Options::ENABLE_TASKLISTS);

    let parser = pulldown_cmark::Parser::new_ext(input, options);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    sanitize_html(&html)
}

#[must_use]
pub fn html_to_markdown(input: &str) -> String {
    normalize_markdown(&html2md::parse_html(input))
}

/// Allow-list used for notes and for catalog rich text.
#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let tags: HashSet<&str> = [
        "p", "div", "span", "br", "em", "strong", "b", "i", "u", "s", "del", "code", "pre",
        "blockquote", "ul", "ol", "li", "a", "h1", "h2", "h3", "h4", "table", "thead", "tbody",
        "tr", "th", "td", "input",
    ]
    .into_iter()
    .collect();

    let mut attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    attributes.insert("a", ["href"].into_iter().collect());
    attributes.insert("input", ["type", "checked", "disabled"].into_iter().collect());

    ammonia::Builder::new()
        .tags(tags)
        .tag_attributes(attributes)
        .clean(html)
        .to_string()
}

#[must_use]
pub fn looks_like_html(input: &str) -> bool {
    let lower = input.trim_start().to_ascii_lowercase();
    let Some(start) = lower.find('<') else {
        return false;
    };
    if !lower[start + 1..].contains('>') {
        return false;
    }

    ["<p", "<div", "<span", "<br", "<ul", "<ol", "<li", "<a ", "<strong", "<em", "<pre", "<h"]
        .iter()
        .any(|tag| lower.contains(tag))
}

#[must_use]
pub fn strip_html_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    let mut tag = String::new();

    for ch in input.chars() {
        match (in_tag, ch) {
            (false, '<') => {
                in_tag = true;
                tag.clear();
            }
            (false, _) => out.push(ch),
            (true, '>') => {
                in_tag = false;
                let name = tag.trim_start_matches('/').to_ascii_lowercase();
                if ["br", "p", "div", "li", "pre", "blockquote", "h", "tr"]
                    .iter()
                    .any(|block| name.starts_with(block))
                {
                    out.push('\n');
                }
            }
            (true, _) => tag.push(ch),
        }
    }

    out.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[must_use]
pub fn normalize_markdown(input: &str) -> String {
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<&str> = Vec::new();
    let mut blank_streak = 0usize;

    for line in normalized.split('\n') {
        let line = line.trim_end_matches([' ', '\t']);
        if line.is_empty() {
            blank_streak += 1;
            if blank_streak > 1 {
                continue;
            }
        } else {
            blank_streak = 0;
        }
        lines.push(line);
    }

    let mut output = lines.join("\n").trim_matches('\n').to_owned();
    if !output.is_empty() {
        output.push('\n');
    }
    output
}

/// Markdown shown in the note editor for a stored blob. Plain-text blobs
/// pass through unchanged.
#[must_use]
pub fn note_for_editing(stored: &str) -> String {
    if looks_like_html(stored) {
        html_to_markdown(stored)
    } else {
        stored.to_owned()
    }
}

/// Blob handed to the progress store. Whitespace-only drafts clear the note.
#[must_use]
pub fn note_for_storage(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        String::new()
    } else {
        markdown_to_html(markdown)
    }
}

/// Single-line plain-text excerpt for the test list tooltip.
#[must_use]
pub fn note_preview(stored: &str) -> String {
    let text = strip_html_tags(stored);
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= PREVIEW_CHARS {
        return collapsed;
    }
    let mut preview: String = collapsed.chars().take(PREVIEW_CHARS).collect();
    preview.push('…');
    preview
}
