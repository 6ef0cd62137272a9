use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::toc::{heading_id, parse_heading_line};

const DEFAULT_CODE_LANG: &str = "bash";
const CODE_BLOCK_CLOSE: &str = "</code></pre></div>\n";

fn body_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Renders a document body to an HTML fragment.
///
/// Level-2 and level-3 headings get an `id` anchor derived from their source
/// line with [`heading_id`], the same derivation the table of contents uses.
/// Fenced code blocks are wrapped in a header naming the language. Raw HTML in
/// the body is escaped and shown as text.
pub fn render_body(markdown: &str) -> String {
    let mut events = Vec::new();
    for (event, range) in Parser::new_ext(markdown, body_options()).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading {
                level: level @ (HeadingLevel::H2 | HeadingLevel::H3),
                id: _,
                classes,
                attrs,
            }) => {
                let anchor = anchor_for_heading_source(&markdown[range]);
                events.push(Event::Start(Tag::Heading {
                    level,
                    id: Some(CowStr::from(anchor)),
                    classes,
                    attrs,
                }));
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                events.push(Event::Html(CowStr::from(code_block_open(&kind))));
            }
            Event::End(TagEnd::CodeBlock) => {
                events.push(Event::Html(CowStr::Borrowed(CODE_BLOCK_CLOSE)));
            }
            Event::Code(code) => {
                events.push(Event::InlineHtml(CowStr::from(format!(
                    "<code class=\"inline-code\">{}</code>",
                    escape_html(&code)
                ))));
            }
            Event::Html(raw) | Event::InlineHtml(raw) => events.push(Event::Text(raw)),
            other => events.push(other),
        }
    }

    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    html
}

fn anchor_for_heading_source(source: &str) -> String {
    let line = source.lines().next().unwrap_or_default();
    match parse_heading_line(line) {
        Some((_, text)) => heading_id(text),
        // Setext or indented ATX headings never reach the table of contents.
        None => heading_id(line.trim_start().trim_start_matches('#').trim()),
    }
}

fn code_block_open(kind: &CodeBlockKind<'_>) -> String {
    let lang = match kind {
        CodeBlockKind::Fenced(info) => info
            .split(|c: char| c.is_whitespace() || c == ',')
            .next()
            .map(|l| l.trim_start_matches("language-"))
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_CODE_LANG),
        CodeBlockKind::Indented => DEFAULT_CODE_LANG,
    };
    let lang = escape_html(lang);
    format!(
        "<div class=\"code-block\"><div class=\"code-block-header\">\
<span class=\"code-lang\">{lang}</span>\
<button class=\"code-copy-btn\" type=\"button\">Copy</button></div>\
<pre><code class=\"language-{lang}\">"
    )
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
