//! Markup stripping.
//!
//! Input is parsed as an HTML fragment and only its text nodes are kept.
//! Raw-text elements such as `<script>` are dropped together with their
//! body. Character references are not decoded: `&amp;` stays `&amp;`.
//!
//! Text from neighbouring nodes can join into something that looks like a
//! tag again (`<<i></i>b` leaves `<` next to `b`). Every run of `<` that
//! directly precedes a tag-opening character is therefore removed from the
//! output, which makes a second pass a no-op.

use scraper::{Html, Node};

/// Elements whose body is never rendered as text.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "textarea", "title",
    "xmp", "noembed", "noframes", "plaintext",
];

/// Strip all markup from `input`, keeping only text content.
pub fn strip_markup(input: &str) -> String {
    if !input.contains('<') {
        return input.to_string();
    }

    let fragment = Html::parse_fragment(&input.replace('&', "&amp;"));
    let mut text = String::with_capacity(input.len());
    let mut stack = vec![fragment.tree.root()];

    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(el) if RAW_TEXT_ELEMENTS.contains(&el.name()) => continue,
            _ => {}
        }
        stack.extend(node.children().rev());
    }

    drop_tag_openers(&text)
}

fn opens_tag(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?')
}

fn drop_tag_openers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = 0;

    for c in text.chars() {
        if c == '<' {
            pending += 1;
            continue;
        }
        if !opens_tag(c) {
            out.extend(std::iter::repeat_n('<', pending));
        }
        pending = 0;
        out.push(c);
    }
    out.extend(std::iter::repeat_n('<', pending));
    out
}
