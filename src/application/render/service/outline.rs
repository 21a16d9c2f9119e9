//! Heading outline and `[TOC]` marker expansion.

use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};

use crate::domain::slug::AnchorSlugger;

/// Paragraph content replaced by the generated table of contents.
pub(crate) const TOC_MARKER: &str = "[TOC]";

/// Attribute comrak writes on elements parsed from markdown.
pub(crate) const SOURCEPOS_ATTRIBUTE: &str = "data-sourcepos";
/// Replacement name for the marker when it appears in raw HTML.
pub(crate) const RAW_SOURCEPOS_ATTRIBUTE: &str = "data-raw-sourcepos";

#[derive(Debug, Clone)]
pub(crate) struct HeadingInfo {
    pub(crate) level: u8,
    /// `data-sourcepos` value comrak emits for this heading.
    pub(crate) sourcepos: String,
    pub(crate) slug: String,
    pub(crate) text: String,
}

#[derive(Debug, Default)]
pub(crate) struct Outline {
    pub(crate) headings: Vec<HeadingInfo>,
    pub(crate) toc_markers: usize,
}

impl Outline {
    /// Text of the first heading, used as the document title.
    pub(crate) fn title(&self) -> Option<&str> {
        self.headings
            .iter()
            .map(|heading| heading.text.as_str())
            .find(|text| !text.is_empty())
    }
}

/// Collect every markdown heading with a unique anchor and expand `[TOC]`
/// paragraphs in place. Raw HTML has its `data-sourcepos` attributes renamed
/// so only markdown headings carry the marker into the rendered fragment.
pub(crate) fn build_outline<'a>(root: &'a AstNode<'a>) -> Outline {
    let mut walker = OutlineWalker {
        slugger: AnchorSlugger::new(),
        headings: Vec::new(),
        markers: Vec::new(),
    };
    walker.visit_nodes(root);

    let OutlineWalker {
        headings, markers, ..
    } = walker;

    if !markers.is_empty() {
        let toc_html = render_toc(&headings);
        for node in &markers {
            {
                let mut data = node.data.borrow_mut();
                data.value = NodeValue::HtmlBlock(NodeHtmlBlock {
                    block_type: 0,
                    literal: toc_html.clone(),
                });
            }
            while let Some(child) = node.first_child() {
                child.detach();
            }
        }
    }

    Outline {
        headings,
        toc_markers: markers.len(),
    }
}

struct OutlineWalker<'a> {
    slugger: AnchorSlugger,
    headings: Vec<HeadingInfo>,
    markers: Vec<&'a AstNode<'a>>,
}

impl<'a> OutlineWalker<'a> {
    fn visit_nodes(&mut self, node: &'a AstNode<'a>) {
        if let Some(level) = heading_level(node) {
            let text = collect_inline_text(node);
            let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
            let slug = self.slugger.anchor_or_fallback(&normalized);
            self.headings.push(HeadingInfo {
                level,
                sourcepos: node.data.borrow().sourcepos.to_string(),
                slug,
                text: normalized,
            });
        } else if is_toc_marker(node) {
            self.markers.push(node);
            return;
        } else {
            rename_raw_sourcepos(node);
        }

        let mut child = node.first_child();
        while let Some(next) = child {
            self.visit_nodes(next);
            child = next.next_sibling();
        }
    }
}

fn heading_level(node: &AstNode<'_>) -> Option<u8> {
    let data = node.data.borrow();
    if let NodeValue::Heading(heading) = &data.value {
        Some(heading.level)
    } else {
        None
    }
}

fn rename_raw_sourcepos(node: &AstNode<'_>) {
    let mut data = node.data.borrow_mut();
    let literal = match &mut data.value {
        NodeValue::HtmlBlock(block) => &mut block.literal,
        NodeValue::HtmlInline(literal) => literal,
        _ => return,
    };
    if let Some(renamed) = rename_sourcepos_attribute(literal) {
        *literal = renamed;
    }
}

/// ASCII case-insensitive rename of `data-sourcepos` to
/// [`RAW_SOURCEPOS_ATTRIBUTE`]. `None` when the literal has no marker.
pub(crate) fn rename_sourcepos_attribute(literal: &str) -> Option<String> {
    let lowered = literal.to_ascii_lowercase();
    if !lowered.contains(SOURCEPOS_ATTRIBUTE) {
        return None;
    }

    let mut renamed = String::with_capacity(literal.len() + 4);
    let mut cursor = 0;
    for (start, _) in lowered.match_indices(SOURCEPOS_ATTRIBUTE) {
        renamed.push_str(&literal[cursor..start]);
        renamed.push_str(RAW_SOURCEPOS_ATTRIBUTE);
        cursor = start + SOURCEPOS_ATTRIBUTE.len();
    }
    renamed.push_str(&literal[cursor..]);
    Some(renamed)
}

fn is_toc_marker(node: &AstNode<'_>) -> bool {
    if !matches!(node.data.borrow().value, NodeValue::Paragraph) {
        return false;
    }

    let mut text = String::new();
    let mut child = node.first_child();
    while let Some(next) = child {
        match &next.data.borrow().value {
            NodeValue::Text(literal) => text.push_str(literal),
            _ => return false,
        }
        child = next.next_sibling();
    }

    text.trim() == TOC_MARKER
}

fn collect_inline_text(node: &AstNode<'_>) -> String {
    fn walk(node: &AstNode<'_>, buffer: &mut String) {
        {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Text(text) => buffer.push_str(text),
                NodeValue::Code(code) => buffer.push_str(&code.literal),
                NodeValue::LineBreak | NodeValue::SoftBreak => buffer.push(' '),
                _ => {}
            }
        }
        let mut child = node.first_child();
        while let Some(next) = child {
            walk(next, buffer);
            child = next.next_sibling();
        }
    }

    let mut text = String::new();
    let mut child = node.first_child();
    while let Some(next) = child {
        walk(next, &mut text);
        child = next.next_sibling();
    }
    text
}

/// Nested `<ul>` of heading links. A deeper heading opens a sub-list under the
/// previous entry; a shallower one closes lists until it finds its parent.
pub(crate) fn render_toc(headings: &[HeadingInfo]) -> String {
    let mut html = String::from("<div class=\"toc\">\n<ul>\n");
    let mut open: Vec<u8> = Vec::new();

    for heading in headings {
        match open.last() {
            None => {}
            Some(&top) if heading.level > top => html.push_str("\n<ul>\n"),
            Some(_) => {
                html.push_str("</li>\n");
                open.pop();
                while let Some(&top) = open.last() {
                    if top < heading.level {
                        break;
                    }
                    html.push_str("</ul>\n</li>\n");
                    open.pop();
                }
            }
        }

        html.push_str("<li><a href=\"#");
        html.push_str(&escape_html(&heading.slug));
        html.push_str("\">");
        html.push_str(&escape_html(&heading.text));
        html.push_str("</a>");
        open.push(heading.level);
    }

    while open.pop().is_some() {
        html.push_str("</li>\n");
        if !open.is_empty() {
            html.push_str("</ul>\n");
        }
    }

    html.push_str("</ul>\n</div>\n");
    html
}

pub(crate) fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use comrak::{Arena, format_html, parse_document};

    use crate::application::render::service::config::default_options;

    fn heading(level: u8, slug: &str) -> HeadingInfo {
        HeadingInfo {
            level,
            sourcepos: String::new(),
            slug: slug.to_string(),
            text: slug.to_uppercase(),
        }
    }

    #[test]
    fn toc_nests_deeper_headings_and_closes_shallower_ones() {
        let html = render_toc(&[
            heading(1, "a"),
            heading(2, "b"),
            heading(3, "c"),
            heading(2, "d"),
            heading(1, "e"),
        ]);

        let expected = "<div class=\"toc\">\n<ul>\n\
            <li><a href=\"#a\">A</a>\n<ul>\n\
            <li><a href=\"#b\">B</a>\n<ul>\n\
            <li><a href=\"#c\">C</a></li>\n</ul>\n</li>\n\
            <li><a href=\"#d\">D</a></li>\n</ul>\n</li>\n\
            <li><a href=\"#e\">E</a></li>\n\
            </ul>\n</div>\n";
        assert_eq!(html, expected);
    }

    #[test]
    fn toc_for_document_without_headings_is_an_empty_list() {
        assert_eq!(render_toc(&[]), "<div class=\"toc\">\n<ul>\n</ul>\n</div>\n");
    }

    #[test]
    fn toc_escapes_heading_text() {
        let html = render_toc(&[HeadingInfo {
            level: 2,
            sourcepos: String::new(),
            slug: "q-a".to_string(),
            text: "Q & <A>".to_string(),
        }]);
        assert!(html.contains(">Q &amp; &lt;A&gt;</a>"));
    }

    #[test]
    fn outline_collects_headings_and_expands_marker() {
        let options = default_options();
        let arena = Arena::new();
        let root = parse_document(
            &arena,
            "[TOC]\n\n# Intro\n\n## Usage `cli`\n\n## Usage `cli`\n",
            &options,
        );

        let outline = build_outline(root);
        let slugs: Vec<_> = outline.headings.iter().map(|h| h.slug.as_str()).collect();
        assert_eq!(slugs, ["intro", "usage-cli", "usage-cli-2"]);
        assert_eq!(outline.toc_markers, 1);
        assert_eq!(outline.title(), Some("Intro"));

        let mut html = String::new();
        format_html(root, &options, &mut html).expect("format html");
        assert!(html.contains("<div class=\"toc\">"));
        assert!(html.contains("<a href=\"#usage-cli-2\">Usage cli</a>"));
        assert!(!html.contains("[TOC]"));
    }

    #[test]
    fn marker_inside_other_text_is_left_alone() {
        let options = default_options();
        let arena = Arena::new();
        let root = parse_document(&arena, "See [TOC] below.\n\n# Intro\n", &options);

        let outline = build_outline(root);
        assert_eq!(outline.toc_markers, 0);
    }

    #[test]
    fn headings_record_their_source_positions() {
        let options = default_options();
        let arena = Arena::new();
        let root = parse_document(&arena, "# One\n\ntext\n\n## Two\n", &options);

        let outline = build_outline(root);
        let positions: Vec<_> = outline
            .headings
            .iter()
            .map(|h| h.sourcepos.as_str())
            .collect();
        assert_eq!(positions, ["1:1-1:5", "5:1-5:6"]);
    }

    #[test]
    fn raw_html_markers_are_renamed() {
        assert_eq!(rename_sourcepos_attribute("<p>plain</p>"), None);
        assert_eq!(
            rename_sourcepos_attribute("<h1 DATA-SourcePos=\"1:1\">Raw</h1>").as_deref(),
            Some("<h1 data-raw-sourcepos=\"1:1\">Raw</h1>")
        );

        let options = default_options();
        let arena = Arena::new();
        let root = parse_document(
            &arena,
            "<h1 data-sourcepos=\"3:1-3:5\">Raw</h1>\n\n# One\n\nsee <span data-sourcepos=\"1:1\">x</span>\n",
            &options,
        );
        build_outline(root);

        let mut html = String::new();
        format_html(root, &options, &mut html).expect("format html");
        assert!(html.contains("<h1 data-raw-sourcepos=\"3:1-3:5\">Raw</h1>"));
        assert!(html.contains("<span data-raw-sourcepos=\"1:1\">x</span>"));
    }
}
