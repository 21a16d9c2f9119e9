use std::{cell::RefCell, collections::HashMap, rc::Rc};

use lol_html::{RewriteStrSettings, element, rewrite_str};
use tracing::warn;

use crate::application::render::types::RenderError;

use super::outline::{HeadingInfo, SOURCEPOS_ATTRIBUTE};

/// Give every markdown heading the id computed for it in the outline and drop
/// the source position markers that identify markdown-originated elements.
/// Headings are matched on their marker value, each claimed once, so an
/// element without a matching outline entry never shifts later ids.
pub(crate) fn apply_heading_ids(html: &str, headings: &[HeadingInfo]) -> Result<String, RenderError> {
    let pending: HashMap<String, HeadingInfo> = headings
        .iter()
        .map(|heading| (heading.sourcepos.clone(), heading.clone()))
        .collect();
    let pending = Rc::new(RefCell::new(pending));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("[data-sourcepos]", {
                let pending = Rc::clone(&pending);
                move |el| {
                    let marker = el.get_attribute(SOURCEPOS_ATTRIBUTE);
                    el.remove_attribute(SOURCEPOS_ATTRIBUTE);

                    let tag_name = el.tag_name();
                    let Some(level) = heading_tag_level(&tag_name) else {
                        return Ok(());
                    };

                    let Some(info) = marker.and_then(|marker| pending.borrow_mut().remove(&marker))
                    else {
                        warn!(
                            target = "application::render::anchors",
                            tag = %tag_name,
                            "heading without outline entry left without id"
                        );
                        return Ok(());
                    };

                    if info.level != level {
                        warn!(
                            target = "application::render::anchors",
                            expected = info.level,
                            found = level,
                            "heading level mismatch; id not applied"
                        );
                        return Ok(());
                    }

                    el.set_attribute("id", &info.slug)?;
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| RenderError::Document {
        message: err.to_string(),
    })
}

fn heading_tag_level(tag_name: &str) -> Option<u8> {
    match tag_name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(level: u8, sourcepos: &str, slug: &str) -> HeadingInfo {
        HeadingInfo {
            level,
            sourcepos: sourcepos.to_string(),
            slug: slug.to_string(),
            text: slug.to_string(),
        }
    }

    #[test]
    fn assigns_ids_and_strips_markers() {
        let html = "<h1 data-sourcepos=\"1:1-1:7\">Title</h1>\n\
                    <p data-sourcepos=\"3:1-3:4\">Body</p>\n\
                    <h2 data-sourcepos=\"5:1-5:8\">Part</h2>\n";
        let rewritten = apply_heading_ids(
            html,
            &[info(1, "1:1-1:7", "title"), info(2, "5:1-5:8", "part")],
        )
        .expect("rewrite");

        assert!(rewritten.contains("<h1 id=\"title\">Title</h1>"));
        assert!(rewritten.contains("<p>Body</p>"));
        assert!(rewritten.contains("<h2 id=\"part\">Part</h2>"));
        assert!(!rewritten.contains(SOURCEPOS_ATTRIBUTE));
    }

    #[test]
    fn raw_html_headings_do_not_consume_anchors() {
        let html = "<h2>Raw</h2>\n<h2 data-sourcepos=\"3:1-3:9\">Parsed</h2>\n";
        let rewritten =
            apply_heading_ids(html, &[info(2, "3:1-3:9", "parsed")]).expect("rewrite");

        assert!(rewritten.contains("<h2>Raw</h2>"));
        assert!(rewritten.contains("<h2 id=\"parsed\">Parsed</h2>"));
    }

    #[test]
    fn unknown_marker_does_not_shift_later_ids() {
        let html = "<h1 data-sourcepos=\"1:1\">Stray</h1>\n\
                    <h1 data-sourcepos=\"3:1-3:5\">One</h1>\n\
                    <h2 data-sourcepos=\"5:1-5:6\">Two</h2>\n";
        let rewritten = apply_heading_ids(
            html,
            &[info(1, "3:1-3:5", "one"), info(2, "5:1-5:6", "two")],
        )
        .expect("rewrite");

        assert!(rewritten.contains("<h1>Stray</h1>"));
        assert!(rewritten.contains("<h1 id=\"one\">One</h1>"));
        assert!(rewritten.contains("<h2 id=\"two\">Two</h2>"));
    }
}
