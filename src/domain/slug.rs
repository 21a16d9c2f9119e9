//! Heading anchor slugs.
//!
//! ASCII slugification comes from the `slug` crate; Han characters are first
//! transliterated with `pinyin` so a heading like “基线对齐” still yields a
//! readable anchor (`ji-xian-dui-qi`).

use std::collections::{HashMap, HashSet};

use pinyin::{Pinyin, ToPinyin};
use slug::slugify;
use thiserror::Error;

/// Anchor used when a heading has no sluggable characters at all.
pub const FALLBACK_ANCHOR: &str = "section";

/// Errors that can occur while generating a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
}

/// Derive a base slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let transliterated = transliterate_to_ascii(input);
    let candidate = slugify(&transliterated);

    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Deterministically generate unique anchor slugs within a single document.
///
/// Headings processed in order will receive monotonic suffixes when duplicates
/// occur (e.g. `section`, `section-2`, `section-3`).
#[derive(Default, Debug)]
pub struct AnchorSlugger {
    occurrences: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl AnchorSlugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a unique slug for the heading text. Headings without
    /// sluggable text share the [`FALLBACK_ANCHOR`] base.
    pub fn anchor_or_fallback(&mut self, heading: &str) -> String {
        let base = derive_slug(heading).unwrap_or_else(|_| FALLBACK_ANCHOR.to_string());
        self.claim(base)
    }

    /// Suffixes skip any id already handed out, so a literal `intro-2`
    /// heading never collides with the second `intro`.
    fn claim(&mut self, base: String) -> String {
        let mut count = self.occurrences.get(&base).copied().unwrap_or(0);
        loop {
            count += 1;
            let candidate = if count == 1 {
                base.clone()
            } else {
                format!("{base}-{count}")
            };
            if self.taken.insert(candidate.clone()) {
                self.occurrences.insert(base, count);
                return candidate;
            }
        }
    }
}

fn transliterate_to_ascii(input: &str) -> String {
    let mut output = String::with_capacity(input.len());

    for ch in input.chars() {
        if ch.is_ascii() {
            output.push(ch);
            continue;
        }

        match ch.to_pinyin() {
            Some(py) => append_pinyin(&mut output, py),
            None if ch.is_whitespace() => output.push(' '),
            None => {
                // Left for slugify to filter.
                output.push(ch);
            }
        }
    }

    output
}

fn append_pinyin(buffer: &mut String, pinyin: Pinyin) {
    if !buffer.is_empty() && !buffer.ends_with(' ') {
        buffer.push(' ');
    }
    buffer.push_str(pinyin.plain());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_slug_transliterates_chinese() {
        let slug = derive_slug("Rust 基础教程").expect("slug");
        assert_eq!(slug, "rust-ji-chu-jiao-cheng");
    }

    #[test]
    fn derive_slug_rejects_blank_input() {
        assert_eq!(derive_slug("   "), Err(SlugError::EmptyInput));
    }

    #[test]
    fn anchor_slugger_produces_unique_slugs() {
        let mut slugger = AnchorSlugger::new();

        let first = slugger.anchor_or_fallback("Overview");
        let second = slugger.anchor_or_fallback("Overview");
        let third = slugger.anchor_or_fallback("深入理解");

        assert_eq!(first, "overview");
        assert_eq!(second, "overview-2");
        assert_eq!(third, "shen-ru-li-jie");
    }

    #[test]
    fn fallback_anchor_is_deduplicated_too() {
        let mut slugger = AnchorSlugger::new();

        assert_eq!(slugger.anchor_or_fallback("!!!"), "section");
        assert_eq!(slugger.anchor_or_fallback(""), "section-2");
        assert_eq!(slugger.anchor_or_fallback("Section"), "section-3");
    }

    #[test]
    fn literal_suffixed_heading_does_not_collide() {
        let mut slugger = AnchorSlugger::new();

        assert_eq!(slugger.anchor_or_fallback("A"), "a");
        assert_eq!(slugger.anchor_or_fallback("A-2"), "a-2");
        assert_eq!(slugger.anchor_or_fallback("A"), "a-3");
    }
}
