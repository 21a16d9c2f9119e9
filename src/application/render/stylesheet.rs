//! Style sheets embedded into exported documents.
//!
//! The PDF engine (QtWebKit) evaluates neither CSS custom properties nor the
//! media queries a browser export wants, so the print variant spells every
//! colour out literally.

use crate::domain::types::RenderTarget;

const SCREEN_STYLESHEET: &str = include_str!("../../../assets/styles/screen.css");
const PRINT_STYLESHEET: &str = include_str!("../../../assets/styles/print.css");

pub fn stylesheet_for(target: RenderTarget) -> &'static str {
    match target {
        RenderTarget::Html => SCREEN_STYLESHEET,
        RenderTarget::Pdf => PRINT_STYLESHEET,
    }
}
