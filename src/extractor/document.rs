//! Markup parsing.
//!
//! [`ParsedDocument`] owns the element tree built by html5ever's
//! error-recovering parser: elements with their attributes and ordered
//! children, and text leaves. Unclosed tags and invalid nesting are repaired
//! the way browsers repair them, so any non-blank input yields a document.

use scraper::{ElementRef, Html, Selector, html::Select};
use thiserror::Error;

use crate::extractor::model::collapse_whitespace;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("markup is empty")]
    UnparsableMarkup,
}

pub struct ParsedDocument {
    html: Html,
}

impl ParsedDocument {
    pub fn parse(markup: &str) -> Result<Self, ParseError> {
        if markup.trim().is_empty() {
            return Err(ParseError::UnparsableMarkup);
        }

        Ok(Self {
            html: Html::parse_document(markup),
        })
    }

    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    pub fn select<'a, 'b>(&'a self, selector: &'b Selector) -> Select<'a, 'b> {
        self.html.select(selector)
    }

    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    /// Whitespace-collapsed text of the first element matching `selector`,
    /// if that text is not blank.
    pub fn first_text(&self, selector: &Selector) -> Option<String> {
        self.select_first(selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
    }

    /// First non-blank value of `attr` among elements matching `selector`.
    pub fn first_attr(&self, selector: &Selector, attr: &str) -> Option<String> {
        self.select(selector)
            .filter_map(|element| element.value().attr(attr))
            .map(collapse_whitespace)
            .find(|value| !value.is_empty())
    }
}

/// All descendant text of `element`, whitespace-collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Parse a CSS selector known at compile time.
pub(crate) fn static_selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector must be valid CSS")
}
