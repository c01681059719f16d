//! Main-content location.
//!
//! The heuristic is an ordered list of [`ContentRule`]s. Each rule pairs a
//! selector with a text transform; the first rule whose first match yields at
//! least [`MIN_CONTENT_CHARS`] of text wins. Failing that, paragraph text is
//! aggregated across the whole document.

use scraper::{ElementRef, Selector};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

use crate::extractor::{
    document::{ParsedDocument, static_selector},
    model::collapse_whitespace,
};

/// A rule-based candidate is accepted outright at this length.
pub const MIN_CONTENT_CHARS: usize = 200;
/// Paragraphs at or below this length are ignored by the fallback.
pub const MIN_PARAGRAPH_CHARS: usize = 20;
/// Below this length nothing usable was found.
pub const MIN_VIABLE_CONTENT_CHARS: usize = 100;
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

const STANDARD_RULES: &[(&str, &str)] = &[
    ("article", "article"),
    ("content-class", r#"[class*="content"]"#),
    ("post-class", r#"[class*="post"]"#),
    ("article-class", r#"[class*="article"]"#),
    ("main", "main"),
    ("entry-content", ".entry-content"),
    ("post-content", ".post-content"),
    ("article-content", ".article-content"),
];

static NOISE: LazyLock<Selector> = LazyLock::new(|| {
    static_selector(
        "script, style, noscript, iframe, nav, header, footer, aside, .ad, .advertisement",
    )
});

static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| static_selector("p"));

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure",
    "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "table",
    "td", "th", "tr", "ul",
];

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no content found")]
pub struct NoContentFound;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid content selector `{css}`: {reason}")]
pub struct InvalidRule {
    pub css: String,
    pub reason: String,
}

pub type Transform = fn(ElementRef<'_>) -> String;

/// One step of the content heuristic.
#[derive(Debug, Clone)]
pub struct ContentRule {
    name: &'static str,
    selector: Selector,
    transform: Transform,
}

impl ContentRule {
    pub fn new(name: &'static str, css: &str) -> Result<Self, InvalidRule> {
        let selector = Selector::parse(css).map_err(|e| InvalidRule {
            css: css.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            name,
            selector,
            transform: clean_text,
        })
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    fn apply<'a>(&self, document: &'a ParsedDocument) -> Option<ContentCandidate<'a>> {
        let element = document.select_first(&self.selector)?;
        let text = (self.transform)(element);
        Some(ContentCandidate::new(
            element,
            CandidateOrigin::Rule(self.name),
            text,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOrigin {
    Rule(&'static str),
    Paragraphs,
}

/// Located text together with the subtree it came from.
#[derive(Debug, Clone)]
pub struct ContentCandidate<'a> {
    /// Borrowed from the document; for paragraph aggregation this is the root.
    pub source: ElementRef<'a>,
    pub origin: CandidateOrigin,
    pub text: String,
    /// Length of `text` in characters.
    pub length: usize,
}

impl<'a> ContentCandidate<'a> {
    fn new(source: ElementRef<'a>, origin: CandidateOrigin, text: String) -> Self {
        let length = text.chars().count();
        Self {
            source,
            origin,
            text,
            length,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentLocator {
    rules: Vec<ContentRule>,
    min_content_chars: usize,
    min_paragraph_chars: usize,
    min_viable_chars: usize,
}

impl Default for ContentLocator {
    fn default() -> Self {
        let rules = STANDARD_RULES
            .iter()
            .map(|&(name, css)| ContentRule {
                name,
                selector: static_selector(css),
                transform: clean_text,
            })
            .collect();

        Self::with_rules(rules)
    }
}

impl ContentLocator {
    pub fn with_rules(rules: Vec<ContentRule>) -> Self {
        Self {
            rules,
            min_content_chars: MIN_CONTENT_CHARS,
            min_paragraph_chars: MIN_PARAGRAPH_CHARS,
            min_viable_chars: MIN_VIABLE_CONTENT_CHARS,
        }
    }

    pub fn locate<'a>(
        &self,
        document: &'a ParsedDocument,
    ) -> Result<ContentCandidate<'a>, NoContentFound> {
        let mut best: Option<ContentCandidate<'a>> = None;

        for rule in &self.rules {
            let Some(candidate) = rule.apply(document) else {
                continue;
            };

            if candidate.length >= self.min_content_chars {
                debug!(rule = rule.name, chars = candidate.length, "Content rule accepted");
                return Ok(candidate);
            }

            debug!(rule = rule.name, chars = candidate.length, "Content rule matched but too short");
            if best.as_ref().is_none_or(|b| candidate.length > b.length) {
                best = Some(candidate);
            }
        }

        let best_length = best.as_ref().map_or(0, |b| b.length);
        if let Some(paragraphs) = self.aggregate_paragraphs(document)
            && paragraphs.length > best_length
        {
            debug!(chars = paragraphs.length, "Using paragraph aggregation");
            best = Some(paragraphs);
        }

        best.filter(|candidate| candidate.length >= self.min_viable_chars)
            .ok_or(NoContentFound)
    }

    fn aggregate_paragraphs<'a>(&self, document: &'a ParsedDocument) -> Option<ContentCandidate<'a>> {
        let root = document.root();
        let paragraphs: Vec<String> = document
            .select(&PARAGRAPH)
            .filter(|p| !inside_noise(*p, root))
            .map(|p| collapse_whitespace(&p.text().collect::<String>()))
            .filter(|text| text.chars().count() > self.min_paragraph_chars)
            .collect();

        if paragraphs.is_empty() {
            return None;
        }

        Some(ContentCandidate::new(
            root,
            CandidateOrigin::Paragraphs,
            paragraphs.join(PARAGRAPH_SEPARATOR),
        ))
    }
}

/// Flatten `element` to text, skipping noise subtrees (scripts, navigation,
/// headers, footers, asides, ads) and collapsing whitespace.
pub fn clean_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();

    for node in element.descendants() {
        if let Some(child) = ElementRef::wrap(node) {
            if BLOCK_TAGS.contains(&child.value().name()) {
                text.push(' ');
            }
            continue;
        }

        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let kept = node
            .parent()
            .and_then(ElementRef::wrap)
            .is_none_or(|parent| !inside_noise(parent, element));
        if kept {
            text.push_str(fragment);
        }
    }

    collapse_whitespace(&text)
}

/// Whether `element`, or one of its ancestors below `root`, is noise.
fn inside_noise(element: ElementRef<'_>, root: ElementRef<'_>) -> bool {
    if element == root {
        return false;
    }

    NOISE.matches(&element)
        || element
            .ancestors()
            .take_while(|ancestor| *ancestor != *root)
            .filter_map(ElementRef::wrap)
            .any(|ancestor| NOISE.matches(&ancestor))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_text(sentence: &str, times: usize) -> String {
        vec![sentence; times].join(" ")
    }

    #[test]
    fn test_article_element_wins_and_noise_is_stripped() {
        let body = long_text("The article body carries the actual story text.", 6);
        let html = format!(
            r#"<html><body>
                <nav>Home About Contact</nav>
                <article>
                    <header>Posted in News</header>
                    <p>{body}</p>
                    <script>trackVisit();</script>
                    <aside>Related: other stories</aside>
                </article>
                <footer>Copyright 2024</footer>
            </body></html>"#
        );
        let doc = ParsedDocument::parse(&html).unwrap();

        let candidate = ContentLocator::default().locate(&doc).unwrap();
        assert_eq!(candidate.origin, CandidateOrigin::Rule("article"));
        assert_eq!(candidate.text, body);
        assert_eq!(candidate.source.value().name(), "article");
    }

    #[test]
    fn test_short_rule_match_falls_through_to_next_rule() {
        let body = long_text("Main region text that is long enough to be accepted.", 5);
        let html = format!(
            r#"<body><article>Tiny teaser</article><main><p>{body}</p></main></body>"#
        );
        let doc = ParsedDocument::parse(&html).unwrap();

        let candidate = ContentLocator::default().locate(&doc).unwrap();
        assert_eq!(candidate.origin, CandidateOrigin::Rule("main"));
        assert_eq!(candidate.text, body);
    }

    #[test]
    fn test_class_substring_rule() {
        let body = long_text("Content inside a CMS wrapper div with a content class.", 5);
        let html = format!(r#"<body><div class="site-content-wrapper"><p>{body}</p></div></body>"#);
        let doc = ParsedDocument::parse(&html).unwrap();

        let candidate = ContentLocator::default().locate(&doc).unwrap();
        assert_eq!(candidate.origin, CandidateOrigin::Rule("content-class"));
        assert_eq!(candidate.text, body);
    }

    #[test]
    fn test_paragraph_fallback_in_document_order() {
        let html = r#"<html><body><div id="wrap">
            <p>The first paragraph has more than twenty characters.</p>
            <p>short one</p>
            <p>The second paragraph also clears the length bar.</p>
            <nav><p>Navigation paragraph that should never appear.</p></nav>
            <p>The third paragraph closes out this little page.</p>
        </div></body></html>"#;
        let doc = ParsedDocument::parse(html).unwrap();

        let candidate = ContentLocator::default().locate(&doc).unwrap();
        assert_eq!(candidate.origin, CandidateOrigin::Paragraphs);
        assert_eq!(
            candidate.text,
            "The first paragraph has more than twenty characters.\n\n\
             The second paragraph also clears the length bar.\n\n\
             The third paragraph closes out this little page."
        );
    }

    #[test]
    fn test_paragraph_fallback_skips_header_lede() {
        let html = r#"<html><body>
            <header><p>A lede paragraph placed inside the page header.</p></header>
            <p>The opening body paragraph carries the actual story.</p>
            <p>The closing body paragraph wraps the story up neatly.</p>
            <footer><p>Footer paragraph with copyright and contact info.</p></footer>
        </body></html>"#;
        let doc = ParsedDocument::parse(html).unwrap();

        let candidate = ContentLocator::default().locate(&doc).unwrap();
        assert_eq!(candidate.origin, CandidateOrigin::Paragraphs);
        assert_eq!(
            candidate.text,
            "The opening body paragraph carries the actual story.\n\n\
             The closing body paragraph wraps the story up neatly."
        );
    }

    #[test]
    fn test_paragraphs_beat_short_rule_candidate() {
        let html = r#"<body>
            <main>Just a short main region.</main>
            <p>Paragraph number one sits outside of the main region here.</p>
            <p>Paragraph number two also sits outside of the main region.</p>
        </body>"#;
        let doc = ParsedDocument::parse(html).unwrap();

        let candidate = ContentLocator::default().locate(&doc).unwrap();
        assert_eq!(candidate.origin, CandidateOrigin::Paragraphs);
    }

    #[test]
    fn test_no_content_found() {
        let doc = ParsedDocument::parse(
            r#"<html><body><div id="app"></div><script>render()</script></body></html>"#,
        )
        .unwrap();
        assert_eq!(
            ContentLocator::default().locate(&doc).unwrap_err(),
            NoContentFound
        );
    }

    #[test]
    fn test_block_boundaries_separate_words() {
        let doc = ParsedDocument::parse("<div><h1>Title</h1><p>First</p><p>Second</p></div>")
            .unwrap();
        let div = doc.select_first(&static_selector("div")).unwrap();
        assert_eq!(clean_text(div), "Title First Second");
    }

    #[test]
    fn test_custom_rule_transform() {
        fn shout(element: ElementRef<'_>) -> String {
            clean_text(element).to_uppercase()
        }

        let body = long_text("custom rules can transform their text", 8);
        let html = format!(r#"<body><section id="story">{body}</section></body>"#);
        let doc = ParsedDocument::parse(&html).unwrap();

        let locator = ContentLocator::with_rules(vec![
            ContentRule::new("story", "#story").unwrap().with_transform(shout),
        ]);
        let candidate = locator.locate(&doc).unwrap();
        assert_eq!(candidate.text, body.to_uppercase());
    }

    #[test]
    fn test_invalid_rule_selector() {
        assert!(ContentRule::new("broken", "[[[").is_err());
    }
}
