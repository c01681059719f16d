use scraper::Selector;
use std::sync::LazyLock;
use url::Url;

use crate::extractor::{
    document::{ParsedDocument, static_selector},
    model::{TagSet, truncate_chars},
};

pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const MAX_TITLE_CHARS: usize = 200;
pub const WORDS_PER_MINUTE: usize = 200;

static TITLE: LazyLock<Selector> = LazyLock::new(|| static_selector("title"));
static HEADING: LazyLock<Selector> = LazyLock::new(|| static_selector("h1"));
static OG_TITLE: LazyLock<Selector> =
    LazyLock::new(|| static_selector(r#"meta[property="og:title"]"#));
static AUTHOR_REL: LazyLock<Selector> = LazyLock::new(|| static_selector(r#"[rel="author"]"#));
static AUTHOR_CLASS: LazyLock<Selector> =
    LazyLock::new(|| static_selector(r#"[class*="author"]"#));

/// Publishing platforms we recognize by host.
const DOMAIN_TAGS: &[(&str, &[&str])] = &[
    ("medium.com", &["Medium", "Article"]),
    ("dev.to", &["Development", "Programming"]),
    ("github.com", &["GitHub", "Code"]),
    ("wikipedia.org", &["Wikipedia", "Reference"]),
    ("reddit.com", &["Reddit", "Discussion"]),
    ("stackoverflow.com", &["Programming", "Q&A"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleMetadata {
    pub title: String,
    pub author: String,
    pub domain: String,
    pub tags: TagSet,
    pub word_count: usize,
    pub read_time_minutes: u32,
}

/// Derive metadata for `url` from `document` (when one was retrieved) and
/// the final `content` text.
pub fn extract_metadata(
    document: Option<&ParsedDocument>,
    url: &Url,
    content: &str,
) -> ArticleMetadata {
    let domain = domain_of(url);
    let title = document
        .and_then(title_of)
        .unwrap_or_else(|| fallback_title(&domain));
    let author = document
        .and_then(author_of)
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    let word_count = count_words(content);

    ArticleMetadata {
        title: truncate_chars(&title, MAX_TITLE_CHARS),
        author,
        tags: domain_tags(&domain).iter().copied().collect(),
        domain,
        word_count,
        read_time_minutes: read_time_minutes(word_count),
    }
}

/// Host name with one leading `www.` removed.
pub fn domain_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

pub fn fallback_title(domain: &str) -> String {
    format!("Article from {domain}")
}

pub fn title_of(document: &ParsedDocument) -> Option<String> {
    document
        .first_text(&TITLE)
        .or_else(|| document.first_text(&HEADING))
        .or_else(|| document.first_attr(&OG_TITLE, "content"))
}

pub fn author_of(document: &ParsedDocument) -> Option<String> {
    document
        .first_text(&AUTHOR_REL)
        .or_else(|| document.first_text(&AUTHOR_CLASS))
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn read_time_minutes(word_count: usize) -> u32 {
    word_count.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// Tags for a known platform; subdomains (`en.wikipedia.org`) match too.
pub fn domain_tags(domain: &str) -> &'static [&'static str] {
    DOMAIN_TAGS
        .iter()
        .find(|(known, _)| {
            domain == *known
                || domain
                    .strip_suffix(known)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
        .map(|(_, tags)| *tags)
        .unwrap_or_default()
}
