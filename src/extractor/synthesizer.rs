use chrono::Utc;
use url::Url;

use crate::extractor::{
    document::ParsedDocument,
    metadata::{
        ArticleMetadata, MAX_TITLE_CHARS, UNKNOWN_AUTHOR, domain_of, extract_metadata,
        fallback_title, title_of,
    },
    model::{ArticleRecord, DegradeCause, ExtractionStatus, TagSet, truncate_chars},
};

pub const EXCERPT_CHARS: usize = 200;
pub const ELLIPSIS: &str = "...";
pub const DEGRADED_TAGS: [&str; 2] = ["Manual", "Error"];

/// What the caller asked for on top of the extracted data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerOverrides {
    title: Option<String>,
    tags: TagSet,
}

impl CallerOverrides {
    /// Blank titles are dropped; tags are parsed from a comma-delimited list.
    pub fn new(title: Option<&str>, tags: Option<&str>) -> Self {
        Self {
            title: title
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            tags: tags.map(TagSet::from_csv).unwrap_or_default(),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    fn resolve_title(&self, extracted: String) -> String {
        let title = self.title.clone().unwrap_or(extracted);
        truncate_chars(&title, MAX_TITLE_CHARS)
    }
}

/// Record for a page whose content was located.
pub fn synthesize(
    content: String,
    metadata: ArticleMetadata,
    source_url: &str,
    overrides: &CallerOverrides,
) -> ArticleRecord {
    ArticleRecord {
        title: overrides.resolve_title(metadata.title),
        excerpt: excerpt_of(&content),
        content,
        author: metadata.author,
        domain: metadata.domain,
        url: source_url.to_string(),
        read_time_minutes: metadata.read_time_minutes,
        tags: metadata.tags.union(overrides.tags()).into_vec(),
        word_count: metadata.word_count,
        date_added: Utc::now(),
        status: ExtractionStatus::Extracted,
    }
}

/// Record carrying the explanatory placeholder instead of page content.
///
/// Used whenever retrieval or content location fails; the caller still gets
/// a complete, clearly labeled article it can store and display.
pub fn synthesize_degraded(
    cause: DegradeCause,
    document: Option<&ParsedDocument>,
    target: &Url,
    source_url: &str,
    overrides: &CallerOverrides,
) -> ArticleRecord {
    let domain = domain_of(target);
    let content = placeholder_content(&domain, source_url);
    let title = document
        .and_then(title_of)
        .unwrap_or_else(|| fallback_title(&domain));
    ArticleRecord {
        title: overrides.resolve_title(title),
        excerpt: excerpt_of(&content),
        content,
        author: UNKNOWN_AUTHOR.to_string(),
        domain,
        url: source_url.to_string(),
        read_time_minutes: 1,
        tags: DEGRADED_TAGS.iter().map(|t| t.to_string()).collect(),
        word_count: 0,
        date_added: Utc::now(),
        status: ExtractionStatus::Degraded { cause },
    }
}

/// Build the success record from located content, deriving metadata first.
pub fn synthesize_located(
    content: String,
    document: &ParsedDocument,
    target: &Url,
    source_url: &str,
    overrides: &CallerOverrides,
) -> ArticleRecord {
    let metadata = extract_metadata(Some(document), target, &content);
    synthesize(content, metadata, source_url, overrides)
}

pub fn placeholder_content(domain: &str, source_url: &str) -> String {
    format!(
        "Content from {domain} could not be extracted automatically.

This might be because:
- The website blocks automated access
- Content is loaded dynamically with JavaScript
- The website structure is not supported
- The request timed out

Original URL: {source_url}

Please visit the original URL to read the full article."
    )
}

/// `content` itself when short enough, else its first
/// [`EXCERPT_CHARS`] characters followed by [`ELLIPSIS`].
pub fn excerpt_of(content: &str) -> String {
    if content.chars().count() <= EXCERPT_CHARS {
        content.to_string()
    } else {
        format!("{}{ELLIPSIS}", truncate_chars(content, EXCERPT_CHARS))
    }
}
