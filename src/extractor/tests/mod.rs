use mockall::{Sequence, predicate::eq};
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use crate::extractor::{
    ArticleExtractor, Checkpoint, ContentLocator, ContentRule, DegradeCause, ExtractError,
    ExtractRequest, ExtractionStatus,
    locator::MIN_VIABLE_CONTENT_CHARS,
    metadata::{MAX_TITLE_CHARS, UNKNOWN_AUTHOR},
    progress::MockProgressObserver,
};
use crate::relay::{
    AccessibilityProbe, RelayClient, RetrievalError, chain::MockMarkupSource,
};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

fn serving(markup: String) -> MockMarkupSource {
    let mut source = MockMarkupSource::new();
    source
        .expect_retrieve()
        .returning(move |_| Ok(markup.clone()));
    source
}

fn exhausted() -> MockMarkupSource {
    let mut source = MockMarkupSource::new();
    source
        .expect_retrieve()
        .returning(|_| Err(RetrievalError::AllProvidersExhausted { attempts: Vec::new() }));
    source
}

fn extractor(source: MockMarkupSource) -> ArticleExtractor {
    let probe = AccessibilityProbe::new(
        RelayClient::new().expect("Failed to build relay client"),
        None,
        Duration::from_secs(1),
    );
    ArticleExtractor::new(Arc::new(source), probe)
}

#[tokio::test]
async fn test_extract_article() {
    let extractor = extractor(serving(fixture("article.html")));

    let record = extractor
        .extract(&ExtractRequest::new("https://www.example.com/news/offline"))
        .await
        .unwrap();

    assert_eq!(record.status, ExtractionStatus::Extracted);
    assert_eq!(record.title, "Sample Article: Reading the Web Offline");
    assert_eq!(record.author, "Alex Morgan");
    assert_eq!(record.domain, "example.com");
    assert_eq!(record.url, "https://www.example.com/news/offline");
    assert!(record.content.contains("first paragraph"));
    assert!(record.content.contains("second paragraph"));
    for noise in ["Buy one", "trackVisit", "Related:", "World", "Copyright"] {
        assert!(!record.content.contains(noise), "content leaked '{noise}'");
    }
    assert!(record.tags.is_empty());
    assert_eq!(record.word_count, record.content.split_whitespace().count());
}

#[tokio::test]
async fn test_extract_blog_post_with_paragraph_fallback() {
    let extractor = extractor(serving(fixture("blog.html")));

    let record = extractor
        .extract(&ExtractRequest::new("https://blog.example.com/post").with_tags("writing, craft"))
        .await
        .unwrap();

    assert_eq!(record.status, ExtractionStatus::Extracted);
    assert_eq!(record.title, "How to Build Better Software | Tech Blog");
    assert_eq!(record.author, "Jordan Lee");
    assert_eq!(record.domain, "blog.example.com");
    assert_eq!(record.tags, vec!["writing", "craft"]);

    let paragraphs: Vec<&str> = record.content.split("\n\n").collect();
    assert_eq!(paragraphs.len(), 3);
    assert!(paragraphs[0].starts_with("Building better software"));
    assert!(paragraphs[1].starts_with("Key Principles"));
    assert!(paragraphs[2].starts_with("Finally"));
    assert!(!record.content.contains("Short note."));
    assert!(!record.content.contains("Comments are closed"));
}

#[tokio::test]
async fn test_script_rendered_page_degrades() {
    let extractor = extractor(serving(fixture("spa.html")));

    let record = extractor
        .extract(&ExtractRequest::new("https://app.example.com/dashboard"))
        .await
        .unwrap();

    assert_eq!(
        record.status,
        ExtractionStatus::Degraded {
            cause: DegradeCause::NoContentFound
        }
    );
    assert_eq!(record.title, "Dashboard App");
    assert_eq!(record.tags, vec!["Manual", "Error"]);
    assert_eq!(record.author, UNKNOWN_AUTHOR);
    assert!(record.content.contains("https://app.example.com/dashboard"));
}

#[tokio::test]
async fn test_all_relays_failing_degrades() {
    let extractor = extractor(exhausted());

    let record = extractor
        .extract(
            &ExtractRequest::new("https://www.medium.com/@writer/story")
                .with_title("Saved for later")
                .with_tags("queue"),
        )
        .await
        .unwrap();

    assert_eq!(
        record.status,
        ExtractionStatus::Degraded {
            cause: DegradeCause::RelaysExhausted
        }
    );
    assert_eq!(record.title, "Saved for later");
    assert_eq!(record.tags, vec!["Manual", "Error"]);
    assert_eq!(record.domain, "medium.com");
    assert_eq!(record.read_time_minutes, 1);
    assert_eq!(record.word_count, 0);
    assert!(record.content.contains("https://www.medium.com/@writer/story"));
}

#[tokio::test]
async fn test_blank_markup_degrades_as_unparsable() {
    let extractor = extractor(serving(" \n ".repeat(60)));

    let record = extractor
        .extract(&ExtractRequest::new("https://example.com/blank"))
        .await
        .unwrap();

    assert_eq!(
        record.status,
        ExtractionStatus::Degraded {
            cause: DegradeCause::UnparsableMarkup
        }
    );
    assert_eq!(record.title, "Article from example.com");
}

#[tokio::test]
async fn test_malformed_html() {
    let body = "Unclosed tags keep flowing into more text without ever closing. ".repeat(5);
    let html = format!("<html><head><title>Broken</title><body><article><p>{body}<div>More content");
    let extractor = extractor(serving(html));

    let record = extractor
        .extract(&ExtractRequest::new("https://example.com/broken"))
        .await
        .unwrap();

    assert_eq!(record.title, "Broken");
    assert!(record.content.contains("Unclosed tags"));
    assert!(record.content.ends_with("More content"));
}

#[tokio::test]
async fn test_custom_locator_replaces_standard_rules() {
    let story = "The story section is what this site considers the real article. ".repeat(5);
    let sidebar = "An article element that the standard rules would pick up first. ".repeat(5);
    let html = format!(
        r#"<html><head><title>Custom</title></head><body>
            <article>{sidebar}</article>
            <section id="story">{story}</section>
        </body></html>"#
    );
    let locator = ContentLocator::with_rules(vec![
        ContentRule::new("story", "#story").expect("valid selector"),
    ]);
    let extractor = extractor(serving(html)).with_locator(locator);

    let record = extractor
        .extract(&ExtractRequest::new("https://example.com/custom"))
        .await
        .unwrap();

    assert_eq!(record.status, ExtractionStatus::Extracted);
    assert_eq!(record.content, story.trim());
    assert!(!record.content.contains("standard rules"));
}

#[tokio::test]
async fn test_invalid_urls_are_rejected_before_retrieval() {
    let mut source = MockMarkupSource::new();
    source.expect_retrieve().never();
    let extractor = extractor(source);

    for (raw, expected) in [
        (
            "not a url",
            ExtractError::InvalidUrl(url::ParseError::RelativeUrlWithoutBase),
        ),
        ("ftp://example.com/file", ExtractError::UnsupportedScheme("ftp".to_string())),
        ("mailto:someone@example.com", ExtractError::UnsupportedScheme("mailto".to_string())),
    ] {
        let err = extractor.extract(&ExtractRequest::new(raw)).await.unwrap_err();
        assert_eq!(err, expected, "{raw}");
    }
}

#[tokio::test]
async fn test_url_is_trimmed_and_kept_verbatim() {
    let extractor = extractor(serving(fixture("article.html")));

    let record = extractor
        .extract(&ExtractRequest::new("  https://example.com/a?ref=feed \n"))
        .await
        .unwrap();

    assert_eq!(record.url, "https://example.com/a?ref=feed");
}

#[tokio::test]
async fn test_progress_checkpoints_in_order() {
    let extractor = extractor(serving(fixture("article.html")));

    let mut observer = MockProgressObserver::new();
    let mut seq = Sequence::new();
    for checkpoint in [
        Checkpoint::Probing,
        Checkpoint::Retrieving,
        Checkpoint::Parsing,
        Checkpoint::Synthesizing,
    ] {
        observer
            .expect_on_checkpoint()
            .with(eq(checkpoint))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
    }

    let request = ExtractRequest::new("https://example.com/a").with_probe(true);
    let record = extractor
        .extract_with_progress(&request, Some(&observer))
        .await
        .unwrap();
    assert!(!record.is_degraded());
}

#[tokio::test]
async fn test_progress_skips_parsing_when_retrieval_fails() {
    let extractor = extractor(exhausted());

    let mut observer = MockProgressObserver::new();
    let mut seq = Sequence::new();
    for checkpoint in [Checkpoint::Retrieving, Checkpoint::Synthesizing] {
        observer
            .expect_on_checkpoint()
            .with(eq(checkpoint))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
    }

    let request = ExtractRequest::new("https://example.com/a");
    extractor
        .extract_with_progress(&request, Some(&observer))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_closure_observer() {
    let extractor = extractor(serving(fixture("article.html")));
    let seen = std::sync::Mutex::new(Vec::new());
    let observer = |checkpoint: Checkpoint| seen.lock().unwrap().push(checkpoint.percent());

    extractor
        .extract_with_progress(&ExtractRequest::new("https://example.com/a"), Some(&observer))
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![40, 70, 90]);
}

#[tokio::test]
async fn test_record_invariants_hold_for_fixtures() {
    for name in ["article.html", "blog.html", "spa.html"] {
        let extractor = extractor(serving(fixture(name)));
        let record = extractor
            .extract(&ExtractRequest::new("https://example.com/x"))
            .await
            .unwrap();

        assert!(record.content.chars().count() >= MIN_VIABLE_CONTENT_CHARS, "{name}");
        assert!(record.read_time_minutes >= 1, "{name}");
        assert!(record.title.chars().count() <= MAX_TITLE_CHARS, "{name}");
    }
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(
            html in ".*",
            url in "https://[a-z]{1,12}\\.com/[a-z0-9/_-]{0,24}"
        ) {
            let extractor = extractor(serving(html));
            let rt = tokio::runtime::Runtime::new().unwrap();
            let record = rt.block_on(extractor.extract(&ExtractRequest::new(url))).unwrap();

            prop_assert!(record.content.chars().count() >= MIN_VIABLE_CONTENT_CHARS);
            prop_assert!(record.read_time_minutes >= 1);
            prop_assert!(record.title.chars().count() <= MAX_TITLE_CHARS);
        }

        #[test]
        fn test_title_override_always_wins(
            title in "[A-Za-z][A-Za-z ]{0,300}",
        ) {
            let extractor = extractor(serving(fixture("article.html")));
            let rt = tokio::runtime::Runtime::new().unwrap();
            let request = ExtractRequest::new("https://example.com/a").with_title(title.clone());
            let record = rt.block_on(extractor.extract(&request)).unwrap();

            let expected: String = title.trim().chars().take(MAX_TITLE_CHARS).collect();
            prop_assert_eq!(record.title, expected);
        }
    }
}
