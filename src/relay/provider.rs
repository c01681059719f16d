use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use url::Url;

/// Placeholder replaced by the target URL, verbatim.
pub const URL_PLACEHOLDER: &str = "{url}";
/// Placeholder replaced by the target URL, percent-encoded as a query component.
pub const ENCODED_URL_PLACEHOLDER: &str = "{url_encoded}";

const DEFAULT_MARKUP_FIELD: &str = "contents";

// Same reserved set as `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// How a relay wraps the markup it fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnvelopeKind {
    /// The response body is the page markup.
    #[default]
    RawText,
    /// The response body is a JSON object carrying the markup under `field`.
    JsonWrapped {
        #[serde(default = "default_markup_field")]
        field: String,
    },
}

fn default_markup_field() -> String {
    DEFAULT_MARKUP_FIELD.to_string()
}

/// A relay service that fetches a page on our behalf.
///
/// Providers are plain data: the endpoint is a template containing
/// [`URL_PLACEHOLDER`] or [`ENCODED_URL_PLACEHOLDER`], and the envelope kind
/// tells the client how to unwrap the response. A template of exactly
/// `{url}` fetches the target directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayProvider {
    pub id: String,
    pub endpoint_template: String,
    #[serde(default)]
    pub envelope: EnvelopeKind,
}

impl RelayProvider {
    pub fn new(
        id: impl Into<String>,
        endpoint_template: impl Into<String>,
        envelope: EnvelopeKind,
    ) -> Self {
        Self {
            id: id.into(),
            endpoint_template: endpoint_template.into(),
            envelope,
        }
    }

    pub fn raw_text(id: impl Into<String>, endpoint_template: impl Into<String>) -> Self {
        Self::new(id, endpoint_template, EnvelopeKind::RawText)
    }

    pub fn json_wrapped(
        id: impl Into<String>,
        endpoint_template: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            endpoint_template,
            EnvelopeKind::JsonWrapped {
                field: field.into(),
            },
        )
    }

    /// Publicly shared relays. Availability is not guaranteed; operators are
    /// expected to override this list through configuration.
    pub fn public_defaults() -> Vec<Self> {
        vec![
            Self::raw_text("corsproxy", "https://corsproxy.io/?{url}"),
            Self::raw_text("cors-anywhere", "https://cors-anywhere.herokuapp.com/{url}"),
            Self::json_wrapped(
                "allorigins",
                "https://api.allorigins.win/get?url={url_encoded}",
                DEFAULT_MARKUP_FIELD,
            ),
            Self::raw_text("thingproxy", "https://thingproxy.freeboard.io/fetch/{url}"),
        ]
    }

    pub fn has_placeholder(&self) -> bool {
        self.endpoint_template.contains(URL_PLACEHOLDER)
            || self.endpoint_template.contains(ENCODED_URL_PLACEHOLDER)
    }

    /// Render the request URL for `target`.
    pub fn endpoint_for(&self, target: &Url) -> Result<Url, url::ParseError> {
        let encoded = utf8_percent_encode(target.as_str(), URI_COMPONENT).to_string();
        let rendered = self
            .endpoint_template
            .replace(ENCODED_URL_PLACEHOLDER, &encoded)
            .replace(URL_PLACEHOLDER, target.as_str());

        Url::parse(&rendered)
    }
}
