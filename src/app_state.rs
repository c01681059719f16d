use std::sync::Arc;

use crate::{config::Config, extractor::ArticleExtractor};

#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<ArticleExtractor>,
    pub relays: Arc<[String]>,
}

impl AppState {
    pub fn new(extractor: ArticleExtractor, relays: Vec<String>) -> Self {
        Self {
            extractor: Arc::new(extractor),
            relays: relays.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let relays = config
            .relay_providers()
            .iter()
            .map(|provider| provider.id.clone())
            .collect();

        Ok(Self::new(ArticleExtractor::from_config(config)?, relays))
    }
}
