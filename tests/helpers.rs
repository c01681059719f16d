#![allow(dead_code)]

use axum::Router;
use std::time::Duration;
use wiremock::MockServer;

use readrelay::{
    api,
    app_state::AppState,
    config::Config,
    relay::{ChainSettings, RelayChain, RelayClient, RelayProvider},
};

/// Relay on `server` that takes the target as a percent-encoded query value
/// and answers with raw markup.
pub fn raw_relay(server: &MockServer, id: &str) -> RelayProvider {
    RelayProvider::raw_text(id, format!("{}/{id}/raw?u={{url_encoded}}", server.uri()))
}

/// Relay on `server` that wraps the markup in a JSON `contents` field.
pub fn json_relay(server: &MockServer, id: &str) -> RelayProvider {
    RelayProvider::json_wrapped(
        id,
        format!("{}/{id}/get?url={{url_encoded}}", server.uri()),
        "contents",
    )
}

pub fn article_html(title: &str, sentence: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{title}</title></head><body>\
         <nav>Home Archive About</nav>\
         <article><h1>{title}</h1><p>{}</p></article>\
         <footer>Footer links</footer></body></html>",
        vec![sentence; 10].join(" ")
    )
}

pub fn chain(providers: Vec<RelayProvider>, attempt: Duration, budget: Duration) -> RelayChain {
    RelayChain::new(
        RelayClient::new().expect("Failed to build relay client"),
        providers,
        ChainSettings {
            attempt_timeout: attempt,
            retrieval_budget: budget,
            ..ChainSettings::default()
        },
    )
}

pub fn test_config(providers: Vec<RelayProvider>) -> Config {
    Config::default()
        .with_relay_providers(providers)
        .with_timeouts(
            Duration::from_millis(1_000),
            Duration::from_millis(3_000),
            Duration::from_millis(500),
        )
}

pub fn test_app(config: &Config) -> Router {
    let state = AppState::from_config(config).expect("Failed to build app state");
    api::router(state)
}
