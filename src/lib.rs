pub mod config;
pub mod error;
pub mod extractors;
pub mod model;
pub mod pipeline;

use log::debug;
use reqwest::header::{HeaderMap, USER_AGENT};
use std::time::Duration;

pub use crate::config::FetchConfig;
pub use crate::error::ExtractError;
pub use crate::model::Recipe;
pub use crate::pipeline::extract_recipe;

/// Fetch a page and extract the recipe it carries.
///
/// This is the thin caller around [`extract_recipe`]: one GET with a
/// browser-like user agent, no retries. Callers that need their own fetch
/// policy should download the page themselves and call [`extract_recipe`]
/// directly.
pub fn fetch_recipe(url: &str) -> Result<Recipe, ExtractError> {
    fetch_recipe_with_config(url, &FetchConfig::load()?)
}

/// [`fetch_recipe`] with explicit settings instead of the loaded defaults.
pub fn fetch_recipe_with_config(url: &str, config: &FetchConfig) -> Result<Recipe, ExtractError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, config.user_agent.parse()?);

    let body = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .default_headers(headers)
        .build()?
        .get(url)
        .send()?
        .text()?;

    debug!("fetched {} bytes from {url}", body.len());
    extract_recipe(&body)
}
