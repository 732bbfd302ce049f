use std::time::Duration;

use crate::foundation::error::{AnimatorError, AnimatorResult};

/// Source of raw tile bytes.
pub trait TileFetcher {
    fn fetch(&self, url: &str) -> AnimatorResult<Vec<u8>>;
}

impl<T: TileFetcher + ?Sized> TileFetcher for Box<T> {
    fn fetch(&self, url: &str) -> AnimatorResult<Vec<u8>> {
        (**self).fetch(url)
    }
}

/// Blocking HTTP(S) fetcher.
#[derive(Clone, Debug)]
pub struct HttpTileFetcher {
    client: reqwest::blocking::Client,
}

impl HttpTileFetcher {
    pub fn new(user_agent: &str) -> AnimatorResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent.to_owned())
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| AnimatorError::validation(format!("http client init failed: {e}")))?;
        Ok(Self { client })
    }
}

impl TileFetcher for HttpTileFetcher {
    fn fetch(&self, url: &str) -> AnimatorResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| AnimatorError::tile_fetch(url, e))?;
        if !response.status().is_success() {
            return Err(AnimatorError::tile_fetch(
                url,
                format!("server returned {}", response.status()),
            ));
        }
        let bytes = response
            .bytes()
            .map_err(|e| AnimatorError::tile_fetch(url, e))?
            .to_vec();
        tracing::debug!(url, bytes = bytes.len(), "tile fetched");
        Ok(bytes)
    }
}
