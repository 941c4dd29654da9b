//! HTTP client for decorative animation assets.

use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::animation::Animation;

/// Animation shown beside the About text.
pub const DEFAULT_ANIMATION_URL: &str = "https://assets5.lottiefiles.com/packages/lf20_5njp3vgg.json";

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}")]
    Server { status: u16 },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fetches animation descriptors. Failures never reach the views.
pub struct AssetClient {
    client: reqwest::Client,
}

impl AssetClient {
    /// Create a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, AssetError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Fetch and parse the animation at `url`. Any non-success status is an error.
    pub async fn fetch(&self, url: &str) -> Result<Animation, AssetError> {
        info!(url = %url, "fetching animation");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AssetError::Server {
                status: status.as_u16(),
            });
        }
        let bytes = resp.bytes().await?;
        Ok(Animation::from_slice(&bytes)?)
    }

    /// Like [`AssetClient::fetch`], but a failure just means no animation.
    pub async fn fetch_optional(&self, url: &str) -> Option<Animation> {
        match self.fetch(url).await {
            Ok(anim) => Some(anim),
            Err(e) => {
                warn!(url = %url, error = %e, "decoration fetch failed, continuing without animation");
                None
            }
        }
    }
}
