//! Everything the views need, built once at startup and then read-only.

use std::time::Duration;

use medcare_ai::ModelGateway;
use medcare_assets::{AssetClient, Animation};
use tracing::warn;

use crate::display::Style;

/// Where the decorative animation comes from. `url: None` disables the fetch.
#[derive(Debug, Clone)]
pub struct AssetConfig {
    pub url: Option<String>,
    pub timeout: Duration,
}

impl AssetConfig {
    /// Fetch the animation, or `None` on any failure.
    pub async fn fetch(&self) -> Option<Animation> {
        let url = self.url.as_deref()?;
        match AssetClient::new(self.timeout) {
            Ok(client) => client.fetch_optional(url).await,
            Err(e) => {
                warn!(error = %e, "could not build asset client, continuing without animation");
                None
            }
        }
    }
}

pub struct AppContext {
    pub gateway: ModelGateway,
    pub animation: Option<Animation>,
    pub style: Style,
}

impl AppContext {
    pub fn new(gateway: ModelGateway, animation: Option<Animation>, style: Style) -> Self {
        Self {
            gateway,
            animation,
            style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_fetch_is_none() {
        let config = AssetConfig {
            url: None,
            timeout: Duration::from_secs(1),
        };
        assert!(config.fetch().await.is_none());
    }

    #[tokio::test]
    async fn unreachable_url_is_none() {
        let addr = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let config = AssetConfig {
            url: Some(format!("http://{addr}/animation.json")),
            timeout: Duration::from_secs(1),
        };
        assert!(config.fetch().await.is_none());
    }
}
