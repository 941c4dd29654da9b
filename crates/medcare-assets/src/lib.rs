//! Decorative assets: Lottie animation descriptors fetched over HTTP.

pub mod animation;
pub use animation::Animation;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{AssetClient, AssetError, DEFAULT_ANIMATION_URL};
