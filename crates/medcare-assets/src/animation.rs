//! Lottie animation descriptors.
//!
//! Only the header fields are typed; the layer data is kept as raw JSON for
//! whatever renderer ends up drawing it.

use serde::{Deserialize, Serialize};

/// Header of a Lottie (Bodymovin) JSON animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    #[serde(default, rename = "nm")]
    pub name: Option<String>,
    #[serde(default, rename = "w")]
    pub width: Option<u32>,
    #[serde(default, rename = "h")]
    pub height: Option<u32>,
    #[serde(default, rename = "fr")]
    pub frame_rate: Option<f64>,
    #[serde(default, rename = "ip")]
    pub in_point: Option<f64>,
    #[serde(default, rename = "op")]
    pub out_point: Option<f64>,
    #[serde(default)]
    pub layers: Vec<serde_json::Value>,
}

impl Animation {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Playback length in seconds, when the header has enough to compute it.
    pub fn duration_secs(&self) -> Option<f64> {
        let fr = self.frame_rate.filter(|fr| *fr > 0.0)?;
        Some((self.out_point? - self.in_point.unwrap_or(0.0)) / fr)
    }

    /// One-line description, e.g. `health (200x200, 2.0s, 3 layers)`.
    pub fn summary(&self) -> String {
        let name = self.name.as_deref().unwrap_or("animation");
        let mut parts = Vec::new();
        if let (Some(w), Some(h)) = (self.width, self.height) {
            parts.push(format!("{w}x{h}"));
        }
        if let Some(d) = self.duration_secs() {
            parts.push(format!("{d:.1}s"));
        }
        parts.push(format!("{} layers", self.layers.len()));
        format!("{name} ({})", parts.join(", "))
    }
}
