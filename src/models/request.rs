use serde::{Deserialize, Serialize};

use super::common::Dimension;

/// Seed value that tells the service to pick one itself.
pub const RANDOM_SEED_SENTINEL: i64 = -1;

/// Upper bound (exclusive) for client-drawn random seeds.
pub const RANDOM_SEED_MAX: i64 = 1_000_000;

/// Body of one generation call. `image` and `mask` carry the encoded file
/// bytes and serialize as flat integer arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub num_steps: u32,
    pub guidance: f32,
    pub seed: i64,
    pub width: Dimension,
    pub height: Dimension,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f32>,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: String::new(),
            num_steps: 20,
            guidance: 7.5,
            seed: RANDOM_SEED_SENTINEL,
            width: Dimension::default(),
            height: Dimension::default(),
            image: None,
            mask: None,
            strength: None,
        }
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }
}

/// Raw bytes returned by one generation call.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    pub image_data: Vec<u8>,
    pub content_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_request_omits_image_fields() {
        let request = GenerationRequest::text("a lighthouse at dusk").with_seed(42);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "prompt": "a lighthouse at dusk",
                "negative_prompt": "",
                "num_steps": 20,
                "guidance": 7.5,
                "seed": 42,
                "width": 512,
                "height": 512
            })
        );
    }

    #[test]
    fn test_image_bytes_serialize_as_integer_array() {
        let mut request = GenerationRequest::text("x");
        request.image = Some(vec![137, 80, 78, 71]);
        request.mask = Some(vec![0, 255]);
        request.strength = Some(0.5);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["image"], json!([137, 80, 78, 71]));
        assert_eq!(value["mask"], json!([0, 255]));
        assert_eq!(value["strength"], json!(0.5));
    }
}
