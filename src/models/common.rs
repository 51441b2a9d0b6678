use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StudioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    #[default]
    #[serde(rename = "text2img")]
    TextToImage,
    #[serde(rename = "img2img")]
    ImageToImage,
    Inpaint,
}

impl GenerationMode {
    pub fn requires_source(&self) -> bool {
        !matches!(self, GenerationMode::TextToImage)
    }

    pub fn requires_mask(&self) -> bool {
        matches!(self, GenerationMode::Inpaint)
    }

    pub fn label(&self) -> &'static str {
        match self {
            GenerationMode::TextToImage => "Text to Image",
            GenerationMode::ImageToImage => "Image to Image",
            GenerationMode::Inpaint => "Inpainting",
        }
    }
}

/// Output side length. The service only accepts this fixed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Dimension {
    Px256,
    #[default]
    Px512,
    Px768,
    Px1024,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Px256,
        Dimension::Px512,
        Dimension::Px768,
        Dimension::Px1024,
    ];

    pub fn pixels(&self) -> u32 {
        match self {
            Dimension::Px256 => 256,
            Dimension::Px512 => 512,
            Dimension::Px768 => 768,
            Dimension::Px1024 => 1024,
        }
    }
}

impl TryFrom<u32> for Dimension {
    type Error = StudioError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Dimension::ALL
            .into_iter()
            .find(|d| d.pixels() == value)
            .ok_or_else(|| {
                StudioError::ConfigError(format!(
                    "Unsupported dimension {}px (expected 256, 512, 768 or 1024)",
                    value
                ))
            })
    }
}

impl From<Dimension> for u32 {
    fn from(d: Dimension) -> u32 {
        d.pixels()
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.pixels())
    }
}
