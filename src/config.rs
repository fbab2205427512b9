use serde::{Deserialize, Serialize};

use crate::color::DEFAULT_BACKGROUND;
use crate::error::{RenderError, Result};

/// Settings a host supplies when creating a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub width: u32,
    pub height: u32,
    /// Packed `0x00RRGGBB` clear color.
    pub background: u32,
    pub vsync: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: DEFAULT_BACKGROUND,
            vsync: true,
        }
    }
}

impl RendererConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidGeometry {
                width: self.width,
                height: self.height,
            });
        }
        if self.background >> 24 != 0 {
            log::warn!(
                "background {:#010x} sets the unused top byte; it will be ignored",
                self.background
            );
        }
        Ok(())
    }
}
