//! Pixel dimensions and the request bounds applied to resize targets.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest accepted target width, inclusive.
pub const MAX_WIDTH: u32 = 3840;

/// Largest accepted target height, inclusive.
pub const MAX_HEIGHT: u32 = 2160;

/// Width and height of a raster in pixels.
///
/// The `Display` form is the resolution string stored on image records,
/// `"<width>x<height>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Dimensions as measured from a decoded raster. No bounds are applied.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Validate a requested resize target.
    ///
    /// Both sides must be positive; width is capped at [`MAX_WIDTH`] and
    /// height at [`MAX_HEIGHT`].
    pub fn target(width: i64, height: i64) -> Result<Self> {
        if width <= 0 || width > i64::from(MAX_WIDTH) {
            return Err(Error::validation(format!(
                "weight is not in range [1-{MAX_WIDTH}]"
            )));
        }
        if height <= 0 || height > i64::from(MAX_HEIGHT) {
            return Err(Error::validation(format!(
                "height is not in range [1-{MAX_HEIGHT}]"
            )));
        }
        Ok(Self::new(width as u32, height as u32))
    }

    /// Parse and validate a resize target from raw query values.
    ///
    /// Missing and non-integer values are rejected with the parameter name in
    /// the message.
    pub fn parse_target(width: Option<&str>, height: Option<&str>) -> Result<Self> {
        let width = parse_param("weight", width)?;
        let height = parse_param("height", height)?;
        Self::target(width, height)
    }

    /// Resolution string, `"<width>x<height>"`.
    pub fn resolution(&self) -> String {
        self.to_string()
    }
}

fn parse_param(name: &str, raw: Option<&str>) -> Result<i64> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::validation(format!("missing {name} param")))?
        .parse::<i64>()
        .map_err(|_| Error::validation(format!("invalid {name} param")))
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
