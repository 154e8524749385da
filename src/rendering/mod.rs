//! Rendering: fonts, geometry, paint ops and the raster surface

pub mod fonts;
pub mod geometry;
pub mod paint;
pub mod raster;

use sha2::{Digest, Sha256};

/// An encoded render result.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    /// Hex SHA-256 of the PNG bytes; stable across runs for identical output.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }
}
