use crate::error::ImageSourceError;
use image::RgbImage;
use std::fmt;
use std::path::Path;

/// A decoded RGB bitmap picked by the user.
#[derive(Clone, PartialEq)]
pub struct ImageSource {
    pub name: String,
    pub pixels: RgbImage,
}

impl ImageSource {
    pub fn new(name: impl Into<String>, pixels: RgbImage) -> Self {
        Self {
            name: name.into(),
            pixels,
        }
    }

    pub fn open(path: &Path) -> Result<Self, ImageSourceError> {
        let image = image::open(path).map_err(|source| ImageSourceError::Open {
            path: path.display().to_string(),
            source,
        })?;

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, image.to_rgb8()))
    }

    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, ImageSourceError> {
        let name = name.into();
        match image::load_from_memory(bytes) {
            Ok(image) => Ok(Self::new(name, image.to_rgb8())),
            Err(source) => Err(ImageSourceError::Decode { name, source }),
        }
    }

    pub fn height(&self) -> usize {
        self.pixels.height() as usize
    }

    pub fn width(&self) -> usize {
        self.pixels.width() as usize
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageSource({} {}x{})", self.name, self.width(), self.height())
    }
}
