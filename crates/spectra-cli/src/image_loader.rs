//! Image loading for the headless driver.

use std::path::Path;

use spectra_core::image::SpatialImage;

/// Load an image from disk as 8-bit RGB.
///
/// Any format the `image` crate decodes is accepted. Alpha is dropped and
/// higher bit depths are quantized to 8 bits per channel.
pub fn load_image(path: &Path) -> Result<SpatialImage, ImageLoadError> {
    if !path.exists() {
        return Err(ImageLoadError::NotFound(path.display().to_string()));
    }
    let img = image::open(path).map_err(ImageLoadError::Decode)?;
    let rgb = img.to_rgb8();
    tracing::debug!(
        "decoded {} as {:?}, {}x{}",
        path.display(),
        img.color(),
        rgb.width(),
        rgb.height()
    );
    Ok(SpatialImage::from_rgb8(&rgb))
}

/// Errors that can occur during image loading.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("input file not found: {0}")]
    NotFound(String),
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_reported() {
        let err = load_image(Path::new("/nonexistent/spectra/input.png")).unwrap_err();
        assert!(matches!(err, ImageLoadError::NotFound(_)));
    }

    #[test]
    fn test_png_loads_as_rgb() {
        let dir = std::env::temp_dir().join(format!("spectra-load-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("input.png");

        let mut src = image::RgbaImage::new(3, 2);
        src.put_pixel(2, 1, image::Rgba([10, 20, 30, 0]));
        src.save(&path).unwrap();

        let img = load_image(&path).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(img.get(2, 1), [10.0, 20.0, 30.0]);
        std::fs::remove_dir_all(&dir).ok();
    }
}
