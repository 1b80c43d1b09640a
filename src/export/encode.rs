//! Encoding and writing stitched panoramas.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use thiserror::Error;
use tracing::debug;

use crate::stitch::{OutputFormat, StitchOptions};

/// Errors that can occur while encoding or writing a panorama.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to move panorama into place at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Encodes `image` into `writer` using the format and quality in `options`.
pub fn encode_to<W: Write>(image: &RgbImage, options: &StitchOptions, writer: W) -> Result<(), ExportError> {
    let (width, height) = image.dimensions();
    match options.format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(writer, options.jpeg_quality());
            encoder.write_image(image.as_raw(), width, height, ExtendedColorType::Rgb8)?;
        }
        OutputFormat::Png => {
            let encoder = PngEncoder::new_with_quality(writer, CompressionType::Default, FilterType::Adaptive);
            encoder.write_image(image.as_raw(), width, height, ExtendedColorType::Rgb8)?;
        }
    }
    Ok(())
}

/// Encodes `image` into an in-memory buffer.
pub fn encode_equirect(image: &RgbImage, options: &StitchOptions) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    encode_to(image, options, &mut bytes)?;
    Ok(bytes)
}

/// Writes `image` to `path`, creating parent directories as needed.
///
/// The panorama is encoded into a temporary file next to `path` and renamed
/// over it once complete, so `path` never holds a partially written image.
/// If anything fails the temporary file is removed.
pub fn write_equirect(image: &RgbImage, path: &Path, options: &StitchOptions) -> Result<(), ExportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".cubestitch-")
        .suffix(".partial")
        .tempfile_in(dir)?;
    debug!(tmp = %tmp.path().display(), "encoding panorama");

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        encode_to(image, options, &mut writer)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;

    tmp.persist(path).map_err(|e| ExportError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    debug!(path = %path.display(), "panorama written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::tempdir;

    fn panorama(color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(64, 32, Rgb(color))
    }

    fn png_options() -> StitchOptions {
        StitchOptions {
            format: OutputFormat::Png,
            ..StitchOptions::with_width(64)
        }
    }

    #[test]
    fn test_encode_magic_bytes() {
        let image = panorama([10, 20, 30]);
        let jpeg = encode_equirect(&image, &StitchOptions::with_width(64)).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let png = encode_equirect(&image, &png_options()).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_write_jpeg_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output").join("trueview_stitched").join("scan_stitched.jpg");

        write_equirect(&panorama([0, 0, 255]), &path, &StitchOptions::with_width(64)).unwrap();

        let decoded = image::open(&path).unwrap().into_rgb8();
        assert_eq!(decoded.dimensions(), (64, 32));
        let px = decoded.get_pixel(32, 16).0;
        assert!(px[0] < 16 && px[1] < 16 && px[2] > 239, "got {:?}", px);
    }

    #[test]
    fn test_write_png_is_lossless_and_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pano.png");

        write_equirect(&panorama([1, 2, 3]), &path, &png_options()).unwrap();
        write_equirect(&panorama([200, 100, 50]), &path, &png_options()).unwrap();

        let decoded = image::open(&path).unwrap().into_rgb8();
        assert!(decoded.pixels().all(|p| p.0 == [200, 100, 50]));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("pano.png")]);
    }

    #[test]
    fn test_failed_write_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        // A directory squats on the destination name, so the final rename fails.
        let path = dir.path().join("blocked.jpg");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();

        let result = write_equirect(&panorama([9, 9, 9]), &path, &StitchOptions::with_width(64));
        assert!(matches!(result, Err(ExportError::Persist { .. })), "got {:?}", result);

        assert!(path.is_dir());
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("blocked.jpg")]);
    }
}
