//! Image metadata for the detail page and download headers.
//!
//! [`read`] is also the gate for "is this a real image": a missing file, a
//! directory, or bytes that do not parse as a supported format all fail with
//! [`GalleryError::NotAnImage`].
//!
//! ## Sources
//!
//! | Field | Source |
//! |---|---|
//! | width, height | header bytes: `image` for raster formats, root `<svg>` element for SVG |
//! | MIME type | detected format, never the extension |
//! | byte size | filesystem metadata |
//!
//! SVG sizes come from the root element's `width`/`height` when they are
//! absolute lengths, else from the `viewBox`. An SVG that declares neither
//! reports 300×150, the size browsers give a replaced element with no
//! intrinsic dimensions.

use crate::error::GalleryError;
use crate::types::ImageMetadata;
use image::{ImageFormat, ImageReader};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

const RASTER_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::Bmp,
    ImageFormat::WebP,
];

const SVG_MIME: &str = "image/svg+xml";
const SVG_DEFAULT_SIZE: (u32, u32) = (300, 150);

pub fn read(path: &Path) -> Result<ImageMetadata, GalleryError> {
    let not_an_image = || GalleryError::NotAnImage(path.to_path_buf());

    let fs_meta = fs::metadata(path).map_err(|_| not_an_image())?;
    if !fs_meta.is_file() {
        return Err(not_an_image());
    }

    let ((width_px, height_px), mime_type) = match raster_header(path) {
        Some(found) => found,
        None => svg_header(path)
            .map(|dims| (dims, SVG_MIME.to_string()))
            .ok_or_else(not_an_image)?,
    };

    Ok(ImageMetadata {
        width_px,
        height_px,
        byte_size: fs_meta.len(),
        mime_type,
    })
}

/// Sniff a raster format from magic bytes and decode just the header.
fn raster_header(path: &Path) -> Option<((u32, u32), String)> {
    let reader = ImageReader::open(path).ok()?.with_guessed_format().ok()?;
    let format = reader.format().filter(|f| RASTER_FORMATS.contains(f))?;
    let dims = reader.into_dimensions().ok()?;
    Some((dims, format.to_mime_type().to_string()))
}

/// Parse the root element of an SVG document.
///
/// Returns `None` if the first element is not `<svg>` or the XML before it
/// is malformed.
fn svg_header(path: &Path) -> Option<(u32, u32)> {
    let file = File::open(path).ok()?;
    let mut reader = Reader::from_reader(BufReader::new(file));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).ok()? {
            Event::Start(e) | Event::Empty(e) => {
                if e.local_name().as_ref() != b"svg" {
                    return None;
                }
                return Some(svg_dimensions(&e));
            }
            Event::Eof => return None,
            // Text before the root element means this is not an XML document
            Event::Text(t) if !t.is_empty() => return None,
            _ => {}
        }
        buf.clear();
    }
}

fn svg_dimensions(root: &BytesStart<'_>) -> (u32, u32) {
    let mut width = None;
    let mut height = None;
    let mut view_box = None;

    for attr in root.attributes().flatten() {
        let Ok(value) = attr.unescape_value() else {
            continue;
        };
        match attr.key.local_name().as_ref() {
            b"width" => width = parse_length(&value),
            b"height" => height = parse_length(&value),
            b"viewBox" => view_box = parse_view_box(&value),
            _ => {}
        }
    }

    match (width, height, view_box) {
        (Some(w), Some(h), _) => (w, h),
        (Some(w), None, Some((vw, vh))) if vw > 0.0 => (w, (w as f64 * vh / vw).round() as u32),
        (None, Some(h), Some((vw, vh))) if vh > 0.0 => ((h as f64 * vw / vh).round() as u32, h),
        (_, _, Some((vw, vh))) => (vw.round() as u32, vh.round() as u32),
        _ => SVG_DEFAULT_SIZE,
    }
}

/// Absolute SVG length in CSS pixels. Relative units (`%`, `em`) yield `None`.
fn parse_length(value: &str) -> Option<u32> {
    let value = value.trim();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: f64 = number.parse().ok()?;
    let px_per_unit = match unit.trim() {
        "" | "px" => 1.0,
        "pt" => 96.0 / 72.0,
        "pc" => 16.0,
        "in" => 96.0,
        "cm" => 96.0 / 2.54,
        "mm" => 96.0 / 25.4,
        _ => return None,
    };
    let px = number * px_per_unit;
    (px.is_finite() && px > 0.0).then(|| px.round() as u32)
}

fn parse_view_box(value: &str) -> Option<(f64, f64)> {
    let parts: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [_, _, w, h] if *w >= 0.0 && *h >= 0.0 => Some((*w, *h)),
        _ => None,
    }
}

/// Format a byte count as kibibytes with two decimals and thousands
/// separators: `1_264_640` → `"1,235.00 KB"`.
pub fn format_kib(bytes: u64) -> String {
    let hundredths = (bytes as f64 / 1024.0 * 100.0).round() as u64;
    let whole = hundredths / 100;
    let frac = hundredths % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{grouped}.{frac:02} KB")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn png_dimensions_and_mime() {
        let tmp = TempDir::new().unwrap();
        let path = write_image(tmp.path(), "a.png", 12, 7, ImageFormat::Png);

        let meta = read(&path).unwrap();
        assert_eq!((meta.width_px, meta.height_px), (12, 7));
        assert_eq!(meta.mime_type, "image/png");
        assert_eq!(meta.byte_size, fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn jpeg_gif_bmp_webp_detected() {
        let tmp = TempDir::new().unwrap();
        let cases = [
            ("a.jpg", ImageFormat::Jpeg, "image/jpeg"),
            ("b.gif", ImageFormat::Gif, "image/gif"),
            ("c.bmp", ImageFormat::Bmp, "image/bmp"),
            ("d.webp", ImageFormat::WebP, "image/webp"),
        ];
        for (name, format, mime) in cases {
            let path = write_image(tmp.path(), name, 9, 5, format);
            let meta = read(&path).unwrap();
            assert_eq!((meta.width_px, meta.height_px), (9, 5), "{name}");
            assert_eq!(meta.mime_type, mime, "{name}");
        }
    }

    #[test]
    fn mime_comes_from_content_not_extension() {
        let tmp = TempDir::new().unwrap();
        let path = write_image(tmp.path(), "actually-png.jpg", 3, 3, ImageFormat::Png);
        assert_eq!(read(&path).unwrap().mime_type, "image/png");
    }

    #[test]
    fn text_file_is_not_an_image() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fake.jpg");
        fs::write(&path, "definitely not a jpeg").unwrap();
        assert!(matches!(read(&path), Err(GalleryError::NotAnImage(_))));
    }

    #[test]
    fn missing_file_is_not_an_image() {
        let tmp = TempDir::new().unwrap();
        let result = read(&tmp.path().join("gone.png"));
        assert!(matches!(result, Err(GalleryError::NotAnImage(_))));
    }

    #[test]
    fn directory_is_not_an_image() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("dir.png");
        fs::create_dir(&dir).unwrap();
        assert!(matches!(read(&dir), Err(GalleryError::NotAnImage(_))));
    }

    #[test]
    fn svg_with_width_and_height() {
        let tmp = TempDir::new().unwrap();
        let path = write_svg(
            tmp.path(),
            "logo.svg",
            r#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" width="120" height="80px"></svg>"#,
        );
        let meta = read(&path).unwrap();
        assert_eq!((meta.width_px, meta.height_px), (120, 80));
        assert_eq!(meta.mime_type, "image/svg+xml");
    }

    #[test]
    fn svg_falls_back_to_view_box() {
        let tmp = TempDir::new().unwrap();
        let path = write_svg(
            tmp.path(),
            "icon.svg",
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="100%" viewBox="0 0 64 32"/>"#,
        );
        let meta = read(&path).unwrap();
        assert_eq!((meta.width_px, meta.height_px), (64, 32));
    }

    #[test]
    fn svg_scales_missing_side_from_view_box() {
        let tmp = TempDir::new().unwrap();
        let path = write_svg(
            tmp.path(),
            "wide.svg",
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" viewBox="0,0,100,50"></svg>"#,
        );
        let meta = read(&path).unwrap();
        assert_eq!((meta.width_px, meta.height_px), (200, 100));
    }

    #[test]
    fn svg_without_size_uses_default() {
        let tmp = TempDir::new().unwrap();
        let path = write_svg(
            tmp.path(),
            "bare.svg",
            r#"<!-- drawn by hand --><svg xmlns="http://www.w3.org/2000/svg"><rect/></svg>"#,
        );
        let meta = read(&path).unwrap();
        assert_eq!((meta.width_px, meta.height_px), SVG_DEFAULT_SIZE);
    }

    #[test]
    fn xml_that_is_not_svg_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_svg(tmp.path(), "feed.svg", "<rss><channel/></rss>");
        assert!(matches!(read(&path), Err(GalleryError::NotAnImage(_))));
    }

    #[test]
    fn length_units() {
        assert_eq!(parse_length("10"), Some(10));
        assert_eq!(parse_length(" 10.4px "), Some(10));
        assert_eq!(parse_length("1in"), Some(96));
        assert_eq!(parse_length("72pt"), Some(96));
        assert_eq!(parse_length("50%"), None);
        assert_eq!(parse_length("2em"), None);
        assert_eq!(parse_length("-5"), None);
        assert_eq!(parse_length("auto"), None);
    }

    #[test]
    fn kib_formatting() {
        assert_eq!(format_kib(0), "0.00 KB");
        assert_eq!(format_kib(512), "0.50 KB");
        assert_eq!(format_kib(1024), "1.00 KB");
        assert_eq!(format_kib(1_264_640), "1,235.00 KB");
        assert_eq!(format_kib(1024 * 1_000_000), "1,000,000.00 KB");
    }
}
