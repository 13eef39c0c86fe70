//! HTML pages for the gallery listing and the single-image view.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating;
//! every interpolated file name is escaped. Pages are pure functions of
//! their inputs: the server gathers data, this module only lays it out.
//!
//! ## Pages
//!
//! - **Gallery** (`/gallery`): thumbnail grid, one anchor per image
//!   (`id` = file name) linking to its detail page, plus the bulk download
//!   button and an optional tip button.
//! - **Detail** (`/image-detail?image=...`): full image, file name,
//!   dimensions, size, MIME type, and previous / download / back / next.

use crate::types::{ImageMetadata, Neighbors};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS: &str = include_str!("../static/style.css");

/// One tile on the gallery page.
#[derive(Debug, Clone)]
pub struct GalleryItem {
    pub name: String,
    /// URL of the thumbnail or original chosen for display.
    pub display_url: String,
}

/// Everything the detail page shows.
#[derive(Debug, Clone)]
pub struct DetailPage<'a> {
    pub name: &'a str,
    pub metadata: &'a ImageMetadata,
    pub neighbors: &'a Neighbors,
}

pub fn detail_url(name: &str) -> String {
    format!("/image-detail?image={}", urlencoding::encode(name))
}

pub fn download_url(name: &str) -> String {
    format!("/download?image={}", urlencoding::encode(name))
}

pub fn image_url(name: &str) -> String {
    format!("/images/{}", urlencoding::encode(name))
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body class=[body_class] {
                div.container {
                    (content)
                }
            }
        }
    }
}

/// A highlighted hint box.
fn tip_box(label: &str, text: &str) -> Markup {
    html! {
        div.tip {
            p { strong { (label) ":" } " " (text) }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the gallery grid.
pub fn render_gallery(title: &str, tip_url: Option<&str>, items: &[GalleryItem]) -> Markup {
    let content = html! {
        h1 { (title) }
        (tip_box("Note", "Click any image to view full size and download options"))
        div.button-container {
            a.button href="/download-all" { "Download All Images" }
            @if let Some(url) = tip_url {
                a.button.tip-button href=(url) target="_blank" rel="noopener" { "Support via Tip" }
            }
        }
        @if items.is_empty() {
            p.empty { "No images yet." }
        }
        div.gallery {
            @for item in items {
                a href=(detail_url(&item.name)) id=(item.name) {
                    img src=(item.display_url) alt=(item.name) loading="lazy";
                    div.filename { (item.name) }
                }
            }
        }
    };

    base_document(title, Some("gallery-view"), content)
}

/// Renders the single-image view.
pub fn render_detail(page: &DetailPage<'_>) -> Markup {
    let meta = page.metadata;
    let back_url = format!("/gallery#{}", urlencoding::encode(page.name));

    let content = html! {
        div.image-detail {
            h1 { "Image Details" }
            (tip_box(
                "iOS Tip",
                "To save this image to your Photos, press and hold on the image and choose \"Save to Photos\"",
            ))
            div.image-container {
                img src=(image_url(page.name)) alt="Full size image";
            }
            div.image-info {
                p { strong { "File Name:" } " " (page.name) }
                p { strong { "Dimensions:" } " " (meta.width_px) "x" (meta.height_px) " pixels" }
                p { strong { "File Size:" } " " (crate::metadata::format_kib(meta.byte_size)) }
                p { strong { "Image Type:" } " " (meta.mime_type) }
            }
            div.actions {
                a.nav-btn.prev-btn href=(detail_url(&page.neighbors.previous)) { "Previous" }
                a.download-btn href=(download_url(page.name)) { "Download Image" }
                a.back-btn href=(back_url) { "Back to Gallery" }
                a.nav-btn.next-btn href=(detail_url(&page.neighbors.next)) { "Next" }
            }
        }
    };

    base_document("Image Detail", Some("detail-view"), content)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, url: &str) -> GalleryItem {
        GalleryItem {
            name: name.to_string(),
            display_url: url.to_string(),
        }
    }

    fn sample_metadata() -> ImageMetadata {
        ImageMetadata {
            width_px: 640,
            height_px: 480,
            byte_size: 2048,
            mime_type: "image/jpeg".to_string(),
        }
    }

    #[test]
    fn base_document_includes_doctype() {
        let html = base_document("T", None, html! { p { "x" } }).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>T</title>"));
    }

    #[test]
    fn gallery_links_each_item_to_detail() {
        let items = vec![
            item("a.jpg", "/thumbnails/a.jpg"),
            item("b.png", "/images/b.png"),
        ];
        let html = render_gallery("File Browser", None, &items).into_string();
        assert!(html.contains(r#"href="/image-detail?image=a.jpg""#));
        assert!(html.contains(r#"src="/thumbnails/a.jpg""#));
        assert!(html.contains(r#"src="/images/b.png""#));
        assert!(html.contains(r#"id="b.png""#));
        assert!(html.contains(r#"href="/download-all""#));
    }

    #[test]
    fn gallery_tip_button_only_when_configured() {
        let without = render_gallery("G", None, &[]).into_string();
        assert!(!without.contains("Support via Tip"));

        let with = render_gallery("G", Some("https://tip.example"), &[]).into_string();
        assert!(with.contains("Support via Tip"));
        assert!(with.contains(r#"href="https://tip.example""#));
    }

    #[test]
    fn gallery_escapes_names() {
        let items = vec![item("<script>.png", "/images/x")];
        let html = render_gallery("G", None, &items).into_string();
        assert!(!html.contains("<script>.png"));
        assert!(html.contains("&lt;script&gt;.png"));
        assert!(html.contains("image=%3Cscript%3E.png"));
    }

    #[test]
    fn detail_shows_metadata() {
        let meta = sample_metadata();
        let neighbors = Neighbors {
            previous: "a.jpg".to_string(),
            next: "c.jpg".to_string(),
        };
        let html = render_detail(&DetailPage {
            name: "b.jpg",
            metadata: &meta,
            neighbors: &neighbors,
        })
        .into_string();

        assert!(html.contains("640x480 pixels"));
        assert!(html.contains("2.00 KB"));
        assert!(html.contains("image/jpeg"));
        assert!(html.contains(r#"src="/images/b.jpg""#));
    }

    #[test]
    fn detail_navigation_links() {
        let meta = sample_metadata();
        let neighbors = Neighbors {
            previous: "y.jpg".to_string(),
            next: "x.jpg".to_string(),
        };
        let html = render_detail(&DetailPage {
            name: "z.jpg",
            metadata: &meta,
            neighbors: &neighbors,
        })
        .into_string();

        assert!(html.contains(r#"href="/image-detail?image=y.jpg""#));
        assert!(html.contains(r#"href="/image-detail?image=x.jpg""#));
        assert!(html.contains(r#"href="/download?image=z.jpg""#));
        assert!(html.contains(r##"href="/gallery#z.jpg""##));
    }

    #[test]
    fn urls_are_percent_encoded() {
        assert_eq!(detail_url("a b&c.jpg"), "/image-detail?image=a%20b%26c.jpg");
        assert_eq!(download_url("ü.png"), "/download?image=%C3%BC.png");
        assert_eq!(image_url("#1.gif"), "/images/%231.gif");
    }
}
