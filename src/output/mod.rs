//! Helpers for rendering command results for humans and machines

pub mod preview;

pub use preview::{DEFAULT_PREVIEW_COLUMNS, render_preview};

use crate::download::SavedFile;
use crate::qr::GeneratedQr;
use crate::theme::Theme;
use serde_json::{Value, json};

/// Combined structured and human-readable representation of a result
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Structured JSON representation suitable for downstream consumers
    pub json: Value,
    /// Human-readable lines for terminal presentation
    pub human: Vec<String>,
}

/// Render a generated QR image, optionally with a terminal preview.
///
/// A preview that cannot be drawn is reported inline; the result itself is
/// still valid.
pub fn render_generation(qr: &GeneratedQr, preview: Option<Theme>) -> Rendered {
    let json = json!({
        "url": qr.url,
        "text": qr.text,
        "size": qr.size,
        "dimension": qr.size.dimension(),
        "error_correction": qr.error_correction,
        "content_type": qr.content_type,
        "byte_length": qr.image.len(),
        "suggested_filename": qr.suggested_filename(),
    });

    let mut human = Vec::new();
    if let Some(theme) = preview {
        match render_preview(&qr.image, theme, DEFAULT_PREVIEW_COLUMNS) {
            Ok(lines) => {
                human.extend(lines);
                human.push(String::new());
            }
            Err(err) => {
                tracing::debug!(error = %err, "Preview unavailable");
                human.push(format!("(preview unavailable: {err})"));
            }
        }
    }

    human.push("QR code generated".to_string());
    human.push(format!("  Text: {}", format_text_snippet(&qr.text)));
    human.push(format!("  Size: {}", qr.size.label()));
    human.push(format!(
        "  Error correction: {}",
        qr.error_correction.label()
    ));
    human.push(format!("  Image: {}", format_image_summary(qr)));
    human.push(format!("  URL: {}", qr.url));

    Rendered { json, human }
}

/// Render a completed download.
pub fn render_download(saved: &SavedFile) -> Rendered {
    let json = json!({
        "path": saved.path.display().to_string(),
        "byte_length": saved.byte_length,
        "content_type": saved.content_type,
    });

    let human = vec![format!(
        "Saved {} ({} bytes, {})",
        saved.path.display(),
        saved.byte_length,
        saved.content_type
    )];

    Rendered { json, human }
}

/// Render a user-facing error message.
pub fn render_error(message: &str) -> Rendered {
    Rendered {
        json: json!({ "error": message }),
        human: vec![format!("Error: {message}")],
    }
}

fn format_image_summary(qr: &GeneratedQr) -> String {
    match qr.content_type.as_deref() {
        Some(kind) => format!("{} bytes ({kind})", qr.image.len()),
        None => format!("{} bytes", qr.image.len()),
    }
}

fn format_text_snippet(text: &str) -> String {
    const MAX: usize = 120;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let snippet: String = text.chars().take(MAX).collect();
        let total = text.chars().count();
        format!("{}... ({} chars)", snippet, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::{ErrorCorrection, QrSize};
    use bytes::Bytes;
    use std::path::PathBuf;

    fn generated(text: &str) -> GeneratedQr {
        GeneratedQr {
            url: "https://api.qrserver.com/v1/create-qr-code/?data=x&size=200x200&ecc=Q"
                .to_string(),
            text: text.to_string(),
            size: QrSize::Small,
            error_correction: ErrorCorrection::Q,
            image: Bytes::from_static(b"not an image"),
            content_type: Some("image/png".to_string()),
        }
    }

    #[test]
    fn renders_generation_consistently() {
        let rendered = render_generation(&generated("x"), None);

        assert_eq!(rendered.json["size"], "small");
        assert_eq!(rendered.json["dimension"], 200);
        assert_eq!(rendered.json["error_correction"], "Q");
        assert_eq!(rendered.json["suggested_filename"], "qrcode-x.png");
        assert!(rendered.human.iter().any(|l| l == "  Size: Small (200x200)"));
        assert!(
            rendered
                .human
                .iter()
                .any(|l| l == "  Error correction: Quartile (25%)")
        );
        assert!(rendered.human.iter().any(|l| l.contains("12 bytes (image/png)")));
    }

    #[test]
    fn broken_preview_is_reported_inline() {
        let rendered = render_generation(&generated("x"), Some(Theme::Light));
        assert!(rendered.human[0].starts_with("(preview unavailable"));
        assert_eq!(rendered.json["byte_length"], 12);
    }

    #[test]
    fn long_text_is_truncated_for_humans() {
        let text = "a".repeat(130);
        let rendered = render_generation(&generated(&text), None);
        assert!(rendered.human.iter().any(|l| l.ends_with("... (130 chars)")));
        assert_eq!(rendered.json["text"], text);
    }

    #[test]
    fn renders_download_and_error() {
        let saved = SavedFile {
            path: PathBuf::from("out/qrcode-x.png"),
            byte_length: 42,
            content_type: "image/png".to_string(),
        };
        let rendered = render_download(&saved);
        assert_eq!(rendered.json["byte_length"], 42);
        assert_eq!(rendered.human, vec!["Saved out/qrcode-x.png (42 bytes, image/png)"]);

        let rendered = render_error("boom");
        assert_eq!(rendered.json["error"], "boom");
        assert_eq!(rendered.human, vec!["Error: boom"]);
    }
}
