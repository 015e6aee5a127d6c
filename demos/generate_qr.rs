//! Render a QR code through the public service and save it to the current directory
//!
//! Usage: cargo run --example generate_qr -- "https://example.com"

use qrgen::output::render_preview;
use qrgen::{
    DirectoryTarget, Downloader, ErrorCorrection, GenerationRequest, QrClient, QrSize, Theme,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let text = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Hello from qrgen!".to_string());

    let client = QrClient::new()?;
    let request = GenerationRequest::new(text, QrSize::Small, ErrorCorrection::Q)?;
    let qr = client.generate(&request).await?;

    for line in render_preview(&qr.image, Theme::Light, 48)? {
        println!("{line}");
    }
    println!("✓ Rendered {} bytes from {}", qr.image.len(), qr.url);

    let downloader = Downloader::new(client, Arc::new(DirectoryTarget::new(".")));
    let saved = downloader
        .save_rendered(&qr, &qr.suggested_filename())
        .await?;
    println!("✓ Saved to {}", saved.path.display());

    Ok(())
}
