//! Top-level owner of form values, the displayed result and status messages
//!
//! Everything the form shows lives in one [`AppState`] owned by the
//! [`Controller`]. Actions take `&mut self`, so at most one generation and one
//! download can be in flight at a time.

use crate::client::QrClient;
use crate::config::QrgenConfig;
use crate::download::{DirectoryTarget, Downloader, SaveTarget, SavedFile};
use crate::error::{Error, Result};
use crate::metrics::{self, Operation};
use crate::qr::{ErrorCorrection, GeneratedQr, GenerationRequest, QrSize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Values currently entered in the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    /// Text or URL to encode
    pub data: String,
    /// Selected size
    pub size: QrSize,
    /// Selected error correction level
    pub error_correction: ErrorCorrection,
}

/// Everything needed to draw the form and the result panel
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Form inputs
    pub form: FormState,
    /// Result currently on display
    pub current: Option<GeneratedQr>,
    /// A generation is in flight
    pub is_loading: bool,
    /// Message from the last failed generation
    pub error: Option<String>,
    /// A download is in flight
    pub is_downloading: bool,
    /// Message from the last failed download
    pub download_error: Option<String>,
    /// Most recent successful download
    pub last_saved: Option<SavedFile>,
}

/// Drives generate and download actions against [`AppState`]
pub struct Controller {
    state: AppState,
    client: QrClient,
    downloader: Downloader,
    refetch: bool,
}

impl Controller {
    /// Create a controller saving through `target`.
    ///
    /// With `refetch` set, downloads fetch the image URL again; otherwise the
    /// bytes captured during generation are saved directly.
    pub fn new(
        client: QrClient,
        target: Arc<dyn SaveTarget>,
        form: FormState,
        refetch: bool,
    ) -> Self {
        let downloader = Downloader::new(client.clone(), target);
        Self {
            state: AppState {
                form,
                ..AppState::default()
            },
            client,
            downloader,
            refetch,
        }
    }

    /// Create a controller from resolved configuration, saving into
    /// `download.output_dir`.
    pub fn from_config(config: &QrgenConfig) -> Result<Self> {
        let client = QrClient::from_options(&config.service)?;
        let target = Arc::new(DirectoryTarget::new(config.download.output_dir.clone()));
        let form = FormState {
            data: String::new(),
            size: config.ui.size,
            error_correction: config.ui.error_correction,
        };
        Ok(Self::new(client, target, form, config.download.refetch))
    }

    /// Current state snapshot
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Downloader used for save actions
    pub fn downloader(&self) -> &Downloader {
        &self.downloader
    }

    /// Replace the form text
    pub fn set_data(&mut self, data: impl Into<String>) {
        self.state.form.data = data.into();
    }

    /// Change the size selection
    pub fn set_size(&mut self, size: QrSize) {
        self.state.form.size = size;
    }

    /// Change the error correction selection
    pub fn set_error_correction(&mut self, error_correction: ErrorCorrection) {
        self.state.form.error_correction = error_correction;
    }

    /// Whether the generate action is currently available
    pub fn can_generate(&self) -> bool {
        !self.state.is_loading && !self.state.form.data.trim().is_empty()
    }

    /// Render the form's current values.
    ///
    /// On failure the error message is recorded and the previously displayed
    /// result is left untouched.
    pub async fn generate(&mut self) -> Result<&GeneratedQr> {
        self.state.error = None;

        let form = &self.state.form;
        let request =
            match GenerationRequest::new(form.data.clone(), form.size, form.error_correction) {
                Ok(request) => request,
                Err(err) => {
                    self.state.error = Some(err.user_message());
                    return Err(err);
                }
            };

        self.state.is_loading = true;
        let started = Instant::now();
        let outcome = self.client.generate(&request).await;
        self.state.is_loading = false;
        metrics::record(Operation::Generate, started.elapsed(), outcome.is_ok());

        match outcome {
            Ok(generated) => {
                info!(url = %generated.url, bytes = generated.image.len(), "QR code generated");
                self.state.download_error = None;
                let current: &GeneratedQr = self.state.current.insert(generated);
                Ok(current)
            }
            Err(err) => {
                warn!(error = %err, "Generation failed");
                self.state.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Save the displayed result under a filename derived from its text.
    ///
    /// Failures only touch the download message; generation state is kept.
    pub async fn download(&mut self) -> Result<SavedFile> {
        self.state.download_error = None;

        let qr = match self.state.current.clone() {
            Some(qr) => qr,
            None => {
                let err = Error::Download("no QR code has been generated yet".to_string());
                self.state.download_error = Some(err.user_message());
                return Err(err);
            }
        };
        let filename = qr.suggested_filename();

        self.state.is_downloading = true;
        let started = Instant::now();
        let outcome = if self.refetch {
            self.downloader.download(&qr.url, &filename).await
        } else {
            self.downloader.save_rendered(&qr, &filename).await
        };
        self.state.is_downloading = false;
        metrics::record(Operation::Download, started.elapsed(), outcome.is_ok());

        match outcome {
            Ok(saved) => {
                self.state.last_saved = Some(saved.clone());
                Ok(saved)
            }
            Err(err) => {
                warn!(error = %err, "Download failed");
                self.state.download_error = Some(err.user_message());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VALIDATION_MESSAGE;

    fn controller() -> Controller {
        let client = QrClient::new().unwrap();
        let target = Arc::new(DirectoryTarget::new(std::env::temp_dir()));
        Controller::new(client, target, FormState::default(), true)
    }

    #[tokio::test]
    async fn test_blank_text_fails_validation() {
        let mut controller = controller();
        controller.set_data("   ");
        assert!(!controller.can_generate());

        let err = controller.generate().await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(controller.state().error.as_deref(), Some(VALIDATION_MESSAGE));
        assert!(!controller.state().is_loading);
        assert!(controller.state().current.is_none());
    }

    #[tokio::test]
    async fn test_download_without_result() {
        let mut controller = controller();
        let err = controller.download().await.unwrap_err();
        assert!(matches!(err, Error::Download(_)));
        assert!(controller.state().download_error.is_some());
        assert!(controller.state().error.is_none());
        assert_eq!(controller.downloader().store().live_count(), 0);
    }

    #[test]
    fn test_form_setters() {
        let mut controller = controller();
        controller.set_data("hello");
        controller.set_size(QrSize::Large);
        controller.set_error_correction(ErrorCorrection::H);

        let form = &controller.state().form;
        assert_eq!(form.data, "hello");
        assert_eq!(form.size, QrSize::Large);
        assert_eq!(form.error_correction, ErrorCorrection::H);
        assert!(controller.can_generate());
    }
}
