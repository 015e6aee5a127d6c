//! Render service URL construction

use crate::error::{Error, Result};
use crate::qr::GenerationRequest;
use url::Url;
use url::form_urlencoded::byte_serialize;

/// Public endpoint of the goqr.me rendering API
pub const DEFAULT_BASE_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Base address of a QR rendering service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    /// Parse a base URL. Only `http` and `https` bases are accepted.
    pub fn parse(base: &str) -> Result<Self> {
        let base = Url::parse(base)?;
        match base.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::Config(format!(
                    "Unsupported render service scheme '{other}', expected http or https"
                )));
            }
        }
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Render service URL '{base}' cannot carry query parameters"
            )));
        }

        Ok(Self { base })
    }

    /// Base URL without query parameters
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Build the GET URL for a request.
    ///
    /// Any query already on the base is replaced. The text is percent-encoded
    /// with spaces as `%20`, so the same request always yields the same bytes.
    pub fn url_for(&self, request: &GenerationRequest) -> Url {
        let dim = request.size().dimension();
        let query = format!(
            "data={}&size={dim}x{dim}&ecc={}",
            encode_component(request.text()),
            request.error_correction().code(),
        );

        let mut url = self.base.clone();
        url.set_query(Some(&query));
        url.set_fragment(None);
        url
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_BASE_URL).expect("default endpoint is a valid URL"),
        }
    }
}

/// Percent-encode a query component.
///
/// `byte_serialize` only ever emits `+` for a space (a literal plus becomes
/// `%2B`), so swapping it afterwards is exact.
fn encode_component(text: &str) -> String {
    byte_serialize(text.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
