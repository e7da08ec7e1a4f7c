//! reCAPTCHA verification boundary.
//!
//! Thin proxy over the external siteverify endpoint. Outcomes are tri-state:
//! verified, rejected, or transport error. The route maps those to 200/400/500
//! and never forwards transport details to the caller.

use std::time::Duration;

use serde::Deserialize;

pub const GOOGLE_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

const VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Verification seam. Tests stub this; production posts to Google.
#[async_trait::async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// `Ok(true)` verified, `Ok(false)` rejected by the service, `Err` when
    /// the service could not be reached or answered with an error status.
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> anyhow::Result<bool>;
}

#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Live verifier posting form-encoded `{secret, response, remoteip}`.
pub struct HttpCaptchaVerifier {
    client: reqwest::Client,
    verify_url: String,
    secret: String,
}

impl HttpCaptchaVerifier {
    pub fn new(verify_url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            verify_url: verify_url.into(),
            secret: secret.into(),
        }
    }
}

#[async_trait::async_trait]
impl CaptchaVerifier for HttpCaptchaVerifier {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> anyhow::Result<bool> {
        let mut form = vec![("secret", self.secret.as_str()), ("response", token)];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }

        let response = self
            .client
            .post(&self.verify_url)
            .timeout(VERIFY_TIMEOUT)
            .form(&form)
            .send()
            .await?
            .error_for_status()?;

        let body: SiteverifyResponse = response.json().await?;
        if !body.success && !body.error_codes.is_empty() {
            tracing::warn!(errors = ?body.error_codes, "captcha rejected by verify service");
        }
        Ok(body.success)
    }
}
