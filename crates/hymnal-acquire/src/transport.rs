use crate::error::{AcquireError, Result};
use std::future::Future;
use std::time::Duration;

/// Status line and body of a completed GET.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into a [`AcquireError::Status`].
    pub fn error_for_status(self, url: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(AcquireError::Status {
                url: url.to_string(),
                status: self.status,
                reason: self.reason,
            })
        }
    }
}

/// The one network capability the fetchers need: issue a GET, get back a
/// status and a body.
///
/// A non-2xx status is not an error at this layer. Only failures to send the
/// request or read the body are.
pub trait Transport {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// [`Transport`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent("hymnal/0.1 (hymn book downloader)");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AcquireError::transport(url, e))?;

        let status = response.status();
        tracing::debug!(url = %url, status = status.as_u16(), "Received response");

        let body = response
            .text()
            .await
            .map_err(|e| AcquireError::transport(url, e))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}
