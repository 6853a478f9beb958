//! HttpGateway - reqwest client for the messaging gateway REST API

use std::time::Duration;

use contracts::{Attachment, GatewayClient, GatewayConfig, SendError, SendReceipt};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::error::{GatewayError, Result};
use crate::types::{BatchAnalysis, GatewayStatus, NumberAnalysis, QrCode};

/// HTTP gateway client
///
/// Every request carries its own timeout; an expired timeout surfaces as
/// `SendError::Transport`.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    status_timeout: Duration,
    message_timeout: Duration,
    file_timeout: Duration,
}

impl HttpGateway {
    /// Create a client from the gateway configuration
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| GatewayError::ClientBuild {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
            status_timeout: config.status_timeout(),
            message_timeout: config.message_timeout(),
            file_timeout: config.file_timeout(),
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /status`
    #[instrument(name = "gateway_status", skip(self))]
    pub async fn status(&self) -> Result<GatewayStatus> {
        let response = self
            .send(self.request(Method::GET, "status", self.status_timeout))
            .await?;
        decode_json("status", response).await
    }

    /// `GET /qrcode`
    #[instrument(name = "gateway_qr_code", skip(self))]
    pub async fn qr_code(&self) -> Result<QrCode> {
        let response = self
            .send_raw(self.request(Method::GET, "qrcode", self.status_timeout))
            .await?;

        if response.status() == StatusCode::ACCEPTED {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("QR code not available yet, retry shortly")
                .to_string();
            return Ok(QrCode::Pending(message));
        }

        let response = check_status(response).await?;
        let body: Value = decode_json("qrcode", response).await?;
        body.get("qrCodeText")
            .and_then(Value::as_str)
            .map(|text| QrCode::Ready(text.to_string()))
            .ok_or_else(|| GatewayError::decode("qrcode", "missing 'qrCodeText'"))
    }

    /// `POST /reset-session`, returns the gateway's message if any
    #[instrument(name = "gateway_reset_session", skip(self))]
    pub async fn reset_session(&self) -> Result<Option<String>> {
        let response = self
            .send(self.request(Method::POST, "reset-session", self.message_timeout))
            .await?;
        let body: Value = decode_json("reset-session", response).await?;
        Ok(body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// `POST /analyze-number`
    #[instrument(name = "gateway_analyze_number", skip(self))]
    pub async fn analyze_number(&self, number: &str) -> Result<NumberAnalysis> {
        let request = self
            .request(Method::POST, "analyze-number", self.message_timeout)
            .json(&json!({ "number": number }));
        let response = self.send(request).await?;
        decode_json("analyze-number", response).await
    }

    /// `POST /analyze-batch`
    #[instrument(
        name = "gateway_analyze_batch",
        skip(self, numbers),
        fields(count = numbers.len())
    )]
    pub async fn analyze_batch(&self, numbers: &[String]) -> Result<BatchAnalysis> {
        let request = self
            .request(Method::POST, "analyze-batch", self.message_timeout)
            .json(&json!({ "numbers": numbers }));
        let response = self.send(request).await?;
        decode_json("analyze-batch", response).await
    }

    /// `POST /send-file` with an optional caption
    #[instrument(
        name = "gateway_send_file",
        skip(self, attachment, caption),
        fields(file = %attachment.file_name)
    )]
    pub async fn send_file_with_caption(
        &self,
        number: &str,
        attachment: &Attachment,
        caption: Option<&str>,
    ) -> std::result::Result<SendReceipt, SendError> {
        let bytes = tokio::fs::read(&attachment.path).await.map_err(|e| {
            SendError::transport(format!(
                "cannot read attachment {}: {e}",
                attachment.path.display()
            ))
        })?;

        let mut form = Form::new().text("number", number.to_string()).part(
            "file",
            Part::bytes(bytes).file_name(attachment.file_name.clone()),
        );
        if let Some(caption) = caption.filter(|c| !c.is_empty()) {
            form = form.text("caption", caption.to_string());
        }

        let request = self
            .request(Method::POST, "send-file", self.file_timeout)
            .multipart(form);
        let response = self.send(request).await?;
        Ok(receipt(response).await)
    }
}

impl HttpGateway {
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, timeout: Duration) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.url(path))
            .timeout(timeout);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and map transport failures, any status accepted
    async fn send_raw(&self, request: RequestBuilder) -> std::result::Result<Response, SendError> {
        request.send().await.map_err(transport_error)
    }

    /// Send and require HTTP 200
    async fn send(&self, request: RequestBuilder) -> std::result::Result<Response, SendError> {
        let response = self.send_raw(request).await?;
        check_status(response).await
    }
}

impl GatewayClient for HttpGateway {
    #[instrument(name = "gateway_send_text", skip(self, message))]
    async fn send_text(
        &self,
        number: &str,
        message: &str,
    ) -> std::result::Result<SendReceipt, SendError> {
        let request = self
            .request(Method::POST, "send-message", self.message_timeout)
            .json(&json!({ "number": number, "message": message }));
        let response = self.send(request).await?;
        Ok(receipt(response).await)
    }

    async fn send_file(
        &self,
        number: &str,
        attachment: &Attachment,
    ) -> std::result::Result<SendReceipt, SendError> {
        self.send_file_with_caption(number, attachment, None).await
    }

    #[instrument(name = "gateway_check_ready", skip(self))]
    async fn check_ready(&self) -> std::result::Result<bool, SendError> {
        match self.status().await {
            Ok(status) => Ok(status.ready),
            Err(GatewayError::Send(e)) => Err(e),
            Err(e) => Err(SendError::gateway(None, e.to_string())),
        }
    }
}

fn transport_error(err: reqwest::Error) -> SendError {
    if err.is_timeout() {
        SendError::transport("request timed out")
    } else if err.is_connect() {
        SendError::transport(format!("cannot connect to gateway: {err}"))
    } else {
        SendError::transport(err.to_string())
    }
}

/// Turn a non-200 response into `SendError::Gateway`
async fn check_status(response: Response) -> std::result::Result<Response, SendError> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }

    let code = status.as_u16();
    if status == StatusCode::UNAUTHORIZED {
        return Err(SendError::gateway(Some(code), "unauthorized"));
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| format!("gateway returned HTTP {code}"));
    warn!(status = code, error = %message, "gateway call rejected");
    Err(SendError::gateway(Some(code), message))
}

/// `error` field of a JSON error body, with `details` appended when present
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error").and_then(Value::as_str)?;
    match value.get("details").and_then(Value::as_str) {
        Some(details) if !details.is_empty() => Some(format!("{error}: {details}")),
        _ => Some(error.to_string()),
    }
}

async fn receipt(response: Response) -> SendReceipt {
    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message_id = body
        .get("messageId")
        .and_then(Value::as_str)
        .map(str::to_string);
    debug!(message_id = ?message_id, "gateway accepted call");
    SendReceipt { message_id }
}

async fn decode_json<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| GatewayError::decode(endpoint, e.to_string()))
}
