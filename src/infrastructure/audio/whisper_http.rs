//! Request plumbing shared by the hosted Whisper engines.

use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};

use crate::application::ports::TranscriptionError;

use super::AudioFormat;

/// Multipart form carrying the clip as `file`, named and typed after its sniffed container.
pub(super) fn audio_form(audio: &[u8]) -> Result<(Form, AudioFormat), TranscriptionError> {
    let format = AudioFormat::detect(audio);
    let part = Part::bytes(audio.to_vec())
        .file_name(format.file_name())
        .mime_str(format.mime_type())
        .map_err(|e| TranscriptionError::ApiRequestFailed(format!("mime: {}", e)))?;
    Ok((Form::new().part("file", part), format))
}

/// Sends the upload and returns the response only when the provider accepted it.
pub(super) async fn send(request: RequestBuilder) -> Result<Response, TranscriptionError> {
    let response = request
        .send()
        .await
        .map_err(|e| TranscriptionError::ApiRequestFailed(format!("request: {}", e)))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(rejection(status, body))
}

/// 4xx other than 429 means the clip itself was refused; anything else may pass on retry.
fn rejection(status: StatusCode, body: String) -> TranscriptionError {
    let detail = format!("status {}: {}", status, body);
    if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
        TranscriptionError::TranscriptionFailed(detail)
    } else {
        TranscriptionError::ApiRequestFailed(detail)
    }
}
