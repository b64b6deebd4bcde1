//! Sparkpost response bodies and their classification

use anyhow::anyhow;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{error::Category, Value};
use tracing::debug;

use crate::{
    domain::communication::mailer::{MailerError, RenderedPreview},
    infrastructure::http::HttpResponse,
};

#[derive(Debug, Deserialize)]
pub struct PreviewResponse {
    pub results: PreviewResults,
}

#[derive(Debug, Deserialize)]
pub struct PreviewResults {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub html: Option<String>,
}

impl From<PreviewResponse> for RenderedPreview {
    fn from(response: PreviewResponse) -> Self {
        Self {
            subject: response.results.subject,
            html: response.results.html,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TransmissionResponse {
    pub results: TransmissionResults,
}

#[derive(Debug, Deserialize)]
pub struct TransmissionResults {
    #[serde(default)]
    pub total_rejected_recipients: u64,
    #[serde(default)]
    pub total_accepted_recipients: u64,
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    description: Option<String>,
}

/// Decodes a Sparkpost response into `T`.
///
/// - a body that is not JSON is [`MailerError::InvalidResponse`] for 2xx statuses and
///   [`MailerError::Transport`] otherwise
/// - a JSON body with a non-2xx status is [`MailerError::Api`]
/// - JSON of the wrong shape is [`MailerError::UnexpectedResponse`]
pub fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, MailerError> {
    let status = response.status;

    let json: Value = match serde_json::from_str(&response.body) {
        Ok(json) => json,
        Err(err) if response.is_success() => {
            debug!("undecodable Sparkpost response: {:?}", err);

            return Err(MailerError::InvalidResponse {
                json_error: json_error_description(&err).to_string(),
                status,
                body: response.body.clone(),
            });
        }
        Err(err) => {
            return Err(MailerError::Transport(anyhow!(err).context(format!(
                "HTTP status code: {status}, HTTP response string: \"{}\"",
                response.body
            ))));
        }
    };

    if !response.is_success() {
        return Err(api_error(json, status));
    }

    serde_json::from_value(json).map_err(|err| {
        debug!("unexpected Sparkpost response shape: {:?}", err);

        MailerError::UnexpectedResponse {
            status,
            body: response.body.clone(),
        }
    })
}

fn api_error(json: Value, status: u16) -> MailerError {
    let errors = serde_json::from_value::<ErrorResponse>(json)
        .map(|response| response.errors)
        .unwrap_or_default();

    let message = if errors.is_empty() {
        "unknown error".to_string()
    } else {
        errors
            .into_iter()
            .map(|error| match error.description {
                Some(description) => format!("{}: {}", error.message, description),
                None => error.message,
            })
            .collect::<Vec<_>>()
            .join("; ")
    };

    MailerError::Api { message, status }
}

/// Decoder error wording used in the invalid response message
fn json_error_description(err: &serde_json::Error) -> &'static str {
    match err.classify() {
        Category::Syntax | Category::Eof => "Syntax error",
        Category::Data => "Malformed data",
        Category::Io => "I/O error",
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_invalid_json_with_success_status() {
        let result = decode::<PreviewResponse>(&HttpResponse::new(200, "invalid json"));

        assert_eq!(
            result.unwrap_err().to_string(),
            r#"Invalid Sparkpost JSON response. JSON error: "Syntax error", HTTP status code: 200, HTTP response string: "invalid json""#
        );
    }

    #[test]
    fn test_empty_body_is_a_syntax_error() {
        let result = decode::<PreviewResponse>(&HttpResponse::new(200, ""));

        assert!(matches!(
            result,
            Err(MailerError::InvalidResponse { json_error, .. }) if json_error == "Syntax error"
        ));
    }

    #[test]
    fn test_invalid_json_with_error_status_is_a_transport_error() {
        let result = decode::<PreviewResponse>(&HttpResponse::new(502, "<html>Bad Gateway</html>"));

        let err = result.unwrap_err();
        assert!(matches!(err, MailerError::Transport(_)));
        assert!(err.to_string().contains("HTTP status code: 502"));
    }

    #[test]
    fn test_api_errors_are_joined() {
        let body = r#"{"errors": [{"message": "Invalid data", "description": "bad from", "code": "1100"}, {"message": "Forbidden"}]}"#;

        let result = decode::<TransmissionResponse>(&HttpResponse::new(422, body));

        assert_eq!(
            result.unwrap_err().to_string(),
            "Unable to send an email: Invalid data: bad from; Forbidden (code 422)."
        );
    }

    #[test]
    fn test_api_error_without_details() {
        let result = decode::<TransmissionResponse>(&HttpResponse::new(500, "{}"));

        assert!(matches!(
            result,
            Err(MailerError::Api { message, status: 500 }) if message == "unknown error"
        ));
    }

    #[test]
    fn test_missing_results_is_unexpected() {
        let result = decode::<PreviewResponse>(&HttpResponse::new(200, r#"{"foo": 1}"#));

        assert!(matches!(
            result,
            Err(MailerError::UnexpectedResponse { status: 200, .. })
        ));
    }

    #[test]
    fn test_decode_transmission() -> TestResult {
        let response: TransmissionResponse = decode(&HttpResponse::new(
            200,
            r#"{"results": {"total_rejected_recipients": 0, "total_accepted_recipients": 1, "id": "11668787484950529"}}"#,
        ))?;

        assert_eq!(response.results.id, "11668787484950529");
        assert_eq!(response.results.total_accepted_recipients, 1);
        assert_eq!(response.results.total_rejected_recipients, 0);

        Ok(())
    }

    #[test]
    fn test_decode_preview() -> TestResult {
        let response: PreviewResponse = decode(&HttpResponse::new(
            200,
            r#"{"results": {"subject": "Hello there!", "html": "This is test body for {contactfield=email}!"}}"#,
        ))?;

        let preview = RenderedPreview::from(response);

        assert_eq!(preview.subject, "Hello there!");
        assert_eq!(
            preview.html.as_deref(),
            Some("This is test body for {contactfield=email}!")
        );

        Ok(())
    }
}
