use crate::core::field::HttpMethod;
use crate::service::request::ServiceRequest;
use serde_json::Value as Json;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("failed to read response: {0}")]
    Read(String),
}

/// Blocking HTTP seam. Implementations run on executor worker threads.
pub trait HttpTransport: Send + Sync {
    fn send(&self, request: &ServiceRequest) -> Result<Json, TransportError>;
}

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl HttpTransport for UreqTransport {
    fn send(&self, request: &ServiceRequest) -> Result<Json, TransportError> {
        let call = self
            .agent
            .request(request.method.as_str(), request.url.as_str());

        let result = match (&request.body, request.method) {
            (Some(body), method) if !method.uses_query() => call
                .set("Content-Type", "application/json")
                .send_string(body.to_string().as_str()),
            _ => call.call(),
        };

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(TransportError::Status { status, body });
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(TransportError::Transport(err.to_string()));
            }
        };

        if request.method == HttpMethod::Head {
            return Ok(Json::Null);
        }

        let text = response
            .into_string()
            .map_err(|err| TransportError::Read(err.to_string()))?;
        Ok(parse_response_body(text))
    }
}

/// JSON bodies are parsed; anything else is delivered as a string.
pub fn parse_response_body(text: String) -> Json {
    if text.trim().is_empty() {
        return Json::Null;
    }
    serde_json::from_str(text.as_str()).unwrap_or(Json::String(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_bodies_fall_back_to_text() {
        assert_eq!(
            parse_response_body(r#"{"city": "Recife"}"#.to_string()),
            json!({"city": "Recife"})
        );
        assert_eq!(parse_response_body("OK".to_string()), json!("OK"));
        assert_eq!(parse_response_body("  ".to_string()), Json::Null);
    }
}
