use crate::core::FieldId;
use crate::core::field::{HttpMethod, WebServiceConfig};
use crate::core::form_state::FormState;
use crate::core::template::{interpolate_body, interpolate_url};
use crate::core::value::json_to_text;
use crate::service::transport::{HttpTransport, TransportError};
use serde_json::Value as Json;
use thiserror::Error;

/// One resolved web-service call, ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    pub field_id: FieldId,
    pub service_index: usize,
    pub run_id: u64,
    pub method: HttpMethod,
    pub url: String,
    /// JSON payload for methods that carry a body. GET/HEAD payloads are
    /// already folded into `url`.
    pub body: Option<Json>,
}

#[derive(Debug, Clone)]
pub struct ServiceCompletion {
    pub field_id: FieldId,
    pub service_index: usize,
    pub run_id: u64,
    pub result: Result<Json, TransportError>,
}

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("unsupported HTTP method '{0}'")]
    Method(String),

    #[error("request body is not valid JSON: {0}")]
    Body(#[from] serde_json::Error),
}

impl ServiceRequest {
    /// Resolves the templates of `config` against the current form values.
    pub fn prepare(
        field_id: &FieldId,
        service_index: usize,
        run_id: u64,
        config: &WebServiceConfig,
        form: &FormState,
    ) -> Result<Self, PrepareError> {
        let method = match config.method.as_deref() {
            None => HttpMethod::default(),
            Some(raw) => {
                HttpMethod::parse(raw).ok_or_else(|| PrepareError::Method(raw.to_string()))?
            }
        };

        let mut url = interpolate_url(config.url.as_str(), form);

        let body = match config.body.as_deref() {
            Some(template) => {
                let resolved = interpolate_body(template, form);
                if resolved.trim().is_empty() {
                    None
                } else {
                    Some(serde_json::from_str::<Json>(resolved.as_str())?)
                }
            }
            None => None,
        };

        let body = match body {
            Some(body) if method.uses_query() => {
                append_query(&mut url, &body);
                None
            }
            body => body,
        };

        Ok(Self {
            field_id: field_id.clone(),
            service_index,
            run_id,
            method,
            url,
            body,
        })
    }
}

/// Appends the members of a JSON object as `key=value` pairs.
fn append_query(url: &mut String, body: &Json) {
    let Json::Object(members) = body else {
        tracing::debug!(url = %url, "non-object body ignored for query-string request");
        return;
    };
    if members.is_empty() {
        return;
    }

    let query = members
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(json_to_text(value).as_str())
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(query.as_str());
}

pub fn execute_request(transport: &dyn HttpTransport, request: ServiceRequest) -> ServiceCompletion {
    let result = transport.send(&request);
    ServiceCompletion {
        field_id: request.field_id,
        service_index: request.service_index,
        run_id: request.run_id,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;
    use serde_json::json;

    fn form() -> FormState {
        let mut form = FormState::new();
        form.set("zip", Value::text("50 000"));
        form.set("name", Value::text("Ana"));
        form.set("vip", Value::Bool(false));
        form
    }

    fn prepare(config: &WebServiceConfig) -> Result<ServiceRequest, PrepareError> {
        ServiceRequest::prepare(&FieldId::new("zip"), 0, 1, config, &form())
    }

    #[test]
    fn get_body_becomes_query_string() {
        let config = WebServiceConfig::new("https://api.test/cep/{{zip}}?v=1", "change")
            .with_body(r#"{"name": "{{name}}", "vip": "{{vip}}"}"#);
        let request = prepare(&config).expect("request");

        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://api.test/cep/50%20000?v=1&name=Ana&vip=");
        assert_eq!(request.body, None);
    }

    #[test]
    fn post_keeps_json_body() {
        let config = WebServiceConfig::new("https://api.test/lookup", "change")
            .with_method("post")
            .with_body(r#"{"zip": "{{zip}}"}"#);
        let request = prepare(&config).expect("request");

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://api.test/lookup");
        assert_eq!(request.body, Some(json!({"zip": "50 000"})));
    }

    #[test]
    fn malformed_body_is_rejected() {
        let config = WebServiceConfig::new("https://api.test", "change")
            .with_method("POST")
            .with_body("{zip: {{zip}}");
        assert!(matches!(prepare(&config), Err(PrepareError::Body(_))));
    }

    #[test]
    fn unknown_method_is_rejected() {
        let config = WebServiceConfig::new("https://api.test", "change").with_method("FETCH");
        assert!(matches!(prepare(&config), Err(PrepareError::Method(_))));
    }

    #[test]
    fn blank_body_sends_nothing() {
        let config = WebServiceConfig::new("https://api.test", "change")
            .with_method("PUT")
            .with_body("  ");
        assert_eq!(prepare(&config).expect("request").body, None);
    }
}
