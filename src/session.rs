//! Scripted sessions for the command-line harness.
//!
//! A session is a JSON-lines file. Each line is one step:
//!
//! ```text
//! {"host": {"event": "initActivity", "data": {...}}}
//! {"edit": {"field": "zip", "value": "50000"}}
//! {"event": {"field": "zip", "name": "blur"}}
//! {"insertToken": {"field": "subject", "token": "{{Event.X.Name}}", "start": 1}}
//! "submit"
//! "cancel"
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use crate::core::text_edit::Selection;
use crate::host::channel::HostChannel;
use crate::host::controller::ActivityController;
use crate::host::message::{HostMessage, HostRequest};
use serde::Deserialize;
use serde_json::Value as Json;
use std::io::{BufRead, Write};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read session: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStep {
    Host(HostMessage),
    Edit {
        field: String,
        value: Json,
    },
    Event {
        field: String,
        name: String,
    },
    InsertToken {
        field: String,
        token: String,
        #[serde(default)]
        start: usize,
        #[serde(default)]
        end: Option<usize>,
    },
    Submit,
    Cancel,
}

impl SessionStep {
    pub fn apply<C: HostChannel>(self, controller: &mut ActivityController<C>) {
        match self {
            Self::Host(message) => controller.receive(message),
            Self::Edit { field, value } => {
                controller.engine_mut().change_json(field.as_str(), &value)
            }
            Self::Event { field, name } => {
                controller.engine_mut().fire_event(field.as_str(), name.as_str())
            }
            Self::InsertToken {
                field,
                token,
                start,
                end,
            } => {
                let selection = Selection::range(start, end.unwrap_or(start));
                controller.insert_variable(field.as_str(), token.as_str(), selection);
            }
            Self::Submit => controller.submit(),
            Self::Cancel => controller.cancel(),
        }
    }
}

/// Parses every step of a session up front, so a malformed file fails
/// before anything is sent.
pub fn parse_session(reader: impl BufRead) -> Result<Vec<SessionStep>, SessionError> {
    let mut steps = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let step = serde_json::from_str(trimmed).map_err(|source| SessionError::Parse {
            line: index + 1,
            source,
        })?;
        steps.push(step);
    }
    Ok(steps)
}

/// Plays `steps` against a ready controller, settling web-service calls
/// after each one.
pub fn replay<C: HostChannel>(
    controller: &mut ActivityController<C>,
    steps: Vec<SessionStep>,
    settle_timeout: Duration,
) {
    controller.ready();
    settle(controller, settle_timeout);

    for step in steps {
        tracing::debug!(?step, "session step");
        step.apply(controller);
        settle(controller, settle_timeout);
    }
}

fn settle<C: HostChannel>(controller: &mut ActivityController<C>, timeout: Duration) {
    if !controller.engine_mut().wait_for_services(timeout) {
        tracing::warn!(
            pending = controller.engine().pending_services(),
            "web service calls still running"
        );
    }
}

/// Writes every host request as one JSON line.
pub struct JsonLinesChannel<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesChannel<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> HostChannel for JsonLinesChannel<W> {
    fn trigger(&mut self, request: HostRequest) {
        let written = serde_json::to_writer(&mut self.writer, &request)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"))
            .and_then(|()| self.writer.flush());
        if let Err(err) = written {
            tracing::error!(event = request.name(), error = %err, "failed to write host request");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormDefinition;
    use crate::core::value::Value;
    use crate::engine::context::EngineContext;
    use crate::testing::FakeTransport;
    use serde_json::json;
    use std::io::Cursor;

    const DEFINITION: &str = r#"{
        "fields": [
            {"id": "subject", "type": "text", "required": true},
            {"id": "opt_in", "type": "checkbox"}
        ]
    }"#;

    #[test]
    fn parses_each_step_kind() {
        let session = r#"
            # comment
            {"host": {"event": "initActivity", "data": {}}}
            {"edit": {"field": "subject", "value": "ab"}}
            {"event": {"field": "subject", "name": "blur"}}
            {"insertToken": {"field": "subject", "token": "{{A.B}}", "start": 1}}
            "submit"
            "cancel"
        "#;
        let steps = parse_session(Cursor::new(session)).expect("session");
        assert_eq!(steps.len(), 6);
        assert_eq!(
            steps[3],
            SessionStep::InsertToken {
                field: "subject".to_string(),
                token: "{{A.B}}".to_string(),
                start: 1,
                end: None,
            }
        );
        assert_eq!(steps[4], SessionStep::Submit);
    }

    #[test]
    fn parse_errors_name_the_line() {
        let err = parse_session(Cursor::new("\"submit\"\n{oops}\n")).expect_err("bad line");
        assert!(matches!(err, SessionError::Parse { line: 2, .. }));
    }

    #[test]
    fn replay_prints_host_requests_as_json_lines() {
        let definition = FormDefinition::from_json_str(DEFINITION).expect("definition");
        let context = EngineContext::new(definition);
        let mut controller = ActivityController::new(
            context,
            FakeTransport::new(),
            JsonLinesChannel::new(Vec::new()),
        );
        let steps = parse_session(Cursor::new(
            "{\"edit\": {\"field\": \"subject\", \"value\": \"ab\"}}\n\
             {\"insertToken\": {\"field\": \"subject\", \"token\": \"{{A.B}}\", \"start\": 1}}\n\
             \"submit\"\n",
        ))
        .expect("session");

        replay(&mut controller, steps, Duration::from_secs(1));

        assert_eq!(
            controller.engine().value("subject"),
            Some(&Value::text("a{{A.B}}b"))
        );
        let output = String::from_utf8(controller.channel().writer.clone()).expect("utf8");
        let lines: Vec<Json> = output
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines[0], json!({"event": "ready"}));
        assert_eq!(lines.len(), 7);
        assert_eq!(
            lines[6]["data"]["arguments"]["execute"]["inArguments"],
            json!([{"subject": "a{{A.B}}b"}, {"opt_in": false}])
        );
    }
}
