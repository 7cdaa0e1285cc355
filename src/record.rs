// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Log records and the builder that normalizes raw logging calls into them.

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::severity::Severity;

/// Caller-supplied metadata attached to a logging call.
pub type Fields = Map<String, Value>;

/// A finalized, structured log record.
///
/// A record is immutable once built and is handed to exactly one stream. Its
/// fields always contain the `app`, `env` and `severity` enrichment keys, and
/// never contain a raw `req` object.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    message: String,
    fields: Fields,
}

impl LogRecord {
    /// The human-readable message line.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The structured fields attached to the record.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

/// An error value accepted by the error and crash verbs.
///
/// Modeled as a tagged union so the builder dispatches on the variant instead
/// of inspecting values at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorInput {
    /// A bare value carrying no structure, logged verbatim.
    Plain(String),
    /// A standard error shape with a message and an optional stack trace.
    Standard {
        /// The error message.
        message: String,
        /// The captured stack trace, if any.
        stack: Option<String>,
    },
    /// A domain wrapper reporting a human-readable detail string and an
    /// optional chain to the causing error.
    Unexpected {
        /// The human-readable detail string.
        detail: String,
        /// The wrapped cause, possibly itself a wrapper.
        cause: Option<Box<ErrorInput>>,
    },
}

impl ErrorInput {
    /// Creates a standard error input.
    pub fn standard(message: impl Into<String>, stack: Option<String>) -> ErrorInput {
        ErrorInput::Standard {
            message: message.into(),
            stack,
        }
    }

    /// Creates a domain wrapper error input.
    pub fn unexpected(detail: impl Into<String>, cause: Option<ErrorInput>) -> ErrorInput {
        ErrorInput::Unexpected {
            detail: detail.into(),
            cause: cause.map(Box::new),
        }
    }

    /// Walks wrapper chains to the innermost cause and returns its stack, if
    /// that cause is a structured error carrying one.
    fn root_cause_stack(&self) -> Option<String> {
        match self {
            ErrorInput::Plain(_) => None,
            ErrorInput::Standard { stack, .. } => stack.clone(),
            ErrorInput::Unexpected { cause, .. } => {
                cause.as_deref().and_then(ErrorInput::root_cause_stack)
            }
        }
    }

    /// The JSON representation stored under the `err` field.
    fn as_value(&self) -> Value {
        match self {
            ErrorInput::Plain(value) => Value::String(value.clone()),
            ErrorInput::Standard { message, stack } => json!({
                "message": message,
                "stack": stack,
            }),
            ErrorInput::Unexpected { detail, cause } => json!({
                "detail": detail,
                "cause": cause.as_deref().map(ErrorInput::as_value),
            }),
        }
    }
}

impl From<&str> for ErrorInput {
    fn from(value: &str) -> Self {
        ErrorInput::Plain(value.to_string())
    }
}

impl From<String> for ErrorInput {
    fn from(value: String) -> Self {
        ErrorInput::Plain(value)
    }
}

impl From<anyhow::Error> for ErrorInput {
    fn from(err: anyhow::Error) -> Self {
        // The alternate Debug rendering carries the cause chain (and a
        // backtrace when captured), which is the closest thing to a stack.
        let stack = format!("{err:?}");
        ErrorInput::Standard {
            message: err.to_string(),
            stack: Some(stack),
        }
    }
}

/// Builds finalized [`LogRecord`]s out of raw logging calls.
///
/// The builder owns the enrichment values (`app`, `env`) and copies caller
/// metadata into a fresh map; the caller's map is never mutated.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    app: String,
    env: String,
}

impl RecordBuilder {
    /// Creates a builder enriching records with the given application name
    /// and deployment environment identifier.
    pub fn new(app: impl Into<String>, env: impl Into<String>) -> RecordBuilder {
        RecordBuilder {
            app: app.into(),
            env: env.into(),
        }
    }

    /// The application name written into every record.
    pub fn app(&self) -> &str {
        &self.app
    }

    /// The deployment environment identifier written into every record.
    pub fn env(&self) -> &str {
        &self.env
    }

    /// Builds a record for the informational and web paths.
    ///
    /// No error unwrapping is performed; the record is the caller metadata
    /// plus the enrichment fields.
    pub fn event(&self, severity: Severity, text: &str, metadata: Option<&Fields>) -> LogRecord {
        let mut fields = metadata.cloned().unwrap_or_default();
        self.enrich(severity, &mut fields);
        LogRecord {
            message: text.to_string(),
            fields,
        }
    }

    /// Builds a record for the error and crash paths.
    ///
    /// The error is unwrapped into a flat message plus optional `stack`
    /// field, and request metadata is folded into scalar fields. The crash
    /// path (`Severity::Critical`) intentionally skips `body`/`params`
    /// promotion and `res` removal; see [`Facility::crash`].
    ///
    /// [`Facility::crash`]: crate::Facility::crash
    pub fn error(
        &self,
        severity: Severity,
        err: ErrorInput,
        metadata: Option<&Fields>,
    ) -> LogRecord {
        let mut fields = metadata.cloned().unwrap_or_default();
        fields.insert("err".to_string(), err.as_value());

        let mut message = match &err {
            ErrorInput::Plain(value) => value.clone(),
            ErrorInput::Standard { message, stack } => {
                if let Some(stack) = stack {
                    fields.insert("stack".to_string(), Value::String(stack.clone()));
                }
                message.clone()
            }
            ErrorInput::Unexpected { detail, .. } => {
                if let Some(stack) = err.root_cause_stack() {
                    fields.insert("stack".to_string(), Value::String(stack));
                }
                detail.clone()
            }
        };

        let crash = severity == Severity::Critical;
        if let Some(req) = fields.remove("req") {
            if let Some(url) = req.get("url") {
                let rendered = match url {
                    Value::String(url) => url.clone(),
                    other => other.to_string(),
                };
                message.push_str("\n    url: ");
                message.push_str(&rendered);
                fields.insert("url".to_string(), url.clone());
            }
            if !crash {
                if let Some(body) = req.get("body") {
                    fields.insert("body".to_string(), body.clone());
                }
                if let Some(params) = req.get("params") {
                    fields.insert("params".to_string(), params.clone());
                }
            }
        }
        if !crash {
            // Response objects carry no useful scalar data and can be huge.
            fields.remove("res");
        }

        self.enrich(severity, &mut fields);
        LogRecord { message, fields }
    }

    // Enrichment keys are assigned after the caller metadata so they always
    // win on collision.
    fn enrich(&self, severity: Severity, fields: &mut Fields) {
        fields.insert("app".to_string(), Value::String(self.app.clone()));
        fields.insert("env".to_string(), Value::String(self.env.clone()));
        fields.insert(
            "severity".to_string(),
            Value::String(severity.as_str().to_string()),
        );
    }
}
