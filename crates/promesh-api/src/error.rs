use thiserror::Error;

/// Sub-status codes embedded in the broker's error envelope.
///
/// The management API signals "replayed" operations (create on an existing
/// object, delete on an absent one) with an HTTP 400 whose envelope carries
/// one of these; callers treat them as success-equivalent.
pub const SUBSTATUS_ALREADY_EXISTS: &str = "ALREADY_EXISTS";
pub const SUBSTATUS_NOT_FOUND: &str = "NOT_FOUND";

/// One field-level validation failure from an HTTP 422 response,
/// correlated back to the request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name as reported by the server.
    pub field: String,
    /// Server-side message, prefixed with the offending request value
    /// when the field was present in the request payload.
    pub detail: String,
}

/// Top-level error type for the `promesh-api` crate.
///
/// Covers both remote surfaces (portal and broker management) plus the
/// shared transport concerns. `promesh-core` maps these into its own
/// domain taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Portal API ──────────────────────────────────────────────────
    /// Structured error from the event portal.
    #[error("Portal API error (HTTP {status}): {message}")]
    Portal {
        status: u16,
        message: String,
        /// Portal-assigned numeric error code, when present.
        code: Option<i64>,
    },

    // ── Broker management API ───────────────────────────────────────
    /// Error from the broker's management API (parsed from the
    /// `{meta: {error: {code, description, status}}}` envelope).
    #[error("Broker API error (HTTP {status}): {description}")]
    Semp {
        status: u16,
        code: Option<i64>,
        /// Envelope sub-status, e.g. `ALREADY_EXISTS` or `NOT_FOUND`.
        sub_status: Option<String>,
        description: String,
    },

    /// HTTP 422: the payload shape was rejected, with per-field detail
    /// correlated against the request body.
    #[error("Request rejected with field errors: {}", format_fields(.fields))]
    Unprocessable { fields: Vec<FieldError> },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Base URL cannot carry path segments (e.g. `mailto:`).
    #[error("URL cannot be extended with path segments: {url}")]
    UrlNotBase { url: String },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Credentials that cannot even be sent (malformed header value).
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

fn format_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.detail))
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// `true` for a create replayed against an existing object.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Self::Semp { sub_status: Some(s), .. } if s == SUBSTATUS_ALREADY_EXISTS
        )
    }

    /// `true` for a read or delete against an absent object.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Semp {
                status, sub_status, ..
            } => {
                *status == 404
                    || sub_status.as_deref() == Some(SUBSTATUS_NOT_FOUND)
            }
            Self::Portal { status: 404, .. } => true,
            _ => false,
        }
    }

    /// `true` when the portal rejected a deployment request it considers
    /// redundant (HTTP 400, e.g. undeploying a version that is not
    /// currently deployed). Callers treat this as recovered.
    pub fn is_portal_conflict(&self) -> bool {
        matches!(self, Self::Portal { status: 400, .. })
    }

    /// `true` for failures of the transport itself rather than the
    /// request: the broker/portal could not be reached or answered
    /// with something unparsable.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Tls(_) | Self::Deserialization { .. }
        )
    }
}

/// Correlate an HTTP 422 response body with the request payload.
///
/// The response is a flat `{field: message | [messages]}` map; for every
/// field that also appears in the request body, the offending request
/// value is prepended so the report names what produced the rejection.
pub(crate) fn correlate_unprocessable(
    request_body: Option<&serde_json::Value>,
    response_body: &serde_json::Value,
) -> Vec<FieldError> {
    let Some(map) = response_body.as_object() else {
        return vec![FieldError {
            field: "body".into(),
            detail: response_body.to_string(),
        }];
    };

    map.iter()
        .map(|(field, error)| {
            let message = match error {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Array(parts) => parts
                    .iter()
                    .map(|p| p.as_str().map_or_else(|| p.to_string(), str::to_owned))
                    .collect::<Vec<_>>()
                    .join(", "),
                other => other.to_string(),
            };

            let requested = request_body
                .and_then(|body| body.get(field))
                .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_owned));

            let detail = match requested {
                Some(value) => format!("'{value}' {message}"),
                None => message,
            };

            FieldError {
                field: field.clone(),
                detail,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn already_exists_matches_substatus() {
        let err = Error::Semp {
            status: 400,
            code: Some(72),
            sub_status: Some(SUBSTATUS_ALREADY_EXISTS.into()),
            description: "Queue already exists".into(),
        };
        assert!(err.is_already_exists());
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_matches_substatus_and_http_404() {
        let by_substatus = Error::Semp {
            status: 400,
            code: Some(6),
            sub_status: Some(SUBSTATUS_NOT_FOUND.into()),
            description: "No such queue".into(),
        };
        let by_http = Error::Semp {
            status: 404,
            code: None,
            sub_status: None,
            description: "not found".into(),
        };
        assert!(by_substatus.is_not_found());
        assert!(by_http.is_not_found());
    }

    #[test]
    fn correlation_prefixes_request_values() {
        let request = json!({"queueName": "orders/q", "maxMsgSpoolUsage": -5});
        let response = json!({"maxMsgSpoolUsage": "must be non-negative"});

        let fields = correlate_unprocessable(Some(&request), &response);

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "maxMsgSpoolUsage");
        assert_eq!(fields[0].detail, "'-5' must be non-negative");
    }

    #[test]
    fn correlation_without_matching_request_field() {
        let request = json!({"queueName": "orders/q"});
        let response = json!({"owner": ["is unknown", "must be enabled"]});

        let fields = correlate_unprocessable(Some(&request), &response);

        assert_eq!(fields[0].field, "owner");
        assert_eq!(fields[0].detail, "is unknown, must be enabled");
    }
}
