//! HTTP handlers for the privacy endpoints
//!
//! - POST /compliance-check: validate a payload against a rule set
//! - POST /pii-redact: redact PII from an arbitrary JSON value
//! - POST /data-encrypt: encrypt a JSON value under the field key
//! - GET  /compliance-rules: list registered rule sets
//!
//! Request bodies are read as raw bytes and parsed here, so a malformed
//! body yields the endpoint's generic 500 error instead of a framework
//! rejection. Error bodies are `{"error": "<message>"}` and never
//! carry internal error details.

use crate::config::ShieldConfig;
use crate::crypto::FieldCipher;
use crate::error::{Error, Result};
use crate::privacy::compliance::{
    is_truthy, ComplianceEngine, ComplianceReport, ComplianceRuleSet,
};
use crate::privacy::redactor::Redactor;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

const INVALID_COMPLIANCE_TYPE: &str = "Invalid compliance type";
const COMPLIANCE_FAILED: &str = "Failed to validate compliance";
const REDACT_FAILED: &str = "Failed to process data";
const ENCRYPT_FAILED: &str = "Failed to encrypt data";

/// Shared state for privacy handlers
#[derive(Clone)]
pub struct PrivacyState {
    pub compliance: Arc<ComplianceEngine>,
    pub redactor: Arc<Redactor>,
    /// `None` when no usable key was configured; encryption requests fail
    pub cipher: Option<Arc<FieldCipher>>,
}

impl PrivacyState {
    /// Build handler state from config.
    ///
    /// The encryption secret is read from the configured environment
    /// variable. A missing or invalid secret does not stop start-up; it
    /// leaves encryption disabled so those requests fail with the generic
    /// error.
    pub fn from_config(config: &ShieldConfig) -> Result<Self> {
        let compliance = ComplianceEngine::from_config(&config.compliance)?;
        let redactor = Redactor::standard()?;

        let cipher = match FieldCipher::from_env(&config.encryption.key_env) {
            Ok(cipher) => Some(Arc::new(cipher)),
            Err(e) => {
                tracing::warn!(
                    key_env = %config.encryption.key_env,
                    error = %e,
                    "Field encryption disabled"
                );
                None
            }
        };

        tracing::info!(
            rule_sets = compliance.rule_sets().len(),
            encryption = cipher.is_some(),
            "Privacy handlers ready"
        );

        Ok(Self {
            compliance: Arc::new(compliance),
            redactor: Arc::new(redactor),
            cipher,
        })
    }
}

/// Create the privacy router
pub fn privacy_router(state: PrivacyState) -> Router {
    Router::new()
        .route("/compliance-check", post(compliance_check))
        .route("/pii-redact", post(pii_redact))
        .route("/data-encrypt", post(data_encrypt))
        .route("/compliance-rules", get(list_rule_sets))
        .with_state(state)
}

// =============================================================================
// Request / Response types
// =============================================================================

/// Request body for compliance checks
#[derive(Debug, Deserialize)]
pub struct ComplianceRequest {
    /// Rule-set id; anything but a registered string id is rejected
    #[serde(rename = "type", default)]
    pub kind: Value,
    #[serde(default)]
    pub data: Value,
}

/// Request body for redaction
#[derive(Debug, Deserialize)]
pub struct RedactRequest {
    #[serde(default)]
    pub data: Value,
    /// Trusted internal callers set this to skip redaction
    #[serde(default)]
    pub sys: Value,
}

/// Response from redaction
#[derive(Debug, Serialize)]
pub struct RedactResponse {
    pub data: Value,
}

/// Request body for encryption
#[derive(Debug, Deserialize)]
pub struct EncryptRequest {
    #[serde(default)]
    pub data: Value,
}

/// Response from encryption
#[derive(Debug, Serialize)]
pub struct EncryptResponse {
    pub encrypted: String,
}

/// Error response: a status and a caller-safe message
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    fn bad_request(message: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }

    fn internal(message: &'static str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

type HandlerResult<T> = std::result::Result<T, ApiError>;

/// Parse a request body.
///
/// A `null` body is unreadable. Any other non-object body (string, number,
/// bool, array) is read as an object with no fields.
fn parse_body<T: DeserializeOwned>(body: &[u8], failure: &'static str) -> HandlerResult<T> {
    let unreadable = |e: serde_json::Error| {
        tracing::warn!(error = %e, "Rejected unreadable request body");
        ApiError::internal(failure)
    };

    let fields = match serde_json::from_slice::<Value>(body).map_err(unreadable)? {
        Value::Object(map) => map,
        Value::Null => {
            tracing::warn!("Rejected null request body");
            return Err(ApiError::internal(failure));
        }
        _ => Map::new(),
    };

    serde_json::from_value(Value::Object(fields)).map_err(unreadable)
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /compliance-check
async fn compliance_check(
    State(state): State<PrivacyState>,
    body: Bytes,
) -> HandlerResult<Json<ComplianceReport>> {
    let request: ComplianceRequest = parse_body(&body, COMPLIANCE_FAILED)?;
    let kind = request.kind.as_str().unwrap_or_default();

    match state.compliance.check(kind, &request.data) {
        Ok(report) => {
            tracing::debug!(
                rule_set = kind,
                compliant = report.compliant,
                missing = report.missing.len(),
                unhandled_pii = ?report.unhandled_pii,
                "Compliance check complete"
            );
            Ok(Json(report))
        }
        Err(e @ Error::InvalidComplianceType(_)) => {
            tracing::debug!(error = %e, "Rejected compliance check");
            Err(ApiError::bad_request(INVALID_COMPLIANCE_TYPE))
        }
        Err(e) => {
            tracing::warn!(rule_set = kind, error = %e, "Compliance check failed");
            Err(ApiError::internal(COMPLIANCE_FAILED))
        }
    }
}

/// POST /pii-redact
async fn pii_redact(
    State(state): State<PrivacyState>,
    body: Bytes,
) -> HandlerResult<Json<RedactResponse>> {
    let request: RedactRequest = parse_body(&body, REDACT_FAILED)?;

    if is_truthy(&request.sys) {
        tracing::debug!("Redaction skipped for system payload");
        return Ok(Json(RedactResponse { data: request.data }));
    }

    Ok(Json(RedactResponse {
        data: state.redactor.redact_value(request.data),
    }))
}

/// POST /data-encrypt
async fn data_encrypt(
    State(state): State<PrivacyState>,
    body: Bytes,
) -> HandlerResult<Json<EncryptResponse>> {
    let request: EncryptRequest = parse_body(&body, ENCRYPT_FAILED)?;

    let Some(cipher) = state.cipher.as_ref() else {
        tracing::error!("Encryption requested but no encryption key is configured");
        return Err(ApiError::internal(ENCRYPT_FAILED));
    };

    let envelope = cipher.encrypt_json(&request.data).map_err(|e| {
        tracing::error!(error = %e, "Encryption failed");
        ApiError::internal(ENCRYPT_FAILED)
    })?;

    Ok(Json(EncryptResponse {
        encrypted: envelope.encode(),
    }))
}

/// GET /compliance-rules
async fn list_rule_sets(State(state): State<PrivacyState>) -> Json<Vec<ComplianceRuleSet>> {
    Json(state.compliance.rule_sets().to_vec())
}
