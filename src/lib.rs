//! Privacy Shield - PII redaction, compliance checking and field encryption
//!
//! Privacy Shield is a small HTTP service that sits at the edge in front of
//! an application and offers three independent, stateless operations:
//!
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!  request → │  POST /pii-redact       → Redactor           │ → redacted JSON
//!            │  POST /data-encrypt     → FieldCipher        │ → <ct>.<nonce>
//!            │  POST /compliance-check → ComplianceEngine   │ → {compliant, missing}
//!            └──────────────────────────────────────────────┘
//! ```
//!
//! A caller would typically redact first, encrypt second and verify
//! compliance third; no data flows between the handlers themselves.
//!
//! ## Modules
//!
//! - [`privacy`]: Compliance rule sets, PII redaction and the HTTP handlers
//! - [`crypto`]: AES-256-GCM field encryption and envelope encoding
//! - [`api`]: Router assembly (CORS, tracing, body limits)
//! - [`config`]: Configuration management

pub mod api;
pub mod config;
pub mod crypto;
pub mod error;
pub mod privacy;

pub use config::ShieldConfig;
pub use error::{Error, Result};
