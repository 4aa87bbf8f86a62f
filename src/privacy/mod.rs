//! Privacy protection handlers
//!
//! Stateless request handlers that sit in front of the application:
//! - Compliance rule checking (GDPR, CCPA, custom rule sets)
//! - PII redaction over arbitrary JSON payloads
//! - Field-level encryption of JSON payloads

pub mod compliance;
pub mod handler;
pub mod redactor;

pub use compliance::{
    is_truthy, ComplianceEngine, ComplianceFramework, ComplianceReport, ComplianceRuleSet,
};
pub use handler::{privacy_router, PrivacyState};
pub use redactor::{default_redaction_patterns, RedactionPattern, Redactor};
