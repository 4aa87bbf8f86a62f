//! Compliance rule engine for privacy regulations.
//!
//! Provides pre-built rule sets for:
//! - GDPR (General Data Protection Regulation)
//! - CCPA (California Consumer Privacy Act)
//!
//! A rule set names the fields a payload must carry (`required`) and the
//! PII fields that, when present, must come with a `<field>_handling`
//! companion describing how that data is handled. Additional rule sets can
//! be registered from config at start-up.

use crate::config::ComplianceConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Suffix of the companion field required next to a present PII field
pub const HANDLING_SUFFIX: &str = "_handling";

/// Built-in compliance framework identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceFramework {
    /// GDPR: EU personal data
    Gdpr,
    /// CCPA: California consumer data
    Ccpa,
}

impl ComplianceFramework {
    /// Rule-set id used in requests (`type` field)
    pub fn id(&self) -> &'static str {
        match self {
            Self::Gdpr => "gdpr",
            Self::Ccpa => "ccpa",
        }
    }

    /// Build the rule set for this framework
    pub fn rule_set(&self) -> ComplianceRuleSet {
        match self {
            Self::Gdpr => gdpr_rules(),
            Self::Ccpa => ccpa_rules(),
        }
    }
}

impl std::fmt::Display for ComplianceFramework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gdpr => write!(f, "GDPR"),
            Self::Ccpa => write!(f, "CCPA"),
        }
    }
}

/// A named set of required-field and PII-handling policies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRuleSet {
    /// Identifier matched against the request's `type`
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Fields that must be present and truthy
    pub required: Vec<String>,
    /// Fields that need a `<field>_handling` companion when present
    pub pii: Vec<String>,
}

impl ComplianceRuleSet {
    /// Evaluate a data mapping against this rule set
    pub fn evaluate(&self, data: &Map<String, Value>) -> ComplianceReport {
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|field| !field_is_truthy(data, field))
            .cloned()
            .collect();

        let unhandled_pii: Vec<String> = self
            .pii
            .iter()
            .filter(|field| {
                field_is_truthy(data, field)
                    && !field_is_truthy(data, &format!("{}{}", field, HANDLING_SUFFIX))
            })
            .cloned()
            .collect();

        ComplianceReport {
            compliant: missing.is_empty() && unhandled_pii.is_empty(),
            missing,
            unhandled_pii,
        }
    }
}

/// Outcome of a compliance check.
///
/// Serializes as `{compliant, missing}`. `missing` only lists required
/// fields; PII fields without a handling companion make the payload
/// non-compliant but are kept out of the response and only surface in
/// server-side logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceReport {
    pub compliant: bool,
    pub missing: Vec<String>,
    #[serde(skip)]
    pub unhandled_pii: Vec<String>,
}

/// Registry of compliance rule sets, keyed by id
pub struct ComplianceEngine {
    rule_sets: Vec<ComplianceRuleSet>,
}

impl ComplianceEngine {
    /// Create an empty compliance engine
    pub fn new() -> Self {
        Self {
            rule_sets: Vec::new(),
        }
    }

    /// Create a compliance engine with the specified frameworks enabled
    pub fn with_frameworks(frameworks: &[ComplianceFramework]) -> Self {
        let mut engine = Self::new();
        for framework in frameworks {
            if engine.rule_set(framework.id()).is_none() {
                engine.rule_sets.push(framework.rule_set());
            }
        }
        engine
    }

    /// Create a compliance engine from config: built-in frameworks first,
    /// then custom rule sets in declaration order
    pub fn from_config(config: &ComplianceConfig) -> Result<Self> {
        let mut engine = Self::with_frameworks(&config.frameworks);
        for rule_set in &config.custom {
            engine.add_rule_set(rule_set.clone())?;
        }
        Ok(engine)
    }

    /// Register a rule set. Ids are unique; a duplicate is rejected.
    pub fn add_rule_set(&mut self, rule_set: ComplianceRuleSet) -> Result<()> {
        if rule_set.id.is_empty() {
            return Err(Error::Config("Compliance rule set id is empty".to_string()));
        }
        if self.rule_set(&rule_set.id).is_some() {
            return Err(Error::Config(format!(
                "Compliance rule set '{}' is already registered",
                rule_set.id
            )));
        }
        self.rule_sets.push(rule_set);
        Ok(())
    }

    /// Look up a rule set by id (case-sensitive)
    pub fn rule_set(&self, id: &str) -> Option<&ComplianceRuleSet> {
        self.rule_sets.iter().find(|rs| rs.id == id)
    }

    /// All registered rule sets, in registration order
    pub fn rule_sets(&self) -> &[ComplianceRuleSet] {
        &self.rule_sets
    }

    /// Check a payload against the rule set named `id`.
    ///
    /// An unknown id fails with [`Error::InvalidComplianceType`] before the
    /// payload is looked at. `null` data cannot be evaluated; any other
    /// non-object value has no fields and so misses every required one.
    pub fn check(&self, id: &str, data: &Value) -> Result<ComplianceReport> {
        let rule_set = self
            .rule_set(id)
            .ok_or_else(|| Error::InvalidComplianceType(id.to_string()))?;

        match data {
            Value::Object(map) => Ok(rule_set.evaluate(map)),
            Value::Null => Err(Error::Compliance("Payload has no data".to_string())),
            _ => Ok(rule_set.evaluate(&Map::new())),
        }
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::with_frameworks(&[ComplianceFramework::Gdpr, ComplianceFramework::Ccpa])
    }
}

/// Truthiness of a JSON value: `null`, `false`, zero and `""` are falsy,
/// everything else (including empty arrays and objects) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn field_is_truthy(data: &Map<String, Value>, field: &str) -> bool {
    data.get(field).map_or(false, is_truthy)
}

// ---- GDPR Rules ----

/// GDPR consent and processing-purpose rules
pub fn gdpr_rules() -> ComplianceRuleSet {
    ComplianceRuleSet {
        id: ComplianceFramework::Gdpr.id().to_string(),
        name: "GDPR".to_string(),
        required: vec![
            "consent".to_string(),
            "purpose".to_string(),
            "retention".to_string(),
        ],
        pii: vec![
            "email".to_string(),
            "phone".to_string(),
            "location".to_string(),
        ],
    }
}

// ---- CCPA Rules ----

/// CCPA notice and opt-out rules
pub fn ccpa_rules() -> ComplianceRuleSet {
    ComplianceRuleSet {
        id: ComplianceFramework::Ccpa.id().to_string(),
        name: "CCPA".to_string(),
        required: vec![
            "notice".to_string(),
            "optout".to_string(),
            "deletion".to_string(),
        ],
        pii: vec!["id".to_string(), "ip".to_string(), "device".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> ComplianceEngine {
        ComplianceEngine::default()
    }

    // ---- ComplianceEngine tests ----

    #[test]
    fn test_empty_engine() {
        let engine = ComplianceEngine::new();
        assert!(engine.rule_sets().is_empty());
        assert!(engine.rule_set("gdpr").is_none());
    }

    #[test]
    fn test_default_frameworks() {
        let engine = engine();
        let ids: Vec<&str> = engine.rule_sets().iter().map(|rs| rs.id.as_str()).collect();
        assert_eq!(ids, vec!["gdpr", "ccpa"]);
    }

    #[test]
    fn test_duplicate_frameworks_registered_once() {
        let engine = ComplianceEngine::with_frameworks(&[
            ComplianceFramework::Gdpr,
            ComplianceFramework::Gdpr,
        ]);
        assert_eq!(engine.rule_sets().len(), 1);
    }

    #[test]
    fn test_add_custom_rule_set() {
        let mut engine = engine();
        engine
            .add_rule_set(ComplianceRuleSet {
                id: "lgpd".to_string(),
                name: "LGPD".to_string(),
                required: vec!["consent".to_string()],
                pii: vec!["cpf".to_string()],
            })
            .unwrap();

        let report = engine.check("lgpd", &json!({"consent": true})).unwrap();
        assert!(report.compliant);
    }

    #[test]
    fn test_from_config() {
        let config = ComplianceConfig {
            frameworks: vec![ComplianceFramework::Ccpa],
            custom: vec![ComplianceRuleSet {
                id: "pipeda".to_string(),
                name: "PIPEDA".to_string(),
                required: vec!["consent".to_string()],
                pii: vec![],
            }],
        };
        let engine = ComplianceEngine::from_config(&config).unwrap();
        let ids: Vec<&str> = engine.rule_sets().iter().map(|rs| rs.id.as_str()).collect();
        assert_eq!(ids, vec!["ccpa", "pipeda"]);
        assert!(engine.rule_set("gdpr").is_none());
    }

    #[test]
    fn test_from_config_rejects_colliding_custom_id() {
        let config = ComplianceConfig {
            custom: vec![ccpa_rules()],
            ..Default::default()
        };
        assert!(ComplianceEngine::from_config(&config).is_err());
    }

    #[test]
    fn test_add_duplicate_rule_set_rejected() {
        let mut engine = engine();
        let err = engine.add_rule_set(gdpr_rules()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let engine = engine();
        for id in ["hipaa", "", "GDPR", "Ccpa"] {
            let err = engine.check(id, &json!({})).unwrap_err();
            assert!(matches!(err, Error::InvalidComplianceType(_)), "id {:?}", id);
        }
    }

    #[test]
    fn test_unknown_type_checked_before_data() {
        // null data would be a processing error, but the type check comes first
        let err = engine().check("hipaa", &Value::Null).unwrap_err();
        assert!(err.is_client_error());
    }

    // ---- Evaluation ----

    #[test]
    fn test_gdpr_compliant() {
        let report = engine()
            .check(
                "gdpr",
                &json!({"consent": true, "purpose": "x", "retention": "30d"}),
            )
            .unwrap();
        assert!(report.compliant);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn test_gdpr_missing_in_declared_order() {
        let report = engine().check("gdpr", &json!({"consent": true})).unwrap();
        assert!(!report.compliant);
        assert_eq!(report.missing, vec!["purpose", "retention"]);
    }

    #[test]
    fn test_falsy_required_fields_count_as_missing() {
        let report = engine()
            .check(
                "ccpa",
                &json!({"notice": "", "optout": 0, "deletion": false}),
            )
            .unwrap();
        assert!(!report.compliant);
        assert_eq!(report.missing, vec!["notice", "optout", "deletion"]);

        let report = engine()
            .check("ccpa", &json!({"notice": null, "optout": 1, "deletion": []}))
            .unwrap();
        assert_eq!(report.missing, vec!["notice"]);
    }

    #[test]
    fn test_pii_with_handling_is_compliant() {
        let report = engine()
            .check(
                "gdpr",
                &json!({
                    "consent": true,
                    "purpose": "hiring",
                    "retention": "1y",
                    "email": "a@b.com",
                    "email_handling": "encrypted"
                }),
            )
            .unwrap();
        assert!(report.compliant);
        assert!(report.unhandled_pii.is_empty());
    }

    #[test]
    fn test_pii_without_handling_not_listed_as_missing() {
        let report = engine()
            .check(
                "gdpr",
                &json!({
                    "consent": true,
                    "purpose": "hiring",
                    "retention": "1y",
                    "phone": "555-123-4567"
                }),
            )
            .unwrap();
        assert!(!report.compliant);
        assert!(report.missing.is_empty());
        assert_eq!(report.unhandled_pii, vec!["phone"]);
    }

    #[test]
    fn test_absent_pii_fields_not_checked() {
        let report = engine()
            .check(
                "ccpa",
                &json!({"notice": true, "optout": true, "deletion": true, "ip_handling": ""}),
            )
            .unwrap();
        assert!(report.compliant);
    }

    #[test]
    fn test_falsy_pii_fields_need_no_handling() {
        let report = engine()
            .check(
                "gdpr",
                &json!({
                    "consent": true,
                    "purpose": "x",
                    "retention": "y",
                    "email": "",
                    "phone": 0,
                    "location": null
                }),
            )
            .unwrap();
        assert!(report.compliant);
        assert!(report.unhandled_pii.is_empty());
    }

    #[test]
    fn test_null_data_is_processing_error() {
        let err = engine().check("gdpr", &Value::Null).unwrap_err();
        assert!(matches!(err, Error::Compliance(_)));
    }

    #[test]
    fn test_non_object_data_misses_everything() {
        for data in [json!("consent"), json!([1, 2]), json!(42), json!(true)] {
            let report = engine().check("gdpr", &data).unwrap();
            assert!(!report.compliant);
            assert_eq!(report.missing, vec!["consent", "purpose", "retention"]);
        }
    }

    #[test]
    fn test_report_serialization() {
        let report = engine()
            .check("gdpr", &json!({"consent": true, "email": "x"}))
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            json!({"compliant": false, "missing": ["purpose", "retention"]})
        );
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_framework_display() {
        assert_eq!(ComplianceFramework::Gdpr.to_string(), "GDPR");
        assert_eq!(ComplianceFramework::Ccpa.to_string(), "CCPA");
        assert_eq!(ComplianceFramework::Ccpa.id(), "ccpa");
    }

    #[test]
    fn test_framework_serde_ids() {
        let fw: ComplianceFramework = serde_json::from_str("\"ccpa\"").unwrap();
        assert_eq!(fw, ComplianceFramework::Ccpa);
        assert_eq!(serde_json::to_string(&ComplianceFramework::Gdpr).unwrap(), "\"gdpr\"");
    }
}
