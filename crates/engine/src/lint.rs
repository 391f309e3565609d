//! Authoring lint: advisory checks over a template definition's
//! grading rules. Pure and non-blocking -- a finding never stops a
//! template from being saved or a record from being graded.

use std::fmt;

use caliper_model::{InputType, Template};
use serde::Serialize;

/// Severity of an authoring finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingSeverity {
    Info,
    Warning,
}

impl FindingSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingSeverity::Info => "INFO",
            FindingSeverity::Warning => "WARNING",
        }
    }
}

impl fmt::Display for FindingSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One notable observation about a template's authoring.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// Stable check name, e.g. "bounds-on-non-numeric".
    pub check: &'static str,
    pub severity: FindingSeverity,
    pub message: String,
    /// "Section/field" path, or the bare section name.
    pub location: String,
}

/// Run all authoring checks over a template.
pub fn check_template(template: &Template) -> Vec<Finding> {
    let mut findings = Vec::new();

    for section in &template.sections {
        if section.is_repeatable && section.repeat_count.unwrap_or(0) == 0 {
            findings.push(Finding {
                check: "repeatable-without-count",
                severity: FindingSeverity::Warning,
                message: format!(
                    "section '{}' is repeatable but declares no repeat count",
                    section.name
                ),
                location: section.name.clone(),
            });
        }

        for field in &section.fields {
            let location = format!("{}/{}", section.name, field.key);
            let numeric = field.input_type.is_numeric();

            if !numeric
                && (field.min_value.is_some()
                    || field.max_value.is_some()
                    || field.target_value.is_some()
                    || field.tolerance.is_some())
            {
                findings.push(Finding {
                    check: "bounds-on-non-numeric",
                    severity: FindingSeverity::Warning,
                    message: format!(
                        "field '{}' has numeric grading rules but input type {}; \
                         non-numeric submissions are never graded against them",
                        field.key, field.input_type
                    ),
                    location: location.clone(),
                });
            }

            if field.target_value.is_some() != field.tolerance.is_some() {
                findings.push(Finding {
                    check: "target-tolerance-incomplete",
                    severity: FindingSeverity::Warning,
                    message: format!(
                        "field '{}' sets only one of target/tolerance; the pair is \
                         ignored unless both are present",
                        field.key
                    ),
                    location: location.clone(),
                });
            }

            if let (Some(min), Some(max)) = (field.min_value, field.max_value) {
                if min > max {
                    findings.push(Finding {
                        check: "min-above-max",
                        severity: FindingSeverity::Warning,
                        message: format!(
                            "field '{}' has min {} above max {}; every numeric \
                             submission fails",
                            field.key, min, max
                        ),
                        location: location.clone(),
                    });
                }
            }

            if field.tolerance.is_some_and(|t| t.is_sign_negative()) {
                findings.push(Finding {
                    check: "negative-tolerance",
                    severity: FindingSeverity::Warning,
                    message: format!("field '{}' has a negative tolerance", field.key),
                    location: location.clone(),
                });
            }

            if matches!(field.input_type, InputType::Select | InputType::MultiSelect)
                && field.options.is_empty()
            {
                findings.push(Finding {
                    check: "select-without-options",
                    severity: FindingSeverity::Info,
                    message: format!(
                        "field '{}' is a {} with no options",
                        field.key, field.input_type
                    ),
                    location: location.clone(),
                });
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use caliper_model::{IdSequence, TemplateDefinition};
    use serde_json::json;

    fn template_from(fields: serde_json::Value) -> Template {
        let def: TemplateDefinition = serde_json::from_value(json!({
            "code": "QC001",
            "name": "Line check",
            "context": "MACHINE",
            "sections": [{"name": "Measurements", "fields": fields}]
        }))
        .unwrap();
        crate::sync::create_template(&def, &mut IdSequence::new(1)).unwrap()
    }

    fn checks(template: &Template) -> Vec<&'static str> {
        check_template(template).iter().map(|f| f.check).collect()
    }

    #[test]
    fn clean_template_has_no_findings() {
        let t = template_from(json!([
            {"key": "temperature", "label": "T", "input_type": "NUMBER",
             "min_value": "10", "max_value": "90",
             "target_value": "50", "tolerance": "5"}
        ]));
        assert!(check_template(&t).is_empty());
    }

    #[test]
    fn bounds_on_text_field_flagged() {
        let t = template_from(json!([
            {"key": "note", "label": "Note", "input_type": "TEXT", "min_value": "1"}
        ]));
        assert!(checks(&t).contains(&"bounds-on-non-numeric"));
    }

    #[test]
    fn lone_target_flagged() {
        let t = template_from(json!([
            {"key": "temperature", "label": "T", "input_type": "NUMBER", "target_value": "50"}
        ]));
        assert!(checks(&t).contains(&"target-tolerance-incomplete"));
    }

    #[test]
    fn inverted_bounds_flagged() {
        let t = template_from(json!([
            {"key": "temperature", "label": "T", "input_type": "NUMBER",
             "min_value": "90", "max_value": "10"}
        ]));
        assert!(checks(&t).contains(&"min-above-max"));
    }

    #[test]
    fn negative_tolerance_flagged() {
        let t = template_from(json!([
            {"key": "temperature", "label": "T", "input_type": "NUMBER",
             "target_value": "50", "tolerance": "-1"}
        ]));
        assert!(checks(&t).contains(&"negative-tolerance"));
    }

    #[test]
    fn select_without_options_is_info() {
        let t = template_from(json!([
            {"key": "grade", "label": "Grade", "input_type": "SELECT"}
        ]));
        let findings = check_template(&t);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].check, "select-without-options");
        assert_eq!(findings[0].severity, FindingSeverity::Info);
        assert_eq!(findings[0].location, "Measurements/grade");
    }

    #[test]
    fn repeatable_section_without_count_flagged() {
        let def: TemplateDefinition = serde_json::from_value(json!({
            "code": "QC001",
            "name": "Line check",
            "context": "MACHINE",
            "sections": [{
                "name": "Samples",
                "is_repeatable": true,
                "fields": [{"key": "weight", "label": "W", "input_type": "NUMBER"}]
            }]
        }))
        .unwrap();
        let t = crate::sync::create_template(&def, &mut IdSequence::new(1)).unwrap();
        assert!(checks(&t).contains(&"repeatable-without-count"));
    }
}
