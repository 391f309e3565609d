//! The incoming side of a template edit: a definition without ids.
//!
//! Administrators author definitions (JSON); the engine's sync turns a
//! definition into a new template version, matching children to their
//! existing counterparts by key so field identity survives reorders.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{FormContext, HeaderFieldType, InputType};
use crate::error::ModelError;
use crate::template::TemplateScope;
use crate::ids::UserId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderFieldDefinition {
    pub key: String,
    pub label: String,
    pub field_type: HeaderFieldType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default_value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub key: String,
    pub label: String,
    pub input_type: InputType,
    #[serde(default)]
    pub min_value: Option<Decimal>,
    #[serde(default)]
    pub max_value: Option<Decimal>,
    #[serde(default)]
    pub target_value: Option<Decimal>,
    #[serde(default)]
    pub tolerance: Option<Decimal>,
    #[serde(default)]
    pub decimal_places: Option<u32>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub fail_condition: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDefinition {
    pub name: String,
    #[serde(default)]
    pub is_repeatable: bool,
    #[serde(default)]
    pub repeat_count: Option<u32>,
    #[serde(default)]
    pub repeat_label_pattern: Option<String>,
    #[serde(default)]
    pub group_labels: Vec<String>,
    pub fields: Vec<FieldDefinition>,
}

/// A complete template definition as authored by an administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub context: FormContext,
    #[serde(default)]
    pub header_fields: Vec<HeaderFieldDefinition>,
    pub sections: Vec<SectionDefinition>,
    #[serde(default)]
    pub requires_approval: bool,
    #[serde(default)]
    pub allow_partial_save: bool,
    #[serde(default)]
    pub company_id: Option<UserId>,
    #[serde(default)]
    pub scope: Option<TemplateScope>,
}

impl TemplateDefinition {
    /// Check the structural invariants a definition must hold before it
    /// can become a template: non-empty code, header-field keys unique
    /// per template, section names unique per template, field keys
    /// unique per section.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.code.trim().is_empty() {
            return Err(ModelError::InvalidDefinition {
                message: "template code must not be empty".to_string(),
            });
        }

        let mut header_keys = BTreeSet::new();
        for hf in &self.header_fields {
            if !header_keys.insert(hf.key.as_str()) {
                return Err(ModelError::InvalidDefinition {
                    message: format!("duplicate header field key '{}'", hf.key),
                });
            }
        }

        let mut section_names = BTreeSet::new();
        for section in &self.sections {
            if section.name.trim().is_empty() {
                return Err(ModelError::InvalidDefinition {
                    message: "section name must not be empty".to_string(),
                });
            }
            if !section_names.insert(section.name.as_str()) {
                return Err(ModelError::InvalidDefinition {
                    message: format!("duplicate section name '{}'", section.name),
                });
            }
            let mut field_keys = BTreeSet::new();
            for field in &section.fields {
                if !field_keys.insert(field.key.as_str()) {
                    return Err(ModelError::InvalidDefinition {
                        message: format!(
                            "duplicate field key '{}' in section '{}'",
                            field.key, section.name
                        ),
                    });
                }
            }
        }

        Ok(())
    }
}
