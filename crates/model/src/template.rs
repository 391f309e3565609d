//! Versioned checksheet templates: header fields, sections, fields.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{FormContext, HeaderFieldType, InputType};
use crate::ids::{
    FieldId, HeaderFieldId, MachineId, ProductId, SectionId, TemplateId, UserId,
};

fn default_true() -> bool {
    true
}

/// Optional trigger scope of a template: a set of machines or a product.
///
/// Advisory, not enforced exclusive against the template's context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateScope {
    Machines(Vec<MachineId>),
    Product(ProductId),
}

/// A template-level metadata input, captured once per record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderField {
    pub id: HeaderFieldId,
    /// Unique within the template; the sync key.
    pub key: String,
    pub label: String,
    pub field_type: HeaderFieldType,
    /// SELECT choices; empty for other types.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default_value: Option<serde_json::Value>,
    #[serde(default = "default_true")]
    pub active: bool,
    pub position: u32,
}

/// A single input definition with an input type and optional grading
/// rules. Bounds, target/tolerance, both, or neither are all legal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub position: u32,
    /// Unique within the section; the sync key.
    pub key: String,
    pub label: String,
    pub input_type: InputType,
    /// Hard lower bound: a numeric submission below it fails.
    #[serde(default)]
    pub min_value: Option<Decimal>,
    /// Hard upper bound: a numeric submission above it fails.
    #[serde(default)]
    pub max_value: Option<Decimal>,
    /// Soft target; only graded when `tolerance` is also set.
    #[serde(default)]
    pub target_value: Option<Decimal>,
    /// Allowed deviation from `target_value`, boundary inclusive.
    #[serde(default)]
    pub tolerance: Option<Decimal>,
    #[serde(default)]
    pub decimal_places: Option<u32>,
    #[serde(default)]
    pub required: bool,
    /// Free-text condition carried for operators; never evaluated here.
    #[serde(default)]
    pub fail_condition: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    /// SELECT / MULTI_SELECT choices.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// A named, ordered group of fields; may repeat (once per sample, per
/// shift, ...) or carry group labels for matrix-style capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub position: u32,
    /// Unique within the template; the sync key.
    pub name: String,
    #[serde(default)]
    pub is_repeatable: bool,
    #[serde(default)]
    pub repeat_count: Option<u32>,
    /// Label pattern for repeat instances, e.g. "Sample {n}".
    #[serde(default)]
    pub repeat_label_pattern: Option<String>,
    /// Column labels for matrix-style sections; presentation only.
    #[serde(default)]
    pub group_labels: Vec<String>,
    pub fields: Vec<Field>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Section {
    /// Number of repeat slots a value's `repeat_index` may address.
    pub fn repeat_limit(&self) -> u32 {
        if self.is_repeatable {
            self.repeat_count.unwrap_or(1).max(1)
        } else {
            1
        }
    }
}

/// A versioned, schema-driven definition of a QC form.
///
/// `version` starts at 1 and increments by exactly 1 on every
/// successful sync, independent of how many children changed.
/// Deactivated children stay in place so historical records keep
/// valid field references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    /// Unique business code, e.g. "QC001".
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub context: FormContext,
    #[serde(default)]
    pub header_fields: Vec<HeaderField>,
    pub sections: Vec<Section>,
    pub version: u32,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub requires_approval: bool,
    /// Gates DRAFT creation: partial saves are refused when false.
    #[serde(default)]
    pub allow_partial_save: bool,
    #[serde(default)]
    pub company_id: Option<UserId>,
    #[serde(default)]
    pub scope: Option<TemplateScope>,
}

impl Template {
    /// Build O(1) lookup indexes over this template's children.
    ///
    /// Borrowed, not stored: a template travels through serde and the
    /// store as plain data, and the engine indexes it once per call.
    pub fn index(&self) -> TemplateIndex<'_> {
        TemplateIndex::new(self)
    }

    /// Highest child id in use, for seeding an id sequence before sync.
    pub fn max_id(&self) -> u64 {
        let mut max = self.id;
        for hf in &self.header_fields {
            max = max.max(hf.id);
        }
        for section in &self.sections {
            max = max.max(section.id);
            for field in &section.fields {
                max = max.max(field.id);
            }
        }
        max
    }
}

/// Lookup indexes over one template, keyed by field id, by
/// (section name, field key), and by header-field key.
pub struct TemplateIndex<'a> {
    template: &'a Template,
    by_field_id: HashMap<FieldId, (usize, usize)>,
    by_key: HashMap<(&'a str, &'a str), (usize, usize)>,
    header_by_key: HashMap<&'a str, usize>,
}

impl<'a> TemplateIndex<'a> {
    fn new(template: &'a Template) -> Self {
        let mut by_field_id = HashMap::new();
        let mut by_key = HashMap::new();
        for (si, section) in template.sections.iter().enumerate() {
            for (fi, field) in section.fields.iter().enumerate() {
                by_field_id.insert(field.id, (si, fi));
                by_key.insert((section.name.as_str(), field.key.as_str()), (si, fi));
            }
        }
        let header_by_key = template
            .header_fields
            .iter()
            .enumerate()
            .map(|(i, hf)| (hf.key.as_str(), i))
            .collect();
        TemplateIndex {
            template,
            by_field_id,
            by_key,
            header_by_key,
        }
    }

    /// Resolve a field id to its section and field.
    pub fn field(&self, id: FieldId) -> Option<(&'a Section, &'a Field)> {
        let (si, fi) = *self.by_field_id.get(&id)?;
        let section = &self.template.sections[si];
        Some((section, &section.fields[fi]))
    }

    /// Resolve a (section name, field key) pair.
    pub fn field_by_key(&self, section: &str, key: &str) -> Option<(&'a Section, &'a Field)> {
        let (si, fi) = *self.by_key.get(&(section, key))?;
        let s = &self.template.sections[si];
        Some((s, &s.fields[fi]))
    }

    pub fn header_field(&self, key: &str) -> Option<&'a HeaderField> {
        let i = *self.header_by_key.get(key)?;
        Some(&self.template.header_fields[i])
    }
}
