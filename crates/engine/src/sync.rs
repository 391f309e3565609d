//! Template creation and natural-key versioned sync.
//!
//! Children are matched to their existing counterparts by business key
//! (`key` for header fields and fields, `name` for sections), never by
//! array position. Matched children keep their id, so the value history
//! of a field survives reordering and relabeling; unmatched existing
//! children are deactivated in place; unmatched incoming children are
//! created fresh. The version counter moves by exactly 1 per sync.

use caliper_model::{
    Field, FieldDefinition, HeaderField, HeaderFieldDefinition, IdSequence, Section,
    SectionDefinition, Template, TemplateDefinition,
};
use serde::Serialize;

use crate::error::EngineError;
use crate::merge::{merge_plan, MergeStep};

/// What happened to one child during a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeAction {
    Created,
    Updated,
    Deactivated,
}

/// One child-level change, for audit output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildChange {
    /// "header_field", "section", or "field".
    pub kind: &'static str,
    /// Business key, qualified with the section name for fields.
    pub key: String,
    pub action: ChangeAction,
}

/// Result of a successful sync: the new template version plus the list
/// of child changes it applied.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub template: Template,
    pub changes: Vec<ChildChange>,
}

impl SyncOutcome {
    /// Human-readable change summary, one `+`/`~`/`-` line per child.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();
        for c in &self.changes {
            let marker = match c.action {
                ChangeAction::Created => '+',
                ChangeAction::Updated => '~',
                ChangeAction::Deactivated => '-',
            };
            lines.push(format!("{} {} {}", marker, c.kind, c.key));
        }
        lines.join("\n")
    }
}

/// Materialize a brand-new template (version 1) from a definition.
pub fn create_template(
    definition: &TemplateDefinition,
    ids: &mut IdSequence,
) -> Result<Template, EngineError> {
    definition.validate()?;

    let id = ids.next_id();
    let header_fields = definition
        .header_fields
        .iter()
        .enumerate()
        .map(|(pos, def)| build_header_field(ids.next_id(), pos as u32, def))
        .collect();
    let sections = definition
        .sections
        .iter()
        .enumerate()
        .map(|(pos, def)| {
            let sid = ids.next_id();
            let fields = def
                .fields
                .iter()
                .enumerate()
                .map(|(fpos, fdef)| build_field(ids.next_id(), fpos as u32, fdef))
                .collect();
            build_section(sid, pos as u32, def, fields)
        })
        .collect();

    Ok(Template {
        id,
        code: definition.code.clone(),
        name: definition.name.clone(),
        description: definition.description.clone(),
        context: definition.context,
        header_fields,
        sections,
        version: 1,
        active: true,
        requires_approval: definition.requires_approval,
        allow_partial_save: definition.allow_partial_save,
        company_id: definition.company_id,
        scope: definition.scope.clone(),
    })
}

/// Apply a definition to an existing template, producing the next
/// version.
///
/// Top-level attributes (name, description, context, flags, scope) are
/// taken from the incoming definition; `code` is identity and stays.
/// The caller seeds `ids` past the template's highest id in use.
pub fn sync_template(
    existing: &Template,
    incoming: &TemplateDefinition,
    ids: &mut IdSequence,
) -> Result<SyncOutcome, EngineError> {
    incoming.validate()?;

    let mut changes = Vec::new();

    let header_fields = sync_header_fields(existing, incoming, ids, &mut changes);
    let sections = sync_sections(existing, incoming, ids, &mut changes);

    let template = Template {
        id: existing.id,
        code: existing.code.clone(),
        name: incoming.name.clone(),
        description: incoming.description.clone(),
        context: incoming.context,
        header_fields,
        sections,
        version: existing.version + 1,
        active: existing.active,
        requires_approval: incoming.requires_approval,
        allow_partial_save: incoming.allow_partial_save,
        company_id: incoming.company_id,
        scope: incoming.scope.clone(),
    };

    Ok(SyncOutcome { template, changes })
}

fn sync_header_fields(
    existing: &Template,
    incoming: &TemplateDefinition,
    ids: &mut IdSequence,
    changes: &mut Vec<ChildChange>,
) -> Vec<HeaderField> {
    let existing_keys: Vec<&str> = existing
        .header_fields
        .iter()
        .map(|hf| hf.key.as_str())
        .collect();
    let incoming_keys: Vec<&str> = incoming
        .header_fields
        .iter()
        .map(|hf| hf.key.as_str())
        .collect();

    let mut out = Vec::new();
    let mut position = 0u32;
    for step in merge_plan(&existing_keys, &incoming_keys) {
        match step {
            MergeStep::Matched {
                existing: ei,
                incoming: ii,
            } => {
                let old = &existing.header_fields[ei];
                let built = build_header_field(old.id, position, &incoming.header_fields[ii]);
                if built != *old {
                    changes.push(ChildChange {
                        kind: "header_field",
                        key: built.key.clone(),
                        action: ChangeAction::Updated,
                    });
                }
                out.push(built);
                position += 1;
            }
            MergeStep::Added { incoming: ii } => {
                let built = build_header_field(ids.next_id(), position, &incoming.header_fields[ii]);
                changes.push(ChildChange {
                    kind: "header_field",
                    key: built.key.clone(),
                    action: ChangeAction::Created,
                });
                out.push(built);
                position += 1;
            }
            MergeStep::Removed { existing: ei } => {
                let mut old = existing.header_fields[ei].clone();
                if old.active {
                    changes.push(ChildChange {
                        kind: "header_field",
                        key: old.key.clone(),
                        action: ChangeAction::Deactivated,
                    });
                }
                old.active = false;
                out.push(old);
            }
        }
    }
    out
}

fn sync_sections(
    existing: &Template,
    incoming: &TemplateDefinition,
    ids: &mut IdSequence,
    changes: &mut Vec<ChildChange>,
) -> Vec<Section> {
    let existing_names: Vec<&str> = existing
        .sections
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    let incoming_names: Vec<&str> = incoming
        .sections
        .iter()
        .map(|s| s.name.as_str())
        .collect();

    let mut out = Vec::new();
    let mut position = 0u32;
    for step in merge_plan(&existing_names, &incoming_names) {
        match step {
            MergeStep::Matched {
                existing: ei,
                incoming: ii,
            } => {
                let old = &existing.sections[ei];
                let def = &incoming.sections[ii];
                let fields = sync_fields(old, def, ids, changes);
                let built = build_section(old.id, position, def, fields);
                if built != *old {
                    changes.push(ChildChange {
                        kind: "section",
                        key: built.name.clone(),
                        action: ChangeAction::Updated,
                    });
                }
                out.push(built);
                position += 1;
            }
            MergeStep::Added { incoming: ii } => {
                let def = &incoming.sections[ii];
                let sid = ids.next_id();
                let fields = def
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(fpos, fdef)| build_field(ids.next_id(), fpos as u32, fdef))
                    .collect();
                let built = build_section(sid, position, def, fields);
                changes.push(ChildChange {
                    kind: "section",
                    key: built.name.clone(),
                    action: ChangeAction::Created,
                });
                out.push(built);
                position += 1;
            }
            MergeStep::Removed { existing: ei } => {
                let mut old = existing.sections[ei].clone();
                if old.active {
                    changes.push(ChildChange {
                        kind: "section",
                        key: old.name.clone(),
                        action: ChangeAction::Deactivated,
                    });
                }
                old.active = false;
                out.push(old);
            }
        }
    }
    out
}

fn sync_fields(
    old_section: &Section,
    def: &SectionDefinition,
    ids: &mut IdSequence,
    changes: &mut Vec<ChildChange>,
) -> Vec<Field> {
    let existing_keys: Vec<&str> = old_section.fields.iter().map(|f| f.key.as_str()).collect();
    let incoming_keys: Vec<&str> = def.fields.iter().map(|f| f.key.as_str()).collect();

    let qualify = |key: &str| format!("{}/{}", def.name, key);

    let mut out = Vec::new();
    let mut position = 0u32;
    for step in merge_plan(&existing_keys, &incoming_keys) {
        match step {
            MergeStep::Matched {
                existing: ei,
                incoming: ii,
            } => {
                let old = &old_section.fields[ei];
                let built = build_field(old.id, position, &def.fields[ii]);
                if built != *old {
                    changes.push(ChildChange {
                        kind: "field",
                        key: qualify(&built.key),
                        action: ChangeAction::Updated,
                    });
                }
                out.push(built);
                position += 1;
            }
            MergeStep::Added { incoming: ii } => {
                let built = build_field(ids.next_id(), position, &def.fields[ii]);
                changes.push(ChildChange {
                    kind: "field",
                    key: qualify(&built.key),
                    action: ChangeAction::Created,
                });
                out.push(built);
                position += 1;
            }
            MergeStep::Removed { existing: ei } => {
                let mut old = old_section.fields[ei].clone();
                if old.active {
                    changes.push(ChildChange {
                        kind: "field",
                        key: format!("{}/{}", old_section.name, old.key),
                        action: ChangeAction::Deactivated,
                    });
                }
                old.active = false;
                out.push(old);
            }
        }
    }
    out
}

fn build_header_field(id: u64, position: u32, def: &HeaderFieldDefinition) -> HeaderField {
    HeaderField {
        id,
        key: def.key.clone(),
        label: def.label.clone(),
        field_type: def.field_type,
        options: def.options.clone(),
        required: def.required,
        default_value: def.default_value.clone(),
        active: true,
        position,
    }
}

fn build_section(id: u64, position: u32, def: &SectionDefinition, fields: Vec<Field>) -> Section {
    Section {
        id,
        position,
        name: def.name.clone(),
        is_repeatable: def.is_repeatable,
        repeat_count: def.repeat_count,
        repeat_label_pattern: def.repeat_label_pattern.clone(),
        group_labels: def.group_labels.clone(),
        fields,
        active: true,
    }
}

fn build_field(id: u64, position: u32, def: &FieldDefinition) -> Field {
    Field {
        id,
        position,
        key: def.key.clone(),
        label: def.label.clone(),
        input_type: def.input_type,
        min_value: def.min_value,
        max_value: def.max_value,
        target_value: def.target_value,
        tolerance: def.tolerance,
        decimal_places: def.decimal_places,
        required: def.required,
        fail_condition: def.fail_condition.clone(),
        unit: def.unit.clone(),
        placeholder: def.placeholder.clone(),
        width: def.width,
        options: def.options.clone(),
        active: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caliper_model::{FormContext, InputType};
    use serde_json::json;

    fn definition(fields: serde_json::Value) -> TemplateDefinition {
        serde_json::from_value(json!({
            "code": "QC001",
            "name": "Line check",
            "context": "MACHINE",
            "sections": [{"name": "Measurements", "fields": fields}]
        }))
        .unwrap()
    }

    fn field_def(key: &str) -> serde_json::Value {
        json!({"key": key, "label": key, "input_type": "NUMBER"})
    }

    #[test]
    fn create_assigns_fresh_ids_and_version_one() {
        let def = definition(json!([field_def("temperature"), field_def("pressure")]));
        let mut ids = IdSequence::new(1);
        let t = create_template(&def, &mut ids).unwrap();
        assert_eq!(t.version, 1);
        assert_eq!(t.id, 1);
        assert_eq!(t.context, FormContext::Machine);
        assert_eq!(t.sections[0].fields[0].id, 3);
        assert_eq!(t.sections[0].fields[1].id, 4);
        assert!(t.active);
    }

    #[test]
    fn sync_bumps_version_by_exactly_one() {
        let def = definition(json!([field_def("temperature")]));
        let mut ids = IdSequence::new(1);
        let mut t = create_template(&def, &mut ids).unwrap();
        for expected in 2..=5 {
            t = sync_template(&t, &def, &mut ids).unwrap().template;
            assert_eq!(t.version, expected);
        }
    }

    #[test]
    fn matched_field_keeps_its_id_across_reorder_and_relabel() {
        let def = definition(json!([field_def("temperature"), field_def("pressure")]));
        let mut ids = IdSequence::new(1);
        let t1 = create_template(&def, &mut ids).unwrap();
        let temp_id = t1.index().field_by_key("Measurements", "temperature").unwrap().1.id;

        // Reorder the fields and relabel temperature.
        let def2 = definition(json!([
            field_def("pressure"),
            {"key": "temperature", "label": "Temp (C)", "input_type": "NUMBER"}
        ]));
        let t2 = sync_template(&t1, &def2, &mut ids).unwrap().template;

        let (_, temp2) = t2.index().field_by_key("Measurements", "temperature").unwrap();
        assert_eq!(temp2.id, temp_id);
        assert_eq!(temp2.label, "Temp (C)");
        assert_eq!(temp2.position, 1);
    }

    #[test]
    fn unmatched_existing_field_is_deactivated_not_deleted() {
        let def = definition(json!([field_def("temperature"), field_def("pressure")]));
        let mut ids = IdSequence::new(1);
        let t1 = create_template(&def, &mut ids).unwrap();
        let pressure_id = t1.index().field_by_key("Measurements", "pressure").unwrap().1.id;

        let def2 = definition(json!([field_def("temperature")]));
        let outcome = sync_template(&t1, &def2, &mut ids).unwrap();
        let t2 = outcome.template;

        // Still addressable by id, just inactive.
        let (_, pressure) = t2.index().field(pressure_id).unwrap();
        assert!(!pressure.active);
        assert!(outcome.changes.iter().any(|c| c.kind == "field"
            && c.key == "Measurements/pressure"
            && c.action == ChangeAction::Deactivated));
    }

    #[test]
    fn unmatched_incoming_field_is_created_fresh() {
        let def = definition(json!([field_def("temperature")]));
        let mut ids = IdSequence::new(1);
        let t1 = create_template(&def, &mut ids).unwrap();
        let max_before = t1.max_id();

        let def2 = definition(json!([field_def("temperature"), field_def("humidity")]));
        let outcome = sync_template(&t1, &def2, &mut ids).unwrap();

        let (_, humidity) = outcome
            .template
            .index()
            .field_by_key("Measurements", "humidity")
            .unwrap();
        assert!(humidity.id > max_before);
        assert!(outcome.changes.iter().any(|c| c.action == ChangeAction::Created));
    }

    #[test]
    fn noop_sync_reports_no_changes() {
        let def = definition(json!([field_def("temperature")]));
        let mut ids = IdSequence::new(1);
        let t1 = create_template(&def, &mut ids).unwrap();
        let outcome = sync_template(&t1, &def, &mut ids).unwrap();
        assert!(outcome.changes.is_empty(), "got: {:?}", outcome.changes);
        assert_eq!(outcome.template.version, 2);
    }

    #[test]
    fn section_rename_deactivates_old_and_creates_new() {
        // Sections match by name; a rename is a remove plus an add.
        let def = definition(json!([field_def("temperature")]));
        let mut ids = IdSequence::new(1);
        let t1 = create_template(&def, &mut ids).unwrap();

        let def2: TemplateDefinition = serde_json::from_value(json!({
            "code": "QC001",
            "name": "Line check",
            "context": "MACHINE",
            "sections": [{"name": "Checks", "fields": [field_def("temperature")]}]
        }))
        .unwrap();
        let t2 = sync_template(&t1, &def2, &mut ids).unwrap().template;

        assert_eq!(t2.sections.len(), 2);
        assert_eq!(t2.sections[0].name, "Checks");
        assert!(t2.sections[0].active);
        assert_eq!(t2.sections[1].name, "Measurements");
        assert!(!t2.sections[1].active);
    }

    #[test]
    fn sync_takes_attributes_from_incoming_but_keeps_code() {
        let def = definition(json!([field_def("temperature")]));
        let mut ids = IdSequence::new(1);
        let t1 = create_template(&def, &mut ids).unwrap();

        let mut def2 = def.clone();
        def2.code = "QC999".to_string();
        def2.name = "Renamed check".to_string();
        def2.allow_partial_save = true;
        let t2 = sync_template(&t1, &def2, &mut ids).unwrap().template;

        assert_eq!(t2.code, "QC001");
        assert_eq!(t2.name, "Renamed check");
        assert!(t2.allow_partial_save);
    }

    #[test]
    fn invalid_incoming_definition_is_rejected() {
        let def = definition(json!([field_def("temperature")]));
        let mut ids = IdSequence::new(1);
        let t1 = create_template(&def, &mut ids).unwrap();

        let bad = definition(json!([field_def("temperature"), field_def("temperature")]));
        let err = sync_template(&t1, &bad, &mut ids).unwrap_err();
        assert!(matches!(err, EngineError::Model(_)));
    }

    #[test]
    fn change_summary_text_uses_diff_markers() {
        let def = definition(json!([field_def("temperature")]));
        let mut ids = IdSequence::new(1);
        let t1 = create_template(&def, &mut ids).unwrap();

        let def2 = definition(json!([field_def("humidity")]));
        let outcome = sync_template(&t1, &def2, &mut ids).unwrap();
        let text = outcome.to_text();
        assert!(text.contains("+ field Measurements/humidity"), "got: {}", text);
        assert!(text.contains("- field Measurements/temperature"), "got: {}", text);
    }
}
