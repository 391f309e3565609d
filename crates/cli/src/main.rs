use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use time::format_description::well_known::Iso8601;
use time::PrimitiveDateTime;

use caliper_engine::{
    build_record, check_template, create_template, due_assignments, sync_template, RecordDraft,
    RecordOptions, RefCatalog, Strictness, SyncOutcome, ValueSubmission,
};
use caliper_model::{
    IdSequence, MachineId, Payload, ProductInstanceId, ProductionStepId, Record, TaskAssignment,
    Template, TemplateDefinition, UserId,
};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Caliper checksheet toolchain.
#[derive(Parser)]
#[command(name = "caliper", version, about = "Caliper checksheet toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a template definition against the formal JSON Schema
    Validate {
        /// Path to the template definition JSON file
        template: PathBuf,
    },

    /// Run authoring lint checks on a template definition
    Check {
        /// Path to the template definition JSON file
        template: PathBuf,
    },

    /// Build and grade a record from a template and a submission
    Eval {
        /// Path to the template definition JSON file
        #[arg(long)]
        template: PathBuf,
        /// Path to the submission JSON file
        #[arg(long)]
        submission: PathBuf,
        /// Acting user id (overrides the submission's `filled_by`)
        #[arg(long)]
        user: Option<UserId>,
        /// Reject payloads whose type disagrees with the field
        #[arg(long)]
        strict: bool,
        /// Save as DRAFT instead of submitting
        #[arg(long)]
        draft: bool,
        /// Wall-clock timestamp to evaluate at (ISO 8601, zone-naive)
        #[arg(long)]
        now: Option<String>,
    },

    /// Materialize a definition, or apply it to an existing template
    /// as the next version
    Sync {
        /// Path to the current materialized template JSON file;
        /// omit to create version 1
        #[arg(long)]
        current: Option<PathBuf>,
        /// Path to the incoming template definition JSON file
        #[arg(long)]
        incoming: PathBuf,
    },

    /// List the assignments currently due for a user
    Due {
        /// Path to the task assignments JSON file (array)
        #[arg(long)]
        assignments: PathBuf,
        /// Path to the recent records JSON file (array)
        #[arg(long)]
        records: PathBuf,
        /// User to match for
        #[arg(long)]
        user: UserId,
        /// Wall-clock timestamp to match at (ISO 8601, zone-naive)
        #[arg(long)]
        now: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { template } => {
            cmd_validate(&template, cli.output, cli.quiet);
        }
        Commands::Check { template } => {
            cmd_check(&template, cli.output, cli.quiet);
        }
        Commands::Eval {
            template,
            submission,
            user,
            strict,
            draft,
            now,
        } => {
            cmd_eval(
                &template,
                &submission,
                user,
                strict,
                draft,
                now.as_deref(),
                cli.output,
                cli.quiet,
            );
        }
        Commands::Sync { current, incoming } => {
            cmd_sync(current.as_deref(), &incoming, cli.output, cli.quiet);
        }
        Commands::Due {
            assignments,
            records,
            user,
            now,
        } => {
            cmd_due(
                &assignments,
                &records,
                user,
                now.as_deref(),
                cli.output,
                cli.quiet,
            );
        }
    }
}

static TEMPLATE_SCHEMA_STR: &str = include_str!("../../../docs/template-schema.json");

fn cmd_validate(template_path: &Path, output: OutputFormat, quiet: bool) {
    let schema: serde_json::Value = match serde_json::from_str(TEMPLATE_SCHEMA_STR) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("internal error: failed to parse embedded schema: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let validator = match jsonschema::validator_for(&schema) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("internal error: failed to compile schema: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let doc: serde_json::Value = read_json(template_path, output, quiet);

    let mut errors: Vec<String> = validator.iter_errors(&doc).map(|e| format!("{}", e)).collect();

    // Structural checks the schema cannot express (key uniqueness etc.)
    // run only once the document has the right shape.
    if errors.is_empty() {
        match serde_json::from_value::<TemplateDefinition>(doc) {
            Ok(definition) => {
                if let Err(e) = definition.validate() {
                    errors.push(e.to_string());
                }
            }
            Err(e) => errors.push(format!("malformed definition: {}", e)),
        }
    }

    if errors.is_empty() {
        if !quiet {
            match output {
                OutputFormat::Text => println!("valid"),
                OutputFormat::Json => println!("{{\"valid\": true}}"),
            }
        }
    } else {
        match output {
            OutputFormat::Text => {
                if !quiet {
                    eprintln!("invalid template definition");
                    for err in &errors {
                        eprintln!("  - {}", err);
                    }
                }
            }
            OutputFormat::Json => {
                let json = serde_json::json!({ "valid": false, "errors": errors });
                eprintln!(
                    "{}",
                    serde_json::to_string_pretty(&json).unwrap_or_default()
                );
            }
        }
        process::exit(1);
    }
}

fn cmd_check(template_path: &Path, output: OutputFormat, quiet: bool) {
    let definition: TemplateDefinition = read_json(template_path, output, quiet);
    let mut ids = IdSequence::new(1);
    let template = match create_template(&definition, &mut ids) {
        Ok(t) => t,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    let findings = check_template(&template);
    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&findings)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text => {
            for f in &findings {
                println!("{} [{}] {}: {}", f.severity, f.check, f.location, f.message);
            }
            println!(
                "{} finding{}",
                findings.len(),
                if findings.len() == 1 { "" } else { "s" }
            );
        }
    }
}

/// Submission file format: header data plus (section, field key)
/// addressed values. Field ids are internal; files address fields the
/// way an operator sees them.
#[derive(Deserialize)]
struct SubmissionFile {
    #[serde(default)]
    filled_by: Option<UserId>,
    #[serde(default)]
    machine_id: Option<MachineId>,
    #[serde(default)]
    product_instance_id: Option<ProductInstanceId>,
    #[serde(default)]
    production_step_id: Option<ProductionStepId>,
    #[serde(default)]
    header: BTreeMap<String, serde_json::Value>,
    values: Vec<SubmissionValue>,
}

#[derive(Deserialize)]
struct SubmissionValue {
    section: String,
    field: String,
    payload: Payload,
    #[serde(default)]
    repeat_index: u32,
    #[serde(default)]
    group_key: Option<String>,
}

#[allow(clippy::too_many_arguments)]
fn cmd_eval(
    template_path: &Path,
    submission_path: &Path,
    user: Option<UserId>,
    strict: bool,
    draft: bool,
    now: Option<&str>,
    output: OutputFormat,
    quiet: bool,
) {
    let definition: TemplateDefinition = read_json(template_path, output, quiet);
    let submission: SubmissionFile = read_json(submission_path, output, quiet);
    let now = parse_now(now, output, quiet);

    let mut ids = IdSequence::new(1);
    let template = match create_template(&definition, &mut ids) {
        Ok(t) => t,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    // Resolve section/key addresses to the ids the engine works with.
    let index = template.index();
    let mut values = Vec::with_capacity(submission.values.len());
    for v in &submission.values {
        let Some((_, field)) = index.field_by_key(&v.section, &v.field) else {
            let msg = format!("unknown field '{}/{}'", v.section, v.field);
            report_error(&msg, output, quiet);
            process::exit(1);
        };
        values.push(ValueSubmission {
            field_id: field.id,
            repeat_index: v.repeat_index,
            group_key: v.group_key.clone(),
            payload: v.payload.clone(),
        });
    }

    let Some(filled_by) = user.or(submission.filled_by) else {
        report_error(
            "no acting user: pass --user or set `filled_by` in the submission",
            output,
            quiet,
        );
        process::exit(1);
    };

    let record_draft = RecordDraft {
        filled_by,
        machine_id: submission.machine_id,
        product_instance_id: submission.product_instance_id,
        production_step_id: submission.production_step_id,
        header_data: submission.header.clone(),
        values,
    };
    let opts = RecordOptions {
        strictness: if strict {
            Strictness::Strict
        } else {
            Strictness::Lenient
        },
        save_as_draft: draft,
    };

    let record = match build_record(
        &template,
        &record_draft,
        &RefCatalog::permissive(),
        opts,
        ids.next_id(),
        now,
    ) {
        Ok(r) => r,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&record).unwrap_or_default()
            );
        }
        OutputFormat::Text => {
            println!(
                "{} v{} {} {}",
                template.code, record.template_version, record.status, record.overall_result
            );
            for value in &record.values {
                let label = index
                    .field(value.field_id)
                    .map(|(s, f)| format!("{}/{}", s.name, f.key))
                    .unwrap_or_else(|| value.field_id.to_string());
                println!("  {} [{}] {}", label, value.repeat_index, value.result);
            }
        }
    }
}

fn cmd_sync(
    current_path: Option<&Path>,
    incoming_path: &Path,
    output: OutputFormat,
    quiet: bool,
) {
    let incoming: TemplateDefinition = read_json(incoming_path, output, quiet);

    let outcome = match current_path {
        Some(path) => {
            let current: Template = read_json(path, output, quiet);
            let mut ids = IdSequence::new(current.max_id() + 1);
            sync_template(&current, &incoming, &mut ids)
        }
        None => {
            let mut ids = IdSequence::new(1);
            create_template(&incoming, &mut ids).map(|template| SyncOutcome {
                template,
                changes: Vec::new(),
            })
        }
    };
    let outcome = match outcome {
        Ok(o) => o,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "template": outcome.template,
                "changes": outcome.changes,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
        OutputFormat::Text => {
            println!(
                "{} -> version {}",
                outcome.template.code, outcome.template.version
            );
            let summary = outcome.to_text();
            if summary.is_empty() {
                println!("no child changes");
            } else {
                println!("{}", summary);
            }
        }
    }
}

fn cmd_due(
    assignments_path: &Path,
    records_path: &Path,
    user: UserId,
    now: Option<&str>,
    output: OutputFormat,
    quiet: bool,
) {
    let assignments: Vec<TaskAssignment> = read_json(assignments_path, output, quiet);
    let records: Vec<Record> = read_json(records_path, output, quiet);
    let now = parse_now(now, output, quiet);

    let due = due_assignments(user, now, &assignments, &records);

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&due).unwrap_or_default());
        }
        OutputFormat::Text => {
            if due.is_empty() {
                println!("nothing due");
            } else {
                for a in &due {
                    println!("{} {} (template {})", a.id, a.name, a.template_id);
                }
            }
        }
    }
}

// ── Shared plumbing ──────────────────────────────────────────────────────────

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, output: OutputFormat, quiet: bool) -> T {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("error parsing JSON in '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

/// `--now` if given, otherwise the current UTC wall clock. Timestamps
/// are zone-naive throughout; the flag exists so runs are reproducible.
fn parse_now(now: Option<&str>, output: OutputFormat, quiet: bool) -> PrimitiveDateTime {
    match now {
        Some(s) => match PrimitiveDateTime::parse(s, &Iso8601::DEFAULT) {
            Ok(t) => t,
            Err(e) => {
                let msg = format!("invalid --now timestamp '{}': {}", s, e);
                report_error(&msg, output, quiet);
                process::exit(1);
            }
        },
        None => {
            let now = time::OffsetDateTime::now_utc();
            PrimitiveDateTime::new(now.date(), now.time())
        }
    }
}

fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{{\"error\": \"{}\"}}", msg.replace('"', "\\\""));
        }
    }
}
