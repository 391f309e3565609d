//! Closed enums shared across the workspace.
//!
//! Wire values are SCREAMING_SNAKE_CASE, matching the JSON formats the
//! CLI and store exchange. `FromStr` exists for the places that receive
//! an enum as a raw string (CLI flags, header data) and must reject
//! unknown values with a typed error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::record::PayloadKind;

/// What kind of entity a template attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormContext {
    Machine,
    Product,
    General,
}

impl FormContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormContext::Machine => "MACHINE",
            FormContext::Product => "PRODUCT",
            FormContext::General => "GENERAL",
        }
    }
}

impl fmt::Display for FormContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormContext {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MACHINE" => Ok(FormContext::Machine),
            "PRODUCT" => Ok(FormContext::Product),
            "GENERAL" => Ok(FormContext::General),
            other => Err(ModelError::InvalidEnumValue {
                kind: "form context".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Input type of a section field. Closed set: the evaluator has an
/// explicit branch (or an explicit default) for every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputType {
    Number,
    Decimal,
    Boolean,
    YesNo,
    PassFail,
    Text,
    Textarea,
    Select,
    MultiSelect,
    Date,
    Time,
    Datetime,
    Photo,
    Signature,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Number => "NUMBER",
            InputType::Decimal => "DECIMAL",
            InputType::Boolean => "BOOLEAN",
            InputType::YesNo => "YES_NO",
            InputType::PassFail => "PASS_FAIL",
            InputType::Text => "TEXT",
            InputType::Textarea => "TEXTAREA",
            InputType::Select => "SELECT",
            InputType::MultiSelect => "MULTI_SELECT",
            InputType::Date => "DATE",
            InputType::Time => "TIME",
            InputType::Datetime => "DATETIME",
            InputType::Photo => "PHOTO",
            InputType::Signature => "SIGNATURE",
        }
    }

    /// True for types whose submissions are numeric payloads.
    pub fn is_numeric(&self) -> bool {
        matches!(self, InputType::Number | InputType::Decimal)
    }

    /// The payload slot a well-typed submission for this input type uses.
    ///
    /// Lenient grading never consults this; strict record creation does.
    pub fn expected_payload(&self) -> PayloadKind {
        match self {
            InputType::Number | InputType::Decimal => PayloadKind::Number,
            InputType::Boolean | InputType::YesNo | InputType::PassFail => PayloadKind::Flag,
            InputType::Text
            | InputType::Textarea
            | InputType::Select
            | InputType::Date
            | InputType::Time
            | InputType::Datetime => PayloadKind::Text,
            InputType::MultiSelect | InputType::Photo | InputType::Signature => {
                PayloadKind::Structured
            }
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NUMBER" => Ok(InputType::Number),
            "DECIMAL" => Ok(InputType::Decimal),
            "BOOLEAN" => Ok(InputType::Boolean),
            "YES_NO" => Ok(InputType::YesNo),
            "PASS_FAIL" => Ok(InputType::PassFail),
            "TEXT" => Ok(InputType::Text),
            "TEXTAREA" => Ok(InputType::Textarea),
            "SELECT" => Ok(InputType::Select),
            "MULTI_SELECT" => Ok(InputType::MultiSelect),
            "DATE" => Ok(InputType::Date),
            "TIME" => Ok(InputType::Time),
            "DATETIME" => Ok(InputType::Datetime),
            "PHOTO" => Ok(InputType::Photo),
            "SIGNATURE" => Ok(InputType::Signature),
            other => Err(ModelError::InvalidEnumValue {
                kind: "input type".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Input type of a template header field (the once-per-record metadata
/// inputs, outside sections).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeaderFieldType {
    Text,
    Number,
    Date,
    Select,
}

impl HeaderFieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderFieldType::Text => "TEXT",
            HeaderFieldType::Number => "NUMBER",
            HeaderFieldType::Date => "DATE",
            HeaderFieldType::Select => "SELECT",
        }
    }
}

impl fmt::Display for HeaderFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderFieldType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TEXT" => Ok(HeaderFieldType::Text),
            "NUMBER" => Ok(HeaderFieldType::Number),
            "DATE" => Ok(HeaderFieldType::Date),
            "SELECT" => Ok(HeaderFieldType::Select),
            other => Err(ModelError::InvalidEnumValue {
                kind: "header field type".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Draft => "DRAFT",
            RecordStatus::Submitted => "SUBMITTED",
            RecordStatus::Approved => "APPROVED",
            RecordStatus::Rejected => "REJECTED",
        }
    }

    /// APPROVED and REJECTED admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RecordStatus::Approved | RecordStatus::Rejected)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(RecordStatus::Draft),
            "SUBMITTED" => Ok(RecordStatus::Submitted),
            "APPROVED" => Ok(RecordStatus::Approved),
            "REJECTED" => Ok(RecordStatus::Rejected),
            other => Err(ModelError::InvalidEnumValue {
                kind: "record status".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Grading result of a single submitted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueResult {
    Pass,
    Warning,
    Fail,
}

impl ValueResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueResult::Pass => "PASS",
            ValueResult::Warning => "WARNING",
            ValueResult::Fail => "FAIL",
        }
    }
}

impl fmt::Display for ValueResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueResult {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PASS" => Ok(ValueResult::Pass),
            "WARNING" => Ok(ValueResult::Warning),
            "FAIL" => Ok(ValueResult::Fail),
            other => Err(ModelError::InvalidEnumValue {
                kind: "value result".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Rolled-up result of a whole record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallResult {
    Pass,
    Partial,
    Fail,
}

impl OverallResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallResult::Pass => "PASS",
            OverallResult::Partial => "PARTIAL",
            OverallResult::Fail => "FAIL",
        }
    }
}

impl fmt::Display for OverallResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverallResult {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PASS" => Ok(OverallResult::Pass),
            "PARTIAL" => Ok(OverallResult::Partial),
            "FAIL" => Ok(OverallResult::Fail),
            other => Err(ModelError::InvalidEnumValue {
                kind: "overall result".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Whether a task assignment recurs weekly or fires on a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentKind {
    Once,
    Recurring,
}

impl AssignmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentKind::Once => "ONCE",
            AssignmentKind::Recurring => "RECURRING",
        }
    }
}

impl fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONCE" => Ok(AssignmentKind::Once),
            "RECURRING" => Ok(AssignmentKind::Recurring),
            other => Err(ModelError::InvalidEnumValue {
                kind: "assignment kind".to_string(),
                value: other.to_string(),
            }),
        }
    }
}
