//! # Schema Document AST
//!
//! The typed shape of a parsed schema document. These types derive `serde`
//! so an external loader (the CLI's YAML reader) can deserialize straight
//! into them — this crate never touches a YAML or JSON-Schema library
//! itself, it only declares the shape the loader must produce.
//!
//! `#[serde(deny_unknown_fields)]` on [`SchemaDocument`] is what rejects any
//! top-level key other than `columns`/`tables`; everything downstream of
//! that is the Validator's job, not serde's.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level parsed schema document: reusable column definitions plus tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaDocument {
    pub columns: IndexMap<String, ColumnDef>,
    pub tables: IndexMap<String, TableDef>,
}

/// A dialect-neutral SQL type name, as named in the schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlType {
    Integer,
    Varchar,
    Numeric,
    Text,
    Date,
    Timestamp,
    Boolean,
    Char,
    Bit,
    Decimal,
    Json,
}

impl SqlType {
    /// Size rules from §3: REQUIRED for varchar|char|bit, OPTIONAL for
    /// numeric|decimal, PROHIBITED otherwise.
    pub fn size_requirement(self) -> SizeRequirement {
        match self {
            SqlType::Varchar | SqlType::Char | SqlType::Bit => SizeRequirement::Required,
            SqlType::Numeric | SqlType::Decimal => SizeRequirement::Optional,
            _ => SizeRequirement::Prohibited,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, SqlType::Integer | SqlType::Numeric | SqlType::Decimal)
    }

    pub fn is_string(self) -> bool {
        matches!(self, SqlType::Varchar | SqlType::Text | SqlType::Char)
    }

    pub fn is_boolean(self) -> bool {
        matches!(self, SqlType::Boolean)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRequirement {
    Required,
    Optional,
    Prohibited,
}

/// A fully specified column definition — used both for entries under the
/// top-level `columns` map and for the "full definition, no inheritance"
/// table-column variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    #[serde(rename = "type")]
    pub sql_type: SqlType,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub decimal: Option<u32>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub sequence: bool,
    #[serde(default)]
    pub automation: Option<AutomationDirective>,
    #[serde(default)]
    pub calculated: Option<String>,
}

impl ColumnDef {
    pub fn has_automation_and_calculated(&self) -> bool {
        self.automation.is_some() && self.calculated.is_some()
    }

    /// Apply a field-level overlay (from a `$ref` entry) on top of this
    /// definition. Overlay is field replacement, never deep-merge.
    pub fn overlaid(&self, overrides: &ColumnOverride) -> ColumnDef {
        ColumnDef {
            sql_type: overrides.sql_type.unwrap_or(self.sql_type),
            size: overrides.size.or(self.size),
            decimal: overrides.decimal.or(self.decimal),
            primary_key: overrides.primary_key.unwrap_or(self.primary_key),
            unique: overrides.unique.unwrap_or(self.unique),
            sequence: overrides.sequence.unwrap_or(self.sequence),
            automation: overrides
                .automation
                .clone()
                .or_else(|| self.automation.clone()),
            calculated: overrides.calculated.clone().or_else(|| self.calculated.clone()),
        }
    }
}

/// Field-level overrides carried by a `$ref` table-column entry. Every
/// field is optional: only fields explicitly present overlay the inherited
/// definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnOverride {
    #[serde(rename = "type", default)]
    pub sql_type: Option<SqlType>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub decimal: Option<u32>,
    #[serde(default)]
    pub primary_key: Option<bool>,
    #[serde(default)]
    pub unique: Option<bool>,
    #[serde(default)]
    pub sequence: Option<bool>,
    #[serde(default)]
    pub automation: Option<AutomationDirective>,
    #[serde(default)]
    pub calculated: Option<String>,
}

/// An object-with-`$ref` table-column entry: inherit `reference`, then
/// overlay `overrides` field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefColumnEntry {
    #[serde(rename = "$ref")]
    pub reference: String,
    #[serde(flatten)]
    pub overrides: ColumnOverride,
}

/// One entry of a table's `columns` map. The *null* variant (inherit the
/// reusable column of the same key) is represented at the call site as
/// `Option<TableColumnEntry> == None`, since that is how a YAML mapping
/// value of `null` deserializes — see [`TableDef::columns`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableColumnEntry {
    /// object with `$ref`
    Ref(RefColumnEntry),
    /// full column definition object, no inheritance
    Full(ColumnDef),
    /// string S — inherit the reusable column named S
    Inherit(String),
}

/// `type ∈ {SUM, COUNT, MAX, MIN, LATEST, SNAPSHOT, FOLLOW}`, with
/// `FETCH`/`FETCH_UPDATES` accepted as aliases for `SNAPSHOT`/`FOLLOW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AutomationType {
    Sum,
    Count,
    Max,
    Min,
    Latest,
    Snapshot,
    Follow,
}

impl AutomationType {
    pub fn is_aggregation(self) -> bool {
        matches!(
            self,
            AutomationType::Sum
                | AutomationType::Count
                | AutomationType::Max
                | AutomationType::Min
                | AutomationType::Latest
        )
    }

    pub fn is_cascade(self) -> bool {
        matches!(self, AutomationType::Snapshot | AutomationType::Follow)
    }
}

impl<'de> Deserialize<'de> for AutomationType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.to_uppercase().as_str() {
            "SUM" => Ok(AutomationType::Sum),
            "COUNT" => Ok(AutomationType::Count),
            "MAX" => Ok(AutomationType::Max),
            "MIN" => Ok(AutomationType::Min),
            "LATEST" => Ok(AutomationType::Latest),
            "SNAPSHOT" | "FETCH" => Ok(AutomationType::Snapshot),
            "FOLLOW" | "FETCH_UPDATES" => Ok(AutomationType::Follow),
            other => Err(serde::de::Error::custom(format!(
                "unknown automation type '{}'",
                other
            ))),
        }
    }
}

/// An automation directive. For aggregations, `table`/`foreign_key` name
/// the child table and the FK *in the child* pointing back to the table
/// this directive is declared on. For cascades, `table`/`foreign_key` name
/// the parent table and the FK *in this table* pointing at it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationDirective {
    #[serde(rename = "type")]
    pub automation_type: AutomationType,
    pub table: String,
    pub foreign_key: String,
    pub column: String,
}

/// `ON DELETE` policy carried by a foreign-key directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    #[default]
    NoAction,
    Cascade,
    Restrict,
    SetNull,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeyDirective {
    pub table: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub on_delete: DeletePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UiNote {
    Singleton,
    NoInsert,
    NoUpdate,
    NoDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncDirection {
    #[default]
    Push,
    Pull,
    Bidirectional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOp {
    Insert,
    Update,
    Delete,
}

fn default_sync_ops() -> Vec<SyncOp> {
    vec![SyncOp::Insert, SyncOp::Update, SyncOp::Delete]
}

/// A row-mirroring directive: table S (the owner of this entry) propagates
/// row changes into table T (the map key under `sync`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncDirective {
    #[serde(default)]
    pub direction: SyncDirection,
    #[serde(default = "default_sync_ops")]
    pub operations: Vec<SyncOp>,
    pub match_columns: IndexMap<String, String>,
    #[serde(default)]
    pub match_conditions: Vec<String>,
    #[serde(default)]
    pub column_map: IndexMap<String, String>,
    #[serde(default)]
    pub literals: IndexMap<String, serde_json::Value>,
}

/// The three columns on S that define the date range to spread across T.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadGenerate {
    pub start_date: String,
    pub end_date: String,
    pub interval: String,
}

/// A row-multiplication directive: each row of S expands into many rows of
/// T (the map key under `spread`) over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadDirective {
    pub generate: SpreadGenerate,
    #[serde(default)]
    pub column_map: IndexMap<String, String>,
    #[serde(default)]
    pub literals: IndexMap<String, serde_json::Value>,
    pub tracking_column: String,
}

/// A table definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableDef {
    /// `None` values are the *null* inheritance variant: inherit the
    /// reusable column of the same key.
    pub columns: IndexMap<String, Option<TableColumnEntry>>,
    pub foreign_keys: IndexMap<String, ForeignKeyDirective>,
    pub ui_notes: Vec<UiNote>,
    pub sync: IndexMap<String, SyncDirective>,
    pub spread: IndexMap<String, SpreadDirective>,
    /// Seed rows, carried through unchanged. Consumed only by the
    /// content-seed INSERT generator, which is out of scope for this
    /// compiler (§1) — the core never interprets these values.
    pub content: Vec<IndexMap<String, serde_json::Value>>,
}
