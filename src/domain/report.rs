use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::batch_result::BatchResult;
use super::model_type::ModelType;

/// Visual emphasis of a table cell, drawn as a badge colour by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Warning,
    Danger,
    Info,
    Primary,
    Dark,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: None,
        }
    }

    pub fn badge(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone: Some(tone),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// One aggregate line of the statistics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    pub label: String,
    /// Raw aggregate, for callers that want to format it themselves.
    pub value: f64,
    pub display: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
    Line,
    Doughnut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    /// Overrides the chart kind for this dataset (mixed bar/line charts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ChartKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub id: String,
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

/// Everything produced for one successful batch submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub model: ModelType,
    pub table: ResultTable,
    pub statistics: Vec<StatRow>,
    pub chart: Chart,
    /// Kept with the report so the caller can hand it back for CSV export.
    pub results: BatchResult,
}

/// Suggested credit limit next to the current one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitChange {
    pub current_limit: String,
    pub suggested_limit: String,
    pub change: Cell,
}

/// Score gauge of one application or behavior check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub customer_id: String,
    pub credit_score: f64,
    /// Position of the score on the 300..850 scale, 0 to 100.
    pub score_percent: f64,
    pub score_tone: Tone,
    pub risk_level: Cell,
    pub default_probability: String,
    pub suggested_action: Cell,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<LimitChange>,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionCard {
    pub customer_id: String,
    pub probability: Cell,
    pub risk_level: Cell,
    pub primary_reason: String,
    pub retention_strategy: String,
    pub action_plan: Vec<String>,
    pub retention_cost: String,
    pub retention_roi: Cell,
}

/// Ranked accounts of one collections form; `highlights` holds the row tone
/// of each ranked row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTable {
    pub table: ResultTable,
    pub highlights: Vec<Option<Tone>>,
}

/// The rendered outcome of one interactive form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", content = "view", rename_all = "lowercase")]
pub enum SingleReport {
    Application(ScoreCard),
    Behavior(ScoreCard),
    Collections(RankedTable),
    Desertion(RetentionCard),
}
