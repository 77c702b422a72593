// ============================================================
// RESULT RENDERER
// ============================================================
// Build the result table, statistics and distribution chart of a batch,
// plus the flat rows used for CSV export

use crate::domain::batch_result::{
    ApplicationResult, BatchResult, BehaviorResult, CollectionsResult, DesertionResult,
};
use crate::domain::model_type::ModelType;
use crate::domain::record::format_number;
use crate::domain::report::{Cell, Chart, ChartDataset, ChartKind, ResultTable, StatRow, Tone};
use crate::shared::format::{format_change, format_currency, format_fixed, format_percent};

pub const UNKNOWN_CATEGORY: &str = "Unknown";
pub(crate) const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub table: ResultTable,
    pub statistics: Vec<StatRow>,
    pub chart: Chart,
}

/// Render a batch result in one pass over its records.
pub fn render(results: &BatchResult) -> Rendered {
    match results {
        BatchResult::Application(records) => render_application(records),
        BatchResult::Behavior(records) => render_behavior(records),
        BatchResult::Collections(records) => render_collections(records),
        BatchResult::Desertion(records) => render_desertion(records),
    }
}

pub fn risk_tone(level: &str) -> Tone {
    match level {
        "Low" | "Thấp" => Tone::Success,
        "Medium" | "Trung bình" => Tone::Warning,
        "High" | "Cao" => Tone::Danger,
        _ => Tone::Neutral,
    }
}

/// Translated label and tone for a suggested action.
pub fn action_badge(action: &str) -> Cell {
    match action {
        "Approve" => Cell::badge("Chấp nhận", Tone::Success),
        "Increase" => Cell::badge("Tăng hạn mức", Tone::Success),
        "Review" => Cell::badge("Xem xét", Tone::Warning),
        "Maintain" => Cell::badge("Giữ nguyên", Tone::Warning),
        "Reject" => Cell::badge("Từ chối", Tone::Danger),
        "Decrease" => Cell::badge("Giảm hạn mức", Tone::Danger),
        other => Cell::badge(other, Tone::Neutral),
    }
}

pub fn strategy_tone(strategy: &str) -> Tone {
    match strategy {
        "Champion" => Tone::Success,
        "Negotiable" => Tone::Primary,
        "Cure" => Tone::Info,
        "Restructure" => Tone::Warning,
        "Legal" => Tone::Danger,
        "Write-off" => Tone::Dark,
        _ => Tone::Neutral,
    }
}

/// Category counts in first-seen order.
#[derive(Debug, Default)]
struct Distribution {
    counts: Vec<(String, usize)>,
}

impl Distribution {
    fn add(&mut self, category: Option<&str>) {
        let category = category.unwrap_or(UNKNOWN_CATEGORY);
        match self.counts.iter_mut().find(|(name, _)| name == category) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((category.to_string(), 1)),
        }
    }

    fn into_chart(self, model: ModelType) -> Chart {
        let (labels, data) = self
            .counts
            .into_iter()
            .map(|(label, count)| (label, count as f64))
            .unzip();

        Chart {
            id: "distributionChart".to_string(),
            kind: ChartKind::Pie,
            title: "Phân bố kết quả".to_string(),
            labels,
            datasets: vec![ChartDataset {
                label: model.spec().chart_label.to_string(),
                data,
                kind: None,
            }],
        }
    }
}

pub(crate) fn num(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn id_cell(id: &Option<String>) -> Cell {
    Cell::plain(id.as_deref().unwrap_or(NOT_AVAILABLE))
}

fn text_cell(text: &Option<String>) -> Cell {
    Cell::plain(text.as_deref().unwrap_or(NOT_AVAILABLE))
}

fn stat(label: &str, value: f64, display: String) -> StatRow {
    StatRow {
        label: label.to_string(),
        value,
        display,
    }
}

fn count_stat(label: &str, count: usize) -> StatRow {
    stat(label, count as f64, count.to_string())
}

fn headers(model: ModelType) -> Vec<String> {
    model
        .spec()
        .columns
        .iter()
        .map(|column| column.header.to_string())
        .collect()
}

fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole
    } else {
        0.0
    }
}

fn render_application(records: &[ApplicationResult]) -> Rendered {
    let mut rows = Vec::with_capacity(records.len());
    let mut distribution = Distribution::default();
    let mut score_total = 0.0;
    let mut scored = 0;

    for record in records {
        let profile = &record.risk_profile;
        let score = num(profile.credit_score);
        let risk = profile.risk_level.as_deref().unwrap_or(UNKNOWN_CATEGORY);

        if score != 0.0 {
            score_total += score;
            scored += 1;
        }
        distribution.add(profile.risk_level.as_deref());

        rows.push(vec![
            id_cell(&record.customer_id),
            Cell::plain(format_number(score)),
            Cell::plain(format_percent(num(profile.default_probability), 1)),
            Cell::badge(risk, risk_tone(risk)),
            action_badge(profile.suggested_action.as_deref().unwrap_or(UNKNOWN_CATEGORY)),
        ]);
    }

    let avg_score = average(score_total, scored);
    Rendered {
        table: ResultTable {
            headers: headers(ModelType::Application),
            rows,
        },
        statistics: vec![
            count_stat("Số lượng khách hàng", records.len()),
            stat("Điểm trung bình", avg_score, format_fixed(avg_score, 0)),
        ],
        chart: distribution.into_chart(ModelType::Application),
    }
}

fn render_behavior(records: &[BehaviorResult]) -> Rendered {
    let mut rows = Vec::with_capacity(records.len());
    let mut distribution = Distribution::default();
    let mut current_total = 0.0;
    let mut suggested_total = 0.0;

    for record in records {
        let rec = &record.credit_recommendation;
        let current = num(rec.current_limit);
        let suggested = num(rec.suggested_limit);
        let change = suggested - current;

        current_total += current;
        suggested_total += suggested;
        distribution.add(rec.suggested_action.as_deref());

        let change_cell = Cell {
            text: format_change(change, current),
            tone: if change > 0.0 {
                Some(Tone::Success)
            } else if change < 0.0 {
                Some(Tone::Danger)
            } else {
                None
            },
        };

        rows.push(vec![
            id_cell(&record.customer_id),
            Cell::plain(format_number(num(rec.credit_score))),
            Cell::plain(format_currency(current)),
            Cell::plain(format_currency(suggested)),
            change_cell,
            action_badge(rec.suggested_action.as_deref().unwrap_or(UNKNOWN_CATEGORY)),
        ]);
    }

    let count = records.len();
    let avg_current = average(current_total, count);
    let avg_suggested = average(suggested_total, count);
    let total_change = suggested_total - current_total;

    Rendered {
        table: ResultTable {
            headers: headers(ModelType::Behavior),
            rows,
        },
        statistics: vec![
            count_stat("Số lượng khách hàng", count),
            stat(
                "Hạn mức trung bình hiện tại",
                avg_current,
                format_currency(avg_current),
            ),
            stat(
                "Hạn mức trung bình đề xuất",
                avg_suggested,
                format_currency(avg_suggested),
            ),
            stat(
                "Thay đổi tổng thể",
                total_change,
                format!(
                    "{} ({})",
                    format_currency(total_change),
                    format_percent(ratio(total_change, current_total), 1)
                ),
            ),
        ],
        chart: distribution.into_chart(ModelType::Behavior),
    }
}

fn render_collections(records: &[CollectionsResult]) -> Rendered {
    let mut rows = Vec::with_capacity(records.len());
    let mut distribution = Distribution::default();
    let mut outstanding_total = 0.0;
    let mut recovery_total = 0.0;

    for record in records {
        let outstanding = num(record.outstanding_amount);
        let recovery = num(record.expected_recovery_value);
        let strategy = record
            .collection_strategy
            .as_deref()
            .unwrap_or(UNKNOWN_CATEGORY);

        outstanding_total += outstanding;
        recovery_total += recovery;
        distribution.add(record.collection_strategy.as_deref());

        rows.push(vec![
            id_cell(&record.customer_id),
            Cell::plain(format_number(num(record.priority_score).round())),
            Cell::badge(strategy, strategy_tone(strategy)),
            Cell::plain(format_currency(outstanding)),
            Cell::plain(format_currency(recovery)),
            Cell::plain(format_fixed(num(record.recovery_roi), 2)),
        ]);
    }

    let rate = ratio(recovery_total, outstanding_total);
    Rendered {
        table: ResultTable {
            headers: headers(ModelType::Collections),
            rows,
        },
        statistics: vec![
            count_stat("Số lượng tài khoản", records.len()),
            stat(
                "Tổng số tiền nợ",
                outstanding_total,
                format_currency(outstanding_total),
            ),
            stat(
                "Tổng dự kiến thu hồi",
                recovery_total,
                format_currency(recovery_total),
            ),
            stat("Tỷ lệ thu hồi dự kiến", rate, format_percent(rate, 1)),
        ],
        chart: distribution.into_chart(ModelType::Collections),
    }
}

fn render_desertion(records: &[DesertionResult]) -> Rendered {
    let mut rows = Vec::with_capacity(records.len());
    let mut distribution = Distribution::default();
    let mut probability_total = 0.0;
    let mut cost_total = 0.0;

    for record in records {
        let probability = num(record.desertion_probability);
        let cost = num(record.retention_cost);
        let risk = record.risk_level.as_deref().unwrap_or(UNKNOWN_CATEGORY);

        probability_total += probability;
        cost_total += cost;
        distribution.add(record.risk_level.as_deref());

        rows.push(vec![
            id_cell(&record.customer_id),
            Cell::plain(format_percent(probability, 1)),
            Cell::badge(risk, risk_tone(risk)),
            text_cell(&record.primary_churn_reason),
            text_cell(&record.retention_strategy),
            Cell::plain(format_currency(cost)),
        ]);
    }

    let count = records.len();
    let avg_probability = average(probability_total, count);
    let avg_cost = average(cost_total, count);

    Rendered {
        table: ResultTable {
            headers: headers(ModelType::Desertion),
            rows,
        },
        statistics: vec![
            count_stat("Số lượng khách hàng", count),
            stat(
                "Xác suất rời bỏ trung bình",
                avg_probability,
                format_percent(avg_probability, 1),
            ),
            stat(
                "Chi phí giữ chân trung bình",
                avg_cost,
                format_currency(avg_cost),
            ),
            stat("Tổng chi phí giữ chân", cost_total, format_currency(cost_total)),
        ],
        chart: distribution.into_chart(ModelType::Desertion),
    }
}

// ============================================================
// EXPORT ROWS
// ============================================================

fn export_number(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_default()
}

fn export_text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Header line keys followed by one row per record, in result order.
/// Absent values export as empty cells.
pub fn export_rows(results: &BatchResult) -> (Vec<&'static str>, Vec<Vec<String>>) {
    let headers = results
        .model()
        .spec()
        .columns
        .iter()
        .map(|column| column.export_key)
        .collect();

    let rows = match results {
        BatchResult::Application(records) => records
            .iter()
            .map(|r| {
                let p = &r.risk_profile;
                vec![
                    export_text(&r.customer_id),
                    export_number(p.credit_score),
                    export_number(p.default_probability),
                    export_text(&p.risk_level),
                    export_text(&p.suggested_action),
                ]
            })
            .collect(),
        BatchResult::Behavior(records) => records
            .iter()
            .map(|r| {
                let c = &r.credit_recommendation;
                vec![
                    export_text(&r.customer_id),
                    export_number(c.credit_score),
                    export_number(c.current_limit),
                    export_number(c.suggested_limit),
                    format_number(num(c.suggested_limit) - num(c.current_limit)),
                    export_text(&c.suggested_action),
                ]
            })
            .collect(),
        BatchResult::Collections(records) => records
            .iter()
            .map(|r| {
                vec![
                    export_text(&r.customer_id),
                    export_number(r.priority_score),
                    export_text(&r.collection_strategy),
                    export_number(r.outstanding_amount),
                    export_number(r.expected_recovery_value),
                    export_number(r.recovery_roi),
                ]
            })
            .collect(),
        BatchResult::Desertion(records) => records
            .iter()
            .map(|r| {
                vec![
                    export_text(&r.customer_id),
                    export_number(r.desertion_probability),
                    export_text(&r.risk_level),
                    export_text(&r.primary_churn_reason),
                    export_text(&r.retention_strategy),
                    export_number(r.retention_cost),
                ]
            })
            .collect(),
    };

    (headers, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::batch_result::{CreditRecommendation, RiskProfile};

    fn application(id: &str, score: Option<f64>, risk: Option<&str>, action: &str) -> ApplicationResult {
        ApplicationResult {
            customer_id: Some(id.to_string()),
            risk_profile: RiskProfile {
                credit_score: score,
                default_probability: Some(0.052),
                risk_level: risk.map(str::to_string),
                suggested_action: Some(action.to_string()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_application_table_and_stats() {
        let results = BatchResult::Application(vec![
            application("CUS1", Some(700.0), Some("Low"), "Approve"),
            application("CUS2", None, Some("High"), "Reject"),
            application("CUS3", Some(650.0), Some("Low"), "Review"),
        ]);

        let rendered = render(&results);

        assert_eq!(rendered.table.headers.len(), 5);
        assert_eq!(rendered.table.rows.len(), 3);
        let first = &rendered.table.rows[0];
        assert_eq!(first[0].text, "CUS1");
        assert_eq!(first[2].text, "5.2%");
        assert_eq!(first[3], Cell::badge("Low", Tone::Success));
        assert_eq!(first[4], Cell::badge("Chấp nhận", Tone::Success));
        assert_eq!(rendered.table.rows[1][1].text, "0");

        // The unscored record is left out of the average.
        assert_eq!(rendered.statistics[0].display, "3");
        assert_eq!(rendered.statistics[1].value, 675.0);
        assert_eq!(rendered.statistics[1].display, "675");

        assert_eq!(rendered.chart.labels, vec!["Low", "High"]);
        assert_eq!(rendered.chart.datasets[0].data, vec![2.0, 1.0]);
        assert_eq!(rendered.chart.datasets[0].label, "Phân bố mức độ rủi ro");
    }

    #[test]
    fn test_behavior_limit_change() {
        let results = BatchResult::Behavior(vec![
            BehaviorResult {
                customer_id: Some("CUS000456".to_string()),
                credit_recommendation: CreditRecommendation {
                    credit_score: Some(720.0),
                    current_limit: Some(10000000.0),
                    suggested_limit: Some(12000000.0),
                    suggested_action: Some("Increase".to_string()),
                    ..Default::default()
                },
            },
            BehaviorResult {
                customer_id: Some("CUS000457".to_string()),
                credit_recommendation: CreditRecommendation {
                    current_limit: Some(10000000.0),
                    suggested_limit: Some(9000000.0),
                    suggested_action: Some("Decrease".to_string()),
                    ..Default::default()
                },
            },
        ]);

        let rendered = render(&results);
        let change = &rendered.table.rows[0][4];
        assert_eq!(change.text, "+2.000.000 ₫ (+20.0%)");
        assert_eq!(change.tone, Some(Tone::Success));
        assert_eq!(rendered.table.rows[1][4].tone, Some(Tone::Danger));
        assert_eq!(rendered.table.rows[1][5].text, "Giảm hạn mức");

        assert_eq!(rendered.statistics[1].display, "10.000.000 ₫");
        assert_eq!(rendered.statistics[2].display, "10.500.000 ₫");
        assert_eq!(rendered.statistics[3].display, "1.000.000 ₫ (5.0%)");
        assert_eq!(rendered.chart.labels, vec!["Increase", "Decrease"]);
    }

    #[test]
    fn test_collections_recovery_rate_and_unknown_strategy() {
        let results = BatchResult::Collections(vec![
            CollectionsResult {
                customer_id: Some("CUS000789".to_string()),
                priority_score: Some(87.6),
                collection_strategy: Some("Cure".to_string()),
                outstanding_amount: Some(2000000.0),
                expected_recovery_value: Some(1500000.0),
                recovery_roi: Some(3.456),
                ..Default::default()
            },
            CollectionsResult {
                customer_id: Some("CUS000790".to_string()),
                outstanding_amount: Some(2000000.0),
                expected_recovery_value: Some(500000.0),
                ..Default::default()
            },
        ]);

        let rendered = render(&results);
        let first = &rendered.table.rows[0];
        assert_eq!(first[1].text, "88");
        assert_eq!(first[2], Cell::badge("Cure", Tone::Info));
        assert_eq!(first[5].text, "3.46");
        assert_eq!(rendered.table.rows[1][2].tone, Some(Tone::Neutral));

        assert_eq!(rendered.statistics[0].label, "Số lượng tài khoản");
        assert_eq!(rendered.statistics[1].display, "4.000.000 ₫");
        assert_eq!(rendered.statistics[3].value, 0.5);
        assert_eq!(rendered.statistics[3].display, "50.0%");
        assert_eq!(rendered.chart.labels, vec!["Cure", UNKNOWN_CATEGORY]);
    }

    #[test]
    fn test_desertion_stats() {
        let results = BatchResult::Desertion(vec![
            DesertionResult {
                customer_id: Some("CUS000321".to_string()),
                desertion_probability: Some(0.8),
                risk_level: Some("Cao".to_string()),
                retention_cost: Some(300000.0),
                ..Default::default()
            },
            DesertionResult {
                customer_id: Some("CUS000322".to_string()),
                desertion_probability: Some(0.2),
                risk_level: Some("Thấp".to_string()),
                retention_cost: Some(100000.0),
                ..Default::default()
            },
        ]);

        let rendered = render(&results);
        assert_eq!(rendered.table.rows[0][1].text, "80.0%");
        assert_eq!(rendered.table.rows[0][2].tone, Some(Tone::Danger));
        assert_eq!(rendered.table.rows[0][3].text, "N/A");
        assert_eq!(rendered.statistics[1].display, "50.0%");
        assert_eq!(rendered.statistics[2].display, "200.000 ₫");
        assert_eq!(rendered.statistics[3].display, "400.000 ₫");
    }

    #[test]
    fn test_export_rows() {
        let results = BatchResult::Behavior(vec![BehaviorResult {
            customer_id: Some("CUS1".to_string()),
            credit_recommendation: CreditRecommendation {
                credit_score: Some(701.5),
                current_limit: Some(1000.0),
                suggested_limit: Some(1500.0),
                ..Default::default()
            },
        }]);

        let (headers, rows) = export_rows(&results);
        assert_eq!(
            headers,
            vec![
                "customer_id",
                "credit_score",
                "current_limit",
                "suggested_limit",
                "limit_change",
                "suggested_action"
            ]
        );
        assert_eq!(rows[0], vec!["CUS1", "701.5", "1000", "1500", "500", ""]);
    }
}
