// ============================================================
// SINGLE RESULT RENDERER
// ============================================================
// Turn the answer to one interactive form into the card the form page
// shows: score gauge, badges, limit change, risk factors or action plan.
// Where the API gives no risk factors or action plan, they are derived
// from the submitted form.

use serde_json::Value;

use super::batch_orchestrator::extract_results;
use super::result_renderer::{action_badge, num, strategy_tone, NOT_AVAILABLE, UNKNOWN_CATEGORY};
use crate::domain::batch_result::{
    ApplicationResult, BatchResult, BehaviorResult, CollectionsResult, DesertionResult,
};
use crate::domain::error::{AppError, Result};
use crate::domain::model_type::ModelType;
use crate::domain::record::{format_number, NormalizedRecord};
use crate::domain::report::{
    Cell, LimitChange, RankedTable, ResultTable, RetentionCard, ScoreCard, SingleReport, Tone,
};
use crate::shared::format::{format_change, format_currency, format_fixed, format_percent};

const SCORE_MIN: f64 = 300.0;
const SCORE_RANGE: f64 = 550.0;

const RANKED_HEADERS: [&str; 7] = [
    "Thứ tự",
    "ID khách hàng",
    "Điểm ưu tiên",
    "Chiến lược thu hồi",
    "Giá trị kỳ vọng",
    "ROI",
    "Kênh liên hệ",
];

/// Render the scored response of one form. `forms` holds the validated
/// form records in submission order.
pub fn render_single(model: ModelType, forms: &[NormalizedRecord], body: &Value) -> Result<SingleReport> {
    let empty = NormalizedRecord::new();
    let form = forms.first().unwrap_or(&empty);

    Ok(match model {
        ModelType::Application => {
            let result: ApplicationResult = single_record(model, body)?;
            SingleReport::Application(application_card(&result, form))
        }
        ModelType::Behavior => {
            let result: BehaviorResult = single_record(model, body)?;
            SingleReport::Behavior(behavior_card(&result, form))
        }
        ModelType::Collections => {
            let records = extract_results(model, body)?;
            match BatchResult::from_values(model, &records)? {
                BatchResult::Collections(accounts) => SingleReport::Collections(ranked_table(&accounts)),
                other => return Err(unexpected(other.model())),
            }
        }
        ModelType::Desertion => {
            let records = extract_results(model, body).map_err(|_| no_valid_result())?;
            match BatchResult::from_values(model, &records[..1])? {
                BatchResult::Desertion(strategies) => match strategies.first() {
                    Some(strategy) => SingleReport::Desertion(retention_card(strategy, form)),
                    None => return Err(no_valid_result()),
                },
                other => return Err(unexpected(other.model())),
            }
        }
    })
}

fn single_record<T: for<'de> serde::Deserialize<'de>>(model: ModelType, body: &Value) -> Result<T> {
    if !body.is_object() {
        return Err(AppError::MalformedResponse(body.clone()));
    }
    serde_json::from_value(body.clone()).map_err(|e| {
        AppError::ParseError(format!("{} response has an unexpected shape: {}", model, e))
    })
}

fn no_valid_result() -> AppError {
    AppError::EmptyResult("Không nhận được kết quả phân tích hợp lệ".to_string())
}

fn unexpected(model: ModelType) -> AppError {
    AppError::Internal(format!("unexpected {} result", model))
}

/// Tone of the score gauge.
pub fn score_band_tone(score: f64) -> Tone {
    if score >= 750.0 {
        Tone::Success
    } else if score >= 700.0 {
        Tone::Info
    } else if score >= 650.0 {
        Tone::Warning
    } else {
        Tone::Danger
    }
}

fn score_percent(score: f64) -> f64 {
    ((score - SCORE_MIN) / SCORE_RANGE * 100.0).clamp(0.0, 100.0)
}

fn risk_badge(level: Option<&str>) -> Cell {
    match level {
        Some(level @ "Low") => Cell::badge(level, Tone::Success),
        Some(level @ "Medium") => Cell::badge(level, Tone::Warning),
        Some(level) => Cell::badge(level, Tone::Danger),
        None => Cell::badge(NOT_AVAILABLE, Tone::Danger),
    }
}

fn form_value(form: &NormalizedRecord, field: &str) -> f64 {
    num(form.number(field))
}

fn customer_id(result_id: &Option<String>, form: &NormalizedRecord) -> String {
    match result_id.as_deref() {
        Some(id) => id.to_string(),
        None if !form.customer_id().is_empty() => form.customer_id().to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Risk factors read off an application form.
pub fn application_risk_factors(form: &NormalizedRecord) -> Vec<String> {
    let mut factors = Vec::new();
    if form_value(form, "age") < 25.0 {
        factors.push("Tuổi khách hàng thấp");
    }
    if form_value(form, "debt_to_income") > 0.4 {
        factors.push("Tỷ lệ nợ/thu nhập cao");
    }
    if form_value(form, "credit_history_length") < 2.0 {
        factors.push("Lịch sử tín dụng ngắn");
    }
    if form_value(form, "number_of_delinquent_debts") > 0.0 {
        factors.push("Có khoản nợ quá hạn");
    }
    factors.into_iter().map(str::to_string).collect()
}

/// Risk factors read off a behavior form.
pub fn behavior_risk_factors(form: &NormalizedRecord) -> Vec<String> {
    let late_payments = form_value(form, "number_of_late_payments");
    let mut factors = Vec::new();
    if form_value(form, "payment_ratio") < 0.5 {
        factors.push("Tỷ lệ thanh toán thấp");
    }
    if late_payments > 1.0 {
        factors.push("Nhiều lần thanh toán trễ");
    }
    if form_value(form, "months_since_last_late_payment") < 6.0 && late_payments > 0.0 {
        factors.push("Thanh toán trễ gần đây");
    }
    if form_value(form, "average_utilization") > 0.7 {
        factors.push("Mức sử dụng tín dụng cao");
    }
    factors.into_iter().map(str::to_string).collect()
}

/// Follow-up actions for a retention case without an action plan.
pub fn retention_actions(reason: Option<&str>, form: &NormalizedRecord) -> Vec<String> {
    let mut actions = Vec::new();
    if reason == Some("Kỳ hạn") {
        actions.push("Liên hệ trước 2 tháng hết hạn với ưu đãi gia hạn");
    }
    if reason == Some("Dịch vụ") || form_value(form, "satisfaction_score") < 7.0 {
        actions.push("Gọi điện khảo sát sự hài lòng và xác định vấn đề");
    }
    if form_value(form, "months_since_last_interaction") > 2.0 {
        actions.push("Khởi tạo chiến dịch tiếp cận khách hàng không hoạt động");
    }
    if form_value(form, "number_of_products") < 2.0 {
        actions.push("Đề xuất sản phẩm bổ sung với ưu đãi 15% phí/lãi suất");
    }
    actions.into_iter().map(str::to_string).collect()
}

fn application_card(result: &ApplicationResult, form: &NormalizedRecord) -> ScoreCard {
    let profile = &result.risk_profile;
    let score = num(profile.credit_score);
    let suggested_action = match profile.suggested_action.as_deref() {
        Some(action @ ("Approve" | "Review" | "Reject")) => action_badge(action),
        Some(action) => Cell::badge(action, Tone::Danger),
        None => Cell::badge(NOT_AVAILABLE, Tone::Danger),
    };

    ScoreCard {
        customer_id: customer_id(&result.customer_id, form),
        credit_score: score,
        score_percent: score_percent(score),
        score_tone: score_band_tone(score),
        risk_level: risk_badge(profile.risk_level.as_deref()),
        default_probability: format_percent(num(profile.default_probability), 2),
        suggested_action,
        limits: None,
        risk_factors: profile
            .top_risk_factors
            .clone()
            .unwrap_or_else(|| application_risk_factors(form)),
    }
}

fn behavior_card(result: &BehaviorResult, form: &NormalizedRecord) -> ScoreCard {
    let rec = &result.credit_recommendation;
    let score = num(rec.credit_score);
    let current = form_value(form, "current_limit");
    let suggested = num(rec.suggested_limit);
    let change = suggested - current;

    let change = if change > 0.0 {
        Cell::badge(format_change(change, current), Tone::Success)
    } else if change < 0.0 {
        Cell::badge(format_change(change, current), Tone::Danger)
    } else {
        Cell::badge("Không thay đổi", Tone::Neutral)
    };
    let suggested_action = match rec.suggested_action.as_deref() {
        Some("Increase") => Cell::badge("Tăng hạn mức", Tone::Success),
        Some("Maintain") => Cell::badge("Giữ nguyên", Tone::Neutral),
        _ => Cell::badge("Giảm hạn mức", Tone::Danger),
    };

    ScoreCard {
        customer_id: customer_id(&result.customer_id, form),
        credit_score: score,
        score_percent: score_percent(score),
        score_tone: score_band_tone(score),
        risk_level: risk_badge(rec.risk_level.as_deref()),
        default_probability: format_percent(num(rec.default_probability), 2),
        suggested_action,
        limits: Some(LimitChange {
            current_limit: format_currency(current),
            suggested_limit: format_currency(suggested),
            change,
        }),
        risk_factors: rec
            .top_risk_factors
            .clone()
            .unwrap_or_else(|| behavior_risk_factors(form)),
    }
}

fn ranked_table(accounts: &[CollectionsResult]) -> RankedTable {
    let rows = accounts
        .iter()
        .enumerate()
        .map(|(idx, account)| {
            let strategy = account
                .collection_strategy
                .as_deref()
                .unwrap_or(UNKNOWN_CATEGORY);
            vec![
                Cell::plain((idx + 1).to_string()),
                Cell::plain(account.customer_id.as_deref().unwrap_or(NOT_AVAILABLE)),
                Cell::plain(format_number(num(account.priority_score).round())),
                Cell::badge(strategy, strategy_tone(strategy)),
                Cell::plain(format_currency(num(account.expected_recovery_value))),
                Cell::plain(format_fixed(num(account.recovery_roi), 2)),
                Cell::plain(account.recommended_channel.as_deref().unwrap_or(NOT_AVAILABLE)),
            ]
        })
        .collect();
    let highlights = (0..accounts.len())
        .map(|idx| match idx {
            0 => Some(Tone::Success),
            1 | 2 => Some(Tone::Warning),
            _ => None,
        })
        .collect();

    RankedTable {
        table: ResultTable {
            headers: RANKED_HEADERS.iter().map(|h| h.to_string()).collect(),
            rows,
        },
        highlights,
    }
}

fn retention_card(strategy: &DesertionResult, form: &NormalizedRecord) -> RetentionCard {
    let probability = num(strategy.desertion_probability) * 100.0;
    let probability_tone = if probability < 30.0 {
        Tone::Success
    } else if probability < 70.0 {
        Tone::Warning
    } else {
        Tone::Danger
    };
    let risk_level = match strategy.risk_level.as_deref() {
        Some(level @ "Thấp") => Cell::badge(level, Tone::Success),
        Some(level @ "Trung bình") => Cell::badge(level, Tone::Warning),
        Some(level @ "Cao") => Cell::badge(level, Tone::Danger),
        Some(level) => Cell::badge(level, Tone::Dark),
        None => Cell::badge(NOT_AVAILABLE, Tone::Dark),
    };
    let roi = num(strategy.retention_roi);
    let roi_tone = if roi > 0.5 {
        Tone::Success
    } else if roi > 0.0 {
        Tone::Warning
    } else {
        Tone::Danger
    };
    let reason = strategy.primary_churn_reason.as_deref();

    RetentionCard {
        customer_id: customer_id(&strategy.customer_id, form),
        probability: Cell::badge(format!("{:.1}%", probability), probability_tone),
        risk_level,
        primary_reason: format!("Nguyên nhân chính: {}", reason.unwrap_or("Không xác định")),
        retention_strategy: strategy
            .retention_strategy
            .clone()
            .unwrap_or_else(|| "Không có chiến lược được đề xuất".to_string()),
        action_plan: match strategy.action_plan.as_deref() {
            Some(plan) if !plan.trim().is_empty() => vec![plan.to_string()],
            _ => retention_actions(reason, form),
        },
        retention_cost: format_currency(num(strategy.retention_cost)),
        retention_roi: Cell::badge(format_percent(roi, 1), roi_tone),
    }
}
