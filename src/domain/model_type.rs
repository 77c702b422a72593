// ============================================================
// MODEL TYPES
// ============================================================
// One static table describing every scoring model: schema, endpoints,
// request envelope, response field and result columns

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::AppError;

/// The four credit-risk use cases served by the scoring API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Application,
    Behavior,
    Collections,
    Desertion,
}

/// How a list of records is wrapped in a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `{ "customers": [record, ...] }`
    Customers,
    /// `[record, ...]`
    BareList,
    /// A single record object, only valid for one record.
    Object,
}

/// One column of a result table, with the header used when exporting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub header: &'static str,
    pub export_key: &'static str,
}

const fn col(header: &'static str, export_key: &'static str) -> ColumnSpec {
    ColumnSpec { header, export_key }
}

/// Everything the gateway needs to know about one model type.
#[derive(Debug)]
pub struct ModelSpec {
    pub model: ModelType,
    pub key: &'static str,
    /// Ordered field schema expected by the API.
    pub fields: &'static [&'static str],
    pub batch_endpoint: &'static str,
    pub batch_envelope: Envelope,
    pub single_endpoint: &'static str,
    pub single_envelope: Envelope,
    /// Field holding the result list in a batch response.
    pub response_field: &'static str,
    pub columns: &'static [ColumnSpec],
    pub chart_label: &'static str,
    pub template_rows: &'static [&'static str],
    pub sample_ids: &'static [&'static str],
}

/// Response fields that may hold a result list, in lookup order.
pub const RESULT_FIELDS: [&str; 3] = ["results", "prioritized_accounts", "retention_strategies"];

pub const ID_FIELD: &str = "customer_id";
pub const AGE_FIELD: &str = "age";
pub const OUTSTANDING_FIELD: &str = "outstanding_amount";

static APPLICATION: ModelSpec = ModelSpec {
    model: ModelType::Application,
    key: "application",
    fields: &[
        "customer_id",
        "age",
        "income",
        "employment_length",
        "debt_to_income",
        "credit_history_length",
        "number_of_debts",
        "number_of_delinquent_debts",
        "homeowner",
    ],
    batch_endpoint: "batch/application-score/",
    batch_envelope: Envelope::Customers,
    single_endpoint: "application-score/",
    single_envelope: Envelope::Object,
    response_field: "results",
    columns: &[
        col("ID khách hàng", "customer_id"),
        col("Điểm tín dụng", "credit_score"),
        col("Xác suất vỡ nợ", "default_probability"),
        col("Mức độ rủi ro", "risk_level"),
        col("Đề xuất", "suggested_action"),
    ],
    chart_label: "Phân bố mức độ rủi ro",
    template_rows: &[
        "CUS000123,35,50000,5.5,0.25,7,2,0,1",
        "CUS000124,42,60000,8.0,0.15,12,1,0,1",
        "CUS000125,29,35000,3.0,0.35,4,3,1,0",
    ],
    sample_ids: &["CUS000123", "CUS000124", "CUS000125", "CUS000126", "CUS000127"],
};

static BEHAVIOR: ModelSpec = ModelSpec {
    model: ModelType::Behavior,
    key: "behavior",
    fields: &[
        "customer_id",
        "current_balance",
        "average_monthly_payment",
        "payment_ratio",
        "number_of_late_payments",
        "months_since_last_late_payment",
        "number_of_credit_inquiries",
        "current_limit",
        "average_utilization",
    ],
    batch_endpoint: "batch/behavior-score/",
    batch_envelope: Envelope::Customers,
    single_endpoint: "behavior-score/",
    single_envelope: Envelope::Object,
    response_field: "results",
    columns: &[
        col("ID khách hàng", "customer_id"),
        col("Điểm tín dụng", "credit_score"),
        col("Hạn mức hiện tại", "current_limit"),
        col("Hạn mức đề xuất", "suggested_limit"),
        col("Thay đổi", "limit_change"),
        col("Đề xuất", "suggested_action"),
    ],
    chart_label: "Phân bố đề xuất",
    template_rows: &[
        "CUS000456,3500,850,0.65,1,8,2,10000,0.35",
        "CUS000457,4500,950,0.7,0,12,1,12000,0.38",
        "CUS000458,2800,600,0.55,2,3,3,8000,0.42",
    ],
    sample_ids: &["CUS000456", "CUS000457", "CUS000458", "CUS000459", "CUS000460"],
};

static COLLECTIONS: ModelSpec = ModelSpec {
    model: ModelType::Collections,
    key: "collections",
    fields: &[
        "customer_id",
        "days_past_due",
        "outstanding_amount",
        "number_of_contacts",
        "previous_late_payments",
        "promised_payment_amount",
        "broken_promises",
        "months_on_book",
        "last_payment_amount",
    ],
    // The collections endpoint takes a bare list for both batch and form use.
    batch_endpoint: "collections-prioritize/",
    batch_envelope: Envelope::BareList,
    single_endpoint: "collections-prioritize/",
    single_envelope: Envelope::BareList,
    response_field: "prioritized_accounts",
    columns: &[
        col("ID khách hàng", "customer_id"),
        col("Điểm ưu tiên", "priority_score"),
        col("Chiến lược thu hồi", "collection_strategy"),
        col("Số tiền nợ", "outstanding_amount"),
        col("Giá trị kỳ vọng", "expected_recovery"),
        col("ROI", "recovery_roi"),
    ],
    chart_label: "Phân bố chiến lược thu hồi",
    template_rows: &[
        "CUS000789,45,2500,3,2,500,1,24,300",
        "CUS000790,60,3600,5,3,1000,2,18,450",
        "CUS000791,75,3200,4,3,800,2,30,350",
    ],
    sample_ids: &["CUS000789", "CUS000790", "CUS000791", "CUS000792", "CUS000793"],
};

static DESERTION: ModelSpec = ModelSpec {
    model: ModelType::Desertion,
    key: "desertion",
    fields: &[
        "customer_id",
        "months_to_maturity",
        "total_relationship_value",
        "number_of_products",
        "satisfaction_score",
        "number_of_complaints",
        "months_since_last_interaction",
        "age",
        "tenure_months",
        "monthly_average_balance",
    ],
    batch_endpoint: "batch/desertion-strategy/",
    batch_envelope: Envelope::Customers,
    single_endpoint: "desertion-strategy/",
    single_envelope: Envelope::BareList,
    response_field: "retention_strategies",
    columns: &[
        col("ID khách hàng", "customer_id"),
        col("Xác suất rời bỏ", "desertion_probability"),
        col("Mức độ rủi ro", "risk_level"),
        col("Nguyên nhân", "primary_reason"),
        col("Chiến lược giữ chân", "retention_strategy"),
        col("Chi phí", "retention_cost"),
    ],
    chart_label: "Phân bố mức độ rủi ro",
    template_rows: &[
        "CUS000321,3,75000,2,6.5,1,2,42,36,8500",
        "CUS000322,1,125000,3,8.0,0,0.5,35,60,12000",
        "CUS000323,2,95000,2,7.5,0,1,38,48,9500",
    ],
    sample_ids: &["CUS000321", "CUS000322", "CUS000323", "CUS000324", "CUS000325"],
};

impl ModelType {
    pub const ALL: [ModelType; 4] = [
        ModelType::Application,
        ModelType::Behavior,
        ModelType::Collections,
        ModelType::Desertion,
    ];

    pub fn spec(&self) -> &'static ModelSpec {
        match self {
            ModelType::Application => &APPLICATION,
            ModelType::Behavior => &BEHAVIOR,
            ModelType::Collections => &COLLECTIONS,
            ModelType::Desertion => &DESERTION,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.spec().key
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ModelType::ALL
            .into_iter()
            .find(|model| model.as_str() == wanted)
            .ok_or_else(|| AppError::ValidationError(format!("Invalid model type: {}", s)))
    }
}

impl ModelSpec {
    /// CSV header line for this model's schema.
    pub fn csv_header(&self) -> String {
        self.fields.join(",")
    }

    pub fn template_file_name(&self) -> String {
        format!("{}_template.csv", self.key)
    }
}
