// ============================================================
// DASHBOARD
// ============================================================
// Static sample charts shown on the overview page

use crate::domain::report::{Chart, ChartDataset, ChartKind};

fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn dataset(label: &str, data: &[f64], kind: Option<ChartKind>) -> ChartDataset {
    ChartDataset {
        label: label.to_string(),
        data: data.to_vec(),
        kind,
    }
}

/// The five overview charts. The figures are illustrative samples, not
/// live portfolio data.
pub fn sample_charts() -> Vec<Chart> {
    vec![
        Chart {
            id: "scoreDistributionChart".to_string(),
            kind: ChartKind::Bar,
            title: "Credit Score Distribution".to_string(),
            labels: labels(&[
                "300-350", "351-400", "401-450", "451-500", "501-550", "551-600", "601-650",
                "651-700", "701-750", "751-800", "801-850",
            ]),
            datasets: vec![dataset(
                "Number of Customers",
                &[15.0, 28.0, 42.0, 78.0, 156.0, 220.0, 245.0, 198.0, 132.0, 85.0, 42.0],
                None,
            )],
        },
        Chart {
            id: "approvalDecisionsChart".to_string(),
            kind: ChartKind::Pie,
            title: "Approval Decisions".to_string(),
            labels: labels(&["Approve", "Review", "Reject"]),
            datasets: vec![dataset("Approval Decisions", &[68.0, 18.0, 14.0], None)],
        },
        Chart {
            id: "defaultTrendChart".to_string(),
            kind: ChartKind::Line,
            title: "Default Trend".to_string(),
            labels: labels(&[
                "01/05", "02/05", "03/05", "04/05", "05/05", "06/05", "07/05", "08/05", "09/05",
                "10/05", "11/05", "12/05", "13/05", "14/05", "15/05",
            ]),
            datasets: vec![dataset(
                "Default Rate (%)",
                &[4.8, 4.7, 4.9, 4.7, 4.6, 4.5, 4.4, 4.3, 4.4, 4.2, 4.3, 4.1, 4.2, 4.0, 4.2],
                None,
            )],
        },
        Chart {
            id: "collectionPerformanceChart".to_string(),
            kind: ChartKind::Bar,
            title: "Collection Performance".to_string(),
            labels: labels(&[
                "Champion",
                "Negotiable",
                "Cure",
                "Restructure",
                "Legal",
                "Write-off",
            ]),
            datasets: vec![
                dataset(
                    "Recovery Rate (%)",
                    &[92.0, 78.0, 65.0, 45.0, 28.0, 12.0],
                    None,
                ),
                dataset(
                    "Number of Accounts",
                    &[120.0, 220.0, 310.0, 180.0, 95.0, 45.0],
                    Some(ChartKind::Line),
                ),
            ],
        },
        Chart {
            id: "riskSegmentsChart".to_string(),
            kind: ChartKind::Doughnut,
            title: "Risk Segments".to_string(),
            labels: labels(&["Low Risk", "Medium Risk", "High Risk", "Very High Risk"]),
            datasets: vec![dataset("Risk Segments", &[45.0, 32.0, 18.0, 5.0], None)],
        },
    ]
}
