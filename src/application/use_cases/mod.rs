pub mod batch_export;
pub mod batch_orchestrator;
pub mod batch_validator;
pub mod csv_templates;
pub mod dashboard;
pub mod record_normalizer;
pub mod result_renderer;
pub mod single_result;
pub mod single_score;
pub mod submit_control;
