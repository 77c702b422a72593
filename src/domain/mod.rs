pub mod batch_result;
pub mod error;
pub mod model_type;
pub mod record;
pub mod report;
pub mod validation;
