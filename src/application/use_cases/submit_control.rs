use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::domain::error::{AppError, Result};
use crate::domain::model_type::ModelType;

/// One in-flight flag per model type.
#[derive(Debug, Default)]
pub struct SubmitControls {
    busy: [AtomicBool; 4],
}

fn slot(model: ModelType) -> usize {
    match model {
        ModelType::Application => 0,
        ModelType::Behavior => 1,
        ModelType::Collections => 2,
        ModelType::Desertion => 3,
    }
}

impl SubmitControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the control for `model`. Fails while another submission for
    /// the same model holds it.
    pub fn try_acquire(&self, model: ModelType) -> Result<SubmitGuard<'_>> {
        let flag = &self.busy[slot(model)];
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(model = %model, "Submission refused, previous batch still running");
            return Err(AppError::Conflict(format!(
                "Đang xử lý một lô {} khác, vui lòng đợi",
                model
            )));
        }

        debug!(model = %model, "Submit control acquired");
        Ok(SubmitGuard { flag, model })
    }
}

/// Releases its control exactly once, on drop.
#[derive(Debug)]
pub struct SubmitGuard<'a> {
    flag: &'a AtomicBool,
    model: ModelType,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        debug!(model = %self.model, "Submit control released");
    }
}
