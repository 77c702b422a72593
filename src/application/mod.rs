pub mod use_cases;

pub use use_cases::batch_orchestrator::{BatchInput, BatchOrchestrator};
pub use use_cases::single_score::SingleScoreUseCase;
