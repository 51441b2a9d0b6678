pub mod batch;
pub mod history;
pub mod state;
pub mod studio;

pub use batch::{
    run_batch, stream_batch, BatchEvent, BatchPlan, BatchReport, BatchStatus, CancelFlag,
    SeedPolicy,
};
pub use history::{PromptHistory, HISTORY_CAPACITY};
pub use state::{reduce, Action, FormState};
pub use studio::Studio;
