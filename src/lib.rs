pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod logger;
pub mod mask;
pub mod models;

pub use client::{HttpImageBackend, ImageBackend};
pub use config::StudioConfig;
pub use controller::{
    reduce, run_batch, stream_batch, Action, BatchEvent, BatchPlan, BatchReport, BatchStatus,
    CancelFlag, FormState, PromptHistory, SeedPolicy, Studio,
};
pub use error::{Result, StudioError};
pub use mask::{MaskBuffer, MaskEditor};
pub use models::*;
