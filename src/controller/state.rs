use std::sync::Arc;
use uuid::Uuid;

use super::history::PromptHistory;
use crate::error::{Result, StudioError};
use crate::models::{
    Dimension, GeneratedArtifact, GenerationMode, GenerationRequest, MaskImage, SourceImage,
    RANDOM_SEED_SENTINEL,
};

pub const MIN_STEPS: u32 = 1;
pub const MAX_STEPS: u32 = 20;
pub const MAX_GUIDANCE: f32 = 20.0;
pub const MIN_BATCH_COUNT: u32 = 1;
pub const MAX_BATCH_COUNT: u32 = 10;

pub const NO_SOURCE_FOR_MASK: &str = "Please upload a source image first";

/// Everything the generation form shows. Only changed through [`reduce`].
#[derive(Debug, Clone)]
pub struct FormState {
    pub mode: GenerationMode,
    pub prompt: String,
    pub negative_prompt: String,
    pub steps: u32,
    pub guidance: f32,
    pub strength: f32,
    pub batch_count: u32,
    pub seed: i64,
    pub use_random_seed: bool,
    pub width: Dimension,
    pub height: Dimension,
    pub source: Option<Arc<SourceImage>>,
    pub mask: Option<Arc<MaskImage>>,
    pub history: PromptHistory,
    /// Prompt of the running batch; enters `history` once the batch finishes.
    pub submitted_prompt: Option<String>,
    pub artifacts: Vec<GeneratedArtifact>,
    /// Selected artifact ids in the order they were picked.
    pub selection: Vec<Uuid>,
    /// 0.0..=100.0
    pub progress: f32,
    pub is_loading: bool,
    pub error: Option<String>,
    pub preview_open: bool,
    pub mask_editor_open: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            mode: GenerationMode::TextToImage,
            prompt: String::new(),
            negative_prompt: String::new(),
            steps: 20,
            guidance: 7.5,
            strength: 0.75,
            batch_count: 1,
            seed: RANDOM_SEED_SENTINEL,
            use_random_seed: true,
            width: Dimension::Px512,
            height: Dimension::Px512,
            source: None,
            mask: None,
            history: PromptHistory::new(),
            submitted_prompt: None,
            artifacts: Vec::new(),
            selection: Vec::new(),
            progress: 0.0,
            is_loading: false,
            error: None,
            preview_open: false,
            mask_editor_open: false,
        }
    }
}

impl FormState {
    pub fn progress_percent(&self) -> u32 {
        self.progress.round() as u32
    }

    /// Selected artifacts in pick order.
    pub fn selected(&self) -> impl Iterator<Item = &GeneratedArtifact> {
        self.selection.iter().filter_map(|id| self.artifact(*id))
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    pub fn artifact(&self, id: Uuid) -> Option<&GeneratedArtifact> {
        self.artifacts.iter().find(|a| a.id == id)
    }

    /// Request shared by every image of the next batch, seed left at the
    /// user's value. Fails before anything is sent when the mode's inputs
    /// are missing.
    pub fn request_template(&self) -> Result<GenerationRequest> {
        let mut request = GenerationRequest {
            prompt: self.prompt.clone(),
            negative_prompt: self.negative_prompt.clone(),
            num_steps: self.steps,
            guidance: self.guidance,
            seed: self.seed,
            width: self.width,
            height: self.height,
            image: None,
            mask: None,
            strength: None,
        };

        if self.mode.requires_source() {
            let source = self.source.as_ref().ok_or(StudioError::MissingSourceImage)?;
            request.image = Some(source.bytes().to_vec());

            if self.mode.requires_mask() {
                let mask = self.mask.as_ref().ok_or(StudioError::MissingMaskImage)?;
                request.mask = Some(mask.png_bytes().to_vec());
            }

            request.strength = Some(self.strength);
        }

        Ok(request)
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    SetMode(GenerationMode),
    SetPrompt(String),
    SetNegativePrompt(String),
    SetSteps(u32),
    SetGuidance(f32),
    SetStrength(f32),
    SetBatchCount(u32),
    SetSeed(i64),
    SetRandomSeed(bool),
    SetWidth(Dimension),
    SetHeight(Dimension),
    LoadSource(Arc<SourceImage>),
    ClearSource,
    OpenMaskEditor,
    CloseMaskEditor,
    ApplyMask(Arc<MaskImage>),
    ClearMask,
    PickHistory(usize),
    BatchStarted,
    ArtifactReceived {
        artifact: GeneratedArtifact,
        completed: usize,
        total: usize,
    },
    BatchFailed(String),
    BatchCancelled,
    BatchFinished,
    ToggleSelection(Uuid),
    ClosePreview,
    DismissError,
}

pub fn reduce(state: &FormState, action: Action) -> FormState {
    let mut next = state.clone();

    match action {
        Action::SetMode(mode) => next.mode = mode,
        Action::SetPrompt(prompt) => next.prompt = prompt,
        Action::SetNegativePrompt(prompt) => next.negative_prompt = prompt,
        Action::SetSteps(steps) => next.steps = steps.clamp(MIN_STEPS, MAX_STEPS),
        Action::SetGuidance(guidance) => {
            if guidance.is_finite() {
                next.guidance = guidance.clamp(0.0, MAX_GUIDANCE);
            }
        }
        Action::SetStrength(strength) => {
            if strength.is_finite() {
                next.strength = strength.clamp(0.0, 1.0);
            }
        }
        Action::SetBatchCount(count) => {
            next.batch_count = count.clamp(MIN_BATCH_COUNT, MAX_BATCH_COUNT)
        }
        Action::SetSeed(seed) => next.seed = seed.max(RANDOM_SEED_SENTINEL),
        Action::SetRandomSeed(enabled) => next.use_random_seed = enabled,
        Action::SetWidth(width) => next.width = width,
        Action::SetHeight(height) => next.height = height,
        Action::LoadSource(source) => {
            // a mask only fits the image it was painted on
            next.source = Some(source);
            next.mask = None;
            next.mask_editor_open = false;
        }
        Action::ClearSource => {
            next.source = None;
            next.mask = None;
            next.mask_editor_open = false;
        }
        Action::OpenMaskEditor => {
            if next.source.is_some() {
                next.mask_editor_open = true;
            } else {
                next.error = Some(NO_SOURCE_FOR_MASK.to_string());
            }
        }
        Action::CloseMaskEditor => next.mask_editor_open = false,
        Action::ApplyMask(mask) => {
            next.mask = Some(mask);
            next.mask_editor_open = false;
        }
        Action::ClearMask => next.mask = None,
        Action::PickHistory(index) => {
            if let Some(prompt) = state.history.get(index) {
                next.prompt = prompt.to_string();
            }
        }
        Action::BatchStarted => {
            next.submitted_prompt = Some(state.prompt.clone());
            next.is_loading = true;
            next.error = None;
            next.progress = 0.0;
            next.artifacts.clear();
            next.selection.clear();
            next.preview_open = false;
        }
        Action::ArtifactReceived {
            artifact,
            completed,
            total,
        } => {
            next.artifacts.push(artifact);
            if total > 0 {
                next.progress = (completed as f32 / total as f32) * 100.0;
            }
        }
        Action::BatchFailed(message) => {
            next.error = Some(message);
            next.is_loading = false;
            next.submitted_prompt = None;
        }
        Action::BatchCancelled => {
            next.is_loading = false;
            next.submitted_prompt = None;
        }
        Action::BatchFinished => {
            if let Some(prompt) = next.submitted_prompt.take() {
                next.history.push(prompt);
            }
            next.is_loading = false;
            next.preview_open = !next.artifacts.is_empty();
        }
        Action::ToggleSelection(id) => {
            if let Some(artifact) = next.artifacts.iter_mut().find(|a| a.id == id) {
                artifact.selected = !artifact.selected;
                if artifact.selected {
                    next.selection.push(id);
                } else {
                    next.selection.retain(|s| *s != id);
                }
            }
        }
        Action::ClosePreview => next.preview_open = false,
        Action::DismissError => next.error = None,
    }

    next
}
