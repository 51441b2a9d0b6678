use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use super::batch::{run_batch, BatchPlan, BatchReport, CancelFlag, SeedPolicy};
use super::state::{reduce, Action, FormState};
use crate::{
    client::{HttpImageBackend, ImageBackend},
    config::StudioConfig,
    error::{Result, StudioError},
    export,
    mask::MaskEditor,
    models::SourceImage,
};

/// View model: owns the form state, the backend and the open mask editor.
/// All state changes go through [`reduce`].
pub struct Studio {
    state: FormState,
    backend: Arc<dyn ImageBackend>,
    config: StudioConfig,
    editor: Option<MaskEditor>,
    cancel: CancelFlag,
}

impl Studio {
    pub fn new(config: StudioConfig) -> Result<Self> {
        let backend = HttpImageBackend::new(&config)?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    pub fn with_backend(config: StudioConfig, backend: Arc<dyn ImageBackend>) -> Self {
        Self {
            state: FormState::default(),
            backend,
            config,
            editor: None,
            cancel: CancelFlag::new(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn backend(&self) -> Arc<dyn ImageBackend> {
        Arc::clone(&self.backend)
    }

    pub fn dispatch(&mut self, action: Action) {
        self.state = reduce(&self.state, action);
    }

    pub fn load_source_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let source = SourceImage::from_path(path)?;
        self.load_source(source);
        Ok(())
    }

    pub fn load_source(&mut self, source: SourceImage) {
        self.editor = None;
        self.dispatch(Action::LoadSource(Arc::new(source)));
    }

    /// Open a fresh editor over the current source image. Returns `None`
    /// (and surfaces an error) when no source is loaded.
    pub fn open_mask_editor(&mut self) -> Option<&mut MaskEditor> {
        self.dispatch(Action::OpenMaskEditor);
        if !self.state.mask_editor_open {
            return None;
        }
        let source = self.state.source.as_ref()?;
        self.editor = Some(MaskEditor::open(source));
        self.editor.as_mut()
    }

    pub fn mask_editor(&mut self) -> Option<&mut MaskEditor> {
        self.editor.as_mut()
    }

    pub fn save_mask(&mut self) -> Result<()> {
        let editor = self
            .editor
            .take()
            .ok_or_else(|| StudioError::UnknownFailure("Mask editor is not open".into()))?;
        let mask = editor.save()?;
        self.dispatch(Action::ApplyMask(Arc::new(mask)));
        Ok(())
    }

    pub fn cancel_mask_editor(&mut self) {
        if let Some(editor) = self.editor.take() {
            editor.cancel();
        }
        self.dispatch(Action::CloseMaskEditor);
    }

    /// Handle for stopping the running batch from elsewhere.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Plan for the next batch, validated against the current mode.
    pub fn plan(&self) -> Result<BatchPlan> {
        let template = self.state.request_template()?;
        let policy = SeedPolicy::from_form(self.state.use_random_seed, self.state.seed);
        Ok(BatchPlan::new(
            template,
            policy,
            self.state.batch_count as usize,
        ))
    }

    /// Run one batch to completion, failure or cancellation. Errors end up
    /// in `state().error`; the studio stays usable either way.
    pub async fn generate(&mut self) -> BatchReport {
        self.cancel.reset();
        let total = self.state.batch_count as usize;

        let plan = match self.plan() {
            Ok(plan) => plan,
            Err(e) => {
                log::warn!("Generation rejected: {}", e);
                self.dispatch(Action::BatchFailed(e.to_string()));
                return BatchReport::failed(total, e);
            }
        };

        self.dispatch(Action::BatchStarted);

        let backend = Arc::clone(&self.backend);
        let state = &mut self.state;
        run_batch(backend.as_ref(), plan, &self.cancel, |event| {
            *state = reduce(state, Action::from(event));
        })
        .await
    }

    pub async fn save_artifact(&self, id: Uuid) -> Result<PathBuf> {
        let artifact = self
            .state
            .artifact(id)
            .ok_or_else(|| StudioError::UnknownFailure(format!("No generated image {}", id)))?;
        export::save_artifact(&self.config.output_dir, artifact).await
    }

    pub async fn save_selected(&self) -> Result<Vec<PathBuf>> {
        export::save_selected(&self.config.output_dir, self.state.selected()).await
    }
}
