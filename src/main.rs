use futures::StreamExt;
use sdstudio::{
    logger::{self, LogLevel, LoggerConfig},
    stream_batch, Action, BatchEvent, GenerationMode, Studio, StudioConfig,
};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let level = env::var("SDSTUDIO_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LogLevel::Info);
    logger::init_with_config(LoggerConfig::development().with_level(level))?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = StudioConfig::from_env();
    logger::log_config_info(&config);

    let mut studio = Studio::new(config)?;

    let prompt = env::var("SDSTUDIO_PROMPT")
        .unwrap_or_else(|_| "A serene landscape with mountains and a lake at sunset".to_string());
    studio.dispatch(Action::SetPrompt(prompt));

    if let Ok(negative) = env::var("SDSTUDIO_NEGATIVE_PROMPT") {
        studio.dispatch(Action::SetNegativePrompt(negative));
    }
    if let Some(count) = env::var("SDSTUDIO_BATCH").ok().and_then(|s| s.parse().ok()) {
        studio.dispatch(Action::SetBatchCount(count));
    }
    if let Some(seed) = env::var("SDSTUDIO_SEED").ok().and_then(|s| s.parse().ok()) {
        studio.dispatch(Action::SetRandomSeed(false));
        studio.dispatch(Action::SetSeed(seed));
    }

    let mode = match env::var("SDSTUDIO_MODE") {
        Ok(name) => serde_json::from_value::<GenerationMode>(serde_json::json!(name))
            .map_err(|_| format!("Unknown mode '{}' (text2img, img2img, inpaint)", name))?,
        Err(_) => GenerationMode::TextToImage,
    };
    studio.dispatch(Action::SetMode(mode));

    if let Ok(path) = env::var("SDSTUDIO_SOURCE") {
        log::info!("🖼️  Loading source image {}", path);
        studio.load_source_file(&path)?;
    }

    if mode == GenerationMode::Inpaint {
        // paint a horizontal band across the middle of the source
        if let Some(editor) = studio.open_mask_editor() {
            let (w, h) = (editor.width() as f32, editor.height() as f32);
            editor.pointer_down(0.0, h / 2.0);
            let mut x = 0.0;
            while x <= w {
                editor.pointer_move(x, h / 2.0);
                x += 5.0;
            }
            editor.pointer_up();
            studio.save_mask()?;
        }
    }

    let plan = match studio.plan() {
        Ok(plan) => plan,
        Err(e) => {
            log::error!("❌ Cannot start generation: {}", e);
            return Err(e.into());
        }
    };

    let cancel = studio.cancel_flag();
    cancel.reset();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("⚠️  Stopping after the current image");
            on_ctrl_c.cancel();
        }
    });

    let _timer = logger::timer("batch");
    studio.dispatch(Action::BatchStarted);
    let mut events = stream_batch(studio.backend(), plan, cancel);

    while let Some(event) = events.next().await {
        match &event {
            BatchEvent::Artifact {
                artifact,
                completed,
                total,
            } => {
                log::info!(
                    "📊 {}/{} done ({} bytes, seed {})",
                    completed,
                    total,
                    artifact.len(),
                    artifact.seed
                );
            }
            BatchEvent::Failed { message, completed } => {
                log::error!("❌ Generation failed after {} images: {}", completed, message);
            }
            BatchEvent::Cancelled { completed } => {
                log::warn!("⚠️  Cancelled with {} images", completed);
            }
            BatchEvent::Finished { completed } => {
                log::info!("🏁 Finished {} images", completed);
            }
        }
        studio.dispatch(Action::from(event));
    }

    let ids: Vec<_> = studio.state().artifacts.iter().map(|a| a.id).collect();
    for id in ids {
        studio.dispatch(Action::ToggleSelection(id));
    }
    let written = studio.save_selected().await?;
    for path in &written {
        log::info!("💾 {}", path.display());
    }

    if let Some(error) = &studio.state().error {
        return Err(error.clone().into());
    }

    Ok(())
}
