use crate::{
    error::Result,
    models::{GenerationRequest, GenerationResponse},
};
use async_trait::async_trait;

/// One request in, one image out. The batch driver only talks to the
/// service through this trait.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;

    fn name(&self) -> &str {
        "image-backend"
    }
}
