use crate::{
    client::traits::ImageBackend,
    error::{Result, StudioError},
    models::{GenerationRequest, GenerationResponse},
};
use async_trait::async_trait;
use std::sync::Mutex;

/// In-memory backend for tests: records every request and fails the calls
/// listed in `fail_on` (1-based).
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    pub(crate) requests: Mutex<Vec<GenerationRequest>>,
    fail_on: Vec<usize>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_on(call: usize) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail_on: vec![call],
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn seeds(&self) -> Vec<i64> {
        self.requests.lock().unwrap().iter().map(|r| r.seed).collect()
    }
}

#[async_trait]
impl ImageBackend for ScriptedBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        if self.fail_on.contains(&call) {
            return Err(StudioError::network(Some(503), "worker overloaded"));
        }
        Ok(GenerationResponse {
            image_data: vec![call as u8; 4],
            content_type: Some("image/png".into()),
        })
    }
}
