use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// A generated image. The bytes sit behind a shared reference so clones of
/// the artifact list never copy image data.
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    pub id: Uuid,
    pub seed: i64,
    pub created_at: DateTime<Utc>,
    pub selected: bool,
    data: Arc<[u8]>,
}

impl GeneratedArtifact {
    pub fn new(data: Vec<u8>, seed: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            seed,
            created_at: Utc::now(),
            selected: false,
            data: Arc::from(data),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl PartialEq for GeneratedArtifact {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.selected == other.selected
    }
}
