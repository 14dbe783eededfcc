use std::sync::Arc;

use crate::services::{ImageUploader, LanguageModel};

/// Clientes externos compartilhados entre os workers
pub struct AppState {
    pub model: Arc<dyn LanguageModel>,
    pub uploader: Arc<dyn ImageUploader>,
    pub max_image_bytes: usize,
}
