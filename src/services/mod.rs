pub mod assistant_service;
pub mod auth_service;
pub mod cloudinary_service;
pub mod gemini_service;
pub mod intent_service;
pub mod user_service;

pub use cloudinary_service::{CloudinaryClient, ImageUploader};
pub use gemini_service::{GeminiClient, LanguageModel};
