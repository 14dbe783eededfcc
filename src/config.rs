use std::env;

const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: String,
    pub database_url: String,
    pub cors_origins: Vec<String>,
    pub auth: AuthConfig,
    pub gemini: GeminiConfig,
    pub cloudinary: CloudinaryConfig,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    /// Marca o cookie como `Secure` (somente HTTPS)
    pub cookie_secure: bool,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub base_url: String,
    pub cloud_name: String,
    pub upload_preset: String,
    pub folder: Option<String>,
    pub max_image_bytes: usize,
}

fn required(key: &str) -> Result<String, String> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(format!("{} must be set", key)),
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match optional(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AppConfig {
    /// Lê a configuração das variáveis de ambiente (`.env` já carregado)
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT").unwrap_or_else(|_| "8000".to_string()),
            database_url: required("DATABASE_URL")?,
            cors_origins: parse_origins(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".to_string()),
            ),
            auth: AuthConfig {
                jwt_secret: required("JWT_SECRET")?,
                token_ttl_days: parsed("JWT_TTL_DAYS", 10)?,
                cookie_secure: parsed("COOKIE_SECURE", false)?,
            },
            gemini: GeminiConfig {
                api_url: required("GEMINI_API_URL")?,
                api_key: optional("GEMINI_API_KEY"),
                timeout_secs: parsed("GEMINI_TIMEOUT_SECS", 30)?,
            },
            cloudinary: CloudinaryConfig {
                base_url: env::var("CLOUDINARY_BASE_URL")
                    .unwrap_or_else(|_| "https://api.cloudinary.com".to_string()),
                cloud_name: optional("CLOUDINARY_CLOUD_NAME").unwrap_or_default(),
                upload_preset: optional("CLOUDINARY_UPLOAD_PRESET").unwrap_or_default(),
                folder: optional("CLOUDINARY_FOLDER"),
                max_image_bytes: parsed("MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
            },
        })
    }
}
