use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

pub const USERS_COLLECTION: &str = "users";

/// Documento de usuário (armazenado no MongoDB)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub name: String,

    /// Sempre em minúsculas (índice único)
    pub email: String,

    /// Hash bcrypt
    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_name: Option<String>,

    /// URL do avatar do assistente
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_image: Option<String>,

    /// Comandos já enviados (append-only)
    #[serde(default)]
    pub history: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = BsonDateTime::now();
        Self {
            id: None,
            name,
            email,
            password: password_hash,
            assistant_name: None,
            assistant_image: None,
            history: Vec::new(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// User as returned to clients: everything but the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub assistant_name: Option<String>,
    pub assistant_image: Option<String>,
    pub history: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: user.name,
            email: user.email,
            assistant_name: user.assistant_name,
            assistant_image: user.assistant_image,
            history: user.history,
            created_at: user.created_at.and_then(|d| d.try_to_rfc3339_string().ok()),
            updated_at: user.updated_at.and_then(|d| d.try_to_rfc3339_string().ok()),
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignUpRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: PublicUser,
}

/// Request para atualizar o assistente
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssistantRequest {
    pub assistant_name: Option<String>,
    /// Avatar pré-definido escolhido no cliente
    pub image_url: Option<String>,
    /// Imagem enviada pelo usuário (data URI ou base64)
    pub image_data: Option<String>,
}
