use crate::{
    config::AuthConfig,
    database::MongoDB,
    models::{PublicUser, SignInRequest, SignUpRequest, User, USERS_COLLECTION},
    utils::AppError,
};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use mongodb::bson::doc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex");
}

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user _id (hex)
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}

/// Validated sign-up input.
#[derive(Debug, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub fn validate_sign_up(request: &SignUpRequest) -> Result<NewAccount, AppError> {
    let name = request.name.as_deref().map(str::trim).unwrap_or_default();
    let email = request.email.as_deref().map(str::trim).unwrap_or_default();
    let password = request.password.as_deref().unwrap_or_default();

    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::InvalidRequest("name, email and password are required".to_string()));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(AppError::InvalidRequest("invalid email address".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidRequest(format!(
            "password must be at least {} characters !",
            MIN_PASSWORD_LEN
        )));
    }

    Ok(NewAccount {
        name: name.to_string(),
        email: email.to_lowercase(),
        password: password.to_string(),
    })
}

// Generate JWT token
pub fn generate_jwt(user_id: &str, config: &AuthConfig) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(config.token_ttl_days)).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

// Verify JWT token
pub fn verify_token(token: &str, config: &AuthConfig) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

async fn verify_password(password: String, hashed: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify(password, &hashed))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))
}

// User registration
pub async fn sign_up(
    db: &MongoDB,
    config: &AuthConfig,
    request: &SignUpRequest,
) -> Result<(PublicUser, String), AppError> {
    let account = validate_sign_up(request)?;
    let collection = db.collection::<User>(USERS_COLLECTION);

    if collection.find_one(doc! { "email": &account.email }).await?.is_some() {
        return Err(AppError::InvalidRequest("email already exists !".to_string()));
    }

    let hashed_password = hash_password(account.password).await?;
    let mut new_user = User::new(account.name, account.email, hashed_password);

    let inserted = collection.insert_one(&new_user).await.map_err(|e| {
        // Índice único: outro cadastro com o mesmo email venceu a corrida
        if e.to_string().contains("E11000") {
            AppError::InvalidRequest("email already exists !".to_string())
        } else {
            AppError::DatabaseError(format!("Failed to create user: {}", e))
        }
    })?;

    new_user.id = inserted.inserted_id.as_object_id();
    let user_id = new_user
        .id
        .map(|id| id.to_hex())
        .ok_or_else(|| AppError::Internal("Inserted user has no ObjectId".to_string()))?;

    let token = generate_jwt(&user_id, config)?;

    log::info!("✅ User registered successfully: {}", new_user.email);

    Ok((PublicUser::from(new_user), token))
}

// User login
pub async fn sign_in(
    db: &MongoDB,
    config: &AuthConfig,
    request: &SignInRequest,
) -> Result<(PublicUser, String), AppError> {
    let email = request.email.trim().to_lowercase();
    let collection = db.collection::<User>(USERS_COLLECTION);

    let user = collection
        .find_one(doc! { "email": &email })
        .await?
        .ok_or_else(|| AppError::InvalidRequest("email does not exists !".to_string()))?;

    if !verify_password(request.password.clone(), user.password.clone()).await? {
        return Err(AppError::InvalidRequest("incorrect password".to_string()));
    }

    let user_id = user
        .id
        .map(|id| id.to_hex())
        .ok_or_else(|| AppError::Internal("Stored user has no ObjectId".to_string()))?;

    let token = generate_jwt(&user_id, config)?;

    Ok((PublicUser::from(user), token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_days: 10,
            cookie_secure: false,
        }
    }

    fn sign_up_request(name: &str, email: &str, password: &str) -> SignUpRequest {
        SignUpRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let token = generate_jwt("65f0c0ffee0000000000abcd", &config()).unwrap();
        let claims = verify_token(&token, &config()).unwrap();

        assert_eq!(claims.sub, "65f0c0ffee0000000000abcd");
        assert_eq!(claims.exp - claims.iat, 10 * 24 * 3600);
    }

    #[test]
    fn test_token_with_other_secret_is_rejected() {
        let token = generate_jwt("abc", &config()).unwrap();
        let other = AuthConfig {
            jwt_secret: "another-secret".to_string(),
            ..config()
        };
        assert!(matches!(verify_token(&token, &other), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let expired = AuthConfig {
            token_ttl_days: -1,
            ..config()
        };
        let token = generate_jwt("abc", &expired).unwrap();
        assert!(verify_token(&token, &config()).is_err());
    }

    #[test]
    fn test_sign_up_normalizes_input() {
        let account = validate_sign_up(&sign_up_request("  Ana ", " Ana@Example.COM ", "secret1")).unwrap();
        assert_eq!(
            account,
            NewAccount {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                password: "secret1".to_string(),
            }
        );
    }

    #[test]
    fn test_sign_up_validation_errors() {
        let missing = SignUpRequest {
            name: None,
            email: Some("ana@example.com".into()),
            password: Some("secret1".into()),
        };
        assert!(validate_sign_up(&missing).is_err());

        let bad_email = validate_sign_up(&sign_up_request("Ana", "ana.example.com", "secret1")).unwrap_err();
        assert_eq!(bad_email.client_message(), "invalid email address");

        let short = validate_sign_up(&sign_up_request("Ana", "ana@example.com", "12345")).unwrap_err();
        assert_eq!(short.client_message(), "password must be at least 6 characters !");
    }

    #[tokio::test]
    async fn test_password_hash_verifies() {
        let hashed = hash_password("secret1".to_string()).await.unwrap();
        assert!(verify_password("secret1".to_string(), hashed.clone()).await.unwrap());
        assert!(!verify_password("wrong".to_string(), hashed).await.unwrap());
    }
}
