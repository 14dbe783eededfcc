use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::ReturnDocument;

use crate::{
    database::MongoDB,
    models::{PublicUser, UpdateAssistantRequest, User, USERS_COLLECTION},
    services::cloudinary_service::ImageUploader,
    utils::{image::normalize_image_data, AppError},
};

fn parse_user_id(user_id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(user_id).map_err(|_| AppError::InvalidRequest("invalid user id".to_string()))
}

pub async fn find_user(db: &MongoDB, user_id: &str) -> Result<User, AppError> {
    let id = parse_user_id(user_id)?;

    db.collection::<User>(USERS_COLLECTION)
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))
}

pub async fn get_current_user(db: &MongoDB, user_id: &str) -> Result<PublicUser, AppError> {
    find_user(db, user_id).await.map(PublicUser::from)
}

/// Records a command in the user's history. `$push` keeps the list append-only.
pub async fn append_history(db: &MongoDB, user_id: &str, command: &str) -> Result<(), AppError> {
    let id = parse_user_id(user_id)?;

    let result = db
        .collection::<User>(USERS_COLLECTION)
        .update_one(
            doc! { "_id": id },
            doc! {
                "$push": { "history": command },
                "$set": { "updatedAt": BsonDateTime::now() },
            },
        )
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::NotFound("user not found".to_string()));
    }

    Ok(())
}

/// Append-only record of the commands a user has spoken.
#[async_trait]
pub trait CommandHistory: Send + Sync {
    async fn record(&self, user_id: &str, command: &str) -> Result<(), AppError>;
}

#[async_trait]
impl CommandHistory for MongoDB {
    async fn record(&self, user_id: &str, command: &str) -> Result<(), AppError> {
        append_history(self, user_id, command).await
    }
}

/// Where the new avatar comes from, in priority order.
#[derive(Debug, PartialEq, Eq)]
pub enum ImageSource {
    Upload(String),
    Url(String),
    Keep,
}

/// Validated assistant update.
#[derive(Debug, PartialEq, Eq)]
pub struct AssistantUpdate {
    pub assistant_name: String,
    pub image: ImageSource,
}

pub fn validate_update(
    request: &UpdateAssistantRequest,
    max_image_bytes: usize,
) -> Result<AssistantUpdate, AppError> {
    let assistant_name = request
        .assistant_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("assistant name is required".to_string()))?
        .to_string();

    let image_data = request.image_data.as_deref().filter(|d| !d.trim().is_empty());
    let image_url = request.image_url.as_deref().map(str::trim).filter(|u| !u.is_empty());

    let image = match (image_data, image_url) {
        (Some(data), _) => ImageSource::Upload(normalize_image_data(data, max_image_bytes)?),
        (None, Some(url)) => ImageSource::Url(url.to_string()),
        (None, None) => ImageSource::Keep,
    };

    Ok(AssistantUpdate { assistant_name, image })
}

pub async fn update_assistant(
    db: &MongoDB,
    uploader: &dyn ImageUploader,
    user_id: &str,
    update: AssistantUpdate,
) -> Result<PublicUser, AppError> {
    let id = parse_user_id(user_id)?;

    let mut set = Document::new();
    set.insert("assistantName", update.assistant_name);
    set.insert("updatedAt", BsonDateTime::now());

    match update.image {
        ImageSource::Upload(data_uri) => {
            let url = uploader.upload(&data_uri).await?;
            set.insert("assistantImage", url);
        }
        ImageSource::Url(url) => {
            set.insert("assistantImage", url);
        }
        ImageSource::Keep => {}
    }

    db.collection::<User>(USERS_COLLECTION)
        .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
        .return_document(ReturnDocument::After)
        .await?
        .map(PublicUser::from)
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: Option<&str>, url: Option<&str>, data: Option<&str>) -> UpdateAssistantRequest {
        UpdateAssistantRequest {
            assistant_name: name.map(String::from),
            image_url: url.map(String::from),
            image_data: data.map(String::from),
        }
    }

    #[test]
    fn test_name_is_required() {
        let err = validate_update(&request(Some("   "), None, None), 1024).unwrap_err();
        assert_eq!(err.client_message(), "assistant name is required");
    }

    #[test]
    fn test_uploaded_image_wins_over_url() {
        let update = validate_update(
            &request(
                Some(" Friday "),
                Some("https://cdn.example.com/preset.png"),
                Some("data:image/png;base64,iVBORw0KGgoAAAAA"),
            ),
            1024,
        )
        .unwrap();

        assert_eq!(update.assistant_name, "Friday");
        assert!(matches!(update.image, ImageSource::Upload(_)));
    }

    #[test]
    fn test_preset_url_and_keep() {
        let with_url = validate_update(&request(Some("Jarvis"), Some("https://cdn.example.com/a.png"), None), 1024)
            .unwrap();
        assert_eq!(with_url.image, ImageSource::Url("https://cdn.example.com/a.png".into()));

        let keep = validate_update(&request(Some("Jarvis"), Some(""), Some("")), 1024).unwrap();
        assert_eq!(keep.image, ImageSource::Keep);
    }

    #[test]
    fn test_invalid_user_id() {
        assert!(matches!(parse_user_id("not-an-object-id"), Err(AppError::InvalidRequest(_))));
    }

    struct NoUpload;

    #[async_trait]
    impl ImageUploader for NoUpload {
        async fn upload(&self, _data_uri: &str) -> Result<String, AppError> {
            Err(AppError::Internal("upload not expected".to_string()))
        }
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_assistant_update_and_history_persist() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/voice_assistant_test".to_string());
        let db = MongoDB::new(&uri).await.unwrap();

        let mut user = User::new("Ana".into(), format!("ana-{}@example.com", ObjectId::new()), "x".into());
        let inserted = db.collection::<User>(USERS_COLLECTION).insert_one(&user).await.unwrap();
        user.id = inserted.inserted_id.as_object_id();
        let user_id = user.id.unwrap().to_hex();

        let update = validate_update(&request(Some("Friday"), Some("https://cdn.example.com/a.png"), None), 1024)
            .unwrap();
        update_assistant(&db, &NoUpload, &user_id, update).await.unwrap();
        append_history(&db, &user_id, "what time is it").await.unwrap();
        db.record(&user_id, "open instagram").await.unwrap();

        let fetched = get_current_user(&db, &user_id).await.unwrap();
        assert_eq!(fetched.assistant_name.as_deref(), Some("Friday"));
        assert_eq!(fetched.assistant_image.as_deref(), Some("https://cdn.example.com/a.png"));
        assert_eq!(fetched.history, vec!["what time is it", "open instagram"]);

        db.collection::<User>(USERS_COLLECTION)
            .delete_one(doc! { "_id": user.id.unwrap() })
            .await
            .unwrap();
    }
}
