use mongodb::{bson::doc, options::IndexOptions, Client, Collection, Database, IndexModel};
use std::error::Error;

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = database_name_from_uri(uri);
        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<mongodb::bson::Document>("users");

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match users.create_index(email_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(email) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    /// Round-trip to the server, used by the health check.
    pub async fn ping(&self) -> bool {
        self.db.run_command(doc! { "ping": 1 }).await.is_ok()
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

fn database_name_from_uri(uri: &str) -> &str {
    let without_scheme = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);
    without_scheme
        .split_once('/')
        .map(|(_, path)| path.split('?').next().unwrap_or(""))
        .filter(|name| !name.is_empty())
        .unwrap_or("voice_assistant")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_name_from_uri() {
        assert_eq!(database_name_from_uri("mongodb://localhost:27017/assistant"), "assistant");
        assert_eq!(
            database_name_from_uri("mongodb+srv://u:p@cluster.example.net/prod?retryWrites=true"),
            "prod"
        );
        assert_eq!(database_name_from_uri("mongodb://localhost:27017"), "voice_assistant");
        assert_eq!(database_name_from_uri("mongodb://localhost:27017/?w=majority"), "voice_assistant");
    }
}
