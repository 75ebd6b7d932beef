//! # cf-db-sqlite
//!
//! SQLite implementation of the CampusFind persistence ports. Maps the
//! relational rows back to the cf-core domain models; a single `items`
//! table carries both kinds with a `kind` discriminant column.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use cf_core::error::{AppError, Result};
use cf_core::models::{Credential, Item, ItemImage, ItemKind, ItemStatus, UserProfile};
use cf_core::traits::{CredentialStore, ItemRepo, ProfileRepo};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS items (
        id BLOB PRIMARY KEY,
        kind TEXT NOT NULL,
        status TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        category TEXT NOT NULL,
        location TEXT NOT NULL,
        image_kind TEXT NOT NULL,
        image_url TEXT,
        image_data TEXT,
        image_mime TEXT,
        reporter_name TEXT NOT NULL,
        reporter_email TEXT,
        reporter_phone TEXT,
        owner_id BLOB,
        submitted_to_office INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_items_kind_created ON items (kind, created_at DESC)",
    "CREATE TABLE IF NOT EXISTS profiles (
        id BLOB PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        full_name TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS credentials (
        user_id BLOB PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
];

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database and applies the schema.
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(store_err)?
            .create_if_missing(true);
        // An in-memory database exists per connection; a single-connection
        // pool keeps every query on the same schema.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(store_err)?;
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(store_err)?;
        }
        Ok(SqliteStore { pool })
    }
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Uuid {
    Uuid::from_slice(blob).unwrap_or_default()
}

fn store_err(err: sqlx::Error) -> AppError {
    AppError::StoreUnavailable(err.to_string())
}

/// Like `store_err`, but unique-constraint violations become `Conflict`.
fn write_err(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.message().contains("UNIQUE") {
            return AppError::Conflict(db.message().to_string());
        }
    }
    store_err(err)
}

fn corrupt(field: &str) -> AppError {
    AppError::StoreUnavailable(format!("corrupt row: bad {field}"))
}

fn item_from_row(row: &SqliteRow) -> Result<Item> {
    let image = match row.get::<&str, _>("image_kind") {
        "remote" => ItemImage::Remote {
            url: row.get::<Option<String>, _>("image_url").unwrap_or_default(),
        },
        "inline" => ItemImage::Inline {
            data: row.get::<Option<String>, _>("image_data").unwrap_or_default(),
            mime_type: row.get::<Option<String>, _>("image_mime").unwrap_or_default(),
        },
        "none" => ItemImage::None,
        _ => return Err(corrupt("image_kind")),
    };
    Ok(Item {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        kind: ItemKind::from_str(row.get("kind")).map_err(|_| corrupt("kind"))?,
        status: ItemStatus::from_str(row.get("status")).map_err(|_| corrupt("status"))?,
        name: row.get("name"),
        description: row.get("description"),
        category: row
            .get::<&str, _>("category")
            .parse()
            .map_err(|_| corrupt("category"))?,
        location: row.get("location"),
        image,
        reporter_name: row.get("reporter_name"),
        reporter_email: row.get("reporter_email"),
        reporter_phone: row.get("reporter_phone"),
        owner_id: row
            .get::<Option<Vec<u8>>, _>("owner_id")
            .map(|b| blob_to_uuid(b.as_slice())),
        submitted_to_office: row.get("submitted_to_office"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

fn image_columns(image: &ItemImage) -> (&'static str, Option<&str>, Option<&str>, Option<&str>) {
    match image {
        ItemImage::Remote { url } => ("remote", Some(url.as_str()), None, None),
        ItemImage::Inline { data, mime_type } => {
            ("inline", None, Some(data.as_str()), Some(mime_type.as_str()))
        }
        ItemImage::None => ("none", None, None, None),
    }
}

#[async_trait]
impl ItemRepo for SqliteStore {
    async fn list_items(&self, kind: ItemKind, status: Option<ItemStatus>) -> Result<Vec<Item>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    "SELECT * FROM items WHERE kind = ? AND status = ? ORDER BY created_at DESC",
                )
                .bind(kind.as_str())
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query("SELECT * FROM items WHERE kind = ? ORDER BY created_at DESC")
                    .bind(kind.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(store_err)?;

        rows.iter().map(item_from_row).collect()
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<Item>> {
        let row = sqlx::query("SELECT * FROM items WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn create_item(&self, item: &Item) -> Result<()> {
        let (image_kind, image_url, image_data, image_mime) = image_columns(&item.image);
        sqlx::query(
            "INSERT INTO items (id, kind, status, name, description, category, location,
                image_kind, image_url, image_data, image_mime,
                reporter_name, reporter_email, reporter_phone,
                owner_id, submitted_to_office, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(item.id))
        .bind(item.kind.as_str())
        .bind(item.status.as_str())
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.category.as_str())
        .bind(&item.location)
        .bind(image_kind)
        .bind(image_url)
        .bind(image_data)
        .bind(image_mime)
        .bind(&item.reporter_name)
        .bind(item.reporter_email.as_deref())
        .bind(item.reporter_phone.as_deref())
        .bind(item.owner_id.map(uuid_to_blob))
        .bind(item.submitted_to_office)
        .bind(item.created_at)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: ItemStatus) -> Result<()> {
        let result = sqlx::query("UPDATE items SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item".into(), id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepo for SqliteStore {
    async fn create_profile(&self, profile: &UserProfile) -> Result<()> {
        sqlx::query("INSERT INTO profiles (id, email, full_name, created_at) VALUES (?, ?, ?, ?)")
            .bind(uuid_to_blob(profile.id))
            .bind(&profile.email)
            .bind(&profile.full_name)
            .bind(profile.created_at)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;
        Ok(())
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let row = sqlx::query("SELECT * FROM profiles WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row.map(|row| UserProfile {
            id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
            email: row.get("email"),
            full_name: row.get("full_name"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
        }))
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn create_credential(&self, credential: &Credential) -> Result<()> {
        sqlx::query(
            "INSERT INTO credentials (user_id, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(credential.user_id))
        .bind(&credential.email)
        .bind(&credential.password_hash)
        .bind(credential.created_at)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>> {
        let row = sqlx::query("SELECT * FROM credentials WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row.map(|row| Credential {
            user_id: blob_to_uuid(row.get::<Vec<u8>, _>("user_id").as_slice()),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
        }))
    }

    async fn delete_credential(&self, user_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM credentials WHERE user_id = ?")
            .bind(uuid_to_blob(user_id))
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::models::Category;
    use chrono::Duration;

    async fn store() -> SqliteStore {
        SqliteStore::new("sqlite::memory:").await.unwrap()
    }

    fn sample_item(kind: ItemKind, created_at: DateTime<Utc>) -> Item {
        Item {
            id: Uuid::now_v7(),
            kind,
            status: ItemStatus::Open,
            name: "Black Wallet".into(),
            description: "leather bifold, ten+ chars".into(),
            category: Category::Wallets,
            location: "Library".into(),
            image: ItemImage::placeholder(),
            reporter_name: "Sam Reyes".into(),
            reporter_email: Some("sam@campus.edu".into()),
            reporter_phone: None,
            owner_id: Some(Uuid::now_v7()),
            submitted_to_office: false,
            created_at,
        }
    }

    #[tokio::test]
    async fn create_then_list_puts_the_newest_first() {
        let store = store().await;
        let older = sample_item(ItemKind::Lost, Utc::now() - Duration::minutes(5));
        let newer = sample_item(ItemKind::Lost, Utc::now());
        store.create_item(&older).await.unwrap();
        store.create_item(&newer).await.unwrap();

        let listed = store.list_items(ItemKind::Lost, None).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
    }

    #[tokio::test]
    async fn listing_separates_kinds_and_filters_status() {
        let store = store().await;
        let lost = sample_item(ItemKind::Lost, Utc::now());
        let found = sample_item(ItemKind::Found, Utc::now());
        store.create_item(&lost).await.unwrap();
        store.create_item(&found).await.unwrap();
        store
            .update_status(found.id, ItemStatus::Resolved)
            .await
            .unwrap();

        let open_found = store
            .list_items(ItemKind::Found, Some(ItemStatus::Open))
            .await
            .unwrap();
        assert!(open_found.is_empty());

        let all_found = store.list_items(ItemKind::Found, None).await.unwrap();
        assert_eq!(all_found.len(), 1);
        assert_eq!(all_found[0].status, ItemStatus::Resolved);
    }

    #[tokio::test]
    async fn items_round_trip_all_fields() {
        let store = store().await;
        let mut item = sample_item(ItemKind::Found, Utc::now());
        item.image = ItemImage::Inline {
            data: "aGVsbG8=".into(),
            mime_type: "image/jpeg".into(),
        };
        item.reporter_phone = Some("555-0123".into());
        item.submitted_to_office = true;
        store.create_item(&item).await.unwrap();

        let loaded = store.get_item(item.id).await.unwrap().unwrap();
        assert_eq!(loaded.image, item.image);
        assert_eq!(loaded.reporter_phone, item.reporter_phone);
        assert_eq!(loaded.owner_id, item.owner_id);
        assert!(loaded.submitted_to_office);
        assert_eq!(loaded.category, Category::Wallets);
    }

    #[tokio::test]
    async fn update_status_on_missing_id_is_not_found() {
        let store = store().await;
        let err = store
            .update_status(Uuid::now_v7(), ItemStatus::Returned)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_, _)));
    }

    #[tokio::test]
    async fn get_missing_item_is_none() {
        let store = store().await;
        assert!(store.get_item(Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_round_trip() {
        let store = store().await;
        let profile = UserProfile {
            id: Uuid::now_v7(),
            email: "sam@campus.edu".into(),
            full_name: "Sam Reyes".into(),
            created_at: Utc::now(),
        };
        store.create_profile(&profile).await.unwrap();

        let loaded = store.get_profile(profile.id).await.unwrap().unwrap();
        assert_eq!(loaded.email, profile.email);
        assert_eq!(loaded.full_name, profile.full_name);
    }

    #[tokio::test]
    async fn duplicate_credential_email_is_a_conflict() {
        let store = store().await;
        let first = Credential {
            user_id: Uuid::now_v7(),
            email: "sam@campus.edu".into(),
            password_hash: "$argon2id$stub".into(),
            created_at: Utc::now(),
        };
        let second = Credential {
            user_id: Uuid::now_v7(),
            ..first.clone()
        };
        store.create_credential(&first).await.unwrap();

        let err = store.create_credential(&second).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_credential_frees_the_email() {
        let store = store().await;
        let credential = Credential {
            user_id: Uuid::now_v7(),
            email: "sam@campus.edu".into(),
            password_hash: "$argon2id$stub".into(),
            created_at: Utc::now(),
        };
        store.create_credential(&credential).await.unwrap();
        store.delete_credential(credential.user_id).await.unwrap();

        assert!(store
            .find_by_email("sam@campus.edu")
            .await
            .unwrap()
            .is_none());
        store.create_credential(&credential).await.unwrap();
    }
}
