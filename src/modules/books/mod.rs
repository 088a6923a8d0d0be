pub mod error;
pub mod models;
mod openapi;
pub mod routes;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use shelf_kernel::{settings::StorageSettings, InitCtx, Module};
use shelf_store::{Collection, CollectionStore, JsonFileStore};

use models::Book;

/// Books resource: CRUD over a JSON collection
pub struct BooksModule {
    books: routes::Books,
    file: Option<JsonFileStore>,
}

impl BooksModule {
    /// Back the module with the configured books file.
    pub fn from_settings(storage: &StorageSettings) -> Self {
        let file = JsonFileStore::new(storage.books_path());
        let store: Arc<dyn CollectionStore<Book>> = Arc::new(file.clone());
        Self {
            books: Arc::new(Collection::new("books", store)),
            file: Some(file),
        }
    }

    /// Back the module with an arbitrary store.
    pub fn with_store(store: Arc<dyn CollectionStore<Book>>) -> Self {
        Self {
            books: Arc::new(Collection::new("books", store)),
            file: None,
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if let Some(file) = &self.file {
            if ctx.settings.storage.create_if_missing {
                file.ensure_exists().await?;
            } else if !file.path().exists() {
                tracing::warn!(
                    module = self.name(),
                    path = %file.path().display(),
                    "books file is missing; requests will fail until it is created"
                );
            }
        }

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            collection = self.books.name(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.books.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi::document())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module from settings
pub fn create_module(storage: &StorageSettings) -> Arc<dyn Module> {
    Arc::new(BooksModule::from_settings(storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use shelf_kernel::settings::Settings;
    use tower::ServiceExt;

    fn settings_in(dir: &std::path::Path) -> Settings {
        let mut settings = Settings::default();
        settings.storage.data_dir = dir.join("data");
        settings
    }

    #[tokio::test]
    async fn init_creates_the_books_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let module = BooksModule::from_settings(&settings.storage);

        module.init(&InitCtx { settings: &settings }).await.unwrap();

        let content = std::fs::read_to_string(settings.storage.books_path()).unwrap();
        assert_eq!(content.trim(), "[]");
    }

    #[tokio::test]
    async fn created_books_land_in_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let module = BooksModule::from_settings(&settings.storage);
        module.init(&InitCtx { settings: &settings }).await.unwrap();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"title":"Emma","author":"Jane Austen","category":"classics"}"#,
            ))
            .unwrap();
        let response = module.routes().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let stored: Vec<Book> =
            serde_json::from_slice(&std::fs::read(settings.storage.books_path()).unwrap())
                .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].fields["title"], "Emma");
    }

    #[tokio::test]
    async fn broken_storage_yields_generic_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings_in(dir.path());
        settings.storage.create_if_missing = false;
        std::fs::create_dir_all(&settings.storage.data_dir).unwrap();
        std::fs::write(settings.storage.books_path(), "not json at all").unwrap();

        let module = BooksModule::from_settings(&settings.storage);
        module.init(&InitCtx { settings: &settings }).await.unwrap();

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = module.routes().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "internal_error");
        assert!(!body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("not json"));
    }

    #[tokio::test]
    async fn records_without_server_timestamps_are_served() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        std::fs::create_dir_all(&settings.storage.data_dir).unwrap();
        std::fs::write(
            settings.storage.books_path(),
            r#"[{"title":"A","category":"c","id":"k1"},
                {"title":"B","category":"c","id":"k2","createdAt":"2021-03-04T10:11:12.345Z"},
                {"title":"C","category":"c","id":"k3","createdAt":"4 March 2021"}]"#,
        )
        .unwrap();

        let module = BooksModule::from_settings(&settings.storage);
        module.init(&InitCtx { settings: &settings }).await.unwrap();

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = module.routes().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let listed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 3);

        let request = Request::builder().uri("/k2").body(Body::empty()).unwrap();
        let response = module.routes().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request = Request::builder()
            .method(Method::PUT)
            .uri("/k3")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"price":3}"#))
            .unwrap();
        let response = module.routes().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let stored: serde_json::Value =
            serde_json::from_slice(&std::fs::read(settings.storage.books_path()).unwrap())
                .unwrap();
        assert!(stored[0].get("createdAt").is_none());
        assert_eq!(stored[2]["createdAt"], "4 March 2021");
        assert!(stored[2]["updatedAt"].is_string());
    }

    #[tokio::test]
    async fn missing_file_yields_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings_in(dir.path());
        settings.storage.create_if_missing = false;

        let module = BooksModule::from_settings(&settings.storage);
        module.init(&InitCtx { settings: &settings }).await.unwrap();

        let request = Request::builder().uri("/some-id").body(Body::empty()).unwrap();
        let response = module.routes().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn openapi_covers_every_operation() {
        let module = BooksModule::with_store(Arc::new(shelf_store::MemoryStore::<Book>::default()));
        let spec = module.openapi().unwrap();

        for (path, method) in [
            ("/", "get"),
            ("/", "post"),
            ("/{id}", "get"),
            ("/{id}", "put"),
            ("/{id}", "delete"),
        ] {
            assert!(spec["paths"][path][method].is_object(), "{method} {path}");
        }
        assert!(spec["paths"].get("/health").is_none());
    }
}
