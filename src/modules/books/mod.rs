pub mod models;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use utoipa::OpenApi;

use libris_db::DbError;
use libris_http::AppError;
use libris_kernel::{InitCtx, Migration, Module};

use models::{Book, BookInput};
use store::{BookStore, PgBookStore};

type Store = Arc<dyn BookStore>;

/// Books module: the single resource this service exposes.
pub struct BooksModule {
    store: Store,
}

impl BooksModule {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            store: Arc::new(PgBookStore::new(pool)),
        }
    }

    pub fn with_store(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/books", get(list_books).post(create_book))
            .route(
                "/books/{id}",
                get(get_book).put(update_book).delete(delete_book),
            )
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<utoipa::openapi::OpenApi> {
        Some(ApiDoc::openapi())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    id          BIGSERIAL PRIMARY KEY,
                    title       TEXT NOT NULL DEFAULT '',
                    author      TEXT NOT NULL DEFAULT '',
                    rating      INTEGER NOT NULL DEFAULT 0,
                    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
                    deleted_at  TIMESTAMPTZ
                );
                "#,
        }]
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(list_books, create_book, get_book, update_book, delete_book),
    components(schemas(Book, BookInput, libris_http::ErrorBody)),
    tags((name = "books", description = "Book catalog CRUD"))
)]
struct ApiDoc;

fn db_error(err: DbError) -> AppError {
    match err {
        DbError::NotFound(id) => AppError::not_found(format!("Book with ID {id} not found")),
        DbError::Query(err) => AppError::Internal(err.into()),
    }
}

#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All active books", body = [Book]),
        (status = 500, description = "Persistence failure", body = libris_http::ErrorBody)
    )
)]
async fn list_books(State(store): State<Store>) -> Result<Json<Vec<Book>>, AppError> {
    let books = store.find_all().await.map_err(db_error)?;
    Ok(Json(books))
}

#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookInput,
    responses(
        (status = 200, description = "Created book", body = Book),
        (status = 400, description = "Unparseable body", body = libris_http::ErrorBody),
        (status = 500, description = "Persistence failure", body = libris_http::ErrorBody)
    )
)]
async fn create_book(
    State(store): State<Store>,
    body: Result<Json<BookInput>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let Json(input) = body.map_err(|err| AppError::bad_request(err.body_text()))?;
    let book = store.create(input).await.map_err(db_error)?;
    Ok(Json(book))
}

#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 404, description = "No active book with this id", body = libris_http::ErrorBody)
    )
)]
async fn get_book(
    State(store): State<Store>,
    Path(id): Path<i64>,
) -> Result<Json<Book>, AppError> {
    let book = store.find_by_id(id).await.map_err(db_error)?;
    Ok(Json(book))
}

#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book id")),
    request_body = BookInput,
    responses(
        (status = 200, description = "Updated book", body = Book),
        (status = 400, description = "Unparseable body", body = libris_http::ErrorBody),
        (status = 404, description = "No active book with this id", body = libris_http::ErrorBody),
        (status = 500, description = "Persistence failure", body = libris_http::ErrorBody)
    )
)]
async fn update_book(
    State(store): State<Store>,
    Path(id): Path<i64>,
    body: Result<Json<BookInput>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    // Existence check first: an unknown id answers 404 even when the body
    // is also malformed.
    store.find_by_id(id).await.map_err(db_error)?;

    let Json(input) = body.map_err(|err| AppError::bad_request(err.body_text()))?;
    let book = store.save(id, input).await.map_err(db_error)?;
    Ok(Json(book))
}

#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 200, description = "Deletion confirmation"),
        (status = 404, description = "No active book with this id", body = libris_http::ErrorBody),
        (status = 500, description = "Persistence failure", body = libris_http::ErrorBody)
    )
)]
async fn delete_book(
    State(store): State<Store>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    store.delete(id).await.map_err(db_error)?;
    Ok(Json(json!({
        "message": format!("Book with ID {id} deleted successfully")
    })))
}

/// Build the module backed by the given pool.
pub fn create_module(pool: sqlx::PgPool) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use time::OffsetDateTime;
    use tower::ServiceExt;

    /// In-memory gateway with the same soft-delete contract as Postgres:
    /// deleted rows vanish from queries but their ids are never handed out
    /// again.
    struct MemStore {
        books: Mutex<Vec<Book>>,
        next_id: AtomicI64,
    }

    impl MemStore {
        fn new() -> Self {
            Self {
                books: Mutex::new(Vec::new()),
                next_id: AtomicI64::new(1),
            }
        }
    }

    #[async_trait]
    impl BookStore for MemStore {
        async fn find_all(&self) -> Result<Vec<Book>, DbError> {
            Ok(self.books.lock().unwrap().clone())
        }

        async fn create(&self, input: BookInput) -> Result<Book, DbError> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let now = OffsetDateTime::now_utc();
            let book = Book {
                id,
                title: input.title,
                author: input.author,
                rating: input.rating,
                created_at: now,
                updated_at: now,
            };
            self.books.lock().unwrap().push(book.clone());
            Ok(book)
        }

        async fn find_by_id(&self, id: i64) -> Result<Book, DbError> {
            self.books
                .lock()
                .unwrap()
                .iter()
                .find(|book| book.id == id)
                .cloned()
                .ok_or(DbError::NotFound(id))
        }

        async fn save(&self, id: i64, input: BookInput) -> Result<Book, DbError> {
            let mut books = self.books.lock().unwrap();
            let book = books
                .iter_mut()
                .find(|book| book.id == id)
                .ok_or(DbError::NotFound(id))?;

            book.title = input.title;
            book.author = input.author;
            book.rating = input.rating;
            book.updated_at = OffsetDateTime::now_utc();

            Ok(book.clone())
        }

        async fn delete(&self, id: i64) -> Result<(), DbError> {
            let mut books = self.books.lock().unwrap();
            let before = books.len();
            books.retain(|book| book.id != id);

            if books.len() == before {
                return Err(DbError::NotFound(id));
            }

            Ok(())
        }
    }

    fn test_router() -> Router {
        BooksModule::with_store(Arc::new(MemStore::new())).routes()
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let router = test_router();

        let (status, created) = send(
            &router,
            json_request(
                "POST",
                "/books",
                r#"{"title":"Dune","author":"Herbert","rating":5}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["id"], 1);
        assert_eq!(created["title"], "Dune");
        assert_eq!(created["author"], "Herbert");
        assert_eq!(created["rating"], 5);

        let (status, fetched) = send(&router, empty_request("GET", "/books/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["title"], created["title"]);
        assert_eq!(fetched["author"], created["author"]);
        assert_eq!(fetched["rating"], created["rating"]);
    }

    #[tokio::test]
    async fn list_includes_created_books() {
        let router = test_router();

        for body in [
            r#"{"title":"Dune","author":"Herbert","rating":5}"#,
            r#"{"title":"Hyperion","author":"Simmons","rating":4}"#,
        ] {
            let (status, _) = send(&router, json_request("POST", "/books", body)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, listed) = send(&router, empty_request("GET", "/books")).await;
        assert_eq!(status, StatusCode::OK);

        let titles: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|book| book["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Dune", "Hyperion"]);
    }

    #[tokio::test]
    async fn update_overwrites_all_fields() {
        let router = test_router();

        send(
            &router,
            json_request(
                "POST",
                "/books",
                r#"{"title":"Dune","author":"Herbert","rating":5}"#,
            ),
        )
        .await;

        // Fields missing from the body reset to their zero value.
        let (status, updated) = send(
            &router,
            json_request("PUT", "/books/1", r#"{"title":"Dune Messiah"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Dune Messiah");
        assert_eq!(updated["author"], "");
        assert_eq!(updated["rating"], 0);

        let (_, fetched) = send(&router, empty_request("GET", "/books/1")).await;
        assert_eq!(fetched["title"], "Dune Messiah");
        assert_eq!(fetched["author"], "");
        assert_eq!(fetched["rating"], 0);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let router = test_router();

        send(
            &router,
            json_request(
                "POST",
                "/books",
                r#"{"title":"Dune","author":"Herbert","rating":5}"#,
            ),
        )
        .await;

        let (status, confirmation) = send(&router, empty_request("DELETE", "/books/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(confirmation["message"], "Book with ID 1 deleted successfully");

        let (status, body) = send(&router, empty_request("GET", "/books/1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], true);
        assert_eq!(body["msg"], "Book with ID 1 not found");
    }

    #[tokio::test]
    async fn missing_id_yields_404_with_id_in_message() {
        let router = test_router();

        for request in [
            empty_request("GET", "/books/42"),
            empty_request("DELETE", "/books/42"),
        ] {
            let (status, body) = send(&router, request).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["error"], true);
            assert_eq!(body["msg"], "Book with ID 42 not found");
        }

        let (status, body) = send(
            &router,
            json_request("PUT", "/books/42", r#"{"title":"x"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["msg"], "Book with ID 42 not found");
    }

    #[tokio::test]
    async fn malformed_body_yields_400_before_persistence() {
        let store = Arc::new(MemStore::new());
        let router = BooksModule::with_store(store.clone()).routes();

        let (status, body) = send(&router, json_request("POST", "/books", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], true);

        // Nothing reached the gateway.
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_update_body_yields_400_for_existing_book() {
        let router = test_router();

        send(
            &router,
            json_request(
                "POST",
                "/books",
                r#"{"title":"Dune","author":"Herbert","rating":5}"#,
            ),
        )
        .await;

        let (status, body) = send(&router, json_request("PUT", "/books/1", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], true);

        // Record untouched.
        let (_, fetched) = send(&router, empty_request("GET", "/books/1")).await;
        assert_eq!(fetched["title"], "Dune");
    }

    #[tokio::test]
    async fn deleted_ids_are_never_reused() {
        let router = test_router();

        let (_, first) = send(
            &router,
            json_request("POST", "/books", r#"{"title":"a","author":"b","rating":1}"#),
        )
        .await;
        send(&router, empty_request("DELETE", "/books/1")).await;

        let (_, second) = send(
            &router,
            json_request("POST", "/books", r#"{"title":"c","author":"d","rating":2}"#),
        )
        .await;

        assert_eq!(first["id"], 1);
        assert_eq!(second["id"], 2);
    }

    #[test]
    fn openapi_fragment_covers_all_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.contains(&&"/books".to_string()));
        assert!(paths.contains(&&"/books/{id}".to_string()));
    }
}
