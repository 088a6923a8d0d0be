//! HTTP handlers for the Books module.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};
use shelf_http::AppError;
use shelf_store::Collection;
use time::OffsetDateTime;

use super::error::BookError;
use super::models::{Book, CreatedBook, ListBooksQuery};
use super::validation;

pub type Books = Arc<Collection<Book>>;

/// Build the Books router; mounted under `/api/books`.
pub fn router(books: Books) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(books)
}

/// Unwrap a JSON body that must be an object.
fn object_payload(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Map<String, Value>, BookError> {
    let Json(value) =
        payload.map_err(|rejection| BookError::InvalidPayload(rejection.body_text()))?;
    match value {
        Value::Object(fields) => Ok(fields),
        _ => Err(BookError::InvalidPayload(
            "book payload must be a JSON object".to_string(),
        )),
    }
}

async fn create_book(
    State(books): State<Books>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedBook>), AppError> {
    let fields = object_payload(payload)?;
    validation::validate_new(&fields).map_err(BookError::Validation)?;

    let book = Book::new(fields, OffsetDateTime::now_utc());
    let id = book.id.clone();

    books
        .modify(|records| {
            records.push(book);
            Ok::<_, BookError>(())
        })
        .await?;

    tracing::info!(book_id = %id, "book created");
    Ok((StatusCode::CREATED, Json(CreatedBook { id })))
}

/// Repeated keys are accepted; see [`ListBooksQuery::from_pairs`].
async fn list_books(
    State(books): State<Books>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let Query(pairs) =
        query.map_err(|rejection| BookError::InvalidPayload(rejection.body_text()))?;
    let query = ListBooksQuery::from_pairs(pairs);
    let mut records = books.all().await.map_err(BookError::from)?;

    if let Some(category) = query.category.as_deref() {
        records.retain(|book| book.in_category(category));
    }

    Ok(Json(records))
}

async fn get_book(
    State(books): State<Books>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let records = books.all().await.map_err(BookError::from)?;

    records
        .into_iter()
        .find(|book| book.id == id)
        .map(Json)
        .ok_or_else(|| BookError::NotFound(id).into())
}

async fn update_book(
    State(books): State<Books>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let patch = object_payload(payload)?;
    validation::validate_patch(&patch).map_err(BookError::Validation)?;

    let now = OffsetDateTime::now_utc();
    let updated = books
        .modify(|records| {
            let book = records
                .iter_mut()
                .find(|book| book.id == id)
                .ok_or_else(|| BookError::NotFound(id.clone()))?;
            book.apply(patch, now);
            Ok::<_, BookError>(book.clone())
        })
        .await?;

    tracing::info!(book_id = %updated.id, "book updated");
    Ok(Json(updated))
}

/// Deleting an unknown id is a no-op that still answers 204.
async fn delete_book(
    State(books): State<Books>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let removed = books
        .modify(|records| {
            let before = records.len();
            records.retain(|book| book.id != id);
            Ok::<_, BookError>(before - records.len())
        })
        .await?;

    if removed == 0 {
        tracing::debug!(book_id = %id, "delete matched no book");
    } else {
        tracing::info!(book_id = %id, "book deleted");
    }

    Ok(StatusCode::NO_CONTENT)
}
