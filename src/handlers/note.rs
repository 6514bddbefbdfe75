use actix_web::web::{Data, Json, Path, Query};
use serde::Deserialize;
use sqlx::{query, query_as, query_scalar, PgPool};

use crate::core::models::application::Role;
use crate::core::models::note::Note;
use crate::error::Error;
use crate::request::Pagination;
use crate::response::{CreateResponse, DeleteResponse, List, UpdateResponse};

#[derive(Debug, Clone, Deserialize)]
pub struct NoteSubmit {
    title: String,
    body: String,
}

pub async fn create(path: Path<(Role, String)>, Json(NoteSubmit { title, body }): Json<NoteSubmit>, db: Data<PgPool>) -> Result<Json<CreateResponse>, Error> {
    let (role, owner) = path.into_inner();
    if title.trim().is_empty() {
        return Err(Error::ValidationFailed("title is required".into()));
    }
    let mut conn = db.acquire().await?;
    let id: i32 = query_scalar("INSERT INTO notes (role, owner_login_id, title, body) VALUES ($1, $2, $3, $4) RETURNING id")
        .bind(role)
        .bind(&owner)
        .bind(&title)
        .bind(&body)
        .fetch_one(&mut conn)
        .await?;
    Ok(Json(CreateResponse::new(id)))
}

pub async fn list(path: Path<(Role, String)>, Query(pagination): Query<Pagination>, db: Data<PgPool>) -> Result<Json<List<Note>>, Error> {
    let (role, owner) = path.into_inner();
    let mut conn = db.acquire().await?;
    let (total,): (i64,) = query_as("SELECT COUNT(*) FROM notes WHERE role = $1 AND LOWER(owner_login_id) = LOWER($2)")
        .bind(role)
        .bind(&owner)
        .fetch_one(&mut conn)
        .await?;
    let notes = query_as(
        "SELECT id, role, owner_login_id, title, body, created_at, updated_at
        FROM notes
        WHERE role = $1 AND LOWER(owner_login_id) = LOWER($2)
        ORDER BY updated_at DESC
        LIMIT $3
        OFFSET $4",
    )
    .bind(role)
    .bind(&owner)
    .bind(pagination.size)
    .bind(pagination.offset())
    .fetch_all(&mut conn)
    .await?;
    Ok(Json(List::new(notes, total)))
}

pub async fn update(path: Path<(Role, String, i32)>, Json(NoteSubmit { title, body }): Json<NoteSubmit>, db: Data<PgPool>) -> Result<Json<UpdateResponse>, Error> {
    let (role, owner, note_id) = path.into_inner();
    if title.trim().is_empty() {
        return Err(Error::ValidationFailed("title is required".into()));
    }
    let mut conn = db.acquire().await?;
    let updated = query("UPDATE notes SET title = $1, body = $2, updated_at = NOW() WHERE id = $3 AND role = $4 AND LOWER(owner_login_id) = LOWER($5)")
        .bind(&title)
        .bind(&body)
        .bind(note_id)
        .bind(role)
        .bind(&owner)
        .execute(&mut conn)
        .await?
        .rows_affected();
    if updated == 0 {
        return Err(Error::NotFound("note"));
    }
    Ok(Json(UpdateResponse::new(updated)))
}

pub async fn delete_note(path: Path<(Role, String, i32)>, db: Data<PgPool>) -> Result<Json<DeleteResponse>, Error> {
    let (role, owner, note_id) = path.into_inner();
    let mut conn = db.acquire().await?;
    let deleted = query("DELETE FROM notes WHERE id = $1 AND role = $2 AND LOWER(owner_login_id) = LOWER($3)")
        .bind(note_id)
        .bind(role)
        .bind(&owner)
        .execute(&mut conn)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(Error::NotFound("note"));
    }
    Ok(Json(DeleteResponse::new(deleted)))
}
