use actix_web::web::{Data, Json, Path, Query};
use serde::Deserialize;
use sqlx::pool::PoolConnection;
use sqlx::{query, query_as, query_scalar, PgPool, Postgres};

use crate::core::models::application::Role;
use crate::core::models::feed::FeedPost;
use crate::error::Error;
use crate::request::Pagination;
use crate::response::{CreateResponse, List, UpdateResponse};

async fn ensure_approved_member(conn: &mut PoolConnection<Postgres>, role: Role, login_id: &str) -> Result<(), Error> {
    let is_member: bool = query_scalar("SELECT EXISTS(SELECT id FROM applications WHERE role = $1 AND LOWER(login_id) = LOWER($2) AND status = 'approved')")
        .bind(role)
        .bind(login_id)
        .fetch_one(conn)
        .await?;
    if !is_member {
        return Err(Error::BusinessError("not an approved member of this collection".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostSubmit {
    author: String,
    title: String,
    body: String,
}

pub async fn publish(path: Path<(Role,)>, Json(PostSubmit { author, title, body }): Json<PostSubmit>, db: Data<PgPool>) -> Result<Json<CreateResponse>, Error> {
    let (role,) = path.into_inner();
    if title.trim().is_empty() || body.trim().is_empty() {
        return Err(Error::ValidationFailed("title and body are required".into()));
    }
    let mut conn = db.acquire().await?;
    ensure_approved_member(&mut conn, role, &author).await?;
    let id: i32 = query_scalar("INSERT INTO feed_posts (role, author_login_id, title, body) VALUES ($1, $2, $3, $4) RETURNING id")
        .bind(role)
        .bind(&author)
        .bind(&title)
        .bind(&body)
        .fetch_one(&mut conn)
        .await?;
    Ok(Json(CreateResponse::new(id)))
}

pub async fn list(path: Path<(Role,)>, Query(pagination): Query<Pagination>, db: Data<PgPool>) -> Result<Json<List<FeedPost>>, Error> {
    let (role,) = path.into_inner();
    let mut conn = db.acquire().await?;
    let (total,): (i64,) = query_as("SELECT COUNT(*) FROM feed_posts WHERE role = $1 AND NOT hidden")
        .bind(role)
        .fetch_one(&mut conn)
        .await?;
    let posts = query_as(
        "SELECT id, role, author_login_id, title, body, hidden, created_at
        FROM feed_posts
        WHERE role = $1 AND NOT hidden
        ORDER BY created_at DESC
        LIMIT $2
        OFFSET $3",
    )
    .bind(role)
    .bind(pagination.size)
    .bind(pagination.offset())
    .fetch_all(&mut conn)
    .await?;
    Ok(Json(List::new(posts, total)))
}

#[derive(Debug, Clone, Deserialize)]
pub struct HideRequest {
    moderator: String,
}

// Moderation is community based: any approved member of the collection can
// take a post out of the feed. Hidden posts stay in storage.
pub async fn hide(path: Path<(Role, i32)>, Json(HideRequest { moderator }): Json<HideRequest>, db: Data<PgPool>) -> Result<Json<UpdateResponse>, Error> {
    let (role, post_id) = path.into_inner();
    let mut conn = db.acquire().await?;
    ensure_approved_member(&mut conn, role, &moderator).await?;
    let updated = query("UPDATE feed_posts SET hidden = TRUE WHERE id = $1 AND role = $2")
        .bind(post_id)
        .bind(role)
        .execute(&mut conn)
        .await?
        .rows_affected();
    if updated == 0 {
        return Err(Error::NotFound("post"));
    }
    Ok(Json(UpdateResponse::new(updated)))
}
