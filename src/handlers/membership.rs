use actix_web::web::{Data, Json, Path, Query};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{query_as, FromRow, PgPool};

use crate::core::models::application::{ApplicationStatus, ApplicationSubmit, MemberApplication, Role, VoteSubmit};
use crate::core::services::membership::{self, VotePolicy};
use crate::database::sqlx::PgStore;
use crate::error::Error;
use crate::response::List;

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub login_id: String,
}

pub async fn apply(path: Path<(Role,)>, Json(data): Json<ApplicationSubmit>, db: Data<PgPool>) -> Result<Json<ApplyResponse>, Error> {
    let (role,) = path.into_inner();
    let tx = PgStore::new(db.begin().await?);
    let login_id = membership::submit_application(tx, role, data).await?;
    Ok(Json(ApplyResponse { login_id }))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login_id: String,
}

pub async fn login(path: Path<(Role,)>, Json(LoginRequest { login_id }): Json<LoginRequest>, db: Data<PgPool>) -> Result<Json<MemberApplication>, Error> {
    let (role,) = path.into_inner();
    let mut store = PgStore::new(db.acquire().await?);
    let member = membership::login(&mut store, role, &login_id).await?;
    Ok(Json(member))
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub status: ApplicationStatus,
}

pub async fn cast_vote(path: Path<(Role, i32)>, Json(data): Json<VoteSubmit>, policy: Data<VotePolicy>, db: Data<PgPool>) -> Result<Json<VoteResponse>, Error> {
    let (role, application_id) = path.into_inner();
    let tx = PgStore::new(db.begin().await?);
    let status = membership::cast_vote(tx, policy.get_ref(), role, application_id, data).await?;
    Ok(Json(VoteResponse { status }))
}

// Listing feeds the voting portal; the login id stays private to the
// applicant and is deliberately not part of this projection.
#[derive(Debug, Serialize, FromRow)]
pub struct ApplicationItem {
    id: i32,
    name: String,
    affiliation: String,
    reason: String,
    status: ApplicationStatus,
    approvals: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    status: Option<ApplicationStatus>,
    page: i64,
    size: i64,
}

pub async fn list(path: Path<(Role,)>, Query(ListParams { status, page, size }): Query<ListParams>, db: Data<PgPool>) -> Result<Json<List<ApplicationItem>>, Error> {
    let (role,) = path.into_inner();
    let mut conn = db.acquire().await?;
    let (total,): (i64,) = query_as("SELECT COUNT(*) FROM applications WHERE role = $1 AND ($2 IS NULL OR status = $2)")
        .bind(role)
        .bind(status)
        .fetch_one(&mut conn)
        .await?;
    let items = query_as(
        "SELECT
            a.id,
            a.name,
            a.affiliation,
            a.reason,
            a.status,
            (SELECT COUNT(*) FROM application_votes AS v WHERE v.application_id = a.id AND v.decision = 'approve') AS approvals,
            a.created_at
        FROM applications AS a
        WHERE a.role = $1
        AND ($2 IS NULL OR a.status = $2)
        ORDER BY a.created_at DESC
        LIMIT $3
        OFFSET $4",
    )
    .bind(role)
    .bind(status)
    .bind(size)
    .bind((page - 1).max(0) * size)
    .fetch_all(&mut conn)
    .await?;
    Ok(Json(List::new(items, total)))
}
