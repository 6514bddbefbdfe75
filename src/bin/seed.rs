//! One-time bootstrap: runs migrations and, when the application store is
//! empty, inserts a pre-approved admin record per role collection so the
//! voting workflow has an initial approved voter. Safe to re-run.

use log::info;
use sqlx::postgres::PgPoolOptions;
use sqlx::{query, query_scalar};

use haven::core::models::application::Role;
use haven::core::services::membership::VotePolicy;
use haven::error::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
    let database_url = dotenv::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new().max_connections(1).connect(&database_url).await?;
    sqlx::migrate!().run(&pool).await?;
    let count: i64 = query_scalar("SELECT COUNT(*) FROM applications").fetch_one(&pool).await?;
    if count > 0 {
        info!("application store already populated, nothing to seed");
        return Ok(());
    }
    // same quorum the server enforces, env override included
    let policy = VotePolicy::from_env();
    let mut tx = pool.begin().await?;
    for role in [Role::Journalist, Role::HumanRightsDefender] {
        let id: i32 = query_scalar(
            "INSERT INTO applications (role, login_id, name, affiliation, reason, status) VALUES ($1, 'admin', 'Admin', 'Haven', 'bootstrap member', 'approved') RETURNING id",
        )
        .bind(role)
        .fetch_one(&mut tx)
        .await?;
        for n in 0..policy.quorum {
            query("INSERT INTO application_votes (application_id, voter_id, decision) VALUES ($1, $2, 'approve')")
                .bind(id)
                .bind(format!("founder-{}", n))
                .execute(&mut tx)
                .await?;
        }
        info!("seeded admin application {} for the {} collection", id, role.as_str());
    }
    tx.commit().await?;
    Ok(())
}
