use sqlx::{query, query_as, query_scalar, Executor, Postgres, Transaction};

use crate::core::models::application::{ApplicationInsert, ApplicationRow, ApplicationStatus, Role, VoteInsert, VoteRow};
use crate::core::ports::repository::{ApplicationStore, Store, TxStore};
use crate::error::Error;

/// Postgres implementation of the repository ports, generic over any sqlx
/// executor so the same code serves pooled connections and transactions.
pub struct PgStore<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    executor: E,
}

impl<E> PgStore<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

impl<E> ApplicationStore for PgStore<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, data: ApplicationInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO applications (role, login_id, name, affiliation, reason) VALUES ($1, $2, $3, $4, $5) RETURNING id")
            .bind(data.role)
            .bind(&data.login_id)
            .bind(&data.name)
            .bind(&data.affiliation)
            .bind(&data.reason)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn get_for_update(&mut self, role: Role, id: i32) -> Result<Option<ApplicationRow>, Error> {
        let row = query_as("SELECT * FROM applications WHERE id = $1 AND role = $2 FOR UPDATE")
            .bind(id)
            .bind(role)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(row)
    }

    async fn find_by_login_id(&mut self, role: Role, login_id: &str) -> Result<Option<ApplicationRow>, Error> {
        let row = query_as("SELECT * FROM applications WHERE role = $1 AND LOWER(login_id) = LOWER($2)")
            .bind(role)
            .bind(login_id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(row)
    }

    async fn votes(&mut self, application_id: i32) -> Result<Vec<VoteRow>, Error> {
        let votes = query_as("SELECT application_id, voter_id, decision, reason FROM application_votes WHERE application_id = $1")
            .bind(application_id)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(votes)
    }

    async fn insert_vote(&mut self, vote: VoteInsert) -> Result<(), Error> {
        query("INSERT INTO application_votes (application_id, voter_id, decision, reason) VALUES ($1, $2, $3, $4)")
            .bind(vote.application_id)
            .bind(&vote.voter_id)
            .bind(vote.decision)
            .bind(&vote.reason)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }

    async fn set_status(&mut self, id: i32, status: ApplicationStatus, denial_reason: Option<String>) -> Result<(), Error> {
        query("UPDATE applications SET status = $1, denial_reason = $2 WHERE id = $3")
            .bind(status)
            .bind(&denial_reason)
            .bind(id)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }
}

impl<E> Store for PgStore<E> where for<'e> &'e mut E: Executor<'e, Database = Postgres> {}

impl TxStore for PgStore<Transaction<'static, Postgres>> {
    async fn commit(self) -> Result<(), Error> {
        self.executor.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        self.executor.rollback().await?;
        Ok(())
    }
}
