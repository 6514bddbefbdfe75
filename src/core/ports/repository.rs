use crate::core::models::application::{ApplicationInsert, ApplicationRow, ApplicationStatus, Role, VoteInsert, VoteRow};
use crate::error::Error;

/// Persistence port for the membership workflow. The engine only ever talks
/// to the store through this trait, so tests run against an in-memory
/// implementation and the sqlx implementation lives in `database::sqlx`.
#[allow(async_fn_in_trait)]
pub trait ApplicationStore {
    async fn insert(&mut self, data: ApplicationInsert) -> Result<i32, Error>;
    /// Fetches the record and, on transactional stores, locks it for the
    /// remainder of the transaction so the vote read-modify-write is atomic.
    async fn get_for_update(&mut self, role: Role, id: i32) -> Result<Option<ApplicationRow>, Error>;
    /// Case-insensitive exact match within the role collection.
    async fn find_by_login_id(&mut self, role: Role, login_id: &str) -> Result<Option<ApplicationRow>, Error>;
    async fn votes(&mut self, application_id: i32) -> Result<Vec<VoteRow>, Error>;
    async fn insert_vote(&mut self, vote: VoteInsert) -> Result<(), Error>;
    async fn set_status(&mut self, id: i32, status: ApplicationStatus, denial_reason: Option<String>) -> Result<(), Error>;
}

pub trait Store: ApplicationStore {}

/// A store scoped to a transaction. Dropping it without committing rolls the
/// transaction back.
#[allow(async_fn_in_trait)]
pub trait TxStore: Store {
    async fn commit(self) -> Result<(), Error>;
    async fn rollback(self) -> Result<(), Error>;
}
