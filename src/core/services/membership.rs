use chrono::Utc;
use log::info;

use crate::core::models::application::{
    ApplicationInsert, ApplicationRow, ApplicationStatus, ApplicationSubmit, MemberApplication, Role, VoteDecision, VoteInsert, VoteRow, VoteSubmit,
};
use crate::core::ports::repository::{Store, TxStore};
use crate::error::Error;

/// Distinct approve votes required to promote a pending application to
/// approved. A single deny vote is immediately terminal regardless of how
/// many approvals have accumulated.
pub const APPROVAL_QUORUM: i64 = 10;

#[derive(Debug, Clone)]
pub struct VotePolicy {
    pub quorum: i64,
}

impl Default for VotePolicy {
    fn default() -> Self {
        Self { quorum: APPROVAL_QUORUM }
    }
}

impl VotePolicy {
    pub fn from_env() -> Self {
        let quorum = dotenv::var("APPROVAL_QUORUM").ok().and_then(|v| v.parse().ok()).unwrap_or(APPROVAL_QUORUM);
        Self { quorum }
    }
}

/// Lowercased name with whitespace stripped plus a four-digit time-derived
/// suffix. The suffix is low-entropy, so two submissions under the same name
/// can collide; uniqueness is best-effort and the unique index on
/// (role, lower(login_id)) surfaces a collision as a storage error.
pub fn derive_login_id(name: &str) -> String {
    let base: String = name.chars().filter(|c| !c.is_whitespace()).flat_map(char::to_lowercase).collect();
    let suffix = Utc::now().timestamp_millis() % 10_000;
    format!("{}{:04}", base, suffix)
}

/// Creates a pending application and returns the generated login id. The
/// caller is responsible for keeping the login id, there is no other way to
/// recover it.
pub async fn submit_application<T>(mut tx: T, role: Role, data: ApplicationSubmit) -> Result<String, Error>
where
    T: TxStore,
{
    if data.name.trim().is_empty() || data.affiliation.trim().is_empty() || data.reason.trim().is_empty() {
        return Err(Error::ValidationFailed("name, affiliation and reason are required".into()));
    }
    let login_id = derive_login_id(&data.name);
    let id = tx
        .insert(ApplicationInsert {
            role,
            login_id: login_id.clone(),
            name: data.name,
            affiliation: data.affiliation,
            reason: data.reason,
        })
        .await?;
    tx.commit().await?;
    info!("application {} submitted to the {} collection", id, role.as_str());
    Ok(login_id)
}

/// Pure lookup by login id within the role collection. This is identifier
/// based session resolution, not authentication: there is no secret to check,
/// and the call never mutates stored state.
pub async fn login<S>(store: &mut S, role: Role, login_id: &str) -> Result<MemberApplication, Error>
where
    S: Store,
{
    let row = store.find_by_login_id(role, login_id).await?.ok_or(Error::NotFound("application"))?;
    let votes = store.votes(row.id).await?;
    Ok(assemble(row, votes))
}

/// Applies a single vote inside one transaction: the application row is read
/// under a lock, the voter's prior votes are checked, the vote is recorded
/// and the status recomputed, then everything commits together. Two
/// concurrent votes from different voters both land; the same voter lands at
/// most once.
pub async fn cast_vote<T>(mut tx: T, policy: &VotePolicy, role: Role, application_id: i32, vote: VoteSubmit) -> Result<ApplicationStatus, Error>
where
    T: TxStore,
{
    if vote.voter_id.trim().is_empty() {
        return Err(Error::ValidationFailed("voter_id is required".into()));
    }
    let row = tx.get_for_update(role, application_id).await?.ok_or(Error::NotFound("application"))?;
    if row.status != ApplicationStatus::Pending {
        return Err(Error::NotPending);
    }
    let votes = tx.votes(application_id).await?;
    if votes.iter().any(|v| v.voter_id == vote.voter_id) {
        return Err(Error::AlreadyVoted);
    }
    tx.insert_vote(VoteInsert {
        application_id,
        voter_id: vote.voter_id,
        decision: vote.decision,
        reason: vote.reason.clone(),
    })
    .await?;
    let status = match vote.decision {
        VoteDecision::Deny => {
            tx.set_status(application_id, ApplicationStatus::Denied, vote.reason).await?;
            ApplicationStatus::Denied
        }
        VoteDecision::Approve => {
            let approvals = votes.iter().filter(|v| v.decision == VoteDecision::Approve).count() as i64 + 1;
            if approvals >= policy.quorum {
                tx.set_status(application_id, ApplicationStatus::Approved, None).await?;
                ApplicationStatus::Approved
            } else {
                ApplicationStatus::Pending
            }
        }
    };
    tx.commit().await?;
    if status != ApplicationStatus::Pending {
        info!("application {} resolved as {:?}", application_id, status);
    }
    Ok(status)
}

fn assemble(row: ApplicationRow, votes: Vec<VoteRow>) -> MemberApplication {
    let approvals = votes.iter().filter(|v| v.decision == VoteDecision::Approve).map(|v| v.voter_id.clone()).collect();
    let voted_by = votes.into_iter().map(|v| v.voter_id).collect();
    MemberApplication {
        id: row.id,
        role: row.role,
        login_id: row.login_id,
        name: row.name,
        affiliation: row.affiliation,
        reason: row.reason,
        status: row.status,
        approvals,
        voted_by,
        denial_reason: row.denial_reason,
        created_at: row.created_at,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::ports::repository::ApplicationStore;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::sync::{Mutex as RowLock, OwnedMutexGuard};

    #[derive(Debug, Default)]
    struct State {
        next_id: i32,
        applications: HashMap<i32, ApplicationRow>,
        votes: Vec<VoteRow>,
    }

    // get_for_update takes the row lock and the transaction keeps it until
    // commit/rollback or drop, mirroring the FOR UPDATE serialization the
    // Postgres store relies on
    #[derive(Debug)]
    struct MemStore {
        state: Arc<Mutex<State>>,
        row_lock: Arc<RowLock<()>>,
        held: Option<OwnedMutexGuard<()>>,
    }

    impl Default for MemStore {
        fn default() -> Self {
            Self {
                state: Arc::default(),
                row_lock: Arc::new(RowLock::new(())),
                held: None,
            }
        }
    }

    impl Clone for MemStore {
        fn clone(&self) -> Self {
            Self {
                state: self.state.clone(),
                row_lock: self.row_lock.clone(),
                held: None,
            }
        }
    }

    impl ApplicationStore for MemStore {
        async fn insert(&mut self, data: ApplicationInsert) -> Result<i32, Error> {
            let mut st = self.state.lock().unwrap();
            if st.applications.values().any(|a| a.role == data.role && a.login_id.eq_ignore_ascii_case(&data.login_id)) {
                return Err(Error::BusinessError("duplicate login id".into()));
            }
            st.next_id += 1;
            let id = st.next_id;
            st.applications.insert(
                id,
                ApplicationRow {
                    id,
                    role: data.role,
                    login_id: data.login_id,
                    name: data.name,
                    affiliation: data.affiliation,
                    reason: data.reason,
                    status: ApplicationStatus::Pending,
                    denial_reason: None,
                    created_at: Utc::now(),
                },
            );
            Ok(id)
        }

        async fn get_for_update(&mut self, role: Role, id: i32) -> Result<Option<ApplicationRow>, Error> {
            if self.held.is_none() {
                self.held = Some(self.row_lock.clone().lock_owned().await);
            }
            let st = self.state.lock().unwrap();
            Ok(st.applications.get(&id).filter(|a| a.role == role).cloned())
        }

        async fn find_by_login_id(&mut self, role: Role, login_id: &str) -> Result<Option<ApplicationRow>, Error> {
            let st = self.state.lock().unwrap();
            Ok(st.applications.values().find(|a| a.role == role && a.login_id.eq_ignore_ascii_case(login_id)).cloned())
        }

        async fn votes(&mut self, application_id: i32) -> Result<Vec<VoteRow>, Error> {
            let st = self.state.lock().unwrap();
            Ok(st.votes.iter().filter(|v| v.application_id == application_id).cloned().collect())
        }

        async fn insert_vote(&mut self, vote: VoteInsert) -> Result<(), Error> {
            let mut st = self.state.lock().unwrap();
            // mirrors the unique index on (application_id, voter_id)
            if st.votes.iter().any(|v| v.application_id == vote.application_id && v.voter_id == vote.voter_id) {
                return Err(Error::BusinessError("duplicate vote".into()));
            }
            st.votes.push(VoteRow {
                application_id: vote.application_id,
                voter_id: vote.voter_id,
                decision: vote.decision,
                reason: vote.reason,
            });
            Ok(())
        }

        async fn set_status(&mut self, id: i32, status: ApplicationStatus, denial_reason: Option<String>) -> Result<(), Error> {
            let mut st = self.state.lock().unwrap();
            let app = st.applications.get_mut(&id).ok_or(Error::NotFound("application"))?;
            app.status = status;
            app.denial_reason = denial_reason;
            Ok(())
        }
    }

    impl Store for MemStore {}

    impl TxStore for MemStore {
        async fn commit(self) -> Result<(), Error> {
            Ok(())
        }

        async fn rollback(self) -> Result<(), Error> {
            Ok(())
        }
    }

    fn submit(name: &str) -> ApplicationSubmit {
        ApplicationSubmit {
            name: name.into(),
            affiliation: "Freelance".into(),
            reason: "test".into(),
        }
    }

    fn approve(voter: &str) -> VoteSubmit {
        VoteSubmit {
            voter_id: voter.into(),
            decision: VoteDecision::Approve,
            reason: None,
        }
    }

    fn deny(voter: &str, reason: &str) -> VoteSubmit {
        VoteSubmit {
            voter_id: voter.into(),
            decision: VoteDecision::Deny,
            reason: Some(reason.into()),
        }
    }

    #[test]
    fn test_derive_login_id() {
        let id = derive_login_id("Alice van der Berg");
        assert!(id.starts_with("alicevanderberg"));
        let suffix = &id["alicevanderberg".len()..];
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_submit_then_login_returns_pending() {
        let store = MemStore::default();
        let login_id = submit_application(store.clone(), Role::Journalist, submit("Alice")).await.unwrap();
        let member = login(&mut store.clone(), Role::Journalist, &login_id).await.unwrap();
        assert_eq!(member.status, ApplicationStatus::Pending);
        assert!(member.approvals.is_empty());
        assert!(member.voted_by.is_empty());
        assert_eq!(member.name, "Alice");
    }

    #[tokio::test]
    async fn test_login_is_case_insensitive_and_scoped_by_role() {
        let store = MemStore::default();
        let login_id = submit_application(store.clone(), Role::Journalist, submit("Alice")).await.unwrap();
        login(&mut store.clone(), Role::Journalist, &login_id.to_uppercase()).await.unwrap();
        let err = login(&mut store.clone(), Role::HumanRightsDefender, &login_id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_login_is_pure() {
        let store = MemStore::default();
        let login_id = submit_application(store.clone(), Role::Journalist, submit("Alice")).await.unwrap();
        cast_vote(store.clone(), &VotePolicy::default(), Role::Journalist, 1, approve("bob")).await.unwrap();
        let first = login(&mut store.clone(), Role::Journalist, &login_id).await.unwrap();
        let second = login(&mut store.clone(), Role::Journalist, &login_id).await.unwrap();
        assert_eq!(first.status, second.status);
        assert_eq!(first.approvals, second.approvals);
        assert_eq!(first.voted_by, second.voted_by);
    }

    #[tokio::test]
    async fn test_missing_fields_are_rejected() {
        let store = MemStore::default();
        let data = ApplicationSubmit {
            name: "Alice".into(),
            affiliation: "  ".into(),
            reason: "test".into(),
        };
        let err = submit_application(store, Role::Journalist, data).await.unwrap_err();
        assert!(matches!(err, Error::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_double_vote_is_rejected_without_state_change() {
        let store = MemStore::default();
        let login_id = submit_application(store.clone(), Role::Journalist, submit("Alice")).await.unwrap();
        let policy = VotePolicy::default();
        cast_vote(store.clone(), &policy, Role::Journalist, 1, approve("bob")).await.unwrap();
        let err = cast_vote(store.clone(), &policy, Role::Journalist, 1, approve("bob")).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyVoted));
        let member = login(&mut store.clone(), Role::Journalist, &login_id).await.unwrap();
        assert_eq!(member.voted_by, vec!["bob".to_owned()]);
        assert_eq!(member.status, ApplicationStatus::Pending);
    }

    #[tokio::test]
    async fn test_quorum_promotes_to_approved() {
        let store = MemStore::default();
        let login_id = submit_application(store.clone(), Role::Journalist, submit("Alice")).await.unwrap();
        let policy = VotePolicy { quorum: 3 };
        assert_eq!(
            cast_vote(store.clone(), &policy, Role::Journalist, 1, approve("v1")).await.unwrap(),
            ApplicationStatus::Pending
        );
        assert_eq!(
            cast_vote(store.clone(), &policy, Role::Journalist, 1, approve("v2")).await.unwrap(),
            ApplicationStatus::Pending
        );
        assert_eq!(
            cast_vote(store.clone(), &policy, Role::Journalist, 1, approve("v3")).await.unwrap(),
            ApplicationStatus::Approved
        );
        // terminal: a further distinct vote is rejected and changes nothing
        let err = cast_vote(store.clone(), &policy, Role::Journalist, 1, approve("v4")).await.unwrap_err();
        assert!(matches!(err, Error::NotPending));
        let member = login(&mut store.clone(), Role::Journalist, &login_id).await.unwrap();
        assert_eq!(member.status, ApplicationStatus::Approved);
        assert_eq!(member.approvals.len(), 3);
        assert_eq!(member.voted_by.len(), 3);
    }

    #[tokio::test]
    async fn test_single_deny_is_terminal() {
        let store = MemStore::default();
        let login_id = submit_application(store.clone(), Role::HumanRightsDefender, submit("Alice")).await.unwrap();
        let policy = VotePolicy::default();
        cast_vote(store.clone(), &policy, Role::HumanRightsDefender, 1, approve("v1")).await.unwrap();
        let status = cast_vote(store.clone(), &policy, Role::HumanRightsDefender, 1, deny("v2", "unverifiable affiliation"))
            .await
            .unwrap();
        assert_eq!(status, ApplicationStatus::Denied);
        let err = cast_vote(store.clone(), &policy, Role::HumanRightsDefender, 1, approve("v3")).await.unwrap_err();
        assert!(matches!(err, Error::NotPending));
        let member = login(&mut store.clone(), Role::HumanRightsDefender, &login_id).await.unwrap();
        assert_eq!(member.status, ApplicationStatus::Denied);
        assert_eq!(member.denial_reason.as_deref(), Some("unverifiable affiliation"));
        assert_eq!(member.approvals, vec!["v1".to_owned()]);
        assert_eq!(member.voted_by.len(), 2);
    }

    #[tokio::test]
    async fn test_vote_on_unknown_application() {
        let store = MemStore::default();
        let err = cast_vote(store, &VotePolicy::default(), Role::Journalist, 42, approve("bob")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_vote_policy_env_override() {
        std::env::set_var("APPROVAL_QUORUM", "3");
        assert_eq!(VotePolicy::from_env().quorum, 3);
        std::env::remove_var("APPROVAL_QUORUM");
        assert_eq!(VotePolicy::from_env().quorum, APPROVAL_QUORUM);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_votes_both_land() {
        let store = MemStore::default();
        let login_id = submit_application(store.clone(), Role::Journalist, submit("Alice")).await.unwrap();
        let policy = VotePolicy::default();
        let (a, b) = (store.clone(), store.clone());
        let (pa, pb) = (policy.clone(), policy.clone());
        let ha = tokio::spawn(async move { cast_vote(a, &pa, Role::Journalist, 1, approve("left")).await });
        let hb = tokio::spawn(async move { cast_vote(b, &pb, Role::Journalist, 1, approve("right")).await });
        ha.await.unwrap().unwrap();
        hb.await.unwrap().unwrap();
        let member = login(&mut store.clone(), Role::Journalist, &login_id).await.unwrap();
        assert!(member.approvals.contains(&"left".to_owned()));
        assert!(member.approvals.contains(&"right".to_owned()));
        assert_eq!(member.voted_by.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_votes_at_quorum_boundary() {
        let store = MemStore::default();
        let login_id = submit_application(store.clone(), Role::Journalist, submit("Alice")).await.unwrap();
        let policy = VotePolicy { quorum: 2 };
        let (a, b) = (store.clone(), store.clone());
        let (pa, pb) = (policy.clone(), policy.clone());
        let ha = tokio::spawn(async move { cast_vote(a, &pa, Role::Journalist, 1, approve("left")).await });
        let hb = tokio::spawn(async move { cast_vote(b, &pb, Role::Journalist, 1, approve("right")).await });
        let statuses = vec![ha.await.unwrap().unwrap(), hb.await.unwrap().unwrap()];
        // the votes serialize on the row lock: whichever lands second sees
        // the quorum reached, and exactly one promotion happens
        assert_eq!(statuses.iter().filter(|s| **s == ApplicationStatus::Approved).count(), 1);
        let member = login(&mut store.clone(), Role::Journalist, &login_id).await.unwrap();
        assert_eq!(member.status, ApplicationStatus::Approved);
        assert_eq!(member.voted_by.len(), 2);
        assert!(member.approvals.contains(&"left".to_owned()));
        assert!(member.approvals.contains(&"right".to_owned()));
    }
}
