use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Role collections are independent namespaces: login ids are unique per
/// role, and voting on an application is scoped to its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Journalist,
    HumanRightsDefender,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Journalist => "journalist",
            Role::HumanRightsDefender => "human-rights-defender",
        }
    }
}

/// Approved and denied are terminal: no vote mutates the record afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vote_decision", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VoteDecision {
    Approve,
    Deny,
}

#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: i32,
    pub role: Role,
    pub login_id: String,
    pub name: String,
    pub affiliation: String,
    pub reason: String,
    pub status: ApplicationStatus,
    pub denial_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ApplicationInsert {
    pub role: Role,
    pub login_id: String,
    pub name: String,
    pub affiliation: String,
    pub reason: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct VoteRow {
    pub application_id: i32,
    pub voter_id: String,
    pub decision: VoteDecision,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VoteInsert {
    pub application_id: i32,
    pub voter_id: String,
    pub decision: VoteDecision,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSubmit {
    pub name: String,
    pub affiliation: String,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoteSubmit {
    pub voter_id: String,
    pub decision: VoteDecision,
    pub reason: Option<String>,
}

/// Full application record as returned to a logging-in member, with the vote
/// history folded into the approval and voted-by sets.
#[derive(Debug, Clone, Serialize)]
pub struct MemberApplication {
    pub id: i32,
    pub role: Role,
    pub login_id: String,
    pub name: String,
    pub affiliation: String,
    pub reason: String,
    pub status: ApplicationStatus,
    pub approvals: Vec<String>,
    pub voted_by: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
