use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Store-assigned identifier of a posted job.
    JobId
);
entity_id!(CandidateId);
entity_id!(ApplicationId);
entity_id!(
    /// Store-assigned identifier of a recruiter or admin account.
    UserId
);

/// Role assigned to users created without an explicit one.
pub const DEFAULT_USER_ROLE: &str = "recruiter";

/// A posted position candidates can apply to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A person who applied or registered, keyed by a unique email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub email: String,
    pub resume: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Link record between one candidate and one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub candidate_id: CandidateId,
    pub cover_letter: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Recruiter/admin account record. No authentication is attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Validated job fields handed to the store; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCandidate {
    pub name: String,
    pub email: String,
    pub resume: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An application for a job. `applicant` is registered as a new candidate
/// only when no candidate with that email exists yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub job_id: JobId,
    pub applicant: NewCandidate,
    pub cover_letter: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// `POST /api/jobs` body. Required fields are optional here so that their
/// absence surfaces as a validation error rather than a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

/// `POST /api/candidates` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateCandidateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub resume: Option<String>,
}

/// `POST /api/apply` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub job_id: Option<JobId>,
    pub cover_letter: Option<String>,
    pub resume: Option<String>,
}

/// `POST /api/users` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    pub title: String,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            title: job.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub id: CandidateId,
    pub name: String,
    pub email: String,
}

impl From<&Candidate> for CandidateSummary {
    fn from(candidate: &Candidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name.clone(),
            email: candidate.email.clone(),
        }
    }
}

/// Application as exposed over HTTP, with the linked job and candidate
/// resolved. A summary is `None` when the referenced row no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub created_at: DateTime<Utc>,
    pub cover_letter: Option<String>,
    pub job: Option<JobSummary>,
    pub candidate: Option<CandidateSummary>,
}

impl ApplicationView {
    pub fn resolve(
        application: &Application,
        job: Option<&Job>,
        candidate: Option<&Candidate>,
    ) -> Self {
        Self {
            id: application.id,
            created_at: application.created_at,
            cover_letter: application.cover_letter.clone(),
            job: job.map(JobSummary::from),
            candidate: candidate.map(CandidateSummary::from),
        }
    }
}
