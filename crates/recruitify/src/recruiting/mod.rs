//! Job listings, candidates, applications and recruiter accounts.
//!
//! [`RecruitingService`] owns the request contract; persistence is injected
//! through [`RecruitingStore`] and provided by [`InMemoryStore`] or
//! [`SqliteStore`].

pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationView, ApplyRequest, Candidate, CandidateId,
    CandidateSummary, CreateCandidateRequest, CreateJobRequest, CreateUserRequest, Job, JobId,
    JobSummary, NewApplication, NewCandidate, NewJob, NewUser, User, UserId, DEFAULT_USER_ROLE,
};
pub use memory::InMemoryStore;
pub use repository::{
    ApplicationRepository, CandidateRepository, JobRepository, RecruitingStore, StoreError,
    UserRepository,
};
pub use router::recruiting_router;
pub use service::{RecruitingError, RecruitingService};
pub use sqlite::{DatabaseError, SqliteStore};
