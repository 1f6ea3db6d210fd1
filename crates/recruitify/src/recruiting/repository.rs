use super::domain::{
    Application, Candidate, Job, JobId, NewApplication, NewCandidate, NewJob, NewUser, User,
    UserId,
};

/// Storage for posted jobs.
///
/// Deleting a job also deletes the applications that reference it.
pub trait JobRepository: Send + Sync {
    fn insert_job(&self, job: NewJob) -> Result<Job, StoreError>;
    /// All jobs, newest first (ties broken by id, highest first).
    fn list_jobs(&self) -> Result<Vec<Job>, StoreError>;
    fn fetch_job(&self, id: JobId) -> Result<Option<Job>, StoreError>;
    /// Returns `false` when no job had that id.
    fn delete_job(&self, id: JobId) -> Result<bool, StoreError>;
}

/// Storage for candidates. Email uniqueness is enforced by the insert itself.
pub trait CandidateRepository: Send + Sync {
    fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate, StoreError>;
    fn list_candidates(&self) -> Result<Vec<Candidate>, StoreError>;
}

pub trait ApplicationRepository: Send + Sync {
    /// Check the job, resolve (or register) the candidate by email and insert
    /// the application as one atomic operation. Returns the application and
    /// the candidate it is linked to.
    ///
    /// Fails with [`StoreError::NotFound`] if the job is missing, in which
    /// case nothing is written.
    fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<(Application, Candidate), StoreError>;
    fn list_applications(&self) -> Result<Vec<Application>, StoreError>;
}

/// Storage for user accounts. Email uniqueness is enforced by the insert itself.
pub trait UserRepository: Send + Sync {
    fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
    fn list_users(&self) -> Result<Vec<User>, StoreError>;
    fn fetch_user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    fn delete_user(&self, id: UserId) -> Result<bool, StoreError>;
}

/// Everything the recruiting service needs from a persistence backend.
pub trait RecruitingStore:
    JobRepository + CandidateRepository + ApplicationRepository + UserRepository
{
}

impl<T> RecruitingStore for T where
    T: JobRepository + CandidateRepository + ApplicationRepository + UserRepository
{
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the insert. Carries the entity name.
    #[error("{0} already exists")]
    Conflict(&'static str),
    /// A referenced row is missing. Carries the entity name.
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
