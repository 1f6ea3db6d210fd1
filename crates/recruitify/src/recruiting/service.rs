use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{
    ApplicationView, ApplyRequest, Candidate, CreateCandidateRequest, CreateJobRequest,
    CreateUserRequest, Job, JobId, NewApplication, NewCandidate, NewJob, NewUser, User, UserId,
    DEFAULT_USER_ROLE,
};
use super::repository::{RecruitingStore, StoreError};

/// The entity service behind every `/api` route. Each operation validates,
/// runs its existence/uniqueness checks, then performs one store write.
pub struct RecruitingService<S> {
    store: Arc<S>,
}

/// Trim a required field, treating blank as absent.
fn required(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

impl<S> RecruitingService<S>
where
    S: RecruitingStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn list_jobs(&self) -> Result<Vec<Job>, RecruitingError> {
        Ok(self.store.list_jobs()?)
    }

    pub fn create_job(&self, request: CreateJobRequest) -> Result<Job, RecruitingError> {
        let title = required(request.title)
            .ok_or_else(|| RecruitingError::Validation("title is required".to_string()))?;

        let job = self.store.insert_job(NewJob {
            title,
            description: request.description,
            location: request.location,
            created_at: Utc::now(),
        })?;

        info!(job_id = %job.id, title = %job.title, "job posted");
        Ok(job)
    }

    pub fn get_job(&self, id: JobId) -> Result<Job, RecruitingError> {
        self.store
            .fetch_job(id)?
            .ok_or_else(|| RecruitingError::NotFound("job not found".to_string()))
    }

    /// Removes the job together with the applications submitted to it.
    pub fn delete_job(&self, id: JobId) -> Result<(), RecruitingError> {
        if !self.store.delete_job(id)? {
            return Err(RecruitingError::NotFound("job not found".to_string()));
        }
        info!(job_id = %id, "job deleted");
        Ok(())
    }

    pub fn list_candidates(&self) -> Result<Vec<Candidate>, RecruitingError> {
        Ok(self.store.list_candidates()?)
    }

    pub fn create_candidate(
        &self,
        request: CreateCandidateRequest,
    ) -> Result<Candidate, RecruitingError> {
        let (Some(name), Some(email)) = (required(request.name), required(request.email)) else {
            return Err(RecruitingError::Validation(
                "name and email are required".to_string(),
            ));
        };

        let candidate = self.store.insert_candidate(NewCandidate {
            name,
            email,
            resume: request.resume,
            created_at: Utc::now(),
        })?;

        info!(candidate_id = %candidate.id, "candidate registered");
        Ok(candidate)
    }

    /// Submit an application, registering the candidate on first contact.
    ///
    /// An existing candidate (matched by email) is reused as-is; the supplied
    /// name and resume only apply to newly created candidates. The store
    /// re-checks the job when it writes, so a job deleted mid-request still
    /// yields `NotFound` with no candidate left behind.
    pub fn apply(&self, request: ApplyRequest) -> Result<ApplicationView, RecruitingError> {
        let (Some(name), Some(email), Some(job_id)) = (
            required(request.name),
            required(request.email),
            request.job_id,
        ) else {
            return Err(RecruitingError::Validation(
                "name, email and job_id are required".to_string(),
            ));
        };

        let job = self
            .store
            .fetch_job(job_id)?
            .ok_or_else(|| RecruitingError::NotFound("job not found".to_string()))?;

        let (application, candidate) = self
            .store
            .insert_application(NewApplication {
                job_id: job.id,
                applicant: NewCandidate {
                    name,
                    email,
                    resume: request.resume,
                    created_at: Utc::now(),
                },
                cover_letter: request.cover_letter,
                created_at: Utc::now(),
            })
            .map_err(|err| match err {
                StoreError::NotFound(entity) => {
                    RecruitingError::NotFound(format!("{entity} not found"))
                }
                other => other.into(),
            })?;

        info!(
            application_id = %application.id,
            job_id = %job.id,
            candidate_id = %candidate.id,
            "application submitted"
        );
        Ok(ApplicationView::resolve(
            &application,
            Some(&job),
            Some(&candidate),
        ))
    }

    /// Applications newest first, each with its job and candidate resolved.
    pub fn list_applications(&self) -> Result<Vec<ApplicationView>, RecruitingError> {
        let applications = self.store.list_applications()?;
        if applications.is_empty() {
            return Ok(Vec::new());
        }

        let jobs: HashMap<_, _> = self
            .store
            .list_jobs()?
            .into_iter()
            .map(|job| (job.id, job))
            .collect();
        let candidates: HashMap<_, _> = self
            .store
            .list_candidates()?
            .into_iter()
            .map(|candidate| (candidate.id, candidate))
            .collect();

        Ok(applications
            .iter()
            .map(|application| {
                ApplicationView::resolve(
                    application,
                    jobs.get(&application.job_id),
                    candidates.get(&application.candidate_id),
                )
            })
            .collect())
    }

    pub fn list_users(&self) -> Result<Vec<User>, RecruitingError> {
        Ok(self.store.list_users()?)
    }

    pub fn create_user(&self, request: CreateUserRequest) -> Result<User, RecruitingError> {
        let (Some(username), Some(email)) = (required(request.username), required(request.email))
        else {
            return Err(RecruitingError::Validation(
                "username and email are required".to_string(),
            ));
        };
        let role = required(request.role).unwrap_or_else(|| DEFAULT_USER_ROLE.to_string());

        let user = self.store.insert_user(NewUser {
            username,
            email,
            role,
            created_at: Utc::now(),
        })?;

        info!(user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    pub fn get_user(&self, id: UserId) -> Result<User, RecruitingError> {
        self.store
            .fetch_user(id)?
            .ok_or_else(|| RecruitingError::NotFound("user not found".to_string()))
    }

    pub fn delete_user(&self, id: UserId) -> Result<(), RecruitingError> {
        if !self.store.delete_user(id)? {
            return Err(RecruitingError::NotFound("user not found".to_string()));
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

/// Error raised by the recruiting service.
#[derive(Debug, thiserror::Error)]
pub enum RecruitingError {
    /// A required field is missing or blank, or the request could not be decoded.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RecruitingError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(entity) => {
                RecruitingError::Conflict(format!("{entity} with this email already exists"))
            }
            other => RecruitingError::Store(other),
        }
    }
}
