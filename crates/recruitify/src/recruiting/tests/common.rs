use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;

use crate::recruiting::domain::{
    Application, ApplyRequest, Candidate, CreateJobRequest, Job, JobId,
    NewApplication, NewCandidate, NewJob, NewUser, User, UserId,
};
use crate::recruiting::repository::{
    ApplicationRepository, CandidateRepository, JobRepository, StoreError, UserRepository,
};
use crate::recruiting::{recruiting_router, InMemoryStore, RecruitingService};

pub(super) fn build_service() -> (RecruitingService<InMemoryStore>, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::default());
    (RecruitingService::new(store.clone()), store)
}

pub(super) fn router() -> (axum::Router, Arc<InMemoryStore>) {
    let (service, store) = build_service();
    (recruiting_router(Arc::new(service)), store)
}

pub(super) fn backend_job() -> CreateJobRequest {
    CreateJobRequest {
        title: Some("Backend Engineer".to_string()),
        description: Some("Work on APIs and data.".to_string()),
        location: Some("Remote".to_string()),
    }
}

pub(super) fn application_for(job_id: JobId, email: &str) -> ApplyRequest {
    ApplyRequest {
        name: Some("Ada".to_string()),
        email: Some(email.to_string()),
        job_id: Some(job_id),
        cover_letter: Some("I would love to build your APIs.".to_string()),
        resume: Some("https://example.com/ada.pdf".to_string()),
    }
}

pub(super) fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serializable body")))
        .expect("request builds")
}

pub(super) fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose every call fails, to exercise the 500 path.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("database offline".to_string()))
}

impl JobRepository for UnavailableStore {
    fn insert_job(&self, _job: NewJob) -> Result<Job, StoreError> {
        offline()
    }

    fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        offline()
    }

    fn fetch_job(&self, _id: JobId) -> Result<Option<Job>, StoreError> {
        offline()
    }

    fn delete_job(&self, _id: JobId) -> Result<bool, StoreError> {
        offline()
    }
}

impl CandidateRepository for UnavailableStore {
    fn insert_candidate(&self, _candidate: NewCandidate) -> Result<Candidate, StoreError> {
        offline()
    }

    fn list_candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        offline()
    }
}

impl ApplicationRepository for UnavailableStore {
    fn insert_application(
        &self,
        _application: NewApplication,
    ) -> Result<(Application, Candidate), StoreError> {
        offline()
    }

    fn list_applications(&self) -> Result<Vec<Application>, StoreError> {
        offline()
    }
}

impl UserRepository for UnavailableStore {
    fn insert_user(&self, _user: NewUser) -> Result<User, StoreError> {
        offline()
    }

    fn list_users(&self) -> Result<Vec<User>, StoreError> {
        offline()
    }

    fn fetch_user(&self, _id: UserId) -> Result<Option<User>, StoreError> {
        offline()
    }

    fn delete_user(&self, _id: UserId) -> Result<bool, StoreError> {
        offline()
    }
}

/// Wraps the in-memory store and deletes each job right after it is fetched,
/// as if another request removed it while an application was in flight.
#[derive(Default)]
pub(super) struct VanishingJobStore {
    pub(super) inner: InMemoryStore,
}

impl JobRepository for VanishingJobStore {
    fn insert_job(&self, job: NewJob) -> Result<Job, StoreError> {
        self.inner.insert_job(job)
    }

    fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        self.inner.list_jobs()
    }

    fn fetch_job(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        let job = self.inner.fetch_job(id)?;
        self.inner.delete_job(id)?;
        Ok(job)
    }

    fn delete_job(&self, id: JobId) -> Result<bool, StoreError> {
        self.inner.delete_job(id)
    }
}

impl CandidateRepository for VanishingJobStore {
    fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate, StoreError> {
        self.inner.insert_candidate(candidate)
    }

    fn list_candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        self.inner.list_candidates()
    }
}

impl ApplicationRepository for VanishingJobStore {
    fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<(Application, Candidate), StoreError> {
        self.inner.insert_application(application)
    }

    fn list_applications(&self) -> Result<Vec<Application>, StoreError> {
        self.inner.list_applications()
    }
}

impl UserRepository for VanishingJobStore {
    fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.inner.insert_user(user)
    }

    fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.inner.list_users()
    }

    fn fetch_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.inner.fetch_user(id)
    }

    fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        self.inner.delete_user(id)
    }
}
