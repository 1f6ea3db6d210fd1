use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{
    ApplicationView, ApplyRequest, Candidate, CreateCandidateRequest, CreateJobRequest,
    CreateUserRequest, Job, JobId, User, UserId,
};
use super::repository::{RecruitingStore, StoreError};
use super::service::{RecruitingError, RecruitingService};

type Shared<S> = State<Arc<RecruitingService<S>>>;
type Outcome<T> = Result<(StatusCode, Json<T>), RecruitingError>;

/// Router builder exposing the job, candidate, application and user endpoints.
pub fn recruiting_router<S>(service: Arc<RecruitingService<S>>) -> Router
where
    S: RecruitingStore + 'static,
{
    Router::new()
        .route(
            "/api/jobs",
            get(list_jobs_handler::<S>).post(create_job_handler::<S>),
        )
        .route(
            "/api/jobs/:job_id",
            get(get_job_handler::<S>).delete(delete_job_handler::<S>),
        )
        .route(
            "/api/candidates",
            get(list_candidates_handler::<S>).post(create_candidate_handler::<S>),
        )
        .route("/api/apply", post(apply_handler::<S>))
        .route("/api/applications", get(list_applications_handler::<S>))
        .route(
            "/api/users",
            get(list_users_handler::<S>).post(create_user_handler::<S>),
        )
        .route(
            "/api/users/:user_id",
            get(get_user_handler::<S>).delete(delete_user_handler::<S>),
        )
        .with_state(service)
}

impl IntoResponse for RecruitingError {
    fn into_response(self) -> Response {
        let status = match &self {
            RecruitingError::Validation(_) => StatusCode::BAD_REQUEST,
            RecruitingError::Conflict(_) => StatusCode::CONFLICT,
            RecruitingError::NotFound(_) => StatusCode::NOT_FOUND,
            RecruitingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match self {
            RecruitingError::Store(err) => {
                tracing::error!(error = %err, "store operation failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RecruitingError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| RecruitingError::Validation(rejection.body_text()))
}

fn path_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, RecruitingError> {
    id.map(|Path(value)| value)
        .map_err(|rejection| RecruitingError::Validation(rejection.body_text()))
}

/// Store calls are synchronous, so every service operation runs on the
/// blocking pool.
pub(crate) async fn blocking<S, T, F>(
    service: Arc<RecruitingService<S>>,
    op: F,
) -> Result<T, RecruitingError>
where
    S: RecruitingStore + 'static,
    T: Send + 'static,
    F: FnOnce(&RecruitingService<S>) -> Result<T, RecruitingError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&service))
        .await
        .map_err(|err| {
            RecruitingError::Store(StoreError::Unavailable(format!("store task failed: {err}")))
        })?
}

fn deleted(detail: &str) -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "detail": detail })))
}

pub(crate) async fn list_jobs_handler<S>(State(service): Shared<S>) -> Outcome<Vec<Job>>
where
    S: RecruitingStore + 'static,
{
    let jobs = blocking(service, |service| service.list_jobs()).await?;
    Ok((StatusCode::OK, Json(jobs)))
}

pub(crate) async fn create_job_handler<S>(
    State(service): Shared<S>,
    payload: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Outcome<Job>
where
    S: RecruitingStore + 'static,
{
    let request = body(payload)?;
    let job = blocking(service, move |service| service.create_job(request)).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

pub(crate) async fn get_job_handler<S>(
    State(service): Shared<S>,
    id: Result<Path<i64>, PathRejection>,
) -> Outcome<Job>
where
    S: RecruitingStore + 'static,
{
    let id = JobId(path_id(id)?);
    let job = blocking(service, move |service| service.get_job(id)).await?;
    Ok((StatusCode::OK, Json(job)))
}

pub(crate) async fn delete_job_handler<S>(
    State(service): Shared<S>,
    id: Result<Path<i64>, PathRejection>,
) -> Outcome<serde_json::Value>
where
    S: RecruitingStore + 'static,
{
    let id = JobId(path_id(id)?);
    blocking(service, move |service| service.delete_job(id)).await?;
    Ok(deleted("Job deleted"))
}

pub(crate) async fn list_candidates_handler<S>(
    State(service): Shared<S>,
) -> Outcome<Vec<Candidate>>
where
    S: RecruitingStore + 'static,
{
    let candidates = blocking(service, |service| service.list_candidates()).await?;
    Ok((StatusCode::OK, Json(candidates)))
}

pub(crate) async fn create_candidate_handler<S>(
    State(service): Shared<S>,
    payload: Result<Json<CreateCandidateRequest>, JsonRejection>,
) -> Outcome<Candidate>
where
    S: RecruitingStore + 'static,
{
    let request = body(payload)?;
    let candidate = blocking(service, move |service| service.create_candidate(request)).await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

pub(crate) async fn apply_handler<S>(
    State(service): Shared<S>,
    payload: Result<Json<ApplyRequest>, JsonRejection>,
) -> Outcome<ApplicationView>
where
    S: RecruitingStore + 'static,
{
    let request = body(payload)?;
    let view = blocking(service, move |service| service.apply(request)).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub(crate) async fn list_applications_handler<S>(
    State(service): Shared<S>,
) -> Outcome<Vec<ApplicationView>>
where
    S: RecruitingStore + 'static,
{
    let views = blocking(service, |service| service.list_applications()).await?;
    Ok((StatusCode::OK, Json(views)))
}

pub(crate) async fn list_users_handler<S>(State(service): Shared<S>) -> Outcome<Vec<User>>
where
    S: RecruitingStore + 'static,
{
    let users = blocking(service, |service| service.list_users()).await?;
    Ok((StatusCode::OK, Json(users)))
}

pub(crate) async fn create_user_handler<S>(
    State(service): Shared<S>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Outcome<User>
where
    S: RecruitingStore + 'static,
{
    let request = body(payload)?;
    let user = blocking(service, move |service| service.create_user(request)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub(crate) async fn get_user_handler<S>(
    State(service): Shared<S>,
    id: Result<Path<i64>, PathRejection>,
) -> Outcome<User>
where
    S: RecruitingStore + 'static,
{
    let id = UserId(path_id(id)?);
    let user = blocking(service, move |service| service.get_user(id)).await?;
    Ok((StatusCode::OK, Json(user)))
}

pub(crate) async fn delete_user_handler<S>(
    State(service): Shared<S>,
    id: Result<Path<i64>, PathRejection>,
) -> Outcome<serde_json::Value>
where
    S: RecruitingStore + 'static,
{
    let id = UserId(path_id(id)?);
    blocking(service, move |service| service.delete_user(id)).await?;
    Ok(deleted("User deleted"))
}
