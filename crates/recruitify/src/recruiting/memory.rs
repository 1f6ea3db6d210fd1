use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::domain::{
    Application, ApplicationId, Candidate, CandidateId, Job, JobId, NewApplication, NewCandidate,
    NewJob, NewUser, User, UserId,
};
use super::repository::{
    ApplicationRepository, CandidateRepository, JobRepository, StoreError, UserRepository,
};

/// Process-local store. All tables share one lock so cross-table checks
/// (reference existence, email uniqueness) happen atomically with the write.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    jobs: Vec<Job>,
    candidates: Vec<Candidate>,
    applications: Vec<Application>,
    users: Vec<User>,
    next_job: i64,
    next_candidate: i64,
    next_application: i64,
    next_user: i64,
}

impl Tables {
    /// Caller has already checked the email is free.
    fn push_candidate(&mut self, candidate: NewCandidate) -> Candidate {
        let id = CandidateId(next_id(&mut self.next_candidate));
        let record = Candidate {
            id,
            name: candidate.name,
            email: candidate.email,
            resume: candidate.resume,
            created_at: candidate.created_at,
        };
        self.candidates.push(record.clone());
        record
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Rows are appended in id order, so reversing gives id-descending order and
/// the stable sort keeps it for equal timestamps.
fn newest_first<T: Clone>(rows: &[T], created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().rev().cloned().collect();
    out.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    out
}

impl InMemoryStore {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

impl JobRepository for InMemoryStore {
    fn insert_job(&self, job: NewJob) -> Result<Job, StoreError> {
        let mut tables = self.lock()?;
        let id = JobId(next_id(&mut tables.next_job));
        let record = Job {
            id,
            title: job.title,
            description: job.description,
            location: job.location,
            created_at: job.created_at,
        };
        tables.jobs.push(record.clone());
        Ok(record)
    }

    fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let tables = self.lock()?;
        Ok(newest_first(&tables.jobs, |job| job.created_at))
    }

    fn fetch_job(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.jobs.iter().find(|job| job.id == id).cloned())
    }

    fn delete_job(&self, id: JobId) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        let before = tables.jobs.len();
        tables.jobs.retain(|job| job.id != id);
        if tables.jobs.len() == before {
            return Ok(false);
        }
        tables.applications.retain(|application| application.job_id != id);
        Ok(true)
    }
}

impl CandidateRepository for InMemoryStore {
    fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate, StoreError> {
        let mut tables = self.lock()?;
        if tables
            .candidates
            .iter()
            .any(|existing| existing.email == candidate.email)
        {
            return Err(StoreError::Conflict("candidate"));
        }
        Ok(tables.push_candidate(candidate))
    }

    fn list_candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        let tables = self.lock()?;
        Ok(newest_first(&tables.candidates, |candidate| {
            candidate.created_at
        }))
    }
}

impl ApplicationRepository for InMemoryStore {
    fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<(Application, Candidate), StoreError> {
        let mut tables = self.lock()?;
        if !tables.jobs.iter().any(|job| job.id == application.job_id) {
            return Err(StoreError::NotFound("job"));
        }
        let existing = tables
            .candidates
            .iter()
            .find(|candidate| candidate.email == application.applicant.email)
            .cloned();
        let candidate = match existing {
            Some(candidate) => candidate,
            None => tables.push_candidate(application.applicant),
        };
        let id = ApplicationId(next_id(&mut tables.next_application));
        let record = Application {
            id,
            job_id: application.job_id,
            candidate_id: candidate.id,
            cover_letter: application.cover_letter,
            created_at: application.created_at,
        };
        tables.applications.push(record.clone());
        Ok((record, candidate))
    }

    fn list_applications(&self) -> Result<Vec<Application>, StoreError> {
        let tables = self.lock()?;
        Ok(newest_first(&tables.applications, |application| {
            application.created_at
        }))
    }
}

impl UserRepository for InMemoryStore {
    fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.lock()?;
        if tables.users.iter().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict("user"));
        }
        let id = UserId(next_id(&mut tables.next_user));
        let record = User {
            id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        };
        tables.users.push(record.clone());
        Ok(record)
    }

    fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let tables = self.lock()?;
        Ok(newest_first(&tables.users, |user| user.created_at))
    }

    fn fetch_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.users.iter().find(|user| user.id == id).cloned())
    }

    fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        let before = tables.users.len();
        tables.users.retain(|user| user.id != id);
        Ok(tables.users.len() != before)
    }
}
