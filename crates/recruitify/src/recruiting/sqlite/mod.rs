//! SQLite-backed store.
//!
//! A single rusqlite connection sits behind a `Mutex`; every operation holds
//! the lock for its full read-check-write sequence. Foreign keys are enabled
//! so deleting a job cascades to its applications.

mod migrations;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::domain::{
    Application, ApplicationId, Candidate, CandidateId, Job, JobId, NewApplication, NewCandidate,
    NewJob, NewUser, User, UserId,
};
use super::repository::{
    ApplicationRepository, CandidateRepository, JobRepository, StoreError, UserRepository,
};

/// Errors from the SQLite layer.
#[derive(thiserror::Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Migration failed at version {version}: {reason}")]
    Migration { version: u32, reason: String },

    #[error("Database lock poisoned")]
    LockPoisoned,
}

impl DatabaseError {
    fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }
}

impl From<DatabaseError> for StoreError {
    fn from(value: DatabaseError) -> Self {
        StoreError::Unavailable(value.to_string())
    }
}

/// Thread-safe handle; clones share the connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database file and applies pending migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        migrations::run_all(&conn)?;

        tracing::info!(path = %path.display(), "sqlite store opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::run_all(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&conn)
    }
}

/// Fixed-width UTC text so that lexical order in SQL matches time order.
fn encode_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(row: &Row<'_>, column: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    let raw: String = row.get(column)?;
    let index = row.as_ref().column_index(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err)))
}

/// The value as it will read back from the table, so returned records match
/// later fetches exactly.
fn stored_timestamp(value: DateTime<Utc>) -> (String, DateTime<Utc>) {
    let encoded = encode_timestamp(value);
    let normalized = DateTime::parse_from_rfc3339(&encoded)
        .map(|parsed| parsed.with_timezone(&Utc))
        .unwrap_or(value);
    (encoded, normalized)
}

fn job_from_row(row: &Row<'_>) -> Result<Job, rusqlite::Error> {
    Ok(Job {
        id: JobId(row.get("id")?),
        title: row.get("title")?,
        description: row.get("description")?,
        location: row.get("location")?,
        created_at: decode_timestamp(row, "created_at")?,
    })
}

fn candidate_from_row(row: &Row<'_>) -> Result<Candidate, rusqlite::Error> {
    Ok(Candidate {
        id: CandidateId(row.get("id")?),
        name: row.get("name")?,
        email: row.get("email")?,
        resume: row.get("resume")?,
        created_at: decode_timestamp(row, "created_at")?,
    })
}

fn application_from_row(row: &Row<'_>) -> Result<Application, rusqlite::Error> {
    Ok(Application {
        id: ApplicationId(row.get("id")?),
        job_id: JobId(row.get("job_id")?),
        candidate_id: CandidateId(row.get("candidate_id")?),
        cover_letter: row.get("cover_letter")?,
        created_at: decode_timestamp(row, "created_at")?,
    })
}

fn user_from_row(row: &Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: UserId(row.get("id")?),
        username: row.get("username")?,
        email: row.get("email")?,
        role: row.get("role")?,
        created_at: decode_timestamp(row, "created_at")?,
    })
}

fn insert_error(err: DatabaseError, entity: &'static str) -> StoreError {
    if err.is_unique_violation() {
        StoreError::Conflict(entity)
    } else {
        err.into()
    }
}

fn row_exists(conn: &Connection, sql: &str, id: i64) -> Result<bool, DatabaseError> {
    let found: Option<i64> = conn
        .query_row(sql, params![id], |r| r.get(0))
        .optional()?;
    Ok(found.is_some())
}

impl JobRepository for SqliteStore {
    fn insert_job(&self, job: NewJob) -> Result<Job, StoreError> {
        let (encoded, created_at) = stored_timestamp(job.created_at);
        let id = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO job (title, description, location, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![job.title, job.description, job.location, encoded],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        Ok(Job {
            id: JobId(id),
            title: job.title,
            description: job.description,
            location: job.location,
            created_at,
        })
    }

    fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let jobs = self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM job ORDER BY created_at DESC, id DESC")?;
            let rows = stmt
                .query_map([], job_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;
        Ok(jobs)
    }

    fn fetch_job(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        let job = self.with_conn(|conn| {
            let job = conn
                .query_row("SELECT * FROM job WHERE id = ?1", params![id.0], job_from_row)
                .optional()?;
            Ok(job)
        })?;
        Ok(job)
    }

    fn delete_job(&self, id: JobId) -> Result<bool, StoreError> {
        let deleted = self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM job WHERE id = ?1", params![id.0])?;
            Ok(affected > 0)
        })?;
        Ok(deleted)
    }
}

impl CandidateRepository for SqliteStore {
    fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate, StoreError> {
        let (encoded, created_at) = stored_timestamp(candidate.created_at);
        let id = self
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO candidate (name, email, resume, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![candidate.name, candidate.email, candidate.resume, encoded],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .map_err(|err| insert_error(err, "candidate"))?;

        Ok(Candidate {
            id: CandidateId(id),
            name: candidate.name,
            email: candidate.email,
            resume: candidate.resume,
            created_at,
        })
    }

    fn list_candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        let candidates = self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM candidate ORDER BY created_at DESC, id DESC")?;
            let rows = stmt
                .query_map([], candidate_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;
        Ok(candidates)
    }
}

impl ApplicationRepository for SqliteStore {
    /// Runs in one transaction; returning before `commit` rolls back any
    /// candidate row written for this application.
    fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<(Application, Candidate), StoreError> {
        let (encoded, created_at) = stored_timestamp(application.created_at);
        let (applicant_encoded, applicant_created_at) =
            stored_timestamp(application.applicant.created_at);
        let inserted = self
            .with_conn(|conn| {
                let tx = conn.unchecked_transaction()?;
                if !row_exists(&tx, "SELECT id FROM job WHERE id = ?1", application.job_id.0)? {
                    return Ok(None);
                }
                let existing = tx
                    .query_row(
                        "SELECT * FROM candidate WHERE email = ?1",
                        params![application.applicant.email],
                        candidate_from_row,
                    )
                    .optional()?;
                let candidate = match existing {
                    Some(candidate) => candidate,
                    None => {
                        let applicant = &application.applicant;
                        tx.execute(
                            "INSERT INTO candidate (name, email, resume, created_at)
                             VALUES (?1, ?2, ?3, ?4)",
                            params![
                                applicant.name,
                                applicant.email,
                                applicant.resume,
                                applicant_encoded
                            ],
                        )?;
                        Candidate {
                            id: CandidateId(tx.last_insert_rowid()),
                            name: applicant.name.clone(),
                            email: applicant.email.clone(),
                            resume: applicant.resume.clone(),
                            created_at: applicant_created_at,
                        }
                    }
                };
                tx.execute(
                    "INSERT INTO application (job_id, candidate_id, cover_letter, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        application.job_id.0,
                        candidate.id.0,
                        application.cover_letter,
                        encoded
                    ],
                )?;
                let id = tx.last_insert_rowid();
                tx.commit()?;
                Ok(Some((id, candidate)))
            })
            .map_err(|err| insert_error(err, "candidate"))?;

        let (id, candidate) = inserted.ok_or(StoreError::NotFound("job"))?;
        let record = Application {
            id: ApplicationId(id),
            job_id: application.job_id,
            candidate_id: candidate.id,
            cover_letter: application.cover_letter,
            created_at,
        };
        Ok((record, candidate))
    }

    fn list_applications(&self) -> Result<Vec<Application>, StoreError> {
        let applications = self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM application ORDER BY created_at DESC, id DESC")?;
            let rows = stmt
                .query_map([], application_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;
        Ok(applications)
    }
}

impl UserRepository for SqliteStore {
    fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let (encoded, created_at) = stored_timestamp(user.created_at);
        let id = self
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO \"user\" (username, email, role, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![user.username, user.email, user.role, encoded],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .map_err(|err| insert_error(err, "user"))?;

        Ok(User {
            id: UserId(id),
            username: user.username,
            email: user.email,
            role: user.role,
            created_at,
        })
    }

    fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM \"user\" ORDER BY created_at DESC, id DESC")?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;
        Ok(users)
    }

    fn fetch_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let user = self.with_conn(|conn| {
            let user = conn
                .query_row(
                    "SELECT * FROM \"user\" WHERE id = ?1",
                    params![id.0],
                    user_from_row,
                )
                .optional()?;
            Ok(user)
        })?;
        Ok(user)
    }

    fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        let deleted = self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM \"user\" WHERE id = ?1", params![id.0])?;
            Ok(affected > 0)
        })?;
        Ok(deleted)
    }
}
