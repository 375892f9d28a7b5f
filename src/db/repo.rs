use super::model::ClassroomRow;
use super::StoreError;
use crate::model::{Classroom, Student};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info, instrument};

pub type Pool = SqlitePool;

/// Schema and seed rows, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Pool sizing knobs taken from the `database` config section.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Build a lazily-connecting pool. Nothing touches the store until the first
/// query, so a dead backend does not stop the process from starting.
pub fn init_pool(database_url: &str, settings: PoolSettings) -> Result<Pool, StoreError> {
    let normalized = prepare_sqlite_url(database_url);
    let mut options = SqliteConnectOptions::from_str(&normalized)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if is_in_memory(&normalized) {
        // Every connection to an in-memory database is its own database; keep one alive.
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        options = options.journal_mode(SqliteJournalMode::Wal);
        SqlitePoolOptions::new().max_connections(settings.max_connections)
    };

    Ok(pool_options
        .acquire_timeout(settings.acquire_timeout)
        .connect_lazy_with(options))
}

fn is_in_memory(url: &str) -> bool {
    url.starts_with("sqlite::memory") || url.contains("mode=memory")
}

/// If using a file-backed SQLite URL, expand a leading `~/` and ensure the parent
/// directory exists. Leaves in-memory URLs untouched. Returns possibly-updated URL.
fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || is_in_memory(url) {
        return url.to_string();
    }

    let rest = &url["sqlite:".len()..];
    let path_with_query = rest.strip_prefix("//").unwrap_or(rest);

    let (path_part, query_part) = match path_with_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_with_query, None),
    };

    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded_path = match (path_part.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path_part.to_string(),
    };

    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let mut rebuilt = String::from("sqlite://");
    rebuilt.push_str(&expanded_path);
    if let Some(q) = query_part {
        rebuilt.push('?');
        rebuilt.push_str(q);
    }
    rebuilt
}

/// Create the schema and insert the seed rows. The migrator records what it
/// has applied, so calling this on every start is a no-op after the first.
#[instrument(skip_all)]
pub async fn initialize(pool: &Pool) -> Result<(), StoreError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Startup wrapper around [`initialize`]: logs the outcome and never fails.
/// Returns whether the schema is ready.
pub async fn initialize_or_log(pool: &Pool) -> bool {
    match initialize(pool).await {
        Ok(()) => {
            info!("database migrations applied successfully");
            true
        }
        Err(err) => {
            error!(?err, "an error occurred while migrating the database; continuing degraded");
            false
        }
    }
}

/// All classrooms in id order, each carrying its students in id order.
#[instrument(skip_all)]
pub async fn list_classrooms_with_students(pool: &Pool) -> Result<Vec<Classroom>, StoreError> {
    // One read transaction so both queries see the same snapshot.
    let mut tx = pool.begin().await?;
    let rows: Vec<ClassroomRow> = sqlx::query_as("SELECT id, name FROM classrooms ORDER BY id")
        .fetch_all(&mut *tx)
        .await?;
    let students: Vec<Student> =
        sqlx::query_as("SELECT id, name, classroom_id FROM students ORDER BY id")
            .fetch_all(&mut *tx)
            .await?;
    tx.commit().await?;

    let mut by_classroom: HashMap<i64, Vec<Student>> = HashMap::new();
    for student in students {
        by_classroom
            .entry(student.classroom_id)
            .or_default()
            .push(student);
    }

    Ok(rows
        .into_iter()
        .map(|row| Classroom {
            students: by_classroom.remove(&row.id).unwrap_or_default(),
            id: row.id,
            name: row.name,
        })
        .collect())
}

/// All students as a flat list in id order.
#[instrument(skip_all)]
pub async fn list_students(pool: &Pool) -> Result<Vec<Student>, StoreError> {
    let students = sqlx::query_as("SELECT id, name, classroom_id FROM students ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(students)
}
