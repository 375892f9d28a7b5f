//! Row shapes read by the repository.
//!
//! Students come back as `crate::model::Student` directly; classrooms are read
//! bare and get their students attached in memory.

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClassroomRow {
    pub id: i64,
    pub name: String,
}
