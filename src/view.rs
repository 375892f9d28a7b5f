//! Front-end data flow: fetch from a [`RosterService`], turn failures into an
//! empty list plus a notice, narrow by search text, render as text.

use std::fmt::Write as _;

use tracing::{instrument, warn};

use crate::client::RosterService;
use crate::model::{Classroom, Student};

pub const CLASSES_FAILED: &str = "Failed to load classes from API";
pub const STUDENTS_FAILED: &str = "Failed to load students from API";

/// Result of a load: the items to show and, when the fetch failed, what to tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded<T> {
    pub items: Vec<T>,
    pub notice: Option<&'static str>,
}

impl<T> Loaded<T> {
    fn ok(items: Vec<T>) -> Self {
        Self {
            items,
            notice: None,
        }
    }

    fn failed(notice: &'static str) -> Self {
        Self {
            items: Vec::new(),
            notice: Some(notice),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[instrument(skip_all)]
pub async fn load_classes(api: &dyn RosterService) -> Loaded<Classroom> {
    match api.fetch_classes().await {
        Ok(classes) => Loaded::ok(classes),
        Err(err) => {
            warn!(?err, "error fetching classes");
            Loaded::failed(CLASSES_FAILED)
        }
    }
}

#[instrument(skip_all)]
pub async fn load_students(api: &dyn RosterService) -> Loaded<Student> {
    match api.fetch_students().await {
        Ok(students) => Loaded::ok(students),
        Err(err) => {
            warn!(?err, "error fetching students");
            Loaded::failed(STUDENTS_FAILED)
        }
    }
}

/// Both lists, fetched concurrently.
pub async fn load_overview(api: &dyn RosterService) -> (Loaded<Classroom>, Loaded<Student>) {
    futures::join!(load_classes(api), load_students(api))
}

/// Status line shown after probing `/health`.
pub async fn connection_status(api: &dyn RosterService) -> &'static str {
    if api.ping().await {
        "Connected to API"
    } else {
        "API Connection Failed"
    }
}

/// Keep students whose name contains `query` (ignoring case) or whose id or
/// classroom id, written in decimal, contains it. A blank query keeps everyone;
/// any other query is matched as typed, surrounding whitespace included.
pub fn filter_students<'a>(students: &'a [Student], query: &str) -> Vec<&'a Student> {
    if query.trim().is_empty() {
        return students.iter().collect();
    }
    let needle = query.to_lowercase();
    students
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle)
                || s.id.to_string().contains(query)
                || s.classroom_id.to_string().contains(query)
        })
        .collect()
}

pub fn render_classes(classes: &[Classroom]) -> String {
    if classes.is_empty() {
        return "No classes.\n".to_string();
    }
    let mut out = String::new();
    for class in classes {
        let _ = writeln!(
            out,
            "{:>4}  {}  ({} students)",
            class.id,
            class.name,
            class.students.len()
        );
        for s in &class.students {
            let _ = writeln!(out, "      {:>4}  {}", s.id, s.name);
        }
    }
    out
}

pub fn render_students<'a>(students: impl IntoIterator<Item = &'a Student>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>4}  {:<20}  {:>5}", "ID", "NAME", "CLASS");
    let mut any = false;
    for s in students {
        any = true;
        let _ = writeln!(out, "{:>4}  {:<20}  {:>5}", s.id, s.name, s.classroom_id);
    }
    if !any {
        out.push_str("No students.\n");
    }
    out
}
