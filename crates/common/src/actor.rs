//! External collaborator types.
//!
//! Identity is supplied by the surrounding platform and trusted as input:
//! the subsystem never re-derives who a participant is or whether they are
//! a platform admin. Course enrollment answers are likewise delegated to
//! the platform's enrollment directory.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AppResult;

/// An authenticated participant, as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Participant ID.
    pub id: String,
    /// Display name.
    pub display_name: String,
    /// Whether this participant is a platform admin.
    pub is_admin: bool,
}

impl Actor {
    /// Create a new actor.
    #[must_use]
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, is_admin: bool) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            is_admin,
        }
    }
}

/// Course/enrollment directory collaborator.
///
/// Answers "is participant X enrolled in course Y", used for visibility
/// filtering of rooms and recordings.
#[async_trait]
pub trait CourseDirectory: Send + Sync {
    /// Whether the participant is enrolled in the course.
    async fn is_enrolled(&self, participant_id: &str, course_id: &str) -> AppResult<bool>;

    /// Course IDs the participant is enrolled in.
    async fn enrolled_courses(&self, participant_id: &str) -> AppResult<Vec<String>>;
}

/// In-memory course directory for tests and single-process development.
#[derive(Debug, Clone, Default)]
pub struct StaticCourseDirectory {
    enrollments: Arc<HashMap<String, HashSet<String>>>,
}

impl StaticCourseDirectory {
    /// Create a directory from (participant, courses) pairs.
    #[must_use]
    pub fn new(pairs: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        let enrollments = pairs
            .into_iter()
            .map(|(participant, courses)| (participant, courses.into_iter().collect()))
            .collect();
        Self {
            enrollments: Arc::new(enrollments),
        }
    }

    /// An empty directory (no participant is enrolled anywhere).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseDirectory for StaticCourseDirectory {
    async fn is_enrolled(&self, participant_id: &str, course_id: &str) -> AppResult<bool> {
        Ok(self
            .enrollments
            .get(participant_id)
            .is_some_and(|courses| courses.contains(course_id)))
    }

    async fn enrolled_courses(&self, participant_id: &str) -> AppResult<Vec<String>> {
        Ok(self
            .enrollments
            .get(participant_id)
            .map(|courses| {
                let mut list: Vec<String> = courses.iter().cloned().collect();
                list.sort();
                list
            })
            .unwrap_or_default())
    }
}
