//! Read-only domain records for the tutoring-school data model.
//!
//! These records are fetched from the external persistence collaborator
//! and never mutated by the dialog engine. A `Lecture` belongs to exactly
//! one `Course`; a `Homework` belongs to exactly one `Lecture` and carries
//! exactly one `Exercise`; a `Grade` links one `Exercise` to one student.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

macro_rules! numeric_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a course a student is enrolled in.
    CourseId
);
numeric_id!(
    /// Identifier of one scheduled lecture of a course.
    LectureId
);
numeric_id!(
    /// Identifier of a homework assignment attached to a lecture.
    HomeworkId
);
numeric_id!(
    /// Identifier of the exercise a homework assignment refers to.
    ExerciseId
);

/// Identifies one student across conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub Uuid);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one ongoing chat session with one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub Uuid);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A course offered by the school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
}

/// One scheduled lecture of a course.
///
/// `start` is local time in the domain reference timezone (Greece).
/// `homework_count` is computed by the repository with a COUNT query,
/// never by materializing the homework rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lecture {
    pub id: LectureId,
    pub course_id: CourseId,
    pub start: NaiveDateTime,
    pub homework_count: u32,
}

/// A homework assignment given for a lecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Homework {
    pub id: HomeworkId,
    pub lecture_id: LectureId,
    pub exercise: Exercise,
}

/// The exercise a homework assignment refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    pub name: String,
    pub book: String,
    pub page: u32,
    pub notes: Option<String>,
}

/// A grade a student received for an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub exercise_id: ExerciseId,
    pub value: f64,
}
