//! Read-only queries against the course/lecture/homework/grade data.
//!
//! The dialog steps only ever read; all mutation belongs to the school
//! platform outside this engine. Implementations live in frontis-infra
//! (e.g. `SqliteDomainRepository`).

use chrono::NaiveDate;
use frontis_types::domain::{
    Course, CourseId, ExerciseId, Grade, Homework, Lecture, LectureId, StudentId,
};
use frontis_types::error::RepositoryError;

/// Repository trait for the read-only domain queries the flows need.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait DomainRepository: Send + Sync {
    /// Courses the student is enrolled in.
    fn courses_for_student(
        &self,
        student: StudentId,
    ) -> impl std::future::Future<Output = Result<Vec<Course>, RepositoryError>> + Send;

    /// Lectures of a course that have at least one homework item,
    /// ordered by start time ascending, with `homework_count` filled in
    /// by a COUNT query.
    fn lectures_with_homework(
        &self,
        course: CourseId,
    ) -> impl std::future::Future<Output = Result<Vec<Lecture>, RepositoryError>> + Send;

    /// One lecture by id.
    fn lecture(
        &self,
        lecture: LectureId,
    ) -> impl std::future::Future<Output = Result<Option<Lecture>, RepositoryError>> + Send;

    /// The lecture of a course on an exact calendar date, homework or
    /// not. Time of day is ignored.
    fn lecture_on_date(
        &self,
        course: CourseId,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Option<Lecture>, RepositoryError>> + Send;

    /// Homework items of a lecture in stable order.
    fn homework_for_lecture(
        &self,
        lecture: LectureId,
    ) -> impl std::future::Future<Output = Result<Vec<Homework>, RepositoryError>> + Send;

    /// Number of homework items for a lecture, without materializing the
    /// collection. Used for the page-remaining calculation.
    fn homework_count(
        &self,
        lecture: LectureId,
    ) -> impl std::future::Future<Output = Result<u32, RepositoryError>> + Send;

    /// The student's grade for an exercise, if one has been recorded.
    fn grade_for(
        &self,
        student: StudentId,
        exercise: ExerciseId,
    ) -> impl std::future::Future<Output = Result<Option<Grade>, RepositoryError>> + Send;
}
