//! SQLite domain repository.
//!
//! Read-only queries over the school data. Lecture start times are
//! stored as ISO-8601 local time without offset; `homework_count` is
//! always computed with COUNT, never by materializing homework rows.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::Row;

use frontis_core::repository::DomainRepository;
use frontis_types::domain::{
    Course, CourseId, Exercise, ExerciseId, Grade, Homework, HomeworkId, Lecture, LectureId,
    StudentId,
};
use frontis_types::error::RepositoryError;

use super::pool::DatabasePool;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// SQLite-backed implementation of `DomainRepository`.
pub struct SqliteDomainRepository {
    pool: DatabasePool,
}

impl SqliteDomainRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn parse_start(s: &str) -> Result<NaiveDateTime, RepositoryError> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map_err(|e| RepositoryError::Query(format!("invalid lecture start '{s}': {e}")))
}

/// Storage encoding of a lecture start time.
pub fn format_start(start: NaiveDateTime) -> String {
    start.format(DATETIME_FORMAT).to_string()
}

fn lecture_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Lecture, RepositoryError> {
    let start: String = row
        .try_get("start_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    Ok(Lecture {
        id: LectureId(
            row.try_get("id")
                .map_err(|e| RepositoryError::Query(e.to_string()))?,
        ),
        course_id: CourseId(
            row.try_get("course_id")
                .map_err(|e| RepositoryError::Query(e.to_string()))?,
        ),
        start: parse_start(&start)?,
        homework_count: row
            .try_get::<i64, _>("homework_count")
            .map_err(|e| RepositoryError::Query(e.to_string()))? as u32,
    })
}

fn homework_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Homework, RepositoryError> {
    let map_err = |e: sqlx::Error| RepositoryError::Query(e.to_string());
    Ok(Homework {
        id: HomeworkId(row.try_get("id").map_err(map_err)?),
        lecture_id: LectureId(row.try_get("lecture_id").map_err(map_err)?),
        exercise: Exercise {
            id: ExerciseId(row.try_get("exercise_id").map_err(map_err)?),
            name: row.try_get("exercise_name").map_err(map_err)?,
            book: row.try_get("book").map_err(map_err)?,
            page: row.try_get::<i64, _>("page").map_err(map_err)? as u32,
            notes: row.try_get("notes").map_err(map_err)?,
        },
    })
}

// ---------------------------------------------------------------------------
// DomainRepository implementation
// ---------------------------------------------------------------------------

impl DomainRepository for SqliteDomainRepository {
    async fn courses_for_student(
        &self,
        student: StudentId,
    ) -> Result<Vec<Course>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT c.id, c.name FROM courses c
               JOIN enrollments e ON e.course_id = c.id
               WHERE e.student_id = ?
               ORDER BY c.name"#,
        )
        .bind(student.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in &rows {
            courses.push(Course {
                id: CourseId(
                    row.try_get("id")
                        .map_err(|e| RepositoryError::Query(e.to_string()))?,
                ),
                name: row
                    .try_get("name")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?,
            });
        }
        Ok(courses)
    }

    async fn lectures_with_homework(
        &self,
        course: CourseId,
    ) -> Result<Vec<Lecture>, RepositoryError> {
        // The inner join drops lectures without homework.
        let rows = sqlx::query(
            r#"SELECT l.id, l.course_id, l.start_at, COUNT(h.id) AS homework_count
               FROM lectures l
               JOIN homework h ON h.lecture_id = l.id
               WHERE l.course_id = ?
               GROUP BY l.id
               ORDER BY l.start_at"#,
        )
        .bind(course.0)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(lecture_from_row).collect()
    }

    async fn lecture(&self, lecture: LectureId) -> Result<Option<Lecture>, RepositoryError> {
        let row = sqlx::query(
            r#"SELECT l.id, l.course_id, l.start_at,
                      (SELECT COUNT(*) FROM homework h WHERE h.lecture_id = l.id) AS homework_count
               FROM lectures l WHERE l.id = ?"#,
        )
        .bind(lecture.0)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.as_ref().map(lecture_from_row).transpose()
    }

    async fn lecture_on_date(
        &self,
        course: CourseId,
        date: NaiveDate,
    ) -> Result<Option<Lecture>, RepositoryError> {
        let row = sqlx::query(
            r#"SELECT l.id, l.course_id, l.start_at,
                      (SELECT COUNT(*) FROM homework h WHERE h.lecture_id = l.id) AS homework_count
               FROM lectures l
               WHERE l.course_id = ? AND date(l.start_at) = ?
               LIMIT 1"#,
        )
        .bind(course.0)
        .bind(date.format("%Y-%m-%d").to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.as_ref().map(lecture_from_row).transpose()
    }

    async fn homework_for_lecture(
        &self,
        lecture: LectureId,
    ) -> Result<Vec<Homework>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, lecture_id, exercise_id, exercise_name, book, page, notes
             FROM homework WHERE lecture_id = ? ORDER BY id",
        )
        .bind(lecture.0)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(homework_from_row).collect()
    }

    async fn homework_count(&self, lecture: LectureId) -> Result<u32, RepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM homework WHERE lecture_id = ?")
            .bind(lecture.0)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count.0 as u32)
    }

    async fn grade_for(
        &self,
        student: StudentId,
        exercise: ExerciseId,
    ) -> Result<Option<Grade>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM grades WHERE student_id = ? AND exercise_id = ?")
            .bind(student.to_string())
            .bind(exercise.0)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let value: f64 = row
                    .try_get("value")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(Grade {
                    exercise_id: exercise,
                    value,
                }))
            }
            None => Ok(None),
        }
    }
}
