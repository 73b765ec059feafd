//! In-memory domain repository built from fixture data.
//!
//! Used by the demo chat mode and by engine-level tests that do not
//! want a database. The builder methods mirror the tables of the SQLite
//! schema.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};

use frontis_core::repository::DomainRepository;
use frontis_types::domain::{
    Course, CourseId, Exercise, ExerciseId, Grade, Homework, HomeworkId, Lecture, LectureId,
    StudentId,
};
use frontis_types::error::RepositoryError;

/// `DomainRepository` over plain collections.
#[derive(Clone, Default)]
pub struct InMemoryDomainRepository {
    courses: Vec<Course>,
    enrollments: HashSet<(StudentId, CourseId)>,
    lectures: Vec<Lecture>,
    homework: Vec<Homework>,
    grades: HashMap<(StudentId, ExerciseId), f64>,
    next_homework_id: i64,
}

impl InMemoryDomainRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_course(&mut self, id: i64, name: impl Into<String>) -> CourseId {
        let id = CourseId(id);
        self.courses.push(Course {
            id,
            name: name.into(),
        });
        id
    }

    pub fn enroll(&mut self, student: StudentId, course: CourseId) {
        self.enrollments.insert((student, course));
    }

    pub fn add_lecture(&mut self, id: i64, course: CourseId, start: NaiveDateTime) -> LectureId {
        let id = LectureId(id);
        self.lectures.push(Lecture {
            id,
            course_id: course,
            start,
            homework_count: 0,
        });
        id
    }

    pub fn add_homework(&mut self, lecture: LectureId, exercise: Exercise) {
        self.next_homework_id += 1;
        self.homework.push(Homework {
            id: HomeworkId(self.next_homework_id),
            lecture_id: lecture,
            exercise,
        });
        if let Some(l) = self.lectures.iter_mut().find(|l| l.id == lecture) {
            l.homework_count += 1;
        }
    }

    pub fn add_grade(&mut self, student: StudentId, exercise: ExerciseId, value: f64) {
        self.grades.insert((student, exercise), value);
    }
}

impl DomainRepository for InMemoryDomainRepository {
    async fn courses_for_student(
        &self,
        student: StudentId,
    ) -> Result<Vec<Course>, RepositoryError> {
        let mut courses: Vec<Course> = self
            .courses
            .iter()
            .filter(|c| self.enrollments.contains(&(student, c.id)))
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(courses)
    }

    async fn lectures_with_homework(
        &self,
        course: CourseId,
    ) -> Result<Vec<Lecture>, RepositoryError> {
        let mut lectures: Vec<Lecture> = self
            .lectures
            .iter()
            .filter(|l| l.course_id == course && l.homework_count > 0)
            .cloned()
            .collect();
        lectures.sort_by_key(|l| l.start);
        Ok(lectures)
    }

    async fn lecture(&self, lecture: LectureId) -> Result<Option<Lecture>, RepositoryError> {
        Ok(self.lectures.iter().find(|l| l.id == lecture).cloned())
    }

    async fn lecture_on_date(
        &self,
        course: CourseId,
        date: NaiveDate,
    ) -> Result<Option<Lecture>, RepositoryError> {
        Ok(self
            .lectures
            .iter()
            .find(|l| l.course_id == course && l.start.date() == date)
            .cloned())
    }

    async fn homework_for_lecture(
        &self,
        lecture: LectureId,
    ) -> Result<Vec<Homework>, RepositoryError> {
        Ok(self
            .homework
            .iter()
            .filter(|h| h.lecture_id == lecture)
            .cloned()
            .collect())
    }

    async fn homework_count(&self, lecture: LectureId) -> Result<u32, RepositoryError> {
        Ok(self
            .homework
            .iter()
            .filter(|h| h.lecture_id == lecture)
            .count() as u32)
    }

    async fn grade_for(
        &self,
        student: StudentId,
        exercise: ExerciseId,
    ) -> Result<Option<Grade>, RepositoryError> {
        Ok(self.grades.get(&(student, exercise)).map(|value| Grade {
            exercise_id: exercise,
            value: *value,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn exercise(id: i64, name: &str) -> Exercise {
        Exercise {
            id: ExerciseId(id),
            name: name.to_string(),
            book: "Workbook B1".to_string(),
            page: 42,
            notes: None,
        }
    }

    fn start(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, d)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn fixture_behaves_like_the_sqlite_repository() {
        let mut repo = InMemoryDomainRepository::new();
        let student = StudentId(Uuid::now_v7());
        let english = repo.add_course(1, "Αγγλικά");
        repo.add_course(2, "Μαθηματικά");
        repo.enroll(student, english);

        let l17 = repo.add_lecture(1, english, start(17));
        let l10 = repo.add_lecture(2, english, start(10));
        repo.add_lecture(3, english, start(24));
        repo.add_homework(l17, exercise(10, "Ασκήσεις 1-3"));
        repo.add_homework(l17, exercise(11, "Essay draft"));
        repo.add_homework(l10, exercise(12, "Reading"));
        repo.add_grade(student, ExerciseId(10), 8.5);

        let courses = repo.courses_for_student(student).await.unwrap();
        assert_eq!(courses.len(), 1);

        let lectures = repo.lectures_with_homework(english).await.unwrap();
        assert_eq!(
            lectures.iter().map(|l| l.id).collect::<Vec<_>>(),
            vec![l10, l17]
        );
        assert_eq!(lectures[1].homework_count, 2);

        // Lecture without homework still resolves by date.
        let bare = repo
            .lecture_on_date(english, NaiveDate::from_ymd_opt(2024, 4, 24).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bare.homework_count, 0);

        assert_eq!(repo.homework_count(l17).await.unwrap(), 2);
        assert!(repo.grade_for(student, ExerciseId(10)).await.unwrap().is_some());
        assert!(repo.grade_for(student, ExerciseId(11)).await.unwrap().is_none());
    }
}
