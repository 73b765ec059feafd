//! Fixture data for `chat --demo`.
//!
//! Two courses around today's date: one with an upcoming lecture that
//! has homework due, one with only past lectures so the older-homework
//! branch can be exercised.

use chrono::{Duration, NaiveDateTime};

use frontis_core::clock::{Clock, SystemClock};
use frontis_infra::memory::InMemoryDomainRepository;
use frontis_types::domain::{Exercise, ExerciseId, StudentId};

fn exercise(id: i64, name: &str, page: u32, notes: Option<&str>) -> Exercise {
    Exercise {
        id: ExerciseId(id),
        name: name.to_string(),
        book: "Workbook B1".to_string(),
        page,
        notes: notes.map(str::to_string),
    }
}

pub fn demo_repository(student: StudentId) -> InMemoryDomainRepository {
    let now = SystemClock.now();
    let evening = |offset_days: i64| -> NaiveDateTime {
        (now + Duration::days(offset_days))
            .date()
            .and_hms_opt(18, 0, 0)
            .unwrap_or(now)
    };

    let mut repo = InMemoryDomainRepository::new();

    let english = repo.add_course(1, "Αγγλικά");
    let math = repo.add_course(2, "Μαθηματικά");
    repo.enroll(student, english);
    repo.enroll(student, math);

    // English: one upcoming lecture with homework due, one past.
    let upcoming = repo.add_lecture(1, english, evening(2));
    repo.add_homework(upcoming, exercise(10, "Ασκήσεις 1-3", 40, None));
    repo.add_homework(upcoming, exercise(11, "Essay: My summer", 41, Some("μισή σελίδα")));
    let past_en = repo.add_lecture(2, english, evening(-5));
    repo.add_homework(past_en, exercise(12, "Reading κεφ. 2", 23, None));
    repo.add_grade(student, ExerciseId(12), 9.0);

    // Math: only past lectures, enough homework to paginate.
    let last_week = repo.add_lecture(3, math, evening(-7));
    for (i, name) in ["Άλγεβρα 2.1", "Άλγεβρα 2.2", "Γεωμετρία 3.1", "Επανάληψη"]
        .iter()
        .enumerate()
    {
        repo.add_homework(last_week, exercise(20 + i as i64, name, 50 + i as u32, None));
    }
    repo.add_grade(student, ExerciseId(20), 7.5);
    let older = repo.add_lecture(4, math, evening(-14));
    repo.add_homework(older, exercise(30, "Κλάσματα", 18, None));

    repo
}
