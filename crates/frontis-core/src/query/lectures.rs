//! Closest-date resolution, next-due lookup, and homework pagination.
//!
//! All functions here are pure over already-fetched lecture slices; the
//! repository decides what gets fetched. Date formatting is Greek:
//! `24/4` for prompt suggestions and "24 Απριλίου" inside sentences.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use frontis_types::domain::Lecture;

/// Homework items shown per page.
pub const PAGE_SIZE: usize = 3;

/// Genitive month names used in running text ("για τις 24 Απριλίου").
const MONTHS_GENITIVE: [&str; 12] = [
    "Ιανουαρίου",
    "Φεβρουαρίου",
    "Μαρτίου",
    "Απριλίου",
    "Μαΐου",
    "Ιουνίου",
    "Ιουλίου",
    "Αυγούστου",
    "Σεπτεμβρίου",
    "Οκτωβρίου",
    "Νοεμβρίου",
    "Δεκεμβρίου",
];

/// `24/4` — the shape users type and the prompt suggestions show.
pub fn format_day_month(date: NaiveDate) -> String {
    format!("{}/{}", date.day(), date.month())
}

/// `24 Απριλίου` — the shape sentences use.
pub fn format_date_long(date: NaiveDate) -> String {
    let month = MONTHS_GENITIVE
        .get(date.month0() as usize)
        .copied()
        .unwrap_or("");
    format!("{} {}", date.day(), month)
}

/// The lecture matching a requested date.
///
/// An exact calendar-date match (ignoring time of day) wins; otherwise
/// the lecture minimizing absolute day distance is returned. Ties break
/// to the earlier start, deterministically.
pub fn closest_lecture(lectures: &[Lecture], requested: NaiveDate) -> Option<&Lecture> {
    if let Some(exact) = lectures.iter().find(|l| l.start.date() == requested) {
        return Some(exact);
    }
    lectures
        .iter()
        .min_by_key(|l| ((l.start.date() - requested).num_days().abs(), l.start))
}

/// The lecture with the smallest start time at or after `now`.
pub fn next_due_lecture(lectures: &[Lecture], now: NaiveDateTime) -> Option<&Lecture> {
    lectures
        .iter()
        .filter(|l| l.start >= now)
        .min_by_key(|l| l.start)
}

/// Up to `limit` most recent past lecture dates, newest first, as `d/m`.
pub fn recent_lecture_dates(lectures: &[Lecture], now: NaiveDateTime, limit: usize) -> Vec<String> {
    let mut past: Vec<&Lecture> = lectures.iter().filter(|l| l.start < now).collect();
    past.sort_by(|a, b| b.start.cmp(&a.start));
    past.into_iter()
        .take(limit)
        .map(|l| format_day_month(l.start.date()))
        .collect()
}

/// Up to `limit` lecture dates regardless of past/future, newest first,
/// as `d/m`. Used when re-prompting for "another date".
pub fn lecture_date_suggestions(lectures: &[Lecture], limit: usize) -> Vec<String> {
    let mut all: Vec<&Lecture> = lectures.iter().collect();
    all.sort_by(|a, b| b.start.cmp(&a.start));
    all.into_iter()
        .take(limit)
        .map(|l| format_day_month(l.start.date()))
        .collect()
}

/// One page of a homework listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    /// First item index of this page.
    pub start: usize,
    /// One past the last item index of this page.
    pub end: usize,
    /// Items left after this page. Recomputed from the total count every
    /// time, never cached.
    pub remaining: usize,
    /// Size of the "show N more" affordance; zero on the last page.
    pub show_more: usize,
}

/// Fixed-size page boundaries over `total` items.
pub fn page_bounds(total: usize, page: usize) -> PageSlice {
    let start = (PAGE_SIZE * page).min(total);
    let end = (start + PAGE_SIZE).min(total);
    let remaining = total - end;
    PageSlice {
        start,
        end,
        remaining,
        show_more: remaining.min(PAGE_SIZE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontis_types::domain::{CourseId, LectureId};

    fn lecture(id: i64, y: i32, mo: u32, d: u32, h: u32) -> Lecture {
        Lecture {
            id: LectureId(id),
            course_id: CourseId(1),
            start: NaiveDate::from_ymd_opt(y, mo, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
            homework_count: 1,
        }
    }

    fn date(y: i32, mo: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap()
    }

    #[test]
    fn exact_date_wins_regardless_of_time() {
        let lectures = vec![
            lecture(1, 2024, 4, 17, 18),
            lecture(2, 2024, 4, 24, 9),
            lecture(3, 2024, 4, 25, 18),
        ];
        let found = closest_lecture(&lectures, date(2024, 4, 24)).unwrap();
        assert_eq!(found.id, LectureId(2));
    }

    #[test]
    fn closest_minimizes_absolute_day_distance() {
        let lectures = vec![lecture(1, 2024, 4, 10, 18), lecture(2, 2024, 4, 20, 18)];
        let found = closest_lecture(&lectures, date(2024, 4, 13)).unwrap();
        assert_eq!(found.id, LectureId(1));
        let found = closest_lecture(&lectures, date(2024, 4, 18)).unwrap();
        assert_eq!(found.id, LectureId(2));
    }

    #[test]
    fn equidistant_dates_break_to_the_earlier_lecture() {
        let lectures = vec![lecture(2, 2024, 4, 22, 18), lecture(1, 2024, 4, 18, 18)];
        // 20/4 is two days from both; the earlier lecture wins.
        let found = closest_lecture(&lectures, date(2024, 4, 20)).unwrap();
        assert_eq!(found.id, LectureId(1));
    }

    #[test]
    fn closest_on_empty_set_is_none() {
        assert!(closest_lecture(&[], date(2024, 4, 20)).is_none());
    }

    #[test]
    fn next_due_picks_minimum_future_start() {
        let now = date(2024, 4, 20).and_hms_opt(12, 0, 0).unwrap();
        let lectures = vec![
            lecture(1, 2024, 4, 17, 18),
            lecture(2, 2024, 4, 27, 18),
            lecture(3, 2024, 4, 22, 18),
        ];
        assert_eq!(next_due_lecture(&lectures, now).unwrap().id, LectureId(3));
    }

    #[test]
    fn next_due_is_none_when_all_past() {
        let now = date(2024, 5, 1).and_hms_opt(0, 0, 0).unwrap();
        let lectures = vec![lecture(1, 2024, 4, 17, 18)];
        assert!(next_due_lecture(&lectures, now).is_none());
    }

    #[test]
    fn lecture_starting_exactly_now_counts_as_due() {
        let now = date(2024, 4, 22).and_hms_opt(18, 0, 0).unwrap();
        let lectures = vec![lecture(1, 2024, 4, 22, 18)];
        assert_eq!(next_due_lecture(&lectures, now).unwrap().id, LectureId(1));
    }

    #[test]
    fn recent_dates_are_past_only_newest_first() {
        let now = date(2024, 4, 20).and_hms_opt(12, 0, 0).unwrap();
        let lectures = vec![
            lecture(1, 2024, 4, 10, 18),
            lecture(2, 2024, 4, 17, 18),
            lecture(3, 2024, 4, 27, 18),
        ];
        assert_eq!(recent_lecture_dates(&lectures, now, 5), vec!["17/4", "10/4"]);
        assert_eq!(recent_lecture_dates(&lectures, now, 1), vec!["17/4"]);
    }

    #[test]
    fn pages_partition_the_collection() {
        for total in 0..10usize {
            let mut shown = 0;
            let mut page = 0;
            loop {
                let slice = page_bounds(total, page);
                shown += slice.end - slice.start;
                if slice.remaining == 0 {
                    assert_eq!(slice.show_more, 0);
                    break;
                }
                assert!(slice.show_more >= 1 && slice.show_more <= PAGE_SIZE);
                page += 1;
            }
            assert_eq!(shown, total);
        }
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let slice = page_bounds(4, 5);
        assert_eq!(slice.start, 4);
        assert_eq!(slice.end, 4);
        assert_eq!(slice.remaining, 0);
    }

    #[test]
    fn show_more_counts_at_most_a_page() {
        let slice = page_bounds(7, 0);
        assert_eq!(slice.remaining, 4);
        assert_eq!(slice.show_more, 3);
        let slice = page_bounds(7, 1);
        assert_eq!(slice.remaining, 1);
        assert_eq!(slice.show_more, 1);
    }

    #[test]
    fn greek_date_formats() {
        assert_eq!(format_day_month(date(2024, 4, 24)), "24/4");
        assert_eq!(format_date_long(date(2024, 4, 24)), "24 Απριλίου");
        assert_eq!(format_date_long(date(2024, 5, 3)), "3 Μαΐου");
    }
}
