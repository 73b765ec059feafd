//! Pure domain algorithms executed inside the dialog steps.

pub mod lectures;

pub use lectures::{
    PAGE_SIZE, PageSlice, closest_lecture, format_date_long, format_day_month,
    lecture_date_suggestions, next_due_lecture, page_bounds, recent_lecture_dates,
};
