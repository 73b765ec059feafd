//! The "show my homework" flow: course selection, lecture discovery
//! (next due, past dates, fuzzy date lookup) and paginated homework
//! presentation.
//!
//! Six waterfalls dispatched from a plain step table. The user-facing
//! strings are the Greek ones the bot ships with; rendering and
//! localization beyond that belong to the transport.

use serde_json::{Value, json};

use frontis_types::dialog::{DialogFrame, DialogId};
use frontis_types::domain::{Course, Lecture, LectureId};
use frontis_types::message::{HomeworkCard, Outbound};
use frontis_types::prompt::{Choice, PromptRequest, PromptResult};

use crate::dialog::stack::EngineError;
use crate::dialog::waterfall::{StepInput, StepOutcome, TurnContext, WaterfallSet};
use crate::query::{
    closest_lecture, format_date_long, lecture_date_suggestions, next_due_lecture, page_bounds,
    recent_lecture_dates,
};
use crate::repository::DomainRepository;

/// Dialog ids of the homework flow.
pub mod ids {
    pub const ROOT: &str = "student_homework/root";
    pub const COURSE: &str = "student_homework/course";
    pub const LECTURE: &str = "student_homework/lecture";
    pub const LECTURE_PAST: &str = "student_homework/lecture_past";
    pub const LECTURE_OTHER: &str = "student_homework/lecture_other";
    pub const HOMEWORK: &str = "student_homework/homework";
}

/// Property slots owned by this flow.
const PROP_COURSES: &str = "courses";
const PROP_SEL_COURSE: &str = "sel_course";
const PROP_HOMEWORK_PAGE: &str = "homework_page";

/// How many recent lecture dates a date prompt suggests.
const DATE_SUGGESTIONS: usize = 5;

const RETRY_YES_NO: &str = "Παρακαλώ απάντησε με ένα Ναι ή Όχι:";
const RETRY_DATE: &str =
    "Η επιθυμητή ημερομηνία θα πρέπει να είναι στη μορφή ημέρα/μήνας (π.χ. 24/4):";

/// Tagged union of every step of the flow; the table below maps each
/// dialog id to its ordered step sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Root,
    CourseAsk,
    CourseSelect,
    Lecture,
    PastAsk,
    PastDates,
    PastSelect,
    OtherEntry,
    OtherSelect,
    OtherNotFound,
    OtherAgain,
    Homework,
    HomeworkPage,
    HomeworkOther,
}

fn waterfall(dialog: &str) -> Option<&'static [Step]> {
    match dialog {
        ids::ROOT => Some(&[Step::Root]),
        ids::COURSE => Some(&[Step::CourseAsk, Step::CourseSelect]),
        ids::LECTURE => Some(&[Step::Lecture]),
        ids::LECTURE_PAST => Some(&[Step::PastAsk, Step::PastDates, Step::PastSelect]),
        ids::LECTURE_OTHER => Some(&[
            Step::OtherEntry,
            Step::OtherSelect,
            Step::OtherNotFound,
            Step::OtherAgain,
        ]),
        ids::HOMEWORK => Some(&[Step::Homework, Step::HomeworkPage, Step::HomeworkOther]),
        _ => None,
    }
}

fn yes_no() -> Vec<Choice> {
    vec![
        Choice::new("Ναι"),
        Choice::new("Όχι, ευχαριστώ").with_synonym("Όχι"),
    ]
}

/// The homework flow over a domain repository.
pub struct HomeworkFlows<R: DomainRepository> {
    repo: R,
}

impl<R: DomainRepository> HomeworkFlows<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// The course the conversation currently works with; the candidate
    /// list and the selected index both live in the property bag.
    fn selected_course(&self, ctx: &TurnContext) -> Option<Course> {
        let courses: Vec<Course> = ctx.properties.get(PROP_COURSES)?;
        let sel: usize = ctx.properties.get(PROP_SEL_COURSE).unwrap_or(0);
        courses.get(sel).cloned()
    }

    // --- root ---

    async fn root(&self, ctx: &mut TurnContext) -> Result<StepOutcome, EngineError> {
        let courses = self.repo.courses_for_student(ctx.student).await?;
        ctx.properties.set(PROP_COURSES, &courses)?;

        if courses.is_empty() {
            ctx.send_text("Απ' ό,τι φαίνεται δεν έχεις εγγραφεί σε κάποιο μάθημα προς το παρόν.");
            return Ok(StepOutcome::End(Value::Null));
        }

        // A single enrollment needs no course question.
        if courses.len() == 1 {
            Ok(StepOutcome::Begin {
                dialog: ids::LECTURE.into(),
                options: json!(0),
            })
        } else {
            Ok(StepOutcome::Begin {
                dialog: ids::COURSE.into(),
                options: Value::Null,
            })
        }
    }

    // --- course ---

    fn course_ask(&self, ctx: &mut TurnContext) -> StepOutcome {
        let courses: Vec<Course> = ctx.properties.get(PROP_COURSES).unwrap_or_default();
        StepOutcome::Prompt(PromptRequest::choice(
            "Για ποιο μάθημα θα ήθελες να δεις τις εργασίες σου;",
            "Παρακαλώ επίλεξε ή πληκτρολόγησε ένα από τα παρακάτω μαθήματα:",
            courses.iter().map(|c| Choice::new(&c.name)).collect(),
        ))
    }

    fn course_select(&self, input: &StepInput) -> StepOutcome {
        let index = match input.prompt_result() {
            Some(PromptResult::Choice { index, .. }) => index,
            _ => 0,
        };
        StepOutcome::Begin {
            dialog: ids::LECTURE.into(),
            options: json!(index),
        }
    }

    // --- lecture ---

    async fn lecture(
        &self,
        ctx: &mut TurnContext,
        frame: &DialogFrame,
    ) -> Result<StepOutcome, EngineError> {
        let sel: usize = serde_json::from_value(frame.options.clone()).unwrap_or(0);
        ctx.properties.set(PROP_SEL_COURSE, &sel)?;

        let Some(course) = self.selected_course(ctx) else {
            return Ok(StepOutcome::End(Value::Null));
        };

        let lectures = self.repo.lectures_with_homework(course.id).await?;
        if lectures.is_empty() {
            ctx.send_text("Δεν υπάρχουν ακόμα εργασίες για αυτό το μάθημα.");
            ctx.send_text("Απόλαυσε τον ελέυθερο χρόνο σου! 😎");
            return Ok(StepOutcome::End(Value::Null));
        }

        if let Some(next) = next_due_lecture(&lectures, ctx.now) {
            let singular = next.homework_count == 1;
            ctx.send_text(format!(
                "{} εργασί{} με την κοντινότερη προθεσμία είναι για τις {} και είναι {} παρακάτω:",
                if singular { "Η" } else { "Οι" },
                if singular { "α" } else { "ες" },
                format_date_long(next.start.date()),
                if singular { "η" } else { "οι" },
            ));
            return Ok(StepOutcome::Begin {
                dialog: ids::HOMEWORK.into(),
                options: json!(next.id),
            });
        }

        Ok(StepOutcome::Begin {
            dialog: ids::LECTURE_PAST.into(),
            options: Value::Null,
        })
    }

    // --- lecture_past ---

    fn past_ask(&self, ctx: &mut TurnContext) -> StepOutcome {
        ctx.send_text("Δεν έχεις νέες εργασίες για αυτό το μάθημα!");
        StepOutcome::Prompt(PromptRequest::choice(
            "Θα ήθελες να δεις παλαιότερες εργασίες σου;",
            RETRY_YES_NO,
            yes_no(),
        ))
    }

    async fn past_dates(
        &self,
        ctx: &mut TurnContext,
        input: &StepInput,
    ) -> Result<StepOutcome, EngineError> {
        if let Some(PromptResult::Choice { index: 1, .. }) = input.prompt_result() {
            ctx.send_text("Εντάξει! Όποτε θέλεις μπορείς να ελέγξεις ξανά για νέες εργασίες! 😊");
            return Ok(StepOutcome::End(Value::Null));
        }

        let Some(course) = self.selected_course(ctx) else {
            return Ok(StepOutcome::End(Value::Null));
        };
        let lectures = self.repo.lectures_with_homework(course.id).await?;
        let dates = recent_lecture_dates(&lectures, ctx.now, DATE_SUGGESTIONS);

        ctx.send_text(
            "Ωραία! Παρακάτω θα βρεις μερικές από τις πιο πρόσφατες ημερομηνίες που είχες μάθημα.",
        );
        Ok(StepOutcome::Prompt(PromptRequest::day_month(
            "Επίλεξε μία από αυτές ή πληκτρολόγησε κάποια άλλη παρακάτω:",
            RETRY_DATE,
            dates,
        )))
    }

    fn past_select(&self, input: &StepInput) -> StepOutcome {
        StepOutcome::Replace {
            dialog: ids::LECTURE_OTHER.into(),
            options: input.result.clone(),
        }
    }

    // --- lecture_other ---

    /// Entered with a resolved date (proceed), a declined yes/no
    /// (close), or an accepted yes/no (ask for a date).
    async fn other_entry(
        &self,
        ctx: &mut TurnContext,
        frame: &DialogFrame,
    ) -> Result<StepOutcome, EngineError> {
        match serde_json::from_value::<PromptResult>(frame.options.clone()).ok() {
            Some(PromptResult::Date { .. }) => Ok(StepOutcome::Next(frame.options.clone())),
            Some(PromptResult::Choice { index: 1, .. }) => {
                ctx.send_text("ΟΚ! 😊");
                Ok(StepOutcome::End(Value::Null))
            }
            _ => {
                let Some(course) = self.selected_course(ctx) else {
                    return Ok(StepOutcome::End(Value::Null));
                };
                let lectures = self.repo.lectures_with_homework(course.id).await?;
                let dates = lecture_date_suggestions(&lectures, DATE_SUGGESTIONS);
                Ok(StepOutcome::Prompt(PromptRequest::day_month(
                    "Επίλεξε μία από τις παρακάτω ημερομηνίες ή γράψε μια άλλη:",
                    RETRY_DATE,
                    dates,
                )))
            }
        }
    }

    async fn other_select(
        &self,
        ctx: &mut TurnContext,
        input: &StepInput,
    ) -> Result<StepOutcome, EngineError> {
        let Some(PromptResult::Date { date }) = input.prompt_result() else {
            return Ok(StepOutcome::End(Value::Null));
        };
        let Some(course) = self.selected_course(ctx) else {
            return Ok(StepOutcome::End(Value::Null));
        };

        // Exact calendar-date lookup first, over all lectures -- a
        // lecture without homework is still a valid answer here.
        if let Some(lecture) = self.repo.lecture_on_date(course.id, date).await? {
            if lecture.homework_count == 0 {
                ctx.send_text(format!(
                    "Δεν υπάρχουν εργασίες για τις {}",
                    format_date_long(date)
                ));
                return Ok(StepOutcome::Next(Value::Null));
            }
            let singular = lecture.homework_count == 1;
            ctx.send_text(format!(
                "Για τις {} έχεις τ{} παρακάτω εργασί{}:",
                format_date_long(date),
                if singular { "ην" } else { "ις" },
                if singular { "α" } else { "ες" },
            ));
            return Ok(StepOutcome::Replace {
                dialog: ids::HOMEWORK.into(),
                options: json!(lecture.id),
            });
        }

        let lectures = self.repo.lectures_with_homework(course.id).await?;
        match closest_lecture(&lectures, date) {
            Some(lecture) => {
                ctx.send_text(format!(
                    "Δεν υπάρχει διάλεξη για αυτό το μάθημα στις {}.",
                    format_date_long(date)
                ));
                ctx.send_text(format!(
                    "Βρήκα όμως για την πιο κοντινή της στις {}:",
                    format_date_long(lecture.start.date())
                ));
                Ok(StepOutcome::Replace {
                    dialog: ids::HOMEWORK.into(),
                    options: json!(lecture.id),
                })
            }
            None => {
                ctx.send_text(format!(
                    "Δεν υπάρχουν εργασίες για τις {}",
                    format_date_long(date)
                ));
                Ok(StepOutcome::Next(Value::Null))
            }
        }
    }

    fn other_not_found(&self) -> StepOutcome {
        StepOutcome::Prompt(PromptRequest::choice(
            "Θα ήθελες να δοκιμάσεις ξανά με άλλη ημερομηνία;",
            RETRY_YES_NO,
            yes_no(),
        ))
    }

    fn other_again(&self, input: &StepInput) -> StepOutcome {
        StepOutcome::Replace {
            dialog: ids::LECTURE_OTHER.into(),
            options: input.result.clone(),
        }
    }

    // --- homework ---

    async fn homework(
        &self,
        ctx: &mut TurnContext,
        frame: &DialogFrame,
    ) -> Result<StepOutcome, EngineError> {
        let Ok(lecture_id) = serde_json::from_value::<LectureId>(frame.options.clone()) else {
            return Ok(StepOutcome::End(Value::Null));
        };
        let Some(lecture) = self.repo.lecture(lecture_id).await? else {
            return Ok(StepOutcome::End(Value::Null));
        };

        let page: usize = ctx.properties.get(PROP_HOMEWORK_PAGE).unwrap_or(0);
        let for_past_lecture = lecture.start < ctx.now;

        let homework = self.repo.homework_for_lecture(lecture_id).await?;
        let total = self.repo.homework_count(lecture_id).await? as usize;
        let slice = page_bounds(total, page);

        for hw in homework.iter().skip(slice.start).take(slice.end - slice.start) {
            ctx.send(Outbound::Typing);
            // Grades only exist for lectures already held.
            let grade = if for_past_lecture {
                let grade = self.repo.grade_for(ctx.student, hw.exercise.id).await?;
                Some(grade.map_or_else(|| "-".to_string(), |g| g.value.to_string()))
            } else {
                None
            };
            ctx.send(Outbound::HomeworkCard {
                card: HomeworkCard {
                    exercise: hw.exercise.name.clone(),
                    book: hw.exercise.book.clone(),
                    page: hw.exercise.page,
                    grade,
                    notes: hw
                        .exercise
                        .notes
                        .clone()
                        .filter(|n| !n.is_empty())
                        .unwrap_or_else(|| "-".to_string()),
                },
            });
        }

        if slice.remaining > 0 {
            let singular = slice.remaining == 1;
            let date = format_date_long(lecture.start.date());
            let text = if page == 0 {
                format!(
                    "Αυτές ήταν οι {} πρώτες εργασίες που έχεις για τις {}.",
                    slice.end - slice.start,
                    date
                )
            } else {
                format!(
                    "Υπάρχ{} ακόμη {} εργασί{} για τις {}.",
                    if singular { "ει" } else { "ουν" },
                    slice.remaining,
                    if singular { "α" } else { "ες" },
                    date
                )
            };

            ctx.properties.set(PROP_HOMEWORK_PAGE, &(page + 1))?;

            return Ok(StepOutcome::Prompt(PromptRequest::choice(
                text,
                "Παρακαλώ επίλεξε μία από τις παρακάτω απαντήσεις:",
                vec![
                    Choice::new(format!("Εμφάνιση {} ακόμη", slice.show_more)),
                    Choice::new("Ολοκλήρωση"),
                ],
            )));
        }

        Ok(StepOutcome::Next(Value::Null))
    }

    fn homework_page(
        &self,
        ctx: &mut TurnContext,
        frame: &DialogFrame,
        input: &StepInput,
    ) -> StepOutcome {
        if let Some(PromptResult::Choice { index: 0, .. }) = input.prompt_result() {
            // "Show more": restart with the same lecture; the page
            // property survived and points at the next page.
            return StepOutcome::Replace {
                dialog: ids::HOMEWORK.into(),
                options: frame.options.clone(),
            };
        }

        ctx.properties.remove(PROP_HOMEWORK_PAGE);

        StepOutcome::Prompt(PromptRequest::choice(
            "Θα ήθελες να δεις εργασίες για άλλη ημερομηνία;",
            RETRY_YES_NO,
            yes_no(),
        ))
    }

    fn homework_other(&self, input: &StepInput) -> StepOutcome {
        StepOutcome::Replace {
            dialog: ids::LECTURE_OTHER.into(),
            options: input.result.clone(),
        }
    }
}

impl<R: DomainRepository> WaterfallSet for HomeworkFlows<R> {
    fn step_count(&self, dialog: &DialogId) -> Option<usize> {
        waterfall(dialog.as_str()).map(<[Step]>::len)
    }

    async fn run_step(
        &self,
        ctx: &mut TurnContext,
        frame: &DialogFrame,
        input: StepInput,
    ) -> Result<StepOutcome, EngineError> {
        let steps = waterfall(frame.dialog.as_str())
            .ok_or_else(|| EngineError::UnknownDialog(frame.dialog.clone()))?;
        let step = steps
            .get(frame.step)
            .copied()
            .ok_or_else(|| EngineError::StepOutOfRange {
                dialog: frame.dialog.clone(),
                step: frame.step,
            })?;

        Ok(match step {
            Step::Root => self.root(ctx).await?,
            Step::CourseAsk => self.course_ask(ctx),
            Step::CourseSelect => self.course_select(&input),
            Step::Lecture => self.lecture(ctx, frame).await?,
            Step::PastAsk => self.past_ask(ctx),
            Step::PastDates => self.past_dates(ctx, &input).await?,
            Step::PastSelect => self.past_select(&input),
            Step::OtherEntry => self.other_entry(ctx, frame).await?,
            Step::OtherSelect => self.other_select(ctx, &input).await?,
            Step::OtherNotFound => self.other_not_found(),
            Step::OtherAgain => self.other_again(&input),
            Step::Homework => self.homework(ctx, frame).await?,
            Step::HomeworkPage => self.homework_page(ctx, frame, &input),
            Step::HomeworkOther => self.homework_other(&input),
        })
    }

    fn dialog_ended(&self, ctx: &mut TurnContext, dialog: &DialogId) {
        // The root owns the flow's slots; sub-dialog frames come and go
        // (Replace restarts the homework dialog between pages) without
        // touching them.
        if dialog.as_str() == ids::ROOT {
            ctx.properties.remove(PROP_COURSES);
            ctx.properties.remove(PROP_SEL_COURSE);
            ctx.properties.remove(PROP_HOMEWORK_PAGE);
        }
    }
}
