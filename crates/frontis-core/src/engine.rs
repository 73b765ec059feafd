//! Turn-level engine surface: load state, dispatch, persist, reply.
//!
//! One inbound message is one unit of work. The conversation state is
//! read once at turn start and written once at turn end; if anything
//! fails in between, nothing is written and the previously persisted
//! state stays valid for the next turn.

use serde_json::Value;

use frontis_types::dialog::ConversationState;
use frontis_types::domain::{ConversationId, StudentId};
use frontis_types::message::Outbound;

use crate::clock::Clock;
use crate::dialog::stack::{DialogDispatcher, EngineError};
use crate::dialog::waterfall::TurnContext;
use crate::flows::homework::{self, HomeworkFlows};
use crate::repository::DomainRepository;
use crate::state::StateStore;

/// The dialog engine for one deployment: homework flows over a domain
/// repository, conversation state in a state store, time from an
/// injected clock.
pub struct DialogEngine<R: DomainRepository, S: StateStore, C: Clock> {
    dispatcher: DialogDispatcher<HomeworkFlows<R>>,
    state: S,
    clock: C,
}

impl<R: DomainRepository, S: StateStore, C: Clock> DialogEngine<R, S, C> {
    pub fn new(repo: R, state: S, clock: C) -> Self {
        Self {
            dispatcher: DialogDispatcher::new(HomeworkFlows::new(repo)),
            state,
            clock,
        }
    }

    /// Begin the homework flow for a conversation (the top-level
    /// trigger a transport fires on e.g. a menu selection).
    pub async fn start(
        &self,
        conversation: ConversationId,
        student: StudentId,
    ) -> Result<Vec<Outbound>, EngineError> {
        let (mut conv, mut ctx) = self.open_turn(conversation, student).await?;
        // A restart over an active dialog drops the old stack (with
        // cleanup) instead of piling a second root on top of it.
        if !conv.stack.is_empty() {
            tracing::info!(conversation = %conversation, "restarting over an active dialog");
            self.dispatcher.abort_all(&mut ctx, &mut conv.stack);
        }
        tracing::info!(conversation = %conversation, student = %student, "starting homework flow");
        let result = self
            .dispatcher
            .begin(
                &mut ctx,
                &mut conv.stack,
                homework::ids::ROOT.into(),
                Value::Null,
            )
            .await;
        self.close_turn(conversation, conv, ctx, result).await
    }

    /// Feed one inbound message to the suspended conversation.
    pub async fn handle_turn(
        &self,
        conversation: ConversationId,
        student: StudentId,
        text: &str,
    ) -> Result<Vec<Outbound>, EngineError> {
        let (mut conv, mut ctx) = self.open_turn(conversation, student).await?;
        tracing::debug!(conversation = %conversation, "handling turn");
        let result = self
            .dispatcher
            .continue_turn(&mut ctx, &mut conv.stack, text)
            .await;
        self.close_turn(conversation, conv, ctx, result).await
    }

    /// Abandon whatever dialog is waiting on top; its cleanup runs and
    /// the parent (if any) resumes with a null result.
    pub async fn abandon(
        &self,
        conversation: ConversationId,
        student: StudentId,
    ) -> Result<Vec<Outbound>, EngineError> {
        let (mut conv, mut ctx) = self.open_turn(conversation, student).await?;
        tracing::info!(conversation = %conversation, "abandoning active dialog");
        let result = self.dispatcher.cancel(&mut ctx, &mut conv.stack).await;
        self.close_turn(conversation, conv, ctx, result).await
    }

    async fn open_turn(
        &self,
        conversation: ConversationId,
        student: StudentId,
    ) -> Result<(ConversationState, TurnContext), EngineError> {
        let mut conv = self
            .state
            .load(&conversation)
            .await?
            .unwrap_or_default();
        let properties = std::mem::take(&mut conv.properties);
        let ctx = TurnContext::new(conversation, student, self.clock.now(), properties);
        Ok((conv, ctx))
    }

    async fn close_turn(
        &self,
        conversation: ConversationId,
        mut conv: ConversationState,
        ctx: TurnContext,
        result: Result<(), EngineError>,
    ) -> Result<Vec<Outbound>, EngineError> {
        let TurnContext {
            properties,
            outbound,
            ..
        } = ctx;
        // Abort before persisting: a failed turn must not mutate state.
        result?;
        conv.properties = properties;
        self.state.save(&conversation, &conv).await?;
        Ok(outbound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{NaiveDate, NaiveDateTime};
    use frontis_types::domain::{
        Course, CourseId, Exercise, ExerciseId, Grade, Homework, HomeworkId, Lecture, LectureId,
    };
    use frontis_types::error::RepositoryError;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    #[derive(Clone, Default)]
    struct MemStore(Arc<Mutex<HashMap<ConversationId, ConversationState>>>);

    impl StateStore for MemStore {
        async fn load(
            &self,
            conversation: &ConversationId,
        ) -> Result<Option<ConversationState>, RepositoryError> {
            Ok(self.0.lock().unwrap().get(conversation).cloned())
        }

        async fn save(
            &self,
            conversation: &ConversationId,
            state: &ConversationState,
        ) -> Result<(), RepositoryError> {
            self.0.lock().unwrap().insert(*conversation, state.clone());
            Ok(())
        }

        async fn clear(&self, conversation: &ConversationId) -> Result<(), RepositoryError> {
            self.0.lock().unwrap().remove(conversation);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct FakeRepo {
        courses: Vec<Course>,
        lectures: Vec<Lecture>,
        homework: Vec<Homework>,
        grades: Vec<Grade>,
        fail: bool,
    }

    impl DomainRepository for FakeRepo {
        async fn courses_for_student(
            &self,
            _student: StudentId,
        ) -> Result<Vec<Course>, RepositoryError> {
            if self.fail {
                return Err(RepositoryError::Connection);
            }
            Ok(self.courses.clone())
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
            Ok(self.homework.iter().filter(|h| h.lecture_id == lecture).count() as u32)
        }

        async fn grade_for(
            &self,
            _student: StudentId,
            exercise: ExerciseId,
        ) -> Result<Option<Grade>, RepositoryError> {
            Ok(self
                .grades
                .iter()
                .find(|g| g.exercise_id == exercise)
                .cloned())
        }
    }

    fn at(y: i32, mo: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn lecture(id: i64, course: i64, start: NaiveDateTime, homework_count: u32) -> Lecture {
        Lecture {
            id: LectureId(id),
            course_id: CourseId(course),
            start,
            homework_count,
        }
    }

    fn homework(id: i64, lecture: i64, exercise: i64, name: &str) -> Homework {
        Homework {
            id: HomeworkId(id),
            lecture_id: LectureId(lecture),
            exercise: Exercise {
                id: ExerciseId(exercise),
                name: name.to_string(),
                book: "Workbook B1".to_string(),
                page: 40 + exercise as u32,
                notes: None,
            },
        }
    }

    /// Fixed "now": Saturday 2024-04-20 12:00 Greek time.
    fn clock() -> FixedClock {
        FixedClock(at(2024, 4, 20, 12))
    }

    fn engine(repo: FakeRepo, store: MemStore) -> DialogEngine<FakeRepo, MemStore, FixedClock> {
        DialogEngine::new(repo, store, clock())
    }

    fn ids() -> (ConversationId, StudentId) {
        (ConversationId(Uuid::now_v7()), StudentId(Uuid::now_v7()))
    }

    fn texts(outbound: &[Outbound]) -> Vec<&str> {
        outbound
            .iter()
            .filter_map(|m| match m {
                Outbound::Text { text } => Some(text.as_str()),
                Outbound::SuggestedActions { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn cards(outbound: &[Outbound]) -> Vec<&frontis_types::message::HomeworkCard> {
        outbound
            .iter()
            .filter_map(|m| match m {
                Outbound::HomeworkCard { card } => Some(card),
                _ => None,
            })
            .collect()
    }

    fn actions(outbound: &[Outbound]) -> Vec<String> {
        outbound
            .iter()
            .rev()
            .find_map(|m| match m {
                Outbound::SuggestedActions { actions, .. } => Some(actions.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn unenrolled_student_gets_terminal_message_and_idle_stack() {
        let store = MemStore::default();
        let engine = engine(FakeRepo::default(), store.clone());
        let (conversation, student) = ids();

        let out = engine.start(conversation, student).await.unwrap();
        assert_eq!(
            texts(&out),
            vec!["Απ' ό,τι φαίνεται δεν έχεις εγγραφεί σε κάποιο μάθημα προς το παρόν."]
        );

        let state = store.load(&conversation).await.unwrap().unwrap();
        assert!(state.is_idle());
        assert!(state.properties.is_empty(), "cleanup must run on end");

        // Further input is not consumed by any dialog.
        let out = engine
            .handle_turn(conversation, student, "Ναι")
            .await
            .unwrap();
        assert_eq!(texts(&out).len(), 1);
        assert!(texts(&out)[0].contains("Δεν υπάρχει κάτι"));
    }

    /// One course, zero future homework, two past lectures with
    /// homework (17/4 with four items, 10/4 with one): the flow offers
    /// older homework, suggests both dates, and paginates 17/4 at three
    /// per page.
    fn past_only_repo() -> FakeRepo {
        FakeRepo {
            courses: vec![Course {
                id: CourseId(1),
                name: "Αγγλικά".to_string(),
            }],
            lectures: vec![
                lecture(1, 1, at(2024, 4, 10, 18), 1),
                lecture(2, 1, at(2024, 4, 17, 18), 4),
            ],
            homework: vec![
                homework(1, 1, 10, "Reading p.12"),
                homework(2, 2, 21, "Ασκήσεις 1-3"),
                homework(3, 2, 22, "Ασκήσεις 4-6"),
                homework(4, 2, 23, "Essay draft"),
                homework(5, 2, 24, "Vocabulary list"),
            ],
            grades: vec![Grade {
                exercise_id: ExerciseId(21),
                value: 8.5,
            }],
            fail: false,
        }
    }

    #[tokio::test]
    async fn past_homework_scenario_walks_to_paginated_cards() {
        let store = MemStore::default();
        let engine = engine(past_only_repo(), store.clone());
        let (conversation, student) = ids();

        // Start: no future homework, so the flow asks about older ones.
        let out = engine.start(conversation, student).await.unwrap();
        let t = texts(&out);
        assert!(t.contains(&"Δεν έχεις νέες εργασίες για αυτό το μάθημα!"));
        assert!(t.contains(&"Θα ήθελες να δεις παλαιότερες εργασίες σου;"));

        // Yes (unaccented) -> recent date suggestions, newest first.
        let out = engine
            .handle_turn(conversation, student, "ναι")
            .await
            .unwrap();
        assert_eq!(actions(&out), vec!["17/4", "10/4"]);

        // Pick 17/4 -> first page of its four homework items.
        let out = engine
            .handle_turn(conversation, student, "17/4")
            .await
            .unwrap();
        let page = cards(&out);
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].exercise, "Ασκήσεις 1-3");
        assert_eq!(page[0].grade.as_deref(), Some("8.5"));
        assert_eq!(page[1].grade.as_deref(), Some("-"));
        assert_eq!(actions(&out), vec!["Εμφάνιση 1 ακόμη", "Ολοκλήρωση"]);

        // Show more -> the single remaining item, then the other-date
        // question (no further "show more" affordance).
        let out = engine
            .handle_turn(conversation, student, "Εμφάνιση 1 ακόμη")
            .await
            .unwrap();
        let page = cards(&out);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].exercise, "Vocabulary list");
        assert!(
            texts(&out).contains(&"Θα ήθελες να δεις εργασίες για άλλη ημερομηνία;")
        );

        // Decline -> flow closes, stack empty, properties cleaned.
        let out = engine
            .handle_turn(conversation, student, "Όχι")
            .await
            .unwrap();
        assert!(texts(&out).contains(&"ΟΚ! 😊"));
        let state = store.load(&conversation).await.unwrap().unwrap();
        assert!(state.is_idle());
        assert!(state.properties.is_empty());
    }

    #[tokio::test]
    async fn pagination_shows_every_item_exactly_once() {
        let store = MemStore::default();
        let engine = engine(past_only_repo(), store.clone());
        let (conversation, student) = ids();

        engine.start(conversation, student).await.unwrap();
        engine.handle_turn(conversation, student, "ναι").await.unwrap();
        let mut seen: Vec<String> = Vec::new();

        let out = engine
            .handle_turn(conversation, student, "17/4")
            .await
            .unwrap();
        seen.extend(cards(&out).iter().map(|c| c.exercise.clone()));
        let out = engine
            .handle_turn(conversation, student, "Εμφάνιση 1 ακόμη")
            .await
            .unwrap();
        seen.extend(cards(&out).iter().map(|c| c.exercise.clone()));

        assert_eq!(
            seen,
            vec!["Ασκήσεις 1-3", "Ασκήσεις 4-6", "Essay draft", "Vocabulary list"]
        );
    }

    #[tokio::test]
    async fn unknown_date_resolves_to_the_closest_lecture() {
        let store = MemStore::default();
        let engine = engine(past_only_repo(), store.clone());
        let (conversation, student) = ids();

        engine.start(conversation, student).await.unwrap();
        engine.handle_turn(conversation, student, "ναι").await.unwrap();

        // 12/4 has no lecture; 10/4 is two days away, 17/4 five.
        let out = engine
            .handle_turn(conversation, student, "12/4")
            .await
            .unwrap();
        let t = texts(&out);
        assert!(t.contains(&"Δεν υπάρχει διάλεξη για αυτό το μάθημα στις 12 Απριλίου."));
        assert!(t.contains(&"Βρήκα όμως για την πιο κοντινή της στις 10 Απριλίου:"));
        assert_eq!(cards(&out).len(), 1);
        assert_eq!(cards(&out)[0].exercise, "Reading p.12");
    }

    #[tokio::test]
    async fn invalid_date_input_stays_in_the_retry_loop() {
        let store = MemStore::default();
        let engine = engine(past_only_repo(), store.clone());
        let (conversation, student) = ids();

        engine.start(conversation, student).await.unwrap();
        engine.handle_turn(conversation, student, "ναι").await.unwrap();

        let out = engine
            .handle_turn(conversation, student, "κάποια μέρα")
            .await
            .unwrap();
        assert!(texts(&out)[0].starts_with("Η επιθυμητή ημερομηνία"));

        // The prompt is still live; a valid date now succeeds.
        let out = engine
            .handle_turn(conversation, student, "17/4")
            .await
            .unwrap();
        assert_eq!(cards(&out).len(), 3);
    }

    #[tokio::test]
    async fn future_homework_is_announced_without_grades() {
        let mut repo = past_only_repo();
        repo.lectures.push(lecture(3, 1, at(2024, 4, 22, 18), 2));
        repo.homework.push(homework(6, 3, 30, "Listening 2A"));
        repo.homework.push(homework(7, 3, 31, "Listening 2B"));

        let store = MemStore::default();
        let engine = engine(repo, store.clone());
        let (conversation, student) = ids();

        let out = engine.start(conversation, student).await.unwrap();
        assert!(
            texts(&out)[0].contains("κοντινότερη προθεσμία") && texts(&out)[0].contains("22 Απριλίου")
        );
        let page = cards(&out);
        assert_eq!(page.len(), 2);
        assert!(page.iter().all(|c| c.grade.is_none()));
    }

    #[tokio::test]
    async fn multiple_courses_ask_which_one_first() {
        let mut repo = past_only_repo();
        repo.courses.push(Course {
            id: CourseId(2),
            name: "Μαθηματικά".to_string(),
        });

        let store = MemStore::default();
        let engine = engine(repo, store.clone());
        let (conversation, student) = ids();

        let out = engine.start(conversation, student).await.unwrap();
        assert_eq!(
            texts(&out),
            vec!["Για ποιο μάθημα θα ήθελες να δεις τις εργασίες σου;"]
        );
        assert_eq!(actions(&out), vec!["Αγγλικά", "Μαθηματικά"]);

        // Unaccented selection works; course 1 has only past homework.
        let out = engine
            .handle_turn(conversation, student, "αγγλικα")
            .await
            .unwrap();
        assert!(texts(&out).contains(&"Δεν έχεις νέες εργασίες για αυτό το μάθημα!"));
    }

    #[tokio::test]
    async fn conversation_resumes_after_engine_restart() {
        let store = MemStore::default();
        let (conversation, student) = ids();

        {
            let engine = engine(past_only_repo(), store.clone());
            engine.start(conversation, student).await.unwrap();
        }

        // A fresh engine over the same store picks up mid-dialog.
        let engine = engine(past_only_repo(), store.clone());
        let out = engine
            .handle_turn(conversation, student, "ναι")
            .await
            .unwrap();
        assert_eq!(actions(&out), vec!["17/4", "10/4"]);
    }

    #[tokio::test]
    async fn starting_again_replaces_the_active_conversation() {
        let store = MemStore::default();
        let engine = engine(past_only_repo(), store.clone());
        let (conversation, student) = ids();

        let first = engine.start(conversation, student).await.unwrap();
        let depth = store
            .load(&conversation)
            .await
            .unwrap()
            .unwrap()
            .stack
            .len();

        let second = engine.start(conversation, student).await.unwrap();
        let state = store.load(&conversation).await.unwrap().unwrap();
        assert_eq!(state.stack.len(), depth, "restart must not grow the stack");
        assert_eq!(texts(&second), texts(&first));

        // The restarted flow is live from the top.
        let out = engine
            .handle_turn(conversation, student, "ναι")
            .await
            .unwrap();
        assert_eq!(actions(&out), vec!["17/4", "10/4"]);
    }

    #[tokio::test]
    async fn abandoning_a_waiting_dialog_cleans_up() {
        let store = MemStore::default();
        let engine = engine(past_only_repo(), store.clone());
        let (conversation, student) = ids();

        engine.start(conversation, student).await.unwrap();
        engine.abandon(conversation, student).await.unwrap();

        let state = store.load(&conversation).await.unwrap().unwrap();
        assert!(state.is_idle());
        assert!(state.properties.is_empty());
    }

    #[tokio::test]
    async fn repository_failure_aborts_the_turn_without_saving() {
        let store = MemStore::default();
        let repo = FakeRepo {
            fail: true,
            ..past_only_repo()
        };
        let engine = engine(repo, store.clone());
        let (conversation, student) = ids();

        let err = engine.start(conversation, student).await.unwrap_err();
        assert!(matches!(err, EngineError::Repository(_)));
        assert!(
            store.load(&conversation).await.unwrap().is_none(),
            "a failed turn must not persist state"
        );
    }
}
