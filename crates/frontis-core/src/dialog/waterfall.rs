//! Waterfall step contract: inputs, outcomes, and the per-turn context.
//!
//! A step is one unit of a dialog's fixed sequence. It receives the
//! frame's begin-time options plus the previous result (a step value, a
//! resolved prompt reply, or a returned child-dialog result) and answers
//! with a tagged outcome the dispatcher acts on. The only state a step
//! may keep between turns is what it writes into the property bag.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use frontis_types::dialog::{DialogFrame, DialogId, PropertyBag};
use frontis_types::domain::{ConversationId, StudentId};
use frontis_types::message::Outbound;
use frontis_types::prompt::{PromptRequest, PromptResult};

use super::stack::EngineError;

/// What a step sees when it runs.
#[derive(Debug, Clone)]
pub struct StepInput {
    /// Options the frame was begun with.
    pub options: Value,
    /// The previous step's `Next` value, the resolved `PromptResult`, or
    /// the result a child dialog ended with. Null on a dialog's first
    /// step.
    pub result: Value,
}

impl StepInput {
    /// Decode the result as a prompt reply, if it is one.
    pub fn prompt_result(&self) -> Option<PromptResult> {
        serde_json::from_value(self.result.clone()).ok()
    }
}

/// Tagged union of everything a step can decide.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// Advance to the next step in the same turn, passing a value.
    Next(Value),
    /// Suspend the frame on a prompt; the step index does not move until
    /// the reply validates.
    Prompt(PromptRequest),
    /// Push a child dialog; the parent resumes with its result.
    Begin { dialog: DialogId, options: Value },
    /// Pop this frame and push a replacement at the same depth.
    Replace { dialog: DialogId, options: Value },
    /// Pop this frame, returning a value to the parent.
    End(Value),
}

/// Everything one turn carries: identity, the clock reading, the
/// persisted property bag, and the outbound message buffer.
#[derive(Debug)]
pub struct TurnContext {
    pub conversation: ConversationId,
    pub student: StudentId,
    /// Current time in the domain reference timezone, fixed for the
    /// whole turn.
    pub now: NaiveDateTime,
    pub properties: PropertyBag,
    pub outbound: Vec<Outbound>,
}

impl TurnContext {
    pub fn new(
        conversation: ConversationId,
        student: StudentId,
        now: NaiveDateTime,
        properties: PropertyBag,
    ) -> Self {
        Self {
            conversation,
            student,
            now,
            properties,
            outbound: Vec::new(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    pub fn send(&mut self, message: Outbound) {
        self.outbound.push(message);
    }

    pub fn send_text(&mut self, text: impl Into<String>) {
        self.outbound.push(Outbound::text(text));
    }
}

/// A table of waterfall definitions plus the code that runs their steps.
///
/// The dispatcher stays flow-agnostic: it only needs the step count per
/// dialog id, a way to run one step, and a cleanup hook fired whenever a
/// frame leaves the stack — End, Replace and cancellation alike.
pub trait WaterfallSet: Send + Sync {
    /// Number of steps of the named dialog; None if the definition does
    /// not exist (any more).
    fn step_count(&self, dialog: &DialogId) -> Option<usize>;

    /// Run the step the frame's index points at.
    fn run_step(
        &self,
        ctx: &mut TurnContext,
        frame: &DialogFrame,
        input: StepInput,
    ) -> impl std::future::Future<Output = Result<StepOutcome, EngineError>> + Send;

    /// A frame of this dialog left the stack; delete the properties it
    /// owns so they cannot leak into a different flow.
    fn dialog_ended(&self, ctx: &mut TurnContext, dialog: &DialogId);
}
