//! Dialog stack manager: owns the per-conversation frame stack and
//! routes each turn to the frame on top.
//!
//! Within one turn, outcomes are processed in a loop until a prompt
//! suspends or the stack runs empty — so a `Begin` chain, a `Replace`
//! restart, and an `End` cascade all happen synchronously inside the
//! same turn. Protocol errors (input with no waiting prompt, a resumed
//! frame whose definition no longer exists) are answered with a neutral
//! message, never propagated toward the transport.

use serde_json::Value;
use thiserror::Error;

use frontis_types::dialog::{DialogFrame, DialogId};
use frontis_types::error::RepositoryError;
use frontis_types::message::Outbound;
use frontis_types::prompt::{PromptKind, PromptRequest};

use super::prompt;
use super::waterfall::{StepInput, StepOutcome, TurnContext, WaterfallSet};

/// Reply when input arrives with no active dialog or no waiting prompt.
pub(crate) const MSG_NOTHING_ACTIVE: &str = "Δεν υπάρχει κάτι σε εξέλιξη αυτή τη στιγμή.";

/// Reply when a resumed frame references a dialog that no longer exists.
pub(crate) const MSG_CONVERSATION_RESET: &str =
    "Κάτι πήγε στραβά, ας ξεκινήσουμε από την αρχή όποτε θέλεις.";

/// Errors of the dialog engine itself. Collaborator failures abort the
/// turn; everything user-caused is handled inside the retry loop and
/// never surfaces here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown dialog: {0}")]
    UnknownDialog(DialogId),

    #[error("dialog '{dialog}' has no step {step}")]
    StepOutOfRange { dialog: DialogId, step: usize },

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("state encoding error: {0}")]
    State(#[from] serde_json::Error),
}

/// Dispatches turns over a stack of `DialogFrame`s.
///
/// Generic over the waterfall table so the machinery stays flow-agnostic
/// and tests can script their own dialogs.
pub struct DialogDispatcher<W: WaterfallSet> {
    waterfalls: W,
}

impl<W: WaterfallSet> DialogDispatcher<W> {
    pub fn new(waterfalls: W) -> Self {
        Self { waterfalls }
    }

    pub fn waterfalls(&self) -> &W {
        &self.waterfalls
    }

    /// Push a new frame and run its step 0 immediately, within the same
    /// turn, unless that step itself suspends on a prompt.
    pub async fn begin(
        &self,
        ctx: &mut TurnContext,
        stack: &mut Vec<DialogFrame>,
        dialog: DialogId,
        options: Value,
    ) -> Result<(), EngineError> {
        if self.waterfalls.step_count(&dialog).is_none() {
            return Err(EngineError::UnknownDialog(dialog));
        }
        tracing::debug!(
            conversation = %ctx.conversation,
            dialog = dialog.as_str(),
            "beginning dialog"
        );
        stack.push(DialogFrame::new(dialog, options));
        self.drive(ctx, stack, Value::Null).await
    }

    /// Feed one inbound message to the frame on top.
    ///
    /// The pending prompt validates the input: on success the step index
    /// advances and the next step runs with the result; on failure the
    /// retry prompt is re-sent and the index does not move.
    pub async fn continue_turn(
        &self,
        ctx: &mut TurnContext,
        stack: &mut Vec<DialogFrame>,
        text: &str,
    ) -> Result<(), EngineError> {
        let Some(top) = stack.last() else {
            ctx.send_text(MSG_NOTHING_ACTIVE);
            return Ok(());
        };

        if self.waterfalls.step_count(&top.dialog).is_none() {
            tracing::warn!(
                conversation = %ctx.conversation,
                dialog = top.dialog.as_str(),
                "resumed frame references an unknown dialog, resetting"
            );
            stack.clear();
            ctx.send_text(MSG_CONVERSATION_RESET);
            return Ok(());
        }

        let Some(request) = top.pending.clone() else {
            ctx.send_text(MSG_NOTHING_ACTIVE);
            return Ok(());
        };

        match prompt::resolve(&request, text, ctx.today()) {
            Some(result) => {
                let value = serde_json::to_value(&result)?;
                if let Some(top) = stack.last_mut() {
                    top.pending = None;
                    top.step += 1;
                }
                self.drive(ctx, stack, value).await
            }
            None => {
                send_prompt(ctx, &request, true);
                Ok(())
            }
        }
    }

    /// Abandon the top frame without an `End` from inside the dialog.
    ///
    /// Cleanup runs exactly as for a normal end; the parent resumes with
    /// a null result. On an empty stack this is a no-op report.
    pub async fn cancel(
        &self,
        ctx: &mut TurnContext,
        stack: &mut Vec<DialogFrame>,
    ) -> Result<(), EngineError> {
        if stack.is_empty() {
            ctx.send_text(MSG_NOTHING_ACTIVE);
            return Ok(());
        }
        self.pop_frame(ctx, stack);
        self.drive(ctx, stack, Value::Null).await
    }

    /// Drop every frame, running each dialog's cleanup, without
    /// resuming any parent. Used when a conversation restarts from the
    /// top while a dialog is still active.
    pub fn abort_all(&self, ctx: &mut TurnContext, stack: &mut Vec<DialogFrame>) {
        while !stack.is_empty() {
            self.pop_frame(ctx, stack);
        }
    }

    /// Run steps until a prompt suspends or the stack empties.
    async fn drive(
        &self,
        ctx: &mut TurnContext,
        stack: &mut Vec<DialogFrame>,
        mut carried: Value,
    ) -> Result<(), EngineError> {
        loop {
            let Some(frame) = stack.last().cloned() else {
                return Ok(());
            };

            let count = self
                .waterfalls
                .step_count(&frame.dialog)
                .ok_or_else(|| EngineError::UnknownDialog(frame.dialog.clone()))?;

            // Running past the last step ends the dialog with the
            // carried value — function-return semantics.
            if frame.step >= count {
                self.pop_frame(ctx, stack);
                continue;
            }

            let input = StepInput {
                options: frame.options.clone(),
                result: std::mem::take(&mut carried),
            };
            let outcome = self.waterfalls.run_step(ctx, &frame, input).await?;

            match outcome {
                StepOutcome::Next(value) => {
                    if let Some(top) = stack.last_mut() {
                        top.step += 1;
                    }
                    carried = value;
                }
                StepOutcome::Prompt(request) => {
                    send_prompt(ctx, &request, false);
                    if let Some(top) = stack.last_mut() {
                        top.pending = Some(request);
                    }
                    return Ok(());
                }
                StepOutcome::Begin { dialog, options } => {
                    if self.waterfalls.step_count(&dialog).is_none() {
                        return Err(EngineError::UnknownDialog(dialog));
                    }
                    // The parent resumes one step further when the child
                    // ends.
                    if let Some(top) = stack.last_mut() {
                        top.step += 1;
                    }
                    tracing::debug!(
                        conversation = %ctx.conversation,
                        dialog = dialog.as_str(),
                        "beginning child dialog"
                    );
                    stack.push(DialogFrame::new(dialog, options));
                    carried = Value::Null;
                }
                StepOutcome::Replace { dialog, options } => {
                    if self.waterfalls.step_count(&dialog).is_none() {
                        return Err(EngineError::UnknownDialog(dialog));
                    }
                    self.pop_frame(ctx, stack);
                    tracing::debug!(
                        conversation = %ctx.conversation,
                        dialog = dialog.as_str(),
                        "replacing dialog"
                    );
                    stack.push(DialogFrame::new(dialog, options));
                    carried = Value::Null;
                }
                StepOutcome::End(value) => {
                    self.pop_frame(ctx, stack);
                    carried = value;
                }
            }
        }
    }

    fn pop_frame(&self, ctx: &mut TurnContext, stack: &mut Vec<DialogFrame>) {
        if let Some(frame) = stack.pop() {
            tracing::debug!(
                conversation = %ctx.conversation,
                dialog = frame.dialog.as_str(),
                "dialog ended"
            );
            self.waterfalls.dialog_ended(ctx, &frame.dialog);
        }
    }
}

/// Emit a prompt (or its retry variant) with its quick replies.
fn send_prompt(ctx: &mut TurnContext, request: &PromptRequest, retry: bool) {
    let text = if retry {
        request.retry.clone()
    } else {
        request.prompt.clone()
    };
    let actions: Vec<String> = match &request.kind {
        PromptKind::Choice { choices } => choices.iter().map(|c| c.label.clone()).collect(),
        PromptKind::DayMonth { suggestions } => suggestions.clone(),
    };
    if actions.is_empty() {
        ctx.send_text(text);
    } else {
        ctx.send(Outbound::SuggestedActions { text, actions });
    }
}
