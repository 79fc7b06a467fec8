//! Playback controller.
//!
//! A forward-only cursor over an immutable walkthrough. Presentation layers
//! drive it with `begin` / `advance` / `reset` and read the derived view back.

use crate::error::ValidationError;
use crate::model::{
    GridCell, GridDimensions, PlaybackEvent, Problem, QuestionKind, Step, Walkthrough,
};
use crate::sequencer;
use tokio::sync::mpsc::UnboundedSender;

/// Two-phase reveal of a freshly presented step.
///
/// A step is first presented `Staged` (cells in place, no animation flags),
/// then `Animating` once the host's reveal timer fires, then `Settled` when
/// the host decides the transition is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Staged,
    Animating,
    Settled,
}

/// Handed out whenever a step is presented. Timer callbacks hold on to it so
/// that a reveal scheduled for a superseded step is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTicket {
    epoch: u64,
}

struct Session {
    walkthrough: Walkthrough,
    cursor: usize,
    phase: RevealPhase,
    complete: bool,
}

impl Session {
    fn step(&self) -> &Step {
        &self.walkthrough.steps[self.cursor]
    }
}

#[derive(Default)]
pub struct Playback {
    session: Option<Session>,
    epoch: u64,
    event_tx: Option<UnboundedSender<PlaybackEvent>>,
}

impl Playback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward every state change to `event_tx`.
    pub fn with_events(mut self, event_tx: UnboundedSender<PlaybackEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    fn emit(&self, event: PlaybackEvent) {
        if let Some(tx) = &self.event_tx {
            // A dropped receiver just means nobody is listening anymore.
            let _ = tx.send(event);
        }
    }

    fn next_ticket(&mut self) -> RevealTicket {
        self.epoch += 1;
        RevealTicket { epoch: self.epoch }
    }

    /// Build the walkthrough for `problem` and present its first step.
    pub fn begin(&mut self, problem: Problem) -> RevealTicket {
        let walkthrough = sequencer::build(&problem);
        let steps = walkthrough.steps.len();
        let complete = steps <= 1;
        self.session = Some(Session {
            walkthrough,
            cursor: 0,
            phase: RevealPhase::Staged,
            complete,
        });
        tracing::debug!(%problem, steps, "playback started");
        self.emit(PlaybackEvent::Begun { steps });
        self.next_ticket()
    }

    /// Validate digit strings and begin. Invalid input clears all state.
    pub fn begin_parsed(
        &mut self,
        dividend: &str,
        divisor: &str,
    ) -> Result<RevealTicket, ValidationError> {
        self.begin_checked(Problem::parse(dividend, divisor))
    }

    /// Validate integer operands and begin. Invalid input clears all state.
    pub fn begin_integers(
        &mut self,
        dividend: i128,
        divisor: i128,
    ) -> Result<RevealTicket, ValidationError> {
        self.begin_checked(Problem::new(dividend, divisor))
    }

    fn begin_checked(
        &mut self,
        problem: Result<Problem, ValidationError>,
    ) -> Result<RevealTicket, ValidationError> {
        match problem {
            Ok(problem) => Ok(self.begin(problem)),
            Err(e) => {
                tracing::warn!(error = %e, "rejected division problem");
                self.session = None;
                self.next_ticket();
                self.emit(PlaybackEvent::Rejected(e.to_string()));
                Err(e)
            }
        }
    }

    /// Move to the next step. Returns `None` before `begin` or at the last step.
    pub fn advance(&mut self) -> Option<RevealTicket> {
        let session = self.session.as_mut()?;
        let last = session.walkthrough.steps.len().saturating_sub(1);
        if session.cursor >= last {
            return None;
        }
        session.cursor += 1;
        session.phase = RevealPhase::Staged;
        let step = session.cursor;
        let finished = step == last;
        if finished {
            session.complete = true;
        }
        let completed = finished.then(|| {
            (
                session.walkthrough.quotient.clone(),
                session.walkthrough.remainder,
            )
        });

        tracing::debug!(step, last, "advanced");
        self.emit(PlaybackEvent::Advanced { step });
        if let Some((quotient, remainder)) = completed {
            self.emit(PlaybackEvent::Completed {
                quotient,
                remainder,
            });
        }
        Some(self.next_ticket())
    }

    /// Enable entrance animations for the presented step.
    pub fn reveal(&mut self, ticket: RevealTicket) -> bool {
        self.transition(ticket, RevealPhase::Staged, RevealPhase::Animating)
    }

    /// Turn entrance animations back off once the transition is over.
    pub fn settle(&mut self, ticket: RevealTicket) -> bool {
        self.transition(ticket, RevealPhase::Animating, RevealPhase::Settled)
    }

    fn transition(&mut self, ticket: RevealTicket, from: RevealPhase, to: RevealPhase) -> bool {
        if ticket.epoch != self.epoch {
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.phase != from {
            return false;
        }
        session.phase = to;
        let step = session.cursor;
        self.emit(match to {
            RevealPhase::Animating => PlaybackEvent::Revealed { step },
            _ => PlaybackEvent::Settled { step },
        });
        true
    }

    /// Discard the problem, the walkthrough and the cursor.
    pub fn reset(&mut self) {
        self.next_ticket();
        if self.session.take().is_some() {
            tracing::debug!("playback reset");
            self.emit(PlaybackEvent::Reset);
        }
    }

    pub fn walkthrough(&self) -> Option<&Walkthrough> {
        self.session.as_ref().map(|s| &s.walkthrough)
    }

    pub fn problem(&self) -> Option<&Problem> {
        self.walkthrough().map(|w| &w.problem)
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.session.as_ref().map(Session::step)
    }

    pub fn active_step(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.cursor)
    }

    pub fn step_count(&self) -> usize {
        self.walkthrough().map_or(0, |w| w.steps.len())
    }

    pub fn reveal_phase(&self) -> Option<RevealPhase> {
        self.session.as_ref().map(|s| s.phase)
    }

    /// Cells of the current step as they should be drawn right now.
    ///
    /// Animation flags are only kept while the step is `Animating`, and never
    /// on hidden cells.
    pub fn cells(&self) -> Vec<GridCell> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        let animating = session.phase == RevealPhase::Animating;
        session
            .step()
            .cells
            .iter()
            .map(|cell| {
                let mut cell = cell.clone();
                if !animating || cell.flags.hidden {
                    cell.flags.fade_in = false;
                    cell.flags.animate_in = false;
                }
                cell
            })
            .collect()
    }

    pub fn explanation(&self) -> &str {
        self.current_step().map_or("", |s| s.explanation.as_str())
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.walkthrough().map_or(
            GridDimensions {
                columns: 0,
                rows: 0,
            },
            |w| w.dimensions,
        )
    }

    pub fn question_kind(&self) -> Option<QuestionKind> {
        self.current_step().and_then(|s| s.question)
    }

    pub fn is_question(&self) -> bool {
        self.question_kind().is_some()
    }

    pub fn show_subtraction_lines(&self) -> bool {
        self.current_step()
            .is_some_and(|s| s.show_subtraction_lines)
    }

    pub fn is_complete(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.complete)
    }

    pub fn can_advance(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.cursor + 1 < s.walkthrough.steps.len())
    }
}
