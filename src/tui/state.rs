use long_division::model::{PlaybackConfig, PlaybackEvent, Problem};
use long_division::orchestrator::{Playback, RevealTicket};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;

/// Host-side timers for the staged reveal of the presented step.
#[derive(Debug, Clone, Copy)]
pub struct PendingReveal {
    pub ticket: RevealTicket,
    pub reveal_at: Option<Instant>,
    pub settle_at: Option<Instant>,
}

pub struct UiState {
    pub playback: Playback,
    pub problem: Problem,
    pub config: PlaybackConfig,
    pub events: UnboundedReceiver<PlaybackEvent>,
    pub pending: Option<PendingReveal>,
    pub show_help: bool,
    pub info: String,
}

impl UiState {
    pub fn new(problem: Problem, config: PlaybackConfig) -> Self {
        let (tx, events) = tokio::sync::mpsc::unbounded_channel();
        Self {
            playback: Playback::new().with_events(tx),
            problem,
            config,
            events,
            pending: None,
            show_help: false,
            info: String::new(),
        }
    }

    /// Start (or restart) the walkthrough from its first step.
    pub fn restart(&mut self, now: Instant) {
        let ticket = self.playback.begin(self.problem.clone());
        self.schedule(ticket, now);
    }

    pub fn advance(&mut self, now: Instant) {
        if let Some(ticket) = self.playback.advance() {
            self.schedule(ticket, now);
        }
    }

    pub fn reset(&mut self) {
        self.playback.reset();
        self.pending = None;
    }

    fn schedule(&mut self, ticket: RevealTicket, now: Instant) {
        self.pending = Some(PendingReveal {
            ticket,
            reveal_at: Some(now + self.config.reveal_delay),
            settle_at: None,
        });
    }

    /// Fire any reveal/settle timer that is due.
    pub fn tick(&mut self, now: Instant) {
        let Some(mut pending) = self.pending else {
            return;
        };
        if pending.reveal_at.is_some_and(|at| now >= at) {
            pending.reveal_at = None;
            if self.playback.reveal(pending.ticket) {
                pending.settle_at = Some(now + self.config.animation_duration);
            }
        }
        if pending.settle_at.is_some_and(|at| now >= at) {
            pending.settle_at = None;
            self.playback.settle(pending.ticket);
        }
        self.pending = (pending.reveal_at.is_some() || pending.settle_at.is_some()).then_some(pending);
    }

    /// Time until the next timer is due, capped at `max`.
    pub fn next_deadline(&self, now: Instant, max: Duration) -> Duration {
        self.pending
            .and_then(|p| p.reveal_at.or(p.settle_at))
            .map(|at| at.saturating_duration_since(now).min(max))
            .unwrap_or(max)
    }

    /// Drain controller events into the status line.
    pub fn drain_events(&mut self) {
        while let Ok(ev) = self.events.try_recv() {
            match ev {
                PlaybackEvent::Begun { steps } => {
                    self.info = format!("{}: {steps} steps", self.problem);
                }
                PlaybackEvent::Completed {
                    quotient,
                    remainder,
                } => {
                    self.info = if remainder > 0 {
                        format!("Done: {quotient} remainder {remainder}. Press r to restart.")
                    } else {
                        format!("Done: {quotient}. Press r to restart.")
                    };
                }
                PlaybackEvent::Reset => {
                    self.info = "Cleared. Press r to start again.".into();
                }
                PlaybackEvent::Rejected(msg) => {
                    self.info = format!("Rejected: {msg}");
                }
                PlaybackEvent::Advanced { .. }
                | PlaybackEvent::Revealed { .. }
                | PlaybackEvent::Settled { .. } => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use long_division::orchestrator::RevealPhase;

    fn state() -> UiState {
        let config = PlaybackConfig {
            reveal_delay: Duration::from_millis(50),
            animation_duration: Duration::from_millis(400),
            step_delay: Duration::ZERO,
        };
        UiState::new(Problem::new(84, 3).unwrap(), config)
    }

    #[test]
    fn timers_drive_reveal_then_settle() {
        let mut s = state();
        let t0 = Instant::now();
        s.restart(t0);
        assert_eq!(s.playback.reveal_phase(), Some(RevealPhase::Staged));

        s.tick(t0 + Duration::from_millis(10));
        assert_eq!(s.playback.reveal_phase(), Some(RevealPhase::Staged));

        let t1 = t0 + Duration::from_millis(60);
        s.tick(t1);
        assert_eq!(s.playback.reveal_phase(), Some(RevealPhase::Animating));

        s.tick(t1 + Duration::from_millis(500));
        assert_eq!(s.playback.reveal_phase(), Some(RevealPhase::Settled));
        assert!(s.pending.is_none());
    }

    #[test]
    fn advancing_supersedes_pending_reveal() {
        let mut s = state();
        let t0 = Instant::now();
        s.restart(t0);
        s.advance(t0 + Duration::from_millis(1));
        assert_eq!(s.playback.active_step(), Some(1));
        s.tick(t0 + Duration::from_millis(100));
        assert_eq!(s.playback.reveal_phase(), Some(RevealPhase::Animating));
    }

    #[test]
    fn completion_updates_status() {
        let mut s = state();
        let now = Instant::now();
        s.restart(now);
        while s.playback.can_advance() {
            s.advance(now);
        }
        s.drain_events();
        assert!(s.info.starts_with("Done: 28."), "{}", s.info);
        s.reset();
        s.drain_events();
        assert!(s.info.starts_with("Cleared"));
        assert_eq!(s.playback.active_step(), None);
    }
}
