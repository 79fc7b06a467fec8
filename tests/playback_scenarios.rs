use long_division::model::{PlaybackEvent, Problem, QuestionKind, StepKind, MAX_DIVIDEND_DIGITS};
use long_division::orchestrator::{Playback, RevealPhase};
use long_division::ValidationError;
use tokio::sync::mpsc;

fn drain(rx: &mut mpsc::UnboundedReceiver<PlaybackEvent>) -> Vec<PlaybackEvent> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

#[test]
fn eighty_four_by_three_end_to_end() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut p = Playback::new().with_events(tx);
    p.begin_integers(84, 3).unwrap();
    assert_eq!(p.explanation(), "We want to divide 84 by 3");

    let mut kinds = vec![p.current_step().unwrap().kind];
    while p.advance().is_some() {
        kinds.push(p.current_step().unwrap().kind);
    }
    assert_eq!(kinds.len(), 14);
    assert_eq!(kinds[1], StepKind::BringDown);
    assert_eq!(kinds[2], StepKind::Divide);
    assert!(p.is_complete());
    assert_eq!(p.explanation(), "The division is complete. 84 ÷ 3 = 28");

    let events = drain(&mut rx);
    assert_eq!(events.first(), Some(&PlaybackEvent::Begun { steps: 14 }));
    assert_eq!(
        events.last(),
        Some(&PlaybackEvent::Completed {
            quotient: "28".into(),
            remainder: 0
        })
    );
}

#[test]
fn remainder_is_reported() {
    let mut p = Playback::new();
    p.begin_parsed("1000", "7").unwrap();
    while p.advance().is_some() {}
    let w = p.walkthrough().unwrap();
    assert_eq!(w.quotient, "142");
    assert_eq!(w.remainder, 6);
    assert!(p.explanation().ends_with("with remainder 6"));
}

#[test]
fn inner_zero_gets_its_own_step() {
    let mut p = Playback::new();
    p.begin_integers(309, 3).unwrap();
    let w = p.walkthrough().unwrap();
    assert_eq!(w.quotient, "103");
    let zero = w
        .steps
        .iter()
        .find(|s| s.kind == StepKind::WriteZero)
        .unwrap();
    assert_eq!(zero.explanation, "0 is less than 3, so we write 0 in the quotient");
}

#[test]
fn non_positive_divisors_are_rejected() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut p = Playback::new().with_events(tx);
    p.begin_integers(84, 3).unwrap();
    drain(&mut rx);

    assert_eq!(
        p.begin_integers(84, 0).unwrap_err(),
        ValidationError::DivisorNotPositive(0)
    );
    assert_eq!(p.active_step(), None);
    assert_eq!(
        p.begin_integers(84, -1).unwrap_err(),
        ValidationError::DivisorNotPositive(-1)
    );
    assert_eq!(
        p.begin_integers(-1, 3).unwrap_err(),
        ValidationError::NegativeDividend(-1)
    );
    assert!(p.begin_parsed("12a", "3").is_err());
    assert!(p.walkthrough().is_none());
    assert!(!p.can_advance());

    let events = drain(&mut rx);
    assert_eq!(events.len(), 4);
    assert!(events
        .iter()
        .all(|e| matches!(e, PlaybackEvent::Rejected(_))));
}

#[test]
fn questions_hide_answers_until_the_next_step() {
    let mut p = Playback::new();
    p.begin_integers(84, 3).unwrap();
    while p.question_kind() != Some(QuestionKind::Multiplication) {
        p.advance().unwrap();
    }
    assert!(p.cells().iter().any(|c| c.flags.hidden));
    p.advance().unwrap();
    assert!(!p.is_question());
    assert!(p.cells().iter().all(|c| !c.flags.hidden));
}

#[test]
fn stale_tickets_do_not_move_the_new_step() {
    let mut p = Playback::new();
    let first = p.begin_integers(84, 3).unwrap();
    let second = p.advance().unwrap();
    assert!(!p.reveal(first));
    assert_eq!(p.reveal_phase(), Some(RevealPhase::Staged));
    assert!(p.reveal(second));
    assert!(p.settle(second));
    assert_eq!(p.reveal_phase(), Some(RevealPhase::Settled));
}

#[test]
fn reset_only_notifies_when_something_was_cleared() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut p = Playback::new().with_events(tx);
    p.reset();
    assert!(drain(&mut rx).is_empty());

    p.begin_integers(7, 9).unwrap();
    drain(&mut rx);
    p.reset();
    assert_eq!(drain(&mut rx), vec![PlaybackEvent::Reset]);
    assert_eq!(p.explanation(), "");
    assert!(p.advance().is_none());
}

#[test]
fn oversized_or_forged_problems_never_reach_the_engine() {
    let mut p = Playback::new();
    let long = "9".repeat(MAX_DIVIDEND_DIGITS + 1);
    assert!(matches!(
        p.begin_parsed(&long, "7"),
        Err(ValidationError::DividendTooLong { .. })
    ));
    assert!(p.walkthrough().is_none());

    assert!(serde_json::from_str::<Problem>(r#"{"dividend":"12","divisor":0}"#).is_err());
    let problem: Problem = serde_json::from_str(r#"{"dividend":"0012","divisor":5}"#).unwrap();
    p.begin(problem);
    while p.advance().is_some() {}
    let w = p.walkthrough().unwrap();
    assert_eq!((w.quotient.as_str(), w.remainder), ("2", 2));
}
