use super::*;

fn progressive() -> LeadGate {
    LeadGate::new(GatePolicy::progressive())
}

fn send(gate: &mut LeadGate) -> GateState {
    gate.apply(GateEvent::MessageCounted).unwrap()
}

// =============================================================================
// progressive policy
// =============================================================================

#[test]
fn progressive_starts_open() {
    let gate = progressive();
    assert_eq!(gate.state(), GateState::Open);
    assert!(gate.input_enabled());
    assert_eq!(gate.message_count(), 0);
}

#[test]
fn first_message_stays_open() {
    let mut gate = progressive();
    assert_eq!(send(&mut gate), GateState::Open);
    assert_eq!(gate.message_count(), 1);
}

#[test]
fn second_message_prompts_skippable() {
    let mut gate = progressive();
    send(&mut gate);
    assert_eq!(send(&mut gate), GateState::PromptPending { mandatory: false });
    assert!(gate.input_enabled());
}

#[test]
fn skip_increments_and_reopens() {
    let mut gate = progressive();
    send(&mut gate);
    send(&mut gate);
    assert!(gate.mark_displayed());
    assert_eq!(gate.apply(GateEvent::Skipped).unwrap(), GateState::Open);
    assert_eq!(gate.skip_count(), 1);
    assert!(!gate.prompt_shown());
}

#[test]
fn fourth_message_after_skip_is_mandatory() {
    let mut gate = progressive();
    send(&mut gate);
    send(&mut gate);
    gate.apply(GateEvent::Skipped).unwrap();
    assert_eq!(send(&mut gate), GateState::Open);
    assert_eq!(send(&mut gate), GateState::PromptPending { mandatory: true });
    assert!(!gate.input_enabled());
}

#[test]
fn mandatory_prompt_cannot_be_skipped_or_bypassed() {
    let mut gate = progressive();
    send(&mut gate);
    send(&mut gate);
    gate.apply(GateEvent::Skipped).unwrap();
    send(&mut gate);
    send(&mut gate);

    assert_eq!(gate.apply(GateEvent::Skipped), Err(GateError::NotSkippable));
    assert_eq!(gate.apply(GateEvent::MessageCounted), Err(GateError::InputLocked));
    assert_eq!(gate.message_count(), 4);
}

#[test]
fn ignoring_skippable_prompt_keeps_it_pending() {
    let mut gate = progressive();
    send(&mut gate);
    send(&mut gate);
    assert_eq!(send(&mut gate), GateState::PromptPending { mandatory: false });
    assert_eq!(send(&mut gate), GateState::PromptPending { mandatory: false });
    assert_eq!(gate.message_count(), 4);
}

#[test]
fn submit_from_any_pending_captures() {
    let mut gate = progressive();
    send(&mut gate);
    send(&mut gate);
    assert_eq!(gate.apply(GateEvent::Submitted).unwrap(), GateState::Captured);
    assert!(gate.input_enabled());

    let mut gate = progressive();
    send(&mut gate);
    send(&mut gate);
    gate.apply(GateEvent::Skipped).unwrap();
    send(&mut gate);
    send(&mut gate);
    assert_eq!(gate.apply(GateEvent::Submitted).unwrap(), GateState::Captured);
    assert!(gate.input_enabled());
}

#[test]
fn captured_absorbs_everything() {
    let mut gate = progressive();
    send(&mut gate);
    send(&mut gate);
    gate.apply(GateEvent::Submitted).unwrap();

    for _ in 0..10 {
        assert_eq!(send(&mut gate), GateState::Captured);
    }
    assert_eq!(gate.message_count(), 12);
    assert_eq!(gate.apply(GateEvent::Skipped), Err(GateError::AlreadyCaptured));
    assert_eq!(gate.apply(GateEvent::Submitted), Err(GateError::AlreadyCaptured));
    assert!(!gate.mark_displayed());
}

#[test]
fn skip_or_submit_without_prompt_errors() {
    let mut gate = progressive();
    assert_eq!(gate.apply(GateEvent::Skipped), Err(GateError::NoPrompt));
    assert_eq!(gate.apply(GateEvent::Submitted), Err(GateError::NoPrompt));
}

#[test]
fn failed_event_leaves_gate_untouched() {
    let mut gate = progressive();
    send(&mut gate);
    let _ = gate.apply(GateEvent::Skipped);
    assert_eq!(gate.state(), GateState::Open);
    assert_eq!(gate.skip_count(), 0);
    assert_eq!(gate.message_count(), 1);
}

#[test]
fn mark_displayed_only_once() {
    let mut gate = progressive();
    assert!(!gate.mark_displayed());
    send(&mut gate);
    send(&mut gate);
    assert!(gate.mark_displayed());
    assert!(!gate.mark_displayed());
    assert!(gate.prompt_shown());
}

#[test]
fn custom_thresholds_are_honoured() {
    let mut gate = LeadGate::new(GatePolicy::Progressive { prompt_at: 1, mandatory_at: 3 });
    assert_eq!(send(&mut gate), GateState::PromptPending { mandatory: false });
    gate.apply(GateEvent::Skipped).unwrap();
    assert_eq!(send(&mut gate), GateState::Open);
    assert_eq!(send(&mut gate), GateState::PromptPending { mandatory: true });
}

// =============================================================================
// gate-first policy
// =============================================================================

#[test]
fn gate_first_starts_locked() {
    let gate = LeadGate::new(GatePolicy::GateFirst);
    assert_eq!(gate.state(), GateState::PromptPending { mandatory: true });
    assert!(!gate.input_enabled());
    assert!(!gate.prompt_shown());
}

#[test]
fn gate_first_unlocks_on_submit_and_never_prompts_again() {
    let mut gate = LeadGate::new(GatePolicy::GateFirst);
    assert!(gate.mark_displayed());
    gate.apply(GateEvent::Submitted).unwrap();
    assert!(gate.input_enabled());
    for _ in 0..5 {
        assert_eq!(send(&mut gate), GateState::Captured);
    }
}

// =============================================================================
// step is pure
// =============================================================================

#[test]
fn step_does_not_need_a_gate() {
    let (state, counters) = step(
        GatePolicy::progressive(),
        GateState::Open,
        GateCounters { messages: 1, skips: 0 },
        GateEvent::MessageCounted,
    )
    .unwrap();
    assert_eq!(state, GateState::PromptPending { mandatory: false });
    assert_eq!(counters, GateCounters { messages: 2, skips: 0 });
}
