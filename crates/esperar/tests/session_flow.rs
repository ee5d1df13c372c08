//! Integration scenarios over full page-lifecycle signal sequences.
//!
//! Each test walks one realistic browsing flow end to end through a
//! [`PageSession`] on a manual clock.

#![allow(clippy::unwrap_used)]

use esperar::{
    Calculator, ClickTarget, Key, KeyOutcome, MockTransport, PageClock, PageSession, PageSignal,
    Request, Response, SessionConfig, TrackedTransport, TrackerConfig, Transport, ERROR_INDICATOR,
};
use std::sync::Arc;

fn session_at_zero() -> (esperar::SharedClock, PageSession) {
    init_tracing();
    let clock = PageClock::manual(0);
    let session = PageSession::with_clock(Arc::clone(&clock), SessionConfig::default());
    (clock, session)
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

#[test]
fn slow_form_submission_shows_overlay_until_next_load() {
    let (clock, mut session) = session_at_zero();

    session.handle_signal(&PageSignal::FormSubmit);
    clock.advance_ms(500);
    session.poll();
    assert!(
        !session.tracker().overlay_visible(),
        "overlay must not flash before the grace period"
    );

    clock.advance_ms(500);
    session.poll();
    assert!(session.tracker().overlay_visible());

    // The next page instance fires its load signal
    session.handle_signal(&PageSignal::Loaded);
    assert!(!session.tracker().overlay_visible());
    assert_eq!(session.tracker().active_operations(), 0);
}

#[test]
fn fast_interaction_never_flashes_overlay() {
    let (clock, mut session) = session_at_zero();
    let tracker = session.tracker();

    session.handle_signal(&PageSignal::Click(ClickTarget::link("/detalhes/7")));
    clock.advance_ms(300);
    tracker.operation_ended(); // the fetch cycle finished quickly

    clock.advance_ms(5_000);
    session.poll();
    assert!(!tracker.overlay_visible());
}

#[test]
fn overlapping_requests_keep_overlay_until_last_ends() {
    let (clock, mut session) = session_at_zero();
    let tracker = session.tracker();

    session.handle_signal(&PageSignal::FormSubmit);
    clock.advance_ms(400);
    tracker.operation_started(); // a second request while the first runs

    clock.advance_ms(1_000);
    session.poll();
    assert!(tracker.overlay_visible());

    tracker.operation_ended();
    assert!(
        tracker.overlay_visible(),
        "one of two operations ending must not hide the overlay"
    );

    tracker.operation_ended();
    assert!(!tracker.overlay_visible());
}

#[test]
fn back_button_bfcache_restore_unsticks_overlay() {
    let (clock, mut session) = session_at_zero();

    // Navigation away left a counted operation with no end signal
    session.handle_signal(&PageSignal::Click(ClickTarget::link("/outra-pagina")));
    clock.advance_ms(1_000);
    session.poll();
    assert!(session.tracker().overlay_visible());

    // User presses back; the page returns from the history cache
    session.handle_signal(&PageSignal::PageShow { persisted: true });
    assert!(!session.tracker().overlay_visible());
    assert_eq!(session.tracker().active_operations(), 0);

    // And nothing stale fires later
    clock.advance_ms(10_000);
    session.poll();
    assert!(!session.tracker().overlay_visible());
}

#[test]
fn cancelled_navigation_recovers_full_state() {
    let (clock, mut session) = session_at_zero();

    session.handle_signal(&PageSignal::Click(ClickTarget::link("/download-grande")));
    session.handle_signal(&PageSignal::BeforeUnload);

    // While navigating away the grace deadline must not surface the overlay
    clock.advance_ms(1_500);
    session.poll();
    assert!(!session.tracker().overlay_visible());

    // The user cancelled; the page becomes visible again without unloading
    session.handle_signal(&PageSignal::VisibilityChanged { visible: true });
    assert_eq!(session.tracker().active_operations(), 0);
    assert!(!session.tracker().is_navigating_away());
}

#[test]
fn tracked_and_silent_requests_through_the_middleware() {
    let (clock, session) = session_at_zero();
    let tracker = session.tracker();

    let mut inner = MockTransport::new();
    inner.enqueue_ok(Response::ok().with_body(b"[]".to_vec()));
    inner.enqueue_error("gateway timeout");
    let mut transport = TrackedTransport::new(inner, tracker.clone());

    // Success path: bracketed, counter back to zero
    let response = transport.execute(&Request::get("/api/demandas")).unwrap();
    assert!(response.is_success());
    assert_eq!(tracker.active_operations(), 0);

    // Failure path: the error surfaces unchanged, the counter still drains
    let failure = transport.execute(&Request::post("/api/demandas"));
    assert!(failure.is_err());
    assert_eq!(tracker.active_operations(), 0);

    // A background poll marked silent leaves the tracker untouched
    transport
        .execute(&Request::get("/api/notificacoes").silent())
        .unwrap();
    assert_eq!(tracker.pending_show_at(), None);

    clock.advance_ms(60_000);
    tracker.poll();
    assert!(!tracker.overlay_visible());
}

#[test]
fn grace_period_is_configurable() {
    let clock = PageClock::manual(0);
    let config = SessionConfig {
        tracker: TrackerConfig::new().with_grace_period(2_100),
        ..SessionConfig::default()
    };
    let mut session = PageSession::with_clock(Arc::clone(&clock), config);

    session.handle_signal(&PageSignal::FormSubmit);
    clock.advance_ms(2_099);
    session.poll();
    assert!(!session.tracker().overlay_visible());

    clock.advance_ms(1);
    session.poll();
    assert!(session.tracker().overlay_visible());
}

#[test]
fn calculator_keyboard_flow_with_error_recovery() {
    let (clock, mut session) = session_at_zero();
    session.calculator_mut().open();

    for key in ['2', '+', '3', '*', '4'] {
        assert_eq!(session.handle_key(Key::Char(key)), KeyOutcome::Handled);
    }
    session.handle_key(Key::Enter);
    assert_eq!(session.calculator().current(), "14");
    assert_eq!(session.calculator().last_expression(), "2+3*4");

    // A trailing operator is rejected, shown, then reset after the delay
    session.handle_key(Key::Char('+'));
    session.handle_key(Key::Enter);
    assert_eq!(session.calculator().current(), ERROR_INDICATOR);

    clock.advance_ms(1_500);
    session.poll();
    assert_eq!(session.calculator().current(), "0");

    // Escape clears, unrelated keys fall through
    session.handle_key(Key::Char('9'));
    assert_eq!(session.handle_key(Key::Char('x')), KeyOutcome::Ignored);
    session.handle_key(Key::Escape);
    assert_eq!(session.calculator().current(), "0");
}

#[test]
fn calculator_keyboard_closed_surface_ignores_keys() {
    let (_clock, mut session) = session_at_zero();
    assert_eq!(session.handle_key(Key::Char('5')), KeyOutcome::Ignored);
    assert_eq!(session.handle_key(Key::Enter), KeyOutcome::Ignored);
    assert_eq!(session.calculator().current(), "0");
}

#[test]
fn standalone_calculator_division_rounding() {
    let clock = PageClock::manual(0);
    let mut calc = Calculator::new(clock);
    for token in ["1", "0", "/", "4"] {
        calc.append(token);
    }
    calc.evaluate();
    assert_eq!(calc.current(), "2.5");
}

#[test]
fn manual_bracketing_from_another_page_script() {
    let (clock, session) = session_at_zero();
    let tracker = session.tracker();

    // A script brackets an operation the interceptors cannot see
    tracker.operation_started();
    clock.advance_ms(1_000);
    tracker.poll();
    assert!(tracker.overlay_visible());

    tracker.operation_ended();
    assert!(!tracker.overlay_visible());

    // Or drives the overlay directly
    tracker.show_loading();
    assert!(tracker.overlay_visible());
    tracker.hide_loading();
    assert!(!tracker.overlay_visible());
}
