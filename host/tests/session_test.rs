// Session shell tests: engine and frame loop driven together on a manual clock
use std::time::Duration;

use crash_core::{FixedCrashPoint, ManualClock, Phase, Surface};
use host::{AppConfig, RoundLog, Session, StepReport, SvgSurface};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn mount(crash_point: f64, surface: SvgSurface) -> Session<ManualClock, SvgSurface> {
    Session::mount(
        &AppConfig::default(),
        Box::new(FixedCrashPoint(crash_point)),
        ManualClock::new(),
        surface,
    )
    .expect("default config mounts")
}

fn advance_until_crash(session: &mut Session<ManualClock, SvgSurface>) {
    for _ in 0..400 {
        session.advance_by(ms(50));
        if session.snapshot().phase == Phase::Crashed {
            return;
        }
    }
    panic!("round never crashed");
}

#[test]
fn test_mount_draws_first_frame() {
    let session = mount(2.0, SvgSurface::new(800.0, 450.0));
    assert!(session.is_mounted());
    assert_eq!(session.frames_drawn(), 1, "first frame drawn on mount");
    let doc = session.surface().document().expect("svg document");
    assert!(doc.starts_with("<svg"), "document is svg");
    assert!(doc.contains("1.00x"), "label shows the starting multiplier");
    assert_eq!(session.pending_callbacks(), 2, "round-start timer plus next frame");
}

#[test]
fn test_round_plays_out_and_frames_follow() {
    let mut session = mount(2.0, SvgSurface::new(800.0, 450.0));

    session.advance_by(ms(3000));
    assert_eq!(session.snapshot().phase, Phase::Running);
    let frames_before = session.frames_drawn();
    assert!(frames_before >= 3000 / 16, "frames keep running while waiting");

    advance_until_crash(&mut session);
    let snap = session.snapshot();
    assert_eq!(snap.multiplier, 2.0, "crash value displayed");
    assert_eq!(snap.history.last(), Some(&2.0));

    session.advance_by(ms(20));
    let doc = session.surface().document().unwrap();
    assert!(doc.contains("2.00x"), "frame after the crash shows the crash value");
    assert!(doc.contains("rgba(255, 71, 87, 1)"), "crashed curve is red");

    session.advance_by(ms(3000));
    let next = session.snapshot();
    assert_eq!(next.phase, Phase::Waiting, "next round after the post-crash delay");
    assert_eq!(next.round_id, 2);
}

#[test]
fn test_unmount_cancels_everything() {
    let mut session = mount(2.0, SvgSurface::new(800.0, 450.0));
    session.advance_by(ms(3500));
    assert_eq!(session.snapshot().phase, Phase::Running);

    session.unmount();
    assert!(!session.is_mounted());
    assert_eq!(session.pending_callbacks(), 0, "no timers or frame callbacks left");
    assert_eq!(session.next_wakeup(), None);

    let frozen = session.snapshot();
    let frames = session.frames_drawn();
    session.advance_by(ms(30_000));
    assert_eq!(session.step(), StepReport::default(), "step is inert after unmount");
    assert_eq!(session.snapshot(), frozen, "engine state unchanged");
    assert_eq!(session.frames_drawn(), frames, "no frames after unmount");
    assert!(session.place_bet("late", 1.0).is_err());

    session.unmount();
}

#[test]
fn test_detached_surface_is_skipped() {
    let mut session = mount(2.0, SvgSurface::default());
    session.advance_by(ms(3200));
    assert!(session.surface().document().is_none(), "nothing drawn without a surface");
    assert_eq!(session.snapshot().phase, Phase::Running, "engine unaffected");
    assert_eq!(session.frames_drawn(), 0, "skipped frames are not counted as drawn");
    assert!(session.frames_scheduled() >= 3200 / 16, "frame callbacks still came due");

    session.resize(320.0, 200.0);
    session.advance_by(ms(20));
    let doc = session.surface().document().expect("drawn once the surface has a size");
    assert!(doc.contains(r#"width="320""#));
    assert_eq!(session.frames_drawn(), 1);
}

#[test]
fn test_resize_changes_next_frame() {
    let mut session = mount(2.0, SvgSurface::new(800.0, 450.0));
    session.resize(400.0, 300.0);
    assert_eq!(session.surface().size(), Some((400.0, 300.0)));
    session.advance_by(ms(20));
    let doc = session.surface().document().unwrap();
    assert!(doc.contains(r#"viewBox="0 0 400 300""#), "frame uses the new size");
}

#[test]
fn test_round_log_records_bets() {
    let clock = ManualClock::new();
    let waiter = clock.clone();
    let mut session = Session::mount(
        &AppConfig::default(),
        Box::new(FixedCrashPoint(1.5)),
        clock,
        SvgSurface::new(640.0, 360.0),
    )
    .unwrap();
    session.place_bet("p1", 10.0).unwrap();

    let mut log = RoundLog::new();
    let mut changes = Vec::new();
    session.run_until(
        |s| {
            let snap = s.snapshot();
            if let Some(change) = log.observe(&snap, s.now()) {
                changes.push((change.round_id, change.to));
            }
            log.completed() >= 2
        },
        |d| waiter.advance(d),
    );

    assert_eq!(
        changes,
        vec![
            (1, Phase::Waiting),
            (1, Phase::Running),
            (1, Phase::Crashed),
            (2, Phase::Waiting),
            (2, Phase::Running),
            (2, Phase::Crashed),
        ]
    );

    let first = &log.records()[0];
    assert_eq!(first.crash_point, 1.5);
    assert_eq!(first.bets_lost, 1);
    assert_eq!(first.bets_won, 0);
    assert_eq!(first.net_profit, -10.0);
    // 1.5x takes about 0.86s at default growth
    assert!((700..=1100).contains(&first.running_ms), "ran {}ms", first.running_ms);
    assert_eq!(first.running_ms % 50, 0, "crash lands on a tick");

    let second = &log.records()[1];
    assert_eq!(second.bets_lost, 0, "bets do not carry over");
    assert_eq!(second.net_profit, 0.0);
}
