use super::*;
use crate::test_support::TestPosition;
use engine_sdk::{EngineDescriptor, EngineError, EngineKey};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn register<F>(registry: &mut Registry<TestPosition>, key: &str, engine: F)
where
    F: Fn(&TestPosition) -> Result<u8, EngineError> + Send + Sync + 'static,
{
    registry
        .register(EngineDescriptor::new(EngineKey::new(key).unwrap(), key, engine))
        .unwrap();
}

fn dispatcher() -> Dispatcher<TestPosition> {
    let mut registry = Registry::new();
    register(&mut registry, "always_last", |pos| {
        pos.legal.last().copied().ok_or(EngineError::NoLegalMove)
    });
    register(&mut registry, "illegal", |_| Ok(99));
    register(&mut registry, "errors", |_| Err(EngineError::Failed("gave up".into())));
    register(&mut registry, "panics", |_| panic!("index out of bounds"));
    Dispatcher::new(registry)
}

#[test]
fn legal_move_is_honored() {
    let pos = TestPosition::new(&[1, 2, 3], &[2]);

    let outcome = dispatcher().select_move(&pos, "always_last").unwrap();

    assert_eq!(
        outcome,
        DispatchOutcome {
            requested_key: "always_last".into(),
            used_key: "always_last".into(),
            mv: 3,
            fell_back: false,
            fallback_reason: None,
        }
    );
}

#[test]
fn unknown_key_falls_back() {
    let pos = TestPosition::new(&[1, 2, 3], &[]);

    let outcome = dispatcher().select_move(&pos, "missing").unwrap();

    assert!(outcome.fell_back);
    assert!(pos.legal.contains(&outcome.mv));
    assert_eq!(outcome.requested_key, "missing");
    assert_eq!(outcome.used_key, "random_capture");
    assert_eq!(outcome.fallback_reason, Some(FallbackReason::UnknownEngine));
}

#[test]
fn illegal_move_falls_back_to_a_capture() {
    let pos = TestPosition::new(&[1, 2, 3, 4], &[4]);
    let dispatcher = dispatcher();

    for seed in 0..20 {
        let outcome = dispatcher
            .select_move_with_rng(&pos, "illegal", &mut StdRng::seed_from_u64(seed))
            .unwrap();
        assert!(outcome.fell_back);
        assert_eq!(outcome.mv, 4);
        assert_eq!(
            outcome.fallback_reason,
            Some(FallbackReason::IllegalMove("99".into()))
        );
    }
}

#[test]
fn engine_error_falls_back() {
    let pos = TestPosition::new(&[5, 6], &[]);

    let outcome = dispatcher().select_move(&pos, "errors").unwrap();

    assert!(outcome.fell_back);
    assert!(pos.legal.contains(&outcome.mv));
    assert_eq!(
        outcome.fallback_reason,
        Some(FallbackReason::EngineError("engine failed: gave up".into()))
    );
}

#[test]
fn panicking_engine_falls_back() {
    let pos = TestPosition::new(&[5, 6, 7], &[6]);

    let outcome = dispatcher().select_move(&pos, "panics").unwrap();

    assert!(outcome.fell_back);
    assert_eq!(outcome.mv, 6);
    assert_eq!(
        outcome.fallback_reason.map(|r| r.kind()),
        Some("panicked")
    );
}

#[test]
fn slow_engine_falls_back_when_budget_is_set() {
    let mut registry = Registry::new();
    register(&mut registry, "sleepy", |pos| {
        thread::sleep(Duration::from_millis(500));
        Ok(pos.legal[0])
    });
    let config = DispatchConfig {
        time_budget: Some(Duration::from_millis(20)),
    };
    let dispatcher = Dispatcher::with_config(registry, config);
    let pos = TestPosition::new(&[1, 2], &[2]);

    let outcome = dispatcher.select_move(&pos, "sleepy").unwrap();

    assert!(outcome.fell_back);
    assert_eq!(outcome.mv, 2);
    assert_eq!(
        outcome.fallback_reason,
        Some(FallbackReason::TimedOut(Duration::from_millis(20)))
    );
}

#[test]
fn hung_engine_is_not_restarted_while_its_worker_runs() {
    let started = Arc::new(AtomicUsize::new(0));
    let release = Arc::new(AtomicBool::new(false));
    let mut registry = Registry::new();
    {
        let (started, release) = (Arc::clone(&started), Arc::clone(&release));
        register(&mut registry, "hung", move |pos| {
            started.fetch_add(1, Ordering::SeqCst);
            while !release.load(Ordering::SeqCst) {
                std::hint::spin_loop();
            }
            Ok(pos.legal[0])
        });
    }
    let dispatcher = Dispatcher::with_config(
        registry,
        DispatchConfig {
            time_budget: Some(Duration::from_millis(5)),
        },
    );
    let pos = TestPosition::new(&[1, 2, 3], &[3]);

    for _ in 0..40 {
        let outcome = dispatcher.select_move(&pos, "hung").unwrap();
        assert!(outcome.fell_back);
        assert_eq!(outcome.mv, 3);
        assert_eq!(outcome.fallback_reason.map(|r| r.kind()), Some("timed_out"));
    }
    let deadline = Instant::now() + Duration::from_secs(5);
    while started.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(started.load(Ordering::SeqCst), 1, "only one worker may spin");
    assert!(dispatcher.is_engine_busy("hung"));
    assert!(!dispatcher.is_engine_busy("random_capture"));

    release.store(true, Ordering::SeqCst);
    while dispatcher.is_engine_busy("hung") && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    assert!(!dispatcher.is_engine_busy("hung"));
}

#[test]
fn terminal_position_is_reported_not_masked() {
    let pos = TestPosition::terminal();
    let dispatcher = dispatcher();

    assert_eq!(
        dispatcher.select_move(&pos, "always_last"),
        Err(DispatchError::NoLegalMove)
    );
    assert_eq!(
        dispatcher.select_move(&pos, "missing"),
        Err(DispatchError::NoLegalMove)
    );
}

#[test]
fn fallback_key_can_be_requested_directly() {
    let pos = TestPosition::new(&[1, 2, 3], &[1]);

    let outcome = dispatcher().select_move(&pos, "random_capture").unwrap();

    assert!(!outcome.fell_back);
    assert_eq!(outcome.mv, 1);
    assert_eq!(outcome.used_key, "random_capture");
}

#[test]
fn concurrent_games_share_one_dispatcher() {
    let dispatcher = Arc::new(dispatcher());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || {
                let pos = TestPosition::new(&[i, i + 1], &[]);
                let key = if i % 2 == 0 { "always_last" } else { "illegal" };
                dispatcher.select_move(&pos, key).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let outcome = handle.join().unwrap();
        let i = i as u8;
        assert!(outcome.mv == i || outcome.mv == i + 1);
        assert_eq!(outcome.fell_back, i % 2 == 1);
    }
}

#[test]
fn fallback_reason_serializes_with_kind() {
    let json = serde_json::to_value(FallbackReason::IllegalMove("e2e5".into())).unwrap();
    assert_eq!(json["kind"], "illegal_move");
    assert_eq!(json["detail"], "e2e5");
}
