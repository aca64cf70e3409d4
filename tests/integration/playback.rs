//! Full playback and self-test runs through the player.

use crate::helpers::*;
use approx::assert_relative_eq;
use keyplay::prelude::*;
use keyplay::NullObserver;
use std::sync::Barrier;

#[test]
fn test_scale_playback() {
    let fixture = Fixture::new();
    fixture.write_song("scale.mid", &[58, 60, 67], 240);

    let mut player = fixture.player();
    player.set_keymap("piano").unwrap();
    player.set_range_mode(RangeMismatchMode::Scale);

    let (observer, rx) = ChannelObserver::new();
    let handle = player.play("scale.mid", observer).unwrap();
    assert_eq!(handle.join().unwrap(), PlaybackOutcome::Completed);

    assert_eq!(fixture.injector.pressed_strings(), vec!["a", "a", "f"]);
    assert_eq!(
        status_lines(rx.try_iter()),
        vec![
            "Starting in 3...",
            "Starting in 2...",
            "Starting in 1...",
            "Playing scale.mid",
            "Completed"
        ]
    );
    assert!(!player.is_running());
}

#[test]
fn test_discard_playback() {
    let fixture = Fixture::new();
    fixture.write_song("scale.mid", &[58, 60, 67], 240);

    let mut player = fixture.player();
    player.set_keymap("piano").unwrap();
    player.set_range_mode(RangeMismatchMode::Discard);
    player.play("scale.mid", NullObserver).unwrap().join().unwrap();

    assert_eq!(fixture.injector.pressed_strings(), vec!["a"]);
}

#[test]
fn test_target_duration_without_countdown() {
    let fixture = Fixture::new();
    fixture.write_song("four.mid", &[60, 62, 64, 65], 480);

    let mut player = fixture.player();
    player.set_keymap("piano").unwrap();
    player.set_countdown(0);
    player.set_target_duration(4.0).unwrap();
    player.play("four.mid", NullObserver).unwrap().join().unwrap();

    assert_relative_eq!(
        fixture.clock.total_slept().as_secs_f64(),
        4.0,
        epsilon = 1e-6
    );
    assert_eq!(fixture.injector.len(), 4);
}

#[test]
fn test_missing_file_reports_error() {
    let fixture = Fixture::new();
    let mut player = fixture.player();
    player.set_keymap("piano").unwrap();

    let (observer, rx) = ChannelObserver::new();
    let err = player.play("nope.mid", observer).unwrap().join().unwrap_err();
    assert_eq!(err.to_string(), "MIDI file not found: nope.mid");
    assert_eq!(
        status_lines(rx.try_iter()),
        vec!["Error: MIDI file not found: nope.mid"]
    );
}

#[test]
fn test_no_keymap_reports_error() {
    let fixture = Fixture::new();
    fixture.write_song("scale.mid", &[60], 240);
    let player = fixture.player();
    let err = player.play("scale.mid", NullObserver).unwrap().join().unwrap_err();
    assert!(matches!(err, keyplay::core::Error::NoKeymapSelected));
}

#[test]
fn test_single_active_session_and_stop() {
    let fixture = Fixture::new();
    fixture.write_song("scale.mid", &[60, 62], 240);
    let mut player = fixture.player();
    player.set_keymap("piano").unwrap();

    // The worker parks inside the first countdown callback until released.
    let gate = Arc::new(Barrier::new(2));
    let worker_gate = Arc::clone(&gate);
    let observer = FnObserver::new().status(move |status| {
        if *status == Status::Countdown(3) {
            worker_gate.wait();
            worker_gate.wait();
        }
    });

    let handle = player.play("scale.mid", observer).unwrap();
    gate.wait();

    assert!(player.is_running());
    assert!(matches!(
        player.play("scale.mid", NullObserver),
        Err(Error::Core(keyplay::core::Error::SessionActive))
    ));
    assert!(matches!(
        player.test_keymap(NullObserver),
        Err(Error::Core(keyplay::core::Error::SessionActive))
    ));
    assert!(player.stop());
    gate.wait();

    assert_eq!(handle.join().unwrap(), PlaybackOutcome::Stopped);
    assert!(fixture.injector.is_empty());
    assert!(!player.stop());

    // The slot frees up once the run has ended.
    let again = player.play("scale.mid", NullObserver).unwrap();
    assert_eq!(again.join().unwrap(), PlaybackOutcome::Completed);
}

#[test]
fn test_player_recovers_after_worker_panic() {
    let fixture = Fixture::new();
    fixture.write_song("scale.mid", &[60, 62], 240);
    let mut player = fixture.player();
    player.set_keymap("piano").unwrap();

    let observer = FnObserver::new().status(|status| {
        if matches!(status, Status::Playing(_)) {
            panic!("observer failure");
        }
    });
    drop(player.play("scale.mid", observer).unwrap());

    for _ in 0..400 {
        if !player.is_running() {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert!(!player.is_running());

    let handle = player.play("scale.mid", NullObserver).unwrap();
    assert_eq!(handle.join().unwrap(), PlaybackOutcome::Completed);
    assert_eq!(fixture.injector.pressed_strings(), vec!["a", "s"]);
}

#[test]
fn test_self_test_presses_ascending() {
    let fixture = Fixture::new();
    let mut player = fixture.player();
    player.set_keymap("chords").unwrap();

    let progress = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&progress);
    let observer = FnObserver::new().progress(move |current, total| sink.lock().push((current, total)));

    let handle = player.test_keymap(observer).unwrap();
    assert_eq!(handle.join().unwrap(), PlaybackOutcome::Completed);
    assert_eq!(
        fixture.injector.pressed_strings(),
        vec!["ctrl+z", "ctrl+x", "shift+c"]
    );
    assert_eq!(*progress.lock(), vec![(1, 3), (2, 3), (3, 3)]);
}
