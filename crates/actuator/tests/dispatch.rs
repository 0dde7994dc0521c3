use gestura_actuator::writer::parse_journal;
use gestura_actuator::{
    ActionDispatcher, ActionMap, GestureSource, JournalHeader, JournalRecord, JournalWriter,
    RecordingInjector,
};
use gestura_common::error::{GestureError, GestureResult};
use gestura_hand_model::action::ActionCommand;
use gestura_platform_core::InputInjector;

struct BrokenInjector;

impl InputInjector for BrokenInjector {
    fn inject(&mut self, _command: &ActionCommand) -> GestureResult<()> {
        Err(GestureError::injection("display server gone"))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

#[test]
fn mapped_gestures_reach_the_injector() {
    let recorder = RecordingInjector::new();
    let mut dispatcher = ActionDispatcher::new(Box::new(recorder.clone()), ActionMap::default());

    assert_eq!(
        dispatcher.dispatch_gesture("ZOOM_OUT", GestureSource::Stabilizer, 10),
        Some(ActionCommand::press("pagedown"))
    );
    assert_eq!(
        dispatcher.dispatch_gesture("wave", GestureSource::Classifier, 20),
        Some(ActionCommand::hotkey(["ctrl", "s"]))
    );
    assert_eq!(
        recorder.commands(),
        vec![
            ActionCommand::press("pagedown"),
            ActionCommand::hotkey(["ctrl", "s"])
        ]
    );
}

#[test]
fn unknown_gesture_is_a_logged_noop() {
    let recorder = RecordingInjector::new();
    let mut dispatcher = ActionDispatcher::new(Box::new(recorder.clone()), ActionMap::default());

    assert_eq!(
        dispatcher.dispatch_gesture("thumbs_up", GestureSource::Classifier, 0),
        None
    );
    assert!(recorder.commands().is_empty());
    assert_eq!(dispatcher.stats().unmapped, 1);
}

#[test]
fn injection_failures_are_counted_not_raised() {
    let mut dispatcher = ActionDispatcher::new(Box::new(BrokenInjector), ActionMap::default());
    dispatcher.execute(&ActionCommand::Click, 0);
    dispatcher.execute(&ActionCommand::ButtonUp, 1);
    let stats = dispatcher.stats();
    assert_eq!(stats.commands, 2);
    assert_eq!(stats.failures, 2);
}

#[test]
fn journal_records_gestures_and_commands() {
    let dir = std::env::temp_dir().join("gestura_test_dispatch_journal");
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("actions.jsonl");

    {
        let journal = JournalWriter::new(path.clone(), JournalHeader::new("2026-01-01T00:00:00Z"))
            .unwrap();
        let mut dispatcher =
            ActionDispatcher::new(Box::new(RecordingInjector::new()), ActionMap::default())
                .with_journal(journal);
        dispatcher.dispatch_gesture("stop", GestureSource::Stabilizer, 100);
        dispatcher.execute(&ActionCommand::MoveTo { x: 5, y: 5 }, 150);
        dispatcher.dispatch_gesture("moonwalk", GestureSource::Classifier, 200);
        dispatcher.flush().unwrap();
    }

    let entries = parse_journal(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let records: Vec<_> = entries.into_iter().map(|e| e.record).collect();
    assert_eq!(
        records,
        vec![
            JournalRecord::Gesture {
                label: "stop".into(),
                source: GestureSource::Stabilizer
            },
            JournalRecord::Command {
                command: ActionCommand::press("space")
            },
            JournalRecord::Gesture {
                label: "moonwalk".into(),
                source: GestureSource::Classifier
            },
            JournalRecord::Unmapped {
                label: "moonwalk".into()
            },
        ]
    );

    std::fs::remove_dir_all(&dir).ok();
}
