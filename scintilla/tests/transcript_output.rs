// scintilla/tests/transcript_output.rs
//
// Integration tests for simulator output and configuration files.
//
// Tests cover:
// - JSON lines emitted for transcript events
// - TOML configuration changing announcement timing and output legs
// - Invalid configuration files rejected on load

use std::io::Write;

use caretfix_scintilla::{Origin, OutputEvent, OutputKind, ScintillaConfig, Simulation};

#[test]
fn test_json_lines() {
    let events = vec![
        OutputEvent {
            at_ms: 25,
            origin: Origin::Host,
            kind: OutputKind::Speak("blank".to_string()),
        },
        OutputEvent {
            at_ms: 150,
            origin: Origin::Tracker,
            kind: OutputKind::Cancel,
        },
    ];
    let lines: Vec<String> = events
        .iter()
        .map(|e| serde_json::to_string(e).unwrap())
        .collect();

    assert_eq!(
        lines[0],
        r#"{"at_ms":25,"origin":"host","kind":"speak","text":"blank"}"#
    );
    assert_eq!(lines[1], r#"{"at_ms":150,"origin":"tracker","kind":"cancel"}"#);
}

#[test]
fn test_config_file_changes_timing() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
announce_delay_ms = 300
default_feedback_text = "space"
braille_announcements = false
"#
    )
    .unwrap();

    let config = ScintillaConfig::load_toml(file.path()).unwrap();
    let mut sim = Simulation::new(config).unwrap();
    sim.run_script("focus Scintilla\ncompose 1 ab\nkey leftArrow\nwait 299\n")
        .unwrap();
    assert!(sim
        .transcript()
        .iter()
        .all(|e| e.kind != OutputKind::Speak("b".to_string())));

    let transcript = sim.finish();
    let spoken: Vec<_> = transcript
        .iter()
        .filter(|e| matches!(e.kind, OutputKind::Speak(_)))
        .map(|e| e.to_string())
        .collect();
    assert_eq!(
        spoken,
        vec!["[   25] host    speak   space", "[  300] tracker speak   b"]
    );
    // Only the poller brailles
    assert!(transcript
        .iter()
        .filter(|e| matches!(e.kind, OutputKind::Braille(_)))
        .all(|e| e.kind == OutputKind::Braille("ab".to_string())));
}

#[test]
fn test_invalid_config_file_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "poll_interval_ms = 0").unwrap();
    assert!(ScintillaConfig::load_toml(file.path()).is_err());
}
