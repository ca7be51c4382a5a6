use std::io::Write;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use tempfile::NamedTempFile;

fn recorded_hand() -> Vec<serde_json::Value> {
    vec![
        json!({
            "type": "HAND_START",
            "timestamp": 1,
            "payload": {
                "hand_id": "h1",
                "hero_position": "BTN",
                "hero_id": "hero",
                "players": [
                    { "id": "hero", "name": "Hero", "position": "BTN", "stack_bb": 100.0 },
                    { "id": "v1", "name": "Villain", "position": "BB", "stack_bb": 100.0 }
                ]
            }
        }),
        json!({
            "type": "CARD_DEAL",
            "timestamp": 2,
            "payload": { "target": "hero", "cards": ["As", "Kd"] }
        }),
    ]
}

#[test]
fn replay_prints_the_decision() {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, "{}", serde_json::Value::Array(recorded_hand())).expect("write events");

    let mut cmd = Command::cargo_bin("poker-adviser").expect("binary exists");
    cmd.arg("--no-color").arg("replay").arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Street PREFLOP"))
        .stdout(predicate::str::contains("Decision: RAISE 2.5x"))
        .stdout(predicate::str::contains("AKo is in GTO opening range from BTN"));
}

#[test]
fn replay_reads_json_lines() {
    let mut file = NamedTempFile::new().expect("temp file");
    for event in recorded_hand() {
        writeln!(file, "{event}").expect("write event");
    }
    writeln!(file).expect("blank line");

    let mut cmd = Command::cargo_bin("poker-adviser").expect("binary exists");
    cmd.arg("replay")
        .arg(file.path())
        .arg("--lambda")
        .arg("1.0")
        .arg("--no-color");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Replayed 2 events over 1 hands"));
}

#[test]
fn replay_without_hero_cards_explains_itself() {
    let mut file = NamedTempFile::new().expect("temp file");
    let events = vec![recorded_hand().remove(0)];
    write!(file, "{}", serde_json::Value::Array(events)).expect("write events");

    let mut cmd = Command::cargo_bin("poker-adviser").expect("binary exists");
    cmd.arg("--no-color").arg("replay").arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No recommendation: no recommendation available"))
        .stdout(predicate::str::is_match("(?s)Replayed 1 events.*\nNo recommendation:").unwrap());
}

#[test]
fn replay_of_a_missing_file_fails() {
    let mut cmd = Command::cargo_bin("poker-adviser").expect("binary exists");
    cmd.arg("replay").arg("/no/such/events.json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("reading events"));
}
