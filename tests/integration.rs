//! Integration tests for the conquest engine binary.
//!
//! Spawns the engine process, sends JSON-line messages via stdin, and checks
//! the JSON lines it writes to stdout.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

use serde_json::Value;

/// Sends a sequence of messages to the engine and collects stdout lines.
fn run_engine_with(args: &[&str], messages: &[&str]) -> Vec<Value> {
    let exe = env!("CARGO_BIN_EXE_conquest");
    let mut child = Command::new(exe)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start conquest");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for msg in messages {
        writeln!(stdin, "{}", msg).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<Value> = reader
        .lines()
        .map(|l| serde_json::from_str(&l.unwrap()).expect("stdout line is not JSON"))
        .collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

fn run_engine(messages: &[&str]) -> Vec<Value> {
    run_engine_with(&[], messages)
}

const INVITE: &str = r#"{"type":"invite","client":1,"room":1}"#;
const START: &str = r#"{"room":1,"type":"start","players":[1,2]}"#;

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

#[test]
fn connected_registers_as_engine() {
    let lines = run_engine(&[r#"{"type":"connected"}"#]);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["type"], "register");
    assert_eq!(lines[0]["clientType"], "engine");
    assert_eq!(lines[0]["name"], "Conquest");
    assert!(lines[0].get("room").is_none());
}

#[test]
fn name_flag_is_announced() {
    let lines = run_engine_with(&["--name", "Bot"], &[r#"{"type":"connected"}"#]);
    assert_eq!(lines[0]["name"], "Bot");
}

#[test]
fn garbage_and_unknown_rooms_are_ignored() {
    let lines = run_engine(&[
        "not json at all",
        "",
        r#"{"type":"teleport"}"#,
        r#"{"room":42,"type":"start","players":[1]}"#,
        r#"{"type":"register","id":7}"#,
        r#"{"type":"error","message":"oops"}"#,
        r#"{"type":"connected"}"#,
    ]);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["type"], "register");
}

// ---------------------------------------------------------------------------
// Game flow
// ---------------------------------------------------------------------------

#[test]
fn start_sends_opening_state() {
    let lines = run_engine(&[INVITE, START]);
    assert_eq!(lines.len(), 1);
    let msg = &lines[0];
    assert_eq!(msg["type"], "state");
    assert_eq!(msg["room"], 1);
    assert_eq!(msg["turn"], 0);

    let state = &msg["state"];
    assert_eq!(state["nodes"].as_array().unwrap().len(), 5);
    assert_eq!(state["links"].as_array().unwrap().len(), 6);
    assert_eq!(state["players"][0]["income"], 6);
    assert_eq!(state["stages"]["end"][0]["owner"], 1);
    assert_eq!(state["stages"]["end"][1]["owner"], -1);
    assert_eq!(state["stages"]["end"][2]["owner"], 2);
}

#[test]
fn full_turn_resolves_siege() {
    let lines = run_engine(&[
        INVITE,
        START,
        r#"{"room":1,"type":"action","player":1,"action":{"deploys":[{"tileId":0,"troops":3}],"moves":[{"sourceTileId":0,"targetTileId":1,"numTroops":2}]}}"#,
        r#"{"room":1,"type":"action","player":2,"action":{"deploys":[],"moves":[]}}"#,
    ]);
    assert_eq!(lines.len(), 2);
    let msg = &lines[1];
    assert_eq!(msg["turn"], 1);

    let state = &msg["state"];
    assert_eq!(state["deploys"][0]["node"], 0);
    assert_eq!(state["deploys"][0]["troops"], 3);
    let combat = state["fights"]["combat"].as_array().unwrap();
    assert_eq!(combat.len(), 1);
    assert_eq!(combat[0]["location"], 1);
    assert_eq!(combat[0]["armies"][0]["player"], 1);
    assert_eq!(combat[0]["armies"][0]["troops"], 2);
    assert_eq!(combat[0]["armies"][1]["player"], -1);
    assert_eq!(combat[0]["armies"][1]["troops"], 0);

    assert_eq!(state["stages"]["travel"][0]["troops"], 1);
    assert_eq!(state["stages"]["travel"][1]["owner"], -1);
    assert_eq!(state["stages"]["end"][1]["owner"], 1);
    assert_eq!(state["stages"]["end"][1]["troops"], 2);
    assert_eq!(state["players"][0]["income"], 7);
}

#[test]
fn duplicate_action_does_not_resolve_turn() {
    let lines = run_engine(&[
        INVITE,
        START,
        r#"{"room":1,"type":"action","player":1,"action":{}}"#,
        r#"{"room":1,"type":"action","player":1,"action":{}}"#,
    ]);
    assert_eq!(lines.len(), 1);
}

#[test]
fn malformed_action_keeps_player_waiting() {
    let lines = run_engine(&[
        INVITE,
        START,
        r#"{"room":1,"type":"action","player":1,"action":{"deploys":"lots"}}"#,
        r#"{"room":1,"type":"action","player":2,"action":{}}"#,
        r#"{"room":1,"type":"action","player":1,"action":{}}"#,
    ]);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["turn"], 1);
}

#[test]
fn head_on_battle_is_a_travel_fight() {
    let lines = run_engine(&[
        INVITE,
        START,
        r#"{"room":1,"type":"action","player":1,"action":{"deploys":[{"tileId":0,"troops":4}]}}"#,
        r#"{"room":1,"type":"action","player":2,"action":{"deploys":[{"tileId":2,"troops":3}]}}"#,
        r#"{"room":1,"type":"action","player":1,"action":{"moves":[{"sourceTileId":0,"targetTileId":2,"troops":4}]}}"#,
        r#"{"room":1,"type":"action","player":2,"action":{"moves":[{"sourceTileId":2,"targetTileId":0,"troops":3}]}}"#,
    ]);
    assert_eq!(lines.len(), 3);
    let state = &lines[2]["state"];
    let travel = state["fights"]["travel"].as_array().unwrap();
    assert_eq!(travel.len(), 1);
    assert_eq!(travel[0]["armies"].as_array().unwrap().len(), 2);

    // The 1 survivor takes the empty tile 2 and player 2 is out.
    assert_eq!(state["stages"]["end"][2]["owner"], 1);
    assert_eq!(state["stages"]["end"][2]["troops"], 1);
    assert_eq!(state["players"].as_array().unwrap().len(), 1);
}

#[test]
fn scenario_flag_loads_map() {
    let path = std::env::temp_dir().join(format!("conquest-scenario-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{"name":"line","tiles":3,"links":[[0,1],[1,2]],"startingGarrison":2,"seeds":{"2":[0,1]}}"#,
    )
    .unwrap();

    let lines = run_engine_with(
        &["--scenario", path.to_str().unwrap()],
        &[INVITE, START],
    );
    std::fs::remove_file(&path).ok();

    let state = &lines[0]["state"];
    assert_eq!(state["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(state["links"].as_array().unwrap().len(), 2);
    assert_eq!(state["stages"]["end"][0]["troops"], 2);
    assert_eq!(state["stages"]["end"][1]["owner"], 2);
}
