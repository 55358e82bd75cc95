#[allow(dead_code)]
mod common;

use std::sync::Arc;

use serde_json::json;

use duet_core::test_helpers::ManualClock;
use duet_tables::test_helpers::LoadedDice;

use common::TestServer;

fn action(participant: &str, role: &str, action: &str) -> serde_json::Value {
    json!({ "roomId": "r1", "participantId": participant, "action": action, "role": role })
}

fn with(mut body: serde_json::Value, extra: serde_json::Value) -> serde_json::Value {
    if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            body.insert(k.clone(), v.clone());
        }
    }
    body
}

#[tokio::test]
async fn race_then_table_game() {
    let clock = Arc::new(ManualClock::starting_at(1_000_000));
    let server = TestServer::scripted(&clock, LoadedDice::new([(4, 4), (3, 5)])).await;
    server.seat_both("r1").await;

    let room = server
        .act_ok(with(action("alice", "p1", "collectItem"), json!({ "itemId": "p1-item-1" })))
        .await;
    assert_eq!(room["score"]["p1"], 1);
    let room = server
        .act_ok(with(action("alice", "p1", "collectItem"), json!({ "itemId": "p1-item-1" })))
        .await;
    assert_eq!(room["score"]["p1"], 1);
    assert_eq!(room["duoRace"]["collected"]["p1"], json!(["p1-item-1"]));

    // Someone else's item does not count.
    let room = server
        .act_ok(with(action("alice", "p1", "collectItem"), json!({ "itemId": "p2-item-1" })))
        .await;
    assert_eq!(room["score"]["p1"], 1);

    let room = server
        .act_ok(with(
            action("alice", "p1", "syncRacer"),
            json!({ "state": { "x": 5000, "y": 120, "facing": -1, "finished": true } }),
        ))
        .await;
    assert_eq!(room["duoRace"]["racers"]["p1"]["x"], 1800.0);
    assert_eq!(room["duoRace"]["racers"]["p1"]["facing"], -1);
    assert_eq!(room["stageIndex"], 0);

    clock.advance(1_500);
    let room = server
        .act_ok(with(
            action("bob", "p2", "syncRacer"),
            json!({ "state": { "x": 1750, "finished": true } }),
        ))
        .await;
    assert_eq!(room["duoRace"]["winner"], "p1");
    assert_eq!(room["score"], json!({ "p1": 4, "p2": 0 }));
    assert_eq!(room["stageIndex"], 1);
    assert_eq!(room["lastMessage"], "Table game started. Roll the dice.");
    assert_eq!(room["tableGame"]["lastMove"], "Roll the dice to start.");

    // P2 cannot roll out of turn.
    let before = server.snapshot("r1").await;
    let after = server.act_ok(action("bob", "p2", "roll")).await;
    assert_eq!(before, after);

    let room = server.act_ok(action("alice", "p1", "roll")).await;
    assert_eq!(room["tableGame"]["dice"], json!([4, 4, 4, 4]));
    assert_eq!(room["tableGame"]["rolled"], true);
    assert_eq!(room["tableGame"]["lastMove"], "P1 rolled 4 and 4.");
    let moves = room["tableGame"]["legalMoves"].as_array().unwrap();
    assert!(!moves.is_empty());
    assert!(moves.iter().all(|m| m["die"] == 4));

    // Four moves of 4, then the turn passes.
    let mut room = room;
    for step in 0..4 {
        let mv = room["tableGame"]["legalMoves"][0].clone();
        room = server
            .act_ok(with(
                action("alice", "p1", "move"),
                json!({ "from": mv["from"], "to": mv["to"] }),
            ))
            .await;
        let dice_left = room["tableGame"]["dice"].as_array().map_or(0, Vec::len);
        if step < 3 {
            assert_eq!(dice_left, 3 - step);
            assert_eq!(room["tableGame"]["turn"], "p1");
        }
    }
    assert_eq!(room["tableGame"]["turn"], "p2");
    assert_eq!(room["tableGame"]["rolled"], false);
    assert_eq!(room["tableGame"]["lastMove"], "Turn passed to P2.");

    let room = server.act_ok(action("bob", "p2", "roll")).await;
    assert_eq!(room["tableGame"]["dice"], json!([3, 5]));
}

#[tokio::test]
async fn illegal_move_is_silently_ignored() {
    let clock = Arc::new(ManualClock::starting_at(0));
    let server = TestServer::scripted(&clock, LoadedDice::always((3, 5))).await;
    server.seat_both("r1").await;
    server
        .act_ok(with(action("alice", "p1", "syncRacer"), json!({ "state": { "finished": true } })))
        .await;
    clock.advance(1_000);
    server
        .act_ok(with(action("bob", "p2", "syncRacer"), json!({ "state": { "finished": true } })))
        .await;
    let rolled = server.act_ok(action("alice", "p1", "roll")).await;

    // Point 5 holds five P2 checkers.
    let after = server
        .act_ok(with(action("alice", "p1", "move"), json!({ "from": 0, "to": 5 })))
        .await;
    assert_eq!(rolled, after);

    let (status, body) = server
        .act(with(action("bob", "p1", "move"), json!({ "from": 0, "to": 3 })))
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn restart_resets_scores_and_stage() {
    let clock = Arc::new(ManualClock::starting_at(0));
    let server = TestServer::scripted(&clock, LoadedDice::always((2, 6))).await;
    server.seat_both("r1").await;
    server
        .act_ok(with(action("bob", "p2", "collectItem"), json!({ "itemId": "p2-item-3" })))
        .await;
    server
        .act_ok(with(action("alice", "p1", "syncRacer"), json!({ "state": { "finished": true } })))
        .await;
    server
        .act_ok(with(action("bob", "p2", "syncRacer"), json!({ "state": { "finished": true } })))
        .await;

    let room = server.snapshot("r1").await;
    assert_eq!(room["duoRace"]["winner"], "tie");
    assert_eq!(room["score"], json!({ "p1": 2, "p2": 3 }));

    let room = server.act_ok(action("bob", "p2", "restart")).await;
    assert_eq!(room["status"], "playing");
    assert_eq!(room["stageIndex"], 0);
    assert_eq!(room["score"], json!({ "p1": 0, "p2": 0 }));
    assert!(room["duoRace"]["winner"].is_null());
    assert_eq!(room["tableGame"]["points"][0], json!({ "owner": "p1", "count": 2 }));
}
