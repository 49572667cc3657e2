//! End-to-end exploration flow through the public session API.

use delve_core::event::Event;
use delve_core::session::{GameSession, MapMode, SessionConfig};
use delve_core::testing::{assert_event, test_session};

#[test]
fn a_new_run_narrates_the_first_room_with_exits() {
    let (session, intro) = test_session(100);
    assert_event(
        &intro,
        |e| matches!(e, Event::RoomEntered { travelled: 1, .. }),
        "a room entry",
    );
    assert_event(
        &intro,
        |e| matches!(e, Event::Info(text) if text.starts_with("Exits:")),
        "an exit listing",
    );
    assert!(!session.is_over());
}

#[test]
fn informational_commands_mutate_nothing() {
    let (mut session, _) = test_session(101);
    let before = session.to_save();
    for line in ["status", "inventory", "quests", "skills", "help", "look"] {
        let events = session.handle_line(line);
        assert!(!events.is_empty(), "'{line}' said nothing");
    }
    assert_eq!(session.to_save(), before);
}

#[test]
fn bad_commands_are_rejected_without_side_effects() {
    let (mut session, _) = test_session(102);
    let before = session.to_save();
    for line in ["", "pirouette", "go", "use"] {
        let events = session.handle_line(line);
        assert_event(
            &events,
            |e| matches!(e, Event::CommandRejected { .. }),
            "a rejection",
        );
    }
    assert_eq!(session.to_save(), before);
}

#[test]
fn warriors_can_equip_their_starting_sword() {
    let (mut session, _) = test_session(103);
    let unarmed = session.player().attack_power;
    let events = session.handle_line("equip iron sword");
    assert_event(
        &events,
        |e| matches!(e, Event::Equipped { item, .. } if item == "Iron Sword"),
        "the sword equipping",
    );
    assert_eq!(session.player().attack_power, unarmed + 6);

    // Equipping it again is a polite no-op.
    let events = session.handle_line("equip iron sword");
    assert_event(
        &events,
        |e| matches!(e, Event::AlreadyEquipped { .. }),
        "an already-equipped notice",
    );
}

#[test]
fn walking_a_frontier_run_never_panics_and_counts_rooms() {
    let (mut session, _) = GameSession::new(
        SessionConfig::new("Strider")
            .with_seed(104)
            .with_map_mode(MapMode::Frontier),
    )
    .unwrap();

    // Wander with a fixed script; fights are fled or fought blindly. The
    // point is that every line produces events and state stays coherent.
    for line in [
        "north", "east", "look", "search", "south", "back", "west", "north", "take", "talk",
    ] {
        if session.is_over() {
            break;
        }
        let line = if session.in_combat() { "attack" } else { line };
        let events = session.handle_line(line);
        assert!(!events.is_empty(), "'{line}' said nothing");
        let hp = session.player().hp;
        assert!(hp >= 0, "hp went negative: {hp}");
    }
}

#[test]
fn quitting_reports_and_freezes_the_run() {
    let (mut session, _) = test_session(105);
    session.handle_line("quit");
    assert!(session.is_over());
    let events = session.handle_line("north");
    assert_event(
        &events,
        |e| matches!(e, Event::Info(text) if text.contains("over")),
        "the run-over notice",
    );
}
