//! Save and restore through the plain-data persistence surface.

use delve_core::content::builtin_catalog;
use delve_core::persist::{SaveData, SaveError};
use delve_core::session::GameSession;
use delve_core::testing::test_session;

#[test]
fn a_run_survives_a_save_load_round_trip() {
    let (mut session, _) = test_session(300);
    session.handle_line("equip iron sword");
    session.player_mut().gold = 777;
    session.handle_line("north");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");
    session.to_save().save(&path).unwrap();

    let restored =
        GameSession::from_save(SaveData::load(&path).unwrap(), Some(builtin_catalog())).unwrap();
    assert_eq!(restored.player().name, "Tester");
    assert_eq!(restored.player().gold, 777);
    assert_eq!(
        restored
            .player()
            .equipment
            .weapon
            .as_ref()
            .map(|w| w.name.as_str()),
        Some("Iron Sword")
    );
    assert_eq!(restored.seed(), session.seed());
    assert_eq!(restored.current_room_id(), session.current_room_id());
    assert_eq!(
        restored.room(restored.current_room_id()).unwrap().description,
        session.room(session.current_room_id()).unwrap().description,
    );
}

#[test]
fn missing_save_files_error_instead_of_crashing() {
    let result = SaveData::load("/definitely/not/here.json");
    assert!(matches!(result, Err(SaveError::Io(_))));
}

#[test]
fn corrupt_save_files_error_instead_of_crashing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mangled.json");
    std::fs::write(&path, "{\"player\": 12, \"rooms\": \"nope\"").unwrap();
    let result = SaveData::load(&path);
    assert!(matches!(result, Err(SaveError::Corrupt(_))));
}

#[test]
fn an_empty_object_restores_as_a_fresh_default_run() {
    // The ultimate older-format save: nothing in it at all.
    let save: SaveData = serde_json::from_str("{}").unwrap();
    let restored = GameSession::from_save(save, None).unwrap();
    assert_eq!(restored.player().level, 1);
    assert!(!restored.is_over());
    // A map was grown so the run has somewhere to stand.
    assert!(restored.room(restored.current_room_id()).is_some());
}

#[test]
fn the_save_command_writes_a_loadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slot1.json");
    let (mut session, _) = test_session(301);
    let events = session.handle_line(&format!("save {}", path.display()));
    assert!(
        events
            .iter()
            .any(|e| e.to_string().contains("Saved")),
        "save should confirm: {events:?}"
    );
    let loaded = SaveData::load(&path).unwrap();
    assert_eq!(loaded.seed, 301);
}
