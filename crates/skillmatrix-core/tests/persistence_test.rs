//! Persistence fidelity across restarts, for every storage backend

use skillmatrix_core::storage::{
    JsonDirStore, KeyValueStore, MemoryStore, SqliteKvStore, ALL_KEYS, COLLABORATORS_KEY,
};
use skillmatrix_core::{
    CollaboratorPatch, MatrixConfig, MatrixError, MatrixStore, NewCollaborator, NewSkill, NewTeam,
    Rating, SkillCategory, SkillId, SkillPatch, SkillRating, StorageBackendKind, TeamId,
};

/// Drive a store through every kind of mutation
fn populate(store: &MatrixStore) {
    let ops = store.add_team(NewTeam::new("Operações")).unwrap();
    let rust = store
        .add_skill(NewSkill::new("Rust", SkillCategory::Knowledge))
        .unwrap();

    let ana = store
        .add_collaborator(
            NewCollaborator::new("Ana Lima", "data:image/png;base64,AAAA", ops.id.clone())
                .with_rating(SkillRating::new(rust.id.clone(), Rating::Expert).apt(true)),
        )
        .unwrap();
    let bruno = store
        .add_collaborator(NewCollaborator::new("Bruno Souza", "https://example.com/b.png", "team2"))
        .unwrap();

    store
        .update_skill_rating(&bruno.id, &SkillId::from("skill4"), Rating::Intermediate)
        .unwrap();
    store
        .update_skill_rating(&bruno.id, &SkillId::from("skill1"), Rating::NotApplicable)
        .unwrap();
    store
        .toggle_skill_aptitude(&bruno.id, &SkillId::from("skill4"))
        .unwrap();
    store.toggle_focal(&ana.id).unwrap();
    store
        .update_collaborator(&bruno.id, CollaboratorPatch::default().name("Bruno S."))
        .unwrap();
    store
        .update_skill(&SkillId::from("skill5"), SkillPatch::default().name("Slides"))
        .unwrap();
    store.remove_team(&TeamId::from("team3")).unwrap();
}

fn assert_restart_preserves_state<S, F>(open: F)
where
    S: KeyValueStore + 'static,
    F: Fn() -> S,
{
    let before = {
        let store = MatrixStore::open(open()).unwrap();
        populate(&store);
        store.snapshot()
    };

    let restarted = MatrixStore::open(open()).unwrap();
    assert_eq!(restarted.snapshot(), before);
    assert_eq!(restarted.collaborators().len(), 2);
    assert_eq!(restarted.teams().len(), 3);
    assert_eq!(restarted.skills().len(), 6);
}

#[test]
fn test_sqlite_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matrix.db");
    assert_restart_preserves_state(|| SqliteKvStore::open(&path).unwrap());
}

#[test]
fn test_json_dir_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matrix");
    assert_restart_preserves_state(|| JsonDirStore::open(&path).unwrap());

    // one readable file per collection
    for key in ALL_KEYS {
        assert!(path.join(format!("{}.json", key)).is_file());
    }
}

#[test]
fn test_memory_restart() {
    let shared = MemoryStore::new();
    assert_restart_preserves_state(|| shared.clone());
}

#[test]
fn test_default_seed_on_empty_storage() {
    let dir = tempfile::tempdir().unwrap();
    let config = MatrixConfig::new()
        .with_backend(StorageBackendKind::Sqlite)
        .with_data_path(dir.path().join("fresh.db"));

    let store = MatrixStore::from_settings(&config.storage).unwrap();
    let teams: Vec<_> = store.teams().into_iter().map(|t| t.name).collect();
    let skills: Vec<_> = store.skills().into_iter().map(|s| s.name).collect();

    assert_eq!(teams, vec!["Comercial", "CIT", "Potencial de Mercado"]);
    assert_eq!(
        skills,
        vec!["Liderança", "Comunicação", "Trabalho em Equipe", "Excel", "PowerPoint"]
    );
    assert!(store.collaborators().is_empty());
}

#[test]
fn test_persisted_layout_is_camel_case() {
    let backend = MemoryStore::new();
    let store = MatrixStore::open(backend.clone()).unwrap();
    let ana = store
        .add_collaborator(NewCollaborator::new("Ana", "p", "team1"))
        .unwrap();
    store
        .update_skill_rating(&ana.id, &SkillId::from("skill2"), Rating::NotApplicable)
        .unwrap();

    let raw = backend.get(COLLABORATORS_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["teamId"], "team1");
    assert_eq!(json[0]["isFocal"], false);
    assert_eq!(json[0]["skills"][0]["skillId"], "skill2");
    assert_eq!(json[0]["skills"][0]["rating"], "N/A");
    assert_eq!(json[0]["skills"][0]["isApt"], false);
}

#[test]
fn test_reads_numeric_and_na_ratings() {
    let backend = MemoryStore::new();
    backend
        .set(
            COLLABORATORS_KEY,
            r#"[{"id":"collaborator-1700000000000","name":"Ana","photo":"p","teamId":"team1",
                 "isFocal":true,"skills":[{"skillId":"skill1","rating":5,"isApt":true},
                                          {"skillId":"skill2","rating":"N/A","isApt":false}]}]"#,
        )
        .unwrap();

    let store = MatrixStore::open(backend).unwrap();
    let ana = &store.collaborators()[0];
    assert_eq!(ana.id, "collaborator-1700000000000");
    assert_eq!(ana.skills[0].rating, Rating::Expert);
    assert_eq!(ana.skills[1].rating, Rating::NotApplicable);
}

#[test]
fn test_out_of_range_rating_is_rejected_on_load() {
    let backend = MemoryStore::new();
    backend
        .set(
            COLLABORATORS_KEY,
            r#"[{"id":"c","name":"Ana","photo":"p","teamId":"team1","isFocal":false,
                 "skills":[{"skillId":"skill1","rating":7,"isApt":false}]}]"#,
        )
        .unwrap();

    let err = MatrixStore::open(backend).unwrap_err();
    assert!(err.to_string().contains("collaborators"));
}

#[test]
fn test_tampered_sqlite_entry_fails_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matrix.db");
    {
        let store = MatrixStore::open(SqliteKvStore::open(&path).unwrap()).unwrap();
        store.flush().unwrap();
    }

    // edit the blob behind the store's back; the stored hash no longer matches
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute("UPDATE kv_entries SET value = '[]' WHERE key = 'teams'", [])
        .unwrap();
    drop(conn);

    let err = MatrixStore::open(SqliteKvStore::open(&path).unwrap()).unwrap_err();
    assert!(matches!(err, MatrixError::Corrupted { ref key, .. } if key == "teams"));
}

#[test]
fn test_sqlite_entries_seen_from_second_connection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matrix.db");
    let store = MatrixStore::open(SqliteKvStore::open(&path).unwrap()).unwrap();
    store.flush().unwrap();

    let entries = SqliteKvStore::open(&path).unwrap().entries().unwrap();
    let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["collaborators", "skills", "teams"]);
    assert!(entries.iter().all(|e| e.integrity_hash.len() == 64 && e.saved_at_ms > 0));

    let json = serde_json::to_value(&entries[0]).unwrap();
    assert!(json.get("integrityHash").is_some());
    assert!(json.get("savedAtMs").is_some());
}
