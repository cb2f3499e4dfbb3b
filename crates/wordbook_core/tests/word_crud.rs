use rusqlite::Connection;
use uuid::Uuid;
use wordbook_core::db::migrations::latest_version;
use wordbook_core::db::open_db_in_memory;
use wordbook_core::{
    LocalWordRepository, MapperError, PartOfSpeech, RepoError, SqliteWordDataSource,
    SqliteWordRepository, Word, WordField, WordFilter, WordRepository, WordSort,
    WordValidationError,
};

fn word(text: &str, translations: &[&str]) -> Word {
    Word::new(
        text,
        translations.iter().map(|value| value.to_string()).collect(),
    )
}

fn word_with_fixed_id(id: &str, text: &str, created_at: i64) -> Word {
    let mut word = Word::with_id(Uuid::parse_str(id).unwrap(), text, vec!["t".to_string()]);
    word.created_at = created_at;
    word.updated_at = created_at;
    word
}

#[test]
fn add_and_get_roundtrip_preserves_every_field() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_from_connection(&conn).unwrap();

    let mut entry = word("sprechen", &["to speak", "to talk"]);
    entry.examples = vec!["Sprichst du Deutsch?".to_string()];
    entry.part_of_speech = PartOfSpeech::Verb;
    entry.notes = Some("sprach, gesprochen".to_string());

    let id = repo.add_word(&entry).unwrap();
    let loaded = repo.get_word(id).unwrap().unwrap();
    assert_eq!(loaded, entry);
}

#[test]
fn empty_examples_are_stored_as_null() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_from_connection(&conn).unwrap();

    let entry = word("Baum", &["tree"]);
    repo.add_word(&entry).unwrap();

    let examples: Option<String> = conn
        .query_row(
            "SELECT examples FROM words WHERE id = ?1;",
            [entry.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(examples, None);
    assert!(repo.get_word(entry.id).unwrap().unwrap().examples.is_empty());
}

#[test]
fn list_fields_are_joined_with_separator_in_storage() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_from_connection(&conn).unwrap();

    let entry = word("hell", &["bright", "light"]);
    repo.add_word(&entry).unwrap();

    let translations: String = conn
        .query_row(
            "SELECT translations FROM words WHERE id = ?1;",
            [entry.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(translations, "bright¶light");
}

#[test]
fn separator_in_items_is_rejected_before_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_from_connection(&conn).unwrap();

    let entry = word("Absatz", &["paragraph ¶ sign"]);
    let err = repo.add_word(&entry).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(WordValidationError::ContainsSeparator {
            field: WordField::Translations,
            index: 0
        })
    ));
    assert!(repo.get_word(entry.id).unwrap().is_none());
}

#[test]
fn duplicate_id_returns_already_exists() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_from_connection(&conn).unwrap();

    let entry = word("Hund", &["dog"]);
    repo.add_word(&entry).unwrap();
    let err = repo.add_word(&entry).unwrap_err();
    assert!(matches!(err, RepoError::AlreadyExists(id) if id == entry.id));
}

#[test]
fn update_existing_word_refreshes_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_from_connection(&conn).unwrap();

    let mut entry = word_with_fixed_id("00000000-0000-4000-8000-000000000001", "schnell", 1_000);
    repo.add_word(&entry).unwrap();

    entry.translations = vec!["fast".to_string(), "quick".to_string()];
    entry.part_of_speech = PartOfSpeech::Adjective;
    let stored = repo.update_word(&entry).unwrap();
    assert!(stored.updated_at > 1_000);
    assert_eq!(stored.created_at, 1_000);

    let loaded = repo.get_word(entry.id).unwrap().unwrap();
    assert_eq!(loaded, stored);
    assert_eq!(loaded.translations, vec!["fast", "quick"]);
}

#[test]
fn update_keeps_stored_created_at_and_timestamp_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_from_connection(&conn).unwrap();

    let far_future = 4_000_000_000_000;
    let mut entry =
        word_with_fixed_id("00000000-0000-4000-8000-000000000009", "morgen", far_future);
    repo.add_word(&entry).unwrap();

    entry.created_at = 0;
    entry.updated_at = 0;
    entry.notes = Some("also: morning".to_string());
    let returned = repo.update_word(&entry).unwrap();

    let loaded = repo.get_word(entry.id).unwrap().unwrap();
    assert_eq!(returned, loaded);
    assert_eq!(loaded.created_at, far_future);
    assert!(loaded.updated_at >= loaded.created_at);
    assert_eq!(loaded.notes.as_deref(), Some("also: morning"));
    loaded.validate().unwrap();
}

#[test]
fn update_and_delete_missing_word_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_from_connection(&conn).unwrap();

    let entry = word("fehlen", &["to be missing"]);
    assert!(matches!(
        repo.update_word(&entry).unwrap_err(),
        RepoError::NotFound(id) if id == entry.id
    ));
    assert!(matches!(
        repo.delete_word(entry.id).unwrap_err(),
        RepoError::NotFound(id) if id == entry.id
    ));
}

#[test]
fn delete_removes_word() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_from_connection(&conn).unwrap();

    let entry = word("weg", &["gone"]);
    repo.add_word(&entry).unwrap();
    repo.delete_word(entry.id).unwrap();
    assert!(repo.get_word(entry.id).unwrap().is_none());
}

#[test]
fn list_sorts_alphabetically_ignoring_ascii_case() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_from_connection(&conn).unwrap();

    for text in ["cherry", "Banana", "apple"] {
        repo.add_word(&word(text, &["fruit"])).unwrap();
    }

    let texts = repo
        .list_words(&WordFilter::default())
        .unwrap()
        .into_iter()
        .map(|item| item.text)
        .collect::<Vec<_>>();
    assert_eq!(texts, vec!["apple", "Banana", "cherry"]);
}

#[test]
fn list_newest_first_with_pagination_is_stable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_from_connection(&conn).unwrap();

    let oldest = word_with_fixed_id("00000000-0000-4000-8000-000000000001", "a", 100);
    let tie_b = word_with_fixed_id("00000000-0000-4000-8000-000000000002", "b", 200);
    let tie_c = word_with_fixed_id("00000000-0000-4000-8000-000000000003", "c", 200);
    repo.add_word(&tie_c).unwrap();
    repo.add_word(&oldest).unwrap();
    repo.add_word(&tie_b).unwrap();

    let filter = WordFilter {
        sort: WordSort::Newest,
        limit: Some(2),
        offset: 1,
        ..WordFilter::default()
    };
    let page = repo.list_words(&filter).unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, tie_c.id);
    assert_eq!(page[1].id, oldest.id);

    let offset_only = WordFilter {
        sort: WordSort::Newest,
        offset: 2,
        ..WordFilter::default()
    };
    let rest = repo.list_words(&offset_only).unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].id, oldest.id);
}

#[test]
fn list_filters_by_query_and_part_of_speech() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_from_connection(&conn).unwrap();

    let mut run = word("laufen", &["to run"]);
    run.part_of_speech = PartOfSpeech::Verb;
    let mut runner = word("Läufer", &["runner"]);
    runner.part_of_speech = PartOfSpeech::Noun;
    let mut quick = word("schnell", &["fast"]);
    quick.part_of_speech = PartOfSpeech::Adjective;
    quick.notes = Some("RUN-related idioms".to_string());
    for entry in [&run, &runner, &quick] {
        repo.add_word(entry).unwrap();
    }

    let by_query = WordFilter {
        query: Some("run".to_string()),
        ..WordFilter::default()
    };
    assert_eq!(repo.list_words(&by_query).unwrap().len(), 3);
    assert_eq!(repo.count_words(&by_query).unwrap(), 3);

    let verbs_only = WordFilter {
        query: Some("run".to_string()),
        part_of_speech: Some(PartOfSpeech::Verb),
        ..WordFilter::default()
    };
    let verbs = repo.list_words(&verbs_only).unwrap();
    assert_eq!(verbs.len(), 1);
    assert_eq!(verbs[0].id, run.id);
}

#[test]
fn query_wildcards_are_matched_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_from_connection(&conn).unwrap();

    repo.add_word(&word("Rabatt", &["50% off"])).unwrap();
    repo.add_word(&word("Hälfte", &["half"])).unwrap();

    let filter = WordFilter {
        query: Some("%".to_string()),
        ..WordFilter::default()
    };
    let hits = repo.list_words(&filter).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].text, "Rabatt");
}

#[test]
fn part_of_speech_counts_group_stored_words() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_from_connection(&conn).unwrap();

    for (text, pos) in [
        ("gehen", PartOfSpeech::Verb),
        ("kommen", PartOfSpeech::Verb),
        ("Tisch", PartOfSpeech::Noun),
    ] {
        let mut entry = word(text, &["x"]);
        entry.part_of_speech = pos;
        repo.add_word(&entry).unwrap();
    }

    let counts = repo.part_of_speech_counts().unwrap();
    assert_eq!(
        counts,
        vec![(PartOfSpeech::Noun, 1), (PartOfSpeech::Verb, 2)]
    );
}

#[test]
fn corrupt_row_is_reported_instead_of_masked() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_from_connection(&conn).unwrap();

    conn.execute(
        "INSERT INTO words (id, text, translations, part_of_speech, created_at, updated_at)
         VALUES ('not-a-uuid', 'broken', 'x', 'noun', 0, 0);",
        [],
    )
    .unwrap();

    let err = repo.list_words(&WordFilter::default()).unwrap_err();
    assert!(matches!(err, RepoError::Mapping(MapperError::InvalidId(_))));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteWordDataSource::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_words_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteWordDataSource::try_new(&conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("words"))));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE words (
            id TEXT PRIMARY KEY NOT NULL,
            text TEXT NOT NULL,
            translations TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteWordDataSource::try_new(&conn).map(LocalWordRepository::new);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "words",
            column: "examples"
        })
    ));
}
