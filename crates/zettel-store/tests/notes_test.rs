use zettel_common::test_utils::{init_test_logging, note_fixtures, temp_database};
use zettel_common::{NoteId, UserId};
use zettel_store::{LinkOutcome, NewNote, NoteStore};

const ALICE: UserId = UserId(1001);
const BOB: UserId = UserId(2002);

async fn store_with_samples() -> (NoteStore, Vec<NoteId>) {
    init_test_logging();
    let store = NoteStore::in_memory().await.unwrap();
    let mut ids = Vec::new();
    for (title, content, tags) in note_fixtures::sample_notes() {
        let note = NewNote::new(title, content, tags.unwrap_or(""));
        ids.push(store.add_note(ALICE, &note).await.unwrap());
    }
    (store, ids)
}

#[tokio::test]
async fn add_and_get_note() {
    let (store, ids) = store_with_samples().await;

    let note = store.get_note(ids[0], ALICE).await.unwrap().unwrap();
    assert_eq!(note.title, "Zettelkasten");
    assert_eq!(note.user_id, ALICE);
    assert_eq!(note.tags.as_deref(), Some("method, notes"));

    let untagged = store.get_note(ids[2], ALICE).await.unwrap().unwrap();
    assert_eq!(untagged.tags, None);
}

#[tokio::test]
async fn notes_are_scoped_to_their_owner() {
    let (store, ids) = store_with_samples().await;

    assert!(store.get_note(ids[0], BOB).await.unwrap().is_none());
    assert!(store.list_notes(BOB).await.unwrap().is_empty());
    assert!(store.search_notes(BOB, "notes").await.unwrap().is_empty());
    assert!(!store.delete_note(ids[0], BOB).await.unwrap());
    assert!(store.get_note(ids[0], ALICE).await.unwrap().is_some());
}

#[tokio::test]
async fn list_is_newest_first() {
    let (store, ids) = store_with_samples().await;

    let listed: Vec<NoteId> = store
        .list_notes(ALICE)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    let mut expected = ids.clone();
    expected.reverse();
    assert_eq!(listed, expected);
}

#[tokio::test]
async fn search_ignores_case_across_fields() {
    let (store, ids) = store_with_samples().await;

    let by_title = store.search_notes(ALICE, "ZETTEL").await.unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].id, ids[0]);

    let by_cyrillic_content = store.search_notes(ALICE, "ДРУГ").await.unwrap();
    assert_eq!(by_cyrillic_content.len(), 1);
    assert_eq!(by_cyrillic_content[0].id, ids[2]);

    let by_tag = store.search_notes(ALICE, "rust").await.unwrap();
    assert_eq!(by_tag.len(), 1);

    let shared_word: Vec<NoteId> = store
        .search_notes(ALICE, "note")
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(shared_word, vec![ids[1], ids[0]]);

    assert!(store.search_notes(ALICE, "  ").await.unwrap().is_empty());
    assert!(store.search_notes(ALICE, "haskell").await.unwrap().is_empty());
}

#[tokio::test]
async fn links_are_undirected_and_idempotent() {
    let (store, ids) = store_with_samples().await;

    assert_eq!(store.add_link(ALICE, ids[0], ids[1]).await.unwrap(), LinkOutcome::Created);
    assert_eq!(
        store.add_link(ALICE, ids[1], ids[0]).await.unwrap(),
        LinkOutcome::AlreadyLinked
    );
    assert_eq!(store.add_link(ALICE, ids[0], ids[0]).await.unwrap(), LinkOutcome::SelfLink);

    let from_first = store.linked_notes(ids[0]).await.unwrap();
    let from_second = store.linked_notes(ids[1]).await.unwrap();
    assert_eq!(from_first.len(), 1);
    assert_eq!(from_first[0].id, ids[1]);
    assert_eq!(from_second[0].id, ids[0]);

    assert_eq!(store.all_links().await.unwrap().len(), 1);
}

#[tokio::test]
async fn links_require_both_notes_of_the_same_owner() {
    let (store, ids) = store_with_samples().await;
    let foreign = store
        .add_note(BOB, &NewNote::new("Bob's", "private", ""))
        .await
        .unwrap();

    assert_eq!(store.add_link(ALICE, ids[0], foreign).await.unwrap(), LinkOutcome::NotFound);
    assert_eq!(store.add_link(BOB, ids[0], foreign).await.unwrap(), LinkOutcome::NotFound);
    assert_eq!(
        store.add_link(ALICE, ids[0], NoteId(9999)).await.unwrap(),
        LinkOutcome::NotFound
    );
    assert!(store.all_links().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_note_removes_its_links() {
    let (store, ids) = store_with_samples().await;
    store.add_link(ALICE, ids[0], ids[1]).await.unwrap();
    store.add_link(ALICE, ids[2], ids[0]).await.unwrap();
    store.add_link(ALICE, ids[1], ids[2]).await.unwrap();

    assert!(store.delete_note(ids[0], ALICE).await.unwrap());
    assert!(store.get_note(ids[0], ALICE).await.unwrap().is_none());
    assert!(!store.delete_note(ids[0], ALICE).await.unwrap());

    let links = store.all_links().await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!((links[0].from_note_id, links[0].to_note_id), (ids[1], ids[2]));
    assert!(store.linked_notes(ids[0]).await.unwrap().is_empty());
}

#[tokio::test]
async fn graph_data_contains_only_the_users_notes() {
    let (store, ids) = store_with_samples().await;
    store.add_link(ALICE, ids[0], ids[1]).await.unwrap();
    store.add_link(ALICE, ids[1], ids[3]).await.unwrap();
    store
        .add_note(BOB, &NewNote::new("Other", "user", ""))
        .await
        .unwrap();

    let data = store.graph_data(ALICE).await.unwrap();
    assert_eq!(data.notes.keys().copied().collect::<Vec<_>>(), ids);
    assert_eq!(data.notes[&ids[2]], "Связи");
    assert_eq!(data.links, vec![(ids[0], ids[1]), (ids[1], ids[3])]);

    let empty = store.graph_data(BOB).await.unwrap();
    assert_eq!(empty.notes.len(), 1);
    assert!(empty.links.is_empty());
}

#[tokio::test]
async fn file_database_persists_between_connections() {
    init_test_logging();
    let db = temp_database("zettelkasten.db");

    let id = {
        let store = NoteStore::connect(&db.path, 2).await.unwrap();
        let id = store
            .add_note(ALICE, &NewNote::new("Persistent", "survives reopen", "disk"))
            .await
            .unwrap();
        store.close().await;
        id
    };

    let reopened = NoteStore::connect(&db.path, 2).await.unwrap();
    let note = reopened.get_note(id, ALICE).await.unwrap().unwrap();
    assert_eq!(note.content, "survives reopen");
    assert_eq!(reopened.all_notes().await.unwrap().len(), 1);
}
