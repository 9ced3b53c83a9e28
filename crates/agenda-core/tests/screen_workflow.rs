//! Integration tests for the contact screen workflows against an in-memory service

mod support;

use agenda_core::{
    Contact, ContactField, ContactScreen, DeleteOutcome, Mode, NoticeLevel, ScreenError,
    ServiceError,
};

use support::{ana_and_ben, contact, loaded_screen, Call, FakeService, Op};

fn ids(contacts: &[Contact]) -> Vec<i64> {
    contacts.iter().map(|c| c.id).collect()
}

// =============================================================================
// Fetch-all
// =============================================================================

#[tokio::test]
async fn load_all_populates_master_and_view_in_service_order() {
    let service = FakeService::with_contacts(vec![
        contact(5, "Zoe", "Alba", "Mora"),
        contact(2, "Ben", "Cruz", "Ruiz"),
        contact(9, "Ana", "Lopez", "Diaz"),
    ]);
    let screen = loaded_screen(&service).await;

    assert_eq!(ids(screen.master()), vec![5, 2, 9]);
    assert_eq!(screen.contacts(), screen.master());
    assert_eq!(service.calls(), vec![Call::List]);
}

#[tokio::test]
async fn load_all_twice_is_idempotent() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;
    let first = screen.master().to_vec();

    screen.load_all().await.unwrap();
    assert_eq!(screen.master(), first.as_slice());
    assert_eq!(screen.contacts(), first.as_slice());
}

#[tokio::test]
async fn failed_load_leaves_list_unchanged() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;

    service.fail(Op::List, ServiceError::network("connection refused"));
    let err = screen.load_all().await.unwrap_err();

    assert!(matches!(err, ScreenError::Service(ServiceError::Network { .. })));
    assert_eq!(screen.master(), ana_and_ben().as_slice());
    assert_eq!(screen.notice().unwrap().level, NoticeLevel::Failure);
}

#[tokio::test]
async fn failed_initial_load_leaves_empty_list() {
    let service = FakeService::with_contacts(ana_and_ben());
    service.fail(Op::List, ServiceError::rejected(503, ""));
    let mut screen = ContactScreen::new(service.clone());

    assert!(screen.load_all().await.is_err());
    assert!(screen.master().is_empty());
    assert!(screen.contacts().is_empty());
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn search_scenario() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;

    screen.set_search_term("ana");
    assert_eq!(ids(screen.contacts()), vec![1]);

    screen.set_search_term("cruz");
    assert_eq!(ids(screen.contacts()), vec![2]);

    screen.set_search_term("");
    assert_eq!(ids(screen.contacts()), vec![1, 2]);
    assert_eq!(screen.master().len(), 2);
}

#[tokio::test]
async fn search_does_not_call_the_service() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;
    screen.set_search_term("lop");
    assert_eq!(service.calls(), vec![Call::List]);
}

#[tokio::test]
async fn mutations_keep_active_search_term() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;
    screen.set_search_term("be");

    screen.begin_edit(2).await.unwrap();
    screen.update_field(ContactField::Nombre, "Roberto").unwrap();
    screen.commit_edit().await.unwrap();

    // "Roberto Cruz Ruiz" still contains "be"
    assert_eq!(ids(screen.contacts()), vec![2]);
    assert_eq!(screen.contacts()[0].nombre, "Roberto");
    assert_eq!(screen.search_term(), "be");
}

// =============================================================================
// Edit
// =============================================================================

#[tokio::test]
async fn commit_edit_replaces_entry_with_draft() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;

    screen.begin_edit(2).await.unwrap();
    screen.update_field(ContactField::Nombre, "Benito").unwrap();
    screen.update_field(ContactField::ApeP, "Cruz").unwrap();
    screen.update_field(ContactField::ApeM, "Ruiz").unwrap();
    screen.update_field(ContactField::Tel, "555").unwrap();
    screen.update_field(ContactField::Correo, "b@x.com").unwrap();
    screen.update_field(ContactField::Dir, "Calle 1").unwrap();

    let saved = screen.commit_edit().await.unwrap();
    let expected = Contact {
        id: 2,
        nombre: "Benito".to_string(),
        ape_p: "Cruz".to_string(),
        ape_m: "Ruiz".to_string(),
        correo: "b@x.com".to_string(),
        tel: "555".to_string(),
        dir: "Calle 1".to_string(),
    };

    assert_eq!(saved, expected);
    let matching: Vec<_> = screen.master().iter().filter(|c| c.id == 2).collect();
    assert_eq!(matching, vec![&expected]);
    assert_eq!(screen.mode(), &Mode::Closed);
    assert_eq!(screen.master()[0], ana_and_ben()[0]);
    assert!(service.calls().contains(&Call::Update(expected)));
}

#[tokio::test]
async fn begin_edit_fetches_from_service_not_store() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;

    // Someone else changed contact 1 on the server; the local copy is stale
    service.clear_failures();
    let mut other = ContactScreen::new(service.clone());
    other.load_all().await.unwrap();
    other.begin_edit(1).await.unwrap();
    other.update_field(ContactField::Tel, "999").unwrap();
    other.commit_edit().await.unwrap();

    screen.begin_edit(1).await.unwrap();
    match screen.mode() {
        Mode::Editing(session) => assert_eq!(session.draft().tel, "999"),
        other => panic!("expected editing mode, got {:?}", other),
    }
    assert!(service.calls().contains(&Call::Get(1)));
}

#[tokio::test]
async fn failed_begin_edit_opens_no_session() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;

    let err = screen.begin_edit(42).await.unwrap_err();
    assert_eq!(err, ScreenError::Service(ServiceError::NotFound { id: 42 }));
    assert_eq!(screen.mode(), &Mode::Closed);
    assert!(!screen.view().opening_edit);

    service.fail(Op::Get, ServiceError::network("unreachable"));
    assert!(screen.begin_edit(1).await.is_err());
    assert_eq!(screen.mode(), &Mode::Closed);
    assert!(screen.notice().unwrap().is_failure());
}

#[tokio::test]
async fn failed_commit_keeps_session_and_store() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;

    screen.begin_edit(2).await.unwrap();
    screen.update_field(ContactField::Nombre, "Benito").unwrap();
    service.fail(Op::Update, ServiceError::rejected(500, "internal error"));

    let err = screen.commit_edit().await.unwrap_err();
    assert!(matches!(err, ScreenError::Service(ServiceError::Rejected { status: 500, .. })));
    assert_eq!(screen.master(), ana_and_ben().as_slice());
    match screen.mode() {
        Mode::Editing(session) => assert_eq!(session.draft().nombre, "Benito"),
        other => panic!("session should stay open, got {:?}", other),
    }

    // Retry by hand once the service recovers
    service.clear_failures();
    screen.commit_edit().await.unwrap();
    assert_eq!(screen.find(2).unwrap().nombre, "Benito");
}

#[tokio::test]
async fn cancel_edit_discards_draft_without_network() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;

    screen.begin_edit(1).await.unwrap();
    screen.update_field(ContactField::Nombre, "Anita").unwrap();
    screen.cancel_edit();

    assert_eq!(screen.mode(), &Mode::Closed);
    assert_eq!(screen.find(1).unwrap().nombre, "Ana");
    assert_eq!(service.calls(), vec![Call::List, Call::Get(1)]);
    assert_eq!(screen.commit_edit().await, Err(ScreenError::NoActiveSession));
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn create_appends_server_record() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;

    screen.begin_create();
    screen.update_field(ContactField::Nombre, "Cora").unwrap();
    screen.update_field(ContactField::ApeP, "Vega").unwrap();
    let created = screen.create_contact().await.unwrap();

    assert_eq!(created.id, 3);
    assert_eq!(ids(screen.master()), vec![1, 2, 3]);
    assert_eq!(ids(screen.contacts()), vec![1, 2, 3]);
    assert_eq!(screen.master()[2].nombre, "Cora");
    assert_eq!(screen.mode(), &Mode::Closed);
    assert_eq!(screen.notice().unwrap().level, NoticeLevel::Success);
    // No reload was needed
    assert_eq!(
        service.calls().iter().filter(|c| **c == Call::List).count(),
        1
    );
}

#[tokio::test]
async fn create_accepts_empty_fields() {
    let service = FakeService::with_contacts(vec![]);
    let mut screen = loaded_screen(&service).await;

    screen.begin_create();
    let created = screen.create_contact().await.unwrap();
    assert_eq!(created.nombre, "");
    assert_eq!(screen.master().len(), 1);
}

#[tokio::test]
async fn created_contact_hidden_by_search_stays_in_master() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;
    screen.set_search_term("ana");

    screen.begin_create();
    screen.update_field(ContactField::Nombre, "Cora").unwrap();
    screen.create_contact().await.unwrap();

    assert_eq!(ids(screen.contacts()), vec![1]);
    assert_eq!(screen.master().len(), 3);
}

#[tokio::test]
async fn failed_create_keeps_session_open() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;
    service.fail(Op::Create, ServiceError::timeout("timed out"));

    screen.begin_create();
    screen.update_field(ContactField::Nombre, "Cora").unwrap();
    assert!(screen.create_contact().await.is_err());

    assert_eq!(screen.master().len(), 2);
    match screen.mode() {
        Mode::Creating(session) => assert_eq!(session.draft().nombre, "Cora"),
        other => panic!("session should stay open, got {:?}", other),
    }
    assert!(screen.notice().unwrap().message.contains("in time"));
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn confirmed_delete_removes_exactly_one() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;
    screen.set_search_term("a");
    let before = screen.master().len();

    let mut asked = Vec::new();
    let outcome = screen
        .delete_contact(1, &mut |c: &Contact| {
            asked.push(c.id);
            true
        })
        .await
        .unwrap();

    assert!(matches!(outcome, DeleteOutcome::Deleted(ref c) if c.id == 1));
    assert_eq!(asked, vec![1]);
    assert_eq!(screen.master().len(), before - 1);
    assert!(screen.master().iter().all(|c| c.id != 1));
    assert!(screen.contacts().iter().all(|c| c.id != 1));
    assert_eq!(screen.notice().unwrap().level, NoticeLevel::Success);
}

#[tokio::test]
async fn cancelled_delete_changes_nothing() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;
    screen.set_search_term("ben");
    let master_before = screen.master().to_vec();
    let view_before = screen.contacts().to_vec();

    let outcome = screen
        .delete_contact(2, &mut |_: &Contact| false)
        .await
        .unwrap();

    assert_eq!(outcome, DeleteOutcome::Cancelled);
    assert_eq!(screen.master(), master_before.as_slice());
    assert_eq!(screen.contacts(), view_before.as_slice());
    assert_eq!(service.calls(), vec![Call::List]);
    assert!(screen.notice().is_none());
}

#[tokio::test]
async fn delete_rejected_by_server_keeps_contact() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;
    service.fail(Op::Delete, ServiceError::rejected(500, ""));

    let err = screen
        .delete_contact(1, &mut |_: &Contact| true)
        .await
        .unwrap_err();

    assert!(matches!(err, ScreenError::Service(ServiceError::Rejected { status: 500, .. })));
    assert_eq!(screen.master(), ana_and_ben().as_slice());
    assert!(screen.find(1).is_some());
    assert!(screen.notice().unwrap().is_failure());
}

#[tokio::test]
async fn delete_unknown_contact_never_asks_or_calls() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;

    let mut asked = false;
    let err = screen
        .delete_contact(77, &mut |_: &Contact| {
            asked = true;
            true
        })
        .await
        .unwrap_err();

    assert_eq!(err, ScreenError::UnknownContact { id: 77 });
    assert!(!asked);
    assert_eq!(service.calls(), vec![Call::List]);
}

// =============================================================================
// Errors stay local
// =============================================================================

#[tokio::test]
async fn failure_does_not_block_other_operations() {
    let service = FakeService::with_contacts(ana_and_ben());
    let mut screen = loaded_screen(&service).await;
    service.fail(Op::Delete, ServiceError::network("reset"));

    assert!(screen.delete_contact(1, &mut |_: &Contact| true).await.is_err());

    screen.begin_edit(1).await.unwrap();
    screen.update_field(ContactField::Tel, "123").unwrap();
    screen.commit_edit().await.unwrap();
    assert_eq!(screen.find(1).unwrap().tel, "123");
    assert_eq!(screen.notice().unwrap().level, NoticeLevel::Success);
}
