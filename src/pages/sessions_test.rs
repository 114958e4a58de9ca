use super::*;
use crate::test_helpers::{
    MockSessions, MockTeachers, admin_identity, member_identity, server_session, session, teacher,
};

fn teachers() -> MockTeachers {
    MockTeachers { teachers: vec![teacher(2), teacher(3)] }
}

fn member_store() -> SessionStore {
    let store = SessionStore::in_memory();
    store.log_in(member_identity());
    store
}

fn admin_store() -> SessionStore {
    let store = SessionStore::in_memory();
    store.log_in(admin_identity());
    store
}

// =============================================================================
// LIST
// =============================================================================

#[tokio::test]
async fn list_hides_admin_actions_for_members() {
    let sessions = MockSessions::with(vec![session(1, vec![]), session(2, vec![])]);
    let view = ListView::load(&sessions, &member_store()).await.unwrap();
    assert_eq!(view.sessions.len(), 2);
    assert!(!view.show_admin_actions);
}

#[tokio::test]
async fn list_shows_admin_actions_for_admins() {
    let sessions = MockSessions::with(vec![session(1, vec![])]);
    let view = ListView::load(&sessions, &admin_store()).await.unwrap();
    assert!(view.show_admin_actions);
}

// =============================================================================
// DETAIL
// =============================================================================

#[tokio::test]
async fn detail_requires_identity() {
    let sessions = MockSessions::with(vec![session(1, vec![])]);
    let store = SessionStore::in_memory();
    let result = DetailView::load(&sessions, &teachers(), &store, 1).await;
    assert!(matches!(result, Err(ApiError::NotLoggedIn)));
}

#[tokio::test]
async fn detail_resolves_teacher_and_participation() {
    let sessions = MockSessions::with(vec![session(1, vec![1, 5])]);
    let view = DetailView::load(&sessions, &teachers(), &member_store(), 1)
        .await
        .unwrap();
    assert_eq!(view.teacher.id, 2);
    assert!(view.is_participate);
    assert!(!view.is_admin);
    assert_eq!(view.user_id, 1);
}

#[tokio::test]
async fn detail_missing_session_is_not_found() {
    let sessions = MockSessions::default();
    let result = DetailView::load(&sessions, &teachers(), &member_store(), 7).await;
    assert_eq!(result.unwrap_err().status(), Some(404));
}

#[tokio::test]
async fn participate_then_un_participate_reloads() {
    let sessions = MockSessions::with(vec![session(1, vec![])]);
    let teachers = teachers();
    let mut view = DetailView::load(&sessions, &teachers, &member_store(), 1)
        .await
        .unwrap();
    assert!(!view.is_participate);

    view.participate(&sessions, &teachers).await.unwrap();
    assert!(view.is_participate);
    assert_eq!(view.session.users, vec![1]);

    view.un_participate(&sessions, &teachers).await.unwrap();
    assert!(!view.is_participate);
    assert!(view.session.users.is_empty());

    assert_eq!(
        sessions.calls(),
        vec!["detail 1", "participate 1 1", "detail 1", "unparticipate 1 1", "detail 1"]
    );
}

#[tokio::test]
async fn failed_participate_leaves_view_untouched() {
    let sessions = MockSessions::with(vec![session(1, vec![1])]);
    let teachers = teachers();
    let mut view = DetailView::load(&sessions, &teachers, &member_store(), 1)
        .await
        .unwrap();

    let err = view.participate(&sessions, &teachers).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(view.is_participate);
}

#[tokio::test]
async fn delete_returns_to_list() {
    let sessions = MockSessions::with(vec![session(1, vec![])]);
    let view = DetailView::load(&sessions, &teachers(), &admin_store(), 1)
        .await
        .unwrap();

    let (route, message) = view.delete(&sessions).await.unwrap();
    assert_eq!(route, Route::Sessions);
    assert_eq!(message, "Session deleted !");
    assert!(sessions.sessions.lock().unwrap().is_empty());
}

// =============================================================================
// FORM
// =============================================================================

#[test]
fn form_mode_from_route() {
    assert_eq!(FormMode::from_route(&Route::SessionCreate), Some(FormMode::Create));
    assert_eq!(FormMode::from_route(&Route::SessionUpdate(4)), Some(FormMode::Update(4)));
    assert_eq!(FormMode::from_route(&Route::Sessions), None);
}

#[tokio::test]
async fn form_redirects_members() {
    let sessions = MockSessions::default();
    let init = FormPage::init(FormMode::Create, &sessions, &teachers(), &member_store())
        .await
        .unwrap();
    assert!(matches!(init, FormInit::Redirect(Route::Sessions)));
}

#[tokio::test]
async fn create_form_starts_empty_and_creates() {
    let sessions = MockSessions::default();
    let FormInit::Ready(mut page) = FormPage::init(FormMode::Create, &sessions, &teachers(), &admin_store())
        .await
        .unwrap()
    else {
        panic!("admin should get the form");
    };
    assert_eq!(page.form, SessionForm::default());
    assert_eq!(page.teachers.len(), 2);

    page.form = SessionForm {
        name: "Morning flow".into(),
        date: "2024-03-01".into(),
        teacher_id: Some(3),
        description: "Gentle start.".into(),
    };
    let (route, message) = page.submit(&sessions).await.unwrap();

    assert_eq!(route, Route::Sessions);
    assert_eq!(message, "Session created !");
    let stored = sessions.sessions.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].teacher_id, 3);
}

#[tokio::test]
async fn update_form_prefills_and_keeps_participants() {
    let sessions = MockSessions::with(vec![session(1, vec![4, 5])]);
    let FormInit::Ready(mut page) = FormPage::init(FormMode::Update(1), &sessions, &teachers(), &admin_store())
        .await
        .unwrap()
    else {
        panic!("admin should get the form");
    };
    assert_eq!(page.form.name, "Yoga");
    assert_eq!(page.form.teacher_id, Some(2));

    page.form.name = "Evening yoga".into();
    let (_, message) = page.submit(&sessions).await.unwrap();

    assert_eq!(message, "Session updated !");
    let stored = sessions.sessions.lock().unwrap();
    assert_eq!(stored[0].name, "Evening yoga");
    assert_eq!(stored[0].users, vec![4, 5]);
}

#[tokio::test]
async fn update_form_accepts_server_timestamp_date() {
    let sessions = MockSessions::with(vec![server_session(1, vec![7])]);
    let FormInit::Ready(mut page) = FormPage::init(FormMode::Update(1), &sessions, &teachers(), &admin_store())
        .await
        .unwrap()
    else {
        panic!("admin should get the form");
    };
    assert_eq!(page.form.date, "2024-01-01");

    page.form.name = "Renamed".into();
    let (route, message) = page.submit(&sessions).await.unwrap();

    assert_eq!(route, Route::Sessions);
    assert_eq!(message, "Session updated !");
    let stored = sessions.sessions.lock().unwrap();
    assert_eq!(stored[0].name, "Renamed");
    assert_eq!(stored[0].date, "2024-01-01");
    assert_eq!(stored[0].users, vec![7]);
}

#[tokio::test]
async fn detail_view_loads_server_shaped_session() {
    let sessions = MockSessions::with(vec![server_session(1, vec![1])]);
    let view = DetailView::load(&sessions, &teachers(), &member_store(), 1)
        .await
        .unwrap();
    assert_eq!(view.session.created_at.as_deref(), Some("2023-01-01T00:00:00"));
    assert!(view.is_participate);
}

#[tokio::test]
async fn invalid_form_is_not_submitted() {
    let sessions = MockSessions::default();
    let FormInit::Ready(page) = FormPage::init(FormMode::Create, &sessions, &teachers(), &admin_store())
        .await
        .unwrap()
    else {
        panic!("admin should get the form");
    };

    let Err(SubmitError::Invalid(errors)) = page.submit(&sessions).await else {
        panic!("empty form should be rejected");
    };
    assert_eq!(errors.len(), 4);
    assert!(!sessions.calls().iter().any(|c| c.starts_with("create")));
}
