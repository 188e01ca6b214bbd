//! Command Tests
//!
//! End-to-end through the command layer with in-memory SQLite and a
//! scripted completion capability.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::commands::*;
use crate::completion::{ChatCompletion, CompletionRequest, TextCompletion};
use crate::config::AppConfig;
use crate::domain::{AiResponseError, DomainError, DomainResult, ItemPatch};
use crate::AppState;

/// Replies with a fixed completion and records the requests it saw
struct ScriptedCompletion {
    reply: DomainResult<ChatCompletion>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    fn content(content: &str) -> Arc<Self> {
        Self::reply(Ok(ChatCompletion::with_content(content)))
    }

    fn reply(reply: DomainResult<ChatCompletion>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TextCompletion for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> DomainResult<ChatCompletion> {
        self.requests.lock().unwrap().push(request);
        tokio::task::yield_now().await;
        self.reply.clone()
    }
}

async fn setup(completion: Arc<ScriptedCompletion>) -> (AppState, String) {
    let config = AppConfig {
        db_path: PathBuf::from(":memory:"),
        ..AppConfig::default()
    };
    let state = AppState::open(config, completion).await.expect("open state");
    let session = sign_in(&state, "alice").await.unwrap();
    (state, session.token)
}

/// List "Weekly" with milk (not purchased) and bread (purchased)
async fn seed(state: &AppState, token: &str) -> (String, String, String) {
    let list = create_list(state, token, "Weekly").await.unwrap();
    let milk = create_item(state, token, &list.id, "milk", false).await.unwrap();
    let bread = create_item(state, token, &list.id, "bread", true).await.unwrap();
    (list.id, milk.id, bread.id)
}

#[tokio::test]
async fn test_merge_adds_and_removes() {
    let completion = ScriptedCompletion::content(
        r#"{"products": [{"name": "milk", "purchased": false}, {"name": "eggs", "purchased": false}]}"#,
    );
    let (state, token) = setup(completion.clone()).await;
    let (list_id, milk_id, _) = seed(&state, &token).await;

    let items = merge_free_text(&state, &token, &list_id, "add eggs, remove bread").await.unwrap().items;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, milk_id);
    assert!(!items[0].purchased);
    assert_eq!(items[1].name, "eggs");
    assert!(!items[1].purchased);

    let requests = completion.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].user_content.contains("add eggs, remove bread"));
    assert!(requests[0].user_content.contains("\"bread\""));
}

#[tokio::test]
async fn test_merge_keeps_purchased_status_of_kept_items() {
    let completion = ScriptedCompletion::content(
        r#"{"products": [{"name": "MILK", "purchased": true}, {"name": "Bread", "purchased": false}]}"#,
    );
    let (state, token) = setup(completion).await;
    let (list_id, milk_id, bread_id) = seed(&state, &token).await;

    let items = merge_free_text(&state, &token, &list_id, "nothing really").await.unwrap().items;

    assert_eq!(items.len(), 2);
    assert_eq!((items[0].id.as_str(), items[0].purchased), (milk_id.as_str(), false));
    assert_eq!((items[1].id.as_str(), items[1].purchased), (bread_id.as_str(), true));
}

#[tokio::test]
async fn test_merge_with_empty_products_clears_list() {
    let (state, token) = setup(ScriptedCompletion::content(r#"{"products": []}"#)).await;
    let (list_id, _, _) = seed(&state, &token).await;

    let items = merge_free_text(&state, &token, &list_id, "clear everything").await.unwrap().items;
    assert!(items.is_empty());
    assert!(get_list_details(&state, &token, &list_id).await.unwrap().items.is_empty());
}

#[tokio::test]
async fn test_merge_returns_refreshed_list_header() {
    let (state, token) = setup(ScriptedCompletion::content(r#"{"products": [{"name": "milk"}]}"#)).await;
    let (list_id, _, _) = seed(&state, &token).await;
    let before = get_list_details(&state, &token, &list_id).await.unwrap().list;

    let details = merge_free_text(&state, &token, &list_id, "only milk").await.unwrap();

    assert_eq!(details.list.id, list_id);
    assert_eq!(details.list.title, "Weekly");
    assert!(details.list.updated_at >= before.updated_at);
    assert_eq!(details, get_list_details(&state, &token, &list_id).await.unwrap());
}

#[tokio::test]
async fn test_bad_completion_leaves_store_untouched() {
    let (state, token) = setup(ScriptedCompletion::content(r#"{"items": []}"#)).await;
    let (list_id, _, _) = seed(&state, &token).await;

    let err = merge_free_text(&state, &token, &list_id, "add eggs").await.unwrap_err();
    assert_eq!(err, DomainError::AiResponse(AiResponseError::MissingProducts));
    assert_eq!(get_list_details(&state, &token, &list_id).await.unwrap().items.len(), 2);
}

#[tokio::test]
async fn test_completion_failure_is_surfaced() {
    let (state, token) = setup(ScriptedCompletion::reply(Err(DomainError::network(Some(503), "overloaded")))).await;
    let (list_id, _, _) = seed(&state, &token).await;

    let err = merge_free_text(&state, &token, &list_id, "add eggs").await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(get_list_details(&state, &token, &list_id).await.unwrap().items.len(), 2);
}

#[tokio::test]
async fn test_concurrent_merge_on_same_list_is_refused() {
    let (state, token) = setup(ScriptedCompletion::content(r#"{"products": [{"name": "milk"}]}"#)).await;
    let (list_id, _, _) = seed(&state, &token).await;

    let (first, second) = tokio::join!(
        merge_free_text(&state, &token, &list_id, "only milk"),
        merge_free_text(&state, &token, &list_id, "only milk"),
    );
    assert!(first.is_ok());
    assert!(matches!(second, Err(DomainError::Conflict(_))));

    // guard released afterwards
    assert!(merge_free_text(&state, &token, &list_id, "only milk").await.is_ok());
}

#[tokio::test]
async fn test_merge_rejects_empty_text_and_foreign_lists() {
    let (state, token) = setup(ScriptedCompletion::content(r#"{"products": []}"#)).await;
    let (list_id, _, _) = seed(&state, &token).await;

    assert!(merge_free_text(&state, &token, &list_id, "   ").await.unwrap_err().is_validation());

    let mallory = sign_in(&state, "mallory").await.unwrap();
    let err = merge_free_text(&state, &mallory.token, &list_id, "clear").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
    assert_eq!(get_list_details(&state, &token, &list_id).await.unwrap().items.len(), 2);
}

#[tokio::test]
async fn test_commands_require_a_session() {
    let (state, token) = setup(ScriptedCompletion::content("{}")).await;
    let (list_id, _, _) = seed(&state, &token).await;

    let err = get_list_details(&state, "bogus", &list_id).await.unwrap_err();
    assert!(err.is_auth_failure());

    sign_out(&state, &token).await.unwrap();
    assert!(list_lists(&state, &token).await.unwrap_err().is_auth_failure());
}

#[tokio::test]
async fn test_update_title_trims_and_conflicts() {
    let (state, token) = setup(ScriptedCompletion::content("{}")).await;
    let (list_id, _, _) = seed(&state, &token).await;
    create_list(&state, &token, "Party").await.unwrap();

    let updated = update_list_title(&state, &token, &list_id, "  Groceries  ").await.unwrap();
    assert_eq!(updated.title, "Groceries");

    let err = update_list_title(&state, &token, &list_id, "Party").await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
    assert!(update_list_title(&state, &token, &list_id, "").await.unwrap_err().is_validation());
}

#[tokio::test]
async fn test_item_commands() {
    let (state, token) = setup(ScriptedCompletion::content("{}")).await;
    let (list_id, milk_id, bread_id) = seed(&state, &token).await;

    let toggled = update_item(&state, &token, &list_id, &milk_id, ItemPatch::purchased(true)).await.unwrap();
    assert!(toggled.purchased);
    assert_eq!(toggled.id, milk_id);

    let renamed = update_item(&state, &token, &list_id, &milk_id, ItemPatch::name(" oat milk ")).await.unwrap();
    assert_eq!(renamed.name, "oat milk");
    assert!(renamed.purchased);

    assert!(update_item(&state, &token, &list_id, &milk_id, ItemPatch::default()).await.unwrap_err().is_validation());

    delete_item(&state, &token, &list_id, &bread_id).await.unwrap();
    let err = delete_item(&state, &token, &list_id, &bread_id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));

    let details = get_list_details(&state, &token, &list_id).await.unwrap();
    assert_eq!(details.items.len(), 1);
    assert_eq!(details.list.title, "Weekly");
}

#[tokio::test]
async fn test_items_cannot_be_reached_through_another_list() {
    let (state, token) = setup(ScriptedCompletion::content("{}")).await;
    let (_, milk_id, _) = seed(&state, &token).await;
    let other = create_list(&state, &token, "Other").await.unwrap();

    let err = update_item(&state, &token, &other.id, &milk_id, ItemPatch::purchased(true)).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_list() {
    let (state, token) = setup(ScriptedCompletion::content("{}")).await;
    let (list_id, _, _) = seed(&state, &token).await;

    delete_list(&state, &token, &list_id).await.unwrap();
    assert!(list_lists(&state, &token).await.unwrap().is_empty());
    assert!(matches!(get_list_details(&state, &token, &list_id).await, Err(DomainError::NotFound(_))));
}
