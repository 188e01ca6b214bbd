//! Prompt construction for list merges.

use serde::Serialize;

use crate::domain::ShoppingListItem;
use super::types::CompletionRequest;

pub const MERGE_SYSTEM_INSTRUCTION: &str = "You maintain a shopping list. \
You receive the current items as JSON and a free-text request from the user. \
Reply with a JSON object of the form {\"products\": [{\"name\": string, \"purchased\": boolean}]} \
holding the COMPLETE target list after applying the request. \
Add the items the request adds, including quantity annotations it implies (for example \"eggs (12)\"). \
Items the user asks to remove must be absent from the result. \
Items the request does not mention must be kept with their original name and purchased status. \
Reply with the JSON object only.";

#[derive(Serialize)]
struct PromptItem<'a> {
    name: &'a str,
    purchased: bool,
}

/// Request for merging `text` into `items`
pub fn build_request(items: &[ShoppingListItem], text: &str) -> CompletionRequest {
    let current: Vec<PromptItem<'_>> = items
        .iter()
        .map(|item| PromptItem {
            name: &item.name,
            purchased: item.purchased,
        })
        .collect();
    // Vec of plain structs always serializes
    let current_json = serde_json::to_string(&current).unwrap_or_else(|_| "[]".to_string());

    CompletionRequest {
        system_instruction: MERGE_SYSTEM_INSTRUCTION.to_string(),
        user_content: format!("Current items:\n{}\n\nRequest:\n{}", current_json, text.trim()),
    }
}
