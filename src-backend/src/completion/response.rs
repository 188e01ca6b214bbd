//! Completion payload validation.
//!
//! The completion content is untrusted: it is parsed through an explicit
//! schema and every failure maps to one `AiResponseError` sub-code.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{AiResponseError, MergeCandidate, TargetList};
use super::types::ChatCompletion;

#[derive(Deserialize)]
struct Product {
    name: String,
    #[serde(default)]
    purchased: Option<bool>,
}

/// Extract the target list from the first choice of `completion`
pub fn parse_target_list(completion: &ChatCompletion, max_products: usize) -> Result<TargetList, AiResponseError> {
    let choice = completion.choices.first().ok_or(AiResponseError::NoChoices)?;
    let content = choice
        .message
        .as_ref()
        .and_then(|m| m.content.as_deref())
        .filter(|c| !c.trim().is_empty())
        .ok_or(AiResponseError::NoContent)?;

    let value: Value = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| AiResponseError::InvalidJson(e.to_string()))?;

    let products = value
        .as_object()
        .and_then(|obj| obj.get("products"))
        .ok_or(AiResponseError::MissingProducts)?;

    let products: Vec<Product> = serde_json::from_value(products.clone())
        .map_err(|e| AiResponseError::InvalidJson(format!("products: {}", e)))?;

    let candidates = products
        .into_iter()
        .map(|p| MergeCandidate::new(p.name, p.purchased.unwrap_or(false)))
        .collect();

    Ok(TargetList::from_candidates(candidates, max_products))
}

/// Unwrap a Markdown code fence (```json ... ```) if the model added one
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // drop the info string ("json") on the opening line
    match rest.split_once('\n') {
        Some((_, body)) => body.trim(),
        None => rest.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{ChatMessage, Choice};

    fn parse(content: &str) -> Result<TargetList, AiResponseError> {
        parse_target_list(&ChatCompletion::with_content(content), 50)
    }

    #[test]
    fn test_valid_products() {
        let list = parse(r#"{"products": [{"name": "milk", "purchased": true}, {"name": "eggs"}]}"#).unwrap();
        assert_eq!(
            list.items(),
            &[MergeCandidate::new("milk", true), MergeCandidate::new("eggs", false)]
        );
    }

    #[test]
    fn test_empty_products_is_valid() {
        assert!(parse(r#"{"products": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_no_choices() {
        let err = parse_target_list(&ChatCompletion::default(), 50).unwrap_err();
        assert_eq!(err, AiResponseError::NoChoices);
    }

    #[test]
    fn test_no_content() {
        let completion = ChatCompletion {
            choices: vec![Choice { message: None }],
        };
        assert_eq!(parse_target_list(&completion, 50).unwrap_err(), AiResponseError::NoContent);

        let completion = ChatCompletion {
            choices: vec![Choice {
                message: Some(ChatMessage { content: Some("  ".into()) }),
            }],
        };
        assert_eq!(parse_target_list(&completion, 50).unwrap_err(), AiResponseError::NoContent);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse("products: milk"), Err(AiResponseError::InvalidJson(_))));
        // name must be a string
        assert!(matches!(parse(r#"{"products": [{"name": 3}]}"#), Err(AiResponseError::InvalidJson(_))));
        assert!(matches!(parse(r#"{"products": [{"purchased": true}]}"#), Err(AiResponseError::InvalidJson(_))));
    }

    #[test]
    fn test_missing_products() {
        assert_eq!(parse(r#"{"items": []}"#).unwrap_err(), AiResponseError::MissingProducts);
        assert_eq!(parse("[1, 2]").unwrap_err(), AiResponseError::MissingProducts);
    }

    #[test]
    fn test_code_fence_is_unwrapped() {
        let list = parse("```json\n{\"products\": [{\"name\": \"tea\"}]}\n```").unwrap();
        assert_eq!(list.items(), &[MergeCandidate::new("tea", false)]);
    }

    #[test]
    fn test_truncates_to_limit() {
        let products: Vec<String> = (0..70).map(|i| format!("{{\"name\": \"p{}\"}}", i)).collect();
        let content = format!("{{\"products\": [{}]}}", products.join(","));
        let list = parse_target_list(&ChatCompletion::with_content(content), 50).unwrap();
        assert_eq!(list.len(), 50);
        assert_eq!(list.items()[49].name, "p49");
    }
}
