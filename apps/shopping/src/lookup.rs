use list_core::ListState;
use shared::domain::ItemId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("no item matches '{0}'")]
    NotFound(String),
    #[error("'{token}' matches {matches} items; use more characters")]
    Ambiguous { token: String, matches: usize },
}

/// Resolves a full id or a unique id prefix across both collections.
pub fn resolve_id(state: &ListState, token: &str) -> Result<ItemId, LookupError> {
    let token = token.trim();
    let exact = ItemId::from(token);
    if state.contains(&exact) {
        return Ok(exact);
    }

    let matches: Vec<&ItemId> = state
        .items()
        .iter()
        .chain(state.purchased_items())
        .map(|item| &item.id)
        .filter(|id| !token.is_empty() && id.as_str().starts_with(token))
        .collect();

    match matches.as_slice() {
        [id] => Ok((*id).clone()),
        [] => Err(LookupError::NotFound(token.to_string())),
        many => Err(LookupError::Ambiguous {
            token: token.to_string(),
            matches: many.len(),
        }),
    }
}

#[cfg(test)]
#[path = "tests/lookup_tests.rs"]
mod tests;
