use crate::domain::Item;

/// Storage key holding the active (unpurchased) collection.
pub const SHOPPING_LIST_KEY: &str = "shoppingList";
/// Storage key holding the purchased collection.
pub const PURCHASED_ITEMS_KEY: &str = "purchasedItems";

pub fn encode_items(items: &[Item]) -> serde_json::Result<String> {
    serde_json::to_string(items)
}

/// Parses one persisted record. Any shape error fails the whole record.
pub fn decode_items(raw: &str) -> serde_json::Result<Vec<Item>> {
    serde_json::from_str(raw)
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
