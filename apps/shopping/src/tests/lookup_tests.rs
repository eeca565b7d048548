use super::*;
use list_core::{apply, Command};
use shared::domain::Item;

fn seeded(ids: &[&str]) -> ListState {
    let items = ids
        .iter()
        .map(|id| Item::new(ItemId::from(*id), format!("item {id}"), Default::default()))
        .collect();
    apply(
        ListState::new(),
        Command::Replace {
            items: Some(items),
            purchased_items: Some(vec![Item::new(
                ItemId::from("ffff-0000"),
                "bought",
                Default::default(),
            )]),
        },
    )
}

#[test]
fn exact_id_wins_even_when_it_prefixes_another() {
    let state = seeded(&["ab", "abc"]);
    assert_eq!(resolve_id(&state, "ab"), Ok(ItemId::from("ab")));
}

#[test]
fn unique_prefix_resolves() {
    let state = seeded(&["1234-aaaa", "5678-bbbb"]);
    assert_eq!(resolve_id(&state, " 56 "), Ok(ItemId::from("5678-bbbb")));
}

#[test]
fn prefix_reaches_purchased_items() {
    let state = seeded(&["1234-aaaa"]);
    assert_eq!(resolve_id(&state, "ff"), Ok(ItemId::from("ffff-0000")));
}

#[test]
fn ambiguous_prefix_is_reported() {
    let state = seeded(&["12-a", "12-b"]);
    assert_eq!(
        resolve_id(&state, "12"),
        Err(LookupError::Ambiguous {
            token: "12".to_string(),
            matches: 2
        })
    );
}

#[test]
fn unknown_and_blank_tokens_are_not_found() {
    let state = seeded(&["12-a"]);
    assert_eq!(
        resolve_id(&state, "zz"),
        Err(LookupError::NotFound("zz".to_string()))
    );
    assert_eq!(
        resolve_id(&state, ""),
        Err(LookupError::NotFound(String::new()))
    );
}
