use list_core::{select_total, ListState};
use rust_decimal::{Decimal, RoundingStrategy};
use shared::domain::Item;

const SHORT_ID_LEN: usize = 8;

/// Two fraction digits behind the configured currency prefix.
pub fn format_amount(amount: Decimal, currency_prefix: &str) -> String {
    let mut amount = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    amount.rescale(2);
    format!("{currency_prefix}{amount}")
}

pub fn short_id(item: &Item) -> &str {
    let id = item.id.as_str();
    id.char_indices()
        .nth(SHORT_ID_LEN)
        .map_or(id, |(end, _)| &id[..end])
}

pub fn render_list(state: &ListState, currency_prefix: &str) -> String {
    let mut out = String::new();

    out.push_str("To buy:\n");
    push_section(&mut out, state.items(), currency_prefix);
    out.push_str("Purchased:\n");
    push_section(&mut out, state.purchased_items(), currency_prefix);
    out.push_str(&render_total(state, currency_prefix));
    out
}

pub fn render_total(state: &ListState, currency_prefix: &str) -> String {
    format!(
        "Total: {}\n",
        format_amount(select_total(state), currency_prefix)
    )
}

fn push_section(out: &mut String, items: &[Item], currency_prefix: &str) {
    if items.is_empty() {
        out.push_str("  (none)\n");
        return;
    }
    for item in items {
        let mark = if item.checked { 'x' } else { ' ' };
        out.push_str(&format!(
            "  [{mark}] {:<8}  {}  {}\n",
            short_id(item),
            item.name,
            format_amount(item.price, currency_prefix)
        ));
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
