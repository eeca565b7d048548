use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{ser::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Opaque, stable identifier of a shopping entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    #[serde(
        default,
        serialize_with = "serialize_price",
        deserialize_with = "deserialize_price"
    )]
    pub price: Decimal,
    #[serde(default)]
    pub checked: bool,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            checked: false,
        }
    }
}

/// Trims a display name, rejecting names that are blank.
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Absent and negative prices become zero.
pub fn coerce_price(price: Option<Decimal>) -> Decimal {
    match price {
        Some(price) if price.is_sign_positive() => price,
        _ => Decimal::ZERO,
    }
}

/// Parses free-form price input. Unparsable text yields zero rather than an error.
pub fn parse_price(raw: &str) -> Decimal {
    coerce_price(Decimal::from_str(raw.trim()).ok())
}

fn serialize_price<S>(price: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    // Exact decimal text as a JSON number; needs serde_json's `arbitrary_precision`.
    let number = serde_json::Number::from_str(&price.normalize().to_string())
        .map_err(S::Error::custom)?;
    number.serialize(serializer)
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let price = match raw {
        Some(serde_json::Value::Number(number)) => Decimal::from_str(&number.to_string())
            .or_else(|_| Decimal::from_scientific(&number.to_string()))
            .ok(),
        Some(serde_json::Value::String(text)) => Decimal::from_str(text.trim()).ok(),
        _ => None,
    };
    Ok(coerce_price(price))
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
