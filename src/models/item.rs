//! Item catalogue served alongside every dashboard page.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Item catalogue keyed by item ID.
pub type Items = BTreeMap<String, Item>;

/// A single catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub emoji: Option<String>,
    /// Remaining catalogue fields, kept as-is for the frontend.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_keeps_unknown_fields() {
        let items: Items = serde_json::from_str(
            r#"{
                "lock_pick": {"id": "lock_pick", "name": "lock pick", "emoji": "🔓", "buy": 1000, "role": "tool"}
            }"#,
        )
        .unwrap();

        let item = &items["lock_pick"];
        assert_eq!(item.name, "lock pick");
        assert_eq!(item.extra["buy"], 1000);

        let json = serde_json::to_value(item).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["emoji"], "🔓");
    }
}
