//! Deserializers for profile rows coming out of the hosted store.
//!
//! Rows are loosely typed: ids may be integers or uuids, optional columns may
//! be `null`, and older rows keep list columns as comma-separated text. These
//! helpers fold all of that into plain defaults so downstream code never sees
//! an `Option`.

use serde::{Deserialize, Deserializer};

/// Accept a string or an integer id and keep it as a string.
pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Int(id) => id.to_string(),
    })
}

/// `null` becomes the empty string.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `null` becomes `false`.
pub fn bool_or_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// A list column: JSON array, comma-separated string, or `null`.
///
/// Null array items and blank entries are dropped.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawList {
        Items(Vec<Option<String>>),
        Joined(String),
    }

    let items = match Option::<RawList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(RawList::Items(items)) => items
            .into_iter()
            .flatten()
            .filter(|item| !item.trim().is_empty())
            .collect(),
        Some(RawList::Joined(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect(),
    };

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(deserialize_with = "id_string")]
        id: String,
        #[serde(default, deserialize_with = "string_list")]
        tags: Vec<String>,
        #[serde(default, deserialize_with = "string_or_empty")]
        label: String,
        #[serde(default, deserialize_with = "bool_or_false")]
        flag: bool,
    }

    #[test]
    fn test_integer_id_becomes_string() {
        let row: Row = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(row.id, "42");
        assert!(row.tags.is_empty());
        assert_eq!(row.label, "");
        assert!(!row.flag);
    }

    #[test]
    fn test_nulls_fold_to_defaults() {
        let row: Row =
            serde_json::from_str(r#"{"id": "a", "tags": null, "label": null, "flag": null}"#)
                .unwrap();
        assert!(row.tags.is_empty());
        assert_eq!(row.label, "");
        assert!(!row.flag);
    }

    #[test]
    fn test_comma_separated_list() {
        let row: Row = serde_json::from_str(r#"{"id": "a", "tags": "rust, go ,, python"}"#).unwrap();
        assert_eq!(row.tags, vec!["rust", "go", "python"]);
    }

    #[test]
    fn test_array_list_drops_null_and_blank_items() {
        let row: Row = serde_json::from_str(r#"{"id": "a", "tags": ["ml", null, "  ", "ai"]}"#).unwrap();
        assert_eq!(row.tags, vec!["ml", "ai"]);
    }
}
