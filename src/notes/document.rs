use serde::{Deserialize, Deserializer, Serialize};

/// Structured meeting notes as produced by the summarization backend.
///
/// Every field is optional: the model may omit or null any of them, and the
/// renderer must cope. `null` deserializes to the field's default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotesDocument {
    #[serde(default, deserialize_with = "null_to_default")]
    pub header: NotesHeader,

    #[serde(default, deserialize_with = "null_to_default")]
    pub topics: Vec<Topic>,

    #[serde(default, deserialize_with = "null_to_default")]
    pub action_items: Vec<ActionItemGroup>,

    #[serde(default, deserialize_with = "null_to_default")]
    pub metanotes: Vec<String>,
}

/// Meeting metadata block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotesHeader {
    #[serde(default, deserialize_with = "null_to_default")]
    pub date: Option<String>,

    #[serde(default, deserialize_with = "null_to_default")]
    pub time: Option<String>,

    #[serde(default, deserialize_with = "null_to_default")]
    pub attendees: Vec<String>,

    #[serde(default, deserialize_with = "null_to_default")]
    pub subject: Option<String>,
}

/// One discussed topic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topic {
    #[serde(default, deserialize_with = "null_to_default")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "null_to_default")]
    pub time_range: Option<String>,

    #[serde(default, deserialize_with = "null_to_default")]
    pub bullets: Vec<String>,

    #[serde(default, deserialize_with = "null_to_default")]
    pub conclusion: Option<String>,
}

/// Action items for one owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionItemGroup {
    #[serde(default, deserialize_with = "null_to_default")]
    pub owner: Option<String>,

    #[serde(default, deserialize_with = "null_to_default")]
    pub items: Vec<ActionItem>,
}

/// A single action item, with an optional deadline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionItem {
    #[serde(default, deserialize_with = "null_to_default")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "null_to_default")]
    pub deadline: Option<String>,
}

fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
