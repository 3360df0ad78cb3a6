use serde::{Deserialize, Serialize};

/// Catalog entry describing a module, as listed in `questions_index.json`.
///
/// Only the presentation layer reads these; sessions are keyed by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub question_count: u32,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
}
