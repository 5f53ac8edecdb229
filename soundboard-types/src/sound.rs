use serde::{Deserialize, Serialize};

/// A playable clip. `file` names an entry of the managed audio directory;
/// the reference is not checked when the document is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sound {
    pub name: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub sounds: Vec<Sound>,
}

/// The configuration document: an ordered list of categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundboardConfig {
    pub categories: Vec<Category>,
}

impl SoundboardConfig {
    /// Every file referenced by the document, in document order.
    pub fn referenced_files(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .flat_map(|c| c.sounds.iter())
            .map(|s| s.file.as_str())
    }
}
