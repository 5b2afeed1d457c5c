use serde::Deserialize;

/// Card record as found in data files, before normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCard {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "category")]
    pub category_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_spicyness")]
    pub spicyness: i64,
    #[serde(default)]
    pub requires_players: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_spicyness() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionedCards {
    pub version: u32,
    pub cards: Vec<RawCard>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CardFile {
    Versioned(VersionedCards),
    Bare(Vec<RawCard>),
}

impl CardFile {
    pub fn into_cards(self) -> Vec<RawCard> {
        match self {
            CardFile::Versioned(file) => file.cards,
            CardFile::Bare(cards) => cards,
        }
    }
}
