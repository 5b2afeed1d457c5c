use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum CategoryId {
    Truth,
    Dare,
    Group,
    Challenge,
    Social,
    Wildcard,
    Partner,
}

impl CategoryId {
    pub const ALL: [CategoryId; 7] = [
        CategoryId::Truth,
        CategoryId::Dare,
        CategoryId::Group,
        CategoryId::Challenge,
        CategoryId::Social,
        CategoryId::Wildcard,
        CategoryId::Partner,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CategoryId::Truth => "truth",
            CategoryId::Dare => "dare",
            CategoryId::Group => "group",
            CategoryId::Challenge => "challenge",
            CategoryId::Social => "social",
            CategoryId::Wildcard => "wildcard",
            CategoryId::Partner => "partner",
        }
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        CategoryId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown category '{value}'"))
    }
}

/// Ordinal heat level of a card, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct Spicyness(u8);

impl Spicyness {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn clamped(level: i64) -> Self {
        Self(level.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl Default for Spicyness {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for Spicyness {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!(
                "spicyness {value} outside {}..={}",
                Self::MIN,
                Self::MAX
            ))
        }
    }
}

impl From<Spicyness> for u8 {
    fn from(value: Spicyness) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category_id: CategoryId,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub spicyness: Spicyness,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_players: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Card {
    pub fn new(id: impl Into<String>, title: impl Into<String>, category_id: CategoryId) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            category_id,
            tags: BTreeSet::new(),
            spicyness: Spicyness::default(),
            requires_players: None,
            created_at: None,
        }
    }

    pub fn with_required_players(mut self, players: u32) -> Self {
        self.requires_players = Some(players.max(1));
        self
    }

    /// Minimum number of players this card needs; cards without a requirement need one.
    pub fn min_players(&self) -> u32 {
        self.requires_players.unwrap_or(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: &'static str,
    pub color: &'static str,
}

impl Category {
    /// Parses the `#RRGGBB` color into its channels.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.color.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
        Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

pub const CATEGORIES: &[Category] = &[
    Category {
        id: CategoryId::Truth,
        name: "Truth",
        color: "#60A5FA",
    },
    Category {
        id: CategoryId::Dare,
        name: "Dare",
        color: "#F97316",
    },
    Category {
        id: CategoryId::Group,
        name: "Group",
        color: "#34D399",
    },
    Category {
        id: CategoryId::Challenge,
        name: "Challenge",
        color: "#F59E0B",
    },
    Category {
        id: CategoryId::Social,
        name: "Social",
        color: "#A78BFA",
    },
    Category {
        id: CategoryId::Wildcard,
        name: "Wildcard",
        color: "#F87171",
    },
    Category {
        id: CategoryId::Partner,
        name: "Partner",
        color: "#FB7185",
    },
];

/// Read-only lookup over the category table. Unknown ids resolve to the first entry.
#[derive(Debug, Clone, Copy)]
pub struct CategoryTable {
    entries: &'static [Category],
}

impl CategoryTable {
    /// `entries` must not be empty.
    pub const fn new(entries: &'static [Category]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'static [Category] {
        self.entries
    }

    pub fn default_category(&self) -> &'static Category {
        &self.entries[0]
    }

    pub fn find(&self, id: CategoryId) -> Option<&'static Category> {
        self.entries.iter().find(|category| category.id == id)
    }

    pub fn resolve(&self, id: CategoryId) -> &'static Category {
        self.find(id).unwrap_or_else(|| self.default_category())
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new(CATEGORIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ids_roundtrip_through_strings() {
        for id in CategoryId::ALL {
            assert_eq!(id.as_str().parse::<CategoryId>(), Ok(id));
        }
        assert_eq!(" Dare ".parse::<CategoryId>(), Ok(CategoryId::Dare));
        assert!("drinks".parse::<CategoryId>().is_err());
    }

    #[test]
    fn card_deserializes_from_camel_case_record() {
        let raw = r#"{
            "id": "c1",
            "title": "Tell a secret",
            "description": "Or drink twice",
            "categoryId": "truth",
            "tags": ["classic", "icebreaker"],
            "spicyness": 3,
            "requiresPlayers": 2
        }"#;
        let card: Card = serde_json::from_str(raw).expect("parse card");
        assert_eq!(card.category_id, CategoryId::Truth);
        assert_eq!(card.spicyness.level(), 3);
        assert_eq!(card.min_players(), 2);
        assert!(card.tags.contains("icebreaker"));
    }

    #[test]
    fn spicyness_rejects_out_of_range_levels() {
        let raw = r#"{"id":"c1","title":"t","description":"","categoryId":"dare","spicyness":9}"#;
        assert!(serde_json::from_str::<Card>(raw).is_err());
        assert_eq!(Spicyness::clamped(9).level(), 5);
        assert_eq!(Spicyness::clamped(-2).level(), 1);
    }

    #[test]
    fn table_falls_back_to_first_entry() {
        static PARTIAL: &[Category] = &[Category {
            id: CategoryId::Dare,
            name: "Dare",
            color: "#F97316",
        }];
        let table = CategoryTable::new(PARTIAL);
        assert_eq!(table.resolve(CategoryId::Partner).id, CategoryId::Dare);
        assert_eq!(
            CategoryTable::default().resolve(CategoryId::Social).name,
            "Social"
        );
    }

    #[test]
    fn category_color_parses_hex() {
        let truth = CategoryTable::default().resolve(CategoryId::Truth);
        assert_eq!(truth.rgb(), Some((0x60, 0xA5, 0xFA)));
    }
}
