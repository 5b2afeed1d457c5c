use crate::schema::{CardFile, RawCard};
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use sipdeck_core::{Card, CategoryId, CategoryTable, DeckConfig, Spicyness};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::warn;

pub const CARD_FILE_VERSION: u32 = 1;

const EMBEDDED_CARDS: &str = include_str!("../../../assets/cards.json");

#[derive(Debug, Default)]
pub struct CardLoadReport {
    pub cards: Vec<Card>,
    pub warnings: Vec<String>,
}

pub fn load_cards(path: &Path) -> anyhow::Result<CardLoadReport> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_cards(&raw).with_context(|| format!("parse {}", path.display()))
}

/// The deck bundled with the binary.
pub fn embedded_cards() -> anyhow::Result<CardLoadReport> {
    parse_cards(EMBEDDED_CARDS).context("parse embedded cards")
}

pub fn parse_cards(raw: &str) -> anyhow::Result<CardLoadReport> {
    let file: CardFile = serde_json::from_str(raw)?;
    if let CardFile::Versioned(versioned) = &file {
        if versioned.version > CARD_FILE_VERSION {
            bail!(
                "unsupported card file version {} (expected at most {})",
                versioned.version,
                CARD_FILE_VERSION
            );
        }
    }
    let report = normalize_cards(file.into_cards(), CategoryTable::default());
    for warning in &report.warnings {
        warn!("{warning}");
    }
    Ok(report)
}

/// Turns raw records into playable cards. Unknown categories fall back to the
/// table's first entry, levels are clamped and duplicate ids are dropped.
pub fn normalize_cards(raw: Vec<RawCard>, categories: CategoryTable) -> CardLoadReport {
    let mut report = CardLoadReport::default();
    let mut seen = HashSet::new();
    for item in raw {
        let id = item.id.trim().to_string();
        if id.is_empty() {
            report
                .warnings
                .push(format!("card '{}' has an empty id, skipped", item.title));
            continue;
        }
        if !seen.insert(id.clone()) {
            report
                .warnings
                .push(format!("duplicate card id '{id}', skipped"));
            continue;
        }
        let category_id = match item.category_id.parse::<CategoryId>() {
            Ok(category) => category,
            Err(_) => {
                let fallback = categories.default_category().id;
                report.warnings.push(format!(
                    "card '{id}' has unknown category '{}', using {fallback}",
                    item.category_id
                ));
                fallback
            }
        };
        let spicyness = Spicyness::clamped(item.spicyness);
        if i64::from(spicyness.level()) != item.spicyness {
            report.warnings.push(format!(
                "card '{id}' spicyness {} clamped to {}",
                item.spicyness,
                spicyness.level()
            ));
        }
        let requires_players = item.requires_players.map(|players| {
            if players < 1 {
                report
                    .warnings
                    .push(format!("card '{id}' requires {players} players, using 1"));
            }
            players.clamp(1, i64::from(u32::MAX)) as u32
        });
        report.cards.push(Card {
            id,
            title: item.title,
            description: item.description,
            category_id,
            tags: item.tags.into_iter().collect(),
            spicyness,
            requires_players,
            created_at: item.created_at,
        });
    }
    report
}

pub fn load_deck_config(path: &Path) -> anyhow::Result<DeckConfig> {
    let config: DeckConfig = load_json(path)?;
    if !config.swipe_threshold.is_finite() || config.swipe_threshold <= 0.0 {
        bail!(
            "swipe_threshold must be positive, got {}",
            config.swipe_threshold
        );
    }
    Ok(config)
}

/// Reads the config at `path` when it exists, defaults otherwise.
pub fn load_deck_config_or_default(path: Option<&Path>) -> anyhow::Result<DeckConfig> {
    match path {
        Some(path) if path.exists() => load_deck_config(path),
        _ => Ok(DeckConfig::default()),
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
