use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder stored for any text field the API left out.
pub const UNKNOWN: &str = "UNKNOWN";

/// Stored when the API omitted `card_count`.
pub const UNKNOWN_CARD_COUNT: i64 = -1;

/// Closed set-type enumeration. Tags the API adds later land in `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetType {
    Core,
    Expansion,
    Masters,
    Alchemy,
    Masterpiece,
    Arsenal,
    FromTheVault,
    Spellbook,
    PremiumDeck,
    DuelDeck,
    DraftInnovation,
    TreasureChest,
    Commander,
    Planechase,
    Archenemy,
    Vanguard,
    Funny,
    Starter,
    Box,
    Promo,
    Token,
    Memorabilia,
    Minigame,
    Unknown,
}

impl SetType {
    pub const ALL: [SetType; 24] = [
        SetType::Core,
        SetType::Expansion,
        SetType::Masters,
        SetType::Alchemy,
        SetType::Masterpiece,
        SetType::Arsenal,
        SetType::FromTheVault,
        SetType::Spellbook,
        SetType::PremiumDeck,
        SetType::DuelDeck,
        SetType::DraftInnovation,
        SetType::TreasureChest,
        SetType::Commander,
        SetType::Planechase,
        SetType::Archenemy,
        SetType::Vanguard,
        SetType::Funny,
        SetType::Starter,
        SetType::Box,
        SetType::Promo,
        SetType::Token,
        SetType::Memorabilia,
        SetType::Minigame,
        SetType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SetType::Core => "core",
            SetType::Expansion => "expansion",
            SetType::Masters => "masters",
            SetType::Alchemy => "alchemy",
            SetType::Masterpiece => "masterpiece",
            SetType::Arsenal => "arsenal",
            SetType::FromTheVault => "from_the_vault",
            SetType::Spellbook => "spellbook",
            SetType::PremiumDeck => "premium_deck",
            SetType::DuelDeck => "duel_deck",
            SetType::DraftInnovation => "draft_innovation",
            SetType::TreasureChest => "treasure_chest",
            SetType::Commander => "commander",
            SetType::Planechase => "planechase",
            SetType::Archenemy => "archenemy",
            SetType::Vanguard => "vanguard",
            SetType::Funny => "funny",
            SetType::Starter => "starter",
            SetType::Box => "box",
            SetType::Promo => "promo",
            SetType::Token => "token",
            SetType::Memorabilia => "memorabilia",
            SetType::Minigame => "minigame",
            SetType::Unknown => "unknown",
        }
    }

    /// Exact tag lookup; `None` for anything outside the enumeration.
    pub fn parse_known(tag: &str) -> Option<SetType> {
        Self::ALL.iter().copied().find(|t| t.as_str() == tag)
    }

    /// Total mapping used during normalization.
    pub fn from_tag(tag: &str) -> SetType {
        Self::parse_known(tag).unwrap_or(SetType::Unknown)
    }
}

impl fmt::Display for SetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog set as stored by the pipeline. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MtgSet {
    pub code: String,
    pub name: String,
    pub set_type: SetType,
    pub digital: bool,
    pub search_uri: String,
    pub released_at: String,
    pub card_count: i64,
    pub icon_svg_uri: String,
}

impl MtgSet {
    pub fn to_row(&self) -> SetRow {
        SetRow {
            name: self.name.clone(),
            code: self.code.clone(),
            set_type: self.set_type.as_str().to_string(),
            digital: self.digital,
            released_at: self.released_at.clone(),
            card_count: self.card_count,
            search_uri: self.search_uri.clone(),
            icon_uri: self.icon_svg_uri.clone(),
        }
    }
}

impl fmt::Display for MtgSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.code)
    }
}

/// Column tuple for the `mtg_set` table, in insert order:
/// name, code, set_type, digital, released_at, card_count, search_uri, icon_uri.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRow {
    pub name: String,
    pub code: String,
    pub set_type: String,
    pub digital: bool,
    pub released_at: String,
    pub card_count: i64,
    pub search_uri: String,
    pub icon_uri: String,
}

/// One row of the outbound request audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLogEntry {
    pub url: String,
    pub headers: String,
    /// `None` when the request never produced a response.
    pub response_code: Option<u16>,
    pub error: Option<String>,
}

/// Raw page bodies in fetch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResponse {
    pub total: usize,
    pub pages: Vec<serde_json::Value>,
}

impl PageResponse {
    pub fn push(&mut self, page: serde_json::Value) {
        self.pages.push(page);
        self.total += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved { bytes: usize },
    Failed { status: u16 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Sets that survived filtering, plus how many were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformResult {
    pub sets: Vec<MtgSet>,
    pub excluded: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub icons: SyncReport,
    pub persisted: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages: usize,
    pub normalized: usize,
    pub kept: usize,
    pub excluded: usize,
    pub icons: SyncReport,
    pub persisted: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_type_tags_round_trip_through_from_tag() {
        for set_type in SetType::ALL {
            assert_eq!(SetType::from_tag(set_type.as_str()), set_type);
        }
    }

    #[test]
    fn test_unrecognized_tags_map_to_unknown() {
        assert_eq!(SetType::from_tag("alchemy_rebalance"), SetType::Unknown);
        assert_eq!(SetType::from_tag(""), SetType::Unknown);
        assert_eq!(SetType::from_tag("Core"), SetType::Unknown);
        assert_eq!(SetType::parse_known("Core"), None);
    }

    #[test]
    fn test_serde_uses_api_tags() {
        let json = serde_json::to_string(&SetType::FromTheVault).unwrap();
        assert_eq!(json, "\"from_the_vault\"");
        let parsed: SetType = serde_json::from_str("\"duel_deck\"").unwrap();
        assert_eq!(parsed, SetType::DuelDeck);
        assert!(serde_json::from_str::<SetType>("\"not_a_type\"").is_err());
    }

    #[test]
    fn test_row_uses_storage_column_order() {
        let set = MtgSet {
            code: "neo".to_string(),
            name: "Kamigawa: Neon Dynasty".to_string(),
            set_type: SetType::Expansion,
            digital: false,
            search_uri: "https://api.scryfall.com/cards/search?q=e%3Aneo".to_string(),
            released_at: "2022-02-18".to_string(),
            card_count: 512,
            icon_svg_uri: "https://svgs.scryfall.io/sets/neo.svg".to_string(),
        };

        let row = set.to_row();
        assert_eq!(row.name, "Kamigawa: Neon Dynasty");
        assert_eq!(row.code, "neo");
        assert_eq!(row.set_type, "expansion");
        assert_eq!(row.icon_uri, "https://svgs.scryfall.io/sets/neo.svg");
        assert_eq!(set.to_string(), "Kamigawa: Neon Dynasty [neo]");
    }
}
