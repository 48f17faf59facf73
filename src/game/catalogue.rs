//! Game catalogue.
//!
//! The lobby's list of challenge games. Entries without an engine behind
//! them are listed but not playable.

use serde::Serialize;

use super::config::{GameKind, SessionConfig};

/// Advertised difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Difficulty {
    /// Easy.
    Easy,
    /// Medium.
    Medium,
    /// Hard.
    Hard,
}

/// One catalogue listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogueEntry {
    /// Stable slug.
    pub slug: &'static str,
    /// Display name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Advertised round length in seconds.
    pub duration_secs: u32,
    /// Advertised difficulty.
    pub difficulty: Difficulty,
    /// Lobby capacity.
    pub max_players: u32,
    /// Engine that runs the game, if any.
    pub kind: Option<GameKind>,
}

impl CatalogueEntry {
    /// Whether the game can be started.
    pub fn is_available(&self) -> bool {
        self.kind.is_some()
    }

    /// Session preset for a playable game.
    pub fn session_config(&self) -> Option<SessionConfig> {
        self.kind.map(SessionConfig::for_game)
    }
}

const CATALOGUE: [CatalogueEntry; 6] = [
    CatalogueEntry {
        slug: "speed-clicker",
        name: "Lightning Clicker Championship",
        description: "Click as fast as you can in 10 seconds!",
        duration_secs: 10,
        difficulty: Difficulty::Easy,
        max_players: 100,
        kind: Some(GameKind::SpeedClicker),
    },
    CatalogueEntry {
        slug: "memory-chain",
        name: "Memory Master Arena",
        description: "Memorize and repeat color sequences",
        duration_secs: 300,
        difficulty: Difficulty::Medium,
        max_players: 50,
        kind: Some(GameKind::MemoryChain),
    },
    CatalogueEntry {
        slug: "word-blitz",
        name: "Word Blitz Showdown",
        description: "Type words at lightning speed",
        duration_secs: 60,
        difficulty: Difficulty::Hard,
        max_players: 200,
        kind: Some(GameKind::WordBlitz),
    },
    CatalogueEntry {
        slug: "reaction-time",
        name: "Reaction Royale",
        description: "React to visual cues instantly",
        duration_secs: 45,
        difficulty: Difficulty::Medium,
        max_players: 300,
        kind: None,
    },
    CatalogueEntry {
        slug: "number-ninja",
        name: "Number Ninja Dojo",
        description: "Solve math problems quickly",
        duration_secs: 120,
        difficulty: Difficulty::Hard,
        max_players: 75,
        kind: Some(GameKind::NumberNinja),
    },
    CatalogueEntry {
        slug: "pattern-samurai",
        name: "Pattern Pro League",
        description: "Copy visual patterns perfectly",
        duration_secs: 90,
        difficulty: Difficulty::Medium,
        max_players: 120,
        kind: None,
    },
];

/// All listings in lobby order.
pub fn entries() -> &'static [CatalogueEntry] {
    &CATALOGUE
}

/// Playable listings.
pub fn available() -> impl Iterator<Item = &'static CatalogueEntry> {
    CATALOGUE.iter().filter(|entry| entry.is_available())
}

/// Look up a listing by slug.
pub fn find(slug: &str) -> Option<&'static CatalogueEntry> {
    CATALOGUE.iter().find(|entry| entry.slug == slug)
}

/// Case-insensitive name search. An empty term matches everything.
pub fn search(term: &str) -> Vec<&'static CatalogueEntry> {
    let term = term.to_lowercase();
    CATALOGUE
        .iter()
        .filter(|entry| term.is_empty() || entry.name.to_lowercase().contains(&term))
        .collect()
}
