//! Application-level configuration loading: XP rates, shop catalog, fate-card
//! deck, and the rank ladder.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "STUDY_OS_CONFIG_PATH";

/// XP granted per focused minute when no config override is present.
const DEFAULT_XP_PER_MINUTE: u64 = 2;
/// Starting XP handed to synthetic guest records created while the store is unreachable.
const DEFAULT_GUEST_XP: u64 = 100;
/// How long a leaderboard snapshot stays fresh before a re-fetch.
const DEFAULT_LEADERBOARD_TTL: Duration = Duration::from_secs(60);

/// One purchasable entry in the shop.
#[derive(Debug, Clone)]
pub struct ShopItem {
    /// Stable identifier stored in user inventories.
    pub id: String,
    /// Display name shown to players.
    pub name: String,
    /// Price in XP.
    pub price: u64,
    /// What buying the item does.
    pub effect: ShopEffect,
}

/// Effect applied when a shop item is purchased.
#[derive(Debug, Clone)]
pub enum ShopEffect {
    /// Permanent cosmetic, purchasable once, stored in the inventory.
    Cosmetic,
    /// Single-use XP multiplier consumed by the next completed focus session.
    Buff {
        /// Display name of the buff.
        name: String,
        /// Multiplier applied to the session payout.
        multiplier: f64,
    },
}

/// One card in the daily fate deck.
#[derive(Debug, Clone)]
pub struct FateCard {
    /// Card title.
    pub name: String,
    /// XP granted when drawn.
    pub xp: u64,
}

/// One step of the rank ladder.
#[derive(Debug, Clone)]
pub struct Rank {
    /// Minimum XP required for the rank.
    pub threshold: u64,
    /// Rank title shown next to the nickname.
    pub title: String,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    xp_per_minute: u64,
    guest_xp: u64,
    leaderboard_ttl: Duration,
    shop: Vec<ShopItem>,
    cards: Vec<FateCard>,
    ranks: Vec<Rank>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        shop_items = config.shop.len(),
                        cards = config.cards.len(),
                        "loaded configuration from disk"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// XP granted per focused minute before buffs.
    pub fn xp_per_minute(&self) -> u64 {
        self.xp_per_minute
    }

    /// Starting XP for non-persisted guest records created in degraded mode.
    pub fn guest_xp(&self) -> u64 {
        self.guest_xp
    }

    /// Freshness window for cached leaderboard snapshots.
    pub fn leaderboard_ttl(&self) -> Duration {
        self.leaderboard_ttl
    }

    /// Full shop catalog.
    pub fn shop(&self) -> &[ShopItem] {
        &self.shop
    }

    /// Look up a shop item by its identifier.
    pub fn shop_item(&self, id: &str) -> Option<&ShopItem> {
        self.shop.iter().find(|item| item.id == id)
    }

    /// The daily fate-card deck.
    pub fn cards(&self) -> &[FateCard] {
        &self.cards
    }

    /// Rank title earned at `xp` points.
    ///
    /// The ladder is scanned in ascending threshold order; the highest step
    /// whose threshold is not above `xp` wins.
    pub fn rank_title(&self, xp: u64) -> &str {
        self.rank_at(xp).map(|(_, rank)| rank.title.as_str()).unwrap_or("")
    }

    /// Numeric level for `xp`: the 1-based index of the earned rank.
    pub fn level(&self, xp: u64) -> u32 {
        self.rank_at(xp).map(|(index, _)| index as u32 + 1).unwrap_or(1)
    }

    fn rank_at(&self, xp: u64) -> Option<(usize, &Rank)> {
        self.ranks
            .iter()
            .enumerate()
            .filter(|(_, rank)| rank.threshold <= xp)
            .next_back()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            xp_per_minute: DEFAULT_XP_PER_MINUTE,
            guest_xp: DEFAULT_GUEST_XP,
            leaderboard_ttl: DEFAULT_LEADERBOARD_TTL,
            shop: default_shop(),
            cards: default_cards(),
            ranks: default_ranks(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    xp_per_minute: Option<u64>,
    guest_xp: Option<u64>,
    leaderboard_ttl_seconds: Option<u64>,
    shop: Option<Vec<RawShopItem>>,
    cards: Option<Vec<RawCard>>,
    ranks: Option<Vec<RawRank>>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            xp_per_minute: raw.xp_per_minute.unwrap_or(defaults.xp_per_minute),
            guest_xp: raw.guest_xp.unwrap_or(defaults.guest_xp),
            leaderboard_ttl: raw
                .leaderboard_ttl_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.leaderboard_ttl),
            shop: raw
                .shop
                .map(|items| items.into_iter().map(Into::into).collect())
                .unwrap_or(defaults.shop),
            cards: raw
                .cards
                .map(|cards| cards.into_iter().map(Into::into).collect())
                .unwrap_or(defaults.cards),
            ranks: raw
                .ranks
                .map(|ranks| {
                    let mut ranks: Vec<Rank> =
                        ranks.into_iter().map(Into::into).collect();
                    ranks.sort_by_key(|rank| rank.threshold);
                    ranks
                })
                .unwrap_or(defaults.ranks),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a shop entry inside the configuration file.
struct RawShopItem {
    id: String,
    name: String,
    price: u64,
    buff: Option<RawBuff>,
}

#[derive(Debug, Deserialize)]
struct RawBuff {
    name: Option<String>,
    multiplier: f64,
}

impl From<RawShopItem> for ShopItem {
    fn from(raw: RawShopItem) -> Self {
        let effect = match raw.buff {
            Some(buff) => ShopEffect::Buff {
                name: buff.name.unwrap_or_else(|| raw.name.clone()),
                multiplier: buff.multiplier,
            },
            None => ShopEffect::Cosmetic,
        };
        Self {
            id: raw.id,
            name: raw.name,
            price: raw.price,
            effect,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCard {
    name: String,
    xp: u64,
}

impl From<RawCard> for FateCard {
    fn from(raw: RawCard) -> Self {
        Self {
            name: raw.name,
            xp: raw.xp,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRank {
    threshold: u64,
    title: String,
}

impl From<RawRank> for Rank {
    fn from(raw: RawRank) -> Self {
        Self {
            threshold: raw.threshold,
            title: raw.title,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in shop catalog shipped with the binary.
fn default_shop() -> Vec<ShopItem> {
    vec![
        ShopItem {
            id: "focus_elixir".into(),
            name: "Focus Elixir".into(),
            price: 200,
            effect: ShopEffect::Buff {
                name: "Focus Elixir".into(),
                multiplier: 1.5,
            },
        },
        ShopItem {
            id: "golden_frame".into(),
            name: "Golden Frame".into(),
            price: 500,
            effect: ShopEffect::Cosmetic,
        },
        ShopItem {
            id: "mushroom_badge".into(),
            name: "Mushroom Badge".into(),
            price: 300,
            effect: ShopEffect::Cosmetic,
        },
    ]
}

/// Built-in daily fate deck.
fn default_cards() -> Vec<FateCard> {
    vec![
        FateCard {
            name: "The Magician".into(),
            xp: 50,
        },
        FateCard {
            name: "The Hermit".into(),
            xp: 30,
        },
        FateCard {
            name: "Strength".into(),
            xp: 100,
        },
    ]
}

/// Built-in rank ladder.
fn default_ranks() -> Vec<Rank> {
    vec![
        Rank {
            threshold: 0,
            title: "Ink Apprentice".into(),
        },
        Rank {
            threshold: 500,
            title: "Library Warden".into(),
        },
        Rank {
            threshold: 1500,
            title: "Seeker of Truth".into(),
        },
        Rank {
            threshold: 3000,
            title: "Architect of Wisdom".into(),
        },
        Rank {
            threshold: 5000,
            title: "Intellectual Lord".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_ladder_picks_highest_reached_step() {
        let config = AppConfig::default();
        assert_eq!(config.rank_title(0), "Ink Apprentice");
        assert_eq!(config.rank_title(499), "Ink Apprentice");
        assert_eq!(config.rank_title(500), "Library Warden");
        assert_eq!(config.rank_title(9000), "Intellectual Lord");
    }

    #[test]
    fn level_is_one_based_rank_index() {
        let config = AppConfig::default();
        assert_eq!(config.level(0), 1);
        assert_eq!(config.level(1500), 3);
        assert_eq!(config.level(5000), 5);
    }

    #[test]
    fn raw_config_overrides_only_present_fields() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"xp_per_minute": 3, "cards": [{"name": "The Tower", "xp": 10}]}"#)
                .unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.xp_per_minute(), 3);
        assert_eq!(config.cards().len(), 1);
        assert_eq!(config.shop().len(), 3);
        assert_eq!(config.guest_xp(), 100);
    }

    #[test]
    fn shop_item_lookup_by_id() {
        let config = AppConfig::default();
        let elixir = config.shop_item("focus_elixir").unwrap();
        assert_eq!(elixir.price, 200);
        assert!(matches!(elixir.effect, ShopEffect::Buff { multiplier, .. } if multiplier == 1.5));
        assert!(config.shop_item("unknown").is_none());
    }
}
