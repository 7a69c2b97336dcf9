//! Game codes and per-game account features.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Game code of a listing. Unknown codes are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Game {
    Genshin,
    Lol,
    Valorant,
    MobileLegends,
    Diablo,
    Fortnite,
    FreeFire,
    Cod,
    Overwatch,
    Minecraft,
    Other(String),
}

impl Game {
    pub fn code(&self) -> &str {
        match self {
            Game::Genshin => "genshin",
            Game::Lol => "lol",
            Game::Valorant => "valorant",
            Game::MobileLegends => "mobile-legends",
            Game::Diablo => "diablo",
            Game::Fortnite => "fortnite",
            Game::FreeFire => "free-fire",
            Game::Cod => "cod",
            Game::Overwatch => "overwatch",
            Game::Minecraft => "minecraft",
            Game::Other(code) => code,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Game::Genshin => "Genshin Impact",
            Game::Lol => "League of Legends",
            Game::Valorant => "Valorant",
            Game::MobileLegends => "Mobile Legends",
            Game::Diablo => "Diablo IV",
            Game::Fortnite => "Fortnite",
            Game::FreeFire => "Free Fire",
            Game::Cod => "Call of Duty",
            Game::Overwatch => "Overwatch 2",
            Game::Minecraft => "Minecraft",
            Game::Other(code) => code,
        }
    }
}

impl From<&str> for Game {
    fn from(code: &str) -> Self {
        match code {
            "genshin" => Game::Genshin,
            "lol" => Game::Lol,
            "valorant" => Game::Valorant,
            "mobile-legends" => Game::MobileLegends,
            "diablo" => Game::Diablo,
            "fortnite" => Game::Fortnite,
            "free-fire" => Game::FreeFire,
            "cod" => Game::Cod,
            "overwatch" => Game::Overwatch,
            "minecraft" => Game::Minecraft,
            other => Game::Other(other.to_string()),
        }
    }
}

impl From<String> for Game {
    fn from(code: String) -> Self {
        Game::from(code.as_str())
    }
}

impl From<Game> for String {
    fn from(game: Game) -> Self {
        game.code().to_string()
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single feature attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl From<u32> for FeatureValue {
    fn from(v: u32) -> Self {
        FeatureValue::Number(v as f64)
    }
}

impl From<u64> for FeatureValue {
    fn from(v: u64) -> Self {
        FeatureValue::Number(v as f64)
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Number(v)
    }
}

impl From<bool> for FeatureValue {
    fn from(v: bool) -> Self {
        FeatureValue::Flag(v)
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        FeatureValue::Text(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::Text(v.to_string())
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Flag(v) => write!(f, "{}", v),
            FeatureValue::Number(v) => write!(f, "{}", v),
            FeatureValue::Text(v) => f.write_str(v),
        }
    }
}

pub type Attributes = BTreeMap<String, FeatureValue>;

fn put<V: Into<FeatureValue>>(attrs: &mut Attributes, key: &str, value: Option<V>) {
    if let Some(v) = value {
        attrs.insert(key.to_string(), v.into());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenshinFeatures {
    pub ar_level: u32,
    #[serde(default)]
    pub five_star_chars: Option<u32>,
    #[serde(default)]
    pub five_star_weapons: Option<u32>,
    #[serde(default)]
    pub primogems: Option<u32>,
    /// Four-star characters.
    #[serde(default)]
    pub characters: Option<u32>,
    /// Highest Spiral Abyss floor cleared.
    #[serde(default)]
    pub spiral_abyss: Option<u32>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default, flatten)]
    pub extra: Attributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LolFeatures {
    pub rank: String,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub champions: Option<u32>,
    #[serde(default)]
    pub skins: Option<u32>,
    #[serde(default)]
    pub rare_skins: Option<u32>,
    #[serde(default)]
    pub blue_essence: Option<u32>,
    #[serde(default)]
    pub rp: Option<u32>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default, flatten)]
    pub extra: Attributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValorantFeatures {
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub agents: Option<u32>,
    #[serde(default)]
    pub skins: Option<u32>,
    #[serde(default)]
    pub rare_skins: Option<u32>,
    #[serde(default)]
    pub vp: Option<u32>,
    #[serde(default)]
    pub radianite: Option<u32>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default, flatten)]
    pub extra: Attributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MobileLegendsFeatures {
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub heroes: Option<u32>,
    #[serde(default)]
    pub skins: Option<u32>,
    #[serde(default)]
    pub rare_skins: Option<u32>,
    #[serde(default)]
    pub diamonds: Option<u32>,
    #[serde(default)]
    pub battle_points: Option<u32>,
    #[serde(default, flatten)]
    pub extra: Attributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiabloFeatures {
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub characters: Option<u32>,
    #[serde(default)]
    pub gold: Option<u64>,
    #[serde(default)]
    pub items: Option<u32>,
    #[serde(default)]
    pub paragon: Option<u32>,
    #[serde(default)]
    pub world_tier: Option<u32>,
    #[serde(default)]
    pub uber_lilith: Option<bool>,
    #[serde(default, flatten)]
    pub extra: Attributes,
}

/// Game-specific attributes of a listing, one variant per supported game.
///
/// `Generic` carries free-form attributes for every other game code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Features {
    Genshin(GenshinFeatures),
    Lol(LolFeatures),
    Valorant(ValorantFeatures),
    MobileLegends(MobileLegendsFeatures),
    Diablo(DiabloFeatures),
    Generic(Attributes),
}

impl Default for Features {
    fn default() -> Self {
        Features::Generic(Attributes::new())
    }
}

impl Features {
    /// The game a typed variant belongs to. `Generic` fits any game.
    pub fn game(&self) -> Option<Game> {
        match self {
            Features::Genshin(_) => Some(Game::Genshin),
            Features::Lol(_) => Some(Game::Lol),
            Features::Valorant(_) => Some(Game::Valorant),
            Features::MobileLegends(_) => Some(Game::MobileLegends),
            Features::Diablo(_) => Some(Game::Diablo),
            Features::Generic(_) => None,
        }
    }

    /// Flattened view of every attribute that is set.
    pub fn attributes(&self) -> Attributes {
        match self {
            Features::Genshin(f) => {
                let mut a = f.extra.clone();
                a.insert("ar_level".into(), f.ar_level.into());
                put(&mut a, "five_star_chars", f.five_star_chars);
                put(&mut a, "five_star_weapons", f.five_star_weapons);
                put(&mut a, "primogems", f.primogems);
                put(&mut a, "characters", f.characters);
                put(&mut a, "spiral_abyss", f.spiral_abyss);
                put(&mut a, "server", f.server.clone());
                a
            }
            Features::Lol(f) => {
                let mut a = f.extra.clone();
                a.insert("rank".into(), f.rank.clone().into());
                put(&mut a, "level", f.level);
                put(&mut a, "champions", f.champions);
                put(&mut a, "skins", f.skins);
                put(&mut a, "rare_skins", f.rare_skins);
                put(&mut a, "blue_essence", f.blue_essence);
                put(&mut a, "rp", f.rp);
                put(&mut a, "server", f.server.clone());
                a
            }
            Features::Valorant(f) => {
                let mut a = f.extra.clone();
                put(&mut a, "rank", f.rank.clone());
                put(&mut a, "level", f.level);
                put(&mut a, "agents", f.agents);
                put(&mut a, "skins", f.skins);
                put(&mut a, "rare_skins", f.rare_skins);
                put(&mut a, "vp", f.vp);
                put(&mut a, "radianite", f.radianite);
                put(&mut a, "server", f.server.clone());
                a
            }
            Features::MobileLegends(f) => {
                let mut a = f.extra.clone();
                put(&mut a, "rank", f.rank.clone());
                put(&mut a, "level", f.level);
                put(&mut a, "heroes", f.heroes);
                put(&mut a, "skins", f.skins);
                put(&mut a, "rare_skins", f.rare_skins);
                put(&mut a, "diamonds", f.diamonds);
                put(&mut a, "battle_points", f.battle_points);
                a
            }
            Features::Diablo(f) => {
                let mut a = f.extra.clone();
                put(&mut a, "level", f.level);
                put(&mut a, "characters", f.characters);
                put(&mut a, "gold", f.gold);
                put(&mut a, "items", f.items);
                put(&mut a, "paragon", f.paragon);
                put(&mut a, "world_tier", f.world_tier);
                put(&mut a, "uber_lilith", f.uber_lilith);
                a
            }
            Features::Generic(attrs) => attrs.clone(),
        }
    }

    /// A single attribute by name.
    pub fn attribute(&self, key: &str) -> Option<FeatureValue> {
        self.attributes().remove(key)
    }

    /// Game-specific listing rules. Returns the violated rule messages.
    pub(crate) fn rule_violations(&self) -> Vec<(&'static str, String)> {
        let mut violations = Vec::new();
        match self {
            Features::Genshin(f) if f.ar_level < 1 => {
                violations.push(("features.ar_level", "AR level is required for Genshin Impact".to_string()));
            }
            Features::Lol(f) if f.rank.trim().is_empty() => {
                violations.push(("features.rank", "rank is required for League of Legends".to_string()));
            }
            _ => {}
        }
        violations
    }
}
