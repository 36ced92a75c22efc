use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};
use crate::services::match_stage::MatchStage;

/// Category every league falls into when no membership list names it; also the
/// key of the fallback initial rating.
pub const OTHER_CATEGORY: &str = "other";

/// K applied to a knockout competition or stage missing from the weight table.
pub const DEFAULT_TOURNAMENT_K: i32 = 5;

/// League id as it may appear in a category list: `39` or `"39"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeagueRef {
    Number(i64),
    Text(String),
}

impl LeagueRef {
    fn to_league_id(&self) -> Result<i32> {
        let parsed = match self {
            LeagueRef::Number(n) => i32::try_from(*n).ok(),
            LeagueRef::Text(s) => s.trim().parse::<i32>().ok(),
        };
        parsed.ok_or_else(|| {
            StorageError::InvalidConfig(format!("Invalid league id in category list: {:?}", self))
        })
    }
}

/// On-disk layout of the rating configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingConfigFile {
    pub tournament_weights: HashMap<String, HashMap<String, i32>>,
    pub national_league_weights: BTreeMap<String, Vec<LeagueRef>>,
    pub k_values: HashMap<String, i32>,
    pub initial_ratings: HashMap<String, i32>,
    #[serde(default = "default_tournament_ids")]
    pub tournament_ids: Vec<i32>,
    #[serde(default = "default_regular_leagues")]
    pub regular_leagues: Vec<i32>,
}

fn default_tournament_ids() -> Vec<i32> {
    vec![1, 2, 3, 4]
}

fn default_regular_leagues() -> Vec<i32> {
    vec![39, 78, 135, 61, 140, 144, 88, 94]
}

/// Validated, immutable rating parameters. Loaded once at start-up.
#[derive(Debug, Clone)]
pub struct RatingConfig {
    tournament_weights: HashMap<i32, HashMap<MatchStage, i32>>,
    categories: BTreeMap<String, Vec<i32>>,
    category_k: HashMap<String, i32>,
    other_k: i32,
    initial_ratings: HashMap<i32, i32>,
    other_initial_rating: i32,
    tournament_ids: HashSet<i32>,
    regular_leagues: HashSet<i32>,
}

impl RatingConfig {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            StorageError::InvalidConfig(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: RatingConfigFile = serde_json::from_str(json)
            .map_err(|e| StorageError::InvalidConfig(format!("Cannot parse JSON: {}", e)))?;
        Self::try_from(file)
    }

    pub fn is_tournament(&self, league_id: i32) -> bool {
        self.tournament_ids.contains(&league_id)
    }

    /// Regular leagues are the only competitions whose matches update form.
    pub fn is_regular_league(&self, league_id: i32) -> bool {
        self.regular_leagues.contains(&league_id)
    }

    pub fn league_category(&self, league_id: i32) -> &str {
        self.categories
            .iter()
            .find(|(_, leagues)| leagues.contains(&league_id))
            .map(|(category, _)| category.as_str())
            .unwrap_or(OTHER_CATEGORY)
    }

    pub fn initial_rating(&self, league_id: i32) -> i32 {
        self.initial_ratings
            .get(&league_id)
            .copied()
            .unwrap_or(self.other_initial_rating)
    }

    pub fn tournament_k(&self, league_id: i32, stage: MatchStage) -> i32 {
        self.tournament_weights
            .get(&league_id)
            .and_then(|stages| stages.get(&stage))
            .copied()
            .unwrap_or(DEFAULT_TOURNAMENT_K)
    }

    pub fn category_k(&self, category: &str) -> i32 {
        self.category_k.get(category).copied().unwrap_or(self.other_k)
    }

    /// K-factor for a match: knockout competitions are weighted by the stage
    /// read from the round label, leagues by their category.
    pub fn k_factor(&self, league_id: i32, round: Option<&str>) -> i32 {
        if self.is_tournament(league_id) {
            let stage = MatchStage::classify(round.unwrap_or_default());
            self.tournament_k(league_id, stage)
        } else {
            self.category_k(self.league_category(league_id))
        }
    }
}

impl TryFrom<RatingConfigFile> for RatingConfig {
    type Error = StorageError;

    fn try_from(file: RatingConfigFile) -> Result<Self> {
        let mut errors = Vec::new();

        let other_initial_rating = file.initial_ratings.get(OTHER_CATEGORY).copied();
        if other_initial_rating.is_none() {
            errors.push(format!("initial_ratings must define '{}'", OTHER_CATEGORY));
        }
        let other_k = file.k_values.get(OTHER_CATEGORY).copied();
        if other_k.is_none() {
            errors.push(format!("k_values must define '{}'", OTHER_CATEGORY));
        }

        let mut initial_ratings = HashMap::new();
        for (key, rating) in &file.initial_ratings {
            if key == OTHER_CATEGORY {
                continue;
            }
            match key.trim().parse::<i32>() {
                Ok(league_id) => {
                    initial_ratings.insert(league_id, *rating);
                }
                Err(_) => errors.push(format!("initial_ratings key '{}' is not a league id", key)),
            }
        }

        let mut categories = BTreeMap::new();
        for (category, leagues) in &file.national_league_weights {
            if !file.k_values.contains_key(category) {
                errors.push(format!("k_values has no entry for category '{}'", category));
            }
            let mut ids = Vec::with_capacity(leagues.len());
            for league in leagues {
                match league.to_league_id() {
                    Ok(id) => ids.push(id),
                    Err(e) => errors.push(e.to_string()),
                }
            }
            categories.insert(category.clone(), ids);
        }

        let mut tournament_weights = HashMap::new();
        for (key, stages) in &file.tournament_weights {
            let Ok(league_id) = key.trim().parse::<i32>() else {
                errors.push(format!("tournament_weights key '{}' is not a league id", key));
                continue;
            };
            let mut by_stage = HashMap::new();
            for (stage_name, k) in stages {
                match stage_name.parse::<MatchStage>() {
                    Ok(stage) => {
                        by_stage.insert(stage, *k);
                    }
                    Err(e) => errors.push(e.to_string()),
                }
            }
            tournament_weights.insert(league_id, by_stage);
        }

        match (other_initial_rating, other_k) {
            (Some(other_initial_rating), Some(other_k)) if errors.is_empty() => Ok(Self {
                tournament_weights,
                categories,
                category_k: file.k_values,
                other_k,
                initial_ratings,
                other_initial_rating,
                tournament_ids: file.tournament_ids.into_iter().collect(),
                regular_leagues: file.regular_leagues.into_iter().collect(),
            }),
            _ => Err(StorageError::InvalidConfig(format!(
                "Validation failed with {} error(s): {}",
                errors.len(),
                errors.join("; ")
            ))),
        }
    }
}
