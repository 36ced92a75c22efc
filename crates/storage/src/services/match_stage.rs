use crate::error::StorageError;

/// Knockout-competition stage used to pick a tournament K-factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStage {
    Final,
    SemiFinal,
    QuarterFinal,
    GroupStageAndRoundOf16,
    Preliminary,
}

impl MatchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Final => "final",
            Self::SemiFinal => "semi_final",
            Self::QuarterFinal => "quarter_final",
            Self::GroupStageAndRoundOf16 => "group_stage_and_round_of_16",
            Self::Preliminary => "preliminary_matches",
        }
    }

    /// Classifies a provider round label ("Quarter-finals", "Round of 16",
    /// "Group Stage - 2", ...). Anything unrecognised is preliminary.
    ///
    /// Specific stages are tested before the bare "final" substring, which
    /// every knockout label ("Semi-finals", "8th Finals") also contains.
    pub fn classify(round: &str) -> Self {
        let round = normalize_round(round);
        let has = |needle: &str| round.contains(needle);

        if has("semi final") {
            Self::SemiFinal
        } else if has("quarter final") {
            Self::QuarterFinal
        } else if has("round of 16")
            || has("16th finals")
            || has("round of 8")
            || has("8th finals")
            || has("play off")
            || has("playoff")
        {
            Self::GroupStageAndRoundOf16
        } else if has("group") || has("regular season") || has("league stage") {
            Self::GroupStageAndRoundOf16
        } else if has("final") {
            Self::Final
        } else {
            Self::Preliminary
        }
    }
}

/// Lowercases, turns `-`/`_` into spaces and collapses runs of whitespace.
pub fn normalize_round(round: &str) -> String {
    round
        .to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl std::str::FromStr for MatchStage {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "final" => Ok(Self::Final),
            "semi_final" => Ok(Self::SemiFinal),
            "quarter_final" => Ok(Self::QuarterFinal),
            "group_stage_and_round_of_16" => Ok(Self::GroupStageAndRoundOf16),
            "preliminary_matches" => Ok(Self::Preliminary),
            _ => Err(StorageError::InvalidConfig(format!("Unknown match stage: '{}'", s))),
        }
    }
}

impl std::fmt::Display for MatchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
