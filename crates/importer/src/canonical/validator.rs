use std::collections::HashSet;
use std::fmt;

use tracing::warn;

use super::models::Fixture;
use crate::config::EligibleWindow;

/// Why a fixture is counted as done without being stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingScore,
    OutsideWindow,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingScore => write!(f, "no final score"),
            Self::OutsideWindow => write!(f, "outside the eligible window"),
        }
    }
}

pub struct FixtureValidator {
    window: EligibleWindow,
}

impl FixtureValidator {
    pub fn new(window: EligibleWindow) -> Self {
        Self { window }
    }

    pub fn check(&self, fixture: &Fixture) -> Option<SkipReason> {
        if fixture.final_score().is_none() {
            Some(SkipReason::MissingScore)
        } else if !self.window.contains(fixture.date) {
            Some(SkipReason::OutsideWindow)
        } else {
            None
        }
    }

    /// Drops repeated fixture ids, keeping the first occurrence. The season is
    /// complete when the processed set reaches the fixture count, so the list
    /// must not count an id twice.
    pub fn dedupe(fixtures: Vec<Fixture>) -> (Vec<Fixture>, ValidationReport) {
        let mut report = ValidationReport::default();
        let mut seen = HashSet::with_capacity(fixtures.len());
        let mut unique = Vec::with_capacity(fixtures.len());

        for fixture in fixtures {
            if seen.insert(fixture.id) {
                unique.push(fixture);
            } else {
                report
                    .warnings
                    .push(format!("Duplicate fixture ID={} dropped", fixture.id));
            }
        }

        for fixture in &unique {
            if fixture.home.id == fixture.away.id {
                report.warnings.push(format!(
                    "Fixture ID={} lists team {} on both sides",
                    fixture.id, fixture.home.id
                ));
            }
        }

        (unique, report)
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::models::TeamRef;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn fixture(id: i64, day: u32, score: Option<(i32, i32)>) -> Fixture {
        Fixture {
            id,
            date: Utc.with_ymd_and_hms(2023, 8, day, 19, 0, 0).unwrap(),
            round: Some("Regular Season - 1".to_string()),
            home: TeamRef { id: 1, name: "Home".to_string() },
            away: TeamRef { id: 2, name: "Away".to_string() },
            home_score: score.map(|s| s.0),
            away_score: score.map(|s| s.1),
        }
    }

    #[test]
    fn test_fixture_without_score_is_skipped() {
        let validator = FixtureValidator::new(EligibleWindow::default());
        assert_eq!(validator.check(&fixture(1, 5, None)), Some(SkipReason::MissingScore));
        assert_eq!(validator.check(&fixture(1, 5, Some((0, 0)))), None);
    }

    #[test]
    fn test_half_missing_score_is_skipped() {
        let validator = FixtureValidator::new(EligibleWindow::default());
        let mut partial = fixture(1, 5, Some((2, 1)));
        partial.away_score = None;
        assert_eq!(validator.check(&partial), Some(SkipReason::MissingScore));
    }

    #[test]
    fn test_fixture_outside_window_is_skipped() {
        let window = EligibleWindow::new(NaiveDate::from_ymd_opt(2023, 8, 10), None).unwrap();
        let validator = FixtureValidator::new(window);
        assert_eq!(
            validator.check(&fixture(1, 5, Some((1, 0)))),
            Some(SkipReason::OutsideWindow)
        );
        assert_eq!(validator.check(&fixture(2, 12, Some((1, 0)))), None);
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let fixtures = vec![
            fixture(1, 5, Some((1, 0))),
            fixture(2, 6, None),
            fixture(1, 7, Some((3, 3))),
        ];
        let (unique, report) = FixtureValidator::dedupe(fixtures);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].home_score, Some(1));
        assert_eq!(report.warnings.len(), 1);
    }
}
