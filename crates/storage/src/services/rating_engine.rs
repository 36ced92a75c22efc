use crate::dto::rating::{FormUpdate, RatingUpdate};
use crate::error::Result;
use crate::models::{Match, RatingConfig};
use crate::services::elo::{FORM_TRANSFER_RATE, INITIAL_FORM, compute_elo, compute_form};
use crate::store::RatingStore;

/// Totals for one engine pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingSummary {
    pub rated: usize,
    pub form_updates: usize,
}

/// Walks unrated matches oldest first and writes their Elo and form values.
///
/// Only one engine may run against a database at a time: selection and the
/// write are not locked against a concurrent writer.
pub struct RatingEngine<'a, S: RatingStore> {
    store: &'a S,
    config: &'a RatingConfig,
}

impl<'a, S: RatingStore> RatingEngine<'a, S> {
    pub fn new(store: &'a S, config: &'a RatingConfig) -> Self {
        Self { store, config }
    }

    /// Rates every remaining match. Any store error aborts the pass; matches
    /// already written stay written.
    pub async fn run(&self) -> Result<RatingSummary> {
        let mut summary = RatingSummary::default();

        while let Some(update) = self.rate_next().await? {
            summary.rated += 1;
            if update.form.is_some() {
                summary.form_updates += 1;
            }
        }

        tracing::info!(
            "Rating pass finished: {} match(es) rated, {} form update(s)",
            summary.rated,
            summary.form_updates
        );
        Ok(summary)
    }

    /// Rates the earliest unrated match. `None` once nothing is left.
    pub async fn rate_next(&self) -> Result<Option<RatingUpdate>> {
        let Some(record) = self.store.next_unrated_match().await? else {
            return Ok(None);
        };

        let update = self.compute_update(&record).await?;
        self.store.apply_rating_update(&update).await?;

        tracing::debug!(
            match_id = record.id,
            league_id = record.league_id,
            "Rated {} vs {}: {} / {}",
            record.home_team_id,
            record.away_team_id,
            update.home_elo,
            update.away_elo
        );

        Ok(Some(update))
    }

    async fn compute_update(&self, record: &Match) -> Result<RatingUpdate> {
        let initial = self.config.initial_rating(record.league_id);
        let home_elo = self
            .store
            .previous_rating(record.home_team_id, record.date)
            .await?
            .unwrap_or(initial);
        let away_elo = self
            .store
            .previous_rating(record.away_team_id, record.date)
            .await?
            .unwrap_or(initial);

        let k = self.config.k_factor(record.league_id, record.round.as_deref());
        let (new_home, new_away) = compute_elo(
            home_elo,
            away_elo,
            record.home_score,
            record.away_score,
            f64::from(k),
        );

        let form = if self.config.is_regular_league(record.league_id) {
            Some(self.compute_form_update(record).await?)
        } else {
            None
        };

        Ok(RatingUpdate {
            match_id: record.id,
            home_elo: new_home,
            away_elo: new_away,
            form,
        })
    }

    async fn compute_form_update(&self, record: &Match) -> Result<FormUpdate> {
        let home_form = self
            .store
            .previous_form(record.home_team_id, record.league_id, &record.season, record.date)
            .await?
            .unwrap_or(INITIAL_FORM);
        let away_form = self
            .store
            .previous_form(record.away_team_id, record.league_id, &record.season, record.date)
            .await?
            .unwrap_or(INITIAL_FORM);

        let (home, away) = compute_form(
            home_form,
            away_form,
            record.home_score,
            record.away_score,
            FORM_TRANSFER_RATE,
        );

        Ok(FormUpdate { home, away })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use chrono::{TimeZone, Utc};

    const EPS: f64 = 1e-9;

    const CONFIG: &str = r#"{
        "tournament_weights": { "2": { "final": 40 } },
        "national_league_weights": { "top": [39] },
        "k_values": { "top": 30, "other": 20 },
        "initial_ratings": { "39": 1600, "other": 1400 }
    }"#;

    fn fixture(
        id: i64,
        league_id: i32,
        season: &str,
        day: u32,
        (home, away): (i64, i64),
        (home_score, away_score): (i32, i32),
        round: &str,
    ) -> Match {
        Match {
            id,
            date: Utc.with_ymd_and_hms(2023, 9, day, 18, 0, 0).unwrap(),
            league_id,
            season: season.to_string(),
            round: Some(round.to_string()),
            home_team_id: home,
            away_team_id: away,
            home_score,
            away_score,
            home_coach_id: None,
            away_coach_id: None,
            home_formation: None,
            away_formation: None,
            home_team_elo: None,
            away_team_elo: None,
            home_team_form: None,
            away_team_form: None,
        }
    }

    fn league_match(id: i64, day: u32, teams: (i64, i64), score: (i32, i32)) -> Match {
        fixture(id, 39, "2023", day, teams, score, "Regular Season - 1")
    }

    #[tokio::test]
    async fn test_first_match_starts_from_initial_rating() {
        let store = InMemoryStore::new();
        let config = RatingConfig::from_json(CONFIG).unwrap();
        store.insert_match(league_match(1, 1, (10, 20), (1, 0)));

        let engine = RatingEngine::new(&store, &config);
        let update = engine.rate_next().await.unwrap().unwrap();

        assert_eq!(update.home_elo, 1610);
        assert_eq!(update.away_elo, 1590);
        let form = update.form.unwrap();
        assert!((form.home - 1.33).abs() < EPS);
        assert!((form.away - 0.67).abs() < EPS);
    }

    #[tokio::test]
    async fn test_ratings_carry_forward_in_date_order() {
        let store = InMemoryStore::new();
        let config = RatingConfig::from_json(CONFIG).unwrap();
        // inserted out of order on purpose
        store.insert_match(league_match(2, 8, (20, 10), (0, 0)));
        store.insert_match(league_match(1, 1, (10, 20), (1, 0)));

        let summary = RatingEngine::new(&store, &config).run().await.unwrap();
        assert_eq!(summary, RatingSummary { rated: 2, form_updates: 2 });

        let second = store.get_match(2).unwrap();
        assert_eq!(second.home_team_elo, Some(1587));
        assert_eq!(second.away_team_elo, Some(1613));
        assert!((second.home_team_form.unwrap() - 0.8878).abs() < EPS);
        assert!((second.away_team_form.unwrap() - 1.1122).abs() < EPS);
    }

    #[tokio::test]
    async fn test_cup_match_uses_stage_k_and_skips_form() {
        let store = InMemoryStore::new();
        let config = RatingConfig::from_json(CONFIG).unwrap();
        store.insert_match(fixture(5, 2, "2023", 3, (30, 40), (3, 1), "Final"));

        let update = RatingEngine::new(&store, &config)
            .rate_next()
            .await
            .unwrap()
            .unwrap();

        assert_eq!(update.home_elo, 1421);
        assert_eq!(update.away_elo, 1379);
        assert!(update.form.is_none());

        let stored = store.get_match(5).unwrap();
        assert!(stored.is_rated());
        assert_eq!(stored.home_team_form, None);
    }

    #[tokio::test]
    async fn test_form_resets_between_seasons() {
        let store = InMemoryStore::new();
        let config = RatingConfig::from_json(CONFIG).unwrap();
        store.insert_match(fixture(1, 39, "2022", 1, (10, 20), (2, 0), "Regular Season - 38"));
        store.insert_match(fixture(2, 39, "2023", 10, (10, 20), (1, 1), "Regular Season - 1"));

        RatingEngine::new(&store, &config).run().await.unwrap();

        let first = store.get_match(1).unwrap();
        assert!((first.home_team_form.unwrap() - 1.33).abs() < EPS);

        let second = store.get_match(2).unwrap();
        assert!((second.home_team_form.unwrap() - INITIAL_FORM).abs() < EPS);
        assert!((second.away_team_form.unwrap() - INITIAL_FORM).abs() < EPS);
    }

    #[tokio::test]
    async fn test_rated_matches_are_never_revisited() {
        let store = InMemoryStore::new();
        let config = RatingConfig::from_json(CONFIG).unwrap();
        store.insert_match(league_match(1, 1, (10, 20), (1, 0)));

        let engine = RatingEngine::new(&store, &config);
        assert_eq!(engine.run().await.unwrap().rated, 1);
        let after_first = store.get_match(1).unwrap();

        assert_eq!(engine.run().await.unwrap(), RatingSummary::default());
        assert_eq!(store.get_match(1).unwrap(), after_first);
    }
}
