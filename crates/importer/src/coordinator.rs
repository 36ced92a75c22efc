use std::future::Future;

use storage::MatchStore;
use storage::dto::ingest::SaveOutcome;
use storage::models::Team;
use tracing::{debug, error, info, warn};

use crate::Result;
use crate::cache::SeasonKey;
use crate::canonical::models::{Fixture, MatchPayload};
use crate::canonical::transformer::MatchTransformer;
use crate::canonical::validator::{FixtureValidator, SkipReason};
use crate::traits::{Budgeted, IngestContext, MatchDataSource, SeasonCache};

/// How an ingestion run ended. None of these are failures of the run itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No unprocessed season is left.
    AllSeasonsProcessed,
    /// The provider's call budget fell below the threshold; state is kept for the next run.
    BudgetExhausted,
    /// A season pass ended with unprocessed fixtures; the cache keeps it for the next run.
    SeasonDeferred(SeasonKey),
    /// The season's fixture list could not be fetched.
    FetchFailed(SeasonKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Stored(SaveOutcome),
    Skipped(SkipReason),
    Failed,
    /// Dropped part-way because the budget ran out before all fetches were made.
    Abandoned,
}

impl MatchStatus {
    /// Whether the fixture counts towards season completion.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Stored(_) | Self::Skipped(_))
    }
}

#[derive(Debug, Clone, Copy)]
struct MatchReport {
    status: MatchStatus,
    budget_exhausted: bool,
}

impl MatchReport {
    fn finished(status: MatchStatus) -> Self {
        Self {
            status,
            budget_exhausted: false,
        }
    }

    fn abandoned() -> Self {
        Self {
            status: MatchStatus::Abandoned,
            budget_exhausted: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeasonPass {
    Completed,
    Deferred,
    BudgetExhausted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecheckSummary {
    pub seasons_checked: usize,
    pub missing: usize,
    pub recovered: usize,
    pub budget_exhausted: bool,
}

/// Drives seasons from the store through the cache into stored matches.
///
/// Assumes it is the only coordinator working against this cache and store.
pub struct IngestionCoordinator<'a, S, C, D> {
    ctx: &'a IngestContext<S, C, D>,
    validator: FixtureValidator,
}

impl<'a, S, C, D> IngestionCoordinator<'a, S, C, D>
where
    S: MatchStore,
    C: SeasonCache,
    D: MatchDataSource,
{
    pub fn new(ctx: &'a IngestContext<S, C, D>) -> Self {
        Self {
            ctx,
            validator: FixtureValidator::new(ctx.settings.window),
        }
    }

    fn threshold(&self) -> u32 {
        self.ctx.settings.budget_threshold
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        loop {
            let cached = self.ctx.cache.cached_seasons().await?;
            if !cached.is_empty() {
                info!("Cache holds {} season(s), resuming", cached.len());
                for key in cached {
                    let Some(fixtures) = self.ctx.cache.season_fixtures(&key).await? else {
                        warn!("Fixture list for {} expired, skipping", key);
                        continue;
                    };
                    match self.process_season(&key, &fixtures).await? {
                        SeasonPass::Completed => {}
                        SeasonPass::Deferred => return Ok(RunOutcome::SeasonDeferred(key)),
                        SeasonPass::BudgetExhausted => return Ok(RunOutcome::BudgetExhausted),
                    }
                }
                continue;
            }

            let Some(record) = self
                .ctx
                .store
                .next_unprocessed_season(self.ctx.settings.season_order)
                .await?
            else {
                info!("All seasons processed");
                return Ok(RunOutcome::AllSeasonsProcessed);
            };

            let key = SeasonKey::from(&record);
            info!("Fetching fixtures for {}", key);
            let fetched = match self
                .ctx
                .source
                .fetch_season_matches(key.league_id, &key.season)
                .await
            {
                Ok(fetched) => fetched,
                Err(e) => {
                    error!("Failed to fetch fixtures for {}: {}", key, e);
                    return Ok(RunOutcome::FetchFailed(key));
                }
            };

            let exhausted = fetched.is_exhausted(self.threshold());
            let (fixtures, report) = FixtureValidator::dedupe(fetched.data);
            report.log_warnings();

            self.ctx.cache.store_season(&key, &fixtures).await?;
            info!("Cached {} fixture(s) for {}", fixtures.len(), key);

            if exhausted {
                warn!(
                    "Only {} call(s) left after fetching {}, stopping",
                    fetched.remaining, key
                );
                return Ok(RunOutcome::BudgetExhausted);
            }

            match self.process_season(&key, &fixtures).await? {
                SeasonPass::Completed => {}
                SeasonPass::Deferred => return Ok(RunOutcome::SeasonDeferred(key)),
                SeasonPass::BudgetExhausted => return Ok(RunOutcome::BudgetExhausted),
            }
        }
    }

    /// Fetches the fixture list of every processed season again and ingests
    /// fixtures the store does not have. Leaves the cache and season flags alone.
    pub async fn recheck_processed_seasons(&self) -> Result<RecheckSummary> {
        let mut summary = RecheckSummary::default();
        let seasons = self.ctx.store.processed_seasons().await?;

        for record in &seasons {
            let key = SeasonKey::from(record);
            info!("Re-checking {}", key);

            let fetched = match self
                .ctx
                .source
                .fetch_season_matches(key.league_id, &key.season)
                .await
            {
                Ok(fetched) => fetched,
                Err(e) => {
                    error!("Failed to fetch fixtures for {}: {}", key, e);
                    continue;
                }
            };
            summary.seasons_checked += 1;

            let exhausted = fetched.is_exhausted(self.threshold());
            let (fixtures, report) = FixtureValidator::dedupe(fetched.data);
            report.log_warnings();
            if exhausted {
                warn!("Call budget exhausted while re-checking {}", key);
                summary.budget_exhausted = true;
                return Ok(summary);
            }

            let mut missing = Vec::new();
            for fixture in fixtures {
                if !self.ctx.store.match_exists(fixture.id).await? {
                    missing.push(fixture);
                }
            }
            if missing.is_empty() {
                info!("Every fixture of {} is stored", key);
                continue;
            }

            info!("{} fixture(s) of {} are missing", missing.len(), key);
            summary.missing += missing.len();

            for fixture in &missing {
                let report = self.process_match(&key, fixture).await?;
                if report.status == MatchStatus::Stored(SaveOutcome::Inserted) {
                    summary.recovered += 1;
                }
                if report.budget_exhausted {
                    warn!("Call budget exhausted while re-checking {}", key);
                    summary.budget_exhausted = true;
                    return Ok(summary);
                }
            }
        }

        info!(
            "Re-check finished: {} season(s), {} missing, {} recovered",
            summary.seasons_checked, summary.missing, summary.recovered
        );
        Ok(summary)
    }

    async fn process_season(&self, key: &SeasonKey, fixtures: &[Fixture]) -> Result<SeasonPass> {
        let total = fixtures.len();
        info!("Processing {} ({} fixtures)", key, total);

        for fixture in fixtures {
            if self.ctx.cache.is_processed(key, fixture.id).await? {
                continue;
            }

            let report = self.process_match(key, fixture).await?;
            if report.status.is_done() {
                self.ctx.cache.mark_processed(key, fixture.id).await?;
            }

            if self.is_complete(key, total).await? {
                self.finish_season(key).await?;
                if report.budget_exhausted {
                    return Ok(SeasonPass::BudgetExhausted);
                }
                return Ok(SeasonPass::Completed);
            }

            if report.budget_exhausted {
                warn!(
                    "Call budget below {} at fixture ID={}, stopping",
                    self.threshold(),
                    fixture.id
                );
                return Ok(SeasonPass::BudgetExhausted);
            }
        }

        if self.is_complete(key, total).await? {
            self.finish_season(key).await?;
            return Ok(SeasonPass::Completed);
        }

        warn!("{} has unprocessed fixtures, completion deferred", key);
        Ok(SeasonPass::Deferred)
    }

    async fn process_match(&self, key: &SeasonKey, fixture: &Fixture) -> Result<MatchReport> {
        if let Some(reason) = self.validator.check(fixture) {
            info!("Skipping fixture ID={}: {}", fixture.id, reason);
            return Ok(MatchReport::finished(MatchStatus::Skipped(reason)));
        }

        for team in [&fixture.home, &fixture.away] {
            let row = Team {
                id: team.id,
                fullname: team.name.clone(),
            };
            if let Err(e) = self.ctx.store.upsert_team(&row).await {
                warn!("Failed to save team {}: {}", team.id, e);
                return Ok(MatchReport::finished(MatchStatus::Failed));
            }
        }

        let source = &self.ctx.source;
        let Some(statistics) = self
            .fetch_step("statistics", fixture.id, source.fetch_statistics(fixture.id))
            .await
        else {
            return Ok(MatchReport::finished(MatchStatus::Failed));
        };
        if statistics.is_exhausted(self.threshold()) {
            return Ok(MatchReport::abandoned());
        }

        let Some(lineups) = self
            .fetch_step("lineups", fixture.id, source.fetch_lineups(fixture.id))
            .await
        else {
            return Ok(MatchReport::finished(MatchStatus::Failed));
        };
        if lineups.is_exhausted(self.threshold()) {
            return Ok(MatchReport::abandoned());
        }

        let Some(players) = self
            .fetch_step("players", fixture.id, source.fetch_players(fixture.id))
            .await
        else {
            return Ok(MatchReport::finished(MatchStatus::Failed));
        };
        let budget_exhausted = players.is_exhausted(self.threshold());

        let payload = MatchPayload {
            statistics: statistics.data,
            lineups: lineups.data,
            players: players.data,
        };
        let details = match MatchTransformer::new(&self.ctx.store)
            .build(key, fixture, payload)
            .await
        {
            Ok(details) => details,
            Err(e) => {
                warn!("Failed to transform fixture ID={}: {}", fixture.id, e);
                return Ok(MatchReport {
                    status: MatchStatus::Failed,
                    budget_exhausted,
                });
            }
        };

        let status = match self.ctx.store.save_match_details(&details).await {
            Ok(outcome) => {
                info!(
                    "Stored fixture ID={} ({} lineup rows, {:?})",
                    fixture.id,
                    details.lineups.len(),
                    outcome
                );
                MatchStatus::Stored(outcome)
            }
            Err(e) if e.is_foreign_key_violation() => {
                error!(
                    "Failed to save fixture ID={}: it references a row that is missing: {}",
                    fixture.id, e
                );
                MatchStatus::Failed
            }
            Err(e) => {
                error!("Failed to save fixture ID={}: {}", fixture.id, e);
                MatchStatus::Failed
            }
        };

        Ok(MatchReport {
            status,
            budget_exhausted,
        })
    }

    async fn fetch_step<T>(
        &self,
        what: &str,
        fixture_id: i64,
        request: impl Future<Output = Result<Budgeted<T>>>,
    ) -> Option<Budgeted<T>> {
        match request.await {
            Ok(response) => {
                debug!(
                    "Fetched {} for fixture ID={}, {} call(s) left",
                    what, fixture_id, response.remaining
                );
                Some(response)
            }
            Err(e) => {
                warn!("Failed to fetch {} for fixture ID={}: {}", what, fixture_id, e);
                None
            }
        }
    }

    async fn is_complete(&self, key: &SeasonKey, total: usize) -> Result<bool> {
        let processed = self.ctx.cache.processed_count(key).await?;
        debug!("{}: {} of {} fixtures processed", key, processed, total);
        Ok(processed == total)
    }

    async fn finish_season(&self, key: &SeasonKey) -> Result<()> {
        self.ctx.cache.clear_season(key).await?;
        self.ctx
            .store
            .mark_season_processed(key.league_id, &key.season)
            .await?;
        info!("{} complete", key);
        Ok(())
    }
}
