/// Points added to the home side's rating difference before the logistic transform.
pub const HOME_ADVANTAGE: f64 = 100.0;

/// Share of form that changes hands in a single match.
pub const FORM_TRANSFER_RATE: f64 = 0.33;

/// Form of a team without a prior match in the same competition-season.
pub const INITIAL_FORM: f64 = 1.0;

/// Goal-margin multiplier. Margins of 0 or 1 count once, 2 counts 1.5 times,
/// larger margins grow by `(11 + d) / 8`.
pub fn goal_factor(goal_difference: i32) -> f64 {
    match goal_difference.unsigned_abs() {
        0 | 1 => 1.0,
        2 => 1.5,
        d => (11.0 + f64::from(d)) / 8.0,
    }
}

/// Expected (home, away) scores, with the home advantage folded into the difference.
pub fn expected_scores(home_elo: i32, away_elo: i32) -> (f64, f64) {
    let dr = f64::from(home_elo - away_elo) + HOME_ADVANTAGE;
    let expected_home = 1.0 / (1.0 + 10f64.powf(-dr / 400.0));
    (expected_home, 1.0 - expected_home)
}

/// Actual (home, away) scores: 1/0 for a decisive result, 0.5 each for a draw.
pub fn actual_scores(home_score: i32, away_score: i32) -> (f64, f64) {
    match home_score.cmp(&away_score) {
        std::cmp::Ordering::Greater => (1.0, 0.0),
        std::cmp::Ordering::Less => (0.0, 1.0),
        std::cmp::Ordering::Equal => (0.5, 0.5),
    }
}

/// New (home, away) ratings after a match. Each side moves by
/// `K * g * (actual - expected)` truncated toward zero; the two deltas are not
/// forced to cancel out.
pub fn compute_elo(
    home_elo: i32,
    away_elo: i32,
    home_score: i32,
    away_score: i32,
    k_factor: f64,
) -> (i32, i32) {
    let (expected_home, expected_away) = expected_scores(home_elo, away_elo);
    let (result_home, result_away) = actual_scores(home_score, away_score);
    let factor = goal_factor(home_score - away_score);

    let home_delta = (k_factor * factor * (result_home - expected_home)) as i32;
    let away_delta = (k_factor * factor * (result_away - expected_away)) as i32;

    (home_elo + home_delta, away_elo + away_delta)
}

/// New (home, away) form values. The winner gains `gamma` of the loser's form
/// and the loser gives up `gamma` of its own; a draw pulls both towards each other.
pub fn compute_form(
    home_form: f64,
    away_form: f64,
    home_score: i32,
    away_score: i32,
    gamma: f64,
) -> (f64, f64) {
    match home_score.cmp(&away_score) {
        std::cmp::Ordering::Greater => (home_form + gamma * away_form, away_form - gamma * away_form),
        std::cmp::Ordering::Less => (home_form - gamma * home_form, away_form + gamma * home_form),
        std::cmp::Ordering::Equal => (
            home_form - gamma * (home_form - away_form),
            away_form - gamma * (away_form - home_form),
        ),
    }
}
