use tracing::{info, warn};

use crate::data_loader::*;
use crate::error::Error;
use crate::ranking_context::RatingContext;

// Diminishing returns on running up the score. With the default factor 20 becomes 19.0 and 50 becomes 43.75,
// at 200 the adjustment reaches its peak of 100.
pub fn adjusted_points(score: u32, ranking_context: &RatingContext) -> f64 {
    let s = score as f64;
    s - (s * s) / ranking_context.score_factor
}

/// Visitor's share of a game in `(0, 1)`: a quadratic share of adjusted points,
/// bumped by 1 for a visitor win and 0.5 for a tie, then halved.
pub fn game_ratio(vscore: u32, hscore: u32, ranking_context: &RatingContext) -> f64 {
    let v = adjusted_points(vscore, ranking_context) / ranking_context.point_unit;
    let h = adjusted_points(hscore, ranking_context) / ranking_context.point_unit;

    // The 1.0 and 2.0 keep a 0-0 game at an even share
    let mut ratio = (v * v + 1.0) / (v * v + h * h + 2.0);

    if vscore > hscore {
        ratio += 1.0;
    } else if vscore == hscore {
        ratio += 0.5;
    }

    ratio * 0.5
}

// Logistic prediction of the visitor's share from the two ratings
pub fn expected_ratio(visitor_rating: f64, home_rating: f64, ranking_context: &RatingContext) -> f64 {
    1.0 / (1.0 + f64::powf(10.0, (home_rating - visitor_rating) / ranking_context.k_factor))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Convergence {
    pub iterations: u32,
    pub std_dev: f64,
    pub diff: f64,
    pub converged: bool,
    pub progress: Vec<f64>,     // std_dev at every progress_interval-th iteration, starting with the first
}

/// Refines every team's rating until predicted game shares match the observed ratios.
///
/// The stopping test compares successive values of `sqrt(sum_grate^2 / games)`, where
/// `sum_grate` adds, once per game, the larger running residual of the two teams in it.
/// That is not a true standard deviation, but iteration counts depend on it, and so does
/// the order games are visited in: newest first, the reverse of the input.
pub fn solve_ratings(season: &mut Season, ranking_context: &RatingContext) -> Result<Convergence, Error> {
    if let Some(t) = season.teams.iter().find(|t| t.games() == 0) {
        return Err(Error::TeamWithoutGames(t.name.clone()));
    }

    let k = ranking_context.k_factor;
    let games = season.games.len() as f64;

    let mut std_dev = ranking_context.initial_std_dev;
    let mut diff = f64::INFINITY;
    let mut iterations = 0;
    let mut progress = Vec::new();

    info!("Calculating ratings");
    if season.games.is_empty() {
        return Ok(Convergence { iterations, std_dev, diff: 0.0, converged: true, progress });
    }

    while iterations < ranking_context.max_iterations && diff > ranking_context.tolerance {
        let old_std_dev = std_dev;
        let mut sum_grate = 0.0;

        for t in season.teams.iter_mut() {
            t.grate = 0.0;
        }

        for g in season.games.iter().rev() {
            let v_expected = expected_ratio(season.teams[g.visitor].rating, season.teams[g.home].rating, ranking_context);

            season.teams[g.visitor].grate += g.ratio - v_expected;
            season.teams[g.home].grate += (1.0 - g.ratio) - (1.0 - v_expected);

            let visitor_grate = season.teams[g.visitor].grate;
            let home_grate = season.teams[g.home].grate;
            sum_grate += if visitor_grate > home_grate { visitor_grate } else { home_grate };
        }

        std_dev = (sum_grate * sum_grate / games).sqrt();
        diff = (old_std_dev - std_dev).powi(2);

        if ranking_context.progress_interval > 0 && iterations % ranking_context.progress_interval == 0 {
            info!("Game ratio standard deviation: {:.6}", std_dev);
            progress.push(std_dev);
        }

        for t in season.teams.iter_mut() {
            t.rating += k * (t.grate / t.games() as f64);
        }

        iterations += 1;
    }

    let converged = diff <= ranking_context.tolerance;
    if converged {
        info!("Congratulations! Game ratios have converged!");
    } else {
        warn!("Game ratios aren't converging after {} iterations", iterations);
    }
    info!("The program ran through the scores {} times!", iterations);

    Ok(Convergence { iterations, std_dev, diff, converged, progress })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::RawGame;

    fn ctx() -> RatingContext {
        RatingContext::default()
    }

    fn season(games: &[(&str, u32, &str, u32, Location)]) -> Season {
        let raws = games.iter().map(|&(v, vs, h, hs, location)| RawGame {
            date: "1979-09-01".to_string(),
            visitor: v.to_string(),
            vscore: vs,
            home: h.to_string(),
            hscore: hs,
            location,
        });
        Season::from_games(raws, &ctx())
    }

    #[test]
    fn adjustment_law() {
        let ctx = ctx();
        assert_eq!(adjusted_points(0, &ctx), 0.0);
        assert_eq!(adjusted_points(200, &ctx), 100.0);
        assert_eq!(adjusted_points(400, &ctx), 0.0);
        assert_eq!(adjusted_points(20, &ctx), 19.0);
        for s in 0..=400 {
            assert!(adjusted_points(s, &ctx) >= 0.0, "adj({s}) is negative");
        }
        // Past 200 more points are worth less
        assert!(adjusted_points(250, &ctx) < adjusted_points(200, &ctx));
    }

    #[test]
    fn ratio_bounds() {
        let ctx = ctx();
        for v in (0..=80).step_by(3) {
            for h in (0..=80).step_by(4) {
                let r = game_ratio(v, h, &ctx);
                assert!(r > 0.0 && r < 1.0, "ratio({v}, {h}) = {r}");
                if v > h {
                    assert!(r > 0.5);
                } else if v < h {
                    assert!(r < 0.5);
                } else {
                    assert_eq!(r, 0.5);
                }
            }
        }
    }

    #[test]
    fn ratio_matches_formula() {
        let ctx = ctx();
        let v = (7.0 - 49.0 / 400.0) / 6.0;
        let h = (21.0 - 441.0 / 400.0) / 6.0;
        let expected = 0.5 * (v * v + 1.0) / (v * v + h * h + 2.0);
        assert!((game_ratio(7, 21, &ctx) - expected).abs() < 1e-15);
        assert!((game_ratio(21, 7, &ctx) - (expected_win(21, 7))).abs() < 1e-15);
    }

    fn expected_win(vs: u32, hs: u32) -> f64 {
        let adj = |s: f64| (s - s * s / 400.0) / 6.0;
        let (v, h) = (adj(vs as f64), adj(hs as f64));
        0.5 * ((v * v + 1.0) / (v * v + h * h + 2.0) + 1.0)
    }

    #[test]
    fn expected_ratio_is_logistic() {
        let ctx = ctx();
        assert_eq!(expected_ratio(50.0, 50.0, &ctx), 0.5);
        // Ten points is one order of magnitude in the odds
        assert!((expected_ratio(60.0, 50.0, &ctx) - 10.0 / 11.0).abs() < 1e-12);
        let up = expected_ratio(57.0, 43.0, &ctx);
        let down = expected_ratio(43.0, 57.0, &ctx);
        assert!((up + down - 1.0).abs() < 1e-12);
    }

    #[test]
    fn tie_leaves_ratings_untouched() {
        let mut s = season(&[("A", 10, "B", 10, Location::Home)]);
        let c = solve_ratings(&mut s, &ctx()).unwrap();
        assert!(c.converged);
        assert_eq!(s.team("A").unwrap().rating, 50.0);
        assert_eq!(s.team("B").unwrap().rating, 50.0);
        assert_eq!(s.games[0].ratio, 0.5);
    }

    #[test]
    fn winner_rated_higher() {
        let mut s = season(&[("A", 7, "B", 21, Location::Neutral)]);
        let c = solve_ratings(&mut s, &ctx()).unwrap();
        assert!(c.converged);
        assert!(c.iterations > 1);
        assert!(s.team("B").unwrap().rating > s.team("A").unwrap().rating);

        // Fixed point: the model reproduces the observed share
        let g = &s.games[0];
        let e = expected_ratio(s.teams[g.visitor].rating, s.teams[g.home].rating, &ctx());
        assert!((e - g.ratio).abs() < 1e-3);
    }

    #[test]
    fn ratings_stay_centred() {
        let mut s = season(&[
            ("A", 24, "B", 17, Location::Home),
            ("B", 31, "C", 3, Location::Home),
            ("C", 10, "A", 13, Location::Neutral),
            ("D", 20, "A", 20, Location::Home),
            ("B", 6, "D", 27, Location::Home),
        ]);
        solve_ratings(&mut s, &ctx()).unwrap();

        // Residuals cancel pairwise, so rating mass is only moved between teams
        let weighted: f64 = s.teams.iter().map(|t| t.rating * t.games() as f64).sum();
        let games: f64 = s.teams.iter().map(|t| t.games() as f64).sum();
        assert!((weighted / games - 50.0).abs() < 1e-6);
    }

    #[test]
    fn iteration_cap_is_honoured() {
        let mut s = season(&[("A", 70, "B", 0, Location::Home)]);
        let ctx = RatingContext { max_iterations: 3, ..RatingContext::default() };
        let c = solve_ratings(&mut s, &ctx).unwrap();
        assert_eq!(c.iterations, 3);
        assert!(!c.converged);
        assert!(s.team("A").unwrap().rating > s.team("B").unwrap().rating);
    }

    #[test]
    fn team_without_games_is_fatal() {
        let mut s = season(&[("A", 3, "B", 0, Location::Home)]);
        s.insert_team("Ghost", &ctx());
        let err = solve_ratings(&mut s, &ctx()).unwrap_err();
        assert!(matches!(err, Error::TeamWithoutGames(ref name) if name == "Ghost"));
    }

    #[test]
    fn empty_season_is_trivially_solved() {
        let mut s = Season::default();
        let c = solve_ratings(&mut s, &ctx()).unwrap();
        assert_eq!(c.iterations, 0);
        assert!(c.converged);
    }
}
