use tracing::debug;

use crate::data_loader::*;
use crate::util::*;

// Mean of each team's opponents' final ratings, then places with ties sharing the first position.
// Run once, after the solver has finished.
pub fn calc_sched_strength(season: &mut Season) {
    for t in season.teams.iter_mut() {
        t.sched = 0.0;
    }

    // Same newest-first order as the solver, so the sums round the same way
    for g in season.games.iter().rev() {
        let home_rating = season.teams[g.home].rating;
        let visitor_rating = season.teams[g.visitor].rating;

        season.teams[g.visitor].sched += home_rating;
        season.teams[g.home].sched += visitor_rating;
    }

    for t in season.teams.iter_mut() {
        let games = t.games();
        if games > 0 {
            t.sched /= games as f64;
        }
    }

    let order = order_by_desc(&season.teams, |t| t.sched);
    let scheds: Vec<f64> = order.iter().map(|&idx| season.teams[idx].sched).collect();

    for (&idx, place) in order.iter().zip(tied_places(&scheds)) {
        season.teams[idx].schedplace = place;
    }

    if let Some(&hardest) = order.first() {
        debug!("Hardest schedule: {} ({:.3})", season.teams[hardest].name, season.teams[hardest].sched);
    }
}
