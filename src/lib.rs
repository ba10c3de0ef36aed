pub mod data_loader;
pub mod error;
pub mod parser;
pub mod performance;
pub mod ranking;
pub mod ranking_context;
pub mod report;
pub mod schedule;
pub mod util;

pub use data_loader::{load_data, Game, Location, Record, Season, Team};
pub use error::{Error, ParseError};
pub use parser::{InputFormat, RawGame};
pub use ranking::{solve_ratings, Convergence};
pub use ranking_context::RatingContext;

/*
    Everything after ingest: the solver, then schedule strength from the final ratings.
    Ratings are never written again once this returns.
*/
pub fn rate_season(season: &mut Season, ranking_context: &RatingContext) -> Result<Convergence, Error> {
    let convergence = solve_ratings(season, ranking_context)?;
    schedule::calc_sched_strength(season);

    Ok(convergence)
}
