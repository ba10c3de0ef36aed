use std::fmt;

use tracing::info;

use crate::data_loader::*;
use crate::util::win_pct;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompRecord {
    pub wins: u32,
    pub losses: u32,
}

impl CompRecord {
    pub fn pct(&self) -> f64 {
        win_pct(self.wins, self.losses)
    }
}

// W-L followed by the win fraction, e.g. 11-1 0.917
impl fmt::Display for CompRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} {:.3}", self.wins, self.losses, self.pct())
    }
}

// How often the final ratings "called" a game: the strictly higher rated team had to strictly win.
// Ties, equal ratings and upsets all count against the computer.
pub fn comp_record(season: &Season) -> CompRecord {
    let mut record = CompRecord::default();

    for g in &season.games {
        let visitor = &season.teams[g.visitor];
        let home = &season.teams[g.home];

        let called = (visitor.rating > home.rating && g.vscore > g.hscore)
                  || (home.rating > visitor.rating && g.hscore > g.vscore);

        if called { record.wins += 1; } else { record.losses += 1; }
    }

    record
}

pub fn report_comp_record(season: &Season) -> CompRecord {
    let record = comp_record(season);
    info!("Computer Performance: {}", record);
    record
}
