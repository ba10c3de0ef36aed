use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use tracing::{debug, info};

use crate::error::Error;
use crate::parser::{read_games, InputFormat, RawGame};
use crate::ranking::game_ratio;
use crate::ranking_context::RatingContext;

// Loads games from the file at path and builds the season from them.
// Teams live in one Vec and games refer to them by index, so the team Vec must never be reordered.
// Sorting for reports is done over index arrays instead.
pub fn load_data(path: &Path, format: InputFormat, ranking_context: &RatingContext) -> Result<Season, Error> {
    let file = File::open(path).map_err(|source| Error::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Reading {}", path.display());
    let parsed = read_games(file, format).map_err(|source| Error::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    for (lineno, e) in &parsed.skipped {
        debug!("{}:{}: skipped line: {}", path.display(), lineno, e);
    }

    info!("Calculating game stats");
    let mut season = Season::from_games(parsed.games, ranking_context);
    season.skipped_lines = parsed.skipped.len();

    info!("{} games successfully read", season.games.len());
    if season.skipped_lines > 0 {
        info!("{} lines skipped", season.skipped_lines);
    }
    info!("Average points per team per game: {:.6}", season.average_points());
    if let Some((first, last)) = season.date_span() {
        debug!("Games dated {} to {}", first, last);
    }

    Ok(season)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Home,       // Nominal home team really is at home
    Neutral,    // Counts towards overall records only
}

impl Location {
    pub fn from_flag(flag: char) -> Self {
        match flag {
            '0' | 'n' => Location::Neutral,
            _ => Location::Home,
        }
    }
}

// Won-lost-tied plus points for and against. Held three times per team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Record {
    pub won: u32,
    pub lost: u32,
    pub tied: u32,
    pub pf: u64,
    pub pa: u64,
}

impl Record {
    pub fn games(&self) -> u32 {
        self.won + self.lost + self.tied
    }

    fn add(&mut self, scored: u32, allowed: u32) {
        match scored.cmp(&allowed) {
            Ordering::Greater => self.won += 1,
            Ordering::Less => self.lost += 1,
            Ordering::Equal => self.tied += 1,
        }
        self.pf += u64::from(scored);
        self.pa += u64::from(allowed);
    }
}

#[derive(Debug, Clone)]
pub struct Team {
    pub name: String,
    pub overall: Record,
    pub home: Record,
    pub away: Record,

    pub rating: f64,
    pub grate: f64,     // Ratio - expected ratio, summed within one solver iteration

    pub sched: f64,
    pub schedplace: usize,
}

impl Team {
    pub fn new(name: String, rating: f64) -> Self {
        Self {
            name,
            overall: Record::default(),
            home: Record::default(),
            away: Record::default(),

            rating,
            grate: 0.0,

            sched: 0.0,
            schedplace: 0,
        }
    }

    pub fn games(&self) -> u32 {
        self.overall.games()
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    pub date: String,
    pub visitor: usize,
    pub home: usize,
    pub vscore: u32,
    pub hscore: u32,
    pub location: Location,
    pub ratio: f64,     // Visitor's share of outcome and margin, fixed after ingest
}

impl Game {
    pub fn is_in_game(&self, id: usize) -> bool {
        self.visitor == id || self.home == id
    }

    pub fn other_team(&self, id: usize) -> usize {
        debug_assert!(self.is_in_game(id));

        if id == self.visitor { self.home } else { self.visitor }
    }

    pub fn total_points(&self) -> u64 {
        u64::from(self.vscore) + u64::from(self.hscore)
    }
}

// Owns every team and game of one run. Threaded through each stage of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct Season {
    pub teams: Vec<Team>,
    pub games: Vec<Game>,
    pub index: BTreeMap<String, usize>,
    pub total_points: u64,
    pub skipped_lines: usize,
}

impl Season {
    pub fn from_games<I>(games: I, ranking_context: &RatingContext) -> Self
    where
        I: IntoIterator<Item = RawGame>,
    {
        let mut season = Season::default();
        for raw in games {
            season.record_game(raw, ranking_context);
        }
        season
    }

    // Returns the index of the team named name, adding it first if this is its first sighting
    pub fn insert_team(&mut self, name: &str, ranking_context: &RatingContext) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }

        self.teams.push(Team::new(name.to_owned(), ranking_context.initial_rating));
        self.index.insert(name.to_owned(), self.teams.len() - 1);

        self.teams.len() - 1
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.index.get(name).map(|&idx| &self.teams[idx])
    }

    pub fn record_game(&mut self, raw: RawGame, ranking_context: &RatingContext) {
        let visitor = self.insert_team(&raw.visitor, ranking_context);
        let home = self.insert_team(&raw.home, ranking_context);

        self.teams[visitor].overall.add(raw.vscore, raw.hscore);
        self.teams[home].overall.add(raw.hscore, raw.vscore);

        // Neutral site games never touch the home and road splits
        if raw.location == Location::Home {
            self.teams[visitor].away.add(raw.vscore, raw.hscore);
            self.teams[home].home.add(raw.hscore, raw.vscore);
        }

        let game = Game {
            date: raw.date,
            visitor,
            home,
            vscore: raw.vscore,
            hscore: raw.hscore,
            location: raw.location,
            ratio: game_ratio(raw.vscore, raw.hscore, ranking_context),
        };

        self.total_points += game.total_points();
        self.games.push(game);
    }

    pub fn average_points(&self) -> f64 {
        if self.games.is_empty() {
            return 0.0;
        }
        self.total_points as f64 / self.games.len() as f64 / 2.0
    }

    // Earliest and latest date field. YYYY-MM-DD dates compare as text.
    pub fn date_span(&self) -> Option<(&str, &str)> {
        let first = self.games.iter().map(|g| g.date.as_str()).min()?;
        let last = self.games.iter().map(|g| g.date.as_str()).max()?;
        Some((first, last))
    }
}
