use std::io::{self, BufRead, BufReader, Read};

use clap::ValueEnum;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::data_loader::Location;
use crate::error::ParseError;

// Every text line starts with a fixed-width date, e.g. 2023-09-07
pub const DATE_WIDTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InputFormat {
    /// Date field followed by free-form team names and scores
    #[default]
    Text,
    /// CSV with a header row: date,visitor,vscore,home,hscore[,location]
    /// (team1,score1,team2,score2 are accepted for the team columns)
    Csv,
    /// Headerless rows: date|visitor|vscore|home|hscore[|location]
    Pipe,
}

// A game as it appears in the input, before teams are resolved to indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGame {
    pub date: String,
    pub visitor: String,
    pub vscore: u32,
    pub home: String,
    pub hscore: u32,
    pub location: Location,
}

// Everything one pass over an input produced. Skipped entries carry their 1-based line (or row) number.
#[derive(Debug, Default)]
pub struct Parsed {
    pub games: Vec<RawGame>,
    pub skipped: Vec<(usize, ParseError)>,
}

impl Parsed {
    fn push(&mut self, lineno: usize, line: Result<Option<RawGame>, ParseError>) {
        match line {
            Ok(Some(game)) => self.games.push(game),
            Ok(None) => {}
            Err(e) => self.skipped.push((lineno, e)),
        }
    }
}

pub fn read_games<R: Read>(reader: R, format: InputFormat) -> Result<Parsed, csv::Error> {
    match format {
        InputFormat::Text => Ok(read_text(reader)?),
        InputFormat::Csv => read_delimited(reader, b',', true),
        InputFormat::Pipe => read_delimited(reader, b'|', false),
    }
}

pub fn read_text<R: Read>(reader: R) -> io::Result<Parsed> {
    let mut reader = BufReader::new(reader);
    let mut parsed = Parsed::default();
    let mut buffer = Vec::new();
    let mut lineno = 0;

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 { break; }
        lineno += 1;

        let line = String::from_utf8_lossy(&buffer);
        parsed.push(lineno, parse_line(&line));
    }

    Ok(parsed)
}

// Blank and '#' lines give Ok(None). A team name runs until the first token that starts with a digit.
pub fn parse_line(line: &str) -> Result<Option<RawGame>, ParseError> {
    let body = line.trim_start();
    if body.is_empty() || body.starts_with('#') {
        return Ok(None);
    }

    if body.chars().count() < DATE_WIDTH {
        return Err(ParseError::MissingDate);
    }
    let split = body.char_indices().nth(DATE_WIDTH).map_or(body.len(), |(i, _)| i);
    let (date, rest) = body.split_at(split);

    let mut tokens = rest.split_whitespace();
    let (visitor, vscore) = team_and_score(&mut tokens)?;
    let (home, hscore) = team_and_score(&mut tokens)?;

    let location = tokens
        .next()
        .and_then(|t| t.chars().next())
        .map_or(Location::Neutral, Location::from_flag);

    Ok(Some(RawGame {
        date: date.trim().to_string(),
        visitor,
        vscore,
        home,
        hscore,
        location,
    }))
}

fn team_and_score<'a, I>(tokens: &mut I) -> Result<(String, u32), ParseError>
where
    I: Iterator<Item = &'a str>,
{
    // The first word always belongs to the name, so "49ers" works
    let mut name = tokens.next().ok_or(ParseError::MissingTeam)?.to_string();

    for token in tokens.by_ref() {
        if token.starts_with(|c: char| c.is_ascii_digit()) {
            return Ok((name, parse_score(token)?));
        }
        name.push(' ');
        name.push_str(token);
    }

    Err(ParseError::MissingScore)
}

// Only the leading digits count: "21*" is 21
fn parse_score(token: &str) -> Result<u32, ParseError> {
    let end = token.find(|c: char| !c.is_ascii_digit()).unwrap_or(token.len());
    token[..end]
        .parse()
        .map_err(|_| ParseError::BadScore(token.to_string()))
}

// History files from the older tool name the columns team1,score1,team2,score2
#[derive(Debug, Deserialize)]
struct DelimitedGame {
    date: String,
    #[serde(alias = "team1")]
    visitor: String,
    #[serde(alias = "score1", deserialize_with = "deserialize_number_from_string")]
    vscore: u32,
    #[serde(alias = "team2")]
    home: String,
    #[serde(alias = "score2", deserialize_with = "deserialize_number_from_string")]
    hscore: u32,
    #[serde(default)]
    location: Option<String>,
}

impl DelimitedGame {
    fn into_raw(self) -> Result<RawGame, ParseError> {
        let visitor = normalize_name(&self.visitor).ok_or(ParseError::MissingTeam)?;
        let home = normalize_name(&self.home).ok_or(ParseError::MissingTeam)?;
        let location = self
            .location
            .as_deref()
            .and_then(|l| l.trim().chars().next())
            .map_or(Location::Neutral, Location::from_flag);

        Ok(RawGame {
            date: self.date.trim().to_string(),
            visitor,
            vscore: self.vscore,
            home,
            hscore: self.hscore,
            location,
        })
    }
}

fn normalize_name(name: &str) -> Option<String> {
    let joined = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if joined.is_empty() { None } else { Some(joined) }
}

fn read_delimited<R: Read>(reader: R, delimiter: u8, has_headers: bool) -> Result<Parsed, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut parsed = Parsed::default();
    for (row, result) in rdr.deserialize::<DelimitedGame>().enumerate() {
        let lineno = row + 1 + usize::from(has_headers);
        match result {
            Ok(game) => parsed.push(lineno, game.into_raw().map(Some)),
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => parsed.push(lineno, Err(ParseError::BadRow(e.to_string()))),
        }
    }

    Ok(parsed)
}
