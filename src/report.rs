use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::data_loader::*;
use crate::error::Error;
use crate::util::*;

// One line of the final table. Teams come out rating first, ties sharing the rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub rank: usize,
    pub team: String,
    pub won: u32,
    pub lost: u32,
    pub tied: u32,
    pub pf: u64,
    pub pa: u64,
    #[serde(serialize_with = "three_decimals")]
    pub rating: f64,
    #[serde(serialize_with = "three_decimals")]
    pub sched: f64,
    pub sched_rank: usize,
    pub hwon: u32,
    pub hlost: u32,
    pub htied: u32,
    pub hpf: u64,
    pub hpa: u64,
    pub vwon: u32,
    pub vlost: u32,
    pub vtied: u32,
    pub vpf: u64,
    pub vpa: u64,
}

impl RankingRow {
    fn new(rank: usize, t: &Team) -> Self {
        Self {
            rank,
            team: t.name.clone(),
            won: t.overall.won,
            lost: t.overall.lost,
            tied: t.overall.tied,
            pf: t.overall.pf,
            pa: t.overall.pa,
            rating: t.rating,
            sched: t.sched,
            sched_rank: t.schedplace,
            hwon: t.home.won,
            hlost: t.home.lost,
            htied: t.home.tied,
            hpf: t.home.pf,
            hpa: t.home.pa,
            vwon: t.away.won,
            vlost: t.away.lost,
            vtied: t.away.tied,
            vpf: t.away.pf,
            vpa: t.away.pa,
        }
    }
}

fn three_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:.3}"))
}

pub fn ranking_rows(season: &Season) -> Vec<RankingRow> {
    let order = order_by_desc(&season.teams, |t| t.rating);
    let ratings: Vec<f64> = order.iter().map(|&idx| season.teams[idx].rating).collect();

    order
        .iter()
        .zip(tied_places(&ratings))
        .map(|(&idx, rank)| RankingRow::new(rank, &season.teams[idx]))
        .collect()
}

pub fn write_headings<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{:33} {:>10} {:>32} {:>20}", " ", "Overall", "Home", "Away")?;
    writeln!(out,
        "{:>3} {:<20} {:>2} {:>2} {:>2} {:>4} {:>4} {:>7} {:>7} {:>8} {:>2} {:>2} {:>4} {:>4} {:>4} {:>2} {:>2} {:>4} {:>4}",
        "Rnk", "Team", "W", "L", "T", "PF", "PA", "RATE", "SOS", "W", "L", "T", "PF", "PA", "W", "L", "T", "PF", "PA",
    )?;
    writeln!(out,
        "{:>3} {:<20} {:>2} {:>2} {:>2} {:>4} {:>4} {:>7} {:>7} {:>8} {:>2} {:>2} {:>4} {:>4} {:>4} {:>2} {:>2} {:>4} {:>4}",
        "---", "----", "-", "-", "-", "--", "--", "------", "------", "-", "-", "-", "--", "--", "-", "-", "-", "--", "--",
    )
}

pub fn write_row<W: Write>(out: &mut W, r: &RankingRow) -> io::Result<()> {
    writeln!(out,
        "{:3} {:<20.20} {:2} {:2} {:2} {:4} {:4} {:7.3} {:7.3} ({:3}) {:2} {:2} {:2} {:4} {:4} {:4} {:2} {:2} {:4} {:4}",
        r.rank, r.team, r.won, r.lost, r.tied, r.pf, r.pa, r.rating, r.sched, r.sched_rank,
        r.hwon, r.hlost, r.htied, r.hpf, r.hpa,
        r.vwon, r.vlost, r.vtied, r.vpf, r.vpa,
    )
}

pub fn write_rankings<W: Write>(out: &mut W, season: &Season) -> io::Result<()> {
    write_headings(out)?;
    for row in ranking_rows(season) {
        write_row(out, &row)?;
    }
    out.flush()
}

// The file is truncated first; the handle is closed on every path when it drops.
pub fn output_report(path: &Path, season: &Season) -> Result<(), Error> {
    let write_err = |source| Error::WriteOutput { path: path.to_path_buf(), source };

    let file = File::create(path).map_err(write_err)?;
    let mut out = BufWriter::new(file);
    write_rankings(&mut out, season).map_err(write_err)
}

pub fn export_csv(path: &Path, season: &Season) -> Result<(), Error> {
    let csv_err = |source| Error::Csv { path: path.to_path_buf(), source };

    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    for row in ranking_rows(season) {
        wtr.serialize(row).map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| Error::WriteOutput { path: path.to_path_buf(), source })
}
