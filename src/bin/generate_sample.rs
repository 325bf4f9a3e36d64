use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

const GAMES: i64 = 162;

/// (team, league, base win rate)
const TEAMS: [(&str, &str, f64); 8] = [
    ("ARI", "NL", 0.49),
    ("ATL", "NL", 0.55),
    ("BAL", "AL", 0.46),
    ("BOS", "AL", 0.56),
    ("NYY", "AL", 0.59),
    ("OAK", "AL", 0.53),
    ("SFG", "NL", 0.52),
    ("TEX", "AL", 0.50),
];

const FIRST_NAMES: [&str; 6] = ["Alex", "Buster", "David", "Derek", "Miguel", "Ryan"];
const LAST_NAMES: [&str; 6] = ["Cabrera", "Howard", "Jeter", "Ortiz", "Posey", "Rodriguez"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// One team-season.
struct Season {
    team: &'static str,
    league: &'static str,
    year: i64,
    runs_scored: i64,
    runs_allowed: i64,
    wins: i64,
    playoffs: i64,
    player: String,
}

fn generate(rng: &mut SimpleRng) -> Vec<Season> {
    let mut seasons = Vec::new();
    for year in 1999..=2012 {
        for &(team, league, base_rate) in &TEAMS {
            let rate = (base_rate + rng.gauss(0.0, 0.04)).clamp(0.3, 0.7);
            let wins = (rate * GAMES as f64).round() as i64;
            // Pythagorean expectation: RS²/(RS²+RA²) ≈ win rate.
            let runs_scored = rng.gauss(730.0, 45.0).round();
            let runs_allowed = (runs_scored * ((1.0 - rate) / rate).sqrt()).round();
            seasons.push(Season {
                team,
                league,
                year,
                runs_scored: runs_scored as i64,
                runs_allowed: runs_allowed as i64,
                wins,
                playoffs: i64::from(wins >= 92),
                player: format!("{} {}", rng.pick(&FIRST_NAMES), rng.pick(&LAST_NAMES)),
            });
        }
    }
    seasons
}

fn write_csv(path: &str, seasons: &[Season]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    // Padded headers on purpose: the dashboard trims them on load.
    writer.write_record([
        "Team", " League", "Year", "RS", "RA", "W", "L", "G", "Playoffs", "Player ",
    ])?;
    for s in seasons {
        writer.write_record([
            s.team.to_string(),
            s.league.to_string(),
            s.year.to_string(),
            s.runs_scored.to_string(),
            s.runs_allowed.to_string(),
            s.wins.to_string(),
            (GAMES - s.wins).to_string(),
            GAMES.to_string(),
            s.playoffs.to_string(),
            s.player.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn to_batch(seasons: &[Season]) -> Result<RecordBatch> {
    let ints = |f: fn(&Season) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(seasons.iter().map(f).collect::<Vec<_>>()))
    };
    let strings = |f: fn(&Season) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(seasons.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("Team", DataType::Utf8, false),
        Field::new("League", DataType::Utf8, false),
        Field::new("Year", DataType::Int64, false),
        Field::new("RS", DataType::Int64, false),
        Field::new("RA", DataType::Int64, false),
        Field::new("W", DataType::Int64, false),
        Field::new("L", DataType::Int64, false),
        Field::new("Playoffs", DataType::Int64, false),
        Field::new("Player", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema,
        vec![
            strings(|s| s.team),
            strings(|s| s.league),
            ints(|s| s.year),
            ints(|s| s.runs_scored),
            ints(|s| s.runs_allowed),
            ints(|s| s.wins),
            ints(|s| GAMES - s.wins),
            ints(|s| s.playoffs),
            strings(|s| s.player.as_str()),
        ],
    )?;
    Ok(batch)
}

fn write_parquet(path: &str, batch: &RecordBatch) -> Result<()> {
    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let seasons = generate(&mut rng);

    let csv_path = "sample_baseball.csv";
    write_csv(csv_path, &seasons)?;

    let parquet_path = "sample_baseball.parquet";
    let batch = to_batch(&seasons)?;
    write_parquet(parquet_path, &batch)?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!(
        "Wrote {} team-seasons ({} teams) to {csv_path} and {parquet_path}",
        seasons.len(),
        TEAMS.len()
    );
    Ok(())
}
