use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::{Map, Value as JsonValue};

const TEAMS: &[&str] = &[
    "Arsenal",
    "Barcelona",
    "Bayern Munich",
    "Inter",
    "Lyon",
    "Porto",
];
const POSITIONS: &[&str] = &["GK", "DF", "DF", "DF", "MF", "MF", "MF,FW", "FW", "DF,MF"];
const FIRST_NAMES: &[&str] = &[
    "Adrien", "Bruno", "Carlos", "Dani", "Emil", "Filip", "Goran", "Hugo", "Ivan", "Jonas",
    "Kevin", "Luka", "Marco", "Nico", "Oscar", "Pedro",
];
const LAST_NAMES: &[&str] = &[
    "Almeida", "Berg", "Costa", "Dumont", "Eriksen", "Fischer", "Garcia", "Horvat", "Ilic",
    "Jansen", "Keller", "Lopez",
];
const SEASON: i64 = 2024;

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Non-negative count around `mean`.
    fn count(&mut self, mean: f64) -> i64 {
        self.gauss(mean, mean.sqrt().max(1.0)).round().max(0.0) as i64
    }
}

// ---------------------------------------------------------------------------
// Squad
// ---------------------------------------------------------------------------

struct Player {
    name: String,
    team: &'static str,
    position: &'static str,
    age: String,
    birth_year: i64,
    minutes: i64,
}

fn squad(rng: &mut SimpleRng, size: usize) -> Vec<Player> {
    let mut players: Vec<Player> = Vec::with_capacity(size);
    while players.len() < size {
        let name = format!("{} {}", rng.pick(FIRST_NAMES), rng.pick(LAST_NAMES));
        if players.iter().any(|p| p.name == name) {
            continue;
        }
        let years = 17 + rng.below(20) as i64;
        let days = rng.below(365);
        players.push(Player {
            name,
            team: rng.pick(TEAMS),
            position: rng.pick(POSITIONS),
            age: format!("{years}-{days:03}"),
            birth_year: SEASON - years,
            minutes: 300 + rng.below(3000) as i64,
        });
    }
    players
}

/// Identity columns shared by every table.
fn identity(players: &[Player]) -> Vec<(&'static str, Vec<JsonValue>)> {
    vec![
        ("player", players.iter().map(|p| p.name.clone().into()).collect()),
        ("team", players.iter().map(|p| p.team.into()).collect()),
        ("position", players.iter().map(|p| p.position.into()).collect()),
        ("age", players.iter().map(|p| p.age.clone().into()).collect()),
        ("birth_year", players.iter().map(|p| p.birth_year.into()).collect()),
        ("minutes", players.iter().map(|p| p.minutes.into()).collect()),
    ]
}

/// A stat column scaled by playing time; `weight` favours some positions.
fn stat(
    rng: &mut SimpleRng,
    players: &[Player],
    per_90: f64,
    weight: impl Fn(&str) -> f64,
) -> Vec<JsonValue> {
    players
        .iter()
        .map(|p| {
            let mean = per_90 * weight(p.position) * p.minutes as f64 / 90.0;
            rng.count(mean).into()
        })
        .collect()
}

fn ratio(numerator: &[JsonValue], denominator: &[JsonValue]) -> Vec<JsonValue> {
    numerator
        .iter()
        .zip(denominator)
        .map(|(n, d)| match (n.as_f64(), d.as_f64()) {
            (Some(n), Some(d)) if d > 0.0 => (((n / d) * 1000.0).round() / 10.0).into(),
            _ => JsonValue::Null,
        })
        .collect()
}

fn outfield(position: &str) -> f64 {
    if position == "GK" { 0.05 } else { 1.0 }
}

fn defensive(position: &str) -> f64 {
    match position {
        "GK" => 0.1,
        p if p.starts_with("DF") => 1.6,
        p if p.contains("MF") => 1.1,
        _ => 0.4,
    }
}

fn attacking(position: &str) -> f64 {
    match position {
        "GK" => 0.0,
        p if p.contains("FW") => 1.8,
        p if p.contains("MF") => 0.9,
        _ => 0.3,
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn defense_table(rng: &mut SimpleRng, players: &[Player]) -> Vec<(&'static str, Vec<JsonValue>)> {
    let mut columns = identity(players);
    let tackles = stat(rng, players, 1.8, defensive);
    let tackles_won: Vec<JsonValue> = tackles
        .iter()
        .map(|t| {
            let t = t.as_i64().unwrap_or(0);
            (((t as f64) * (0.5 + 0.3 * rng.next_f64())).round() as i64).into()
        })
        .collect();
    columns.push(("tackles", tackles));
    columns.push(("tackles_won", tackles_won));
    columns.push(("interceptions", stat(rng, players, 1.2, defensive)));
    columns.push(("blocks", stat(rng, players, 1.0, defensive)));
    columns.push(("clearances", stat(rng, players, 2.0, defensive)));
    columns.push(("errors", stat(rng, players, 0.03, outfield)));
    columns
}

fn shooting_table(rng: &mut SimpleRng, players: &[Player]) -> Vec<(&'static str, Vec<JsonValue>)> {
    let mut columns = identity(players);
    let shots = stat(rng, players, 2.2, attacking);
    let on_target: Vec<JsonValue> = shots
        .iter()
        .map(|s| {
            let s = s.as_i64().unwrap_or(0);
            (((s as f64) * (0.25 + 0.25 * rng.next_f64())).round() as i64).into()
        })
        .collect();
    let goals: Vec<JsonValue> = on_target
        .iter()
        .map(|s| {
            let s = s.as_i64().unwrap_or(0);
            (((s as f64) * (0.2 + 0.3 * rng.next_f64())).round() as i64).into()
        })
        .collect();
    let on_target_pct = ratio(&on_target, &shots);
    columns.push(("goals", goals));
    columns.push(("shots", shots));
    columns.push(("shots_on_target", on_target));
    columns.push(("shots_on_target_pct", on_target_pct));
    columns.push(("penalties", stat(rng, players, 0.05, attacking)));
    columns
}

fn passing_table(rng: &mut SimpleRng, players: &[Player]) -> Vec<(&'static str, Vec<JsonValue>)> {
    let mut columns = identity(players);
    let attempted = stat(rng, players, 45.0, outfield);
    let completed: Vec<JsonValue> = attempted
        .iter()
        .map(|a| {
            let a = a.as_i64().unwrap_or(0);
            (((a as f64) * (0.65 + 0.25 * rng.next_f64())).round() as i64).into()
        })
        .collect();
    let pct = ratio(&completed, &attempted);
    columns.push(("passes_completed", completed));
    columns.push(("passes", attempted));
    columns.push(("passes_pct", pct));
    columns.push(("assists", stat(rng, players, 0.12, attacking)));
    columns.push(("key_passes", stat(rng, players, 1.1, attacking)));
    columns.push(("progressive_passes", stat(rng, players, 3.0, outfield)));
    columns
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn arrow_array(values: &[JsonValue]) -> ArrayRef {
    if values.iter().all(|v| v.is_i64() || v.is_null()) {
        Arc::new(Int64Array::from(values.iter().map(JsonValue::as_i64).collect::<Vec<_>>()))
    } else if values.iter().all(|v| v.is_number() || v.is_null()) {
        Arc::new(Float64Array::from(values.iter().map(JsonValue::as_f64).collect::<Vec<_>>()))
    } else {
        Arc::new(StringArray::from(
            values.iter().map(JsonValue::as_str).collect::<Vec<_>>(),
        ))
    }
}

fn write_parquet(path: &Path, columns: &[(&str, Vec<JsonValue>)]) -> Result<()> {
    let arrays: Vec<ArrayRef> = columns.iter().map(|(_, values)| arrow_array(values)).collect();
    let fields: Vec<Field> = columns
        .iter()
        .zip(&arrays)
        .map(|((name, _), array)| Field::new(*name, array.data_type().clone(), true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(path: &Path, columns: &[(&str, Vec<JsonValue>)]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(columns.iter().map(|(name, _)| *name))?;
    let rows = columns.first().map_or(0, |(_, values)| values.len());
    for i in 0..rows {
        writer.write_record(columns.iter().map(|(_, values)| match &values[i] {
            JsonValue::Null => String::new(),
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        }))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(path: &Path, columns: &[(&str, Vec<JsonValue>)]) -> Result<()> {
    let rows = columns.first().map_or(0, |(_, values)| values.len());
    let records: Vec<JsonValue> = (0..rows)
        .map(|i| {
            let record: Map<String, JsonValue> = columns
                .iter()
                .map(|(name, values)| (name.to_string(), values[i].clone()))
                .collect();
            JsonValue::Object(record)
        })
        .collect();
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &records).context("writing JSON records")?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("sample_data"), PathBuf::from);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let players = squad(&mut rng, 60);

    write_parquet(
        &out_dir.join("player_defense.parquet"),
        &defense_table(&mut rng, &players),
    )?;
    write_csv(
        &out_dir.join("player_shooting.csv"),
        &shooting_table(&mut rng, &players),
    )?;
    write_json(
        &out_dir.join("player_passing.json"),
        &passing_table(&mut rng, &players),
    )?;

    println!(
        "Wrote 3 tables with {} players each to {}",
        players.len(),
        out_dir.display()
    );
    Ok(())
}
