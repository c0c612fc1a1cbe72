use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const TRACKS: usize = 400;

const ARTISTS: [&str; 12] = [
    "Nova Reyes",
    "The Lanterns",
    "Kai Morrow",
    "Bad Lemon",
    "Sólveig",
    "DJ Parallax",
    "Mirae",
    "Oscar Vale",
    "Juno & The Tides",
    "Lil Orbit",
    "Camila Sun",
    "Tomás Grey",
];

const WORDS: [&str; 16] = [
    "Midnight", "Golden", "Echo", "Fever", "Paper", "Neon", "River", "Ghost",
    "Summer", "Static", "Velvet", "Satellite", "Honey", "Wildfire", "Glass", "Tokyo",
];

const FEATURES: [&str; 7] = [
    "danceability_%",
    "valence_%",
    "energy_%",
    "acousticness_%",
    "instrumentalness_%",
    "liveness_%",
    "speechiness_%",
];

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
        (self.next_f64() * n as f64) as usize % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn percent(&mut self, mean: f64, std_dev: f64) -> i64 {
        self.gauss(mean, std_dev).round().clamp(0.0, 100.0) as i64
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let mut names = Vec::with_capacity(TRACKS);
    let mut artists = Vec::with_capacity(TRACKS);
    let mut artist_count = Vec::with_capacity(TRACKS);
    let mut released_year = Vec::with_capacity(TRACKS);
    let mut streams = Vec::with_capacity(TRACKS);
    let mut bpm = Vec::with_capacity(TRACKS);
    let mut features: Vec<Vec<i64>> = vec![Vec::with_capacity(TRACKS); FEATURES.len()];

    for _ in 0..TRACKS {
        // Skew artist choice so the bar chart has a clear top.
        let lead = rng.below(ARTISTS.len()).min(rng.below(ARTISTS.len()));
        let mut credited = vec![ARTISTS[lead]];
        if rng.next_f64() < 0.3 {
            let feat = ARTISTS[rng.below(ARTISTS.len())];
            if feat != ARTISTS[lead] {
                credited.push(feat);
            }
        }

        names.push(format!(
            "{} {}",
            WORDS[rng.below(WORDS.len())],
            WORDS[rng.below(WORDS.len())]
        ));
        artists.push(credited.join(", "));
        artist_count.push(credited.len() as i64);
        released_year.push(1990 + rng.below(34) as i64);

        let energy = rng.percent(64.0, 16.0);
        let danceability = rng.percent(40.0 + energy as f64 * 0.4, 10.0);
        let popularity = (danceability + energy) as f64 / 200.0;
        streams.push((rng.next_f64().powi(3) * 2.5e9 * (0.3 + popularity)) as i64 + 2_762);
        bpm.push(70 + rng.below(110) as i64);

        let values = [
            danceability,
            rng.percent(50.0, 23.0),
            energy,
            rng.percent(100.0 - energy as f64, 15.0),
            rng.percent(2.0, 4.0),
            rng.percent(18.0, 13.0),
            rng.percent(10.0, 9.0),
        ];
        for (column, value) in features.iter_mut().zip(values) {
            column.push(value);
        }
    }

    let mut fields = vec![
        Field::new("track_name", DataType::Utf8, false),
        Field::new("artist(s)_name", DataType::Utf8, false),
        Field::new("artist_count", DataType::Int64, false),
        Field::new("released_year", DataType::Int64, false),
        Field::new("streams", DataType::Int64, false),
        Field::new("bpm", DataType::Int64, false),
    ];
    fields.extend(FEATURES.iter().map(|f| Field::new(*f, DataType::Int64, false)));
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(names)),
        Arc::new(StringArray::from(artists)),
        Arc::new(Int64Array::from(artist_count)),
        Arc::new(Int64Array::from(released_year)),
        Arc::new(Int64Array::from(streams)),
        Arc::new(Int64Array::from(bpm)),
    ];
    columns.extend(
        features
            .into_iter()
            .map(|values| Arc::new(Int64Array::from(values)) as ArrayRef),
    );

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    // Write Parquet
    let output_path = "sample_tracks.parquet";
    let file = std::fs::File::create(output_path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    println!("Wrote {TRACKS} tracks to {output_path}");
    Ok(())
}
