use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use serde_json::{json, Value};

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
}

/// Neighbourhoods around Albuquerque where shoots cluster: (name, lat, lng, spread).
const SITES: [(&str, f64, f64, f64); 5] = [
    ("Downtown", 35.0844, -106.6504, 0.006),
    ("Old Town", 35.0961, -106.6703, 0.004),
    ("Nob Hill", 35.0806, -106.6125, 0.005),
    ("Uptown", 35.1027, -106.5821, 0.007),
    ("Sandia Foothills", 35.1455, -106.4912, 0.012),
];

const TYPES: [&str; 5] = ["Feature Film", "TV", "Commercial", "Music Video", "Short Film"];

const TITLES: [&str; 8] = [
    "Desert Crossing",
    "Turquoise Nights",
    "The Long Mesa",
    "Route 66 Stories",
    "Green Chile Season",
    "Balloon Fiesta",
    "High Plains Drifters",
    "Rio Grande",
];

/// Milliseconds since the epoch for UTC midnight, `day` days after Jan 1st of `year`.
fn shoot_date_ms(year: i32, day: u64) -> Result<i64> {
    let date = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|jan1| jan1.checked_add_days(Days::new(day)))
        .with_context(|| format!("no calendar date {day} days into {year}"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .with_context(|| format!("no midnight on {date}"))?;
    Ok(midnight.and_utc().timestamp_millis())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let mut features: Vec<Value> = Vec::new();

    for object_id in 1..=600 {
        let (site, lat, lng, spread) = SITES[rng.below(SITES.len())];
        let title = TITLES[rng.below(TITLES.len())];
        let kind = TYPES[rng.below(TYPES.len())];
        let year = 2003 + rng.below(14) as i32;
        let day = rng.below(365) as u64;

        // Roughly one in twenty records has unusable geometry.
        let geometry = if rng.next_f64() < 0.05 {
            json!({ "x": "NaN", "y": "NaN" })
        } else {
            json!({ "x": rng.gauss(lng, spread), "y": rng.gauss(lat, spread) })
        };

        // A few records carry no shoot date at all.
        let shoot_date = if rng.next_f64() < 0.03 {
            Value::Null
        } else {
            json!(shoot_date_ms(year, day)?)
        };

        features.push(json!({
            "geometry": geometry,
            "attributes": {
                "OBJECTID": object_id,
                "Title": title,
                "Type": kind,
                "Site": site,
                "ShootDate": shoot_date,
            }
        }));
    }

    let output_path = Path::new("data/filmlocationsJSON_ALL.json");
    if let Some(dir) = output_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    let count = features.len();
    let doc = json!({ "features": features });
    let text = serde_json::to_string_pretty(&doc).context("serializing feed")?;
    std::fs::write(output_path, text)
        .with_context(|| format!("writing {}", output_path.display()))?;

    println!("Wrote {count} film locations to {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shoot_dates_are_utc_midnights() {
        assert_eq!(shoot_date_ms(1970, 0).unwrap(), 0);
        // 2006-01-01T00:00:00Z
        assert_eq!(shoot_date_ms(2006, 0).unwrap(), 1_136_073_600_000);
        // 2016 is a leap year: day 365 is Dec 31st, day 366 rolls over.
        assert_eq!(shoot_date_ms(2016, 366).unwrap(), 1_483_228_800_000);
    }
}
