use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde_json::json;

/// Minimal deterministic PRNG (xoshiro256**)
struct SampleRng {
    state: [u64; 4],
}

impl SampleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SampleRng { state: s }
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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const COUNTRIES: &[(&str, &str)] = &[
    ("Brazil", "BRA"),
    ("Chile", "CHL"),
    ("Norway", "NOR"),
    ("Portugal", "PRT"),
    ("Australia", "AUS"),
    ("Japan", "JPN"),
    ("Canada", "CAN"),
    ("Indonesia", "IDN"),
    ("South Africa", "ZAF"),
    ("Mexico", "MEX"),
    ("India", "IND"),
    ("Spain", "ESP"),
];

struct SampleSpec {
    file: &'static str,
    title: &'static str,
    subtitle: &'static str,
    citation: &'static str,
    header: &'static str,
    years: RangeInclusive<i32>,
    /// Per-country base value, drawn uniformly from this range.
    base: (f64, f64),
    /// Per-year drift applied on top of the base.
    drift: f64,
    noise: f64,
    clamp: (f64, f64),
    /// Implementation levels are reported as whole numbers.
    integer: bool,
}

fn specs() -> Vec<SampleSpec> {
    vec![
        SampleSpec {
            file: "marine-protected-areas.csv",
            title: "Marine protected areas",
            subtitle: "Share of territorial waters designated as marine protected areas.",
            citation: "Fonte: World Bank / UNEP-WCMC (dados sintéticos de exemplo)",
            header: "Marine protected areas (% of territorial waters)",
            years: 2010..=2022,
            base: (1.0, 30.0),
            drift: 0.8,
            noise: 0.6,
            clamp: (0.0, 100.0),
            integer: false,
        },
        SampleSpec {
            file: "coastal-eutrophication.csv",
            title: "Coastal eutrophication",
            subtitle: "Total nitrogen from algae biomass per sq. km of river basin area per day.",
            citation: "Fonte: UN SDG Indicators Database (dados sintéticos de exemplo)",
            header: "14.1.1 - Coastal eutrophication: Total Nitrogen (TN) (kilograms of nitrogen from algae biomass per sq. km. of river basin area per day) - EN_MAR_TN",
            years: 2016..=2022,
            base: (20.0, 160.0),
            drift: 1.5,
            noise: 6.0,
            clamp: (0.0, 500.0),
            integer: false,
        },
        SampleSpec {
            file: "ocean-acidification.csv",
            title: "Ocean acidification",
            subtitle: "Average marine acidity (pH) at representative sampling stations.",
            citation: "Fonte: UN SDG Indicators Database (dados sintéticos de exemplo)",
            header: "14.3.1 - Average marine acidity (pH) measured at agreed representative sampling stations - EN_MAR_OACID",
            years: 2010..=2022,
            base: (8.05, 8.15),
            drift: -0.002,
            noise: 0.005,
            clamp: (7.5, 8.5),
            integer: false,
        },
        SampleSpec {
            file: "ocean-health-index.csv",
            title: "Ocean Health Index",
            subtitle: "Composite index of ocean health, from 0 (worst) to 100 (best).",
            citation: "Fonte: Ocean Health Index (dados sintéticos de exemplo)",
            header: "Ocean Health Index (score)",
            years: 2012..=2022,
            base: (55.0, 85.0),
            drift: 0.3,
            noise: 1.2,
            clamp: (0.0, 100.0),
            integer: false,
        },
        SampleSpec {
            file: "regulation-illegal-fishing.csv",
            title: "Combating illegal fishing",
            subtitle: "Degree of implementation of instruments against IUU fishing (1 lowest to 5 highest).",
            citation: "Fonte: FAO / UN SDG Indicators Database (dados sintéticos de exemplo)",
            header: "14.6.1 - Progress by countries in the degree of implementation of international instruments aiming to combat illegal, unreported and unregulated fishing (level of implementation: 1 lowest to 5 highest) - ER_REG_UNFCIM",
            years: 2018..=2022,
            base: (1.0, 4.0),
            drift: 0.25,
            noise: 0.3,
            clamp: (1.0, 5.0),
            integer: true,
        },
    ]
}

fn write_dataset(dir: &Path, spec: &SampleSpec, rng: &mut SampleRng) -> anyhow::Result<usize> {
    let mut writer = csv::Writer::from_path(dir.join(spec.file))?;
    writer.write_record(["Entity", "Code", "Year", spec.header])?;

    let first_year = *spec.years.start();
    let mut rows = 0;
    for (country, code) in COUNTRIES {
        let base = rng.uniform(spec.base.0, spec.base.1);
        for year in spec.years.clone() {
            let raw = base + spec.drift * (year - first_year) as f64 + rng.gauss(0.0, spec.noise);
            let value = raw.clamp(spec.clamp.0, spec.clamp.1);
            let cell = if spec.integer {
                format!("{}", value.round() as i64)
            } else {
                format!("{value:.3}")
            };
            let year_str = year.to_string();
            writer.write_record([*country, *code, year_str.as_str(), cell.as_str()])?;
            rows += 1;
        }
    }
    writer.flush()?;

    let metadata = json!({
        "chart": {
            "title": spec.title,
            "subtitle": spec.subtitle,
            "citation": spec.citation,
        }
    });
    let meta_file = format!("{}.metadata.json", spec.file.trim_end_matches(".csv"));
    fs::write(dir.join(meta_file), serde_json::to_string_pretty(&metadata)?)?;

    Ok(rows)
}

fn main() -> anyhow::Result<()> {
    let dir = Path::new("data");
    fs::create_dir_all(dir)?;

    let mut rng = SampleRng::new(42);
    for spec in specs() {
        let rows = write_dataset(dir, &spec, &mut rng)?;
        println!("wrote {} rows to data/{}", rows, spec.file);
    }
    Ok(())
}
