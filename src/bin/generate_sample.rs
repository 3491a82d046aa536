use chrono::{Datelike, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Wind over a storm's life: spin-up to `peak` knots mid-track, then
/// decay. `t` runs 0..1 from genesis to dissipation.
fn wind_profile(t: f64, peak: f64) -> f64 {
    let shape = 1.0 - (2.0 * t - 1.0).powi(2);
    15.0 + (peak - 15.0) * shape
}

fn main() {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_storms.csv".to_string());
    let mut rng = StdRng::seed_from_u64(42);

    let names = [
        "HAIYAN", "MERANTI", "MANGKHUT", "HAGIBIS", "SURIGAE", "NANMADOL", "KHANUN", "DOKSURI",
    ];

    let mut writer = csv::Writer::from_path(&output_path).expect("Failed to create output file");
    writer
        .write_record(["SID", "NAME", "ISO_TIME", "LAT", "LON", "WMO_WIND"])
        .expect("Failed to write header");
    // Units row, the way IBTrACS exports ship it.
    writer
        .write_record(["", "", "", "degrees_north", "degrees_east", "kts"])
        .expect("Failed to write units row");

    let mut observations = 0usize;
    for (i, &name) in names.iter().enumerate() {
        let genesis =
            Utc.with_ymd_and_hms(2019, 7, 1, 0, 0, 0).unwrap() + Duration::days(9 * i as i64);
        let mut lat = 5.0 + rng.gen_range(0.0..8.0);
        let mut lon = 132.0 + rng.gen_range(0.0..18.0);
        let sid = format!(
            "{}{:03}N{:02.0}{:03.0}",
            genesis.year(),
            genesis.ordinal(),
            lat,
            lon
        );

        let steps: i64 = rng.gen_range(24..40);
        let peak = rng.gen_range(90.0..150.0);
        for step in 0..steps {
            let t = step as f64 / (steps - 1) as f64;
            let time = genesis + Duration::hours(6 * step);
            let wind = (wind_profile(t, peak) + rng.gen_range(-6.0..6.0)).max(10.0);

            // The odd missing wind report keeps the loader honest.
            let wind_field = if rng.gen_bool(0.06) {
                String::new()
            } else {
                format!("{wind:.0}")
            };
            let time_str = time.format("%Y-%m-%d %H:%M:%S").to_string();
            let lat_str = format!("{lat:.1}");
            let lon_str = format!("{lon:.1}");
            writer
                .write_record([
                    sid.as_str(),
                    name,
                    time_str.as_str(),
                    lat_str.as_str(),
                    lon_str.as_str(),
                    wind_field.as_str(),
                ])
                .expect("Failed to write record");
            observations += 1;

            // Recurving track: westward drift early, poleward and
            // eastward acceleration late.
            lat += 0.35 + 0.45 * t + rng.gen_range(-0.08..0.08);
            lon += -1.4 + 2.2 * t + rng.gen_range(-0.15..0.15);
        }
    }
    writer.flush().expect("Failed to flush output");

    println!(
        "Wrote {} storms ({observations} observations) to {output_path}",
        names.len()
    );
}
