//! Airwaves headless runner
//!
//! Loads a level, applies transmitter settings, emits waves and steps the
//! world for a fixed number of ticks. Prints a summary, or the final
//! snapshot as JSON with `--json`.
//!
//! Run `airwaves --help` for the full option list.

#[cfg(not(target_arch = "wasm32"))]
mod runner {
    use std::path::PathBuf;

    use clap::Parser;
    use glam::Vec2;

    use airwaves::consts::*;
    use airwaves::sim::ObstacleItem;
    use airwaves::{MeshDensity, Settings, SimObserver, Simulation};

    fn parse_density(name: &str) -> Result<MeshDensity, String> {
        MeshDensity::from_name(name)
            .ok_or_else(|| format!("unknown mesh density {:?} (coarse, standard, fine)", name))
    }

    /// Drive one Airwaves level headlessly
    #[derive(Parser, Debug, Clone, PartialEq)]
    #[command(author, version, about, long_about = None)]
    pub struct RunOptions {
        /// Level to load
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=LEVEL_COUNT as i64))]
        pub level: u32,

        /// Number of fixed steps to run
        #[arg(default_value_t = 120)]
        pub ticks: u64,

        /// Transmit power (clamped to 1-100 on emit)
        #[arg(long, default_value_t = MAX_TRANSMIT_POWER, allow_negative_numbers = true)]
        pub power: i32,

        /// Antenna height
        #[arg(long, default_value_t = DEFAULT_ANTENNA_HEIGHT, allow_negative_numbers = true)]
        pub height: i32,

        /// Antenna orientation in degrees (0 is straight up)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        pub orientation: i32,

        /// Antenna type (dish, yagi, dipole)
        #[arg(long)]
        pub antenna: Option<String>,

        /// Frequency band (HF, VHF, UHF, SHF)
        #[arg(long)]
        pub band: Option<String>,

        /// Settings JSON file
        #[arg(long)]
        pub settings: Option<PathBuf>,

        /// Mesh density preset; overrides the settings file
        #[arg(long, value_parser = parse_density)]
        pub density: Option<MeshDensity>,

        /// Emit on the first tick and then every N ticks; 0 emits once
        #[arg(long, default_value_t = 0)]
        pub emit_every: u64,

        /// Print the final snapshot as JSON
        #[arg(long)]
        pub json: bool,
    }

    /// Logs notifications and counts target touches
    #[derive(Debug, Default)]
    struct LoggingObserver {
        touches: u32,
        objects: Vec<&'static str>,
        max_displacement: f32,
        origins: Vec<Vec2>,
    }

    impl SimObserver for LoggingObserver {
        fn positions_updated(&mut self, positions: &[Vec2]) {
            if self.origins.len() != positions.len() {
                self.origins = positions.to_vec();
                return;
            }
            let furthest = self
                .origins
                .iter()
                .zip(positions)
                .map(|(a, b)| a.distance(*b))
                .fold(0.0_f32, f32::max);
            self.max_displacement = self.max_displacement.max(furthest);
        }

        fn objects_updated(&mut self, items: &[ObstacleItem]) {
            self.objects = items.iter().map(|item| item.kind.as_str()).collect();
        }

        fn target_touched(&mut self, level: u32) {
            self.touches += 1;
            log::info!("Target reached on level {} ({} so far)", level, self.touches);
        }
    }

    pub fn settings_for(opts: &RunOptions) -> Settings {
        let mut settings = match &opts.settings {
            Some(path) => Settings::load(path),
            None => Settings::default(),
        };
        if let Some(density) = opts.density {
            settings.density = density;
        }
        settings
    }

    pub fn run(opts: &RunOptions) -> Result<(), String> {
        let settings = settings_for(opts);
        log::info!(
            "Airwaves starting: level {}, {} ticks, {} mesh",
            opts.level,
            opts.ticks,
            settings.density.as_str()
        );

        let mut sim = Simulation::new(settings);
        let mut observer = LoggingObserver::default();
        if !sim.select_level(opts.level, &mut observer) {
            return Err(format!(
                "level must be between 1 and {}, got {}",
                LEVEL_COUNT, opts.level
            ));
        }

        sim.set_antenna_height(opts.height);
        sim.set_antenna_orientation(opts.orientation);
        if let Some(antenna) = &opts.antenna {
            sim.set_antenna_type(antenna);
        }
        if let Some(band) = &opts.band {
            sim.set_frequency_band(band);
        }

        let mut emissions = 0;
        for i in 0..opts.ticks {
            let due = i == 0 || (opts.emit_every > 0 && i % opts.emit_every == 0);
            if due {
                sim.set_transmit_power(opts.power);
                sim.emit(&mut observer);
                emissions += 1;
            }
            sim.tick(&mut observer);
        }

        let snapshot = sim.snapshot();
        if opts.json {
            let json = serde_json::to_string_pretty(&snapshot)
                .map_err(|e| format!("failed to serialize snapshot: {}", e))?;
            println!("{}", json);
        } else {
            let tx = sim.transmission();
            println!("level:            {}", opts.level);
            println!("mesh:             {}", sim.settings().density.as_str());
            println!("ticks:            {}", snapshot.tick);
            println!("particles:        {}", snapshot.positions.len());
            println!("obstacles:        {}", observer.objects.join(", "));
            println!(
                "antenna:          {}",
                tx.antenna_type.map_or("default", |a| a.as_str())
            );
            println!(
                "band:             {}",
                tx.frequency_band.map_or("default", |b| b.as_str())
            );
            println!("emissions:        {}", emissions);
            println!("target touches:   {}", observer.touches);
            println!("max displacement: {:.2}", observer.max_displacement);
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use clap::error::ErrorKind;

        fn parse(list: &[&str]) -> Result<RunOptions, clap::Error> {
            RunOptions::try_parse_from(std::iter::once("airwaves").chain(list.iter().copied()))
        }

        #[test]
        fn test_parse_defaults() {
            let opts = parse(&[]).unwrap();
            assert_eq!(opts.level, 1);
            assert_eq!(opts.ticks, 120);
            assert_eq!(opts.power, MAX_TRANSMIT_POWER);
            assert_eq!(opts.height, DEFAULT_ANTENNA_HEIGHT);
            assert_eq!(opts.density, None);
            assert!(!opts.json);
        }

        #[test]
        fn test_parse_positional_and_flags() {
            let opts = parse(&[
                "3", "600", "--power", "150", "--antenna", "yagi", "--band", "UHF", "--json",
                "--emit-every", "30", "--orientation", "-45", "--density", "Fine",
            ])
            .unwrap();
            assert_eq!(opts.level, 3);
            assert_eq!(opts.ticks, 600);
            assert_eq!(opts.power, 150);
            assert_eq!(opts.orientation, -45);
            assert_eq!(opts.antenna.as_deref(), Some("yagi"));
            assert_eq!(opts.band.as_deref(), Some("UHF"));
            assert_eq!(opts.emit_every, 30);
            assert_eq!(opts.density, Some(MeshDensity::Fine));
            assert!(opts.json);
        }

        #[test]
        fn test_parse_equals_form_and_help() {
            let opts = parse(&["--power=150", "--density=coarse"]).unwrap();
            assert_eq!(opts.power, 150);
            assert_eq!(opts.density, Some(MeshDensity::Coarse));

            let help = parse(&["--help"]).unwrap_err();
            assert_eq!(help.kind(), ErrorKind::DisplayHelp);
        }

        #[test]
        fn test_parse_errors() {
            assert!(parse(&["--power"]).is_err());
            assert!(parse(&["--power", "lots"]).is_err());
            assert!(parse(&["--turbo"]).is_err());
            assert!(parse(&["1", "2", "3"]).is_err());
            assert!(parse(&["--density", "dense"]).is_err());
            assert!(parse(&["0"]).is_err());
            assert!(parse(&["6"]).is_err());
        }

        #[test]
        fn test_density_overrides_settings() {
            let opts = parse(&["--density", "coarse"]).unwrap();
            assert_eq!(settings_for(&opts).density, MeshDensity::Coarse);
            assert_eq!(settings_for(&parse(&[]).unwrap()).density, MeshDensity::Standard);
        }

        #[test]
        fn test_run_rejects_bad_level() {
            let mut opts = parse(&["1", "1", "--density", "coarse"]).unwrap();
            opts.level = 9;
            assert!(run(&opts).is_err());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();

    let opts = runner::RunOptions::parse();
    if let Err(e) = runner::run(&opts) {
        log::error!("{}", e);
        eprintln!("airwaves: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
