use bilinear::{
    BilinearGroup, Bls12_381Group, Bn254Group, CountingBilinearGroup,
    DebugBilinearGroup,
};
use groth15::{Groth15G1, Groth15G2};
use sps_bench::{
    memory, publish, run_benchmark, BenchmarkConfig, BenchmarkMode,
    BenchmarkSettings, ConsoleReport, MeasuredOperation, Scheme, TexExport,
    TrackingAllocator,
};
use std::alloc::System;
use std::env;
use std::io::Stdout;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static SYSTEM_ALLOC: System = System;

#[global_allocator]
static GLOBAL: TrackingAllocator<System> =
    TrackingAllocator::new(&SYSTEM_ALLOC);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum SchemeChoice {
    Groth15G1,
    Groth15G2,
}

#[derive(Debug, Error)]
enum RunnerError {
    #[error("unsupported SPS_GROUP={0}; expected one of: bls12-381, bn254")]
    UnsupportedGroup(String),
    #[error(
        "unsupported SPS_SCHEME={0}; expected one of: groth15-g1, groth15-g2, all"
    )]
    UnsupportedScheme(String),
}

struct Sinks {
    console: ConsoleReport<Stdout>,
    tex: Option<TexExport>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let settings = BenchmarkSettings::from_env()?;
    let modes = parse_modes_env("SPS_MODE")?;
    let schemes = parse_schemes_env()?;
    let group =
        env::var("SPS_GROUP").unwrap_or_else(|_| "bls12-381".to_owned());
    let export_dir = match env::var("SPS_EXPORT_DIR") {
        Ok(dir) if dir.is_empty() => None,
        Ok(dir) => Some(PathBuf::from(dir)),
        Err(_) => Some(PathBuf::from("output")),
    };

    println!("Deterministic benchmark RNG: {}", settings.deterministic);
    let mut sinks = Sinks {
        console: ConsoleReport::stdout(),
        tex: export_dir.map(TexExport::new),
    };

    match group.to_ascii_lowercase().as_str() {
        "bls12-381" | "bls12_381" => run_all(
            &Bls12_381Group::bls12_381(),
            &settings,
            &modes,
            &schemes,
            &mut sinks,
        ),
        "bn254" => run_all(
            &Bn254Group::bn254(),
            &settings,
            &modes,
            &schemes,
            &mut sinks,
        ),
        other => Err(RunnerError::UnsupportedGroup(other.to_owned()).into()),
    }?;

    if let Some(tex) = &sinks.tex {
        for path in tex.written() {
            println!("BenchmarkFile created under: {}", path.display());
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn run_all<T: BilinearGroup>(
    timing_group: &T,
    settings: &BenchmarkSettings,
    modes: &[BenchmarkMode],
    schemes: &[SchemeChoice],
    sinks: &mut Sinks,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        substrate = %timing_group.name(),
        heap_tracking = memory::is_tracking(),
        "benchmark session started"
    );
    for &scheme in schemes {
        for &mode in modes {
            // fresh counters for every run
            let config = BenchmarkConfig::from_settings(
                timing_group.clone(),
                DebugBilinearGroup::new(),
                settings,
            )?;
            match scheme {
                SchemeChoice::Groth15G1 => {
                    run_one(&config, &Groth15G1::new(), mode, sinks)?
                }
                SchemeChoice::Groth15G2 => {
                    run_one(&config, &Groth15G2::new(), mode, sinks)?
                }
            }
        }
    }
    Ok(())
}

fn run_one<T, O>(
    config: &BenchmarkConfig<T, DebugBilinearGroup>,
    operation: &O,
    mode: BenchmarkMode,
    sinks: &mut Sinks,
) -> Result<(), Box<dyn std::error::Error>>
where
    T: BilinearGroup,
    O: MeasuredOperation<T>
        + MeasuredOperation<CountingBilinearGroup<DebugBilinearGroup>>,
{
    let results = run_benchmark(config, operation, mode)?;
    let header =
        config.header(operation.scheme_name(), operation.tex_name(), mode);
    publish(&mut sinks.console, &header, &results)?;
    if let Some(tex) = sinks.tex.as_mut() {
        publish(tex, &header, &results)?;
    }
    Ok(())
}

fn parse_modes_env(
    name: &str,
) -> Result<Vec<BenchmarkMode>, Box<dyn std::error::Error>> {
    match env::var(name) {
        Ok(value) if value.eq_ignore_ascii_case("both") => {
            Ok(BenchmarkMode::ALL.to_vec())
        }
        Ok(value) => Ok(vec![value.parse::<BenchmarkMode>()?]),
        Err(_) => Ok(BenchmarkMode::ALL.to_vec()),
    }
}

fn parse_schemes_env() -> Result<Vec<SchemeChoice>, RunnerError> {
    let value = env::var("SPS_SCHEME").unwrap_or_else(|_| "all".to_owned());
    match value.to_ascii_lowercase().as_str() {
        "all" => Ok(vec![SchemeChoice::Groth15G1, SchemeChoice::Groth15G2]),
        "groth15-g1" => Ok(vec![SchemeChoice::Groth15G1]),
        "groth15-g2" => Ok(vec![SchemeChoice::Groth15G2]),
        other => Err(RunnerError::UnsupportedScheme(other.to_owned())),
    }
}
