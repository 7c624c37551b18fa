use std::process::ExitCode;

use ferrite_mlp::{
    ActivationFunction, Architecture, Dataset, Network, Prediction, Result, RunConfig, TrainConfig,
};

/// Writes `level target: message` lines to stderr. The threshold comes from
/// `FERRITE_LOG` (`error`, `warn`, `info`, `debug`, `trace`; default `info`).
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("{:<5} {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging() {
    let level = std::env::var("FERRITE_LOG")
        .ok()
        .and_then(|v| v.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

/// 2-bit + 2-bit adder: four input bits, three sum bits.
const ADDER: [[f64; 7]; 16] = [
    [0., 0., 0., 0., 0., 0., 0.],
    [0., 0., 0., 1., 0., 0., 1.],
    [0., 0., 1., 0., 0., 1., 0.],
    [0., 0., 1., 1., 0., 1., 1.],
    [0., 1., 0., 0., 0., 0., 1.],
    [0., 1., 0., 1., 0., 1., 0.],
    [0., 1., 1., 0., 0., 1., 1.],
    [0., 1., 1., 1., 1., 0., 0.],
    [1., 0., 0., 0., 0., 1., 0.],
    [1., 0., 0., 1., 0., 1., 1.],
    [1., 0., 1., 0., 1., 0., 0.],
    [1., 0., 1., 1., 1., 0., 1.],
    [1., 1., 0., 0., 0., 1., 1.],
    [1., 1., 0., 1., 1., 0., 0.],
    [1., 1., 1., 0., 1., 0., 1.],
    [1., 1., 1., 1., 1., 1., 0.],
];

fn adder_run() -> Result<RunConfig> {
    use ActivationFunction::*;
    Ok(RunConfig {
        architecture: Architecture::new(vec![4, 5, 5, 3], vec![Tanh, Tanh, Sigmoid])?,
        training: TrainConfig::new(1.0, 1e-3, 100_000, 4),
        dataset: None,
        model_path: None,
    })
}

fn fmt_row(values: &[f64]) -> String {
    values.iter().map(|v| format!("{v:.3}")).collect::<Vec<_>>().join(" ")
}

fn print_results(results: &[Prediction]) {
    for p in results {
        println!("x [{}]  y [{}]  p [{}]", fmt_row(&p.input), fmt_row(&p.target), fmt_row(&p.output));
    }
}

fn run() -> Result<()> {
    let run = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("reading run configuration from {path}");
            RunConfig::load_json(&path)?
        }
        None => adder_run()?,
    };

    let mut data = match &run.dataset {
        Some(source) => Dataset::from_csv(&source.path, source.separator)?,
        None => {
            let rows: Vec<Vec<f64>> = ADDER.iter().map(|r| r.to_vec()).collect();
            Dataset::from_rows(&rows)?
        }
    };

    let mut network = Network::new(&run.architecture)?;
    let report = network.fit(&mut data, &run.training)?;
    println!("{:?} after {} epochs, cost {:.6}", report.status, report.epochs, report.cost);

    let (x, y) = data.view().samples(network.input_size())?;
    println!("accuracy {:.3}", network.accuracy(x, y));
    print_results(&network.results(&data)?);

    if let Some(path) = &run.model_path {
        network.save(path)?;
        log::info!("model written to {path}");
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
