use ferrite_mlp::{ActivationFunction, Architecture, Dataset, Network, TrainConfig};

fn main() -> ferrite_mlp::Result<()> {
    let arch = Architecture::new(
        vec![2, 2, 1],
        vec![ActivationFunction::Sigmoid, ActivationFunction::Sigmoid],
    )?;
    let mut network = Network::new(&arch)?;

    let mut data = Dataset::from_rows(&[
        vec![0.0, 0.0, 0.0],
        vec![0.0, 1.0, 1.0],
        vec![1.0, 0.0, 1.0],
        vec![1.0, 1.0, 0.0],
    ])?;

    let (tx, rx) = std::sync::mpsc::channel();
    let mut config = TrainConfig::new(1.0, 1e-3, 50_000, 4);
    config.progress_tx = Some(tx);

    let printer = std::thread::spawn(move || {
        for stats in rx {
            if stats.epoch % 1000 == 0 {
                println!("Epoch {}: cost = {:.6}", stats.epoch, stats.cost);
            }
        }
    });

    let report = network.fit(&mut data, &config)?;
    drop(config);
    let _ = printer.join();
    println!("{:?} after {} epochs", report.status, report.epochs);

    for input in [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]] {
        println!("Input: {:?} -> Output: {:.4}", input, network.predict(&input)[0]);
    }
    Ok(())
}
