use rand::{rngs::StdRng, SeedableRng};

use ferrite_mlp::{ActivationFunction, Architecture, Dataset, FitStatus, Network, TrainConfig};

fn xor() -> Dataset {
    Dataset::from_rows(&[
        vec![0.0, 0.0, 0.0],
        vec![0.0, 1.0, 1.0],
        vec![1.0, 0.0, 1.0],
        vec![1.0, 1.0, 0.0],
    ])
    .unwrap()
}

fn initial_cost(net: &mut Network, data: &Dataset) -> f64 {
    let (x, y) = data.view().samples(net.input_size()).unwrap();
    net.cost(x, y)
}

#[test]
fn xor_converges_and_classifies_every_row() {
    use ActivationFunction::Sigmoid;
    let arch = Architecture::new(vec![2, 2, 1], vec![Sigmoid, Sigmoid]).unwrap();

    // A 2-2-1 sigmoid net can land in a flat region from a bad draw, so a
    // handful of seeded initializations are tried.
    let mut solved = false;
    for seed in 0..10 {
        let mut net = Network::with_rng(&arch, &mut StdRng::seed_from_u64(seed)).unwrap();
        let mut data = xor();
        let before = initial_cost(&mut net, &data);
        let config = TrainConfig::new(1.0, 1e-2, 50_000, 4).with_seed(seed);
        let report = net.fit(&mut data, &config).unwrap();
        if report.status != FitStatus::Converged {
            continue;
        }
        assert!(report.cost <= 1e-2 && report.cost < before);
        for (x, y) in [([0.0, 0.0], 0.0), ([0.0, 1.0], 1.0), ([1.0, 0.0], 1.0), ([1.0, 1.0], 0.0)] {
            let p = net.predict(&x)[0];
            assert_eq!(if p > 0.5 { 1.0 } else { 0.0 }, y, "seed {seed}: {x:?} -> {p}");
        }
        solved = true;
        break;
    }
    assert!(solved, "no initialization converged on XOR");
}

#[test]
fn seeded_runs_are_reproducible() {
    use ActivationFunction::{Sigmoid, Tanh};
    let arch = Architecture::new(vec![2, 3, 1], vec![Tanh, Sigmoid]).unwrap();
    let config = TrainConfig::new(0.5, 1e-9, 200, 2).with_seed(42);

    let run = || {
        let mut net = Network::with_rng(&arch, &mut StdRng::seed_from_u64(1)).unwrap();
        let report = net.fit(&mut xor(), &config).unwrap();
        (report, net.predict(&[1.0, 0.0]))
    };
    assert_eq!(run(), run());
}

#[test]
fn partial_last_batch_is_trained() {
    use ActivationFunction::Identity;
    let arch = Architecture::new(vec![1, 1], vec![Identity]).unwrap();
    let mut net = Network::with_rng(&arch, &mut StdRng::seed_from_u64(3)).unwrap();
    // Five rows in batches of two: the last batch holds one row.
    let mut data = Dataset::from_rows(&[
        vec![0.0, 1.0],
        vec![1.0, 3.0],
        vec![2.0, 5.0],
        vec![-1.0, -1.0],
        vec![0.5, 2.0],
    ])
    .unwrap();
    let report = net.fit(&mut data, &TrainConfig::new(0.05, 1e-8, 20_000, 2).with_seed(8)).unwrap();
    assert_eq!(report.status, FitStatus::Converged);
    let p = net.predict(&[3.0])[0];
    assert!((p - 7.0).abs() < 1e-2, "{p}");
}
