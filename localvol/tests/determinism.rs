//! Seeded reproducibility and the 1/√n decay of the Monte Carlo error.

use std::sync::Arc;

use localvol::prelude::*;

fn skew_market() -> Arc<MarketData> {
    let maturities = [0.25, 0.5, 1.0, 2.0];
    let strikes: Vec<f64> = (0..11).map(|i| 50.0 + 10.0 * i as f64).collect();
    let vols: Vec<Vec<f64>> = maturities
        .iter()
        .map(|&t| {
            strikes
                .iter()
                .map(|&k| 0.22 - 0.1 * (k / 100.0_f64).ln() + 0.01 * t)
                .collect()
        })
        .collect();
    let grid = ImpliedVolatilityGrid::new(&maturities, &strikes, &vols).unwrap();
    let r = InterpolatedCurve::new(&[0.25, 1.0, 2.0], &[0.02, 0.025, 0.03]).unwrap();
    Arc::new(MarketData::new(100.0, Arc::new(r), Arc::new(FlatCurve::new(0.01)), grid).unwrap())
}

#[test]
fn identical_seed_gives_bit_identical_prices() {
    let md = skew_market();
    let cal = DupireCalibrator::new(Arc::clone(&md)).calibrate().unwrap();
    let sim = PathSimulator::new(&md, &cal.local_vol).with_batch_size(1000).unwrap();

    let a = sim.simulate(5_000, 25, 1.0, 123).unwrap();
    let b = sim.simulate(5_000, 25, 1.0, 123).unwrap();
    let c = sim.simulate_parallel(5_000, 25, 1.0, 123).unwrap();
    assert!(a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits()));
    assert!(a.iter().zip(c.iter()).all(|(x, y)| x.to_bits() == y.to_bits()));

    let pricer = DupirePricer::new(&md, &cal.local_vol);
    let p1 = pricer.price_european_call(100.0, 1.0, 5_000, 25, 123).unwrap();
    let p2 = pricer.price_european_call(100.0, 1.0, 5_000, 25, 123).unwrap();
    let p3 = pricer
        .with_parallelism(true)
        .price_european_call(100.0, 1.0, 5_000, 25, 123)
        .unwrap();
    assert_eq!(p1.to_bits(), p2.to_bits());
    assert_eq!(p1.to_bits(), p3.to_bits());
}

#[test]
fn different_seeds_give_different_paths() {
    let md = skew_market();
    let cal = DupireCalibrator::new(Arc::clone(&md)).calibrate().unwrap();
    let sim = PathSimulator::new(&md, &cal.local_vol);
    let a = sim.simulate(100, 5, 1.0, 1).unwrap();
    let b = sim.simulate(100, 5, 1.0, 2).unwrap();
    assert_ne!(a, b);
}

#[test]
fn doubling_paths_divides_std_error_by_root_two() {
    let md = skew_market();
    let cal = DupireCalibrator::new(Arc::clone(&md)).calibrate().unwrap();
    let pricer = DupirePricer::new(&md, &cal.local_vol).with_parallelism(true);

    let mut ratios = Vec::new();
    for seed in [1, 2, 3] {
        let n = pricer
            .price_european(OptionType::Call, 100.0, 1.0, &McSettings::new(8_000, 10, seed))
            .unwrap();
        let n2 = pricer
            .price_european(OptionType::Call, 100.0, 1.0, &McSettings::new(16_000, 10, seed + 100))
            .unwrap();
        ratios.push(n.std_error / n2.std_error);
    }
    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    assert!((mean - 2.0_f64.sqrt()).abs() < 0.1, "ratios {ratios:?}");
}

#[test]
fn trajectories_start_at_spot_and_end_at_terminals() {
    let md = skew_market();
    let cal = DupireCalibrator::new(Arc::clone(&md)).calibrate().unwrap();
    let sim = PathSimulator::new(&md, &cal.local_vol);
    let ens = sim.simulate_paths(64, 12, 0.6, 9).unwrap();
    assert_eq!(ens.n_steps(), 12);
    assert!(ens.paths.iter().all(|p| p[0] == md.spot()));
    assert!(ens.paths.iter().flatten().all(|&s| s > 0.0));
    assert_eq!(ens.terminal_prices(), sim.simulate(64, 12, 0.6, 9).unwrap());
}
