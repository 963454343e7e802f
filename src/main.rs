#![allow(non_snake_case)]
use std::rc::Rc;

use ekf_sir::{
    distribution::{Noise, Normal},
    filter::BayesFilter,
    model::FilterModel,
    plotting, simulator,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let n = 100;
    let threshold = 1.0;

    // Linear model, x := x + v, y = x + w
    // let mut model = FilterModel::linear(
    //     Rc::new(Normal::new(10.0, 1.0)?),
    //     Rc::new(Noise::new(1.0)?),
    //     Rc::new(Noise::new(1.0)?),
    //     1.0,
    //     1.0,
    // );
    // Uncomment to reuse the same truth trajectory across runs
    // model.set_same_truth(true);

    // Nonlinear model, x := sin(x) + v, y = cos(x) + w
    // let mut model = FilterModel::new(
    //     Rc::new(Normal::new(10.0, 1.0)?),
    //     Rc::new(Noise::new(0.1)?),
    //     Rc::new(Noise::new(0.1)?),
    //     f64::sin,
    //     f64::cos,
    //     f64::cos,
    //     |x| -x.sin(),
    // );

    // Nonlinear model, x := x/(1+x^2) + v, y = x + w
    let mut model = FilterModel::new(
        Rc::new(Normal::new(10.0, 1.0)?),
        Rc::new(Noise::new(0.5)?),
        Rc::new(Noise::new(0.5)?),
        |x| x / (1.0 + x * x),
        |x| (1.0 - x * x) / (x * x + 1.0).powi(2),
        |x| x,
        |_| 1.0,
    );

    let (ekf, pf) = simulator::simulate(&mut model, n, 100, threshold)?;

    let filters: [&dyn BayesFilter; 2] = [&ekf, &pf];
    plotting::plot_states(&model, &filters, Some(&pf));
    plotting::plot_errors(&model, &filters);

    Ok(())
}
