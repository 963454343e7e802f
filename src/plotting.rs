use crate::filter::particle::ParticleFilter;
use crate::filter::BayesFilter;
use crate::model::FilterModel;
use gnuplot::*;
use itertools::izip;

/// Truth and per-filter estimate trajectories, with the particle
/// populations drawn as a point cloud when a particle filter is given.
pub fn plot_states(model: &FilterModel, filters: &[&dyn BayesFilter], pf: Option<&ParticleFilter>) {
    let mut fg = Figure::new();
    let ax = fg.axes2d();
    ax.set_title("Value of generating model and filters", &[])
        .set_x_label("Time step", &[])
        .set_y_label("State value", &[])
        .set_x_grid(true)
        .set_y_grid(true);

    if let Some(pf) = pf {
        for (i, snapshot) in pf.particle_history().iter().enumerate() {
            ax.points(
                std::iter::repeat(i as f64).take(snapshot.len()),
                snapshot.iter().map(|p| p.value),
                &[PointSymbol('.'), Color("blue")],
            );
        }
    }

    ax.lines(
        (0..model.len()).map(|i| i as f64),
        model.truth().iter().copied(),
        &[Caption(model.name())],
    );
    for filter in filters {
        let name = filter.name();
        ax.lines(
            (0..filter.steps()).map(|i| i as f64),
            filter.estimates().iter().copied(),
            &[Caption(&name)],
        );
    }

    fg.show().unwrap();
}

/// Actual squared error against the truth next to each filter's own MSE
/// history.
pub fn plot_errors(model: &FilterModel, filters: &[&dyn BayesFilter]) {
    let mut fg = Figure::new();
    let ax = fg.axes2d();
    ax.set_title("Real and expected error of filters", &[])
        .set_x_label("Time step", &[])
        .set_y_label("Squared error", &[])
        .set_x_grid(true)
        .set_y_grid(true);

    for filter in filters {
        let name = filter.name();
        let actual: Vec<f64> = izip!(filter.estimates(), model.truth())
            .map(|(estimate, truth)| (estimate - truth).powi(2))
            .collect();
        ax.lines(
            (0..actual.len()).map(|i| i as f64),
            actual,
            &[Caption(&format!("Actual error of {}", name))],
        );
        ax.lines(
            (0..filter.mses().len()).map(|i| i as f64),
            filter.mses().iter().copied(),
            &[Caption(&format!("MSE of {}", name))],
        );
    }

    fg.show().unwrap();
}
