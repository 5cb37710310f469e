pub mod canonical;
pub mod configs;
pub mod error;
pub mod federated;
pub mod trainer;

use machine_learning::{arch::Model, dataset::Dataset};
use remote::{Hub, RemoteHandle};

pub use canonical::CanonicalModel;
pub use error::{FedError, Result};
pub use federated::{FederatedAveraging, HolderReport, Phase, RoundReport};
pub use trainer::{LocalTrainer, TrainReport};

use crate::configs::FedAvgConfig;

/// Runs every configured round of federated averaging over the given holder datasets.
///
/// # Returns
/// The final canonical model together with the report of every round, or the first round
/// failure.
pub fn train<M: Model>(
    hub: &Hub,
    config: &FedAvgConfig,
    model: M,
    datasets: Vec<RemoteHandle<Dataset>>,
) -> Result<(M, Vec<RoundReport>)> {
    log::info!("validating config");
    let mut fedavg = FederatedAveraging::new(hub, config, model, datasets)?;
    log::info!(
        "training over {} holder(s) for {} round(s)",
        config.holders.len(),
        config.rounds
    );

    let reports = fedavg.run()?;
    Ok((fedavg.into_model(), reports))
}
