use std::{env, io};

use log::info;
use machine_learning::{arch::Model, dataset::Dataset};
use ndarray::array;
use orchestrator::{
    FederatedAveraging,
    configs::{self, FedAvgConfig},
};
use remote::Hub;

fn and_gate() -> machine_learning::Result<Dataset> {
    Dataset::new(
        array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]],
        array![[0.0], [0.0], [1.0], [1.0]],
    )
}

fn main() -> io::Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => configs::load(&path).map_err(io::Error::other)?,
        None => FedAvgConfig::default(),
    };

    let hub = Hub::new();
    let aggregator = hub
        .add_party(config.aggregator.as_str())
        .map_err(io::Error::other)?;
    let holders = hub
        .add_parties(config.holders.iter().map(String::as_str))
        .map_err(io::Error::other)?;
    info!("registered {} holder(s) and {aggregator}", holders.len());

    let data = and_gate().map_err(io::Error::other)?;
    let shards = data.partition(holders.len()).map_err(io::Error::other)?;

    let datasets = holders
        .iter()
        .zip(shards)
        .map(|(party, shard)| hub.send(shard, party))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io::Error::other)?;

    let model = config.init.linear((2, 1)).map_err(io::Error::other)?;
    let mut fedavg =
        FederatedAveraging::new(&hub, &config, model, datasets).map_err(io::Error::other)?;

    while !fedavg.is_finished() {
        let report = fedavg.run_round().map_err(io::Error::other)?;

        for holder in &report.holders {
            println!(
                "round {} {}: {:?} -> {:.6}",
                report.round,
                holder.party,
                holder.losses,
                holder.final_loss
            );
        }
    }

    let loss = fedavg.evaluate(&data).map_err(io::Error::other)?;
    let predictions = fedavg.predict(data.x()).map_err(io::Error::other)?;
    let model = fedavg.into_model();

    for tensor in model.params().iter() {
        println!("{}{:?}: {:?}", tensor.name(), tensor.shape(), tensor.data());
    }
    println!("predictions: {:?}", predictions.column(0).to_vec());
    println!("loss: {loss:.6}");

    Ok(())
}
