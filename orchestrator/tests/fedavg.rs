use machine_learning::{
    arch::{Linear, Model, Parameters, loss::LossKind},
    dataset::Dataset,
};
use ndarray::array;
use orchestrator::{
    FedError, FederatedAveraging, LocalTrainer, Phase,
    configs::{FedAvgConfig, InitConfig},
};
use remote::{Hub, RemoteErr, RemoteHandle};

fn and_gate() -> Dataset {
    Dataset::new(
        array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]],
        array![[0.0], [0.0], [1.0], [1.0]],
    )
    .unwrap()
}

fn config(holders: &[&str], rounds: usize) -> FedAvgConfig {
    FedAvgConfig {
        holders: holders.iter().map(|h| h.to_string()).collect(),
        rounds,
        ..Default::default()
    }
}

/// Registers every party and sends each holder its shard of `data`.
fn deploy(hub: &Hub, config: &FedAvgConfig, data: &Dataset) -> Vec<RemoteHandle<Dataset>> {
    hub.add_party(config.aggregator.as_str()).unwrap();
    let shards = data.partition(config.holders.len()).unwrap();

    config
        .holders
        .iter()
        .zip(shards)
        .map(|(name, shard)| {
            let party = hub.add_party(name.as_str()).unwrap();
            hub.send(shard, &party).unwrap()
        })
        .collect()
}

fn assert_close(a: &[f32], b: &[f32]) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert!((x - y).abs() < 1e-6, "{a:?} != {b:?}");
    }
}

#[test]
fn test_round_averages_local_updates() {
    let hub = Hub::new();
    let config = config(&["bob", "alice"], 1);
    let datasets = deploy(&hub, &config, &and_gate());
    let model = config.init.linear((2, 1)).unwrap();

    let trainer = LocalTrainer::new(config.local_steps, config.learning_rate, LossKind::Sse);
    let shards = and_gate().partition(2).unwrap();
    let updated: Vec<Linear> = shards
        .iter()
        .map(|shard| {
            let mut local = model.clone();
            trainer.fit(&mut local, shard).unwrap();
            local
        })
        .collect();
    let expected = Parameters::mean(updated.iter().map(|m| m.params())).unwrap();

    let mut fedavg = FederatedAveraging::new(&hub, &config, model, datasets).unwrap();
    let report = fedavg.run_round().unwrap();

    assert_eq!(report.round, 0);
    assert_eq!(report.version, 1);
    assert_eq!(report.holders.len(), 2);
    assert_eq!(report.holders[0].party.as_str(), "bob");
    assert_eq!(report.holders[1].losses.len(), config.local_steps);
    assert_close(
        &fedavg.canonical().model().params().flatten(),
        &expected.flatten(),
    );
}

#[test]
fn test_single_holder_gets_its_own_update() {
    let hub = Hub::new();
    let config = config(&["bob"], 1);
    let datasets = deploy(&hub, &config, &and_gate());
    let model = Linear::from_values((2, 1), vec![0.1, -0.1], vec![0.2]).unwrap();

    let mut local = model.clone();
    LocalTrainer::new(config.local_steps, config.learning_rate, LossKind::Sse)
        .fit(&mut local, &and_gate())
        .unwrap();

    let mut fedavg = FederatedAveraging::new(&hub, &config, model, datasets).unwrap();
    fedavg.run_round().unwrap();

    assert_close(
        &fedavg.canonical().model().params().flatten(),
        &local.params().flatten(),
    );
}

#[test]
fn test_loss_decreases_every_round() {
    let hub = Hub::new();
    let mut config = config(&["bob", "alice"], 10);
    config.init = InitConfig::Const { value: 0.0 };
    let datasets = deploy(&hub, &config, &and_gate());
    let model = config.init.linear((2, 1)).unwrap();

    let mut fedavg = FederatedAveraging::new(&hub, &config, model, datasets).unwrap();
    let mut prev = fedavg.evaluate(&and_gate()).unwrap();
    assert_eq!(prev, 2.0);

    while !fedavg.is_finished() {
        fedavg.run_round().unwrap();
        let loss = fedavg.evaluate(&and_gate()).unwrap();
        assert!(loss < prev, "{loss} >= {prev}");
        prev = loss;
    }

    assert!(prev < 0.1);
    assert_eq!(fedavg.rounds_completed(), 10);
    assert_eq!(fedavg.canonical().version(), 10);
}

#[test]
fn test_runs_are_deterministic() {
    let run = |parallel: bool| {
        let hub = Hub::new();
        let mut config = config(&["a", "b", "c", "d"], 3);
        config.parallel = parallel;
        let datasets = deploy(&hub, &config, &and_gate());
        let model = config.init.linear((2, 1)).unwrap();

        orchestrator::train(&hub, &config, model, datasets).unwrap()
    };

    let (seq_model, seq_reports) = run(false);
    let (again_model, again_reports) = run(false);
    let (par_model, par_reports) = run(true);

    assert_eq!(seq_reports, again_reports);
    assert_eq!(seq_reports, par_reports);
    assert_eq!(seq_model.params().flatten(), again_model.params().flatten());
    assert_eq!(seq_model.params().flatten(), par_model.params().flatten());
}

#[test]
fn test_rounds_leave_no_copies_behind() {
    let hub = Hub::new();
    let config = config(&["bob", "alice"], 3);
    let datasets = deploy(&hub, &config, &and_gate());
    let model = config.init.linear((2, 1)).unwrap();

    let mut fedavg = FederatedAveraging::new(&hub, &config, model, datasets.clone()).unwrap();
    fedavg.run().unwrap();

    for dataset in &datasets {
        assert!(hub.contains(dataset));
        assert_eq!(hub.objects_at(dataset.location()).unwrap(), 1);
    }
    assert_eq!(hub.objects_at(&"secure_worker".into()).unwrap(), 0);
}

#[test]
fn test_failed_round_keeps_canonical_model() {
    let hub = Hub::new();
    let config = config(&["bob", "alice"], 2);
    hub.add_party("secure_worker").unwrap();

    let bob = hub.add_party("bob").unwrap();
    let alice = hub.add_party("alice").unwrap();
    let good = Dataset::new(array![[1.0, 0.0]], array![[1.0]]).unwrap();
    let wide = Dataset::new(array![[1.0, 0.0, 1.0]], array![[1.0]]).unwrap();
    let datasets = vec![hub.send(good, &bob).unwrap(), hub.send(wide, &alice).unwrap()];

    let model = Linear::from_values((2, 1), vec![0.5, 0.5], vec![0.5]).unwrap();
    let mut fedavg = FederatedAveraging::new(&hub, &config, model, datasets).unwrap();

    let err = fedavg.run_round().unwrap_err();
    assert!(matches!(err, FedError::Round { round: 0, .. }));
    assert!(matches!(
        err.root(),
        FedError::Ml(machine_learning::MlErr::ShapeMismatch { .. })
    ));

    assert_eq!(fedavg.phase(), Phase::Idle);
    assert_eq!(fedavg.rounds_completed(), 0);
    assert_eq!(fedavg.canonical().version(), 0);
    assert_eq!(fedavg.canonical().model().params().flatten(), vec![0.5; 3]);
    assert_eq!(hub.objects_at(&bob).unwrap(), 1);
    assert_eq!(hub.objects_at(&alice).unwrap(), 1);
}

#[test]
fn test_holder_must_be_registered() {
    let hub = Hub::new();
    let config = config(&["bob"], 1);
    hub.add_party("secure_worker").unwrap();
    let bob = hub.add_party("bob").unwrap();
    let dataset = hub.send(and_gate(), &bob).unwrap();

    let orphan = Hub::new();
    orphan.add_party("secure_worker").unwrap();
    let model = Linear::from_values((2, 1), vec![0.0; 2], vec![0.0]).unwrap();
    let res = FederatedAveraging::new(&orphan, &config, model, vec![dataset]);

    assert!(matches!(
        res,
        Err(FedError::Remote(RemoteErr::UnknownParty(ref party))) if party.as_str() == "bob"
    ));
}

#[test]
fn test_aggregator_only_receives_parameter_values() {
    let hub = Hub::new();
    let bob = hub.add_party("bob").unwrap();
    let aggregator = hub.add_party("secure_worker").unwrap();

    let private = Dataset::new(array![[7.25, 3.5]], array![[1.0]]).unwrap();
    let data = hub.send(private, &bob).unwrap();
    let model = Linear::from_values((2, 1), vec![0.1, 0.1], vec![0.0]).unwrap();
    let copy = hub.send(model, &bob).unwrap();

    LocalTrainer::new(5, 0.01, LossKind::Sse)
        .train(&hub, &copy, &data)
        .unwrap();

    let copy = hub.move_to(copy, &aggregator).unwrap();
    let received = hub.get(&copy).unwrap();

    assert!(received.cached_input().is_empty());
    for tensor in received.params().iter() {
        assert!(tensor.grad().iter().all(|g| *g == 0.0), "{}", tensor.name());
    }
    assert_ne!(received.params().flatten(), vec![0.1, 0.1, 0.0]);
}
