use log::{debug, info, warn};
use machine_learning::{
    arch::{
        Model, Parameters,
        loss::{LossFn, LossKind},
    },
    dataset::Dataset,
};
use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use remote::{Hub, PartyId, RemoteErr, RemoteHandle};

use crate::{
    CanonicalModel, FedError, LocalTrainer, Result, TrainReport, configs::FedAvgConfig,
    trainer::check_dims,
};

/// Where the orchestrator stands within the round loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    RoundStart,
    LocalTraining,
    Aggregating,
    RoundComplete,
}

/// What the orchestrator learns about a single holder in a round: scalar losses only.
#[derive(Debug, Clone, PartialEq)]
pub struct HolderReport {
    pub party: PartyId,
    pub losses: Vec<f32>,
    pub final_loss: f32,
}

/// The outcome of a completed round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    /// Zero based index of the round.
    pub round: usize,
    /// The canonical model version after absorbing this round's average.
    pub version: u64,
    pub holders: Vec<HolderReport>,
}

#[derive(Debug)]
struct Holder {
    party: PartyId,
    dataset: RemoteHandle<Dataset>,
}

/// Per round objects that must not outlive the round, whatever its outcome.
struct Scratch<M> {
    copies: Vec<RemoteHandle<M>>,
    averaged: Option<RemoteHandle<Parameters>>,
}

impl<M> Default for Scratch<M> {
    fn default() -> Self {
        Self {
            copies: Vec::new(),
            averaged: None,
        }
    }
}

/// Federated averaging with a trusted aggregator.
///
/// Every round the canonical model is copied to each data holder, trained there against the
/// holder's own dataset, moved to the aggregator and averaged there. Only the averaged
/// parameters and the holders' scalar losses ever reach the orchestrator.
pub struct FederatedAveraging<'h, M: Model> {
    hub: &'h Hub,
    holders: Vec<Holder>,
    aggregator: PartyId,
    trainer: LocalTrainer,
    loss_fn: LossKind,
    canonical: CanonicalModel<M>,
    rounds: usize,
    round: usize,
    parallel: bool,
    phase: Phase,
}

impl<'h, M: Model> FederatedAveraging<'h, M> {
    /// Creates a new `FederatedAveraging` orchestrator.
    ///
    /// # Arguments
    /// * `hub` - The hub every party is registered at.
    /// * `config` - The training configuration.
    /// * `model` - The initial canonical model.
    /// * `datasets` - One dataset per holder, in the same order as `config.holders`, each one
    ///   living at its holder.
    ///
    /// # Returns
    /// A new orchestrator in the `Idle` phase or an error if the configuration doesn't match
    /// the hub.
    pub fn new(
        hub: &'h Hub,
        config: &FedAvgConfig,
        model: M,
        datasets: Vec<RemoteHandle<Dataset>>,
    ) -> Result<Self> {
        config.validate()?;

        if datasets.len() != config.holders.len() {
            return Err(FedError::InvalidConfig(format!(
                "got {} dataset(s) for {} holder(s)",
                datasets.len(),
                config.holders.len()
            )));
        }

        let aggregator = PartyId::from(config.aggregator.as_str());
        if !hub.is_registered(&aggregator) {
            return Err(RemoteErr::UnknownParty(aggregator).into());
        }

        let mut holders = Vec::with_capacity(datasets.len());
        for (name, dataset) in config.holders.iter().zip(datasets) {
            if dataset.location().as_str() != name {
                return Err(FedError::InvalidConfig(format!(
                    "dataset for {name} lives at {}",
                    dataset.location()
                )));
            }

            if !hub.is_registered(dataset.location()) {
                return Err(RemoteErr::UnknownParty(dataset.location().clone()).into());
            }

            if !hub.contains(&dataset) {
                return Err(RemoteErr::Location {
                    object: dataset.id(),
                    expected: dataset.location().clone(),
                }
                .into());
            }

            holders.push(Holder {
                party: dataset.location().clone(),
                dataset,
            });
        }

        if holders.len() < 3 {
            warn!(
                holders = holders.len();
                "with fewer than 3 holders the aggregator can attribute each update to its holder"
            );
        }

        let loss_fn = LossKind::from(config.loss);

        Ok(Self {
            hub,
            holders,
            aggregator,
            trainer: LocalTrainer::new(config.local_steps, config.learning_rate, loss_fn),
            loss_fn,
            canonical: CanonicalModel::new(model),
            rounds: config.rounds,
            round: 0,
            parallel: config.parallel,
            phase: Phase::Idle,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn canonical(&self) -> &CanonicalModel<M> {
        &self.canonical
    }

    pub fn rounds_completed(&self) -> usize {
        self.round
    }

    pub fn is_finished(&self) -> bool {
        self.round >= self.rounds
    }

    /// Runs every remaining round, stopping at the first failure.
    pub fn run(&mut self) -> Result<Vec<RoundReport>> {
        let mut reports = Vec::with_capacity(self.rounds - self.round);

        while !self.is_finished() {
            reports.push(self.run_round()?);
        }

        Ok(reports)
    }

    /// Runs a single round.
    ///
    /// # Returns
    /// The round report or a `Round` error, in which case every copy created during the round
    /// is discarded, the canonical model is left untouched and the phase goes back to `Idle`.
    pub fn run_round(&mut self) -> Result<RoundReport> {
        if self.is_finished() {
            return Err(FedError::Finished {
                rounds: self.rounds,
            });
        }

        let round = self.round;
        let mut scratch = Scratch::default();

        let outcome = self.round_inner(round, &mut scratch);
        self.cleanup(scratch);

        let outcome = outcome.and_then(|(holders, averaged)| {
            self.canonical.absorb(&averaged)?;
            Ok(holders)
        });

        match outcome {
            Ok(holders) => {
                self.round += 1;
                self.phase = if self.is_finished() {
                    Phase::Idle
                } else {
                    Phase::RoundComplete
                };

                info!(round = round, version = self.canonical.version(); "round complete");

                Ok(RoundReport {
                    round,
                    version: self.canonical.version(),
                    holders,
                })
            }
            Err(e) => {
                self.phase = Phase::Idle;
                warn!(round = round; "round failed: {e}");

                Err(FedError::Round {
                    round,
                    source: Box::new(e),
                })
            }
        }
    }

    fn round_inner(
        &mut self,
        round: usize,
        scratch: &mut Scratch<M>,
    ) -> Result<(Vec<HolderReport>, Parameters)> {
        self.enter(Phase::RoundStart, round);
        for holder in &self.holders {
            let copy = self.hub.send(self.canonical.snapshot(), &holder.party)?;
            scratch.copies.push(copy);
        }

        self.enter(Phase::LocalTraining, round);
        let reports = self.train_holders(&scratch.copies)?;

        self.enter(Phase::Aggregating, round);
        for copy in scratch.copies.iter_mut() {
            *copy = self.hub.move_to(copy.clone(), &self.aggregator)?;
        }

        let averaged = self.hub.try_reduce(&scratch.copies, |models: &[&M]| {
            Parameters::mean(models.iter().map(|m| m.params())).map_err(FedError::from)
        })?;
        let averaged = scratch.averaged.insert(averaged);
        let params = self.hub.get(averaged)?;

        let holders = self
            .holders
            .iter()
            .zip(reports)
            .map(|(holder, report)| HolderReport {
                party: holder.party.clone(),
                losses: report.losses,
                final_loss: report.final_loss,
            })
            .collect();

        Ok((holders, params))
    }

    fn train_holders(&self, copies: &[RemoteHandle<M>]) -> Result<Vec<TrainReport>> {
        let (hub, trainer) = (self.hub, &self.trainer);

        if self.parallel {
            copies
                .par_iter()
                .zip(self.holders.par_iter())
                .map(|(copy, holder)| trainer.train(hub, copy, &holder.dataset))
                .collect()
        } else {
            copies
                .iter()
                .zip(&self.holders)
                .map(|(copy, holder)| trainer.train(hub, copy, &holder.dataset))
                .collect()
        }
    }

    fn cleanup(&self, scratch: Scratch<M>) {
        let averaged = scratch.averaged.map(|h| self.hub.discard(h));
        let copies = scratch.copies.into_iter().map(|h| self.hub.discard(h));

        for res in copies.chain(averaged) {
            if let Err(e) = res {
                debug!("could not discard round object: {e}");
            }
        }
    }

    fn enter(&mut self, phase: Phase, round: usize) {
        debug!(round = round; "{:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Computes the configured loss of the canonical model on a local dataset.
    pub fn evaluate(&self, dataset: &Dataset) -> Result<f32> {
        let model = self.canonical.model();
        check_dims(model, dataset)?;

        let y_pred = model.predict(dataset.x())?;
        Ok(self.loss_fn.loss(y_pred.view(), dataset.y()))
    }

    /// Runs the canonical model forward on `x`.
    pub fn predict(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        Ok(self.canonical.model().predict(x)?)
    }

    /// Tears down the orchestrator, returning the canonical model.
    pub fn into_model(self) -> M {
        self.canonical.into_inner()
    }
}
