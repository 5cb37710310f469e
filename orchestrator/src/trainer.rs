use log::debug;
use machine_learning::{
    MlErr,
    arch::{
        Model,
        loss::{LossFn, LossKind},
    },
    dataset::Dataset,
    optimization::GradientDescent,
};
use remote::{Hub, RemoteHandle};

use crate::Result;

/// The outcome of a local training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    /// The loss measured at each step, before that step's update.
    pub losses: Vec<f32>,
    /// The loss of the model after the last update.
    pub final_loss: f32,
}

/// Runs a fixed amount of gradient descent steps of a model against a dataset living at the
/// same party.
#[derive(Debug, Clone)]
pub struct LocalTrainer<L: LossFn = LossKind> {
    steps: usize,
    learning_rate: f32,
    loss_fn: L,
}

impl<L: LossFn> LocalTrainer<L> {
    /// Creates a new `LocalTrainer`.
    ///
    /// # Arguments
    /// * `steps` - The amount of gradient descent steps per call.
    /// * `learning_rate` - The fixed learning rate, there is no momentum nor weight decay.
    /// * `loss_fn` - The loss function measured against the targets.
    pub fn new(steps: usize, learning_rate: f32, loss_fn: L) -> Self {
        Self {
            steps,
            learning_rate,
            loss_fn,
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Trains the remote model in place at its party.
    ///
    /// Only the scalar losses make it back to the caller, the trained model stays at the party.
    ///
    /// # Returns
    /// The training report, `NotColocated` if model and dataset live at different parties
    /// (neither is touched) or `ShapeMismatch` if the dataset doesn't fit the model.
    pub fn train<M: Model>(
        &self,
        hub: &Hub,
        model: &RemoteHandle<M>,
        dataset: &RemoteHandle<Dataset>,
    ) -> Result<TrainReport> {
        let report = hub.execute_with(model, dataset, |m: &mut M, d: &Dataset| self.fit(m, d))??;

        debug!(
            party = model.location().as_str(),
            steps = self.steps,
            loss = report.final_loss;
            "local training finished"
        );

        Ok(report)
    }

    /// The local computation behind `train`: `steps` iterations of zero grad, forward, loss,
    /// backward and a gradient descent step.
    ///
    /// The model is left with zeroed gradients and no cached input.
    pub fn fit<M: Model>(
        &self,
        model: &mut M,
        dataset: &Dataset,
    ) -> machine_learning::Result<TrainReport> {
        check_dims(model, dataset)?;

        let mut optimizer = GradientDescent::new(self.learning_rate);
        let mut losses = Vec::with_capacity(self.steps);
        let (x, y) = (dataset.x(), dataset.y());

        for _ in 0..self.steps {
            model.zero_grad();

            let y_pred = model.forward(x)?;
            losses.push(self.loss_fn.loss(y_pred.view(), y));

            let d = self.loss_fn.loss_prime(y_pred.view(), y);
            model.backward(d.view())?;
            model.step(&mut optimizer);
        }

        let y_pred = model.predict(x)?;
        let final_loss = self.loss_fn.loss(y_pred.view(), y);

        // Only the parameter values may leave the party.
        model.zero_grad();
        model.clear_cache();

        Ok(TrainReport { losses, final_loss })
    }
}

pub(crate) fn check_dims<M: Model>(model: &M, dataset: &Dataset) -> machine_learning::Result<()> {
    if dataset.x_size() != model.input_dim() {
        return Err(MlErr::ShapeMismatch {
            what: "dataset features",
            got: vec![dataset.x_size()],
            expected: vec![model.input_dim()],
        });
    }

    if dataset.y_size() != model.output_dim() {
        return Err(MlErr::ShapeMismatch {
            what: "dataset targets",
            got: vec![dataset.y_size()],
            expected: vec![model.output_dim()],
        });
    }

    Ok(())
}
