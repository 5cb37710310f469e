use machine_learning::{
    arch::{
        Linear, Model,
        loss::{LossFn, Sse},
    },
    dataset::Dataset,
    initialization::RandParamGen,
    optimization::GradientDescent,
};

fn and2() -> Dataset {
    let data = vec![
        0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
        1.0, 0.0, 1.0, //
        1.0, 1.0, 1.0, //
    ];

    Dataset::from_flat(data, 2, 1).unwrap()
}

fn sse(model: &Linear, dataset: &Dataset) -> f32 {
    let y_pred = model.predict(dataset.x()).unwrap();
    Sse.loss(y_pred.view(), dataset.y())
}

#[test]
fn test_gradient_descent_decreases_loss_every_step() {
    let dataset = and2();
    let mut param_gen = RandParamGen::seeded_uniform(3, 3, -0.5, 0.5).unwrap();
    let mut model = Linear::new((2, 1), &mut param_gen).unwrap();
    let mut optimizer = GradientDescent::new(0.1);

    let mut prev = sse(&model, &dataset);
    for _ in 0..20 {
        model.zero_grad();
        let y_pred = model.forward(dataset.x()).unwrap();
        let d = Sse.loss_prime(y_pred.view(), dataset.y());
        model.backward(d.view()).unwrap();
        model.step(&mut optimizer);

        let loss = sse(&model, &dataset);
        assert!(loss < prev, "loss went from {prev} to {loss}");
        prev = loss;
    }
}

#[test]
fn test_linear_fit_separates_and2_targets() {
    let dataset = and2();
    let mut model = Linear::from_values((2, 1), vec![0.0, 0.0], vec![0.0]).unwrap();
    let mut optimizer = GradientDescent::new(0.05);

    for _ in 0..500 {
        model.zero_grad();
        let y_pred = model.forward(dataset.x()).unwrap();
        let d = Sse.loss_prime(y_pred.view(), dataset.y());
        model.backward(d.view()).unwrap();
        model.step(&mut optimizer);
    }

    // The targets only depend on the first feature, so the least squares fit is exact.
    let weight = model.params().by_name("weight").unwrap().data();
    assert!((weight[0] - 1.0).abs() < 1e-3, "weight: {weight:?}");
    assert!(weight[1].abs() < 1e-3, "weight: {weight:?}");
    assert!(sse(&model, &dataset) < 1e-5);
}
