//! End-to-end training tests
//!
//! This file tests:
//! - Backpropagation through time against finite differences
//! - Gradients of the initial hidden state and of sparse-input weights
//! - A full training loop (processor + accumulator + optimizer) lowering the loss

use approx::assert_relative_eq;
use neural_core::arrays::DenseArray;
use neural_core::config::TrainingConfig;
use neural_core::layers::{FeedforwardLayer, Layer, SimpleRecurrentLayer};
use neural_core::parameters::{LayerParameters, StackedErrors, StackedParameters};
use neural_core::processor::SequenceProcessor;
use neural_core::utils::initializers::GlorotInitializer;
use neural_core::utils::Activation;

const H: f64 = 1e-5;

fn column(values: &[f64]) -> DenseArray {
    DenseArray::column(values.to_vec())
}

fn network(input_size: usize, sparse_input: bool, seed: u64) -> (SequenceProcessor, StackedParameters) {
    let processor = SequenceProcessor::new(move || {
        vec![
            Box::new(SimpleRecurrentLayer::new(input_size, 4, Activation::Tanh)) as Box<dyn Layer>,
            Box::new(FeedforwardLayer::new(4, 2, Activation::Tanh)),
        ]
    });
    let mut params = StackedParameters::new(vec![
        LayerParameters::simple_recurrent(input_size, 4, sparse_input),
        LayerParameters::feedforward(4, 2, false),
    ]);
    params.initialize(&mut GlorotInitializer::new(seed, 1.0), 0.1);
    (processor, params)
}

fn targets() -> Vec<DenseArray> {
    vec![column(&[0.5, -0.3]), column(&[-0.2, 0.4]), column(&[0.1, 0.1])]
}

/// 0.5 * Σ_t ||y_t - target_t||² and its derivative with respect to every output.
fn loss_and_errors(outputs: &[DenseArray], targets: &[DenseArray]) -> (f64, Vec<DenseArray>) {
    let mut loss = 0.0;
    let mut errors = Vec::with_capacity(outputs.len());
    for (y, t) in outputs.iter().zip(targets) {
        let diff: Vec<f64> = y.values().iter().zip(t.values()).map(|(a, b)| a - b).collect();
        loss += 0.5 * diff.iter().map(|d| d * d).sum::<f64>();
        errors.push(DenseArray::column(diff));
    }
    (loss, errors)
}

enum Sequence {
    Dense(Vec<DenseArray>),
    Sparse(Vec<Vec<usize>>),
}

fn run(processor: &mut SequenceProcessor, params: &StackedParameters, sequence: &Sequence) -> Vec<DenseArray> {
    match sequence {
        Sequence::Dense(inputs) => processor.forward(params, inputs),
        Sequence::Sparse(inputs) => processor.forward_sparse(params, inputs),
    }
}

fn loss(processor: &mut SequenceProcessor, params: &StackedParameters, sequence: &Sequence) -> f64 {
    let outputs = run(processor, params, sequence);
    loss_and_errors(&outputs, &targets()).0
}

fn analytic_gradients(
    processor: &mut SequenceProcessor,
    params: &StackedParameters,
    sequence: &Sequence,
) -> StackedErrors {
    let outputs = run(processor, params, sequence);
    let (_, errors) = loss_and_errors(&outputs, &targets());
    processor.backward(params, &errors, false).clone()
}

/// Compares every gradient entry with a central difference of the loss.
fn check_against_finite_differences(
    processor: &mut SequenceProcessor,
    params: &mut StackedParameters,
    sequence: &Sequence,
) {
    let analytic = analytic_gradients(processor, params, sequence);
    let analytic: Vec<DenseArray> = analytic.iter().map(|g| g.to_dense()).collect();
    let tensors = params.iter().count();

    for i in 0..tensors {
        let len = params.iter().nth(i).unwrap().values().len();
        for k in 0..len {
            let original = params.iter().nth(i).unwrap().values().values()[k];

            params.iter_mut().nth(i).unwrap().values_mut().values_mut()[k] = original + H;
            let plus = loss(processor, params, sequence);
            params.iter_mut().nth(i).unwrap().values_mut().values_mut()[k] = original - H;
            let minus = loss(processor, params, sequence);
            params.iter_mut().nth(i).unwrap().values_mut().values_mut()[k] = original;

            let numeric = (plus - minus) / (2.0 * H);
            assert_relative_eq!(analytic[i].values()[k], numeric, epsilon = 1e-7, max_relative = 1e-5);
        }
    }
}

// ============================================================================
// Gradient Checking Tests
// ============================================================================

mod gradient_checking_tests {
    use super::*;

    #[test]
    fn test_dense_sequence_gradients() {
        let (mut processor, mut params) = network(3, false, 21);
        let sequence = Sequence::Dense(vec![
            column(&[1.0, -0.5, 0.2]),
            column(&[0.0, 0.3, -1.0]),
            column(&[0.7, 0.7, 0.1]),
        ]);
        check_against_finite_differences(&mut processor, &mut params, &sequence);
    }

    #[test]
    fn test_sparse_sequence_gradients() {
        let (mut processor, mut params) = network(6, true, 8);
        let sequence = Sequence::Sparse(vec![vec![0, 4], vec![2], vec![4, 5]]);
        check_against_finite_differences(&mut processor, &mut params, &sequence);
    }

    #[test]
    fn test_init_hidden_gradient() {
        let (mut processor, params) = network(3, false, 5);
        let init = [0.3, -0.6, 0.2, 0.9];
        let sequence = Sequence::Dense(vec![column(&[1.0, 0.0, 0.0]), column(&[0.0, 1.0, 0.0])]);

        processor.set_init_hidden(0, column(&init));
        analytic_gradients(&mut processor, &params, &sequence);
        let analytic = processor.init_hidden_errors(0).unwrap().clone();

        for k in 0..init.len() {
            let mut shifted = init;
            shifted[k] = init[k] + H;
            processor.set_init_hidden(0, column(&shifted));
            let plus = loss(&mut processor, &params, &sequence);
            shifted[k] = init[k] - H;
            processor.set_init_hidden(0, column(&shifted));
            let minus = loss(&mut processor, &params, &sequence);

            let numeric = (plus - minus) / (2.0 * H);
            assert_relative_eq!(analytic.values()[k], numeric, epsilon = 1e-7, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_input_errors_match_finite_differences() {
        let (mut processor, params) = network(3, false, 13);
        let inputs = vec![column(&[0.2, -0.1, 0.4]), column(&[0.5, 0.0, -0.3])];

        let outputs = processor.forward(&params, &inputs);
        let (_, errors) = loss_and_errors(&outputs, &targets());
        processor.backward(&params, &errors, true);
        let analytic = processor.input_errors(0).unwrap().clone();

        for k in 0..3 {
            let mut plus_inputs = inputs.clone();
            plus_inputs[0].values_mut()[k] += H;
            let plus = loss(&mut processor, &params, &Sequence::Dense(plus_inputs));
            let mut minus_inputs = inputs.clone();
            minus_inputs[0].values_mut()[k] -= H;
            let minus = loss(&mut processor, &params, &Sequence::Dense(minus_inputs));

            let numeric = (plus - minus) / (2.0 * H);
            assert_relative_eq!(analytic.values()[k], numeric, epsilon = 1e-7, max_relative = 1e-5);
        }
    }
}

// ============================================================================
// Training Loop Tests
// ============================================================================

mod training_loop_tests {
    use super::*;

    fn train(config_json: &str, epochs: usize) -> (f64, f64) {
        let config: TrainingConfig = serde_json::from_str(config_json).unwrap();
        let (mut processor, mut params) = network(6, true, 3);
        let mut optimizer = config.build_optimizer(&params).unwrap();

        let sequences = [vec![vec![0], vec![3], vec![5]], vec![vec![1, 2], vec![4], vec![0, 5]]];
        let total_loss = |processor: &mut SequenceProcessor, params: &StackedParameters| {
            sequences
                .iter()
                .map(|s| loss(processor, params, &Sequence::Sparse(s.clone())))
                .sum::<f64>()
        };

        let initial = total_loss(&mut processor, &params);
        for _ in 0..epochs {
            optimizer.new_epoch();
            for sequence in &sequences {
                optimizer.new_example();
                let outputs = processor.forward_sparse(&params, sequence);
                let (_, errors) = loss_and_errors(&outputs, &targets());
                let gradients = processor.backward(&params, &errors, false);
                optimizer.accumulate(gradients);
                optimizer.update(&mut params).unwrap();
            }
        }
        (initial, total_loss(&mut processor, &params))
    }

    #[test]
    fn test_adam_lowers_the_loss() {
        let (initial, trained) = train(
            r#"{ "update_method": "adam", "learning_rate": 0.01, "min_accumulations_to_update": 2 }"#,
            200,
        );
        assert!(trained < 0.5 * initial, "loss went from {} to {}", initial, trained);
    }

    #[test]
    fn test_decayed_sgd_lowers_the_loss() {
        let (initial, trained) = train(
            r#"{ "update_method": "learning_rate", "learning_rate": 0.1,
                 "decay_type": "hyperbolic", "final_learning_rate": 0.01, "decay_rate": 0.01 }"#,
            200,
        );
        assert!(trained < initial, "loss went from {} to {}", initial, trained);
    }
}
