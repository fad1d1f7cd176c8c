//! Tests for saving and restoring parameters
//!
//! This file tests:
//! - Dumping and loading stacked parameters through a file
//! - Optimizer state not being part of the saved parameters
//! - Zero-filled copies and value assignment between stacks

use neural_core::arrays::DenseArray;
use neural_core::optimizers::{AdaGradMethod, AdamMethod, ParamsOptimizer, SupportStructureKind};
use neural_core::parameters::{Gradient, GradientKind, LayerParameters, StackedParameters};
use neural_core::utils::initializers::GlorotInitializer;
use neural_core::NeuralError;
use std::fs::File;
use tempfile::NamedTempFile;

fn model() -> StackedParameters {
    let mut params = StackedParameters::new(vec![
        LayerParameters::simple_recurrent(5, 3, true),
        LayerParameters::feedforward(3, 2, false),
    ]);
    params.initialize(&mut GlorotInitializer::new(99, 1.0), 0.05);
    params
}

/// A saved 2 -> 1 feedforward layer with the given weight and bias arrays.
fn feedforward_json(weight: &str, bias: &str) -> String {
    format!(
        r#"{{ "layers": [ {{
            "input_size": 2,
            "output_size": 1,
            "weights": [ {{ "id": 0, "values": {}, "gradient_kind": "Dense" }} ],
            "biases": [ {{ "id": 1, "values": {}, "gradient_kind": "Dense" }} ]
        }} ] }}"#,
        weight, bias
    )
}

fn train_once(params: &mut StackedParameters, optimizer: &mut ParamsOptimizer) {
    let mut errors = params.errors_like();
    errors.layer_mut(1).biases[0] = Gradient::Dense(DenseArray::column(vec![0.5, -0.5]));
    optimizer.accumulate(&errors);
    optimizer.update(params).unwrap();
}

// ============================================================================
// Dump / Load Tests
// ============================================================================

mod dump_load_tests {
    use super::*;

    #[test]
    fn test_values_survive_a_file() {
        let params = model();
        let file = NamedTempFile::new().unwrap();
        params.dump(File::create(file.path()).unwrap()).unwrap();

        let restored = StackedParameters::load(File::open(file.path()).unwrap()).unwrap();

        assert_eq!(restored.len(), params.len());
        for (a, b) in params.iter().zip(restored.iter()) {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.gradient_kind(), b.gradient_kind());
            assert_eq!(a.values(), b.values());
        }
        assert_eq!(
            restored.layer(0).weights()[0].gradient_kind(),
            GradientKind::Sparse
        );
    }

    #[test]
    fn test_support_structures_are_not_saved() {
        let mut params = model();
        let mut optimizer = ParamsOptimizer::new(Box::new(AdamMethod::default()), &params, 1);
        optimizer.new_example();
        train_once(&mut params, &mut optimizer);
        assert_eq!(
            params.layer(1).biases()[0].support_structure_kind(),
            Some(SupportStructureKind::Adam)
        );

        let mut buffer = Vec::new();
        params.dump(&mut buffer).unwrap();
        let mut restored = StackedParameters::load(buffer.as_slice()).unwrap();
        assert!(restored.iter().all(|p| p.support_structure_kind().is_none()));

        // A different update method can take over the restored parameters
        let mut optimizer = ParamsOptimizer::new(Box::new(AdaGradMethod::default()), &restored, 1);
        train_once(&mut restored, &mut optimizer);
        assert_eq!(
            restored.layer(1).biases()[0].support_structure_kind(),
            Some(SupportStructureKind::AdaGrad)
        );
    }

    #[test]
    fn test_load_rejects_garbage() {
        assert!(StackedParameters::load("not json".as_bytes()).is_err());
    }

    #[test]
    fn test_values_keep_every_bit() {
        let mut params = StackedParameters::new(vec![LayerParameters::feedforward(2, 1, false)]);
        params.iter_mut().for_each(|p| p.fill(-0.13953443389829379));

        let mut buffer = Vec::new();
        params.dump(&mut buffer).unwrap();
        let restored = StackedParameters::load(buffer.as_slice()).unwrap();

        for p in restored.iter() {
            assert!(p.values().values().iter().all(|&v| v == -0.13953443389829379));
        }
    }

    #[test]
    fn test_load_hand_written_layer() {
        let json = feedforward_json(
            r#"{ "rows": 1, "columns": 2, "values": [0.5, -0.5] }"#,
            r#"{ "rows": 1, "columns": 1, "values": [0.25] }"#,
        );
        let params = StackedParameters::load(json.as_bytes()).unwrap();
        assert_eq!(params.layer(0).weights()[0].values().values(), &[0.5, -0.5]);
        assert_eq!(params.layer(0).biases()[0].values().values(), &[0.25]);
    }

    #[test]
    fn test_load_rejects_values_not_matching_shape() {
        let json = feedforward_json(
            r#"{ "rows": 1, "columns": 2, "values": [1.0] }"#,
            r#"{ "rows": 1, "columns": 1, "values": [0.0] }"#,
        );
        let result = StackedParameters::load(json.as_bytes());
        assert!(matches!(result, Err(NeuralError::Json(_))));
    }

    #[test]
    fn test_load_rejects_tensor_not_matching_layer_sizes() {
        let json = feedforward_json(
            r#"{ "rows": 1, "columns": 3, "values": [1.0, 2.0, 3.0] }"#,
            r#"{ "rows": 1, "columns": 1, "values": [0.0] }"#,
        );
        match StackedParameters::load(json.as_bytes()) {
            Err(NeuralError::Config(message)) => {
                assert!(message.contains("Layer 0"));
                assert!(message.contains("(1, 3)"));
            }
            other => panic!("expected a config error, got {:?}", other),
        }
    }
}

// ============================================================================
// Copy / Assign Tests
// ============================================================================

mod copy_tests {
    use super::*;

    #[test]
    fn test_copy_is_zero_filled_with_same_layout() {
        let params = model();
        let copy = params.copy();

        assert_eq!(copy.params_count(), params.params_count());
        for (a, b) in params.iter().zip(copy.iter()) {
            assert_eq!(a.shape(), b.shape());
            assert_eq!(a.gradient_kind(), b.gradient_kind());
            assert!(b.values().values().iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_assign_values_copies_everything() {
        let params = model();
        let mut target = params.copy();
        target.assign_values(&params);

        for (a, b) in params.iter().zip(target.iter()) {
            assert_eq!(a.values(), b.values());
        }
    }
}
