//! Tests for architecture parsing and building
//!
//! This file tests the architecture module including:
//! - Loading the JSON architecture configs shipped in config/
//! - Building parameters, layers and processors from a config
//! - Handling invalid JSON and missing files
//! - Validating layer connections and sparse inputs

use neural_core::architecture::{
    build_feedforward_processor, build_layers, build_parameters, build_sequence_processor,
    load_architecture, validate_architecture, ArchitectureConfig, Connection,
};
use neural_core::parameters::GradientKind;
use neural_core::utils::Activation;
use neural_core::NeuralError;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp config");
    file
}

fn load_temp(contents: &str) -> neural_core::Result<ArchitectureConfig> {
    let file = write_temp_config(contents);
    load_architecture(file.path().to_str().unwrap())
}

// ============================================================================
// Valid Architecture Loading Tests
// ============================================================================

mod valid_architecture_tests {
    use super::*;

    #[test]
    fn test_load_rnn_config() {
        let config = load_architecture("config/architecture_rnn.json").unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.layers.len(), 2);
        assert_eq!(config.layers[0].connection, Connection::SimpleRecurrent);
        assert_eq!(config.layers[0].activation, Activation::Tanh);
        assert!(config.layers[0].sparse_input);
        assert_eq!(config.layers[1].connection, Connection::Feedforward);
        // Not given in the file
        assert_eq!(config.layers[1].activation, Activation::Identity);
        assert!(!config.layers[1].sparse_input);
    }

    #[test]
    fn test_load_mlp_config() {
        let config = load_architecture("config/architecture_mlp.json").unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.init_gain, 1.0);
        assert_eq!(config.bias_init, 0.0);
        assert_eq!(config.layers[1].activation, Activation::Sigmoid);
        assert_eq!(config.layers[1].output_size, 3);
    }
}

// ============================================================================
// Model Building Tests
// ============================================================================

mod build_tests {
    use super::*;

    #[test]
    fn test_build_parameters_layout() {
        let config = load_architecture("config/architecture_rnn.json").unwrap();
        let params = build_parameters(&config).unwrap();

        let recurrent = params.layer(0);
        assert_eq!(recurrent.weights().len(), 2);
        assert_eq!(recurrent.weights()[0].shape(), (32, 100));
        assert_eq!(recurrent.weights()[0].gradient_kind(), GradientKind::Sparse);
        assert_eq!(recurrent.weights()[1].shape(), (32, 32));
        assert_eq!(recurrent.weights()[1].gradient_kind(), GradientKind::Dense);

        let output = params.layer(1);
        assert_eq!(output.weights()[0].shape(), (5, 32));
        assert_eq!(output.biases()[0].shape(), (5, 1));

        // Ids follow tensor order within a layer, weights first
        let ids: Vec<usize> = recurrent.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_build_parameters_is_deterministic() {
        let config = load_architecture("config/architecture_mlp.json").unwrap();
        let a = build_parameters(&config).unwrap();
        let b = build_parameters(&config).unwrap();

        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.values(), y.values());
        }
        assert!(a.layer(0).weights()[0].values().values().iter().any(|&w| w != 0.0));
    }

    #[test]
    fn test_build_layers_follow_config() {
        let config = load_architecture("config/architecture_mlp.json").unwrap();
        let layers = build_layers(&config).unwrap();

        assert_eq!(layers.len(), 2);
        assert_eq!((layers[0].input_size(), layers[0].output_size()), (50, 16));
        assert_eq!((layers[1].input_size(), layers[1].output_size()), (16, 3));
    }

    #[test]
    fn test_feedforward_processor_from_config() {
        let config = load_architecture("config/architecture_mlp.json").unwrap();
        let params = build_parameters(&config).unwrap();
        let mut processor = build_feedforward_processor(&config).unwrap();

        let output = processor.forward_sparse(&params, &[3, 17, 42]);
        assert_eq!(output.len(), 3);
        assert!(output.values().iter().all(|&y| y > 0.0 && y < 1.0));
    }

    #[test]
    fn test_sequence_processor_from_config() {
        let config = load_architecture("config/architecture_rnn.json").unwrap();
        let params = build_parameters(&config).unwrap();
        let mut processor = build_sequence_processor(&config).unwrap();

        let outputs = processor.forward_sparse(&params, &[vec![1, 5], vec![99], vec![]]);
        assert_eq!(outputs.len(), 3);
        assert!(outputs.iter().all(|o| o.len() == 5));
        assert_eq!(processor.pool().size(), 3);
    }
}

// ============================================================================
// Error Handling Tests
// ============================================================================

mod error_handling_tests {
    use super::*;

    #[test]
    fn test_invalid_json() {
        let result = load_temp(r#"{ "layers": [ { "connection": "feedforward", } ] }"#);
        assert!(matches!(result, Err(NeuralError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_architecture("config/does_not_exist.json");
        assert!(matches!(result, Err(NeuralError::Io(_))));
    }

    #[test]
    fn test_unknown_connection() {
        let result = load_temp(
            r#"{ "layers": [ { "connection": "lstm", "input_size": 4, "output_size": 2 } ] }"#,
        );
        assert!(matches!(result, Err(NeuralError::Json(_))));
    }

    #[test]
    fn test_unknown_activation() {
        let result = load_temp(
            r#"{ "layers": [ { "connection": "feedforward", "input_size": 4, "output_size": 2,
                               "activation": "softsign" } ] }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_layers() {
        match load_temp(r#"{ "layers": [] }"#) {
            Err(NeuralError::Config(message)) => assert!(message.contains("at least one layer")),
            other => panic!("expected a config error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_output_size() {
        let result = load_temp(
            r#"{ "layers": [ { "connection": "feedforward", "input_size": 4, "output_size": 0 } ] }"#,
        );
        assert!(matches!(result, Err(NeuralError::Config(_))));
    }

    #[test]
    fn test_layer_connection_mismatch() {
        let config: ArchitectureConfig = serde_json::from_str(
            r#"{ "layers": [
                { "connection": "simple_recurrent", "input_size": 10, "output_size": 8 },
                { "connection": "feedforward", "input_size": 6, "output_size": 2 }
            ] }"#,
        )
        .unwrap();

        let err = validate_architecture(&config).unwrap_err();
        assert!(err.to_string().contains("Layer connection mismatch"));
        assert!(build_parameters(&config).is_err());
        assert!(build_sequence_processor(&config).is_err());
    }
}
