//! Forward and backward passes over a sequence, with backpropagation through time.

use std::collections::BTreeMap;

use tracing::trace;

use super::pool::StructurePool;
use crate::arrays::DenseArray;
use crate::layers::{ContextWindow, InitHidden, Layer, PrevState};
use crate::parameters::{StackedErrors, StackedParameters};

/// The layer instances of one time step, bottom to top.
pub struct StepStructure {
    id: usize,
    layers: Vec<Box<dyn Layer>>,
}

impl StepStructure {
    /// Pool id of this structure.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn layers(&self) -> &[Box<dyn Layer>] {
        &self.layers
    }
}

enum StepInput<'a> {
    Dense(&'a DenseArray),
    Sparse(&'a [usize]),
}

/// Runs a stack of layers over every element of a sequence.
///
/// Each time step gets its own [`StepStructure`] from a pool; the pool ids in
/// time order act as the arena through which a layer instance reaches the
/// same-index instance of the previous and next step. Structures are reused
/// across sequences.
pub struct SequenceProcessor {
    pool: StructurePool<StepStructure>,
    steps: Vec<usize>,
    init_hidden: BTreeMap<usize, InitHidden>,
    params_errors: Option<StackedErrors>,
}

impl SequenceProcessor {
    /// Creates a processor whose step structures are built by `layers`.
    ///
    /// `layers` must return one layer per entry of the stacked parameters the
    /// processor will be used with, bottom to top.
    pub fn new<F>(mut layers: F) -> Self
    where
        F: FnMut() -> Vec<Box<dyn Layer>> + 'static,
    {
        Self {
            pool: StructurePool::new(move |id| StepStructure {
                id,
                layers: layers(),
            }),
            steps: Vec::new(),
            init_hidden: BTreeMap::new(),
            params_errors: None,
        }
    }

    /// Installs an initial hidden state for the layer at `layer`, used as the
    /// previous state of the first time step.
    pub fn set_init_hidden(&mut self, layer: usize, values: DenseArray) {
        self.init_hidden.insert(layer, InitHidden::new(values));
    }

    pub fn clear_init_hidden(&mut self) {
        self.init_hidden.clear();
    }

    /// Gradient with respect to the initial hidden state of `layer`, after a
    /// backward pass.
    pub fn init_hidden_errors(&self, layer: usize) -> Option<&DenseArray> {
        self.init_hidden.get(&layer).map(InitHidden::errors)
    }

    /// Length of the sequence of the last forward pass.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn pool(&self) -> &StructurePool<StepStructure> {
        &self.pool
    }

    /// The layer instance at (`step`, `layer`).
    pub fn layer(&self, step: usize, layer: usize) -> &dyn Layer {
        self.pool.item(self.steps[step]).layers[layer].as_ref()
    }

    /// Temporal neighbours of the layer instance at (`step`, `layer`).
    pub fn context_window(&self, step: usize, layer: usize) -> ContextWindow<'_> {
        let prev = step.checked_sub(1).map(|p| self.pool.item(self.steps[p]));
        let next = self.steps.get(step + 1).map(|&n| self.pool.item(n));
        step_window(prev, next, self.init_hidden.get(&layer), layer)
    }

    /// Top-layer output at `step`.
    pub fn output(&self, step: usize) -> &DenseArray {
        let structure = self.pool.item(self.steps[step]);
        structure.layers[structure.layers.len() - 1].output()
    }

    /// Errors with respect to the input of `step`, if they were propagated.
    pub fn input_errors(&self, step: usize) -> Option<&DenseArray> {
        self.layer(step, 0).input_errors()
    }

    /// Forward pass over a sequence of dense inputs; returns the top-layer
    /// output of every step.
    pub fn forward(&mut self, params: &StackedParameters, sequence: &[DenseArray]) -> Vec<DenseArray> {
        let inputs: Vec<StepInput<'_>> = sequence.iter().map(StepInput::Dense).collect();
        self.run_forward(params, &inputs)
    }

    /// Forward pass over a sequence of active-feature inputs.
    pub fn forward_sparse(&mut self, params: &StackedParameters, sequence: &[Vec<usize>]) -> Vec<DenseArray> {
        let inputs: Vec<StepInput<'_>> = sequence
            .iter()
            .map(|features| StepInput::Sparse(features))
            .collect();
        self.run_forward(params, &inputs)
    }

    fn run_forward(&mut self, params: &StackedParameters, inputs: &[StepInput<'_>]) -> Vec<DenseArray> {
        self.pool.release_all();
        self.steps.clear();
        for _ in inputs {
            let id = self.pool.get_item();
            self.steps.push(id);
        }
        trace!(steps = inputs.len(), pool_size = self.pool.size(), "Sequence forward");

        let mut outputs = Vec::with_capacity(inputs.len());
        for (t, input) in inputs.iter().enumerate() {
            let prev_id = t.checked_sub(1).map(|p| self.steps[p]);
            let (step, prev, _) = self.pool.with_neighbours(self.steps[t], prev_id, None);
            check_layer_count(step, params);

            match input {
                StepInput::Dense(x) => step.layers[0].set_input(x),
                StepInput::Sparse(features) => step.layers[0].set_sparse_input(features),
            }

            for i in 0..step.layers.len() {
                if i > 0 {
                    let (below, rest) = step.layers.split_at_mut(i);
                    rest[0].set_input(below[i - 1].output());
                }
                let window = step_window(prev, None, self.init_hidden.get(&i), i);
                step.layers[i].forward(params.layer(i), &window);
            }

            if let Some(top) = step.layers.last() {
                outputs.push(top.output().clone());
            }
        }
        outputs
    }

    /// Backward pass over the sequence of the last forward pass.
    ///
    /// `output_errors[t]` are the errors with respect to the top-layer output
    /// at step `t`. Returns the parameter gradients summed over all steps.
    /// Initial hidden gradients are available afterwards through
    /// [`init_hidden_errors`](Self::init_hidden_errors).
    ///
    /// # Panics
    ///
    /// Panics if `output_errors` does not have one entry per step.
    pub fn backward(
        &mut self,
        params: &StackedParameters,
        output_errors: &[DenseArray],
        propagate_to_input: bool,
    ) -> &StackedErrors {
        assert_eq!(
            output_errors.len(),
            self.steps.len(),
            "Output errors must cover every step of the last forward pass"
        );

        let errors = self.params_errors.get_or_insert_with(|| params.errors_like());
        errors.zero_fill();

        for t in (0..self.steps.len()).rev() {
            let prev_id = t.checked_sub(1).map(|p| self.steps[p]);
            let next_id = self.steps.get(t + 1).copied();
            let (step, prev, next) = self.pool.with_neighbours(self.steps[t], prev_id, next_id);

            let top = step.layers.len() - 1;
            step.layers[top].set_output_errors(&output_errors[t]);

            for i in (0..step.layers.len()).rev() {
                if i < top {
                    let (below, above) = step.layers.split_at_mut(i + 1);
                    match above[0].input_errors() {
                        Some(e) => below[i].set_output_errors(e),
                        None => panic!("Layer {} did not propagate errors to its input", i + 1),
                    }
                }
                let window = step_window(prev, next, self.init_hidden.get(&i), i);
                let propagate = i > 0 || propagate_to_input;
                let layer_errors = step.layers[i].backward(params.layer(i), &window, propagate);
                errors.layer_mut(i).assign_sum(layer_errors);
            }
        }

        // An empty sequence leaves nothing to feed back: the errors are zeroed
        let first = self.steps.first().map(|&id| self.pool.item(id));
        for (&i, init) in self.init_hidden.iter_mut() {
            init.set_errors(first.and_then(|structure| structure.layers[i].recurrent_errors()));
        }

        errors
    }
}

fn step_window<'a>(
    prev: Option<&'a StepStructure>,
    next: Option<&'a StepStructure>,
    init_hidden: Option<&'a InitHidden>,
    layer: usize,
) -> ContextWindow<'a> {
    let prev = match prev {
        Some(structure) => Some(PrevState::Layer(structure.layers[layer].as_ref())),
        None => init_hidden.map(PrevState::InitHidden),
    };
    let next = next.map(|structure| structure.layers[layer].as_ref());
    ContextWindow::new(prev, next)
}

fn check_layer_count(step: &StepStructure, params: &StackedParameters) {
    assert_eq!(
        step.layers.len(),
        params.len(),
        "Step structure must have one layer per parameter layer"
    );
    assert!(!step.layers.is_empty(), "Step structure must have at least one layer");
}
