//! Temporal neighbourhood of a layer instance.
//!
//! A processor owns every layer instance, indexed by (time step, layer index).
//! The window borrows the instances at the same layer index one step before
//! and one step after, so a recurrent layer can read its previous output
//! during forward and the errors flowing back in time during backward without
//! holding references of its own.

use super::r#trait::Layer;
use crate::arrays::DenseArray;

/// Externally provided hidden state used before the first time step.
///
/// After a backward pass `errors` holds the gradient with respect to `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct InitHidden {
    values: DenseArray,
    errors: DenseArray,
}

impl InitHidden {
    pub fn new(values: DenseArray) -> Self {
        let (rows, columns) = values.shape();
        Self {
            values,
            errors: DenseArray::zeros(rows, columns),
        }
    }

    pub fn values(&self) -> &DenseArray {
        &self.values
    }

    pub fn errors(&self) -> &DenseArray {
        &self.errors
    }

    pub(crate) fn set_errors(&mut self, errors: Option<&DenseArray>) {
        match errors {
            Some(e) => self.errors.assign(e),
            None => self.errors.zero_fill(),
        }
    }
}

/// What stands before a layer instance in time.
#[derive(Clone, Copy)]
pub enum PrevState<'a> {
    /// The same-index layer of the previous time step.
    Layer(&'a dyn Layer),
    /// An initial hidden override installed before the first step.
    InitHidden(&'a InitHidden),
}

impl<'a> PrevState<'a> {
    /// The hidden values to feed back as recurrent input.
    pub fn output(&self) -> &'a DenseArray {
        match *self {
            PrevState::Layer(layer) => layer.output(),
            PrevState::InitHidden(init) => init.values(),
        }
    }
}

/// Lookup of a layer instance's temporal neighbours.
///
/// At a sequence boundary without override the lookups return `None`: the
/// layer must then skip its recurrent terms entirely.
#[derive(Clone, Copy, Default)]
pub struct ContextWindow<'a> {
    prev: Option<PrevState<'a>>,
    next: Option<&'a dyn Layer>,
}

impl<'a> ContextWindow<'a> {
    pub fn new(prev: Option<PrevState<'a>>, next: Option<&'a dyn Layer>) -> Self {
        Self { prev, next }
    }

    /// Window without neighbours, as used by feed-forward processing.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn prev_state(&self) -> Option<PrevState<'a>> {
        self.prev
    }

    /// The previous step's layer; `None` at the first step, even with an override.
    pub fn prev_layer(&self) -> Option<&'a dyn Layer> {
        match self.prev {
            Some(PrevState::Layer(layer)) => Some(layer),
            _ => None,
        }
    }

    pub fn prev_output(&self) -> Option<&'a DenseArray> {
        self.prev.map(|p| p.output())
    }

    pub fn next_layer(&self) -> Option<&'a dyn Layer> {
        self.next
    }

    /// Errors the next step propagated back through its recurrent weights.
    pub fn next_recurrent_errors(&self) -> Option<&'a DenseArray> {
        self.next.and_then(|layer| layer.recurrent_errors())
    }
}
