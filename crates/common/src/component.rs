//! The building block of every pipeline.
//!
//! A component is a named, parameterized step. Its `params` are exactly the
//! byte strings a constructor would accept, in order, so that handing
//! `(name, params)` back to the [`Registry`](crate::registry::Registry)
//! rebuilds an equivalent component. Components are immutable once built.
//!
//! Each component is used in exactly one [`Role`] at a time. The role is
//! decided once, when the registry resolves the component, and travels with
//! it inside a [`Step`].

use std::fmt;
use std::sync::Arc;

use crate::storage::{Sink, Source};
use crate::transform::Transformer;

/// Ordered parameter list of a component.
pub type Params = Vec<Vec<u8>>;

/// Capability contract shared by every pipeline step.
pub trait Component {
    /// Stable short identifier, constant per concrete type (e.g. `"aes"`).
    fn name(&self) -> &'static str;

    /// Construction parameters, in constructor order.
    fn params(&self) -> Params;
}

/// The capability a component is used for at a given point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Reversible byte-to-byte mapping.
    Transformer,
    /// Write-side storage: bytes in, id out.
    Sink,
    /// Read-side storage: id in, bytes out.
    Source,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Transformer => "transformer",
            Role::Sink => "sink",
            Role::Source => "source",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved component tagged with the role it plays in a pipeline.
#[derive(Clone)]
pub enum Step {
    Transformer(Arc<dyn Transformer>),
    Sink(Arc<dyn Sink>),
    Source(Arc<dyn Source>),
}

impl Step {
    pub fn role(&self) -> Role {
        match self {
            Step::Transformer(_) => Role::Transformer,
            Step::Sink(_) => Role::Sink,
            Step::Source(_) => Role::Source,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Step::Transformer(t) => t.name(),
            Step::Sink(s) => s.name(),
            Step::Source(s) => s.name(),
        }
    }

    pub fn params(&self) -> Params {
        match self {
            Step::Transformer(t) => t.params(),
            Step::Sink(s) => s.params(),
            Step::Source(s) => s.params(),
        }
    }

    pub fn is_sink(&self) -> bool {
        matches!(self, Step::Sink(_))
    }

    pub fn is_source(&self) -> bool {
        matches!(self, Step::Source(_))
    }
}

impl fmt::Debug for Step {
    // params may carry key material, so only the shape is printed
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("role", &self.role())
            .field("name", &self.name())
            .field("params", &self.params().len())
            .finish()
    }
}

impl From<Arc<dyn Transformer>> for Step {
    fn from(transformer: Arc<dyn Transformer>) -> Self {
        Step::Transformer(transformer)
    }
}

impl From<Arc<dyn Sink>> for Step {
    fn from(sink: Arc<dyn Sink>) -> Self {
        Step::Sink(sink)
    }
}

impl From<Arc<dyn Source>> for Step {
    fn from(source: Arc<dyn Source>) -> Self {
        Step::Source(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::RotTransformer;

    #[test]
    fn test_step_reports_role_and_name() {
        let step = Step::Transformer(Arc::new(RotTransformer::new()));
        assert_eq!(step.role(), Role::Transformer);
        assert_eq!(step.name(), "rot");
        assert!(step.params().is_empty());
        assert!(!step.is_sink());
        assert!(!step.is_source());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Transformer.to_string(), "transformer");
        assert_eq!(Role::Sink.to_string(), "sink");
        assert_eq!(Role::Source.to_string(), "source");
    }
}
