//! Transform trait and implementations for data transformation

use rand::RngCore;
use tracing::trace;

use crate::error::Result;

/// A transformation that processes data items one at a time.
///
/// Randomized transforms draw from the `rng` they are handed so callers
/// decide whether a pipeline runs reproducibly (seeded generator) or not
/// (thread-local generator).
pub trait Transform: Send + Sync {
    /// The type of input items
    type Input;

    /// The type of output items
    type Output;

    /// Transform a single item
    fn apply(&self, input: Self::Input, rng: &mut dyn RngCore) -> Result<Self::Output>;

    /// Whether the output depends on the random generator
    fn is_random(&self) -> bool {
        false
    }

    /// Human readable name used in logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<T: Transform + ?Sized> Transform for Box<T> {
    type Input = T::Input;
    type Output = T::Output;

    fn apply(&self, input: Self::Input, rng: &mut dyn RngCore) -> Result<Self::Output> {
        (**self).apply(input, rng)
    }

    fn is_random(&self) -> bool {
        (**self).is_random()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// A chain of transforms that can be executed as a single transform
pub struct TransformChain<T> {
    /// The transforms in this chain
    transforms: Vec<T>,
}

impl<T> TransformChain<T> {
    /// Create a new transform chain
    pub fn new(transforms: Vec<T>) -> Self {
        Self { transforms }
    }

    /// Get a reference to the transforms in this chain
    pub fn transforms(&self) -> &[T] {
        &self.transforms
    }
}

impl<A, T> Transform for TransformChain<T>
where
    T: Transform<Input = A, Output = A>,
{
    type Input = A;
    type Output = A;

    fn apply(&self, input: A, rng: &mut dyn RngCore) -> Result<A> {
        let mut current = input;

        for transform in &self.transforms {
            trace!(stage = transform.name(), "applying transform");
            current = transform.apply(current, rng)?;
        }

        Ok(current)
    }

    fn is_random(&self) -> bool {
        self.transforms.iter().any(Transform::is_random)
    }
}
