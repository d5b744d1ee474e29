use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts tensor allocations and releases so a caller can check that nothing
/// created during a session outlives it.
#[derive(Debug, Clone, Default)]
pub struct TensorLedger {
    allocated: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl TensorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.allocated().saturating_sub(self.released())
    }
}

/// Dense row-major buffer with an explicit shape.
///
/// A tensor is released when it is dropped; the ledger it was created with
/// records the release.
pub struct Tensor<T> {
    shape: Vec<usize>,
    data: Vec<T>,
    ledger: TensorLedger,
}

impl<T> Tensor<T> {
    pub fn from_shape_vec(
        shape: Vec<usize>,
        data: Vec<T>,
        ledger: &TensorLedger,
    ) -> Result<Self, String> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(format!(
                "shape {:?} needs {} elements, got {}",
                shape,
                expected,
                data.len()
            ));
        }

        ledger.allocated.fetch_add(1, Ordering::SeqCst);

        Ok(Self {
            shape,
            data,
            ledger: ledger.clone(),
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T: Copy> Tensor<T> {
    /// Copies the values out so the tensor itself can be released.
    pub fn to_vec(&self) -> Vec<T> {
        self.data.clone()
    }
}

impl<T> Drop for Tensor<T> {
    fn drop(&mut self) {
        self.ledger.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl<T> fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("len", &self.data.len())
            .finish()
    }
}
