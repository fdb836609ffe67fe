use std::future::Future;
use std::ops::ControlFlow;

use crate::error::{JenkinsError, Result};

/// Outcome of a sequential multi-step operation.
///
/// Steps run one after another and the first failure stops the sequence.
/// Whatever succeeded before that point is kept in `items`, next to the
/// error that halted it.
#[derive(Debug)]
pub struct Batch<T> {
    pub items: Vec<T>,
    pub error: Option<JenkinsError>,
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            error: None,
        }
    }
}

impl<T> Batch<T> {
    /// Folds one step outcome in, breaking on the first error.
    pub fn absorb(mut self, outcome: Result<T>) -> ControlFlow<Self, Self> {
        match outcome {
            Ok(item) => {
                self.items.push(item);
                ControlFlow::Continue(self)
            }
            Err(error) => {
                self.error = Some(error);
                ControlFlow::Break(self)
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Drops the partial items if the sequence was halted.
    pub fn into_result(self) -> Result<Vec<T>> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.items),
        }
    }
}

/// Runs `step` over `inputs` one at a time, halting on the first error.
pub(crate) async fn sequential<I, F, Fut, T>(inputs: I, mut step: F) -> Batch<T>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut batch = Batch::default();
    for input in inputs {
        match batch.absorb(step(input).await) {
            ControlFlow::Continue(next) => batch = next,
            ControlFlow::Break(halted) => return halted,
        }
    }
    batch
}
