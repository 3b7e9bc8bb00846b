//! Fan-out/fan-in task group with first-error cancellation.

use std::future::Future;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Group of concurrent units sharing one cancellation token.
///
/// Every unit runs to completion on its own task. The first unit that fails
/// cancels the shared token so that units watching it can stop early;
/// [`TaskGroup::wait`] still joins all of them before returning that error.
pub struct TaskGroup<T, E> {
    tasks: JoinSet<Result<T, E>>,
    token: CancellationToken,
}

impl<T, E> TaskGroup<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create a group whose token is a child of `parent`.
    #[must_use]
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            tasks: JoinSet::new(),
            token: parent.child_token(),
        }
    }

    /// Token shared by the units of this group.
    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Number of units not yet joined.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Spawn a unit. It receives the group token.
    pub fn spawn<F, Fut>(&mut self, unit: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.tasks.spawn(unit(self.token.clone()));
    }

    /// Join every unit and return their values, or the first error observed.
    ///
    /// # Errors
    /// Returns the error of the first unit to fail.
    ///
    /// # Panics
    /// Re-raises the panic of any unit that panicked.
    pub async fn wait(mut self) -> Result<Vec<T>, E> {
        let mut values = Vec::with_capacity(self.tasks.len());
        let mut first_error = None;

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(Ok(value)) => values.push(value),
                Ok(Err(err)) => {
                    if first_error.is_none() {
                        self.token.cancel();
                        first_error = Some(err);
                    }
                }
                Err(join_error) => {
                    if join_error.is_panic() {
                        std::panic::resume_unwind(join_error.into_panic());
                    }
                }
            }
        }

        first_error.map_or(Ok(values), Err)
    }
}
