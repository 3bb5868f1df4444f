//! Batch executor: one remote call per window, every failure kept.

use paramstore_storage::ParameterStore;
use tracing::{debug, error, warn};

use super::chunk::{chunks, BatchSize};
use super::context::CallContext;
use crate::error::{BatchError, BatchOutcome, ParameterError};
use crate::model::Parameter;

/// Drives a [`ParameterStore`] across all windows of a request.
///
/// A failed window records a transport error and execution moves on to the
/// next window; only an interrupted call (cancellation or deadline) stops
/// the batch early.
pub struct BatchExecutor<'a, S: ?Sized> {
    store: &'a S,
    batch_size: BatchSize,
    ctx: &'a CallContext,
}

impl<'a, S> BatchExecutor<'a, S>
where
    S: ParameterStore + ?Sized,
{
    pub fn new(store: &'a S, batch_size: BatchSize, ctx: &'a CallContext) -> Self {
        Self {
            store,
            batch_size,
            ctx,
        }
    }

    /// Fetches every name, window by window.
    ///
    /// Output order is the store's response order within each window,
    /// concatenated in window order.
    pub async fn fetch(&self, names: &[String], with_decryption: bool) -> BatchOutcome<Parameter> {
        let mut outcome = BatchOutcome::new();

        for window in chunks(names, self.batch_size) {
            let call = self.store.fetch_by_names(window, with_decryption);
            match self.ctx.run(call).await {
                Ok(result) => {
                    debug!(
                        resolved = result.parameters.len(),
                        invalid = result.invalid_names.len(),
                        "fetched window"
                    );
                    outcome
                        .items
                        .extend(result.parameters.into_iter().map(Parameter::from));
                    record_invalid(&mut outcome.errors, result.invalid_names);
                }
                Err(err) => {
                    error!(error = %err, names = ?window, with_decryption, "failed to get parameters");
                    let interrupted = err.is_interrupted();
                    outcome.errors.push(ParameterError::transport(window, err));
                    if interrupted {
                        break;
                    }
                }
            }
        }

        outcome
    }

    /// Writes each parameter with its own call; every parameter is attempted.
    ///
    /// Returns the names written successfully.
    pub async fn write(&self, parameters: &[Parameter], key_id: Option<&str>) -> BatchOutcome<String> {
        let mut outcome = BatchOutcome::new();

        for parameter in parameters {
            let request = parameter.to_write_request(key_id);
            match self.ctx.run(self.store.write_one(&request)).await {
                Ok(()) => outcome.items.push(request.name),
                Err(err) => {
                    error!(
                        error = %err,
                        name = %request.name,
                        parameter_type = %request.parameter_type,
                        overwrite = request.overwrite,
                        "failed to put parameter"
                    );
                    let interrupted = err.is_interrupted();
                    outcome
                        .errors
                        .push(ParameterError::transport(std::slice::from_ref(&request.name), err));
                    if interrupted {
                        break;
                    }
                }
            }
        }

        outcome
    }

    /// Deletes every name, window by window.
    ///
    /// Returns the names the store reported deleted.
    pub async fn delete(&self, names: &[String]) -> BatchOutcome<String> {
        let mut outcome = BatchOutcome::new();

        for window in chunks(names, self.batch_size) {
            match self.ctx.run(self.store.delete_by_names(window)).await {
                Ok(result) => {
                    outcome.items.extend(result.deleted_names);
                    record_invalid(&mut outcome.errors, result.invalid_names);
                }
                Err(err) => {
                    error!(error = %err, names = ?window, "failed to delete parameters");
                    let interrupted = err.is_interrupted();
                    outcome.errors.push(ParameterError::transport(window, err));
                    if interrupted {
                        break;
                    }
                }
            }
        }

        outcome
    }
}

fn record_invalid(errors: &mut BatchError, invalid_names: Vec<String>) {
    for name in &invalid_names {
        warn!(parameter = %name, "found invalid parameter");
    }
    errors.extend_invalid(invalid_names);
}
