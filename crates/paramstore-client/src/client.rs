//! Client facade.
//!
//! [`ParameterClient`] owns the immutable options (batch size, decryption,
//! key id, region) and drives the batch engine for every operation. No
//! operation aborts on a single failing item: partial results come back
//! together with a [`BatchError`] listing every failure.

use std::sync::Arc;
use std::time::Duration;

use paramstore_domain::{
    BatchError, BatchExecutor, BatchOutcome, BatchSize, CallContext, MappingError, Parameter,
    ParameterError, ParameterMapping, PathPattern,
};
use paramstore_storage::{ParameterStore, PathQuery};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::ClientConfig;

/// Batched client for a [`ParameterStore`].
///
/// Cheap to share: clone it or put it behind an `Arc`.
pub struct ParameterClient<S: ?Sized> {
    store: Arc<S>,
    batch_size: BatchSize,
    with_decryption: bool,
    key_id: Option<String>,
    region: String,
    call_timeout: Option<Duration>,
}

impl<S: ?Sized> Clone for ParameterClient<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            batch_size: self.batch_size,
            with_decryption: self.with_decryption,
            key_id: self.key_id.clone(),
            region: self.region.clone(),
            call_timeout: self.call_timeout,
        }
    }
}

impl<S: ?Sized> std::fmt::Debug for ParameterClient<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterClient")
            .field("batch_size", &self.batch_size)
            .field("with_decryption", &self.with_decryption)
            .field("key_id", &self.key_id)
            .field("region", &self.region)
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ParameterClient`].
pub struct ParameterClientBuilder<S: ?Sized> {
    store: Arc<S>,
    batch_size: usize,
    with_decryption: bool,
    key_id: Option<String>,
    region: String,
    call_timeout: Option<Duration>,
}

impl<S: ?Sized> ParameterClientBuilder<S> {
    /// Names per remote call. Checked in [`build`](Self::build).
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_decryption(mut self, with_decryption: bool) -> Self {
        self.with_decryption = with_decryption;
        self
    }

    /// KMS key forwarded on writes. An empty id is ignored.
    pub fn key_id(mut self, key_id: impl Into<String>) -> Self {
        let key_id = key_id.into();
        self.key_id = (!key_id.is_empty()).then_some(key_id);
        self
    }

    /// Region reported by [`ParameterClient::region`].
    ///
    /// Informational only: the store passed to [`ParameterClient::builder`]
    /// is already bound to its region. [`ParameterClient::from_config`] and
    /// the SSM backend both read it from the same `client.region` setting.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Timeout for each remote call, started afresh for every call.
    ///
    /// A call that runs out fails on its own and the remaining windows still
    /// run. The caller's context deadline stays the bound for the whole
    /// operation.
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ParameterClient<S>, ParameterError> {
        let batch_size = BatchSize::new(self.batch_size)?;
        Ok(ParameterClient {
            store: self.store,
            batch_size,
            with_decryption: self.with_decryption,
            key_id: self.key_id,
            region: self.region,
            call_timeout: self.call_timeout,
        })
    }
}

impl<S: ?Sized> ParameterClient<S> {
    pub fn builder(store: Arc<S>) -> ParameterClientBuilder<S> {
        ParameterClientBuilder {
            store,
            batch_size: BatchSize::default().get(),
            with_decryption: false,
            key_id: None,
            region: "ap-southeast-2".to_string(),
            call_timeout: None,
        }
    }

    /// Builds a client from the `client` section of a loaded configuration.
    pub fn from_config(store: Arc<S>, config: &ClientConfig) -> Result<Self, ParameterError> {
        let settings = &config.client;
        let mut builder = Self::builder(store)
            .batch_size(settings.batch_size)
            .with_decryption(settings.with_decryption)
            .region(settings.region.clone());
        if let Some(key_id) = &settings.key_id {
            builder = builder.key_id(key_id.clone());
        }
        if let Some(timeout) = settings.call_timeout() {
            builder = builder.call_timeout(timeout);
        }
        builder.build()
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn batch_size(&self) -> BatchSize {
        self.batch_size
    }

    pub fn with_decryption(&self) -> bool {
        self.with_decryption
    }

    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// Region this client was configured for. Not used to route calls.
    pub fn region(&self) -> &str {
        &self.region
    }

    fn scoped(&self, ctx: &CallContext) -> CallContext {
        match self.call_timeout {
            Some(timeout) => ctx.clone().with_call_timeout(timeout),
            None => ctx.clone(),
        }
    }
}

impl<S> ParameterClient<S>
where
    S: ParameterStore + ?Sized,
{
    /// Fetches a single parameter.
    ///
    /// An unknown name is an error carrying exactly one invalid-parameter
    /// entry.
    #[instrument(skip(self, ctx))]
    pub async fn get(&self, ctx: &CallContext, name: &str) -> Result<Parameter, BatchError> {
        let names = [name.to_string()];
        let items = self.get_multiple(ctx, &names).await.into_result()?;
        items
            .into_iter()
            .next()
            .ok_or_else(|| ParameterError::invalid(name).into())
    }

    /// Fetches every name, `batch_size` names per call.
    ///
    /// Results keep the store's order within each window. Names the store
    /// cannot resolve are left out and reported in the outcome's errors.
    #[instrument(skip(self, ctx, names), fields(count = names.len()))]
    pub async fn get_multiple(&self, ctx: &CallContext, names: &[String]) -> BatchOutcome<Parameter> {
        let ctx = self.scoped(ctx);
        BatchExecutor::new(&*self.store, self.batch_size, &ctx)
            .fetch(names, self.with_decryption)
            .await
    }

    /// Writes each parameter with its own call, forwarding the configured
    /// key id.
    #[instrument(skip(self, ctx, parameters), fields(count = parameters.len()))]
    pub async fn put(&self, ctx: &CallContext, parameters: &[Parameter]) -> Result<(), BatchError> {
        let ctx = self.scoped(ctx);
        let outcome = BatchExecutor::new(&*self.store, self.batch_size, &ctx)
            .write(parameters, self.key_id.as_deref())
            .await;
        debug!(written = outcome.items.len(), "put finished");
        outcome.errors.into_result()
    }

    /// Deletes every name, `batch_size` names per call.
    #[instrument(skip(self, ctx, names), fields(count = names.len()))]
    pub async fn delete(&self, ctx: &CallContext, names: &[String]) -> Result<(), BatchError> {
        let ctx = self.scoped(ctx);
        let outcome = BatchExecutor::new(&*self.store, self.batch_size, &ctx)
            .delete(names)
            .await;
        debug!(deleted = outcome.items.len(), "delete finished");
        outcome.errors.into_result()
    }

    /// Returns false when the store reports the name invalid.
    #[instrument(skip(self, ctx))]
    pub async fn exists(&self, ctx: &CallContext, name: &str) -> Result<bool, ParameterError> {
        let ctx = self.scoped(ctx);
        let names = [name.to_string()];
        let result = ctx
            .run(self.store.fetch_by_names(&names, false))
            .await
            .map_err(|err| ParameterError::transport(&names, err))?;
        Ok(!result.parameters.is_empty())
    }

    /// Lists every parameter below `path`, following continuation tokens.
    #[instrument(skip(self, ctx))]
    pub async fn get_path(
        &self,
        ctx: &CallContext,
        path: &str,
        recursive: bool,
    ) -> Result<Vec<Parameter>, ParameterError> {
        if path.is_empty() {
            return Err(ParameterError::invalid(path));
        }

        let ctx = self.scoped(ctx);
        let mut query = PathQuery {
            path: path.to_string(),
            recursive,
            with_decryption: self.with_decryption,
            next_token: None,
        };
        let mut parameters = Vec::new();
        let mut pages = 0usize;

        loop {
            let page = ctx
                .run(self.store.fetch_by_path(&query))
                .await
                .map_err(|err| ParameterError::transport(std::slice::from_ref(&query.path), err))?;
            pages += 1;
            parameters.extend(page.parameters.into_iter().map(Parameter::from));

            match page.next_token {
                Some(token) => query.next_token = Some(token),
                None => break,
            }
        }

        debug!(pages, found = parameters.len(), "path listed");
        Ok(parameters)
    }

    /// Lists the whole hierarchy and keeps names matching a shell-style
    /// pattern.
    #[instrument(skip(self, ctx))]
    pub async fn glob(
        &self,
        ctx: &CallContext,
        pattern: &str,
    ) -> Result<Vec<Parameter>, ParameterError> {
        let pattern = PathPattern::new(pattern).map_err(|e| ParameterError::config(e.to_string()))?;
        let mut parameters = self.get_path(ctx, "/", true).await?;
        parameters.retain(|p| pattern.is_match(&p.name));
        Ok(parameters)
    }

    /// Fetches every mapped name in one batched read and builds a `T`.
    #[instrument(skip(self, ctx, mapping), fields(prefix = mapping.prefix()))]
    pub async fn decode<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        mapping: &ParameterMapping,
    ) -> Result<T, MappingError> {
        let parameters = self
            .get_multiple(ctx, &mapping.names())
            .await
            .into_result()?;
        mapping.from_parameters(&parameters)
    }

    /// Writes every mapped string field of `value`, overwriting.
    #[instrument(skip(self, ctx, mapping, value), fields(prefix = mapping.prefix()))]
    pub async fn encode<T: Serialize>(
        &self,
        ctx: &CallContext,
        mapping: &ParameterMapping,
        value: &T,
    ) -> Result<(), MappingError> {
        let parameters = mapping.to_parameters(value)?;
        self.put(ctx, &parameters).await?;
        Ok(())
    }
}
