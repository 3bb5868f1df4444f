//! AWS Systems Manager Parameter Store implementation.
//!
//! Thin translation between the [`ParameterStore`] port and `aws-sdk-ssm`.
//! Credentials come from the default AWS provider chain; the region is taken
//! from [`SsmConfig`] so one process can talk to several regions.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ssm::types::{Parameter, ParameterType as SsmParameterType};
use aws_sdk_ssm::Client;
use tracing::{debug, instrument, warn};

use crate::error::{StorageError, StorageResult};
use crate::traits::{
    validate_batch, validate_name, DeleteResult, FetchResult, ParameterStore, ParameterType,
    PathPage, PathQuery, StoredParameter, WriteRequest,
};

/// Configuration for the SSM backend.
#[derive(Debug, Clone)]
pub struct SsmConfig {
    /// AWS region hosting the parameters.
    pub region: String,
    /// Endpoint override, e.g. for a local emulator.
    pub endpoint_url: Option<String>,
}

impl Default for SsmConfig {
    fn default() -> Self {
        Self {
            region: "ap-southeast-2".to_string(),
            endpoint_url: None,
        }
    }
}

/// ParameterStore backed by AWS SSM Parameter Store.
#[derive(Debug, Clone)]
pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
    /// Builds a store from the default AWS configuration chain.
    pub async fn from_config(config: &SsmConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;
        debug!(region = %config.region, "ssm client configured");
        Self::from_client(Client::new(&sdk_config))
    }

    /// Wraps an already configured SDK client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

/// Maps an SDK failure onto the storage error taxonomy.
///
/// `name` is the parameter the request was about, for single-name calls.
fn map_sdk_error<E, R>(err: SdkError<E, R>, name: Option<&str>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            StorageError::ConnectionError { message }
        }
        SdkError::ServiceError(service) => match service.err().code() {
            Some("ThrottlingException") | Some("TooManyUpdates") => {
                StorageError::Throttled { message }
            }
            Some("AccessDeniedException") => StorageError::AccessDenied { message },
            Some("ParameterAlreadyExists") => StorageError::ParameterAlreadyExists {
                name: name.unwrap_or_default().to_string(),
            },
            Some("ValidationException") => StorageError::InvalidInput { message },
            _ => StorageError::ServiceError { message },
        },
        _ => StorageError::ServiceError { message },
    }
}

fn from_ssm_type(ty: Option<&SsmParameterType>) -> ParameterType {
    match ty {
        Some(SsmParameterType::StringList) => ParameterType::StringList,
        Some(SsmParameterType::SecureString) => ParameterType::SecureString,
        Some(SsmParameterType::String) => ParameterType::String,
        other => {
            warn!(parameter_type = ?other, "unrecognized parameter type, treating as String");
            ParameterType::String
        }
    }
}

fn to_ssm_type(ty: ParameterType) -> SsmParameterType {
    match ty {
        ParameterType::String => SsmParameterType::String,
        ParameterType::StringList => SsmParameterType::StringList,
        ParameterType::SecureString => SsmParameterType::SecureString,
    }
}

fn from_ssm_parameter(parameter: &Parameter) -> Option<StoredParameter> {
    Some(StoredParameter {
        name: parameter.name()?.to_string(),
        value: parameter.value().map(str::to_string),
        parameter_type: from_ssm_type(parameter.r#type()),
    })
}

/// Converts a page of SDK parameters, skipping any without a name.
fn collect_parameters(parameters: &[Parameter]) -> Vec<StoredParameter> {
    parameters
        .iter()
        .filter_map(|parameter| {
            let stored = from_ssm_parameter(parameter);
            if stored.is_none() {
                warn!(
                    parameter_type = ?parameter.r#type(),
                    "skipping parameter without a name"
                );
            }
            stored
        })
        .collect()
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    #[instrument(skip(self), fields(count = names.len()))]
    async fn fetch_by_names(
        &self,
        names: &[String],
        with_decryption: bool,
    ) -> StorageResult<FetchResult> {
        validate_batch(names)?;

        let output = self
            .client
            .get_parameters()
            .set_names(Some(names.to_vec()))
            .with_decryption(with_decryption)
            .send()
            .await
            .map_err(|err| map_sdk_error(err, None))?;

        Ok(FetchResult {
            parameters: collect_parameters(output.parameters()),
            invalid_names: output.invalid_parameters().to_vec(),
        })
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn write_one(&self, request: &WriteRequest) -> StorageResult<()> {
        validate_name(&request.name)?;

        self.client
            .put_parameter()
            .name(&request.name)
            .value(&request.value)
            .r#type(to_ssm_type(request.parameter_type))
            .overwrite(request.overwrite)
            .set_key_id(request.key_id.clone())
            .send()
            .await
            .map_err(|err| map_sdk_error(err, Some(&request.name)))?;
        Ok(())
    }

    #[instrument(skip(self), fields(count = names.len()))]
    async fn delete_by_names(&self, names: &[String]) -> StorageResult<DeleteResult> {
        validate_batch(names)?;

        let output = self
            .client
            .delete_parameters()
            .set_names(Some(names.to_vec()))
            .send()
            .await
            .map_err(|err| map_sdk_error(err, None))?;

        Ok(DeleteResult {
            deleted_names: output.deleted_parameters().to_vec(),
            invalid_names: output.invalid_parameters().to_vec(),
        })
    }

    #[instrument(skip(self, query), fields(path = %query.path, recursive = query.recursive))]
    async fn fetch_by_path(&self, query: &PathQuery) -> StorageResult<PathPage> {
        let output = self
            .client
            .get_parameters_by_path()
            .path(&query.path)
            .recursive(query.recursive)
            .with_decryption(query.with_decryption)
            .set_next_token(query.next_token.clone())
            .send()
            .await
            .map_err(|err| map_sdk_error(err, None))?;

        Ok(PathPage {
            parameters: collect_parameters(output.parameters()),
            next_token: output.next_token().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ssm::error::ErrorMetadata;
    use aws_sdk_ssm::operation::put_parameter::PutParameterError;

    #[test]
    fn test_parameter_type_mapping_is_symmetric() {
        for ty in [
            ParameterType::String,
            ParameterType::StringList,
            ParameterType::SecureString,
        ] {
            assert_eq!(from_ssm_type(Some(&to_ssm_type(ty))), ty);
        }
        assert_eq!(from_ssm_type(None), ParameterType::String);
    }

    #[test]
    fn test_missing_value_stays_absent() {
        let parameter = Parameter::builder()
            .name("/empty")
            .r#type(SsmParameterType::String)
            .build();
        let stored = from_ssm_parameter(&parameter).unwrap();
        assert_eq!(stored.name, "/empty");
        assert!(stored.value.is_none());
    }

    #[test]
    fn test_nameless_parameter_is_skipped() {
        let parameters = [
            Parameter::builder()
                .value("orphan")
                .r#type(SsmParameterType::String)
                .build(),
            Parameter::builder()
                .name("/app/name")
                .value("svc")
                .r#type(SsmParameterType::String)
                .build(),
        ];

        let stored = collect_parameters(&parameters);

        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "/app/name");
        assert_eq!(stored[0].value.as_deref(), Some("svc"));
    }

    #[test]
    fn test_already_exists_names_the_requested_parameter() {
        let err = SdkError::service_error(
            PutParameterError::generic(
                ErrorMetadata::builder()
                    .code("ParameterAlreadyExists")
                    .message("The parameter already exists.")
                    .build(),
            ),
            (),
        );

        assert_eq!(
            map_sdk_error(err, Some("/app/db/host")),
            StorageError::ParameterAlreadyExists {
                name: "/app/db/host".to_string()
            }
        );
    }

    #[test]
    fn test_service_codes_map_to_storage_errors() {
        let service_error = |code: &str| {
            SdkError::service_error(
                PutParameterError::generic(ErrorMetadata::builder().code(code).build()),
                (),
            )
        };

        assert!(matches!(
            map_sdk_error(service_error("ThrottlingException"), None),
            StorageError::Throttled { .. }
        ));
        assert!(matches!(
            map_sdk_error(service_error("AccessDeniedException"), None),
            StorageError::AccessDenied { .. }
        ));
        assert!(matches!(
            map_sdk_error(service_error("InternalServerError"), None),
            StorageError::ServiceError { .. }
        ));
    }
}
