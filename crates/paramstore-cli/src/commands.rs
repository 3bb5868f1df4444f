//! Subcommands of the `paramstore` binary.
//!
//! Each command prints one line per parameter (`name\tvalue\ttype`) to the
//! given writer. Partial results are printed before a failure is returned.

use std::io::Write;

use clap::Subcommand;
use paramstore_client::ParameterClient;
use paramstore_domain::{CallContext, Parameter, ParameterType};
use paramstore_storage::ParameterStore;
use tracing::info;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print parameters by name
    Get {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Write a single parameter
    Put {
        name: String,
        value: String,

        /// String, StringList or SecureString
        #[arg(short = 't', long = "type", default_value = "String")]
        parameter_type: ParameterType,

        /// Replace an existing value
        #[arg(long)]
        overwrite: bool,
    },

    /// Delete parameters by name
    Delete {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// List parameters below a path
    Ls {
        path: String,

        #[arg(short, long)]
        recursive: bool,
    },

    /// List parameters whose names match a shell-style pattern
    Glob { pattern: String },
}

/// Runs one command, writing results to `out`.
pub async fn run<S, W>(
    client: &ParameterClient<S>,
    ctx: &CallContext,
    command: Command,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: ParameterStore + ?Sized,
    W: Write,
{
    match command {
        Command::Get { names } => {
            let (parameters, error) = client.get_multiple(ctx, &names).await.into_parts();
            print_all(out, &parameters)?;
            if let Some(error) = error {
                return Err(error.into());
            }
        }
        Command::Put {
            name,
            value,
            parameter_type,
            overwrite,
        } => {
            let parameter = Parameter::new(name, value)
                .with_type(parameter_type)
                .with_overwrite(overwrite);
            client.put(ctx, std::slice::from_ref(&parameter)).await?;
            info!(name = %parameter.name, "parameter written");
        }
        Command::Delete { names } => {
            client.delete(ctx, &names).await?;
            info!(count = names.len(), "parameters deleted");
        }
        Command::Ls { path, recursive } => {
            let parameters = client.get_path(ctx, &path, recursive).await?;
            print_all(out, &parameters)?;
        }
        Command::Glob { pattern } => {
            let parameters = client.glob(ctx, &pattern).await?;
            print_all(out, &parameters)?;
        }
    }
    Ok(())
}

fn print_all<W: Write>(out: &mut W, parameters: &[Parameter]) -> std::io::Result<()> {
    for parameter in parameters {
        writeln!(out, "{parameter}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use paramstore_domain::BatchError;
    use paramstore_storage::{MemoryParameterStore, StoredParameter};
    use std::sync::Arc;

    #[derive(Parser, Debug)]
    struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("paramstore").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    fn client() -> ParameterClient<MemoryParameterStore> {
        let store = MemoryParameterStore::with_parameters([
            StoredParameter::new("/app/db/host", "db.internal", ParameterType::String),
            StoredParameter::new("/app/db/password", "hunter2", ParameterType::SecureString),
            StoredParameter::new("/app/name", "svc", ParameterType::String),
        ]);
        ParameterClient::builder(Arc::new(store))
            .with_decryption(true)
            .build()
            .unwrap()
    }

    async fn run_to_string(
        client: &ParameterClient<MemoryParameterStore>,
        args: &[&str],
    ) -> (String, anyhow::Result<()>) {
        let mut out = Vec::new();
        let result = run(client, &CallContext::new(), parse(args), &mut out).await;
        (String::from_utf8(out).unwrap(), result)
    }

    #[test]
    fn test_parse_put_with_type() {
        assert_eq!(
            parse(&["put", "/a", "x", "--type", "SecureString", "--overwrite"]),
            Command::Put {
                name: "/a".to_string(),
                value: "x".to_string(),
                parameter_type: ParameterType::SecureString,
                overwrite: true,
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_type_and_missing_names() {
        let cli = |args: &[&str]| {
            Cli::try_parse_from(std::iter::once("paramstore").chain(args.iter().copied()))
        };
        assert!(cli(&["put", "/a", "x", "--type", "Blob"]).is_err());
        assert!(cli(&["get"]).is_err());
    }

    #[tokio::test]
    async fn test_get_prints_found_and_fails_on_missing() {
        let client = client();

        let (output, result) = run_to_string(&client, &["get", "/app/name", "/nope"]).await;

        assert_eq!(output, "/app/name\tsvc\tString\n");
        let err = result.unwrap_err();
        let batch = err.downcast_ref::<BatchError>().expect("batch error");
        assert_eq!(batch.invalid_names().collect::<Vec<_>>(), ["/nope"]);
    }

    #[tokio::test]
    async fn test_put_then_ls() {
        let client = client();

        let (_, result) = run_to_string(&client, &["put", "/app/region", "eu-west-1"]).await;
        result.unwrap();

        let (output, result) = run_to_string(&client, &["ls", "/app"]).await;
        result.unwrap();
        assert_eq!(output, "/app/name\tsvc\tString\n/app/region\teu-west-1\tString\n");
    }

    #[tokio::test]
    async fn test_glob_masks_secure_values() {
        let client = client();

        let (output, result) = run_to_string(&client, &["glob", "/app/db/*"]).await;

        result.unwrap();
        assert_eq!(
            output,
            "/app/db/host\tdb.internal\tString\n/app/db/password\t***\tSecureString\n"
        );
    }

    #[tokio::test]
    async fn test_delete_removes_parameters() {
        let client = client();

        let (_, result) = run_to_string(&client, &["delete", "/app/name", "/app/db/host"]).await;
        result.unwrap();

        assert_eq!(client.store().len(), 1);
    }
}
