use clap::{Parser, Subcommand};
use fitgate_core::{from_json, from_yaml, to_json_pretty};
use fitgate_extender::{filter_args, AppState, Config, ExtenderArgs, ExtenderServer, TlsMode};
use fitgate_scheduler::{default_registry, FilterConfig, FilterService, PredicateErrorPolicy};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "fitgate", about = "Fitgate kube-scheduler filter extender")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true, env = "FITGATE_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the filter verb over HTTP(S)
    Serve {
        /// Address to listen on
        #[arg(long, env = "FITGATE_BIND", default_value = "0.0.0.0:8888")]
        bind: String,
        /// Path prefix in front of the filter verb
        #[arg(long, env = "FITGATE_URL_PREFIX", default_value = "")]
        url_prefix: String,
        #[command(flatten)]
        filter: FilterArgs,
        /// PEM certificate chain to serve
        #[arg(long, env = "FITGATE_TLS_CERT", requires = "tls_key")]
        tls_cert: Option<PathBuf>,
        /// PEM private key matching the certificate
        #[arg(long, env = "FITGATE_TLS_KEY", requires = "tls_cert")]
        tls_key: Option<PathBuf>,
        /// Serve a self-signed certificate for these subject alternative names
        #[arg(long, value_delimiter = ',', conflicts_with = "tls_cert")]
        tls_self_signed: Vec<String>,
    },
    /// Print the predicates in evaluation order
    Predicates,
    /// Filter an ExtenderArgs document (JSON or YAML) and print the result
    Check {
        /// Path to the document
        file: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Maximum number of tasks evaluating the nodes of one call
    #[arg(long, env = "FITGATE_PARALLELISM", default_value_t = 1)]
    parallelism: usize,
    /// What to do when a predicate cannot evaluate a node (fail-call, reject-node)
    #[arg(long, env = "FITGATE_ON_PREDICATE_ERROR", default_value_t = PredicateErrorPolicy::FailCall)]
    on_predicate_error: PredicateErrorPolicy,
}

impl FilterArgs {
    fn to_config(&self) -> FilterConfig {
        FilterConfig {
            parallelism: self.parallelism.max(1),
            on_predicate_error: self.on_predicate_error,
        }
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_json);

    match cli.command {
        Commands::Serve {
            bind,
            url_prefix,
            filter,
            tls_cert,
            tls_key,
            tls_self_signed,
        } => {
            let tls = match (tls_cert, tls_key) {
                (Some(cert_path), Some(key_path)) => TlsMode::Provided {
                    cert_path,
                    key_path,
                },
                _ if !tls_self_signed.is_empty() => TlsMode::SelfSigned {
                    san_entries: tls_self_signed,
                },
                _ => TlsMode::Disabled,
            };
            run_serve(&bind, url_prefix, filter.to_config(), tls).await
        }
        Commands::Predicates => print_predicates(),
        Commands::Check { file, filter } => run_check(&file, filter.to_config()).await,
    }
}

/// Initialize tracing, honouring RUST_LOG
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Build the filter service over the built-in predicates
fn create_service(config: FilterConfig) -> miette::Result<FilterService> {
    let registry = default_registry()
        .map_err(|e| miette::Report::new(e).wrap_err("Invalid predicate registry"))?;

    Ok(FilterService::new(Arc::new(registry), config))
}

/// Run the extender until ctrl-c
async fn run_serve(
    bind: &str,
    url_prefix: String,
    filter: FilterConfig,
    tls: TlsMode,
) -> miette::Result<()> {
    let listen_addr: SocketAddr = bind
        .parse()
        .map_err(|e| miette::miette!("Invalid bind address '{}': {}", bind, e))?;

    let service = create_service(filter)?;
    info!(
        "Starting fitgate with predicates {:?} (parallelism {}, on predicate error: {})",
        service.registry().evaluation_order(),
        service.config().parallelism,
        service.config().on_predicate_error
    );

    let config = Config {
        listen_addr,
        url_prefix,
        tls,
    };
    let server = ExtenderServer::new(config, Arc::new(AppState::with_service(service)));

    let token = CancellationToken::new();
    let server_token = token.clone();
    let mut server_handle = tokio::spawn(async move { server.run(server_token).await });

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.map_err(|e| miette::miette!("Failed to listen for ctrl-c: {}", e))?;
        }
        joined = &mut server_handle => {
            // Server stopped on its own, e.g. the address was taken
            return server_exit(joined);
        }
    }

    info!("Shutting down gracefully...");
    token.cancel();

    let shutdown_timeout = std::time::Duration::from_secs(10);
    match tokio::time::timeout(shutdown_timeout, server_handle).await {
        Ok(joined) => server_exit(joined)?,
        Err(_) => error!("Extender did not stop within {:?}", shutdown_timeout),
    }

    info!("Shutdown complete");

    Ok(())
}

/// Flatten the outcome of the server task
fn server_exit(
    joined: std::result::Result<miette::Result<()>, tokio::task::JoinError>,
) -> miette::Result<()> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            error!("Extender server error: {:?}", e);
            Err(e)
        }
        Err(e) => Err(miette::miette!("Extender server task failed: {}", e)),
    }
}

/// Print the evaluation order of the built-in predicates
fn print_predicates() -> miette::Result<()> {
    let service = create_service(FilterConfig::default())?;

    for (position, name) in service.registry().evaluation_order().iter().enumerate() {
        println!("{}. {}", position + 1, name);
    }

    Ok(())
}

/// Filter a document offline and print the extender response
async fn run_check(file: &Path, filter: FilterConfig) -> miette::Result<()> {
    let data = std::fs::read_to_string(file)
        .map_err(|e| miette::miette!("Failed to read '{}': {}", file.display(), e))?;

    let args: ExtenderArgs = if is_yaml(file) {
        from_yaml(&data)?
    } else {
        from_json(&data)?
    };

    let service = create_service(filter)?;
    let result = filter_args(&service, args)
        .await
        .map_err(|e| miette::miette!("{}", e))?;

    println!("{}", to_json_pretty(&result)?);

    if result.is_error() {
        return Err(miette::miette!("Filter call failed: {}", result.error));
    }

    Ok(())
}

fn is_yaml(file: &Path) -> bool {
    matches!(
        file.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_serve() {
        let cli = Cli::try_parse_from([
            "fitgate",
            "serve",
            "--bind",
            "127.0.0.1:9000",
            "--parallelism",
            "4",
            "--on-predicate-error",
            "reject-node",
        ])
        .unwrap();

        match cli.command {
            Commands::Serve { bind, filter, .. } => {
                assert_eq!(bind, "127.0.0.1:9000");
                let config = filter.to_config();
                assert_eq!(config.parallelism, 4);
                assert_eq!(config.on_predicate_error, PredicateErrorPolicy::RejectNode);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_policy() {
        let result = Cli::try_parse_from(["fitgate", "check", "args.json", "--on-predicate-error", "ignore"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_is_yaml() {
        assert!(is_yaml(Path::new("args.yaml")));
        assert!(is_yaml(Path::new("args.yml")));
        assert!(!is_yaml(Path::new("args.json")));
    }

    #[test]
    fn test_create_service_uses_default_registry() {
        let service = create_service(FilterConfig::default()).unwrap();
        assert_eq!(service.registry().evaluation_order(), &["AVX"]);
    }
}
