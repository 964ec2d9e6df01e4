// # homedns
//
// Update a Linode managed DNS A record with the system's public IP address.
//
// This binary is a THIN integration layer: it parses flags, sets up
// logging, registers the built-in providers and resolvers, and runs one
// `SyncEngine` pass. All sync logic lives in homedns-core.
//
// ## Usage
//
// ```bash
// homedns -key $LINODE_API_KEY -domain example.com -name home -verbose
// ```
//
// Flags may be written with one dash (`-key`) or two (`--key`). The
// required flags also fall back to environment variables:
//
// - `HOMEDNS_API_KEY`: Linode API key
// - `HOMEDNS_DOMAIN`: DNS domain name
// - `HOMEDNS_NAME`: DNS A record name
// - `HOMEDNS_RESOLVER`: Public-IP resolver (http, dns)
// - `HOMEDNS_LOG_LEVEL`: Log level when not verbose (default: warn)
//
// Typically run from cron or a systemd timer; every run is independent.

use anyhow::Context;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use homedns_core::config::{DEFAULT_TIMEOUT_SECS, ProviderConfig, ResolverConfig, SyncConfig};
use homedns_core::{ProviderRegistry, SyncEngine, SyncOutcome};
use std::env;
use std::process::ExitCode;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Record created, updated or already correct
/// - 1: Configuration or startup error, nothing was sent
/// - 2: Resolution, lookup or reconcile failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HomednsExitCode {
    Success = 0,
    ConfigError = 1,
    SyncFailed = 2,
}

impl HomednsExitCode {
    /// Exit code for a failed run
    fn for_error(err: &homedns_core::Error) -> Self {
        if err.is_config() {
            HomednsExitCode::ConfigError
        } else {
            HomednsExitCode::SyncFailed
        }
    }
}

impl From<HomednsExitCode> for ExitCode {
    fn from(code: HomednsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Long flag names accepted with a single dash
const KNOWN_FLAGS: &[&str] = &[
    "key", "domain", "name", "verbose", "help", "resolver", "ip-url", "timeout", "api-url",
];

/// Public-IP discovery strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ResolverKind {
    /// Scrape an HTTP echo page
    Http,
    /// Ask Google's nameserver for a TXT record
    Dns,
}

/// Command-line flags
#[derive(Debug, Parser)]
#[command(
    name = "homedns",
    version,
    about = "homedns is a utility to update a Linode managed DNS A record with the system's public IP address.",
    after_help = "Flags may be given with one or two dashes, e.g. -key or --key."
)]
struct Cli {
    /// Linode API key, required
    #[arg(long, env = "HOMEDNS_API_KEY", hide_env_values = true)]
    key: Option<String>,

    /// DNS Domain name, required
    #[arg(long, env = "HOMEDNS_DOMAIN")]
    domain: Option<String>,

    /// DNS A Record name, required
    #[arg(long, env = "HOMEDNS_NAME")]
    name: Option<String>,

    /// Enable verbose logging
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    verbose: bool,

    /// How to discover the public IP
    #[arg(long, value_enum, env = "HOMEDNS_RESOLVER", default_value_t = ResolverKind::Http)]
    resolver: ResolverKind,

    /// Echo page for the http resolver
    #[arg(long = "ip-url")]
    ip_url: Option<String>,

    /// Timeout for each network call, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Linode API endpoint override
    #[arg(long = "api-url")]
    api_url: Option<String>,
}

impl Cli {
    /// Names of the required flags that were not given, in flag order
    fn missing_parameters(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.key.as_deref().is_none_or(str::is_empty) {
            missing.push("key");
        }
        if self.domain.as_deref().is_none_or(str::is_empty) {
            missing.push("domain");
        }
        if self.name.as_deref().is_none_or(str::is_empty) {
            missing.push("name");
        }
        missing
    }

    /// Build the immutable run configuration
    fn to_config(&self) -> homedns_core::Result<SyncConfig> {
        let missing = self.missing_parameters();
        if !missing.is_empty() {
            return Err(homedns_core::Error::config(format!(
                "missing required parameters: {}",
                missing.join(", ")
            )));
        }

        let resolver = match (self.resolver, &self.ip_url) {
            (ResolverKind::Http, Some(url)) => ResolverConfig::Http { url: url.clone() },
            (ResolverKind::Http, None) => ResolverConfig::http(),
            (ResolverKind::Dns, None) => ResolverConfig::dns_txt(),
            (ResolverKind::Dns, Some(_)) => {
                return Err(homedns_core::Error::config(
                    "-ip-url only applies to -resolver http",
                ));
            }
        };

        let provider = ProviderConfig::Linode {
            api_key: self.key.clone().unwrap_or_default(),
            endpoint: self.api_url.clone(),
        };

        let config = SyncConfig::new(
            self.domain.clone().unwrap_or_default(),
            self.name.clone().unwrap_or_default(),
            provider,
        )
        .with_resolver(resolver)
        .with_timeout_secs(self.timeout);

        config.validate()?;
        Ok(config)
    }
}

/// Rewrite Go-style single-dash long flags (`-key`, `-key=v`) to `--key`
///
/// Only known flag names are rewritten, so values that happen to start
/// with a dash are left alone.
fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || arg.starts_with("--") {
                return arg;
            }
            let Some(flag) = arg.strip_prefix('-') else {
                return arg;
            };
            let name = flag.split('=').next().unwrap_or_default();
            if KNOWN_FLAGS.contains(&name) {
                format!("-{}", arg)
            } else {
                arg
            }
        })
        .collect()
}

fn log_level(verbose: bool) -> Level {
    if verbose {
        return Level::DEBUG;
    }

    match env::var("HOMEDNS_LOG_LEVEL")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

fn init_tracing(level: Level) -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn build_registry() -> ProviderRegistry {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "linode")]
    homedns_provider_linode::register(&registry);

    #[cfg(feature = "http")]
    homedns_ip_http::register(&registry);

    #[cfg(feature = "dns")]
    homedns_ip_dns::register(&registry);

    debug!(
        "Registered providers {:?}, resolvers {:?}",
        registry.list_providers(),
        registry.list_resolvers()
    );
    registry
}

/// Run one sync pass
async fn run_sync(config: SyncConfig) -> homedns_core::Result<SyncOutcome> {
    let registry = build_registry();

    let resolver = registry.create_resolver(&config.resolver, config.timeout())?;
    let provider = registry.create_provider(&config.provider, config.timeout())?;

    debug!(
        "Managing {} via {} (resolver: {})",
        config.fqdn(),
        provider.provider_name(),
        resolver.resolver_name()
    );

    let engine = SyncEngine::new(resolver, provider, config)?;
    engine.run().await
}

/// Print the outcome of a run and pick the exit code
fn report(result: homedns_core::Result<SyncOutcome>) -> HomednsExitCode {
    match result {
        Ok(outcome) => {
            println!("{}", outcome.summary());
            HomednsExitCode::Success
        }
        Err(homedns_core::Error::Config(msg)) => {
            eprintln!("Error: {}", msg);
            HomednsExitCode::ConfigError
        }
        Err(e) => {
            debug!("Sync failed: {:?}", e);
            eprintln!("{}", e);
            HomednsExitCode::for_error(&e)
        }
    }
}

/// Validate the flags, then run one sync pass
///
/// Nothing is sent over the network unless the flags form a valid
/// configuration.
async fn run(cli: &Cli) -> HomednsExitCode {
    let config = match cli.to_config() {
        Ok(cfg) => cfg,
        Err(e) => return report(Err(e)),
    };

    report(run_sync(config).await)
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(env::args()));

    if let Err(e) = init_tracing(log_level(cli.verbose)) {
        eprintln!("{:#}", e);
        return HomednsExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{:#}", e);
            return HomednsExitCode::ConfigError.into();
        }
    };

    rt.block_on(run(&cli)).into()
}
