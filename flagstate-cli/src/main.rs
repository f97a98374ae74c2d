mod config;
mod watch;

use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use flagstate_lib::{
    FeatureFlagClient, FlagState, FlightClient, LatestFlagsSource, RefreshService, User,
    ADMIN_ROLE,
};
use regex::Regex;
use tracing_subscriber::EnvFilter;

use config::{FlagstateConfig, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(name = "flagstate")]
#[command(version)]
#[command(about = "Inspect and evaluate feature flag snapshots", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short = 'c', long = "config", global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Read snapshots from this JSON file
    #[arg(short = 'f', long = "file", global = true)]
    file: Option<String>,

    /// Fetch snapshots from this URL
    #[arg(short = 'u', long = "url", global = true)]
    url: Option<String>,

    /// Bearer token sent with URL fetches
    #[arg(long = "token", global = true, env = "FLAGSTATE_TOKEN")]
    token: Option<String>,

    /// Log at debug level regardless of RUST_LOG
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a snapshot file and print a summary
    Validate {
        /// Path to the snapshot file to validate
        path: String,
        /// Also print the snapshot in canonical form
        #[arg(short, long)]
        print: bool,
    },
    /// Fetch once and list features and flights
    List {
        /// Only show names matching this regular expression
        #[arg(short = 's', long = "filter")]
        filter: Option<String>,
    },
    /// Fetch once and evaluate a feature
    Feature {
        /// Feature name (case-sensitive)
        name: String,

        /// Report enabled when the feature's status is unknown
        #[arg(short = 'd', long = "default")]
        default: bool,
    },
    /// Fetch once and evaluate a flight for a user
    Flight {
        /// Flight name (case-sensitive)
        name: String,

        /// Account identifier of the user
        #[arg(short = 'a', long = "account")]
        account: String,

        /// Email address of the user
        #[arg(short = 'e', long = "email")]
        email: Option<String>,

        /// Treat the user as a site administrator
        #[arg(long = "admin")]
        admin: bool,

        /// Report enabled when the flight's status is unknown
        #[arg(short = 'd', long = "default")]
        default: bool,
    },
    /// Keep refreshing and print the snapshot status until Ctrl-C
    Watch,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_service(config: &FlagstateConfig) -> Arc<RefreshService> {
    let gateway = match config.gateway() {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("Invalid snapshot source: {}", e);
            process::exit(1);
        }
    };

    match RefreshService::builder()
        .gateway(gateway)
        .options(config.refresh.clone())
        .build()
    {
        Ok(service) => Arc::new(service),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn validation_report(flags: &FlagState, print: bool) -> String {
    let mut report = format!(
        "{} features, {} flights\nfingerprint: {}",
        flags.features().len(),
        flags.flights().len(),
        flags.fingerprint()
    );
    if print {
        report.push('\n');
        report.push_str(&flags.to_json_pretty());
    }
    report
}

fn run_validate(path: &str, print: bool) {
    let content = match std::fs::read(path) {
        Ok(content) => content,
        Err(_) => {
            eprintln!("{} does not exist", path);
            process::exit(1);
        }
    };

    match FlagState::from_json(&content) {
        Ok(flags) => println!("{}", validation_report(&flags, print)),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

async fn run_list(service: Arc<RefreshService>, filter: Option<&str>) {
    let pattern = match filter.map(Regex::new).transpose() {
        Ok(pattern) => pattern,
        Err(e) => {
            eprintln!("Invalid filter: {}", e);
            process::exit(1);
        }
    };
    let matches = |name: &str| pattern.as_ref().map_or(true, |re| re.is_match(name));

    if service.refresh_once().await.is_err() {
        process::exit(1);
    }
    let latest = service.latest_flags();
    let Some(flags) = latest.flags() else {
        process::exit(1);
    };

    println!("Features:");
    for (name, status) in flags.features().iter().filter(|(n, _)| matches(n.as_str())) {
        println!("  {} = {}", name, status);
    }

    println!("Flights:");
    for (name, flight) in flags.flights().iter().filter(|(n, _)| matches(n.as_str())) {
        let mut rules = Vec::new();
        if flight.enabled_for_all {
            rules.push("all".to_string());
        }
        if flight.enabled_for_site_admins {
            rules.push("site admins".to_string());
        }
        if !flight.enabled_accounts.is_empty() {
            let accounts: Vec<&str> = flight.enabled_accounts.iter().map(String::as_str).collect();
            rules.push(format!("accounts [{}]", accounts.join(", ")));
        }
        if !flight.enabled_domains.is_empty() {
            let domains: Vec<&str> = flight.enabled_domains.iter().map(String::as_str).collect();
            rules.push(format!("domains [{}]", domains.join(", ")));
        }
        if rules.is_empty() {
            rules.push("nobody".to_string());
        }
        println!("  {} -> {}", name, rules.join(", "));
    }
}

async fn run_feature(service: Arc<RefreshService>, name: &str, default: bool) {
    // On failure the client reports Unknown, which is what we want to show.
    let _ = service.refresh_once().await;

    let client = FeatureFlagClient::new(service);
    println!("{}: {:?}", name, client.evaluate(name));
    println!("enabled (default {}): {}", default, client.is_enabled(name, default));
}

async fn run_flight(service: Arc<RefreshService>, name: &str, user: &User, default: bool) {
    let _ = service.refresh_once().await;

    let client = FlightClient::new(service);
    println!("{} for {}: {:?}", name, user.account, client.evaluate(name, user));
    println!(
        "enabled (default {}): {}",
        default,
        client.is_enabled(name, user, default)
    );
}

#[tokio::main]
async fn main() {
    let cli = Args::parse();
    init_tracing(cli.verbose);

    let mut config = FlagstateConfig::load(&cli.config);
    config.apply_env_overrides();
    config.apply_cli_overrides(cli.file, cli.url, cli.token);

    match cli.cmd {
        Command::Validate { path, print } => run_validate(&path, print),
        Command::List { filter } => run_list(build_service(&config), filter.as_deref()).await,
        Command::Feature { name, default } => {
            run_feature(build_service(&config), &name, default).await
        }
        Command::Flight {
            name,
            account,
            email,
            admin,
            default,
        } => {
            let mut user = User::new(&account);
            if let Some(email) = email {
                user = user.with_email(&email);
            }
            if admin {
                user = user.with_role(ADMIN_ROLE);
            }
            run_flight(build_service(&config), &name, &user, default).await
        }
        Command::Watch => watch::run_watch(build_service(&config)).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagstate_lib::{FeatureStatus, FlightState};

    fn flags() -> FlagState {
        FlagState::builder()
            .with_feature("Search", FeatureStatus::Enabled)
            .with_flight("Preview", FlightState::for_all())
            .build()
            .unwrap()
    }

    #[test]
    fn test_validation_report_summary() {
        let flags = flags();
        let report = validation_report(&flags, false);
        assert_eq!(
            report,
            format!("1 features, 1 flights\nfingerprint: {}", flags.fingerprint())
        );
    }

    #[test]
    fn test_validation_report_prints_canonical_json() {
        let flags = flags();
        let report = validation_report(&flags, true);
        let printed = report.splitn(3, '\n').nth(2).unwrap();
        assert_eq!(FlagState::from_json(printed.as_bytes()).unwrap(), flags);
    }
}
