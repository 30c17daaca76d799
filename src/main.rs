use clap::Parser;
use ghmirror::config;
use ghmirror::core::{CancelToken, MirrorError};
use ghmirror::github::client::DEFAULT_API_BASE;
use ghmirror::github::GithubClient;
use ghmirror::mirror::{sync_repository, DownloadEngine};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ghmirror")]
#[command(about = "Mirror GitHub repository releases to local storage")]
#[command(version)]
struct Cli {
    /// Directory for downloaded releases
    #[arg(long = "home-folder")]
    home: PathBuf,

    /// Config file of `{repo}, {count}, {type}` lines, type `all` or `stable`
    #[arg(long = "config")]
    config: PathBuf,

    /// Seconds to wait between repository passes
    #[arg(long = "sleep-between-repos", default_value_t = 5)]
    sleep_between_repos: u64,

    /// Minimum seconds between GitHub API requests
    #[arg(long = "request-interval", default_value_t = 5)]
    request_interval: u64,

    /// Minimum seconds between file downloads
    #[arg(long = "download-interval", default_value_t = 3)]
    download_interval: u64,

    /// GitHub API base URL
    #[arg(long = "api-base", default_value = DEFAULT_API_BASE, hide = true)]
    api_base: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Reject bad configuration before any network activity
    let policies = match config::load_policies(&cli.config) {
        Ok(policies) => policies,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if policies.is_empty() {
        warn!("Config {} contains no repositories", cli.config.display());
        return ExitCode::SUCCESS;
    }

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, finishing current file cleanup and exiting");
                cancel.cancel();
            }
            // The default handler was replaced; a second interrupt must
            // still be able to kill the process
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        });
    }

    let client = match GithubClient::new(&cli.api_base, Duration::from_secs(cli.request_interval)) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let engine = match DownloadEngine::new(Duration::from_secs(cli.download_interval), cancel.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut any_failure = false;
    let repo_count = policies.len();
    for (i, policy) in policies.iter().enumerate() {
        info!("Processing repository {}/{}: {}", i + 1, repo_count, policy.repo);

        match sync_repository(&client, &engine, &cli.home, policy).await {
            Ok(outcome) => {
                if !outcome.is_clean() {
                    any_failure = true;
                }
            }
            Err(MirrorError::Interrupted) => {
                error!("Interrupted, exiting");
                return ExitCode::FAILURE;
            }
            Err(e) => {
                // One repository's failure must not stop the others
                error!("{}: pass failed: {}", policy.repo, e);
                any_failure = true;
            }
        }

        if i + 1 != repo_count {
            info!("Sleeping for {} seconds", cli.sleep_between_repos);
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(cli.sleep_between_repos)) => {}
                _ = cancel.cancelled() => {
                    error!("Interrupted, exiting");
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    if any_failure {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
