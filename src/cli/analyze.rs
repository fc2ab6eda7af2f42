//! Analyze command implementation

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};

use crate::analytics;
use crate::classify::{select_classifier, Classifier};
use crate::config::{DEFAULT_BASE_DELAY, DEFAULT_LONG_DELAY};
use crate::fetcher::http::PlatformHttpClient;
use crate::fetcher::pacing::PacingConfig;
use crate::fetcher::profile::ProfileFetcher;
use crate::fetcher::retry::RetryPolicy;
use crate::output::{self, ProfileSummary};
use crate::report::render_report;
use crate::session::{Session, SessionManager};
use crate::shutdown::StopSignal;
use crate::{CollectionStatus, FetchLimits};

use super::{CliError, LoginArgs};

/// Parse a positive delay in seconds, fractional values allowed.
fn parse_delay_secs(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err("delay must be a positive number of seconds".to_string());
    }
    if value > 3600.0 {
        return Err("delay must be at most 3600 seconds".to_string());
    }
    Ok(value)
}

/// Profile analytics CLI
#[derive(Parser, Debug)]
#[command(name = "gramscope")]
#[command(about = "Scrape and analyze public social media profiles", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Account username for an authenticated session
    #[arg(long, global = true, env = "INSTA_USERNAME")]
    pub login_user: Option<String>,

    /// Account password, used only when no session artifact exists
    #[arg(long, global = true, env = "INSTA_PASSWORD", hide_env_values = true)]
    pub login_password: Option<String>,

    /// Gemini API key for category/location inference
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Directory holding persisted session artifacts
    #[arg(long, global = true, default_value = ".sessions")]
    pub session_dir: PathBuf,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, analyze, and export one or more profiles
    Analyze(AnalyzeArgs),

    /// Establish and persist a session artifact
    Login(LoginArgs),
}

/// Arguments for the analyze command
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Profile usernames to analyze (leading '@' is ignored)
    #[arg(required = true, num_args = 1..)]
    pub usernames: Vec<String>,

    /// Maximum posts to fetch per profile
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub max_posts: u32,

    /// Safety cap on follower and following entries each
    #[arg(long, default_value = "500", value_parser = clap::value_parser!(u32).range(0..=100_000))]
    pub max_follow: u32,

    /// Pause between fetched posts, in seconds
    #[arg(long, default_value = "2.0", value_parser = parse_delay_secs)]
    pub short_delay: f64,

    /// Posts between longer cool-down pauses
    #[arg(long, default_value = "20", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub long_break_every: u32,

    /// Maximum retries for failed requests
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(0..=10))]
    pub max_retries: u32,

    /// Root directory for per-profile export folders
    #[arg(long, default_value = "profiles")]
    pub output_dir: PathBuf,

    /// Skip writing export files
    #[arg(long, default_value_t = false)]
    pub no_export: bool,

    /// Suppress the per-profile report
    #[arg(long, default_value_t = false)]
    pub quiet: bool,

    /// Repeat the whole batch every N minutes
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=10_080))]
    pub schedule: Option<u64>,
}

impl AnalyzeArgs {
    /// Run the analyze command to completion.
    pub async fn execute(&self, cli: &Cli, stop: StopSignal) -> Result<(), CliError> {
        let session = acquire_session(cli).await;
        let classifier = select_classifier(cli.gemini_api_key.as_deref());

        loop {
            let (failed, total) = self.run_batch(&session, classifier.as_ref(), &stop).await;

            match self.schedule {
                Some(minutes) if !stop.is_triggered() => {
                    info!(minutes, "batch done, sleeping until next scheduled run");
                    tokio::select! {
                        _ = tokio::time::sleep(Duration::from_secs(minutes * 60)) => {}
                        _ = stop.triggered() => {}
                    }
                    if stop.is_triggered() {
                        return Ok(());
                    }
                }
                _ => {
                    if failed > 0 {
                        return Err(CliError::RunIncomplete { failed, total });
                    }
                    return Ok(());
                }
            }
        }
    }

    /// Analyze every requested profile once. Returns `(failed, total)`,
    /// where `failed` counts errored profiles and hard-failure truncations.
    /// Throttle and shutdown truncations are partial successes.
    async fn run_batch(
        &self,
        session: &Session,
        classifier: &dyn Classifier,
        stop: &StopSignal,
    ) -> (usize, usize) {
        let total = self.usernames.len();
        let mut summaries = Vec::new();
        let mut failed = 0usize;

        for (i, raw) in self.usernames.iter().enumerate() {
            if stop.is_triggered() {
                warn!(remaining = total - i, "stop requested, skipping remaining profiles");
                break;
            }

            let username = raw.trim_start_matches('@');
            info!(profile = i + 1, total, username, "analyzing profile");

            match self
                .analyze_one(username, session, classifier, stop)
                .await
            {
                Ok((summary, status)) => {
                    if status.is_hard_failure() {
                        failed += 1;
                    } else if let CollectionStatus::Truncated(reason) = &status {
                        warn!(
                            username,
                            reason = reason.describe(),
                            "collection truncated, keeping partial dataset"
                        );
                    }
                    summaries.push(summary);
                }
                Err(e) => {
                    error!(username, error = %e, "profile analysis failed");
                    failed += 1;
                }
            }
        }

        if summaries.len() > 1 && !self.no_export {
            match output::export_comparison(&self.output_dir, &summaries) {
                Ok(paths) => {
                    if !self.quiet {
                        println!("\nComparison exports:");
                        for path in paths {
                            println!("  - {}", path.display());
                        }
                    }
                }
                Err(e) => error!(error = %e, "comparison export failed"),
            }
        }

        (failed, total)
    }

    /// Fetch, analyze, classify, export, and report one profile.
    async fn analyze_one(
        &self,
        username: &str,
        session: &Session,
        classifier: &dyn Classifier,
        stop: &StopSignal,
    ) -> Result<(ProfileSummary, CollectionStatus), CliError> {
        let client = PlatformHttpClient::new(session)?;
        let progress = (!self.quiet).then(|| create_progress_bar(self.max_posts));

        let mut fetcher = ProfileFetcher::new(client)
            .with_retry_policy(RetryPolicy::new(self.max_retries, DEFAULT_BASE_DELAY))
            .with_pacing(PacingConfig {
                short_delay: Duration::from_secs_f64(self.short_delay),
                long_delay: DEFAULT_LONG_DELAY,
                long_break_every: self.long_break_every,
            })
            .with_follow_lists(session.is_authenticated())
            .with_stop_signal(stop.clone());
        if let Some(pb) = &progress {
            let pb = pb.clone();
            fetcher = fetcher.with_post_progress(Box::new(move |done, _target| {
                pb.set_position(done as u64)
            }));
        }

        let limits = FetchLimits {
            max_posts: self.max_posts,
            max_follow: self.max_follow,
        };
        let dataset = fetcher.fetch_profile(username, &limits).await;
        if let Some(pb) = &progress {
            pb.finish_and_clear();
        }
        let dataset = dataset?;

        let report = analytics::analyze(&dataset);
        let tags = classifier.classify(&dataset).await;

        let exported = if self.no_export {
            Vec::new()
        } else {
            output::export_profile(&self.output_dir, &dataset, &report, &tags)?
        };

        if !self.quiet {
            println!("{}", render_report(&dataset, &report, &tags, &exported));
        }

        let summary = ProfileSummary::build(&dataset, &report, &tags);
        let status = dataset.status.clone();
        Ok((summary, status))
    }
}

/// Acquire a session for this run, degrading to anonymous on any failure.
async fn acquire_session(cli: &Cli) -> Session {
    let manager = SessionManager::new(&cli.session_dir);
    match manager
        .acquire(cli.login_user.as_deref(), cli.login_password.as_deref())
        .await
    {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "could not load or establish session, using anonymous mode");
            Session::anonymous()
        }
    }
}

fn create_progress_bar(max_posts: u32) -> ProgressBar {
    let pb = ProgressBar::new(max_posts as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} posts",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pb
}
