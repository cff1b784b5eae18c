use std::fmt;

use crate::error::{ReminderError, Result};
use crate::repo::github::auth::resolve_github_token;
use crate::usecase::elapsed::TimeModel;
use crate::usecase::reminder::ReminderPolicy;

/// Run inputs. Each one can come from a flag or from the environment
/// variable a GitHub Actions step exposes it as.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct Inputs {
    /// Token used for every GitHub call (falls back to GITHUB_TOKEN, then `gh auth token`)
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Text appended to every reminder; also the pattern that finds earlier reminders
    #[arg(long, env = "INPUT_REMINDER_MESSAGE")]
    pub reminder_message: Option<String>,

    /// Hours after a review request before the first reminder is due
    #[arg(long, env = "INPUT_REVIEW_TURNAROUND_HOURS")]
    pub review_turnaround_hours: Option<String>,

    /// Hours after the last reminder before another one is due
    #[arg(long, env = "INPUT_REVIEW_ROLLING_REMINDER_HOURS")]
    pub review_rolling_reminder_hours: Option<String>,

    /// How elapsed time is counted
    #[arg(long, env = "INPUT_TIME_MODEL", value_enum, default_value_t = TimeModel::WallClock)]
    pub time_model: TimeModel,

    /// Target repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// GitHub API base URL, for GitHub Enterprise
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Evaluate and log, but do not post comments
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || {
            ReminderError::Configuration(format!(
                "repository must look like owner/name, got {raw:?}"
            ))
        };
        let (owner, name) = raw.trim().split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Validated configuration for one run.
#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub repo: RepoSlug,
    pub api_base: Option<String>,
    pub policy: ReminderPolicy,
    pub dry_run: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .field("policy", &self.policy)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Config {
    pub fn from_inputs(inputs: Inputs) -> Result<Self> {
        let message =
            present(inputs.reminder_message).ok_or_else(|| missing("reminder_message"))?;
        let turnaround = parse_hours("review_turnaround_hours", inputs.review_turnaround_hours)?;
        let rolling = parse_hours(
            "review_rolling_reminder_hours",
            inputs.review_rolling_reminder_hours,
        )?;
        let policy = ReminderPolicy::new(message, turnaround, rolling, inputs.time_model)?;

        let repo = present(inputs.repository).ok_or_else(|| missing("repository"))?;
        let repo = RepoSlug::parse(&repo)?;

        let token = resolve_github_token(present(inputs.github_token).as_deref())?;

        Ok(Self {
            token,
            repo,
            api_base: present(inputs.api_url),
            policy,
            dry_run: inputs.dry_run,
        })
    }
}

// Actions passes unset optional inputs as empty strings.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn missing(name: &str) -> ReminderError {
    ReminderError::Configuration(format!("{name} is required"))
}

fn parse_hours(name: &str, raw: Option<String>) -> Result<f64> {
    let raw = present(raw).ok_or_else(|| missing(name))?;
    raw.trim().parse::<f64>().map_err(|_| {
        ReminderError::Configuration(format!("{name} must be a number of hours, got {raw:?}"))
    })
}
