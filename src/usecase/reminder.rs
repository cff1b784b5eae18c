use std::fmt;

use regex::Regex;
use time::OffsetDateTime;

use super::elapsed::TimeModel;
use crate::domain::pull_request::{Comment, PullRequestSummary, ReviewActivity};
use crate::error::{ReminderError, Result};

/// The validated rules a run applies to every pull request.
#[derive(Debug, Clone)]
pub struct ReminderPolicy {
    message: String,
    /// `message` compiled as-is; earlier reminders are found by matching it.
    pattern: Regex,
    turnaround_hours: f64,
    rolling_hours: f64,
    time_model: TimeModel,
}

impl ReminderPolicy {
    pub fn new(
        message: impl Into<String>,
        turnaround_hours: f64,
        rolling_hours: f64,
        time_model: TimeModel,
    ) -> Result<Self> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ReminderError::Configuration(
                "reminder_message must not be empty".into(),
            ));
        }
        let pattern = Regex::new(&message).map_err(|e| {
            ReminderError::Configuration(format!(
                "reminder_message is not a valid pattern: {e}"
            ))
        })?;
        ensure_positive_hours("review_turnaround_hours", turnaround_hours)?;
        ensure_positive_hours("review_rolling_reminder_hours", rolling_hours)?;
        Ok(Self {
            message,
            pattern,
            turnaround_hours,
            rolling_hours,
            time_model,
        })
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn time_model(&self) -> TimeModel {
        self.time_model
    }

    pub fn is_reminder(&self, comment: &Comment) -> bool {
        self.pattern.is_match(&comment.body)
    }

    /// Most recent reminder in the order GitHub delivered the comments.
    fn last_reminder<'a>(&self, comments: &'a [Comment]) -> Option<&'a Comment> {
        comments.iter().rev().find(|c| self.is_reminder(c))
    }
}

fn ensure_positive_hours(name: &str, hours: f64) -> Result<()> {
    if hours.is_finite() && hours > 0.0 {
        Ok(())
    } else {
        Err(ReminderError::Configuration(format!(
            "{name} must be a positive number of hours, got {hours}"
        )))
    }
}

/// A comment ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub reviewers: Vec<String>,
    pub body: String,
}

impl Reminder {
    pub fn compose(reviewers: &[String], message: &str) -> Self {
        let body = format!("{}\n{message}", mentions(reviewers));
        Self {
            reviewers: reviewers.to_vec(),
            body,
        }
    }

    pub fn mentions(&self) -> String {
        mentions(&self.reviewers)
    }
}

/// `@alice, @bob`
fn mentions(reviewers: &[String]) -> String {
    reviewers
        .iter()
        .map(|login| format!("@{login}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyReviewed,
    NoReviewRequest,
    NotYetDue { due_at: Option<OffsetDateTime> },
    RecentlyReminded { next_at: Option<OffsetDateTime> },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyReviewed => f.write_str("a review was already submitted"),
            SkipReason::NoReviewRequest => f.write_str("no review request on the timeline"),
            SkipReason::NotYetDue { due_at: Some(at) } => write!(f, "review not due until {at}"),
            SkipReason::NotYetDue { due_at: None } => f.write_str("review not yet due"),
            SkipReason::RecentlyReminded { next_at: Some(at) } => {
                write!(f, "already reminded, next reminder due {at}")
            }
            SkipReason::RecentlyReminded { next_at: None } => f.write_str("already reminded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    Remind(Reminder),
}

/// Decide whether `pr` should get a reminder comment at `now`.
///
/// Checks run in a fixed order and stop at the first reason to skip: any
/// submitted review, a missing review request, the turnaround threshold
/// measured from the first review request, then the rolling threshold
/// measured from the last reminder comment.
pub fn evaluate(
    pr: &PullRequestSummary,
    activity: &ReviewActivity,
    policy: &ReminderPolicy,
    now: OffsetDateTime,
) -> Decision {
    if !activity.reviews.is_empty() {
        return Decision::Skip(SkipReason::AlreadyReviewed);
    }
    let Some(requested) = activity.review_requests.first() else {
        return Decision::Skip(SkipReason::NoReviewRequest);
    };

    let model = policy.time_model;
    if !model.has_elapsed(requested.created_at, policy.turnaround_hours, now) {
        return Decision::Skip(SkipReason::NotYetDue {
            due_at: model.due_at(requested.created_at, policy.turnaround_hours),
        });
    }

    let reminder = Reminder::compose(&pr.requested_reviewers, &policy.message);
    match policy.last_reminder(&activity.comments) {
        None => Decision::Remind(reminder),
        Some(last) if model.has_elapsed(last.created_at, policy.rolling_hours, now) => {
            Decision::Remind(reminder)
        }
        Some(last) => Decision::Skip(SkipReason::RecentlyReminded {
            next_at: model.due_at(last.created_at, policy.rolling_hours),
        }),
    }
}
