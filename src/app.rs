use log::{debug, info, warn};
use time::OffsetDateTime;

use crate::domain::pull_request::{PullRequestSummary, ReviewActivity};
use crate::error::Result;
use crate::repo::PullRequestRepository;
use crate::usecase::reminder::{Decision, Reminder, ReminderPolicy, SkipReason, evaluate};

/// What a run did, for the closing log line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub inspected: usize,
    /// Pull request numbers that got a reminder (or would have, on a dry run).
    pub reminded: Vec<u64>,
    pub already_reviewed: usize,
    pub no_review_request: usize,
    pub not_yet_due: usize,
    pub recently_reminded: usize,
}

impl RunReport {
    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::AlreadyReviewed => self.already_reviewed += 1,
            SkipReason::NoReviewRequest => self.no_review_request += 1,
            SkipReason::NotYetDue { .. } => self.not_yet_due += 1,
            SkipReason::RecentlyReminded { .. } => self.recently_reminded += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.already_reviewed + self.no_review_request + self.not_yet_due + self.recently_reminded
    }
}

/// Walks every open pull request once, in listing order, and posts the
/// reminders the policy asks for. The first error ends the run; comments
/// already posted stay posted.
pub struct App<R: PullRequestRepository> {
    repo: R,
    policy: ReminderPolicy,
    dry_run: bool,
}

impl<R: PullRequestRepository> App<R> {
    pub fn new(repo: R, policy: ReminderPolicy, dry_run: bool) -> Self {
        Self {
            repo,
            policy,
            dry_run,
        }
    }

    pub async fn run(&self, now: OffsetDateTime) -> Result<RunReport> {
        let pulls = self.repo.open_pull_requests().await?;
        info!("{} open pull request(s)", pulls.len());

        let mut report = RunReport::default();
        for pr in &pulls {
            info!("pr #{} (id {}): {}", pr.number, pr.id, pr.title);
            report.inspected += 1;

            let activity = self.fetch_activity(pr.number).await?;
            match evaluate(pr, &activity, &self.policy, now) {
                Decision::Skip(reason) => {
                    info!("pr #{}: skipped, {reason}", pr.number);
                    report.record_skip(reason);
                }
                Decision::Remind(reminder) => {
                    self.remind(pr, reminder).await?;
                    report.reminded.push(pr.number);
                }
            }
        }
        Ok(report)
    }

    async fn fetch_activity(&self, number: u64) -> Result<ReviewActivity> {
        let review_requests = self.repo.review_requests(number).await?;
        let reviews = self.repo.reviews(number).await?;
        let comments = self.repo.comments(number).await?;
        info!(
            "pr #{number}: {} review request(s), {} review(s), {} comment(s)",
            review_requests.len(),
            reviews.len(),
            comments.len()
        );
        if let Some(latest) = reviews.last() {
            debug!(
                "pr #{number}: latest review {:?} at {}",
                latest.state, latest.created_at
            );
        }
        Ok(ReviewActivity {
            review_requests,
            reviews,
            comments,
        })
    }

    async fn remind(&self, pr: &PullRequestSummary, mut reminder: Reminder) -> Result<()> {
        // the listing may omit reviewers; ask for the full pull request then
        if reminder.reviewers.is_empty() {
            let detail = self.repo.pull_request(pr.number).await?;
            debug!(
                "pr #{}: requested reviewers {:?}",
                detail.number, detail.requested_reviewers
            );
            reminder = Reminder::compose(&detail.requested_reviewers, self.policy.message());
        }
        if reminder.reviewers.is_empty() {
            warn!("pr #{}: no requested reviewers to mention", pr.number);
        }

        if self.dry_run {
            info!("pr #{}: dry run, would comment {:?}", pr.number, reminder.body);
            return Ok(());
        }
        self.repo.post_comment(pr.number, &reminder.body).await?;
        info!("pr #{}: reminded {}", pr.number, reminder.mentions());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pull_request::{
        Comment, Review, ReviewRequestEvent, ReviewState,
    };
    use crate::error::ReminderError;
    use crate::repo::memory::InMemoryPullRequestRepo;
    use crate::usecase::elapsed::TimeModel;
    use time::Duration;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2026-10-21 12:00 UTC);
    const MESSAGE: &str = "This pull request is waiting for your review.";

    fn policy() -> ReminderPolicy {
        ReminderPolicy::new(MESSAGE, 24.0, 48.0, TimeModel::WallClock).expect("policy")
    }

    fn pr(number: u64, reviewers: &[&str]) -> PullRequestSummary {
        PullRequestSummary {
            number,
            title: format!("change {number}"),
            id: 9000 + number,
            requested_reviewers: reviewers.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn requested(ago: Duration) -> ReviewActivity {
        ReviewActivity {
            review_requests: vec![ReviewRequestEvent {
                created_at: NOW - ago,
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn posts_only_where_due() {
        let mut reviewed = requested(Duration::days(3));
        reviewed.reviews.push(Review {
            created_at: NOW - Duration::days(1),
            state: ReviewState::Approved,
        });
        let mut reminded_recently = requested(Duration::days(3));
        reminded_recently.comments.push(Comment {
            body: format!("@dave\n{MESSAGE}"),
            created_at: NOW - Duration::hours(30),
        });

        let repo = InMemoryPullRequestRepo::default()
            .with_pull(pr(1, &["alice", "bob"]), requested(Duration::hours(25)))
            .with_pull(pr(2, &["carol"]), reviewed)
            .with_pull(pr(3, &["carol"]), ReviewActivity::default())
            .with_pull(pr(4, &["carol"]), requested(Duration::hours(10)))
            .with_pull(pr(5, &["dave"]), reminded_recently);
        let app = App::new(repo, policy(), false);

        let report = app.run(NOW).await.expect("run");

        assert_eq!(
            app.repo.posted(),
            vec![(1, format!("@alice, @bob\n{MESSAGE}"))]
        );
        assert_eq!(
            report,
            RunReport {
                inspected: 5,
                reminded: vec![1],
                already_reviewed: 1,
                no_review_request: 1,
                not_yet_due: 1,
                recently_reminded: 1,
            }
        );
        assert_eq!(report.skipped(), 4);
        assert!(app.repo.detail_lookups().is_empty());
    }

    #[tokio::test]
    async fn reminds_again_after_rolling_window() {
        let mut activity = requested(Duration::days(5));
        activity.comments.push(Comment {
            body: format!("@erin\n{MESSAGE}"),
            created_at: NOW - Duration::hours(50),
        });
        let repo = InMemoryPullRequestRepo::default().with_pull(pr(8, &["erin"]), activity);
        let app = App::new(repo, policy(), false);

        let report = app.run(NOW).await.expect("run");

        assert_eq!(report.reminded, vec![8]);
        assert_eq!(app.repo.posted(), vec![(8, format!("@erin\n{MESSAGE}"))]);
    }

    #[tokio::test]
    async fn looks_up_reviewers_when_listing_has_none() {
        let repo = InMemoryPullRequestRepo::default()
            .with_pull(pr(12, &[]), requested(Duration::days(2)))
            .with_detail_reviewers(12, &["frank", "grace"]);
        let app = App::new(repo, policy(), false);

        app.run(NOW).await.expect("run");

        assert_eq!(app.repo.detail_lookups(), vec![12]);
        assert_eq!(
            app.repo.posted(),
            vec![(12, format!("@frank, @grace\n{MESSAGE}"))]
        );
    }

    #[tokio::test]
    async fn dry_run_posts_nothing() {
        let repo = InMemoryPullRequestRepo::default()
            .with_pull(pr(1, &["alice"]), requested(Duration::days(2)));
        let app = App::new(repo, policy(), true);

        let report = app.run(NOW).await.expect("run");

        assert_eq!(report.reminded, vec![1]);
        assert!(app.repo.posted().is_empty());
    }

    #[tokio::test]
    async fn first_error_aborts_and_keeps_earlier_comments() {
        let repo = InMemoryPullRequestRepo::default()
            .with_pull(pr(1, &["alice"]), requested(Duration::days(2)))
            .with_pull(pr(2, &["bob"]), requested(Duration::days(2)))
            .with_pull(pr(3, &["carol"]), requested(Duration::days(2)))
            .failing_comments_for(2);
        let app = App::new(repo, policy(), false);

        let err = app.run(NOW).await.expect_err("run should fail");

        assert!(matches!(err, ReminderError::Transport { .. }));
        assert_eq!(
            err.to_string(),
            "fetching comments of #2: connection reset by peer"
        );
        assert_eq!(app.repo.posted(), vec![(1, format!("@alice\n{MESSAGE}"))]);
    }

    #[tokio::test]
    async fn no_open_pull_requests_is_a_quiet_success() {
        let app = App::new(InMemoryPullRequestRepo::default(), policy(), false);
        let report = app.run(NOW).await.expect("run");
        assert_eq!(report, RunReport::default());
    }
}
