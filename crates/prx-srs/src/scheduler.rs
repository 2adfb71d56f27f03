use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    config::SchedulerConfig,
    error::SchedulerError,
    item::{RecallItem, ResponseTiming},
    outcome::{Quality, ReviewOutcome},
    status::Status,
};

/// Interval after the first passing review in a streak.
const FIRST_INTERVAL_DAYS: u32 = 1;
/// Interval after the second passing review in a streak.
const SECOND_INTERVAL_DAYS: u32 = 6;

/// SM-2 style scheduler over four-level grades.
///
/// Stateless apart from its policy: every method is a pure function of its
/// arguments, so one scheduler can be shared freely between threads.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// A never-reviewed item using this scheduler's initial ease.
    pub fn new_item(
        &self,
        id: Uuid,
        learner_id: Uuid,
        subject: impl Into<String>,
        topic: impl Into<String>,
        question_ref: impl Into<String>,
        now: DateTime<Utc>,
    ) -> RecallItem {
        RecallItem {
            ease_factor: self.config.initial_ease,
            ..RecallItem::new(id, learner_id, subject, topic, question_ref, now)
        }
    }

    /// Apply one review to `item` and return the rescheduled snapshot.
    ///
    /// # Errors
    ///
    /// * [`SchedulerError::InvalidTimestamp`] if `now` is before the item's
    ///   last attempt.
    /// * [`SchedulerError::InvalidOutcome`] if the outcome carries an accuracy
    ///   above 100.
    /// * [`SchedulerError::ScheduleOverflow`] if the next review date is not
    ///   representable.
    pub fn record_review(
        &self,
        item: &RecallItem,
        outcome: impl Into<ReviewOutcome>,
        now: DateTime<Utc>,
    ) -> Result<RecallItem, SchedulerError> {
        let outcome = outcome.into();

        if now < item.last_attempted_at {
            return Err(SchedulerError::InvalidTimestamp {
                now,
                last_attempted_at: item.last_attempted_at,
            });
        }
        outcome.validate()?;

        let ease_factor = self.next_ease(item.ease_factor, outcome.quality);
        let (repetitions, interval_days) = if outcome.quality.is_pass() {
            let repetitions = item.repetitions.saturating_add(1);
            let interval_days = match repetitions {
                1 => FIRST_INTERVAL_DAYS,
                2 => SECOND_INTERVAL_DAYS,
                _ => self.grow_interval(item.interval_days, ease_factor),
            };
            (repetitions, interval_days)
        } else {
            (0, 1)
        };
        let interval_days = interval_days.clamp(1, self.config.maximum_interval_days);

        let next_review_at = now
            .checked_add_signed(Duration::days(i64::from(interval_days)))
            .ok_or(SchedulerError::ScheduleOverflow { interval_days })?;

        let response_timing = match outcome.response_ms {
            Some(ms) => Some(ResponseTiming::record(item.response_timing, ms)),
            None => item.response_timing,
        };

        Ok(RecallItem {
            last_attempted_at: now,
            next_review_at,
            interval_days,
            ease_factor,
            repetitions,
            accuracy_percent: outcome.accuracy_percent.or(item.accuracy_percent),
            total_reviews: item.total_reviews.saturating_add(1),
            response_timing,
            ..item.clone()
        })
    }

    /// Bucket an item relative to `now`.
    ///
    /// Checked in order: due, mastered, learning, upcoming. An overdue item is
    /// due no matter how well it is known.
    pub fn classify(&self, item: &RecallItem, now: DateTime<Utc>) -> Status {
        if item.next_review_at <= now {
            Status::Due
        } else if item.repetitions >= self.config.mastery_repetitions
            && item.ease_factor >= self.config.mastery_ease
        {
            Status::Mastered
        } else if item.repetitions <= 1 {
            Status::Learning
        } else {
            Status::Upcoming
        }
    }

    /// Display score in `0..=100`; not used for scheduling.
    pub fn retention_strength(&self, item: &RecallItem) -> u8 {
        let raw = (item.ease_factor * f64::from(item.repetitions) * 10.0).round();
        raw.clamp(0.0, 100.0) as u8
    }

    /// Due items, most overdue first, ties broken by id.
    ///
    /// Built fresh on every call.
    pub fn due_queue<'a, I>(
        &self,
        items: I,
        now: DateTime<Utc>,
    ) -> std::vec::IntoIter<&'a RecallItem>
    where
        I: IntoIterator<Item = &'a RecallItem>,
    {
        let mut due: Vec<&RecallItem> = items
            .into_iter()
            .filter(|item| self.classify(item, now) == Status::Due)
            .collect();
        due.sort_by_key(|item| (item.next_review_at, item.id));
        due.into_iter()
    }

    fn next_ease(&self, ease: f64, quality: Quality) -> f64 {
        let adjusted = if quality.is_pass() {
            let miss = f64::from(Quality::Easy.value() - quality.value());
            ease + (0.1 - miss * (0.08 + miss * 0.02))
        } else {
            ease - self.config.failure_ease_penalty
        };
        adjusted.max(self.config.ease_floor)
    }

    fn grow_interval(&self, previous_days: u32, ease_factor: f64) -> u32 {
        let grown = (f64::from(previous_days) * ease_factor).round();
        grown.clamp(1.0, f64::from(self.config.maximum_interval_days)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn new_item(now: DateTime<Utc>) -> RecallItem {
        RecallItem::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Chemistry",
            "Stoichiometry",
            "q-42",
            now,
        )
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_first_review() {
        let scheduler = Scheduler::default();
        let item = new_item(t0());

        let next = scheduler.record_review(&item, Quality::Good, t0()).unwrap();
        assert_eq!(next.repetitions, 1);
        assert_eq!(next.interval_days, 1);
        assert_eq!(next.next_review_at, t0() + Duration::days(1));
        assert_eq!(next.last_attempted_at, t0());
        assert_eq!(next.total_reviews, 1);
    }

    #[test]
    fn test_second_and_third_review() {
        let scheduler = Scheduler::default();
        let item = new_item(t0());

        let first = scheduler.record_review(&item, Quality::Good, t0()).unwrap();
        let second = scheduler
            .record_review(&first, Quality::Good, t0() + Duration::days(1))
            .unwrap();
        assert_eq!(second.repetitions, 2);
        assert_eq!(second.interval_days, 6);
        assert_eq!(second.next_review_at, t0() + Duration::days(7));

        let third = scheduler
            .record_review(&second, Quality::Easy, t0() + Duration::days(7))
            .unwrap();
        assert_eq!(third.repetitions, 3);
        assert!(approx(third.ease_factor, 2.6));
        assert_eq!(third.interval_days, 16);
        assert_eq!(third.next_review_at, t0() + Duration::days(23));
    }

    #[test]
    fn test_ease_adjustment_by_grade() {
        let scheduler = Scheduler::default();
        let item = new_item(t0());

        let easy = scheduler.record_review(&item, Quality::Easy, t0()).unwrap();
        let good = scheduler.record_review(&item, Quality::Good, t0()).unwrap();
        let hard = scheduler.record_review(&item, Quality::Hard, t0()).unwrap();
        let again = scheduler.record_review(&item, Quality::Again, t0()).unwrap();

        assert!(approx(easy.ease_factor, 2.6));
        assert!(approx(good.ease_factor, 2.5));
        assert!(approx(hard.ease_factor, 2.36));
        assert!(approx(again.ease_factor, 2.3));
    }

    #[test]
    fn test_failure_after_streak_resets() {
        let scheduler = Scheduler::default();
        let item = RecallItem {
            repetitions: 5,
            interval_days: 40,
            ease_factor: 2.7,
            next_review_at: t0() + Duration::days(40),
            ..new_item(t0())
        };

        let failed = scheduler
            .record_review(&item, Quality::Again, t0() + Duration::days(41))
            .unwrap();
        assert_eq!(failed.repetitions, 0);
        assert_eq!(failed.interval_days, 1);
        assert!(approx(failed.ease_factor, 2.5));
        assert_eq!(failed.next_review_at, t0() + Duration::days(42));
    }

    #[test]
    fn test_ease_floor_on_failure() {
        let scheduler = Scheduler::default();
        let item = RecallItem {
            ease_factor: 1.35,
            ..new_item(t0())
        };

        let failed = scheduler.record_review(&item, Quality::Again, t0()).unwrap();
        assert!(approx(failed.ease_factor, 1.3));

        let failed_again = scheduler.record_review(&failed, Quality::Again, t0()).unwrap();
        assert!(approx(failed_again.ease_factor, 1.3));
    }

    #[test]
    fn test_rejects_review_before_last_attempt() {
        let scheduler = Scheduler::default();
        let item = new_item(t0());

        let err = scheduler
            .record_review(&item, Quality::Good, t0() - Duration::seconds(1))
            .unwrap_err();
        assert_eq!(
            err,
            SchedulerError::InvalidTimestamp {
                now: t0() - Duration::seconds(1),
                last_attempted_at: t0(),
            }
        );
    }

    #[test]
    fn test_rejects_accuracy_above_100() {
        let scheduler = Scheduler::default();
        let item = new_item(t0());
        let outcome = ReviewOutcome::new(Quality::Good).with_accuracy(120);

        assert!(matches!(
            scheduler.record_review(&item, outcome, t0()),
            Err(SchedulerError::InvalidOutcome(_))
        ));
    }

    #[test]
    fn test_accuracy_kept_when_absent() {
        let scheduler = Scheduler::default();
        let item = new_item(t0());

        let scored = scheduler
            .record_review(&item, ReviewOutcome::new(Quality::Good).with_accuracy(80), t0())
            .unwrap();
        assert_eq!(scored.accuracy_percent, Some(80));

        let unscored = scheduler
            .record_review(&scored, Quality::Good, t0() + Duration::days(1))
            .unwrap();
        assert_eq!(unscored.accuracy_percent, Some(80));
    }

    #[test]
    fn test_response_time_is_averaged() {
        let scheduler = Scheduler::default();
        let item = new_item(t0());

        let once = scheduler
            .record_review(&item, ReviewOutcome::new(Quality::Good).with_response_ms(4000), t0())
            .unwrap();
        let twice = scheduler
            .record_review(
                &once,
                ReviewOutcome::new(Quality::Good).with_response_ms(8000),
                t0() + Duration::days(1),
            )
            .unwrap();
        let untimed = scheduler
            .record_review(&twice, Quality::Good, t0() + Duration::days(7))
            .unwrap();

        assert_eq!(
            untimed.average_response(),
            Some(std::time::Duration::from_secs(6))
        );
    }

    #[test]
    fn test_input_is_not_mutated() {
        let scheduler = Scheduler::default();
        let item = new_item(t0());
        let before = item.clone();

        let _ = scheduler.record_review(&item, Quality::Easy, t0()).unwrap();
        assert_eq!(item, before);
    }

    #[test]
    fn test_interval_capped() {
        let scheduler = Scheduler::new(SchedulerConfig {
            maximum_interval_days: 30,
            ..Default::default()
        })
        .unwrap();
        let item = RecallItem {
            repetitions: 4,
            interval_days: 25,
            ..new_item(t0())
        };

        let next = scheduler.record_review(&item, Quality::Easy, t0()).unwrap();
        assert_eq!(next.interval_days, 30);
    }

    #[test]
    fn test_new_item_uses_configured_ease() {
        let scheduler = Scheduler::new(SchedulerConfig {
            initial_ease: 2.0,
            ..Default::default()
        })
        .unwrap();
        let item = scheduler.new_item(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Biology",
            "Cells",
            "q-1",
            t0(),
        );
        assert_eq!(item.ease_factor, 2.0);
    }

    #[test]
    fn test_classify() {
        let scheduler = Scheduler::default();
        let known = RecallItem {
            repetitions: 5,
            ease_factor: 3.0,
            next_review_at: t0() + Duration::days(30),
            ..new_item(t0())
        };

        assert_eq!(scheduler.classify(&known, t0() + Duration::days(10)), Status::Mastered);
        assert_eq!(scheduler.classify(&known, t0() + Duration::days(31)), Status::Due);
        assert_eq!(scheduler.classify(&known, t0() + Duration::days(30)), Status::Due);

        let learning = RecallItem {
            repetitions: 1,
            next_review_at: t0() + Duration::days(1),
            ..new_item(t0())
        };
        assert_eq!(scheduler.classify(&learning, t0()), Status::Learning);

        let upcoming = RecallItem {
            repetitions: 3,
            ease_factor: 2.5,
            next_review_at: t0() + Duration::days(15),
            ..new_item(t0())
        };
        assert_eq!(scheduler.classify(&upcoming, t0()), Status::Upcoming);

        let fresh = new_item(t0());
        assert_eq!(scheduler.classify(&fresh, t0()), Status::Due);
    }

    #[test]
    fn test_retention_strength() {
        let scheduler = Scheduler::default();
        let item = new_item(t0());
        assert_eq!(scheduler.retention_strength(&item), 0);

        let mid = RecallItem {
            repetitions: 2,
            ease_factor: 2.5,
            ..item.clone()
        };
        assert_eq!(scheduler.retention_strength(&mid), 50);

        let strong = RecallItem {
            repetitions: 12,
            ease_factor: 3.1,
            ..item
        };
        assert_eq!(scheduler.retention_strength(&strong), 100);
    }

    #[test]
    fn test_due_queue_order() {
        let scheduler = Scheduler::default();
        let now = t0() + Duration::days(10);

        let mut a = new_item(t0());
        a.id = Uuid::from_u128(2);
        a.next_review_at = t0() + Duration::days(3);
        let mut b = new_item(t0());
        b.id = Uuid::from_u128(1);
        b.next_review_at = t0() + Duration::days(3);
        let mut c = new_item(t0());
        c.id = Uuid::from_u128(3);
        c.next_review_at = t0() + Duration::days(1);
        let mut later = new_item(t0());
        later.id = Uuid::from_u128(4);
        later.next_review_at = t0() + Duration::days(20);

        let items = vec![a, later, b, c];
        let ids: Vec<Uuid> = scheduler.due_queue(&items, now).map(|item| item.id).collect();
        assert_eq!(
            ids,
            vec![Uuid::from_u128(3), Uuid::from_u128(1), Uuid::from_u128(2)]
        );

        let again: Vec<Uuid> = scheduler.due_queue(&items, now).map(|item| item.id).collect();
        assert_eq!(ids, again);
    }
}
