//! Urgency classification and reminder summaries
//!
//! Everything here is a pure function of the assignments and the current
//! calendar day. Day differences are counted in calendar days, so the result
//! does not depend on the time of day "today" was sampled at.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::types::Assignment;

/// Message shown when nothing is pending
pub const ALL_CLEAR: &str = "Great job! You have no pending assignments. Keep up the good work! 🎉";

const REMINDER_PREFIX: &str = "📚 Schedule Reminder: ";

/// Urgency tier, declared from most to least urgent
#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum UrgencyTier {
    Overdue,
    DueToday,
    DueTomorrow,
    Soon,
    ThisWeek,
    Later,
    Completed,
}

impl UrgencyTier {
    /// Display severity, higher is more urgent
    pub fn severity(&self) -> u8 {
        match self {
            UrgencyTier::Overdue => 6,
            UrgencyTier::DueToday => 5,
            UrgencyTier::DueTomorrow => 4,
            UrgencyTier::Soon => 3,
            UrgencyTier::ThisWeek => 2,
            UrgencyTier::Later => 1,
            UrgencyTier::Completed => 0,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            UrgencyTier::Overdue => "urgency-overdue",
            UrgencyTier::DueToday => "urgency-today",
            UrgencyTier::DueTomorrow => "urgency-tomorrow",
            UrgencyTier::Soon => "urgency-soon",
            UrgencyTier::ThisWeek => "urgency-week",
            UrgencyTier::Later => "urgency-later",
            UrgencyTier::Completed => "urgency-completed",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            UrgencyTier::Completed => "✅",
            UrgencyTier::Overdue | UrgencyTier::DueToday => "⚠️",
            UrgencyTier::DueTomorrow | UrgencyTier::Soon => "🔔",
            UrgencyTier::ThisWeek | UrgencyTier::Later => "📅",
        }
    }
}

/// Classification result: a tier plus its display label
#[derive(Debug, Clone, Serialize, Eq, PartialEq)]
pub struct Urgency {
    pub tier: UrgencyTier,
    pub label: String,
}

impl Urgency {
    fn new(tier: UrgencyTier, label: impl Into<String>) -> Self {
        Self {
            tier,
            label: label.into(),
        }
    }
}

/// The local calendar day right now
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Signed number of calendar days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Classify one assignment relative to `today`
pub fn classify(assignment: &Assignment, today: NaiveDate) -> Urgency {
    if assignment.completed {
        return Urgency::new(UrgencyTier::Completed, "Completed");
    }

    let days_left = days_between(today, assignment.due_date);
    match days_left {
        d if d < 0 => Urgency::new(UrgencyTier::Overdue, "Overdue!"),
        0 => Urgency::new(UrgencyTier::DueToday, "Due Today!"),
        1 => Urgency::new(UrgencyTier::DueTomorrow, "Due Tomorrow"),
        d if d <= 3 => Urgency::new(UrgencyTier::Soon, format!("{d} days left")),
        d if d <= 7 => Urgency::new(UrgencyTier::ThisWeek, format!("{d} days left")),
        d => Urgency::new(UrgencyTier::Later, format!("{d} days left")),
    }
}

/// Build the aggregate reminder message for the whole list
pub fn summarize(assignments: &[Assignment], today: NaiveDate) -> String {
    let pending: Vec<&Assignment> = assignments.iter().filter(|a| a.is_pending()).collect();

    if pending.is_empty() {
        return ALL_CLEAR.to_string();
    }

    let count_due = |offset: i64| {
        pending
            .iter()
            .filter(|a| days_between(today, a.due_date) == offset)
            .count()
    };
    let overdue = pending.iter().filter(|a| a.due_date < today).count();
    let due_today = count_due(0);
    let due_tomorrow = count_due(1);

    let mut clauses: Vec<String> = Vec::new();

    if overdue > 0 {
        clauses.push(format!("You have {} overdue {}!", overdue, noun(overdue)));
    }

    if due_today > 0 {
        clauses.push(format!("{} {} due TODAY!", due_today, noun_verb(due_today)));
    }

    if due_tomorrow > 0 {
        clauses.push(format!(
            "{} {} due tomorrow.",
            due_tomorrow,
            noun_verb(due_tomorrow)
        ));
    }

    if clauses.is_empty() {
        clauses.push(format!(
            "You have {} pending {}. Stay organized!",
            pending.len(),
            noun(pending.len())
        ));
    }

    format!("{}{}", REMINDER_PREFIX, clauses.join(" "))
}

fn noun(count: usize) -> &'static str {
    if count == 1 {
        "assignment"
    } else {
        "assignments"
    }
}

fn noun_verb(count: usize) -> &'static str {
    if count == 1 {
        "assignment is"
    } else {
        "assignments are"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;
    use chrono::Duration;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn today_fixture() -> NaiveDate {
        day("2025-03-10")
    }

    /// Pending assignment due `offset` days after the fixture day
    fn due_in(offset: i64) -> Assignment {
        Assignment::new(
            format!("Due in {offset}"),
            "MATH".to_string(),
            today_fixture() + Duration::days(offset),
            Priority::Medium,
        )
    }

    fn completed(offset: i64) -> Assignment {
        let mut a = due_in(offset);
        a.completed = true;
        a
    }

    // ========== classify tests ==========

    #[test]
    fn test_classify_completed_ignores_due_date() {
        for offset in [-30, -1, 0, 1, 2, 5, 40] {
            let u = classify(&completed(offset), today_fixture());
            assert_eq!(u.tier, UrgencyTier::Completed);
            assert_eq!(u.label, "Completed");
        }
    }

    #[test]
    fn test_classify_overdue_yesterday() {
        let u = classify(&due_in(-1), today_fixture());
        assert_eq!(u.tier, UrgencyTier::Overdue);
        assert_eq!(u.label, "Overdue!");
    }

    #[test]
    fn test_classify_overdue_long_ago() {
        let u = classify(&due_in(-365), today_fixture());
        assert_eq!(u.tier, UrgencyTier::Overdue);
    }

    #[test]
    fn test_classify_due_today() {
        let u = classify(&due_in(0), today_fixture());
        assert_eq!(u.tier, UrgencyTier::DueToday);
        assert_eq!(u.label, "Due Today!");
    }

    #[test]
    fn test_classify_due_tomorrow() {
        let u = classify(&due_in(1), today_fixture());
        assert_eq!(u.tier, UrgencyTier::DueTomorrow);
        assert_eq!(u.label, "Due Tomorrow");
    }

    #[test]
    fn test_classify_days_left_boundaries() {
        let cases = [
            (2, UrgencyTier::Soon),
            (3, UrgencyTier::Soon),
            (4, UrgencyTier::ThisWeek),
            (7, UrgencyTier::ThisWeek),
            (8, UrgencyTier::Later),
            (60, UrgencyTier::Later),
        ];

        for (offset, tier) in cases {
            let u = classify(&due_in(offset), today_fixture());
            assert_eq!(u.tier, tier, "offset {offset}");
            assert_eq!(u.label, format!("{offset} days left"));
        }
    }

    #[test]
    fn test_classify_across_month_boundary() {
        let a = Assignment::new("X".into(), String::new(), day("2025-03-01"), Priority::Low);
        let u = classify(&a, day("2025-02-28"));
        assert_eq!(u.tier, UrgencyTier::DueTomorrow);
    }

    #[test]
    fn test_classify_ignores_priority() {
        let mut high = due_in(5);
        high.priority = Priority::High;
        let mut low = due_in(5);
        low.priority = Priority::Low;

        assert_eq!(
            classify(&high, today_fixture()),
            classify(&low, today_fixture())
        );
    }

    #[test]
    fn test_severity_ordering() {
        let order = [
            UrgencyTier::Overdue,
            UrgencyTier::DueToday,
            UrgencyTier::DueTomorrow,
            UrgencyTier::Soon,
            UrgencyTier::ThisWeek,
            UrgencyTier::Later,
            UrgencyTier::Completed,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].severity() > pair[1].severity());
        }
    }

    #[test]
    fn test_days_between_is_signed() {
        assert_eq!(days_between(day("2025-03-10"), day("2025-03-12")), 2);
        assert_eq!(days_between(day("2025-03-10"), day("2025-03-08")), -2);
        assert_eq!(days_between(day("2024-12-31"), day("2025-01-01")), 1);
    }

    // ========== summarize tests ==========

    #[test]
    fn test_summarize_empty_is_all_clear() {
        assert_eq!(summarize(&[], today_fixture()), ALL_CLEAR);
    }

    #[test]
    fn test_summarize_only_completed_is_all_clear() {
        let list = vec![completed(-3), completed(2)];
        assert_eq!(summarize(&list, today_fixture()), ALL_CLEAR);
    }

    #[test]
    fn test_summarize_single_overdue_is_singular() {
        let msg = summarize(&[due_in(-2)], today_fixture());
        assert_eq!(msg, "📚 Schedule Reminder: You have 1 overdue assignment!");
    }

    #[test]
    fn test_summarize_multiple_overdue_is_plural() {
        let msg = summarize(&[due_in(-2), due_in(-1)], today_fixture());
        assert_eq!(msg, "📚 Schedule Reminder: You have 2 overdue assignments!");
    }

    #[test]
    fn test_summarize_due_today_verb_forms() {
        let one = summarize(&[due_in(0)], today_fixture());
        assert!(one.contains("1 assignment is due TODAY!"));

        let two = summarize(&[due_in(0), due_in(0)], today_fixture());
        assert!(two.contains("2 assignments are due TODAY!"));
    }

    #[test]
    fn test_summarize_due_tomorrow_verb_forms() {
        let one = summarize(&[due_in(1)], today_fixture());
        assert!(one.contains("1 assignment is due tomorrow."));

        let three = summarize(&[due_in(1), due_in(1), due_in(1)], today_fixture());
        assert!(three.contains("3 assignments are due tomorrow."));
    }

    #[test]
    fn test_summarize_clause_order() {
        let list = vec![due_in(1), due_in(0), due_in(-4), due_in(10)];
        let msg = summarize(&list, today_fixture());
        assert_eq!(
            msg,
            "📚 Schedule Reminder: You have 1 overdue assignment! \
             1 assignment is due TODAY! 1 assignment is due tomorrow."
        );
    }

    #[test]
    fn test_summarize_generic_pending() {
        let one = summarize(&[due_in(5)], today_fixture());
        assert_eq!(
            one,
            "📚 Schedule Reminder: You have 1 pending assignment. Stay organized!"
        );

        let two = summarize(&[due_in(5), due_in(20), completed(0)], today_fixture());
        assert_eq!(
            two,
            "📚 Schedule Reminder: You have 2 pending assignments. Stay organized!"
        );
    }

    #[test]
    fn test_summarize_ignores_completed_in_buckets() {
        let list = vec![completed(-1), completed(0), due_in(1)];
        let msg = summarize(&list, today_fixture());
        assert!(!msg.contains("overdue"));
        assert!(!msg.contains("TODAY"));
        assert!(msg.contains("1 assignment is due tomorrow."));
    }

    #[test]
    fn test_summarize_never_empty() {
        let lists = vec![vec![], vec![due_in(3)], vec![due_in(-1)], vec![completed(0)]];
        for list in lists {
            assert!(!summarize(&list, today_fixture()).is_empty());
        }
    }
}
