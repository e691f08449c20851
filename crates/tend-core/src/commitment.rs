//! Commitment state rules and display ordering.
//!
//! The only stored transition is `pending -> completed`. "Overdue" is a
//! read-time classification of a pending commitment whose deadline has
//! passed; editing the deadline reclassifies instantly with no write.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};

use tend_types::api::CommitmentUpdateRequest;
use tend_types::domain::{CommitmentSortKey, CommitmentStatus, RecurrencePattern, SortOrder};

use crate::ValidationIssue;

pub fn is_overdue(status: CommitmentStatus, deadline: Option<NaiveDate>, today: NaiveDate) -> bool {
    status == CommitmentStatus::Pending && deadline.is_some_and(|d| d < today)
}

pub fn is_due_today(status: CommitmentStatus, deadline: Option<NaiveDate>, today: NaiveDate) -> bool {
    status == CommitmentStatus::Pending && deadline == Some(today)
}

/// Display priority: overdue items first, then due-today, then everything
/// else (future deadlines, no deadline, completed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PriorityClass {
    Overdue,
    DueToday,
    Rest,
}

pub fn classify(
    status: CommitmentStatus,
    deadline: Option<NaiveDate>,
    today: NaiveDate,
) -> PriorityClass {
    if is_overdue(status, deadline, today) {
        PriorityClass::Overdue
    } else if is_due_today(status, deadline, today) {
        PriorityClass::DueToday
    } else {
        PriorityClass::Rest
    }
}

/// Ordering attributes of one commitment, extracted from whatever row type
/// the caller holds.
#[derive(Debug, Clone, Copy)]
pub struct OrderFacts {
    pub status: CommitmentStatus,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Total display order: priority class first, then the user-selected sort
/// key. Commitments without a deadline sort after dated ones regardless of
/// direction; creation time is the final tie-break.
pub fn display_cmp(
    a: &OrderFacts,
    b: &OrderFacts,
    today: NaiveDate,
    key: CommitmentSortKey,
    order: SortOrder,
) -> Ordering {
    let dir = |o: Ordering| match order {
        SortOrder::Asc => o,
        SortOrder::Desc => o.reverse(),
    };

    let class = classify(a.status, a.deadline, today).cmp(&classify(b.status, b.deadline, today));
    if class != Ordering::Equal {
        return class;
    }

    let keyed = match key {
        CommitmentSortKey::Deadline => match (a.deadline, b.deadline) {
            (Some(x), Some(y)) => dir(x.cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        CommitmentSortKey::Created => dir(a.created_at.cmp(&b.created_at)),
    };

    keyed.then_with(|| a.created_at.cmp(&b.created_at))
}

/// The mutable fields of a commitment, used both at create and as the
/// result of applying a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentFields {
    pub task_description: String,
    pub deadline: Option<NaiveDate>,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<RecurrencePattern>,
}

pub fn validate_new(fields: &CommitmentFields) -> Result<(), ValidationIssue> {
    if fields.task_description.trim().is_empty() {
        return Err(ValidationIssue::EmptyTaskDescription);
    }
    if fields.is_recurring && fields.recurrence_pattern.is_none() {
        return Err(ValidationIssue::RecurringWithoutPattern);
    }
    Ok(())
}

/// Apply a partial patch. Flipping `is_recurring` off clears the pattern;
/// flipping it on requires a pattern to be present after the patch.
pub fn apply_patch(
    current: CommitmentFields,
    patch: &CommitmentUpdateRequest,
) -> Result<CommitmentFields, ValidationIssue> {
    let mut next = current;

    if let Some(task) = &patch.task_description {
        next.task_description = task.clone();
    }
    if let Some(deadline) = patch.deadline {
        next.deadline = Some(deadline);
    }
    if let Some(recurring) = patch.is_recurring {
        next.is_recurring = recurring;
    }
    if let Some(pattern) = patch.recurrence_pattern {
        next.recurrence_pattern = Some(pattern);
    }
    if !next.is_recurring {
        next.recurrence_pattern = None;
    }

    validate_new(&next)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().expect("test date")
    }

    fn ts(s: &str) -> DateTime<Utc> {
        format!("{s}T12:00:00Z").parse().expect("test timestamp")
    }

    fn fields(task: &str, recurring: bool, pattern: Option<RecurrencePattern>) -> CommitmentFields {
        CommitmentFields {
            task_description: task.to_string(),
            deadline: None,
            is_recurring: recurring,
            recurrence_pattern: pattern,
        }
    }

    #[test]
    fn overdue_is_derived_from_deadline_and_clock() {
        let today = d("2025-05-10");
        assert!(is_overdue(CommitmentStatus::Pending, Some(d("2025-05-09")), today));
        // Moving the deadline forward reclassifies with no status write.
        assert!(!is_overdue(CommitmentStatus::Pending, Some(d("2025-05-11")), today));
        // Completed items are never overdue.
        assert!(!is_overdue(CommitmentStatus::Completed, Some(d("2025-05-01")), today));
        assert!(!is_overdue(CommitmentStatus::Pending, None, today));
    }

    #[test]
    fn recurring_requires_pattern() {
        assert_eq!(
            validate_new(&fields("water plants", true, None)),
            Err(ValidationIssue::RecurringWithoutPattern)
        );
        assert!(validate_new(&fields("water plants", true, Some(RecurrencePattern::Daily))).is_ok());
        assert!(validate_new(&fields("water plants", false, None)).is_ok());
    }

    #[test]
    fn patch_clears_pattern_when_recurrence_stops() {
        let current = fields("call mom", true, Some(RecurrencePattern::Weekly));
        let patch = CommitmentUpdateRequest {
            is_recurring: Some(false),
            ..Default::default()
        };
        let next = apply_patch(current, &patch).expect("patch applies");
        assert!(!next.is_recurring);
        assert_eq!(next.recurrence_pattern, None);
    }

    #[test]
    fn patch_cannot_make_recurring_without_pattern() {
        let current = fields("call mom", false, None);
        let patch = CommitmentUpdateRequest {
            is_recurring: Some(true),
            ..Default::default()
        };
        assert_eq!(
            apply_patch(current, &patch),
            Err(ValidationIssue::RecurringWithoutPattern)
        );
    }

    #[test]
    fn display_order_puts_overdue_first_under_both_sort_keys() {
        let today = d("2025-05-10");
        let overdue = OrderFacts {
            status: CommitmentStatus::Pending,
            deadline: Some(d("2025-05-01")),
            created_at: ts("2025-05-09"),
        };
        let due_today = OrderFacts {
            status: CommitmentStatus::Pending,
            deadline: Some(d("2025-05-10")),
            created_at: ts("2025-05-01"),
        };
        let upcoming = OrderFacts {
            status: CommitmentStatus::Pending,
            deadline: Some(d("2025-05-20")),
            created_at: ts("2025-05-02"),
        };

        for key in [CommitmentSortKey::Deadline, CommitmentSortKey::Created] {
            for order in [SortOrder::Asc, SortOrder::Desc] {
                let mut items = vec![upcoming, due_today, overdue];
                items.sort_by(|a, b| display_cmp(a, b, today, key, order));
                assert_eq!(items[0].deadline, overdue.deadline, "key={key:?} order={order:?}");
                assert_eq!(items[1].deadline, due_today.deadline);
            }
        }
    }

    #[test]
    fn undated_commitments_sort_after_dated_ones() {
        let today = d("2025-05-10");
        let dated = OrderFacts {
            status: CommitmentStatus::Pending,
            deadline: Some(d("2025-05-20")),
            created_at: ts("2025-05-02"),
        };
        let undated = OrderFacts {
            status: CommitmentStatus::Pending,
            deadline: None,
            created_at: ts("2025-05-01"),
        };
        let mut items = vec![undated, dated];
        items.sort_by(|a, b| {
            display_cmp(a, b, today, CommitmentSortKey::Deadline, SortOrder::Desc)
        });
        assert_eq!(items[0].deadline, dated.deadline);
    }
}
