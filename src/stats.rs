//! Pure aggregates over the complaints collection, consumed by the admin
//! dashboard. Not part of the storage contract.

use crate::records::{Complaint, ComplaintStatus};

pub struct StatusCount {
    pub status: ComplaintStatus,
    pub count: usize,
    /// Share of the total, preformatted to one decimal ("42.9").
    pub percentage: String,
}

pub struct CategoryCount {
    pub category: String,
    pub count: usize,
    pub percentage: String,
}

/// One bucket per status in lifecycle order, including empty ones, so the
/// dashboard tiles always render all three.
pub fn status_counts(complaints: &[Complaint]) -> Vec<StatusCount> {
    let total = complaints.len();
    [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
    ]
    .into_iter()
    .map(|status| {
        let count = complaints
            .iter()
            .filter(|complaint| complaint.status == status)
            .count();
        StatusCount {
            status,
            count,
            percentage: percentage(count, total),
        }
    })
    .collect()
}

/// Buckets in first-seen order, the way the source accumulated them.
pub fn category_counts(complaints: &[Complaint]) -> Vec<CategoryCount> {
    let total = complaints.len();
    let mut buckets: Vec<(String, usize)> = Vec::new();
    for complaint in complaints {
        match buckets
            .iter_mut()
            .find(|(category, _)| *category == complaint.category)
        {
            Some((_, count)) => *count += 1,
            None => buckets.push((complaint.category.clone(), 1)),
        }
    }
    buckets
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

fn percentage(count: usize, total: usize) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", (count as f64 / total as f64) * 100.0)
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::records::record_id;
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    fn complaint(category: &str, status: ComplaintStatus, at: &str) -> Complaint {
        let now = OffsetDateTime::parse(at, &Rfc3339).expect("parse time");
        Complaint {
            id: record_id(now),
            name: "Alice".to_string(),
            building_code: "HR 307".to_string(),
            category: category.to_string(),
            complaint: "Details".to_string(),
            status,
            created_at: now,
            response: None,
        }
    }

    #[test]
    fn status_counts__should_cover_all_statuses_in_order() {
        // Given
        let complaints = vec![
            complaint("Plumbing", ComplaintStatus::Pending, "2025-01-12T09:30:00Z"),
            complaint("Electrical", ComplaintStatus::Pending, "2025-01-12T09:31:00Z"),
            complaint("Plumbing", ComplaintStatus::Resolved, "2025-01-12T09:32:00Z"),
        ];

        // When
        let counts = status_counts(&complaints);

        // Then
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[0].status, ComplaintStatus::Pending);
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].status, ComplaintStatus::InProgress);
        assert_eq!(counts[1].count, 0);
        assert_eq!(counts[2].status, ComplaintStatus::Resolved);
        assert_eq!(counts[2].count, 1);

        let percentages: Vec<&str> = counts.iter().map(|c| c.percentage.as_str()).collect();
        assert_eq!(percentages, vec!["66.7", "0.0", "33.3"]);
    }

    #[test]
    fn category_counts__should_keep_first_seen_order() {
        // Given
        let complaints = vec![
            complaint("Plumbing", ComplaintStatus::Pending, "2025-01-12T09:30:00Z"),
            complaint("Electrical", ComplaintStatus::Pending, "2025-01-12T09:31:00Z"),
            complaint("Plumbing", ComplaintStatus::Pending, "2025-01-12T09:32:00Z"),
        ];

        // When
        let counts = category_counts(&complaints);

        // Then
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].category, "Plumbing");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].category, "Electrical");
        assert_eq!(counts[1].count, 1);
    }

    #[test]
    fn aggregates__should_be_empty_for_no_complaints() {
        // Then
        assert!(category_counts(&[]).is_empty());
        let counts = status_counts(&[]);
        assert!(counts.iter().all(|c| c.count == 0));
    }
}
