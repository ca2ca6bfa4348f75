use time::OffsetDateTime;

use crate::records::{Complaint, ComplaintStatus, record_id};
use crate::store::{Store, StoreError};

pub(crate) const COMPLAINTS_KEY: &str = "complaints";

#[derive(Clone)]
pub struct ComplaintsRepository {
    store: Store,
}

pub struct NewComplaint {
    pub name: String,
    pub building_code: String,
    pub category: String,
    pub complaint: String,
}

impl ComplaintsRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn load_all(&self) -> Vec<Complaint> {
        super::load_collection(&self.store, COMPLAINTS_KEY)
    }

    pub fn save_all(&self, complaints: &[Complaint]) -> Result<(), StoreError> {
        super::save_collection(&self.store, COMPLAINTS_KEY, complaints)
    }

    /// New complaints always start out pending with no response.
    pub fn submit(&self, new: NewComplaint, now: OffsetDateTime) -> Result<Complaint, StoreError> {
        let _guard = self.store.lock();
        let mut complaints = self.load_all();
        let complaint = Complaint {
            id: record_id(now),
            name: new.name,
            building_code: new.building_code,
            category: new.category,
            complaint: new.complaint,
            status: ComplaintStatus::Pending,
            created_at: now,
            response: None,
        };
        complaints.push(complaint.clone());
        self.save_all(&complaints)?;
        Ok(complaint)
    }

    pub fn find(&self, id: i64) -> Option<Complaint> {
        self.load_all()
            .into_iter()
            .find(|complaint| complaint.id == id)
    }

    pub fn for_user(&self, name: &str) -> Vec<Complaint> {
        self.load_all()
            .into_iter()
            .filter(|complaint| complaint.name == name)
            .collect()
    }

    /// Transitions are unordered; any status may be set at any time and
    /// resolved complaints can reopen.
    pub fn set_status(
        &self,
        id: i64,
        status: ComplaintStatus,
    ) -> Result<Option<Complaint>, StoreError> {
        self.update(id, |complaint| complaint.status = status)
    }

    /// Recording a response resolves the complaint in the same write.
    pub fn respond(&self, id: i64, response: &str) -> Result<Option<Complaint>, StoreError> {
        self.update(id, |complaint| {
            complaint.response = Some(response.to_string());
            complaint.status = ComplaintStatus::Resolved;
        })
    }

    fn update(
        &self,
        id: i64,
        patch: impl FnOnce(&mut Complaint),
    ) -> Result<Option<Complaint>, StoreError> {
        let _guard = self.store.lock();
        let mut complaints = self.load_all();
        let Some(complaint) = complaints.iter_mut().find(|complaint| complaint.id == id) else {
            return Ok(None);
        };
        patch(complaint);
        let updated = complaint.clone();
        self.save_all(&complaints)?;
        Ok(Some(updated))
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use time::format_description::well_known::Rfc3339;

    fn repository(root: &PathBuf) -> ComplaintsRepository {
        ComplaintsRepository::new(Store::open(root).expect("open store"))
    }

    fn parse_time(raw: &str) -> OffsetDateTime {
        OffsetDateTime::parse(raw, &Rfc3339).expect("parse time")
    }

    fn leak_complaint() -> NewComplaint {
        NewComplaint {
            name: "Alice".to_string(),
            building_code: "HR 307".to_string(),
            category: "Plumbing".to_string(),
            complaint: "Leak".to_string(),
        }
    }

    #[test]
    fn submit__should_initialize_pending_with_no_response() {
        // Given
        let root = create_temp_root("submit");
        let complaints = repository(&root);
        let now = parse_time("2025-01-12T09:30:00Z");

        // When
        let complaint = complaints.submit(leak_complaint(), now).expect("submit");

        // Then
        assert_eq!(complaint.status, ComplaintStatus::Pending);
        assert!(complaint.response.is_none());
        assert_eq!(complaint.id, record_id(now));
        assert_eq!(complaints.load_all().len(), 1);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn submit__should_assign_fresh_ids_for_distinct_instants() {
        // Given
        let root = create_temp_root("fresh-ids");
        let complaints = repository(&root);
        let first_at = parse_time("2025-01-12T09:30:00Z");
        let second_at = parse_time("2025-01-12T09:30:00.250Z");

        // When
        let first = complaints.submit(leak_complaint(), first_at).expect("first");
        let second = complaints
            .submit(leak_complaint(), second_at)
            .expect("second");

        // Then
        assert_ne!(first.id, second.id);
        let ids: Vec<i64> = complaints.load_all().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn set_status__should_change_status_and_nothing_else() {
        // Given
        let root = create_temp_root("set-status");
        let complaints = repository(&root);
        let now = parse_time("2025-01-12T09:30:00Z");
        let submitted = complaints.submit(leak_complaint(), now).expect("submit");

        // When
        complaints
            .set_status(submitted.id, ComplaintStatus::InProgress)
            .expect("set status")
            .expect("complaint found");

        // Then
        let reread = complaints.find(submitted.id).expect("find");
        assert_eq!(reread.status, ComplaintStatus::InProgress);
        assert_eq!(reread.name, "Alice");
        assert_eq!(reread.building_code, "HR 307");
        assert_eq!(reread.category, "Plumbing");
        assert_eq!(reread.complaint, "Leak");
        assert_eq!(reread.created_at, now);
        assert!(reread.response.is_none());

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn set_status__should_reopen_resolved_complaints() {
        // Given
        let root = create_temp_root("reopen");
        let complaints = repository(&root);
        let now = parse_time("2025-01-12T09:30:00Z");
        let submitted = complaints.submit(leak_complaint(), now).expect("submit");
        complaints
            .set_status(submitted.id, ComplaintStatus::Resolved)
            .expect("resolve");

        // When
        complaints
            .set_status(submitted.id, ComplaintStatus::Pending)
            .expect("reopen");

        // Then
        let reread = complaints.find(submitted.id).expect("find");
        assert_eq!(reread.status, ComplaintStatus::Pending);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn set_status__should_return_none_for_unknown_id() {
        // Given
        let root = create_temp_root("unknown-id");
        let complaints = repository(&root);

        // When
        let updated = complaints
            .set_status(42, ComplaintStatus::Resolved)
            .expect("set status");

        // Then
        assert!(updated.is_none());

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn respond__should_set_response_and_resolve_in_one_write() {
        // Given
        let root = create_temp_root("respond");
        let complaints = repository(&root);
        let now = parse_time("2025-01-12T09:30:00Z");
        let submitted = complaints.submit(leak_complaint(), now).expect("submit");

        // When
        complaints
            .respond(submitted.id, "A plumber is on the way.")
            .expect("respond");

        // Then
        let reread = complaints.find(submitted.id).expect("find");
        assert_eq!(reread.status, ComplaintStatus::Resolved);
        assert_eq!(reread.response.as_deref(), Some("A plumber is on the way."));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn for_user__should_filter_by_submitter_name() {
        // Given
        let root = create_temp_root("for-user");
        let complaints = repository(&root);
        complaints
            .submit(leak_complaint(), parse_time("2025-01-12T09:30:00Z"))
            .expect("alice");
        complaints
            .submit(
                NewComplaint {
                    name: "Bob".to_string(),
                    building_code: "BL 202".to_string(),
                    category: "Noise Complaint".to_string(),
                    complaint: "Loud music".to_string(),
                },
                parse_time("2025-01-12T09:31:00Z"),
            )
            .expect("bob");

        // When
        let mine = complaints.for_user("Alice");

        // Then
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "Alice");

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn load_all__should_return_exactly_the_last_written_sequence() {
        // Given
        let root = create_temp_root("roundtrip");
        let complaints = repository(&root);
        let first = complaints
            .submit(leak_complaint(), parse_time("2025-01-12T09:30:00Z"))
            .expect("submit");
        let second = complaints
            .submit(leak_complaint(), parse_time("2025-01-12T09:31:00Z"))
            .expect("submit");

        // When
        let mut rewritten = vec![second.clone(), first.clone()];
        rewritten[0].status = ComplaintStatus::Resolved;
        complaints.save_all(&rewritten).expect("save all");

        // Then
        let reread = complaints.load_all();
        assert_eq!(reread.len(), 2);
        assert_eq!(reread[0].id, second.id);
        assert_eq!(reread[0].status, ComplaintStatus::Resolved);
        assert_eq!(reread[1].id, first.id);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn load_all__should_return_empty_when_key_absent() {
        // Given
        let root = create_temp_root("absent");

        // When
        let complaints = repository(&root).load_all();

        // Then
        assert!(complaints.is_empty());

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    fn create_temp_root(test_name: &str) -> PathBuf {
        let mut root = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        root.push(format!("complaintdesk-complaints-{}-{}", test_name, nanos));
        std::fs::create_dir_all(&root).expect("create temp dir");
        root
    }
}
