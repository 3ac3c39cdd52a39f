//! # Attendee Registry
//!
//! The single ordered collection of attendees held by the running service.
//!
//! - Order is import/append order. No dedup, no sort.
//! - Positional index is the default identity for updates.
//! - Every record also gets an `id` that is never reused in this process, so
//!   an id from before an import can never address a record of the new one.
//! - Records are never deleted; an import replaces the whole sequence.
//!
//! Handlers share one [`SharedRegistry`], so every operation is serialized
//! behind a single lock.
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::core::export::DocumentListing;
use crate::domain::model::{
    validate_items, AttendeeRecord, AttendeeRow, NewAttendee, UpdateTarget,
};
use crate::utils::error::{CheckinError, Result};
use crate::utils::validation::Validate;

pub type SharedRegistry = Arc<Mutex<Registry>>;

#[derive(Debug, Default)]
pub struct Registry {
    records: Vec<AttendeeRecord>,
    next_id: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::new()))
    }

    fn assign_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Replaces the whole sequence with `rows`, returning the new count.
    pub fn import(&mut self, rows: Vec<AttendeeRow>) -> usize {
        self.records.clear();
        for row in rows {
            let id = self.assign_id();
            self.records.push(NewAttendee::from(row).into_record(id));
        }

        tracing::info!("Imported {} attendees", self.records.len());
        self.records.len()
    }

    pub fn list(&self) -> &[AttendeeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn update_items(&mut self, index: i128, items: Vec<String>) -> Result<&AttendeeRecord> {
        validate_items(&items)?;
        let len = self.records.len();
        let record = usize::try_from(index)
            .ok()
            .and_then(|position| self.records.get_mut(position))
            .ok_or(CheckinError::IndexOutOfRange { index, len })?;

        tracing::debug!("Updating items for attendee at {}: {:?}", index, items);
        record.items_received = items;
        Ok(record)
    }

    pub fn update_items_by_id(&mut self, id: u64, items: Vec<String>) -> Result<&AttendeeRecord> {
        validate_items(&items)?;
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(CheckinError::UnknownAttendee { id })?;

        tracing::debug!("Updating items for attendee id {}: {:?}", id, items);
        record.items_received = items;
        Ok(record)
    }

    pub fn update(&mut self, target: UpdateTarget, items: Vec<String>) -> Result<&AttendeeRecord> {
        match target {
            UpdateTarget::Index(index) => self.update_items(index, items),
            UpdateTarget::Id(id) => self.update_items_by_id(id, items),
        }
    }

    /// Validates and appends `attendee`, returning the new count.
    pub fn append(&mut self, attendee: NewAttendee) -> Result<usize> {
        attendee.validate()?;

        let id = self.assign_id();
        self.records.push(attendee.into_record(id));

        tracing::info!("Added attendee, registry now holds {}", self.records.len());
        Ok(self.records.len())
    }

    pub fn export_table(&self) -> Vec<AttendeeRow> {
        self.records.iter().map(AttendeeRecord::to_row).collect()
    }

    pub fn export_document(&self, title: &str) -> DocumentListing {
        DocumentListing::paginate(
            title,
            self.records.iter().map(AttendeeRecord::listing_line).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, designation: &str, items: &str) -> AttendeeRow {
        AttendeeRow {
            name: name.to_string(),
            designation: designation.to_string(),
            items: items.to_string(),
            ..AttendeeRow::default()
        }
    }

    fn sample_registry() -> Registry {
        let mut registry = Registry::new();
        registry.import(vec![row("Alice", "Eng", ""), row("Bob", "Sales", "Pen,Mug")]);
        registry
    }

    #[test]
    fn test_import_preserves_row_order() {
        let mut registry = Registry::new();
        let rows: Vec<_> = (0..5).map(|i| row(&format!("Guest {i}"), "", "")).collect();

        assert_eq!(registry.import(rows), 5);

        let names: Vec<_> = registry.list().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Guest 0", "Guest 1", "Guest 2", "Guest 3", "Guest 4"]);
    }

    #[test]
    fn test_import_replaces_previous_contents() {
        let mut registry = sample_registry();
        registry.append(NewAttendee::named("Carol")).unwrap();

        assert_eq!(registry.import(vec![row("Dave", "", "")]), 1);
        assert_eq!(registry.list()[0].name, "Dave");
    }

    #[test]
    fn test_import_does_not_validate_names() {
        let mut registry = Registry::new();
        assert_eq!(registry.import(vec![row("", "", "")]), 1);
    }

    #[test]
    fn test_check_in_scenario() {
        let mut registry = sample_registry();

        assert_eq!(registry.len(), 2);
        assert!(registry.list()[0].items_received.is_empty());
        assert_eq!(registry.list()[1].items_received, vec!["Pen", "Mug"]);

        registry.update_items(1, vec!["Pen".to_string()]).unwrap();
        assert_eq!(registry.list()[1].items_received, vec!["Pen"]);

        let table = registry.export_table();
        assert_eq!(table[1].name, "Bob");
        assert_eq!(table[1].items, "Pen");
    }

    #[test]
    fn test_update_touches_only_target_record() {
        let mut registry = sample_registry();
        let before = registry.list().to_vec();

        registry.update_items(0, vec!["Badge".to_string()]).unwrap();

        let after = registry.list();
        assert_eq!(after[0].items_received, vec!["Badge"]);
        assert_eq!(after[0].name, before[0].name);
        assert_eq!(after[0].designation, before[0].designation);
        assert_eq!(after[0].id, before[0].id);
        assert_eq!(after[1], before[1]);
    }

    #[test]
    fn test_update_out_of_range_leaves_registry_unchanged() {
        let mut registry = sample_registry();
        let before = registry.list().to_vec();

        for index in [2, 100, -1, i128::from(u64::MAX)] {
            let err = registry
                .update_items(index, vec!["Pen".to_string()])
                .unwrap_err();
            assert!(matches!(err, CheckinError::IndexOutOfRange { len: 2, .. }));
        }

        assert_eq!(registry.list(), before.as_slice());
    }

    #[test]
    fn test_update_rejects_items_the_table_cannot_hold() {
        let mut registry = sample_registry();
        let before = registry.list().to_vec();
        let bob_id = before[1].id;

        assert!(matches!(
            registry.update_items(0, vec!["Pen,Mug".to_string()]),
            Err(CheckinError::ValidationError { .. })
        ));
        assert!(matches!(
            registry.update_items_by_id(bob_id, vec![String::new()]),
            Err(CheckinError::ValidationError { .. })
        ));

        assert_eq!(registry.list(), before.as_slice());
    }

    #[test]
    fn test_update_by_id() {
        let mut registry = sample_registry();
        let bob_id = registry.list()[1].id;

        registry
            .update(UpdateTarget::Id(bob_id), vec!["Mug".to_string()])
            .unwrap();
        assert_eq!(registry.list()[1].items_received, vec!["Mug"]);

        assert!(matches!(
            registry.update(UpdateTarget::Id(999), vec![]),
            Err(CheckinError::UnknownAttendee { id: 999 })
        ));
    }

    #[test]
    fn test_ids_are_not_reused_across_imports() {
        let mut registry = sample_registry();
        let old_ids: Vec<_> = registry.list().iter().map(|r| r.id).collect();

        registry.import(vec![row("Carol", "", "")]);
        let new_id = registry.list()[0].id;

        assert!(!old_ids.contains(&new_id));
        assert!(registry.update_items_by_id(old_ids[0], vec![]).is_err());
    }

    #[test]
    fn test_append_adds_exactly_one_record_last() {
        let mut registry = sample_registry();
        let before = registry.list().to_vec();

        let count = registry
            .append(NewAttendee {
                name: "Carol".to_string(),
                items_received: vec!["Lanyard".to_string()],
                ..NewAttendee::default()
            })
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(&registry.list()[..2], before.as_slice());
        assert_eq!(registry.list()[2].name, "Carol");
        assert_eq!(registry.list()[2].items_received, vec!["Lanyard"]);
    }

    #[test]
    fn test_append_rejects_blank_name() {
        let mut registry = sample_registry();
        assert!(registry.append(NewAttendee::named("")).is_err());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_export_document_lines() {
        let registry = sample_registry();
        let listing = registry.export_document("Attendee List");

        assert_eq!(listing.title, "Attendee List");
        assert_eq!(
            listing.lines().collect::<Vec<_>>(),
            ["Alice - Eng - ", "Bob - Sales - Pen, Mug"]
        );
    }
}
