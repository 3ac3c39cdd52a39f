use crate::utils::error::{CheckinError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Deserializer, Serialize};

pub const COLUMN_NAME: &str = "Name";
pub const COLUMN_DESIGNATION: &str = "Designation";
pub const COLUMN_ORGANISATION: &str = "Company/Organisation";
pub const COLUMN_MOBILE: &str = "Mobile No";
pub const COLUMN_EMAIL: &str = "Email ID";
pub const COLUMN_ITEMS: &str = "Items";

/// Column order of every exported table.
pub const TABLE_HEADERS: [&str; 6] = [
    COLUMN_NAME,
    COLUMN_DESIGNATION,
    COLUMN_ORGANISATION,
    COLUMN_MOBILE,
    COLUMN_EMAIL,
    COLUMN_ITEMS,
];

const ITEM_SEPARATOR: char = ',';

/// Splits an Items cell into tokens exactly as written. Tokens are not trimmed.
pub fn split_items(cell: &str) -> Vec<String> {
    if cell.is_empty() {
        return Vec::new();
    }
    cell.split(ITEM_SEPARATOR).map(str::to_string).collect()
}

/// Inverse of [`split_items`] for lists accepted by [`validate_items`].
pub fn join_items(items: &[String]) -> String {
    items.join(",")
}

/// Rejects item lists that a table export could not reproduce on re-import:
/// tokens holding the separator, and a list made of one empty token.
pub fn validate_items(items: &[String]) -> Result<()> {
    if let Some(item) = items.iter().find(|item| item.contains(ITEM_SEPARATOR)) {
        return Err(CheckinError::validation(
            "items_received",
            format!("item '{item}' cannot contain '{ITEM_SEPARATOR}'"),
        ));
    }
    if matches!(items, [only] if only.is_empty()) {
        return Err(CheckinError::validation(
            "items_received",
            "a lone empty item cannot be stored",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeRecord {
    pub id: u64,
    pub name: String,
    pub designation: String,
    pub organisation: String,
    pub mobile: String,
    pub email: String,
    pub items_received: Vec<String>,
}

impl AttendeeRecord {
    pub fn to_row(&self) -> AttendeeRow {
        AttendeeRow {
            name: self.name.clone(),
            designation: self.designation.clone(),
            organisation: self.organisation.clone(),
            mobile: self.mobile.clone(),
            email: self.email.clone(),
            items: join_items(&self.items_received),
        }
    }

    /// `name - designation - items` line used by the printable listing.
    pub fn listing_line(&self) -> String {
        format!(
            "{} - {} - {}",
            self.name,
            self.designation,
            self.items_received.join(", ")
        )
    }
}

/// One spreadsheet row, every cell as text, in [`TABLE_HEADERS`] order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeRow {
    pub name: String,
    pub designation: String,
    pub organisation: String,
    pub mobile: String,
    pub email: String,
    pub items: String,
}

impl AttendeeRow {
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.name,
            &self.designation,
            &self.organisation,
            &self.mobile,
            &self.email,
            &self.items,
        ]
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An attendee that has not been given an id yet, either from an import row or a JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewAttendee {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub designation: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        alias = "company",
        alias = "organization"
    )]
    pub organisation: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mobile: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items_received: Vec<String>,
}

impl NewAttendee {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn into_record(self, id: u64) -> AttendeeRecord {
        AttendeeRecord {
            id,
            name: self.name,
            designation: self.designation,
            organisation: self.organisation,
            mobile: self.mobile,
            email: self.email,
            items_received: self.items_received,
        }
    }
}

impl From<AttendeeRow> for NewAttendee {
    fn from(row: AttendeeRow) -> Self {
        let items_received = split_items(&row.items);
        Self {
            name: row.name,
            designation: row.designation,
            organisation: row.organisation,
            mobile: row.mobile,
            email: row.email,
            items_received,
        }
    }
}

impl Validate for NewAttendee {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CheckinError::validation("name", "cannot be empty"));
        }
        validate_items(&self.items_received)
    }
}

/// Which record an items update applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTarget {
    Index(i128),
    Id(u64),
}

/// Body of `POST /attendees`.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemsUpdate {
    #[serde(default)]
    pub index: Option<serde_json::Number>,
    #[serde(default)]
    pub id: Option<u64>,
    pub items_received: Vec<String>,
}

/// Widens a JSON number to a position. Integers too large for `u64` arrive as
/// floats; they are still positions, just never valid ones.
fn position(number: &serde_json::Number) -> Result<i128> {
    if let Some(value) = number.as_i64() {
        return Ok(value.into());
    }
    if let Some(value) = number.as_u64() {
        return Ok(value.into());
    }
    match number.as_f64() {
        Some(value) if value.fract() == 0.0 && value.abs() > u64::MAX as f64 => Ok(value as i128),
        _ => Err(CheckinError::malformed_json(format!(
            "'index' must be an integer, got {number}"
        ))),
    }
}

impl ItemsUpdate {
    pub fn target(&self) -> Result<UpdateTarget> {
        match (&self.index, self.id) {
            (Some(index), None) => Ok(UpdateTarget::Index(position(index)?)),
            (None, Some(id)) => Ok(UpdateTarget::Id(id)),
            (Some(_), Some(_)) => Err(CheckinError::validation(
                "index",
                "give either 'index' or 'id', not both",
            )),
            (None, None) => Err(CheckinError::malformed_json(
                "expected an 'index' or 'id' field",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub message: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_items_keeps_tokens_as_written() {
        assert_eq!(split_items("A,B, C"), vec!["A", "B", " C"]);
        assert_eq!(split_items("A,,B"), vec!["A", "", "B"]);
        assert!(split_items("").is_empty());
    }

    #[test]
    fn test_validate_items_rejects_unexportable_lists() {
        fn items(tokens: &[&str]) -> Vec<String> {
            tokens.iter().map(|t| t.to_string()).collect()
        }

        assert!(validate_items(&[]).is_ok());
        assert!(validate_items(&items(&["Pen", " Mug"])).is_ok());
        assert!(validate_items(&items(&["A", "", "B"])).is_ok());

        for bad in [items(&["Pen,Mug"]), items(&[""]), items(&["Badge", "a,b"])] {
            let err = validate_items(&bad).unwrap_err();
            assert!(matches!(
                err,
                CheckinError::ValidationError { ref field, .. } if field == "items_received"
            ));
        }
    }

    #[test]
    fn test_lists_accepted_by_validation_survive_join_and_split() {
        let lists = [
            vec![],
            vec!["Pen".to_string()],
            vec!["A".to_string(), "".to_string()],
            vec!["".to_string(), " C".to_string()],
        ];

        for items in lists {
            validate_items(&items).unwrap();
            assert_eq!(split_items(&join_items(&items)), items);
        }
    }

    #[test]
    fn test_row_round_trips_through_record() {
        let row = AttendeeRow {
            name: "Bob".to_string(),
            designation: "Sales".to_string(),
            items: "Pen,Mug".to_string(),
            ..AttendeeRow::default()
        };

        let record = NewAttendee::from(row.clone()).into_record(7);
        assert_eq!(record.items_received, vec!["Pen", "Mug"]);
        assert_eq!(record.to_row(), row);
    }

    #[test]
    fn test_listing_line_format() {
        let record = NewAttendee {
            name: "Bob".to_string(),
            designation: "Sales".to_string(),
            items_received: vec!["Pen".to_string(), "Mug".to_string()],
            ..NewAttendee::default()
        }
        .into_record(1);

        assert_eq!(record.listing_line(), "Bob - Sales - Pen, Mug");
    }

    #[test]
    fn test_new_attendee_defaults_missing_and_null_fields() {
        let attendee: NewAttendee = serde_json::from_value(serde_json::json!({
            "name": "Carol",
            "designation": null,
            "company": "Acme",
            "unexpected": 42
        }))
        .unwrap();

        assert_eq!(attendee.name, "Carol");
        assert_eq!(attendee.designation, "");
        assert_eq!(attendee.organisation, "Acme");
        assert!(attendee.items_received.is_empty());
        assert!(attendee.validate().is_ok());
    }

    #[test]
    fn test_new_attendee_requires_name() {
        let missing = serde_json::from_value::<NewAttendee>(serde_json::json!({
            "designation": "Eng"
        }));
        assert!(missing.is_err());

        assert!(NewAttendee::named("   ").validate().is_err());
    }

    #[test]
    fn test_new_attendee_rejects_items_with_separator() {
        let attendee = NewAttendee {
            items_received: vec!["Pen,Mug".to_string()],
            ..NewAttendee::named("Carol")
        };
        assert!(matches!(
            attendee.validate(),
            Err(CheckinError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_items_update_target() {
        let by_index: ItemsUpdate =
            serde_json::from_str(r#"{"index": 1, "items_received": ["Pen"]}"#).unwrap();
        assert_eq!(by_index.target().unwrap(), UpdateTarget::Index(1));

        let by_id: ItemsUpdate =
            serde_json::from_str(r#"{"id": 9, "items_received": []}"#).unwrap();
        assert_eq!(by_id.target().unwrap(), UpdateTarget::Id(9));

        let neither: ItemsUpdate = serde_json::from_str(r#"{"items_received": []}"#).unwrap();
        assert!(matches!(
            neither.target(),
            Err(CheckinError::MalformedJson { .. })
        ));

        let fractional: ItemsUpdate =
            serde_json::from_str(r#"{"index": 1.5, "items_received": []}"#).unwrap();
        assert!(matches!(
            fractional.target(),
            Err(CheckinError::MalformedJson { .. })
        ));

        let both: ItemsUpdate =
            serde_json::from_str(r#"{"index": 0, "id": 0, "items_received": []}"#).unwrap();
        assert!(matches!(
            both.target(),
            Err(CheckinError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_items_update_index_beyond_i64() {
        let past_i64: ItemsUpdate =
            serde_json::from_str(r#"{"index": 18446744073709551615, "items_received": []}"#)
                .unwrap();
        assert_eq!(
            past_i64.target().unwrap(),
            UpdateTarget::Index(i128::from(u64::MAX))
        );

        let past_u64: ItemsUpdate = serde_json::from_str(
            r#"{"index": 100000000000000000000000000000, "items_received": []}"#,
        )
        .unwrap();
        assert!(matches!(
            past_u64.target().unwrap(),
            UpdateTarget::Index(index) if index > i128::from(u64::MAX)
        ));
    }
}
