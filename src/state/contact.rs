//! Fixed-shape contact record
//!
//! Every field is an explicit optional slot. Repeated fields are capped at
//! two occurrences (`phone1`/`phone2`, ...); further matches are discarded by
//! the extractor.

use std::fmt;

/// Named columns of a contact record, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContactField {
    Phone1,
    Phone2,
    Email1,
    Email2,
    Salutation1,
    FirstName1,
    LastName1,
    Salutation2,
    FirstName2,
    LastName2,
    Website1,
    Website2,
    Source,
}

impl ContactField {
    pub const ALL: [ContactField; 13] = [
        Self::Phone1,
        Self::Phone2,
        Self::Email1,
        Self::Email2,
        Self::Salutation1,
        Self::FirstName1,
        Self::LastName1,
        Self::Salutation2,
        Self::FirstName2,
        Self::LastName2,
        Self::Website1,
        Self::Website2,
        Self::Source,
    ];

    /// Column name used in output headers
    pub fn name(&self) -> &'static str {
        match self {
            Self::Phone1 => "phone1",
            Self::Phone2 => "phone2",
            Self::Email1 => "email1",
            Self::Email2 => "email2",
            Self::Salutation1 => "salutation1",
            Self::FirstName1 => "first_name1",
            Self::LastName1 => "last_name1",
            Self::Salutation2 => "salutation2",
            Self::FirstName2 => "first_name2",
            Self::LastName2 => "last_name2",
            Self::Website1 => "website1",
            Self::Website2 => "website2",
            Self::Source => "source",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One candidate contact found on a page
///
/// `None` means the slot is unpopulated; empty strings are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ContactRecord {
    pub phone1: Option<String>,
    pub phone2: Option<String>,
    pub email1: Option<String>,
    pub email2: Option<String>,
    pub salutation1: Option<String>,
    pub first_name1: Option<String>,
    pub last_name1: Option<String>,
    pub salutation2: Option<String>,
    pub first_name2: Option<String>,
    pub last_name2: Option<String>,
    pub website1: Option<String>,
    pub website2: Option<String>,
    pub source: String,
}

/// Populated `(field, value)` pairs in field order
pub type IdentityKey = Vec<(ContactField, String)>;

impl ContactRecord {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Returns the value of a field, `None` when unpopulated
    pub fn get(&self, field: ContactField) -> Option<&str> {
        match self.slot(field) {
            Some(slot) => slot.as_deref(),
            None => Some(self.source.as_str()).filter(|s| !s.is_empty()),
        }
    }

    /// Sets a field; empty or whitespace-only values clear the slot
    pub fn set(&mut self, field: ContactField, value: Option<String>) {
        let value = value.filter(|v| !v.trim().is_empty());
        match self.slot_mut(field) {
            Some(slot) => *slot = value,
            None => self.source = value.unwrap_or_default(),
        }
    }

    /// Unordered set of populated `(field, value)` pairs, as a canonical sorted list
    ///
    /// Two records with the same key are the same record.
    pub fn identity_key(&self) -> IdentityKey {
        ContactField::ALL
            .iter()
            .filter_map(|field| self.get(*field).map(|v| (*field, v.to_string())))
            .collect()
    }

    /// True if at least one phone or email slot is populated
    pub fn has_channel(&self) -> bool {
        [
            ContactField::Phone1,
            ContactField::Phone2,
            ContactField::Email1,
            ContactField::Email2,
        ]
        .iter()
        .any(|f| self.get(*f).is_some())
    }

    // `None` for `Source`, which is not an optional slot
    fn slot(&self, field: ContactField) -> Option<&Option<String>> {
        Some(match field {
            ContactField::Phone1 => &self.phone1,
            ContactField::Phone2 => &self.phone2,
            ContactField::Email1 => &self.email1,
            ContactField::Email2 => &self.email2,
            ContactField::Salutation1 => &self.salutation1,
            ContactField::FirstName1 => &self.first_name1,
            ContactField::LastName1 => &self.last_name1,
            ContactField::Salutation2 => &self.salutation2,
            ContactField::FirstName2 => &self.first_name2,
            ContactField::LastName2 => &self.last_name2,
            ContactField::Website1 => &self.website1,
            ContactField::Website2 => &self.website2,
            ContactField::Source => return None,
        })
    }

    fn slot_mut(&mut self, field: ContactField) -> Option<&mut Option<String>> {
        Some(match field {
            ContactField::Phone1 => &mut self.phone1,
            ContactField::Phone2 => &mut self.phone2,
            ContactField::Email1 => &mut self.email1,
            ContactField::Email2 => &mut self.email2,
            ContactField::Salutation1 => &mut self.salutation1,
            ContactField::FirstName1 => &mut self.first_name1,
            ContactField::LastName1 => &mut self.last_name1,
            ContactField::Salutation2 => &mut self.salutation2,
            ContactField::FirstName2 => &mut self.first_name2,
            ContactField::LastName2 => &mut self.last_name2,
            ContactField::Website1 => &mut self.website1,
            ContactField::Website2 => &mut self.website2,
            ContactField::Source => return None,
        })
    }
}
