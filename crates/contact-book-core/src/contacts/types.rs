//! Contact record types: the `Category` enum, the `Contact` record itself,
//! and the partial `ContactUpdate` applied by edits.

use serde::{Deserialize, Serialize};

// ==============================================================================
// Category
// ==============================================================================

/// The kind of contact. Unknown labels always normalize to `General`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    General,
    Personal,
    Business,
}

impl Category {
    /// Case-insensitive parse of a stored type label. Anything other than
    /// `personal` or `business` (including empty) is `General`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("personal") {
            Self::Personal
        } else if label.eq_ignore_ascii_case("business") {
            Self::Business
        } else {
            Self::General
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::General => write!(f, "general"),
            Self::Personal => write!(f, "personal"),
            Self::Business => write!(f, "business"),
        }
    }
}

// ==============================================================================
// Contact
// ==============================================================================

/// A single contact record.
///
/// `company` and `job_title` only carry values for `Category::Business`;
/// the constructors drop them for every other category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
}

impl Contact {
    pub fn new(
        category: Category,
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            address: address.into(),
            category,
            company: None,
            job_title: None,
        }
    }

    /// Attach business details. Empty strings are stored as `None`, and the
    /// call is a no-op unless the contact is a business contact.
    pub fn with_business_details(
        mut self,
        company: Option<String>,
        job_title: Option<String>,
    ) -> Self {
        if self.category == Category::Business {
            self.company = non_empty(company);
            self.job_title = non_empty(job_title);
        }
        self
    }

    /// Case-insensitive substring match against the name.
    pub fn name_matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }

    /// Case-sensitive substring match against the phone number.
    pub fn phone_matches(&self, query: &str) -> bool {
        self.phone.contains(query)
    }

    /// One-line human readable summary, prefixed by category.
    pub fn summary(&self) -> String {
        let base = format!(
            "{} | {} | {} | {}",
            self.name, self.phone, self.email, self.address
        );
        match self.category {
            Category::General => base,
            Category::Personal => format!("[Personal] {base}"),
            Category::Business => {
                let mut line = format!("[Business] {base}");
                if let Some(company) = &self.company {
                    line.push_str(" | ");
                    line.push_str(company);
                }
                if let Some(job_title) = &self.job_title {
                    line.push_str(" - ");
                    line.push_str(job_title);
                }
                line
            }
        }
    }
}

// ==============================================================================
// Partial Update
// ==============================================================================

/// Fields to change on an existing contact. `None` and empty strings both
/// mean "keep the current value"; an update can never clear a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
}

impl ContactUpdate {
    pub(super) fn apply(self, contact: &mut Contact) {
        if let Some(name) = non_empty(self.name) {
            contact.name = name;
        }
        if let Some(phone) = non_empty(self.phone) {
            contact.phone = phone;
        }
        if let Some(email) = non_empty(self.email) {
            contact.email = email;
        }
        if let Some(address) = non_empty(self.address) {
            contact.address = address;
        }

        // Business details are ignored on other categories.
        if contact.category != Category::Business {
            return;
        }
        if let Some(company) = non_empty(self.company) {
            contact.company = Some(company);
        }
        if let Some(job_title) = non_empty(self.job_title) {
            contact.job_title = Some(job_title);
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
