//! Shared builders for `contact-book-core` unit tests.

use crate::contacts::{Category, Contact, ContactStore};

/// A contact with only the required fields set.
pub fn make_contact(category: Category, name: &str, phone: &str) -> Contact {
    Contact::new(category, name, phone, "", "")
}

/// Three contacts, one per category, with overlapping names and phones so
/// search tests have something to distinguish.
pub fn sample_store() -> ContactStore {
    ContactStore::from(vec![
        Contact::new(
            Category::Personal,
            "Ann Lee",
            "555-0100",
            "ann@example.com",
            "12 Elm St",
        ),
        Contact::new(Category::Business, "Bob Stone", "777-0199", "", "")
            .with_business_details(Some("Acme".into()), Some("CTO".into())),
        Contact::new(
            Category::General,
            "Joanne Smith",
            "555-0142",
            "",
            "Flat 3, 9 Rue de l'Église",
        ),
    ])
}
