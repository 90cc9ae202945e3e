//! `ContactStore` — the ordered in-memory collection of contacts.
//!
//! Position in the sequence is the only address a contact has. The public
//! API speaks 1-based indices; translation to `Vec` offsets happens here
//! and nowhere else.

use crate::error::CoreError;

use super::types::{Contact, ContactUpdate};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactStore {
    contacts: Vec<Contact>,
}

impl From<Vec<Contact>> for ContactStore {
    fn from(contacts: Vec<Contact>) -> Self {
        Self { contacts }
    }
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// All contacts in insertion order, for persistence.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Append a contact. Callers validate name/phone before calling.
    pub fn add(&mut self, contact: Contact) {
        self.contacts.push(contact);
    }

    /// Remove and return the contact at the 1-based `index`. Contacts after
    /// it shift down by one.
    pub fn delete_at(&mut self, index: usize) -> Result<Contact, CoreError> {
        let offset = self.offset(index)?;
        let removed = self.contacts.remove(offset);
        tracing::debug!(index, remaining = self.contacts.len(), "deleted contact");
        Ok(removed)
    }

    /// Apply the non-empty fields of `update` to the contact at `index`.
    pub fn update_at(
        &mut self,
        index: usize,
        update: ContactUpdate,
    ) -> Result<&Contact, CoreError> {
        let offset = self.offset(index)?;
        let contact = &mut self.contacts[offset];
        update.apply(contact);
        tracing::debug!(index, "updated contact");
        Ok(contact)
    }

    // ========================================================================
    // Query
    // ========================================================================

    pub fn get(&self, index: usize) -> Result<&Contact, CoreError> {
        let offset = self.offset(index)?;
        Ok(&self.contacts[offset])
    }

    /// A numbered view over every contact, or `None` when the store is empty.
    pub fn list(&self) -> Option<Listing<'_>> {
        if self.contacts.is_empty() {
            return None;
        }
        Some(Listing {
            contacts: &self.contacts,
        })
    }

    /// Contacts whose name contains `query`, ignoring case.
    pub fn find_by_name(&self, query: &str) -> Vec<&Contact> {
        self.contacts
            .iter()
            .filter(|c| c.name_matches(query))
            .collect()
    }

    /// Contacts whose phone contains `query`. Unlike name search this is
    /// case-sensitive.
    pub fn find_by_phone(&self, query: &str) -> Vec<&Contact> {
        self.contacts
            .iter()
            .filter(|c| c.phone_matches(query))
            .collect()
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn offset(&self, index: usize) -> Result<usize, CoreError> {
        if index == 0 || index > self.contacts.len() {
            return Err(CoreError::OutOfRange {
                index,
                len: self.contacts.len(),
            });
        }
        Ok(index - 1)
    }
}

/// Borrowed, non-empty view over the store. Iterating it again yields the
/// same sequence as long as the store is not mutated (the borrow checker
/// guarantees it is not).
#[derive(Debug, Clone, Copy)]
pub struct Listing<'a> {
    contacts: &'a [Contact],
}

impl<'a> Listing<'a> {
    /// `(1-based index, contact)` pairs in insertion order.
    pub fn iter(&self) -> ListingIter<'a> {
        ListingIter {
            inner: self.contacts.iter().enumerate(),
        }
    }
}

impl<'a> IntoIterator for Listing<'a> {
    type Item = (usize, &'a Contact);
    type IntoIter = ListingIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct ListingIter<'a> {
    inner: std::iter::Enumerate<std::slice::Iter<'a, Contact>>,
}

impl<'a> Iterator for ListingIter<'a> {
    type Item = (usize, &'a Contact);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(offset, contact)| (offset + 1, contact))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
