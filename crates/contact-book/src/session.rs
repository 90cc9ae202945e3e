//! Interactive menu loop.
//!
//! The session owns the store for the lifetime of the menu and talks to the
//! user through any `BufRead`/`Write` pair, so tests can script it. End of
//! input anywhere ends the session the same way the exit option does.
//! Every successful add, edit or delete is written to the data file right
//! away, so a killed session keeps what it already confirmed.

use std::io::{BufRead, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;

use contact_book_core::{
    Category, Contact, ContactStore, ContactUpdate, CoreError, CsvCodec, ExportFormat,
};

/// Where the export action writes to.
#[derive(Debug, Clone)]
pub struct ExportTarget {
    pub path: PathBuf,
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    AddPersonal,
    AddBusiness,
    List,
    SearchName,
    SearchPhone,
    Edit,
    Delete,
    Export,
    Exit,
}

impl MenuChoice {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "1" => Some(Self::AddPersonal),
            "2" => Some(Self::AddBusiness),
            "3" => Some(Self::List),
            "4" => Some(Self::SearchName),
            "5" => Some(Self::SearchPhone),
            "6" => Some(Self::Edit),
            "7" => Some(Self::Delete),
            "8" => Some(Self::Export),
            "9" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Outcome of asking the user to pick a contact by number.
enum Selection {
    Chosen(usize),
    Cancelled,
    EndOfInput,
}

type Step = eyre::Result<ControlFlow<()>>;

pub struct Session<R, W> {
    store: ContactStore,
    codec: CsvCodec,
    data_path: PathBuf,
    export: ExportTarget,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(
        store: ContactStore,
        codec: CsvCodec,
        data_path: PathBuf,
        export: ExportTarget,
        input: R,
        output: W,
    ) -> Self {
        Self {
            store,
            codec,
            data_path,
            export,
            input,
            output,
        }
    }

    /// Hand the store back to the driver once the menu is done.
    pub fn into_store(self) -> ContactStore {
        self.store
    }

    /// Run the menu until the user exits or input runs out.
    pub fn run(&mut self) -> eyre::Result<()> {
        loop {
            self.print_menu()?;
            let Some(raw) = self.prompt("Choose an option (1-9): ")? else {
                return Ok(());
            };

            let step = match MenuChoice::parse(&raw) {
                Some(MenuChoice::AddPersonal) => self.add(Category::Personal)?,
                Some(MenuChoice::AddBusiness) => self.add(Category::Business)?,
                Some(MenuChoice::List) => self.list()?,
                Some(MenuChoice::SearchName) => self.search_by_name()?,
                Some(MenuChoice::SearchPhone) => self.search_by_phone()?,
                Some(MenuChoice::Edit) => self.edit()?,
                Some(MenuChoice::Delete) => self.delete()?,
                Some(MenuChoice::Export) => self.export()?,
                Some(MenuChoice::Exit) => ControlFlow::Break(()),
                None => {
                    writeln!(self.output, "Invalid choice, please enter a number from 1 to 9.")?;
                    ControlFlow::Continue(())
                }
            };

            if step.is_break() {
                return Ok(());
            }
        }
    }

    // ========================================================================
    // Actions
    // ========================================================================

    fn add(&mut self, category: Category) -> Step {
        let title = match category {
            Category::Business => "BUSINESS",
            Category::Personal | Category::General => "PERSONAL",
        };
        writeln!(self.output, "\n=== ADD {title} CONTACT ===")?;

        let Some(name) = self.prompt("Name: ")? else {
            return Ok(ControlFlow::Break(()));
        };
        let Some(phone) = self.prompt("Phone number: ")? else {
            return Ok(ControlFlow::Break(()));
        };
        let Some(email) = self.prompt("Email: ")? else {
            return Ok(ControlFlow::Break(()));
        };
        let Some(address) = self.prompt("Address: ")? else {
            return Ok(ControlFlow::Break(()));
        };

        let (company, job_title) = if category == Category::Business {
            let Some(company) = self.prompt("Company (optional): ")? else {
                return Ok(ControlFlow::Break(()));
            };
            let Some(job_title) = self.prompt("Job title (optional): ")? else {
                return Ok(ControlFlow::Break(()));
            };
            (Some(company), Some(job_title))
        } else {
            (None, None)
        };

        if name.is_empty() || phone.is_empty() {
            writeln!(self.output, "Name and phone number are required.")?;
            return Ok(ControlFlow::Continue(()));
        }

        let contact = Contact::new(category, name, phone, email, address)
            .with_business_details(company, job_title);
        self.store.add(contact);
        tracing::debug!(count = self.store.len(), %category, "added contact");
        writeln!(self.output, "Contact added.")?;
        self.persist()?;
        Ok(ControlFlow::Continue(()))
    }

    fn list(&mut self) -> Step {
        self.print_listing()?;
        Ok(ControlFlow::Continue(()))
    }

    fn search_by_name(&mut self) -> Step {
        let Some(query) = self.prompt("Enter name or part of it: ")? else {
            return Ok(ControlFlow::Break(()));
        };
        if query.is_empty() {
            writeln!(self.output, "Empty search.")?;
            return Ok(ControlFlow::Continue(()));
        }

        let lines: Vec<String> = self
            .store
            .find_by_name(&query)
            .into_iter()
            .map(Contact::summary)
            .collect();
        self.print_matches(&format!("name containing '{query}'"), &lines)?;
        Ok(ControlFlow::Continue(()))
    }

    fn search_by_phone(&mut self) -> Step {
        let Some(query) = self.prompt("Enter phone number or part of it: ")? else {
            return Ok(ControlFlow::Break(()));
        };
        if query.is_empty() {
            writeln!(self.output, "Empty search.")?;
            return Ok(ControlFlow::Continue(()));
        }

        let lines: Vec<String> = self
            .store
            .find_by_phone(&query)
            .into_iter()
            .map(Contact::summary)
            .collect();
        self.print_matches(&format!("phone containing '{query}'"), &lines)?;
        Ok(ControlFlow::Continue(()))
    }

    fn edit(&mut self) -> Step {
        let index = match self.choose_contact("edit")? {
            Selection::Chosen(index) => index,
            Selection::Cancelled => return Ok(ControlFlow::Continue(())),
            Selection::EndOfInput => return Ok(ControlFlow::Break(())),
        };
        let current = match self.store.get(index) {
            Ok(contact) => contact.clone(),
            Err(err) => {
                self.report_store_error(&err)?;
                return Ok(ControlFlow::Continue(()));
            }
        };

        writeln!(self.output, "\nEditing contact:\n{}", current.summary())?;
        writeln!(self.output, "Press Enter to keep the current value.")?;

        let mut update = ContactUpdate::default();
        let Some(name) = self.prompt(&format!("New name [{}]: ", current.name))? else {
            return Ok(ControlFlow::Break(()));
        };
        update.name = Some(name);
        let Some(phone) = self.prompt(&format!("New phone number [{}]: ", current.phone))? else {
            return Ok(ControlFlow::Break(()));
        };
        update.phone = Some(phone);
        let Some(email) = self.prompt(&format!("New email [{}]: ", current.email))? else {
            return Ok(ControlFlow::Break(()));
        };
        update.email = Some(email);
        let Some(address) = self.prompt(&format!("New address [{}]: ", current.address))? else {
            return Ok(ControlFlow::Break(()));
        };
        update.address = Some(address);

        if current.category == Category::Business {
            let company = current.company.as_deref().unwrap_or_default();
            let Some(company) = self.prompt(&format!("New company [{company}]: "))? else {
                return Ok(ControlFlow::Break(()));
            };
            update.company = Some(company);
            let job_title = current.job_title.as_deref().unwrap_or_default();
            let Some(job_title) = self.prompt(&format!("New job title [{job_title}]: "))? else {
                return Ok(ControlFlow::Break(()));
            };
            update.job_title = Some(job_title);
        }

        match self.store.update_at(index, update) {
            Ok(updated) => {
                let summary = updated.summary();
                writeln!(self.output, "Contact updated:\n{summary}")?;
                self.persist()?;
            }
            Err(err) => self.report_store_error(&err)?,
        }
        Ok(ControlFlow::Continue(()))
    }

    fn delete(&mut self) -> Step {
        let index = match self.choose_contact("delete")? {
            Selection::Chosen(index) => index,
            Selection::Cancelled => return Ok(ControlFlow::Continue(())),
            Selection::EndOfInput => return Ok(ControlFlow::Break(())),
        };
        let summary = match self.store.get(index) {
            Ok(contact) => contact.summary(),
            Err(err) => {
                self.report_store_error(&err)?;
                return Ok(ControlFlow::Continue(()));
            }
        };

        let Some(answer) = self.prompt(&format!("Delete {summary}? (y/n): "))? else {
            return Ok(ControlFlow::Break(()));
        };
        if !answer.eq_ignore_ascii_case("y") {
            writeln!(self.output, "Delete cancelled.")?;
            return Ok(ControlFlow::Continue(()));
        }

        match self.store.delete_at(index) {
            Ok(removed) => {
                writeln!(self.output, "Deleted: {}", removed.summary())?;
                self.persist()?;
            }
            Err(err) => self.report_store_error(&err)?,
        }
        Ok(ControlFlow::Continue(()))
    }

    fn export(&mut self) -> Step {
        let path = self.export.path.clone();
        match self
            .codec
            .export(self.store.contacts(), &path, self.export.format)
        {
            Ok(()) => writeln!(self.output, "Contacts exported to '{}'.", path.display())?,
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "export failed");
                writeln!(self.output, "Error exporting contacts: {err}")?;
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Write the whole store to the data file. A failure is reported and the
    /// session carries on with the in-memory copy.
    fn persist(&mut self) -> eyre::Result<()> {
        if let Err(err) = self.codec.save(self.store.contacts(), &self.data_path) {
            tracing::error!(path = %self.data_path.display(), error = %err, "save failed");
            writeln!(self.output, "Error saving contacts: {err}")?;
        }
        Ok(())
    }

    /// Print `label`, then read one trimmed line. `None` means end of input.
    fn prompt(&mut self, label: &str) -> eyre::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn print_menu(&mut self) -> eyre::Result<()> {
        writeln!(
            self.output,
            "\n===== CONTACT BOOK =====\n\
             1. Add personal contact\n\
             2. Add business contact\n\
             3. List all contacts\n\
             4. Search by name\n\
             5. Search by phone\n\
             6. Edit contact\n\
             7. Delete contact\n\
             8. Export contacts\n\
             9. Save & exit"
        )?;
        Ok(())
    }

    fn print_listing(&mut self) -> eyre::Result<()> {
        let Some(listing) = self.store.list() else {
            writeln!(self.output, "\nNo contacts yet.")?;
            return Ok(());
        };

        writeln!(self.output, "\n=== CONTACT LIST ===")?;
        for (index, contact) in listing {
            writeln!(self.output, "{index}. {}", contact.summary())?;
        }
        Ok(())
    }

    fn print_matches(&mut self, description: &str, lines: &[String]) -> eyre::Result<()> {
        writeln!(self.output, "\nSearching for {description}")?;
        if lines.is_empty() {
            writeln!(self.output, "No matching contacts found.")?;
        }
        for line in lines {
            writeln!(self.output, "- {line}")?;
        }
        Ok(())
    }

    fn choose_contact(&mut self, action: &str) -> eyre::Result<Selection> {
        if self.store.is_empty() {
            writeln!(self.output, "No contacts to choose from.")?;
            return Ok(Selection::Cancelled);
        }

        self.print_listing()?;
        let label = format!("\nEnter the contact number to {action} (or press Enter to cancel): ");
        let Some(raw) = self.prompt(&label)? else {
            return Ok(Selection::EndOfInput);
        };
        if raw.is_empty() {
            return Ok(Selection::Cancelled);
        }

        match raw.parse::<usize>() {
            Ok(index) => Ok(Selection::Chosen(index)),
            Err(_) => {
                writeln!(self.output, "Invalid number.")?;
                Ok(Selection::Cancelled)
            }
        }
    }

    fn report_store_error(&mut self, err: &CoreError) -> eyre::Result<()> {
        match err {
            CoreError::OutOfRange { len, .. } => {
                writeln!(self.output, "Please enter a number from 1 to {len}.")?
            }
            CoreError::Io(_) => writeln!(self.output, "Error: {err}")?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_script(store: ContactStore, script: &str) -> (ContactStore, String) {
        let dir = tempfile::tempdir().expect("scratch dir");
        let export = ExportTarget {
            path: dir.path().join("unused-export.csv"),
            format: ExportFormat::Csv,
        };
        let mut output = Vec::new();
        let mut session = Session::new(
            store,
            CsvCodec::default(),
            dir.path().join("contacts.csv"),
            export,
            script.as_bytes(),
            &mut output,
        );
        session.run().expect("session should not fail on in-memory io");
        let store = session.into_store();
        (store, String::from_utf8(output).expect("output is UTF-8"))
    }

    fn two_contacts() -> ContactStore {
        ContactStore::from(vec![
            Contact::new(Category::Personal, "Ann Lee", "555-0100", "ann@example.com", "Elm St"),
            Contact::new(Category::Business, "Bob Stone", "777-0199", "", "")
                .with_business_details(Some("Acme".into()), None),
        ])
    }

    #[test]
    fn add_personal_then_list() {
        let (store, output) = run_script(
            ContactStore::new(),
            "1\n  Ann  \n555\nann@example.com\n\n3\n9\n",
        );

        assert_eq!(store.len(), 1);
        let ann = store.get(1).expect("added contact");
        assert_eq!(ann.name, "Ann");
        assert_eq!(ann.category, Category::Personal);
        assert!(output.contains("Contact added."));
        assert!(output.contains("1. [Personal] Ann | 555 | ann@example.com | "));
    }

    #[test]
    fn add_business_collects_company_and_job_title() {
        let (store, _) = run_script(ContactStore::new(), "2\nBob\n777\n\n\nAcme\nCTO\n9\n");

        let bob = store.get(1).expect("added contact");
        assert_eq!(bob.category, Category::Business);
        assert_eq!(bob.company.as_deref(), Some("Acme"));
        assert_eq!(bob.job_title.as_deref(), Some("CTO"));
    }

    #[test]
    fn add_without_phone_is_rejected() {
        let (store, output) = run_script(ContactStore::new(), "1\nAnn\n\n\n\n9\n");
        assert!(store.is_empty());
        assert!(output.contains("Name and phone number are required."));
    }

    #[test]
    fn list_on_empty_store_says_so() {
        let (_, output) = run_script(ContactStore::new(), "3\n9\n");
        assert!(output.contains("No contacts yet."));
    }

    #[test]
    fn name_search_ignores_case_but_phone_search_does_not() {
        let (_, output) = run_script(two_contacts(), "4\nann\n5\n0199\n4\nzed\n4\n\n9\n");
        assert!(output.contains("- [Personal] Ann Lee | 555-0100"));
        assert!(output.contains("- [Business] Bob Stone | 777-0199 |  |  | Acme"));
        assert!(output.contains("No matching contacts found."));
        assert!(output.contains("Empty search."));
    }

    #[test]
    fn edit_keeps_fields_left_blank() {
        let (store, output) = run_script(two_contacts(), "6\n1\n\nNew\n\n\n9\n");

        let ann = store.get(1).expect("edited contact");
        assert_eq!(ann.name, "Ann Lee");
        assert_eq!(ann.phone, "New");
        assert_eq!(ann.email, "ann@example.com");
        assert_eq!(ann.address, "Elm St");
        assert!(output.contains("Contact updated:"));
    }

    #[test]
    fn edit_business_contact_prompts_for_job_title() {
        let (store, _) = run_script(two_contacts(), "6\n2\n\n\n\n\n\nCEO\n9\n");

        let bob = store.get(2).expect("edited contact");
        assert_eq!(bob.company.as_deref(), Some("Acme"));
        assert_eq!(bob.job_title.as_deref(), Some("CEO"));
    }

    #[test]
    fn edit_out_of_range_reports_valid_range() {
        let (store, output) = run_script(two_contacts(), "6\n5\n9\n");
        assert_eq!(store, two_contacts());
        assert!(output.contains("Please enter a number from 1 to 2."));
    }

    #[test]
    fn delete_requires_confirmation() {
        let (store, output) = run_script(two_contacts(), "7\n1\nn\n7\n1\ny\n9\n");
        assert!(output.contains("Delete cancelled."));
        assert!(output.contains("Deleted: [Personal] Ann Lee"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).expect("remaining contact").name, "Bob Stone");
    }

    #[test]
    fn non_numeric_and_blank_selection_cancel() {
        let (store, output) = run_script(two_contacts(), "7\nabc\n7\n\n9\n");
        assert_eq!(store.len(), 2);
        assert!(output.contains("Invalid number."));
    }

    #[test]
    fn selecting_from_empty_store_is_refused() {
        let (_, output) = run_script(ContactStore::new(), "6\n9\n");
        assert!(output.contains("No contacts to choose from."));
    }

    #[test]
    fn unknown_choice_is_reported_and_loop_continues() {
        let (_, output) = run_script(ContactStore::new(), "42\n3\n9\n");
        assert!(output.contains("Invalid choice"));
        assert!(output.contains("No contacts yet."));
    }

    #[test]
    fn end_of_input_mid_flow_ends_session() {
        let (store, _) = run_script(ContactStore::new(), "1\nAnn\n");
        assert!(store.is_empty());
    }

    #[test]
    fn export_writes_configured_target() {
        let dir = tempfile::tempdir().expect("scratch dir");
        let path = dir.path().join("out.csv");
        let export = ExportTarget {
            path: path.clone(),
            format: ExportFormat::Csv,
        };

        let mut output = Vec::new();
        let mut session = Session::new(
            two_contacts(),
            CsvCodec::default(),
            dir.path().join("contacts.csv"),
            export,
            "8\n9\n".as_bytes(),
            &mut output,
        );
        session.run().expect("session runs");

        let text = std::fs::read_to_string(&path).expect("export written");
        assert!(text.starts_with("Type,Name,Phone,Email,Address\n"));
        assert!(text.contains("personal,Ann Lee,555-0100,ann@example.com,Elm St\n"));
        assert!(String::from_utf8_lossy(&output).contains("Contacts exported to"));
    }

    #[test]
    fn changes_are_saved_before_the_session_ends() {
        let dir = tempfile::tempdir().expect("scratch dir");
        let data_path = dir.path().join("contacts.csv");
        let export = ExportTarget {
            path: dir.path().join("out.csv"),
            format: ExportFormat::Csv,
        };

        let mut output = Vec::new();
        let mut session = Session::new(
            two_contacts(),
            CsvCodec::default(),
            data_path.clone(),
            export,
            "7\n1\ny\n1\nCy\n123\n\n\n".as_bytes(),
            &mut output,
        );
        session.run().expect("session runs");

        assert_eq!(
            std::fs::read_to_string(&data_path).expect("data file written"),
            "business,Bob Stone,777-0199,,\npersonal,Cy,123,,\n"
        );
    }

    #[test]
    fn failed_save_is_reported_and_session_continues() {
        let dir = tempfile::tempdir().expect("scratch dir");
        let export = ExportTarget {
            path: dir.path().join("out.csv"),
            format: ExportFormat::Csv,
        };

        let mut output = Vec::new();
        let mut session = Session::new(
            ContactStore::new(),
            CsvCodec::default(),
            dir.path().join("missing").join("contacts.csv"),
            export,
            "1\nAnn\n555\n\n\n3\n9\n".as_bytes(),
            &mut output,
        );
        session.run().expect("session runs");
        assert_eq!(session.into_store().len(), 1);

        let output = String::from_utf8_lossy(&output);
        assert!(output.contains("Error saving contacts:"));
        assert!(output.contains("1. [Personal] Ann | 555"));
    }
}
