//! CSV persistence for the contact store.
//!
//! The on-disk format is one contact per line, no header, five columns in
//! the configured [`ColumnOrder`]. Business rows may carry two extra
//! columns (company, job title) when [`CsvOptions::business_fields`] is
//! set. Loading is tolerant: a missing file is an empty book, short rows
//! and undecodable rows are skipped, and a leading header row written by
//! [`CsvCodec::export`] is ignored.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::CoreError;

use super::types::{Category, Contact};

/// Minimum number of fields a row needs to become a contact.
const MIN_FIELDS: usize = 5;

const BUSINESS_HEADER: [&str; 2] = ["Company", "Job Title"];

// ==============================================================================
// Options
// ==============================================================================

/// Where the type column sits in each row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnOrder {
    /// `type,name,phone,email,address` with labels `personal`, `business`
    /// and `contact`.
    #[default]
    TypeFirst,
    /// `name,phone,email,address,type` with labels `Personal`, `Business`
    /// and `General`.
    TypeLast,
}

impl ColumnOrder {
    fn type_column(self) -> usize {
        match self {
            Self::TypeFirst => 0,
            Self::TypeLast => MIN_FIELDS - 1,
        }
    }

    fn first_data_column(self) -> usize {
        match self {
            Self::TypeFirst => 1,
            Self::TypeLast => 0,
        }
    }

    fn label(self, category: Category) -> &'static str {
        match (self, category) {
            (Self::TypeFirst, Category::Personal) => "personal",
            (Self::TypeFirst, Category::Business) => "business",
            (Self::TypeFirst, Category::General) => "contact",
            (Self::TypeLast, Category::Personal) => "Personal",
            (Self::TypeLast, Category::Business) => "Business",
            (Self::TypeLast, Category::General) => "General",
        }
    }

    fn header(self) -> [&'static str; MIN_FIELDS] {
        match self {
            Self::TypeFirst => ["Type", "Name", "Phone", "Email", "Address"],
            Self::TypeLast => ["Name", "Phone", "Email", "Address", "Type"],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvOptions {
    pub column_order: ColumnOrder,
    /// Append company and job title to business rows on save.
    pub business_fields: bool,
}

/// Output format for [`CsvCodec::export`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// CSV with a header row; loadable again with [`CsvCodec::load`].
    #[default]
    Csv,
    /// One JSON object per line.
    Jsonl,
}

// ==============================================================================
// Codec
// ==============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvCodec {
    options: CsvOptions,
}

impl CsvCodec {
    pub fn new(options: CsvOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CsvOptions {
        self.options
    }

    /// Load contacts from `source`. A missing file yields an empty list.
    pub fn load(&self, source: &Path) -> Result<Vec<Contact>, CoreError> {
        let file = match File::open(source) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %source.display(), "contact file not found, starting empty");
                return Ok(Vec::new());
            }
            Err(err) => return Err(CoreError::Io(err)),
        };

        let contacts = self.read_from(file)?;
        tracing::info!(path = %source.display(), count = contacts.len(), "loaded contacts");
        Ok(contacts)
    }

    /// Parse contacts from any reader, applying the same tolerance rules as
    /// [`CsvCodec::load`].
    pub fn read_from<R: Read>(&self, reader: R) -> Result<Vec<Contact>, CoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut contacts = Vec::new();
        for (row, result) in reader.byte_records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map_or(row as u64 + 1, csv::Position::line);

            let Ok(fields) = csv::StringRecord::from_byte_record(record) else {
                tracing::warn!(line, "skipping contact row that is not valid UTF-8");
                continue;
            };
            if fields.len() < MIN_FIELDS {
                tracing::warn!(
                    line,
                    fields = fields.len(),
                    "skipping contact row with too few fields"
                );
                continue;
            }
            if row == 0 && self.is_header(&fields) {
                tracing::debug!("skipping header row");
                continue;
            }

            contacts.push(self.parse_row(&fields));
        }
        Ok(contacts)
    }

    /// Atomically replace `destination` with the given contacts.
    pub fn save(&self, contacts: &[Contact], destination: &Path) -> Result<(), CoreError> {
        write_atomically(destination, |file| self.write_csv(contacts, file, false))?;
        tracing::info!(path = %destination.display(), count = contacts.len(), "saved contacts");
        Ok(())
    }

    /// Write contacts in the storage format (no header) to any writer and
    /// hand the writer back once everything is flushed.
    pub fn write_to<W: Write>(&self, contacts: &[Contact], writer: W) -> Result<W, CoreError> {
        self.write_csv(contacts, writer, false)
    }

    /// Write a standalone copy of the contacts for use outside the app.
    pub fn export(
        &self,
        contacts: &[Contact],
        destination: &Path,
        format: ExportFormat,
    ) -> Result<(), CoreError> {
        match format {
            ExportFormat::Csv => {
                write_atomically(destination, |file| self.write_csv(contacts, file, true))?
            }
            ExportFormat::Jsonl => {
                write_atomically(destination, |file| write_jsonl(contacts, file))?
            }
        }
        tracing::info!(
            path = %destination.display(),
            count = contacts.len(),
            ?format,
            "exported contacts"
        );
        Ok(())
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn write_csv<W: Write>(
        &self,
        contacts: &[Contact],
        out: W,
        with_header: bool,
    ) -> Result<W, CoreError> {
        // Business rows may be longer than the rest.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(out);

        if with_header {
            writer.write_record(self.header())?;
        }
        for contact in contacts {
            writer.write_record(self.row(contact))?;
        }
        writer.flush()?;
        writer.into_inner().map_err(|err| {
            let source = err.error();
            CoreError::Io(std::io::Error::new(source.kind(), source.to_string()))
        })
    }

    fn header(&self) -> Vec<&'static str> {
        let mut header = self.options.column_order.header().to_vec();
        if self.options.business_fields {
            header.extend(BUSINESS_HEADER);
        }
        header
    }

    fn is_header(&self, fields: &csv::StringRecord) -> bool {
        self.options
            .column_order
            .header()
            .iter()
            .zip(fields.iter())
            .all(|(expected, actual)| actual.trim().eq_ignore_ascii_case(expected))
    }

    fn row<'a>(&self, contact: &'a Contact) -> Vec<&'a str> {
        let order = self.options.column_order;
        let data = [
            contact.name.as_str(),
            contact.phone.as_str(),
            contact.email.as_str(),
            contact.address.as_str(),
        ];

        let mut row = Vec::with_capacity(MIN_FIELDS + BUSINESS_HEADER.len());
        match order {
            ColumnOrder::TypeFirst => {
                row.push(order.label(contact.category));
                row.extend(data);
            }
            ColumnOrder::TypeLast => {
                row.extend(data);
                row.push(order.label(contact.category));
            }
        }

        if self.options.business_fields && contact.category == Category::Business {
            row.push(contact.company.as_deref().unwrap_or_default());
            row.push(contact.job_title.as_deref().unwrap_or_default());
        }
        row
    }

    fn parse_row(&self, fields: &csv::StringRecord) -> Contact {
        let field = |i: usize| fields.get(i).map(str::trim).unwrap_or_default().to_string();
        let order = self.options.column_order;
        let first = order.first_data_column();

        let contact = Contact::new(
            Category::from_label(&field(order.type_column())),
            field(first),
            field(first + 1),
            field(first + 2),
            field(first + 3),
        );

        // Extra columns are only meaningful on business rows; the builder
        // ignores them for everything else.
        if fields.len() >= MIN_FIELDS + BUSINESS_HEADER.len() {
            contact.with_business_details(Some(field(MIN_FIELDS)), Some(field(MIN_FIELDS + 1)))
        } else {
            contact
        }
    }
}

fn write_jsonl(contacts: &[Contact], file: File) -> Result<File, CoreError> {
    let mut out = BufWriter::new(file);
    for contact in contacts {
        serde_json::to_writer(&mut out, contact).map_err(std::io::Error::from)?;
        out.write_all(b"\n")?;
    }
    out.into_inner()
        .map_err(|err| CoreError::Io(err.into_error()))
}

// ==============================================================================
// Atomic file replacement
// ==============================================================================

/// Write through a `.<name>.tmp` sibling, sync it, then rename it over
/// `destination`. On failure the staging file is removed and `destination`
/// is left as it was. The parent directory is not synced.
///
/// A symlinked destination is resolved first so the link keeps pointing at
/// the rewritten file, and an existing file's permissions carry over.
fn write_atomically<F>(destination: &Path, write: F) -> Result<(), CoreError>
where
    F: FnOnce(File) -> Result<File, CoreError>,
{
    let target = resolve_target(destination)?;
    let staging = staging_path(&target)?;
    let permissions = match std::fs::metadata(&target) {
        Ok(meta) => Some(meta.permissions()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => return Err(CoreError::Io(err)),
    };

    let result = File::create(&staging)
        .map_err(CoreError::Io)
        .and_then(write)
        .and_then(|file| {
            if let Some(permissions) = permissions {
                file.set_permissions(permissions)?;
            }
            file.sync_all()?;
            Ok(())
        })
        .and_then(|()| std::fs::rename(&staging, &target).map_err(CoreError::Io));

    if let Err(err) = &result {
        tracing::warn!(path = %target.display(), error = %err, "failed to write contact file");
        if staging.exists() {
            if let Err(cleanup) = std::fs::remove_file(&staging) {
                tracing::warn!(
                    path = %staging.display(),
                    error = %cleanup,
                    "failed to remove staging file"
                );
            }
        }
    }
    result
}

/// The real file behind `destination`, or `destination` itself when it does
/// not exist yet.
fn resolve_target(destination: &Path) -> Result<PathBuf, CoreError> {
    match std::fs::canonicalize(destination) {
        Ok(target) => Ok(target),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(destination.to_path_buf()),
        Err(err) => Err(CoreError::Io(err)),
    }
}

fn staging_path(destination: &Path) -> Result<PathBuf, CoreError> {
    let name = destination.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("destination has no file name: {}", destination.display()),
        )
    })?;

    let mut staged = OsString::from(".");
    staged.push(name);
    staged.push(".tmp");
    Ok(destination.with_file_name(staged))
}
