use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use contact_book_core::{ColumnOrder, CsvOptions, ExportFormat};

/// Contact Book — a personal contact manager backed by a flat CSV file.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Contact file loaded at startup and saved on exit.
    #[arg(long, default_value = "contacts.csv", env = "CONTACT_BOOK_FILE")]
    pub file: PathBuf,

    /// Destination for the "export" menu action.
    #[arg(
        long,
        default_value = "exported_contacts.csv",
        env = "CONTACT_BOOK_EXPORT_FILE"
    )]
    pub export_file: PathBuf,

    /// Format used by the "export" menu action.
    #[arg(long, value_enum, default_value_t = ExportFormatArg::Csv)]
    pub export_format: ExportFormatArg,

    /// Position of the contact type column in the CSV file.
    #[arg(long, value_enum, default_value_t = ColumnOrderArg::TypeFirst)]
    pub column_order: ColumnOrderArg,

    /// Also persist company and job title for business contacts.
    #[arg(long)]
    pub business_fields: bool,
}

impl Cli {
    pub fn csv_options(&self) -> CsvOptions {
        CsvOptions {
            column_order: self.column_order.into(),
            business_fields: self.business_fields,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColumnOrderArg {
    TypeFirst,
    TypeLast,
}

impl From<ColumnOrderArg> for ColumnOrder {
    fn from(arg: ColumnOrderArg) -> Self {
        match arg {
            ColumnOrderArg::TypeFirst => Self::TypeFirst,
            ColumnOrderArg::TypeLast => Self::TypeLast,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormatArg {
    Csv,
    Jsonl,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Csv => Self::Csv,
            ExportFormatArg::Jsonl => Self::Jsonl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_type_first_strict_csv() {
        let cli = Cli::try_parse_from(["contact-book"]).expect("defaults parse");
        assert_eq!(cli.file, PathBuf::from("contacts.csv"));
        assert_eq!(cli.export_file, PathBuf::from("exported_contacts.csv"));
        assert_eq!(cli.export_format, ExportFormatArg::Csv);
        assert_eq!(cli.csv_options(), CsvOptions::default());
    }

    #[test]
    fn flags_map_onto_codec_options() {
        let cli = Cli::try_parse_from([
            "contact-book",
            "--column-order",
            "type-last",
            "--business-fields",
            "--export-format",
            "jsonl",
        ])
        .expect("flags parse");

        assert_eq!(
            cli.csv_options(),
            CsvOptions {
                column_order: ColumnOrder::TypeLast,
                business_fields: true,
            }
        );
        assert_eq!(ExportFormat::from(cli.export_format), ExportFormat::Jsonl);
    }

    #[test]
    fn unknown_column_order_is_rejected() {
        assert!(Cli::try_parse_from(["contact-book", "--column-order", "middle"]).is_err());
    }
}
