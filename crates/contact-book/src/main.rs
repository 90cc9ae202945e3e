mod cli;
mod session;

use clap::Parser;
use eyre::WrapErr;

use contact_book_core::{ContactStore, CsvCodec};

fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr so they never interleave with menu prompts.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let codec = CsvCodec::new(args.csv_options());
    let contacts = codec
        .load(&args.file)
        .wrap_err_with(|| format!("load contacts from {}", args.file.display()))?;
    tracing::info!(
        path = %args.file.display(),
        count = contacts.len(),
        options = ?codec.options(),
        "contact book opened"
    );

    let export = session::ExportTarget {
        path: args.export_file.clone(),
        format: args.export_format.into(),
    };
    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    let mut session = session::Session::new(
        ContactStore::from(contacts),
        codec,
        args.file.clone(),
        export,
        stdin,
        stdout,
    );
    // Save what the session holds even when the menu stopped on an io error.
    let outcome = session.run().wrap_err("run interactive menu");
    let store = session.into_store();

    codec
        .save(store.contacts(), &args.file)
        .wrap_err_with(|| format!("save contacts to {}", args.file.display()))?;
    outcome?;

    println!("\nSaved {} contact(s) to '{}'.", store.len(), args.file.display());
    println!("Goodbye!");
    Ok(())
}
