use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use invox::model::{CompanyInfo, Invoice, format_currency};
use invox::pdf::Assets;
use invox::session::Session;
use invox::store::Store;
use invox::words::amount_in_words;
use invox::{Error, generate_pdf};

#[derive(Parser)]
#[command(name = "invox", about = "Invoice generator", version)]
struct Cli {
    /// Directory holding invoice records and rendered PDFs
    #[arg(long, default_value = "invoices", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a draft invoice to PDF and store both record and PDF
    Generate {
        /// Draft invoice JSON file
        draft: PathBuf,
        /// Header logo image (PNG)
        #[arg(long, default_value = "assets/logo.png")]
        logo: PathBuf,
        /// Footer band image (PNG)
        #[arg(long, default_value = "assets/footer.png")]
        footer: PathBuf,
    },
    /// List stored invoice records
    List,
    /// Print one stored record
    Show { name: String },
    /// Delete a record and its paired PDF
    Delete { name: String },
    /// Spell an amount in words
    Words { amount: f64 },
}

fn print_invoice(invoice: &Invoice) {
    println!("Customer:  {}", invoice.customer_name);
    println!("Date:      {}", invoice.formatted_date());
    for item in &invoice.items {
        println!(
            "  {} | {} | {} x {} = {}",
            item.product_name,
            item.unit,
            item.quantity,
            item.unit_price,
            format_currency(item.line_subtotal()),
        );
    }
    println!("Subtotal:  {}", format_currency(invoice.subtotal));
    println!("Tax (15%): {}", format_currency(invoice.tax));
    println!("Total:     {}", format_currency(invoice.total));
    println!("({})", amount_in_words(invoice.total));
}

/// Issuer details come from `company.json` in the data directory when
/// present; otherwise the built-in letterhead is used.
fn load_company(store: &Store) -> Result<CompanyInfo, Error> {
    let path = store.root().join("company.json");
    if path.exists() {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    } else {
        Ok(CompanyInfo::default())
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let store = Store::open(&cli.data_dir)?;
    match cli.command {
        Command::Generate { draft, logo, footer } => {
            let data = std::fs::read_to_string(&draft)?;
            let draft: Invoice = serde_json::from_str(&data)?;

            let session = Session::load(draft);
            let number = session.number().to_string();
            let mut invoice = session.finish()?;

            let company = load_company(&store)?;
            let assets = Assets::load(&logo, &footer)?;
            let bytes = generate_pdf(&invoice, &number, &company, &assets)?;

            let record = store.save(&mut invoice)?;
            let pdf_path = store.save_pdf(&record, &bytes)?;
            println!("{}", store.record_path(&record).display());
            println!("{}", pdf_path.display());
        }
        Command::List => {
            for name in store.list()? {
                let invoice = store.load(&name)?;
                println!(
                    "{}  {}  {}  {}",
                    name,
                    invoice.formatted_day(),
                    invoice.customer_name,
                    format_currency(invoice.total),
                );
            }
        }
        Command::Show { name } => {
            let invoice = store.load(&name)?;
            print_invoice(&invoice);
        }
        Command::Delete { name } => {
            store.delete(&name)?;
        }
        Command::Words { amount } => {
            println!("{}", amount_in_words(amount));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
