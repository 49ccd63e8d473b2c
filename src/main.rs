//! Moroccan Payroll CLI
//!
//! Computes a pay period from an employee CSV and writes either the
//! calculations, the CNSS declaration or the SIMT transfer file.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- compute --employees staff.csv --period 2024-03 > payroll.csv
//! cargo run -- declare --employees staff.csv --company company.json \
//!     --period 2024-03 --transfer-reference 20240300000042 --output out/
//! cargo run -- transfer --employees staff.csv --company company.json \
//!     --period 2024-03 --period-status closed --batch-reference PAY202403 --output out/
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use moroccan_payroll::{
    CnssDeclarationEncoder, CompanyBankInfo, DeclarationOptions, PayPeriod, PayrollEngine,
    PayrollRun, PeriodStatus, Result, SimtTransferEncoder, TransferOptions,
};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser, Debug)]
#[command(name = "moroccan-payroll", version, about = "Moroccan payroll engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the period and write calculations as CSV
    Compute {
        #[command(flatten)]
        input: PeriodInput,

        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Write the CNSS declaration file
    Declare {
        #[command(flatten)]
        input: PeriodInput,

        /// Company metadata (JSON)
        #[arg(long)]
        company: PathBuf,

        /// Output directory
        #[arg(long, default_value = ".")]
        output: PathBuf,

        /// 14-digit transfer reference
        #[arg(long)]
        transfer_reference: String,

        #[arg(long, default_value = "A0")]
        category: String,

        /// YYYY-MM-DD, today when omitted
        #[arg(long)]
        issue_date: Option<NaiveDate>,
    },

    /// Write the SIMT salary-transfer file
    Transfer {
        #[command(flatten)]
        input: PeriodInput,

        /// Company metadata (JSON)
        #[arg(long)]
        company: PathBuf,

        /// Output directory
        #[arg(long, default_value = ".")]
        output: PathBuf,

        #[arg(long)]
        batch_reference: String,

        /// YYYY-MM-DD, today when omitted
        #[arg(long)]
        creation_date: Option<NaiveDate>,

        /// YYYY-MM-DD, creation date when omitted
        #[arg(long)]
        value_date: Option<NaiveDate>,

        /// Blank filler records after the header
        #[arg(long, default_value_t = 0)]
        filler_records: usize,

        /// Skip the company address record
        #[arg(long)]
        no_address: bool,
    },
}

#[derive(Args, Debug)]
struct PeriodInput {
    /// Employee profiles (CSV)
    #[arg(long)]
    employees: PathBuf,

    /// Pay period, YYYY-MM
    #[arg(long)]
    period: String,

    /// draft, in-progress, closed or archived
    #[arg(long, default_value = "draft")]
    period_status: PeriodStatus,
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Compute { input, output } => {
            let payroll = compute_period(&input)?;
            match output {
                Some(path) => payroll.write_output(File::create(path)?)?,
                None => payroll.write_output(io::stdout().lock())?,
            }
        }
        Command::Declare {
            input,
            company,
            output,
            transfer_reference,
            category,
            issue_date,
        } => {
            let company = load_company(&company)?;
            let payroll = compute_period(&input)?;
            let options = DeclarationOptions {
                transfer_reference,
                category,
                issue_date: issue_date.unwrap_or_else(today),
            };
            let mut file = CnssDeclarationEncoder::new(&company, payroll.period, options)
                .encode(&payroll.calculations)?;
            file.validate()?;
            for exclusion in &file.exclusions {
                eprintln!("excluded {}: {}", exclusion.employee_id, exclusion.reason);
            }
            for rejected in &file.rejected {
                eprintln!("rejected {}: {}", rejected.employee_id, rejected.error);
            }
            let path = write_file(&output, &file.file_name(), file.as_bytes())?;
            println!("{}", path.display());
        }
        Command::Transfer {
            input,
            company,
            output,
            batch_reference,
            creation_date,
            value_date,
            filler_records,
            no_address,
        } => {
            let company = load_company(&company)?;
            let payroll = compute_period(&input)?;
            let creation_date = creation_date.unwrap_or_else(today);
            let options = TransferOptions {
                value_date: value_date.unwrap_or(creation_date),
                include_address: !no_address,
                filler_records,
                ..TransferOptions::new(creation_date, creation_date, batch_reference)
            };
            let batch = SimtTransferEncoder::new(&company, payroll.period, options)
                .encode(&payroll.calculations)?;
            for exclusion in &batch.exclusions {
                eprintln!("excluded {}: {}", exclusion.employee_id, exclusion.reason);
            }
            for rejected in &batch.rejected {
                eprintln!("rejected {}: {}", rejected.employee_id, rejected.error);
            }
            let path = write_file(&output, &batch.file_name(), batch.as_bytes())?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn compute_period(input: &PeriodInput) -> Result<PayrollRun> {
    let period = PayPeriod::parse(&input.period, input.period_status)?;

    let file = File::open(&input.employees)?;
    let reader = BufReader::new(file);

    let mut engine = PayrollEngine::new();
    engine.process_csv(reader)?;

    let payroll = engine.run(&period);
    for failure in engine.ingestion_failures().iter().chain(&payroll.failures) {
        eprintln!("skipped {}", failure);
    }
    Ok(payroll)
}

fn load_company(path: &Path) -> Result<CompanyBankInfo> {
    CompanyBankInfo::from_json(BufReader::new(File::open(path)?))
}

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, bytes)?;
    Ok(path)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
