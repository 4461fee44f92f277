use anyhow::Context;
use checkout_core::{
    clinic_offset_from_env_value, constants::CLINIC_UTC_OFFSET_ENV, copay_total_for_antigens,
    Antigen, Appointment, CallToAction, CheckoutConfig, CheckoutSession, DoseLineItem,
    InMemoryProductCatalog, LotWithProduct, MedDCheckResponse, ProductIssue,
};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "checkout")]
#[command(about = "Inspect checkout payment state from JSON fixtures")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a call-to-action id and the buckets it belongs to
    Cta {
        /// Integer id as sent by the eligibility service
        id: i64,
    },
    /// Show derived checkout state for an appointment
    Appointment {
        /// Appointment JSON file
        file: PathBuf,
    },
    /// Total Med D copays for a list of antigens
    Copay {
        /// Eligibility response JSON file
        eligibility: PathBuf,
        /// Antigen of one supplied dose (repeat per dose)
        #[arg(long = "antigen", required = true)]
        antigens: Vec<String>,
    },
    /// Open a checkout session, scan lots and show the cart
    Session {
        /// Appointment JSON file
        appointment: PathBuf,
        /// Product catalog JSON file (array of lots)
        #[arg(long)]
        catalog: PathBuf,
        /// Lot number to scan (repeatable)
        #[arg(long = "scan")]
        scans: Vec<String>,
        /// Eligibility response JSON file to apply Med D copays from
        #[arg(long)]
        eligibility: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("checkout=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Cta { id }) => print_cta(CallToAction::from_int(id)),
        Some(Commands::Appointment { file }) => {
            let config = load_config()?;
            let appointment: Appointment = load_json(&file)?;
            print_appointment(&appointment, &config);
        }
        Some(Commands::Copay {
            eligibility,
            antigens,
        }) => {
            let response: MedDCheckResponse = load_json(&eligibility)?;
            let antigens = antigens
                .iter()
                .map(Antigen::new)
                .collect::<Result<Vec<_>, _>>()
                .context("invalid antigen")?;
            println!("Copay total: {}", copay_total_for_antigens(&response, &antigens));
        }
        Some(Commands::Session {
            appointment,
            catalog,
            scans,
            eligibility,
        }) => {
            let config = load_config()?;
            let appointment: Appointment = load_json(&appointment)?;
            let lots: Vec<LotWithProduct> = load_json(&catalog)?;
            let lots = InMemoryProductCatalog::new(lots);
            if lots.is_empty() {
                tracing::warn!("catalog {} has no lots", catalog.display());
            } else {
                tracing::info!("loaded {} lots from {}", lots.len(), catalog.display());
            }
            let catalog = lots;

            let mut session = CheckoutSession::new(appointment, config, chrono::Utc::now());
            for lot in &scans {
                match session.scan_lot(&catalog, lot, Vec::<ProductIssue>::new()) {
                    Ok(id) => tracing::info!("scanned {lot} as dose {id}"),
                    Err(e) => eprintln!("Error scanning lot {lot}: {e}"),
                }
            }
            if let Some(path) = eligibility {
                let response: MedDCheckResponse = load_json(&path)?;
                session.apply_med_d_copays(response);
            }
            print_session(&session);
        }
        None => {
            println!("Use 'checkout --help' for commands");
        }
    }

    Ok(())
}

fn load_config() -> anyhow::Result<CheckoutConfig> {
    let offset = clinic_offset_from_env_value(std::env::var(CLINIC_UTC_OFFSET_ENV).ok())
        .with_context(|| format!("invalid {CLINIC_UTC_OFFSET_ENV}"))?;
    Ok(CheckoutConfig::new(offset))
}

/// Read a JSON fixture, reporting the field path of any schema mismatch.
fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_json(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse_json<T: DeserializeOwned>(text: &str) -> anyhow::Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    match serde_path_to_error::deserialize(&mut deserializer) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(anyhow::anyhow!("schema mismatch at {path}: {source}"))
        }
    }
}

fn print_cta(cta: CallToAction) {
    println!("CTA: {:?} (id {})", cta, cta.id());
    println!("  med D completed:   {}", cta.is_med_d_completed());
    println!("  missing info:      {}", cta.is_missing_info());
    println!("  missing demo info: {}", cta.is_missing_demo_info());
    println!("  missing payer:     {}", cta.is_missing_payer_info());
}

fn print_appointment(appointment: &Appointment, config: &CheckoutConfig) {
    let now = chrono::Utc::now();
    let today = config.local_date(now);

    println!(
        "Appointment {} for {} {} on {}",
        appointment.id,
        appointment.patient.first_name,
        appointment.patient.last_name,
        appointment.date_of_service()
    );
    println!(
        "Supply: {} (private: {}, VFC: {}, state: {}, 317: {})",
        appointment.vaccine_supply,
        appointment.is_private(),
        appointment.is_vfc(),
        appointment.is_state(),
        appointment.is_section_317()
    );
    println!("Med D tag shown: {}", appointment.is_med_d_tag_shown());
    println!(
        "Med D on date of service: {}",
        appointment.is_med_d_and_date_of_service(today)
    );
    println!("Med D CTA: {:?}", appointment.get_med_d_cta());
    println!("Med D gate: {:?}", appointment.med_d_gate(today));
    println!(
        "Non-expired orders: {}",
        appointment.non_expired_orders_count(now)
    );
}

fn print_session(session: &CheckoutSession) {
    println!(
        "Checkout for appointment {} ({} line items)",
        session.appointment().id,
        session.doses().len()
    );
    for dose in session.doses() {
        println!("  {}", describe_dose(dose));
    }
    println!("Med D gate: {:?}", session.med_d_gate());
    println!("Copay total: {}", session.copay_total());
}

fn describe_dose(dose: &DoseLineItem) -> String {
    let lot = dose.lot_number().map(|l| l.as_str()).unwrap_or("-");
    let mode = dose.payment_mode().map(|m| m.as_str()).unwrap_or("-");
    let reason = dose
        .payment_mode_reason()
        .map(|r| format!(" ({r:?})"))
        .unwrap_or_default();
    let warning = if dose.has_display_issue() { " !" } else { "" };
    format!(
        "{} {} lot {} [{:?}] {}{}{}",
        dose.id(),
        dose.product().display_name,
        lot,
        dose.dose_state(),
        mode,
        reason,
        warning
    )
}
