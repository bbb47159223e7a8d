use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use form_controller::{DigitMasker, FormController, FormSession, InputMasker, RecordingPage};
use lookup_client::HttpLookupTransport;
use shared::domain::{FieldId, LookupKind, SupplierType};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, Settings, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(about = "Supplier registration form with tax id and zip code lookups")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Overrides `base_url` from the config file.
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    no_masks: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up a company by its 14-digit tax id and print the filled form.
    TaxId { value: String },
    /// Look up an address by its 8-digit zip code and print the filled form.
    ZipCode { value: String },
    /// Interactive form; lookups complete while you keep typing.
    Shell {
        #[arg(long)]
        supplier_type: Option<SupplierType>,
    },
}

type Session = FormSession<RecordingPage>;

fn build_session(settings: &Settings, supplier_type: SupplierType) -> Result<Session> {
    let mut page = RecordingPage::new(supplier_type);
    for kind in [LookupKind::TaxId, LookupKind::ZipCode] {
        if let Some(endpoint) = settings.lookup_endpoint(kind) {
            page = page.with_endpoint(kind, endpoint);
        }
    }

    let masker: Option<Box<dyn InputMasker + Send>> = if settings.masks_enabled {
        Some(Box::new(DigitMasker::new()))
    } else {
        None
    };

    let transport = match settings.request_timeout() {
        Some(timeout) => {
            HttpLookupTransport::with_timeout(timeout).context("failed to build HTTP client")?
        }
        None => HttpLookupTransport::new(),
    };

    Ok(FormSession::start(
        FormController::new(page, masker),
        Arc::new(transport),
    ))
}

fn flush_notifications(session: &mut Session) {
    for message in session.controller_mut().page_mut().take_notifications() {
        println!("! {message}");
    }
}

fn print_form(session: &Session) {
    let controller = session.controller();
    let page = controller.page();
    println!("supplier type: {}", controller.supplier_type());
    for field in FieldId::ALL {
        let registration = matches!(
            field,
            FieldId::TaxRegistrationState | FieldId::TaxRegistrationMunicipal
        );
        if registration && !page.tax_registration_visible() {
            continue;
        }
        let marker = if page.focused() == Some(field) { ">" } else { " " };
        println!("{marker} {:<28} {}", field.name(), controller.display_value(field));
    }
    for kind in [LookupKind::TaxId, LookupKind::ZipCode] {
        let control = page.control(kind);
        let appearance = match (control.pending, control.enabled) {
            (true, _) => "searching...",
            (false, true) => "search",
            (false, false) => "disabled",
        };
        println!("  [{} lookup: {appearance}]", kind.label());
    }
}

async fn run_once(mut session: Session, kind: LookupKind, value: &str) -> Result<()> {
    let controller = session.controller_mut();
    match kind {
        LookupKind::TaxId => controller.on_tax_id_input_changed(value),
        LookupKind::ZipCode => controller
            .page_mut()
            .type_value(FieldId::ZipCode, value),
    }

    let sent = session.click_search(kind);
    flush_notifications(&mut session);
    if sent? {
        session.settle().await;
        flush_notifications(&mut session);
    }
    print_form(&session);
    Ok(())
}

const SHELL_HELP: &str = "\
commands:
  type corp|ind           select the supplier type
  set <field> <value>     edit a field (tax_id is filtered as you type)
  search tax-id|zip-code  click a lookup button
  show                    print the form
  help                    this text
  quit";

fn handle_shell_line(session: &mut Session, line: &str) -> bool {
    let line = line.trim();
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "" => {}
        "quit" | "exit" => return false,
        "help" => println!("{SHELL_HELP}"),
        "show" => print_form(session),
        "type" => match rest.parse::<SupplierType>() {
            Ok(supplier_type) => {
                let controller = session.controller_mut();
                controller.page_mut().select_supplier_type(supplier_type);
                controller.on_supplier_type_selected();
            }
            Err(err) => println!("{err}"),
        },
        "set" => {
            let (name, value) = rest.split_once(' ').unwrap_or((rest, ""));
            match FieldId::from_name(name) {
                Some(FieldId::TaxId) => session.controller_mut().on_tax_id_input_changed(value),
                Some(field) => session
                    .controller_mut()
                    .page_mut()
                    .type_value(field, value.trim()),
                None => println!("unknown field '{name}'"),
            }
        }
        "search" => {
            let kind = match rest {
                "tax-id" | "tax_id" => Some(LookupKind::TaxId),
                "zip-code" | "zip_code" => Some(LookupKind::ZipCode),
                _ => None,
            };
            match kind {
                Some(kind) => match session.click_search(kind) {
                    Ok(true) => println!("searching {}...", kind.label()),
                    Ok(false) => println!("{} lookup button is disabled", kind.label()),
                    Err(_) => {}
                },
                None => println!("usage: search tax-id|zip-code"),
            }
        }
        other => println!("unknown command '{other}'; try help"),
    }
    flush_notifications(session);
    true
}

async fn run_shell(mut session: Session) -> Result<()> {
    println!("{SHELL_HELP}");
    print_form(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else { break };
                if !handle_shell_line(&mut session, &line) {
                    break;
                }
            }
            Some(event) = session.next_event() => {
                let kind = event.kind();
                session.apply_event(event);
                println!("{} lookup finished", kind.label());
                flush_notifications(&mut session);
                print_form(&session);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    if cli.no_masks {
        settings.masks_enabled = false;
    }

    match cli.command {
        Command::TaxId { value } => {
            let session = build_session(&settings, SupplierType::Corporate)?;
            run_once(session, LookupKind::TaxId, &value).await
        }
        Command::ZipCode { value } => {
            let session = build_session(&settings, SupplierType::Individual)?;
            run_once(session, LookupKind::ZipCode, &value).await
        }
        Command::Shell { supplier_type } => {
            let session = build_session(&settings, supplier_type.unwrap_or(settings.supplier_type))?;
            run_shell(session).await
        }
    }
}
