//! Command-line front end for the contacts book.
//!
//! # Responsibility
//! - Bootstrap configuration, logging, and schema once per process.
//! - Map each subcommand to one core service call and render the result.
//!
//! # Invariants
//! - Schema initialization runs before any repository call.
//! - Logging setup failures are reported but never abort the command.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use contactos_core::{
    core_version, init_default_schema, init_logging, init_schema, init_stderr_logging, Contact,
    ContactId, ContactPatch, ContactService, ContactosConfig, ServiceError,
    SqliteContactRepository, SqliteFileProvider,
};
use log::info;
use std::path::PathBuf;

type Service = ContactService<SqliteContactRepository<SqliteFileProvider>>;

/// Contacts book backed by a local SQLite file.
#[derive(Parser)]
#[command(name = "contactos", version, about = "Contacts book backed by SQLite")]
struct Cli {
    /// Database file; overrides `CONTACTOS_DB_PATH`.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log to stderr at the configured level instead of warnings only.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the contacts table if it does not exist.
    Init,
    /// Register a new contact.
    Add {
        nombre: String,
        apellido: String,
        telefono: String,
        email: String,
    },
    /// Show one contact.
    Get { id: ContactId },
    /// List every contact.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Change only the given fields of a contact.
    Update {
        id: ContactId,
        #[arg(long)]
        nombre: Option<String>,
        #[arg(long)]
        apellido: Option<String>,
        #[arg(long)]
        telefono: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete a contact.
    Delete { id: ContactId },
    /// Print the number of stored contacts.
    Count,
    /// Run an insert/update/delete walkthrough against the database.
    Demo,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ContactosConfig::from_env().context("invalid configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    setup_logging(&config, cli.verbose);
    info!(
        "event=cli_start module=cli status=ok version={} db_path={}",
        core_version(),
        config.db_path.display()
    );

    let provider = SqliteFileProvider::new(config.db_path.clone());
    let schema = match &config.schema_path {
        Some(path) => init_schema(&provider, path),
        None => init_default_schema(&provider),
    };
    schema.context("could not initialize the database schema")?;

    let service = ContactService::new(SqliteContactRepository::new(provider));
    run(&service, cli.command, &config)
}

fn setup_logging(config: &ContactosConfig, verbose: bool) {
    let result = match &config.log_dir {
        Some(dir) => init_logging(config.log_level, dir),
        None if verbose => init_stderr_logging(config.log_level),
        None => init_stderr_logging("warn"),
    };
    if let Err(err) = result {
        eprintln!("warning: logging disabled: {err}");
    }
}

fn run(service: &Service, command: Commands, config: &ContactosConfig) -> Result<()> {
    match command {
        Commands::Init => {
            println!("Esquema listo en {}", config.db_path.display());
        }
        Commands::Add {
            nombre,
            apellido,
            telefono,
            email,
        } => {
            let contact = Contact::new(nombre, apellido, telefono, email);
            let id = service
                .registrar_formulario(&contact)
                .map_err(describe)
                .context("no se pudo agregar el contacto")?;
            println!("Contacto agregado con ID {id}");
        }
        Commands::Get { id } => match service.buscar(id)? {
            Some(contact) => print_contact(&contact),
            None => println!("No existe un contacto con ID {id}"),
        },
        Commands::List { json } => {
            let contacts = service.listar()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&contacts)?);
            } else {
                for contact in &contacts {
                    print_contact(contact);
                }
                println!("Total: {}", contacts.len());
            }
        }
        Commands::Update {
            id,
            nombre,
            apellido,
            telefono,
            email,
        } => {
            let patch = update_patch(ContactPatch {
                id,
                nombre,
                apellido,
                telefono,
                email,
            })?;
            let updated = service
                .modificar_parche(&patch)
                .map_err(describe)
                .context("no se pudo actualizar el contacto")?;
            if updated {
                println!("Contacto {id} actualizado");
            } else {
                println!("Sin cambios para el contacto {id} (inexistente o idéntico)");
            }
        }
        Commands::Delete { id } => {
            if service.dar_de_baja(id)? {
                println!("Contacto {id} dado de baja");
            } else {
                println!("No se pudo dar de baja ninguna fila (¿ID inexistente?)");
            }
        }
        Commands::Count => println!("{}", service.total()?),
        Commands::Demo => run_demo(service)?,
    }
    Ok(())
}

fn run_demo(service: &Service) -> Result<()> {
    println!("Total inicial: {}", service.total()?);

    let contact = Contact::new("Demo", "CRUD", "1234567", "demo@crud.com");
    let id = service.registrar(&contact).map_err(describe)?;
    println!("Total tras insertar: {}", service.total()?);

    let inserted = service
        .buscar(id)?
        .context("el contacto insertado no se encontró")?;
    println!("Insertado: {}", format_contact(&inserted));

    let updated = service
        .modificar_parche(&ContactPatch::new(id).telefono("7654321"))
        .map_err(describe)?;
    println!("Actualización aplicada: {updated}");

    let verified = service
        .buscar(id)?
        .context("el contacto actualizado no se encontró")?;
    println!("Teléfono actualizado: {}", verified.telefono);

    println!("Eliminado: {}", service.dar_de_baja(id)?);
    println!("Total final: {}", service.total()?);
    Ok(())
}

fn update_patch(patch: ContactPatch) -> Result<ContactPatch> {
    if patch.is_empty() {
        anyhow::bail!("indique al menos un campo a modificar");
    }
    Ok(patch)
}

// Validation errors already carry user-facing text; keep it as the message.
fn describe(err: ServiceError) -> anyhow::Error {
    match err {
        ServiceError::Validation(errors) => anyhow::anyhow!(errors.messages().join("\n")),
        ServiceError::Repo(err) => anyhow::Error::new(err),
    }
}

fn print_contact(contact: &Contact) {
    println!("{}", format_contact(contact));
}

fn format_contact(contact: &Contact) -> String {
    let id = contact
        .id
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    format!(
        "{id}\t{} {}\t{}\t{}",
        contact.nombre, contact.apellido, contact.telefono, contact.email
    )
}
