//! ticketlink CLI Client
//!
//! Command-line interface for a ticket tracker server.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use ticketlink::protocol::{
    Encoding, Page, Permission, PermissionGrant, PermissionScope, TicketCreation,
    TicketSearchParameters, TicketSummary,
};
use ticketlink::{ClientConfig, ClientError, Credentials, HttpSessionHandler, Result};

/// ticketlink CLI
#[derive(Parser, Debug)]
#[command(name = "ticketlink-cli")]
#[command(about = "CLI for the ticket tracker protocol")]
#[command(version)]
struct Args {
    /// Server base URI (overrides the config file)
    #[arg(short, long)]
    server: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// User name to log in as
    #[arg(short, long)]
    user: Option<String>,

    /// Password to log in with
    #[arg(long, env = "TICKETLINK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Wire encoding (overrides the config file)
    #[arg(short, long, value_enum)]
    encoding: Option<EncodingArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EncodingArg {
    Text,
    Binary,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Text => Encoding::Text,
            EncodingArg::Binary => Encoding::Binary,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the server's protocol versions and the one that would be used
    Versions,

    /// Create a ticket
    TicketCreate {
        /// Project short name
        #[arg(long)]
        project: String,

        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Search tickets
    TicketSearch {
        #[arg(long)]
        title_contains: Option<String>,

        #[arg(long)]
        description_contains: Option<String>,

        #[arg(long, default_value_t = 50)]
        page_size: u32,

        /// Further pages to fetch after the first
        #[arg(long, default_value_t = 0)]
        pages: u32,
    },

    /// Grant a permission to a user
    PermissionGrant {
        /// User id
        #[arg(long)]
        user_id: Uuid,

        /// ticket-read, ticket-write, ticket-create, project-create or permission-grant
        #[arg(long)]
        permission: String,

        /// Limit the grant to one project
        #[arg(long)]
        project: Option<String>,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,ticketlink=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error [{}]: {}", e.code(), e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(server) = &args.server {
        config.base_uri = server.clone();
    }
    if let Some(encoding) = args.encoding {
        config.encoding = encoding.into();
    }

    tracing::debug!("ticketlink CLI v{}", ticketlink::VERSION);

    let mut client = HttpSessionHandler::from_config(config)?;

    // Version discovery needs no session
    let needs_session = !matches!(args.command, Commands::Versions);
    if needs_session {
        let credentials = match (&args.user, &args.password) {
            (Some(user), Some(password)) => Credentials::new(user.clone(), password.clone()),
            _ => {
                return Err(ClientError::Config(
                    "--user and --password (or TICKETLINK_PASSWORD) are required".to_string(),
                ))
            }
        };
        client.connect(credentials)?;
    }

    let result = execute(&mut client, args.command);
    if needs_session {
        client.disconnect();
    }
    result
}

fn execute(client: &mut HttpSessionHandler, command: Commands) -> Result<()> {
    match command {
        Commands::Versions => {
            for version in client.discover_versions()? {
                println!("{}  {}", version, version.endpoint_path);
            }
            println!("selected: {}", client.negotiate()?);
            Ok(())
        }

        Commands::TicketCreate {
            project,
            title,
            description,
        } => {
            let ticket = client.ticket_create(TicketCreation {
                project,
                title,
                description,
            })?;
            println!("created {}: {}", ticket.id, ticket.title);
            Ok(())
        }

        Commands::TicketSearch {
            title_contains,
            description_contains,
            page_size,
            pages,
        } => {
            let parameters = TicketSearchParameters {
                title_contains,
                description_contains,
                page_size,
                ..TicketSearchParameters::default()
            };
            print_page(&client.ticket_search_begin(parameters)?);
            for _ in 0..pages {
                match client.ticket_search_next() {
                    Ok(page) => print_page(&page),
                    Err(e) if e.code() == ticketlink::ErrorCode::PAGE_NONEXISTENT => break,
                    Err(e) => return Err(e),
                }
            }
            Ok(())
        }

        Commands::PermissionGrant {
            user_id,
            permission,
            project,
        } => {
            let permission: Permission = permission.parse()?;
            let scope = match project {
                Some(project) => PermissionScope::Project(project),
                None => PermissionScope::Global,
            };
            client.permission_grant(PermissionGrant {
                user: user_id,
                permission,
                scope,
            })?;
            println!("granted {} to {}", permission.as_str(), user_id);
            Ok(())
        }
    }
}

fn print_page(page: &Page<TicketSummary>) {
    let shown = if page.page_count == 0 { 0 } else { page.page_index + 1 };
    println!("-- page {} of {} --", shown, page.page_count);
    for ticket in &page.items {
        println!("{:<12} {}", ticket.id.to_string(), ticket.title);
    }
}
