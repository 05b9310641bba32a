mod app;
mod commands;
mod prompt;
mod render;
mod utils;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::app::App;

#[derive(Parser)]
#[command(name = "agenda")]
#[command(about = "Manage your agenda: events, itineraries, contacts and friends")]
struct Cli {
    /// More logging (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Log out and forget the session token
    Logout,
    /// Show who is logged in
    Whoami,
    /// List and edit events
    #[command(subcommand)]
    Events(EventsCommand),
    /// List and edit itineraries
    #[command(subcommand)]
    Itineraries(ItinerariesCommand),
    /// Manage your address book
    #[command(subcommand)]
    Contacts(ContactsCommand),
    /// Friends and friend requests
    #[command(subcommand)]
    Friends(FriendsCommand),
    /// Show config paths and effective settings
    Config,
}

/// Date window shared by listing commands.
#[derive(Args, Clone, Default)]
pub struct RangeArgs {
    /// Show events from this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Show events until this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Show a whole month (YYYY-MM)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub month: Option<String>,
}

/// Fields of the event form. Anything left out is prompted for.
#[derive(Args, Clone, Default)]
pub struct EventArgs {
    pub title: Option<String>,

    /// Start date/time (e.g. "2025-03-20 15:00", "tomorrow 3pm")
    #[arg(short, long)]
    pub start: Option<String>,

    /// End date/time
    #[arg(short, long, conflicts_with = "duration")]
    pub end: Option<String>,

    /// Duration instead of an end (e.g. "30m", "2h")
    #[arg(short, long)]
    pub duration: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// work, personal or meeting
    #[arg(short, long)]
    pub category: Option<String>,

    /// private, friends-only or public
    #[arg(long)]
    pub visibility: Option<String>,
}

#[derive(Subcommand)]
enum EventsCommand {
    /// List events, grouped by itinerary
    List {
        #[command(flatten)]
        range: RangeArgs,

        /// Only events whose title contains this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Order by "start" or "title"
        #[arg(long)]
        sort: Option<String>,

        /// Print the grouped view and calendar feed as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create an event
    New {
        #[command(flatten)]
        fields: EventArgs,
    },
    /// Edit an event
    Edit {
        id: String,
        #[command(flatten)]
        fields: EventArgs,
    },
    /// Delete an event
    Delete {
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Share an event with a friend
    Share {
        id: String,
        #[arg(long)]
        friend: String,
    },
    /// Show a friend's visible events
    Friend {
        friend_id: String,
        #[command(flatten)]
        range: RangeArgs,
    },
}

#[derive(Args, Clone, Default)]
pub struct ItineraryArgs {
    pub title: Option<String>,

    #[arg(short, long)]
    pub start: Option<String>,

    #[arg(short, long)]
    pub end: Option<String>,

    #[arg(short, long)]
    pub location: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// travel, vacation, business or personal
    #[arg(short, long)]
    pub category: Option<String>,

    #[arg(long)]
    pub visibility: Option<String>,

    /// Attach an existing event (repeatable)
    #[arg(long = "event-id")]
    pub event_ids: Vec<String>,
}

#[derive(Subcommand)]
enum ItinerariesCommand {
    List {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Create an itinerary, optionally with new member events
    New {
        #[command(flatten)]
        fields: ItineraryArgs,
    },
    Edit {
        id: String,
        #[command(flatten)]
        fields: ItineraryArgs,
    },
    Delete {
        id: String,
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Clone, Default)]
pub struct ContactArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand)]
enum ContactsCommand {
    List,
    Add {
        #[command(flatten)]
        fields: ContactArgs,
    },
    Edit {
        id: String,
        #[command(flatten)]
        fields: ContactArgs,
    },
    Remove {
        id: String,
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum FriendsCommand {
    List,
    /// Requests waiting for your answer
    Pending,
    /// Requests you sent
    Sent,
    /// Send a friend request
    Request {
        email: String,
        #[arg(short, long)]
        message: Option<String>,
    },
    Accept {
        request_id: String,
    },
    Reject {
        request_id: String,
    },
    Remove {
        id: String,
        #[arg(short, long)]
        force: bool,
    },
    /// Update the description or phone stored for a friend
    Update {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

/// Log to stderr. RUST_LOG wins over -v.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut app = App::load()?;

    match cli.command {
        Commands::Register { name, email } => commands::auth::register(&mut app, name, email).await,
        Commands::Login { email } => commands::auth::login(&mut app, email).await,
        Commands::Logout => commands::auth::logout(&mut app).await,
        Commands::Whoami => commands::auth::whoami(&app),
        Commands::Config => commands::config::run(&app),

        Commands::Events(cmd) => match cmd {
            EventsCommand::List {
                range,
                filter,
                sort,
                json,
            } => commands::events::list(&app, &range, filter, sort, json).await,
            EventsCommand::New { fields } => commands::events::new(&app, fields).await,
            EventsCommand::Edit { id, fields } => commands::events::edit(&app, &id, fields).await,
            EventsCommand::Delete { id, force } => commands::events::delete(&app, &id, force).await,
            EventsCommand::Share { id, friend } => commands::events::share(&app, &id, &friend).await,
            EventsCommand::Friend { friend_id, range } => {
                commands::events::friend(&app, &friend_id, &range).await
            }
        },

        Commands::Itineraries(cmd) => match cmd {
            ItinerariesCommand::List { range } => commands::itineraries::list(&app, &range).await,
            ItinerariesCommand::New { fields } => commands::itineraries::new(&app, fields).await,
            ItinerariesCommand::Edit { id, fields } => {
                commands::itineraries::edit(&app, &id, fields).await
            }
            ItinerariesCommand::Delete { id, force } => {
                commands::itineraries::delete(&app, &id, force).await
            }
        },

        Commands::Contacts(cmd) => match cmd {
            ContactsCommand::List => commands::contacts::list(&app).await,
            ContactsCommand::Add { fields } => commands::contacts::add(&app, fields).await,
            ContactsCommand::Edit { id, fields } => commands::contacts::edit(&app, &id, fields).await,
            ContactsCommand::Remove { id, force } => {
                commands::contacts::remove(&app, &id, force).await
            }
        },

        Commands::Friends(cmd) => match cmd {
            FriendsCommand::List => commands::friends::list(&app).await,
            FriendsCommand::Pending => commands::friends::pending(&app).await,
            FriendsCommand::Sent => commands::friends::sent(&app).await,
            FriendsCommand::Request { email, message } => {
                commands::friends::request(&app, email, message).await
            }
            FriendsCommand::Accept { request_id } => {
                commands::friends::respond(&app, &request_id, true).await
            }
            FriendsCommand::Reject { request_id } => {
                commands::friends::respond(&app, &request_id, false).await
            }
            FriendsCommand::Remove { id, force } => commands::friends::remove(&app, &id, force).await,
            FriendsCommand::Update {
                id,
                description,
                phone,
            } => commands::friends::update(&app, &id, description, phone).await,
        },
    }
}
