mod account;
mod stream;

use clap::{Parser, Subcommand, ValueEnum};
use ember_api::{ApiClient, ApiConfig, DEFAULT_BASE_URL, SessionStore};
use ember_base::log;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fire-watch", about = "Fire detection from videos and live cameras")]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "EMBER_API_BASE", default_value = DEFAULT_BASE_URL, global = true)]
    api: String,

    /// Write logs to daily files in this directory instead of stdout
    #[arg(long, env = "EMBER_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// Session file (default: user config directory)
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Update the current account
    Profile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Change the account password
    Password {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Analyze an uploaded video file or a YouTube video
    Analyze(stream::AnalyzeArgs),
    /// Watch the live camera feed
    Camera(stream::CameraArgs),
    /// List analyzed videos
    Videos {
        /// Every user's videos (admin)
        #[arg(long)]
        all: bool,
    },
    /// Show one video and its detections
    Video { id: String },
    /// Show activity history
    History {
        /// Another user's history (admin)
        #[arg(long)]
        user: Option<String>,
    },
    /// Manage users (admin)
    #[command(subcommand)]
    Users(UsersCommand),
    /// Notification preferences
    #[command(subcommand)]
    Notifications(NotificationsCommand),
}

#[derive(Subcommand)]
enum UsersCommand {
    List,
    Get {
        id: String,
    },
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

#[derive(Subcommand)]
enum NotificationsCommand {
    Get,
    Set {
        #[arg(long)]
        email: Option<Toggle>,
        #[arg(long)]
        website: Option<Toggle>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn enabled(self) -> bool {
        matches!(self, Toggle::On)
    }
}

fn init_logging(log_dir: Option<&PathBuf>) -> std::io::Result<()> {
    match log_dir {
        Some(dir) => ember_base::init_file_logger(dir),
        None => {
            ember_base::init_stdout_logger();
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_dir.as_ref())?;

    let config = ApiConfig::default().with_base_url(&cli.api);
    let store = SessionStore::new(cli.session_file.unwrap_or_else(SessionStore::default_path));
    log::debug!("backend {}, session {}", config.base_url(), store.path().display());
    let mut client = ApiClient::with_store(config, store)?;

    match cli.command {
        Command::Login { email, password } => account::login(&mut client, &email, &password).await?,
        Command::Logout => account::logout(&mut client)?,
        Command::Whoami => account::whoami(&mut client).await?,
        Command::Register {
            username,
            email,
            password,
            address,
            phone,
        } => {
            let user = account::new_user(username, email, password, address, phone);
            account::register(&mut client, &user).await?
        }
        Command::Profile {
            username,
            address,
            phone,
        } => account::profile(&mut client, username, address, phone).await?,
        Command::Password { old, new, confirm } => {
            client.change_password(&old, &new, &confirm).await?;
            println!("password changed");
        }
        Command::Analyze(args) => stream::analyze(&mut client, args).await?,
        Command::Camera(args) => stream::camera(&mut client, args).await?,
        Command::Videos { all } => account::videos(&mut client, all).await?,
        Command::Video { id } => account::video(&mut client, &id).await?,
        Command::History { user } => account::history(&mut client, user.as_deref()).await?,
        Command::Users(UsersCommand::List) => account::users(&mut client).await?,
        Command::Users(UsersCommand::Get { id }) => account::user(&mut client, &id).await?,
        Command::Users(UsersCommand::Add {
            username,
            email,
            password,
            address,
            phone,
        }) => {
            let user = account::new_user(username, email, password, address, phone);
            account::add_user(&mut client, &user).await?
        }
        Command::Notifications(NotificationsCommand::Get) => {
            account::notifications(&mut client, None, None).await?
        }
        Command::Notifications(NotificationsCommand::Set { email, website }) => {
            account::notifications(
                &mut client,
                email.map(Toggle::enabled),
                website.map(Toggle::enabled),
            )
            .await?
        }
    }
    Ok(())
}
