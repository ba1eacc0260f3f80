//! teacheval CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use teacheval_core::config::{load_settings_from, Settings};

mod commands;

use commands::{Context, Format};

#[derive(Parser)]
#[command(name = "teacheval", version, about = "Role-scoped teaching evaluation store")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides the config file and TEACHEVAL_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the seed data set into the data directory
    Init,

    /// Log in and store a session token
    Login {
        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,
    },

    /// End the current session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Check whether a user may submit evaluations
    CanEvaluate {
        /// User id
        #[arg(long)]
        user: String,
    },

    /// Show the teachers and courses a supervisor oversees
    Scope {
        /// Supervisor user id
        #[arg(long)]
        supervisor: String,
    },

    /// Rank a supervisor's teachers by average score
    Summary {
        /// Supervisor user id (default: the logged-in supervisor)
        #[arg(long)]
        supervisor: Option<String>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Write the output to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List visible records for a college or a teacher
    #[command(group(ArgGroup::new("target").required(true).args(["college", "teacher"])))]
    Records {
        #[arg(long)]
        college: Option<String>,

        /// Teacher user id
        #[arg(long)]
        teacher: Option<String>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<Format>,
    },

    /// List notices addressed to a college
    Notices {
        /// College name (default: the logged-in user's college)
        #[arg(long)]
        college: Option<String>,
    },
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("teacheval=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let mut settings = match load_settings_from(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }
    init_tracing(&settings);

    let ctx = Context::new(settings);

    let result = match cli.command {
        Commands::Init => commands::init::execute(&ctx),
        Commands::Login { username, password } => {
            commands::login::execute(&ctx, &username, &password)
        }
        Commands::Logout => commands::logout::execute(&ctx),
        Commands::Whoami => commands::whoami::execute(&ctx),
        Commands::CanEvaluate { user } => commands::can_evaluate::execute(&ctx, &user),
        Commands::Scope { supervisor } => commands::scope::execute(&ctx, &supervisor),
        Commands::Summary {
            supervisor,
            format,
            output,
        } => commands::summary::execute(&ctx, supervisor, format, output),
        Commands::Records {
            college,
            teacher,
            format,
        } => commands::records::execute(&ctx, college, teacher, format),
        Commands::Notices { college } => commands::notices::execute(&ctx, college),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
