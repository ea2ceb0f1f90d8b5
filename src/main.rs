use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use yansi::Paint;

use synapse::cli::{self, CliContext, CliError};
use synapse::config::{self, Settings, DEFAULT_HOST, DEFAULT_PORT};
use synapse::forms::{ImageInput, ServerInput, SignupInput};
use synapse::models::{AppState, InstanceAction};
use synapse::routes::build_router;

#[derive(Parser)]
#[command(
    name = "synapse",
    author,
    version,
    about = "AI Synapse GPU instance dashboard",
    long_about = r#"AI Synapse: launch and manage GPU instances from the browser or the terminal.

`synapse serve` runs the web dashboard. Every other command talks to the same
backend REST API directly; `synapse login` stores the backend session so later
commands stay signed in.

Examples:
  synapse serve --port 8080
  synapse login alice
  synapse instances list
  synapse instances launch --image pytorch --gpus 2
  synapse instances watch
"#,
    after_help = "Use `synapse <subcommand> --help` for subcommand options."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
    /// Disable request/response logging
    #[arg(long, global = true)]
    silent: bool,
    /// Load environment variables from this file instead of `.env`
    #[arg(long, global = true)]
    env_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web dashboard
    Serve {
        #[arg(long, default_value_t = String::from(DEFAULT_HOST))]
        host: String,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    #[command(about = "Validate configuration and probe the backend", long_about = "Print the effective settings, validate SYNAPSE_API_BASE_URL and call the profile endpoint to confirm the backend answers.")]
    CheckConfig,
    /// Sign in and store the backend session
    Login {
        /// Username or email address
        identifier: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Create an account
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password2: String,
    },
    /// Show the signed-in account
    Whoami,
    /// Print the version
    Version,
    #[command(about = "List, launch, start and stop instances")]
    Instances {
        #[command(subcommand)]
        sub: InstanceCommands,
    },
    #[command(about = "List and define images")]
    Images {
        #[command(subcommand)]
        sub: ImageCommands,
    },
    #[command(about = "List and add GPU servers (admin only)")]
    Servers {
        #[command(subcommand)]
        sub: ServerCommands,
    },
    #[command(about = "Show the profile or change the SSH key")]
    Profile {
        #[command(subcommand)]
        sub: ProfileCommands,
    },
}

#[derive(Subcommand)]
enum InstanceCommands {
    /// List your instances
    List,
    #[command(about = "Launch an instance", long_about = "Launch an instance from an available image. `--image` accepts the image id, name or registry path; the backend picks the server.")]
    Launch {
        #[arg(long)]
        image: String,
        #[arg(long, default_value = "1")]
        gpus: String,
    },
    /// Start a stopped or failed instance (id or unique id prefix)
    Start { instance_id: String },
    /// Stop a running instance (id or unique id prefix)
    Stop { instance_id: String },
    #[command(about = "Live instance list", long_about = "Refresh the list on the poll interval. Type `start <id>` or `stop <id>` to act on an instance, `r` to refresh, `q` to quit.")]
    Watch,
}

#[derive(Subcommand)]
enum ImageCommands {
    /// List images
    List,
    /// Define a new image
    Create {
        #[arg(long)]
        name: String,
        /// Registry path, e.g. registry.local/pytorch:2.3
        #[arg(long)]
        tag: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        os_name: String,
        #[arg(long, default_value = "")]
        os_version: String,
        #[arg(long, default_value = "")]
        cuda_version: String,
        #[arg(long, default_value = "x86_64")]
        architecture: String,
        /// Hide the image from the launch form
        #[arg(long)]
        unavailable: bool,
    },
}

#[derive(Subcommand)]
enum ServerCommands {
    /// List servers
    List,
    /// Add a server
    Create {
        #[arg(long)]
        hostname: String,
        #[arg(long)]
        ip_address: String,
        #[arg(long)]
        inactive: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the profile
    Show,
    /// Set the SSH public key; with no key and no --file the key is removed
    SetSshKey {
        key: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn checkbox(ticked: bool) -> Option<String> {
    ticked.then(|| "on".to_string())
}

async fn start_server(settings: Settings, host: &str, port: u16) {
    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(%e, "Invalid host/port format");
            eprintln!("{}: {}", "Invalid host/port format".red(), e);
            process::exit(1);
        }
    };
    let backend = settings.api_base_url.clone();
    let app = build_router(AppState::new(settings));
    tracing::info!(%addr, %backend, "Starting synapse dashboard");
    println!(
        "{} {} {} {}",
        "Dashboard running on".green(),
        format!("http://{}", addr).cyan(),
        "backed by".green(),
        backend.cyan()
    );
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(%e, "Server encountered an error while running");
                eprintln!("{}: {}", "Server error".red(), e);
                process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(%e, "Failed to bind to address; is the port already in use?");
            eprintln!(
                "{}: {}\n{}",
                format!("Failed to bind to {}", addr).red(),
                e,
                "Stop the process using this port or pass a different --port.".yellow()
            );
            process::exit(1);
        }
    }
}

async fn run(command: Commands, settings: Settings) -> Result<(), CliError> {
    match command {
        Commands::Serve { host, port } => {
            start_server(settings, &host, port).await;
            Ok(())
        }
        Commands::CheckConfig => cli::auth::check_config(&settings).await,
        Commands::Version => {
            println!("synapse {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => {
            let ctx = CliContext::load(settings)?;
            match command {
                Commands::Login { identifier, password } => cli::auth::login(&ctx, &identifier, password).await,
                Commands::Logout => cli::auth::logout(&ctx).await,
                Commands::Signup {
                    username,
                    email,
                    password,
                    password2,
                } => {
                    let input = SignupInput {
                        username,
                        email,
                        password,
                        password2,
                    };
                    cli::auth::signup(&ctx, input).await
                }
                Commands::Whoami => cli::auth::whoami(&ctx).await,
                Commands::Instances { sub } => match sub {
                    InstanceCommands::List => cli::instances::list(&ctx).await,
                    InstanceCommands::Launch { image, gpus } => cli::instances::launch(&ctx, &image, &gpus).await,
                    InstanceCommands::Start { instance_id } => {
                        cli::instances::run_action(&ctx, &instance_id, InstanceAction::Start).await
                    }
                    InstanceCommands::Stop { instance_id } => {
                        cli::instances::run_action(&ctx, &instance_id, InstanceAction::Stop).await
                    }
                    InstanceCommands::Watch => cli::instances::watch(&ctx).await,
                },
                Commands::Images { sub } => match sub {
                    ImageCommands::List => cli::catalog::images_list(&ctx).await,
                    ImageCommands::Create {
                        name,
                        tag,
                        description,
                        os_name,
                        os_version,
                        cuda_version,
                        architecture,
                        unavailable,
                    } => {
                        let input = ImageInput {
                            name,
                            tag,
                            description,
                            os_name,
                            os_version,
                            cuda_version,
                            architecture,
                            is_available: checkbox(!unavailable),
                        };
                        cli::catalog::images_create(&ctx, input).await
                    }
                },
                Commands::Servers { sub } => match sub {
                    ServerCommands::List => cli::catalog::servers_list(&ctx).await,
                    ServerCommands::Create {
                        hostname,
                        ip_address,
                        inactive,
                    } => {
                        let input = ServerInput {
                            hostname,
                            ip_address,
                            is_active: checkbox(!inactive),
                        };
                        cli::catalog::servers_create(&ctx, input).await
                    }
                },
                Commands::Profile { sub } => match sub {
                    ProfileCommands::Show => cli::profile::show(&ctx).await,
                    ProfileCommands::SetSshKey { key, file } => {
                        cli::profile::set_ssh_key(&ctx, key, file.as_deref()).await
                    }
                },
                Commands::Serve { .. } | Commands::CheckConfig | Commands::Version => Ok(()),
            }
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }
    if cli.silent {
        synapse::api::client::set_silent(true);
    }

    config::load_env_file(cli.env_file.as_deref());
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(%e, "invalid configuration");
            eprintln!("{}: {}", "Configuration error".red(), e);
            process::exit(1);
        }
    };

    // No subcommand serves the dashboard with defaults.
    let command = cli.command.unwrap_or(Commands::Serve {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_PORT,
    });
    if let Err(e) = run(command, settings).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
