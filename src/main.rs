use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use nikki::{
    Config, create_app,
    blog::{BlogRepository, PostMetadata},
    startup_checks,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Log level; defaults to the value from the config file
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web server (default if no command specified)
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(long)]
        host: Option<String>,

        /// Automatically quit after specified number of seconds (useful for testing)
        #[arg(long)]
        quit_after: Option<u64>,
    },

    /// Manage blog posts
    #[command(subcommand)]
    Post(PostCommands),
}

#[derive(Subcommand, Debug)]
enum PostCommands {
    /// List published posts, newest first
    List {
        /// Language partition (default partition when omitted)
        #[arg(short = 'L', long)]
        language: Option<String>,
    },
    /// Create a new post; the body is read from a file or stdin
    New {
        title: String,
        /// Short summary shown in listings
        #[arg(short, long)]
        excerpt: String,
        /// Comma-separated tags
        #[arg(short, long, default_value = "")]
        tags: String,
        /// Create the post unpublished
        #[arg(long)]
        draft: bool,
        /// Read the body from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Language partition (default partition when omitted)
        #[arg(short = 'L', long)]
        language: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let level = effective_log_level(cli.log_level.as_deref(), &config);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Configuration loaded from: {:?}", cli.config);

    match cli.command {
        Some(Commands::Post(post_cmd)) => handle_post_command(config, post_cmd).await,
        Some(Commands::Serve {
            port,
            host,
            quit_after,
        }) => run_server(config, port, host, quit_after).await,
        None => run_server(config, None, None, None).await,
    }
}

fn load_config(config_path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
    if config_path.exists() {
        let config_content = std::fs::read_to_string(config_path)?;
        Ok(toml_edit::de::from_str::<Config>(&config_content)?)
    } else {
        Ok(Config::default())
    }
}

/// The CLI flag wins; otherwise the level comes from `[app] log_level`.
fn effective_log_level(flag: Option<&str>, config: &Config) -> Level {
    let level = flag.unwrap_or(&config.app.log_level);
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

async fn handle_post_command(
    config: Config,
    cmd: PostCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    let repository = BlogRepository::new(config.blog);

    match cmd {
        PostCommands::List { language } => {
            let posts = repository.list(language.as_deref()).await;
            if posts.is_empty() {
                println!("No published posts");
            } else {
                for post in posts {
                    let updated = post
                        .updated_date
                        .map(|date| format!(" (updated {})", date.format("%Y-%m-%d")))
                        .unwrap_or_default();
                    println!(
                        "{}  {}{}  {}",
                        post.date.format("%Y-%m-%d"),
                        post.slug,
                        updated,
                        post.title
                    );
                }
            }
        }
        PostCommands::New {
            title,
            excerpt,
            tags,
            draft,
            file,
            language,
        } => {
            let body = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => std::io::read_to_string(std::io::stdin())?,
            };

            let slug = BlogRepository::slug_from_title(&title);
            if slug.is_empty() {
                eprintln!("Error: title produces an empty slug");
                std::process::exit(1);
            }

            let metadata = PostMetadata {
                title,
                date: chrono::Utc::now().date_naive(),
                updated_date: None,
                excerpt,
                tags: tags
                    .split(',')
                    .map(|tag| tag.trim().to_string())
                    .filter(|tag| !tag.is_empty())
                    .collect(),
                published: !draft,
            };

            let slug = repository
                .create(&slug, &metadata, &body, language.as_deref())
                .await?;
            println!("Created post '{}'", slug);
        }
    }

    Ok(())
}

async fn run_server(
    config: Config,
    port: Option<u16>,
    host: Option<String>,
    quit_after: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = host.unwrap_or(config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info!("Starting {} server", config.app.name);
    info!("Template directory: {:?}", config.templates.directory);
    info!(
        "Static files directory: {:?}",
        config.static_files.directory
    );
    info!(
        "Blog content directory: {:?}",
        config.blog.content_directory
    );

    match startup_checks::perform_startup_checks(&config).await {
        Ok(()) => info!("All startup checks passed"),
        Err(errors) => {
            for error in &errors {
                tracing::error!("Startup check failed: {}", error);
            }
            let critical_error = errors.iter().any(|e| {
                matches!(
                    e,
                    startup_checks::StartupCheckError::TemplatesDirectoryMissing(_)
                )
            });

            if critical_error {
                tracing::error!("Critical startup check failed, exiting");
                return Err("Critical startup check failed".into());
            } else {
                tracing::warn!("Non-critical startup checks failed, continuing");
            }
        }
    }

    let app = create_app(config).await;

    let addr = SocketAddr::from((host.parse::<std::net::IpAddr>()?, port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let app = app.into_make_service_with_connect_info::<SocketAddr>();

    let server = axum::serve(listener, app);
    let graceful = server.with_graceful_shutdown(shutdown_signal(quit_after));

    if let Err(e) = graceful.await {
        tracing::error!("Server error: {}", e);
    }

    info!("Shutting down");

    Ok(())
}

async fn shutdown_signal(quit_after: Option<u64>) {
    use tokio::signal;
    use tokio::time::{Duration, sleep};

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let quit_timer = async {
        if let Some(seconds) = quit_after {
            info!(
                "Server will automatically shut down after {} seconds",
                seconds
            );
            sleep(Duration::from_secs(seconds)).await;
            info!("Quit timer expired, shutting down");
        } else {
            std::future::pending::<()>().await
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        },
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        },
        _ = quit_timer => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_falls_back_to_config() {
        let mut config = Config::default();
        config.app.log_level = "warn".to_string();
        assert_eq!(effective_log_level(None, &config), Level::WARN);
    }

    #[test]
    fn log_level_flag_overrides_config() {
        let mut config = Config::default();
        config.app.log_level = "warn".to_string();
        assert_eq!(effective_log_level(Some("debug"), &config), Level::DEBUG);
        assert_eq!(effective_log_level(Some("TRACE"), &config), Level::TRACE);
    }

    #[test]
    fn unknown_log_level_defaults_to_info() {
        let config = Config::default();
        assert_eq!(effective_log_level(Some("verbose"), &config), Level::INFO);
    }
}
