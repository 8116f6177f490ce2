//! funnel: command-line surface of the micro-tool content funnel.
//!
//! ```text
//! funnel init
//! funnel build_tool --template roi_calculator --slug roi-calc --niche freelance
//! funnel publish_product --tool roi-calc --price 29
//! funnel generate_content --tool roi-calc --platform youtube,pinterest --count 2
//! funnel post_content --platform youtube
//! funnel analytics_report
//! funnel daily_run
//! ```
//!
//! ## Configuration
//! - `funnel.yaml`, `--config` / `FUNNEL_CONFIG`, then `FUNNEL__*` variables
//! - `.env` in the working directory is loaded first
//! - FUNNEL_LOG: tracing filter (default: info)
//!
//! Exit status is 0 on success, 1 for an expected failure (unknown tool,
//! taken slug, missing credentials, remote rejection) and 2 for anything
//! else.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::warn;

use funnel::config::Config;
use funnel::services::{self, Services};
use funnel::storage::SqliteStore;
use funnel::utils::bootstrap::init_tracing;
use funnel::{FunnelError, Result};

#[derive(Parser)]
#[command(name = "funnel")]
#[command(about = "Build, publish, promote and track small web tools")]
#[command(version)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the store and output folders
    #[command(name = "init")]
    Init,

    /// Build a tool from a template
    #[command(name = "build_tool")]
    BuildTool {
        /// Template name (roi_calculator, budget_planner, flip_profit)
        #[arg(long)]
        template: String,

        /// URL-safe tool identifier
        #[arg(long)]
        slug: String,

        /// Niche/category (default: general)
        #[arg(long)]
        niche: Option<String>,
    },

    /// List a built tool on a commerce platform
    #[command(name = "publish_product")]
    PublishProduct {
        /// Tool slug
        #[arg(long)]
        tool: String,

        /// Commerce platform (default from config)
        #[arg(long)]
        platform: Option<String>,

        /// Price (default from config)
        #[arg(long)]
        price: Option<f64>,
    },

    /// Generate promotional content for a tool
    #[command(name = "generate_content")]
    GenerateContent {
        /// Tool slug
        #[arg(long)]
        tool: String,

        /// Comma-separated platforms (default from config)
        #[arg(long, value_delimiter = ',')]
        platform: Vec<String>,

        /// Items per platform
        #[arg(long, default_value_t = 1)]
        count: u32,
    },

    /// Post the oldest generated item for each platform
    #[command(name = "post_content")]
    PostContent {
        /// Comma-separated platforms (default from config)
        #[arg(long, value_delimiter = ',')]
        platform: Vec<String>,
    },

    /// Print funnel analytics
    #[command(name = "analytics_report")]
    AnalyticsReport,

    /// Analytics, winner selection and content generation in one pass
    #[command(name = "daily_run")]
    DailyRun,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let dotenv = dotenvy::dotenv();
    init_tracing(cli.verbose);
    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, "Ignoring unreadable .env file");
        }
    }

    let result = match Config::load(cli.config.as_deref()) {
        Ok(config) => run(cli.command, &config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {e}");
            if e.is_expected() {
                ExitCode::from(1)
            } else {
                ExitCode::from(2)
            }
        }
    }
}

async fn run(command: Commands, config: &Config) -> Result<()> {
    if let Commands::Init = command {
        let store = services::initialize(config).await?;
        store.close().await;
        println!("✅ Database initialized at {}", config.storage.path.display());
        println!("✅ Folders created");
        return Ok(());
    }

    let store = SqliteStore::open(&config.storage).await?;
    let services = Services::from_config(store.clone(), config)?;
    let result = dispatch(command, config, &services).await;
    store.close().await;
    result
}

async fn dispatch(command: Commands, config: &Config, services: &Services) -> Result<()> {
    match command {
        Commands::Init => Ok(()),

        Commands::BuildTool {
            template,
            slug,
            niche,
        } => {
            let tool = services
                .builder
                .build(&slug, &template, niche.as_deref())
                .await?;
            let location = tool
                .build_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!("✅ Built '{}' from template '{template}'", tool.slug);
            println!("   Location: {location}");
            println!("   To preview: serve {location} with any static file server");
            Ok(())
        }

        Commands::PublishProduct {
            tool,
            platform,
            price,
        } => {
            let platform = platform.unwrap_or_else(|| config.commerce.default_platform.clone());
            let price = price.unwrap_or(config.commerce.default_price);
            match services.publisher.publish(&tool, &platform, price).await? {
                Some(product) => {
                    println!("✅ Product published to {}", product.platform);
                    println!("   Checkout URL: {}", product.url);
                }
                None => println!("⚠️ Platform {platform} has no commerce adapter; nothing published"),
            }
            Ok(())
        }

        Commands::GenerateContent {
            tool,
            platform,
            count,
        } => {
            let platforms = or_default(platform, config);
            let items = services.generator.generate(&tool, platforms.as_slice(), count).await?;
            for item in &items {
                println!("✅ Generated content for {tool} - {}", item.platform);
            }
            println!(
                "✅ Created {} content item(s) for {}",
                items.len(),
                platforms.join(",")
            );
            Ok(())
        }

        Commands::PostContent { platform } => {
            let mut first_error: Option<FunnelError> = None;
            for platform in or_default(platform, config) {
                match services.poster.post_next(&platform).await {
                    Ok(Some(content)) => println!(
                        "✅ Posted to {platform}: {}",
                        content.posted_url.as_deref().unwrap_or("(no url)")
                    ),
                    Ok(None) => println!("⚠️ No pending content for {platform}"),
                    Err(e) => {
                        eprintln!("❌ {platform}: {e}");
                        first_error.get_or_insert(e);
                    }
                }
            }
            first_error.map_or(Ok(()), Err)
        }

        Commands::AnalyticsReport => {
            let snapshot = services.analytics.snapshot().await?;
            println!("{snapshot}");
            Ok(())
        }

        Commands::DailyRun => {
            println!("🚀 Starting daily automation run...\n");
            let report = services.orchestrator.run_daily().await;
            print!("{report}");
            println!("\n✅ Daily run complete!");
            println!("   Use 'funnel analytics_report' for full metrics");
            Ok(())
        }
    }
}

/// Platforms from the command line, or the configured daily set.
fn or_default(platforms: Vec<String>, config: &Config) -> Vec<String> {
    if platforms.is_empty() {
        config.daily.platforms.clone()
    } else {
        platforms
    }
}
