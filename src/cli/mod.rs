use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::clients::findsgjobs::FindSgJobsClient;
use crate::infra::config::Config;

#[derive(Parser)]
#[command(name = "sgjobs-mcp-gateway")]
#[command(about = "FindSGJobs MCP gateway - job search tools over stdio")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate configuration without starting the server
    Config,
    /// Run one search against the upstream API and print a summary
    TestSearch {
        /// Search keywords
        #[arg(short, long, default_value = "software engineer")]
        keywords: String,
        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        None => match crate::infra::boot::run_stdio_server().await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("❌ Startup failed: {e}");
                ExitCode::FAILURE
            }
        },
        Some(command) => run_commands(command).await,
    }
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Config => match Config::from_env() {
            Ok(cfg) => {
                println!(
                    "✅ Configuration is valid (base_url={}, timeout={}s)",
                    cfg.base_url, cfg.timeout_secs
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {e}");
                ExitCode::FAILURE
            }
        },
        Commands::TestSearch { keywords, page } => match test_search(&keywords, page).await {
            Ok(()) => {
                println!("✅ Upstream search test passed");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Upstream search test failed: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn test_search(keywords: &str, page: u32) -> anyhow::Result<()> {
    let cfg = Config::from_env()?;
    let client = FindSgJobsClient::from_config(&cfg);
    let result = client.search(keywords, page, 10).await?;
    println!(
        "{} jobs for '{}' (page {} of {})",
        result.total_jobs, keywords, result.current_page, result.total_pages
    );
    for job in &result.jobs {
        println!(
            "- {} @ {}",
            job.title.as_deref().unwrap_or("(untitled)"),
            job.company.as_deref().unwrap_or("(unknown company)")
        );
    }
    Ok(())
}
