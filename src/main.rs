use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use phptravels_e2e::driver::BrowserType;
use phptravels_e2e::runner::scenario::TestItem;
use phptravels_e2e::utils::{RunConfig, VideoMode};
use phptravels_e2e::{report, runner, scenarios};

#[derive(Parser)]
#[command(name = "phptravels-e2e")]
#[command(version)]
#[command(about = "End-to-end UI tests for the PHPTRAVELS customer portal", long_about = None)]
struct Cli {
    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the registered scenarios
    Run {
        /// Only run tests whose module, class or name matches (`reset and not empty`)
        #[arg(short = 'k', long)]
        keyword: Option<String>,

        /// Only run tests carrying a marker (`auth`, `not flaky`, `auth and smoke`)
        #[arg(short = 'm', long)]
        marker: Option<String>,

        /// Browser(s) to run against. Can be specified multiple times.
        #[arg(long)]
        browser: Vec<BrowserType>,

        /// Show the browser window
        #[arg(long, default_value = "false")]
        headed: bool,

        /// Artifact directory (videos, junit.xml, results.json). The Playwright driver
        /// records no traces; a `trace.zip` is attached only if another tool leaves one
        /// in a test's folder.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Allure results directory
        #[arg(long)]
        alluredir: Option<PathBuf>,

        /// Remove previous Allure results first
        #[arg(long, default_value = "false")]
        clean_alluredir: bool,

        /// Video recording mode
        #[arg(long, value_enum)]
        video: Option<VideoMode>,

        /// Concurrent test invocations
        #[arg(short = 'n', long)]
        workers: Option<usize>,

        /// Base URL of the application under test
        #[arg(long)]
        base_url: Option<String>,

        /// Config file (defaults to ./e2e.yaml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the collected test items without running them
    List {
        #[arg(short = 'k', long)]
        keyword: Option<String>,

        #[arg(short = 'm', long)]
        marker: Option<String>,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Rebuild junit.xml and results.json from an Allure results directory
    Report {
        /// Allure results directory
        #[arg(long, default_value = "allure-results")]
        alluredir: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "test-results")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .format_timestamp_millis()
        .init();

    match cli.command {
        Commands::Run {
            keyword,
            marker,
            browser,
            headed,
            output,
            alluredir,
            clean_alluredir,
            video,
            workers,
            base_url,
            config,
        } => {
            let mut config = RunConfig::load(config.as_deref())?;
            if !browser.is_empty() {
                config.browsers = browser;
            }
            if headed {
                config.headless = false;
            }
            if let Some(output) = output {
                config.output_dir = output;
            }
            if let Some(alluredir) = alluredir {
                config.alluredir = alluredir;
            }
            if clean_alluredir {
                config.clean_alluredir = true;
            }
            if let Some(video) = video {
                config.video = video;
            }
            if let Some(workers) = workers {
                config.workers = workers;
            }
            if let Some(base_url) = base_url {
                config.base_url = base_url;
            }

            println!("{} Running tests against: {}", "▶".green().bold(), config.base_url);
            println!("  Browsers: {}", browsers_label(&config.browsers).cyan());
            println!("  Output: {}", config.output_dir.display().to_string().cyan());
            println!("  Allure results: {}", config.alluredir.display().to_string().cyan());

            let results = runner::run_tests(config, keyword.as_deref(), marker.as_deref()).await?;
            if results.summary.has_failures() {
                std::process::exit(1);
            }
        }
        Commands::List {
            keyword,
            marker,
            config,
        } => {
            let config = RunConfig::load(config.as_deref())?;
            let items = TestItem::collect(
                &scenarios::registry(),
                &config.browsers,
                keyword.as_deref(),
                marker.as_deref(),
            );
            for item in &items {
                let scenario = item.scenario;
                let mut line = format!(
                    "{}::{}::{}  {} [{}]",
                    scenario.module,
                    scenario.class,
                    item.name,
                    scenario.id,
                    scenario.severity.as_str()
                );
                if let Some(reason) = scenario.skip {
                    line.push_str(&format!(" {}", format!("SKIP: {}", reason).yellow()));
                }
                println!("{}", line);
            }
            println!("\n{} {} test item(s)", "ℹ".blue(), items.len());
        }
        Commands::Report { alluredir, output } => {
            let results = report::generate_report(&alluredir, &output)?;
            runner::print_summary(&results.summary);
        }
    }

    Ok(())
}

fn browsers_label(browsers: &[BrowserType]) -> String {
    browsers
        .iter()
        .map(|b| b.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_output_help_mentions_missing_traces() {
        let mut cli = Cli::command();
        let run = cli.find_subcommand_mut("run").unwrap();
        let help = run.render_help().to_string();
        let help = help.split_whitespace().collect::<Vec<_>>().join(" ");
        assert!(help.contains("The Playwright driver records no traces"));
    }
}
