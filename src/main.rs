use clap::{Parser, Subcommand};
use commune_web_map::config::AppConfig;
use commune_web_map::controller::Command;
use commune_web_map::dashboard::build_dashboard;
use commune_web_map::filter::FilterForm;
use commune_web_map::types::FilterState;
use commune_web_map::{server, snapshot};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard API and static assets
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Render the filtered map to PNG and print the chart and one table page
    Snapshot {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        #[arg(long, default_value = "all")]
        category: String,
        #[arg(long, default_value = "all")]
        server: String,
        #[arg(long, default_value = "all")]
        https: String,
        /// Minimum population; empty for no threshold
        #[arg(long, default_value = "")]
        min_population: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Overrides `output.snapshot` from the config
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            info!("Serving dashboard with config: {:?}", config);
            let app_config = AppConfig::load_from_file(&config)?;
            server::start_server(app_config).await?;
        }
        Commands::Snapshot { config, category, server, https, min_population, page, output } => {
            info!("Rendering snapshot with config: {:?}", config);
            let app_config = AppConfig::load_from_file(&config)?;

            let form = FilterForm { category, server, https, population: min_population };
            let filter = FilterState::from_form(&form)?;

            let mut dashboard = build_dashboard(&app_config).await?;
            dashboard.dispatch(Command::FilterChanged(filter));
            if page != 1 {
                let frame = dashboard.dispatch(Command::PageRequested(page));
                if frame.table.page.current_page != page {
                    warn!("Page {} does not exist, showing page {}", page, frame.table.page.current_page);
                }
            }

            let path = output.unwrap_or_else(|| app_config.output.snapshot.clone());
            snapshot::save_png(&dashboard.render_map_image(), &path)?;

            let view = dashboard.view();
            println!("{} communes match", view.filtered);
            println!();
            for bar in &view.bars {
                println!("{:<24} {:>6}", bar.server, bar.count);
            }
            println!();
            for row in &view.table.rows {
                println!(
                    "{:<28} {:<6} {:>10}  {:<22} {:<18} {:<18} {:<6} {}",
                    row.commune, row.code, row.population, row.category,
                    row.server, row.application, row.https, row.url
                );
            }
            println!("page {}/{}", view.table.page.current_page, view.table.page.total_pages);
        }
    }

    Ok(())
}
