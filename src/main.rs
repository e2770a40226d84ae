//! Cross-Venue Hedger - Main Entry Point
//!
//! Runs the hedge controller against simulated trading pages, with settings
//! persisted across restarts.

use anyhow::Result;
use clap::{Parser, Subcommand};
use cross_venue_hedger::config::Config;
use cross_venue_hedger::hedge::{FixedDelays, HedgeController, HedgeParams};
use cross_venue_hedger::persistence::{PersistedSettings, SettingsStore};
use cross_venue_hedger::surface::variational::markers as v_markers;
use cross_venue_hedger::surface::{
    lighter::markers as l_markers, mock::lighter_position_row, mock::variational_position_row,
    Direction, LighterReader, MockSurface, PositionReader, Site, StaticSurfaceLocator,
    SurfaceAction, VariationalReader,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Cross-Venue Hedger CLI
#[derive(Parser)]
#[command(name = "cross-venue-hedger")]
#[command(version, about = "Cross-venue delta hedging from rendered trading pages")]
struct Cli {
    /// Coin symbol to monitor (overrides saved settings)
    #[arg(short, long)]
    symbol: Option<String>,

    /// Poll interval in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Net exposure at which to hedge
    #[arg(long)]
    exposure_threshold: Option<Decimal>,

    /// Hedge lock timeout in milliseconds
    #[arg(long)]
    lock_timeout_ms: Option<u64>,

    /// Path to the SQLite settings database
    #[arg(long, default_value = "data/hedger.db")]
    db: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the last saved hedge settings
    Settings {
        /// Path to SQLite database (default: data/hedger.db)
        #[arg(short, long, default_value = "data/hedger.db")]
        db: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    if let Some(Commands::Settings { db }) = cli.command {
        return show_settings(&db);
    }

    info!("╔════════════════════════════════════════════════════════════╗");
    info!(
        "║          Cross-Venue Hedger v{} - Simulation             ║",
        env!("CARGO_PKG_VERSION")
    );
    info!("╚════════════════════════════════════════════════════════════╝");

    let config = Config::load()?;
    let store = SettingsStore::new(&cli.db)?;

    // Settings precedence: CLI flag > saved settings > config file/defaults.
    let mut hedge = config.hedge.clone();
    if let Some((saved, saved_at)) = store.load()? {
        info!(
            "💾 Restored settings saved at {}",
            saved_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        hedge.symbol = saved.symbol;
        hedge.poll_interval_ms = saved.poll_interval_ms;
        hedge.exposure_threshold = saved.exposure_threshold;
        hedge.lock_timeout_ms = saved.lock_timeout_ms;
    }
    if let Some(symbol) = cli.symbol {
        hedge.symbol = symbol;
    }
    if let Some(ms) = cli.poll_interval_ms {
        hedge.poll_interval_ms = ms;
    }
    if let Some(threshold) = cli.exposure_threshold {
        hedge.exposure_threshold = threshold;
    }
    if let Some(ms) = cli.lock_timeout_ms {
        hedge.lock_timeout_ms = ms;
    }

    let params = hedge.params();
    params.validate()?;
    store.save(&PersistedSettings {
        symbol: hedge.symbol.clone(),
        poll_interval_ms: hedge.poll_interval_ms,
        exposure_threshold: hedge.exposure_threshold,
        lock_timeout_ms: hedge.lock_timeout_ms,
    })?;
    log_settings(&params);

    // Simulated pages stand in for the two live sites.
    let lighter = Arc::new(MockSurface::new(Site::Lighter));
    let variational = Arc::new(MockSurface::new(Site::Variational));
    let locator = Arc::new(StaticSurfaceLocator::new(
        lighter.clone(),
        variational.clone(),
    ));
    let delays = Arc::new(FixedDelays::new(hedge.settle_delay()));

    let (controller, mut feed) = HedgeController::new(locator, delays);

    tokio::spawn(async move {
        while let Some(status) = feed.next().await {
            info!("📟 {status}");
        }
    });

    let sim = SimMarket::new(
        lighter.clone(),
        variational.clone(),
        params.symbol.clone(),
        config.sim.clone(),
    );
    tokio::spawn(sim.run());
    tokio::spawn(log_account_summary(lighter, variational));

    controller.start(params).await?;
    info!("🚀 Monitoring started, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await.ok();
    info!("🛑 Shutdown signal received");
    controller.stop().await;
    info!("👋 Cross-Venue Hedger shutdown complete");
    Ok(())
}

/// Simulated market behind the two mock pages: the Lighter position drifts
/// over time, and submitted Variational orders fill after a delay.
struct SimMarket {
    lighter: Arc<MockSurface>,
    variational: Arc<MockSurface>,
    symbol: String,
    config: cross_venue_hedger::config::SimConfig,
}

impl SimMarket {
    fn new(
        lighter: Arc<MockSurface>,
        variational: Arc<MockSurface>,
        symbol: String,
        config: cross_venue_hedger::config::SimConfig,
    ) -> Self {
        Self {
            lighter,
            variational,
            symbol,
            config,
        }
    }

    async fn run(self) {
        let mut lighter_size = self.config.start_lighter_size;
        let mut variational_size = Decimal::ZERO;

        self.lighter
            .set_text(l_markers::PORTFOLIO_VALUE, "$12,019.10")
            .await;
        self.variational
            .set_text(v_markers::PORTFOLIO_VALUE, "$9,487.55")
            .await;

        // Order form state, as the page would hold it between writes.
        let mut form_quantity: Option<Decimal> = None;
        let mut form_direction: Option<Direction> = None;
        let mut pending_fill: Option<(tokio::time::Instant, Direction, Decimal)> = None;

        let mut ticker = tokio::time::interval(Duration::from_millis(self.config.update_ms));
        let mut next_drift =
            tokio::time::Instant::now() + Duration::from_secs(self.config.drift_every_secs);

        loop {
            ticker.tick().await;
            let now = tokio::time::Instant::now();

            for action in self.variational.take_actions().await {
                match action {
                    SurfaceAction::Input { marker, value }
                        if marker == v_markers::QUANTITY_INPUT =>
                    {
                        form_quantity = Decimal::from_str(&value).ok();
                    }
                    SurfaceAction::Click { marker } if marker == v_markers::BUY_SWITCH => {
                        form_direction = Some(Direction::Buy);
                    }
                    SurfaceAction::Click { marker } if marker == v_markers::SELL_SWITCH => {
                        form_direction = Some(Direction::Sell);
                    }
                    SurfaceAction::Click { marker } if marker == v_markers::SUBMIT_BUTTON => {
                        match (form_quantity, form_direction) {
                            (Some(quantity), Some(direction)) => {
                                info!(%quantity, %direction, "🧾 [SIM] order submitted");
                                pending_fill = Some((
                                    now + Duration::from_millis(self.config.fill_delay_ms),
                                    direction,
                                    quantity,
                                ));
                            }
                            _ => warn!("🧾 [SIM] submit with incomplete order form"),
                        }
                    }
                    other => warn!(?other, "🧾 [SIM] unrecognized page action"),
                }
            }

            if let Some((fill_at, direction, quantity)) = pending_fill {
                if now >= fill_at {
                    let delta = match direction {
                        Direction::Buy => quantity,
                        Direction::Sell => -quantity,
                    };
                    variational_size += delta;
                    info!(%variational_size, "💱 [SIM] order filled");
                    pending_fill = None;
                }
            }

            if now >= next_drift {
                lighter_size += self.config.drift_step;
                next_drift = now + Duration::from_secs(self.config.drift_every_secs);
                info!(%lighter_size, "📈 [SIM] Lighter position drifted");
            }

            self.lighter
                .set_rows(
                    l_markers::POSITION_ROWS,
                    vec![lighter_position_row(
                        &self.symbol,
                        lighter_size,
                        Decimal::ZERO,
                        Decimal::ZERO,
                    )],
                )
                .await;
            self.variational
                .set_rows(
                    v_markers::SVELTE_ROWS,
                    vec![variational_position_row(
                        &self.symbol,
                        variational_size,
                        Decimal::ZERO,
                        Decimal::ZERO,
                    )],
                )
                .await;
        }
    }
}

/// Periodically log the portfolio value rendered on each page.
async fn log_account_summary(lighter: Arc<MockSurface>, variational: Arc<MockSurface>) {
    let lighter = LighterReader::new(lighter);
    let variational = VariationalReader::new(variational);
    let mut ticker = tokio::time::interval(Duration::from_secs(30));
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let lighter_value = lighter.portfolio_value().await.ok().flatten();
        let variational_value = variational.portfolio_value().await.ok().flatten();
        info!(?lighter_value, ?variational_value, "💼 Account summary");
    }
}

fn init_logging() -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    // Create logs directory
    std::fs::create_dir_all("logs")?;

    // File appender for detailed logs
    let file_appender = tracing_appender::rolling::hourly("logs", "cross-venue-hedger.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    // Leak the guard to keep it alive for the program duration
    Box::leak(Box::new(_guard));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("cross_venue_hedger=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_writer(std::io::stdout.and(file_writer))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .init();

    Ok(())
}

/// Log the effective hedge settings on startup.
fn log_settings(params: &HedgeParams) {
    info!("📋 Settings:");
    info!("   Symbol:             {}", params.symbol);
    info!("   Poll Interval:      {:?}", params.poll_interval);
    info!("   Exposure Threshold: {}", params.exposure_threshold);
    info!("   Lock Timeout:       {:?}", params.lock_timeout);
}

fn show_settings(db_path: &str) -> Result<()> {
    use std::path::Path;

    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║              HEDGER SETTINGS                               ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    if !Path::new(db_path).exists() {
        println!("\n❌ Database not found: {}", db_path);
        println!("   The hedger has not been started yet, or the database path is incorrect.");
        return Ok(());
    }

    let store = SettingsStore::new(db_path)?;

    let Some((settings, saved_at)) = store.load()? else {
        println!("\n❌ No saved settings found in database.");
        println!("   The hedger may not have run yet.");
        return Ok(());
    };

    println!("\n⚙️  Last Used Settings");
    println!("   ├─ Symbol:             {}", settings.symbol);
    println!("   ├─ Poll Interval:      {}ms", settings.poll_interval_ms);
    println!("   ├─ Exposure Threshold: {}", settings.exposure_threshold);
    println!("   ├─ Lock Timeout:       {}ms", settings.lock_timeout_ms);
    println!(
        "   └─ Saved At:           {}",
        saved_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    Ok(())
}
