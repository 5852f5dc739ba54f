use clap::Parser;
use eframe::egui;
use legal_doc_analyzer::app::LegalDocAnalyzer;
use legal_doc_analyzer::config::{AppConfig, Cli, Command, DEFAULT_LOG_FILTER};
use legal_doc_analyzer::headless;
use tokio::runtime::Runtime;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli);
    let runtime = Runtime::new()?;

    match cli.command.unwrap_or(Command::Gui) {
        Command::Gui => run_gui(config, runtime),
        Command::Analyze(args) => headless::run_analyze(&config, &args, &runtime),
        Command::Health => headless::run_health(&config, &runtime),
    }
}

fn run_gui(config: AppConfig, runtime: Runtime) -> Result<(), Box<dyn std::error::Error>> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 760.0])
            .with_min_inner_size([520.0, 560.0]),
        ..Default::default()
    };

    let handle = runtime.handle().clone();
    eframe::run_native(
        "Legal Document Analyzer",
        options,
        Box::new(move |cc| Box::new(LegalDocAnalyzer::new(cc, &config, handle))),
    )?;

    Ok(())
}
