//! portping - TCP/UDP port latency probe

use clap::Parser;
use portping::{
    cli::Cli,
    config::{load_config, validate_config},
    dns::AddressResolver,
    error::{AppError, ErrorReporter, Result},
    executor::ProbeScheduler,
    logging::{Logger, ProbeLogger},
    models::RunSummary,
    output::{ConsoleReporter, OutputFormatterFactory},
    long_version,
};
use std::process;
use tokio_util::sync::CancellationToken;

/// Exit status after an interrupted run
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    let cli = Cli::parse();
    let use_color = cli.use_colors();
    let verbose = cli.verbose;

    if let Err(message) = cli.validate() {
        let error = AppError::config(message);
        ErrorReporter::new(use_color, verbose).report_error(&error);
        process::exit(error.exit_code());
    }

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    match run_application(cli, cancel).await {
        Ok(summary) if summary.was_cancelled() => process::exit(EXIT_CANCELLED),
        Ok(_) => {}
        Err(e) => {
            ErrorReporter::new(use_color, verbose).report_error(&e);
            print_error_suggestions(&e);
            process::exit(e.exit_code());
        }
    }
}

/// Cancel the run on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    cancel.cancel();
}

/// Main application logic
async fn run_application(cli: Cli, cancel: CancellationToken) -> Result<RunSummary> {
    let config = load_config(cli)?;

    let logger = Logger::with_config("portping", &config);
    logger.start_session().await;
    logger.add_context_field("host", &config.host).await;
    logger.add_context_field("protocol", config.protocol).await;
    logger.debug(&long_version()).log().await;

    for warning in validate_config(&config)? {
        eprintln!("{}", warning.format(config.enable_color));
    }

    let probe_config = config.probe_config()?;
    let mut scheduler = ProbeScheduler::from_config(probe_config, cancel)?
        .with_logger(ProbeLogger::from_logger(&logger));

    let formatter = OutputFormatterFactory::create_formatter(config.enable_color, config.verbose);
    let mut reporter = ConsoleReporter::stdout(formatter);

    scheduler.run(&AddressResolver::system(), &mut reporter).await
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::PayloadRequired => {
            eprintln!();
            eprintln!("UDP probes need a payload:");
            eprintln!("  - Pass it as hex after the port: portping --udp host 53 <HEX>");
            eprintln!("  - Or use --payload <HEX>");
            eprintln!("  - Or pick a preset such as --dns, --ntp or --stun");
        }
        AppError::ResolveFailed { .. } | AppError::NoAddressesFound { .. } => {
            eprintln!();
            eprintln!("Resolution help:");
            eprintln!("  - Check that the host name is spelled correctly");
            eprintln!("  - Use -6 to include IPv6 addresses");
        }
        _ => {}
    }
}
