use clap::Parser;
use pylontech_exporter::cli::{args::Args, commands};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Cancelled on CTRL+C; serve drains gracefully, one-shot commands abort
        let cancellation_token = CancellationToken::new();

        let signal_token = cancellation_token.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                    signal_token.cancel();
                }
                Err(e) => eprintln!("Failed to install CTRL+C signal handler: {}", e),
            }
        });

        commands::run(args, cancellation_token).await
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Pylontech Exporter - Battery Console Metrics");
    println!("============================================");
    println!();
    println!("Polls a Pylontech battery console through its HTTP bridge and serves");
    println!("cell and power-supply status as Prometheus metrics.");
    println!();
    println!("USAGE:");
    println!("    pylontech-exporter <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    serve         Poll the device periodically and serve /metrics");
    println!("    parse         Parse a captured console dump and print JSON");
    println!("    scrape-once   Run a single scrape cycle and print JSON");
    println!("    help          Show this help message or help for specific commands");
    println!();
    println!("ENVIRONMENT:");
    println!("    DEVICE_IP, DEVICE_PORT, PORT, REFRESH_SECONDS, LOG_VERBOSE,");
    println!("    PROM_NAMESPACE, REQUEST_TIMEOUT_SECONDS, BAT_COMMAND_FORMAT,");
    println!("    BAT_LABEL_FORMAT, POWER_COMMAND");
    println!();
    println!("EXAMPLES:");
    println!("    # Serve metrics for a console bridge on the LAN:");
    println!("    DEVICE_IP=192.168.1.50 pylontech-exporter serve");
    println!();
    println!("    # Inspect a captured battery table:");
    println!("    pylontech-exporter parse --kind battery bat1.txt");
    println!();
    println!("For detailed help on any command, use:");
    println!("    pylontech-exporter <COMMAND> --help");
}
