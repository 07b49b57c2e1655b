use clap::Parser;
use lan_http::{Cli, Server, ServerConfig, ServerResult};
use log::{error, info};
use std::path::Path;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> ServerResult<()> {
    let config = cli.to_config()?;

    if let Some(path) = &cli.save_config {
        return save_config(&config, path);
    }

    let server = Server::bind(config)?;

    // Ctrl-C stops the acceptor; run() then drains the pool
    let stop = server.stop_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal. Stopping server...");
        stop.stop();
    }) {
        error!("Could not install Ctrl-C handler: {}", e);
    }

    info!("Press Ctrl+C to stop the server");
    server.run()
}

// Save the effective configuration to a file
fn save_config(config: &ServerConfig, path: &Path) -> ServerResult<()> {
    config.save_to_json_file(path)?;
    info!("Configuration saved to: {}", path.display());
    Ok(())
}
