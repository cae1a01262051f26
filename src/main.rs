use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tftpd::config::{DEFAULT_PORT, DEFAULT_ROOT};
use tftpd::{Config, Server};

/// Trivial File Transfer Protocol (RFC 1350) server.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// UDP port to listen for requests on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory read requests are served from
    #[arg(long, default_value = DEFAULT_ROOT)]
    read_dir: PathBuf,

    /// Directory write requests are stored into
    #[arg(long, default_value = DEFAULT_ROOT)]
    write_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = Config::new(args.port, args.read_dir, args.write_dir);
    config.validate()?;

    let server = Server::new(&config)
        .with_context(|| format!("couldn't bind to port {}", config.port))?;
    info!("Serving Trivial File Transfer Protocol (TFTP) @ {}", server.local_addr()?);
    info!(read_dir = %config.read_dir.display(), write_dir = %config.write_dir.display(), "roots");

    server.run()?;
    Ok(())
}
