use anyhow::Result;
use clap::Parser;

use peer_talk::{
    cli::Cli,
    session::{Session, SessionConfig},
};

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    // Diagnostics go to stderr; stdout belongs to the chat itself.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = SessionConfig {
        local_port: cli.local_port,
        peer_host: cli.peer_host.clone(),
        peer_port: cli.peer_port,
    };

    let session = Session::bind(&config).await?;
    let local_port = session.local_addr()?.port();

    println!("WELCOME TO PEER TALK");
    println!("===============================================================");
    println!("Your port number: {local_port}");
    println!("Remote user machine name: {}", cli.peer_host);
    println!("Remote user port number: {}", cli.peer_port);
    println!();

    session.run().await?;

    println!("EXITING PEER TALK");
    Ok(())
}
