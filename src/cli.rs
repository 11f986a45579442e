use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// UDP port to bind locally. Use 0 for an ephemeral port.
    #[arg(long, default_value_t = 6060)]
    pub local_port: u16,

    /// Host name or address of the remote peer.
    #[arg(long, default_value = "127.0.0.1")]
    pub peer_host: String,

    /// UDP port the remote peer listens on.
    #[arg(long)]
    pub peer_port: u16,
}
