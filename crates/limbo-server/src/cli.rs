//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "limbo-server", version, about = "Waiting server for Minecraft: Java Edition")]
pub struct Args {
    /// Address to listen on.
    #[arg(short = 'a', long, default_value = "127.0.0.1")]
    pub address: String,

    #[arg(short, long, default_value_t = 25567)]
    pub port: u16,

    /// Maximum simultaneous connections.
    #[arg(short, long = "max-players", default_value_t = 65535)]
    pub max_players: usize,

    /// Serve Prometheus metrics on this port.
    #[arg(short = 'r', long = "metrics-port")]
    pub metrics_port: Option<u16>,

    /// Enable voting mode, signing voting links with this secret.
    #[arg(short = 's', long = "voting-secret")]
    pub voting_secret: Option<String>,

    /// Accept BungeeCord-style legacy forwarding in the handshake.
    #[arg(short = 'b', long)]
    pub bungeecord: bool,

    /// Require Velocity modern forwarding signed with this secret.
    #[arg(short = 'v', long = "velocity-secret")]
    pub velocity_secret: Option<String>,

    /// Show debug markers for spawn, portals and maps.
    #[arg(short, long)]
    pub debug: bool,

    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// How connecting players prove their identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Forwarding {
    None,
    /// Identity packed into the handshake host string.
    Legacy,
    /// Identity signed by the proxy during login.
    Modern(Vec<u8>),
}

impl Args {
    /// The forwarding mode. Both modes at once is an error.
    pub fn forwarding(&self) -> Result<Forwarding, &'static str> {
        match (self.bungeecord, &self.velocity_secret) {
            (true, Some(_)) => Err("BungeeCord and Velocity forwarding cannot both be enabled"),
            (true, None) => Ok(Forwarding::Legacy),
            (false, Some(secret)) => Ok(Forwarding::Modern(secret.as_bytes().to_vec())),
            (false, None) => Ok(Forwarding::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["limbo-server"]).unwrap();
        assert_eq!(args.address, "127.0.0.1");
        assert_eq!(args.port, 25567);
        assert_eq!(args.max_players, 65535);
        assert_eq!(args.config, PathBuf::from("config.toml"));
        assert!(!args.debug);
        assert_eq!(args.forwarding().unwrap(), Forwarding::None);
    }

    #[test]
    fn short_flags() {
        let args = Args::try_parse_from([
            "limbo-server", "-a", "0.0.0.0", "-p", "25565", "-m", "10", "-r", "9100", "-s", "vote",
            "-d", "-c", "other.toml",
        ])
        .unwrap();
        assert_eq!(args.port, 25565);
        assert_eq!(args.max_players, 10);
        assert_eq!(args.metrics_port, Some(9100));
        assert_eq!(args.voting_secret.as_deref(), Some("vote"));
        assert!(args.debug);
    }

    #[test]
    fn forwarding_modes() {
        let legacy = Args::try_parse_from(["limbo-server", "-b"]).unwrap();
        assert_eq!(legacy.forwarding().unwrap(), Forwarding::Legacy);

        let modern = Args::try_parse_from(["limbo-server", "-v", "key"]).unwrap();
        assert_eq!(modern.forwarding().unwrap(), Forwarding::Modern(b"key".to_vec()));

        let both = Args::try_parse_from(["limbo-server", "-b", "-v", "key"]).unwrap();
        assert!(both.forwarding().is_err());
    }
}
