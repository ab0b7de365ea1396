use std::{io, path::PathBuf, process};

use clap::{builder::FalseyValueParser, ArgAction, Parser, Subcommand};
use log::debug;
use shipcopy::{cp, docker::DEFAULT_HOST, CopyRequest, Docker, Error, Result};

#[derive(Debug, Parser)]
#[command(name = "shipcopy", version, about = "Copy files out of docker containers")]
struct Cli {
    /// Daemon socket to connect to
    #[arg(short = 'H', long, env = "DOCKER_HOST", default_value = DEFAULT_HOST, global = true)]
    host: String,

    /// Use TLS, implied by --tlsverify
    #[arg(long, global = true)]
    tls: bool,

    /// Use TLS and verify the daemon's certificate
    #[arg(
        long,
        env = "DOCKER_TLS_VERIFY",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new(),
        global = true
    )]
    tlsverify: bool,

    /// Directory holding cert.pem, key.pem and ca.pem
    #[arg(long, env = "DOCKER_CERT_PATH", global = true)]
    tlscert: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Copy files/folders from a PATH on the container to a HOSTDIR on the host
    /// running the command. Use '-' to write the data as a tar file to STDOUT.
    Cp {
        #[arg(value_name = "CONTAINER:PATH")]
        source: String,

        #[arg(value_name = "HOSTDIR|-")]
        dest: String,
    },
}

fn connect(cli: &Cli) -> Result<Docker> {
    if cli.tls || cli.tlsverify {
        let certs = cli.tlscert.as_ref().ok_or_else(|| {
            Error::InvalidArgument("TLS needs --tlscert or DOCKER_CERT_PATH".to_owned())
        })?;
        debug!("connecting to {} over TLS", cli.host);
        Docker::tls(&cli.host, certs, cli.tlsverify)
    } else {
        debug!("connecting to {}", cli.host);
        Docker::new(&cli.host)
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Cp {
            ref source,
            ref dest,
        } => {
            let request = CopyRequest::parse(source, dest)?;
            let docker = connect(&cli)?;
            cp::run(&docker, &request, &mut io::stdout()).await
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
