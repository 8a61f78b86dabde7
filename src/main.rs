use clap::{Parser, Subcommand};
use tracing::error;

use stagehand::Error;

mod commands;

use commands::{deploy, image, provision};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "stagehand")]
#[command(version = VERSION)]
#[command(about = "CLI for building machine images and deploying them with Packer and Terraform")]
struct Cli {
    /// Enable debug-level log output
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a machine image with Packer
    Image(image::ImageArgs),
    /// Apply infrastructure changes with Terraform
    Provision(provision::ProvisionArgs),
    /// Build an image and deploy it end to end
    Deploy(deploy::DeployArgs),
}

fn init_logging(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let result = match cli.command {
        Commands::Image(args) => image::run(args),
        Commands::Provision(args) => provision::run(args),
        Commands::Deploy(args) => deploy::run(args),
    };

    let exit_code = match result {
        Ok(()) => 0,
        Err(e) => {
            if let Error::CommandFailed { process } = &e {
                error!("stdout:\n{}", process.stdout);
                error!("stderr:\n{}", process.stderr);
            }
            error!("{e}");
            e.exit_code()
        }
    };

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
