use std::path::PathBuf;

use clap::Args;

use stagehand::image::{self, ImageBuildConfig};
use stagehand::{Result, SystemRunner};

use super::split_flags;

#[derive(Args)]
pub struct ImageArgs {
    /// The build environment for deploying to
    pub environment: String,

    /// Name of the AWS credentials profile
    #[arg(long)]
    pub aws_profile: String,

    /// AWS region the image is built in
    #[arg(long, default_value = "us-west-2")]
    pub aws_region: String,

    /// Version string embedded into build metadata
    #[arg(long, default_value = "0.0.0")]
    pub build_version: String,

    /// Commit hash embedded into build metadata
    #[arg(long, default_value = "")]
    pub commit_hash: String,

    /// Path to the Ansible playbook for Packer builds
    #[arg(long, default_value = "ansible/main.yml")]
    pub ansible_playbook: PathBuf,

    /// Path to the directory containing the Packer configs
    #[arg(long)]
    pub packer_dir: PathBuf,

    /// Additional flags to pass when calling packer
    #[arg(long, default_value = "")]
    pub packer_flags: String,
}

pub fn run(args: ImageArgs) -> Result<()> {
    let config = ImageBuildConfig {
        environment: args.environment,
        aws_profile: args.aws_profile,
        aws_region: args.aws_region,
        build_version: args.build_version,
        commit_hash: args.commit_hash,
        ansible_playbook: args.ansible_playbook,
        packer_dir: args.packer_dir,
        packer_flags: split_flags(&args.packer_flags),
    };

    let built = image::build(&SystemRunner, &config)?;
    let image_id = image::parse_image_id(&built.stdout);

    if !image_id.is_empty() {
        println!("{image_id}");
    }

    Ok(())
}
