use std::path::PathBuf;

use clap::Args;

use stagehand::provision::{self, ProvisionConfig};
use stagehand::{Result, SystemRunner};

use super::split_flags;

#[derive(Args)]
pub struct ProvisionArgs {
    /// The build environment for deploying to
    pub environment: String,

    /// Terraform subcommand to run (normally apply)
    pub subcmd: String,

    /// Name of the AWS credentials profile
    #[arg(long)]
    pub aws_profile: String,

    /// AWS region the infrastructure is provisioned in
    #[arg(long, default_value = "us-west-2")]
    pub aws_region: String,

    /// Version string embedded into build metadata
    #[arg(long, default_value = "0.0.0")]
    pub build_version: String,

    /// Commit hash embedded into build metadata
    #[arg(long, default_value = "")]
    pub commit_hash: String,

    /// Path to the directory containing the Terraform configs
    #[arg(long)]
    pub terraform_dir: PathBuf,

    /// Additional flags to pass when calling terraform
    #[arg(long, default_value = "")]
    pub terraform_flags: String,

    /// A comma-separated list of AWS AZs for creating VPC subnets
    #[arg(long, default_value = "us-west-2a")]
    pub availability_zones: String,

    /// AMI for launched EC2 instances
    #[arg(long, default_value = "")]
    pub ec2_image_id: String,

    /// Instance type for launched EC2 instances
    #[arg(long, default_value = "t3.micro")]
    pub ec2_instance_type: String,

    /// Name of the SSH key pair for ubuntu@ access to EC2 instances
    #[arg(long)]
    pub ec2_ssh_key_pair: String,

    /// Domain name the deployed service is reachable under
    #[arg(long)]
    pub domain_name: String,

    /// Skip running `terraform init` before Terraform steps
    #[arg(long)]
    pub no_init: bool,

    /// Display the terraform plan instead of deploying
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: ProvisionArgs) -> Result<()> {
    let config = ProvisionConfig {
        environment: args.environment,
        subcommand: args.subcmd,
        aws_profile: args.aws_profile,
        aws_region: args.aws_region,
        build_version: args.build_version,
        commit_hash: args.commit_hash,
        terraform_dir: args.terraform_dir,
        terraform_flags: split_flags(&args.terraform_flags),
        availability_zones: args.availability_zones,
        image_id: args.ec2_image_id,
        instance_type: args.ec2_instance_type,
        ssh_key_pair: args.ec2_ssh_key_pair,
        domain_name: args.domain_name,
        skip_init: args.no_init,
        dry_run: args.dry_run,
    };

    let output = provision::apply(&SystemRunner, &config)?;

    if !output.stdout.is_empty() {
        println!("{}", output.stdout);
    }

    Ok(())
}
