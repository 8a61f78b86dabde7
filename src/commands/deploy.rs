use std::path::PathBuf;

use clap::Args;

use stagehand::deploy::{self, DeployConfig};
use stagehand::{Result, SystemRunner};

use super::split_flags;

#[derive(Args)]
pub struct DeployArgs {
    /// The build environment for deploying to
    #[arg(value_parser = ["development", "production"])]
    pub environment: String,

    /// Name of the AWS credentials profile
    #[arg(long)]
    pub aws_profile: String,

    /// Path to the Ansible playbook for Packer builds
    #[arg(long, default_value = "ansible/main.yml")]
    pub ansible_playbook: PathBuf,

    /// Path to the directory containing the Packer configs
    #[arg(long)]
    pub packer_dir: PathBuf,

    /// Path to the directory containing the Terraform configs
    #[arg(long)]
    pub terraform_dir: PathBuf,

    /// Additional flags to pass when calling packer
    #[arg(long, default_value = "")]
    pub packer_flags: String,

    /// Additional flags to pass when calling terraform
    #[arg(long, default_value = "")]
    pub terraform_flags: String,

    /// A comma-separated list of AWS AZs for creating VPC subnets
    #[arg(long, default_value = "us-west-2a")]
    pub availability_zones: String,

    /// Explicitly set the AMI for launched EC2 instances; implies --no-image
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

    /// Skip performing the Packer image build
    #[arg(long)]
    pub no_image: bool,

    /// Skip performing the Terraform steps
    #[arg(long)]
    pub no_provision: bool,

    /// Display the terraform plan instead of deploying
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: DeployArgs) -> Result<()> {
    let config = DeployConfig {
        environment: args.environment,
        aws_profile: args.aws_profile,
        ansible_playbook: args.ansible_playbook,
        packer_dir: args.packer_dir,
        terraform_dir: args.terraform_dir,
        packer_flags: split_flags(&args.packer_flags),
        terraform_flags: split_flags(&args.terraform_flags),
        availability_zones: args.availability_zones,
        image_id: args.ec2_image_id,
        instance_type: args.ec2_instance_type,
        ssh_key_pair: args.ec2_ssh_key_pair,
        domain_name: args.domain_name,
        skip_init: args.no_init,
        skip_image_build: args.no_image,
        skip_provision: args.no_provision,
        dry_run: args.dry_run,
        base_dir: PathBuf::from("."),
    };

    let output = deploy::run(&SystemRunner, config)?;

    if !output.outputs.is_empty() {
        println!("{}", output.outputs);
    }

    Ok(())
}
