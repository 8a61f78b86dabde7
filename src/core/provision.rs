//! Terraform step: init, apply (or plan), then read back outputs.

use std::path::PathBuf;

use tracing::info;

use crate::command::{CommandRunner, CommandSpec, FinishedProcess};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    pub environment: String,
    pub subcommand: String,
    pub aws_profile: String,
    pub aws_region: String,
    pub build_version: String,
    pub commit_hash: String,
    pub terraform_dir: PathBuf,
    pub terraform_flags: Vec<String>,
    pub availability_zones: String,
    pub image_id: String,
    pub instance_type: String,
    pub ssh_key_pair: String,
    pub domain_name: String,
    pub skip_init: bool,
    pub dry_run: bool,
}

impl ProvisionConfig {
    /// Dry runs always plan, whatever subcommand was asked for.
    pub fn effective_subcommand(&self) -> &str {
        if self.dry_run {
            "plan"
        } else {
            &self.subcommand
        }
    }
}

/// Turn a comma-separated zone list into the HCL list literal the
/// variable expects: `a,b` becomes `["a", "b"]`.
pub fn format_availability_zones(zones: &str) -> String {
    let quoted: Vec<String> = zones.split(',').map(|z| format!("\"{z}\"")).collect();
    format!("[{}]", quoted.join(", "))
}

/// Argument list for the main `terraform` invocation. `-auto-approve`
/// is only added for real runs; dry runs plan and never auto-approve.
pub fn terraform_main_args(config: &ProvisionConfig) -> Vec<String> {
    let mut args = vec![config.effective_subcommand().to_string(), "-no-color".to_string()];

    if !config.dry_run {
        args.push("-auto-approve".to_string());
    }

    args.extend([
        format!("-var=aws_profile={}", config.aws_profile),
        format!("-var=aws_region={}", config.aws_region),
        format!("-var=build_version={}", config.build_version),
        format!("-var=commit_hash={}", config.commit_hash),
        format!("-var=environment={}", config.environment),
        format!(
            "-var=availability_zone_names={}",
            format_availability_zones(&config.availability_zones)
        ),
        format!("-var=ec2_image_id={}", config.image_id),
        format!("-var=ec2_instance_type={}", config.instance_type),
        format!("-var=ec2_ssh_key_pair={}", config.ssh_key_pair),
        format!("-var=domain_name={}", config.domain_name),
    ]);

    // caller flags go right after the subcommand, before -var arguments
    if !config.terraform_flags.is_empty() && !config.terraform_flags[0].is_empty() {
        args.insert(1, config.terraform_flags.join(" "));
    }

    args
}

/// Run the Terraform sequence in the config directory: optional
/// `init`, the main subcommand, then `output -json`. Each invocation
/// must succeed before the next is attempted; the returned result is
/// the output query, whose stdout carries the provisioned values.
pub fn apply(runner: &dyn CommandRunner, config: &ProvisionConfig) -> Result<FinishedProcess> {
    let dir = &config.terraform_dir;

    if !config.skip_init {
        info!("starting `terraform init` step");
        runner.run(&CommandSpec::new("terraform", ["init", "-no-color"]).cwd(dir))?;
    }

    let subcommand = config.effective_subcommand().to_string();
    info!("starting `terraform {subcommand}` step");
    runner.run(&CommandSpec::new("terraform", terraform_main_args(config)).cwd(dir))?;
    info!("finished `terraform {subcommand}` step");

    let output = runner.run(&CommandSpec::new("terraform", ["output", "-json"]).cwd(dir))?;
    info!("terraform output:\n{}", output.stdout);

    Ok(output)
}
