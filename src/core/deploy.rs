//! Deploy orchestration: image build followed by provisioning, with
//! the AMI id threaded from one step into the next.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::command::{CommandRunner, FinishedProcess};
use crate::config::EnvironmentConfig;
use crate::error::Result;
use crate::git;
use crate::image::{self, ImageBuildConfig};
use crate::provision::{self, ProvisionConfig};

#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub environment: String,
    pub aws_profile: String,

    pub ansible_playbook: PathBuf,
    pub packer_dir: PathBuf,
    pub terraform_dir: PathBuf,

    pub packer_flags: Vec<String>,
    pub terraform_flags: Vec<String>,

    pub availability_zones: String,
    pub image_id: String,
    pub instance_type: String,
    pub ssh_key_pair: String,
    pub domain_name: String,

    pub skip_init: bool,
    pub skip_image_build: bool,
    pub skip_provision: bool,
    pub dry_run: bool,

    /// Where `config/{environment}.json` lives and where the commit
    /// hash is resolved; normally the invocation directory.
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DeployOutput {
    pub environment: String,
    pub commit_hash: String,
    pub image_id: String,
    pub image_built: bool,
    pub provisioned: bool,
    /// Stdout of `terraform output -json`, empty when provisioning
    /// was skipped.
    pub outputs: String,
}

/// Run the full pipeline for one environment. Steps execute strictly
/// in sequence and the first failure propagates; an explicit image id
/// skips the build entirely.
pub fn run(runner: &dyn CommandRunner, mut config: DeployConfig) -> Result<DeployOutput> {
    let commit_hash = git::commit_hash(runner, &config.base_dir);
    let env_config = EnvironmentConfig::load(&config.base_dir, &config.environment)?;

    if !config.image_id.is_empty() {
        if !config.skip_image_build {
            warn!("'--ec2-image-id' flag passed, but not '--no-image'; '--no-image' implied");
        }
        config.skip_image_build = true;
    }

    let mut image_id = config.image_id.clone();
    let mut image_built = false;

    if !config.skip_image_build {
        let image_config = ImageBuildConfig {
            environment: config.environment.clone(),
            aws_profile: config.aws_profile.clone(),
            aws_region: env_config.aws_region.clone(),
            build_version: env_config.build_version.clone(),
            commit_hash: commit_hash.clone(),
            ansible_playbook: config.ansible_playbook.clone(),
            packer_dir: config.packer_dir.clone(),
            packer_flags: config.packer_flags.clone(),
        };

        info!("starting Packer build step");
        let built = image::build(runner, &image_config)?;

        image_id = image::parse_image_id(&built.stdout);
        image_built = true;
        info!("finished Packer build step, using AMI '{image_id}'");
    }

    let mut outputs = String::new();
    let mut provisioned = false;

    if !config.skip_provision {
        let provision_config = ProvisionConfig {
            environment: config.environment.clone(),
            subcommand: "apply".to_string(),
            aws_profile: config.aws_profile.clone(),
            aws_region: env_config.aws_region,
            build_version: env_config.build_version,
            commit_hash: commit_hash.clone(),
            terraform_dir: config.terraform_dir.clone(),
            terraform_flags: config.terraform_flags.clone(),
            availability_zones: config.availability_zones.clone(),
            image_id: image_id.clone(),
            instance_type: config.instance_type.clone(),
            ssh_key_pair: config.ssh_key_pair.clone(),
            domain_name: config.domain_name.clone(),
            skip_init: config.skip_init,
            dry_run: config.dry_run,
        };

        let result: FinishedProcess = provision::apply(runner, &provision_config)?;
        outputs = result.stdout;
        provisioned = true;
        info!("finished Terraform build step");
    }

    Ok(DeployOutput {
        environment: config.environment,
        commit_hash,
        image_id,
        image_built,
        provisioned,
        outputs,
    })
}
