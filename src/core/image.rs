//! Packer build step: produces an AMI from the environment's template.

use std::path::{Path, PathBuf};

use crate::command::{CommandRunner, CommandSpec, FinishedProcess};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct ImageBuildConfig {
    pub environment: String,
    pub aws_profile: String,
    pub aws_region: String,
    pub build_version: String,
    pub commit_hash: String,
    pub ansible_playbook: PathBuf,
    pub packer_dir: PathBuf,
    pub packer_flags: Vec<String>,
}

/// Argument list for `packer`, in the order the template contract
/// expects: subcommand, caller flags, var-file, then -var assignments.
pub fn packer_build_args(config: &ImageBuildConfig) -> Vec<String> {
    let mut args = vec![
        "build".to_string(),
        format!("-var-file={}.pkrvars.hcl", config.environment),
        format!(
            "-var=ansible_playbook={}",
            absolute(&config.ansible_playbook).display()
        ),
        format!("-var=aws_profile={}", config.aws_profile),
        format!("-var=aws_region={}", config.aws_region),
        format!("-var=build_version={}", config.build_version),
        format!("-var=commit_hash={}", config.commit_hash),
        ".".to_string(),
    ];

    // caller flags go right after the subcommand, before -var arguments
    if !config.packer_flags.is_empty() && !config.packer_flags[0].is_empty() {
        args.insert(1, config.packer_flags.join(" "));
    }

    args
}

/// Run `packer build` in the template directory and return the raw
/// result. Image-id extraction from stdout is the caller's concern.
pub fn build(runner: &dyn CommandRunner, config: &ImageBuildConfig) -> Result<FinishedProcess> {
    let spec = CommandSpec::new("packer", packer_build_args(config))
        .cwd(&config.packer_dir)
        .env("PACKER_NO_COLOR", "true");

    runner.run(&spec)
}

/// Pull the image id out of a finished build's stdout. Packer ends its
/// output with a `<region>: <image-id>` artifact line.
pub fn parse_image_id(stdout: &str) -> String {
    stdout
        .trim_end()
        .lines()
        .last()
        .unwrap_or("")
        .split(": ")
        .last()
        .unwrap_or("")
        .to_string()
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::{ScriptedResponse, ScriptedRunner};

    fn config() -> ImageBuildConfig {
        ImageBuildConfig {
            environment: "development".to_string(),
            aws_profile: "deploy".to_string(),
            aws_region: "us-west-2".to_string(),
            build_version: "1.2.3".to_string(),
            commit_hash: "abc123".to_string(),
            ansible_playbook: PathBuf::from("/srv/ansible/main.yml"),
            packer_dir: PathBuf::from("/srv/packer"),
            packer_flags: vec![],
        }
    }

    #[test]
    fn args_follow_fixed_var_order() {
        let args = packer_build_args(&config());

        assert_eq!(
            args,
            vec![
                "build",
                "-var-file=development.pkrvars.hcl",
                "-var=ansible_playbook=/srv/ansible/main.yml",
                "-var=aws_profile=deploy",
                "-var=aws_region=us-west-2",
                "-var=build_version=1.2.3",
                "-var=commit_hash=abc123",
                ".",
            ]
        );
    }

    #[test]
    fn caller_flags_are_inserted_after_subcommand() {
        let mut cfg = config();
        cfg.packer_flags = vec!["-debug".to_string(), "-timestamp-ui".to_string()];

        let args = packer_build_args(&cfg);
        assert_eq!(args[0], "build");
        assert_eq!(args[1], "-debug -timestamp-ui");
        assert_eq!(args[2], "-var-file=development.pkrvars.hcl");
    }

    #[test]
    fn empty_flag_string_is_not_inserted() {
        let mut cfg = config();
        cfg.packer_flags = vec![String::new()];

        assert_eq!(packer_build_args(&cfg)[1], "-var-file=development.pkrvars.hcl");
    }

    #[test]
    fn relative_playbook_is_resolved_to_absolute() {
        let mut cfg = config();
        cfg.ansible_playbook = PathBuf::from("ansible/main.yml");

        let args = packer_build_args(&cfg);
        let var = args.iter().find(|a| a.starts_with("-var=ansible_playbook=")).unwrap();
        let path = var.trim_start_matches("-var=ansible_playbook=");
        assert!(Path::new(path).is_absolute(), "expected absolute path, got {path}");
    }

    #[test]
    fn build_runs_packer_in_template_dir_without_color() {
        let runner = ScriptedRunner::new([ScriptedResponse::Ok(String::new())]);
        build(&runner, &config()).unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "packer");
        assert_eq!(calls[0].cwd.as_deref(), Some(Path::new("/srv/packer")));
        assert!(calls[0]
            .env
            .contains(&("PACKER_NO_COLOR".to_string(), "true".to_string())));
    }

    #[test]
    fn image_id_is_last_token_of_last_line() {
        let stdout = "==> builds finished\n--> amazon-ebs.server:\nus-west-2: ami-0123456789abcdef0\n";
        assert_eq!(parse_image_id(stdout), "ami-0123456789abcdef0");
    }

    #[test]
    fn image_id_of_empty_output_is_empty() {
        assert_eq!(parse_image_id(""), "");
    }
}
