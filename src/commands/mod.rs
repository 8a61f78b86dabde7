pub mod deploy;
pub mod image;
pub mod provision;

/// Split a free-form `--packer-flags`/`--terraform-flags` string into
/// its space-delimited pieces. An empty string yields no flags.
pub(crate) fn split_flags(flags: &str) -> Vec<String> {
    if flags.trim().is_empty() {
        return Vec::new();
    }

    flags.split_whitespace().map(str::to_string).collect()
}
