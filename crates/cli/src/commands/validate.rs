//! `validate` subcommand: parse and check a configuration file.

use anyhow::Result;
use config_loader::ConfigLoader;

use crate::cli::ValidateArgs;

pub fn validate(args: ValidateArgs) -> Result<()> {
    let config = ConfigLoader::load_from_path(&args.config)?;
    println!(
        "configuration ok: primary={}, secondaries={}",
        config.primary.channel,
        config.secondaries.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn accepts_valid_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        write!(
            file,
            r#"
[primary]
channel = "accelerometer"

[[secondaries]]
channel = "gyroscope"
"#
        )
        .unwrap();

        let args = ValidateArgs {
            config: file.path().to_path_buf(),
        };
        assert!(validate(args).is_ok());
    }

    #[test]
    fn rejects_invalid_capacity() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        write!(
            file,
            r#"
[primary]
channel = "accelerometer"
capacity = 0
"#
        )
        .unwrap();

        let args = ValidateArgs {
            config: file.path().to_path_buf(),
        };
        assert!(validate(args).is_err());
    }
}
