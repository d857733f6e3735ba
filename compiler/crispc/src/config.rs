//! Run configuration: environment first, then command-line flags.
//!
//! | setting  | environment      | flag               |
//! |----------|------------------|--------------------|
//! | chain id | `CRISP_CHAIN_ID` | `--chain-id <n>`   |
//! | sender   | `CRISP_SENDER`   | `--sender <addr>`  |
//! | output   |                  | `--json`           |

use crisp_eval::Address;

pub const CHAIN_ID_VAR: &str = "CRISP_CHAIN_ID";
pub const SENDER_VAR: &str = "CRISP_SENDER";

/// How results and diagnostics are printed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub chain_id: u64,
    pub sender: Address,
    pub format: OutputFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            chain_id: 1,
            sender: Address::ZERO,
            format: OutputFormat::Text,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid chain id `{value}` from {origin}")]
    InvalidChainId { origin: String, value: String },
    #[error("invalid sender address `{value}` from {origin}")]
    InvalidSender { origin: String, value: String },
    #[error("`{0}` needs a value")]
    MissingValue(String),
    #[error("unknown option `{0}`")]
    UnknownFlag(String),
}

impl RunConfig {
    /// Defaults overridden by `CRISP_CHAIN_ID` and `CRISP_SENDER`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with an explicit variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = RunConfig::default();
        if let Some(value) = lookup(CHAIN_ID_VAR) {
            config.set_chain_id(CHAIN_ID_VAR, &value)?;
        }
        if let Some(value) = lookup(SENDER_VAR) {
            config.set_sender(SENDER_VAR, &value)?;
        }
        Ok(config)
    }

    /// Apply `--chain-id`, `--sender` and `--json` from `args`, returning
    /// the positional arguments left over.
    pub fn apply_flags(&mut self, args: &[String]) -> Result<Vec<String>, ConfigError> {
        let mut positional = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--json" {
                self.format = OutputFormat::Json;
                continue;
            }
            let Some(flag) = arg.strip_prefix("--") else {
                positional.push(arg.clone());
                continue;
            };
            let (name, inline) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (flag, None),
            };
            if !matches!(name, "chain-id" | "sender") {
                return Err(ConfigError::UnknownFlag(arg.clone()));
            }
            let value = match inline {
                Some(value) => value,
                None => iter
                    .next()
                    .cloned()
                    .ok_or_else(|| ConfigError::MissingValue(format!("--{name}")))?,
            };
            let source = format!("--{name}");
            if name == "chain-id" {
                self.set_chain_id(&source, &value)?;
            } else {
                self.set_sender(&source, &value)?;
            }
        }
        Ok(positional)
    }

    fn set_chain_id(&mut self, source: &str, value: &str) -> Result<(), ConfigError> {
        self.chain_id = value
            .trim()
            .parse()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ConfigError::InvalidChainId {
                origin: source.to_string(),
                value: value.to_string(),
            })?;
        Ok(())
    }

    fn set_sender(&mut self, source: &str, value: &str) -> Result<(), ConfigError> {
        self.sender = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidSender {
                origin: source.to_string(),
                value: value.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_env_then_flags() {
        let mut config = RunConfig::from_vars(|name| match name {
            CHAIN_ID_VAR => Some("5".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.chain_id, 5);

        let rest = config
            .apply_flags(&args(&[
                "script.crisp",
                "--chain-id=100",
                "--sender",
                "0x0000000000000000000000000000000000000007",
                "--json",
            ]))
            .unwrap();
        assert_eq!(rest, vec!["script.crisp"]);
        assert_eq!(config.chain_id, 100);
        assert_eq!(config.sender, Address::from_low_u64(7));
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_invalid_values() {
        let err = RunConfig::from_vars(|_| Some("zero".to_string())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid chain id `zero` from CRISP_CHAIN_ID"
        );

        let mut config = RunConfig::default();
        assert_eq!(
            config.apply_flags(&args(&["--chain-id", "0"])).unwrap_err(),
            ConfigError::InvalidChainId {
                origin: "--chain-id".to_string(),
                value: "0".to_string()
            }
        );
        assert_eq!(
            config.apply_flags(&args(&["--sender"])).unwrap_err(),
            ConfigError::MissingValue("--sender".to_string())
        );
        assert_eq!(
            config.apply_flags(&args(&["--verbose"])).unwrap_err(),
            ConfigError::UnknownFlag("--verbose".to_string())
        );
    }
}
