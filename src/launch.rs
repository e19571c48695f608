//! Launch configuration and runner script generation.
//!
//! A launch config is a YAML document such as
//!
//! ```yaml
//! exec: /cockroach/cockroach
//! join-max: 3
//! srv:
//!   - _grpc._tcp.cockroachdb.default.svc.cluster.local
//! args:
//!   certs-dir: /cockroach/cockroach-certs
//!   cache: 25%
//!   port: 26257
//! ```
//!
//! Every `args` entry becomes a `--key="value"` flag of the generated start
//! command; discovery and locality results are written into `args` before the
//! script is rendered.

use serde::{de::Error as _, Deserialize, Deserializer};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Errors reading a launch config or writing a runner script.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The config file could not be read
    #[error("reading launch config {path}: {source}")]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The config file is not a valid launch config
    #[error("parsing launch config: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// The runner script could not be written
    #[error("writing runner script {path}: {source}")]
    Write {
        /// Path of the script.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Parsed launch configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LaunchConfig {
    /// Path of the node binary.
    pub exec: String,
    /// Flags passed to `<exec> start`, without their leading `--`.
    #[serde(default, deserialize_with = "scalar_args")]
    pub args: BTreeMap<String, String>,
    /// SRV names used for discovery.
    #[serde(default)]
    pub srv: Vec<String>,
    /// Maximum number of nodes in the discovered join list.
    #[serde(default)]
    pub join_max: usize,
}

impl LaunchConfig {
    /// Reads a launch config from a YAML file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, LaunchError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| LaunchError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    /// Parses a launch config from YAML text.
    pub fn from_yaml(raw: &str) -> Result<Self, LaunchError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Overrides the `join` flag.
    pub fn set_join(&mut self, join: impl ToString) {
        self.args.insert("join".to_string(), join.to_string());
    }

    /// Overrides the `locality` flag.
    pub fn set_locality(&mut self, locality: impl ToString) {
        self.args.insert("locality".to_string(), locality.to_string());
    }

    /// Renders the start command, with flags in key order.
    pub fn exec_cmd(&self) -> String {
        let mut cmd = format!("{} start ", self.exec);
        for (key, value) in &self.args {
            cmd.push_str(&format!("--{key}=\"{}\" ", shell_escape(value)));
        }
        cmd
    }

    /// Renders the `/bin/sh` runner script.
    ///
    /// Only shell builtins are used, so the script runs in minimal images.
    pub fn runner_script(&self) -> String {
        format!(
            "#!/bin/sh\nexport COCKROACH_CHANNEL=kubernetes-secure\n{}\n",
            self.exec_cmd()
        )
    }

    /// Writes the runner script to `path` and marks it executable.
    pub fn write_runner_script(&self, path: impl AsRef<Path>) -> Result<(), LaunchError> {
        let path = path.as_ref();
        let write_err = |source: std::io::Error| LaunchError::Write {
            path: path.to_path_buf(),
            source,
        };

        std::fs::write(path, self.runner_script()).map_err(write_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
                .map_err(write_err)?;
        }

        Ok(())
    }
}

/// Escapes the characters that stay special inside double quotes.
fn shell_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn scalar_args<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    use serde_yaml::Value;

    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    raw.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                _ => {
                    return Err(D::Error::custom(format!(
                        "argument {key:?} must be a string, number or boolean"
                    )))
                }
            };
            Ok((key, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
exec: /cockroach/cockroach
join-max: 3
srv:
  - _grpc._tcp.cockroachdb.default.svc.cluster.local
args:
  port: 26257
  insecure: true
  cache: 25%
"#;

    #[test]
    fn parses_sample() {
        let config = LaunchConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.exec, "/cockroach/cockroach");
        assert_eq!(config.join_max, 3);
        assert_eq!(
            config.srv,
            ["_grpc._tcp.cockroachdb.default.svc.cluster.local"]
        );
        assert_eq!(config.args["port"], "26257");
        assert_eq!(config.args["insecure"], "true");
        assert_eq!(config.args["cache"], "25%");
    }

    #[test]
    fn optional_sections_default() {
        let config = LaunchConfig::from_yaml("exec: /bin/node\n").unwrap();
        assert!(config.args.is_empty());
        assert!(config.srv.is_empty());
        assert_eq!(config.join_max, 0);
    }

    #[test]
    fn rejects_nested_args() {
        LaunchConfig::from_yaml("exec: x\nargs:\n  store:\n    - a\n").unwrap_err();
    }

    #[test]
    fn exec_cmd_in_key_order() {
        let mut config = LaunchConfig::from_yaml(SAMPLE).unwrap();
        config.set_join("h1:26257,h2:26257");
        assert_eq!(
            config.exec_cmd(),
            "/cockroach/cockroach start --cache=\"25%\" --insecure=\"true\" \
             --join=\"h1:26257,h2:26257\" --port=\"26257\" "
        );
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut config =
            LaunchConfig::from_yaml("exec: x\nargs:\n  join: old:1\n  locality: a=b\n").unwrap();
        config.set_join("new:2");
        config.set_locality("provider=gcp");
        assert_eq!(config.args["join"], "new:2");
        assert_eq!(config.args["locality"], "provider=gcp");
    }

    #[test]
    fn escapes_shell_specials() {
        let mut config = LaunchConfig::from_yaml("exec: x\n").unwrap();
        config.args.insert("attrs".into(), "a\"$b`".into());
        assert_eq!(config.exec_cmd(), "x start --attrs=\"a\\\"\\$b\\`\" ");
    }

    #[test]
    fn writes_executable_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("start.sh");
        let config = LaunchConfig::from_yaml("exec: /bin/node\n").unwrap();
        config.write_runner_script(&path).unwrap();

        let script = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            script,
            "#!/bin/sh\nexport COCKROACH_CHANNEL=kubernetes-secure\n/bin/node start \n"
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn missing_file() {
        let err = LaunchConfig::read("/nonexistent/launch.yaml").unwrap_err();
        assert!(matches!(err, LaunchError::Read { .. }));
    }
}
