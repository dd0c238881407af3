//! AiBackend implementation that shells out to an AI CLI tool
//!
//! The configured command line is split with shell-words; the model flag and
//! the prompt are appended as the final arguments.

use std::process::Command;

use docuhaul_types::{Error, Result};

use crate::{AiBackend, AiConfig};

/// Runs `gemini -p`, `claude -p`, `codex exec` or a custom command.
#[derive(Debug, Clone)]
pub struct CliAiBackend {
    program: String,
    args: Vec<String>,
    model: Option<String>,
}

impl CliAiBackend {
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        let cmd_str = config.command_line();
        let mut parts = shell_words::split(&cmd_str)
            .map_err(|e| Error::Ai(format!("invalid AI command '{}': {}", cmd_str, e)))?;
        if parts.is_empty() {
            return Err(Error::Ai("AI command is empty".to_string()));
        }
        let program = parts.remove(0);
        Ok(Self {
            program,
            args: parts,
            model: config.model.clone(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn build_command(&self, prompt: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref model) = self.model {
            cmd.arg("--model").arg(model);
        }
        cmd.arg(prompt);
        cmd
    }
}

impl AiBackend for CliAiBackend {
    fn send_prompt(&self, prompt: &str) -> Result<String> {
        tracing::debug!(program = %self.program, prompt_len = prompt.len(), "Sending prompt");

        let output = self
            .build_command(prompt)
            .output()
            .map_err(|e| Error::Ai(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Ai(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            return Err(Error::Ai(format!("{} returned an empty response", self.program)));
        }

        Ok(stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_splits_command() {
        let config = AiConfig::default()
            .with_command(Some("my-llm --format 'plain text'".to_string()))
            .with_model(Some("fast".to_string()));
        let backend = CliAiBackend::from_config(&config).unwrap();
        assert_eq!(backend.program(), "my-llm");
        assert_eq!(backend.args, vec!["--format", "plain text"]);

        let cmd = backend.build_command("hello");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(args, vec!["--format", "plain text", "--model", "fast", "hello"]);
    }

    #[test]
    fn test_from_config_rejects_unbalanced_quotes() {
        let config = AiConfig::default().with_command(Some("my-llm 'oops".to_string()));
        assert!(matches!(CliAiBackend::from_config(&config), Err(Error::Ai(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_send_prompt_echo() {
        let config = AiConfig::default().with_command(Some("echo".to_string()));
        let backend = CliAiBackend::from_config(&config).unwrap();
        let reply = backend.send_prompt("{\"body\": \"ok\"}").unwrap();
        assert_eq!(reply, "{\"body\": \"ok\"}");
    }

    #[cfg(unix)]
    #[test]
    fn test_send_prompt_failure_status() {
        let config = AiConfig::default().with_command(Some("false".to_string()));
        let backend = CliAiBackend::from_config(&config).unwrap();
        assert!(matches!(backend.send_prompt("x"), Err(Error::Ai(_))));
    }
}
