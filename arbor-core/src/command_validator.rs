//! Command validation before handing a string to the shell.

use crate::error::{Error, Result};

/// Rejects command strings that cannot be run as given.
///
/// In strict mode commands may not chain, pipe or substitute, which limits
/// `exec` to a single program invocation.
#[derive(Debug, Clone, Default)]
pub struct CommandValidator {
    strict: bool,
}

impl CommandValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a validator that disallows shell features.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidCommand`] for an empty command, one containing
    /// a NUL byte or line break, or (when strict) one using shell operators.
    pub fn validate(&self, command: &str) -> Result<()> {
        if command.trim().is_empty() {
            return Err(Error::InvalidCommand("command cannot be empty".to_string()));
        }

        if command.contains('\0') {
            return Err(Error::InvalidCommand(
                "command contains a NUL byte".to_string(),
            ));
        }

        if command.contains('\n') || command.contains('\r') {
            return Err(Error::InvalidCommand(
                "command contains a line break".to_string(),
            ));
        }

        if self.strict
            && (command.contains(';')
                || command.contains('&')
                || command.contains('|')
                || command.contains('`')
                || command.contains('$'))
        {
            return Err(Error::InvalidCommand(format!(
                "\"{}\" uses shell features, which --no-shell forbids",
                command
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_nul() {
        let validator = CommandValidator::new();
        assert!(validator.validate("   ").is_err());
        assert!(validator.validate("echo a\0b").is_err());
        assert!(validator.validate("npm test\nrm -rf /").is_err());
        assert!(validator.validate("npm test && echo done").is_ok());
    }

    #[test]
    fn test_strict_rejects_shell_operators() {
        let validator = CommandValidator::strict();
        assert!(validator.validate("npm test").is_ok());
        assert!(validator.validate("npm test && echo done").is_err());
        assert!(validator.validate("echo $HOME").is_err());
        assert!(validator.validate("ls | wc -l").is_err());
    }
}
