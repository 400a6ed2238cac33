//! Command templates and the resolved command builder

use distro_errors::{Error, InstallError};

/// A fully resolved command ready to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCommand {
    program: String,
    args: Vec<String>,
}

impl PlatformCommand {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Printable form for logs
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn to_tokio(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command.args(&self.args);
        command
    }

    pub(crate) fn to_std(&self) -> std::process::Command {
        let mut command = std::process::Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

/// An argv template such as `["adb", "install", "-r", "{file}"]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    argv: Vec<String>,
}

impl CommandTemplate {
    #[must_use]
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    /// Substitute `placeholder` with `value` in every argument
    ///
    /// # Errors
    ///
    /// Returns `InstallError::CommandNotConfigured` if the template is empty.
    pub fn render(&self, placeholder: &str, value: &str) -> Result<PlatformCommand, Error> {
        let Some((program, rest)) = self.argv.split_first() else {
            return Err(InstallError::CommandNotConfigured {
                command: placeholder.to_string(),
            }
            .into());
        };
        let mut command = PlatformCommand::new(program);
        command.args(rest.iter().map(|arg| arg.replace(placeholder, value)));
        Ok(command)
    }
}
