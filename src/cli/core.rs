//! Dispatch, error reporting and argument helpers shared by every command.

use std::io;

use brokedash_config::ConfigError;
use brokedash_core::{CoreError, ProfileStorage};
use brokedash_domain::short_id;
use uuid::Uuid;

use crate::errors::{BrokeError, CliError};

use super::output;
pub use super::shell_context::{CliMode, ShellContext};

/// Minimum prefix length accepted when a full id is not given.
const MIN_ID_PREFIX: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] BrokeError),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::Core(BrokeError::from(err))
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::Core(BrokeError::from(err))
    }
}

impl From<CliError> for CommandError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Core(inner) => CommandError::Core(inner),
            CliError::Input(message) | CliError::Command(message) => {
                CommandError::InvalidArguments(message)
            }
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl ShellContext {
    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = self.registry.suggest(input) {
            output::hint(format!("Did you mean `{}`?", best));
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(BrokeError::ProfileNotFound(id)) => {
                output::error(format!("No profile with id {}.", id));
                output::hint("Use `leaderboard` to list known ids.");
                Ok(())
            }
            other => {
                output::error(other);
                Ok(())
            }
        }
    }

    /// Accepts a full UUID or a unique prefix of a stored profile id.
    pub(crate) fn resolve_profile_id(&self, raw: &str) -> Result<Uuid, CommandError> {
        let raw = raw.trim();
        if let Ok(id) = Uuid::parse_str(raw) {
            return Ok(id);
        }
        let needle = raw.replace('-', "").to_ascii_lowercase();
        if needle.len() < MIN_ID_PREFIX {
            return Err(CommandError::InvalidArguments(format!(
                "`{}` is too short to identify a profile (use at least {} characters)",
                raw, MIN_ID_PREFIX
            )));
        }
        let matches: Vec<Uuid> = self
            .storage
            .list_profiles()?
            .into_iter()
            .map(|profile| profile.id)
            .filter(|id| id.simple().to_string().starts_with(&needle))
            .collect();
        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(CommandError::InvalidArguments(format!(
                "no profile id starts with `{}`",
                raw
            ))),
            many => Err(CommandError::InvalidArguments(format!(
                "`{}` matches {} profiles: {}",
                raw,
                many.len(),
                many.iter()
                    .map(|id| short_id(*id))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    /// Profile most recently submitted from this shell, if any.
    pub(crate) fn last_profile(&self) -> Option<Uuid> {
        self.config
            .last_profile_id
            .as_deref()
            .and_then(|raw| Uuid::parse_str(raw).ok())
    }

    /// Uses the explicit argument, otherwise the last profile submitted from this shell.
    pub(crate) fn profile_arg(&self, arg: Option<&str>) -> Result<Uuid, CommandError> {
        match arg {
            Some(raw) => self.resolve_profile_id(raw),
            None => self.last_profile().ok_or_else(|| {
                CommandError::InvalidArguments("no profile given and none submitted yet".into())
            }),
        }
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(err);
                return Ok(LoopControl::Continue);
            }
        };

        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }

        let command = tokens[0].to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, &tokens[0], &args)
    }
}

pub(crate) fn parse_positive(raw: &str) -> Result<usize, CommandError> {
    raw.parse::<usize>()
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!("`{}` is not a positive number", raw))
        })
}

pub(crate) fn expect_no_more(args: &[&str], usage: &str) -> CommandResult {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandError::InvalidArguments(format!("usage: {}", usage)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokedash_domain::IncomeBracket;
    use tempfile::TempDir;

    fn context() -> (TempDir, ShellContext) {
        let dir = tempfile::tempdir().expect("tempdir");
        let context =
            ShellContext::with_base_dir(CliMode::Script, dir.path().to_path_buf()).expect("ctx");
        (dir, context)
    }

    #[test]
    fn script_lines_submit_and_rank() {
        let (_dir, mut context) = context();

        context.process_line("submit 100k-150k 1000").unwrap();
        context.process_line("submit <100k 4000").unwrap();

        let entries = context.service.leaderboard(None).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].income_bracket, IncomeBracket::Under100k);
        assert_eq!(entries[1].days_till_broke, 10);
        assert!(context.config.last_profile_id.is_some());
    }

    #[test]
    fn exit_stops_the_loop() {
        let (_dir, mut context) = context();
        assert_eq!(context.process_line("exit").unwrap(), LoopControl::Exit);
        assert_eq!(
            context.process_line("not-a-command").unwrap(),
            LoopControl::Continue
        );
    }

    #[test]
    fn profile_ids_resolve_by_prefix() {
        let (_dir, mut context) = context();
        context.process_line("submit 250k+ 900").unwrap();
        let id = context.storage.list_profiles().unwrap()[0].id;

        let prefix = short_id(id);
        assert_eq!(context.resolve_profile_id(&prefix).unwrap(), id);
        assert_eq!(context.resolve_profile_id(&id.to_string()).unwrap(), id);
        assert!(context.resolve_profile_id("ab").is_err());
    }

    #[test]
    fn invalid_spend_is_reported_not_fatal() {
        let (_dir, mut context) = context();
        let err = context.process_line("submit <100k -5").unwrap_err();
        assert!(matches!(err, CommandError::Core(BrokeError::InvalidInput(_))));
        assert!(context.report_error(err).is_ok());
    }

    #[test]
    fn numbers_must_be_positive() {
        assert_eq!(parse_positive("3").unwrap(), 3);
        assert!(parse_positive("0").is_err());
        assert!(parse_positive("ten").is_err());
    }
}
