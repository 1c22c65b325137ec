//! Command dispatch.
//!
//! A [`Command`] carries the raw words the user typed after the command name.
//! [`Dispatcher::execute`] resolves the `.` alias, validates arguments, and
//! makes the registry calls; [`Dispatcher::run`] does the same and reports
//! the outcome through the [`Reporter`].

use std::path::PathBuf;

use tracing::{debug, info};

use logctl_config::AppConfig;

use crate::kmsg::{self, KMSG_PATH, KmsgError};
use crate::kv::{EMPTY_OBJECT, KvEncoder, KvError, OverflowPolicy};
use crate::labels::{Facility, Level};
use crate::lister::{ListError, list_contexts};
use crate::matcher::{is_wildcard, resolve_alias};
use crate::mutator::{SetLevelError, describe_list, set_level_for_pattern};
use crate::registry::{ContextHandle, ContextRegistry, RecordBody, RegistryError};
use crate::report::Reporter;

/// Directive that makes the logging library reload its configuration.
pub const RELOAD_DIRECTIVE: &str = "!loglib loadconf";

/// Message ID of the record emitted by `flush`.
pub const FLUSH_MSG_ID: &str = "FLUSH_BUFFER";

const FLUSH_TEXT: &str = "Manually Flushing Buffers";

/// One parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `show [pattern]`
    Show { pattern: Option<String> },
    /// `set <pattern> <level>`
    Set { pattern: String, level: String },
    /// `log <message>` or `log <context> <level> <message>`
    Log { args: Vec<String> },
    /// `logkv <context> <level> <msgID> [key=value ...] [message]`
    LogKv { args: Vec<String> },
    /// `klog [-p <level>] [-f <facility>] <message>`
    KLog {
        level: Option<String>,
        facility: Option<String>,
        message: String,
    },
    /// `def <context> [<level>]`
    Def {
        context: String,
        level: Option<String>,
    },
    Reconf,
    Flush,
    Help,
}

impl Command {
    /// The command word.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Show { .. } => "show",
            Command::Set { .. } => "set",
            Command::Log { .. } => "log",
            Command::LogKv { .. } => "logkv",
            Command::KLog { .. } => "klog",
            Command::Def { .. } => "def",
            Command::Reconf => "reconf",
            Command::Flush => "flush",
            Command::Help => "help",
        }
    }
}

/// Broad class of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing arguments.
    Param,
    /// Nothing matched a name or pattern.
    Lookup,
    /// The registry, a device, or an emission failed.
    Runtime,
    /// A `key=value` token could not be encoded.
    Encoding,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Invalid level '{0}'.")]
    InvalidLevel(String),

    #[error("Invalid facility '{0}'.")]
    InvalidFacility(String),

    #[error("Invalid parameter '{0}'.")]
    InvalidParameter(String),

    #[error("{0} not specified.")]
    Missing(&'static str),

    #[error("Minimum {0} parameters are expected. Please see help for more details.")]
    TooFewArguments(usize),

    #[error("Invalid context '{0}'.")]
    InvalidContext(String),

    #[error("Context '{0}' is already defined.")]
    AlreadyDefined(String),

    #[error("Context '{0}' not found.")]
    NotFound(String),

    #[error("No contexts matched '{0}'.")]
    NoMatch(String),

    #[error("Error getting contexts info: {}", describe_list(.0))]
    List(#[from] ListError),

    #[error("Error {action}: {}", .source.describe())]
    Registry {
        action: &'static str,
        #[source]
        source: RegistryError,
    },

    #[error(transparent)]
    Encoding(#[from] KvError),

    #[error(transparent)]
    Kmsg(#[from] KmsgError),
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::InvalidLevel(_)
            | CommandError::InvalidFacility(_)
            | CommandError::InvalidParameter(_)
            | CommandError::Missing(_)
            | CommandError::TooFewArguments(_)
            | CommandError::InvalidContext(_)
            | CommandError::AlreadyDefined(_) => ErrorKind::Param,
            CommandError::NotFound(_) | CommandError::NoMatch(_) => ErrorKind::Lookup,
            CommandError::List(_) | CommandError::Registry { .. } | CommandError::Kmsg(_) => {
                ErrorKind::Runtime
            }
            CommandError::Encoding(KvError::Malformed { .. }) => ErrorKind::Encoding,
            CommandError::Encoding(_) => ErrorKind::Runtime,
        }
    }
}

impl From<SetLevelError> for CommandError {
    fn from(err: SetLevelError) -> Self {
        match err {
            SetLevelError::NotFound(name) => CommandError::NotFound(name),
            SetLevelError::NoMatch(pattern) => CommandError::NoMatch(pattern),
            SetLevelError::List(list) => CommandError::List(list),
            SetLevelError::Set { source, .. } => CommandError::Registry {
                action: "setting context log level",
                source,
            },
        }
    }
}

/// How a successful command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// Usage was printed; callers exit with a failure status.
    HelpShown,
}

/// Settings the dispatcher needs beyond the registry itself.
#[derive(Debug, Clone)]
pub struct Settings {
    pub kv: KvEncoder,
    pub kmsg_path: PathBuf,
    pub klog_level: Level,
    pub flush_context: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kv: KvEncoder::default(),
            kmsg_path: PathBuf::from(KMSG_PATH),
            klog_level: Level::Notice,
            flush_context: "logctl".to_string(),
        }
    }
}

impl Settings {
    pub fn from_config(config: &AppConfig) -> Result<Self, CommandError> {
        let overflow: OverflowPolicy = config.logkv.overflow.parse()?;
        let klog_level = parse_level(&config.klog.default_level)?;
        Ok(Self {
            kv: KvEncoder::new(config.logkv.capacity, overflow),
            kmsg_path: PathBuf::from(&config.klog.device),
            klog_level,
            flush_context: config.registry.flush_context.clone(),
        })
    }
}

fn parse_level(label: &str) -> Result<Level, CommandError> {
    Level::parse(label).ok_or_else(|| CommandError::InvalidLevel(label.to_string()))
}

/// Like [`parse_level`], but `none` is not a level a record can carry.
fn parse_record_level(label: &str) -> Result<Level, CommandError> {
    match Level::parse(label) {
        Some(Level::None) | None => Err(CommandError::InvalidLevel(label.to_string())),
        Some(level) => Ok(level),
    }
}

/// Executes commands against a registry.
pub struct Dispatcher<'a, R: ContextRegistry + ?Sized> {
    registry: &'a mut R,
    reporter: &'a mut Reporter,
    settings: &'a Settings,
}

impl<'a, R: ContextRegistry + ?Sized> Dispatcher<'a, R> {
    pub fn new(registry: &'a mut R, reporter: &'a mut Reporter, settings: &'a Settings) -> Self {
        Self {
            registry,
            reporter,
            settings,
        }
    }

    /// Execute `command` and report any failure. Returns `true` on success.
    pub fn run(&mut self, command: Command) -> bool {
        let name = command.name();
        match self.execute(command) {
            Ok(Outcome::Done) => true,
            Ok(Outcome::HelpShown) => false,
            Err(err) => {
                debug!(command = name, kind = ?err.kind(), error = %err, "Command failed");
                self.reporter.error(&err);
                if err.kind() == ErrorKind::Param {
                    self.reporter.error("Use 'help' for usage information.");
                }
                false
            }
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Outcome, CommandError> {
        debug!(command = command.name(), "Executing command");
        match command {
            Command::Show { pattern } => self.show(pattern.as_deref()),
            Command::Set { pattern, level } => self.set(&pattern, &level),
            Command::Log { args } => self.log(&args),
            Command::LogKv { args } => self.log_kv(&args),
            Command::KLog {
                level,
                facility,
                message,
            } => self.klog(level.as_deref(), facility.as_deref(), &message),
            Command::Def { context, level } => self.define(&context, level.as_deref()),
            Command::Reconf => self.reconf(),
            Command::Flush => self.flush(),
            Command::Help => {
                self.help();
                return Ok(Outcome::HelpShown);
            }
        }?;
        Ok(Outcome::Done)
    }

    fn resolve(&self, token: &str) -> String {
        resolve_alias(token, self.registry.global_context_name()).to_string()
    }

    fn find_for_emit(&self, raw: &str) -> Result<ContextHandle, CommandError> {
        let name = self.resolve(raw);
        self.registry
            .find_context(&name)
            .map_err(|_| CommandError::InvalidContext(raw.to_string()))
    }

    fn emit(&mut self, handle: ContextHandle, level: Level, body: RecordBody) -> Result<(), CommandError> {
        self.registry
            .emit(handle, level, body)
            .map_err(|source| CommandError::Registry {
                action: "logging",
                source,
            })
    }

    fn show(&mut self, pattern: Option<&str>) -> Result<(), CommandError> {
        let pattern = pattern.map(|p| self.resolve(p));
        let snapshot = list_contexts(&*self.registry, pattern.as_deref())?;

        for entry in &snapshot {
            let level = self
                .registry
                .context_level(entry.handle)
                .map_or("Unknown", Level::label);
            self.reporter
                .info(format_args!("Context '{}' = {level}", entry.name));
        }

        match pattern {
            Some(pattern) if snapshot.is_empty() => {
                if is_wildcard(&pattern) {
                    Err(CommandError::NoMatch(pattern))
                } else {
                    Err(CommandError::NotFound(pattern))
                }
            }
            _ => Ok(()),
        }
    }

    fn set(&mut self, pattern: &str, level: &str) -> Result<(), CommandError> {
        let pattern = self.resolve(pattern);
        let level = parse_level(level)?;
        let changed =
            set_level_for_pattern(&mut *self.registry, &mut *self.reporter, &pattern, level)?;
        info!(pattern = %pattern, level = %level, contexts = changed.len(), "Context level set");
        Ok(())
    }

    fn log(&mut self, args: &[String]) -> Result<(), CommandError> {
        let (handle, level, message) = match args {
            [] => return Err(CommandError::Missing("Message")),
            [message] => {
                let global = self.registry.global_context_name().to_string();
                let handle = self
                    .registry
                    .find_context(&global)
                    .map_err(|_| CommandError::InvalidContext(global))?;
                (handle, Level::Notice, message)
            }
            [context, level, rest @ ..] => {
                let handle = self.find_for_emit(context)?;
                let level = parse_record_level(level)?;
                match rest {
                    [] => return Err(CommandError::Missing("Message")),
                    [message] => (handle, level, message),
                    [_, extra, ..] => return Err(CommandError::InvalidParameter(extra.clone())),
                }
            }
        };
        self.emit(handle, level, RecordBody::Text(message.clone()))
    }

    fn log_kv(&mut self, args: &[String]) -> Result<(), CommandError> {
        let [context, level, rest @ ..] = args else {
            return Err(CommandError::TooFewArguments(3));
        };
        if rest.is_empty() {
            return Err(CommandError::TooFewArguments(3));
        }
        let handle = self.find_for_emit(context)?;
        let level = parse_record_level(level)?;

        let body = if level == Level::Debug {
            // Debug records carry free text only.
            match rest {
                [message] => RecordBody::Structured {
                    msg_id: None,
                    data: None,
                    text: Some(message.clone()),
                },
                [_, extra, ..] => return Err(CommandError::InvalidParameter(extra.clone())),
                [] => return Err(CommandError::Missing("Message")),
            }
        } else {
            let [msg_id, tail @ ..] = rest else {
                return Err(CommandError::Missing("Message ID"));
            };
            // The last word is the free text; everything before it is a pair.
            let (data, text) = match tail.split_last() {
                None => (EMPTY_OBJECT.to_string(), None),
                Some((message, tokens)) => {
                    let payload = self.settings.kv.encode(tokens)?;
                    if payload.is_truncated() {
                        self.reporter.error(format_args!(
                            "Structured data truncated to {} bytes.",
                            self.settings.kv.capacity()
                        ));
                    }
                    (payload.into_string(), Some(message.clone()))
                }
            };
            RecordBody::Structured {
                msg_id: Some(msg_id.clone()),
                data: Some(data),
                text,
            }
        };
        self.emit(handle, level, body)
    }

    fn klog(
        &mut self,
        level: Option<&str>,
        facility: Option<&str>,
        message: &str,
    ) -> Result<(), CommandError> {
        let level = match level {
            Some(label) => parse_level(label)?,
            None => self.settings.klog_level,
        };
        let facility = facility
            .map(|label| {
                Facility::parse(label).ok_or_else(|| CommandError::InvalidFacility(label.to_string()))
            })
            .transpose()?;
        kmsg::write_kmsg(&self.settings.kmsg_path, level, facility, message)?;
        Ok(())
    }

    fn define(&mut self, context: &str, level: Option<&str>) -> Result<(), CommandError> {
        let name = self.resolve(context);
        if self.registry.find_context(&name).is_ok() {
            return Err(CommandError::AlreadyDefined(name));
        }
        let level = level.map(parse_level).transpose()?;

        let handle = self
            .registry
            .get_or_create_context(&name)
            .map_err(|source| CommandError::Registry {
                action: "defining context",
                source,
            })?;
        if let Some(level) = level {
            self.registry
                .set_context_level(handle, level)
                .map_err(|source| CommandError::Registry {
                    action: "setting context log level",
                    source,
                })?;
        }
        info!(context = %name, "Context defined");
        Ok(())
    }

    fn reconf(&mut self) -> Result<(), CommandError> {
        let global = self.registry.global_context_name().to_string();
        let handle = self
            .registry
            .find_context(&global)
            .map_err(|source| CommandError::Registry {
                action: "getting global context",
                source,
            })?;
        self.emit(
            handle,
            Level::Emergency,
            RecordBody::Text(RELOAD_DIRECTIVE.to_string()),
        )
    }

    fn flush(&mut self) -> Result<(), CommandError> {
        let handle = self
            .registry
            .get_or_create_context(&self.settings.flush_context)
            .map_err(|source| CommandError::Registry {
                action: "getting flush context",
                source,
            })?;
        self.emit(
            handle,
            Level::Info,
            RecordBody::Structured {
                msg_id: Some(FLUSH_MSG_ID.to_string()),
                data: Some(EMPTY_OBJECT.to_string()),
                text: Some(FLUSH_TEXT.to_string()),
            },
        )
    }

    fn help(&mut self) {
        for line in USAGE {
            self.reporter.info(line);
        }
        self.reporter.info("Levels:");
        for level in Level::ALL {
            self.reporter
                .info(format_args!("  {:<10}  # {}", level.label(), level.code()));
        }
    }
}

const USAGE: &[&str] = &[
    "logctl COMMAND [PARAM...]",
    "logctl -s COMMAND [PARAM...] # disable informational output",
    "  help                         # show usage info",
    "  def <context> [<level>]      # define logging context",
    "  flush                        # flush all ring buffers",
    "  log <context> <level> <message>",
    "                               # log a message",
    "  logkv <context> <level> <msgID> <key1>=<value1> <key2>=<value2> ... <message>",
    "                               # log a message with msgID and key-value pairs",
    "                               # for a string value, quote it: <key>=\\\"<value>\\\"",
    "                               # debug messages take free text only",
    "  klog [-p <level>] [-f <facility>] <message>",
    "                               # log a kernel message",
    "  reconf                       # re-load lib options from conf",
    "  set <context> <level>        # set logging context level",
    "  show [<context>]             # show logging context(s)",
    "",
    "Contexts:",
    "  The global context can be specified as '.'",
    "  A trailing '*' matches every context with the given prefix",
    "",
];
