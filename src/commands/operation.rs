use crate::migrate::Directive;
use crate::migration::Direction;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Malformed operation or missing required input
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct UsageError(pub String);

/// Everything the tool can be asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Up,
    Down,
    Sync,
    Step(i64),
    Migrate(u64),
    Force(u64),
    New(Option<String>),
    Check,
    Version,
}

impl Operation {
    /// Whether the operation needs a database connection
    pub fn uses_store(&self) -> bool {
        !matches!(self, Operation::New(_) | Operation::Check)
    }

    /// The plan directive for operations that run scripts; `latest` is the catalog maximum
    pub fn directive(&self, latest: u64) -> Option<Directive> {
        match self {
            Operation::Up => Some(Directive::All(Direction::Up)),
            Operation::Down => Some(Directive::All(Direction::Down)),
            Operation::Sync => Some(Directive::ToVersion(latest)),
            Operation::Step(n) => Some(Directive::StepN(*n)),
            Operation::Migrate(v) => Some(Directive::ToVersion(*v)),
            Operation::Force(_) | Operation::New(_) | Operation::Check | Operation::Version => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Up => write!(f, "up"),
            Operation::Down => write!(f, "down"),
            Operation::Sync => write!(f, "sync"),
            Operation::Step(n) => write!(f, "step {}", n),
            Operation::Migrate(v) => write!(f, "migrate {}", v),
            Operation::Force(v) => write!(f, "force {}", v),
            Operation::New(Some(name)) => write!(f, "new {}", name),
            Operation::New(None) => write!(f, "new"),
            Operation::Check => write!(f, "check"),
            Operation::Version => write!(f, "version"),
        }
    }
}

/// Parses the command forms accepted in `MIGRATION_COMMAND`:
/// `up`, `step -2`, `force 3`, `new add_users`, or a bare version number.
impl FromStr for Operation {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        let operation = match words.as_slice() {
            [] => return Err(UsageError("Empty migration command".to_string())),
            ["up" | "u"] => Operation::Up,
            ["down" | "d"] => Operation::Down,
            ["sync"] => Operation::Sync,
            ["check" | "c"] => Operation::Check,
            ["version"] => Operation::Version,
            ["step" | "steps" | "s", n] => Operation::Step(parse_arg(n, "step count")?),
            ["step" | "steps" | "s"] => {
                return Err(UsageError("Please specify a step count".to_string()));
            }
            ["force" | "f", v] => Operation::Force(parse_arg(v, "version")?),
            ["force" | "f"] => {
                return Err(UsageError(
                    "Please specify a version to force the migration to".to_string(),
                ));
            }
            ["migrate", v] => Operation::Migrate(parse_arg(v, "version")?),
            ["new", name] => Operation::New(Some(name.to_string())),
            ["new"] => Operation::New(None),
            [v] if v.chars().all(|c| c.is_ascii_digit()) => {
                Operation::Migrate(parse_arg(v, "version")?)
            }
            _ => return Err(UsageError(format!("Unknown migration command '{}'", s.trim()))),
        };
        Ok(operation)
    }
}

fn parse_arg<T: FromStr>(value: &str, what: &str) -> Result<T, UsageError>
where
    T::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|e| UsageError(format!("Invalid {} '{}': {}", what, value, e)))
}
