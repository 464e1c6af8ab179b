use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

/// A named deployment context with its own default database name and port.
///
/// The set is fixed at compile time; there is no configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Test,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Environment::Dev, Environment::Test, Environment::Prod];

    /// Database name handed to the server via DB_NAME.
    pub fn database_name(self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Test => "test_ui",
            Environment::Prod => "prod",
        }
    }

    /// Port used when no override has been saved or passed.
    pub fn default_port(self) -> u16 {
        match self {
            Environment::Dev => 4002,
            Environment::Test => 4001,
            Environment::Prod => 4011,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Test => "test",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
