use envconfig::Envconfig;
use std::{str::FromStr, time::Duration};

/// Tuning knobs read from the environment once at startup.
#[derive(Clone, Debug)]
pub struct EnvVars {
    inner: Inner,
}

impl EnvVars {
    pub fn from_env() -> Result<Self, envconfig::Error> {
        let inner = Inner::init_from_env()?;
        Ok(Self { inner })
    }

    /// Queries that run longer than this are cut off with a timeout error.
    /// Unset means no deadline.
    pub fn graphql_query_timeout(&self) -> Option<Duration> {
        self.inner.graphql_query_timeout_in_secs.map(Duration::from_secs)
    }

    /// Maximum nesting of selection sets in a query.
    pub fn graphql_max_depth(&self) -> u8 {
        self.inner.graphql_max_depth
    }

    pub fn log_gql_timing(&self) -> bool {
        self.inner.log_query_timing.0
    }

    /// Whether a relationship pointing at a missing record is reported as a
    /// field error instead of resolving to null.
    pub fn strict_references(&self) -> bool {
        self.inner.strict_references.0
    }
}

#[derive(Clone, Debug, Envconfig)]
struct Inner {
    #[envconfig(from = "QUIRE_GRAPHQL_QUERY_TIMEOUT")]
    graphql_query_timeout_in_secs: Option<u64>,
    #[envconfig(from = "QUIRE_GRAPHQL_MAX_DEPTH", default = "255")]
    graphql_max_depth: u8,
    #[envconfig(from = "QUIRE_LOG_QUERY_TIMING", default = "false")]
    log_query_timing: EnvVarBoolean,
    #[envconfig(from = "QUIRE_STRICT_REFERENCES", default = "false")]
    strict_references: EnvVarBoolean,
}

#[derive(Copy, Clone, Debug)]
struct EnvVarBoolean(pub bool);

impl FromStr for EnvVarBoolean {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" | "1" => Ok(Self(true)),
            "false" | "0" => Ok(Self(false)),
            _ => Err("Invalid env. var. flag, expected true / false / 1 / 0".to_string()),
        }
    }
}
