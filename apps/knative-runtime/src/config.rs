use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::{Context, Result};
use mcf_knative::DEFAULT_BODY_LIMIT;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_FUNCTION: &str = "echo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub addr: SocketAddr,
    pub max_body_bytes: usize,
    pub function_name: String,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// `BIND` takes a full socket address; otherwise `PORT` is bound on all
    /// interfaces.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = match lookup("BIND") {
            Some(bind) => bind
                .trim()
                .parse()
                .with_context(|| format!("invalid BIND address {bind:?}"))?,
            None => {
                let port = match lookup("PORT") {
                    Some(port) => port
                        .trim()
                        .parse()
                        .with_context(|| format!("invalid PORT {port:?}"))?,
                    None => DEFAULT_PORT,
                };
                SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)
            }
        };
        let max_body_bytes = match lookup("MAX_BODY_BYTES") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("invalid MAX_BODY_BYTES {raw:?}"))?,
            None => DEFAULT_BODY_LIMIT,
        };
        let function_name = lookup("FUNCTION_NAME")
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_FUNCTION.into());

        Ok(Self {
            addr,
            max_body_bytes,
            function_name,
        })
    }
}
