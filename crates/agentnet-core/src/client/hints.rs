//! `name:port` hints for locating agents without a shared registry

use crate::error::{ConfigError, Error, Result};

/// Ordered name -> port pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortHints {
    entries: Vec<(String, u16)>,
}

impl PortHints {
    /// Parse `name:port` entries.
    ///
    /// Fails on the first malformed entry. A repeated name keeps its first
    /// position and takes the later port.
    pub fn parse<I, S>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hints = Self::default();
        for spec in specs {
            let (name, port) = parse_one(spec.as_ref())?;
            match hints.entries.iter_mut().find(|(n, _)| *n == name) {
                Some(entry) => entry.1 = port,
                None => hints.entries.push((name, port)),
            }
        }
        Ok(hints)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u16)> {
        self.entries.iter().map(|(name, port)| (name.as_str(), *port))
    }

    pub fn get(&self, name: &str) -> Option<u16> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, port)| *port)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_one(spec: &str) -> Result<(String, u16)> {
    let reject = |reason: &str| {
        Error::Config(ConfigError::InvalidPortSpec {
            spec: spec.to_string(),
            reason: reason.to_string(),
        })
    };

    let (name, port) = spec
        .split_once(':')
        .ok_or_else(|| reject("expected name:port"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(reject("agent name is empty"));
    }

    let port: u16 = port
        .trim()
        .parse()
        .map_err(|_| reject("port must be a number between 1 and 65535"))?;
    if port == 0 {
        return Err(reject("port must be a number between 1 and 65535"));
    }

    Ok((name.to_string(), port))
}
