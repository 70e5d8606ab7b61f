#![allow(dead_code)]

use std::cell::RefCell;
use std::fmt;

use facet_config::{ConfigPath, Provider, ProviderError};

/// Answers every path with the same value and remembers what it was asked.
pub struct Fixed {
    name: &'static str,
    value: &'static str,
    pub calls: RefCell<Vec<ConfigPath>>,
}

impl Fixed {
    pub fn new(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            value,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Provider for Fixed {
    fn name(&self) -> &str {
        self.name
    }

    fn resolve(&self, path: &ConfigPath) -> Result<String, ProviderError> {
        self.calls.borrow_mut().push(path.clone());
        Ok(self.value.to_string())
    }
}

/// Answers from a table keyed by dotted path, and remembers what it was asked.
pub struct Table {
    entries: Vec<(&'static str, &'static str)>,
    pub calls: RefCell<Vec<ConfigPath>>,
}

impl Table {
    pub fn new(entries: &[(&'static str, &'static str)]) -> Self {
        Self {
            entries: entries.to_vec(),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl Provider for Table {
    fn name(&self) -> &str {
        "table"
    }

    fn resolve(&self, path: &ConfigPath) -> Result<String, ProviderError> {
        self.calls.borrow_mut().push(path.clone());
        let dotted = path.dotted();
        Ok(self
            .entries
            .iter()
            .find(|(key, _)| *key == dotted)
            .map(|(_, value)| value.to_string())
            .unwrap_or_default())
    }
}

/// Fails on every path.
pub struct Failing {
    pub calls: RefCell<usize>,
}

impl Failing {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(0),
        }
    }
}

impl Provider for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn resolve(&self, _path: &ConfigPath) -> Result<String, ProviderError> {
        *self.calls.borrow_mut() += 1;
        Err(Box::new(Boom))
    }
}

/// Answers every path with the same value, except one dotted path it fails on.
pub struct FailsOn {
    value: &'static str,
    broken: &'static str,
    pub calls: RefCell<Vec<ConfigPath>>,
}

impl FailsOn {
    pub fn new(value: &'static str, broken: &'static str) -> Self {
        Self {
            value,
            broken,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl Provider for FailsOn {
    fn name(&self) -> &str {
        "fails-on"
    }

    fn resolve(&self, path: &ConfigPath) -> Result<String, ProviderError> {
        self.calls.borrow_mut().push(path.clone());
        if path.dotted() == self.broken {
            return Err(Box::new(Boom));
        }
        Ok(self.value.to_string())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Boom;

impl fmt::Display for Boom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "backing store is on fire")
    }
}

impl std::error::Error for Boom {}
