//! Ordered query-string construction.
//!
//! List endpoints are sensitive to parameter presence: a parameter whose value is absent, an
//! empty string or zero is left out entirely rather than sent empty. Order is preserved exactly as
//! pushed, which keeps URLs (and the cache keys derived from them) deterministic.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryPairs(Vec<(&'static str, String)>);

impl QueryPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter unconditionally.
    pub fn push(&mut self, name: &'static str, value: impl fmt::Display) -> &mut Self {
        self.0.push((name, value.to_string()));
        self
    }

    /// Append a string parameter unless it is absent or empty.
    pub fn push_str(&mut self, name: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.0.push((name, value.to_string()));
        }
        self
    }

    /// Append a numeric parameter unless it is absent or zero.
    pub fn push_number(&mut self, name: &'static str, value: Option<u32>) -> &mut Self {
        if let Some(value) = value.filter(|v| *v != 0) {
            self.0.push((name, value.to_string()));
        }
        self
    }

    /// Append any displayable parameter unless it is absent.
    pub fn push_opt<T: fmt::Display>(&mut self, name: &'static str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.push(name, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|(k, _)| *k).collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
    }
}

/// Renders `a=1&b=2` (unencoded; for keys and logs, not for the wire).
impl fmt::Display for QueryPairs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}
