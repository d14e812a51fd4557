//! Composite query keys.

use crate::api::query::QueryPairs;
use std::fmt;

/// What a key addresses within an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyScope {
    /// One page of a list, identified by the exact query pairs sent to the server
    List(QueryPairs),
    /// A single record by id
    Detail(String),
}

/// Identifies one cached read: entity name plus every parameter that affects the result.
///
/// Two list reads whose filters produce equal query pairs share a key (and therefore a cache
/// entry and any in-flight request).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    entity: &'static str,
    scope: KeyScope,
}

impl QueryKey {
    pub fn list(entity: &'static str, pairs: QueryPairs) -> Self {
        Self {
            entity,
            scope: KeyScope::List(pairs),
        }
    }

    pub fn detail(entity: &'static str, id: impl Into<String>) -> Self {
        Self {
            entity,
            scope: KeyScope::Detail(id.into()),
        }
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn scope(&self) -> &KeyScope {
        &self.scope
    }

    pub fn is_list(&self) -> bool {
        matches!(self.scope, KeyScope::List(_))
    }

    pub fn is_detail_of(&self, id: &str) -> bool {
        matches!(&self.scope, KeyScope::Detail(d) if d == id)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            KeyScope::List(pairs) if pairs.is_empty() => write!(f, "{}/list", self.entity),
            KeyScope::List(pairs) => write!(f, "{}/list?{}", self.entity, pairs),
            KeyScope::Detail(id) => write!(f, "{}/detail/{}", self.entity, id),
        }
    }
}
