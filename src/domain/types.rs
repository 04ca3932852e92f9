//! Collection identities and their read ordering.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The four record collections exposed by the hosted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Portfolio,
    Gallery,
    Experience,
    Messages,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Portfolio,
        Collection::Gallery,
        Collection::Experience,
        Collection::Messages,
    ];

    /// Table name on the record store.
    pub fn table(self) -> &'static str {
        match self {
            Collection::Portfolio => "portfolio_items",
            Collection::Gallery => "gallery_images",
            Collection::Experience => "experience_entries",
            Collection::Messages => "contact_messages",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Portfolio => "portfolio",
            Collection::Gallery => "gallery",
            Collection::Experience => "experience",
            Collection::Messages => "messages",
        }
    }

    /// Ordering used by every listing of this collection.
    pub fn order(self) -> OrderBy {
        match self {
            Collection::Messages => OrderBy::descending("created_at"),
            _ => OrderBy::ascending("display_order"),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column ordering for a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderBy {
    pub column: &'static str,
    pub ascending: bool,
}

impl OrderBy {
    pub const fn ascending(column: &'static str) -> Self {
        Self {
            column,
            ascending: true,
        }
    }

    pub const fn descending(column: &'static str) -> Self {
        Self {
            column,
            ascending: false,
        }
    }

    /// PostgREST `order` parameter value, e.g. `display_order.asc`.
    pub fn as_query(&self) -> String {
        let direction = if self.ascending { "asc" } else { "desc" };
        format!("{}.{direction}", self.column)
    }
}
