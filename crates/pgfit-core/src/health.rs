use serde::Serialize;
use std::collections::HashMap;

/// Snapshot of one index as read from the statistics catalog
///
/// Built by the db layer from pg_index joined to pg_stat_user_indexes.
/// Carries everything the redundancy heuristic looks at, so the analysis
/// itself stays testable without a database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexDescriptor {
    pub schema: String,
    pub table: String,
    pub index: String,
    /// Full definition as returned by pg_get_indexdef()
    pub definition: String,
    /// Scans recorded since the last statistics reset
    pub scans: i64,
    /// Index tuples read since the last statistics reset
    pub tuples_read: i64,
    /// On-disk size in bytes (pg_relation_size)
    pub size_bytes: i64,
}

impl IndexDescriptor {
    /// On-disk size in MiB
    pub fn size_mib(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }

    /// Lower-cased leading key column of this index definition
    pub fn leading_key(&self) -> String {
        leading_key(&self.definition)
    }
}

/// Health flags the heuristic can attach to an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Flag {
    /// Zero scans recorded since the last statistics reset
    #[serde(rename = "unused")]
    Unused,
    /// Shares its leading key column with another index on the same table
    #[serde(rename = "duplicate/covered")]
    DuplicateOrCovered,
}

impl Flag {
    /// Short token used in report output
    pub fn token(&self) -> &'static str {
        match self {
            Flag::Unused => "unused",
            Flag::DuplicateOrCovered => "duplicate/covered",
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// An index descriptor together with the flags raised against it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexHealth {
    #[serde(flatten)]
    pub descriptor: IndexDescriptor,
    pub flags: Vec<Flag>,
}

impl IndexHealth {
    pub fn is_flagged(&self) -> bool {
        !self.flags.is_empty()
    }

    pub fn has(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }
}

/// Extract the lower-cased leading key column from an index definition
///
/// Takes the text between the first '(' and the first ')', cuts it at the
/// first comma, then trims, collapses internal whitespace and lower-cases
/// it. Returns an empty string when the definition has no parenthesized
/// column list.
///
/// This is a textual heuristic, not a parse of the definition:
/// - sort order and operator classes stay glued to the column name, so
///   "email varchar_pattern_ops" groups apart from plain "email"
/// - INCLUDE columns and partial-index predicates are ignored, so a
///   partial index groups with the full index on the same key
/// - a functional key such as lower(email) clips at the inner ')',
///   which still groups identical definitions together
pub fn leading_key(definition: &str) -> String {
    let Some(open) = definition.find('(') else {
        return String::new();
    };
    let inner = &definition[open + 1..];
    let inner = match inner.find(')') {
        Some(close) => &inner[..close],
        None => inner,
    };
    let first = inner.split(',').next().unwrap_or("");

    first
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Run the redundancy heuristic over a catalog snapshot
///
/// Two checks, both additive:
/// - `unused`: the index recorded zero scans
/// - `duplicate/covered`: two or more indexes on the same table share a
///   leading key column, so the narrower ones are likely covered by the
///   widest
///
/// Input order is preserved and no descriptor is dropped; unflagged
/// indexes come back with an empty flag list.
pub fn annotate(descriptors: Vec<IndexDescriptor>) -> Vec<IndexHealth> {
    let mut group_sizes: HashMap<(String, String, String), u32> = HashMap::new();
    for descriptor in &descriptors {
        let key = (
            descriptor.schema.clone(),
            descriptor.table.clone(),
            descriptor.leading_key(),
        );
        *group_sizes.entry(key).or_insert(0) += 1;
    }

    descriptors
        .into_iter()
        .map(|descriptor| {
            let mut flags = Vec::new();

            if descriptor.scans == 0 {
                flags.push(Flag::Unused);
            }

            let key = (
                descriptor.schema.clone(),
                descriptor.table.clone(),
                descriptor.leading_key(),
            );
            if group_sizes.get(&key).copied().unwrap_or(0) >= 2 {
                flags.push(Flag::DuplicateOrCovered);
            }

            IndexHealth { descriptor, flags }
        })
        .collect()
}
