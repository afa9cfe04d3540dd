use std::sync::atomic::{AtomicU64, Ordering};

/// The kind of a SQL statement, classified by its leading keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl StatementKind {
    #[cfg(test)]
    const ALL: [StatementKind; 5] = [Self::Select, Self::Insert, Self::Update, Self::Delete, Self::Other];

    /// Classify a statement from its first keyword.
    pub fn classify(sql: &str) -> Self {
        let keyword = sql
            .trim_start_matches(|c: char| c.is_whitespace() || c == '(')
            .split(|c: char| !c.is_ascii_alphabetic())
            .next()
            .unwrap_or_default();

        match keyword.to_ascii_uppercase().as_str() {
            "SELECT" | "WITH" => Self::Select,
            "INSERT" | "REPLACE" => Self::Insert,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            _ => Self::Other,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Tallies the statements issued through a [`Db`](super::Db), by kind.
///
/// Tests attach one to a [`Db`](super::Db) to assert on how many queries an
/// operation runs.
#[derive(Debug, Default)]
pub struct StatementCounter {
    counts: [AtomicU64; 5],
}

/// A point-in-time copy of a [`StatementCounter`].
#[cfg(test)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatementCounts {
    pub select: u64,
    pub insert: u64,
    pub update: u64,
    pub delete: u64,
    pub other: u64,
}

impl StatementCounter {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `sql` was issued.
    pub fn record(&self, sql: &str) {
        let kind = StatementKind::classify(sql);
        self.counts[kind.index()].fetch_add(1, Ordering::Relaxed);
        tracing::trace!(?kind, sql, "statement");
    }

    #[cfg(test)]
    pub fn count(&self, kind: StatementKind) -> u64 {
        self.counts[kind.index()].load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub fn total(&self) -> u64 {
        StatementKind::ALL.iter().map(|k| self.count(*k)).sum()
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> StatementCounts {
        StatementCounts {
            select: self.count(StatementKind::Select),
            insert: self.count(StatementKind::Insert),
            update: self.count(StatementKind::Update),
            delete: self.count(StatementKind::Delete),
            other: self.count(StatementKind::Other),
        }
    }

    /// Zero every counter.
    #[cfg(test)]
    pub fn reset(&self) {
        for count in &self.counts {
            count.store(0, Ordering::Relaxed);
        }
    }
}
