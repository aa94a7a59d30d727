//! Provision run report
//!
//! Every resource the workflow touches is recorded as created or reused, so
//! a re-run against an already-provisioned deployment shows up as an
//! all-reused report.

/// How a resource was ensured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensured {
    /// Resource was created by this run
    Created,
    /// Resource already existed and was left as-is
    Reused,
}

impl std::fmt::Display for Ensured {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ensured::Created => write!(f, "created"),
            Ensured::Reused => write!(f, "reused"),
        }
    }
}

/// One ensured resource
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub kind: &'static str,
    pub name: String,
    pub ensured: Ensured,
}

/// Everything a provision run ensured, in order
#[derive(Debug, Clone, Default)]
pub struct ProvisionReport {
    entries: Vec<ReportEntry>,
}

impl ProvisionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: &'static str, name: impl Into<String>, ensured: Ensured) {
        let entry = ReportEntry {
            kind,
            name: name.into(),
            ensured,
        };
        tracing::info!(kind = entry.kind, name = %entry.name, "{}", entry.ensured);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn created(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.ensured == Ensured::Created)
            .count()
    }

    pub fn reused(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.ensured == Ensured::Reused)
            .count()
    }
}

impl std::fmt::Display for ProvisionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} created, {} reused", self.created(), self.reused())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts() {
        let mut report = ProvisionReport::new();
        report.add("network", "private", Ensured::Created);
        report.add("subnet", "private_subnet", Ensured::Created);
        report.add("keypair", "key", Ensured::Reused);

        assert_eq!(report.created(), 2);
        assert_eq!(report.reused(), 1);
        assert_eq!(report.to_string(), "2 created, 1 reused");
    }
}
