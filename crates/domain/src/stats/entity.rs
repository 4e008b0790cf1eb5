use serde::Serialize;

/// Aggregate ledger counts served by the stats endpoint.
///
/// Replaced wholesale by the background refresh task — readers never see a
/// half-updated pair. `Copy` keeps the read path a plain load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Total rows in the domain table.
    pub domains: i64,
    /// Distinct eTLDs observed.
    pub etlds: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_zeroed() {
        let snapshot = StatsSnapshot::default();
        assert_eq!(snapshot.domains, 0);
        assert_eq!(snapshot.etlds, 0);
    }
}
