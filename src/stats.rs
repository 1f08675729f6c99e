use std::fmt::{Display, Formatter};

/// Counters collected across calls, cleared only by `reset`.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct FixplexStats {
    /// Number of `make_feasible` calls
    pub num_checks: usize,
    /// Number of pivots performed
    pub num_pivots: usize,
    /// Number of `Infeasible` verdicts
    pub num_infeasible: usize,
    /// Number of calls that switched to Bland's rule
    pub num_blands: usize,
}

impl FixplexStats {
    /// Average number of pivots per feasibility check.
    pub fn pivots_per_check(&self) -> f64 {
        if self.num_checks == 0 {
            return 0.0;
        }
        self.num_pivots as f64 / self.num_checks as f64
    }
}

impl Display for FixplexStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "fixplex checks:     {}", self.num_checks)?;
        writeln!(f, "fixplex pivots:     {}", self.num_pivots)?;
        writeln!(f, "fixplex infeasible: {}", self.num_infeasible)?;
        write!(f, "fixplex blands:     {}", self.num_blands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pivots_per_check() {
        let mut stats = FixplexStats::default();
        assert_eq!(stats.pivots_per_check(), 0.0);
        stats.num_checks = 4;
        stats.num_pivots = 10;
        assert_eq!(stats.pivots_per_check(), 2.5);
    }
}
