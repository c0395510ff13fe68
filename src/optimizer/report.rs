use std::fmt;

use super::{Optimized, Rewrite};

/// Before/after summary of one optimizer run.
#[derive(Clone, Debug, PartialEq)]
pub struct ReductionReport {
    pub before: usize,
    pub after: usize,
    pub passes: usize,
    pub applied: Vec<Rewrite>,
}

impl ReductionReport {
    pub fn new(before: usize, optimized: &Optimized) -> Self {
        Self {
            before,
            after: optimized.code.len(),
            passes: optimized.passes,
            applied: optimized.applied.iter().copied().collect(),
        }
    }

    pub fn removed(&self) -> usize {
        self.before.saturating_sub(self.after)
    }

    pub fn percentage(&self) -> f64 {
        if self.before == 0 {
            0.0
        } else {
            self.removed() as f64 * 100.0 / self.before as f64
        }
    }
}

impl fmt::Display for ReductionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== optimization report ==")?;
        writeln!(f, "instructions before: {}", self.before)?;
        writeln!(f, "instructions after:  {}", self.after)?;
        writeln!(
            f,
            "reduction:           {} ({:.1}%)",
            self.removed(),
            self.percentage()
        )?;
        writeln!(f, "passes:              {}", self.passes)?;
        if self.applied.is_empty() {
            writeln!(f, "rewrites applied:    none")
        } else {
            let names: Vec<_> = self.applied.iter().map(|r| r.to_string()).collect();
            writeln!(f, "rewrites applied:    {}", names.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn optimized(after: usize, applied: &[Rewrite]) -> Optimized {
        Optimized {
            code: vec![crate::ir::Instr::Goto(crate::ir::Label(1)); after],
            passes: 2,
            applied: applied.iter().copied().collect::<BTreeSet<_>>(),
            changed_last_pass: false,
        }
    }

    #[test]
    fn percentage_of_removed_instructions() {
        let report = ReductionReport::new(3, &optimized(2, &[Rewrite::DeadCodeElimination]));
        assert_eq!(report.removed(), 1);
        assert!((report.percentage() - 33.333).abs() < 0.01);
        assert_eq!(
            report.to_string(),
            "== optimization report ==\n\
             instructions before: 3\n\
             instructions after:  2\n\
             reduction:           1 (33.3%)\n\
             passes:              2\n\
             rewrites applied:    dead-code elimination\n"
        );
    }

    #[test]
    fn empty_program_reports_zero_percent() {
        let report = ReductionReport::new(0, &optimized(0, &[]));
        assert_eq!(report.percentage(), 0.0);
        assert!(report.to_string().contains("reduction:           0 (0.0%)"));
        assert!(report.to_string().ends_with("rewrites applied:    none\n"));
    }

    #[test]
    fn rewrites_are_listed_in_pass_order() {
        let report = ReductionReport::new(
            4,
            &optimized(
                2,
                &[Rewrite::DeadCodeElimination, Rewrite::ConstantFolding],
            ),
        );
        assert!(report
            .to_string()
            .contains("rewrites applied:    constant folding, dead-code elimination"));
    }
}
