mod fold;
mod report;
mod rewrites;

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, trace};

use crate::ir::Instr;

pub use fold::{eval_binary, eval_unary, fold_binary, fold_unary, Value};
pub use report::*;
pub use rewrites::live_names;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rewrite {
    ConstantFolding,
    ConstantPropagation,
    AlgebraicSimplification,
    CopyPropagation,
    DeadCodeElimination,
}

impl Rewrite {
    /// Application order within one pass.
    pub const ALL: [Rewrite; 5] = [
        Rewrite::ConstantFolding,
        Rewrite::ConstantPropagation,
        Rewrite::AlgebraicSimplification,
        Rewrite::CopyPropagation,
        Rewrite::DeadCodeElimination,
    ];
}

impl fmt::Display for Rewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rewrite::ConstantFolding => "constant folding",
            Rewrite::ConstantPropagation => "constant propagation",
            Rewrite::AlgebraicSimplification => "algebraic simplification",
            Rewrite::CopyPropagation => "copy propagation",
            Rewrite::DeadCodeElimination => "dead-code elimination",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Optimized {
    pub code: Vec<Instr>,
    pub passes: usize,
    pub applied: BTreeSet<Rewrite>,
    /// False when the last pass found nothing to do, i.e. a fixed point was
    /// reached before the pass limit.
    pub changed_last_pass: bool,
}

pub struct Optimizer {
    max_passes: usize,
}

impl Optimizer {
    pub fn new(max_passes: usize) -> Self {
        Self { max_passes }
    }

    pub fn optimize(&self, mut code: Vec<Instr>) -> Optimized {
        let mut applied = BTreeSet::new();
        let mut passes = 0;
        let mut changed = false;

        while passes < self.max_passes {
            passes += 1;
            changed = false;
            let live = live_names(&code);

            for rewrite in Rewrite::ALL {
                let (next, rewritten) = match rewrite {
                    Rewrite::ConstantFolding => rewrites::constant_folding(code),
                    Rewrite::ConstantPropagation => rewrites::constant_propagation(code),
                    Rewrite::AlgebraicSimplification => rewrites::algebraic_simplification(code),
                    Rewrite::CopyPropagation => rewrites::copy_propagation(code),
                    Rewrite::DeadCodeElimination => rewrites::dead_code_elimination(code, &live),
                };
                code = next;
                if rewritten {
                    trace!(pass = passes, %rewrite, "rewrite applied");
                    applied.insert(rewrite);
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        debug!(passes, instructions = code.len(), "optimizer finished");
        Optimized {
            code,
            passes,
            applied,
            changed_last_pass: changed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{IrGenerator, Operand};
    use crate::parser::Parser;

    fn lower(source: &str) -> Vec<Instr> {
        let program = Parser::new(source).unwrap().parse().unwrap();
        IrGenerator::new().generate(&program)
    }

    fn render(code: &[Instr]) -> Vec<String> {
        code.iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn folds_and_propagates_into_user_variable() {
        let result = Optimizer::new(5).optimize(lower("integer x; begin x <- 5 + 3 end"));
        assert_eq!(render(&result.code), ["x = 0  // init", "x = 8"]);
        assert_eq!(
            result.code[1],
            Instr::Assign {
                dest: Operand::Var("x".into()),
                src: Operand::Const("8".into())
            }
        );
        assert!(!result.changed_last_pass);
        assert!(result.applied.contains(&Rewrite::ConstantFolding));
        assert!(result.applied.contains(&Rewrite::DeadCodeElimination));
    }

    #[test]
    fn optimizing_twice_changes_nothing() {
        let source = "integer x, y; real r; begin read(y) x <- 2 * 3 + y * 1 r <- x / 1 \
                      while x < 10 do x <- x + 0 + 1 endwhile write(x, r) end";
        let optimizer = Optimizer::new(5);
        let once = optimizer.optimize(lower(source));
        let twice = optimizer.optimize(once.code.clone());
        assert_eq!(twice.code, once.code);
        assert!(!twice.changed_last_pass);
        assert!(twice.applied.is_empty());
        assert_eq!(twice.passes, 1);
    }

    #[test]
    fn pass_limit_is_respected() {
        let result = Optimizer::new(1).optimize(lower("integer x; begin x <- 5 + 3 end"));
        assert_eq!(result.passes, 1);
        assert!(result.changed_last_pass);
        assert_eq!(render(&result.code), ["x = 0  // init", "t1 = 8", "x = 8"]);
    }

    #[test]
    fn deep_chains_stop_at_the_pass_limit() {
        // each pass folds one negation and propagates it into the next
        let code = lower("integer x; begin x <- -(-(-(-(-(-(-1)))))) end");

        let limited = Optimizer::new(crate::MAX_OPTIMIZER_PASSES).optimize(code.clone());
        assert_eq!(limited.passes, 5);
        assert!(limited.changed_last_pass);
        let listing = render(&limited.code);
        assert!(listing.contains(&"t6 = - -1".to_string()));
        assert_eq!(listing[listing.len() - 2..], ["t7 = - t6", "x = t7"]);

        let settled = Optimizer::new(16).optimize(code);
        assert!(!settled.changed_last_pass);
        assert_eq!(render(&settled.code), ["x = 0  // init", "x = -1"]);
    }

    #[test]
    fn zero_passes_leave_code_untouched() {
        let code = lower("integer x; begin x <- 5 + 3 end");
        let result = Optimizer::new(0).optimize(code.clone());
        assert_eq!(result.code, code);
        assert_eq!(result.passes, 0);
    }

    #[test]
    fn user_variables_survive_even_when_unread() {
        let result = Optimizer::new(5).optimize(lower("integer a, b; begin a <- 1 b <- a end"));
        assert_eq!(
            render(&result.code),
            ["a = 0  // init", "b = 0  // init", "a = 1", "b = 1"]
        );
    }

    #[test]
    fn loop_counter_is_not_treated_as_constant() {
        let result = Optimizer::new(5).optimize(lower(
            "integer i; begin for i from 1 to 3 do write(i) endfor end",
        ));
        let listing = render(&result.code);
        assert!(listing.contains(&"write i".to_string()));
        // the bound temporary is defined before the loop label, so it stays
        assert!(listing.contains(&"t2 = i <= t1".to_string()));
        assert!(listing.contains(&"t3 = i + 1".to_string()));
    }
}
