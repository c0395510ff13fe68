use tracing::{debug, info_span, trace};

use crate::analyzer::SemanticVisitor;
use crate::codegen::Codegen;
use crate::config::{CompileOptions, MAX_OPTIMIZER_PASSES};
use crate::error::{Diagnostic, Result};
use crate::ir::{IrGenerator, IrListing};
use crate::lexer::{Lexer, Token};
use crate::optimizer::{Optimized, Optimizer, ReductionReport};
use crate::parser::Parser;

/// Everything a successful compilation produced.
#[derive(Clone, Debug)]
pub struct Compilation {
    /// The Python program.
    pub target: String,
    pub diagnostics: Vec<Diagnostic>,
    pub intermediate: Option<IrListing>,
    pub optimized: Option<Optimized>,
    pub report: Option<ReductionReport>,
}

impl Compilation {
    pub fn optimized_listing(&self) -> Option<IrListing> {
        self.optimized
            .as_ref()
            .map(|o| IrListing::new("optimized intermediate code", o.code.clone()))
    }
}

macro_rules! phase {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            debug!($($arg)+);
        } else {
            trace!($($arg)+);
        }
    };
}

pub fn tokens(source: &str) -> Result<Vec<Token>> {
    Lexer::tokenize(source)
}

/// Runs the whole pipeline on `source`. The first fatal error aborts the
/// compilation; warnings are returned with the result.
pub fn compile(source: &str, options: &CompileOptions) -> Result<Compilation> {
    let span = info_span!("compile");
    let _enter = span.enter();
    let verbose = options.verbose_trace;

    let program = Parser::new(source)?.parse()?;
    phase!(
        verbose,
        declarations = program.declarations.len(),
        statements = program.stmts.len(),
        "parsed"
    );

    let analysis = SemanticVisitor::new().visit_program(&program)?;
    phase!(
        verbose,
        symbols = analysis.symbols.global_symbols().len(),
        warnings = analysis.diagnostics.len(),
        "analyzed"
    );

    let mut intermediate = None;
    let mut optimized = None;
    let mut report = None;
    if options.needs_ir() {
        let code = IrGenerator::new().generate(&program);
        phase!(verbose, instructions = code.len(), "lowered to intermediate code");

        if options.optimize {
            let before = code.len();
            let result = Optimizer::new(MAX_OPTIMIZER_PASSES).optimize(code.clone());
            phase!(
                verbose,
                passes = result.passes,
                instructions = result.code.len(),
                "optimized"
            );
            report = Some(ReductionReport::new(before, &result));
            optimized = Some(result);
        }
        if options.show_intermediate {
            intermediate = Some(IrListing::new("intermediate code", code));
        }
    }

    let target = Codegen::new(&analysis.symbols).generate(&program);
    phase!(verbose, bytes = target.len(), "emitted target");

    Ok(Compilation {
        target,
        diagnostics: analysis.diagnostics,
        intermediate,
        optimized,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn default_options_only_emit_target() {
        let c = compile("integer x; begin x <- 1 end", &CompileOptions::default()).unwrap();
        assert!(c.target.contains("x = 1"));
        assert!(c.intermediate.is_none());
        assert!(c.optimized.is_none());
        assert!(c.report.is_none());
    }

    #[test]
    fn optimize_produces_report_and_listing() {
        let options = CompileOptions {
            show_intermediate: true,
            optimize: true,
            verbose_trace: true,
        };
        let c = compile("integer x; begin x <- 5 + 3 end", &options).unwrap();
        let report = c.report.as_ref().unwrap();
        assert_eq!((report.before, report.after), (3, 2));
        assert_eq!(c.intermediate.as_ref().unwrap().code.len(), 3);
        let listing = c.optimized_listing().unwrap().to_string();
        assert!(listing.contains("x = 8"));
    }

    #[test]
    fn first_error_wins_and_no_target_is_produced() {
        let err = compile("integer x; begin x <- \"a\" y <- 1 end", &CompileOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert!(err.message().starts_with("cannot assign text"));
    }

    #[test]
    fn token_dump_ends_with_eof() {
        let tokens = tokens("begin end").unwrap();
        assert_eq!(tokens.len(), 3);
    }
}
