/// Upper bound on optimizer passes; the optimizer stops earlier at a fixed
/// point.
pub const MAX_OPTIMIZER_PASSES: usize = 5;

/// What a compilation should produce besides the target text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Keep the unoptimized IR listing.
    pub show_intermediate: bool,
    /// Run the optimizer and build a reduction report.
    pub optimize: bool,
    /// Log every phase at `debug` level instead of `trace`.
    pub verbose_trace: bool,
}

impl CompileOptions {
    pub fn needs_ir(&self) -> bool {
        self.show_intermediate || self.optimize
    }
}
