use std::fmt;

use super::Instr;

/// Numbered, titled rendering of an instruction sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct IrListing {
    pub title: String,
    pub code: Vec<Instr>,
}

impl IrListing {
    pub fn new(title: impl Into<String>, code: Vec<Instr>) -> Self {
        Self {
            title: title.into(),
            code,
        }
    }
}

impl fmt::Display for IrListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ({} instructions) ==", self.title, self.code.len())?;
        let width = self.code.len().to_string().len();
        for (i, instr) in self.code.iter().enumerate() {
            // labels hang out to the left like in an assembly listing
            match instr {
                Instr::Label(_) => writeln!(f, "{:>width$}  {}", i + 1, instr)?,
                _ => writeln!(f, "{:>width$}      {}", i + 1, instr)?,
            }
        }
        Ok(())
    }
}
