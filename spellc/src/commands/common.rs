//! Shared helpers for the `check`/`emit` subcommands.

use std::path::Path;

use anyhow::{Context, Result};

use spellc::config::ContextFile;
use spellc::Compiler;

/// Reads the source file, builds a [`Compiler`] seeded from an optional
/// `--context` file, and returns both.
pub fn build_compiler(context_path: Option<&Path>) -> Result<Compiler> {
    let mut compiler = Compiler::default();
    if let Some(path) = context_path {
        let file = ContextFile::load(path)
            .with_context(|| format!("loading context file {}", path.display()))?;
        for (name, ty) in file.resolve(compiler.registry()) {
            compiler.add_context(&name, ty);
        }
    }
    Ok(compiler)
}

pub fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Renders the compile error as a single free-form string, embedding
/// "at line N" when the parser produced it.
pub fn format_compile_error(path: &Path, err: &spellc::CompileError) -> String {
    format!("{}: {}", path.display(), err)
}
