//! `spellc emit <file>` — compiles a script and prints the emitted
//! target-language source.

use std::path::PathBuf;

use anyhow::{bail, Result};

use super::common::{build_compiler, format_compile_error, read_source};

#[derive(Debug, Clone)]
pub struct EmitArgs {
    pub file: PathBuf,
    pub context: Option<PathBuf>,
    /// Also print the inferred return type as a leading comment, for
    /// interactive use (`--with-return-type`).
    pub with_return_type: bool,
}

pub fn run_emit(args: EmitArgs) -> Result<()> {
    let source = read_source(&args.file)?;
    let compiler = build_compiler(args.context.as_deref())?;
    match compiler.compile(&source) {
        Ok(output) => {
            if args.with_return_type {
                println!("// returnType: {}", output.return_type);
            }
            println!("{}", output.code);
            Ok(())
        }
        Err(err) => bail!(format_compile_error(&args.file, &err)),
    }
}
