//! `spellc check <file>` — compiles a script and prints its inferred return
//! type.

use std::path::PathBuf;

use anyhow::{bail, Result};

use super::common::{build_compiler, format_compile_error, read_source};

#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub file: PathBuf,
    pub context: Option<PathBuf>,
}

pub fn run_check(args: CheckArgs) -> Result<()> {
    let source = read_source(&args.file)?;
    let compiler = build_compiler(args.context.as_deref())?;
    match compiler.compile(&source) {
        Ok(output) => {
            println!("{}", output.return_type);
            Ok(())
        }
        Err(err) => bail!(format_compile_error(&args.file, &err)),
    }
}
