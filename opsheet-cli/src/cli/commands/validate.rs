//! `opsheet validate`

use anyhow::Result;

use crate::cli::output::{print_json, print_validation};
use crate::cli::{ValidateArgs, read_input};
use crate::import::validate_text;

/// Returns whether every row is valid
pub fn handle(args: ValidateArgs) -> Result<bool> {
    let text = read_input(args.file.as_deref())?;
    let result = validate_text(&text);

    if args.json {
        print_json(&result)?;
    } else {
        print_validation(&result);
    }

    Ok(result.all_valid())
}
