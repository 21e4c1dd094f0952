use std::io::{self, BufRead, Write};

pub const FLUSH_PROMPT: &str =
    "All managed resources will be deleted from the gateway, are you sure? Write yes or no:";

/// Ask `prompt` on `out` and read one line from `input`.
/// Only an exact `yes` counts; end of input is a no.
pub fn confirm<R: BufRead, W: Write>(prompt: &str, mut input: R, mut out: W) -> io::Result<bool> {
    writeln!(out, "{prompt}")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim_end_matches(['\r', '\n']) == "yes")
}
