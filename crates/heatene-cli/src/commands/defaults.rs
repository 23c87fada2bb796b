//! Defaults command: show the parameters every calculation would use.

use std::io::{self, Write};

use anyhow::Result;

use heatene_lib::EffectiveParameters;

use crate::output::write_json;

pub fn handle_defaults(params: &EffectiveParameters) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_json(params, &mut out)?;
    out.flush()?;
    Ok(())
}
