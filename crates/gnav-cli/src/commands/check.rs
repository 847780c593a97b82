use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use gnav_trials::check_directory;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Directory holding `<subject>.json` files.
    #[arg(long, default_value = "static/json/config")]
    pub dir: PathBuf,
}

pub fn run(args: &CheckArgs) -> Result<(), Box<dyn Error>> {
    let checks = check_directory(&args.dir)?;
    let mut bad = 0usize;
    for check in &checks {
        for issue in &check.issues {
            warn!(path = %check.path.display(), phase = %issue.phase, "{}", issue.message);
        }
        if !check.is_ok() {
            bad += 1;
        }
    }
    info!(files = checks.len(), bad, "check finished");
    println!("{}", serde_json::to_string_pretty(&checks)?);
    if bad > 0 {
        return Err(format!("{bad} subject files violate trial invariants").into());
    }
    Ok(())
}
