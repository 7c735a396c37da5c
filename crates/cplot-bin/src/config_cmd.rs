use core_config::ConfigFile;
use core_error::Result;

use crate::cli::ConfigOp;

pub fn run(op: ConfigOp) -> Result<()> {
    let path = core_config::discover();
    match op {
        ConfigOp::Show => {
            let config = core_config::load(Some(&path))?;
            println!("{config:#?}");
        }
        ConfigOp::Reset => {
            core_config::save(&path, &ConfigFile::default())?;
            println!("reset {}", path.display());
        }
        ConfigOp::Set { assignments } => {
            let mut config = core_config::load(Some(&path))?;
            for pair in assignments.split(',') {
                let pair = pair.trim();
                if pair.is_empty() {
                    continue;
                }
                let (key, value) = pair.split_once('=').ok_or_else(|| {
                    core_error::PlotError::argument(format!("expected k=v, got '{pair}'"))
                })?;
                core_config::apply_kv(&mut config, key.trim(), value.trim())?;
            }
            core_config::save(&path, &config)?;
            println!("updated {}", path.display());
        }
    }
    Ok(())
}
