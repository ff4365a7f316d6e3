//! Print the ring's points.

use anyhow::Result;

use crate::config::Config;

pub fn run(config: &Config) -> Result<()> {
    let ring = config.build_ring()?;
    print!("{}", ring);
    Ok(())
}
