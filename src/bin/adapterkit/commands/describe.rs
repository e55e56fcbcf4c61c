//! `adapterkit describe` command

use anyhow::Result;

use crate::cli::DescribeArgs;

pub fn execute(args: DescribeArgs) -> Result<()> {
    let config = super::load_settings()?;
    let mode = super::configured_mode(&config)?;
    let registry = super::catalog(&config, mode)?;

    let description = registry.describe(&args.backend)?;
    tracing::debug!(
        "Describing {} ({} connection field(s))",
        description.backend,
        description.connection.fields.len()
    );

    if args.fingerprint {
        println!("{}", description.fingerprint());
    } else {
        println!("{}", description.to_json_string());
    }

    Ok(())
}
