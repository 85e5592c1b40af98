// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use ratewatch::{cli, commands, config::Settings, logging};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let settings = Settings::from_matches(&matches)?;
    logging::init(settings.log_path.as_deref(), settings.verbose)?;

    match matches.subcommand() {
        Some(("fetch", sub)) => commands::fetch::handle(&settings, sub)?,
        Some(("report", sub)) => commands::report::handle(&settings, sub)?,
        Some(("show", sub)) => commands::show::handle(&settings, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&settings)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
