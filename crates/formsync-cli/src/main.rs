//! `formsync` binary

use std::process::ExitCode;

use formsync_core::FormEngine;

fn main() -> ExitCode {
    let matches = formsync_cli::command().get_matches();

    let result = formsync_cli::load_config(&matches).and_then(|config| {
        formsync_cli::init_tracing(&config.log);
        tracing::debug!(?config, "configuration loaded");

        let engine = FormEngine::new(config.engine);
        let output = formsync_cli::run(&matches, &engine)?;
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
