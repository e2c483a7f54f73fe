use clap::Parser;
use devfull_probe::{cli, logging, report, runner};
use std::io::{self, Write};

fn main() {
    let cli = cli::Cli::parse();
    logging::init(cli.verbose);

    let cfg = cli.to_config();
    let result = runner::run(&cfg);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        report::render_json(&result, &mut out);
    } else {
        report::render_text(&result, &mut out);
    }
    let _ = out.flush();

    if let Some(path) = &cli.report {
        if let Err(err) = report::write_report_file(&result, path) {
            log::warn!("{err:#}");
        }
    }

    std::process::exit(result.exit_code);
}
