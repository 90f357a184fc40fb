mod args;
mod render;

use args::Args;
use clap::Parser;
use grimoire_census::Census;
use std::time::Instant;

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();

    let quiet = args.quiet;
    let code = match run(args, quiet) {
        Ok(code) => code,
        Err(err) => {
            log::error!("Census failed: {err:#}");
            1
        }
    };
    std::process::exit(code);
}

fn run(args: Args, quiet: bool) -> anyhow::Result<i32> {
    let start = Instant::now();
    let config = args.into_config()?;
    let report = Census::from_config(config)?.run()?;

    if !quiet {
        print!("{}", render::render_report(&report));
        println!(
            "\nCensus complete in {:.2}ms.",
            start.elapsed().as_secs_f64() * 1000.0
        );
    }
    Ok(render::exit_code(report.status()))
}
