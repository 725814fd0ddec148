//! skiff binary entry point.

use clap::Parser;
use skiff_cli::{cli, commands, logger, ui};

#[tokio::main]
async fn main() {
    let args = cli::Cli::parse();
    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::set_color_enabled(!args.no_color && ui::should_use_color());

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build::execute(build_args).await,
        cli::Command::Dev(dev_args) => commands::dev::execute(dev_args).await,
        cli::Command::Check(check_args) => commands::check::execute(check_args),
    };

    if let Err(e) = result {
        ui::error(&e.to_string());
        std::process::exit(1);
    }
}
