use cloudscope::handlers::{handle_render, handle_scan, handle_view, init_logging, load_config};
use commands::command_argument_builder;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    // The viewer draws on the alternate screen; log lines would tear it.
    let interactive = match chosen_command.subcommand() {
        Some(("view", _)) => true,
        Some(("scan", sub)) => sub.get_flag("view"),
        _ => false,
    };
    if !interactive {
        init_logging(verbose);
    }

    let config = load_config(&chosen_command);

    match chosen_command.subcommand() {
        Some(("scan", primary_command)) => handle_scan(primary_command, &config, quiet).await,
        Some(("view", primary_command)) => handle_view(primary_command, &config),
        Some(("render", primary_command)) => handle_render(primary_command, &config, quiet),
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
