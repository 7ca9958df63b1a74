use crate::CLAP_STYLING;
use clap::{arg, command};
use std::path::PathBuf;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("cloudscope")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("cloudscope")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Log debug events to stderr").required(false))
        .arg(
            arg!(-c --"config" <PATH>)
                .required(false)
                .global(true)
                .help("Path to a TOML config file (default: ~/.config/cloudscope/config.toml)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .subcommand_required(true)
        .subcommand(
            command!("scan")
                .about(
                    "Inventory compute instances, buckets, databases and functions, then report \
                or explore them as a graph.",
                )
                .arg(
                    arg!(-s --"source" <DIR>)
                        .required(false)
                        .help("Directory of provider CLI JSON exports (ec2.json, s3.json, ...)")
                        .value_parser(clap::value_parser!(PathBuf))
                        .conflicts_with_all(["gateway", "remote"]),
                )
                .arg(
                    arg!(-g --"gateway" <URL>)
                        .required(false)
                        .help("Base URL of a per-category listing gateway")
                        .conflicts_with_all(["source", "remote"]),
                )
                .arg(
                    arg!(-r --"remote" <URL>)
                        .required(false)
                        .help("Base URL of a scan service that returns a ready graph")
                        .conflicts_with_all(["source", "gateway"]),
                )
                .arg(
                    arg!(--"access-key" <KEY>)
                        .required(false)
                        .help("Access key id")
                        .env("AWS_ACCESS_KEY_ID"),
                )
                .arg(
                    arg!(--"secret-key" <SECRET>)
                        .required(false)
                        .help("Secret access key")
                        .env("AWS_SECRET_ACCESS_KEY")
                        .hide_env_values(true),
                )
                .arg(
                    arg!(--"region" <REGION>)
                        .required(false)
                        .help("Region to scan (default: from config, else us-east-1)")
                        .env("AWS_REGION"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, svg, html")
                        .value_parser(["text", "json", "svg", "html"])
                        .default_value("text"),
                )
                .arg(
                    arg!(--"width" <UNITS>)
                        .required(false)
                        .help("Viewport width for svg and html output")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("800"),
                )
                .arg(
                    arg!(--"view")
                        .required(false)
                        .help("Open the interactive graph viewer once the scan completes")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("view")
                .about("Explore a saved scan (graph JSON or JSON report) in the terminal viewer")
                .arg(
                    arg!(<FILE>)
                        .help("Saved scan file")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            command!("render")
                .about("Lay out a saved scan and export it as SVG or HTML")
                .arg(
                    arg!(<FILE>)
                        .help("Saved scan file")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Export format: svg, html")
                        .value_parser(["svg", "html"])
                        .default_value("svg"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Output file (default: display to screen)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"width" <UNITS>)
                        .required(false)
                        .help("Viewport width")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("800"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_tree_is_valid() {
        command_argument_builder().debug_assert();
    }

    #[test]
    fn test_scan_sources_conflict() {
        let result = command_argument_builder().try_get_matches_from([
            "cloudscope",
            "scan",
            "--source",
            "exports",
            "--gateway",
            "http://localhost:8080",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_defaults() {
        let matches = command_argument_builder()
            .try_get_matches_from(["cloudscope", "render", "scan.json"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "render");
        assert_eq!(sub.get_one::<String>("format").unwrap(), "svg");
        assert_eq!(*sub.get_one::<f64>("width").unwrap(), 800.0);
    }
}
