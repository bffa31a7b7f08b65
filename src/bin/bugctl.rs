use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use bugtrack::{
    cli_utils::{self, OutputFormat},
    commands::handle_bug_command,
    http_utils,
};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Options {
    #[arrrg(optional, "Base URL of the bugtrack API server")]
    base_url: String,
    #[arrrg(
        optional,
        "Output format for get/list commands: json or table (default: json)"
    )]
    output: OutputFormat,
}

const USAGE: &str = r#"Usage: bugctl [options] <command> [args...]

Options:
  --base-url <url>     Base URL of the bugtrack API server (default: http://localhost:5000)
  --output <format>    Output format for get/list commands: json or table (default: json)

Commands:
  bug create <draft-json>              Create a bug from a JSON draft
  bug list                             List all bugs, newest first
  bug get <bug-id>                     Get a bug by ID
  bug update <bug-id> <patch-json>     Partially update a bug
  bug delete <bug-id>                  Delete a bug"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (options, free) = Options::from_command_line_relaxed("USAGE: bugctl <command> [args...]");

    if free.is_empty() {
        cli_utils::exit_with_usage_error("No command specified", USAGE);
    }

    let base_url = if options.base_url.is_empty() {
        "http://localhost:5000".to_string()
    } else {
        options.base_url
    };

    let client = http_utils::BugApiClient::new(base_url);

    match free[0].as_str() {
        "bug" => {
            handle_bug_command(&free[1..], &client, options.output).await;
        }
        _ => {
            cli_utils::exit_with_error(&format!(
                "Unknown command '{}'. Available commands: bug",
                free[0]
            ));
        }
    }

    Ok(())
}
