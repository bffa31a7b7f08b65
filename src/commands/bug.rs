//! # Bug Command Handler
//!
//! This module handles bug-related CLI commands including creation, listing,
//! retrieval, updating, and deletion of bug records.

use crate::{
    Bug, BugDraft, BugPatch, cli_utils,
    commands::shared::{dispatch_command, parse_bug_id_or_exit, validate_args_count_or_exit},
    http_utils,
};

const BUG_USAGE: &str = "Usage: bugctl bug <create|list|get|update|delete> [args...]";

/// Handles all bug-related commands.
///
/// # Arguments
/// * `args` - Command arguments (first element is the subcommand)
/// * `client` - HTTP client for API communication
/// * `output_format` - Output format for get/list commands
pub async fn handle_bug_command(
    args: &[String],
    client: &http_utils::BugApiClient,
    output_format: cli_utils::OutputFormat,
) {
    dispatch_command!("bug", BUG_USAGE, args, client, output_format, {
        "create" => handle_bug_create,
        "list" => handle_bug_list,
        "get" => handle_bug_get,
        "update" => handle_bug_update,
        "delete" => handle_bug_delete,
    });
}

/// Handles bug creation from a JSON draft.
async fn handle_bug_create(
    args: &[String],
    client: &http_utils::BugApiClient,
    _output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(
        args,
        2,
        2,
        "create",
        r#"Usage: bugctl bug create <draft-json>
Example: bugctl bug create '{"title":"Login broken","description":"500 on submit","priority":"high"}'"#,
    );

    let draft_str = &args[1];
    let draft: BugDraft = serde_json::from_str(draft_str)
        .unwrap_or_else(|e| cli_utils::exit_with_error(&format!("Invalid draft JSON: {}", e)));

    let bug =
        http_utils::execute_or_exit(|| client.create_bug(&draft), "Failed to create bug").await;

    println!("Created bug:");
    cli_utils::print_json_or_exit(&bug, "bug");
}

/// Handles bug listing.
async fn handle_bug_list(
    args: &[String],
    client: &http_utils::BugApiClient,
    output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(args, 1, 1, "list", "Usage: bugctl bug list");

    let bugs = http_utils::execute_or_exit(|| client.list_bugs(), "Failed to fetch bugs").await;

    if bugs.is_empty() {
        println!("No bugs found");
    } else if output_format == cli_utils::OutputFormat::Json {
        cli_utils::print_json_or_exit(&bugs, "bugs");
    } else {
        print_bug_table(&bugs);
    }
}

/// Handles bug retrieval by ID.
async fn handle_bug_get(
    args: &[String],
    client: &http_utils::BugApiClient,
    _output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(args, 2, 2, "get", "Usage: bugctl bug get <bug-id>");

    let bug_id = parse_bug_id_or_exit(&args[1]);
    let bug = http_utils::execute_or_exit(
        || client.get_bug(&bug_id),
        &format!("Failed to get bug {}", bug_id),
    )
    .await;

    cli_utils::print_json_or_exit(&bug, "bug");
}

/// Handles partial bug update from a JSON patch.
async fn handle_bug_update(
    args: &[String],
    client: &http_utils::BugApiClient,
    _output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(
        args,
        3,
        3,
        "update",
        r#"Usage: bugctl bug update <bug-id> <patch-json>
Example: bugctl bug update 64a1f2c3d4e5f60718293a4b '{"status":"resolved"}'"#,
    );

    let bug_id = parse_bug_id_or_exit(&args[1]);
    let patch_str = &args[2];
    let patch: BugPatch = serde_json::from_str(patch_str)
        .unwrap_or_else(|e| cli_utils::exit_with_error(&format!("Invalid patch JSON: {}", e)));

    let bug = http_utils::execute_or_exit(
        || client.update_bug(&bug_id, &patch),
        &format!("Failed to update bug {}", bug_id),
    )
    .await;

    println!("Updated bug:");
    cli_utils::print_json_or_exit(&bug, "bug");
}

/// Handles bug deletion.
async fn handle_bug_delete(
    args: &[String],
    client: &http_utils::BugApiClient,
    _output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(args, 2, 2, "delete", "Usage: bugctl bug delete <bug-id>");

    let bug_id = parse_bug_id_or_exit(&args[1]);
    http_utils::execute_or_exit(
        || client.delete_bug(&bug_id),
        &format!("Failed to delete bug {}", bug_id),
    )
    .await;

    println!("Deleted bug: {}", bug_id);
}

fn print_bug_table(bugs: &[Bug]) {
    println!(
        "{:<24}  {:<11}  {:<8}  TITLE",
        "ID", "STATUS", "PRIORITY"
    );
    for bug in bugs {
        let priority = bug
            .priority
            .map(|p| p.as_str())
            .unwrap_or("-");
        println!(
            "{:<24}  {:<11}  {:<8}  {}",
            bug.id,
            bug.status.as_str(),
            priority,
            bug.title
        );
    }
}
