//! The server-side rules in `validate` and the client-side rules in `form`
//! are independent implementations of the same constraints. This suite runs
//! one fixture table against both so a rule change in one place fails here
//! until the other is updated to match.

use bugtrack::form::BugFormData;
use bugtrack::{BugDraft, validate};

/// One raw input per field, plus the fields both validators must flag.
///
/// Empty strings model absent fields: the form holds them as empty inputs,
/// and the server sees them as missing keys (except status, which the API
/// defaults to "open" before validation, mirrored here).
struct Fixture {
    name: &'static str,
    title: &'static str,
    description: &'static str,
    status: &'static str,
    priority: &'static str,
    reporter: &'static str,
    invalid_fields: &'static [&'static str],
}

fn fixtures() -> Vec<Fixture> {
    let long_title: &'static str = Box::leak("t".repeat(201).into_boxed_str());
    let max_title: &'static str = Box::leak("t".repeat(200).into_boxed_str());
    let long_description: &'static str = Box::leak("d".repeat(2001).into_boxed_str());
    let max_description: &'static str = Box::leak("d".repeat(2000).into_boxed_str());
    let long_reporter: &'static str = Box::leak("r".repeat(101).into_boxed_str());
    let max_reporter: &'static str = Box::leak("r".repeat(100).into_boxed_str());

    vec![
        Fixture {
            name: "minimal valid",
            title: "Login broken",
            description: "500 on submit",
            status: "open",
            priority: "",
            reporter: "",
            invalid_fields: &[],
        },
        Fixture {
            name: "fully populated valid",
            title: "Login broken",
            description: "500 on submit",
            status: "in-progress",
            priority: "critical",
            reporter: "alice",
            invalid_fields: &[],
        },
        Fixture {
            name: "everything missing",
            title: "",
            description: "",
            status: "open",
            priority: "",
            reporter: "",
            invalid_fields: &["title", "description"],
        },
        Fixture {
            name: "whitespace only",
            title: "   ",
            description: "\t\t",
            status: "resolved",
            priority: "",
            reporter: "   ",
            invalid_fields: &["title", "description"],
        },
        Fixture {
            name: "at the length caps",
            title: max_title,
            description: max_description,
            status: "open",
            priority: "low",
            reporter: max_reporter,
            invalid_fields: &[],
        },
        Fixture {
            name: "over the length caps",
            title: long_title,
            description: long_description,
            status: "open",
            priority: "low",
            reporter: long_reporter,
            invalid_fields: &["title", "description", "reporter"],
        },
        Fixture {
            name: "unknown status",
            title: "Login broken",
            description: "500 on submit",
            status: "closed",
            priority: "",
            reporter: "",
            invalid_fields: &["status"],
        },
        Fixture {
            name: "wrong case status",
            title: "Login broken",
            description: "500 on submit",
            status: "Open",
            priority: "",
            reporter: "",
            invalid_fields: &["status"],
        },
        Fixture {
            name: "unknown priority",
            title: "Login broken",
            description: "500 on submit",
            status: "open",
            priority: "urgent",
            reporter: "",
            invalid_fields: &["priority"],
        },
        Fixture {
            name: "multiple failures at once",
            title: "",
            description: "500 on submit",
            status: "closed",
            priority: "urgent",
            reporter: long_reporter,
            invalid_fields: &["title", "status", "priority", "reporter"],
        },
    ]
}

fn present(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn server_draft(fixture: &Fixture) -> BugDraft {
    BugDraft {
        title: present(fixture.title),
        description: present(fixture.description),
        status: Some(fixture.status.to_string()),
        priority: present(fixture.priority),
        reporter: present(fixture.reporter),
    }
}

fn form_data(fixture: &Fixture) -> BugFormData {
    BugFormData {
        title: fixture.title.to_string(),
        description: fixture.description.to_string(),
        status: fixture.status.to_string(),
        priority: fixture.priority.to_string(),
        reporter: fixture.reporter.to_string(),
    }
}

#[test]
fn server_validator_flags_expected_fields() {
    for fixture in fixtures() {
        let errors = validate::validate_bug(&server_draft(&fixture));
        let flagged: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            flagged, fixture.invalid_fields,
            "fixture '{}': server flagged {:?}, expected {:?}",
            fixture.name, flagged, fixture.invalid_fields
        );
    }
}

#[test]
fn form_validator_flags_expected_fields() {
    for fixture in fixtures() {
        let errors = form_data(&fixture).validate();
        let mut flagged = Vec::new();
        if errors.title.is_some() {
            flagged.push("title");
        }
        if errors.description.is_some() {
            flagged.push("description");
        }
        if errors.status.is_some() {
            flagged.push("status");
        }
        if errors.priority.is_some() {
            flagged.push("priority");
        }
        if errors.reporter.is_some() {
            flagged.push("reporter");
        }
        assert_eq!(
            flagged, fixture.invalid_fields,
            "fixture '{}': form flagged {:?}, expected {:?}",
            fixture.name, flagged, fixture.invalid_fields
        );
    }
}

#[test]
fn validators_emit_identical_messages_for_shared_rules() {
    // Messages for length and enum rules are user-visible in both places
    // and must not drift.
    let fixture = Fixture {
        name: "message parity",
        title: Box::leak("t".repeat(201).into_boxed_str()),
        description: "500 on submit",
        status: "closed",
        priority: "urgent",
        reporter: "",
        invalid_fields: &["title", "status", "priority"],
    };

    let server_errors = validate::validate_bug(&server_draft(&fixture));
    let form_errors = form_data(&fixture).validate();

    let server_title = &server_errors.iter().find(|e| e.field == "title").unwrap().message;
    assert_eq!(server_title, form_errors.title.as_ref().unwrap());

    let server_status = &server_errors.iter().find(|e| e.field == "status").unwrap().message;
    assert_eq!(server_status, form_errors.status.as_ref().unwrap());

    let server_priority = &server_errors
        .iter()
        .find(|e| e.field == "priority")
        .unwrap()
        .message;
    assert_eq!(server_priority, form_errors.priority.as_ref().unwrap());
}
