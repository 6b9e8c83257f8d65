//! Integration tests for the WorkspaceLoader API

use std::fs;

use tempfile::tempdir;

use cartograph::{
    CartographError, WorkspaceLoader,
    config::{AppConfig, ParserConfig},
    diagnostics::ErrorCode,
    identifier::IdentifierMode,
};

const BANKING: &str = r#"
    workspace "Banking" {
        model {
            customer = person "Customer"
            bank = softwareSystem "Bank" {
                web = container "Web" "" "Rust"
            }
            customer -> web "Uses"
        }
        views {
            systemContext bank "context" {
                include *
            }
        }
    }
"#;

#[test]
fn test_loader_api_exists() {
    let _loader = WorkspaceLoader::default();
}

#[test]
fn test_parse_simple_workspace() {
    let loader = WorkspaceLoader::default();
    let result = loader.parse(BANKING);
    assert!(
        result.is_ok(),
        "Should parse valid workspace: {:?}",
        result.err()
    );
}

#[test]
fn test_parse_error_keeps_source() {
    let source = "workspace {\nmodel {\na -> b\n}\n}";
    let err = WorkspaceLoader::default()
        .parse(source)
        .expect_err("unknown identifiers");

    match err {
        CartographError::Parse { err, src, name } => {
            assert_eq!(src, source);
            assert_eq!(name, None);
            assert_eq!(
                err.first_error().and_then(|d| d.code()),
                Some(ErrorCode::E200)
            );
        }
        other => panic!("Expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_loader_with_config() {
    let source = r#"
        workspace {
            model {
                a = softwareSystem "A" {
                    api = container "API"
                }
                b = softwareSystem "B" {
                    api = container "API"
                }
            }
        }
    "#;
    assert!(WorkspaceLoader::default().parse(source).is_err());

    let config = AppConfig::new(ParserConfig::new(
        IdentifierMode::Hierarchical,
        true,
        false,
        false,
    ));
    let loader = WorkspaceLoader::new(config);
    assert!(loader.parse(source).is_ok());
}

#[test]
fn test_parse_refuses_includes() {
    let err = WorkspaceLoader::default()
        .parse("!include model.dsl")
        .expect_err("no file to include from");
    assert!(err.to_string().contains("E003"));
}

#[test]
fn test_load_with_includes() {
    let dir = tempdir().expect("Failed to create temp directory");
    let model_dir = dir.path().join("model");
    fs::create_dir(&model_dir).unwrap();
    fs::write(model_dir.join("1-people.dsl"), "customer = person \"Customer\"\n").unwrap();
    fs::write(
        model_dir.join("2-systems.dsl"),
        "bank = softwareSystem \"Bank\"\ncustomer -> bank \"Uses\"\n",
    )
    .unwrap();
    let workspace_path = dir.path().join("workspace.dsl");
    fs::write(
        &workspace_path,
        "workspace {\nmodel {\n!include model\n}\n}\n",
    )
    .unwrap();

    let parsed = WorkspaceLoader::default()
        .load(&workspace_path)
        .expect("Failed to load workspace");

    let model = parsed.workspace().model();
    assert_eq!(model.elements().count(), 2);
    assert_eq!(model.relationships().count(), 1);
}

#[test]
fn test_load_detects_include_cycles() {
    let dir = tempdir().expect("Failed to create temp directory");
    let workspace_path = dir.path().join("workspace.dsl");
    fs::write(&workspace_path, "!include workspace.dsl\n").unwrap();

    let err = WorkspaceLoader::default()
        .load(&workspace_path)
        .expect_err("cycle");
    match err {
        CartographError::Parse { err, name, .. } => {
            assert!(name.is_some());
            assert_eq!(
                err.first_error().and_then(|d| d.code()),
                Some(ErrorCode::E004)
            );
        }
        other => panic!("Expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_restricted_config_refuses_includes() {
    let dir = tempdir().expect("Failed to create temp directory");
    fs::write(dir.path().join("people.dsl"), "").unwrap();
    let workspace_path = dir.path().join("workspace.dsl");
    fs::write(&workspace_path, "!include people.dsl\n").unwrap();

    let loader = WorkspaceLoader::new(AppConfig::new(ParserConfig::new(
        IdentifierMode::Flat,
        true,
        true,
        false,
    )));
    let err = loader.load(&workspace_path).expect_err("restricted");
    assert!(err.to_string().contains("E004"));
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().expect("Failed to create temp directory");
    let err = WorkspaceLoader::default()
        .load(dir.path().join("missing.dsl"))
        .expect_err("missing file");
    assert!(matches!(err, CartographError::Read { .. }));
}

#[test]
fn test_render_summary() {
    let loader = WorkspaceLoader::default();
    let parsed = loader.parse(BANKING).expect("Failed to parse");
    let summary = loader.render_summary(parsed.workspace());

    assert!(summary.starts_with("Workspace: Banking"));
    assert!(summary.contains("Elements (3):"));
    assert!(summary.contains("    container Web [Rust]"));
    assert!(summary.contains("Customer -> Bank \"Uses\" (implied)"));
    assert!(summary.contains("context [systemContext] of Bank: 2 elements"));
}

#[test]
fn test_load_with_decisions() {
    let dir = tempdir().expect("Failed to create temp directory");
    let adr_dir = dir.path().join("docs").join("adr");
    fs::create_dir_all(&adr_dir).unwrap();
    fs::write(
        adr_dir.join("0001-record-architecture-decisions.md"),
        "# 1. Record architecture decisions\n\nDate: 2024-01-02\n\n## Status\n\nAccepted\n",
    )
    .unwrap();
    let workspace_path = dir.path().join("workspace.dsl");
    fs::write(
        &workspace_path,
        "workspace \"Banking\" {\nmodel {\nbank = softwareSystem \"Bank\" {\n!adrs docs/adr\n}\n}\n}\n",
    )
    .unwrap();

    let loader = WorkspaceLoader::default();
    let parsed = loader.load(&workspace_path).expect("Failed to load workspace");

    let summary = loader.render_summary(parsed.workspace());
    assert!(summary.contains("Decisions (1):"));
    assert!(summary.contains("1. Record architecture decisions [Accepted] of Bank"));
}
