mod common;

use common::{MODEL_BYTES, Route, TestContext, TestServer};
use rime_mate::LangModelError;
use rime_mate::cli::{Commands, run};
use rime_mate_config::{Document, RemoveOutcome, Scalar, Value};
use rime_mate_fetch::FetchError;
use std::fs;

const OWNED_KEYS: [&str; 6] = [
    "grammar/language",
    "grammar/collocation_max_length",
    "grammar/collocation_min_length",
    "translator/contextual_suggestions",
    "translator/max_homophones",
    "translator/max_homographs",
];

fn patch_of(yaml: &str) -> Document {
    let doc = Document::parse(yaml.as_bytes()).unwrap();
    match doc.get("patch") {
        Some(Value::Section(patch)) => patch.clone(),
        other => panic!("expected a patch section, got {other:?}"),
    }
}

#[test]
fn test_install_then_remove_on_empty_directory() {
    let ctx = TestContext::new();
    let model = ctx.lang_model();

    let report = model.install().unwrap();
    assert!(report.config_saved);
    assert!(report.settings.created_section);
    assert_eq!(report.fetched.url, ctx.server.url("/origin.gram"));
    assert_eq!(fs::read(ctx.model_file()).unwrap(), MODEL_BYTES);

    let patch = patch_of(&ctx.read_yaml());
    let keys: Vec<&str> = patch.keys().collect();
    assert_eq!(keys, OWNED_KEYS);
    assert_eq!(
        patch.get("grammar/language"),
        Some(&Value::Scalar(Scalar::from("wanxiang-lts-zh-hans")))
    );
    assert_eq!(
        patch.get("grammar/collocation_max_length"),
        Some(&Value::Scalar(Scalar::Int(5)))
    );
    assert_eq!(
        patch.get("translator/contextual_suggestions"),
        Some(&Value::Scalar(Scalar::Bool(true)))
    );

    let removed = model.remove().unwrap();
    assert!(removed.resource_deleted);
    assert!(removed.config_saved);
    assert!(matches!(
        removed.settings,
        RemoveOutcome::Removed {
            section_dropped: true,
            ..
        }
    ));
    assert!(!ctx.model_file().exists());
    let doc = Document::parse(ctx.read_yaml().as_bytes()).unwrap();
    assert!(!doc.contains_key("patch"));

    let again = model.remove().unwrap();
    assert!(again.nothing_to_do());
    assert_eq!(again.settings, RemoveOutcome::SectionAbsent);
}

#[test]
fn test_install_twice_is_idempotent() {
    let ctx = TestContext::new();
    let model = ctx.lang_model();

    model.install().unwrap();
    let first = ctx.read_yaml();

    let second_report = model.install().unwrap();
    assert!(!second_report.config_saved);
    assert_eq!(second_report.settings.kept.len(), 6);
    assert_eq!(ctx.read_yaml(), first);
}

#[test]
fn test_install_preserves_user_settings_and_order() {
    let ctx = TestContext::new();
    ctx.write_yaml(
        "\
schema_list:
  - schema: rime_mint
menu:
  page_size: 8
patch:
  style/horizontal: true
  grammar/language: custom-value
switches:
  ascii_mode: false
",
    );

    ctx.lang_model().install().unwrap();
    let yaml = ctx.read_yaml();
    let doc = Document::parse(yaml.as_bytes()).unwrap();
    let top: Vec<&str> = doc.keys().collect();
    assert_eq!(top, vec!["schema_list", "menu", "patch", "switches"]);

    let patch = patch_of(&yaml);
    assert_eq!(
        patch.get("grammar/language"),
        Some(&Value::Scalar(Scalar::from("custom-value")))
    );
    let keys: Vec<&str> = patch.keys().collect();
    assert_eq!(
        keys,
        vec![
            "style/horizontal",
            "grammar/language",
            "grammar/collocation_max_length",
            "grammar/collocation_min_length",
            "translator/contextual_suggestions",
            "translator/max_homophones",
            "translator/max_homographs",
        ]
    );
}

#[test]
fn test_remove_keeps_user_patch_entries() {
    let ctx = TestContext::new();
    ctx.write_yaml("menu:\n  page_size: 8\npatch:\n  style/horizontal: true\n");
    let model = ctx.lang_model();

    model.install().unwrap();
    model.remove().unwrap();

    let yaml = ctx.read_yaml();
    let patch = patch_of(&yaml);
    let keys: Vec<&str> = patch.keys().collect();
    assert_eq!(keys, vec!["style/horizontal"]);
    assert_eq!(yaml, "menu:\n  page_size: 8\npatch:\n  style/horizontal: true\n");
}

#[test]
fn test_remove_only_patch_leaves_empty_file() {
    let ctx = TestContext::new();
    let model = ctx.lang_model();
    model.install().unwrap();
    model.remove().unwrap();
    assert_eq!(ctx.read_yaml(), "");
}

#[test]
fn test_remove_without_patch_does_not_rewrite_file() {
    let ctx = TestContext::new();
    let original = "# my settings\nmenu: {page_size: 8}\n";
    ctx.write_yaml(original);

    let report = ctx.lang_model().remove().unwrap();
    assert!(report.nothing_to_do());
    assert_eq!(ctx.read_yaml(), original);
}

#[test]
fn test_download_failure_leaves_config_untouched() {
    let ctx = TestContext::new();
    let server = TestServer::start(vec![
        ("/a.gram", Route::Respond(500, Vec::new())),
        ("/b.gram", Route::Respond(404, Vec::new())),
    ]);
    ctx.write_yaml("menu:\n  page_size: 8\n");

    let err = ctx
        .lang_model_with_sources(vec![server.url("/a.gram"), server.url("/b.gram")])
        .install()
        .unwrap_err();

    assert!(matches!(
        err,
        LangModelError::Fetch(FetchError::AllSourcesFailed { .. })
    ));
    assert_eq!(ctx.read_yaml(), "menu:\n  page_size: 8\n");
    assert!(!ctx.model_file().exists());
}

#[test]
fn test_malformed_config_aborts_install_after_download() {
    let ctx = TestContext::new();
    ctx.write_yaml("patch: [broken\n");

    let err = ctx.lang_model().install().unwrap_err();
    assert!(matches!(
        err,
        LangModelError::Config(rime_mate_config::ConfigError::Decode { .. })
    ));
    assert_eq!(ctx.read_yaml(), "patch: [broken\n");
    // No rollback of the downloaded model
    assert!(ctx.model_file().exists());
}

#[test]
fn test_status_tracks_install_and_remove() {
    let ctx = TestContext::new();
    let model = ctx.lang_model();

    assert!(model.status().unwrap().is_absent());
    model.install().unwrap();
    let status = model.status().unwrap();
    assert!(status.is_installed());
    assert_eq!(status.resource_bytes, Some(MODEL_BYTES.len() as u64));
    model.remove().unwrap();
    assert!(model.status().unwrap().is_absent());
}

#[test]
fn test_cli_run_reports_success_for_nothing_to_do() {
    let ctx = TestContext::new();
    assert!(run(Commands::Remove, &ctx.lang_model()).is_ok());
    assert!(run(Commands::Status, &ctx.lang_model()).is_ok());
}

#[test]
fn test_cli_run_surfaces_errors() {
    let ctx = TestContext::new();
    let err = run(Commands::Install, &ctx.lang_model_with_sources(Vec::new())).unwrap_err();
    assert!(format!("{err:#}").contains("installation failed"));
}
