use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

use uibind_core::db::{ProjectDb, ProjectLayout};
use uibind_core::scene::{StableId, TemplateAssetId};

const LOGIN_PANEL_YAML: &str = r#"id: LoginPanel
root:
  stable_id: 1
  name: LoginPanel
  capabilities:
    - UnityEngine.UI.Image
  children:
    - stable_id: 2
      name: Header
      children:
        - stable_id: 3
          name: Title
          capabilities:
            - UnityEngine.UI.Text
    - stable_id: 4
      name: Buttons
      children:
        - stable_id: 5
          name: Submit
          capabilities:
            - UnityEngine.UI.Button
        - stable_id: 6
          name: Cancel
          capabilities:
            - UnityEngine.UI.Button
"#;

fn setup_project(root: &Path) {
    cargo_bin_cmd!("uibind").arg("init-project").arg("--root").arg(root).assert().success();
    let source = root.join("LoginPanel.yaml.in");
    fs::write(&source, LOGIN_PANEL_YAML).expect("write template yaml");
    cargo_bin_cmd!("uibind")
        .arg("add-template")
        .arg("--root")
        .arg(root)
        .arg("--file")
        .arg(&source)
        .assert()
        .success();
}

fn bind_node(root: &Path, node: &str, capability: &str) {
    cargo_bin_cmd!("uibind")
        .arg("bind")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .arg("--node")
        .arg(node)
        .arg("--capability")
        .arg(capability)
        .assert()
        .success();
}

#[test]
fn bind_synthesizes_default_name_from_prefix_policy() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    setup_project(root);

    cargo_bin_cmd!("uibind")
        .arg("bind")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .arg("--node")
        .arg("Buttons/Submit")
        .arg("--capability")
        .arg("UnityEngine.UI.Button")
        .assert()
        .success()
        .stdout(predicate::str::contains("Field: btnSubmit (private)"))
        .stdout(predicate::str::contains("Path: Buttons/Submit"));

    let layout = ProjectLayout::new(root);
    let db = ProjectDb::open(&layout.db_path).expect("open db");
    let set = db
        .load_binding_set(&TemplateAssetId::new("LoginPanel"))
        .expect("load")
        .expect("set exists");
    assert_eq!(set.len(), 1);
    assert_eq!(set.entries[0].target_stable_id, StableId(5));
    assert_eq!(set.entries[0].field_name, "btnSubmit");
}

#[test]
fn duplicate_binding_is_rejected_with_no_state_change() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    setup_project(root);
    bind_node(root, "Buttons/Submit", "UnityEngine.UI.Button");

    cargo_bin_cmd!("uibind")
        .arg("bind")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .arg("--node")
        .arg("Buttons/Submit")
        .arg("--capability")
        .arg("UnityEngine.UI.Button")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already has a binding"));

    let layout = ProjectLayout::new(root);
    let db = ProjectDb::open(&layout.db_path).expect("open db");
    let set = db
        .load_binding_set(&TemplateAssetId::new("LoginPanel"))
        .expect("load")
        .expect("set exists");
    assert_eq!(set.len(), 1);
}

#[test]
fn binding_unknown_capability_fails() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    setup_project(root);

    cargo_bin_cmd!("uibind")
        .arg("bind")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .arg("--node")
        .arg("Buttons/Submit")
        .arg("--capability")
        .arg("UnityEngine.UI.Slider")
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no capability"));
}

#[test]
fn explicit_name_collision_gets_suffixed() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    setup_project(root);
    bind_node(root, "Buttons/Submit", "UnityEngine.UI.Button");

    // Request the same field name for another node; the allocator suffixes.
    cargo_bin_cmd!("uibind")
        .arg("bind")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .arg("--node")
        .arg("Buttons/Cancel")
        .arg("--capability")
        .arg("UnityEngine.UI.Button")
        .arg("--name")
        .arg("btnSubmit")
        .assert()
        .success()
        .stdout(predicate::str::contains("Field: btnSubmit1 (private)"));
}

#[test]
fn root_binding_uses_sentinel_path() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    setup_project(root);

    cargo_bin_cmd!("uibind")
        .arg("bind")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .arg("--node")
        .arg("[ROOT]")
        .arg("--capability")
        .arg("UnityEngine.UI.Image")
        .assert()
        .success()
        .stdout(predicate::str::contains("Path: [ROOT]"));
}

#[test]
fn list_bindings_shows_disabled_and_pending_state() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    setup_project(root);
    bind_node(root, "Buttons/Submit", "UnityEngine.UI.Button");

    cargo_bin_cmd!("uibind")
        .arg("set-enabled")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .arg("--node-id")
        .arg("5")
        .arg("--capability")
        .arg("UnityEngine.UI.Button")
        .arg("--enabled")
        .arg("false")
        .assert()
        .success();

    cargo_bin_cmd!("uibind")
        .arg("list-bindings")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .assert()
        .success()
        .stdout(predicate::str::contains("[disabled]"));

    cargo_bin_cmd!("uibind")
        .arg("list-bindings")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"field_name\": \"btnSubmit\""));

    cargo_bin_cmd!("uibind")
        .arg("list-sets")
        .arg("--root")
        .arg(root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Binding sets (1):"))
        .stdout(predicate::str::contains("LoginPanel"));
}

#[test]
fn generate_writes_base_class_script_with_default_profile() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    setup_project(root);
    bind_node(root, "Buttons/Submit", "UnityEngine.UI.Button");
    bind_node(root, "Header/Title", "UnityEngine.UI.Text");

    cargo_bin_cmd!("uibind")
        .arg("generate")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .assert()
        .success()
        .stdout(predicate::str::contains("Class: LoginPanel"));

    let generated = root.join("generated/LoginPanelBase.cs");
    let code = fs::read_to_string(&generated).expect("read generated");
    assert!(code.contains("public class LoginPanelBase : MonoBehaviour"));
    assert!(code.contains("protected Button btnSubmit;"));
    assert!(code.contains("protected Text txtTitle;"));
    assert!(code.contains("transform.Find(\"Buttons/Submit\")"));
}

#[test]
fn generate_twice_is_idempotent() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    setup_project(root);
    bind_node(root, "Buttons/Submit", "UnityEngine.UI.Button");

    let run = || {
        cargo_bin_cmd!("uibind")
            .arg("generate")
            .arg("--root")
            .arg(root)
            .arg("--template")
            .arg("LoginPanel")
            .assert()
            .success();
        fs::read_to_string(root.join("generated/LoginPanelBase.cs")).expect("read generated")
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
}

#[test]
fn rename_propagates_into_companion_script_on_generate() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    setup_project(root);
    bind_node(root, "Buttons/Submit", "UnityEngine.UI.Button");

    // A hand-written companion referencing the generated field.
    let companion = root.join("scripts/LoginPanel.cs");
    fs::write(
        &companion,
        "public partial class LoginPanel\n{\n    void Go()\n    {\n        btnSubmit.interactable = false;\n        var btnSubmitBackup = btnSubmit;\n    }\n}\n",
    )
    .expect("write companion");

    cargo_bin_cmd!("uibind")
        .arg("rename")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .arg("--node-id")
        .arg("5")
        .arg("--capability")
        .arg("UnityEngine.UI.Button")
        .arg("--name")
        .arg("btnConfirm")
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed field 'btnSubmit' -> 'btnConfirm'"));

    cargo_bin_cmd!("uibind")
        .arg("generate")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .assert()
        .success()
        .stdout(predicate::str::contains("Renames propagated: 1 marker(s), 2 token occurrence(s)"));

    let content = fs::read_to_string(&companion).expect("read companion");
    // Whole-word occurrences were rewritten; the longer identifier was not.
    assert!(content.contains("btnConfirm.interactable"));
    assert!(content.contains("= btnConfirm;"));
    assert!(content.contains("btnSubmitBackup"));
    assert!(!content.contains("btnSubmit.interactable"));

    // The pending marker was acknowledged and persisted.
    let layout = ProjectLayout::new(root);
    let db = ProjectDb::open(&layout.db_path).expect("open db");
    let set = db
        .load_binding_set(&TemplateAssetId::new("LoginPanel"))
        .expect("load")
        .expect("set exists");
    assert!(!set.entries[0].has_pending_rename());
    assert_eq!(set.entries[0].field_name, "btnConfirm");

    // The regenerated binding file uses the new name.
    let generated = fs::read_to_string(root.join("generated/LoginPanelBase.cs")).expect("read");
    assert!(generated.contains("btnConfirm"));
    assert!(!generated.contains("btnSubmit;"));
}

#[test]
fn unbind_then_generate_fails_with_no_enabled_bindings() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    setup_project(root);
    bind_node(root, "Buttons/Submit", "UnityEngine.UI.Button");

    cargo_bin_cmd!("uibind")
        .arg("unbind")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .arg("--node-id")
        .arg("5")
        .arg("--capability")
        .arg("UnityEngine.UI.Button")
        .assert()
        .success();

    cargo_bin_cmd!("uibind")
        .arg("generate")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no enabled bindings"));
}

#[test]
fn refresh_reports_stale_bindings_after_template_edit() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    setup_project(root);
    bind_node(root, "Buttons/Submit", "UnityEngine.UI.Button");
    bind_node(root, "Header/Title", "UnityEngine.UI.Text");

    // Restructure the registered template: rename Submit, drop Header.
    let edited = LOGIN_PANEL_YAML.replace("name: Submit", "name: SubmitNew").replace(
        "    - stable_id: 2
      name: Header
      children:
        - stable_id: 3
          name: Title
          capabilities:
            - UnityEngine.UI.Text
",
        "",
    );
    fs::write(root.join("templates/LoginPanel.yaml"), edited).expect("rewrite template");

    cargo_bin_cmd!("uibind")
        .arg("refresh")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stale bindings (1)"))
        .stdout(predicate::str::contains("txtTitle"));

    let layout = ProjectLayout::new(root);
    let db = ProjectDb::open(&layout.db_path).expect("open db");
    let set = db
        .load_binding_set(&TemplateAssetId::new("LoginPanel"))
        .expect("load")
        .expect("set exists");
    // The stale entry is kept; the surviving one re-resolved to the new name.
    assert_eq!(set.len(), 2);
    let submit = set
        .query_by_node_and_capability(StableId(5), "UnityEngine.UI.Button")
        .expect("submit entry");
    assert_eq!(submit.target_path_relative, "Buttons/SubmitNew");
}

#[test]
fn generate_with_strategy_override_emits_single_script() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    setup_project(root);
    bind_node(root, "Buttons/Submit", "UnityEngine.UI.Button");

    cargo_bin_cmd!("uibind")
        .arg("generate")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .arg("--strategy")
        .arg("single-script")
        .assert()
        .success();

    let code = fs::read_to_string(root.join("generated/LoginPanel.cs")).expect("read generated");
    assert!(code.contains("public class LoginPanel"));
    assert!(code.contains("btnSubmit.onClick.AddListener(OnbtnSubmitClick);"));
}

#[test]
fn generate_with_unknown_profile_fails() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    setup_project(root);
    bind_node(root, "Buttons/Submit", "UnityEngine.UI.Button");

    cargo_bin_cmd!("uibind")
        .arg("generate")
        .arg("--root")
        .arg(root)
        .arg("--template")
        .arg("LoginPanel")
        .arg("--profile")
        .arg("Nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No generation profile named 'Nope'"));
}
