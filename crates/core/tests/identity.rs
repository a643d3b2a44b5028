use uibind_core::model::BindingEntry;
use uibind_core::model::BindingSet;
use uibind_core::scene::{
    refresh_after_structural_change, resolve_path_relative, resolve_stable_id, IdentityError,
    InMemoryTemplateStore, LiveInstance, StableId, TemplateAsset, TemplateNode, TemplateStore,
    ROOT_SENTINEL,
};

/// LoginPanel
/// ├── Header
/// │   └── Title
/// └── Buttons
///     └── Submit
fn login_panel() -> TemplateAsset {
    let root = TemplateNode::new(StableId(1), "LoginPanel")
        .with_capability("UnityEngine.UI.Image")
        .with_child(
            TemplateNode::new(StableId(2), "Header").with_child(
                TemplateNode::new(StableId(3), "Title").with_capability("UnityEngine.UI.Text"),
            ),
        )
        .with_child(
            TemplateNode::new(StableId(4), "Buttons").with_child(
                TemplateNode::new(StableId(5), "Submit").with_capability("UnityEngine.UI.Button"),
            ),
        );
    TemplateAsset::new("LoginPanel", root)
}

fn store_with(asset: TemplateAsset) -> InMemoryTemplateStore {
    let mut store = InMemoryTemplateStore::new();
    store.insert(asset);
    store
}

#[test]
fn resolves_stable_id_through_instance_correspondence() {
    let asset = login_panel();
    let store = store_with(asset.clone());
    let instance = LiveInstance::instantiate(&asset, "Canvas/LoginPanel");

    let submit = instance.root.find_by_source(StableId(5)).expect("live submit node");
    let resolved = resolve_stable_id(&store, &instance, submit).expect("resolve");
    assert_eq!(resolved.stable_id, StableId(5));
    assert_eq!(resolved.template.as_str(), "LoginPanel");
}

#[test]
fn instance_local_rename_does_not_change_identity() {
    let asset = login_panel();
    let store = store_with(asset.clone());
    let mut instance = LiveInstance::instantiate(&asset, "Canvas/LoginPanel");

    instance.root.find_by_source_mut(StableId(5)).expect("live node").name =
        "SubmitRenamed".to_string();

    let renamed = instance.root.find_by_source(StableId(5)).expect("renamed node");
    let resolved = resolve_stable_id(&store, &instance, renamed).expect("resolve");
    assert_eq!(resolved.stable_id, StableId(5));
}

#[test]
fn node_without_correspondence_is_unresolvable() {
    let asset = login_panel();
    let store = store_with(asset.clone());
    let mut instance = LiveInstance::instantiate(&asset, "Canvas/LoginPanel");

    // A node added directly in the instance, never part of the template.
    let loose = uibind_core::scene::LiveNode {
        name: "LooseNode".to_string(),
        source_id: None,
        source_template: None,
        children: Vec::new(),
    };
    instance.root.children.push(loose);

    let node = instance.root.children.last().unwrap();
    let err = resolve_stable_id(&store, &instance, node).unwrap_err();
    assert!(matches!(err, IdentityError::Unresolvable { .. }));
}

#[test]
fn nested_template_instance_resolves_into_nested_asset() {
    // A ConfirmDialog template embedded inside LoginPanel.
    let dialog_root = TemplateNode::new(StableId(10), "ConfirmDialog").with_child(
        TemplateNode::new(StableId(11), "OkButton").with_capability("UnityEngine.UI.Button"),
    );
    let dialog = TemplateAsset::new("ConfirmDialog", dialog_root);

    let mut panel = login_panel();
    let mut slot = TemplateNode::new(StableId(6), "DialogSlot");
    slot.nested_template = Some(dialog.id.clone());
    panel.root.children.push(slot);

    let mut store = InMemoryTemplateStore::new();
    store.insert(dialog.clone());
    store.insert(panel.clone());

    let mut instance = LiveInstance::instantiate(&panel, "Canvas/LoginPanel");
    // The live subtree under the slot corresponds to the nested asset.
    let slot_live = instance.root.find_by_source_mut(StableId(6)).expect("slot");
    slot_live.children.push(uibind_core::scene::LiveNode {
        name: "OkButton".to_string(),
        source_id: Some(StableId(11)),
        source_template: Some(dialog.id.clone()),
        children: Vec::new(),
    });

    let ok_button = instance.root.find_by_source(StableId(11)).expect("nested node");
    let resolved = resolve_stable_id(&store, &instance, ok_button).expect("resolve nested");
    assert_eq!(resolved.template.as_str(), "ConfirmDialog");
    assert_eq!(resolved.stable_id, StableId(11));

    let ids: Vec<String> =
        store.template_ids().into_iter().map(|id| id.as_str().to_string()).collect();
    assert_eq!(ids, ["ConfirmDialog", "LoginPanel"]);
}

#[test]
fn relative_path_walks_template_structure() {
    let asset = login_panel();
    assert_eq!(
        resolve_path_relative(&asset, StableId(1), StableId(3)).as_deref(),
        Some("Header/Title")
    );
    assert_eq!(
        resolve_path_relative(&asset, StableId(1), StableId(5)).as_deref(),
        Some("Buttons/Submit")
    );
    assert_eq!(asset.absolute_path(StableId(5)).as_deref(), Some("LoginPanel/Buttons/Submit"));
    assert_eq!(asset.absolute_path(StableId(99)), None);
}

#[test]
fn root_target_yields_sentinel() {
    let asset = login_panel();
    assert_eq!(
        resolve_path_relative(&asset, StableId(1), StableId(1)).as_deref(),
        Some(ROOT_SENTINEL)
    );
}

#[test]
fn unrelated_nodes_have_no_relative_path() {
    let asset = login_panel();
    // Title is not below Buttons.
    assert_eq!(resolve_path_relative(&asset, StableId(4), StableId(3)), None);
    assert_eq!(resolve_path_relative(&asset, StableId(1), StableId(99)), None);
}

#[test]
fn refresh_rederives_paths_after_host_level_rename() {
    let asset = login_panel();

    let mut set = BindingSet::new("LoginPanel", StableId(1), "Canvas/LoginPanel", "LoginPanel");
    set.add_binding(
        BindingEntry::new(StableId(5), "UnityEngine.UI.Button", "btnSubmit").with_paths(
            "Canvas/LoginPanel/Buttons/Submit",
            "Buttons/Submit",
            "Submit",
        ),
    )
    .expect("add");

    // Host renames the node's display name without changing structure.
    let mut renamed = asset.clone();
    renamed.root.children[1].children[0].name = "SubmitNew".to_string();
    let store_renamed = store_with(renamed.clone());
    let live = LiveInstance::instantiate(&renamed, "Canvas/LoginPanel");

    let stale = refresh_after_structural_change(&store_renamed, &mut set, &live).expect("refresh");
    assert!(stale.is_empty());

    let entry = &set.entries[0];
    assert_eq!(entry.target_path_relative, "Buttons/SubmitNew");
    assert!(entry.target_path_relative.ends_with("SubmitNew"));
    assert_eq!(entry.target_path_absolute, "Canvas/LoginPanel/Buttons/SubmitNew");
    assert_eq!(entry.target_display_name, "SubmitNew");
}

#[test]
fn refresh_updates_root_sentinel_entries_from_instance_path() {
    let asset = login_panel();
    let store = store_with(asset.clone());

    let mut set = BindingSet::new("LoginPanel", StableId(1), "Canvas/LoginPanel", "LoginPanel");
    set.add_binding(
        BindingEntry::new(StableId(1), "UnityEngine.UI.Image", "imgPanel").with_paths(
            "Canvas/LoginPanel",
            ROOT_SENTINEL,
            "LoginPanel",
        ),
    )
    .expect("add");

    // The instance moved elsewhere in the scene.
    let mut live = LiveInstance::instantiate(&asset, "Overlay/LoginPanel");
    live.root.name = "LoginPanel".to_string();

    let stale = refresh_after_structural_change(&store, &mut set, &live).expect("refresh");
    assert!(stale.is_empty());

    assert_eq!(set.root_path_in_scene, "Overlay/LoginPanel");
    let entry = &set.entries[0];
    assert_eq!(entry.target_path_relative, ROOT_SENTINEL);
    assert_eq!(entry.target_path_absolute, "Overlay/LoginPanel");
}

#[test]
fn refresh_reports_missing_targets_without_deleting_them() {
    let asset = login_panel();

    let mut set = BindingSet::new("LoginPanel", StableId(1), "Canvas/LoginPanel", "LoginPanel");
    set.add_binding(
        BindingEntry::new(StableId(5), "UnityEngine.UI.Button", "btnSubmit").with_paths(
            "Canvas/LoginPanel/Buttons/Submit",
            "Buttons/Submit",
            "Submit",
        ),
    )
    .expect("add");

    // The Buttons subtree was deleted from the template.
    let mut restructured = asset.clone();
    restructured.root.children.remove(1);
    let store = store_with(restructured.clone());
    let live = LiveInstance::instantiate(&restructured, "Canvas/LoginPanel");

    let stale = refresh_after_structural_change(&store, &mut set, &live).expect("refresh");
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].stable_id, StableId(5));
    assert_eq!(stale[0].field_name, "btnSubmit");

    // The entry is flagged, not removed, and keeps its last-known paths.
    assert_eq!(set.len(), 1);
    assert_eq!(set.entries[0].target_path_relative, "Buttons/Submit");
}

#[test]
fn refresh_fails_cleanly_for_unknown_template() {
    let store = InMemoryTemplateStore::new();
    let asset = login_panel();
    let mut set = BindingSet::new("LoginPanel", StableId(1), "Canvas/LoginPanel", "LoginPanel");
    let live = LiveInstance::instantiate(&asset, "Canvas/LoginPanel");

    let err = refresh_after_structural_change(&store, &mut set, &live).unwrap_err();
    assert!(matches!(err, IdentityError::UnknownTemplate { .. }));
}

#[test]
fn template_yaml_round_trips() {
    let asset = login_panel();
    let yaml = asset.to_yaml().expect("serialize");
    let parsed = TemplateAsset::from_yaml(&yaml).expect("parse");
    assert_eq!(parsed, asset);
}

#[test]
fn duplicate_stable_ids_are_detected() {
    let root = TemplateNode::new(StableId(1), "Panel")
        .with_child(TemplateNode::new(StableId(2), "A"))
        .with_child(TemplateNode::new(StableId(2), "B"));
    let asset = TemplateAsset::new("Broken", root);
    assert_eq!(asset.duplicate_stable_ids(), vec![StableId(2)]);
    assert!(login_panel().duplicate_stable_ids().is_empty());
}

#[test]
fn find_by_path_resolves_nested_and_root() {
    let asset = login_panel();
    assert_eq!(asset.root.find_by_path("Buttons/Submit").map(|n| n.stable_id), Some(StableId(5)));
    assert_eq!(asset.root.find_by_path(ROOT_SENTINEL).map(|n| n.stable_id), Some(StableId(1)));
    assert_eq!(asset.root.find_by_path("").map(|n| n.stable_id), Some(StableId(1)));
    assert!(asset.root.find_by_path("Buttons/Missing").is_none());
}
