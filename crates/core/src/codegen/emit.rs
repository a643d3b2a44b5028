//! C# text assembly for the three combination strategies.
//!
//! Everything in here is pure string building over a unique-name projection
//! of the binding set; validation and file IO stay in the parent module. The
//! field and initialization sections are emitted identically across
//! strategies, which is what makes repeated generation byte-stable.

use std::collections::BTreeSet;

use crate::codegen::events::{handler_method_name, InteractiveKind};
use crate::codegen::GenerationConfig;
use crate::model::BindingEntry;

/// Namespaces every generated file imports regardless of bindings.
const CORE_NAMESPACES: [&str; 2] = ["UnityEngine", "UnityEngine.UI"];

fn indent(level: usize) -> String {
    " ".repeat(level * 4)
}

/// Prefix every non-blank line of `text` with `level` indent steps.
fn indent_block(text: &str, level: usize) -> String {
    let pad = indent(level);
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Deduplicated, lexicographically ordered using-directives for the
/// projection, seeded with the core namespaces.
pub fn render_using_block(projection: &[BindingEntry]) -> String {
    let mut namespaces: BTreeSet<String> =
        CORE_NAMESPACES.iter().map(|ns| (*ns).to_string()).collect();
    for entry in projection {
        if let Some(ns) = entry.capability_namespace() {
            namespaces.insert(ns.to_string());
        }
    }

    let mut out = String::new();
    for ns in namespaces {
        out.push_str(&format!("using {ns};\n"));
    }
    out.push('\n');
    out
}

/// One `[SerializeField]` field per enabled entry, at the entry's declared
/// visibility unless `visibility_override` forces one (the base-class
/// strategy emits protected fields so the derived type can reach them).
pub fn render_fields(projection: &[BindingEntry], visibility_override: Option<&str>) -> String {
    let mut out = String::new();
    for entry in projection.iter().filter(|e| e.enabled) {
        let visibility = visibility_override.unwrap_or_else(|| entry.visibility.keyword());
        out.push_str("[SerializeField]\n");
        out.push_str(&format!(
            "{} {} {};\n",
            visibility, entry.capability_short_name, entry.field_name
        ));
    }
    out
}

/// Lookup + null-check statements, one pair per enabled entry.
///
/// A ROOT-sentinel entry resolves from the binding set's own root object
/// rather than via a child path. The statement shape is identical across
/// strategies.
pub fn render_initialization(projection: &[BindingEntry]) -> String {
    let mut out = String::new();
    for entry in projection.iter().filter(|e| e.enabled) {
        let short = &entry.capability_short_name;
        let field = &entry.field_name;
        if entry.is_root_binding() {
            out.push_str(&format!("{field} = GetComponent<{short}>();\n"));
            out.push_str(&format!("if ({field} == null)\n"));
            out.push_str("{\n");
            out.push_str(&format!(
                "    Debug.LogError(\"Failed to find component {short} on the root object\");\n"
            ));
            out.push_str("}\n");
        } else {
            let path = &entry.target_path_relative;
            out.push_str(&format!(
                "{field} = transform.Find(\"{path}\").GetComponent<{short}>();\n"
            ));
            out.push_str(&format!("if ({field} == null)\n"));
            out.push_str("{\n");
            out.push_str(&format!(
                "    Debug.LogError(\"Failed to find component {short} at path '{path}'\");\n"
            ));
            out.push_str("}\n");
        }
    }
    out
}

/// Null-guarded signal subscriptions for the interactive entries.
pub fn render_event_wiring(projection: &[BindingEntry]) -> String {
    let mut out = String::new();
    let mut wired = BTreeSet::new();
    for entry in projection.iter().filter(|e| e.enabled) {
        let Some(kind) = InteractiveKind::classify(&entry.capability_short_name) else {
            continue;
        };
        let method = handler_method_name(&entry.field_name, kind);
        if !wired.insert(method.clone()) {
            continue;
        }
        let field = &entry.field_name;
        out.push_str(&format!("if ({field} != null)\n"));
        out.push_str("{\n");
        out.push_str(&format!("    {field}.{}.AddListener({method});\n", kind.signal()));
        out.push_str("}\n");
    }
    out
}

/// Empty handler stubs, one per distinct generated handler name.
pub fn render_event_handlers(projection: &[BindingEntry]) -> String {
    let mut out = String::new();
    let mut emitted = BTreeSet::new();
    for entry in projection.iter().filter(|e| e.enabled) {
        let Some(kind) = InteractiveKind::classify(&entry.capability_short_name) else {
            continue;
        };
        let method = handler_method_name(&entry.field_name, kind);
        if !emitted.insert(method.clone()) {
            continue;
        }
        out.push_str(&format!("private void {method}({})\n", kind.handler_params()));
        out.push_str("{\n");
        out.push_str(&format!("    // TODO: handle {}\n", entry.field_name));
        out.push_str(&format!("    {}\n", kind.handler_log(&entry.field_name)));
        out.push_str("}\n\n");
    }
    out
}

fn namespace_open(config: &GenerationConfig) -> Option<String> {
    if config.use_namespace && !config.namespace.is_empty() {
        Some(format!("namespace {}\n{{\n", config.namespace))
    } else {
        None
    }
}

/// Base-class strategy: a standalone base type with protected fields and a
/// virtual lifecycle entry point; hand-written logic derives from it.
pub fn render_base_class(
    projection: &[BindingEntry],
    config: &GenerationConfig,
    class_name: &str,
    root_display_name: &str,
) -> String {
    let mut code = render_using_block(projection);
    let ns = namespace_open(config);
    let class_level = usize::from(ns.is_some());
    if let Some(open) = &ns {
        code.push_str(open);
    }

    let mut body = String::new();
    body.push_str("/// <summary>\n");
    body.push_str(&format!("/// {root_display_name} binding base (generated, do not edit)\n"));
    body.push_str("/// </summary>\n");
    body.push_str(&format!("public class {class_name}Base : MonoBehaviour\n"));
    body.push_str("{\n");
    body.push_str(&indent_block("[Header(\"UI Bindings\")]", 1));
    body.push('\n');
    body.push_str(&indent_block(&render_fields(projection, Some("protected")), 1));
    body.push_str("\n\n");
    body.push_str(&indent_block(
        "protected virtual void Awake()\n{\n    InitializeBindings();\n}",
        1,
    ));
    body.push_str("\n\n");
    body.push_str(&indent_block("protected void InitializeBindings()\n{", 1));
    body.push('\n');
    body.push_str(&indent_block(&render_initialization(projection), 2));
    body.push('\n');
    body.push_str(&indent_block("}", 1));
    body.push('\n');
    body.push_str("}\n");

    code.push_str(&indent_block(&body, class_level));
    if ns.is_some() {
        code.push_str("\n}");
    }
    code.push('\n');
    code
}

/// Partial-class strategy: the generated half of a type whose other half is
/// hand-maintained under the same name.
pub fn render_partial_class(
    projection: &[BindingEntry],
    config: &GenerationConfig,
    class_name: &str,
    root_display_name: &str,
) -> String {
    let mut code = render_using_block(projection);
    let ns = namespace_open(config);
    let class_level = usize::from(ns.is_some());
    if let Some(open) = &ns {
        code.push_str(open);
    }

    let mut decl = format!("public partial class {class_name}");
    if !config.base_types.is_empty() {
        decl.push_str(&format!(" : {}", config.base_types));
    }

    let mut body = String::new();
    body.push_str("/// <summary>\n");
    body.push_str(&format!("/// {root_display_name} binding part (generated)\n"));
    body.push_str("/// </summary>\n");
    body.push_str(&decl);
    body.push('\n');
    body.push_str("{\n");
    body.push_str(&indent_block("[Header(\"UI Bindings\")]", 1));
    body.push('\n');
    body.push_str(&indent_block(&render_fields(projection, None), 1));
    body.push_str("\n\n");
    body.push_str(&indent_block("private void Awake()\n{\n    InitializeBindings();\n}", 1));
    body.push_str("\n\n");
    body.push_str(&indent_block("private void InitializeBindings()\n{", 1));
    body.push('\n');
    body.push_str(&indent_block(&render_initialization(projection), 2));
    body.push('\n');
    body.push_str(&indent_block("}", 1));
    body.push('\n');
    body.push_str("}\n");

    code.push_str(&indent_block(&body, class_level));
    if ns.is_some() {
        code.push_str("\n}");
    }
    code.push('\n');
    code
}

/// Single-script strategy: a complete type with fields, initialization,
/// event wiring, and handler stubs. Used when no hand-written companion is
/// expected.
pub fn render_single_script(
    projection: &[BindingEntry],
    config: &GenerationConfig,
    class_name: &str,
    root_display_name: &str,
) -> String {
    let mut code = render_using_block(projection);
    let ns = namespace_open(config);
    let class_level = usize::from(ns.is_some());
    if let Some(open) = &ns {
        code.push_str(open);
    }

    let mut decl = format!("public class {class_name}");
    if !config.base_types.is_empty() {
        decl.push_str(&format!(" : {}", config.base_types));
    }

    let mut body = String::new();
    body.push_str("/// <summary>\n");
    body.push_str(&format!(
        "/// {root_display_name} single-script binding (generated, fields and event handlers)\n"
    ));
    body.push_str("/// </summary>\n");
    body.push_str(&decl);
    body.push('\n');
    body.push_str("{\n");
    body.push_str(&indent_block("[Header(\"UI Bindings\")]", 1));
    body.push('\n');
    body.push_str(&indent_block(&render_fields(projection, None), 1));
    body.push_str("\n\n");
    body.push_str(&indent_block(
        "private void Start()\n{\n    InitializeBindings();\n    SetupEventListeners();\n}",
        1,
    ));
    body.push_str("\n\n");
    body.push_str(&indent_block("private void InitializeBindings()\n{", 1));
    body.push('\n');
    body.push_str(&indent_block(&render_initialization(projection), 2));
    body.push('\n');
    body.push_str(&indent_block("}", 1));
    body.push_str("\n\n");
    body.push_str(&indent_block("private void SetupEventListeners()\n{", 1));
    body.push('\n');
    body.push_str(&indent_block(&render_event_wiring(projection), 2));
    body.push('\n');
    body.push_str(&indent_block("}", 1));
    body.push_str("\n\n");
    body.push_str(&indent_block(&render_event_handlers(projection), 1));
    body.push('\n');
    body.push_str("}\n");

    code.push_str(&indent_block(&body, class_level));
    if ns.is_some() {
        code.push_str("\n}");
    }
    code.push('\n');
    code
}
