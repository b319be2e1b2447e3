//! Mount harness generation
//!
//! The harness is the synthetic entry module the finalize pass bundles. It imports
//! the user's component file as a namespace and mounts its default export into the
//! host page's `root` element.

use std::fmt::Write as _;
use std::path::Path;

/// Id of the host element the component is mounted into
pub const MOUNT_TARGET_ID: &str = "root";

/// Text shown when the entry file has no default export
pub const PLACEHOLDER_TEXT: &str =
    "No default export found. The file must export a default React component.";

const PLACEHOLDER_STYLE: &str = "{ color: '#888', fontFamily: 'system-ui', padding: '24px' }";

/// How the default export is rendered, decided at runtime in the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountStrategy {
    /// A callable export, rendered as an element of that component
    Component,
    /// Any other non-null value, rendered as-is
    Element,
    /// Missing or null export
    Placeholder,
}

impl MountStrategy {
    /// Branch order in the generated code; each guard assumes the earlier ones failed.
    pub const ORDER: [MountStrategy; 3] = [Self::Component, Self::Element, Self::Placeholder];

    /// Runtime guard for this branch; `None` for the fallthrough branch
    fn guard(self) -> Option<&'static str> {
        match self {
            Self::Component => Some("typeof Component === 'function'"),
            Self::Element => Some("Component != null"),
            Self::Placeholder => None,
        }
    }

    /// Value passed to the single `render` call in this branch
    fn render_expr(self) -> String {
        match self {
            Self::Component => "createElement(Component)".to_string(),
            Self::Element => "Component".to_string(),
            Self::Placeholder => format!(
                "createElement('p', {{ style: {PLACEHOLDER_STYLE} }}, {})",
                js_string(PLACEHOLDER_TEXT)
            ),
        }
    }
}

/// Generate the harness module for the component at `entry` (absolute path).
pub fn build_harness(entry: &Path) -> String {
    let entry = entry.to_string_lossy();
    let mut source = String::new();

    let _ = writeln!(source, "import * as UserModule from {};", js_string(&entry));
    source.push_str("import { createElement } from 'react';\n");
    source.push_str("import { createRoot } from 'react-dom/client';\n\n");
    source.push_str("const Component = UserModule.default;\n");
    let _ = writeln!(
        source,
        "const mountTarget = document.getElementById({});",
        js_string(MOUNT_TARGET_ID)
    );
    source.push_str("if (mountTarget) {\n");
    source.push_str("  mountTarget.innerHTML = '';\n");
    source.push_str("  const root = createRoot(mountTarget);\n");
    source.push_str("  let view;\n");

    for (index, strategy) in MountStrategy::ORDER.iter().enumerate() {
        let opener = match (index, strategy.guard()) {
            (0, Some(guard)) => format!("  if ({guard}) {{"),
            (_, Some(guard)) => format!(" else if ({guard}) {{"),
            (_, None) => " else {".to_string(),
        };
        source.push_str(&opener);
        let _ = write!(source, "\n    view = {};\n  }}", strategy.render_expr());
    }
    source.push('\n');

    source.push_str("  root.render(view);\n");
    source.push_str("}\n");
    source
}

/// Quote `text` as a JavaScript string literal
fn js_string(text: &str) -> String {
    // JSON string literals are valid JavaScript string literals
    serde_json::to_string(text).unwrap_or_else(|_| format!("'{}'", text.replace('\'', "\\'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn harness() -> String {
        build_harness(Path::new("/home/user/components/Counter.tsx"))
    }

    #[test]
    fn test_imports_entry_as_namespace() {
        let source = harness();
        assert!(source.starts_with(
            "import * as UserModule from \"/home/user/components/Counter.tsx\";"
        ));
        assert!(source.contains("import { createElement } from 'react';"));
        assert!(source.contains("import { createRoot } from 'react-dom/client';"));
    }

    #[test]
    fn test_single_mount_into_root() {
        let source = harness();
        assert_eq!(source.matches("createRoot(").count(), 1);
        assert_eq!(source.matches(".render(").count(), 1);
        assert!(source.contains("document.getElementById(\"root\")"));
    }

    #[test]
    fn test_clears_target_before_mounting() {
        let source = harness();
        let clear = source.find("mountTarget.innerHTML = '';").unwrap();
        let mount = source.find("createRoot(mountTarget)").unwrap();
        assert!(clear < mount);
    }

    #[test]
    fn test_branches_in_fixed_order() {
        let source = harness();
        let component = source.find("typeof Component === 'function'").unwrap();
        let element = source.find("else if (Component != null)").unwrap();
        let placeholder = source.find("} else {").unwrap();
        assert!(component < element);
        assert!(element < placeholder);
        assert!(source.contains("view = createElement(Component);"));
        assert!(source.contains("view = Component;"));
    }

    #[test]
    fn test_placeholder_text_present() {
        assert!(harness().contains(PLACEHOLDER_TEXT));
    }

    #[test]
    fn test_path_is_escaped() {
        let source = build_harness(Path::new("/tmp/it's \"quoted\"/App.tsx"));
        assert!(source.contains(r#"from "/tmp/it's \"quoted\"/App.tsx";"#));
    }

    #[test]
    fn test_guards() {
        assert!(MountStrategy::Component.guard().is_some());
        assert!(MountStrategy::Element.guard().is_some());
        assert!(MountStrategy::Placeholder.guard().is_none());
    }
}
