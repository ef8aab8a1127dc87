//! Shared E2E test helpers for `permgate` binary tests.

use assert_cmd::cargo::cargo_bin_cmd;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// Default timeout for CLI tests.
pub const TIMEOUT_BASIC: Duration = Duration::from_secs(10);

/// Environment variables that would leak the caller's setup into a test.
const PERMGATE_ENV_VARS: &[&str] = &[
    "PERMGATE_DEBUG",
    "PERMGATE_GRANTED",
    "PERMGATE_LOG_LEVEL",
    "RUST_LOG",
];

/// Declarations shared by most tests.
pub const SAMPLE_CONFIG: &str = r#"
[[declarations]]
kind = "resource"
name = "dashboard"

[[declarations]]
kind = "with_permission"
name = "admin-area"
value = "admin"
resources = ["users", "settings"]

[[declarations]]
kind = "switch_permissions"
name = "products"

[[declarations.branches]]
value = ["manager", "admin"]
exact = true
resources = ["products_full"]

[[declarations.branches]]
value = ["viewer", "manager"]
resources = ["products_readonly"]

[[declarations]]
kind = "with_permission"
name = "own-post"
predicate = "resource_owner"
resources = ["post_edit"]
"#;

/// A resource with a resource-level requirement and per-action requirements.
pub const ACTIONS_CONFIG: &str = r#"
[[declarations]]
kind = "resource"
name = "dashboard"

[[declarations]]
kind = "resource"
name = "articles"
value = ["editor", "viewer"]

[declarations.actions.list]

[declarations.actions.edit]
value = "editor"

[declarations.actions.remove]
predicate = "never"
"#;

/// Creates a project directory holding `.permgate/config.toml`.
pub fn project_with_config(content: &str) -> TempDir {
    let tmp = tempfile::tempdir().expect("create temp project dir");
    write_project_config(tmp.path(), content);
    tmp
}

/// Writes `<root>/.permgate/config.toml`.
pub fn write_project_config(root: &Path, content: &str) {
    let dir = root.join(".permgate");
    std::fs::create_dir_all(&dir).expect("create .permgate dir");
    std::fs::write(dir.join("config.toml"), content).expect("write project config");
}

/// Build a Command for `permgate` rooted at `project`.
///
/// The global config points at a file that does not exist, so the
/// caller's `~/.permgate/config.toml` never leaks in.
pub fn permgate_cmd(project: &Path) -> assert_cmd::Command {
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("permgate");
    cmd.timeout(TIMEOUT_BASIC);
    for var in PERMGATE_ENV_VARS {
        cmd.env_remove(var);
    }
    let global = project.join("no-global-config.toml");
    cmd.arg("-C")
        .arg(project)
        .arg("--config")
        .arg(global);
    cmd
}
