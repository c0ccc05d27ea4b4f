use std::process::Command;

fn main() {
    println!("cargo:rustc-env=GIT_HASH={}", build_revision());
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
}

/// Short git revision of the working tree, `-dirty` suffixed when it carries
/// uncommitted changes, `unknown` outside a checkout.
fn build_revision() -> String {
    let head = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string());

    let Some(revision) = head else {
        return "unknown".to_string();
    };

    let clean = Command::new("git")
        .args(["diff", "--quiet"])
        .output()
        .map(|out| out.status.success())
        .unwrap_or(true);

    if clean {
        revision
    } else {
        format!("{revision}-dirty")
    }
}
