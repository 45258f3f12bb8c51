//! Cross-module directive priority table: a field suffixed for the full
//! (arch, distro, codename) tuple beats a narrower suffix, which beats the
//! unsuffixed base field, regardless of declaration order.

use yap::constants::PackageManager;
use yap::recipe::Selector;
use yap::shell::{PkgbuildDump, Value};

fn dump(vars: Vec<(&str, Value)>) -> PkgbuildDump {
    PkgbuildDump {
        vars: vars.into_iter().map(|(n, v)| (n.to_string(), v)).collect(),
        functions: Vec::new(),
    }
}

#[test]
fn most_specific_directive_wins_regardless_of_declaration_order() {
    let selector = Selector::new("aarch64", PackageManager::Rpm, "fedora", "40");
    let d = dump(vec![
        ("depends_aarch64__fedora_40", Value::Scalar("most-specific".into())),
        ("depends", Value::Scalar("base".into())),
        ("depends_aarch64", Value::Scalar("arch-only".into())),
    ]);
    let resolved = yap::recipe::directive::resolve(&d, "depends", &selector);
    assert_eq!(resolved, Some(&Value::Scalar("most-specific".into())));
}

#[test]
fn unrelated_selector_falls_back_to_base() {
    let selector = Selector::new("riscv64", PackageManager::Apk, "alpine", "");
    let d = dump(vec![
        ("depends_x86_64", Value::Scalar("wrong-arch".into())),
        ("depends", Value::Scalar("base".into())),
    ]);
    let resolved = yap::recipe::directive::resolve(&d, "depends", &selector);
    assert_eq!(resolved, Some(&Value::Scalar("base".into())));
}
