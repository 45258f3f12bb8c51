//! Priority-ordered resolution of directive-suffixed recipe fields.
//!
//! Rather than parsing an arbitrary variable name to decide whether its
//! suffix denotes an architecture or a distro/packager (which is ambiguous
//! for architectures like `x86_64` that contain an internal underscore),
//! this resolver goes the other way: given the *known* selector tuple, it
//! constructs the seven literal candidate names a field could have been
//! declared under and looks each one up directly. That sidesteps the
//! suffix-parsing ambiguity entirely.

use crate::constants::PackageManager;
use crate::shell::{PkgbuildDump, Value};

/// The (architecture, package manager, distro, codename) tuple a recipe is
/// being resolved for.
#[derive(Debug, Clone)]
pub struct Selector {
    pub arch: String,
    pub packager: PackageManager,
    pub distro: String,
    pub codename: String,
}

impl Selector {
    pub fn new(arch: impl Into<String>, packager: PackageManager, distro: impl Into<String>, codename: impl Into<String>) -> Self {
        Self {
            arch: arch.into(),
            packager,
            distro: distro.into(),
            codename: codename.into(),
        }
    }

    /// The seven candidate variable names for base field `field`, paired
    /// with their priority, highest first.
    fn candidates(&self, field: &str) -> [(String, u8); 7] {
        let a = &self.arch;
        let d = &self.distro;
        let c = &self.codename;
        let p = self.packager.as_str();
        [
            (format!("{field}_{a}__{d}_{c}"), 5),
            (format!("{field}_{a}__{d}"), 4),
            (format!("{field}_{a}"), 4),
            (format!("{field}__{d}_{c}"), 3),
            (format!("{field}__{d}"), 2),
            (format!("{field}__{p}"), 1),
            (field.to_string(), 0),
        ]
    }
}

/// Resolves the effective value of `field` for `selector`. Among
/// candidates tied at the same priority, the one declared later in the
/// dump wins.
pub fn resolve<'a>(dump: &'a PkgbuildDump, field: &str, selector: &Selector) -> Option<&'a Value> {
    let mut best: Option<(u8, usize, &Value)> = None;
    for (name, priority) in selector.candidates(field) {
        if let Some(index) = last_index_of(dump, &name) {
            let value = &dump.vars[index].1;
            let better = match best {
                None => true,
                Some((best_priority, best_index, _)) => {
                    priority > best_priority || (priority == best_priority && index > best_index)
                }
            };
            if better {
                best = Some((priority, index, value));
            }
        }
    }
    best.map(|(_, _, value)| value)
}

/// Resolves a function field (`build`, `package`, `preinst`, ...) the same
/// way, against the dump's captured function bodies. Functions have no
/// array form, so only the scalar-name candidates matter; the body text is
/// looked up directly rather than through `vars`.
pub fn resolve_function<'a>(dump: &'a PkgbuildDump, field: &str, selector: &Selector) -> Option<&'a str> {
    let mut best: Option<(u8, usize, &str)> = None;
    for (name, priority) in selector.candidates(field) {
        if let Some(index) = dump.functions.iter().rposition(|(n, _)| *n == name) {
            let better = match best {
                None => true,
                Some((best_priority, best_index, _)) => {
                    priority > best_priority || (priority == best_priority && index > best_index)
                }
            };
            if better {
                best = Some((priority, index, dump.functions[index].1.as_str()));
            }
        }
    }
    best.map(|(_, _, body)| body)
}

fn last_index_of(dump: &PkgbuildDump, name: &str) -> Option<usize> {
    dump.vars.iter().rposition(|(n, _)| n == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::Value;

    fn dump_with(vars: Vec<(&str, Value)>) -> PkgbuildDump {
        PkgbuildDump {
            vars: vars.into_iter().map(|(n, v)| (n.to_string(), v)).collect(),
            functions: Vec::new(),
        }
    }

    fn sel() -> Selector {
        Selector::new("x86_64", PackageManager::Deb, "ubuntu", "jammy")
    }

    #[test]
    fn falls_back_to_base_field() {
        let dump = dump_with(vec![("pkgdesc", Value::Scalar("base".into()))]);
        assert_eq!(resolve(&dump, "pkgdesc", &sel()), Some(&Value::Scalar("base".into())));
    }

    #[test]
    fn arch_suffix_beats_base() {
        let dump = dump_with(vec![
            ("depends", Value::Scalar("base".into())),
            ("depends_x86_64", Value::Scalar("arch-specific".into())),
        ]);
        assert_eq!(
            resolve(&dump, "depends", &sel()),
            Some(&Value::Scalar("arch-specific".into()))
        );
    }

    #[test]
    fn full_specialization_beats_arch_only() {
        let dump = dump_with(vec![
            ("depends_x86_64", Value::Scalar("arch".into())),
            ("depends_x86_64__ubuntu_jammy", Value::Scalar("full".into())),
        ]);
        assert_eq!(resolve(&dump, "depends", &sel()), Some(&Value::Scalar("full".into())));
    }

    #[test]
    fn tie_at_same_priority_breaks_by_declaration_order() {
        let dump = dump_with(vec![
            ("depends_x86_64", Value::Scalar("first".into())),
            ("depends_x86_64__ubuntu", Value::Scalar("second".into())),
        ]);
        // depends_x86_64 and depends_x86_64__ubuntu are both priority 4;
        // the later-declared one must win.
        assert_eq!(resolve(&dump, "depends", &sel()), Some(&Value::Scalar("second".into())));
    }

    #[test]
    fn packager_suffix_used_when_no_arch_or_distro_match() {
        let dump = dump_with(vec![("depends__deb", Value::Scalar("deb-only".into()))]);
        assert_eq!(resolve(&dump, "depends", &sel()), Some(&Value::Scalar("deb-only".into())));
    }
}
