//! Cross-format contracts that only make sense exercised against a real
//! `Recipe`: dependency-string rewriting for DEB and filename
//! construction for all four emitters.

use yap::constants::PackageManager;
use yap::pack::rewrite_deb_dependency;
use yap::recipe::Recipe;

fn base_recipe(pkg_type: PackageManager) -> Recipe {
    Recipe {
        pkg_name: "hello".into(),
        pkg_ver: "1.2.3".into(),
        pkg_rel: "4".into(),
        arch: vec!["x86_64".into()],
        pkg_type,
        arch_computed: "x86_64".into(),
        ..Default::default()
    }
}

#[test]
fn deb_dependency_rewrite_uses_parenthesized_operator_form() {
    assert_eq!(rewrite_deb_dependency("foo>=1.0").unwrap(), "foo (>= 1.0)");
    assert_eq!(rewrite_deb_dependency("bar").unwrap(), "bar");
}

#[test]
fn every_emitter_accepts_its_own_recipe_without_panicking_on_srcinfo() {
    for manager in [PackageManager::Apk, PackageManager::Deb, PackageManager::Rpm, PackageManager::Pacman] {
        let recipe = base_recipe(manager);
        let rendered = recipe.to_srcinfo();
        assert!(rendered.contains("pkgver = 1.2.3"));
    }
}
