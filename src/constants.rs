//! Enumerations of supported distributions, canonical architectures with
//! alias normalization, and the per-format translation tables the packers
//! consult at emission time.

use std::fmt;

/// A package manager family. Each recipe field directive can be suffixed
/// with one of these via `__<packager>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    Apk,
    Deb,
    Rpm,
    Pacman,
}

impl PackageManager {
    pub fn as_str(self) -> &'static str {
        match self {
            PackageManager::Apk => "apk",
            PackageManager::Deb => "deb",
            PackageManager::Rpm => "rpm",
            PackageManager::Pacman => "pacman",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A distribution known to the RPM-suffix and DEB-codename tables. The set
/// is open in principle (distro/codename are free-form strings elsewhere in
/// the crate); this enum only covers the ones with a hardcoded suffix or
/// group mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpmDistroFamily {
    Fedora,
    Rhel,
    AmazonLinux,
    OracleLinux,
}

impl RpmDistroFamily {
    /// The dot-suffix appended to PkgRel for this family, e.g. `.fc`.
    pub fn pkgrel_suffix(self) -> &'static str {
        match self {
            RpmDistroFamily::Fedora => ".fc",
            RpmDistroFamily::Rhel => ".el",
            RpmDistroFamily::AmazonLinux => ".amzn",
            RpmDistroFamily::OracleLinux => ".ol",
        }
    }

    pub fn from_distro_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "fedora" => Some(RpmDistroFamily::Fedora),
            "rhel" | "centos" | "rocky" | "almalinux" => Some(RpmDistroFamily::Rhel),
            "amazon" | "amazonlinux" | "amzn" => Some(RpmDistroFamily::AmazonLinux),
            "ol" | "oracle" | "oraclelinux" => Some(RpmDistroFamily::OracleLinux),
            _ => None,
        }
    }
}

/// The closed set of canonical architecture names this crate understands,
/// along with the aliases that normalize to them.
pub const CANONICAL_ARCHITECTURES: &[(&str, &[&str])] = &[
    ("x86_64", &["amd64", "x86-64", "x64"]),
    ("i686", &["i386", "i486", "i586", "x86", "ia32"]),
    ("aarch64", &["arm64"]),
    ("armv7", &["armv7h", "armv7l", "armhf", "armv7hl"]),
    ("armv6", &["armv6h", "armv6l", "arm", "armel"]),
    ("ppc64le", &["powerpc64le", "ppc64el"]),
    ("s390x", &[]),
    ("riscv64", &["riscv64gc"]),
];

/// Normalize an architecture alias (or already-canonical name) to its
/// canonical form. Returns `None` if the token is not recognized.
pub fn canonicalize_architecture(token: &str) -> Option<&'static str> {
    for (canonical, aliases) in CANONICAL_ARCHITECTURES {
        if *canonical == token || aliases.contains(&token) {
            return Some(canonical);
        }
    }
    None
}

/// `true` if `token` matches, after canonicalization, the given canonical
/// architecture name. Used by the directive resolver to test an `_arch`
/// suffix against the current build architecture.
pub fn architecture_matches(token: &str, current_canonical: &str) -> bool {
    canonicalize_architecture(token) == Some(current_canonical)
}

/// `true` if `token` is a recognized architecture name or alias at all,
/// used to disambiguate a single-underscore directive suffix between an
/// arch marker and a distro/packager marker.
pub fn is_known_architecture_token(token: &str) -> bool {
    canonicalize_architecture(token).is_some()
}

/// Architecture translation table for `.apk` filenames: Alpine mostly uses
/// the canonical names already, but a handful differ.
pub fn apk_architecture(canonical: &str) -> &str {
    match canonical {
        "armv7" => "armhf",
        "armv6" => "armhf",
        other => other,
    }
}

/// Architecture translation table for `.deb` filenames and control fields.
pub fn deb_architecture(canonical: &str) -> &str {
    match canonical {
        "x86_64" => "amd64",
        "i686" => "i386",
        "aarch64" => "arm64",
        "armv7" => "armhf",
        "armv6" => "armel",
        "ppc64le" => "ppc64el",
        "any" => "all",
        other => other,
    }
}

/// Architecture translation table for `.rpm` filenames and spec `BuildArch`.
pub fn rpm_architecture(canonical: &str) -> &str {
    match canonical {
        "i686" => "i386",
        "armv7" => "armhfp",
        "any" => "noarch",
        other => other,
    }
}

/// Architecture translation for Pacman `.PKGINFO`/archive naming; Pacman
/// uses the canonical names directly except for the "any" marker.
pub fn pacman_architecture(canonical: &str) -> &str {
    match canonical {
        "any" => "any",
        other => other,
    }
}

/// Per-format build environment dependencies that every emitted package
/// implicitly make-depends on (the tools that unpack/install it), mirrored
/// into the generated metadata when the recipe doesn't already list them.
pub fn implicit_build_dependencies(manager: PackageManager) -> &'static [&'static str] {
    match manager {
        PackageManager::Apk => &["apk-tools", "abuild"],
        PackageManager::Deb => &["dpkg-dev", "build-essential"],
        PackageManager::Rpm => &["rpm-build", "rpmdevtools"],
        PackageManager::Pacman => &["pacman", "base-devel"],
    }
}

/// Maps a distro/package-manager name, as given on the CLI, to the emitter
/// family it selects. `dnf` is an alias for `yum`'s RPM family.
pub fn package_manager_for_distro(name: &str) -> Option<PackageManager> {
    match name.to_ascii_lowercase().as_str() {
        "apk" | "alpine" => Some(PackageManager::Apk),
        "apt" | "deb" | "debian" | "ubuntu" => Some(PackageManager::Deb),
        "pacman" | "arch" | "archlinux" => Some(PackageManager::Pacman),
        "yum" | "dnf" | "zypper" | "rpm" | "fedora" | "rhel" | "centos" | "rocky"
        | "almalinux" | "amazon" | "amazonlinux" | "oracle" | "oraclelinux" | "opensuse" => {
            Some(PackageManager::Rpm)
        }
        _ => None,
    }
}

/// Maps a PKGBUILD-style section/group hint to the RPM `Group:` tag value.
/// An unrecognized section maps to the empty string, per the emitter's
/// "unknown maps to empty" rule.
pub fn rpm_group_for_section(section: &str) -> &'static str {
    match section {
        "admin" => "Applications/System",
        "comm" => "Applications/Communications",
        "database" => "Applications/Databases",
        "devel" => "Development/Tools",
        "doc" => "Documentation",
        "editors" => "Applications/Editors",
        "games" => "Amusements/Games",
        "graphics" => "Applications/Multimedia",
        "libs" => "System Environment/Libraries",
        "net" => "Applications/Internet",
        "science" => "Applications/Engineering",
        "shells" => "System Environment/Shells",
        "sound" => "Applications/Multimedia",
        "text" => "Applications/Text",
        "utils" => "Applications/System",
        "web" => "Applications/Internet",
        "x11" => "User Interface/X",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_known_aliases() {
        assert_eq!(canonicalize_architecture("amd64"), Some("x86_64"));
        assert_eq!(canonicalize_architecture("armv7hl"), Some("armv7"));
        assert_eq!(canonicalize_architecture("s390x"), Some("s390x"));
        assert_eq!(canonicalize_architecture("bogus"), None);
    }

    #[test]
    fn translates_per_format_architectures() {
        assert_eq!(deb_architecture("x86_64"), "amd64");
        assert_eq!(deb_architecture("aarch64"), "arm64");
        assert_eq!(rpm_architecture("any"), "noarch");
        assert_eq!(apk_architecture("armv7"), "armhf");
    }

    #[test]
    fn maps_distro_names_to_package_managers() {
        assert_eq!(package_manager_for_distro("ubuntu"), Some(PackageManager::Deb));
        assert_eq!(package_manager_for_distro("dnf"), Some(PackageManager::Rpm));
        assert_eq!(package_manager_for_distro("alpine"), Some(PackageManager::Apk));
        assert_eq!(package_manager_for_distro("mystery"), None);
    }

    #[test]
    fn rpm_distro_family_detection() {
        assert_eq!(RpmDistroFamily::from_distro_name("Fedora").unwrap().pkgrel_suffix(), ".fc");
        assert_eq!(RpmDistroFamily::from_distro_name("rocky").unwrap().pkgrel_suffix(), ".el");
        assert!(RpmDistroFamily::from_distro_name("arch").is_none());
    }
}
