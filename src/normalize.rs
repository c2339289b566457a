//! Component normalization
//!
//! Maps raw declarations to canonical [`Component`] records. The mapping is
//! pure: the same declaration and manifest path always produce the same
//! component, including its id.

use crate::domain::{Component, ComponentVersion, Ecosystem, PackageRef, RawDeclaration};
use crate::parser::{ConanVersionParser, PythonVersionParser, VersionParser};
use std::path::Path;

/// Converts raw declarations into canonical components
#[derive(Default)]
pub struct Normalizer {
    conan: ConanVersionParser,
    pip: PythonVersionParser,
}

impl Normalizer {
    /// Creates a new normalizer
    pub fn new() -> Self {
        Self::default()
    }

    fn parser(&self, ecosystem: Ecosystem) -> &dyn VersionParser {
        match ecosystem {
            Ecosystem::Conan => &self.conan,
            Ecosystem::Pip => &self.pip,
        }
    }

    /// Derives the canonical version from a raw constraint.
    ///
    /// Only a constraint that pins one version is exact; ranges, lower
    /// bounds, wildcards, empty strings and unparseable text are unresolved.
    pub fn resolve_version(&self, ecosystem: Ecosystem, constraint: &str) -> ComponentVersion {
        self.parser(ecosystem)
            .parse(constraint)
            .and_then(|spec| spec.exact_version().map(str::to_string))
            .map(ComponentVersion::Exact)
            .unwrap_or(ComponentVersion::Unresolved)
    }

    /// Normalizes a declaration found in the manifest at `path`
    pub fn component(&self, declaration: &RawDeclaration, path: &Path) -> Component {
        let version = self.resolve_version(declaration.ecosystem, &declaration.version_constraint);
        Component::new(declaration.name.trim(), version, declaration.ecosystem)
            .with_scope(declaration.scope)
            .with_constraint(declaration.version_constraint.trim())
            .with_location(path)
    }

    /// Normalizes a package named by a manifest (its identity or a lockfile parent).
    ///
    /// The component carries no scope of its own.
    pub fn package(&self, ecosystem: Ecosystem, package: &PackageRef, path: &Path) -> Component {
        let version = self.resolve_version(ecosystem, &package.version_constraint);
        Component::new(package.name.trim(), version, ecosystem)
            .with_constraint(package.version_constraint.trim())
            .with_location(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Scope;

    fn exact(v: &str) -> ComponentVersion {
        ComponentVersion::Exact(v.to_string())
    }

    #[test]
    fn test_parser_per_ecosystem() {
        let n = Normalizer::new();
        for ecosystem in Ecosystem::all() {
            assert_eq!(n.parser(*ecosystem).ecosystem(), *ecosystem);
        }
    }

    #[test]
    fn test_conan_versions() {
        let n = Normalizer::new();
        assert_eq!(n.resolve_version(Ecosystem::Conan, "1.0"), exact("1.0"));
        assert_eq!(n.resolve_version(Ecosystem::Conan, "3.0.0-rc1"), exact("3.0.0-rc1"));
        assert_eq!(
            n.resolve_version(Ecosystem::Conan, "[>=1.0 <2.0]"),
            ComponentVersion::Unresolved
        );
        assert_eq!(n.resolve_version(Ecosystem::Conan, ""), ComponentVersion::Unresolved);
    }

    #[test]
    fn test_pip_versions() {
        let n = Normalizer::new();
        assert_eq!(n.resolve_version(Ecosystem::Pip, "==2.31.0"), exact("2.31.0"));
        assert_eq!(n.resolve_version(Ecosystem::Pip, "===1.0-custom"), exact("1.0-custom"));
        for constraint in [">=1.0", "~=1.4", "^1.0", "==1.*", ">=1,<2", "", "garbage"] {
            assert_eq!(
                n.resolve_version(Ecosystem::Pip, constraint),
                ComponentVersion::Unresolved,
                "{constraint}"
            );
        }
    }

    #[test]
    fn test_component_from_declaration() {
        let n = Normalizer::new();
        let decl = RawDeclaration::runtime(Ecosystem::Conan, "x", "1.0");
        let c = n.component(&decl, Path::new("conanfile.py"));

        assert_eq!(c.name, "x");
        assert_eq!(c.version, exact("1.0"));
        assert_eq!(c.ecosystem, Ecosystem::Conan);
        assert_eq!(c.scopes.iter().copied().collect::<Vec<_>>(), vec![Scope::Runtime]);
        assert!(c.locations.contains(Path::new("conanfile.py")));
        assert!(c.constraints.contains("1.0"));
    }

    #[test]
    fn test_component_is_deterministic() {
        let n = Normalizer::new();
        let decl = RawDeclaration::new(Ecosystem::Pip, "Requests", ">=2", Scope::Test);
        let a = n.component(&decl, Path::new("setup.py"));
        let b = n.component(&decl, Path::new("setup.py"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_pip_name_folding_shares_id() {
        let n = Normalizer::new();
        let a = n.component(
            &RawDeclaration::runtime(Ecosystem::Pip, "Typing_Extensions", "==4.8.0"),
            Path::new("a/requirements.txt"),
        );
        let b = n.component(
            &RawDeclaration::runtime(Ecosystem::Pip, "typing-extensions", "==4.8.0"),
            Path::new("b/requirements.txt"),
        );
        assert_eq!(a.id, b.id);
        assert_eq!(a.name, "Typing_Extensions");
    }

    #[test]
    fn test_package_has_no_scope() {
        let n = Normalizer::new();
        let c = n.package(
            Ecosystem::Conan,
            &PackageRef::new("app", "0.3.1"),
            Path::new("conanfile.py"),
        );
        assert!(c.scopes.is_empty());
        assert_eq!(c.version, exact("0.3.1"));
    }
}
