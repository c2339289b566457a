//! Integration tests for compdetect
//!
//! These tests verify:
//! - Manifest discovery across Conan and pip layouts
//! - Scope extraction for Conan recipes and pip setup scripts
//! - Idempotence and merge commutativity of a run
//! - Cycle rejection and per-line warning recovery
//! - JSON report shape

use compdetect::config::DetectionConfig;
use compdetect::domain::{Component, ComponentVersion, Ecosystem, Scope};
use compdetect::error::DetectionError;
use compdetect::manifest::{detect_manifests, ManifestKind, ManifestSource};
use compdetect::orchestrator::{DetectionOutcome, Pipeline};
use compdetect::output::{create_emitter, DetectionReport, OutputConfig, OutputFormat, Verbosity};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Test fixture directory creation helper
fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

fn pipeline() -> Pipeline {
    Pipeline::new(DetectionConfig::default()).expect("default config is valid")
}

fn conan(path: &str, content: &str) -> ManifestSource {
    ManifestSource::new(path, Ecosystem::Conan, content)
}

fn pip(path: &str, content: &str) -> ManifestSource {
    ManifestSource::new(path, Ecosystem::Pip, content)
}

fn find<'a>(outcome: &'a DetectionOutcome, name: &str) -> &'a Component {
    outcome
        .graph
        .components()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("component {name} not found"))
}

fn scopes(component: &Component) -> Vec<Scope> {
    component.scopes.iter().copied().collect()
}

/// Component ids with their scopes, and edges, independent of merge order
fn snapshot(outcome: &DetectionOutcome) -> (BTreeSet<(String, Vec<Scope>)>, BTreeSet<(String, String)>) {
    let components = outcome
        .graph
        .components()
        .map(|c| (c.id.to_string(), scopes(c)))
        .collect();
    let edges = outcome
        .graph
        .edges()
        .iter()
        .map(|e| (e.parent.to_string(), e.child.to_string()))
        .collect();
    (components, edges)
}

const RECIPE: &str = r#"
from conan import ConanFile


class AppConan(ConanFile):
    name = "app"
    version = "0.3.1"
    settings = "os", "arch", "compiler", "build_type"

    def requirements(self):
        self.requires("zlib/1.2.13")
        self.requires("openssl/[>=3.0 <4]")

    def build_requirements(self):
        self.tool_requires("cmake/3.25.0")
        self.test_requires("gtest/1.14.0")
"#;

const SETUP_PY: &str = r#"
from setuptools import setup

setup(
    name="service",
    version="2.0.0",
    classifiers=[
        "Programming Language :: Python :: 3",
    ],
    install_requires=[
        "requests>=2.28",
        "six==1.16.0",
    ],
    tests_require=["pytest"],
)
"#;

mod manifest_detection {
    use super::*;

    /// Test detection of manifests of both ecosystems in one tree
    #[test]
    fn test_detect_both_ecosystems() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("conanfile.py"), RECIPE).unwrap();
        fs::create_dir(temp_dir.path().join("python")).unwrap();
        fs::write(temp_dir.path().join("python/setup.py"), SETUP_PY).unwrap();
        fs::write(
            temp_dir.path().join("python/requirements-dev.txt"),
            "pytest==7.4.0\n",
        )
        .unwrap();

        let config = DetectionConfig::default();
        let manifests = detect_manifests(temp_dir.path(), &config.ecosystems, &config.exclude_dirs);
        let kinds: Vec<ManifestKind> = manifests.iter().map(|m| m.kind).collect();

        assert_eq!(manifests.len(), 3);
        assert!(kinds.contains(&ManifestKind::ConanRecipe));
        assert!(kinds.contains(&ManifestKind::SetupPy));
        assert!(kinds.contains(&ManifestKind::Requirements));
    }

    /// Test that excluded directories are not descended into
    #[test]
    fn test_excluded_directories_skipped() {
        let temp_dir = create_test_dir();
        fs::create_dir_all(temp_dir.path().join(".venv/lib")).unwrap();
        fs::write(temp_dir.path().join(".venv/lib/setup.py"), SETUP_PY).unwrap();
        fs::write(temp_dir.path().join("conanfile.txt"), "[requires]\nzlib/1.2.13\n").unwrap();

        let config = DetectionConfig::default();
        let manifests = detect_manifests(temp_dir.path(), &config.ecosystems, &config.exclude_dirs);
        assert_eq!(manifests.len(), 1);
        assert_eq!(manifests[0].kind, ManifestKind::ConanText);
    }

    /// Test ecosystem filtering during discovery
    #[test]
    fn test_filter_by_ecosystem() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("conanfile.py"), RECIPE).unwrap();
        fs::write(temp_dir.path().join("setup.py"), SETUP_PY).unwrap();

        let manifests = detect_manifests(temp_dir.path(), &[Ecosystem::Pip], &[]);
        assert_eq!(manifests.len(), 1);
        assert_eq!(manifests[0].ecosystem, Ecosystem::Pip);
    }

    /// Test with a nonexistent directory
    #[test]
    fn test_nonexistent_directory() {
        let manifests = detect_manifests(Path::new("/nonexistent/path"), Ecosystem::all(), &[]);
        assert!(manifests.is_empty());
    }
}

mod extraction {
    use super::*;

    /// A plain `requires("x/1.0")` becomes a runtime component x@1.0
    #[tokio::test]
    async fn test_conan_requires_is_runtime() {
        let outcome = pipeline()
            .run(vec![conan(
                "conanfile.py",
                "class X(ConanFile):\n    requires(\"x/1.0\")\n",
            )])
            .await
            .unwrap();

        let x = find(&outcome, "x");
        assert_eq!(x.version, ComponentVersion::Exact("1.0".to_string()));
        assert_eq!(scopes(x), vec![Scope::Runtime]);
        assert!(outcome.diagnostics.is_empty());
    }

    /// Every tool_requires declaration is build scoped
    #[tokio::test]
    async fn test_conan_tool_requires_is_build() {
        let recipe = r#"
class X(ConanFile):
    tool_requires = "ninja/1.11.1", "cmake/3.25.0"

    def build_requirements(self):
        self.tool_requires("protobuf/3.21.12")
"#;
        let outcome = pipeline()
            .run(vec![conan("conanfile.py", recipe)])
            .await
            .unwrap();

        for name in ["ninja", "cmake", "protobuf"] {
            assert_eq!(scopes(find(&outcome, name)), vec![Scope::Build], "{name}");
        }
    }

    /// Full recipe: identity root, scopes and version resolution
    #[tokio::test]
    async fn test_conan_recipe() {
        let outcome = pipeline()
            .run(vec![conan("conanfile.py", RECIPE)])
            .await
            .unwrap();
        let graph = &outcome.graph;

        let app = find(&outcome, "app");
        let root = graph.root_of(Path::new("conanfile.py")).unwrap();
        assert_eq!(root.root.component_id(), Some(&app.id));

        let children: Vec<&str> = graph
            .children(&root.root)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(children, vec!["zlib", "openssl", "cmake", "gtest"]);

        assert_eq!(find(&outcome, "openssl").version, ComponentVersion::Unresolved);
        assert_eq!(scopes(find(&outcome, "gtest")), vec![Scope::Test]);
    }

    /// install_requires is runtime, tests_require is test, classifiers are ignored
    #[tokio::test]
    async fn test_setup_py_scopes() {
        let outcome = pipeline().run(vec![pip("setup.py", SETUP_PY)]).await.unwrap();

        assert_eq!(scopes(find(&outcome, "requests")), vec![Scope::Runtime]);
        assert_eq!(
            find(&outcome, "six").version,
            ComponentVersion::Exact("1.16.0".to_string())
        );
        assert_eq!(scopes(find(&outcome, "pytest")), vec![Scope::Test]);
        assert!(outcome
            .graph
            .components()
            .all(|c| !c.name.contains("Programming")));
        assert!(outcome.diagnostics.is_empty());
    }

    /// A non-string entry warns without dropping the valid entries
    #[tokio::test]
    async fn test_malformed_install_requires_entry() {
        let setup = r#"
setup(
    name="broken",
    install_requires=[123, "requests==2.31.0", "six"],
)
"#;
        let outcome = pipeline().run(vec![pip("setup.py", setup)]).await.unwrap();

        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(matches!(outcome.diagnostics[0], DetectionError::Parse { .. }));
        assert_eq!(outcome.diagnostics[0].path(), Path::new("setup.py"));

        let names: Vec<&str> = outcome
            .graph
            .components()
            .map(|c| c.name.as_str())
            .collect();
        assert!(names.contains(&"requests"));
        assert!(names.contains(&"six"));
    }
}

mod graph_properties {
    use super::*;

    fn sources() -> Vec<ManifestSource> {
        vec![
            conan("a/conanfile.py", RECIPE),
            conan("b/conanfile.txt", "[requires]\nZLIB/1.2.13\n\n[tool_requires]\ncmake/3.25.0\n"),
            pip("c/requirements.txt", "Requests>=2.28\nsix==1.16.0\n"),
            pip("d/setup.py", SETUP_PY),
        ]
    }

    /// Two runs over identical input yield identical graphs and reports
    #[tokio::test]
    async fn test_idempotent() {
        let first = pipeline().run(sources()).await.unwrap();
        let second = pipeline().run(sources()).await.unwrap();

        assert_eq!(snapshot(&first), snapshot(&second));
        assert_eq!(
            DetectionReport::from_outcome(&first),
            DetectionReport::from_outcome(&second)
        );
    }

    /// Merging in either order yields the same components and edges
    #[tokio::test]
    async fn test_merge_commutative() {
        let forward = pipeline().run(sources()).await.unwrap();
        let mut reversed_sources = sources();
        reversed_sources.reverse();
        let reversed = pipeline().run(reversed_sources).await.unwrap();

        assert_eq!(snapshot(&forward), snapshot(&reversed));
    }

    /// Collisions across files union scopes and keep the first-seen name
    #[tokio::test]
    async fn test_collision_unions_scopes() {
        let outcome = pipeline().run(sources()).await.unwrap();

        let zlib: Vec<&Component> = outcome
            .graph
            .components()
            .filter(|c| c.name.eq_ignore_ascii_case("zlib"))
            .collect();
        assert_eq!(zlib.len(), 1);
        assert_eq!(zlib[0].name, "zlib");
        assert_eq!(zlib[0].locations.len(), 2);

        let cmake = find(&outcome, "cmake");
        assert_eq!(scopes(cmake), vec![Scope::Build]);
        assert_eq!(cmake.locations.len(), 2);
    }

    /// A manifest declaring itself yields a cycle error and no self-edge
    #[tokio::test]
    async fn test_self_dependency_rejected() {
        let recipe = r#"
class Loop(ConanFile):
    name = "loop"
    version = "1.0"
    requires = "loop/1.0", "zlib/1.2.13"
"#;
        let outcome = pipeline()
            .run(vec![conan("conanfile.py", recipe)])
            .await
            .unwrap();

        let cycles: Vec<&DetectionError> = outcome
            .diagnostics
            .iter()
            .filter(|d| matches!(d, DetectionError::Cycle(_)))
            .collect();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].detail(), "loop@1.0 -> loop@1.0");

        let looped = find(&outcome, "loop");
        assert!(outcome
            .graph
            .edges()
            .iter()
            .all(|e| !(e.parent.component_id() == Some(&looped.id) && e.child == looped.id)));
        assert_eq!(outcome.graph.edges().len(), 1);
        assert!(outcome.graph.find_cycles().is_empty());
    }

    /// A ranged reference to the recipe's own package is still a self-dependency
    #[tokio::test]
    async fn test_self_dependency_through_range() {
        let recipe = r#"
class Loop(ConanFile):
    name = "loop"
    version = "1.0"
    requires = "loop/[>=1.0]"
"#;
        let outcome = pipeline()
            .run(vec![conan("conanfile.py", recipe)])
            .await
            .unwrap();

        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].kind(), "cycle_detected");
        assert_eq!(
            outcome.diagnostics[0].detail(),
            "loop@1.0 -> loop@unresolved -> loop@1.0"
        );
        assert_eq!(outcome.graph.len(), 1);
        assert!(outcome.graph.edges().is_empty());
    }

    /// A setup script without a version still owns its name
    #[tokio::test]
    async fn test_self_dependency_unversioned_setup() {
        let setup = "from setuptools import setup\nsetup(name='x', install_requires=['X==1.0', 'six'])\n";
        let outcome = pipeline()
            .run(vec![pip("setup.py", setup)])
            .await
            .unwrap();

        let cycles: Vec<&DetectionError> = outcome
            .diagnostics
            .iter()
            .filter(|d| matches!(d, DetectionError::Cycle(_)))
            .collect();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].detail(), "x@unresolved -> X@1.0 -> x@unresolved");

        let names: Vec<&str> = outcome.graph.components().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["x", "six"]);
        assert_eq!(outcome.graph.edges().len(), 1);
    }

    /// Lockfile edges between packages become component-to-component edges
    #[tokio::test]
    async fn test_lockfile_transitive_edges() {
        let lock = r#"{
  "version": "0.4",
  "graph_lock": {
    "nodes": {
      "0": {"ref": "app/1.0", "requires": ["1", "2"], "build_requires": ["3"]},
      "1": {"ref": "openssl/3.0.8#rev", "requires": ["2"]},
      "2": {"ref": "zlib/1.2.13"},
      "3": {"ref": "cmake/3.25.0"}
    }
  }
}"#;
        let outcome = pipeline()
            .run(vec![conan("conan.lock", lock)])
            .await
            .unwrap();
        assert!(outcome.diagnostics.is_empty());

        let openssl = find(&outcome, "openssl");
        let children: Vec<&str> = outcome
            .graph
            .children(&openssl.id.clone().into())
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(children, vec!["zlib"]);
        assert_eq!(scopes(find(&outcome, "cmake")), vec![Scope::Build]);
    }
}

mod pipeline_runs {
    use super::*;

    /// Detect from disk, including an unreadable manifest
    #[tokio::test]
    async fn test_detect_directory() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("conanfile.py"), RECIPE).unwrap();
        fs::write(temp_dir.path().join("requirements.txt"), "flask==3.0.0\n").unwrap();

        let outcome = pipeline().detect(temp_dir.path()).await.unwrap();
        assert_eq!(outcome.files, 2);
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(find(&outcome, "flask").version.as_str(), "3.0.0");
    }

    /// pip-compile output with hashes keeps its pins
    #[tokio::test]
    async fn test_hashed_requirements_stay_pinned() {
        let content = "\
requests==2.31.0 \\
    --hash=sha256:58cd2187c01e70e6e26505bca751777aa9f2ee0b7f4300988b709f44e013003f
    # via -r requirements.in
six==1.16.0 \\
    --hash=sha256:8abb2f1d86890a2dfb989f9a77cfcfd3e47c2a354b01111771326f8aa26e0254
";
        let outcome = pipeline()
            .run(vec![pip("requirements.txt", content)])
            .await
            .unwrap();
        assert!(outcome.diagnostics.is_empty());

        let requests = find(&outcome, "requests");
        assert_eq!(requests.version.as_str(), "2.31.0");
        assert_eq!(
            requests.constraints.iter().collect::<Vec<_>>(),
            vec!["==2.31.0"]
        );
        assert_eq!(find(&outcome, "six").version.as_str(), "1.16.0");
        assert_eq!(outcome.graph.len(), 2);
    }

    /// A file that disappears is reported and its siblings are kept
    #[tokio::test]
    async fn test_missing_file_reported() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("requirements.txt"), "flask==3.0.0\n").unwrap();
        let config = DetectionConfig::default();
        let mut manifests =
            detect_manifests(temp_dir.path(), &config.ecosystems, &config.exclude_dirs);
        let ghost = compdetect::manifest::ManifestInfo::from_path(temp_dir.path().join("setup.py"))
            .unwrap();
        manifests.push(ghost);

        let outcome = pipeline().scan(manifests).await.unwrap();
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(matches!(outcome.diagnostics[0], DetectionError::FileRead(_)));
        assert_eq!(outcome.graph.len(), 1);
    }

    /// Configuration ignore list drops packaging tools
    #[tokio::test]
    async fn test_ignored_pip_packages() {
        let outcome = pipeline()
            .run(vec![pip(
                "requirements.txt",
                "setuptools>=65\nwheel\nrequests==2.31.0\n",
            )])
            .await
            .unwrap();
        let names: Vec<&str> = outcome
            .graph
            .components()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["requests"]);
    }

    /// The JSON report carries components, edges, manifests and diagnostics
    #[tokio::test]
    async fn test_json_report() {
        let outcome = pipeline()
            .run(vec![
                conan("conanfile.txt", "[requires]\nzlib/1.2.13\n"),
                pip("setup.py", "setup(install_requires=[123])\n"),
            ])
            .await
            .unwrap();
        let report = DetectionReport::from_outcome(&outcome);
        let emitter = create_emitter(OutputConfig::new(OutputFormat::Json, Verbosity::Normal));
        let json: serde_json::Value = serde_json::from_str(&emitter.render(&report).unwrap()).unwrap();

        assert_eq!(json["components"].as_array().unwrap().len(), 1);
        assert_eq!(json["edges"][0]["parent"], "root:conanfile.txt");
        assert_eq!(json["manifests"].as_array().unwrap().len(), 2);
        assert_eq!(json["diagnostics"][0]["kind"], "parse_warning");
        assert_eq!(json["summary"]["manifests"], 2);
    }
}
