use crate::fs::FileSystem;
use std::path::Path;

/// Project layouts whose build and dependency directories hold copies of
/// translation files that must never be treated as sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    Node,
    Ruby,
    Python,
    Rust,
    Go,
    Php,
    Generic,
}

/// Version control and editor state, skipped in every project
const ALWAYS_EXCLUDED: &[&str] = &[".git", ".svn", ".hg", ".idea", ".vscode", ".DS_Store"];

impl ProjectType {
    /// Manifest files identifying the layout, checked in declaration order
    const MARKERS: &'static [(&'static str, ProjectType)] = &[
        ("package.json", ProjectType::Node),
        ("Gemfile", ProjectType::Ruby),
        ("requirements.txt", ProjectType::Python),
        ("pyproject.toml", ProjectType::Python),
        ("setup.py", ProjectType::Python),
        ("Cargo.toml", ProjectType::Rust),
        ("go.mod", ProjectType::Go),
        ("composer.json", ProjectType::Php),
    ];

    /// Directories where installed packages or compiled bundles ship their
    /// own locale files
    fn generated_dirs(self) -> &'static [&'static str] {
        match self {
            ProjectType::Node => &["node_modules", "dist", "build", "coverage", ".next", ".nuxt", ".output"],
            ProjectType::Ruby => &["vendor", ".bundle", "log", "tmp", "coverage", "public/packs"],
            ProjectType::Python => &[
                "venv",
                ".venv",
                "env",
                "site-packages",
                "__pycache__",
                "*.egg-info",
                ".tox",
            ],
            ProjectType::Rust => &["target"],
            ProjectType::Go | ProjectType::Php => &["vendor"],
            ProjectType::Generic => &["node_modules", "vendor", "dist", "build", "target"],
        }
    }
}

pub fn detect_project_type(fs: &dyn FileSystem, base_dir: &Path) -> ProjectType {
    ProjectType::MARKERS
        .iter()
        .find(|(marker, _)| fs.exists(&base_dir.join(marker)))
        .map(|(_, project_type)| *project_type)
        .unwrap_or(ProjectType::Generic)
}

/// Directory and file names never scanned for translation files
pub fn get_default_exclusions(project_type: ProjectType) -> Vec<&'static str> {
    ALWAYS_EXCLUDED
        .iter()
        .chain(project_type.generated_dirs())
        .copied()
        .collect()
}

/// Exclusions as gitignore-style globs, matching the name itself and
/// anything below it
pub fn exclusion_globs(project_type: ProjectType) -> Vec<String> {
    get_default_exclusions(project_type)
        .into_iter()
        .flat_map(|name| [format!("**/{}", name), format!("**/{}/**", name)])
        .collect()
}
