use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    Laravel,
    Flutter,
    Node,
    Go,
}

impl ProjectType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Laravel => "Laravel",
            Self::Flutter => "Flutter",
            Self::Node => "Node.js",
            Self::Go => "Go",
        }
    }
}

fn file_exists(base: &Path, name: &str) -> bool {
    base.join(name).exists()
}

fn composer_has_dep(base: &Path, dep: &str) -> bool {
    let composer_path = base.join("composer.json");
    if !composer_path.exists() {
        return false;
    }

    std::fs::read_to_string(&composer_path)
        .map(|content| {
            serde_json::from_str::<serde_json::Value>(&content)
                .map(|json| {
                    json.get("require").and_then(|d| d.get(dep)).is_some()
                        || json.get("require-dev").and_then(|d| d.get(dep)).is_some()
                })
                .unwrap_or(false)
        })
        .unwrap_or(false)
}

/// Detect project type from files in the given path
/// Detection priority: more specific types first
pub fn detect_project_type(path: &Path) -> Option<ProjectType> {
    // Laravel: artisan or laravel/framework in composer.json
    if file_exists(path, "artisan") || composer_has_dep(path, "laravel/framework") {
        return Some(ProjectType::Laravel);
    }

    // Flutter: pubspec.yaml
    if file_exists(path, "pubspec.yaml") {
        return Some(ProjectType::Flutter);
    }

    // Go: go.mod
    if file_exists(path, "go.mod") {
        return Some(ProjectType::Go);
    }

    // Node: package.json (a Laravel app also has one, checked above)
    if file_exists(path, "package.json") {
        return Some(ProjectType::Node);
    }

    None
}
