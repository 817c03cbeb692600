//! Directory purpose inference from conventional names.

/// Known directory names and the one-line purpose shown in reports.
const PURPOSE_MAP: &[(&str, &str)] = &[
    ("src", "Source code"),
    ("lib", "Library code"),
    ("app", "Application code"),
    ("api", "API endpoints and handlers"),
    ("server", "Server-side code"),
    ("client", "Client-side code"),
    ("components", "UI components"),
    ("pages", "Page components and routes"),
    ("routes", "Route definitions"),
    ("views", "View templates"),
    ("models", "Data models"),
    ("controllers", "Request controllers"),
    ("services", "Business logic services"),
    ("handlers", "Request and event handlers"),
    ("middleware", "Middleware functions"),
    ("utils", "Utility functions"),
    ("helpers", "Helper functions"),
    ("common", "Shared code"),
    ("shared", "Shared code"),
    ("core", "Core functionality"),
    ("config", "Configuration files"),
    ("scripts", "Build and maintenance scripts"),
    ("tools", "Development tools"),
    ("bin", "Executable entry points"),
    ("cmd", "Command-line entry points"),
    ("internal", "Internal packages"),
    ("pkg", "Public packages"),
    ("tests", "Test suites"),
    ("test", "Test suites"),
    ("spec", "Test specifications"),
    ("docs", "Documentation"),
    ("examples", "Usage examples"),
    ("assets", "Static assets"),
    ("static", "Static files"),
    ("public", "Publicly served files"),
    ("styles", "Stylesheets"),
    ("types", "Type definitions"),
    ("schemas", "Data schemas"),
    ("migrations", "Database migrations"),
    ("hooks", "Hook functions"),
    ("store", "State management"),
    ("db", "Database access"),
    ("auth", "Authentication and authorization"),
];

/// Best-effort one-line description of what a directory holds.
///
/// The last path segment is matched against conventional names first; when
/// that fails, the verdict falls back to what the contained file names
/// suggest, and finally to a generic label.
pub fn infer(rel_dir: &str, file_names: &[String]) -> String {
    let leaf = rel_dir
        .rsplit('/')
        .next()
        .unwrap_or(rel_dir)
        .to_lowercase();

    if let Some((_, purpose)) = PURPOSE_MAP.iter().find(|(name, _)| *name == leaf) {
        return (*purpose).to_string();
    }

    let lower: Vec<String> = file_names.iter().map(|f| f.to_lowercase()).collect();
    if lower.iter().any(|f| f.contains("test") || f.contains("spec")) {
        return "Test suites".to_string();
    }
    if lower.iter().any(|f| f == "index.ts" || f == "index.js" || f == "mod.rs" || f == "__init__.py") {
        return "Module directory".to_string();
    }

    "Project files".to_string()
}
