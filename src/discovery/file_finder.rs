use crate::config::Config;
use ignore::WalkBuilder;
use miette::{IntoDiagnostic, Result, WrapErr};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

/// Kind of Android resource directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceDir {
    Layout,
    Values,
}

impl ResourceDir {
    /// Classify `.../res/layout` and `.../res/values`; qualified variants
    /// such as `layout-land` are not matched
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let parent = path.parent()?.file_name()?.to_str()?;
        if parent != "res" {
            return None;
        }

        match name {
            "layout" => Some(ResourceDir::Layout),
            "values" => Some(ResourceDir::Values),
            _ => None,
        }
    }
}

/// Resource directories of one application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppPackage {
    pub layout_dirs: Vec<PathBuf>,
    pub values_dirs: Vec<PathBuf>,
}

impl AppPackage {
    pub fn new(layout_dirs: Vec<PathBuf>, values_dirs: Vec<PathBuf>) -> Self {
        Self {
            layout_dirs,
            values_dirs,
        }
    }

    /// A package given directly by its layout directory
    pub fn from_dirs(layout_dir: impl Into<PathBuf>, values_dir: Option<PathBuf>) -> Self {
        Self::new(vec![layout_dir.into()], values_dir.into_iter().collect())
    }

    /// Where the package is reported from: its first layout directory
    pub fn location(&self) -> Option<&Path> {
        self.layout_dirs.first().map(PathBuf::as_path)
    }

    pub fn has_layouts(&self) -> bool {
        !self.layout_dirs.is_empty()
    }
}

/// Finds application packages in a repository
pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Each direct child directory of `repo` is one application
    pub fn find_packages(&self, repo: &Path) -> Result<Vec<AppPackage>> {
        debug!("Finding applications in {}", repo.display());

        let mut apps: Vec<PathBuf> = std::fs::read_dir(repo)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read repository: {}", repo.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter(|path| {
                let excluded = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| self.config.is_excluded_dir(name));
                !excluded
            })
            .collect();
        apps.sort();

        debug!("Found {} applications", apps.len());

        let packages: Vec<AppPackage> = apps.par_iter().map(|app| self.scan_app(app)).collect();

        Ok(packages)
    }

    /// Collect the `res/layout` and `res/values` directories below `app`
    fn scan_app(&self, app: &Path) -> AppPackage {
        let excluded = self.config.exclude_dirs.clone();

        let walker = WalkBuilder::new(app)
            .hidden(true)           // Skip hidden directories
            .git_ignore(false)      // Layouts may be ignored build inputs
            .parents(false)
            .follow_links(false)    // Don't follow symlinks
            .filter_entry(move |entry| {
                entry
                    .file_name()
                    .to_str()
                    .map_or(true, |name| !excluded.iter().any(|e| e == name))
            })
            .build();

        let mut package = AppPackage::default();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Broken app {}: {}", app.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_dir()) {
                continue;
            }

            match ResourceDir::from_path(entry.path()) {
                Some(ResourceDir::Layout) => package.layout_dirs.push(entry.into_path()),
                Some(ResourceDir::Values) => package.values_dirs.push(entry.into_path()),
                None => {}
            }
        }

        package.layout_dirs.sort();
        package.values_dirs.sort();
        trace!(
            "{}: {} layout dirs, {} values dirs",
            app.display(),
            package.layout_dirs.len(),
            package.values_dirs.len()
        );

        package
    }
}

/// Find application packages in `repo`
pub fn find_packages(repo: &Path, config: &Config) -> Result<Vec<AppPackage>> {
    FileFinder::new(config).find_packages(repo)
}

/// Regular files directly inside a layout directory, sorted by name
pub fn layout_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to list layouts in {}", dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Read a package list written by [`write_dirlist`]
pub fn read_dirlist(path: &Path) -> Result<Vec<AppPackage>> {
    let contents = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read directory list: {}", path.display()))?;
    serde_json::from_str(&contents)
        .into_diagnostic()
        .wrap_err("Failed to parse directory list")
}

pub fn write_dirlist(path: &Path, packages: &[AppPackage]) -> Result<()> {
    let json = serde_json::to_string_pretty(packages)
        .into_diagnostic()
        .wrap_err("Failed to serialize directory list")?;
    std::fs::write(path, json)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write directory list: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn mkdirs(root: &Path, dirs: &[&str]) {
        for dir in dirs {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
    }

    #[test]
    fn test_resource_dir_from_path() {
        assert_eq!(
            ResourceDir::from_path(Path::new("app/src/main/res/layout")),
            Some(ResourceDir::Layout)
        );
        assert_eq!(
            ResourceDir::from_path(Path::new("app/res/values")),
            Some(ResourceDir::Values)
        );
        assert_eq!(ResourceDir::from_path(Path::new("app/res/layout-land")), None);
        assert_eq!(ResourceDir::from_path(Path::new("app/layout")), None);
    }

    #[test]
    fn test_find_packages() {
        let repo = TempDir::new().unwrap();
        mkdirs(
            repo.path(),
            &[
                "alpha/res/layout",
                "alpha/res/values",
                "alpha/lib/res/layout",
                "alpha/.hg/store/res/layout",
                "alpha/build/res/layout",
                "beta/src/main/res/values",
            ],
        );
        fs::write(repo.path().join("README"), "not an app").unwrap();

        let packages = find_packages(repo.path(), &Config::default()).unwrap();
        assert_eq!(packages.len(), 2);

        let alpha = &packages[0];
        assert_eq!(alpha.layout_dirs.len(), 2);
        assert!(alpha.layout_dirs.iter().all(|d| !d.to_string_lossy().contains(".hg")));
        assert!(alpha.layout_dirs.iter().all(|d| !d.to_string_lossy().contains("build")));
        assert_eq!(alpha.values_dirs.len(), 1);

        let beta = &packages[1];
        assert!(!beta.has_layouts());
        assert_eq!(beta.values_dirs.len(), 1);
    }

    #[test]
    fn test_layout_files_skip_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.xml"), "<b/>").unwrap();
        fs::write(dir.path().join("a.xml"), "<a/>").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let files = layout_files(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.file_name().unwrap().to_owned()).collect();
        assert_eq!(names, vec!["a.xml", "b.xml"]);
    }

    #[test]
    fn test_dirlist_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dirs.json");
        let packages = vec![AppPackage::from_dirs("app/res/layout", Some(PathBuf::from("app/res/values")))];

        write_dirlist(&path, &packages).unwrap();
        assert_eq!(read_dirlist(&path).unwrap(), packages);
        assert_eq!(packages[0].location(), Some(Path::new("app/res/layout")));
    }
}
