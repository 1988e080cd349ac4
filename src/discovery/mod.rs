mod file_finder;

pub use file_finder::{
    find_packages, layout_files, read_dirlist, write_dirlist, AppPackage, FileFinder, ResourceDir,
};
