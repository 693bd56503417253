//! Browser-side types shared by the components.

use leadform::AttachedFile;
use web_sys::{File, FileList};

/// A file staged for upload, carrying the browser's `File` handle.
pub type StagedFile = AttachedFile<File>;

/// Wrap a browser `File` for the staging model.
pub fn staged_file(file: File) -> StagedFile {
    let name = file.name();
    let size = file.size() as u64;
    let media_type = file.type_();
    AttachedFile::new(name, size, media_type, file)
}

/// Every file in a `FileList`, in order.
pub fn staged_files(list: &FileList) -> Vec<StagedFile> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(staged_file)
        .collect()
}

/// DOM id of the element that carries a field's error indicator.
pub fn field_dom_id(name: &str) -> String {
    format!("field-{}", name)
}

/// `For` key of a staged file.
pub fn file_key(file: &StagedFile) -> String {
    format!("{}:{}", file.name, file.size)
}
