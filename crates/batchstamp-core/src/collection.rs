//! The ordered, size-capped collection of selected files.
//!
//! Entries are identified purely by position. All mutations are
//! all-or-nothing: a rejected operation leaves the collection exactly as
//! it was.

use crate::types::{BatchError, SelectedFile};

/// Maximum number of images a batch may hold.
pub const MAX_FILES: usize = 25;

/// Ordered sequence of selected files, at most [`MAX_FILES`] long.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileCollection {
    files: Vec<SelectedFile>,
}

impl FileCollection {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Number of files currently held.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no files are held.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// How many more files may be added.
    #[must_use]
    pub const fn remaining_capacity(&self) -> usize {
        MAX_FILES.saturating_sub(self.files.len())
    }

    /// The file at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SelectedFile> {
        self.files.get(index)
    }

    /// All files in order.
    #[must_use]
    pub fn as_slice(&self) -> &[SelectedFile] {
        &self.files
    }

    /// Iterate over the files in order.
    pub fn iter(&self) -> std::slice::Iter<'_, SelectedFile> {
        self.files.iter()
    }

    /// Append `new_files` in order.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::CapacityExceeded`] without adding anything
    /// if the result would hold more than [`MAX_FILES`] files.
    pub fn add(&mut self, new_files: Vec<SelectedFile>) -> Result<(), BatchError> {
        let current = self.files.len();
        let adding = new_files.len();
        if current + adding > MAX_FILES {
            return Err(BatchError::CapacityExceeded {
                current,
                adding,
                max: MAX_FILES,
            });
        }
        self.files.extend(new_files);
        Ok(())
    }

    /// Remove every file for which `flagged(index, file)` returns `true`.
    ///
    /// Survivors keep their relative order. Returns the number of files
    /// removed.
    pub fn remove_where(&mut self, mut flagged: impl FnMut(usize, &SelectedFile) -> bool) -> usize {
        let before = self.files.len();
        let files = std::mem::take(&mut self.files);
        self.files = files
            .into_iter()
            .enumerate()
            .filter(|(i, file)| !flagged(*i, file))
            .map(|(_, file)| file)
            .collect();
        before - self.files.len()
    }

    /// Replace the file at `index`, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::ResourceState`] if `index` is out of bounds;
    /// the collection is left untouched.
    pub fn replace_at(
        &mut self,
        index: usize,
        file: SelectedFile,
    ) -> Result<SelectedFile, BatchError> {
        let len = self.files.len();
        let slot = self
            .files
            .get_mut(index)
            .ok_or_else(|| BatchError::out_of_bounds(index, len))?;
        Ok(std::mem::replace(slot, file))
    }
}

impl<'a> IntoIterator for &'a FileCollection {
    type Item = &'a SelectedFile;
    type IntoIter = std::slice::Iter<'a, SelectedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn file(name: &str) -> SelectedFile {
        SelectedFile::new(name, "image/jpeg", 0, name.as_bytes().to_vec())
    }

    fn files(prefix: &str, count: usize) -> Vec<SelectedFile> {
        (0..count).map(|i| file(&format!("{prefix}{i}.jpg"))).collect()
    }

    fn names(collection: &FileCollection) -> Vec<&str> {
        collection.iter().map(SelectedFile::name).collect()
    }

    #[test]
    fn add_appends_in_order() {
        let mut collection = FileCollection::new();
        collection.add(files("a", 2)).unwrap();
        collection.add(files("b", 1)).unwrap();
        assert_eq!(names(&collection), ["a0.jpg", "a1.jpg", "b0.jpg"]);
    }

    #[test]
    fn add_up_to_limit_succeeds() {
        let mut collection = FileCollection::new();
        collection.add(files("x", MAX_FILES)).unwrap();
        assert_eq!(collection.len(), MAX_FILES);
        assert_eq!(collection.remaining_capacity(), 0);
    }

    #[test]
    fn add_past_limit_is_rejected_without_mutation() {
        let mut collection = FileCollection::new();
        collection.add(files("a", 20)).unwrap();
        let before = collection.clone();

        let err = collection.add(files("b", 6)).unwrap_err();
        assert_eq!(
            err,
            BatchError::CapacityExceeded {
                current: 20,
                adding: 6,
                max: MAX_FILES,
            }
        );
        assert_eq!(collection, before);
    }

    #[test]
    fn length_never_exceeds_limit_across_adds() {
        let mut collection = FileCollection::new();
        for batch in [3, 7, 9, 4, 8, 1, 2, 5] {
            let _ = collection.add(files("f", batch));
            assert!(collection.len() <= MAX_FILES);
        }
        // 3 + 7 + 9 + 4 + 1 = 24; the batches of 8, 2 and 5 are rejected.
        assert_eq!(collection.len(), 24);
    }

    #[test]
    fn remove_where_preserves_survivor_order() {
        let mut collection = FileCollection::new();
        collection.add(files("f", 6)).unwrap();

        let removed = collection.remove_where(|i, _| i % 2 == 1);
        assert_eq!(removed, 3);
        assert_eq!(names(&collection), ["f0.jpg", "f2.jpg", "f4.jpg"]);
    }

    #[test]
    fn remove_where_everything_empties_collection() {
        let mut collection = FileCollection::new();
        collection.add(files("f", 3)).unwrap();
        assert_eq!(collection.remove_where(|_, _| true), 3);
        assert!(collection.is_empty());
    }

    #[test]
    fn remove_where_nothing_is_identity() {
        let mut collection = FileCollection::new();
        collection.add(files("f", 3)).unwrap();
        let before = collection.clone();
        assert_eq!(collection.remove_where(|_, _| false), 0);
        assert_eq!(collection, before);
    }

    #[test]
    fn replace_at_only_touches_target_index() {
        let mut collection = FileCollection::new();
        collection.add(files("f", 4)).unwrap();
        let before = collection.clone();

        let old = collection.replace_at(2, file("cropped.jpg")).unwrap();
        assert_eq!(old.name(), "f2.jpg");
        assert_eq!(collection.get(2).unwrap().name(), "cropped.jpg");
        for i in [0, 1, 3] {
            assert_eq!(collection.get(i), before.get(i));
        }
    }

    #[test]
    fn replace_at_out_of_bounds_fails_cleanly() {
        let mut collection = FileCollection::new();
        collection.add(files("f", 2)).unwrap();
        let before = collection.clone();

        let err = collection.replace_at(2, file("late.jpg")).unwrap_err();
        assert!(matches!(err, BatchError::ResourceState(_)));
        assert_eq!(collection, before);
    }
}
