use std::collections::VecDeque;
use std::path::PathBuf;

/// Source of the folders to audit.
///
/// Implementations may show a dialog, read a prompt or return preset paths.
/// `None` means the operator cancelled the selection.
pub trait FolderPicker {
    fn pick_folder(&mut self, prompt: &str) -> Option<PathBuf>;
}

/// Picker that hands out a fixed list of folders in order, then cancels
#[derive(Debug, Default)]
pub struct PresetFolders {
    folders: VecDeque<PathBuf>,
}

impl PresetFolders {
    pub fn new(folders: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            folders: folders.into_iter().collect(),
        }
    }
}

impl FolderPicker for PresetFolders {
    fn pick_folder(&mut self, _prompt: &str) -> Option<PathBuf> {
        self.folders.pop_front()
    }
}
