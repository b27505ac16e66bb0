//! Modal file chooser restricted to one MIME category.
//!
//! The chooser walks one directory at a time: sub-directories (plus `..`) are
//! always listed so the user can navigate, files only when their guessed MIME
//! type belongs to the requested category. Typing narrows the listing with
//! fuzzy matching, best match first.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use media_deck::media::MimeCategory;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct ChooserEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

#[derive(Debug, PartialEq)]
pub enum ChooserOutcome {
    Navigated,
    Picked(PathBuf),
    Nothing,
}

pub struct FileChooser {
    pub category: MimeCategory,
    pub current_dir: PathBuf,
    pub entries: Vec<ChooserEntry>,
    pub filtered: Vec<usize>,
    pub selected: usize,
    pub query: String,
    show_hidden: bool,
    matcher: SkimMatcherV2,
}

impl FileChooser {
    pub fn new(
        category: MimeCategory,
        start_dir: &Path,
        show_hidden: bool,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let current_dir = fs::canonicalize(start_dir)?;
        let mut chooser = Self {
            category,
            current_dir,
            entries: Vec::new(),
            filtered: Vec::new(),
            selected: 0,
            query: String::new(),
            show_hidden,
            matcher: SkimMatcherV2::default(),
        };
        chooser.refresh()?;
        Ok(chooser)
    }

    pub fn refresh(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.entries.clear();

        if let Some(parent) = self.current_dir.parent() {
            self.entries.push(ChooserEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                is_dir: true,
            });
        }

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.current_dir)?.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            if !self.show_hidden && name.starts_with('.') {
                continue;
            }

            if path.is_dir() {
                dirs.push(ChooserEntry {
                    name,
                    path,
                    is_dir: true,
                });
            } else if path.is_file() && self.category.matches(&path) {
                files.push(ChooserEntry {
                    name,
                    path,
                    is_dir: false,
                });
            }
        }

        dirs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        self.entries.extend(dirs);
        self.entries.extend(files);

        log::debug!(
            "Chooser listing {:?}: {} entries for {}",
            self.current_dir,
            self.entries.len(),
            self.category
        );

        self.filter_entries();
        Ok(())
    }

    fn filter_entries(&mut self) {
        if self.query.is_empty() {
            self.filtered = (0..self.entries.len()).collect();
        } else {
            let mut scored: Vec<(usize, i64)> = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, entry)| entry.name != "..")
                .filter_map(|(idx, entry)| {
                    self.matcher
                        .fuzzy_match(&entry.name, &self.query)
                        .map(|score| (idx, score))
                })
                .collect();

            // Stable sort keeps directory-first ordering among equal scores
            scored.sort_by(|a, b| b.1.cmp(&a.1));
            self.filtered = scored.into_iter().map(|(idx, _)| idx).collect();
        }

        if self.selected >= self.filtered.len() {
            self.selected = 0;
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.filter_entries();
    }

    /// Delete a filter character, or go up a directory when the filter is empty.
    pub fn backspace(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.query.pop().is_some() {
            self.filter_entries();
            Ok(())
        } else {
            self.go_to_parent()
        }
    }

    pub fn go_to_parent(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = self.current_dir.parent() {
            let parent = parent.to_path_buf();
            self.change_dir(parent)?;
        }
        Ok(())
    }

    fn change_dir(&mut self, dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
        let previous = std::mem::replace(&mut self.current_dir, dir);
        self.query.clear();
        self.selected = 0;
        if let Err(e) = self.refresh() {
            log::warn!("Could not open {:?}: {e}", self.current_dir);
            self.current_dir = previous;
            self.refresh()?;
            return Err(e);
        }
        Ok(())
    }

    pub fn select_next(&mut self) {
        if !self.filtered.is_empty() {
            self.selected = (self.selected + 1) % self.filtered.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.filtered.is_empty() {
            if self.selected == 0 {
                self.selected = self.filtered.len() - 1;
            } else {
                self.selected -= 1;
            }
        }
    }

    pub fn selected_entry(&self) -> Option<&ChooserEntry> {
        self.filtered
            .get(self.selected)
            .and_then(|idx| self.entries.get(*idx))
    }

    pub fn visible_entries(&self) -> Vec<&ChooserEntry> {
        self.filtered
            .iter()
            .filter_map(|idx| self.entries.get(*idx))
            .collect()
    }

    /// Enter the selected directory or pick the selected file.
    pub fn activate(&mut self) -> Result<ChooserOutcome, Box<dyn std::error::Error>> {
        let Some(entry) = self.selected_entry().cloned() else {
            return Ok(ChooserOutcome::Nothing);
        };

        if entry.is_dir {
            self.change_dir(entry.path)?;
            Ok(ChooserOutcome::Navigated)
        } else {
            Ok(ChooserOutcome::Picked(entry.path))
        }
    }
}
