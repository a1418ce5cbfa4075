//! The interactive editor application.
//!
//! Owns the pieces the original tool kept in module globals: the loaded
//! suggestion list, the persisted config and the viewer process handle.
//! Each flow is a loop over menu selections; cancelling any prompt
//! unwinds to the enclosing menu without committing the in-progress
//! edit.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{drop_dir, suggestion_file, EditorConfig};
use crate::convert;
use crate::error::Result;
use crate::metadata::MetadataFile;
use crate::preview::PreviewHandle;
use crate::scan::{self, FileKind};
use crate::search::{self, ExportMode};
use crate::suggest::Suggestions;
use crate::tags;
use crate::ui;

pub struct App {
    config: EditorConfig,
    suggestions: Suggestions,
    preview: PreviewHandle,
}

impl App {
    pub fn new() -> Result<Self> {
        let mut suggestions = Suggestions::new(suggestion_file()?);
        if let Err(e) = suggestions.load() {
            warn!("suggestions failed to load at startup: {e}");
        }
        Ok(App {
            config: EditorConfig::load(),
            suggestions,
            preview: PreviewHandle::new(drop_dir()?),
        })
    }

    /// Main menu loop. Returns when the user picks Exit.
    pub fn run(&mut self) -> Result<()> {
        let mut last_choice: Option<usize> = None;
        loop {
            ui::clear_and_header(None)?;
            let items = vec![
                format!(
                    "View/Edit Suggestions ({} currently loaded)",
                    self.suggestions.len()
                ),
                "Edit Titles And Subjects".to_string(),
                "Search Titles And Subjects".to_string(),
                "Exit".to_string(),
            ];
            let choice = ui::select(
                "Make a selection with the arrow keys and press Enter",
                &items,
                last_choice.or(Some(items.len() - 1)),
            )?;
            if let Some(choice) = choice {
                last_choice = Some(choice);
            }

            match choice {
                Some(0) => self.edit_suggestions()?,
                Some(1) => self.edit_flow()?,
                Some(2) => self.search_flow()?,
                Some(3) => break,
                // Cancelling redisplays the menu; Exit is explicit
                None => continue,
                _ => unreachable!(),
            }
        }
        Ok(())
    }

    /// Open the suggestion file in the system editor and reload it.
    fn edit_suggestions(&mut self) -> Result<()> {
        ui::clear_and_header(Some("Edit Suggestions"))?;
        println!("The suggestion file will open in another window.");
        println!(
            "Any line which is blank or starts with \"{}\" is ignored.",
            crate::suggest::COMMENT_CHAR
        );
        println!(
            "Make sure no suggestion contains the character \"{}\".",
            tags::TAG_DELIMITER
        );

        if let Err(e) = open::that(self.suggestions.path()) {
            println!("\nCould not open the file: {e}");
            println!("Edit it manually at {}", self.suggestions.path().display());
        }
        ui::pause("Save and close the file, then press Enter to reload.")?;

        match self.suggestions.load() {
            Ok(count) => println!("\n{count} suggestions successfully loaded."),
            Err(e) => println!("\nAn error prevented the suggestions from loading: {e}"),
        }
        ui::pause("Press Enter to return to the main menu.")?;
        Ok(())
    }

    /// Browse a directory and edit titles/subjects file by file.
    fn edit_flow(&mut self) -> Result<()> {
        ui::clear_and_header(Some("Edit Titles And Subjects"))?;
        let Some(dir) = self.prompt_directory("Directory containing images (may drag/drop)")?
        else {
            return Ok(());
        };

        println!("Enumerating...");
        let outcome = scan::scan(&dir, false);
        info!(
            files = outcome.files.len(),
            bytes = outcome.total_bytes,
            "enumeration finished"
        );
        if outcome.files.is_empty() {
            ui::pause("No images found. Press Enter for Main Menu.")?;
            return Ok(());
        }

        let result = self.browse_files(outcome.files);
        self.preview.close();
        result
    }

    fn browse_files(&mut self, mut files: Vec<scan::Candidate>) -> Result<()> {
        let mut idx: usize = 0;
        let mut last_choice: Option<usize> = None;
        let mut record: Option<MetadataFile> = None;

        loop {
            if files.is_empty() {
                ui::pause("No images left to edit. Press Enter for Main Menu.")?;
                return Ok(());
            }
            idx = idx.min(files.len() - 1);
            let path = files[idx].path.clone();

            // Files that stopped decoding since the scan drop out
            if files[idx].kind == FileKind::Editable && !scan::is_image(&path) {
                files.remove(idx);
                continue;
            }

            ui::clear_and_header(Some("Edit Titles And Subjects"))?;
            print_file_info(&path, idx, files.len())?;

            match files[idx].kind {
                FileKind::NeedsConversion => {
                    if let Some(open_record) = record.take() {
                        save_record(open_record)?;
                    }
                    self.show_preview(&path);

                    let items = vec![
                        "Next".to_string(),
                        "Previous".to_string(),
                        "Create Compatible Version".to_string(),
                        "Main Menu".to_string(),
                    ];
                    let choice = ui::select("Make a selection", &items, last_choice)?;
                    last_choice = choice;
                    match choice {
                        Some(0) => idx = idx.saturating_add(1).min(files.len() - 1),
                        Some(1) => idx = idx.saturating_sub(1),
                        Some(2) => {
                            if let Some(converted) = self.convert_file(&path)? {
                                files[idx] = scan::Candidate {
                                    path: converted,
                                    kind: FileKind::Editable,
                                };
                            }
                        }
                        _ => return Ok(()),
                    }
                }

                FileKind::Editable => {
                    if record.is_none() {
                        record = Some(MetadataFile::open(&path)?);
                        self.show_preview(&path);
                    }
                    let open_record = record.as_mut().expect("record was just opened");

                    println!("Title: {}", open_record.title());
                    let joined = open_record.tags().iter().collect::<Vec<_>>().join("\n      ");
                    println!("Subjects: {joined}\n");

                    let items = vec![
                        "Next".to_string(),
                        "Previous".to_string(),
                        "Edit Title".to_string(),
                        "Add Subject".to_string(),
                        "Remove Subject".to_string(),
                        "Main Menu".to_string(),
                    ];
                    let choice = ui::select("Make a selection", &items, last_choice)?;
                    last_choice = choice;
                    match choice {
                        Some(0) => {
                            save_record(record.take().expect("open record"))?;
                            idx = idx.saturating_add(1).min(files.len() - 1);
                        }
                        Some(1) => {
                            save_record(record.take().expect("open record"))?;
                            idx = idx.saturating_sub(1);
                        }
                        Some(2) => edit_title(open_record)?,
                        Some(3) => add_subject(open_record, &self.suggestions)?,
                        Some(4) => remove_subject(open_record)?,
                        _ => {
                            save_record(record.take().expect("open record"))?;
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Offer the conversion, confirming before an overwrite.
    /// Returns the converted path, or `None` if the user backed out.
    fn convert_file(&mut self, path: &Path) -> Result<Option<PathBuf>> {
        let target = convert::conversion_target(path);
        if target.exists() {
            let question = format!(
                "This will overwrite {} with data from {}. Continue?",
                file_name(&target),
                file_name(path)
            );
            let items = vec!["Yes".to_string(), "No".to_string()];
            match ui::select(&question, &items, Some(0))? {
                Some(0) => {}
                _ => return Ok(None),
            }
        }

        match convert::convert_to_jpeg(path) {
            Ok(converted) => {
                info!(source = %path.display(), target = %converted.display(), "converted to JPEG");
                Ok(Some(converted))
            }
            Err(e) => {
                println!("Conversion failed: {e}");
                ui::pause("Press Enter to continue.")?;
                Ok(None)
            }
        }
    }

    /// Keyword search plus export of the matches.
    fn search_flow(&mut self) -> Result<()> {
        ui::clear_and_header(Some("Search Titles And Subjects"))?;
        let Some(dir) = self.prompt_directory("Directory to search (may drag/drop)")? else {
            return Ok(());
        };

        let Some(keywords) = self.collect_keywords()? else {
            return Ok(());
        };

        ui::clear_and_header(Some("Search Titles And Subjects"))?;
        println!("Enumerating...");
        let paths: Vec<PathBuf> = scan::scan(&dir, true)
            .files
            .into_iter()
            .map(|c| c.path)
            .collect();

        println!("Searching {} files...", paths.len());
        let matches = search::matching_files(&paths, &keywords);
        let total = search::total_size(&matches);

        ui::clear_and_header(Some("Search Titles And Subjects"))?;
        println!("{} files found.\n", matches.len());
        if matches.is_empty() {
            ui::pause("Press Enter to return to the main menu.")?;
            return Ok(());
        }

        let Some(target) =
            self.prompt_empty_directory("Empty folder where results should be placed")?
        else {
            return Ok(());
        };

        let items = vec![
            "Copies (easier to access)".to_string(),
            "Links (smaller, point back at the originals)".to_string(),
        ];
        println!("\nTotal size as copies: {:.3} MB", total as f64 / (1 << 20) as f64);
        let mode = match ui::select("Choose output mode", &items, Some(0))? {
            Some(0) => ExportMode::Copies,
            Some(1) => ExportMode::Links,
            _ => return Ok(()),
        };

        search::export(&matches, &target, mode)?;
        let _ = open::that(&target);
        ui::pause("Results loaded! Press Enter to return to the main menu.")?;
        Ok(())
    }

    /// Build the keyword list. Returns `None` on cancel, otherwise at
    /// least one keyword.
    fn collect_keywords(&mut self) -> Result<Option<Vec<String>>> {
        let mut keywords: Vec<String> = Vec::new();
        let mut last_choice: Option<usize> = None;

        loop {
            ui::clear_and_header(Some("Search Titles And Subjects"))?;
            println!("Keywords: {}\n", keywords.join("\n          "));

            let items = vec![
                "Add Keyword".to_string(),
                "Remove Keyword".to_string(),
                "Search".to_string(),
                "Main Menu".to_string(),
            ];
            let choice = ui::select("Make a selection", &items, last_choice)?;
            last_choice = choice;

            match choice {
                Some(0) => {
                    let complete = |prefix: &str| self.suggestions.matches(prefix);
                    let existing = keywords.clone();
                    let validate = move |input: &str| {
                        let input = input.trim();
                        if existing.iter().any(|k| k == input) {
                            Err(format!("keyword \"{input}\" was already listed"))
                        } else {
                            Ok(())
                        }
                    };
                    if let Some(entry) = ui::prompt_line(
                        "Keyword to add (use Tab to cycle suggestions)",
                        "",
                        Some(&complete),
                        &validate,
                    )? {
                        let entry = entry.trim().to_string();
                        if !entry.is_empty() {
                            keywords.push(entry);
                        }
                    }
                }
                Some(1) => {
                    let existing = keywords.clone();
                    let complete = move |prefix: &str| {
                        let prefix = prefix.to_lowercase();
                        let mut hits: Vec<String> = existing
                            .iter()
                            .filter(|k| k.to_lowercase().starts_with(&prefix))
                            .cloned()
                            .collect();
                        hits.sort_by_key(|k| k.to_lowercase());
                        hits
                    };
                    let listed = keywords.clone();
                    let validate = move |input: &str| {
                        let input = input.trim();
                        if input.is_empty() || listed.iter().any(|k| k == input) {
                            Ok(())
                        } else {
                            Err(format!("keyword \"{input}\" was not listed"))
                        }
                    };
                    if let Some(entry) = ui::prompt_line(
                        "Keyword to remove (use Tab to cycle keywords)",
                        "",
                        Some(&complete),
                        &validate,
                    )? {
                        let entry = entry.trim().to_string();
                        keywords.retain(|k| k != &entry);
                    }
                }
                Some(2) => {
                    if keywords.is_empty() {
                        println!("You must provide at least one keyword.");
                        ui::pause("Press Enter to continue.")?;
                    } else {
                        return Ok(Some(keywords));
                    }
                }
                _ => return Ok(None),
            }
        }
    }

    /// Push a file to the popup; failures only make it into the log,
    /// the preview is best-effort by design.
    fn show_preview(&mut self, path: &Path) {
        if let Err(e) = self.preview.request_show(path) {
            warn!(path = %path.display(), "preview request failed: {e}");
        }
    }

    /// Prompt for an existing directory, remembering it as the next
    /// default. Returns `None` on cancel.
    fn prompt_directory(&mut self, label: &str) -> Result<Option<PathBuf>> {
        let initial = self
            .config
            .last_directory
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        let validate = |input: &str| {
            let path = clean_path(input);
            if path.as_os_str().is_empty() || !path.is_dir() {
                Err(format!(
                    "\"{}\" is not a valid directory path",
                    path.display()
                ))
            } else {
                Ok(())
            }
        };
        let Some(entry) = ui::prompt_line(label, &initial, None, &validate)? else {
            return Ok(None);
        };

        let dir = clean_path(&entry);
        self.config.last_directory = Some(dir.clone());
        if let Err(e) = self.config.save() {
            warn!("config save failed: {e}");
        }
        Ok(Some(dir))
    }

    /// Prompt for an existing, empty directory. Returns `None` on cancel.
    fn prompt_empty_directory(&mut self, label: &str) -> Result<Option<PathBuf>> {
        let validate = |input: &str| {
            let path = clean_path(input);
            if path.as_os_str().is_empty() || !path.is_dir() {
                return Err(format!(
                    "\"{}\" is not a valid directory path",
                    path.display()
                ));
            }
            match std::fs::read_dir(&path) {
                Ok(mut entries) => {
                    if entries.next().is_some() {
                        Err(format!("directory \"{}\" must be empty", path.display()))
                    } else {
                        Ok(())
                    }
                }
                Err(e) => Err(e.to_string()),
            }
        };
        let entry = ui::prompt_line(label, "", None, &validate)?;
        Ok(entry.map(|e| clean_path(&e)))
    }
}

/// Strip whitespace and surrounding quotes, as drag/drop pastes them.
fn clean_path(input: &str) -> PathBuf {
    PathBuf::from(input.trim().trim_matches(|c| c == '"' || c == '\''))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_file_info(path: &Path, idx: usize, total: usize) -> io::Result<()> {
    let mut stdout = io::stdout();
    if let Some(parent) = path.parent() {
        writeln!(stdout, "Directory: {}", parent.display())?;
    }
    writeln!(stdout, "File name: {}", file_name(path))?;
    writeln!(stdout, "{} / {}\n", idx + 1, total)?;
    Ok(())
}

/// Flush a record, reporting failures to the user without aborting the
/// browse loop.
fn save_record(record: MetadataFile) -> Result<()> {
    let path = record.path().to_path_buf();
    if let Err(e) = record.save() {
        warn!(path = %path.display(), "save failed: {e}");
        println!("Could not save {}: {e}", file_name(&path));
        ui::pause("Press Enter to continue.")?;
    }
    Ok(())
}

fn edit_title(record: &mut MetadataFile) -> Result<()> {
    let validate = |_: &str| -> std::result::Result<(), String> { Ok(()) };
    if let Some(title) = ui::prompt_line("New title", record.title(), None, &validate)? {
        record.set_title(title);
    }
    Ok(())
}

fn add_subject(record: &mut MetadataFile, suggestions: &Suggestions) -> Result<()> {
    let complete = |prefix: &str| suggestions.matches(prefix);
    let current = record.tags().clone();
    let validate = move |input: &str| {
        let input = input.trim();
        if let Some(reason) = tags::invalid_reason(input) {
            return Err(reason);
        }
        if current.contains(input) {
            return Err(format!("subject \"{input}\" already exists in this file"));
        }
        Ok(())
    };

    if let Some(entry) = ui::prompt_line(
        "Subject to add (use Tab to cycle suggestions)",
        "",
        Some(&complete),
        &validate,
    )? {
        record.add_tag(entry.trim())?;
    }
    Ok(())
}

fn remove_subject(record: &mut MetadataFile) -> Result<()> {
    let current = record.tags().clone();
    let complete = {
        let current = current.clone();
        move |prefix: &str| {
            let prefix = prefix.to_lowercase();
            let mut hits: Vec<String> = current
                .iter()
                .filter(|t| t.to_lowercase().starts_with(&prefix))
                .map(str::to_string)
                .collect();
            hits.sort_by_key(|t| t.to_lowercase());
            hits
        }
    };
    let validate = move |input: &str| {
        let input = input.trim();
        if input.is_empty() || current.contains(input) {
            Ok(())
        } else {
            Err(format!("subject \"{input}\" does not exist in this file"))
        }
    };

    if let Some(entry) = ui::prompt_line(
        "Subject to remove (use Tab to cycle subjects)",
        "",
        Some(&complete),
        &validate,
    )? {
        let entry = entry.trim();
        if !entry.is_empty() {
            record.remove_tag(entry);
        }
    }
    Ok(())
}
