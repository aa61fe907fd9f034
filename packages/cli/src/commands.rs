//! Command execution.
//!
//! Commands:
//! - `show [--json]` - Print every section
//! - `get <section> <key>` - Print one value
//! - `set <section> <key> <value>` - Store one value and save
//! - `sections [--format | --visible]` - List section names
//! - `keys <section>` - List the keys of a section
//! - `clear` - Remove the config file
//! - `usage` - Approximate memory footprint of the loaded config
//! - `wear [--reset-boots]` - Flash wear and boot counters
//! - `hex <text> <len>` - Decode a hex string
//!
//! A `set` or `wear --reset-boots` runs as a device session: the wear tracker
//! boots (counting one boot) before the config is touched. Every other
//! command only reads the counters, if at all, and never creates the
//! EEPROM image.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use nu_ansi_term::{Color, Style};

use flashcfg_core_store::{
    inspect_wear, parse_hex_to_bytes, SystemClock, WarningLevel, WearSettings, WearSnapshot,
    WearTracker, NOT_FOUND,
};
use flashcfg_json_store::{json_utils, ConfigStore, LoadSource};
use flashcfg_ll_store::MemoryCounterStore;
use flashcfg_sys::{FileCounterStore, LocalDiskStorage};

use crate::error::CliError;

/// Size of the emulated EEPROM image.
pub const EEPROM_SIZE: usize = 4096;

/// File name of the emulated EEPROM image inside the root.
pub const EEPROM_FILE: &str = "eeprom.bin";

/// What to run.
#[derive(Debug, Clone, PartialEq, Eq, clap::Subcommand)]
pub enum Command {
    /// Print every section and value
    Show {
        /// Print the document as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Print one value
    Get { section: String, key: String },
    /// Store one value and save
    Set {
        section: String,
        key: String,
        value: String,
    },
    /// List section names
    Sections {
        /// Strip the hidden-section prefix from names
        #[arg(long, conflicts_with = "visible")]
        format: bool,
        /// Leave hidden sections out
        #[arg(long)]
        visible: bool,
    },
    /// List the keys of one section
    Keys { section: String },
    /// Remove the config file
    Clear,
    /// Print the approximate memory footprint of the config
    Usage,
    /// Print flash wear and boot counters
    Wear {
        /// Reset the boot counter to zero
        #[arg(long)]
        reset_boots: bool,
    },
    /// Decode a hex string into a fixed number of bytes
    Hex { text: String, len: usize },
}

/// Where a command runs.
#[derive(Debug, Clone)]
pub struct Session {
    pub root: PathBuf,
    pub file: String,
    pub settings: WearSettings,
}

impl Session {
    pub fn new(root: PathBuf, file: String, settings: WearSettings) -> Self {
        Self {
            root,
            file,
            settings,
        }
    }

    fn store(&self) -> ConfigStore<LocalDiskStorage> {
        ConfigStore::with_path(LocalDiskStorage::new(&self.root), self.file.clone())
    }

    fn loaded_store(&self) -> ConfigStore<LocalDiskStorage> {
        let mut store = self.store();
        store.load(&self.file, false);
        if store.loaded_from() == Some(LoadSource::Defaults) {
            log::info!("{} not usable; showing defaults", self.file);
        }
        store
    }

    fn counters(&self) -> Result<FileCounterStore, CliError> {
        ensure_dir(&self.root)?;
        Ok(FileCounterStore::open(
            self.root.join(EEPROM_FILE),
            EEPROM_SIZE,
        )?)
    }

    fn boot_tracker(&self) -> Result<WearTracker<FileCounterStore>, CliError> {
        Ok(WearTracker::boot(
            self.counters()?,
            self.settings.clone(),
            SystemClock::new(),
        )?)
    }
}

/// Run a command, returning the text to print.
pub fn execute(command: &Command, session: &Session) -> Result<String, CliError> {
    match command {
        Command::Show { json } => {
            let store = session.loaded_store();
            if *json {
                Ok(json_utils::to_json_string(store.config())?)
            } else {
                Ok(render_colored(&store))
            }
        }
        Command::Get { section, key } => {
            let value = session.loaded_store().get_value(section, key);
            if value == NOT_FOUND {
                Ok(Color::Yellow.paint(value).to_string())
            } else {
                Ok(value)
            }
        }
        Command::Set {
            section,
            key,
            value,
        } => {
            let tracker = Rc::new(RefCell::new(session.boot_tracker()?));

            let mut store = session.loaded_store();
            store.attach_wear_tracker(tracker.clone());
            store.set_value(section, key, value);
            if !store.save() {
                return Err(CliError::NotSaved {
                    path: session.file.clone(),
                });
            }

            let status = tracker.borrow().status_line();
            Ok(format!(
                "{} {}.{} = {}\n{}",
                Color::Green.paint("ok"),
                section,
                key,
                value,
                Color::DarkGray.paint(status)
            ))
        }
        Command::Sections { format, visible } => {
            let store = session.loaded_store();
            let sections = if *format {
                store.get_format_sections()
            } else if *visible {
                store.get_visible_sections()
            } else {
                store.get_sections()
            };
            Ok(sections.join("\n"))
        }
        Command::Keys { section } => Ok(session.loaded_store().get_keys(section).join("\n")),
        Command::Clear => {
            let mut store = session.store();
            if store.clear_config() {
                Ok(format!("{} removed {}", Color::Green.paint("ok"), session.file))
            } else {
                Err(CliError::NotRemoved {
                    path: session.file.clone(),
                })
            }
        }
        Command::Usage => {
            let store = session.loaded_store();
            Ok(format!(
                "{} bytes in {} sections",
                store.get_config_memory_usage(),
                store.get_sections().len()
            ))
        }
        Command::Wear { reset_boots } => {
            if *reset_boots {
                let mut tracker = session.boot_tracker()?;
                if !tracker.reset_boot_counter() {
                    return Err(CliError::NotSaved {
                        path: EEPROM_FILE.to_string(),
                    });
                }
                Ok(render_wear(&tracker.snapshot()))
            } else if session.root.join(EEPROM_FILE).is_file() {
                let mut counters = session.counters()?;
                Ok(render_wear(&inspect_wear(&mut counters, &session.settings)?))
            } else {
                // A device that never booted reads as erased flash.
                let mut erased = MemoryCounterStore::new(EEPROM_SIZE);
                Ok(render_wear(&inspect_wear(&mut erased, &session.settings)?))
            }
        }
        Command::Hex { text, len } => {
            let mut bytes = vec![0u8; *len];
            if !parse_hex_to_bytes(text, &mut bytes) {
                return Err(CliError::BadHex {
                    text: text.clone(),
                    len: *len,
                });
            }
            Ok(bytes
                .iter()
                .map(|byte| format!("{:02X}", byte))
                .collect::<Vec<_>>()
                .join(" "))
        }
    }
}

fn ensure_dir(path: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(path).map_err(|source| CliError::CreateRoot {
        path: path.to_path_buf(),
        source,
    })
}

fn render_colored(store: &ConfigStore<LocalDiskStorage>) -> String {
    let section_style = Style::new().bold().fg(Color::Cyan);
    let hidden_style = Style::new().fg(Color::DarkGray);
    let key_style = Style::new().fg(Color::Yellow);

    let mut out = Vec::new();
    for section in store.get_sections() {
        let header = format!("[{}]", section);
        if flashcfg_core_store::map::is_hidden(&section) {
            out.push(hidden_style.paint(header).to_string());
        } else {
            out.push(section_style.paint(header).to_string());
        }
        for (key, value) in store.get_section(&section) {
            out.push(format!("  {}: {}", key_style.paint(key), value));
        }
    }
    out.join("\n")
}

fn render_wear(snapshot: &WearSnapshot) -> String {
    let level = match snapshot.level {
        WarningLevel::Normal => Color::Green.paint(snapshot.level.to_string()),
        WarningLevel::Caution => Color::Yellow.paint(snapshot.level.to_string()),
        WarningLevel::Critical => Color::Red.paint(snapshot.level.to_string()),
        WarningLevel::Retirement => Color::Red.bold().paint(snapshot.level.to_string()),
    };
    format!(
        "writes: {}/{} ({:.2}% used)\nlevel:  {}\nboots:  {}",
        snapshot.write_count, snapshot.max_writes, snapshot.percentage, level, snapshot.boot_count
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(dir: &tempfile::TempDir) -> Session {
        Session::new(
            dir.path().to_path_buf(),
            "/config.json".to_string(),
            WearSettings::default().with_max_writes(10),
        )
    }

    fn run(command: Command, session: &Session) -> String {
        execute(&command, session).unwrap()
    }

    #[test]
    fn get_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        let user = run(
            Command::Get {
                section: "_auth".into(),
                key: "user".into(),
            },
            &session,
        );
        assert_eq!(user, "admin");
    }

    #[test]
    fn set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        let output = run(
            Command::Set {
                section: "wifiSTA".into(),
                key: "ssid".into(),
                value: "barn".into(),
            },
            &session,
        );
        assert!(output.contains("wifiSTA.ssid = barn"));
        assert!(output.contains("1/10 writes"));

        let ssid = run(
            Command::Get {
                section: "wifiSTA".into(),
                key: "ssid".into(),
            },
            &session,
        );
        assert_eq!(ssid, "barn");
        assert!(dir.path().join("config.json").is_file());
        assert!(dir.path().join(EEPROM_FILE).is_file());
    }

    #[test]
    fn missing_value_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let output = run(
            Command::Get {
                section: "nope".into(),
                key: "nope".into(),
            },
            &session(&dir),
        );
        assert!(output.contains(NOT_FOUND));
    }

    #[test]
    fn section_listings() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        let all = run(
            Command::Sections {
                format: false,
                visible: false,
            },
            &session,
        );
        let formatted = run(
            Command::Sections {
                format: true,
                visible: false,
            },
            &session,
        );
        let visible = run(
            Command::Sections {
                format: false,
                visible: true,
            },
            &session,
        );
        assert!(all.lines().any(|line| line == "_auth"));
        assert!(formatted.lines().any(|line| line == "auth"));
        assert!(!visible.lines().any(|line| line.starts_with('_')));
        assert_eq!(all.lines().count(), formatted.lines().count());
        assert_eq!(visible.lines().count() + 1, all.lines().count());
    }

    #[test]
    fn show_json_is_parseable() {
        let dir = tempfile::tempdir().unwrap();
        let output = run(Command::Show { json: true }, &session(&dir));
        let parsed = json_utils::parse_config(&output).unwrap();
        assert_eq!(parsed, flashcfg_json_store::default_config());
    }

    #[test]
    fn clear_without_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            execute(&Command::Clear, &session(&dir)),
            Err(CliError::NotRemoved { .. })
        ));
    }

    #[test]
    fn wear_reports_without_counting_a_boot() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        let first = run(Command::Wear { reset_boots: false }, &session);
        let second = run(Command::Wear { reset_boots: false }, &session);
        assert!(first.contains("boots:  0"));
        assert_eq!(first, second);

        run(
            Command::Set {
                section: "a".into(),
                key: "b".into(),
                value: "c".into(),
            },
            &session,
        );
        let after = run(Command::Wear { reset_boots: false }, &session);
        assert!(after.contains("writes: 1/10"));
        assert!(after.contains("boots:  1"));

        let reset = run(Command::Wear { reset_boots: true }, &session);
        assert!(reset.contains("boots:  0"));
    }

    #[test]
    fn wear_on_a_new_root_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("device");
        let session = Session::new(
            root.clone(),
            "/config.json".to_string(),
            WearSettings::default().with_max_writes(10),
        );
        let output = run(Command::Wear { reset_boots: false }, &session);
        assert!(output.contains("writes: 0/10"));
        assert!(output.contains("boots:  0"));
        assert!(!root.exists());
    }

    #[test]
    fn hex_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        let output = run(
            Command::Hex {
                text: "0x0a0B 0c0D".into(),
                len: 4,
            },
            &session,
        );
        assert_eq!(output, "0A 0B 0C 0D");
        assert!(matches!(
            execute(
                &Command::Hex {
                    text: "ZZZZ".into(),
                    len: 2
                },
                &session
            ),
            Err(CliError::BadHex { .. })
        ));
    }

    #[test]
    fn usage_counts_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let output = run(Command::Usage, &session(&dir));
        assert!(output.ends_with("in 10 sections"));
    }
}
