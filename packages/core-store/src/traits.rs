//! Core traits: ConfigProvider.

use crate::map::{SectionMap, AUTH_SECTION};

/// The narrow configuration interface firmware code is written against.
///
/// Lookups never fail: a missing value reads as [`NOT_FOUND`](crate::NOT_FOUND)
/// and a missing section as an empty map. Persistence reports success as a
/// plain `bool`.
///
/// Code that wants static dispatch takes `impl ConfigProvider`; code that
/// wants one binary to serve several backends takes `&mut dyn ConfigProvider`.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn ConfigProvider>`.
pub trait ConfigProvider {
    /// The value stored under `section`/`key`, or `NOT_FOUND`.
    fn get_value(&self, section: &str, key: &str) -> String;

    /// Insert or overwrite a value in memory, creating the section if needed.
    fn set_value(&mut self, section: &str, key: &str, value: &str);

    /// Every section name, hidden ones included.
    fn get_sections(&self) -> Vec<String>;

    /// Every section name with its reserved prefix stripped.
    fn get_format_sections(&self) -> Vec<String>;

    /// Keys of one section; empty if the section does not exist.
    fn get_keys(&self, section: &str) -> Vec<String>;

    /// Read-only view of one section; a shared empty map if it does not exist.
    fn get_section(&self, name: &str) -> &SectionMap;

    /// Persist the in-memory map.
    fn save(&mut self) -> bool;

    /// Reload the map from its backing file.
    fn load_config(&mut self) -> bool;

    fn get_user(&self) -> String {
        self.get_value(AUTH_SECTION, "user")
    }

    fn get_password(&self) -> String {
        self.get_value(AUTH_SECTION, "password")
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProvider for &mut T {
    fn get_value(&self, section: &str, key: &str) -> String {
        (**self).get_value(section, key)
    }

    fn set_value(&mut self, section: &str, key: &str, value: &str) {
        (**self).set_value(section, key, value)
    }

    fn get_sections(&self) -> Vec<String> {
        (**self).get_sections()
    }

    fn get_format_sections(&self) -> Vec<String> {
        (**self).get_format_sections()
    }

    fn get_keys(&self, section: &str) -> Vec<String> {
        (**self).get_keys(section)
    }

    fn get_section(&self, name: &str) -> &SectionMap {
        (**self).get_section(name)
    }

    fn save(&mut self) -> bool {
        (**self).save()
    }

    fn load_config(&mut self) -> bool {
        (**self).load_config()
    }

    fn get_user(&self) -> String {
        (**self).get_user()
    }

    fn get_password(&self) -> String {
        (**self).get_password()
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProvider for Box<T> {
    fn get_value(&self, section: &str, key: &str) -> String {
        self.as_ref().get_value(section, key)
    }

    fn set_value(&mut self, section: &str, key: &str, value: &str) {
        self.as_mut().set_value(section, key, value)
    }

    fn get_sections(&self) -> Vec<String> {
        self.as_ref().get_sections()
    }

    fn get_format_sections(&self) -> Vec<String> {
        self.as_ref().get_format_sections()
    }

    fn get_keys(&self, section: &str) -> Vec<String> {
        self.as_ref().get_keys(section)
    }

    fn get_section(&self, name: &str) -> &SectionMap {
        self.as_ref().get_section(name)
    }

    fn save(&mut self) -> bool {
        self.as_mut().save()
    }

    fn load_config(&mut self) -> bool {
        self.as_mut().load_config()
    }

    fn get_user(&self) -> String {
        self.as_ref().get_user()
    }

    fn get_password(&self) -> String {
        self.as_ref().get_password()
    }
}
