//! The embedded fallback document.
//!
//! Loaded whenever the filesystem is unavailable or the config file is
//! missing, empty or unparseable. Sections ending in `.format` describe how
//! a settings UI should render the fields of the sections that reference
//! them through `format.use`.

use flashcfg_core_store::ConfigMap;

use crate::json_utils;

pub const DEFAULT_DOCUMENT: &str = r#"{
  "auth.format": {
    "user": "string",
    "password": "string"
  },
  "net.format": {
    "use": "checkbox",
    "channel": "integer",
    "ssid": "string",
    "password": "string"
  },
  "espnow.format": {
    "use": "checkbox",
    "broadcast": "checkbox",
    "user": "string",
    "channel": "integer",
    "devicemac": "macaddress",
    "remotemac": "macaddress",
    "sharedID": "integer"
  },
  "flag.format": {
    "wifistart": "checkbox",
    "webstart": "checkbox",
    "rebootflag": "checkbox",
    "wificonnected": "checkbox"
  },
  "mqtt.format": {
    "use": "checkbox",
    "user": "string",
    "topic": "string",
    "serverIP": "ipaddress",
    "serverPort": "integer",
    "password": "string"
  },
  "wifiAP": {
    "format.use": "net.format",
    "use": "true",
    "channel": "1",
    "ip": "192.168.4.1",
    "port": "80",
    "name": "device-ap",
    "ssid": "device-setup",
    "password": "change-me"
  },
  "wifiSTA": {
    "format.use": "net.format",
    "use": "false",
    "ip": "",
    "channel": "1",
    "port": "",
    "name": "device-sta",
    "ssid": "",
    "password": ""
  },
  "mqtt": {
    "format.use": "mqtt.format",
    "use": "false",
    "ip": "",
    "port": "1883",
    "topic": "device"
  },
  "_auth": {
    "format.use": "auth.format",
    "user": "admin",
    "password": "admin"
  },
  "updates": {
    "topic": "system/online"
  }
}
"#;

/// The default document as a map.
///
/// The document is checked by tests, so the empty-map branch only guards
/// against an edit that breaks it.
pub fn default_config() -> ConfigMap {
    match json_utils::parse_config(DEFAULT_DOCUMENT) {
        Ok(map) => map,
        Err(error) => {
            log::error!("Embedded default config is invalid: {}", error);
            ConfigMap::new()
        }
    }
}
