//! Device setting addresses.
//!
//! Legacy firmware addressed each persisted setting by a small integer slot
//! in EEPROM. The same settings now live in the device-state config file as
//! `section`/`key` pairs. [`DeviceAddress`] names every slot and
//! [`ADDRESS_TABLE`] holds the matching record for each one, in slot order.

use serde::Serialize;

/// One persisted device setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressEntry {
    /// Legacy record name, used in diagnostics.
    pub name: &'static str,
    pub section: &'static str,
    pub key: &'static str,
}

impl AddressEntry {
    const fn new(name: &'static str, section: &'static str, key: &'static str) -> Self {
        Self { name, section, key }
    }
}

/// Slot numbers of the persisted device settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum DeviceAddress {
    Dummy,
    DisplayMode,
    DisplayBrightness,
    DisplaySleep,
    OtaMode,
    Role,
    MenuButtons,
    FullScreen,
    ConfigFlag,
    Wireless,
    Direction,
    DeviceOn,
    Idle,
    Present,
    Last,
    Max,
    AutoStep1,
    AutoStep2,
    AutoStep3,
    AutoStep4,
    AutoStep5,
    AutoStep6,
    AutoStep7,
    AutoStep8,
    AutoPeriod,
    AutoSteps,
    AutoRepeats,
    Memory1A,
    Memory1B,
    Memory1C,
    Memory1D,
    Memory1E,
    Memory2A,
    Memory2B,
    Memory2C,
    Memory2D,
    Memory2E,
    Memory3A,
    Memory3B,
    Memory3C,
    Memory3D,
    Memory3E,
    Memory4A,
    Memory4B,
    Memory4C,
    Memory4D,
    Memory4E,
    Memory5A,
    Memory5B,
    Memory5C,
    Memory5D,
    Memory5E,
    Memory6A,
    Memory6B,
    Memory6C,
    Memory6D,
    Memory6E,
    CalOffset,
    CalLimit,
    CalStepSize,
    CalScaleFactor,
    CalDirection,
    CalPeriod,
    Calibrate,
    RebootFlag,
    StressTest,
    FactoryReset,
    OnOff,
    Diagnostic,
    Sound,
    Exit,
    Commit,
    Power,
}

/// Section/key records for every [`DeviceAddress`], indexed by slot.
pub static ADDRESS_TABLE: [AddressEntry; DeviceAddress::COUNT] = [
    AddressEntry::new("eeDUMMY", "display", "dummy"),
    AddressEntry::new("eeDISPMODE", "display", "mode"),
    AddressEntry::new("eeDISPBRIGHT", "display", "brightness"),
    AddressEntry::new("eeDISPSLEEP", "display", "sleep"),
    AddressEntry::new("eeOTA", "testmode", "ota_mode"),
    AddressEntry::new("eeROLEIS", "application", "role"),
    AddressEntry::new("eeBUTTONMENU", "display", "menubuttons"),
    AddressEntry::new("eeFULLSCREEN", "display", "fullscreen"),
    AddressEntry::new("eeCONFIG", "flags", "config"),
    AddressEntry::new("eeWIRELESS", "flags", "wireless"),
    AddressEntry::new("eeDIRECTION", "input", "direction"),
    AddressEntry::new("eeDEVICEEN", "setpoints", "deviceon"),
    AddressEntry::new("eeIDLE", "setpoints", "idle"),
    AddressEntry::new("eePRESENT", "setpoints", "present"),
    AddressEntry::new("eeLAST", "setpoints", "last"),
    AddressEntry::new("eeMAX", "setpoints", "max"),
    AddressEntry::new("eeAUTO1", "auto", "step1"),
    AddressEntry::new("eeAUTO2", "auto", "step2"),
    AddressEntry::new("eeAUTO3", "auto", "step3"),
    AddressEntry::new("eeAUTO4", "auto", "step4"),
    AddressEntry::new("eeAUTO5", "auto", "step5"),
    AddressEntry::new("eeAUTO6", "auto", "step6"),
    AddressEntry::new("eeAUTO7", "auto", "step7"),
    AddressEntry::new("eeAUTO8", "auto", "step8"),
    AddressEntry::new("eeAUTOPERIOD", "auto", "period"),
    AddressEntry::new("eeAUTOSTEPS", "auto", "steps"),
    AddressEntry::new("eeAUTOREPEATS", "auto", "repeats"),
    AddressEntry::new("eeMEM1A", "memory1", "address1"),
    AddressEntry::new("eeMEM1B", "memory1", "address2"),
    AddressEntry::new("eeMEM1C", "memory1", "address3"),
    AddressEntry::new("eeMEM1D", "memory1", "address4"),
    AddressEntry::new("eeMEM1E", "memory1", "address5"),
    AddressEntry::new("eeMEM2A", "memory2", "address1"),
    AddressEntry::new("eeMEM2B", "memory2", "address2"),
    AddressEntry::new("eeMEM2C", "memory2", "address3"),
    AddressEntry::new("eeMEM2D", "memory2", "address4"),
    AddressEntry::new("eeMEM2E", "memory2", "address5"),
    AddressEntry::new("eeMEM3A", "memory3", "address1"),
    AddressEntry::new("eeMEM3B", "memory3", "address2"),
    AddressEntry::new("eeMEM3C", "memory3", "address3"),
    AddressEntry::new("eeMEM3D", "memory3", "address4"),
    AddressEntry::new("eeMEM3E", "memory3", "address5"),
    AddressEntry::new("eeMEM4A", "memory4", "address1"),
    AddressEntry::new("eeMEM4B", "memory4", "address2"),
    AddressEntry::new("eeMEM4C", "memory4", "address3"),
    AddressEntry::new("eeMEM4D", "memory4", "address4"),
    AddressEntry::new("eeMEM4E", "memory4", "address5"),
    AddressEntry::new("eeMEM5A", "memory5", "address1"),
    AddressEntry::new("eeMEM5B", "memory5", "address2"),
    AddressEntry::new("eeMEM5C", "memory5", "address3"),
    AddressEntry::new("eeMEM5D", "memory5", "address4"),
    AddressEntry::new("eeMEM5E", "memory5", "address5"),
    AddressEntry::new("eeMEM6A", "memory6", "address1"),
    AddressEntry::new("eeMEM6B", "memory6", "address2"),
    AddressEntry::new("eeMEM6C", "memory6", "address3"),
    AddressEntry::new("eeMEM6D", "memory6", "address4"),
    AddressEntry::new("eeMEM6E", "memory6", "address5"),
    AddressEntry::new("eeCALOFFSET", "calibration", "offset"),
    AddressEntry::new("eeCALLIMIT", "calibration", "limit"),
    AddressEntry::new("eeCALSTEP", "calibration", "stepsize"),
    AddressEntry::new("eeCALSCALE", "calibration", "scalefactor"),
    AddressEntry::new("eeCALDIR", "calibration", "direction"),
    AddressEntry::new("eeCALPERIOD", "calibration", "period"),
    AddressEntry::new("eeCALIBRATE", "calibration", "calibrate"),
    AddressEntry::new("eeREBOOT", "flags", "rebootflag"),
    AddressEntry::new("eeSTRESSTEST", "testmode", "stresstest"),
    AddressEntry::new("eeFACTORY", "flags", "factoryreset"),
    AddressEntry::new("eeONOFF", "flags", "onoff"),
    AddressEntry::new("eeDIAGNOSTIC", "flags", "diagnostic"),
    AddressEntry::new("eeSOUND", "flags", "sound"),
    AddressEntry::new("eeEXIT", "flags", "exit"),
    AddressEntry::new("eeCOMMIT", "flags", "commit"),
    AddressEntry::new("eePOWER", "calibration", "power"),
];

impl DeviceAddress {
    /// Number of addressable settings.
    pub const COUNT: usize = 73;

    /// Every address in slot order.
    pub const ALL: [DeviceAddress; DeviceAddress::COUNT] = [
        DeviceAddress::Dummy,
        DeviceAddress::DisplayMode,
        DeviceAddress::DisplayBrightness,
        DeviceAddress::DisplaySleep,
        DeviceAddress::OtaMode,
        DeviceAddress::Role,
        DeviceAddress::MenuButtons,
        DeviceAddress::FullScreen,
        DeviceAddress::ConfigFlag,
        DeviceAddress::Wireless,
        DeviceAddress::Direction,
        DeviceAddress::DeviceOn,
        DeviceAddress::Idle,
        DeviceAddress::Present,
        DeviceAddress::Last,
        DeviceAddress::Max,
        DeviceAddress::AutoStep1,
        DeviceAddress::AutoStep2,
        DeviceAddress::AutoStep3,
        DeviceAddress::AutoStep4,
        DeviceAddress::AutoStep5,
        DeviceAddress::AutoStep6,
        DeviceAddress::AutoStep7,
        DeviceAddress::AutoStep8,
        DeviceAddress::AutoPeriod,
        DeviceAddress::AutoSteps,
        DeviceAddress::AutoRepeats,
        DeviceAddress::Memory1A,
        DeviceAddress::Memory1B,
        DeviceAddress::Memory1C,
        DeviceAddress::Memory1D,
        DeviceAddress::Memory1E,
        DeviceAddress::Memory2A,
        DeviceAddress::Memory2B,
        DeviceAddress::Memory2C,
        DeviceAddress::Memory2D,
        DeviceAddress::Memory2E,
        DeviceAddress::Memory3A,
        DeviceAddress::Memory3B,
        DeviceAddress::Memory3C,
        DeviceAddress::Memory3D,
        DeviceAddress::Memory3E,
        DeviceAddress::Memory4A,
        DeviceAddress::Memory4B,
        DeviceAddress::Memory4C,
        DeviceAddress::Memory4D,
        DeviceAddress::Memory4E,
        DeviceAddress::Memory5A,
        DeviceAddress::Memory5B,
        DeviceAddress::Memory5C,
        DeviceAddress::Memory5D,
        DeviceAddress::Memory5E,
        DeviceAddress::Memory6A,
        DeviceAddress::Memory6B,
        DeviceAddress::Memory6C,
        DeviceAddress::Memory6D,
        DeviceAddress::Memory6E,
        DeviceAddress::CalOffset,
        DeviceAddress::CalLimit,
        DeviceAddress::CalStepSize,
        DeviceAddress::CalScaleFactor,
        DeviceAddress::CalDirection,
        DeviceAddress::CalPeriod,
        DeviceAddress::Calibrate,
        DeviceAddress::RebootFlag,
        DeviceAddress::StressTest,
        DeviceAddress::FactoryReset,
        DeviceAddress::OnOff,
        DeviceAddress::Diagnostic,
        DeviceAddress::Sound,
        DeviceAddress::Exit,
        DeviceAddress::Commit,
        DeviceAddress::Power,
    ];

    /// Look up an address by its slot number.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Look up an address by its legacy record name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|address| address.name() == name)
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn entry(self) -> &'static AddressEntry {
        &ADDRESS_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub fn section(self) -> &'static str {
        self.entry().section
    }

    pub fn key(self) -> &'static str {
        self.entry().key
    }
}

impl std::fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entry = self.entry();
        write!(f, "{} ({}.{})", entry.name, entry.section, entry.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn slots_match_enum_order() {
        for (index, address) in DeviceAddress::ALL.iter().enumerate() {
            assert_eq!(address.index() as usize, index);
            assert_eq!(DeviceAddress::from_index(index as u8), Some(*address));
        }
        assert_eq!(DeviceAddress::from_index(DeviceAddress::COUNT as u8), None);
    }

    #[test]
    fn section_key_pairs_are_unique() {
        let pairs: HashSet<_> = ADDRESS_TABLE
            .iter()
            .map(|entry| (entry.section, entry.key))
            .collect();
        assert_eq!(pairs.len(), ADDRESS_TABLE.len());
    }

    #[test]
    fn names_round_trip() {
        for address in DeviceAddress::ALL {
            assert_eq!(DeviceAddress::from_name(address.name()), Some(address));
        }
        assert_eq!(DeviceAddress::from_name("eeNOPE"), None);
    }

    #[test]
    fn known_entries() {
        assert_eq!(DeviceAddress::DisplayMode.section(), "display");
        assert_eq!(DeviceAddress::DisplayMode.key(), "mode");
        assert_eq!(DeviceAddress::Memory3B.key(), "address2");
        assert_eq!(DeviceAddress::Power.section(), "calibration");
        assert_eq!(
            DeviceAddress::Idle.to_string(),
            "eeIDLE (setpoints.idle)"
        );
    }
}
