//! Per-platform CLI conventions
//!
//! The commands a session issues around the caller's own commands: entering
//! privileged mode, disabling paging, and entering/leaving configuration mode.

use super::credentials::DeviceType;

/// CLI conventions for one device family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    pub device_type: DeviceType,
    /// NX-OS logins land in privileged mode directly
    pub requires_enable: bool,
    pub enable_command: &'static str,
    /// Suffix of the enable password prompt
    pub password_prompt: &'static str,
    pub paging_command: Option<&'static str>,
    pub config_enter_command: &'static str,
    pub config_exit_command: &'static str,
    pub exit_command: &'static str,
    pub running_config_command: &'static str,
    pub startup_config_command: &'static str,
}

impl PlatformProfile {
    pub fn for_device(device_type: DeviceType) -> Self {
        match device_type {
            DeviceType::CiscoIos | DeviceType::CiscoXe => Self {
                device_type,
                requires_enable: true,
                enable_command: "enable",
                password_prompt: "assword:",
                paging_command: Some("terminal length 0"),
                config_enter_command: "configure terminal",
                config_exit_command: "end",
                exit_command: "exit",
                running_config_command: "show running-config",
                startup_config_command: "show startup-config",
            },
            DeviceType::CiscoNxos => Self {
                device_type,
                requires_enable: false,
                enable_command: "enable",
                password_prompt: "assword:",
                paging_command: Some("terminal length 0"),
                config_enter_command: "configure terminal",
                config_exit_command: "end",
                exit_command: "exit",
                running_config_command: "show running-config",
                startup_config_command: "show startup-config",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_device_type_has_profile() {
        for device_type in DeviceType::all() {
            let profile = PlatformProfile::for_device(*device_type);
            assert_eq!(profile.device_type, *device_type);
            assert_eq!(profile.running_config_command, "show running-config");
            assert_eq!(profile.startup_config_command, "show startup-config");
        }
    }

    #[test]
    fn test_ios_disables_paging() {
        let profile = PlatformProfile::for_device(DeviceType::CiscoIos);
        assert_eq!(profile.paging_command, Some("terminal length 0"));
        assert_eq!(profile.config_enter_command, "configure terminal");
        assert!(profile.requires_enable);
        assert!(!PlatformProfile::for_device(DeviceType::CiscoNxos).requires_enable);
    }
}
