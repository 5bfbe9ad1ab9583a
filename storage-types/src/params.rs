// SPDX-License-Identifier: GPL-3.0-only

//! Flat role variables, as handed over by the automation layer

use serde::{Deserialize, Serialize};

use crate::config::{DesiredState, DeviceType, ExpectedConfiguration};
use crate::error::ParameterError;
use crate::size::SizeSpec;

/// `disks` may be written as a list or as one comma/space separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiskList {
    Many(Vec<String>),
    One(String),
}

impl DiskList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Many(disks) => disks
                .into_iter()
                .map(|disk| disk.trim().to_string())
                .filter(|disk| !disk.is_empty())
                .collect(),
            Self::One(disks) => disks
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|disk| !disk.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl Default for DiskList {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// The provisioning role's variables, named exactly as the role names them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleParameters {
    pub device_type: Option<String>,
    pub device_name: Option<String>,
    pub disks: DiskList,
    pub size: Option<String>,
    pub fs_type: Option<String>,
    pub fs_label: Option<String>,
    pub fs_create_options: Option<String>,
    pub mount_point: Option<String>,
    pub mount_options: Option<String>,
    pub lvm_vg: Option<String>,
    #[serde(alias = "status")]
    pub state: Option<String>,
}

impl RoleParameters {
    /// Overlay every field set in `other` on top of `self`.
    pub fn merge(mut self, other: RoleParameters) -> Self {
        fn pick(base: &mut Option<String>, over: Option<String>) {
            if over.is_some() {
                *base = over;
            }
        }

        pick(&mut self.device_type, other.device_type);
        pick(&mut self.device_name, other.device_name);
        pick(&mut self.size, other.size);
        pick(&mut self.fs_type, other.fs_type);
        pick(&mut self.fs_label, other.fs_label);
        pick(&mut self.fs_create_options, other.fs_create_options);
        pick(&mut self.mount_point, other.mount_point);
        pick(&mut self.mount_options, other.mount_options);
        pick(&mut self.lvm_vg, other.lvm_vg);
        pick(&mut self.state, other.state);

        let other_disks = other.disks.into_vec();
        if !other_disks.is_empty() {
            self.disks = DiskList::Many(other_disks);
        }
        self
    }
}

fn parse_device_type(raw: Option<&str>) -> Result<DeviceType, ParameterError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(DeviceType::default()),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "disk" => Ok(DeviceType::Disk),
            "lvm" => Ok(DeviceType::Lvm),
            _ => Err(ParameterError::UnknownDeviceType(raw.to_string())),
        },
    }
}

fn parse_state(raw: Option<&str>) -> Result<DesiredState, ParameterError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(DesiredState::default()),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "present" => Ok(DesiredState::Present),
            "absent" => Ok(DesiredState::Absent),
            _ => Err(ParameterError::UnknownState(raw.to_string())),
        },
    }
}

impl TryFrom<RoleParameters> for ExpectedConfiguration {
    type Error = ParameterError;

    fn try_from(params: RoleParameters) -> Result<Self, Self::Error> {
        let device_type = parse_device_type(params.device_type.as_deref())?;
        let desired_state = parse_state(params.state.as_deref())?;

        let mut builder =
            ExpectedConfiguration::builder(params.disks.into_vec(), params.mount_point.unwrap_or_default())
                .device_type(device_type)
                .desired_state(desired_state)
                .size_spec(SizeSpec::parse(params.size.as_deref()));

        if let Some(name) = params.device_name {
            builder = builder.device_name(name);
        }
        if let Some(vg) = params.lvm_vg {
            builder = builder.volume_group(vg);
        }
        if let Some(fs_type) = params.fs_type {
            builder = builder.filesystem_type(fs_type);
        }
        if let Some(label) = params.fs_label {
            builder = builder.filesystem_label(label);
        }
        if let Some(options) = params.fs_create_options {
            builder = builder.filesystem_create_options(options);
        }
        if let Some(options) = params.mount_options {
            builder = builder.mount_options(options);
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size::PercentBasis;

    #[test]
    fn converts_role_variables() {
        let params = RoleParameters {
            device_name: Some("test1".to_string()),
            disks: DiskList::One("sdb, sdc".to_string()),
            size: Some("50%VG".to_string()),
            mount_point: Some("/opt/test1".to_string()),
            lvm_vg: Some("foo".to_string()),
            ..Default::default()
        };

        let config = ExpectedConfiguration::try_from(params).unwrap();
        assert_eq!(config.device_type(), DeviceType::Lvm);
        assert_eq!(config.disks(), ["sdb".to_string(), "sdc".to_string()]);
        assert_eq!(config.volume_group(), Some("foo"));
        assert_eq!(config.filesystem_type(), "xfs");
        assert_eq!(
            config.size_spec(),
            &SizeSpec::Percentage {
                basis: PercentBasis::VolumeGroup,
                percent: 50.0
            }
        );
    }

    #[test]
    fn rejects_unknown_state() {
        let params = RoleParameters {
            state: Some("gone".to_string()),
            ..Default::default()
        };
        assert_eq!(
            ExpectedConfiguration::try_from(params),
            Err(ParameterError::UnknownState("gone".to_string()))
        );
    }

    #[test]
    fn accepts_legacy_status_key() {
        let params: RoleParameters = serde_json::from_str(
            r#"{"device_type": "disk", "disks": ["sdb"], "mount_point": "/mnt", "status": "absent"}"#,
        )
        .unwrap();
        let config = ExpectedConfiguration::try_from(params).unwrap();
        assert_eq!(config.desired_state(), DesiredState::Absent);
        assert_eq!(config.device_type(), DeviceType::Disk);
    }

    #[test]
    fn reads_toml_variables() {
        let params: RoleParameters = toml::from_str(
            r#"
            device_name = "test1"
            disks = "sdb"
            lvm_vg = "foo"
            mount_point = "/opt/test1"
            size = "13GiB"
            "#,
        )
        .unwrap();
        assert_eq!(params.disks.clone().into_vec(), vec!["sdb".to_string()]);
        assert_eq!(params.size.as_deref(), Some("13GiB"));
    }

    #[test]
    fn merge_prefers_overlay_values() {
        let base = RoleParameters {
            device_name: Some("test1".to_string()),
            disks: DiskList::Many(vec!["sdb".to_string()]),
            mount_point: Some("/opt/test1".to_string()),
            ..Default::default()
        };
        let overlay = RoleParameters {
            mount_point: Some("/opt/other".to_string()),
            ..Default::default()
        };

        let merged = base.merge(overlay);
        assert_eq!(merged.device_name.as_deref(), Some("test1"));
        assert_eq!(merged.mount_point.as_deref(), Some("/opt/other"));
        assert_eq!(merged.disks.into_vec(), vec!["sdb".to_string()]);
    }
}
