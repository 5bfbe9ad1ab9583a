use std::cell::RefCell;
use std::collections::HashMap;

use storage_sys::{InquiryError, Result, SystemInquiry};
use storage_types::{DesiredState, DeviceType, ExpectedConfiguration, SizeSpec};

/// Scripted inquiry responses. Unscripted inquiries fail with `CommandFailed`.
#[derive(Default)]
pub struct FixtureInquiry {
    responses: HashMap<String, Result<String>>,
    calls: RefCell<Vec<String>>,
}

impl FixtureInquiry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_devices(mut self, target: &str, output: &str) -> Self {
        self.responses
            .insert(format!("lsblk {target}"), Ok(output.to_string()));
        self
    }

    pub fn mount_table(mut self, output: &str) -> Self {
        self.responses
            .insert("fstab".to_string(), Ok(output.to_string()));
        self
    }

    pub fn logical_volumes(mut self, vg: &str, output: &str) -> Self {
        self.responses.insert(format!("lvs {vg}"), Ok(output.to_string()));
        self
    }

    pub fn volume_groups(mut self, vg: &str, output: &str) -> Self {
        self.responses.insert(format!("vgs {vg}"), Ok(output.to_string()));
        self
    }

    pub fn physical_volumes(mut self, disk: &str, output: &str) -> Self {
        self.responses
            .insert(format!("pvs {disk}"), Ok(output.to_string()));
        self
    }

    pub fn failing(mut self, key: &str, error: InquiryError) -> Self {
        self.responses.insert(key.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn respond(&self, key: String) -> Result<String> {
        self.calls.borrow_mut().push(key.clone());
        self.responses
            .get(&key)
            .cloned()
            .unwrap_or_else(|| {
                Err(InquiryError::CommandFailed {
                    command: key,
                    stderr: "not scripted".to_string(),
                })
            })
    }
}

impl SystemInquiry for FixtureInquiry {
    fn list_block_devices(&self, target: &str) -> Result<String> {
        self.respond(format!("lsblk {target}"))
    }

    fn read_mount_table(&self) -> Result<String> {
        self.respond("fstab".to_string())
    }

    fn list_logical_volumes(&self, vg: &str) -> Result<String> {
        self.respond(format!("lvs {vg}"))
    }

    fn list_volume_groups(&self, vg: &str) -> Result<String> {
        self.respond(format!("vgs {vg}"))
    }

    fn list_physical_volumes(&self, disk: &str) -> Result<String> {
        self.respond(format!("pvs {disk}"))
    }
}

pub fn lvm_config(size: Option<&str>, state: DesiredState) -> ExpectedConfiguration {
    ExpectedConfiguration::builder(["sdb"], "/opt/test1")
        .device_name("test1")
        .volume_group("foo")
        .filesystem_type("xfs")
        .size_spec(SizeSpec::parse(size))
        .desired_state(state)
        .build()
}

pub fn disk_config(state: DesiredState) -> ExpectedConfiguration {
    ExpectedConfiguration::builder(["sdb"], "/mnt/data")
        .device_type(DeviceType::Disk)
        .filesystem_type("ext4")
        .desired_state(state)
        .build()
}

pub const LVM_FSTAB: &str = "\
UUID=1234 / xfs defaults 0 0
/dev/mapper/foo-test1 /opt/test1 xfs defaults 0 0
";

/// Render rows the way `lsblk --ascii --output NAME,FSTYPE,MOUNTPOINT` does:
/// a header, left-aligned columns one space apart, tree glyphs in the name.
pub fn block_listing(rows: &[[&str; 3]]) -> String {
    let header = ["NAME", "FSTYPE", "MOUNTPOINT"];
    let width = |column: usize| {
        rows.iter()
            .map(|row| row[column].chars().count())
            .chain([header[column].len()])
            .max()
            .unwrap_or_default()
    };
    let (name_width, fs_width) = (width(0), width(1));

    std::iter::once(header)
        .chain(rows.iter().copied())
        .map(|[name, fs, mount]| {
            let line = format!("{name:<name_width$} {fs:<fs_width$} {mount}");
            format!("{}\n", line.trim_end())
        })
        .collect()
}

/// `lsblk /dev/sdb` with the provisioned volume drawn below its disk.
pub fn lvm_tree() -> String {
    block_listing(&[
        ["/dev/sdb", "LVM2_member", ""],
        ["`-/dev/mapper/foo-test1", "xfs", "/opt/test1"],
    ])
}
