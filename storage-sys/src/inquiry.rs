// SPDX-License-Identifier: GPL-3.0-only

//! System inquiry adapter
//!
//! All external I/O of the verifier goes through [`SystemInquiry`]. Every
//! probe is read-only and returns the raw text of the report; parsing lives
//! in the per-tool modules.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::{cmd, lvm_tools, InquiryError, Result};

/// Mount table read when no other path is configured.
pub const DEFAULT_MOUNT_TABLE: &str = "/etc/fstab";

/// Read-only probes of live storage state.
pub trait SystemInquiry {
    /// Block device listing (name, filesystem type, mount point) of `target`
    /// and its children, header line included.
    fn list_block_devices(&self, target: &str) -> Result<String>;

    /// Contents of the persisted mount table.
    fn read_mount_table(&self) -> Result<String>;

    /// Logical volumes (name, size) of volume group `vg`.
    ///
    /// `EmptyResult` means the group holds no logical volumes.
    fn list_logical_volumes(&self, vg: &str) -> Result<String>;

    /// Capacity report (name, total, free) of volume group `vg`.
    fn list_volume_groups(&self, vg: &str) -> Result<String>;

    /// Capacity report (device, total, free) of physical volume `disk`.
    fn list_physical_volumes(&self, disk: &str) -> Result<String>;
}

impl<T: SystemInquiry + ?Sized> SystemInquiry for &T {
    fn list_block_devices(&self, target: &str) -> Result<String> {
        (**self).list_block_devices(target)
    }

    fn read_mount_table(&self) -> Result<String> {
        (**self).read_mount_table()
    }

    fn list_logical_volumes(&self, vg: &str) -> Result<String> {
        (**self).list_logical_volumes(vg)
    }

    fn list_volume_groups(&self, vg: &str) -> Result<String> {
        (**self).list_volume_groups(vg)
    }

    fn list_physical_volumes(&self, disk: &str) -> Result<String> {
        (**self).list_physical_volumes(disk)
    }
}

/// Probes backed by `lsblk`, the LVM reporting tools and the mount table file.
#[derive(Debug, Clone)]
pub struct CommandInquiry {
    timeout: Option<Duration>,
    mount_table: PathBuf,
}

impl Default for CommandInquiry {
    fn default() -> Self {
        Self::new(None, DEFAULT_MOUNT_TABLE)
    }
}

impl CommandInquiry {
    /// `timeout` bounds each probe individually; `None` waits indefinitely.
    pub fn new(timeout: Option<Duration>, mount_table: impl AsRef<Path>) -> Self {
        if !cmd::is_privileged() {
            warn!("not running as root; LVM reports may be incomplete or refused");
        }
        Self {
            timeout,
            mount_table: mount_table.as_ref().to_path_buf(),
        }
    }

    fn run(&self, command: &str, args: &[String]) -> Result<String> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        cmd::run(command, &args, self.timeout)
    }

    fn run_lvm(&self, command: &str, args: &[String]) -> Result<String> {
        if !cfg!(feature = "lvm-tools") {
            return Err(InquiryError::CommandFailed {
                command: command.to_string(),
                stderr: "LVM tooling support is disabled in this build".to_string(),
            });
        }
        self.run(command, args)
    }
}

impl SystemInquiry for CommandInquiry {
    fn list_block_devices(&self, target: &str) -> Result<String> {
        self.run(
            "lsblk",
            &[
                "--ascii".to_string(),
                "--paths".to_string(),
                "--output".to_string(),
                "NAME,FSTYPE,MOUNTPOINT".to_string(),
                target.to_string(),
            ],
        )
    }

    fn read_mount_table(&self) -> Result<String> {
        let command = format!("read {}", self.mount_table.display());
        let contents =
            fs::read_to_string(&self.mount_table).map_err(|error| InquiryError::CommandFailed {
                command: command.clone(),
                stderr: error.to_string(),
            })?;
        debug!(path = %self.mount_table.display(), bytes = contents.len(), "mount table read");

        if contents.trim().is_empty() {
            return Err(InquiryError::EmptyResult { command });
        }
        Ok(contents)
    }

    fn list_logical_volumes(&self, vg: &str) -> Result<String> {
        self.run_lvm("lvs", &lvm_tools::lvs_args(vg))
    }

    fn list_volume_groups(&self, vg: &str) -> Result<String> {
        self.run_lvm("vgs", &lvm_tools::vgs_args(vg))
    }

    fn list_physical_volumes(&self, disk: &str) -> Result<String> {
        self.run_lvm("pvs", &lvm_tools::pvs_args(disk))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Probe {
    BlockDevices(String),
    MountTable,
    LogicalVolumes(String),
    VolumeGroups(String),
    PhysicalVolumes(String),
}

/// Caches each probe's result for the lifetime of one verification run.
///
/// Failures are cached too: a probe is never re-issued within a run.
#[derive(Debug)]
pub struct MemoizedInquiry<I> {
    inner: I,
    cache: RefCell<HashMap<Probe, Result<String>>>,
}

impl<I: SystemInquiry> MemoizedInquiry<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn cached(&self, probe: Probe, fetch: impl FnOnce(&I) -> Result<String>) -> Result<String> {
        if let Some(hit) = self.cache.borrow().get(&probe) {
            debug!(?probe, "probe served from cache");
            return hit.clone();
        }
        let result = fetch(&self.inner);
        self.cache.borrow_mut().insert(probe, result.clone());
        result
    }
}

impl<I: SystemInquiry> SystemInquiry for MemoizedInquiry<I> {
    fn list_block_devices(&self, target: &str) -> Result<String> {
        self.cached(Probe::BlockDevices(target.to_string()), |inner| {
            inner.list_block_devices(target)
        })
    }

    fn read_mount_table(&self) -> Result<String> {
        self.cached(Probe::MountTable, |inner| inner.read_mount_table())
    }

    fn list_logical_volumes(&self, vg: &str) -> Result<String> {
        self.cached(Probe::LogicalVolumes(vg.to_string()), |inner| {
            inner.list_logical_volumes(vg)
        })
    }

    fn list_volume_groups(&self, vg: &str) -> Result<String> {
        self.cached(Probe::VolumeGroups(vg.to_string()), |inner| {
            inner.list_volume_groups(vg)
        })
    }

    fn list_physical_volumes(&self, disk: &str) -> Result<String> {
        self.cached(Probe::PhysicalVolumes(disk.to_string()), |inner| {
            inner.list_physical_volumes(disk)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct CountingInquiry {
        calls: Cell<usize>,
    }

    impl SystemInquiry for CountingInquiry {
        fn list_block_devices(&self, target: &str) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok(format!("{target} xfs /opt/test1\n"))
        }

        fn read_mount_table(&self) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Err(InquiryError::EmptyResult {
                command: "read /etc/fstab".to_string(),
            })
        }

        fn list_logical_volumes(&self, _vg: &str) -> Result<String> {
            unreachable!()
        }

        fn list_volume_groups(&self, _vg: &str) -> Result<String> {
            unreachable!()
        }

        fn list_physical_volumes(&self, _disk: &str) -> Result<String> {
            unreachable!()
        }
    }

    #[test]
    fn repeated_probes_hit_the_cache() {
        let counting = CountingInquiry {
            calls: Cell::new(0),
        };
        let inquiry = MemoizedInquiry::new(&counting);

        let first = inquiry.list_block_devices("/dev/sdb").unwrap();
        let second = inquiry.list_block_devices("/dev/sdb").unwrap();
        assert_eq!(first, second);
        let _ = inquiry.list_block_devices("/dev/sdc");
        assert!(inquiry.read_mount_table().is_err());
        assert!(inquiry.read_mount_table().is_err());

        assert_eq!(counting.calls.get(), 3);
    }

    #[test]
    fn reads_mount_table_from_configured_path() {
        let path = std::env::temp_dir().join(format!("storage-verify-fstab-{}", std::process::id()));
        fs::write(&path, "/dev/sdb /mnt xfs defaults 0 0\n").unwrap();

        let inquiry = CommandInquiry::new(None, &path);
        let contents = inquiry.read_mount_table().unwrap();
        assert!(contents.contains("/dev/sdb"));

        fs::write(&path, "\n   \n").unwrap();
        assert!(matches!(
            inquiry.read_mount_table(),
            Err(InquiryError::EmptyResult { .. })
        ));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_mount_table_is_command_failure() {
        let inquiry = CommandInquiry::new(None, "/nonexistent/storage-verify/fstab");
        assert!(matches!(
            inquiry.read_mount_table(),
            Err(InquiryError::CommandFailed { .. })
        ));
    }
}
