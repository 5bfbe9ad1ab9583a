// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use clap::Parser;
use storage_types::{DiskList, RoleParameters};

use crate::config::{LoggingLevel, OutputFormat, VerifierConfig, load_role_parameters};
use crate::error::ConfigFileError;

#[derive(Debug, Parser)]
#[command(name = "storage-verify")]
#[command(about = "Verify that provisioned disk or LVM storage matches the role variables")]
pub struct Args {
    /// Role variables file (TOML, or JSON with a .json extension)
    #[arg(long)]
    pub vars: Option<PathBuf>,

    /// Verifier settings file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub device_type: Option<String>,

    #[arg(long)]
    pub device_name: Option<String>,

    /// Backing disks; repeat the flag or separate with commas
    #[arg(long, value_delimiter = ',')]
    pub disks: Vec<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub size: Option<String>,

    #[arg(long)]
    pub fs_type: Option<String>,

    #[arg(long)]
    pub fs_label: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub fs_create_options: Option<String>,

    #[arg(long)]
    pub mount_point: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub mount_options: Option<String>,

    #[arg(long)]
    pub lvm_vg: Option<String>,

    #[arg(long, alias = "status")]
    pub state: Option<String>,

    /// Per-probe timeout in seconds (0 disables)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Mount table to inspect instead of /etc/fstab
    #[arg(long)]
    pub fstab: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(long, value_enum)]
    pub log_level: Option<LoggingLevel>,

    /// Also write logs to daily files in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Args {
    /// Settings file (if any) with command line overrides applied.
    pub fn verifier_config(&self) -> Result<VerifierConfig, ConfigFileError> {
        let mut config = match &self.config {
            Some(path) => VerifierConfig::load(path)?,
            None => VerifierConfig::default(),
        };

        if let Some(timeout) = self.timeout_secs {
            config.probe_timeout_secs = timeout;
        }
        if let Some(fstab) = &self.fstab {
            config.mount_table = fstab.clone();
        }
        if self.json {
            config.output = OutputFormat::Json;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }

        Ok(config)
    }

    /// Role variables given directly on the command line.
    pub fn flag_parameters(&self) -> RoleParameters {
        RoleParameters {
            device_type: self.device_type.clone(),
            device_name: self.device_name.clone(),
            disks: DiskList::Many(self.disks.clone()),
            size: self.size.clone(),
            fs_type: self.fs_type.clone(),
            fs_label: self.fs_label.clone(),
            fs_create_options: self.fs_create_options.clone(),
            mount_point: self.mount_point.clone(),
            mount_options: self.mount_options.clone(),
            lvm_vg: self.lvm_vg.clone(),
            state: self.state.clone(),
        }
    }

    /// Variables file (if any) overlaid with command line flags.
    pub fn role_parameters(&self) -> Result<RoleParameters, ConfigFileError> {
        let base = match &self.vars {
            Some(path) => load_role_parameters(path)?,
            None => RoleParameters::default(),
        };
        Ok(base.merge(self.flag_parameters()))
    }
}
