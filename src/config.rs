use anyhow::{Result, anyhow};
use directories::UserDirs;
use log::info;
use serde::Deserialize;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use crate::input;

#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub name: Option<String>,
}

/// Durations are milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub max_stroke_ms: u64,
    pub merge_window_ms: u64,
    pub tap_ms: u64,
    pub scale_ms: u64,
    pub scale_offset: f32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            max_stroke_ms: 60_000,
            merge_window_ms: 30,
            tap_ms: 1,
            scale_ms: 100,
            scale_offset: 10.0,
        }
    }
}

/// The virtual touchscreen strokes are played back on.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Output {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub step_ms: u64,
    pub max_contacts: u32,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            name: "strokectl virtual touchscreen".to_string(),
            width: 1920,
            height: 1080,
            step_ms: 8,
            max_contacts: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub meta: Meta,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub output: Output,
}

#[derive(Debug, Clone)]
pub struct ConfigState {
    pub active_name: String,
    pub profile: Profile,
    pub config_dir: PathBuf,
    pub profiles_dir: PathBuf,
    pub active_ptr: PathBuf,
}

fn config_dir() -> Result<PathBuf> {
    let dirs = UserDirs::new().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(dirs.home_dir().join(".config").join("strokectl"))
}

fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

impl ConfigState {
    pub fn load_or_install_default() -> Result<Self> {
        let cfgdir = config_dir()?;
        let profdir = cfgdir.join("profiles");
        fs::create_dir_all(&profdir)?;

        let def_path = profdir.join("default.toml");
        if !def_path.exists() {
            fs::write(&def_path, default_profile_text())?;
            info!("installed default profile at {}", def_path.display());
        }

        let active_ptr = cfgdir.join("active");
        if !active_ptr.exists() {
            let mut f = fs::File::create(&active_ptr)?;
            f.write_all(b"default")?;
        }

        let active_name = fs::read_to_string(&active_ptr)?.trim().to_string();
        let profile = load_profile(&profdir.join(format!("{active_name}.toml")))?;

        Ok(Self {
            active_name,
            profile,
            config_dir: cfgdir,
            profiles_dir: profdir,
            active_ptr,
        })
    }

    pub fn set_active(&mut self, name: &str) -> Result<()> {
        let p = self.profiles_dir.join(format!("{name}.toml"));
        if !p.exists() {
            return Err(anyhow!("profile not found: {}", p.display()));
        }
        self.profile = load_profile(&p)?;
        fs::write(&self.active_ptr, name.as_bytes())?;
        self.active_name = name.to_string();
        Ok(())
    }

    pub fn list_profiles(&self) -> Vec<String> {
        let mut v = Vec::new();
        if let Ok(rd) = fs::read_dir(&self.profiles_dir) {
            for e in rd.flatten() {
                let path = e.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        v.push(stem.to_string());
                    }
                }
            }
        }
        v.sort();
        v
    }

    pub fn doctor_report(&self) -> serde_json::Value {
        let devices: Vec<String> = input::discover_multitouch()
            .into_iter()
            .map(|d| format!("{} ({})", d.name, d.path))
            .collect();
        serde_json::json!({
            "uinput_present": Path::new("/dev/uinput").exists(),
            "input_group_member": check_in_input_group(),
            "profiles_dir": self.profiles_dir,
            "active_profile": self.active_name,
            "output": {
                "width": self.profile.output.width,
                "height": self.profile.output.height,
            },
            "devices": devices,
            "hints": {
                "udev_rule": "/etc/udev/rules.d/80-uinput.rules",
                "add_user_to_input_group": "sudo usermod -aG input $USER && newgrp input"
            }
        })
    }
}

fn load_profile(path: &Path) -> Result<Profile> {
    let txt = fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
    parse_profile(&txt).map_err(|e| anyhow!("failed to load {}: {e}", path.display()))
}

pub fn parse_profile(txt: &str) -> Result<Profile> {
    let profile: Profile = toml::from_str(txt)?;
    validate_profile(&profile)?;
    Ok(profile)
}

fn validate_profile(p: &Profile) -> Result<()> {
    let t = &p.timing;
    if t.max_stroke_ms == 0 || t.tap_ms == 0 || t.scale_ms == 0 {
        return Err(anyhow!("timing durations must be positive"));
    }
    if t.tap_ms > t.max_stroke_ms || t.scale_ms > t.max_stroke_ms {
        return Err(anyhow!("timing.tap_ms and timing.scale_ms must not exceed max_stroke_ms"));
    }
    if !t.scale_offset.is_finite() {
        return Err(anyhow!("timing.scale_offset must be finite"));
    }
    let o = &p.output;
    if o.width == 0 || o.height == 0 {
        return Err(anyhow!("output size must be non-zero"));
    }
    if o.step_ms == 0 {
        return Err(anyhow!("output.step_ms must be positive"));
    }
    if !(1..=16).contains(&o.max_contacts) {
        return Err(anyhow!("output.max_contacts must be in 1..=16"));
    }
    Ok(())
}

fn check_in_input_group() -> bool {
    let Ok(s) = fs::read_to_string("/etc/group") else {
        return false;
    };
    let user = whoami::username();
    s.lines()
        .filter(|line| line.starts_with("input:"))
        .any(|line| {
            line.split(':')
                .nth(3)
                .unwrap_or("")
                .split(',')
                .any(|u| u == user)
        })
}
