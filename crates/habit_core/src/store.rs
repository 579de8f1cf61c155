use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use parking_lot::RwLock;
use tracing::{info, instrument, warn};

use crate::habit::{HabitRecord, HabitSnapshot};

pub const DEFAULT_SAVEFILE: &str = "habithero_savefile.json";

type Profiles = BTreeMap<String, Vec<HabitSnapshot>>;

/// JSON save file holding every profile's habits, keyed by profile name.
///
/// The whole file is cached in memory and rewritten on every save.
pub struct HabitStore {
    path: PathBuf,
    profiles: RwLock<Profiles>,
}

impl HabitStore {
    /// Open the save file at `path`, creating an empty one when missing.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(&path, "{}")
                .with_context(|| format!("unable to create save file {}", path.display()))?;
            info!("created empty save file");
        }
        let store = Self {
            path,
            profiles: RwLock::new(Profiles::new()),
        };
        store.reload()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the save file from disk, replacing the cache.
    pub fn reload(&self) -> Result<()> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("unable to read save file {}", self.path.display()))?;
        let parsed: Profiles = serde_json::from_str(&raw)
            .with_context(|| format!("malformed save file {}", self.path.display()))?;
        *self.profiles.write() = parsed;
        Ok(())
    }

    pub fn profiles(&self) -> Vec<String> {
        self.profiles.read().keys().cloned().collect()
    }

    pub fn profile_exists(&self, profile: &str) -> bool {
        self.profiles.read().contains_key(profile)
    }

    /// Register `profile` with no habits. Existing profiles are left alone.
    pub fn create_profile(&self, profile: &str) -> Result<()> {
        if self.profile_exists(profile) {
            return Ok(());
        }
        info!(profile, "creating profile");
        self.save(profile, &[])
    }

    /// Load a profile's habits, recomputing their derived fields as of
    /// `as_of`. An unknown profile yields no habits.
    pub fn load(&self, profile: &str, as_of: NaiveDate) -> Result<Vec<HabitRecord>> {
        let profiles = self.profiles.read();
        let Some(snapshots) = profiles.get(profile) else {
            warn!(profile, "profile not found in save file");
            return Ok(Vec::new());
        };
        snapshots
            .iter()
            .cloned()
            .map(|snapshot| {
                let name = snapshot.name.clone();
                HabitRecord::from_snapshot(snapshot, as_of)
                    .with_context(|| format!("invalid habit `{name}` in profile `{profile}`"))
            })
            .collect()
    }

    /// Overwrite one profile's habits and write the save file.
    #[instrument(skip(self, habits), fields(count = habits.len()))]
    pub fn save(&self, profile: &str, habits: &[HabitRecord]) -> Result<()> {
        let mut profiles = self.profiles.write();
        // The cache only moves once the file write has succeeded.
        let mut updated = profiles.clone();
        updated.insert(
            profile.to_string(),
            habits.iter().map(HabitRecord::to_snapshot).collect(),
        );
        let contents = serde_json::to_string_pretty(&updated)?;
        fs::write(&self.path, contents)
            .with_context(|| format!("unable to write save file {}", self.path.display()))?;
        *profiles = updated;
        info!("saved profile");
        Ok(())
    }

    pub fn add_habit(&self, profile: &str, habit: HabitRecord, as_of: NaiveDate) -> Result<()> {
        let mut habits = self.load(profile, as_of)?;
        info!(profile, name = habit.name(), frequency = %habit.frequency(), "adding habit");
        habits.push(habit);
        self.save(profile, &habits)
    }

    pub fn remove_habit(&self, profile: &str, index: usize, as_of: NaiveDate) -> Result<HabitRecord> {
        let mut habits = self.load(profile, as_of)?;
        if index >= habits.len() {
            return Err(anyhow!("no habit at index {index} in profile `{profile}`"));
        }
        let removed = habits.remove(index);
        info!(profile, index, name = removed.name(), "removed habit");
        self.save(profile, &habits)?;
        Ok(removed)
    }

    /// Load a profile, apply `update` to one habit and save the profile.
    /// Nothing is written when `update` fails.
    pub fn update_habit<T>(
        &self,
        profile: &str,
        index: usize,
        as_of: NaiveDate,
        update: impl FnOnce(&mut HabitRecord) -> Result<T>,
    ) -> Result<T> {
        let mut habits = self.load(profile, as_of)?;
        let habit = habits
            .get_mut(index)
            .ok_or_else(|| anyhow!("no habit at index {index} in profile `{profile}`"))?;
        let value = update(habit)?;
        self.save(profile, &habits)?;
        Ok(value)
    }
}
