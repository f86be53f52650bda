use std::{
    fs,
    io,
    io::{Error, ErrorKind},
    path::PathBuf,
};

use dirs::home_dir;
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Default)]
pub struct UserData {
    pub profiles: Vec<Profile>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Profile {
    pub name: String,
    pub server: String,
    pub email: Option<String>,
    /// The account id for the logged-in user. Keys the on-disk cart file.
    pub user_id: Option<i64>,
    /// The JWT issued at login. Tokens expire after 24 hours; a fresh `foodtools login` replaces it.
    pub access_token: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            name: "default".to_string(),
            server: "http://localhost:4460".to_string(),
            email: None,
            user_id: None,
            access_token: None,
        }
    }
}

pub fn config_dir() -> io::Result<PathBuf> {
    let home = home_dir().ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Home directory not found"))?;
    let config_dir = home.join(".foodtools");
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
        set_permissions(&config_dir, 0o700)?;
    }
    Ok(config_dir)
}

pub fn get_config_path() -> io::Result<PathBuf> {
    let config_dir = config_dir()?;
    let config_file = config_dir.join("config.toml");
    if !config_file.exists() {
        info!("Creating default config file");
        let default_config = UserData { profiles: vec![Profile::default()] };
        let config_str =
            toml::to_string(&default_config).map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))?;
        fs::write(&config_file, config_str)?;
        set_permissions(&config_file, 0o600)?;
    }
    Ok(config_file)
}

pub fn set_permissions(path: &PathBuf, perms: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = fs::metadata(path)?;
        let mut permissions = metadata.permissions();
        permissions.set_mode(perms);
        fs::set_permissions(path, permissions)?;
    }
    Ok(())
}

pub fn read_config() -> io::Result<UserData> {
    let config_path = get_config_path()?;
    let config_str = fs::read_to_string(config_path)?;
    let config: UserData =
        toml::from_str(&config_str).map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))?;
    Ok(config)
}

pub fn write_config(config: &UserData) -> anyhow::Result<()> {
    let config_path = get_config_path()?;
    let config_str = toml::to_string(config)?;
    fs::write(config_path, config_str)?;
    Ok(())
}

/// Loads the named profile, or the first one in the config when `name` is `None`.
pub fn load_profile(name: Option<&str>) -> anyhow::Result<Profile> {
    let config = read_config()?;
    let profile = match name {
        Some(n) => config.profiles.into_iter().find(|p| p.name == n),
        None => config.profiles.into_iter().next(),
    };
    profile.ok_or_else(|| anyhow::anyhow!("No matching profile found. Check ~/.foodtools/config.toml"))
}

/// Stores the updated profile back into the config, replacing the entry with the same name.
pub fn save_profile(profile: Profile) -> anyhow::Result<()> {
    let mut config = read_config()?;
    match config.profiles.iter_mut().find(|p| p.name == profile.name) {
        Some(existing) => *existing = profile,
        None => config.profiles.push(profile),
    }
    write_config(&config)
}
