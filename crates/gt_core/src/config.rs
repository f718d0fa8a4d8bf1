//! Game settings loaded from `assets/config/game.json`.
//!
//! Every field is optional in the file. A missing file means defaults; a file
//! that fails to parse or validate is reported and also falls back to defaults,
//! so a typo never keeps the window from opening.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use glam::{UVec2, Vec2};

use crate::canvas::Rgb;
use crate::sprite::{grid_frame_count, MAX_SPRITE_FRAMES};

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GameConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default = "default_clear_color")]
    pub clear_color: [u8; 3],
    #[serde(default)]
    pub cursor_locked: bool,
    #[serde(default)]
    pub player: PlayerConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PlayerConfig {
    #[serde(default = "default_player_sprite")]
    pub sprite: String,
    #[serde(default = "default_player_size")]
    pub size: [f32; 2],
    #[serde(default = "default_player_frames")]
    pub frames: [u32; 2],
    #[serde(default = "default_frame_duration")]
    pub frame_duration: f32,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default)]
    pub start: [f32; 2],
    #[serde(default)]
    pub transparent: bool,
}

impl GameConfig {
    pub fn clear_color(&self) -> Rgb {
        Rgb::from_u8(self.clear_color)
    }
}

impl PlayerConfig {
    pub fn size(&self) -> Vec2 {
        Vec2::from_array(self.size)
    }

    pub fn frames(&self) -> UVec2 {
        UVec2::from_array(self.frames)
    }

    pub fn start(&self) -> Vec2 {
        Vec2::from_array(self.start)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            clear_color: default_clear_color(),
            cursor_locked: false,
            player: PlayerConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sprite: default_player_sprite(),
            size: default_player_size(),
            frames: default_player_frames(),
            frame_duration: default_frame_duration(),
            speed: default_speed(),
            start: [0.0, 0.0],
            transparent: false,
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Load `path`, falling back to defaults on any failure.
pub fn load_config_or_default(path: &Path) -> GameConfig {
    if !path.exists() {
        log::warn!(
            "Config file '{}' not found, using defaults",
            path.display()
        );
        return GameConfig::default();
    }
    match load_config_from_path(path) {
        Ok(config) => {
            log::info!("Loaded config '{}'", path.display());
            config
        }
        Err(err) => {
            log::error!("{err}. Using defaults.");
            GameConfig::default()
        }
    }
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.window.width == 0 || config.window.height == 0 {
        return Err(format!(
            "Config validation failed: window size {}x{} has a zero dimension",
            config.window.width, config.window.height
        ));
    }
    let player = &config.player;
    if grid_frame_count(player.frames()).is_none() {
        return Err(format!(
            "Config validation failed: player frame grid {}x{} must hold 1..={} frames",
            player.frames[0], player.frames[1], MAX_SPRITE_FRAMES
        ));
    }
    if player.frame_duration <= 0.0 {
        return Err(format!(
            "Config validation failed: player frame_duration must be > 0 (got {})",
            player.frame_duration
        ));
    }
    if player.speed < 0.0 {
        return Err(format!(
            "Config validation failed: player speed must be >= 0 (got {})",
            player.speed
        ));
    }
    if player.sprite.is_empty() {
        return Err("Config validation failed: player sprite path is empty".to_string());
    }
    Ok(())
}

fn default_title() -> String {
    "Template!".to_string()
}

const fn default_width() -> u32 {
    800
}

const fn default_height() -> u32 {
    500
}

const fn default_clear_color() -> [u8; 3] {
    [100, 100, 100]
}

fn default_player_sprite() -> String {
    "assets/sprites/player.png".to_string()
}

const fn default_player_size() -> [f32; 2] {
    [26.0, 22.0]
}

const fn default_player_frames() -> [u32; 2] {
    [8, 1]
}

const fn default_frame_duration() -> f32 {
    crate::sprite::DEFAULT_FRAME_DURATION
}

const fn default_speed() -> f32 {
    300.0
}
