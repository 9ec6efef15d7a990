use std::path::PathBuf;

use lazy_static::lazy_static;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub listen_port: u16,
    pub content_dir: PathBuf,
    pub save_dir: PathBuf,
    pub players_file: PathBuf,
    pub build_tick_seconds: u64,
    pub production_tick_seconds: u64,
    pub persistence_tick_seconds: u64,
    pub max_frame_bytes: u32,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    fn from_env() -> Config {
        Config {
            listen_addr: env_or("NEXORA_LISTEN_ADDR", "0.0.0.0"),
            listen_port: env_parse("NEXORA_LISTEN_PORT", 9443),
            content_dir: PathBuf::from(env_or("NEXORA_CONTENT_DIR", "data")),
            save_dir: PathBuf::from(env_or("NEXORA_SAVE_DIR", "saves")),
            players_file: PathBuf::from(env_or("NEXORA_PLAYERS_FILE", "saves/players.json")),
            build_tick_seconds: env_parse("NEXORA_BUILD_TICK_SECONDS", 1),
            production_tick_seconds: env_parse("NEXORA_PRODUCTION_TICK_SECONDS", 60),
            persistence_tick_seconds: env_parse("NEXORA_PERSISTENCE_TICK_SECONDS", 60),
            max_frame_bytes: env_parse("NEXORA_MAX_FRAME_BYTES", 64 * 1024 * 1024),
        }
    }
}

lazy_static! {
    pub static ref CONFIG: Config = Config::from_env();
}
