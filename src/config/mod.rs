use std::{
    collections::HashMap,
    env, fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let mut map = default_map();
        let config_path = default_config_path();

        // Read .vibesrc if exists
        if config_path.exists() {
            read_rc_file(&config_path, &mut map);
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self {
            inner: map,
            config_path,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        // ENV first
        if let Ok(v) = env::var(key) {
            return Some(v);
        }
        self.inner.get(key).cloned()
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.parse::<usize>().ok())
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).map(PathBuf::from)
    }

    pub fn examples_path(&self) -> PathBuf {
        self.get_path("EXAMPLES_PATH")
            .unwrap_or_else(|| PathBuf::from("demos"))
    }
}

fn read_rc_file(path: &Path, map: &mut HashMap<String, String>) {
    if let Ok(file) = fs::File::open(path) {
        let reader = BufReader::new(file);
        for line in reader.lines().map_while(Result::ok) {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((k, v)) = line.split_once('=') {
                map.insert(k.trim().to_string(), v.trim().to_string());
            }
        }
    }
}

fn is_config_key(k: &str) -> bool {
    // Accept known keys or VIBES_* for forward-compat
    const KEYS: &[&str] = &[
        "SERVICE_URL",
        "SERVER_ADDR",
        "REQUEST_TIMEOUT",
        "EXAMPLES_PATH",
        "DEFAULT_COLOR",
    ];

    KEYS.contains(&k) || k.starts_with("VIBES_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("vibescript").join(".vibesrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    m.insert("SERVICE_URL".into(), "http://127.0.0.1:5000".into());
    m.insert("SERVER_ADDR".into(), "127.0.0.1:5000".into());
    m.insert("REQUEST_TIMEOUT".into(), "60".into());
    m.insert("EXAMPLES_PATH".into(), "demos".into());
    m.insert("DEFAULT_COLOR".into(), "green".into());

    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_key() {
        let m = default_map();
        for key in ["SERVICE_URL", "SERVER_ADDR", "REQUEST_TIMEOUT", "EXAMPLES_PATH", "DEFAULT_COLOR"] {
            assert!(m.contains_key(key), "missing default for {}", key);
        }
    }

    #[test]
    fn rc_lines_override_defaults_and_skip_comments() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".vibesrc");
        fs::write(
            &rc,
            "# service location\nSERVICE_URL = http://10.0.0.2:8080\n\nREQUEST_TIMEOUT=5\nnot a pair\n",
        )
        .unwrap();

        let mut map = default_map();
        read_rc_file(&rc, &mut map);
        assert_eq!(
            map.get("SERVICE_URL").map(String::as_str),
            Some("http://10.0.0.2:8080")
        );
        assert_eq!(map.get("REQUEST_TIMEOUT").map(String::as_str), Some("5"));
        assert_eq!(map.get("DEFAULT_COLOR").map(String::as_str), Some("green"));
    }

    #[test]
    fn unknown_env_keys_are_ignored_unless_prefixed() {
        assert!(is_config_key("SERVICE_URL"));
        assert!(is_config_key("VIBES_ANYTHING"));
        assert!(!is_config_key("PATH"));
        assert!(!is_config_key("HOME"));
    }
}
